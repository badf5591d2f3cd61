// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Email/password sign-in screen.

use crate::error::Result;
use crate::models::{Editable, SessionIdentity};
use crate::services::{Draft, Notice, SessionProvider};
use crate::AppState;
use std::sync::Arc;
use std::time::Duration;

/// Sign-in form fields.
#[derive(Clone, Default, PartialEq)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

impl Editable for Credentials {
    const FIELDS: &'static [&'static str] = &["email", "password"];

    fn field(&self, key: &str) -> Option<&str> {
        match key {
            "email" => Some(&self.email),
            "password" => Some(&self.password),
            _ => None,
        }
    }

    fn field_mut(&mut self, key: &str) -> Option<&mut String> {
        match key {
            "email" => Some(&mut self.email),
            "password" => Some(&mut self.password),
            _ => None,
        }
    }
}

pub struct LoginScreen {
    session: Arc<dyn SessionProvider>,
    draft: Draft<Credentials>,
    notice: Option<Notice>,
    notice_duration: Duration,
}

impl LoginScreen {
    pub fn mount(state: &AppState) -> Self {
        Self {
            session: state.session.clone(),
            draft: Draft::default(),
            notice: None,
            notice_duration: state.config.notice_duration,
        }
    }

    pub fn set_field(&mut self, key: &str, value: impl Into<String>) -> Result<()> {
        self.draft.set_field(key, value)
    }

    pub fn notice(&self) -> Option<&Notice> {
        self.notice.as_ref()
    }

    /// Sign in with the entered credentials. The router picks up the new
    /// session; this screen is dropped when it does.
    pub async fn submit(&mut self) -> Result<SessionIdentity> {
        let Credentials { email, password } = self.draft.value().clone();
        match self.session.sign_in(email.trim(), &password).await {
            Ok(identity) => {
                self.notice = None;
                Ok(identity)
            }
            Err(e) => {
                tracing::warn!(class = ?e.class(), error = %e, "Sign-in failed");
                let message = if e.is_credential_error() {
                    "Invalid email or password"
                } else {
                    "Could not sign in"
                };
                self.notice = Some(Notice::error(message, self.notice_duration));
                Err(e)
            }
        }
    }
}
