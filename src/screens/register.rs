// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Account registration screen.

use crate::error::Result;
use crate::models::{Editable, SessionIdentity};
use crate::services::{Draft, Notice, SessionProvider};
use crate::AppState;
use std::sync::Arc;
use std::time::Duration;

/// Registration form fields.
#[derive(Clone, Default, PartialEq)]
pub struct Registration {
    pub name: String,
    pub email: String,
    pub password: String,
}

impl Editable for Registration {
    const FIELDS: &'static [&'static str] = &["name", "email", "password"];

    fn field(&self, key: &str) -> Option<&str> {
        match key {
            "name" => Some(&self.name),
            "email" => Some(&self.email),
            "password" => Some(&self.password),
            _ => None,
        }
    }

    fn field_mut(&mut self, key: &str) -> Option<&mut String> {
        match key {
            "name" => Some(&mut self.name),
            "email" => Some(&mut self.email),
            "password" => Some(&mut self.password),
            _ => None,
        }
    }
}

pub struct RegisterScreen {
    session: Arc<dyn SessionProvider>,
    draft: Draft<Registration>,
    notice: Option<Notice>,
    notice_duration: Duration,
}

impl RegisterScreen {
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

    /// Create the account; a successful sign-up is also a sign-in.
    pub async fn submit(&mut self) -> Result<SessionIdentity> {
        let Registration {
            name,
            email,
            password,
        } = self.draft.value().clone();
        let name = name.trim();
        let display_name = (!name.is_empty()).then_some(name);

        match self
            .session
            .sign_up(email.trim(), &password, display_name)
            .await
        {
            Ok(identity) => {
                self.notice = None;
                Ok(identity)
            }
            Err(e) => {
                tracing::warn!(error = %e, "Registration failed");
                let message = if e.is_email_in_use() {
                    "That email is already registered"
                } else {
                    "Could not create account"
                };
                self.notice = Some(Notice::error(message, self.notice_duration));
                Err(e)
            }
        }
    }
}
