// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Session provider abstraction and an in-process implementation.

use crate::db::TokenSource;
use crate::error::{AppError, Result};
use crate::models::SessionIdentity;
use async_trait::async_trait;
use dashmap::DashMap;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use tokio::sync::watch;

/// Authentication backend.
///
/// Identity changes (sign-in, sign-out, profile edits) are published on a
/// watch channel; dropping the receiver is the unsubscribe.
#[async_trait]
pub trait SessionProvider: TokenSource {
    /// Currently signed-in user, if any.
    fn current(&self) -> Option<SessionIdentity>;

    /// Subscribe to authentication-state changes.
    fn subscribe(&self) -> watch::Receiver<Option<SessionIdentity>>;

    async fn sign_in(&self, email: &str, password: &str) -> Result<SessionIdentity>;

    /// Create an account and sign into it.
    async fn sign_up(
        &self,
        email: &str,
        password: &str,
        display_name: Option<&str>,
    ) -> Result<SessionIdentity>;

    async fn sign_out(&self) -> Result<()>;

    async fn update_display_name(&self, display_name: &str) -> Result<()>;

    async fn update_email(&self, email: &str) -> Result<()>;
}

#[derive(Clone)]
struct Account {
    uid: String,
    password: String,
    display_name: Option<String>,
}

/// In-process session provider for tests and offline runs.
///
/// Enforces the same rules the hosted provider reports as errors: unknown
/// or wrong credentials and already-registered emails.
pub struct LocalSession {
    /// Accounts keyed by email.
    accounts: DashMap<String, Account>,
    identity: watch::Sender<Option<SessionIdentity>>,
    next_uid: AtomicU64,
    offline: AtomicBool,
}

impl Default for LocalSession {
    fn default() -> Self {
        Self::new()
    }
}

impl LocalSession {
    pub fn new() -> Self {
        let (identity, _) = watch::channel(None);
        Self {
            accounts: DashMap::new(),
            identity,
            next_uid: AtomicU64::new(1),
            offline: AtomicBool::new(false),
        }
    }

    /// Make every following call fail as if the network were down.
    pub fn set_offline(&self, offline: bool) {
        self.offline.store(offline, Ordering::SeqCst);
    }

    fn check_online(&self) -> Result<()> {
        if self.offline.load(Ordering::SeqCst) {
            return Err(AppError::Auth("NETWORK_REQUEST_FAILED".to_string()));
        }
        Ok(())
    }

    fn signed_in(&self) -> Result<SessionIdentity> {
        self.current().ok_or(AppError::Unauthorized)
    }

    fn publish(&self, identity: Option<SessionIdentity>) {
        self.identity.send_if_modified(|current| {
            if *current == identity {
                return false;
            }
            *current = identity;
            true
        });
    }
}

#[async_trait]
impl TokenSource for LocalSession {
    async fn id_token(&self) -> Result<Option<String>> {
        Ok(self.current().map(|id| format!("local-token-{}", id.uid)))
    }
}

#[async_trait]
impl SessionProvider for LocalSession {
    fn current(&self) -> Option<SessionIdentity> {
        self.identity.borrow().clone()
    }

    fn subscribe(&self) -> watch::Receiver<Option<SessionIdentity>> {
        self.identity.subscribe()
    }

    async fn sign_in(&self, email: &str, password: &str) -> Result<SessionIdentity> {
        self.check_online()?;

        let account = self
            .accounts
            .get(email)
            .filter(|account| account.password == password)
            .map(|account| account.clone())
            .ok_or_else(|| AppError::Auth(AppError::INVALID_LOGIN_CREDENTIALS.to_string()))?;

        let identity = SessionIdentity {
            uid: account.uid,
            display_name: account.display_name,
            email: Some(email.to_string()),
        };
        tracing::info!(uid = %identity.uid, "Signed in");
        self.publish(Some(identity.clone()));
        Ok(identity)
    }

    async fn sign_up(
        &self,
        email: &str,
        password: &str,
        display_name: Option<&str>,
    ) -> Result<SessionIdentity> {
        self.check_online()?;
        if password.len() < 6 {
            return Err(AppError::Auth("WEAK_PASSWORD".to_string()));
        }

        let uid = format!(
            "local-{:06}",
            self.next_uid.fetch_add(1, Ordering::SeqCst)
        );
        match self.accounts.entry(email.to_string()) {
            dashmap::mapref::entry::Entry::Occupied(_) => {
                return Err(AppError::Auth(AppError::EMAIL_EXISTS.to_string()));
            }
            dashmap::mapref::entry::Entry::Vacant(slot) => {
                slot.insert(Account {
                    uid: uid.clone(),
                    password: password.to_string(),
                    display_name: display_name.map(str::to_string),
                });
            }
        }

        let identity = SessionIdentity {
            uid,
            display_name: display_name.map(str::to_string),
            email: Some(email.to_string()),
        };
        tracing::info!(uid = %identity.uid, "Account created");
        self.publish(Some(identity.clone()));
        Ok(identity)
    }

    async fn sign_out(&self) -> Result<()> {
        self.check_online()?;
        if let Some(identity) = self.current() {
            tracing::info!(uid = %identity.uid, "Signed out");
        }
        self.publish(None);
        Ok(())
    }

    async fn update_display_name(&self, display_name: &str) -> Result<()> {
        self.check_online()?;
        let mut identity = self.signed_in()?;

        if let Some(email) = identity.email.as_deref() {
            if let Some(mut account) = self.accounts.get_mut(email) {
                account.display_name = Some(display_name.to_string());
            }
        }
        identity.display_name = Some(display_name.to_string());
        self.publish(Some(identity));
        Ok(())
    }

    async fn update_email(&self, email: &str) -> Result<()> {
        self.check_online()?;
        let mut identity = self.signed_in()?;
        if identity.email.as_deref() == Some(email) {
            return Ok(());
        }
        if self.accounts.contains_key(email) {
            return Err(AppError::Auth(AppError::EMAIL_EXISTS.to_string()));
        }

        if let Some(old) = identity.email.as_deref() {
            if let Some((_, account)) = self.accounts.remove(old) {
                self.accounts.insert(email.to_string(), account);
            }
        }
        identity.email = Some(email.to_string());
        self.publish(Some(identity));
        Ok(())
    }
}
