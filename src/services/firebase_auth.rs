// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Firebase Authentication over the Identity Toolkit REST API.
//!
//! Handles:
//! - Email/password sign-in and sign-up
//! - Display name and email updates
//! - Id token refresh through the Secure Token API when close to expiry

use crate::config::Config;
use crate::db::TokenSource;
use crate::error::{AppError, Result};
use crate::models::SessionIdentity;
use crate::services::SessionProvider;
use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::{watch, Mutex, RwLock};

/// Margin before id token expiration when we proactively refresh (5 minutes).
const TOKEN_REFRESH_MARGIN_SECS: i64 = 5 * 60;

/// Tokens for the signed-in user.
#[derive(Clone)]
struct SessionTokens {
    uid: String,
    id_token: String,
    refresh_token: String,
    expires_at: DateTime<Utc>,
}

/// Firebase Authentication client.
pub struct FirebaseAuth {
    http: reqwest::Client,
    api_key: String,
    auth_url: String,
    token_url: String,
    tokens: RwLock<Option<SessionTokens>>,
    /// Serializes token refreshes.
    refresh_lock: Mutex<()>,
    identity: watch::Sender<Option<SessionIdentity>>,
}

impl FirebaseAuth {
    pub fn new(config: &Config) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(config.http_timeout)
            .build()
            .map_err(|e| AppError::Auth(format!("Failed to build HTTP client: {}", e)))?;
        let (identity, _) = watch::channel(None);

        Ok(Self {
            http,
            api_key: config.api_key.clone(),
            auth_url: config.auth_url.trim_end_matches('/').to_string(),
            token_url: config.token_url.trim_end_matches('/').to_string(),
            tokens: RwLock::new(None),
            refresh_lock: Mutex::new(()),
            identity,
        })
    }

    /// POST a JSON body to an Identity Toolkit method.
    async fn call<B: Serialize, T: for<'de> Deserialize<'de>>(
        &self,
        method: &str,
        body: &B,
    ) -> Result<T> {
        let url = format!("{}/accounts:{}", self.auth_url, method);
        let response = self
            .http
            .post(&url)
            .query(&[("key", self.api_key.as_str())])
            .json(body)
            .send()
            .await
            .map_err(|e| AppError::Auth(format!("NETWORK_REQUEST_FAILED: {}", e)))?;

        check_response_json(response).await
    }

    /// Store fresh tokens and publish the identity.
    async fn establish(&self, account: AccountResponse) -> Result<SessionIdentity> {
        let expires_at = expiry_from(&account.expires_in)?;
        let identity = SessionIdentity {
            uid: account.local_id.clone(),
            display_name: account.display_name.filter(|n| !n.is_empty()),
            email: account.email,
        };

        *self.tokens.write().await = Some(SessionTokens {
            uid: account.local_id,
            id_token: account.id_token,
            refresh_token: account.refresh_token,
            expires_at,
        });
        self.identity.send_replace(Some(identity.clone()));
        Ok(identity)
    }

    /// Id token of the signed-in user, refreshing it first if it is close
    /// to expiring.
    async fn fresh_id_token(&self) -> Result<Option<String>> {
        if let Some(tokens) = self.tokens.read().await.as_ref() {
            if !needs_refresh(tokens.expires_at) {
                return Ok(Some(tokens.id_token.clone()));
            }
        } else {
            return Ok(None);
        }

        let _guard = self.refresh_lock.lock().await;

        // Re-check after acquiring the lock; another caller may have refreshed.
        let Some(current) = self.tokens.read().await.clone() else {
            return Ok(None);
        };
        if !needs_refresh(current.expires_at) {
            return Ok(Some(current.id_token));
        }

        tracing::debug!(uid = %current.uid, "Refreshing id token");
        let url = format!("{}/token", self.token_url);
        let response = self
            .http
            .post(&url)
            .query(&[("key", self.api_key.as_str())])
            .form(&[
                ("grant_type", "refresh_token"),
                ("refresh_token", current.refresh_token.as_str()),
            ])
            .send()
            .await
            .map_err(|e| AppError::Auth(format!("NETWORK_REQUEST_FAILED: {}", e)))?;
        let refreshed: RefreshResponse = check_response_json(response).await?;

        let tokens = SessionTokens {
            uid: refreshed.user_id,
            id_token: refreshed.id_token.clone(),
            refresh_token: refreshed.refresh_token,
            expires_at: expiry_from(&refreshed.expires_in)?,
        };
        *self.tokens.write().await = Some(tokens);
        Ok(Some(refreshed.id_token))
    }

    async fn require_id_token(&self) -> Result<String> {
        self.fresh_id_token().await?.ok_or(AppError::Unauthorized)
    }
}

fn needs_refresh(expires_at: DateTime<Utc>) -> bool {
    expires_at - Utc::now() < Duration::seconds(TOKEN_REFRESH_MARGIN_SECS)
}

/// The API reports lifetimes as a string of seconds.
fn expiry_from(expires_in: &str) -> Result<DateTime<Utc>> {
    let secs: i64 = expires_in
        .parse()
        .map_err(|_| AppError::Auth(format!("Invalid token lifetime: {}", expires_in)))?;
    Ok(Utc::now() + Duration::seconds(secs))
}

/// Check response status and parse the JSON body.
///
/// Identity Toolkit errors carry a machine-readable code in
/// `error.message` (e.g. `EMAIL_EXISTS`), which becomes the error text.
async fn check_response_json<T: for<'de> Deserialize<'de>>(response: reqwest::Response) -> Result<T> {
    if !response.status().is_success() {
        let status = response.status();
        let body = response.text().await.unwrap_or_default();
        let code = serde_json::from_str::<ErrorResponse>(&body)
            .map(|e| e.error.message)
            .unwrap_or_else(|_| format!("HTTP {}: {}", status, body));
        return Err(AppError::Auth(code));
    }

    response
        .json()
        .await
        .map_err(|e| AppError::Auth(format!("JSON parse error: {}", e)))
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct PasswordRequest<'a> {
    email: &'a str,
    password: &'a str,
    return_secure_token: bool,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct UpdateRequest<'a> {
    id_token: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    display_name: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    email: Option<&'a str>,
    return_secure_token: bool,
}

/// Sign-in, sign-up and update responses.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AccountResponse {
    local_id: String,
    email: Option<String>,
    display_name: Option<String>,
    id_token: String,
    refresh_token: String,
    expires_in: String,
}

/// Update response when no new token is issued.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct UpdateResponse {
    email: Option<String>,
    display_name: Option<String>,
    id_token: Option<String>,
    refresh_token: Option<String>,
    expires_in: Option<String>,
}

/// Secure Token refresh response (snake_case on the wire).
#[derive(Debug, Deserialize)]
struct RefreshResponse {
    id_token: String,
    refresh_token: String,
    expires_in: String,
    user_id: String,
}

#[derive(Debug, Deserialize)]
struct ErrorResponse {
    error: ErrorBody,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: String,
}

#[async_trait]
impl TokenSource for FirebaseAuth {
    async fn id_token(&self) -> Result<Option<String>> {
        self.fresh_id_token().await
    }
}

#[async_trait]
impl SessionProvider for FirebaseAuth {
    fn current(&self) -> Option<SessionIdentity> {
        self.identity.borrow().clone()
    }

    fn subscribe(&self) -> watch::Receiver<Option<SessionIdentity>> {
        self.identity.subscribe()
    }

    async fn sign_in(&self, email: &str, password: &str) -> Result<SessionIdentity> {
        let account: AccountResponse = self
            .call(
                "signInWithPassword",
                &PasswordRequest {
                    email,
                    password,
                    return_secure_token: true,
                },
            )
            .await?;
        let identity = self.establish(account).await?;
        tracing::info!(uid = %identity.uid, "Signed in");
        Ok(identity)
    }

    async fn sign_up(
        &self,
        email: &str,
        password: &str,
        display_name: Option<&str>,
    ) -> Result<SessionIdentity> {
        let account: AccountResponse = self
            .call(
                "signUp",
                &PasswordRequest {
                    email,
                    password,
                    return_secure_token: true,
                },
            )
            .await?;
        let identity = self.establish(account).await?;
        tracing::info!(uid = %identity.uid, "Account created");

        if let Some(name) = display_name {
            self.update_display_name(name).await?;
        }
        Ok(self.current().unwrap_or(identity))
    }

    async fn sign_out(&self) -> Result<()> {
        let previous = self.tokens.write().await.take();
        if let Some(tokens) = previous {
            tracing::info!(uid = %tokens.uid, "Signed out");
        }
        self.identity.send_replace(None);
        Ok(())
    }

    async fn update_display_name(&self, display_name: &str) -> Result<()> {
        let id_token = self.require_id_token().await?;
        let updated: UpdateResponse = self
            .call(
                "update",
                &UpdateRequest {
                    id_token: &id_token,
                    display_name: Some(display_name),
                    email: None,
                    return_secure_token: false,
                },
            )
            .await?;

        self.identity.send_modify(|identity| {
            if let Some(identity) = identity.as_mut() {
                identity.display_name = updated.display_name.clone();
            }
        });
        Ok(())
    }

    async fn update_email(&self, email: &str) -> Result<()> {
        let id_token = self.require_id_token().await?;
        let updated: UpdateResponse = self
            .call(
                "update",
                &UpdateRequest {
                    id_token: &id_token,
                    display_name: None,
                    email: Some(email),
                    return_secure_token: true,
                },
            )
            .await?;

        // Changing the email rotates the session tokens.
        if let (Some(id_token), Some(refresh_token), Some(expires_in)) = (
            updated.id_token,
            updated.refresh_token,
            updated.expires_in.as_deref(),
        ) {
            let expires_at = expiry_from(expires_in)?;
            if let Some(tokens) = self.tokens.write().await.as_mut() {
                tokens.id_token = id_token;
                tokens.refresh_token = refresh_token;
                tokens.expires_at = expires_at;
            }
        }

        self.identity.send_modify(|identity| {
            if let Some(identity) = identity.as_mut() {
                identity.email = updated.email.clone();
            }
        });
        tracing::info!("Email updated");
        Ok(())
    }
}
