// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Application error types shared by the store, session and screen layers.

/// Application error type.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Authentication required")]
    Unauthorized,

    #[error("Authentication error: {0}")]
    Auth(String),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Permission denied: {0}")]
    PermissionDenied(String),

    #[error("Malformed record: {0}")]
    Decode(String),

    #[error("Unknown field: {0}")]
    UnknownField(String),

    #[error("Resource not found: {0}")]
    NotFound(String),

    #[error("Internal error: {0}")]
    Internal(#[from] anyhow::Error),
}

/// Broad error classes. Logged with every reported failure and used by the
/// client to pick its exit message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorClass {
    /// Invalid credential, email already registered, network unavailable.
    Auth,
    /// Permission denied, network unavailable.
    Database,
    /// Malformed or missing remote payload.
    Decode,
    Internal,
}

impl AppError {
    /// Identity Toolkit code for an email that is already registered.
    pub const EMAIL_EXISTS: &'static str = "EMAIL_EXISTS";
    /// Identity Toolkit code for a wrong email/password pair.
    pub const INVALID_LOGIN_CREDENTIALS: &'static str = "INVALID_LOGIN_CREDENTIALS";
    /// Identity Toolkit code for an expired or revoked session.
    pub const TOKEN_EXPIRED: &'static str = "TOKEN_EXPIRED";

    /// Classify this error.
    pub fn class(&self) -> ErrorClass {
        match self {
            AppError::Unauthorized | AppError::Auth(_) => ErrorClass::Auth,
            AppError::Database(_) | AppError::PermissionDenied(_) | AppError::NotFound(_) => {
                ErrorClass::Database
            }
            AppError::Decode(_) | AppError::UnknownField(_) => ErrorClass::Decode,
            AppError::Internal(_) => ErrorClass::Internal,
        }
    }

    /// Check if this is a rejected email/password sign-in.
    pub fn is_credential_error(&self) -> bool {
        match self {
            AppError::Auth(msg) => {
                msg.contains(Self::INVALID_LOGIN_CREDENTIALS)
                    || msg.contains("INVALID_PASSWORD")
                    || msg.contains("EMAIL_NOT_FOUND")
            }
            _ => false,
        }
    }

    /// Check if a sign-up or email change hit an address already in use.
    pub fn is_email_in_use(&self) -> bool {
        matches!(self, AppError::Auth(msg) if msg.contains(Self::EMAIL_EXISTS))
    }

    /// Check if the session must be re-established before retrying.
    pub fn is_session_expired(&self) -> bool {
        match self {
            AppError::Unauthorized => true,
            AppError::Auth(msg) => {
                msg.contains(Self::TOKEN_EXPIRED) || msg.contains("CREDENTIAL_TOO_OLD")
            }
            _ => false,
        }
    }
}

/// Result type alias used across the crate.
pub type Result<T> = std::result::Result<T, AppError>;
