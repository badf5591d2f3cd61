//! User identity and profile models.

use serde::{Deserialize, Serialize};

use super::Editable;

/// The signed-in user as reported by the session provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionIdentity {
    /// Provider-assigned user id (also the key under `users`)
    pub uid: String,
    pub display_name: Option<String>,
    pub email: Option<String>,
}

/// Per-user record stored at `users/{uid}`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileRecord {
    #[serde(default, deserialize_with = "super::lenient_string")]
    pub first_name: String,
    #[serde(default, deserialize_with = "super::lenient_string")]
    pub last_name: String,
    /// Age as entered (free text)
    #[serde(default, deserialize_with = "super::lenient_string")]
    pub age: String,
}

/// Editable profile: session fields merged with the stored record.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UserProfile {
    /// Display name (session-owned)
    pub name: String,
    pub first_name: String,
    pub last_name: String,
    pub age: String,
    /// Email (session-owned)
    pub email: String,
}

impl UserProfile {
    /// Seed a profile from the session alone.
    pub fn from_session(identity: &SessionIdentity) -> Self {
        Self {
            name: identity.display_name.clone().unwrap_or_default(),
            email: identity.email.clone().unwrap_or_default(),
            ..Default::default()
        }
    }

    /// Merge a stored record over the session fields.
    pub fn with_record(identity: &SessionIdentity, record: &ProfileRecord) -> Self {
        Self {
            first_name: record.first_name.clone(),
            last_name: record.last_name.clone(),
            age: record.age.clone(),
            ..Self::from_session(identity)
        }
    }

    /// The part of the profile persisted under `users/{uid}`.
    pub fn record(&self) -> ProfileRecord {
        ProfileRecord {
            first_name: self.first_name.clone(),
            last_name: self.last_name.clone(),
            age: self.age.clone(),
        }
    }
}

impl Editable for UserProfile {
    const FIELDS: &'static [&'static str] = &["name", "firstName", "lastName", "age", "email"];

    fn field(&self, key: &str) -> Option<&str> {
        match key {
            "name" => Some(&self.name),
            "firstName" => Some(&self.first_name),
            "lastName" => Some(&self.last_name),
            "age" => Some(&self.age),
            "email" => Some(&self.email),
            _ => None,
        }
    }

    fn field_mut(&mut self, key: &str) -> Option<&mut String> {
        match key {
            "name" => Some(&mut self.name),
            "firstName" => Some(&mut self.first_name),
            "lastName" => Some(&mut self.last_name),
            "age" => Some(&mut self.age),
            "email" => Some(&mut self.email),
            _ => None,
        }
    }
}
