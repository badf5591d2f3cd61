// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Data models for the application.

pub mod book;
pub mod user;

pub use book::{Book, BookFields};
pub use user::{ProfileRecord, SessionIdentity, UserProfile};

use serde::{Deserialize, Deserializer};
use serde_json::Value;

/// A flat record whose fields can be edited by key.
///
/// Keys are the camelCase names the record is stored under remotely.
pub trait Editable: Clone + Default + PartialEq {
    /// All editable keys, in display order.
    const FIELDS: &'static [&'static str];

    /// Read a field by key.
    fn field(&self, key: &str) -> Option<&str>;

    /// Mutable access to a field by key.
    fn field_mut(&mut self, key: &str) -> Option<&mut String>;
}

/// Deserialize a free-text field written by any client.
///
/// Numbers and booleans are kept as their text, `null` is empty, and nested
/// values are kept as JSON text.
pub(crate) fn lenient_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::Null => String::new(),
        Value::String(s) => s,
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        other => other.to_string(),
    })
}
