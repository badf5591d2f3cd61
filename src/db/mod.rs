// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Remote record store (Firebase Realtime Database) and its in-memory twin.

pub mod memory;
pub mod push_id;
pub mod realtime;
pub mod tree;

pub use memory::{InjectedFailure, MemoryStore};
pub use push_id::PushIdGenerator;
pub use realtime::RealtimeDb;

use crate::error::Result;
use async_trait::async_trait;
use serde_json::Value;
use tokio::sync::mpsc;

/// Collection names as constants.
pub mod collections {
    pub const USERS: &str = "users";
    pub const BOOKS: &str = "books";
}

/// Path of a single book.
pub fn book_path(id: &str) -> String {
    format!("{}/{}", collections::BOOKS, id)
}

/// Path of a user's profile record.
pub fn user_path(uid: &str) -> String {
    format!("{}/{}", collections::USERS, uid)
}

/// Value at a path at one point in time. `None` means no data.
pub type Snapshot = Option<Value>;

/// Live subscription to a path.
///
/// Yields the initial value and then every change. Dropping the
/// subscription unregisters it from the store.
pub struct Subscription {
    path: String,
    rx: mpsc::UnboundedReceiver<Snapshot>,
    on_drop: Option<Box<dyn FnOnce() + Send + Sync>>,
}

impl Subscription {
    pub fn new(
        path: impl Into<String>,
        rx: mpsc::UnboundedReceiver<Snapshot>,
        on_drop: impl FnOnce() + Send + Sync + 'static,
    ) -> Self {
        Self {
            path: path.into(),
            rx,
            on_drop: Some(Box::new(on_drop)),
        }
    }

    /// Subscribed path.
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Wait for the next value. Returns `None` once the store ends the stream.
    pub async fn next(&mut self) -> Option<Snapshot> {
        self.rx.recv().await
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(unregister) = self.on_drop.take() {
            unregister();
        }
    }
}

impl std::fmt::Debug for Subscription {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subscription")
            .field("path", &self.path)
            .finish_non_exhaustive()
    }
}

/// Path-addressed document store with live subscriptions.
///
/// Concurrent writes to the same path are last-write-wins.
#[async_trait]
pub trait RecordStore: Send + Sync {
    /// Register a live subscription. Returns immediately; values arrive later.
    fn subscribe(&self, path: &str) -> Subscription;

    /// Replace the value at `path`.
    async fn set(&self, path: &str, value: Value) -> Result<()>;

    /// Merge the children of `partial` into the value at `path`.
    async fn update(&self, path: &str, partial: Value) -> Result<()>;

    /// Remove the value at `path`. Removing a missing path is a no-op.
    async fn remove(&self, path: &str) -> Result<()>;

    /// Generate a new unique child path under `collection` without writing.
    fn push_id(&self, collection: &str) -> Result<String>;
}

/// Source of the bearer token attached to store requests.
#[async_trait]
pub trait TokenSource: Send + Sync {
    /// Current id token, or `None` when signed out.
    async fn id_token(&self) -> Result<Option<String>>;
}
