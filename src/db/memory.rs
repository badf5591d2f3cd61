// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! In-memory record store for tests and offline runs.
//!
//! Behaves like the realtime database from a client's point of view:
//! subscribers get the current value on registration and a new value
//! whenever a write changes what they see.

use super::{tree, PushIdGenerator, RecordStore, Snapshot, Subscription};
use crate::error::{AppError, Result};
use async_trait::async_trait;
use dashmap::DashMap;
use serde_json::Value;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tokio::sync::mpsc;

/// Failure a test can force onto every subsequent write.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InjectedFailure {
    /// Writes fail as if the network were down.
    Offline,
    /// Writes are rejected by security rules.
    PermissionDenied,
}

struct Watcher {
    path: String,
    tx: mpsc::UnboundedSender<Snapshot>,
}

#[derive(Default)]
struct Inner {
    root: Mutex<Value>,
    watchers: DashMap<u64, Watcher>,
    next_watcher_id: AtomicU64,
    failure: Mutex<Option<InjectedFailure>>,
    writes: AtomicUsize,
    ids: PushIdGenerator,
}

/// In-memory `RecordStore`.
#[derive(Clone, Default)]
pub struct MemoryStore {
    inner: Arc<Inner>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Force every following write to fail (or clear with `None`).
    pub fn inject_failure(&self, failure: Option<InjectedFailure>) {
        *self.inner.failure.lock().unwrap_or_else(|e| e.into_inner()) = failure;
    }

    /// Current value at a path.
    pub fn snapshot(&self, path: &str) -> Snapshot {
        let root = self.inner.root.lock().unwrap_or_else(|e| e.into_inner());
        tree::get(&root, path).cloned()
    }

    /// Number of writes that reached the tree.
    pub fn write_count(&self) -> usize {
        self.inner.writes.load(Ordering::SeqCst)
    }

    /// Number of live subscriptions.
    pub fn subscriber_count(&self) -> usize {
        self.inner.watchers.len()
    }

    fn check_failure(&self, path: &str) -> Result<()> {
        match *self.inner.failure.lock().unwrap_or_else(|e| e.into_inner()) {
            None => Ok(()),
            Some(InjectedFailure::Offline) => {
                Err(AppError::Database("network unavailable".to_string()))
            }
            Some(InjectedFailure::PermissionDenied) => {
                Err(AppError::PermissionDenied(path.to_string()))
            }
        }
    }

    /// Apply a mutation and notify every watcher whose view changed.
    fn apply(&self, path: &str, mutate: impl FnOnce(&mut Value)) -> Result<()> {
        self.check_failure(path)?;

        let mut root = self.inner.root.lock().unwrap_or_else(|e| e.into_inner());
        let affected: Vec<(u64, String, Snapshot)> = self
            .inner
            .watchers
            .iter()
            .filter(|w| tree::overlaps(&w.path, path))
            .map(|w| (*w.key(), w.path.clone(), tree::get(&root, &w.path).cloned()))
            .collect();

        mutate(&mut root);
        self.inner.writes.fetch_add(1, Ordering::SeqCst);

        let mut closed = Vec::new();
        for (id, watch_path, before) in affected {
            let after = tree::get(&root, &watch_path).cloned();
            if after == before {
                continue;
            }
            if let Some(watcher) = self.inner.watchers.get(&id) {
                if watcher.tx.send(after).is_err() {
                    closed.push(id);
                }
            }
        }
        drop(root);

        for id in closed {
            self.inner.watchers.remove(&id);
        }
        Ok(())
    }
}

#[async_trait]
impl RecordStore for MemoryStore {
    fn subscribe(&self, path: &str) -> Subscription {
        let (tx, rx) = mpsc::unbounded_channel();
        let id = self.inner.next_watcher_id.fetch_add(1, Ordering::SeqCst);

        // Register under the tree lock so no write slips between the
        // initial value and registration.
        {
            let root = self.inner.root.lock().unwrap_or_else(|e| e.into_inner());
            let _ = tx.send(tree::get(&root, path).cloned());
            self.inner.watchers.insert(
                id,
                Watcher {
                    path: path.to_string(),
                    tx,
                },
            );
        }
        tracing::debug!(path, subscription = id, "Subscribed");

        let inner = Arc::downgrade(&self.inner);
        let watched = path.to_string();
        Subscription::new(path, rx, move || {
            if let Some(inner) = inner.upgrade() {
                inner.watchers.remove(&id);
                tracing::debug!(path = %watched, subscription = id, "Unsubscribed");
            }
        })
    }

    async fn set(&self, path: &str, value: Value) -> Result<()> {
        self.apply(path, |root| tree::set(root, path, value))
    }

    async fn update(&self, path: &str, partial: Value) -> Result<()> {
        if !partial.is_object() {
            return Err(AppError::Database(format!(
                "update at {} requires an object",
                path
            )));
        }
        self.apply(path, |root| tree::merge(root, path, partial))
    }

    async fn remove(&self, path: &str) -> Result<()> {
        self.apply(path, |root| tree::set(root, path, Value::Null))
    }

    fn push_id(&self, collection: &str) -> Result<String> {
        let id = self.inner.ids.next_id()?;
        Ok(format!("{}/{}", collection.trim_end_matches('/'), id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn test_subscriber_gets_initial_value_then_changes() {
        let store = MemoryStore::new();
        store.set("books/a", json!({ "name": "Dune" })).await.unwrap();

        let mut sub = store.subscribe("books");
        assert_eq!(sub.next().await.unwrap(), Some(json!({ "a": { "name": "Dune" } })));

        store.remove("books/a").await.unwrap();
        assert_eq!(sub.next().await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_unrelated_write_does_not_notify() {
        let store = MemoryStore::new();
        let mut sub = store.subscribe("books");
        assert_eq!(sub.next().await.unwrap(), None);

        store.set("users/u1", json!({ "age": "30" })).await.unwrap();
        store.set("books/a", json!({ "name": "Emma" })).await.unwrap();

        assert_eq!(sub.next().await.unwrap(), Some(json!({ "a": { "name": "Emma" } })));
    }

    #[tokio::test]
    async fn test_drop_unregisters() {
        let store = MemoryStore::new();
        let sub = store.subscribe("books");
        assert_eq!(store.subscriber_count(), 1);
        drop(sub);
        assert_eq!(store.subscriber_count(), 0);
    }

    #[tokio::test]
    async fn test_injected_failure_writes_nothing() {
        let store = MemoryStore::new();
        store.inject_failure(Some(InjectedFailure::PermissionDenied));

        let err = store.set("books/a", json!({ "name": "x" })).await.unwrap_err();
        assert!(matches!(err, AppError::PermissionDenied(_)));
        assert_eq!(store.write_count(), 0);
        assert_eq!(store.snapshot("books"), None);
    }

    #[tokio::test]
    async fn test_push_id_is_child_path() {
        let store = MemoryStore::new();
        let path = store.push_id("books").unwrap();
        assert!(path.starts_with("books/"));
        assert_eq!(path.len(), "books/".len() + 20);
        assert_eq!(store.write_count(), 0);
    }
}
