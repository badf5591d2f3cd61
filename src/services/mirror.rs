// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Record mirrors: live, typed local copies of remote paths.
//!
//! A mirror owns one store subscription and one background task. Every
//! value the subscription delivers is decoded and published on a watch
//! channel. Dropping the mirror stops the task and releases the
//! subscription.

use crate::db::{RecordStore, Snapshot};
use crate::error::{AppError, Result};
use crate::models::{Book, ProfileRecord};
use serde_json::Value;
use std::cmp::Ordering;
use tokio::sync::watch;
use tokio::task::JoinHandle;

/// Live, decoded copy of a remote path.
pub struct RecordMirror<T> {
    path: String,
    rx: watch::Receiver<Option<T>>,
    task: JoinHandle<()>,
}

impl<T> RecordMirror<T>
where
    T: Clone + PartialEq + Send + Sync + 'static,
{
    /// Subscribe to `path` and keep the decoded value current.
    ///
    /// `decode` returns `Ok(None)` when the payload means "no data"; the
    /// published value is then left as it was. Decode errors are logged and
    /// likewise leave the value as it was.
    pub fn spawn<F>(store: &dyn RecordStore, path: &str, decode: F) -> Self
    where
        F: Fn(Snapshot) -> Result<Option<T>> + Send + Sync + 'static,
    {
        let mut subscription = store.subscribe(path);
        let (tx, rx) = watch::channel(None);
        let watched = path.to_string();

        let task = tokio::spawn(async move {
            while let Some(snapshot) = subscription.next().await {
                match decode(snapshot) {
                    Ok(Some(record)) => {
                        tx.send_if_modified(|current| {
                            if current.as_ref() == Some(&record) {
                                return false;
                            }
                            *current = Some(record);
                            true
                        });
                    }
                    Ok(None) => tracing::debug!(path = %watched, "No data yet"),
                    Err(e) => {
                        tracing::warn!(path = %watched, error = %e, "Ignoring undecodable value")
                    }
                }
            }
            tracing::debug!(path = %watched, "Mirror stream ended");
        });

        Self {
            path: path.to_string(),
            rx,
            task,
        }
    }

    /// Mirrored path.
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Latest decoded value, if any has arrived.
    pub fn get(&self) -> Option<T> {
        self.rx.borrow().clone()
    }

    /// A receiver that observes every published value.
    pub fn watch(&self) -> watch::Receiver<Option<T>> {
        self.rx.clone()
    }

    /// Whether a value was published since the last `mark_seen`/`changed`.
    pub fn has_changed(&self) -> bool {
        self.rx.has_changed().unwrap_or(false)
    }

    /// Mark the current value as seen and return it.
    pub fn mark_seen(&mut self) -> Option<T> {
        self.rx.borrow_and_update().clone()
    }

    /// Wait for the next published value.
    ///
    /// Returns `None` if the mirror can no longer publish.
    pub async fn changed(&mut self) -> Option<T> {
        self.rx.changed().await.ok()?;
        self.rx.borrow_and_update().clone()
    }

    /// Wait until a value satisfying `pred` is published (or already is).
    pub async fn wait_for(&mut self, mut pred: impl FnMut(&T) -> bool) -> Option<T> {
        self.rx
            .wait_for(|value| value.as_ref().is_some_and(&mut pred))
            .await
            .ok()
            .and_then(|value| (*value).clone())
    }
}

impl<T> Drop for RecordMirror<T> {
    fn drop(&mut self) {
        self.task.abort();
    }
}

/// Decode the books collection into a list in the database's key order.
///
/// Push ids sort chronologically, so this is creation order and does not
/// shift when unrelated children change. An absent collection is an empty
/// list. Malformed children are skipped.
pub fn decode_books(snapshot: Snapshot) -> Result<Option<Vec<Book>>> {
    let children = match snapshot {
        None => return Ok(Some(Vec::new())),
        Some(Value::Object(children)) => children,
        Some(other) => {
            return Err(AppError::Decode(format!(
                "books: expected an object, got {}",
                other
            )))
        }
    };

    let mut books: Vec<Book> = children
        .into_iter()
        .filter_map(|(id, value)| match Book::from_value(&id, value) {
            Ok(book) => Some(book),
            Err(e) => {
                tracing::warn!(book_id = %id, error = %e, "Skipping malformed book");
                None
            }
        })
        .collect();
    books.sort_by(|a, b| key_order(&a.id, &b.id));
    Ok(Some(books))
}

/// Order of child keys as the database iterates them: keys that parse as
/// 32-bit integers come first in numeric order, then the rest as strings.
pub fn key_order(a: &str, b: &str) -> Ordering {
    match (a.parse::<i32>(), b.parse::<i32>()) {
        (Ok(x), Ok(y)) => x.cmp(&y).then_with(|| a.cmp(b)),
        (Ok(_), Err(_)) => Ordering::Less,
        (Err(_), Ok(_)) => Ordering::Greater,
        (Err(_), Err(_)) => a.cmp(b),
    }
}

/// Decoder for a single book; the id comes from the route, not the payload.
pub fn book_decoder(id: &str) -> impl Fn(Snapshot) -> Result<Option<Book>> + Send + Sync + 'static {
    let id = id.to_string();
    move |snapshot| snapshot.map(|value| Book::from_value(&id, value)).transpose()
}

/// Decode a user's profile record.
pub fn decode_profile(snapshot: Snapshot) -> Result<Option<ProfileRecord>> {
    snapshot
        .map(|value| {
            serde_json::from_value(value).map_err(|e| AppError::Decode(format!("profile: {}", e)))
        })
        .transpose()
}
