// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Catalog operations: book writes, profile updates and mirrors.
//!
//! Every write goes straight to the store. Local state is never patched
//! here; screens see the result through their mirrors. Concurrent writers
//! are last-write-wins.

use crate::db::{self, collections, RecordStore};
use crate::error::{AppError, Result};
use crate::models::{Book, BookFields, ProfileRecord, UserProfile};
use crate::services::mirror::{self, RecordMirror};
use crate::services::SessionProvider;
use std::sync::Arc;

/// High-level catalog service shared by all screens.
#[derive(Clone)]
pub struct CatalogService {
    store: Arc<dyn RecordStore>,
    session: Arc<dyn SessionProvider>,
}

impl CatalogService {
    pub fn new(store: Arc<dyn RecordStore>, session: Arc<dyn SessionProvider>) -> Self {
        Self { store, session }
    }

    pub fn session(&self) -> &Arc<dyn SessionProvider> {
        &self.session
    }

    // ─── Mirrors ─────────────────────────────────────────────────

    /// Mirror the whole books collection.
    pub fn mirror_books(&self) -> RecordMirror<Vec<Book>> {
        RecordMirror::spawn(self.store.as_ref(), collections::BOOKS, mirror::decode_books)
    }

    /// Mirror one book.
    pub fn mirror_book(&self, id: &str) -> RecordMirror<Book> {
        RecordMirror::spawn(
            self.store.as_ref(),
            &db::book_path(id),
            mirror::book_decoder(id),
        )
    }

    /// Mirror a user's profile record.
    pub fn mirror_profile(&self, uid: &str) -> RecordMirror<ProfileRecord> {
        RecordMirror::spawn(
            self.store.as_ref(),
            &db::user_path(uid),
            mirror::decode_profile,
        )
    }

    // ─── Book Operations ─────────────────────────────────────────

    /// Create a book under a freshly generated id. Returns the id.
    pub async fn create_book(&self, fields: &BookFields) -> Result<String> {
        let path = self.store.push_id(collections::BOOKS)?;
        let id = path
            .rsplit('/')
            .next()
            .unwrap_or_default()
            .to_string();

        self.store.set(&path, to_value(fields)?).await?;
        tracing::info!(book_id = %id, "Book created");
        Ok(id)
    }

    /// Merge the full edited field-set into an existing book.
    pub async fn update_book(&self, id: &str, fields: &BookFields) -> Result<()> {
        self.store.update(&db::book_path(id), to_value(fields)?).await?;
        tracing::info!(book_id = %id, "Book updated");
        Ok(())
    }

    /// Remove a book. Removing an id that does not exist succeeds.
    pub async fn delete_book(&self, id: &str) -> Result<()> {
        match self.store.remove(&db::book_path(id)).await {
            Ok(()) => {
                tracing::info!(book_id = %id, "Book deleted");
                Ok(())
            }
            Err(e) => {
                tracing::error!(book_id = %id, error = %e, "Book deletion failed");
                Err(e)
            }
        }
    }

    // ─── Profile Operations ──────────────────────────────────────

    /// Write a profile: display name and email to the session, then the
    /// remaining fields to `users/{uid}`.
    ///
    /// The steps run in order and are not rolled back: if the record write
    /// fails, the session changes stay.
    pub async fn update_profile(&self, profile: &UserProfile) -> Result<()> {
        let identity = self.session.current().ok_or(AppError::Unauthorized)?;

        self.session
            .update_display_name(&profile.name)
            .await
            .inspect_err(|e| {
                tracing::error!(uid = %identity.uid, step = "display_name", error = %e, "Profile update failed")
            })?;

        if identity.email.as_deref() != Some(profile.email.as_str()) {
            self.session.update_email(&profile.email).await.inspect_err(|e| {
                tracing::error!(uid = %identity.uid, step = "email", error = %e, "Profile update failed")
            })?;
        }

        self.store
            .update(&db::user_path(&identity.uid), to_value(&profile.record())?)
            .await
            .inspect_err(|e| {
                tracing::error!(uid = %identity.uid, step = "record", error = %e, "Profile update failed")
            })?;

        tracing::info!(uid = %identity.uid, "Profile updated");
        Ok(())
    }

    /// Sign out of the current session.
    pub async fn sign_out(&self) -> Result<()> {
        self.session
            .sign_out()
            .await
            .inspect_err(|e| tracing::error!(error = %e, "Sign-out failed"))
    }
}

fn to_value<T: serde::Serialize>(record: &T) -> Result<serde_json::Value> {
    serde_json::to_value(record).map_err(|e| AppError::Internal(e.into()))
}
