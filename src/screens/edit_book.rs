// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Edit screen for a single book.

use crate::error::{AppError, Result};
use crate::models::{Book, BookFields};
use crate::services::{BookForm, CatalogService, Notice, RecordMirror};
use std::time::Duration;

pub struct EditBookScreen {
    id: String,
    catalog: CatalogService,
    book: RecordMirror<Book>,
    form: BookForm,
}

impl EditBookScreen {
    pub fn mount(catalog: &CatalogService, id: &str, notice_duration: Duration) -> Self {
        Self {
            id: id.to_string(),
            catalog: catalog.clone(),
            book: catalog.mirror_book(id),
            form: BookForm::edit_book(id, BookFields::default(), notice_duration),
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    /// Wait for the book to arrive and load it into the draft.
    ///
    /// Never resolves for an id with no data; callers bound it with a
    /// timeout.
    pub async fn wait_loaded(&mut self) -> Option<Book> {
        let book = self.book.wait_for(|_| true).await?;
        self.load(&book);
        Some(book)
    }

    /// Like `wait_loaded`, but gives up after `limit` with `NotFound`.
    pub async fn load_within(&mut self, limit: Duration) -> Result<Book> {
        match tokio::time::timeout(limit, self.wait_loaded()).await {
            Ok(Some(book)) => Ok(book),
            _ => Err(AppError::NotFound(self.book.path().to_string())),
        }
    }

    /// Pull a newer remote value into the draft. Returns whether the draft
    /// changed. Local edits are never overwritten.
    pub fn refresh(&mut self) -> bool {
        if !self.book.has_changed() {
            return false;
        }
        match self.book.mark_seen() {
            Some(book) => self.load(&book),
            None => false,
        }
    }

    fn load(&mut self, book: &Book) -> bool {
        if self.form.draft().is_dirty() || self.form.draft().value() == &book.fields {
            return false;
        }
        self.form.draft_mut().load(book.fields.clone());
        true
    }

    pub fn draft(&self) -> &BookFields {
        self.form.draft().value()
    }

    pub fn set_field(&mut self, key: &str, value: impl Into<String>) -> Result<()> {
        self.form.set_field(key, value)
    }

    pub fn notice(&self) -> Option<&Notice> {
        self.form.notice()
    }

    /// Whether the edit was saved and the screen should be popped.
    pub fn is_done(&self) -> bool {
        !self.form.is_open()
    }

    pub async fn save(&mut self) -> Result<()> {
        self.form.submit(&self.catalog).await.map(|_| ())
    }
}
