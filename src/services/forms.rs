// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Form controllers: editable drafts written through to the store.
//!
//! A form is either open (editing) or closed. A successful submit closes
//! it and discards the draft; a failed submit leaves it open with an error
//! notice. Every form reports failures visibly.

use crate::error::{AppError, Result};
use crate::models::{BookFields, Editable, UserProfile};
use crate::services::CatalogService;
use std::time::Duration;

/// Notice shown when a submit needs the user to sign in again.
pub const SESSION_EXPIRED: &str = "Session expired, please sign in again";

/// Severity of a transient notice.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Success,
    Error,
}

impl Severity {
    /// Background color the notice is shown with.
    pub fn color(self) -> &'static str {
        match self {
            Severity::Success => "green",
            Severity::Error => "red",
        }
    }
}

/// Transient user-visible message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub message: String,
    pub severity: Severity,
    /// How long the notice stays up before it is dismissed.
    pub duration: Duration,
}

impl Notice {
    pub fn success(message: impl Into<String>, duration: Duration) -> Self {
        Self {
            message: message.into(),
            severity: Severity::Success,
            duration,
        }
    }

    pub fn error(message: impl Into<String>, duration: Duration) -> Self {
        Self {
            message: message.into(),
            severity: Severity::Error,
            duration,
        }
    }
}

/// Local editable copy of a record.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Draft<T: Editable> {
    value: T,
    dirty: bool,
}

impl<T: Editable> Draft<T> {
    pub fn new(value: T) -> Self {
        Self {
            value,
            dirty: false,
        }
    }

    /// Replace one field, keeping the others.
    pub fn set_field(&mut self, key: &str, value: impl Into<String>) -> Result<()> {
        let slot = self
            .value
            .field_mut(key)
            .ok_or_else(|| AppError::UnknownField(key.to_string()))?;
        *slot = value.into();
        self.dirty = true;
        Ok(())
    }

    pub fn field(&self, key: &str) -> Option<&str> {
        self.value.field(key)
    }

    pub fn value(&self) -> &T {
        &self.value
    }

    /// Whether any field was set since the draft was loaded.
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Replace the whole draft with a fresh copy.
    pub fn load(&mut self, value: T) {
        self.value = value;
        self.dirty = false;
    }
}

/// Which book a form writes to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BookTarget {
    /// A new book; the id is generated on submit.
    New,
    Existing(String),
}

/// Form controller for adding or editing a book.
#[derive(Debug, Clone)]
pub struct BookForm {
    target: BookTarget,
    draft: Draft<BookFields>,
    open: bool,
    notice: Option<Notice>,
    notice_duration: Duration,
}

impl BookForm {
    /// A closed new-book form.
    pub fn new_book(notice_duration: Duration) -> Self {
        Self {
            target: BookTarget::New,
            draft: Draft::default(),
            open: false,
            notice: None,
            notice_duration,
        }
    }

    /// An open form editing an existing book.
    pub fn edit_book(id: impl Into<String>, fields: BookFields, notice_duration: Duration) -> Self {
        Self {
            target: BookTarget::Existing(id.into()),
            draft: Draft::new(fields),
            open: true,
            notice: None,
            notice_duration,
        }
    }

    pub fn target(&self) -> &BookTarget {
        &self.target
    }

    pub fn draft(&self) -> &Draft<BookFields> {
        &self.draft
    }

    pub fn draft_mut(&mut self) -> &mut Draft<BookFields> {
        &mut self.draft
    }

    pub fn set_field(&mut self, key: &str, value: impl Into<String>) -> Result<()> {
        self.draft.set_field(key, value)
    }

    pub fn is_open(&self) -> bool {
        self.open
    }

    pub fn open(&mut self) {
        self.open = true;
    }

    /// Close without saving; the draft is discarded.
    pub fn close(&mut self) {
        self.open = false;
        self.draft.load(BookFields::default());
    }

    pub fn notice(&self) -> Option<&Notice> {
        self.notice.as_ref()
    }

    pub fn dismiss_notice(&mut self) {
        self.notice = None;
    }

    /// Write the draft. Returns the id of the written book.
    pub async fn submit(&mut self, catalog: &CatalogService) -> Result<String> {
        let fields = self.draft.value().clone();
        let result = match &self.target {
            BookTarget::New => catalog.create_book(&fields).await,
            BookTarget::Existing(id) => catalog.update_book(id, &fields).await.map(|_| id.clone()),
        };

        match result {
            Ok(id) => {
                if self.target == BookTarget::New {
                    self.notice = Some(Notice::success("Book added", self.notice_duration));
                    self.draft.load(BookFields::default());
                } else {
                    self.notice = None;
                    self.draft.load(fields);
                }
                self.open = false;
                Ok(id)
            }
            Err(e) => {
                tracing::error!(book = ?self.target, class = ?e.class(), error = %e, "Saving book failed");
                let message = match self.target {
                    _ if e.is_session_expired() => SESSION_EXPIRED,
                    BookTarget::New => "Error adding book",
                    BookTarget::Existing(_) => "Error updating book",
                };
                self.notice = Some(Notice::error(message, self.notice_duration));
                Err(e)
            }
        }
    }
}

/// Form controller for the signed-in user's profile.
#[derive(Debug, Clone)]
pub struct ProfileForm {
    draft: Draft<UserProfile>,
    open: bool,
    notice: Option<Notice>,
    notice_duration: Duration,
}

impl ProfileForm {
    pub fn new(notice_duration: Duration) -> Self {
        Self {
            draft: Draft::default(),
            open: false,
            notice: None,
            notice_duration,
        }
    }

    /// Open the form seeded with the current profile.
    pub fn open_with(&mut self, profile: UserProfile) {
        self.draft.load(profile);
        self.notice = None;
        self.open = true;
    }

    pub fn close(&mut self) {
        self.open = false;
    }

    pub fn is_open(&self) -> bool {
        self.open
    }

    pub fn draft(&self) -> &Draft<UserProfile> {
        &self.draft
    }

    pub fn set_field(&mut self, key: &str, value: impl Into<String>) -> Result<()> {
        self.draft.set_field(key, value)
    }

    pub fn notice(&self) -> Option<&Notice> {
        self.notice.as_ref()
    }

    pub async fn submit(&mut self, catalog: &CatalogService) -> Result<()> {
        match catalog.update_profile(self.draft.value()).await {
            Ok(()) => {
                self.notice = None;
                self.open = false;
                Ok(())
            }
            Err(e) => {
                tracing::warn!(class = ?e.class(), error = %e, "Profile form submit failed");
                let message = if e.is_session_expired() {
                    SESSION_EXPIRED
                } else if e.is_email_in_use() {
                    "That email is already in use"
                } else {
                    "Error updating profile"
                };
                self.notice = Some(Notice::error(message, self.notice_duration));
                Err(e)
            }
        }
    }
}
