// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Home screen: the shared book list, the profile modal and the new-book
//! modal.

use crate::error::Result;
use crate::models::{Book, ProfileRecord, SessionIdentity, UserProfile};
use crate::screens::{BookCard, EditBookScreen};
use crate::services::{BookForm, CatalogService, ProfileForm, RecordMirror};
use crate::AppState;
use std::time::Duration;

pub struct HomeScreen {
    catalog: CatalogService,
    identity: SessionIdentity,
    books: RecordMirror<Vec<Book>>,
    profile: RecordMirror<ProfileRecord>,
    notice_duration: Duration,
    pub profile_form: ProfileForm,
    pub book_form: BookForm,
}

impl HomeScreen {
    /// Mount for the signed-in user, starting the book and profile mirrors.
    pub fn mount(state: &AppState, identity: SessionIdentity) -> Self {
        let catalog = state.catalog.clone();
        let books = catalog.mirror_books();
        let profile = catalog.mirror_profile(&identity.uid);
        let notice_duration = state.config.notice_duration;

        tracing::debug!(uid = %identity.uid, "Home screen mounted");

        Self {
            catalog,
            identity,
            books,
            profile,
            notice_duration,
            profile_form: ProfileForm::new(notice_duration),
            book_form: BookForm::new_book(notice_duration),
        }
    }

    /// Session identity, refreshed from the provider when available.
    pub fn identity(&self) -> SessionIdentity {
        self.catalog
            .session()
            .current()
            .filter(|current| current.uid == self.identity.uid)
            .unwrap_or_else(|| self.identity.clone())
    }

    /// Name shown in the header.
    pub fn display_name(&self) -> String {
        self.identity().display_name.unwrap_or_default()
    }

    // ─── Book List ───────────────────────────────────────────────

    /// Books received so far (empty until the first value arrives).
    pub fn books(&self) -> Vec<Book> {
        self.books.get().unwrap_or_default()
    }

    /// Whether the book list has not arrived yet.
    pub fn is_loading(&self) -> bool {
        self.books.get().is_none()
    }

    pub fn cards(&self) -> Vec<BookCard> {
        self.books().iter().map(BookCard::from).collect()
    }

    /// Wait until the book list satisfies `pred`.
    pub async fn wait_for_books(&mut self, pred: impl FnMut(&Vec<Book>) -> bool) -> Option<Vec<Book>> {
        self.books.wait_for(pred).await
    }

    /// Wait for the next change to the book list.
    pub async fn books_changed(&mut self) -> Option<Vec<Book>> {
        self.books.changed().await
    }

    pub async fn delete_book(&self, id: &str) -> Result<()> {
        self.catalog.delete_book(id).await
    }

    /// Open the edit screen for one book.
    pub fn edit_book(&self, id: &str) -> EditBookScreen {
        EditBookScreen::mount(&self.catalog, id, self.notice_duration)
    }

    // ─── New Book Modal ──────────────────────────────────────────

    pub fn open_new_book(&mut self) {
        self.book_form.open();
    }

    pub async fn save_new_book(&mut self) -> Result<String> {
        self.book_form.submit(&self.catalog).await
    }

    // ─── Profile Modal ───────────────────────────────────────────

    /// Profile as currently known: session fields merged with the record.
    pub fn profile(&self) -> UserProfile {
        let identity = self.identity();
        match self.profile.get() {
            Some(record) => UserProfile::with_record(&identity, &record),
            None => UserProfile::from_session(&identity),
        }
    }

    /// Wait until the stored profile record satisfies `pred`.
    pub async fn wait_for_profile(
        &mut self,
        pred: impl FnMut(&ProfileRecord) -> bool,
    ) -> Option<ProfileRecord> {
        self.profile.wait_for(pred).await
    }

    pub fn open_profile(&mut self) {
        let profile = self.profile();
        self.profile_form.open_with(profile);
    }

    pub async fn save_profile(&mut self) -> Result<()> {
        self.profile_form.submit(&self.catalog).await
    }

    pub async fn sign_out(&self) -> Result<()> {
        self.catalog.sign_out().await
    }
}
