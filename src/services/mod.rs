// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Services module - session, synchronization and form logic.

pub mod catalog;
pub mod firebase_auth;
pub mod forms;
pub mod mirror;
pub mod session;

pub use catalog::CatalogService;
pub use firebase_auth::FirebaseAuth;
pub use forms::{BookForm, BookTarget, Draft, Notice, ProfileForm, Severity, SESSION_EXPIRED};
pub use mirror::RecordMirror;
pub use session::{LocalSession, SessionProvider};
