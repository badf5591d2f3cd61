// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

use book_catalog::config::Config;
use book_catalog::db::MemoryStore;
use book_catalog::models::{BookFields, SessionIdentity};
use book_catalog::services::{LocalSession, SessionProvider};
use book_catalog::AppState;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

pub const EMAIL: &str = "reader@example.com";
pub const PASSWORD: &str = "correct-horse";

/// Check if emulator is available via environment variable.
#[allow(dead_code)]
pub fn emulator_available() -> bool {
    std::env::var("FIREBASE_EMULATOR_HOST").is_ok()
}

/// Skip test with message if emulator not available.
#[macro_export]
macro_rules! require_emulator {
    () => {
        if !crate::common::emulator_available() {
            eprintln!("⚠️  Skipping: FIREBASE_EMULATOR_HOST not set");
            return;
        }
    };
}

/// Offline app: in-memory store and session.
#[allow(dead_code)]
pub struct TestApp {
    pub state: AppState,
    pub store: MemoryStore,
    pub session: Arc<LocalSession>,
}

/// Create a test app with offline dependencies and nobody signed in.
#[allow(dead_code)]
pub fn create_test_app() -> TestApp {
    let store = MemoryStore::new();
    let session = Arc::new(LocalSession::new());
    let state = AppState::new(Config::default(), Arc::new(store.clone()), session.clone());
    TestApp {
        state,
        store,
        session,
    }
}

/// Create a test app with a registered, signed-in user.
#[allow(dead_code)]
pub async fn signed_in_app() -> (TestApp, SessionIdentity) {
    let app = create_test_app();
    let identity = app
        .session
        .sign_up(EMAIL, PASSWORD, Some("Reader"))
        .await
        .expect("Failed to create test account");
    (app, identity)
}

#[allow(dead_code)]
pub fn dune() -> BookFields {
    BookFields {
        name: "Dune".to_string(),
        author: "Herbert".to_string(),
        publication_date: "1965".to_string(),
        publisher: "Chilton".to_string(),
        genre: "SciFi".to_string(),
    }
}

/// Await with a bound so a missed notification fails instead of hanging.
#[allow(dead_code)]
pub async fn within<F: Future>(future: F) -> F::Output {
    tokio::time::timeout(Duration::from_secs(5), future)
        .await
        .expect("Timed out waiting for update")
}
