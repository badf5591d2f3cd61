// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Book catalog: a shared list of books kept in a realtime database.
//!
//! This crate provides the client side: session handling, live mirrors of
//! remote records, form controllers that write drafts back, and the
//! screens that tie them together.

pub mod config;
pub mod db;
pub mod error;
pub mod models;
pub mod screens;
pub mod services;

use config::Config;
use db::RecordStore;
use services::{CatalogService, SessionProvider};
use std::sync::Arc;

/// Shared application state, handed to every screen.
pub struct AppState {
    pub config: Config,
    pub store: Arc<dyn RecordStore>,
    pub session: Arc<dyn SessionProvider>,
    pub catalog: CatalogService,
}

impl AppState {
    pub fn new(
        config: Config,
        store: Arc<dyn RecordStore>,
        session: Arc<dyn SessionProvider>,
    ) -> Self {
        let catalog = CatalogService::new(store.clone(), session.clone());
        Self {
            config,
            store,
            session,
            catalog,
        }
    }
}
