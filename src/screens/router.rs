// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! View router: picks the mounted screen set from the session state.
//!
//! The router starts in `Loading` and leaves it on the first identity the
//! session provider publishes. From then on it moves between
//! `Unauthenticated` and `Authenticated` and never returns to `Loading`.
//! Each move to a different user (or to no user) bumps the mount
//! generation; screens from an older generation must be dropped, so no
//! draft or mirror outlives a sign-out.

use crate::models::SessionIdentity;
use crate::services::SessionProvider;
use tokio::sync::watch;
use tokio::task::JoinHandle;

/// Screens mounted for each session state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Screen {
    Login,
    Register,
    Home,
    /// Pushed from `Home` for one book id. Mounted only while signed in,
    /// so it is listed with the authenticated set.
    EditBook,
}

const UNAUTHENTICATED_SCREENS: &[Screen] = &[Screen::Login, Screen::Register];
const AUTHENTICATED_SCREENS: &[Screen] = &[Screen::Home, Screen::EditBook];

/// Session state as seen by the router.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum AuthState {
    #[default]
    Loading,
    Unauthenticated,
    Authenticated(SessionIdentity),
}

impl AuthState {
    /// State for a published identity. Never `Loading`.
    pub fn resolve(identity: Option<SessionIdentity>) -> Self {
        match identity {
            Some(identity) => AuthState::Authenticated(identity),
            None => AuthState::Unauthenticated,
        }
    }

    /// Screens mounted in this state. Empty while loading.
    pub fn screens(&self) -> &'static [Screen] {
        match self {
            AuthState::Loading => &[],
            AuthState::Unauthenticated => UNAUTHENTICATED_SCREENS,
            AuthState::Authenticated(_) => AUTHENTICATED_SCREENS,
        }
    }

    pub fn is_loading(&self) -> bool {
        matches!(self, AuthState::Loading)
    }

    pub fn identity(&self) -> Option<&SessionIdentity> {
        match self {
            AuthState::Authenticated(identity) => Some(identity),
            _ => None,
        }
    }

    /// Whether moving to `next` requires remounting every screen.
    fn remounts_for(&self, next: &AuthState) -> bool {
        match (self, next) {
            (AuthState::Authenticated(a), AuthState::Authenticated(b)) => a.uid != b.uid,
            (a, b) => std::mem::discriminant(a) != std::mem::discriminant(b),
        }
    }
}

/// Published router state.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RouteState {
    pub auth: AuthState,
    /// Incremented whenever mounted screens must be torn down.
    pub generation: u64,
}

impl RouteState {
    /// Apply a published identity. Returns whether anything changed.
    pub fn apply(&mut self, identity: Option<SessionIdentity>) -> bool {
        let next = AuthState::resolve(identity);
        if next == self.auth {
            return false;
        }
        if self.auth.remounts_for(&next) {
            self.generation += 1;
        }
        self.auth = next;
        true
    }

    pub fn screens(&self) -> &'static [Screen] {
        self.auth.screens()
    }
}

/// Router that follows a session provider for as long as it lives.
pub struct ViewRouter {
    rx: watch::Receiver<RouteState>,
    task: JoinHandle<()>,
}

impl ViewRouter {
    /// Start following the session provider.
    pub fn start(session: &dyn SessionProvider) -> Self {
        let mut identities = session.subscribe();
        let (tx, rx) = watch::channel(RouteState::default());

        let task = tokio::spawn(async move {
            loop {
                let identity = identities.borrow_and_update().clone();
                let changed = tx.send_if_modified(|state| state.apply(identity));
                if changed {
                    let state = tx.borrow();
                    tracing::info!(
                        authenticated = state.auth.identity().is_some(),
                        generation = state.generation,
                        "Route changed"
                    );
                }
                if identities.changed().await.is_err() {
                    break;
                }
            }
        });

        Self { rx, task }
    }

    /// Current router state.
    pub fn state(&self) -> RouteState {
        self.rx.borrow().clone()
    }

    /// A receiver that observes every router change.
    pub fn watch(&self) -> watch::Receiver<RouteState> {
        self.rx.clone()
    }

    /// Wait until the router state satisfies `pred`.
    pub async fn wait_until(&mut self, pred: impl FnMut(&RouteState) -> bool) -> Option<RouteState> {
        self.rx.wait_for(pred).await.ok().map(|state| (*state).clone())
    }

    /// Wait until the initial loading phase is over.
    pub async fn resolved(&mut self) -> Option<RouteState> {
        self.wait_until(|state| !state.auth.is_loading()).await
    }
}

impl Drop for ViewRouter {
    fn drop(&mut self) {
        self.task.abort();
    }
}
