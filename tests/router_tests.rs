// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! View router tests driven by the in-process session provider.

use book_catalog::screens::{AuthState, RouteState, Screen, ViewRouter};
use book_catalog::services::SessionProvider;

mod common;
use common::{create_test_app, within, EMAIL, PASSWORD};

#[tokio::test]
async fn test_router_starts_loading_and_resolves() {
    let app = create_test_app();
    let mut router = ViewRouter::start(app.session.as_ref());

    let state = within(router.resolved()).await.unwrap();
    assert_eq!(state.auth, AuthState::Unauthenticated);
    assert_eq!(state.screens(), &[Screen::Login, Screen::Register]);
}

#[tokio::test]
async fn test_full_session_lifecycle_never_returns_to_loading() {
    let app = create_test_app();
    let mut router = ViewRouter::start(app.session.as_ref());
    let mut rx = router.watch();

    let recorder = tokio::spawn(async move {
        let mut states = vec![rx.borrow_and_update().clone()];
        while rx.changed().await.is_ok() {
            states.push(rx.borrow_and_update().clone());
        }
        states
    });

    within(router.resolved()).await.unwrap();
    let identity = app
        .session
        .sign_up(EMAIL, PASSWORD, Some("Reader"))
        .await
        .unwrap();
    let state = within(router.wait_until(|s| s.auth.identity().is_some()))
        .await
        .unwrap();
    assert_eq!(state.auth, AuthState::Authenticated(identity.clone()));
    assert_eq!(state.screens(), &[Screen::Home, Screen::EditBook]);

    app.session.sign_out().await.unwrap();
    let state = within(router.wait_until(|s| s.auth == AuthState::Unauthenticated))
        .await
        .unwrap();
    assert!(state.generation >= 3);

    drop(router);
    let seen: Vec<RouteState> = within(recorder).await.unwrap();
    assert!(seen.iter().skip(1).all(|s| !s.auth.is_loading()));
    let generations: Vec<u64> = seen.iter().map(|s| s.generation).collect();
    assert!(generations.windows(2).all(|w| w[0] <= w[1]));
}

#[tokio::test]
async fn test_profile_edit_does_not_remount() {
    let app = create_test_app();
    app.session.sign_up(EMAIL, PASSWORD, None).await.unwrap();

    let mut router = ViewRouter::start(app.session.as_ref());
    let before = within(router.resolved()).await.unwrap();
    assert!(before.auth.identity().is_some());

    app.session.update_display_name("Ada").await.unwrap();
    let after = within(router.wait_until(|s| {
        s.auth
            .identity()
            .and_then(|i| i.display_name.as_deref())
            == Some("Ada")
    }))
    .await
    .unwrap();
    assert_eq!(after.generation, before.generation);
}

#[tokio::test]
async fn test_switching_users_remounts() {
    let app = create_test_app();
    app.session.sign_up("a@example.com", PASSWORD, None).await.unwrap();
    app.session.sign_out().await.unwrap();
    app.session.sign_up("b@example.com", PASSWORD, None).await.unwrap();

    let mut router = ViewRouter::start(app.session.as_ref());
    let b = within(router.resolved()).await.unwrap();

    app.session.sign_in("a@example.com", PASSWORD).await.unwrap();
    let a = within(router.wait_until(|s| {
        s.auth.identity().and_then(|i| i.email.as_deref()) == Some("a@example.com")
    }))
    .await
    .unwrap();
    assert!(a.generation > b.generation);
}

#[tokio::test]
async fn test_failed_sign_in_stays_unauthenticated() {
    let app = create_test_app();
    let mut router = ViewRouter::start(app.session.as_ref());
    within(router.resolved()).await.unwrap();

    assert!(app.session.sign_in(EMAIL, "nope").await.is_err());
    assert_eq!(router.state().auth, AuthState::Unauthenticated);
}
