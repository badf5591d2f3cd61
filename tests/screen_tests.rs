// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Screen tests: login, registration, home and book editing.

use book_catalog::db::{InjectedFailure, RecordStore};
use book_catalog::error::AppError;
use book_catalog::screens::{HomeScreen, LoginScreen, RegisterScreen};
use book_catalog::services::{SessionProvider, Severity};
use serde_json::json;
use std::time::Duration;

mod common;
use common::{create_test_app, dune, signed_in_app, within, EMAIL, PASSWORD};

// ═══════════════════════════════════════════════════════════════════════════
// LOGIN / REGISTER
// ═══════════════════════════════════════════════════════════════════════════

#[tokio::test]
async fn test_login_with_valid_credentials() {
    let (app, identity) = signed_in_app().await;
    app.session.sign_out().await.unwrap();

    let mut login = LoginScreen::mount(&app.state);
    login.set_field("email", format!("  {}  ", EMAIL)).unwrap();
    login.set_field("password", PASSWORD).unwrap();
    let signed_in = login.submit().await.unwrap();

    assert_eq!(signed_in.uid, identity.uid);
    assert!(login.notice().is_none());
    assert_eq!(app.session.current(), Some(signed_in));
}

#[tokio::test]
async fn test_login_wrong_password_shows_error() {
    let (app, _) = signed_in_app().await;
    app.session.sign_out().await.unwrap();

    let mut login = LoginScreen::mount(&app.state);
    login.set_field("email", EMAIL).unwrap();
    login.set_field("password", "wrong").unwrap();
    let err = login.submit().await.unwrap_err();

    assert!(err.is_credential_error());
    let notice = login.notice().unwrap();
    assert_eq!(notice.message, "Invalid email or password");
    assert_eq!(notice.severity, Severity::Error);
    assert!(app.session.current().is_none());
}

#[tokio::test]
async fn test_login_offline_is_generic_error() {
    let app = create_test_app();
    app.session.set_offline(true);

    let mut login = LoginScreen::mount(&app.state);
    login.set_field("email", EMAIL).unwrap();
    login.set_field("password", PASSWORD).unwrap();
    assert!(login.submit().await.is_err());
    assert_eq!(login.notice().unwrap().message, "Could not sign in");
}

#[tokio::test]
async fn test_register_signs_in_with_display_name() {
    let app = create_test_app();

    let mut register = RegisterScreen::mount(&app.state);
    register.set_field("name", "Reader").unwrap();
    register.set_field("email", EMAIL).unwrap();
    register.set_field("password", PASSWORD).unwrap();
    let identity = register.submit().await.unwrap();

    assert_eq!(identity.display_name.as_deref(), Some("Reader"));
    assert_eq!(app.session.current(), Some(identity));
}

#[tokio::test]
async fn test_register_existing_email_shows_error() {
    let (app, _) = signed_in_app().await;
    app.session.sign_out().await.unwrap();

    let mut register = RegisterScreen::mount(&app.state);
    register.set_field("email", EMAIL).unwrap();
    register.set_field("password", "another-password").unwrap();
    let err = register.submit().await.unwrap_err();

    assert!(err.is_email_in_use());
    assert_eq!(
        register.notice().unwrap().message,
        "That email is already registered"
    );
}

#[tokio::test]
async fn test_register_rejects_unknown_field() {
    let app = create_test_app();
    let mut register = RegisterScreen::mount(&app.state);
    assert!(matches!(
        register.set_field("uid", "x"),
        Err(AppError::UnknownField(_))
    ));
}

// ═══════════════════════════════════════════════════════════════════════════
// HOME
// ═══════════════════════════════════════════════════════════════════════════

#[tokio::test]
async fn test_home_lists_books_as_cards() {
    let (app, identity) = signed_in_app().await;
    let id = app.state.catalog.create_book(&dune()).await.unwrap();

    let mut home = HomeScreen::mount(&app.state, identity);
    assert_eq!(home.display_name(), "Reader");
    within(home.wait_for_books(|books| books.len() == 1)).await.unwrap();
    assert!(!home.is_loading());

    let cards = home.cards();
    assert_eq!(cards.len(), 1);
    assert_eq!(cards[0].id, id);
    assert_eq!(cards[0].title, "Name: Dune");
    assert_eq!(
        cards[0].details,
        [
            "Author: Herbert",
            "Publication date: 1965",
            "Publisher: Chilton",
            "Genre: SciFi",
        ]
    );
}

#[tokio::test]
async fn test_home_new_book_modal() {
    let (app, identity) = signed_in_app().await;
    let mut home = HomeScreen::mount(&app.state, identity);
    within(home.wait_for_books(|_| true)).await.unwrap();

    home.open_new_book();
    assert!(home.book_form.is_open());
    home.book_form.set_field("name", "Dune").unwrap();
    let id = home.save_new_book().await.unwrap();

    let books = within(home.wait_for_books(|books| !books.is_empty()))
        .await
        .unwrap();
    assert_eq!(books[0].id, id);
    assert!(!home.book_form.is_open());
    assert_eq!(home.book_form.notice().unwrap().message, "Book added");
}

#[tokio::test]
async fn test_home_delete_removes_book() {
    let (app, identity) = signed_in_app().await;
    let id = app.state.catalog.create_book(&dune()).await.unwrap();
    let mut home = HomeScreen::mount(&app.state, identity);
    within(home.wait_for_books(|books| books.len() == 1)).await.unwrap();

    home.delete_book(&id).await.unwrap();
    within(home.wait_for_books(|books| books.is_empty())).await.unwrap();
    assert!(app.store.snapshot(&format!("books/{}", id)).is_none());
}

#[tokio::test]
async fn test_delete_missing_book_is_ok() {
    let (app, identity) = signed_in_app().await;
    let home = HomeScreen::mount(&app.state, identity);
    home.delete_book("-NoSuchBook").await.unwrap();
}

#[tokio::test]
async fn test_delete_failure_is_reported() {
    let (app, identity) = signed_in_app().await;
    let id = app.state.catalog.create_book(&dune()).await.unwrap();
    app.store.inject_failure(Some(InjectedFailure::PermissionDenied));

    let home = HomeScreen::mount(&app.state, identity);
    let err = home.delete_book(&id).await.unwrap_err();
    assert!(matches!(err, AppError::PermissionDenied(_)));
    assert!(app.store.snapshot(&format!("books/{}", id)).is_some());
}

#[tokio::test]
async fn test_home_profile_merges_session_and_record() {
    let (app, identity) = signed_in_app().await;
    app.store
        .set(
            &format!("users/{}", identity.uid),
            json!({ "firstName": "Ada", "lastName": "Lovelace", "age": "36" }),
        )
        .await
        .unwrap();

    let mut home = HomeScreen::mount(&app.state, identity);
    within(home.wait_for_profile(|_| true)).await.unwrap();

    let profile = home.profile();
    assert_eq!(profile.name, "Reader");
    assert_eq!(profile.email, EMAIL);
    assert_eq!(profile.first_name, "Ada");
    assert_eq!(profile.age, "36");

    home.open_profile();
    assert_eq!(home.profile_form.draft().value(), &profile);
    home.profile_form.set_field("lastName", "King").unwrap();
    home.save_profile().await.unwrap();
    within(home.wait_for_profile(|record| record.last_name == "King"))
        .await
        .unwrap();
    assert_eq!(home.profile().last_name, "King");
}

#[tokio::test]
async fn test_home_profile_without_record_uses_session() {
    let (app, identity) = signed_in_app().await;
    let home = HomeScreen::mount(&app.state, identity);
    let profile = home.profile();
    assert_eq!(profile.name, "Reader");
    assert_eq!(profile.first_name, "");
}

#[tokio::test]
async fn test_home_sign_out() {
    let (app, identity) = signed_in_app().await;
    let home = HomeScreen::mount(&app.state, identity);
    home.sign_out().await.unwrap();
    assert!(app.session.current().is_none());
}

// ═══════════════════════════════════════════════════════════════════════════
// EDIT BOOK
// ═══════════════════════════════════════════════════════════════════════════

#[tokio::test]
async fn test_edit_screen_loads_and_saves() {
    let (app, identity) = signed_in_app().await;
    let id = app.state.catalog.create_book(&dune()).await.unwrap();
    let home = HomeScreen::mount(&app.state, identity);

    let mut edit = home.edit_book(&id);
    assert_eq!(edit.id(), id);
    let book = within(edit.wait_loaded()).await.unwrap();
    assert_eq!(edit.draft(), &book.fields);

    edit.set_field("publisher", "Ace").unwrap();
    edit.save().await.unwrap();
    assert!(edit.is_done());
    assert_eq!(
        app.store.snapshot(&format!("books/{}/publisher", id)),
        Some(json!("Ace"))
    );
}

#[tokio::test]
async fn test_edit_screen_missing_book_never_loads() {
    let (app, identity) = signed_in_app().await;
    let home = HomeScreen::mount(&app.state, identity);
    let mut edit = home.edit_book("-NoSuchBook");

    let loaded = tokio::time::timeout(Duration::from_millis(50), edit.wait_loaded()).await;
    assert!(loaded.is_err());
    assert!(edit.draft().name.is_empty());
}

#[tokio::test]
async fn test_edit_screen_missing_book_is_not_found() {
    let (app, identity) = signed_in_app().await;
    let home = HomeScreen::mount(&app.state, identity);
    let mut edit = home.edit_book("-NoSuchBook");

    let err = edit.load_within(Duration::from_millis(50)).await.unwrap_err();
    assert!(matches!(err, AppError::NotFound(ref path) if path == "books/-NoSuchBook"));
}

#[tokio::test]
async fn test_edit_screen_load_within_returns_book() {
    let (app, identity) = signed_in_app().await;
    let id = app.state.catalog.create_book(&dune()).await.unwrap();
    let home = HomeScreen::mount(&app.state, identity);
    let mut edit = home.edit_book(&id);

    let book = edit.load_within(Duration::from_secs(1)).await.unwrap();
    assert_eq!(book.fields.name, "Dune");
    assert_eq!(edit.draft().name, "Dune");
}

#[tokio::test]
async fn test_edit_screen_refresh_keeps_local_edits() {
    let (app, identity) = signed_in_app().await;
    let id = app.state.catalog.create_book(&dune()).await.unwrap();
    let home = HomeScreen::mount(&app.state, identity);
    let mut edit = home.edit_book(&id);
    within(edit.wait_loaded()).await.unwrap();

    edit.set_field("genre", "Classic").unwrap();
    app.store
        .update(&format!("books/{}", id), json!({ "genre": "Space opera" }))
        .await
        .unwrap();
    tokio::time::sleep(Duration::from_millis(20)).await;

    assert!(!edit.refresh());
    assert_eq!(edit.draft().genre, "Classic");
}

#[tokio::test]
async fn test_edit_screen_failed_save_stays_open() {
    let (app, identity) = signed_in_app().await;
    let id = app.state.catalog.create_book(&dune()).await.unwrap();
    let home = HomeScreen::mount(&app.state, identity);
    let mut edit = home.edit_book(&id);
    within(edit.wait_loaded()).await.unwrap();

    app.store.inject_failure(Some(InjectedFailure::Offline));
    edit.set_field("genre", "Classic").unwrap();
    assert!(edit.save().await.is_err());
    assert!(!edit.is_done());
    assert_eq!(edit.notice().unwrap().message, "Error updating book");
}
