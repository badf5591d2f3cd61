// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Screens and the router that mounts them.
//!
//! Screens hold view state only; all writes go through `CatalogService`
//! or the session provider.

pub mod cards;
pub mod edit_book;
pub mod home;
pub mod login;
pub mod register;
pub mod router;

pub use cards::BookCard;
pub use edit_book::EditBookScreen;
pub use home::HomeScreen;
pub use login::LoginScreen;
pub use register::RegisterScreen;
pub use router::{AuthState, RouteState, Screen, ViewRouter};
