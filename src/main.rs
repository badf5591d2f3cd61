// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Book catalog command-line client.
//!
//! Signs in against Firebase Auth and works on the shared book list kept in
//! the Realtime Database.

use anyhow::{bail, Context};
use book_catalog::{
    config::Config,
    db::RealtimeDb,
    error::{AppError, ErrorClass},
    models::{Editable, SessionIdentity, UserProfile},
    screens::{HomeScreen, LoginScreen, RegisterScreen, ViewRouter},
    services::{FirebaseAuth, Notice},
    AppState,
};
use clap::{Args, Parser, Subcommand};
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// How long to wait for a profile record that may not exist.
const PROFILE_WAIT: Duration = Duration::from_secs(2);

#[derive(Parser)]
#[command(name = "book-catalog", version, about = "Shared book catalog client")]
struct Cli {
    /// Account email
    #[arg(long, env = "BOOK_CATALOG_EMAIL")]
    email: String,

    /// Account password
    #[arg(long, env = "BOOK_CATALOG_PASSWORD", hide_env_values = true)]
    password: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Create the account, then list books
    Register {
        /// Display name for the new account
        #[arg(long)]
        name: Option<String>,
    },
    /// Print every book
    List,
    /// Print the book list every time it changes
    Watch,
    /// Add a book
    Add(BookArgs),
    /// Change fields of an existing book
    Edit {
        id: String,
        #[command(flatten)]
        fields: BookArgs,
    },
    /// Delete a book
    Delete { id: String },
    /// Show the profile, or change it when any field is given
    Profile(ProfileArgs),
}

#[derive(Args)]
struct BookArgs {
    #[arg(long)]
    name: Option<String>,
    #[arg(long)]
    author: Option<String>,
    #[arg(long = "publication-date")]
    publication_date: Option<String>,
    #[arg(long)]
    publisher: Option<String>,
    #[arg(long)]
    genre: Option<String>,
}

impl BookArgs {
    fn assignments(&self) -> Vec<(&'static str, &str)> {
        [
            ("name", &self.name),
            ("author", &self.author),
            ("publicationDate", &self.publication_date),
            ("publisher", &self.publisher),
            ("genre", &self.genre),
        ]
        .into_iter()
        .filter_map(|(key, value)| value.as_deref().map(|v| (key, v)))
        .collect()
    }
}

#[derive(Args)]
struct ProfileArgs {
    #[arg(long)]
    name: Option<String>,
    #[arg(long = "first-name")]
    first_name: Option<String>,
    #[arg(long = "last-name")]
    last_name: Option<String>,
    #[arg(long)]
    age: Option<String>,
    #[arg(long = "new-email")]
    email: Option<String>,
}

impl ProfileArgs {
    fn assignments(&self) -> Vec<(&'static str, &str)> {
        [
            ("name", &self.name),
            ("firstName", &self.first_name),
            ("lastName", &self.last_name),
            ("age", &self.age),
            ("email", &self.email),
        ]
        .into_iter()
        .filter_map(|(key, value)| value.as_deref().map(|v| (key, v)))
        .collect()
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    init_logging();

    let cli = Cli::parse();
    let result = run(cli).await;
    if let Err(e) = &result {
        if let Some(app_error) = e.downcast_ref::<AppError>() {
            tracing::error!(class = ?app_error.class(), error = %app_error, "Command failed");
            if app_error.is_session_expired() {
                eprintln!("Your session has expired; sign in again.");
            } else if app_error.class() == ErrorClass::Database {
                eprintln!("The catalog could not be reached or refused the change.");
            }
        }
    }
    result
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let config = Config::from_env().context("Failed to load configuration")?;
    tracing::info!(database = %config.database_url, "Starting book catalog client");

    let auth = Arc::new(FirebaseAuth::new(&config).context("Failed to initialize auth client")?);
    let db = Arc::new(
        RealtimeDb::new(&config, auth.clone()).context("Failed to initialize database client")?,
    );
    let state = AppState::new(config, db, auth);

    let mut router = ViewRouter::start(state.session.as_ref());
    router.resolved().await.context("Session provider stopped")?;

    let identity = match &cli.command {
        Command::Register { name } => register(&state, &cli, name.as_deref()).await?,
        _ => sign_in(&state, &cli).await?,
    };
    router
        .wait_until(|route| {
            route.auth.identity().map(|i| i.uid.as_str()) == Some(identity.uid.as_str())
        })
        .await
        .context("Session provider stopped")?;

    let timeout = state.config.http_timeout;
    let mut home = HomeScreen::mount(&state, identity);
    tracing::info!(user = %home.display_name(), "Signed in");

    match cli.command {
        Command::Register { .. } | Command::List => {
            tokio::time::timeout(timeout, home.wait_for_books(|_| true))
                .await
                .context("Timed out loading books")?;
            print_books(&home);
        }
        Command::Watch => {
            if let Ok(Some(_)) = tokio::time::timeout(timeout, home.wait_for_books(|_| true)).await {
                print_books(&home);
            }
            loop {
                let changed = tokio::select! {
                    changed = home.books_changed() => changed,
                    _ = tokio::signal::ctrl_c() => break,
                };
                if changed.is_none() {
                    bail!("Book list stream ended");
                }
                println!();
                print_books(&home);
            }
        }
        Command::Add(fields) => {
            home.open_new_book();
            for (key, value) in fields.assignments() {
                home.book_form.set_field(key, value)?;
            }
            let result = home.save_new_book().await;
            print_notice(home.book_form.notice());
            let id = result?;
            println!("{}", id);
        }
        Command::Edit { id, fields } => {
            let mut screen = home.edit_book(&id);
            screen.load_within(timeout).await?;
            for (key, value) in fields.assignments() {
                screen.set_field(key, value)?;
            }
            let result = screen.save().await;
            print_notice(screen.notice());
            result?;
        }
        Command::Delete { id } => {
            home.delete_book(&id).await?;
        }
        Command::Profile(fields) => {
            // Absent record is fine: the profile falls back to session fields.
            let _ = tokio::time::timeout(PROFILE_WAIT, home.wait_for_profile(|_| true)).await;

            let assignments = fields.assignments();
            if !assignments.is_empty() {
                home.open_profile();
                for (key, value) in assignments {
                    home.profile_form.set_field(key, value)?;
                }
                let result = home.save_profile().await;
                print_notice(home.profile_form.notice());
                result?;
            }
            let profile = home.profile();
            for key in UserProfile::FIELDS {
                println!("{}: {}", key, profile.field(key).unwrap_or_default());
            }
        }
    }

    Ok(())
}

async fn sign_in(state: &AppState, cli: &Cli) -> anyhow::Result<SessionIdentity> {
    let mut screen = LoginScreen::mount(state);
    screen.set_field("email", cli.email.as_str())?;
    screen.set_field("password", cli.password.as_str())?;
    let result = screen.submit().await;
    print_notice(screen.notice());
    Ok(result?)
}

async fn register(
    state: &AppState,
    cli: &Cli,
    name: Option<&str>,
) -> anyhow::Result<SessionIdentity> {
    let mut screen = RegisterScreen::mount(state);
    if let Some(name) = name {
        screen.set_field("name", name)?;
    }
    screen.set_field("email", cli.email.as_str())?;
    screen.set_field("password", cli.password.as_str())?;
    let result = screen.submit().await;
    print_notice(screen.notice());
    Ok(result?)
}

fn print_books(home: &HomeScreen) {
    let cards = home.cards();
    if cards.is_empty() {
        println!("No books yet");
    }
    for card in cards {
        println!("{}", card);
    }
}

fn print_notice(notice: Option<&Notice>) {
    if let Some(notice) = notice {
        eprintln!("[{}] {}", notice.severity.color(), notice.message);
    }
}

/// Initialize structured JSON logging on stderr.
fn init_logging() {
    let format = tracing_subscriber::fmt::layer()
        .json()
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_current_span(true)
        .flatten_event(true);

    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("book_catalog=debug,info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(format)
        .init();
}
