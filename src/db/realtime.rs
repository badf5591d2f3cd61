// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Firebase Realtime Database client over the REST API.
//!
//! Writes map onto `PUT` (set), `PATCH` (update) and `DELETE` (remove).
//! Subscriptions use the REST streaming protocol: a long-lived
//! `text/event-stream` response carrying `put` and `patch` events that are
//! applied to a local copy of the subscribed subtree.

use super::{tree, PushIdGenerator, RecordStore, Snapshot, Subscription, TokenSource};
use crate::config::Config;
use crate::error::{AppError, Result};
use async_trait::async_trait;
use futures_util::StreamExt;
use serde::Deserialize;
use serde_json::Value;
use std::sync::Arc;
use tokio::sync::mpsc;

/// Realtime Database client.
#[derive(Clone)]
pub struct RealtimeDb {
    http: reqwest::Client,
    /// Streaming requests must not time out.
    stream_http: reqwest::Client,
    base_url: String,
    /// Query parameters carried over from the configured URL (`ns=...`).
    params: Vec<(String, String)>,
    tokens: Arc<dyn TokenSource>,
    ids: Arc<PushIdGenerator>,
}

impl RealtimeDb {
    /// Create a client for the configured database.
    ///
    /// For local development with the emulator, set `FIREBASE_DATABASE_URL`
    /// to `http://localhost:9000/?ns=<project>`; the query is sent with every
    /// request.
    pub fn new(config: &Config, tokens: Arc<dyn TokenSource>) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(config.http_timeout)
            .build()
            .map_err(|e| AppError::Database(format!("Failed to build HTTP client: {}", e)))?;
        let stream_http = reqwest::Client::builder()
            .build()
            .map_err(|e| AppError::Database(format!("Failed to build HTTP client: {}", e)))?;

        tracing::info!(database = %config.database_url, "Realtime Database client ready");

        let (base, query) = config
            .database_url
            .split_once('?')
            .unwrap_or((config.database_url.as_str(), ""));
        let params = query
            .split('&')
            .filter(|pair| !pair.is_empty())
            .map(|pair| {
                let (key, value) = pair.split_once('=').unwrap_or((pair, ""));
                (key.to_string(), value.to_string())
            })
            .collect();

        Ok(Self {
            http,
            stream_http,
            base_url: base.trim_end_matches('/').to_string(),
            params,
            tokens,
            ids: Arc::new(PushIdGenerator::new()),
        })
    }

    /// REST URL for a path.
    fn url(&self, path: &str) -> String {
        let encoded: Vec<String> = tree::segments(path)
            .into_iter()
            .map(|s| urlencoding::encode(s).into_owned())
            .collect();
        format!("{}/{}.json", self.base_url, encoded.join("/"))
    }

    /// Query for one request: configured parameters plus the ID token.
    async fn auth_query(&self) -> Result<Vec<(String, String)>> {
        let mut query = self.params.clone();
        if let Some(token) = self.tokens.id_token().await? {
            query.push(("auth".to_string(), token));
        }
        Ok(query)
    }

    async fn send(&self, request: reqwest::RequestBuilder, path: &str) -> Result<()> {
        let response = request
            .query(&self.auth_query().await?)
            .send()
            .await
            .map_err(|e| AppError::Database(format!("{}: {}", path, e)))?;
        check_response(response, path).await
    }
}

/// Check response status and return an error if not successful.
async fn check_response(response: reqwest::Response, path: &str) -> Result<()> {
    if response.status().is_success() {
        return Ok(());
    }

    let status = response.status();
    let body = response.text().await.unwrap_or_default();

    if status.as_u16() == 401 || status.as_u16() == 403 {
        return Err(AppError::PermissionDenied(path.to_string()));
    }

    Err(AppError::Database(format!("HTTP {}: {}", status, body)))
}

#[async_trait]
impl RecordStore for RealtimeDb {
    fn subscribe(&self, path: &str) -> Subscription {
        let (tx, rx) = mpsc::unbounded_channel();
        let task = tokio::spawn(stream_path(self.clone(), path.to_string(), tx));
        Subscription::new(path, rx, move || task.abort())
    }

    async fn set(&self, path: &str, value: Value) -> Result<()> {
        self.send(self.http.put(self.url(path)).json(&value), path)
            .await
    }

    async fn update(&self, path: &str, partial: Value) -> Result<()> {
        self.send(self.http.patch(self.url(path)).json(&partial), path)
            .await
    }

    async fn remove(&self, path: &str) -> Result<()> {
        self.send(self.http.delete(self.url(path)), path).await
    }

    fn push_id(&self, collection: &str) -> Result<String> {
        let id = self.ids.next_id()?;
        Ok(format!("{}/{}", collection.trim_end_matches('/'), id))
    }
}

/// Payload of `put` and `patch` events.
#[derive(Debug, Deserialize)]
struct EventData {
    path: String,
    data: Value,
}

/// One server-sent event.
#[derive(Debug, Clone, PartialEq)]
pub struct ServerEvent {
    pub event: String,
    pub data: String,
}

/// Incremental parser for a `text/event-stream` body.
///
/// Buffers bytes so that multi-byte characters split across chunks decode
/// correctly.
#[derive(Debug, Default)]
pub struct EventParser {
    buffer: Vec<u8>,
}

impl EventParser {
    /// Feed a chunk of the body; returns every event it completes.
    pub fn feed(&mut self, chunk: &[u8]) -> Vec<ServerEvent> {
        self.buffer.extend(chunk.iter().filter(|&&b| b != b'\r'));

        let mut events = Vec::new();
        while let Some(end) = self.buffer.windows(2).position(|w| w == b"\n\n") {
            let block: Vec<u8> = self.buffer.drain(..end + 2).collect();
            let block = String::from_utf8_lossy(&block);
            let mut event = String::new();
            let mut data = Vec::new();
            for line in block.lines() {
                if let Some(name) = line.strip_prefix("event:") {
                    event = name.trim().to_string();
                } else if let Some(payload) = line.strip_prefix("data:") {
                    data.push(payload.trim_start().to_string());
                }
            }
            if !event.is_empty() {
                events.push(ServerEvent {
                    event,
                    data: data.join("\n"),
                });
            }
        }
        events
    }
}

/// What a subscriber should do after an event.
#[derive(Debug, PartialEq)]
enum Step {
    /// The cache may have changed; keep reading.
    Continue,
    /// The credential expired; reopen the stream with a fresh token.
    Reauthenticate,
    Stop,
}

/// Apply one event to the local copy of the subtree.
fn apply_event(cache: &mut Value, event: &ServerEvent, path: &str) -> Step {
    match event.event.as_str() {
        "put" | "patch" => match serde_json::from_str::<EventData>(&event.data) {
            Ok(payload) if event.event == "put" => {
                tree::set(cache, &payload.path, payload.data);
                Step::Continue
            }
            Ok(payload) => {
                tree::merge(cache, &payload.path, payload.data);
                Step::Continue
            }
            Err(e) => {
                tracing::warn!(path, error = %e, "Malformed stream event");
                Step::Continue
            }
        },
        "keep-alive" => Step::Continue,
        "cancel" => {
            tracing::warn!(path, reason = %event.data, "Subscription cancelled by server");
            Step::Stop
        }
        "auth_revoked" => {
            tracing::info!(path, "Subscription credential expired");
            Step::Reauthenticate
        }
        other => {
            tracing::debug!(path, event = other, "Ignoring stream event");
            Step::Continue
        }
    }
}

/// Reopens allowed after `auth_revoked` without any data in between.
const MAX_REAUTH_ATTEMPTS: u32 = 3;

/// Per-subscription state that survives reopening the stream.
struct StreamState {
    cache: Value,
    last_sent: Option<Snapshot>,
    reauth_attempts: u32,
}

/// Stream a path and forward every distinct value to the subscriber.
///
/// When the server revokes the credential the stream is reopened with a
/// fresh token; the cached subtree carries over, so the subscriber sees no
/// gap.
async fn stream_path(db: RealtimeDb, path: String, tx: mpsc::UnboundedSender<Snapshot>) {
    let mut state = StreamState {
        cache: Value::Null,
        last_sent: None,
        reauth_attempts: 0,
    };

    while open_stream(&db, &path, &tx, &mut state).await == Step::Reauthenticate {
        if state.reauth_attempts >= MAX_REAUTH_ATTEMPTS {
            tracing::warn!(path = %path, "Subscription credential keeps being revoked");
            return;
        }
        state.reauth_attempts += 1;
        tracing::debug!(path = %path, attempt = state.reauth_attempts, "Reopening subscription");
    }
}

/// Open one streaming request and apply its events until it ends.
async fn open_stream(
    db: &RealtimeDb,
    path: &str,
    tx: &mpsc::UnboundedSender<Snapshot>,
    state: &mut StreamState,
) -> Step {
    let query = match db.auth_query().await {
        Ok(query) => query,
        Err(e) => {
            tracing::warn!(path, error = %e, "Subscription could not get a token");
            return Step::Stop;
        }
    };

    let response = match db
        .stream_http
        .get(db.url(path))
        .header(reqwest::header::ACCEPT, "text/event-stream")
        .query(&query)
        .send()
        .await
    {
        Ok(response) => response,
        Err(e) => {
            tracing::warn!(path, error = %e, "Subscription request failed");
            return Step::Stop;
        }
    };

    if !response.status().is_success() {
        if let Err(e) = check_response(response, path).await {
            tracing::warn!(path, error = %e, "Subscription rejected");
        }
        return Step::Stop;
    }
    tracing::debug!(path, "Subscription stream open");

    let mut parser = EventParser::default();
    let mut body = response.bytes_stream();

    while let Some(chunk) = body.next().await {
        let chunk = match chunk {
            Ok(chunk) => chunk,
            Err(e) => {
                tracing::warn!(path, error = %e, "Subscription stream broke");
                return Step::Stop;
            }
        };

        for event in parser.feed(&chunk) {
            match apply_event(&mut state.cache, &event, path) {
                Step::Continue => {}
                step => return step,
            }
            if event.event != "put" && event.event != "patch" {
                continue;
            }
            state.reauth_attempts = 0;
            let snapshot = tree::get(&state.cache, "").cloned();
            if state.last_sent.as_ref() == Some(&snapshot) {
                continue;
            }
            if tx.send(snapshot.clone()).is_err() {
                return Step::Stop;
            }
            state.last_sent = Some(snapshot);
        }
    }
    tracing::debug!(path, "Subscription stream closed");
    Step::Stop
}
