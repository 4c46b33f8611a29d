//! Server-Sent-Events transport.
//!
//! `GET /sse` opens a session stream whose first event is `endpoint`, naming
//! the URL to POST messages to. Responses to those POSTs are pushed back on
//! the session stream as `message` events.

use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{
        sse::{Event, KeepAlive},
        IntoResponse, Response, Sse,
    },
    routing::{get, post},
    Router,
};
use dashmap::DashMap;
use serde::Deserialize;
use std::convert::Infallible;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::server::McpServer;

const PING_INTERVAL: Duration = Duration::from_secs(30);
const SESSION_BUFFER: usize = 64;

struct SseState {
    server: Arc<McpServer>,
    sessions: DashMap<String, mpsc::Sender<String>>,
}

/// Removes its session when the event stream is dropped.
struct SessionGuard {
    state: Arc<SseState>,
    id: String,
}

impl Drop for SessionGuard {
    fn drop(&mut self) {
        self.state.sessions.remove(&self.id);
        debug!(session = %self.id, "sse session closed");
    }
}

#[derive(Debug, Deserialize)]
struct SessionQuery {
    #[serde(rename = "sessionId")]
    session_id: String,
}

pub fn router(server: Arc<McpServer>) -> Router {
    let state = Arc::new(SseState {
        server,
        sessions: DashMap::new(),
    });
    Router::new()
        .route("/sse", get(handle_sse))
        .route("/messages", post(handle_message))
        .route("/health", get(|| async { "OK" }))
        .with_state(state)
}

async fn handle_sse(State(state): State<Arc<SseState>>) -> impl IntoResponse {
    let session_id = Uuid::new_v4().to_string();
    let (tx, mut rx) = mpsc::channel::<String>(SESSION_BUFFER);
    state.sessions.insert(session_id.clone(), tx);
    info!(session = %session_id, "sse session opened");

    let guard = SessionGuard {
        state: state.clone(),
        id: session_id.clone(),
    };

    let stream = async_stream::stream! {
        let _guard = guard;
        yield Ok::<_, Infallible>(
            Event::default()
                .event("endpoint")
                .data(format!("/messages?sessionId={}", session_id)),
        );

        let mut ping = tokio::time::interval(PING_INTERVAL);
        ping.tick().await;
        loop {
            let event = tokio::select! {
                message = rx.recv() => match message {
                    Some(data) => Event::default().event("message").data(data),
                    None => break,
                },
                _ = ping.tick() => Event::default().event("ping").data(
                    serde_json::json!({
                        "type": "ping",
                        "timestamp": chrono::Utc::now().to_rfc3339()
                    })
                    .to_string(),
                ),
            };
            yield Ok(event);
        }
    };

    Sse::new(stream).keep_alive(KeepAlive::new().interval(Duration::from_secs(15)))
}

async fn handle_message(
    State(state): State<Arc<SseState>>,
    Query(query): Query<SessionQuery>,
    body: String,
) -> Response {
    let Some(sender) = state
        .sessions
        .get(&query.session_id)
        .map(|entry| entry.value().clone())
    else {
        warn!(session = %query.session_id, "message for unknown session");
        return (StatusCode::NOT_FOUND, "unknown session").into_response();
    };

    if let Some(response) = state.server.handle_message(&body).await {
        let encoded = match serde_json::to_string(&response) {
            Ok(encoded) => encoded,
            Err(err) => {
                return (StatusCode::INTERNAL_SERVER_ERROR, err.to_string()).into_response();
            }
        };
        if sender.send(encoded).await.is_err() {
            return (StatusCode::GONE, "session closed").into_response();
        }
    }
    StatusCode::ACCEPTED.into_response()
}
