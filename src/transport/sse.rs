//! SSE transport — the split-duplex HTTP server.
//!
//! A client attaches with `GET /sse` and holds the response open; the
//! first event (`endpoint`) names the session-scoped submission URL,
//! and every server-produced protocol message follows as one `message`
//! event. The client then submits each request as a short-lived
//! `POST /messages/{session_id}`, which is acknowledged immediately —
//! the actual result arrives on the stream.

use std::convert::Infallible;
use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{
        sse::{Event, KeepAlive, Sse},
        IntoResponse, Json as AxumJson, Response,
    },
    routing::{get, post},
    Router,
};
use futures::Stream;
use tokio::sync::mpsc;
use tower_http::cors::CorsLayer;
use uuid::Uuid;

use crate::protocol::ProtocolHandler;
use crate::session::{SessionGuard, SessionRegistry};
use crate::store::MemoryStore;
use crate::tools::ToolRegistry;
use crate::types::{error_codes, mcp_error_codes, JsonRpcMessage, McpError, McpResult};

/// Bounded per-session channel depth. A client that stops reading its
/// stream eventually backpressures its own dispatch loop, nobody else's.
const CHANNEL_CAPACITY: usize = 32;

/// Shared server state passed to all route handlers via axum State.
pub struct ServerState {
    pub registry: Arc<SessionRegistry>,
    pub store: Arc<MemoryStore>,
    pub tools: Arc<ToolRegistry>,
}

pub struct SseTransport {
    state: Arc<ServerState>,
}

impl SseTransport {
    pub fn new(store: Arc<MemoryStore>, tools: Arc<ToolRegistry>) -> Self {
        Self {
            state: Arc::new(ServerState {
                registry: Arc::new(SessionRegistry::new()),
                store,
                tools,
            }),
        }
    }

    pub fn router(&self) -> Router {
        Router::new()
            .route("/sse", get(handle_sse))
            .route("/messages/:session_id", post(handle_message))
            .route("/health", get(handle_health))
            .layer(CorsLayer::permissive())
            .with_state(self.state.clone())
    }

    /// Run the HTTP server on the given address. A failed bind is a
    /// startup-time fatal error propagated to the caller.
    pub async fn run(&self, addr: &str) -> McpResult<()> {
        let app = self.router();

        let listener = tokio::net::TcpListener::bind(addr)
            .await
            .map_err(McpError::Io)?;

        tracing::info!("SSE transport listening on {addr}");

        axum::serve(listener, app)
            .await
            .map_err(|e| McpError::Transport(e.to_string()))?;

        Ok(())
    }
}

/// Open the event stream for a new session.
///
/// Allocates the session's duplex channel pair, registers the inbound
/// side so submissions can reach it, and spawns the dispatch loop. The
/// guard inside the stream tears the session down the moment the client
/// disconnects; an in-flight handler result for a torn-down session
/// fails its outbound send and is discarded.
async fn handle_sse(
    State(state): State<Arc<ServerState>>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    let (inbound_tx, mut inbound_rx) = mpsc::channel::<JsonRpcMessage>(CHANNEL_CAPACITY);
    let (outbound_tx, mut outbound_rx) = mpsc::channel::<serde_json::Value>(CHANNEL_CAPACITY);

    let session_id = state.registry.register(inbound_tx);
    let handler = ProtocolHandler::new(state.store.clone(), state.tools.clone());

    let registry = state.registry.clone();
    tokio::spawn(async move {
        // One message at a time: responses on this session are FIFO
        // with respect to its requests.
        while let Some(msg) = inbound_rx.recv().await {
            if let Some(response) = handler.handle_message(msg).await {
                if outbound_tx.send(response).await.is_err() {
                    break;
                }
            }
            // Explicit close: the shutdown response above was the last
            // message on this session. Leaving the loop drops the
            // outbound sender, which ends the event stream.
            if handler.is_closing().await {
                break;
            }
        }
        registry.remove(session_id);
        tracing::debug!("Dispatch loop for session {session_id} ended");
    });

    let guard = SessionGuard::new(state.registry.clone(), session_id);
    let stream = async_stream::stream! {
        let _guard = guard;
        yield Ok(Event::default()
            .event("endpoint")
            .data(format!("/messages/{session_id}")));
        while let Some(value) = outbound_rx.recv().await {
            yield Ok(Event::default().event("message").data(value.to_string()));
        }
    };

    Sse::new(stream).keep_alive(KeepAlive::default())
}

/// Accept one client-to-server message for an attached session.
///
/// Returns an acknowledgement only; the response to the enclosed
/// request is delivered asynchronously on the session's event stream.
async fn handle_message(
    State(state): State<Arc<ServerState>>,
    Path(session_id): Path<Uuid>,
    body: String,
) -> Response {
    // Parse by hand rather than through the Json extractor so that
    // syntactically broken bodies also get the structured error.
    let msg: JsonRpcMessage = match serde_json::from_str(&body) {
        Ok(msg) => msg,
        Err(_) => {
            return rpc_error_response(
                StatusCode::BAD_REQUEST,
                error_codes::PARSE_ERROR,
                "Parse error",
            )
        }
    };

    let inbound = match state.registry.inbound(session_id) {
        Ok(sender) => sender,
        Err(_) => {
            return rpc_error_response(
                StatusCode::NOT_FOUND,
                mcp_error_codes::SESSION_NOT_FOUND,
                "Session not ready or closed",
            )
        }
    };

    // The registry entry can disappear between lookup and send.
    if inbound.send(msg).await.is_err() {
        return rpc_error_response(
            StatusCode::NOT_FOUND,
            mcp_error_codes::SESSION_NOT_FOUND,
            "Session not ready or closed",
        );
    }

    (StatusCode::ACCEPTED, "Accepted").into_response()
}

/// Health check endpoint.
async fn handle_health(State(state): State<Arc<ServerState>>) -> AxumJson<serde_json::Value> {
    AxumJson(serde_json::json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
        "sessions": state.registry.len(),
    }))
}

fn rpc_error_response(status: StatusCode, code: i32, message: &str) -> Response {
    (
        status,
        AxumJson(serde_json::json!({
            "jsonrpc": "2.0",
            "id": null,
            "error": {
                "code": code,
                "message": message
            }
        })),
    )
        .into_response()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_state() -> Arc<ServerState> {
        Arc::new(ServerState {
            registry: Arc::new(SessionRegistry::new()),
            store: Arc::new(MemoryStore::new()),
            tools: Arc::new(ToolRegistry::new()),
        })
    }

    async fn body_json(response: Response) -> serde_json::Value {
        let bytes = axum::body::to_bytes(response.into_body(), 64 * 1024)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn malformed_submission_gets_structured_parse_error() {
        let state = test_state();
        let response = handle_message(
            State(state),
            Path(Uuid::new_v4()),
            r#"{"broken":"#.to_string(),
        )
        .await;

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = body_json(response).await;
        assert_eq!(body["error"]["code"], error_codes::PARSE_ERROR);
        assert_eq!(body["jsonrpc"], "2.0");
    }

    #[tokio::test]
    async fn wrong_shape_submission_gets_structured_parse_error() {
        let state = test_state();
        // Valid JSON, not a JSON-RPC message.
        let response = handle_message(
            State(state),
            Path(Uuid::new_v4()),
            r#"[1, 2, 3]"#.to_string(),
        )
        .await;

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = body_json(response).await;
        assert_eq!(body["error"]["code"], error_codes::PARSE_ERROR);
    }

    #[tokio::test]
    async fn submission_for_unknown_session_is_rejected() {
        let state = test_state();
        let response = handle_message(
            State(state),
            Path(Uuid::new_v4()),
            r#"{"jsonrpc":"2.0","id":1,"method":"ping"}"#.to_string(),
        )
        .await;

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        let body = body_json(response).await;
        assert_eq!(body["error"]["code"], mcp_error_codes::SESSION_NOT_FOUND);
    }

    #[tokio::test]
    async fn submission_for_live_session_is_acknowledged() {
        let state = test_state();
        let (inbound_tx, mut inbound_rx) = mpsc::channel(4);
        let id = state.registry.register(inbound_tx);

        let response = handle_message(
            State(state),
            Path(id),
            r#"{"jsonrpc":"2.0","id":1,"method":"ping"}"#.to_string(),
        )
        .await;

        assert_eq!(response.status(), StatusCode::ACCEPTED);
        assert!(matches!(
            inbound_rx.recv().await,
            Some(JsonRpcMessage::Request(_))
        ));
    }
}
