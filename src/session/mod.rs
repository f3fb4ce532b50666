//! Session registry — the bridge between the two halves of the split
//! transport.
//!
//! An SSE client talks to the server over two independent connections:
//! the long-lived event stream it receives responses on, and short-lived
//! POSTs it submits requests through. The registry is the sole owner of
//! the map from session id to the session's inbound channel, so a POST
//! tagged with a session id lands on the right dispatch loop and never
//! on another client's.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use tokio::sync::mpsc;
use uuid::Uuid;

use crate::types::{JsonRpcMessage, McpError, McpResult};

/// The registry's view of one attached session: where to push inbound
/// client messages.
#[derive(Clone)]
pub struct SessionHandle {
    inbound: mpsc::Sender<JsonRpcMessage>,
}

#[derive(Default)]
pub struct SessionRegistry {
    sessions: Mutex<HashMap<Uuid, SessionHandle>>,
}

impl SessionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a session under a fresh identifier. The returned id is
    /// what the client must tag its submissions with.
    pub fn register(&self, inbound: mpsc::Sender<JsonRpcMessage>) -> Uuid {
        let id = Uuid::new_v4();
        let mut sessions = self.sessions.lock().unwrap_or_else(|e| e.into_inner());
        sessions.insert(id, SessionHandle { inbound });
        tracing::info!("Session {id} attached ({} active)", sessions.len());
        id
    }

    /// Look up the inbound channel for `id`. A message for an unknown
    /// or already-closed session is rejected, never buffered.
    pub fn inbound(&self, id: Uuid) -> McpResult<mpsc::Sender<JsonRpcMessage>> {
        let sessions = self.sessions.lock().unwrap_or_else(|e| e.into_inner());
        sessions
            .get(&id)
            .map(|h| h.inbound.clone())
            .ok_or(McpError::SessionNotFound(id))
    }

    /// Drop the session's entry. Closing the inbound channel here is
    /// what stops its dispatch loop from awaiting further input.
    pub fn remove(&self, id: Uuid) -> bool {
        let mut sessions = self.sessions.lock().unwrap_or_else(|e| e.into_inner());
        let removed = sessions.remove(&id).is_some();
        if removed {
            tracing::info!("Session {id} detached ({} active)", sessions.len());
        }
        removed
    }

    pub fn len(&self) -> usize {
        let sessions = self.sessions.lock().unwrap_or_else(|e| e.into_inner());
        sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Removes the session from the registry when the event stream is
/// dropped, i.e. on client disconnect or server shutdown of that
/// session. Dropping the registry entry closes the inbound sender,
/// which ends the session's dispatch task promptly.
pub struct SessionGuard {
    registry: Arc<SessionRegistry>,
    id: Uuid,
}

impl SessionGuard {
    pub fn new(registry: Arc<SessionRegistry>, id: Uuid) -> Self {
        Self { registry, id }
    }
}

impl Drop for SessionGuard {
    fn drop(&mut self) {
        self.registry.remove(self.id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn register_route_remove() {
        let registry = SessionRegistry::new();
        let (tx, mut rx) = mpsc::channel(4);
        let id = registry.register(tx);
        assert_eq!(registry.len(), 1);

        let msg: JsonRpcMessage = serde_json::from_value(serde_json::json!({
            "jsonrpc": "2.0", "id": 1, "method": "ping"
        }))
        .unwrap();
        registry.inbound(id).unwrap().send(msg).await.unwrap();
        assert!(matches!(
            rx.recv().await,
            Some(JsonRpcMessage::Request(_))
        ));

        assert!(registry.remove(id));
        assert!(registry.inbound(id).is_err());
        // All senders gone: the dispatch side sees end-of-stream.
        assert!(rx.recv().await.is_none());
    }

    #[tokio::test]
    async fn unknown_session_is_rejected() {
        let registry = SessionRegistry::new();
        let err = registry.inbound(Uuid::new_v4()).unwrap_err();
        assert!(matches!(err, McpError::SessionNotFound(_)));
    }

    #[tokio::test]
    async fn guard_removes_on_drop() {
        let registry = Arc::new(SessionRegistry::new());
        let (tx, _rx) = mpsc::channel(4);
        let id = registry.register(tx);
        {
            let _guard = SessionGuard::new(registry.clone(), id);
        }
        assert!(registry.is_empty());
    }

    #[tokio::test]
    async fn sessions_are_independent() {
        let registry = SessionRegistry::new();
        let (tx_a, mut rx_a) = mpsc::channel(4);
        let (tx_b, mut rx_b) = mpsc::channel(4);
        let a = registry.register(tx_a);
        let b = registry.register(tx_b);
        assert_ne!(a, b);

        registry.remove(a);
        assert!(rx_a.recv().await.is_none());

        // Session B still routes after A is gone.
        let msg: JsonRpcMessage = serde_json::from_value(serde_json::json!({
            "jsonrpc": "2.0", "id": 2, "method": "ping"
        }))
        .unwrap();
        registry.inbound(b).unwrap().send(msg).await.unwrap();
        assert!(rx_b.recv().await.is_some());
    }
}
