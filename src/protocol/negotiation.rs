//! Capability negotiation and the per-session lifecycle state machine.

use crate::types::{InitializeParams, InitializeResult, McpError, McpResult, MCP_VERSION};

/// Session lifecycle as seen by the dispatch loop.
///
/// `Handshaking` until `initialize` succeeds, then `Ready`. `Closing`
/// is entered on an explicit shutdown; the transport observes it and
/// tears the session down. Transport disconnect skips straight to
/// removal from the registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SessionState {
    #[default]
    Handshaking,
    Ready,
    Closing,
}

/// Handshake and lifecycle state for one session.
#[derive(Debug, Clone, Copy, Default)]
pub struct SessionLifecycle {
    pub state: SessionState,
}

impl SessionLifecycle {
    /// Handle `initialize`: negotiate capabilities, move to `Ready`.
    pub fn negotiate(&mut self, params: InitializeParams) -> McpResult<InitializeResult> {
        if params.protocol_version != MCP_VERSION {
            tracing::warn!(
                "Client requested protocol version {}, server supports {}. Proceeding with server version.",
                params.protocol_version,
                MCP_VERSION
            );
        }

        self.state = SessionState::Ready;

        tracing::info!(
            "Initialized with client: {} v{} (sampling: {}, roots: {})",
            params.client_info.name,
            params.client_info.version,
            params.capabilities.sampling.is_some(),
            params.capabilities.roots.is_some(),
        );

        Ok(InitializeResult::default_result())
    }

    /// Requests other than `initialize`/`ping` are rejected until the
    /// handshake has completed. Nothing is queued.
    pub fn require_ready(&self) -> McpResult<()> {
        match self.state {
            SessionState::Ready => Ok(()),
            SessionState::Handshaking => Err(McpError::NotInitialized),
            SessionState::Closing => Err(McpError::InvalidRequest(
                "Session is shutting down".to_string(),
            )),
        }
    }

    /// The `initialized` notification — recorded, not required before
    /// servicing begins.
    pub fn mark_initialized(&mut self) {
        tracing::info!("MCP handshake complete");
    }

    pub fn begin_close(&mut self) {
        self.state = SessionState::Closing;
    }

    pub fn is_closing(&self) -> bool {
        self.state == SessionState::Closing
    }
}
