//! Main request dispatcher — receives JSON-RPC messages, routes to handlers.
//!
//! One `ProtocolHandler` exists per session; the surrounding dispatch
//! task feeds it one inbound message at a time, so responses on a
//! session are strictly ordered with respect to its requests.

use std::sync::Arc;
use tokio::sync::Mutex;

use serde_json::Value;

use crate::store::MemoryStore;
use crate::tools::ToolRegistry;
use crate::types::*;

use super::negotiation::SessionLifecycle;
use super::validator::validate_request;

pub struct ProtocolHandler {
    store: Arc<MemoryStore>,
    tools: Arc<ToolRegistry>,
    lifecycle: Mutex<SessionLifecycle>,
}

impl ProtocolHandler {
    pub fn new(store: Arc<MemoryStore>, tools: Arc<ToolRegistry>) -> Self {
        Self {
            store,
            tools,
            lifecycle: Mutex::new(SessionLifecycle::default()),
        }
    }

    /// Handle one inbound message. Requests produce exactly one
    /// response value; notifications produce none.
    pub async fn handle_message(&self, msg: JsonRpcMessage) -> Option<Value> {
        match msg {
            JsonRpcMessage::Request(req) => Some(self.handle_request(req).await),
            JsonRpcMessage::Notification(notif) => {
                self.handle_notification(notif).await;
                None
            }
            _ => {
                tracing::warn!("Received unexpected message type from client");
                None
            }
        }
    }

    /// True once an explicit close request has been handled. The
    /// transport's dispatch loop checks this after each response and
    /// releases the session: no new requests, outbound channel dropped.
    pub async fn is_closing(&self) -> bool {
        self.lifecycle.lock().await.is_closing()
    }

    async fn handle_request(&self, request: JsonRpcRequest) -> Value {
        if let Err(e) = validate_request(&request) {
            return serde_json::to_value(e.to_json_rpc_error(request.id)).unwrap_or_default();
        }

        let id = request.id.clone();
        let result = self.dispatch_request(&request).await;

        match result {
            Ok(value) => serde_json::to_value(JsonRpcResponse::new(id, value)).unwrap_or_default(),
            Err(e) => serde_json::to_value(e.to_json_rpc_error(id)).unwrap_or_default(),
        }
    }

    async fn dispatch_request(&self, request: &JsonRpcRequest) -> McpResult<Value> {
        match request.method.as_str() {
            "initialize" => self.handle_initialize(request.params.clone()).await,
            "ping" => Ok(Value::Object(serde_json::Map::new())),

            // Everything below requires a completed handshake.
            method => {
                self.lifecycle.lock().await.require_ready()?;
                match method {
                    "tools/list" => self.handle_tools_list().await,
                    "tools/call" => self.handle_tools_call(request.params.clone()).await,
                    "shutdown" => self.handle_shutdown().await,
                    _ => Err(McpError::MethodNotFound(method.to_string())),
                }
            }
        }
    }

    async fn handle_notification(&self, notification: JsonRpcNotification) {
        match notification.method.as_str() {
            "initialized" | "notifications/initialized" => {
                self.lifecycle.lock().await.mark_initialized();
            }
            "notifications/cancelled" | "$/cancelRequest" => {
                tracing::info!("Received cancellation notification");
            }
            _ => {
                tracing::debug!("Unknown notification: {}", notification.method);
            }
        }
    }

    async fn handle_initialize(&self, params: Option<Value>) -> McpResult<Value> {
        let init_params: InitializeParams = params
            .map(serde_json::from_value)
            .transpose()
            .map_err(|e| McpError::InvalidParams(e.to_string()))?
            .ok_or_else(|| McpError::InvalidParams("Initialize params required".to_string()))?;

        let mut lifecycle = self.lifecycle.lock().await;
        let result = lifecycle.negotiate(init_params)?;

        serde_json::to_value(result).map_err(|e| McpError::InternalError(e.to_string()))
    }

    async fn handle_shutdown(&self) -> McpResult<Value> {
        tracing::info!("Shutdown requested");
        self.lifecycle.lock().await.begin_close();
        Ok(Value::Object(serde_json::Map::new()))
    }

    async fn handle_tools_list(&self) -> McpResult<Value> {
        let result = ToolListResult {
            tools: self.tools.list(),
            next_cursor: None,
        };
        serde_json::to_value(result).map_err(|e| McpError::InternalError(e.to_string()))
    }

    async fn handle_tools_call(&self, params: Option<Value>) -> McpResult<Value> {
        let call_params: ToolCallParams = params
            .map(serde_json::from_value)
            .transpose()
            .map_err(|e| McpError::InvalidParams(e.to_string()))?
            .ok_or_else(|| McpError::InvalidParams("Tool call params required".to_string()))?;

        let result = self
            .tools
            .call(&call_params.name, call_params.arguments, &self.store)
            .await?;

        serde_json::to_value(result).map_err(|e| McpError::InternalError(e.to_string()))
    }
}
