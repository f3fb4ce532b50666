//! Stdio transport — reads JSON-RPC lines from stdin, writes to stdout.
//!
//! One implicit session per process; used by desktop MCP clients that
//! spawn the server directly.

use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};

use crate::protocol::ProtocolHandler;
use crate::types::{McpError, McpResult, RequestId};

use super::framing;

pub struct StdioTransport {
    handler: ProtocolHandler,
}

impl StdioTransport {
    pub fn new(handler: ProtocolHandler) -> Self {
        Self { handler }
    }

    /// Run the transport loop until EOF on stdin.
    pub async fn run(&self) -> McpResult<()> {
        let stdin = tokio::io::stdin();
        let mut stdout = tokio::io::stdout();
        let mut reader = BufReader::new(stdin);
        let mut line = String::new();

        tracing::info!("Stdio transport started");

        loop {
            line.clear();
            let bytes_read = reader.read_line(&mut line).await.map_err(McpError::Io)?;

            if bytes_read == 0 {
                tracing::info!("EOF on stdin, shutting down");
                break;
            }

            let trimmed = line.trim();
            if trimmed.is_empty() {
                continue;
            }

            match framing::parse_message(trimmed) {
                Ok(msg) => {
                    if let Some(response) = self.handler.handle_message(msg).await {
                        write_line(&mut stdout, &response).await?;
                    }
                    if self.handler.is_closing().await {
                        tracing::info!("Shutdown handled, closing stdio session");
                        break;
                    }
                }
                Err(e) => {
                    tracing::warn!("Parse error: {e}");
                    let error_response = e.to_json_rpc_error(RequestId::Null);
                    let value = serde_json::to_value(error_response)
                        .map_err(|err| McpError::InternalError(err.to_string()))?;
                    write_line(&mut stdout, &value).await?;
                }
            }
        }

        Ok(())
    }
}

async fn write_line(
    stdout: &mut tokio::io::Stdout,
    value: &serde_json::Value,
) -> McpResult<()> {
    let framed = framing::frame_message(value)?;
    stdout
        .write_all(framed.as_bytes())
        .await
        .map_err(McpError::Io)?;
    stdout.flush().await.map_err(McpError::Io)?;
    Ok(())
}
