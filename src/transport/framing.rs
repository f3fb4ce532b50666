//! Newline-delimited JSON framing for the stdio transport.

use crate::types::{JsonRpcMessage, McpError, McpResult};

/// Parse one line of text as a JSON-RPC message.
pub fn parse_message(line: &str) -> McpResult<JsonRpcMessage> {
    let trimmed = line.trim();
    if trimmed.is_empty() {
        return Err(McpError::ParseError("Empty message".to_string()));
    }

    serde_json::from_str(trimmed).map_err(|e| McpError::ParseError(e.to_string()))
}

/// Serialize a response value as one JSON line.
pub fn frame_message(value: &serde_json::Value) -> McpResult<String> {
    let mut json = serde_json::to_string(value).map_err(McpError::Json)?;
    json.push('\n');
    Ok(json)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_request_line() {
        let msg = parse_message(r#"{"jsonrpc":"2.0","id":1,"method":"ping"}"#).unwrap();
        assert!(matches!(msg, JsonRpcMessage::Request(_)));
    }

    #[test]
    fn rejects_truncated_json() {
        let err = parse_message(r#"{"broken":"#).unwrap_err();
        assert_eq!(err.code(), -32700);
    }

    #[test]
    fn frames_with_trailing_newline() {
        let framed = frame_message(&serde_json::json!({"ok": true})).unwrap();
        assert!(framed.ends_with('\n'));
        assert!(!framed[..framed.len() - 1].contains('\n'));
    }
}
