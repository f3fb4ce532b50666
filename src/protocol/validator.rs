//! JSON-RPC request validation.

use crate::types::{JsonRpcRequest, McpError, McpResult, JSONRPC_VERSION};

/// Validate that a JSON-RPC request is well-formed.
pub fn validate_request(request: &JsonRpcRequest) -> McpResult<()> {
    if request.jsonrpc != JSONRPC_VERSION {
        return Err(McpError::InvalidRequest(format!(
            "Expected jsonrpc version \"{JSONRPC_VERSION}\", got \"{}\"",
            request.jsonrpc
        )));
    }

    if request.method.is_empty() {
        return Err(McpError::InvalidRequest(
            "Method name must not be empty".to_string(),
        ));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::RequestId;

    fn request(jsonrpc: &str, method: &str) -> JsonRpcRequest {
        JsonRpcRequest {
            jsonrpc: jsonrpc.to_string(),
            id: RequestId::Number(1),
            method: method.to_string(),
            params: None,
        }
    }

    #[test]
    fn accepts_well_formed_request() {
        assert!(validate_request(&request("2.0", "tools/list")).is_ok());
    }

    #[test]
    fn rejects_wrong_version() {
        let err = validate_request(&request("1.0", "tools/list")).unwrap_err();
        assert_eq!(err.code(), -32600);
    }

    #[test]
    fn rejects_empty_method() {
        let err = validate_request(&request("2.0", "")).unwrap_err();
        assert_eq!(err.code(), -32600);
    }
}
