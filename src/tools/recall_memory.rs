//! Tool: recall_memory — read from the shared key/value memory.

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{json, Value};

use crate::store::MemoryStore;
use crate::types::{McpError, McpResult, ToolCallResult, ToolDefinition};

pub struct RecallMemory;

#[derive(Debug, Deserialize)]
struct RecallParams {
    key: String,
}

#[async_trait]
impl super::Tool for RecallMemory {
    fn definition(&self) -> ToolDefinition {
        ToolDefinition {
            name: "recall_memory".to_string(),
            description: Some("Recall from memory".to_string()),
            input_schema: json!({
                "type": "object",
                "properties": {
                    "key": { "type": "string" }
                },
                "required": ["key"]
            }),
        }
    }

    async fn invoke(&self, args: Value, store: &MemoryStore) -> McpResult<ToolCallResult> {
        let params: RecallParams =
            serde_json::from_value(args).map_err(|e| McpError::InvalidParams(e.to_string()))?;

        let text = store
            .get(&params.key)
            .unwrap_or_else(|| "Not found".to_string());

        Ok(ToolCallResult::text(text))
    }
}
