//! Tool: save_memory — write to the shared key/value memory.

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{json, Value};

use crate::store::MemoryStore;
use crate::types::{McpError, McpResult, ToolCallResult, ToolDefinition};

pub struct SaveMemory;

#[derive(Debug, Deserialize)]
struct SaveParams {
    key: String,
    value: String,
}

#[async_trait]
impl super::Tool for SaveMemory {
    fn definition(&self) -> ToolDefinition {
        ToolDefinition {
            name: "save_memory".to_string(),
            description: Some("Save to memory".to_string()),
            input_schema: json!({
                "type": "object",
                "properties": {
                    "key": { "type": "string" },
                    "value": { "type": "string" }
                },
                "required": ["key", "value"]
            }),
        }
    }

    async fn invoke(&self, args: Value, store: &MemoryStore) -> McpResult<ToolCallResult> {
        let params: SaveParams =
            serde_json::from_value(args).map_err(|e| McpError::InvalidParams(e.to_string()))?;

        store.put(params.key.clone(), params.value.clone());
        tracing::debug!("Saved memory key '{}'", params.key);

        Ok(ToolCallResult::text(format!(
            "Saved: {} = {}",
            params.key, params.value
        )))
    }
}
