//! Tool: calculator — restricted arithmetic expression evaluation.

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{json, Value};

use crate::calc;
use crate::store::MemoryStore;
use crate::types::{McpError, McpResult, ToolCallResult, ToolDefinition};

pub struct Calculator;

#[derive(Debug, Deserialize)]
struct CalculatorParams {
    expression: String,
}

#[async_trait]
impl super::Tool for Calculator {
    fn definition(&self) -> ToolDefinition {
        ToolDefinition {
            name: "calculator".to_string(),
            description: Some("Calculate math expression".to_string()),
            input_schema: json!({
                "type": "object",
                "properties": {
                    "expression": {
                        "type": "string",
                        "description": "Arithmetic expression over numbers and + - * / % ^ ( )"
                    }
                },
                "required": ["expression"]
            }),
        }
    }

    async fn invoke(&self, args: Value, _store: &MemoryStore) -> McpResult<ToolCallResult> {
        let params: CalculatorParams =
            serde_json::from_value(args).map_err(|e| McpError::InvalidParams(e.to_string()))?;

        // Evaluation failure is the tool's own output, not a protocol error.
        match calc::evaluate(&params.expression) {
            Ok(value) => Ok(ToolCallResult::text(calc::format_value(value))),
            Err(e) => Ok(ToolCallResult::error(format!("Error: {e}"))),
        }
    }
}
