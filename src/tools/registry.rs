//! Tool registration and dispatch.

use std::collections::HashMap;

use async_trait::async_trait;
use serde_json::Value;

use crate::store::MemoryStore;
use crate::types::{McpError, McpResult, ToolCallResult, ToolDefinition};

use super::{calculator, get_date, get_time, recall_memory, save_memory};

/// A named, schema-described operation callable by clients.
///
/// Implementations must not panic on bad input: argument problems and
/// execution failures come back as `ToolCallResult::error` so the
/// session stays healthy.
#[async_trait]
pub trait Tool: Send + Sync {
    fn definition(&self) -> ToolDefinition;

    async fn invoke(&self, args: Value, store: &MemoryStore) -> McpResult<ToolCallResult>;
}

/// Lookup table from tool name to handler, fixed at startup.
///
/// The catalog and the handler set always agree because both come from
/// the same `Box<dyn Tool>` entries.
pub struct ToolRegistry {
    tools: Vec<Box<dyn Tool>>,
    by_name: HashMap<String, usize>,
}

impl ToolRegistry {
    /// Build the registry with every built-in tool.
    ///
    /// Panics on a duplicate tool name — that is a startup-time
    /// programmer error, not a request-time condition.
    pub fn new() -> Self {
        Self::with_tools(vec![
            Box::new(get_time::GetTime),
            Box::new(get_date::GetDate),
            Box::new(calculator::Calculator),
            Box::new(save_memory::SaveMemory),
            Box::new(recall_memory::RecallMemory),
        ])
    }

    fn with_tools(tools: Vec<Box<dyn Tool>>) -> Self {
        let mut by_name = HashMap::with_capacity(tools.len());
        for (idx, tool) in tools.iter().enumerate() {
            let name = tool.definition().name;
            let previous = by_name.insert(name.clone(), idx);
            assert!(previous.is_none(), "duplicate tool name: {name}");
        }
        Self { tools, by_name }
    }

    /// The catalog, in registration order. Identical on every call.
    pub fn list(&self) -> Vec<ToolDefinition> {
        self.tools.iter().map(|t| t.definition()).collect()
    }

    /// Resolve `name` and run its handler.
    ///
    /// An unknown name is a resolution error; everything the handler
    /// itself reports comes back inside the `ToolCallResult`.
    pub async fn call(
        &self,
        name: &str,
        arguments: Option<Value>,
        store: &MemoryStore,
    ) -> McpResult<ToolCallResult> {
        let idx = self
            .by_name
            .get(name)
            .copied()
            .ok_or_else(|| McpError::ToolNotFound(name.to_string()))?;

        let args = arguments.unwrap_or(Value::Object(serde_json::Map::new()));

        match self.tools[idx].invoke(args, store).await {
            Ok(result) => Ok(result),
            // Bad arguments: report back as a failed invocation, not a
            // protocol error.
            Err(McpError::InvalidParams(msg)) => Ok(ToolCallResult::error(msg)),
            Err(other) => Err(other),
        }
    }
}

impl Default for ToolRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn every_cataloged_tool_resolves() {
        let registry = ToolRegistry::new();
        let store = MemoryStore::new();
        for def in registry.list() {
            // get/clock tools take no args; the rest get placeholders.
            let args = serde_json::json!({
                "expression": "1",
                "key": "k",
                "value": "v",
            });
            let result = registry.call(&def.name, Some(args), &store).await;
            assert!(result.is_ok(), "tool {} failed to resolve/run", def.name);
        }
    }

    #[tokio::test]
    async fn catalog_is_stable() {
        let registry = ToolRegistry::new();
        let first: Vec<_> = registry.list().iter().map(|d| d.name.clone()).collect();
        let second: Vec<_> = registry.list().iter().map(|d| d.name.clone()).collect();
        assert_eq!(first, second);
        assert_eq!(
            first,
            vec![
                "get_time",
                "get_date",
                "calculator",
                "save_memory",
                "recall_memory"
            ]
        );
    }

    #[tokio::test]
    async fn unknown_tool_is_resolution_error() {
        let registry = ToolRegistry::new();
        let store = MemoryStore::new();
        let err = registry.call("no_such_tool", None, &store).await.unwrap_err();
        assert!(matches!(err, McpError::ToolNotFound(_)));
    }

    #[test]
    #[should_panic(expected = "duplicate tool name")]
    fn duplicate_names_panic_at_startup() {
        ToolRegistry::with_tools(vec![
            Box::new(get_time::GetTime),
            Box::new(get_time::GetTime),
        ]);
    }
}
