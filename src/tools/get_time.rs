//! Tool: get_time — current wall-clock time.

use async_trait::async_trait;
use chrono::NaiveDateTime;
use serde_json::{json, Value};

use crate::store::MemoryStore;
use crate::types::{McpResult, ToolCallResult, ToolDefinition};

pub struct GetTime;

/// Pure formatting half, split out so tests can pin the clock.
pub fn format_time(now: NaiveDateTime) -> String {
    now.format("%Y-%m-%d %H:%M:%S").to_string()
}

#[async_trait]
impl super::Tool for GetTime {
    fn definition(&self) -> ToolDefinition {
        ToolDefinition {
            name: "get_time".to_string(),
            description: Some("Get current time".to_string()),
            input_schema: json!({
                "type": "object",
                "properties": {},
                "required": []
            }),
        }
    }

    async fn invoke(&self, _args: Value, _store: &MemoryStore) -> McpResult<ToolCallResult> {
        Ok(ToolCallResult::text(format_time(
            chrono::Local::now().naive_local(),
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, NaiveTime};

    #[test]
    fn formats_fixed_clock() {
        let dt = NaiveDate::from_ymd_opt(2026, 1, 5)
            .unwrap()
            .and_time(NaiveTime::from_hms_opt(9, 30, 7).unwrap());
        assert_eq!(format_time(dt), "2026-01-05 09:30:07");
    }
}
