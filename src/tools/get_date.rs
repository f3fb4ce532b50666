//! Tool: get_date — current calendar date, long form.

use async_trait::async_trait;
use chrono::NaiveDate;
use serde_json::{json, Value};

use crate::store::MemoryStore;
use crate::types::{McpResult, ToolCallResult, ToolDefinition};

pub struct GetDate;

/// Full weekday name, full month name, zero-padded day, year.
pub fn format_date(date: NaiveDate) -> String {
    date.format("%A, %B %d, %Y").to_string()
}

#[async_trait]
impl super::Tool for GetDate {
    fn definition(&self) -> ToolDefinition {
        ToolDefinition {
            name: "get_date".to_string(),
            description: Some("Get current date".to_string()),
            input_schema: json!({
                "type": "object",
                "properties": {},
                "required": []
            }),
        }
    }

    async fn invoke(&self, _args: Value, _store: &MemoryStore) -> McpResult<ToolCallResult> {
        Ok(ToolCallResult::text(format_date(
            chrono::Local::now().date_naive(),
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn formats_fixed_date() {
        let date = NaiveDate::from_ymd_opt(2026, 1, 5).unwrap();
        assert_eq!(format_date(date), "Monday, January 05, 2026");
    }
}
