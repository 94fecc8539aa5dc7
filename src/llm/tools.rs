//! Database query tool
//!
//! The single capability exposed to the model's tool-calling machinery: a
//! `query` function taking one SQL string. No validation beyond what the
//! database adapter does; the model is trusted to produce safe SQL.

use crate::db::{Database, QueryOutcome};
use mistralrs::{Function, Tool, ToolType};
use serde::Deserialize;
use serde_json::{json, Value};
use std::collections::HashMap;
use tracing::{info, warn};

/// Name the tool is registered under
pub const QUERY_TOOL_NAME: &str = "query";

/// Rows beyond this are summarized instead of rendered
pub const MAX_DISPLAY_ROWS: usize = 100;

/// Arguments the model supplies for a `query` call
#[derive(Debug, Deserialize)]
struct QueryArgs {
    query: String,
}

/// Build the tool descriptor handed to the chat request
pub fn query_tool_descriptor() -> Tool {
    let parameters: HashMap<String, Value> = [
        ("type".to_string(), json!("object")),
        (
            "properties".to_string(),
            json!({
                "query": {
                    "type": "string",
                    "description": "The SQL query to execute, in SQLite syntax"
                }
            }),
        ),
        ("required".to_string(), json!(["query"])),
    ]
    .into();

    Tool {
        tp: ToolType::Function,
        function: Function {
            name: QUERY_TOOL_NAME.to_string(),
            description: Some(
                "Query the ExplorationProduction well database using SQLite syntax \
                 and return the matching rows."
                    .to_string(),
            ),
            parameters: Some(parameters),
        },
    }
}

/// Executes `query` tool calls against the database adapter
pub struct DatabaseTool {
    db: Database,
    max_display_rows: usize,
}

impl DatabaseTool {
    /// Create a tool bound to the given database
    pub fn new(db: Database) -> Self {
        Self {
            db,
            max_display_rows: MAX_DISPLAY_ROWS,
        }
    }

    /// Dispatch one tool call and return the text handed back to the model.
    ///
    /// Never fails: unknown tools, malformed arguments, and query failures
    /// all come back as strings for the model to narrate.
    pub fn dispatch(&self, name: &str, arguments: &str) -> String {
        if name != QUERY_TOOL_NAME {
            warn!("Model called unknown tool: {}", name);
            return format!("Unknown tool: {}", name);
        }

        let args: QueryArgs = match serde_json::from_str(arguments) {
            Ok(args) => args,
            Err(e) => {
                warn!("Malformed tool arguments: {}", e);
                return format!("Invalid arguments for query tool: {}", e);
            }
        };

        info!("Running database tool with query: {}", args.query);
        let outcome = self.db.query(&args.query);
        let rendered = render_outcome(&outcome, self.max_display_rows);
        info!("Database tool returned: {}", rendered);
        rendered
    }
}

/// Render a query outcome as text for the model.
///
/// Failures pass the sentinel through unchanged; row sets are rendered as
/// tuples under a column header, capped at `max_rows`.
pub fn render_outcome(outcome: &QueryOutcome, max_rows: usize) -> String {
    match outcome {
        QueryOutcome::Failure(sentinel) => sentinel.clone(),
        QueryOutcome::Rows { columns, rows } => {
            if rows.is_empty() {
                return "The query returned no rows.".to_string();
            }

            let mut out = String::new();
            out.push_str(&columns.join(", "));
            out.push('\n');

            for row in rows.iter().take(max_rows) {
                let rendered: Vec<String> = row.iter().map(|v| v.to_string()).collect();
                out.push_str(&format!("({})\n", rendered.join(", ")));
            }

            if rows.len() > max_rows {
                out.push_str(&format!("... and {} more rows", rows.len() - max_rows));
            }

            out.trim_end().to_string()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::SqlValue;

    fn seeded_tool() -> DatabaseTool {
        let db = Database::open_in_memory().unwrap();
        db.setup().unwrap();
        DatabaseTool::new(db)
    }

    #[test]
    fn test_descriptor_exposes_single_query_capability() {
        let tool = query_tool_descriptor();
        assert_eq!(tool.function.name, QUERY_TOOL_NAME);
        assert!(tool.function.description.is_some());

        let params = tool.function.parameters.unwrap();
        assert_eq!(params["required"], json!(["query"]));
    }

    #[test]
    fn test_dispatch_valid_query() {
        let tool = seeded_tool();
        let result = tool.dispatch(
            QUERY_TOOL_NAME,
            r#"{"query": "SELECT COUNT(*) FROM ExplorationProduction"}"#,
        );
        assert!(result.contains("1000"));
    }

    #[test]
    fn test_dispatch_invalid_sql_returns_sentinel() {
        let tool = seeded_tool();
        let result = tool.dispatch(QUERY_TOOL_NAME, r#"{"query": "SELEKT nonsense"}"#);
        assert_eq!(result, "No Result Found");
    }

    #[test]
    fn test_dispatch_unknown_tool() {
        let tool = seeded_tool();
        let result = tool.dispatch("export_csv", "{}");
        assert!(result.contains("Unknown tool"));
    }

    #[test]
    fn test_dispatch_malformed_arguments() {
        let tool = seeded_tool();
        let result = tool.dispatch(QUERY_TOOL_NAME, "not json");
        assert!(result.contains("Invalid arguments"));
    }

    #[test]
    fn test_render_truncates_large_results() {
        let rows: Vec<Vec<SqlValue>> = (0..250)
            .map(|i| vec![SqlValue::Integer(i)])
            .collect();
        let outcome = QueryOutcome::Rows {
            columns: vec!["WellID".to_string()],
            rows,
        };

        let rendered = render_outcome(&outcome, MAX_DISPLAY_ROWS);
        assert!(rendered.contains("... and 150 more rows"));
        // header + capped rows + trailer
        assert_eq!(rendered.lines().count(), MAX_DISPLAY_ROWS + 2);
    }

    #[test]
    fn test_render_empty_rows() {
        let outcome = QueryOutcome::Rows {
            columns: vec!["WellID".to_string()],
            rows: Vec::new(),
        };
        assert_eq!(
            render_outcome(&outcome, MAX_DISPLAY_ROWS),
            "The query returned no rows."
        );
    }
}
