//! File reading tool.

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{json, Value};
use tokio::fs;

use super::{parse_params, Tool, ToolCallRecord, ToolContext, ToolResult};

/// Refuse to read files beyond this size.
const MAX_FILE_BYTES: u64 = 10 * 1024 * 1024;

pub struct ReadFileTool;

#[derive(Deserialize)]
struct Params {
    path: String,
    #[serde(default)]
    start_row: Option<usize>,
    #[serde(default)]
    end_row: Option<usize>,
    #[serde(default)]
    as_json: bool,
}

#[async_trait]
impl Tool for ReadFileTool {
    fn name(&self) -> &str {
        "read_file"
    }

    fn description(&self) -> &str {
        "Read content from a file, either whole or a 0-based inclusive row range. \
         Set as_json to pretty-print JSON files (incompatible with row ranges)."
    }

    fn parameters_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "path": {"type": "string", "description": "Path to the file"},
                "start_row": {"type": "integer", "description": "First row to read (0-based)"},
                "end_row": {"type": "integer", "description": "Last row to read (inclusive)"},
                "as_json": {"type": "boolean", "description": "Parse and pretty-print as JSON"}
            },
            "required": ["path"],
            "additionalProperties": false
        })
    }

    fn describe(&self, params: &Value) -> ToolCallRecord {
        let path = params.get("path").and_then(|p| p.as_str()).unwrap_or("?");
        ToolCallRecord::new(
            self.name(),
            format!("Reading {path}"),
            format!("Read {path}"),
            format!("Couldn't read {path}"),
            path,
        )
    }

    async fn execute(&self, params: Value, ctx: &ToolContext) -> ToolResult {
        let params = match parse_params::<Params>(params) {
            Ok(p) => p,
            Err(e) => return e,
        };

        let path = ctx.resolve(&params.path);

        let metadata = match fs::metadata(&path).await {
            Ok(m) => m,
            Err(_) => {
                return ToolResult::failure(format!("Error: File '{}' does not exist.", params.path))
            }
        };
        if !metadata.is_file() {
            return ToolResult::failure(format!("Error: '{}' is not a file.", params.path));
        }
        if metadata.len() > MAX_FILE_BYTES {
            return ToolResult::failure(format!(
                "Warning: File is very large ({:.2} MB).",
                metadata.len() as f64 / 1024.0 / 1024.0
            ));
        }

        let content = match fs::read_to_string(&path).await {
            Ok(c) => c,
            Err(e) => return ToolResult::failure(format!("Error reading file: {}", e)),
        };

        if params.as_json && params.start_row.is_some() {
            return ToolResult::failure(
                "Error: Cannot parse as JSON when displaying line numbers.".to_string(),
            );
        }

        if let Some(start) = params.start_row {
            let lines: Vec<&str> = content.split_inclusive('\n').collect();
            return match params.end_row {
                None => {
                    if start >= lines.len() {
                        ToolResult::failure(format!("Error: start_row {start} is out of range."))
                    } else {
                        ToolResult::ok(format!("Line {}: {}", start, lines[start]))
                    }
                }
                Some(end) if end < start => ToolResult::failure(
                    "Error: end_row must be greater than or equal to start_row.".to_string(),
                ),
                Some(end) => {
                    let selected = lines
                        .iter()
                        .enumerate()
                        .skip(start)
                        .take(end - start + 1)
                        .map(|(i, line)| format!("Line {}: {}", i, line))
                        .collect::<String>();
                    ToolResult::ok(selected)
                }
            };
        }

        if params.as_json {
            return match serde_json::from_str::<Value>(&content) {
                Ok(parsed) => match serde_json::to_string_pretty(&parsed) {
                    Ok(pretty) => ToolResult::ok(pretty),
                    Err(e) => ToolResult::failure(format!("Error formatting JSON: {}", e)),
                },
                Err(e) => ToolResult::failure(format!(
                    "Error: File content is not valid JSON. {}\n\nRaw content:\n{}",
                    e, content
                )),
            };
        }

        ToolResult::ok(content)
    }
}
