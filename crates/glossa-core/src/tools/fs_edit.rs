//! Row-oriented file editing tools: insert, update, delete.
//!
//! Rows are 0-based. Multi-row operations apply from the highest row down so
//! earlier edits never shift later targets.

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{json, Value};
use std::path::Path;
use tokio::fs;

use super::{parse_params, preview, Tool, ToolCallRecord, ToolContext, ToolResult};

/// Lines with terminators preserved, so joins reproduce the file exactly.
fn split_lines(content: &str) -> Vec<String> {
    content.split_inclusive('\n').map(str::to_string).collect()
}

async fn read_lines(path: &Path, display: &str) -> Result<Vec<String>, ToolResult> {
    match fs::read_to_string(path).await {
        Ok(content) => Ok(split_lines(&content)),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Err(ToolResult::failure(format!(
            "Error: File '{}' does not exist.",
            display
        ))),
        Err(e) if e.kind() == std::io::ErrorKind::PermissionDenied => Err(ToolResult::failure(
            format!("Error: No permission to modify file '{}'.", display),
        )),
        Err(e) => Err(ToolResult::failure(format!("Error reading file: {}", e))),
    }
}

async fn write_lines(path: &Path, lines: Vec<String>) -> Result<(), ToolResult> {
    fs::write(path, lines.concat())
        .await
        .map_err(|e| ToolResult::failure(format!("Error writing file: {}", e)))
}

fn normalize(content: &str) -> String {
    let mut content = content.to_string();
    if !content.is_empty() && !content.ends_with('\n') {
        content.push('\n');
    }
    content
}

// ── insert ─────────────────────────────────────────────────────────────

pub struct InsertFileContentTool;

#[derive(Deserialize)]
struct InsertParams {
    path: String,
    content: String,
    #[serde(default)]
    row: Option<usize>,
    #[serde(default)]
    rows: Option<Vec<usize>>,
}

#[async_trait]
impl Tool for InsertFileContentTool {
    fn name(&self) -> &str {
        "insert_file_content"
    }

    fn description(&self) -> &str {
        "Insert content at a row, at multiple rows, or append to the end of a file. \
         Rows past the end are padded with blank lines. Creates the file if missing."
    }

    fn parameters_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "path": {"type": "string", "description": "Path to the file"},
                "content": {"type": "string", "description": "Content to insert"},
                "row": {"type": "integer", "description": "Row to insert at (0-based)"},
                "rows": {
                    "type": "array",
                    "items": {"type": "integer"},
                    "description": "Rows to insert at"
                }
            },
            "required": ["path", "content"],
            "additionalProperties": false
        })
    }

    fn describe(&self, params: &Value) -> ToolCallRecord {
        let path = params.get("path").and_then(|p| p.as_str()).unwrap_or("?");
        let content = params.get("content").and_then(|c| c.as_str()).unwrap_or("");
        ToolCallRecord::new(
            self.name(),
            format!("Inserting to {path} file"),
            format!("Inserted to {path} file"),
            format!("Couldn't insert to {path} file"),
            preview(content),
        )
    }

    async fn execute(&self, params: Value, ctx: &ToolContext) -> ToolResult {
        let params = match parse_params::<InsertParams>(params) {
            Ok(p) => p,
            Err(e) => return e,
        };

        let path = ctx.resolve(&params.path);
        if let Some(parent) = path.parent() {
            if let Err(e) = fs::create_dir_all(parent).await {
                return ToolResult::failure(format!("Error inserting content: {}", e));
            }
        }
        if !path.exists() {
            if let Err(e) = fs::write(&path, "").await {
                return ToolResult::failure(format!("Error inserting content: {}", e));
            }
        }

        let mut lines = match read_lines(&path, &params.path).await {
            Ok(l) => l,
            Err(e) => return e,
        };

        let content = normalize(&params.content);
        let content_lines = split_lines(&content);

        let insert_at = |lines: &mut Vec<String>, row: usize, block: &[String]| {
            while lines.len() < row {
                lines.push("\n".to_string());
            }
            for (offset, line) in block.iter().enumerate() {
                lines.insert(row + offset, line.clone());
            }
        };

        if let Some(rows) = params.rows {
            let mut rows: Vec<usize> = rows;
            rows.sort_unstable();
            rows.dedup();
            rows.reverse();
            for &row in &rows {
                insert_at(&mut lines, row, &content_lines);
            }
            if let Err(e) = write_lines(&path, lines).await {
                return e;
            }
            ToolResult::ok(format!(
                "Successfully inserted content at rows {:?} in '{}'.",
                rows, params.path
            ))
        } else if let Some(row) = params.row {
            insert_at(&mut lines, row, &content_lines);
            if let Err(e) = write_lines(&path, lines).await {
                return e;
            }
            ToolResult::ok(format!(
                "Successfully inserted content at row {} in '{}'.",
                row, params.path
            ))
        } else {
            lines.extend(content_lines);
            if let Err(e) = write_lines(&path, lines).await {
                return e;
            }
            ToolResult::ok(format!(
                "Successfully appended content to '{}'.",
                params.path
            ))
        }
    }
}

// ── update ─────────────────────────────────────────────────────────────

pub struct UpdateFileContentTool;

#[derive(Deserialize)]
struct UpdateParams {
    path: String,
    content: String,
    #[serde(default)]
    row: Option<usize>,
    #[serde(default)]
    rows: Option<Vec<usize>>,
    #[serde(default)]
    substring: Option<String>,
}

#[async_trait]
impl Tool for UpdateFileContentTool {
    fn name(&self) -> &str {
        "update_file_content"
    }

    fn description(&self) -> &str {
        "Replace whole rows with new content, or replace a substring within the targeted rows."
    }

    fn parameters_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "path": {"type": "string", "description": "Path to the file"},
                "content": {"type": "string", "description": "Replacement content"},
                "row": {"type": "integer", "description": "Row to update (0-based)"},
                "rows": {
                    "type": "array",
                    "items": {"type": "integer"},
                    "description": "Rows to update"
                },
                "substring": {
                    "type": "string",
                    "description": "Substring to replace within the targeted rows"
                }
            },
            "required": ["path", "content"],
            "additionalProperties": false
        })
    }

    fn describe(&self, params: &Value) -> ToolCallRecord {
        let path = params.get("path").and_then(|p| p.as_str()).unwrap_or("?");
        ToolCallRecord::new(
            self.name(),
            format!("Updating {path} file"),
            format!("Updated {path} file"),
            format!("Couldn't update {path} file"),
            params
                .get("substring")
                .and_then(|s| s.as_str())
                .unwrap_or_default(),
        )
    }

    async fn execute(&self, params: Value, ctx: &ToolContext) -> ToolResult {
        let params = match parse_params::<UpdateParams>(params) {
            Ok(p) => p,
            Err(e) => return e,
        };

        let path = ctx.resolve(&params.path);
        let mut lines = match read_lines(&path, &params.path).await {
            Ok(l) => l,
            Err(e) => return e,
        };
        let total = lines.len();

        let replacement = if params.substring.is_none() {
            normalize(&params.content)
        } else {
            params.content.clone()
        };

        let target_rows: Vec<usize> = if let Some(rows) = &params.rows {
            rows.clone()
        } else if let Some(row) = params.row {
            vec![row]
        } else {
            (0..total).collect()
        };

        let mut updated = Vec::new();
        for &row in &target_rows {
            if row >= total {
                continue;
            }
            match &params.substring {
                Some(needle) => {
                    if lines[row].contains(needle) {
                        lines[row] = lines[row].replace(needle, &replacement);
                        updated.push(row);
                    }
                }
                None => {
                    lines[row] = replacement.clone();
                    updated.push(row);
                }
            }
        }

        if updated.is_empty() {
            return ToolResult::ok("No content was updated.".to_string());
        }

        if let Err(e) = write_lines(&path, lines).await {
            return e;
        }

        if params.substring.is_some() {
            ToolResult::ok(format!(
                "Successfully updated substring in rows {:?} in '{}'.",
                updated, params.path
            ))
        } else {
            ToolResult::ok(format!(
                "Successfully updated rows {:?} in '{}'.",
                updated, params.path
            ))
        }
    }
}

// ── delete ─────────────────────────────────────────────────────────────

pub struct DeleteFileContentTool;

#[derive(Deserialize)]
struct DeleteParams {
    path: String,
    #[serde(default)]
    row: Option<usize>,
    #[serde(default)]
    rows: Option<Vec<usize>>,
    #[serde(default)]
    substring: Option<String>,
}

#[async_trait]
impl Tool for DeleteFileContentTool {
    fn name(&self) -> &str {
        "delete_file_content"
    }

    fn description(&self) -> &str {
        "Delete a row, a set of rows, or a substring within the targeted rows. \
         With no selector, clears the whole file."
    }

    fn parameters_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "path": {"type": "string", "description": "Path to the file"},
                "row": {"type": "integer", "description": "Row to delete (0-based)"},
                "rows": {
                    "type": "array",
                    "items": {"type": "integer"},
                    "description": "Rows to delete"
                },
                "substring": {
                    "type": "string",
                    "description": "Substring to delete within the targeted rows"
                }
            },
            "required": ["path"],
            "additionalProperties": false
        })
    }

    fn describe(&self, params: &Value) -> ToolCallRecord {
        let path = params.get("path").and_then(|p| p.as_str()).unwrap_or("?");
        let substring = params.get("substring").and_then(|s| s.as_str());
        match substring {
            Some(needle) => ToolCallRecord::new(
                self.name(),
                format!("Deleting {needle} from {path} file"),
                format!("Deleted {needle} from {path} file"),
                format!("Couldn't delete {needle} from {path} file"),
                needle,
            ),
            None => ToolCallRecord::new(
                self.name(),
                format!("Deleting from {path} file"),
                format!("Deleted from {path} file"),
                format!("Couldn't delete from {path} file"),
                path,
            ),
        }
    }

    async fn execute(&self, params: Value, ctx: &ToolContext) -> ToolResult {
        let params = match parse_params::<DeleteParams>(params) {
            Ok(p) => p,
            Err(e) => return e,
        };

        let path = ctx.resolve(&params.path);
        let mut lines = match read_lines(&path, &params.path).await {
            Ok(l) => l,
            Err(e) => return e,
        };
        let total = lines.len();

        if let Some(needle) = &params.substring {
            let target_rows: Vec<usize> = if let Some(rows) = &params.rows {
                rows.clone()
            } else if let Some(row) = params.row {
                vec![row]
            } else {
                (0..total).collect()
            };

            let mut modified = Vec::new();
            for &row in &target_rows {
                if row < total && lines[row].contains(needle.as_str()) {
                    lines[row] = lines[row].replace(needle.as_str(), "");
                    modified.push(row);
                }
            }

            if modified.is_empty() {
                return ToolResult::ok(format!(
                    "No occurrences of '{}' found to delete.",
                    needle
                ));
            }

            if let Err(e) = write_lines(&path, lines).await {
                return e;
            }
            return ToolResult::ok(format!(
                "Successfully removed '{}' from rows {:?} in '{}'.",
                needle, modified, params.path
            ));
        }

        if let Some(rows) = &params.rows {
            let mut in_range: Vec<usize> = rows.iter().copied().filter(|&r| r < total).collect();
            in_range.sort_unstable();
            in_range.dedup();
            if in_range.is_empty() {
                return ToolResult::ok("No rows were within range to delete.".to_string());
            }
            for &row in in_range.iter().rev() {
                lines.remove(row);
            }
            if let Err(e) = write_lines(&path, lines).await {
                return e;
            }
            return ToolResult::ok(format!(
                "Successfully deleted rows {:?} from '{}'.",
                in_range, params.path
            ));
        }

        if let Some(row) = params.row {
            if row >= total {
                return ToolResult::failure(format!("Error: Row {} is out of range.", row));
            }
            lines.remove(row);
            if let Err(e) = write_lines(&path, lines).await {
                return e;
            }
            return ToolResult::ok(format!(
                "Successfully deleted row {} from '{}'.",
                row, params.path
            ));
        }

        if let Err(e) = write_lines(&path, Vec::new()).await {
            return e;
        }
        ToolResult::ok(format!(
            "Successfully cleared all content from '{}'.",
            params.path
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn ctx(dir: &tempfile::TempDir) -> ToolContext {
        ToolContext::new(PathBuf::from(dir.path()))
    }

    #[tokio::test]
    async fn delete_single_row_removes_exactly_that_line() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("f.txt"), "a\nb\nc\n").unwrap();

        let result = DeleteFileContentTool
            .execute(json!({"path": "f.txt", "row": 1}), &ctx(&dir))
            .await;

        assert!(result.success);
        let content = std::fs::read_to_string(dir.path().join("f.txt")).unwrap();
        assert_eq!(content, "a\nc\n");
    }

    #[tokio::test]
    async fn delete_out_of_range_row_fails() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("f.txt"), "a\n").unwrap();

        let result = DeleteFileContentTool
            .execute(json!({"path": "f.txt", "row": 5}), &ctx(&dir))
            .await;

        assert!(!result.success);
        assert!(result.message.contains("out of range"));
    }

    #[tokio::test]
    async fn delete_substring_only_touches_matching_rows() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("f.txt"), "foo bar\nbaz\nfoo qux\n").unwrap();

        let result = DeleteFileContentTool
            .execute(json!({"path": "f.txt", "substring": "foo "}), &ctx(&dir))
            .await;

        assert!(result.success);
        let content = std::fs::read_to_string(dir.path().join("f.txt")).unwrap();
        assert_eq!(content, "bar\nbaz\nqux\n");
    }

    #[tokio::test]
    async fn insert_at_row_shifts_following_lines() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("f.txt"), "a\nc\n").unwrap();

        let result = InsertFileContentTool
            .execute(
                json!({"path": "f.txt", "content": "b", "row": 1}),
                &ctx(&dir),
            )
            .await;

        assert!(result.success);
        let content = std::fs::read_to_string(dir.path().join("f.txt")).unwrap();
        assert_eq!(content, "a\nb\nc\n");
    }

    #[tokio::test]
    async fn insert_past_eof_pads_with_blank_lines() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("f.txt"), "a\n").unwrap();

        let result = InsertFileContentTool
            .execute(
                json!({"path": "f.txt", "content": "z", "row": 3}),
                &ctx(&dir),
            )
            .await;

        assert!(result.success);
        let content = std::fs::read_to_string(dir.path().join("f.txt")).unwrap();
        assert_eq!(content, "a\n\n\nz\n");
    }

    #[tokio::test]
    async fn insert_without_row_appends() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("f.txt"), "a\n").unwrap();

        let result = InsertFileContentTool
            .execute(json!({"path": "f.txt", "content": "b"}), &ctx(&dir))
            .await;

        assert!(result.success);
        let content = std::fs::read_to_string(dir.path().join("f.txt")).unwrap();
        assert_eq!(content, "a\nb\n");
    }

    #[tokio::test]
    async fn update_whole_row_replaces_line() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("f.txt"), "old\nkeep\n").unwrap();

        let result = UpdateFileContentTool
            .execute(
                json!({"path": "f.txt", "content": "new", "row": 0}),
                &ctx(&dir),
            )
            .await;

        assert!(result.success);
        let content = std::fs::read_to_string(dir.path().join("f.txt")).unwrap();
        assert_eq!(content, "new\nkeep\n");
    }

    #[tokio::test]
    async fn update_substring_within_rows() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("f.txt"), "let x = 1;\nlet x = 2;\n").unwrap();

        let result = UpdateFileContentTool
            .execute(
                json!({"path": "f.txt", "content": "y", "substring": "x", "rows": [1]}),
                &ctx(&dir),
            )
            .await;

        assert!(result.success);
        let content = std::fs::read_to_string(dir.path().join("f.txt")).unwrap();
        assert_eq!(content, "let x = 1;\nlet y = 2;\n");
    }

    #[tokio::test]
    async fn update_with_no_match_reports_nothing_updated() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("f.txt"), "a\n").unwrap();

        let result = UpdateFileContentTool
            .execute(
                json!({"path": "f.txt", "content": "x", "substring": "zzz"}),
                &ctx(&dir),
            )
            .await;

        assert!(result.success);
        assert_eq!(result.message, "No content was updated.");
    }
}
