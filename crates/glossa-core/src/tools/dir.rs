//! Directory navigation tools.
//!
//! These act on the session's shared working directory, never on the
//! process-wide current directory, so concurrent sessions stay isolated.

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{json, Value};
use tokio::fs;

use super::{parse_params, Tool, ToolCallRecord, ToolContext, ToolResult};

pub struct ListDirectoryTool;

#[derive(Deserialize)]
struct ListParams {
    #[serde(default)]
    path: Option<String>,
}

#[async_trait]
impl Tool for ListDirectoryTool {
    fn name(&self) -> &str {
        "list_directory"
    }

    fn description(&self) -> &str {
        "List the files and subdirectories of a directory. Defaults to the working directory."
    }

    fn parameters_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "path": {"type": "string", "description": "Directory to list (default: working directory)"}
            },
            "additionalProperties": false
        })
    }

    fn describe(&self, params: &Value) -> ToolCallRecord {
        ToolCallRecord::new(
            self.name(),
            "Viewing directory contents",
            "Viewed directory contents",
            "Couldn't view directory contents",
            params.get("path").and_then(|p| p.as_str()).unwrap_or("."),
        )
    }

    async fn execute(&self, params: Value, ctx: &ToolContext) -> ToolResult {
        let params = match parse_params::<ListParams>(params) {
            Ok(p) => p,
            Err(e) => return e,
        };

        let target = match &params.path {
            Some(p) => ctx.resolve(p),
            None => ctx.working_dir(),
        };

        let mut entries = match fs::read_dir(&target).await {
            Ok(e) => e,
            Err(_) => {
                return ToolResult::failure(format!(
                    "Error: '{}' is not a valid directory.",
                    target.display()
                ))
            }
        };

        let mut dirs = Vec::new();
        let mut files = Vec::new();
        while let Ok(Some(entry)) = entries.next_entry().await {
            let name = entry.file_name().to_string_lossy().to_string();
            match entry.file_type().await {
                Ok(ft) if ft.is_dir() => dirs.push(format!("{name}/")),
                Ok(_) => files.push(name),
                Err(_) => files.push(name),
            }
        }
        dirs.sort();
        files.sort();

        if dirs.is_empty() && files.is_empty() {
            return ToolResult::ok(format!("Directory '{}' is empty.", target.display()));
        }

        let mut output = format!("Contents of directory '{}':\n\n", target.display());
        if !dirs.is_empty() {
            output.push_str("Directories:\n");
            output.push_str(&dirs.join("\n"));
            output.push_str("\n\n");
        }
        if !files.is_empty() {
            output.push_str("Files:\n");
            output.push_str(&files.join("\n"));
            output.push('\n');
        }

        ToolResult::ok(output)
    }
}

pub struct ChangeDirectoryTool;

#[derive(Deserialize)]
struct ChangeParams {
    path: String,
}

#[async_trait]
impl Tool for ChangeDirectoryTool {
    fn name(&self) -> &str {
        "change_directory"
    }

    fn description(&self) -> &str {
        "Change the session working directory."
    }

    fn parameters_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "path": {"type": "string", "description": "Directory to switch to"}
            },
            "required": ["path"],
            "additionalProperties": false
        })
    }

    fn describe(&self, params: &Value) -> ToolCallRecord {
        ToolCallRecord::new(
            self.name(),
            "Changing directory",
            "Changed directory",
            "Couldn't change directory",
            params.get("path").and_then(|p| p.as_str()).unwrap_or("?"),
        )
    }

    async fn execute(&self, params: Value, ctx: &ToolContext) -> ToolResult {
        let params = match parse_params::<ChangeParams>(params) {
            Ok(p) => p,
            Err(e) => return e,
        };

        let target = ctx.resolve(&params.path);
        match fs::canonicalize(&target).await {
            Ok(canonical) => {
                if !canonical.is_dir() {
                    return ToolResult::failure(format!(
                        "Error: '{}' is not a directory.",
                        params.path
                    ));
                }
                ctx.set_working_dir(canonical.clone());
                ToolResult::ok(format!("Switched to directory: {}", canonical.display()))
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => ToolResult::failure(format!(
                "Error: Directory '{}' does not exist.",
                params.path
            )),
            Err(e) if e.kind() == std::io::ErrorKind::PermissionDenied => ToolResult::failure(
                format!("Error: No permission to access directory '{}'.", params.path),
            ),
            Err(e) => ToolResult::failure(format!("Error changing directory: {}", e)),
        }
    }
}

pub struct GetCurrentDirectoryTool;

#[async_trait]
impl Tool for GetCurrentDirectoryTool {
    fn name(&self) -> &str {
        "get_current_directory"
    }

    fn description(&self) -> &str {
        "Get the session working directory."
    }

    fn parameters_schema(&self) -> Value {
        json!({"type": "object", "additionalProperties": false})
    }

    fn describe(&self, _params: &Value) -> ToolCallRecord {
        ToolCallRecord::new(
            self.name(),
            "Retrieving current directory",
            "Retrieved current directory",
            "Couldn't retrieve current directory",
            "",
        )
    }

    async fn execute(&self, _params: Value, ctx: &ToolContext) -> ToolResult {
        ToolResult::ok(ctx.working_dir().display().to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[tokio::test]
    async fn change_directory_moves_the_session_cwd() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir(dir.path().join("sub")).unwrap();
        let ctx = ToolContext::new(PathBuf::from(dir.path()));

        let result = ChangeDirectoryTool
            .execute(json!({"path": "sub"}), &ctx)
            .await;

        assert!(result.success);
        assert!(ctx.working_dir().ends_with("sub"));

        let current = GetCurrentDirectoryTool.execute(json!({}), &ctx).await;
        assert!(current.message.ends_with("sub"));
    }

    #[tokio::test]
    async fn change_to_missing_directory_fails() {
        let dir = tempfile::tempdir().unwrap();
        let ctx = ToolContext::new(PathBuf::from(dir.path()));
        let before = ctx.working_dir();

        let result = ChangeDirectoryTool
            .execute(json!({"path": "missing"}), &ctx)
            .await;

        assert!(!result.success);
        assert_eq!(ctx.working_dir(), before);
    }

    #[tokio::test]
    async fn list_directory_separates_dirs_and_files() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir(dir.path().join("src")).unwrap();
        std::fs::write(dir.path().join("README.md"), "hi").unwrap();
        let ctx = ToolContext::new(PathBuf::from(dir.path()));

        let result = ListDirectoryTool.execute(json!({}), &ctx).await;

        assert!(result.success);
        assert!(result.message.contains("src/"));
        assert!(result.message.contains("README.md"));
    }

    #[tokio::test]
    async fn list_empty_directory() {
        let dir = tempfile::tempdir().unwrap();
        let ctx = ToolContext::new(PathBuf::from(dir.path()));

        let result = ListDirectoryTool.execute(json!({}), &ctx).await;

        assert!(result.success);
        assert!(result.message.contains("is empty"));
    }
}
