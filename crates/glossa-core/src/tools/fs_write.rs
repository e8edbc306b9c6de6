//! File writing tools: the general writer and the generator's fixed-target
//! wrapper that produces the intermediate `HLC.json` artifact.

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{json, Value};
use tokio::fs;
use tokio::io::AsyncWriteExt;

use crate::artifact::HLC_FILE;

use super::{parse_params, preview, Tool, ToolCallRecord, ToolContext, ToolResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
enum WriteMode {
    #[default]
    Overwrite,
    Append,
}

impl WriteMode {
    fn as_str(self) -> &'static str {
        match self {
            WriteMode::Overwrite => "overwrite",
            WriteMode::Append => "append",
        }
    }
}

/// Shared write path: ensures the parent directory, normalises the trailing
/// newline, writes in the requested mode.
async fn write_content(
    ctx: &ToolContext,
    path: &str,
    content: &str,
    mode: WriteMode,
) -> ToolResult {
    let target = ctx.resolve(path);

    if let Some(parent) = target.parent() {
        if let Err(e) = fs::create_dir_all(parent).await {
            return ToolResult::failure(format!("Error writing to file: {}", e));
        }
    }

    let mut content = content.to_string();
    if !content.is_empty() && !content.ends_with('\n') {
        content.push('\n');
    }

    let outcome = match mode {
        WriteMode::Overwrite => fs::write(&target, content.as_bytes()).await,
        WriteMode::Append => {
            match fs::OpenOptions::new()
                .create(true)
                .append(true)
                .open(&target)
                .await
            {
                Ok(mut file) => file.write_all(content.as_bytes()).await,
                Err(e) => Err(e),
            }
        }
    };

    match outcome {
        Ok(()) => match fs::metadata(&target).await {
            Ok(meta) => ToolResult::ok(format!(
                "Successfully wrote {} bytes to '{}' in {} mode.",
                meta.len(),
                target.display(),
                mode.as_str()
            )),
            Err(_) => ToolResult::failure(format!(
                "Write operation completed, but unable to verify file exists at '{}'.",
                target.display()
            )),
        },
        Err(e) if e.kind() == std::io::ErrorKind::PermissionDenied => {
            ToolResult::failure(format!("Error: No permission to write to file '{}'.", path))
        }
        Err(e) => ToolResult::failure(format!("Error writing to file: {}", e)),
    }
}

pub struct WriteFileTool;

#[derive(Deserialize)]
struct WriteParams {
    path: String,
    content: String,
    #[serde(default)]
    mode: WriteMode,
}

#[async_trait]
impl Tool for WriteFileTool {
    fn name(&self) -> &str {
        "write_file"
    }

    fn description(&self) -> &str {
        "Write content to a file, overwriting or appending. Creates parent directories as needed."
    }

    fn parameters_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "path": {"type": "string", "description": "Path to the file"},
                "content": {"type": "string", "description": "Content to write"},
                "mode": {
                    "type": "string",
                    "enum": ["overwrite", "append"],
                    "description": "Write mode (default overwrite)"
                }
            },
            "required": ["path", "content"],
            "additionalProperties": false
        })
    }

    fn describe(&self, params: &Value) -> ToolCallRecord {
        let path = params.get("path").and_then(|p| p.as_str()).unwrap_or("?");
        let mode = params
            .get("mode")
            .and_then(|m| m.as_str())
            .unwrap_or("overwrite");
        let content = params.get("content").and_then(|c| c.as_str()).unwrap_or("");
        ToolCallRecord::new(
            self.name(),
            format!("Writing to {path} in {mode} mode"),
            format!("Successfully wrote to {path} in {mode} mode"),
            format!("Couldn't write to {path} in {mode} mode"),
            preview(content),
        )
    }

    async fn execute(&self, params: Value, ctx: &ToolContext) -> ToolResult {
        let params = match parse_params::<WriteParams>(params) {
            Ok(p) => p,
            Err(e) => return e,
        };
        write_content(ctx, &params.path, &params.content, params.mode).await
    }
}

/// The generator agent's only write surface: always targets the well-known
/// artifact file so the translator can pick it up.
pub struct WriteHlcTool;

#[derive(Deserialize)]
struct HlcParams {
    content: String,
}

#[async_trait]
impl Tool for WriteHlcTool {
    fn name(&self) -> &str {
        "write_hlc"
    }

    fn description(&self) -> &str {
        "Write the generated high-level-code JSON document to HLC.json in the working directory."
    }

    fn parameters_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "content": {"type": "string", "description": "The HLC JSON document"}
            },
            "required": ["content"],
            "additionalProperties": false
        })
    }

    fn describe(&self, params: &Value) -> ToolCallRecord {
        let content = params.get("content").and_then(|c| c.as_str()).unwrap_or("");
        ToolCallRecord::new(
            self.name(),
            format!("Writing to {HLC_FILE}"),
            format!("Successfully wrote to {HLC_FILE}"),
            format!("Couldn't write to {HLC_FILE}"),
            preview(content),
        )
    }

    async fn execute(&self, params: Value, ctx: &ToolContext) -> ToolResult {
        let params = match parse_params::<HlcParams>(params) {
            Ok(p) => p,
            Err(e) => return e,
        };
        write_content(ctx, HLC_FILE, &params.content, WriteMode::Overwrite).await
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
    async fn overwrite_creates_parents_and_appends_newline() {
        let dir = tempfile::tempdir().unwrap();

        let result = WriteFileTool
            .execute(
                json!({"path": "nested/deep/a.txt", "content": "hello"}),
                &ctx(&dir),
            )
            .await;

        assert!(result.success);
        let written = std::fs::read_to_string(dir.path().join("nested/deep/a.txt")).unwrap();
        assert_eq!(written, "hello\n");
    }

    #[tokio::test]
    async fn append_mode_extends_the_file() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("log.txt"), "one\n").unwrap();

        let result = WriteFileTool
            .execute(
                json!({"path": "log.txt", "content": "two", "mode": "append"}),
                &ctx(&dir),
            )
            .await;

        assert!(result.success);
        let written = std::fs::read_to_string(dir.path().join("log.txt")).unwrap();
        assert_eq!(written, "one\ntwo\n");
    }

    #[tokio::test]
    async fn write_hlc_targets_the_artifact_file() {
        let dir = tempfile::tempdir().unwrap();

        let result = WriteHlcTool
            .execute(json!({"content": "{\"modules\": []}"}), &ctx(&dir))
            .await;

        assert!(result.success);
        assert!(dir.path().join(HLC_FILE).exists());
    }
}
