//! Test runner tools for generated code.

use std::process::Stdio;
use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{json, Value};
use tokio::process::Command;

use super::terminal::run_command;
use super::{parse_params, Tool, ToolCallRecord, ToolContext, ToolResult};

const TEST_TIMEOUT: Duration = Duration::from_secs(600);

#[derive(Deserialize)]
struct Params {
    file_path: String,
}

fn test_command(program: &str, args: &[&str], file: &str, ctx: &ToolContext) -> Command {
    let mut cmd = Command::new(program);
    cmd.args(args)
        .arg(file)
        .current_dir(ctx.working_dir())
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true);
    cmd
}

pub struct RunPythonTestTool;

#[async_trait]
impl Tool for RunPythonTestTool {
    fn name(&self) -> &str {
        "run_python_test"
    }

    fn description(&self) -> &str {
        "Run a python test file with unittest and return the result."
    }

    fn parameters_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "file_path": {"type": "string", "description": "Path to the python test file"}
            },
            "required": ["file_path"],
            "additionalProperties": false
        })
    }

    fn describe(&self, params: &Value) -> ToolCallRecord {
        ToolCallRecord::new(
            self.name(),
            "Running python test",
            "Python test passed",
            "Python test failed",
            params
                .get("file_path")
                .and_then(|p| p.as_str())
                .unwrap_or("?"),
        )
    }

    async fn execute(&self, params: Value, ctx: &ToolContext) -> ToolResult {
        let params = match parse_params::<Params>(params) {
            Ok(p) => p,
            Err(e) => return e,
        };

        let cmd = test_command("python", &["-m", "unittest"], &params.file_path, ctx);
        match run_command(cmd, TEST_TIMEOUT).await {
            Ok((true, stdout, _)) => ToolResult::ok(stdout),
            Ok((false, _, stderr)) => ToolResult::failure(stderr),
            Err(failure) => failure,
        }
    }
}

pub struct RunJavascriptTestTool;

#[async_trait]
impl Tool for RunJavascriptTestTool {
    fn name(&self) -> &str {
        "run_javascript_test"
    }

    fn description(&self) -> &str {
        "Run a javascript test file with the node test runner and return the result."
    }

    fn parameters_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "file_path": {"type": "string", "description": "Path to the javascript test file"}
            },
            "required": ["file_path"],
            "additionalProperties": false
        })
    }

    fn describe(&self, params: &Value) -> ToolCallRecord {
        ToolCallRecord::new(
            self.name(),
            "Running javascript test",
            "Javascript test passed",
            "Javascript test failed",
            params
                .get("file_path")
                .and_then(|p| p.as_str())
                .unwrap_or("?"),
        )
    }

    async fn execute(&self, params: Value, ctx: &ToolContext) -> ToolResult {
        let params = match parse_params::<Params>(params) {
            Ok(p) => p,
            Err(e) => return e,
        };

        let cmd = test_command("node", &["--test"], &params.file_path, ctx);
        match run_command(cmd, TEST_TIMEOUT).await {
            Ok((true, stdout, _)) => ToolResult::ok(stdout),
            Ok((false, _, stderr)) => ToolResult::failure(stderr),
            Err(failure) => failure,
        }
    }
}
