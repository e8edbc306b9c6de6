//! Shell execution and command history tools.

use std::process::Stdio;
use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{json, Value};
use tokio::process::Command;
use tokio::time::timeout;

use super::{parse_params, Tool, ToolCallRecord, ToolContext, ToolResult};

const COMMAND_TIMEOUT: Duration = Duration::from_secs(600);

fn build_shell_command(command: &str, ctx: &ToolContext) -> Command {
    let mut cmd = if cfg!(windows) {
        let mut c = Command::new("cmd");
        c.arg("/C").arg(command);
        c
    } else {
        let mut c = Command::new("sh");
        c.arg("-c").arg(command);
        c
    };

    cmd.current_dir(ctx.working_dir())
        .env("NO_COLOR", "1")
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true);
    cmd
}

/// Run a command to completion under the shared timeout, returning
/// `(success, stdout, stderr)`.
pub(crate) async fn run_command(
    mut cmd: Command,
    limit: Duration,
) -> Result<(bool, String, String), ToolResult> {
    let child = match cmd.spawn() {
        Ok(c) => c,
        Err(e) => return Err(ToolResult::failure(format!("Error executing command: {}", e))),
    };

    match timeout(limit, child.wait_with_output()).await {
        Ok(Ok(output)) => Ok((
            output.status.success(),
            String::from_utf8_lossy(&output.stdout).into_owned(),
            String::from_utf8_lossy(&output.stderr).into_owned(),
        )),
        Ok(Err(e)) => Err(ToolResult::failure(format!(
            "Error executing command: {}",
            e
        ))),
        Err(_) => Err(ToolResult::failure(format!(
            "Command timed out after {} minutes",
            limit.as_secs() / 60
        ))),
    }
}

pub struct TerminalTool;

#[derive(Deserialize)]
struct TerminalParams {
    command: String,
}

#[async_trait]
impl Tool for TerminalTool {
    fn name(&self) -> &str {
        "terminal"
    }

    fn description(&self) -> &str {
        "Execute a command in the terminal and return its output. Runs in the \
         session working directory; the command is recorded in the history log."
    }

    fn parameters_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "command": {"type": "string", "description": "The command to execute"}
            },
            "required": ["command"],
            "additionalProperties": false
        })
    }

    fn describe(&self, params: &Value) -> ToolCallRecord {
        ToolCallRecord::new(
            self.name(),
            "Executing command",
            "Executed command",
            "Couldn't execute command",
            params
                .get("command")
                .and_then(|c| c.as_str())
                .unwrap_or("?"),
        )
    }

    async fn execute(&self, params: Value, ctx: &ToolContext) -> ToolResult {
        let params = match parse_params::<TerminalParams>(params) {
            Ok(p) => p,
            Err(e) => return e,
        };

        let working_dir = ctx.working_dir();
        if !working_dir.exists() {
            return ToolResult::failure(format!(
                "Directory does not exist: {}",
                working_dir.display()
            ));
        }

        let cmd = build_shell_command(&params.command, ctx);
        match run_command(cmd, COMMAND_TIMEOUT).await {
            Ok((success, stdout, stderr)) => {
                ctx.history.lock().record(&params.command, success);
                if success {
                    ToolResult::ok(stdout)
                } else {
                    ToolResult::failure(stderr)
                }
            }
            Err(failure) => failure,
        }
    }
}

pub struct CommandHistoryTool;

#[derive(Deserialize)]
struct HistoryParams {
    #[serde(default = "default_count")]
    count: usize,
}

fn default_count() -> usize {
    10
}

#[async_trait]
impl Tool for CommandHistoryTool {
    fn name(&self) -> &str {
        "get_command_history"
    }

    fn description(&self) -> &str {
        "Retrieve the most recent shell command executions with their outcomes."
    }

    fn parameters_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "count": {"type": "integer", "description": "Number of recent commands (default 10)"}
            },
            "additionalProperties": false
        })
    }

    fn describe(&self, params: &Value) -> ToolCallRecord {
        let count = params.get("count").and_then(|c| c.as_u64()).unwrap_or(10);
        ToolCallRecord::new(
            self.name(),
            "Retrieving command history",
            "Retrieved command history",
            "Couldn't retrieve command history",
            format!("Retrieved the last {count} executed commands."),
        )
    }

    async fn execute(&self, params: Value, ctx: &ToolContext) -> ToolResult {
        let params = match parse_params::<HistoryParams>(params) {
            Ok(p) => p,
            Err(e) => return e,
        };
        ToolResult::ok(ctx.history.lock().render_recent(params.count))
    }
}
