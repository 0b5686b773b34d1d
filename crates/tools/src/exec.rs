//! Exec toolkit — run allowlisted shell commands.

use async_trait::async_trait;
use taskhawk_core::error::ToolError;
use taskhawk_core::tool::{Tool, ToolResult, Toolkit};
use tokio::process::Command;
use tracing::{debug, warn};

/// Toolkit exposing a single `shell` tool with a command allowlist.
pub struct ExecToolkit {
    allowed_commands: Vec<String>,
}

impl ExecToolkit {
    pub fn new(allowed_commands: Vec<String>) -> Self {
        Self { allowed_commands }
    }
}

impl Toolkit for ExecToolkit {
    fn name(&self) -> &str {
        "exec"
    }

    fn into_tools(self: Box<Self>) -> Vec<Box<dyn Tool>> {
        vec![Box::new(ShellTool {
            allowed_commands: self.allowed_commands,
        })]
    }
}

struct ShellTool {
    /// If non-empty, only these commands are allowed.
    allowed_commands: Vec<String>,
}

impl ShellTool {
    fn is_command_allowed(&self, command: &str) -> bool {
        if self.allowed_commands.is_empty() {
            return true; // No allowlist = all commands allowed
        }

        let base_cmd = command.split_whitespace().next().unwrap_or("").trim();
        self.allowed_commands.iter().any(|a| a == base_cmd)
    }
}

#[async_trait]
impl Tool for ShellTool {
    fn name(&self) -> &str {
        "shell"
    }

    fn description(&self) -> &str {
        "Execute a shell command and return stdout/stderr. Use this for inspecting files or running small scripts."
    }

    fn parameters_schema(&self) -> serde_json::Value {
        serde_json::json!({
            "type": "object",
            "properties": {
                "command": {
                    "type": "string",
                    "description": "The shell command to execute"
                }
            },
            "required": ["command"]
        })
    }

    async fn execute(&self, arguments: serde_json::Value) -> Result<ToolResult, ToolError> {
        let command = arguments["command"]
            .as_str()
            .ok_or_else(|| ToolError::InvalidArguments("Missing 'command' argument".into()))?;

        if !self.is_command_allowed(command) {
            return Err(ToolError::PermissionDenied {
                tool_name: "shell".into(),
                reason: format!(
                    "Command '{}' not in allowlist",
                    command.split_whitespace().next().unwrap_or("")
                ),
            });
        }

        debug!(command = %command, "Executing shell command");

        let output = if cfg!(target_os = "windows") {
            Command::new("cmd").args(["/C", command]).output().await
        } else {
            Command::new("sh").args(["-c", command]).output().await
        };

        match output {
            Ok(output) => {
                let stdout = String::from_utf8_lossy(&output.stdout).to_string();
                let stderr = String::from_utf8_lossy(&output.stderr).to_string();
                let success = output.status.success();

                let result_text = if success {
                    if stderr.is_empty() {
                        stdout
                    } else {
                        format!("{stdout}\n[stderr]: {stderr}")
                    }
                } else {
                    let code = output.status.code().unwrap_or(-1);
                    warn!(command = %command, exit_code = code, "Command failed");
                    format!("[exit code: {code}]\n{stdout}\n{stderr}")
                };

                Ok(ToolResult {
                    call_id: String::new(),
                    success,
                    output: result_text.trim().to_string(),
                })
            }
            Err(e) => Err(ToolError::ExecutionFailed {
                tool_name: "shell".into(),
                reason: e.to_string(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn shell(allow: Vec<String>) -> Box<dyn Tool> {
        Toolkit::into_tools(Box::new(ExecToolkit::new(allow)))
            .pop()
            .unwrap()
    }

    #[tokio::test]
    async fn execute_echo() {
        let tool = shell(vec![]);
        let result = tool
            .execute(serde_json::json!({"command": "echo hello"}))
            .await
            .unwrap();
        assert!(result.success);
        assert!(result.output.contains("hello"));
    }

    #[tokio::test]
    async fn blocked_command() {
        let tool = shell(vec!["ls".into()]);
        let result = tool.execute(serde_json::json!({"command": "rm -rf /"})).await;
        assert!(matches!(result, Err(ToolError::PermissionDenied { .. })));
    }

    #[tokio::test]
    async fn failing_command_reports_exit_code() {
        let tool = shell(vec![]);
        let result = tool
            .execute(serde_json::json!({"command": "sh -c 'exit 3'"}))
            .await
            .unwrap();
        assert!(!result.success);
        assert!(result.output.contains("exit code: 3"));
    }
}
