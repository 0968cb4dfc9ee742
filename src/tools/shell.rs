use super::traits::{Tool, required_str_field};
use crate::error::ToolError;
use async_trait::async_trait;
use serde_json::{Value, json};
use std::path::PathBuf;
use std::time::Duration;

/// Maximum shell command execution time before kill.
const SHELL_TIMEOUT_SECS: u64 = 60;
/// Maximum observation size in bytes (64 KB).
const MAX_OUTPUT_BYTES: usize = 65_536;
/// Environment variables safe to pass to shell commands.
/// Only functional variables are included -- never API keys or secrets.
const SAFE_ENV_VARS: &[&str] = &[
    "PATH", "HOME", "TERM", "LANG", "LC_ALL", "LC_CTYPE", "USER", "SHELL",
];

/// Shell command execution scoped to a workspace directory.
pub struct ShellTool {
    workspace_dir: PathBuf,
}

impl ShellTool {
    pub fn new(workspace_dir: PathBuf) -> Self {
        Self { workspace_dir }
    }
}

#[async_trait]
impl Tool for ShellTool {
    fn name(&self) -> &str {
        "shell"
    }

    fn description(&self) -> &str {
        "Execute a shell command in the workspace directory"
    }

    fn parameters_schema(&self) -> Value {
        json!({
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

    async fn execute(&self, input: Value) -> Result<String, ToolError> {
        let command = required_str_field(self.name(), &input, "command")?;

        // Clear the environment to avoid leaking API keys and other secrets,
        // then re-add only safe, functional variables.
        let mut cmd = tokio::process::Command::new("sh");
        cmd.arg("-c")
            .arg(command)
            .current_dir(&self.workspace_dir)
            .env_clear();
        for var in SAFE_ENV_VARS {
            if let Ok(val) = std::env::var(var) {
                cmd.env(var, val);
            }
        }

        let output = tokio::time::timeout(Duration::from_secs(SHELL_TIMEOUT_SECS), cmd.output())
            .await
            .map_err(|_| {
                ToolError::execution(
                    self.name(),
                    format!("command timed out after {SHELL_TIMEOUT_SECS}s"),
                )
            })?
            .map_err(|e| ToolError::execution(self.name(), e.to_string()))?;

        let mut text = String::from_utf8_lossy(&output.stdout).into_owned();
        let stderr = String::from_utf8_lossy(&output.stderr);
        if !stderr.trim().is_empty() {
            if !text.is_empty() {
                text.push('\n');
            }
            text.push_str(stderr.trim_end());
        }
        if text.len() > MAX_OUTPUT_BYTES {
            let mut cut = MAX_OUTPUT_BYTES;
            while !text.is_char_boundary(cut) {
                cut -= 1;
            }
            text.truncate(cut);
            text.push_str("\n[output truncated]");
        }

        if output.status.success() {
            Ok(text)
        } else {
            Err(ToolError::execution(
                self.name(),
                format!("exit status {}: {}", output.status, text.trim()),
            ))
        }
    }
}
