use super::traits::{Tool, required_str_field};
use crate::error::ToolError;
use async_trait::async_trait;
use serde_json::{Value, json};
use std::path::{Path, PathBuf};

/// Maximum file size served as an observation (256 KB).
const MAX_FILE_BYTES: u64 = 262_144;

/// Read a file from the workspace directory.
pub struct FileReadTool {
    workspace_dir: PathBuf,
}

impl FileReadTool {
    pub fn new(workspace_dir: PathBuf) -> Self {
        Self { workspace_dir }
    }

    /// Resolve a relative path inside the workspace, rejecting escapes.
    fn resolve(&self, relative: &str) -> Result<PathBuf, ToolError> {
        let candidate = self.workspace_dir.join(relative);
        let resolved = candidate.canonicalize().map_err(|_| {
            ToolError::execution(self.name(), format!("Failed to resolve file path: {relative}"))
        })?;
        let workspace = self
            .workspace_dir
            .canonicalize()
            .unwrap_or_else(|_| self.workspace_dir.clone());
        if !resolved.starts_with(&workspace) {
            return Err(ToolError::invalid_input(
                self.name(),
                format!("path escapes the workspace: {relative}"),
            ));
        }
        Ok(resolved)
    }
}

#[async_trait]
impl Tool for FileReadTool {
    fn name(&self) -> &str {
        "file_read"
    }

    fn description(&self) -> &str {
        "Read a text file from the workspace directory"
    }

    fn parameters_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "path": {
                    "type": "string",
                    "description": "Path relative to the workspace directory"
                }
            },
            "required": ["path"]
        })
    }

    async fn execute(&self, input: Value) -> Result<String, ToolError> {
        let relative = required_str_field(self.name(), &input, "path")?;
        let path = self.resolve(relative)?;

        let metadata = tokio::fs::metadata(&path)
            .await
            .map_err(|e| ToolError::execution(self.name(), e.to_string()))?;
        if metadata.len() > MAX_FILE_BYTES {
            return Err(ToolError::execution(
                self.name(),
                format!("file exceeds {MAX_FILE_BYTES} bytes"),
            ));
        }

        tokio::fs::read_to_string(&path)
            .await
            .map_err(|e| ToolError::execution(self.name(), readable_io_error(&path, &e)))
    }
}

fn readable_io_error(path: &Path, error: &std::io::Error) -> String {
    format!("{}: {error}", path.display())
}
