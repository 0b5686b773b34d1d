//! File toolkit — read and write files under the artifact output directory.
//!
//! `file_write` is how a session persists its output artifact (e.g. a CSV
//! with a header row and data rows). The toolkit owns the output directory
//! and creates it at construction time; every path is validated against it.

use async_trait::async_trait;
use std::path::PathBuf;
use taskhawk_core::error::ToolError;
use taskhawk_core::tool::{Tool, ToolResult, Toolkit};

use crate::pathsafe::validate_path;

/// Toolkit exposing `file_read` and `file_write`, scoped to one directory.
pub struct FileToolkit {
    output_dir: PathBuf,
}

impl FileToolkit {
    /// Build the toolkit, creating the output directory if needed.
    pub fn new(output_dir: impl Into<PathBuf>) -> Result<Self, ToolError> {
        let output_dir = output_dir.into();
        std::fs::create_dir_all(&output_dir).map_err(|e| ToolError::ToolkitInit {
            toolkit: "files".into(),
            reason: format!("cannot create output dir {}: {e}", output_dir.display()),
        })?;
        Ok(Self { output_dir })
    }
}

impl Toolkit for FileToolkit {
    fn name(&self) -> &str {
        "files"
    }

    fn into_tools(self: Box<Self>) -> Vec<Box<dyn Tool>> {
        vec![
            Box::new(FileReadTool {
                output_dir: self.output_dir.clone(),
            }),
            Box::new(FileWriteTool {
                output_dir: self.output_dir,
            }),
        ]
    }
}

struct FileReadTool {
    output_dir: PathBuf,
}

#[async_trait]
impl Tool for FileReadTool {
    fn name(&self) -> &str {
        "file_read"
    }

    fn description(&self) -> &str {
        "Read the content of a file in the output directory."
    }

    fn parameters_schema(&self) -> serde_json::Value {
        serde_json::json!({
            "type": "object",
            "properties": {
                "path": {
                    "type": "string",
                    "description": "The file path to read (relative to the output directory)"
                }
            },
            "required": ["path"]
        })
    }

    async fn execute(&self, arguments: serde_json::Value) -> Result<ToolResult, ToolError> {
        let path = arguments["path"]
            .as_str()
            .ok_or_else(|| ToolError::InvalidArguments("Missing 'path' argument".into()))?;

        let resolved = validate_path(path, &self.output_dir).map_err(|e| {
            ToolError::PermissionDenied {
                tool_name: "file_read".into(),
                reason: e.to_string(),
            }
        })?;

        match tokio::fs::read_to_string(&resolved).await {
            Ok(content) => Ok(ToolResult {
                call_id: String::new(),
                success: true,
                output: content,
            }),
            Err(e) => Ok(ToolResult {
                call_id: String::new(),
                success: false,
                output: format!("Failed to read file: {e}"),
            }),
        }
    }
}

struct FileWriteTool {
    output_dir: PathBuf,
}

#[async_trait]
impl Tool for FileWriteTool {
    fn name(&self) -> &str {
        "file_write"
    }

    fn description(&self) -> &str {
        "Write content to a file in the output directory. Creates the file if it doesn't exist, overwrites if it does. Use this to persist results, e.g. a CSV file with a header row and data rows."
    }

    fn parameters_schema(&self) -> serde_json::Value {
        serde_json::json!({
            "type": "object",
            "properties": {
                "path": {
                    "type": "string",
                    "description": "The file path to write to (relative to the output directory)"
                },
                "content": {
                    "type": "string",
                    "description": "The content to write"
                }
            },
            "required": ["path", "content"]
        })
    }

    async fn execute(&self, arguments: serde_json::Value) -> Result<ToolResult, ToolError> {
        let path = arguments["path"]
            .as_str()
            .ok_or_else(|| ToolError::InvalidArguments("Missing 'path' argument".into()))?;

        let content = arguments["content"]
            .as_str()
            .ok_or_else(|| ToolError::InvalidArguments("Missing 'content' argument".into()))?;

        let resolved = validate_path(path, &self.output_dir).map_err(|e| {
            ToolError::PermissionDenied {
                tool_name: "file_write".into(),
                reason: e.to_string(),
            }
        })?;

        // Ensure parent directory exists
        if let Some(parent) = resolved.parent()
            && let Err(e) = tokio::fs::create_dir_all(parent).await
        {
            return Ok(ToolResult {
                call_id: String::new(),
                success: false,
                output: format!("Failed to create directory: {e}"),
            });
        }

        match tokio::fs::write(&resolved, content).await {
            Ok(()) => Ok(ToolResult {
                call_id: String::new(),
                success: true,
                output: format!(
                    "Successfully wrote {} bytes to {}",
                    content.len(),
                    resolved.display()
                ),
            }),
            Err(e) => Ok(ToolResult {
                call_id: String::new(),
                success: false,
                output: format!("Failed to write file: {e}"),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tools_in(dir: &std::path::Path) -> Vec<Box<dyn Tool>> {
        Toolkit::into_tools(Box::new(FileToolkit::new(dir).unwrap()))
    }

    #[test]
    fn toolkit_tool_order() {
        let dir = tempfile::tempdir().unwrap();
        let names: Vec<String> = tools_in(dir.path())
            .iter()
            .map(|t| t.name().to_string())
            .collect();
        assert_eq!(names, vec!["file_read", "file_write"]);
    }

    #[tokio::test]
    async fn write_then_read_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let tools = tools_in(dir.path());

        let write = tools[1]
            .execute(serde_json::json!({
                "path": "courses.csv",
                "content": "name,fee\nWSET L1,4500\n"
            }))
            .await
            .unwrap();
        assert!(write.success);
        assert!(write.output.contains("bytes"));

        let read = tools[0]
            .execute(serde_json::json!({"path": "courses.csv"}))
            .await
            .unwrap();
        assert!(read.success);
        assert!(read.output.starts_with("name,fee"));
    }

    #[tokio::test]
    async fn write_creates_parent_dirs() {
        let dir = tempfile::tempdir().unwrap();
        let tools = tools_in(dir.path());

        let result = tools[1]
            .execute(serde_json::json!({
                "path": "nested/dir/file.txt",
                "content": "nested content"
            }))
            .await
            .unwrap();
        assert!(result.success);
        assert!(dir.path().join("nested/dir/file.txt").exists());
    }

    #[tokio::test]
    async fn traversal_blocked() {
        let dir = tempfile::tempdir().unwrap();
        let tools = tools_in(dir.path());

        let result = tools[1]
            .execute(serde_json::json!({
                "path": "../escape.txt",
                "content": "nope"
            }))
            .await;
        assert!(matches!(result, Err(ToolError::PermissionDenied { .. })));
    }

    #[tokio::test]
    async fn read_missing_file_is_soft_failure() {
        let dir = tempfile::tempdir().unwrap();
        let tools = tools_in(dir.path());

        let result = tools[0]
            .execute(serde_json::json!({"path": "absent.txt"}))
            .await
            .unwrap();
        assert!(!result.success);
        assert!(result.output.contains("Failed to read"));
    }

    #[tokio::test]
    async fn missing_content_argument() {
        let dir = tempfile::tempdir().unwrap();
        let tools = tools_in(dir.path());
        let result = tools[1].execute(serde_json::json!({"path": "x.txt"})).await;
        assert!(matches!(result, Err(ToolError::InvalidArguments(_))));
    }
}
