//! Tool and Toolkit traits — the abstraction over external capabilities.
//!
//! Tools are what let the assistant role act in the world: search the web,
//! fetch pages, write files, run commands. A Toolkit is a named group of
//! tools that may share one expensive resource (an HTTP client, a sandbox
//! working directory); toolkits are constructed at most once per process,
//! before the retry loop starts.

use crate::error::ToolError;
use crate::provider::ToolDefinition;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::warn;

/// A request to execute a tool.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolCall {
    /// Unique call ID (matches the LLM's tool_call.id)
    pub id: String,

    /// Name of the tool to execute
    pub name: String,

    /// Arguments as a JSON value
    pub arguments: serde_json::Value,
}

/// The result of a tool execution.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolResult {
    /// The call ID this result is for
    pub call_id: String,

    /// Whether the tool executed successfully
    pub success: bool,

    /// The output content
    pub output: String,
}

/// The core Tool trait.
///
/// Each tool (web_search, fetch_url, file_write, shell, …) implements this
/// trait. Tools are registered in the ToolRegistry and handed to the
/// assistant role as schema-described callables.
#[async_trait]
pub trait Tool: Send + Sync {
    /// The unique name of this tool (e.g., "web_search", "file_write").
    fn name(&self) -> &str;

    /// A description of what this tool does (sent to the LLM).
    fn description(&self) -> &str;

    /// JSON Schema describing this tool's parameters.
    fn parameters_schema(&self) -> serde_json::Value;

    /// Execute the tool with the given arguments.
    async fn execute(
        &self,
        arguments: serde_json::Value,
    ) -> std::result::Result<ToolResult, ToolError>;

    /// Convert this tool into a ToolDefinition for sending to the LLM.
    fn to_definition(&self) -> ToolDefinition {
        ToolDefinition {
            name: self.name().to_string(),
            description: self.description().to_string(),
            parameters: self.parameters_schema(),
        }
    }
}

/// A named group of tools, registered as a unit.
///
/// Construction is where a toolkit allocates any live resource it needs;
/// a toolkit that fails to construct aborts startup before any retry logic
/// runs. `into_tools` hands the tools over in the toolkit's internal order,
/// which the registry preserves.
pub trait Toolkit: Send {
    /// The toolkit name, used in registration diagnostics.
    fn name(&self) -> &str;

    /// Consume the toolkit, yielding its tools in order.
    fn into_tools(self: Box<Self>) -> Vec<Box<dyn Tool>>;
}

struct RegisteredTool {
    toolkit: String,
    tool: Box<dyn Tool>,
}

/// The ordered aggregation of every tool available to a session.
///
/// Built once at process start by registering toolkits; immutable afterward
/// and shared across attempts. The session uses it to:
/// 1. Get the ordered tool definitions to send to the LLM
/// 2. Look up and execute tools when the LLM requests them
///
/// Duplicate names are allowed but shadow: a later registration wins when a
/// call is resolved by name, and the registry logs the shadowing at
/// registration time so it is a visible decision rather than a silent one.
pub struct ToolRegistry {
    tools: Vec<RegisteredTool>,
    by_name: HashMap<String, usize>,
}

impl ToolRegistry {
    pub fn new() -> Self {
        Self {
            tools: Vec::new(),
            by_name: HashMap::new(),
        }
    }

    /// Register every tool a toolkit exposes, preserving its internal order.
    pub fn register(&mut self, toolkit: Box<dyn Toolkit>) {
        let toolkit_name = toolkit.name().to_string();
        for tool in toolkit.into_tools() {
            self.register_tool(&toolkit_name, tool);
        }
    }

    /// Register a single tool under a toolkit name.
    pub fn register_tool(&mut self, toolkit: &str, tool: Box<dyn Tool>) {
        let name = tool.name().to_string();
        let idx = self.tools.len();
        if let Some(&prev) = self.by_name.get(&name) {
            warn!(
                tool = %name,
                earlier_toolkit = %self.tools[prev].toolkit,
                later_toolkit = %toolkit,
                "duplicate tool name: later registration shadows the earlier one"
            );
        }
        self.tools.push(RegisteredTool {
            toolkit: toolkit.to_string(),
            tool,
        });
        self.by_name.insert(name, idx);
    }

    /// Get a tool by name. Resolves to the latest registration.
    pub fn get(&self, name: &str) -> Option<&dyn Tool> {
        self.by_name.get(name).map(|&i| self.tools[i].tool.as_ref())
    }

    /// All tool definitions, in registration order (for sending to the LLM).
    pub fn definitions(&self) -> Vec<ToolDefinition> {
        self.tools.iter().map(|r| r.tool.to_definition()).collect()
    }

    /// Execute a tool call, resolving the tool by name.
    pub async fn execute(&self, call: &ToolCall) -> std::result::Result<ToolResult, ToolError> {
        let tool = self
            .get(&call.name)
            .ok_or_else(|| ToolError::NotFound(call.name.clone()))?;
        let mut result = tool.execute(call.arguments.clone()).await?;
        result.call_id = call.id.clone();
        Ok(result)
    }

    /// All registered tool names, in registration order.
    pub fn names(&self) -> Vec<&str> {
        self.tools.iter().map(|r| r.tool.name()).collect()
    }

    /// Number of registered tools (shadowed entries included).
    pub fn len(&self) -> usize {
        self.tools.len()
    }

    /// Whether no tools are registered.
    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }
}

impl Default for ToolRegistry {
    fn default() -> Self {
        Self::new()
    }
}
