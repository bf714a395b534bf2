use crate::traits::{Tool, ToolResult, ToolSpec};
use std::sync::Arc;
use tracing::{debug, warn};

const NAMESPACE_PREFIX: &str = "mcp";
const SEPARATOR: &str = "__";

/// A named, versioned set of tools exposed to the agent under
/// `mcp__<server>__<tool>` identifiers.
///
/// Built once up front; there is no way to add tools after construction.
pub struct ToolServer {
    name: String,
    version: String,
    tools: Vec<Arc<dyn Tool>>,
}

impl ToolServer {
    pub fn new(name: impl Into<String>, version: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            version: version.into(),
            tools: Vec::new(),
        }
    }

    pub fn with_tool(mut self, tool: impl Tool + 'static) -> Self {
        if self.tools.iter().any(|t| t.name() == tool.name()) {
            warn!(
                "Tool '{}' already registered on '{}', ignoring duplicate",
                tool.name(),
                self.name
            );
            return self;
        }
        self.tools.push(Arc::new(tool));
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn version(&self) -> &str {
        &self.version
    }

    pub fn qualified_name(&self, tool: &str) -> String {
        format!("{NAMESPACE_PREFIX}{SEPARATOR}{}{SEPARATOR}{tool}", self.name)
    }

    /// The identifiers the agent is permitted to call.
    pub fn allowed_tools(&self) -> Vec<String> {
        self.tools
            .iter()
            .map(|t| self.qualified_name(t.name()))
            .collect()
    }

    pub fn specs(&self) -> Vec<ToolSpec> {
        self.tools
            .iter()
            .map(|t| ToolSpec {
                name: self.qualified_name(t.name()),
                ..t.spec()
            })
            .collect()
    }

    fn resolve(&self, name: &str) -> Option<&Arc<dyn Tool>> {
        let prefix = format!("{NAMESPACE_PREFIX}{SEPARATOR}{}{SEPARATOR}", self.name);
        let bare = name.strip_prefix(&prefix).unwrap_or(name);
        self.tools.iter().find(|t| t.name() == bare)
    }

    /// Invokes a tool by bare or qualified name. Unknown names come back as
    /// an error result.
    pub async fn call(&self, name: &str, args: &serde_json::Value) -> ToolResult {
        match self.resolve(name) {
            Some(tool) => {
                debug!("Calling tool {} with {}", name, args);
                tool.execute(args).await
            }
            None => ToolResult::error(format!("Tool '{}' not found", name)),
        }
    }
}

/// The calculator server with `add` and `sub`.
pub fn calculator_server() -> ToolServer {
    crate::tools::Arithmetic::ALL
        .into_iter()
        .fold(ToolServer::new("calculator", "1.0.0"), |server, op| {
            server.with_tool(op)
        })
}
