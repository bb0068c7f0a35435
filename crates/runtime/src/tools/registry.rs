//! Static table of tools an agent may call.

use std::sync::Arc;

use super::{Tool, ToolError};
use crate::model::{ToolCall, ToolResult, ToolSpec};

/// Tools registered for an agent, consulted by name when the model asks.
///
/// Registration happens once at startup; afterwards the registry is only
/// read, so it can be cloned cheaply into every request.
#[derive(Clone, Default)]
pub struct ToolRegistry {
    tools: Vec<Arc<dyn Tool>>,
    specs: Vec<ToolSpec>,
}

impl ToolRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a tool. A tool with the same name replaces the earlier one.
    pub fn with_tool(mut self, tool: impl Tool + 'static) -> Self {
        let spec = tool.spec();
        if let Some(index) = self.specs.iter().position(|s| s.name == spec.name) {
            self.tools.remove(index);
            self.specs.remove(index);
        }
        self.tools.push(Arc::new(tool));
        self.specs.push(spec);
        self
    }

    /// Tool specifications in registration order.
    pub fn specs(&self) -> &[ToolSpec] {
        &self.specs
    }

    fn find(&self, name: &str) -> Option<&Arc<dyn Tool>> {
        self.specs
            .iter()
            .position(|s| s.name == name)
            .map(|index| &self.tools[index])
    }

    /// Execute a tool call, turning host-level failures into error results.
    #[tracing::instrument(skip_all, fields(tool = %call.name, call_id = %call.id))]
    pub async fn execute(&self, call: &ToolCall) -> ToolResult {
        let Some(tool) = self.find(&call.name) else {
            tracing::warn!("model requested an unregistered tool");
            return ToolResult::failure(&call.id, &ToolError::NotFound(call.name.clone()));
        };

        match tool.invoke(call.input.clone()).await {
            Ok(output) => {
                tracing::debug!(bytes = output.len(), "tool finished");
                ToolResult::success(&call.id, output)
            }
            Err(e) => {
                tracing::warn!(error = %e, "tool rejected its input");
                ToolResult::failure(&call.id, &e)
            }
        }
    }
}

impl std::fmt::Debug for ToolRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list()
            .entries(self.specs.iter().map(|s| &s.name))
            .finish()
    }
}
