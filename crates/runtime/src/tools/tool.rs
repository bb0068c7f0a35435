//! The tool trait.

use crate::model::ToolSpec;
use crate::tools::ToolError;
use async_trait::async_trait;
use serde_json::Value;

/// A function the model may choose to call.
///
/// Implementations expose a fixed [`ToolSpec`] and turn the model's JSON
/// arguments into a single string of output. Failures inside the tool (an
/// upstream outage, an unknown place) are reported in that string;
/// [`ToolError`] is reserved for arguments that do not match the schema.
#[async_trait]
pub trait Tool: Send + Sync {
    /// Name, description and input schema shown to the model.
    fn spec(&self) -> ToolSpec;

    /// Run the tool with the model-supplied arguments.
    async fn invoke(&self, input: Value) -> Result<String, ToolError>;
}
