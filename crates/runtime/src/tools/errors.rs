use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors the tool host reports back to the model instead of tool output.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Error)]
pub enum ToolError {
    #[error("tool not found: {0}")]
    NotFound(String),
    #[error("invalid input: {0}")]
    InvalidInput(String),
}
