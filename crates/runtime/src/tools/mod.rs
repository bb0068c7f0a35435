//! Tool trait and registry.

pub mod errors;
mod registry;
mod tool;

pub use errors::ToolError;
pub use registry::ToolRegistry;
pub use tool::Tool;
