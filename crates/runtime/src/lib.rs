//! Trip Coach runtime: agents, model backends, tools and session memory.
//!
//! # Overview
//!
//! - **Agent**: a name, standing instructions and a [`ToolRegistry`].
//! - **Backend**: a trait abstracting the hosted model ([`OpenAiBackend`]).
//! - **Tool**: a named function the model may ask the runtime to call.
//! - **Session**: conversation memory persisted through [`storage::EventStore`].
//! - **Runner**: the loop that relays between model and tools until the
//!   model produces a final answer.
//!
//! # Example
//!
//! ```ignore
//! use runtime::{Agent, OpenAiBackend, Runner, Session, ToolRegistry};
//! use secrecy::Secret;
//! use std::sync::Arc;
//! use storage::{EventStore, SessionId};
//!
//! # async fn example() -> runtime::Result<()> {
//! let backend = OpenAiBackend::builder(Secret::new("sk-...".into()), "gpt-5").build();
//! let agent = Agent::new("Trip Coach", "Help travellers plan.").with_tools(ToolRegistry::new());
//! let session = Session::new(SessionId::from("travel_assistant"), Arc::new(EventStore::in_memory()?));
//!
//! let result = Runner::new(backend).run(&agent, "Hello!", &session).await?;
//! println!("{}", result.final_output);
//! # Ok(())
//! # }
//! ```

mod error;
pub mod model;
mod providers;
mod runner;
mod session;
pub mod tools;

pub use error::{Error, Result};
pub use model::{
    Backend, Message, ModelError, ModelRequest, ModelResponse, Part, Role, ToolCall, ToolResult,
    ToolSpec, Usage,
};
pub use providers::{
    ModelSettings, OPENAI_BASE_URL, OpenAiBackend, OpenAiBackendBuilder, ReasoningEffort, Verbosity,
};
pub use runner::{Agent, DEFAULT_MAX_TURNS, RunResult, Runner};
pub use session::Session;
pub use tools::{Tool, ToolError, ToolRegistry};
