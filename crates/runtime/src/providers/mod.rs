//! LLM provider adapters.
//!
//! Each provider implements the backend trait for its specific API.

mod openai;

pub use openai::{
    ModelSettings, OPENAI_BASE_URL, OpenAiBackend, OpenAiBackendBuilder, ReasoningEffort, Verbosity,
};
