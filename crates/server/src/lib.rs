//! Trip Coach HTTP service.
//!
//! Exposes `POST /ask`, which hands a traveller's prompt to the Trip Coach
//! agent together with a fixed session id and returns the agent's final
//! answer. The agent may call the weather tool any number of times before
//! answering; the conversation persists across requests.

pub mod api;
pub mod app;
pub mod config;
mod error;

pub use error::{Error, Result};
