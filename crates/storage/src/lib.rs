//! SQLite-backed conversation log for Trip Coach sessions.
//!
//! Every turn of a conversation (user prompts, assistant replies, tool calls
//! and tool results) is appended to an event log keyed by a [`SessionId`].
//! The runtime replays the log to rebuild the model's context, which is what
//! gives separate HTTP requests a shared, multi-turn memory.
//!
//! # Example
//!
//! ```no_run
//! use storage::{Event, EventStore, Role, SessionId};
//!
//! let store = EventStore::open("events.db")?;
//! let session = SessionId::from("travel_assistant");
//!
//! store.append(&Event::message(session.clone(), Role::User, "Weather in Lisbon?"))?;
//! store.append(&Event::message(session.clone(), Role::Assistant, "Sunny, 75 °F."))?;
//!
//! for event in store.load_session(&session)? {
//!     println!("{}: {:?}", event.timestamp, event.kind);
//! }
//! # Ok::<(), storage::Error>(())
//! ```

mod error;
mod event;
mod store;

pub use error::{Error, Result};
pub use event::{Event, EventKind, Role, SessionId};
pub use store::{EventStore, SessionSummary};
