//! Conversation memory backed by the event store.

use std::collections::HashSet;
use std::sync::Arc;

use tokio::sync::{Mutex, MutexGuard};

use crate::Result;
use crate::model::{Message, Part, Role, ToolCall, ToolResult};
use storage::{Event, EventKind, EventStore, SessionId};

/// A conversation that outlives individual runs.
///
/// Every turn is appended to the store under a fixed [`SessionId`]; the full
/// history is replayed into model messages at the start of each run.
/// Clones share one turn lock, so runs on the same session never interleave
/// their events.
#[derive(Clone)]
pub struct Session {
    id: SessionId,
    store: Arc<EventStore>,
    turn: Arc<Mutex<()>>,
}

impl Session {
    pub fn new(id: SessionId, store: Arc<EventStore>) -> Self {
        Self {
            id,
            store,
            turn: Arc::default(),
        }
    }

    pub fn id(&self) -> &SessionId {
        &self.id
    }

    /// Wait for exclusive use of the conversation. Hold the guard for a
    /// whole run.
    pub async fn lock(&self) -> MutexGuard<'_, ()> {
        self.turn.lock().await
    }

    /// Rebuild the conversation as model messages.
    pub fn history(&self) -> Result<Vec<Message>> {
        let events = self.store.load_session(&self.id)?;
        Ok(prune_unanswered(replay(events)))
    }

    /// Record a user prompt.
    pub fn push_user(&self, text: &str) -> Result<()> {
        self.store
            .append(&Event::message(self.id.clone(), storage::Role::User, text))?;
        Ok(())
    }

    /// Record an assistant reply: its text first, then any tool calls.
    pub fn push_assistant(&self, message: &Message) -> Result<()> {
        let text = message.text();
        if !text.is_empty() {
            self.store.append(&Event::message(
                self.id.clone(),
                storage::Role::Assistant,
                text,
            ))?;
        }
        for call in message.tool_calls() {
            self.store.append(&Event::tool_call(
                self.id.clone(),
                call.id,
                call.name,
                call.input,
            ))?;
        }
        Ok(())
    }

    /// Record the results of a batch of tool calls.
    pub fn push_tool_results(&self, results: &[ToolResult]) -> Result<()> {
        for result in results {
            self.store.append(&Event::tool_result(
                self.id.clone(),
                &result.tool_call_id,
                &result.output,
                result.is_error,
            ))?;
        }
        Ok(())
    }

    /// Forget the whole conversation. Returns the number of events removed.
    pub fn clear(&self) -> Result<usize> {
        Ok(self.store.clear_session(&self.id)?)
    }
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session").field("id", &self.id).finish()
    }
}

/// Fold stored events back into messages.
fn replay(events: Vec<Event>) -> Vec<Message> {
    let mut messages: Vec<Message> = Vec::new();

    for event in events {
        match event.kind {
            EventKind::Message { role, content } => {
                messages.push(Message::new(Role::from(role), content));
            }
            EventKind::ToolCall {
                call_id,
                name,
                input,
            } => {
                let part = Part::ToolCall(ToolCall {
                    id: call_id,
                    name,
                    input,
                });
                match messages.last_mut() {
                    Some(last) if last.role == Role::Assistant => last.parts.push(part),
                    _ => messages.push(Message {
                        role: Role::Assistant,
                        parts: vec![part],
                    }),
                }
            }
            EventKind::ToolResult {
                call_id,
                output,
                is_error,
            } => {
                let result = ToolResult {
                    tool_call_id: call_id,
                    output,
                    is_error,
                };
                match messages.last_mut() {
                    Some(last) if last.is_tool_results() => {
                        last.parts.push(Part::ToolResult(result))
                    }
                    _ => messages.push(Message::tool_results(vec![result])),
                }
            }
        }
    }

    messages
}

/// Drop tool calls without a recorded result, and results without a call.
///
/// A run interrupted between the two leaves such orphans behind, and
/// providers reject histories that contain them.
fn prune_unanswered(mut messages: Vec<Message>) -> Vec<Message> {
    let mut called = HashSet::new();
    let mut answered = HashSet::new();
    for part in messages.iter().flat_map(|m| &m.parts) {
        match part {
            Part::ToolCall(call) => {
                called.insert(call.id.clone());
            }
            Part::ToolResult(result) => {
                answered.insert(result.tool_call_id.clone());
            }
            Part::Text(_) => {}
        }
    }

    for message in &mut messages {
        message.parts.retain(|part| match part {
            Part::ToolCall(call) => answered.contains(&call.id),
            Part::ToolResult(result) => called.contains(&result.tool_call_id),
            Part::Text(_) => true,
        });
    }
    messages.retain(|m| !m.parts.is_empty());
    messages
}
