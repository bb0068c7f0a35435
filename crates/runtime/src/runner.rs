//! Agent definition and the run loop that drives it.

use crate::model::{Backend, Message, ModelRequest, Usage};
use crate::session::Session;
use crate::tools::ToolRegistry;
use crate::{Error, Result};

/// Model calls allowed per run before giving up.
pub const DEFAULT_MAX_TURNS: usize = 10;

/// An agent: a name, standing instructions and the tools it may call.
#[derive(Debug, Clone)]
pub struct Agent {
    pub name: String,
    pub instructions: String,
    pub tools: ToolRegistry,
}

impl Agent {
    pub fn new(name: impl Into<String>, instructions: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            instructions: instructions.into(),
            tools: ToolRegistry::new(),
        }
    }

    pub fn with_tools(mut self, tools: ToolRegistry) -> Self {
        self.tools = tools;
        self
    }
}

/// Outcome of a completed run.
#[derive(Debug, Clone)]
pub struct RunResult {
    /// Text of the model's last message.
    pub final_output: String,
    /// Tokens spent across every model call in the run.
    pub usage: Usage,
    /// Number of model calls made.
    pub turns: usize,
}

/// Drives an [`Agent`] against a model backend.
///
/// Each run replays the session history, appends the prompt, then alternates
/// model calls and tool execution until the model answers without asking
/// for tools. Every turn is persisted as it happens.
pub struct Runner<B> {
    backend: B,
    max_turns: usize,
}

impl<B: Backend> Runner<B> {
    pub fn new(backend: B) -> Self {
        Self {
            backend,
            max_turns: DEFAULT_MAX_TURNS,
        }
    }

    pub fn with_max_turns(mut self, max_turns: usize) -> Self {
        self.max_turns = max_turns.max(1);
        self
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    #[tracing::instrument(skip_all, fields(agent = %agent.name, session = %session.id()))]
    pub async fn run(&self, agent: &Agent, input: &str, session: &Session) -> Result<RunResult> {
        let _turn = session.lock().await;
        let mut messages = session.history()?;
        tracing::debug!(history = messages.len(), "loaded session history");

        session.push_user(input)?;
        messages.push(Message::user(input));

        let mut usage = Usage::default();
        for turn in 1..=self.max_turns {
            let response = self
                .backend
                .call(ModelRequest {
                    system: Some(agent.instructions.as_str()),
                    messages: &messages,
                    tools: agent.tools.specs(),
                })
                .await?;
            usage += response.usage;

            let message = response.message;
            session.push_assistant(&message)?;

            let calls = message.tool_calls();
            if calls.is_empty() {
                tracing::info!(
                    turns = turn,
                    input_tokens = usage.input_tokens,
                    output_tokens = usage.output_tokens,
                    "run finished"
                );
                return Ok(RunResult {
                    final_output: message.text(),
                    usage,
                    turns: turn,
                });
            }

            messages.push(message);

            let mut results = Vec::with_capacity(calls.len());
            for call in &calls {
                tracing::info!(tool = %call.name, "model requested tool");
                results.push(agent.tools.execute(call).await);
            }
            session.push_tool_results(&results)?;
            messages.push(Message::tool_results(results));
        }

        tracing::warn!(max_turns = self.max_turns, "run hit the turn limit");
        Err(Error::MaxTurnsExceeded(self.max_turns))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{ModelError, ModelResponse, Part, Role, ToolCall, ToolSpec};
    use crate::tools::{Tool, ToolError};
    use async_trait::async_trait;
    use serde_json::{Value, json};
    use std::collections::VecDeque;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::{Arc, Mutex};
    use std::time::Duration;
    use storage::{EventStore, SessionId};

    /// Replays canned replies and records what it was asked.
    #[derive(Default)]
    struct Scripted {
        replies: Mutex<VecDeque<Message>>,
        requests: Mutex<Vec<(Option<String>, Vec<Message>, usize)>>,
    }

    impl Scripted {
        fn new(replies: Vec<Message>) -> Self {
            Self {
                replies: Mutex::new(replies.into()),
                requests: Mutex::default(),
            }
        }
    }

    impl Backend for Scripted {
        async fn call(
            &self,
            request: ModelRequest<'_>,
        ) -> std::result::Result<ModelResponse, ModelError> {
            self.requests.lock().unwrap().push((
                request.system.map(str::to_string),
                request.messages.to_vec(),
                request.tools.len(),
            ));
            let message = self
                .replies
                .lock()
                .unwrap()
                .pop_front()
                .ok_or_else(|| ModelError::InvalidResponse("script exhausted".into()))?;
            Ok(ModelResponse {
                message,
                usage: Usage {
                    input_tokens: 10,
                    output_tokens: 2,
                },
            })
        }
    }

    struct Forecast;

    #[async_trait]
    impl Tool for Forecast {
        fn spec(&self) -> ToolSpec {
            ToolSpec {
                name: "get_weather_forecast".into(),
                description: "Fetch weather".into(),
                schema: json!({"type": "object"}),
            }
        }

        async fn invoke(&self, input: Value) -> std::result::Result<String, ToolError> {
            let city = input["city"]
                .as_str()
                .ok_or_else(|| ToolError::InvalidInput("city".into()))?;
            Ok(format!("{city}: Sunny"))
        }
    }

    /// Rejects tool calls that are not directly answered, like the hosted API.
    #[derive(Default)]
    struct Strict {
        calls: AtomicUsize,
    }

    impl Backend for Strict {
        async fn call(
            &self,
            request: ModelRequest<'_>,
        ) -> std::result::Result<ModelResponse, ModelError> {
            let messages = request.messages;
            for (i, message) in messages.iter().enumerate() {
                let answered = messages.get(i + 1).is_some_and(Message::is_tool_results);
                if !message.tool_calls().is_empty() && !answered {
                    return Err(ModelError::Api {
                        status: 400,
                        body: format!("tool calls at {i} not followed by tool messages"),
                    });
                }
            }

            let message = match messages.last() {
                Some(last) if last.is_tool_results() => Message::assistant("done"),
                _ => {
                    let n = self.calls.fetch_add(1, Ordering::SeqCst);
                    call_weather(&format!("call_{n}"), "Madrid")
                }
            };
            Ok(ModelResponse {
                message,
                usage: Usage::default(),
            })
        }
    }

    struct SlowForecast;

    #[async_trait]
    impl Tool for SlowForecast {
        fn spec(&self) -> ToolSpec {
            Forecast.spec()
        }

        async fn invoke(&self, input: Value) -> std::result::Result<String, ToolError> {
            tokio::time::sleep(Duration::from_millis(50)).await;
            Forecast.invoke(input).await
        }
    }

    fn call_weather(id: &str, city: &str) -> Message {
        Message {
            role: Role::Assistant,
            parts: vec![Part::ToolCall(ToolCall {
                id: id.into(),
                name: "get_weather_forecast".into(),
                input: json!({ "city": city }),
            })],
        }
    }

    fn agent() -> Agent {
        Agent::new("Trip Coach", "Check the weather first.")
            .with_tools(ToolRegistry::new().with_tool(Forecast))
    }

    fn session() -> Session {
        Session::new(
            SessionId::from("travel_assistant"),
            Arc::new(EventStore::in_memory().unwrap()),
        )
    }

    #[tokio::test]
    async fn answers_without_tools() {
        let runner = Runner::new(Scripted::new(vec![Message::assistant("Hello, traveller!")]));
        let result = runner.run(&agent(), "hi", &session()).await.unwrap();

        assert_eq!(result.final_output, "Hello, traveller!");
        assert_eq!(result.turns, 1);

        let requests = runner.backend().requests.lock().unwrap();
        assert_eq!(requests[0].0.as_deref(), Some("Check the weather first."));
        assert_eq!(requests[0].2, 1);
    }

    #[tokio::test]
    async fn feeds_tool_output_back_to_the_model() {
        let runner = Runner::new(Scripted::new(vec![
            call_weather("call_1", "Madrid"),
            Message::assistant("Madrid is sunny, go to the Retiro."),
        ]));
        let session = session();

        let result = runner
            .run(&agent(), "What's the weather in Madrid?", &session)
            .await
            .unwrap();

        assert_eq!(result.final_output, "Madrid is sunny, go to the Retiro.");
        assert_eq!(result.turns, 2);
        assert_eq!(result.usage.input_tokens, 20);

        let requests = runner.backend().requests.lock().unwrap();
        let second = &requests[1].1;
        assert_eq!(second.len(), 3);
        assert_eq!(
            second[2],
            Message::tool_results(vec![crate::model::ToolResult::success(
                "call_1",
                "Madrid: Sunny"
            )])
        );
        assert_eq!(session.history().unwrap().len(), 4);
    }

    #[tokio::test]
    async fn history_carries_over_between_runs() {
        let runner = Runner::new(Scripted::new(vec![
            Message::assistant("Noted, you love museums."),
            Message::assistant("Try the Prado."),
        ]));
        let session = session();

        runner.run(&agent(), "I love museums", &session).await.unwrap();
        runner.run(&agent(), "Ideas for Madrid?", &session).await.unwrap();

        let requests = runner.backend().requests.lock().unwrap();
        assert_eq!(
            requests[1].1,
            vec![
                Message::user("I love museums"),
                Message::assistant("Noted, you love museums."),
                Message::user("Ideas for Madrid?"),
            ]
        );
    }

    #[tokio::test]
    async fn stops_at_turn_limit() {
        let runner = Runner::new(Scripted::new(vec![
            call_weather("a", "Oslo"),
            call_weather("b", "Oslo"),
            call_weather("c", "Oslo"),
        ]))
        .with_max_turns(2);

        let err = runner.run(&agent(), "loop", &session()).await.unwrap_err();
        assert!(matches!(err, Error::MaxTurnsExceeded(2)));
    }

    #[tokio::test]
    async fn model_errors_propagate() {
        let runner = Runner::new(Scripted::new(Vec::new()));
        let err = runner.run(&agent(), "hi", &session()).await.unwrap_err();
        assert!(matches!(err, Error::Model(ModelError::InvalidResponse(_))));
    }

    #[tokio::test]
    async fn overlapping_runs_keep_the_session_usable() {
        let runner = Runner::new(Strict::default());
        let agent = Agent::new("Trip Coach", "Check the weather first.")
            .with_tools(ToolRegistry::new().with_tool(SlowForecast));
        let session = session();

        let (one, two) = tokio::join!(runner.run(&agent, "one", &session), async {
            tokio::time::sleep(Duration::from_millis(10)).await;
            runner.run(&agent, "two", &session).await
        });
        assert_eq!(one.unwrap().final_output, "done");
        assert_eq!(two.unwrap().final_output, "done");

        let third = runner.run(&agent, "three", &session).await.unwrap();
        assert_eq!(third.final_output, "done");

        let history = session.history().unwrap();
        assert_eq!(history.len(), 12);
        for (i, message) in history.iter().enumerate() {
            if !message.tool_calls().is_empty() {
                assert!(history[i + 1].is_tool_results());
            }
        }
    }
}
