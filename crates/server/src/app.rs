//! Startup wiring: turns configuration into shared application state.

use std::sync::Arc;

use runtime::{Agent, OpenAiBackend, Runner, Session, ToolRegistry};
use storage::{EventStore, SessionId};
use weather::{WeatherClient, WeatherTool};

use crate::Result;
use crate::api::AppState;
use crate::config::{Config, Credentials};

/// Open the configured session store, creating its directory if needed.
pub fn open_store(config: &Config) -> Result<EventStore> {
    match &config.session.db_path {
        Some(path) => {
            if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                std::fs::create_dir_all(parent)?;
            }
            Ok(EventStore::open(path)?)
        }
        None => Ok(EventStore::in_memory()?),
    }
}

/// The agent with its tool table.
pub fn build_agent(config: &Config, credentials: &Credentials) -> Agent {
    let client =
        WeatherClient::new(credentials.weather.clone()).with_base_url(&config.weather.base_url);
    let tools = ToolRegistry::new().with_tool(WeatherTool::new(client));
    Agent::new(&config.agent.name, &config.agent.instructions).with_tools(tools)
}

/// Build everything `POST /ask` shares across requests.
pub fn build_state(
    config: &Config,
    credentials: &Credentials,
) -> Result<Arc<AppState<OpenAiBackend>>> {
    let backend = OpenAiBackend::builder(credentials.openai.clone(), &config.model.model)
        .base_url(&config.model.base_url)
        .settings(config.model.settings())
        .build();

    let store = Arc::new(open_store(config)?);
    let session = Session::new(SessionId::new(&config.session.id), store);
    tracing::info!(
        backend = %backend,
        session = %session.id(),
        persistent = config.session.db_path.is_some(),
        "agent ready"
    );

    Ok(Arc::new(AppState {
        runner: Runner::new(backend).with_max_turns(config.agent.max_turns),
        agent: build_agent(config, credentials),
        session,
    }))
}
