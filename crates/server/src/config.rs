//! Configuration loading from trip-coach.toml and the environment.
//!
//! Everything except credentials comes from an optional TOML file; every
//! key has a default, so the file may be absent. Credentials are read only
//! from the environment (after `.env` has been loaded):
//!
//! - `OPENAI_API_KEY` - key for the hosted language model.
//! - `WEATHER_API_KEY` - key for weatherapi.com.

use runtime::{
    DEFAULT_MAX_TURNS, ModelSettings, OPENAI_BASE_URL, ReasoningEffort, Verbosity,
};
use secrecy::Secret;
use serde::Deserialize;
use std::path::{Path, PathBuf};

pub const DEFAULT_CONFIG_FILE: &str = "trip-coach.toml";
pub const OPENAI_API_KEY: &str = "OPENAI_API_KEY";
pub const WEATHER_API_KEY: &str = "WEATHER_API_KEY";

const DEFAULT_INSTRUCTIONS: &str = "You help travelers plan activities to do while on vacation \
but you check the weather first in real-time. When asked about weather, call the \
get_weather_forecast tool. Make sure to pick activities that solo travelers will enjoy.";

/// Top-level configuration.
#[derive(Debug, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub agent: AgentConfig,
    #[serde(default)]
    pub model: ModelConfig,
    #[serde(default)]
    pub weather: WeatherConfig,
    #[serde(default)]
    pub session: SessionConfig,
}

/// Listen address.
#[derive(Debug, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

/// The agent the endpoint talks to.
#[derive(Debug, Deserialize)]
pub struct AgentConfig {
    #[serde(default = "default_agent_name")]
    pub name: String,
    #[serde(default = "default_instructions")]
    pub instructions: String,
    /// Model calls allowed per request.
    #[serde(default = "default_max_turns")]
    pub max_turns: usize,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            name: default_agent_name(),
            instructions: default_instructions(),
            max_turns: default_max_turns(),
        }
    }
}

/// Hosted model selection and settings.
#[derive(Debug, Deserialize)]
pub struct ModelConfig {
    #[serde(default = "default_model")]
    pub model: String,
    #[serde(default = "default_model_base_url")]
    pub base_url: String,
    #[serde(default = "default_reasoning_effort")]
    pub reasoning_effort: Option<ReasoningEffort>,
    #[serde(default = "default_verbosity")]
    pub verbosity: Option<Verbosity>,
    pub max_completion_tokens: Option<u32>,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            model: default_model(),
            base_url: default_model_base_url(),
            reasoning_effort: default_reasoning_effort(),
            verbosity: default_verbosity(),
            max_completion_tokens: None,
        }
    }
}

impl ModelConfig {
    pub fn settings(&self) -> ModelSettings {
        ModelSettings {
            reasoning_effort: self.reasoning_effort,
            verbosity: self.verbosity,
            max_completion_tokens: self.max_completion_tokens,
        }
    }
}

/// Weather service endpoint.
#[derive(Debug, Deserialize)]
pub struct WeatherConfig {
    #[serde(default = "default_weather_base_url")]
    pub base_url: String,
}

impl Default for WeatherConfig {
    fn default() -> Self {
        Self {
            base_url: default_weather_base_url(),
        }
    }
}

/// Conversation memory.
#[derive(Debug, Deserialize)]
pub struct SessionConfig {
    /// Key shared by every request, so they all see one conversation.
    #[serde(default = "default_session_id")]
    pub id: String,
    /// SQLite file for the history. In memory (lost on exit) when unset.
    pub db_path: Option<PathBuf>,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            id: default_session_id(),
            db_path: None,
        }
    }
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    8000
}

fn default_agent_name() -> String {
    "Trip Coach".to_string()
}

fn default_instructions() -> String {
    DEFAULT_INSTRUCTIONS.to_string()
}

fn default_max_turns() -> usize {
    DEFAULT_MAX_TURNS
}

fn default_model() -> String {
    "gpt-5".to_string()
}

fn default_model_base_url() -> String {
    OPENAI_BASE_URL.to_string()
}

fn default_reasoning_effort() -> Option<ReasoningEffort> {
    Some(ReasoningEffort::Medium)
}

fn default_verbosity() -> Option<Verbosity> {
    Some(Verbosity::Medium)
}

fn default_weather_base_url() -> String {
    weather::DEFAULT_BASE_URL.to_string()
}

fn default_session_id() -> String {
    "travel_assistant".to_string()
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path.as_ref())?;
        Self::parse(&content)
    }

    /// Parse configuration from TOML string.
    pub fn parse(toml: &str) -> Result<Self, ConfigError> {
        toml::from_str(toml).map_err(|e| ConfigError::Parse(e.to_string()))
    }

    /// Load `path` if given (it must exist), else `trip-coach.toml` if it
    /// exists, else defaults.
    pub fn resolve(path: Option<&Path>) -> Result<Self, ConfigError> {
        match path {
            Some(path) => Self::load(path),
            None if Path::new(DEFAULT_CONFIG_FILE).exists() => Self::load(DEFAULT_CONFIG_FILE),
            None => Ok(Self::default()),
        }
    }
}

/// API keys, kept out of logs and `Debug` output.
#[derive(Debug, Clone)]
pub struct Credentials {
    pub openai: Secret<String>,
    pub weather: Secret<String>,
}

impl Credentials {
    /// Read both keys from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Read both keys through `lookup`. Empty values count as missing.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let require = |name: &'static str| {
            lookup(name)
                .filter(|value| !value.trim().is_empty())
                .map(Secret::new)
                .ok_or(ConfigError::MissingEnv(name))
        };
        Ok(Self {
            openai: require(OPENAI_API_KEY)?,
            weather: require(WEATHER_API_KEY)?,
        })
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse config: {0}")]
    Parse(String),

    #[error("missing required environment variable: {0}")]
    MissingEnv(&'static str),
}

#[cfg(test)]
mod tests {
    use super::*;
    use secrecy::ExposeSecret;

    #[test]
    fn empty_file_gives_defaults() {
        let config = Config::parse("").unwrap();
        assert_eq!(config.server.port, 8000);
        assert_eq!(config.agent.name, "Trip Coach");
        assert_eq!(config.agent.max_turns, DEFAULT_MAX_TURNS);
        assert_eq!(config.model.model, "gpt-5");
        assert_eq!(config.session.id, "travel_assistant");
        assert!(config.session.db_path.is_none());
        assert_eq!(config.weather.base_url, weather::DEFAULT_BASE_URL);
        assert!(config.agent.instructions.contains("get_weather_forecast"));
    }

    #[test]
    fn partial_sections_keep_other_defaults() {
        let config = Config::parse(
            r#"
[server]
port = 9090

[model]
model = "gpt-5-mini"
verbosity = "low"
max_completion_tokens = 2048

[session]
db_path = "/var/lib/trip-coach/events.db"
"#,
        )
        .unwrap();

        assert_eq!(config.server.host, "127.0.0.1");
        assert_eq!(config.server.port, 9090);
        assert_eq!(
            config.model.settings(),
            ModelSettings {
                reasoning_effort: Some(ReasoningEffort::Medium),
                verbosity: Some(Verbosity::Low),
                max_completion_tokens: Some(2048),
            }
        );
        assert_eq!(
            config.session.db_path.as_deref(),
            Some(Path::new("/var/lib/trip-coach/events.db"))
        );
    }

    #[test]
    fn bad_values_are_parse_errors() {
        let err = Config::parse("[model]\nreasoning_effort = \"extreme\"").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn missing_explicit_file_is_an_error() {
        let err = Config::resolve(Some(Path::new("/nonexistent/trip-coach.toml"))).unwrap_err();
        assert!(matches!(err, ConfigError::Io(_)));
    }

    #[test]
    fn credentials_require_both_keys() {
        let creds = Credentials::from_lookup(|name| Some(format!("{name}-value"))).unwrap();
        assert_eq!(creds.openai.expose_secret(), "OPENAI_API_KEY-value");
        assert_eq!(creds.weather.expose_secret(), "WEATHER_API_KEY-value");

        let err = Credentials::from_lookup(|name| {
            (name == OPENAI_API_KEY).then(|| "sk".to_string())
        })
        .unwrap_err();
        assert!(matches!(err, ConfigError::MissingEnv(WEATHER_API_KEY)));

        let err = Credentials::from_lookup(|_| Some("  ".to_string())).unwrap_err();
        assert!(matches!(err, ConfigError::MissingEnv(OPENAI_API_KEY)));
    }

    #[test]
    fn credentials_are_redacted_in_debug() {
        let creds = Credentials::from_lookup(|_| Some("super-secret".to_string())).unwrap();
        assert!(!format!("{creds:?}").contains("super-secret"));
    }
}
