//! The weather lookup exposed to the agent as a tool.

use async_trait::async_trait;
use runtime::{Tool, ToolError, ToolSpec};
use serde::Deserialize;
use serde_json::{Value, json};

use crate::WeatherClient;

pub const TOOL_NAME: &str = "get_weather_forecast";

#[derive(Debug, Deserialize)]
struct Args {
    city: String,
}

/// `get_weather_forecast(city) -> String`.
///
/// Always answers with text: a rendered report, or the message of whatever
/// [`LookupError`](crate::LookupError) stopped the lookup.
#[derive(Debug, Clone)]
pub struct WeatherTool {
    client: WeatherClient,
}

impl WeatherTool {
    pub fn new(client: WeatherClient) -> Self {
        Self { client }
    }

    /// Look up `city` and render the outcome for the model.
    pub async fn forecast(&self, city: &str) -> String {
        match self.client.lookup(city).await {
            Ok(report) => report.to_string(),
            Err(e) => e.to_string(),
        }
    }
}

#[async_trait]
impl Tool for WeatherTool {
    fn spec(&self) -> ToolSpec {
        ToolSpec {
            name: TOOL_NAME.to_string(),
            description: "Fetch real-time weather info for a city using the Weather API".to_string(),
            schema: json!({
                "type": "object",
                "properties": {
                    "city": {
                        "type": "string",
                        "description": "City or place name, e.g. \"Madrid\" or \"Paris, Texas\""
                    }
                },
                "required": ["city"],
                "additionalProperties": false
            }),
        }
    }

    async fn invoke(&self, input: Value) -> Result<String, ToolError> {
        let args: Args =
            serde_json::from_value(input).map_err(|e| ToolError::InvalidInput(e.to_string()))?;
        Ok(self.forecast(&args.city).await)
    }
}
