//! Client for the upstream current-conditions API.

use chrono::{Local, NaiveDate};
use secrecy::{ExposeSecret, Secret};
use serde::Deserialize;
use std::error::Error as _;
use thiserror::Error;

use crate::WeatherReport;

pub const DEFAULT_BASE_URL: &str = "https://api.weatherapi.com/v1/current.json";

/// Why a lookup produced no report.
///
/// The `Display` text of each variant is exactly what the model is shown.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LookupError {
    /// The request failed before a usable body arrived: connect, DNS,
    /// timeout, non-2xx status or an undecodable body.
    #[error("Error fetching weather data: {0}")]
    Transport(String),

    /// The service answered but not with the expected location/current data.
    #[error("Could not retrieve weather for '{0}'. Try a more specific place name.")]
    UnrecognizedPlace(String),
}

#[derive(Debug, Deserialize)]
struct Upstream {
    location: Location,
    current: Current,
}

#[derive(Debug, Deserialize)]
struct Location {
    name: String,
    country: String,
}

#[derive(Debug, Deserialize)]
struct Current {
    temp_f: f64,
    condition: Condition,
}

#[derive(Debug, Deserialize)]
struct Condition {
    text: String,
}

/// One-shot lookups against the weather service.
///
/// Each lookup is a single GET with no retry, no cache and no timeout beyond
/// the HTTP client's defaults.
#[derive(Debug, Clone)]
pub struct WeatherClient {
    http: reqwest::Client,
    base_url: String,
    api_key: Secret<String>,
    today: fn() -> NaiveDate,
}

impl WeatherClient {
    pub fn new(api_key: Secret<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: DEFAULT_BASE_URL.to_string(),
            api_key,
            today: local_today,
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Replace the source of the report date.
    pub fn with_clock(mut self, today: fn() -> NaiveDate) -> Self {
        self.today = today;
        self
    }

    /// Fetch current conditions for `city`.
    #[tracing::instrument(skip(self))]
    pub async fn lookup(&self, city: &str) -> Result<WeatherReport, LookupError> {
        let url = reqwest::Url::parse_with_params(
            &self.base_url,
            [
                ("q", city),
                ("aqi", "no"),
                ("key", self.api_key.expose_secret().as_str()),
            ],
        )
        .map_err(|e| LookupError::Transport(format!("invalid weather endpoint: {e}")))?;

        let response = self
            .http
            .get(url)
            .send()
            .await
            .and_then(reqwest::Response::error_for_status)
            .map_err(transport)?;

        let body: serde_json::Value = response.json().await.map_err(transport)?;

        let upstream: Upstream = serde_json::from_value(body).map_err(|e| {
            tracing::debug!(error = %e, "upstream body lacks location/current data");
            LookupError::UnrecognizedPlace(city.to_string())
        })?;

        Ok(WeatherReport::new(
            upstream.location.name,
            upstream.location.country,
            upstream.current.temp_f,
            upstream.current.condition.text,
            (self.today)(),
        ))
    }
}

fn local_today() -> NaiveDate {
    Local::now().date_naive()
}

/// Describe a transport failure with its cause chain, minus the request URL
/// (which carries the API key).
fn transport(err: reqwest::Error) -> LookupError {
    let err = err.without_url();
    let mut message = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        message.push_str(": ");
        message.push_str(&cause.to_string());
        source = cause.source();
    }
    tracing::warn!(error = %message, "weather request failed");
    LookupError::Transport(message)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{MADRID, june_first, refused, stub};
    use axum::http::StatusCode;

    fn client(url: &str) -> WeatherClient {
        WeatherClient::new(Secret::new("secret-key".to_string()))
            .with_base_url(url)
            .with_clock(june_first)
    }

    #[tokio::test]
    async fn parses_a_well_formed_response() {
        let upstream = stub(StatusCode::OK, MADRID).await;
        let report = client(&upstream.url).lookup("Madrid").await.unwrap();

        assert_eq!(report.city(), "Madrid");
        assert_eq!(report.country(), "Spain");
        assert_eq!(report.temperature_f(), 72.4);
        assert_eq!(report.condition(), "Sunny");
        assert_eq!(report.observed_date(), june_first());
    }

    #[tokio::test]
    async fn sends_city_key_and_disables_air_quality() {
        let upstream = stub(StatusCode::OK, MADRID).await;
        client(&upstream.url).lookup("San José").await.unwrap();

        let queries = upstream.queries.lock().unwrap();
        assert_eq!(queries.len(), 1);
        assert_eq!(queries[0]["q"], "San José");
        assert_eq!(queries[0]["aqi"], "no");
        assert_eq!(queries[0]["key"], "secret-key");
    }

    #[tokio::test]
    async fn missing_sections_mean_unrecognized_place() {
        for body in [
            r#"{"current":{"temp_f":50.0,"condition":{"text":"Fog"}}}"#,
            r#"{"location":{"name":"Nowhere","country":"None"}}"#,
            r#"{}"#,
        ] {
            let upstream = stub(StatusCode::OK, body).await;
            let err = client(&upstream.url).lookup("Nowhere").await.unwrap_err();
            assert_eq!(err, LookupError::UnrecognizedPlace("Nowhere".into()));
        }
    }

    #[tokio::test]
    async fn malformed_fields_never_build_a_report() {
        let upstream = stub(
            StatusCode::OK,
            r#"{"location":{"name":"Madrid"},"current":{"temp_f":"warm","condition":{}}}"#,
        )
        .await;
        let err = client(&upstream.url).lookup("Madrid").await.unwrap_err();
        assert_eq!(
            err.to_string(),
            "Could not retrieve weather for 'Madrid'. Try a more specific place name."
        );
    }

    #[tokio::test]
    async fn error_statuses_are_transport_errors() {
        for status in [StatusCode::BAD_REQUEST, StatusCode::INTERNAL_SERVER_ERROR] {
            let upstream = stub(status, r#"{"error":{"message":"No matching location found."}}"#).await;
            let err = client(&upstream.url).lookup("Atlantis").await.unwrap_err();
            let message = err.to_string();
            assert!(matches!(err, LookupError::Transport(_)));
            assert!(message.starts_with("Error fetching weather data:"), "{message}");
            assert!(message.contains(status.as_str()), "{message}");
            assert!(!message.contains("secret-key"), "{message}");
        }
    }

    #[tokio::test]
    async fn connection_refused_is_a_transport_error() {
        let url = refused().await;
        let err = client(&url).lookup("Madrid").await.unwrap_err();
        assert!(err.to_string().starts_with("Error fetching weather data:"));
        assert!(!err.to_string().contains("secret-key"));
    }

    #[tokio::test]
    async fn undecodable_body_is_a_transport_error() {
        let upstream = stub(StatusCode::OK, "<html>maintenance</html>").await;
        let err = client(&upstream.url).lookup("Madrid").await.unwrap_err();
        assert!(matches!(err, LookupError::Transport(_)));
    }

    #[tokio::test]
    async fn invalid_endpoint_is_reported_not_raised() {
        let err = client("not a url").lookup("Madrid").await.unwrap_err();
        assert!(err.to_string().starts_with("Error fetching weather data:"));
    }
}
