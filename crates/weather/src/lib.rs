//! Weather lookup tool for the Trip Coach agent.
//!
//! Wraps the current-conditions endpoint of weatherapi.com behind the
//! runtime's [`Tool`](runtime::Tool) contract: a city goes in, one string
//! comes out. Failures never escape as errors; a [`LookupError`] is rendered
//! into the returned text so the model can relay it to the traveller.
//!
//! ```ignore
//! use secrecy::Secret;
//! use weather::{WeatherClient, WeatherTool};
//!
//! # async fn example() {
//! let tool = WeatherTool::new(WeatherClient::new(Secret::new("key".into())));
//! println!("{}", tool.forecast("Madrid").await);
//! # }
//! ```

mod client;
mod report;
mod tool;

pub use client::{DEFAULT_BASE_URL, LookupError, WeatherClient};
pub use report::WeatherReport;
pub use tool::{TOOL_NAME, WeatherTool};

#[cfg(test)]
mod testing;
