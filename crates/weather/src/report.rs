//! The weather report handed back to the model.

use chrono::NaiveDate;
use std::fmt;

/// Current conditions for one place, as observed on one day.
///
/// Built only from a fully parsed upstream response and never stored; its
/// [`Display`](fmt::Display) form is what the model sees.
#[derive(Debug, Clone, PartialEq)]
pub struct WeatherReport {
    city: String,
    country: String,
    temperature_f: f64,
    condition: String,
    observed_date: NaiveDate,
}

impl WeatherReport {
    pub(crate) fn new(
        city: String,
        country: String,
        temperature_f: f64,
        condition: String,
        observed_date: NaiveDate,
    ) -> Self {
        Self {
            city,
            country,
            temperature_f,
            condition,
            observed_date,
        }
    }

    pub fn city(&self) -> &str {
        &self.city
    }

    pub fn country(&self) -> &str {
        &self.country
    }

    /// Temperature in degrees Fahrenheit.
    pub fn temperature_f(&self) -> f64 {
        self.temperature_f
    }

    pub fn condition(&self) -> &str {
        &self.condition
    }

    pub fn observed_date(&self) -> NaiveDate {
        self.observed_date
    }
}

impl fmt::Display for WeatherReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "Real-time weather report for {}:",
            self.observed_date.format("%Y-%m-%d")
        )?;
        writeln!(f, "   - City: {}", self.city)?;
        writeln!(f, "   - Country: {}", self.country)?;
        writeln!(f, "   - Temperature: {:.1} °F", self.temperature_f)?;
        write!(f, "   - Weather Conditions: {}", self.condition)
    }
}
