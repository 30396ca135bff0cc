//! Flight payload model
//!
//! Shapes of the synthetic flight JSON the model is asked to produce. Every
//! field is optional on the wire: the model is a best-effort source, so an
//! absent or `null` value is rendered as `N/A` rather than rejecting the
//! payload, and numbers may arrive as strings.

use std::fmt;

use chrono::NaiveDate;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::parser::AirportCode;

/// Top-level flight payload
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FlightPayload {
    #[serde(default, deserialize_with = "null_as_default")]
    pub best_flights: Vec<FlightOption>,
    #[serde(default)]
    pub search_metadata: Option<SearchMetadata>,
}

/// Metadata the model echoes back
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SearchMetadata {
    #[serde(default)]
    pub google_flights_url: Option<String>,
}

/// One itinerary, possibly made of several segments
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FlightOption {
    #[serde(default)]
    pub airline: Option<String>,
    #[serde(default)]
    pub price: Option<Price>,
    /// Total travel time in minutes
    #[serde(default, deserialize_with = "lenient_minutes")]
    pub total_duration: Option<u32>,
    #[serde(default, rename = "flights", deserialize_with = "null_as_default")]
    pub segments: Vec<FlightSegment>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub layovers: Vec<Layover>,
    #[serde(default)]
    pub carbon_emissions: Option<CarbonEmissions>,
}

impl FlightOption {
    /// Number of stops between first departure and final arrival
    #[must_use]
    pub fn stops(&self) -> usize {
        self.segments.len().saturating_sub(1)
    }

    #[must_use]
    pub fn first_departure(&self) -> Option<&AirportStop> {
        self.segments.first().map(|s| &s.departure_airport)
    }

    #[must_use]
    pub fn last_arrival(&self) -> Option<&AirportStop> {
        self.segments.last().map(|s| &s.arrival_airport)
    }
}

/// A single flight leg
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FlightSegment {
    #[serde(default, deserialize_with = "null_as_default")]
    pub departure_airport: AirportStop,
    #[serde(default, deserialize_with = "null_as_default")]
    pub arrival_airport: AirportStop,
    #[serde(default)]
    pub airline: Option<String>,
    /// `"NH 10"` or a bare number
    #[serde(default, deserialize_with = "lenient_text")]
    pub flight_number: Option<String>,
    /// Leg duration in minutes
    #[serde(default, deserialize_with = "lenient_minutes")]
    pub duration: Option<u32>,
    #[serde(default)]
    pub airplane: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub overnight: bool,
}

/// Departure or arrival airport of a leg
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AirportStop {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    /// Either `HH:MM` or `YYYY-MM-DD HH:MM`
    #[serde(default)]
    pub time: Option<String>,
}

impl AirportStop {
    /// Clock time without a leading date
    #[must_use]
    pub fn clock_time(&self) -> Option<&str> {
        self.time
            .as_deref()
            .map(|t| t.split_once(' ').map_or(t, |(_, clock)| clock))
    }
}

/// Connection between two legs
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Layover {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "lenient_minutes")]
    pub duration: Option<u32>,
}

/// Emission estimate for an option
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CarbonEmissions {
    /// Grams of CO2
    #[serde(default, deserialize_with = "lenient_number")]
    pub this_flight: Option<f64>,
    /// Relative to a typical flight on the route; negative is better
    #[serde(default, deserialize_with = "lenient_number")]
    pub difference_percent: Option<f64>,
}

/// Price as the model wrote it: `"1234"` or `1234`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Price {
    Amount(f64),
    Text(String),
}

impl fmt::Display for Price {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Price::Amount(amount) => write!(f, "{amount}"),
            Price::Text(text) => write!(f, "{}", text.trim().trim_start_matches('$')),
        }
    }
}

/// Treats an explicit `null` like an absent field
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// A finite number written either as a JSON number or a numeric string
fn lenient_number<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let number = match Option::<Value>::deserialize(deserializer)? {
        Some(Value::Number(n)) => n.as_f64(),
        Some(Value::String(s)) => s.trim().parse().ok(),
        _ => None,
    };
    Ok(number.filter(|n: &f64| n.is_finite()))
}

fn lenient_minutes<'de, D>(deserializer: D) -> Result<Option<u32>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(lenient_number(deserializer)?
        .filter(|n| *n >= 0.0)
        .map(|n| n.round() as u32))
}

fn lenient_text<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<Value>::deserialize(deserializer)? {
        Some(Value::String(s)) => Some(s),
        Some(Value::Number(n)) => Some(n.to_string()),
        _ => None,
    })
}

/// Google Flights search link for a route and date
#[must_use]
pub fn google_flights_url(source: &AirportCode, destination: &AirportCode, date: NaiveDate) -> String {
    let query = format!("flights {source} to {destination}");
    format!(
        "https://www.google.com/travel/flights?hl=en&curr=USD&q={}&dates={}",
        urlencoding::encode(&query),
        date.format("%Y-%m-%d")
    )
}
