//! Extraction of structured data from free-text model answers
//!
//! Everything here is best-effort: the model is asked for a strict format but
//! nothing guarantees it complies, so each extractor either yields a value it
//! can vouch for or says so through its return type.

use std::fmt;
use std::sync::LazyLock;

use chrono::NaiveDate;
use regex::Regex;
use serde::{Serialize, Serializer};
use serde_json::Value;
use thiserror::Error;

use crate::flights::FlightPayload;

/// What the airport prompt tells the model to answer when it has no code
const UNKNOWN_SENTINEL: &str = "UNKNOWN";

static EXACT_CODE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^[A-Z]{3}$").unwrap());
/// `UNKNOWN` is matched whole so the sentinel never surfaces as `UNK`
static ANY_CODE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(&format!("{UNKNOWN_SENTINEL}|[A-Z]{{3}}")).unwrap());
static FENCED_BLOCK: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)```[A-Za-z]*[ \t]*\r?\n(.*?)```").unwrap());
static ISO_DATE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\d{4}-\d{2}-\d{2}").unwrap());

/// A three-letter uppercase airport code
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct AirportCode(String);

impl AirportCode {
    /// Accepts exactly three ASCII uppercase letters
    #[must_use]
    pub fn parse(code: &str) -> Option<Self> {
        EXACT_CODE
            .is_match(code)
            .then(|| Self(code.to_string()))
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for AirportCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl PartialEq<str> for AirportCode {
    fn eq(&self, other: &str) -> bool {
        self.0 == other
    }
}

impl Serialize for AirportCode {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.0)
    }
}

/// Pull an airport code out of a model answer.
///
/// The whole trimmed answer is preferred; otherwise the first run of three
/// uppercase letters. Lowercase text is never upgraded to a code, and an
/// `UNKNOWN` anywhere in the answer is skipped rather than read as `UNK`.
#[must_use]
pub fn extract_airport_code(raw_text: &str) -> Option<AirportCode> {
    let trimmed = raw_text.trim();
    if let Some(code) = AirportCode::parse(trimmed) {
        return Some(code);
    }
    ANY_CODE
        .find_iter(trimmed)
        .map(|m| m.as_str())
        .find(|token| *token != UNKNOWN_SENTINEL)
        .map(|token| AirportCode(token.to_string()))
}

/// Why flight JSON could not be recovered from a model answer
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    /// JSON was present, as the whole answer or in a fenced block, but it is
    /// not a flight payload
    #[error("Unable to parse flight data from model response")]
    MalformedBlock,

    /// Neither the answer nor any fenced block contains JSON
    #[error("Unable to retrieve flight data in the correct format")]
    NoJson,
}

/// Recover a [`FlightPayload`] from a model answer.
///
/// Tries the whole answer as JSON first, then the first fenced block.
pub fn extract_flight_json(raw_text: &str) -> Result<FlightPayload, ParseError> {
    if let Ok(value @ Value::Object(_)) = serde_json::from_str::<Value>(raw_text.trim()) {
        return serde_json::from_value(value).map_err(|_| ParseError::MalformedBlock);
    }

    let block = FENCED_BLOCK
        .captures(raw_text)
        .and_then(|caps| caps.get(1))
        .ok_or(ParseError::NoJson)?;

    serde_json::from_str::<FlightPayload>(block.as_str().trim())
        .map_err(|_| ParseError::MalformedBlock)
}

/// Date chosen for a flight search
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TravelDate {
    /// Found in the user's dates text
    Parsed(NaiveDate),
    /// No usable literal; the configured fallback
    Defaulted(NaiveDate),
}

impl TravelDate {
    #[must_use]
    pub fn date(self) -> NaiveDate {
        match self {
            TravelDate::Parsed(date) | TravelDate::Defaulted(date) => date,
        }
    }
}

/// First real `YYYY-MM-DD` date in `dates`, else `default`.
///
/// Free-form ranges like "June 10-20" are not interpreted.
#[must_use]
pub fn extract_travel_date(dates: &str, default: NaiveDate) -> TravelDate {
    ISO_DATE
        .find_iter(dates)
        .find_map(|m| NaiveDate::parse_from_str(m.as_str(), "%Y-%m-%d").ok())
        .map_or(TravelDate::Defaulted(default), TravelDate::Parsed)
}
