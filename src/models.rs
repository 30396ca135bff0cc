//! Request and result types shared by the planner and the HTTP layer

use serde::Serialize;

use crate::parser::AirportCode;

/// A validated itinerary request
#[derive(Debug, Clone, PartialEq)]
pub struct TravelRequest {
    pub source: String,
    pub destination: String,
    /// Free text, e.g. "June 10-20, 2025" or "2025-06-10 to 2025-06-20"
    pub dates: String,
    pub budget: String,
    pub travelers: String,
    /// Never empty
    pub interests: Vec<String>,
    pub include_flights: bool,
}

/// A validated destination recommendation request
#[derive(Debug, Clone, PartialEq)]
pub struct RecommendationRequest {
    pub interests: Vec<String>,
    pub budget: String,
    pub dates: String,
    pub travelers: String,
}

/// Generated plan returned to the client
#[derive(Debug, Clone, Serialize)]
pub struct TravelPlan {
    /// Itinerary markdown, prefixed with the flight section when present
    pub travel_plan: String,
    pub source_code: Option<AirportCode>,
    pub destination_code: Option<AirportCode>,
    /// Only set when flights were requested and both codes resolved
    pub flight_details: Option<String>,
}

/// Comma-separated interests for prompts
#[must_use]
pub fn join_interests(interests: &[String]) -> String {
    interests.join(", ")
}
