//! Travel planner - AI-assisted itinerary, destination and flight planning
//!
//! This library turns travel requests into language model prompts and shapes
//! the answers: airport-code extraction, flight JSON recovery and Markdown
//! rendering, served over a small JSON API.

pub mod api;
pub mod config;
pub mod error;
pub mod flights;
pub mod markdown;
pub mod model;
pub mod models;
pub mod parser;
pub mod planner;
pub mod prompts;
pub mod telemetry;
pub mod web;

// Re-export core types for public API
pub use api::AppState;
pub use config::TravelPlannerConfig;
pub use error::TravelPlannerError;
pub use flights::FlightPayload;
pub use model::{GeminiClient, ModelError, TextModel};
pub use models::{RecommendationRequest, TravelPlan, TravelRequest};
pub use parser::{AirportCode, ParseError, extract_airport_code, extract_flight_json};
pub use planner::{FlightSettings, TravelPlanner};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Core result type used throughout the library
pub type Result<T> = std::result::Result<T, TravelPlannerError>;
