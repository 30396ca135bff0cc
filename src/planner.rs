//! Travel planning operations
//!
//! Each operation is a short sequential pipeline: build a prompt, ask the
//! model, shape the answer. Flight synthesis degrades to a Markdown message
//! on any failure so the itinerary itself still reaches the client.

use std::sync::Arc;

use chrono::NaiveDate;
use tracing::{info, instrument, warn};

use crate::flights::google_flights_url;
use crate::markdown::{format_flight_error, format_flight_options, format_flight_unavailable};
use crate::model::TextModel;
use crate::models::{RecommendationRequest, TravelPlan, TravelRequest};
use crate::parser::{AirportCode, TravelDate, extract_airport_code, extract_flight_json, extract_travel_date};
use crate::prompts;
use crate::Result;

/// Settings for the flight sub-feature
#[derive(Debug, Clone, Copy)]
pub struct FlightSettings {
    /// Used when the request's dates carry no `YYYY-MM-DD` literal
    pub default_date: NaiveDate,
    pub max_options: usize,
}

/// Entry point for all planning operations
pub struct TravelPlanner {
    model: Arc<dyn TextModel>,
    flights: FlightSettings,
}

impl TravelPlanner {
    pub fn new(model: Arc<dyn TextModel>, flights: FlightSettings) -> Self {
        Self { model, flights }
    }

    /// Ask the model for the primary airport of `location`
    #[instrument(skip(self))]
    pub async fn resolve_airport_code(&self, location: &str) -> Result<Option<AirportCode>> {
        let answer = self
            .model
            .complete(&prompts::airport_code_prompt(location))
            .await?;
        let code = extract_airport_code(&answer);
        if code.is_none() {
            warn!(answer = %answer.trim(), "No airport code in model answer");
        }
        Ok(code)
    }

    /// Like [`Self::resolve_airport_code`], with model failures treated as unresolved
    async fn try_resolve_airport_code(&self, location: &str) -> Option<AirportCode> {
        match self.resolve_airport_code(location).await {
            Ok(code) => code,
            Err(e) => {
                warn!(location, error = %e, "Airport code lookup failed");
                None
            }
        }
    }

    /// Generate an itinerary, optionally prefixed with synthetic flight options
    #[instrument(skip_all, fields(source = %request.source, destination = %request.destination))]
    pub async fn generate_plan(&self, request: &TravelRequest) -> Result<TravelPlan> {
        let source_code = self.try_resolve_airport_code(&request.source).await;
        let destination_code = self.try_resolve_airport_code(&request.destination).await;

        let prompt = prompts::itinerary_prompt(request, source_code.as_ref(), destination_code.as_ref());
        let mut travel_plan = self.model.complete(&prompt).await?;

        let flight_details = match (request.include_flights, &source_code, &destination_code) {
            (true, Some(source), Some(destination)) => {
                Some(self.flight_details(source, destination, &request.dates).await)
            }
            (true, _, _) => {
                warn!("Flights requested but airport codes could not be resolved");
                None
            }
            _ => None,
        };

        if let Some(details) = &flight_details {
            travel_plan = format!("{details}\n\n{travel_plan}");
        }

        info!(
            source_code = ?source_code,
            destination_code = ?destination_code,
            with_flights = flight_details.is_some(),
            "Generated travel plan"
        );

        Ok(TravelPlan {
            travel_plan,
            source_code,
            destination_code,
            flight_details,
        })
    }

    /// Synthesize flight options for a route as Markdown.
    ///
    /// Never fails: model and parse errors become user-facing messages.
    #[instrument(skip(self))]
    pub async fn flight_details(
        &self,
        source: &AirportCode,
        destination: &AirportCode,
        dates: &str,
    ) -> String {
        let date = match extract_travel_date(dates, self.flights.default_date) {
            TravelDate::Parsed(date) => date,
            TravelDate::Defaulted(date) => {
                warn!(%date, "No YYYY-MM-DD date in request, using default travel date");
                date
            }
        };

        let booking_url = google_flights_url(source, destination, date);
        let prompt = prompts::flight_details_prompt(source, destination, date, &booking_url);

        let answer = match self.model.complete(&prompt).await {
            Ok(answer) => answer,
            Err(e) => {
                warn!(error = %e, "Flight data generation failed");
                return format_flight_unavailable();
            }
        };

        let payload = match extract_flight_json(&answer) {
            Ok(payload) => payload,
            Err(e) => {
                warn!(error = %e, "Could not parse flight data from model answer");
                return format_flight_error(&e);
            }
        };

        format_flight_options(
            &payload,
            source,
            destination,
            &booking_url,
            self.flights.max_options,
        )
        .unwrap_or_else(|e| {
            warn!(error = %e, "Failed to render flight options");
            format_flight_unavailable()
        })
    }

    /// Suggest destinations as Markdown
    #[instrument(skip_all)]
    pub async fn recommend_destinations(&self, request: &RecommendationRequest) -> Result<String> {
        let recommendations = self
            .model
            .complete(&prompts::recommendation_prompt(request))
            .await?;
        Ok(recommendations)
    }
}
