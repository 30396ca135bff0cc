use std::sync::Arc;

use anyhow::{Context, Result};
use travel_planner::{FlightSettings, GeminiClient, TravelPlanner, TravelPlannerConfig, telemetry, web};

#[tokio::main]
async fn main() -> Result<()> {
    if let Err(e) = dotenvy::dotenv() {
        if !e.not_found() {
            return Err(e).context("Failed to read .env file");
        }
    }

    let config = TravelPlannerConfig::load().context("Failed to load configuration")?;
    telemetry::init(&config.logging)?;

    let model = GeminiClient::new(&config.model)?;
    tracing::info!(model = %config.model.model, "Language model client ready");

    let planner = TravelPlanner::new(
        Arc::new(model),
        FlightSettings {
            default_date: config.flights.default_date()?,
            max_options: config.flights.max_options,
        },
    );

    web::run(&config.server, Arc::new(planner)).await
}
