//! HTTP request handlers
//!
//! Every endpoint answers with a `{ "success": bool, ... }` envelope. Bodies
//! are validated before any model call; errors are mapped to status codes by
//! [`TravelPlannerError::status_code`].

use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{State, rejection::JsonRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Value, json};
use tracing::{error, warn};

use crate::models::{RecommendationRequest, TravelPlan, TravelRequest};
use crate::parser::AirportCode;
use crate::planner::TravelPlanner;
use crate::web::MAX_BODY_BYTES;
use crate::{TravelPlannerError, VERSION};

const MISSING_FIELDS: &str = "Missing required fields";
const MISSING_LOCATION: &str = "Missing location";
const CODE_NOT_FOUND: &str = "Could not determine airport code";

/// Shared handler state
#[derive(Clone)]
pub struct AppState {
    pub planner: Arc<TravelPlanner>,
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/generate-plan", post(generate_plan))
        .route("/recommend-destinations", post(recommend_destinations))
        .route("/get-airport-code", post(get_airport_code))
        .route("/health", get(health))
        .with_state(state)
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct GeneratePlanBody {
    pub source: String,
    pub destination: String,
    pub dates: String,
    pub budget: String,
    #[serde(deserialize_with = "text_or_number")]
    pub travelers: String,
    pub interests: Vec<String>,
    pub include_flights: bool,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct RecommendDestinationsBody {
    pub interests: Vec<String>,
    pub budget: String,
    pub dates: String,
    #[serde(deserialize_with = "text_or_number")]
    pub travelers: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct AirportCodeBody {
    pub location: String,
}

#[derive(Serialize)]
struct PlanResponse {
    success: bool,
    #[serde(flatten)]
    plan: TravelPlan,
}

#[derive(Serialize)]
struct RecommendationsResponse {
    success: bool,
    recommendations: String,
}

#[derive(Serialize)]
struct AirportCodeResponse {
    success: bool,
    location: String,
    airport_code: AirportCode,
}

#[derive(Serialize)]
struct ErrorBody {
    success: bool,
    error: String,
}

impl IntoResponse for TravelPlannerError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            error!(error = %self, status = status.as_u16(), "Request failed");
        } else {
            warn!(error = %self, status = status.as_u16(), "Request rejected");
        }

        let body = ErrorBody {
            success: false,
            error: self.user_message(),
        };
        (status, Json(body)).into_response()
    }
}

/// Accepts `"2"`, `2` or `null` for fields clients send either way
fn text_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<Value>::deserialize(deserializer)? {
        Some(Value::String(s)) => s,
        Some(Value::Number(n)) => n.to_string(),
        _ => String::new(),
    })
}

fn required(value: &str) -> Result<String, TravelPlannerError> {
    let value = value.trim();
    if value.is_empty() {
        return Err(TravelPlannerError::validation(MISSING_FIELDS));
    }
    Ok(value.to_string())
}

fn required_interests(interests: &[String]) -> Result<Vec<String>, TravelPlannerError> {
    let interests: Vec<String> = interests
        .iter()
        .map(|i| i.trim())
        .filter(|i| !i.is_empty())
        .map(str::to_string)
        .collect();
    if interests.is_empty() {
        return Err(TravelPlannerError::validation(MISSING_FIELDS));
    }
    Ok(interests)
}

impl TryFrom<GeneratePlanBody> for TravelRequest {
    type Error = TravelPlannerError;

    fn try_from(body: GeneratePlanBody) -> Result<Self, Self::Error> {
        Ok(TravelRequest {
            source: required(&body.source)?,
            destination: required(&body.destination)?,
            dates: required(&body.dates)?,
            budget: required(&body.budget)?,
            travelers: required(&body.travelers)?,
            interests: required_interests(&body.interests)?,
            include_flights: body.include_flights,
        })
    }
}

impl TryFrom<RecommendDestinationsBody> for RecommendationRequest {
    type Error = TravelPlannerError;

    fn try_from(body: RecommendDestinationsBody) -> Result<Self, Self::Error> {
        Ok(RecommendationRequest {
            interests: required_interests(&body.interests)?,
            budget: required(&body.budget)?,
            dates: required(&body.dates)?,
            travelers: required(&body.travelers)?,
        })
    }
}

fn parse_body<T>(payload: Result<Json<T>, JsonRejection>, message: &str) -> Result<T, TravelPlannerError> {
    payload.map(|Json(body)| body).map_err(|rejection| {
        warn!(%rejection, "Rejected request body");
        if rejection.status() == StatusCode::PAYLOAD_TOO_LARGE {
            TravelPlannerError::PayloadTooLarge {
                limit: MAX_BODY_BYTES,
            }
        } else {
            TravelPlannerError::validation(message)
        }
    })
}

async fn generate_plan(
    State(state): State<AppState>,
    payload: Result<Json<GeneratePlanBody>, JsonRejection>,
) -> Result<impl IntoResponse, TravelPlannerError> {
    let request = TravelRequest::try_from(parse_body(payload, MISSING_FIELDS)?)?;
    let plan = state.planner.generate_plan(&request).await?;
    Ok(Json(PlanResponse {
        success: true,
        plan,
    }))
}

async fn recommend_destinations(
    State(state): State<AppState>,
    payload: Result<Json<RecommendDestinationsBody>, JsonRejection>,
) -> Result<impl IntoResponse, TravelPlannerError> {
    let request = RecommendationRequest::try_from(parse_body(payload, MISSING_FIELDS)?)?;
    let recommendations = state.planner.recommend_destinations(&request).await?;
    Ok(Json(RecommendationsResponse {
        success: true,
        recommendations,
    }))
}

async fn get_airport_code(
    State(state): State<AppState>,
    payload: Result<Json<AirportCodeBody>, JsonRejection>,
) -> Result<impl IntoResponse, TravelPlannerError> {
    let location = parse_body(payload, MISSING_LOCATION)?.location.trim().to_string();
    if location.is_empty() {
        return Err(TravelPlannerError::validation(MISSING_LOCATION));
    }

    let airport_code = state
        .planner
        .resolve_airport_code(&location)
        .await?
        .ok_or_else(|| TravelPlannerError::not_found(CODE_NOT_FOUND))?;

    Ok(Json(AirportCodeResponse {
        success: true,
        location,
        airport_code,
    }))
}

async fn health() -> Json<Value> {
    Json(json!({
        "status": "ok",
        "version": VERSION,
    }))
}
