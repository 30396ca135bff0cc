//! Integration tests for the travel planner HTTP API

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use chrono::NaiveDate;
use serde_json::{Value, json};
use tower::ServiceExt;
use travel_planner::web::{self, MAX_BODY_BYTES};
use travel_planner::{AppState, FlightSettings, ModelError, TextModel, TravelPlanner};

/// Model stub answering from a script and counting calls
struct StubModel {
    answers: Mutex<VecDeque<Result<String, ModelError>>>,
    calls: Mutex<usize>,
}

impl StubModel {
    fn new(answers: Vec<Result<String, ModelError>>) -> Arc<Self> {
        Arc::new(Self {
            answers: Mutex::new(answers.into()),
            calls: Mutex::new(0),
        })
    }

    fn calls(&self) -> usize {
        *self.calls.lock().unwrap()
    }
}

#[async_trait]
impl TextModel for StubModel {
    async fn complete(&self, _prompt: &str) -> Result<String, ModelError> {
        *self.calls.lock().unwrap() += 1;
        self.answers
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or(Err(ModelError::EmptyResponse))
    }
}

fn app(model: Arc<StubModel>) -> Router {
    let planner = TravelPlanner::new(
        model,
        FlightSettings {
            default_date: NaiveDate::from_ymd_opt(2025, 4, 2).unwrap(),
            max_options: 3,
        },
    );
    web::build_app(
        AppState {
            planner: Arc::new(planner),
        },
        "frontend",
    )
}

fn post_json(uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

async fn send(app: Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    (status, serde_json::from_slice(&bytes).unwrap())
}

async fn send_raw(app: Router, request: Request<Body>) -> (StatusCode, String) {
    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    (status, String::from_utf8_lossy(&bytes).into_owned())
}

fn full_plan_body() -> Value {
    json!({
        "source": "New York",
        "destination": "Paris",
        "dates": "2025-06-10 to 2025-06-20",
        "budget": "$3000",
        "travelers": "2",
        "interests": ["art", "history", "food"]
    })
}

#[tokio::test]
async fn test_generate_plan_success() {
    let model = StubModel::new(vec![
        Ok("JFK".to_string()),
        Ok("CDG".to_string()),
        Ok("# Paris\n\n## Day 1".to_string()),
    ]);
    let (status, body) = send(app(model.clone()), post_json("/api/generate-plan", full_plan_body())).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert_eq!(body["travel_plan"], "# Paris\n\n## Day 1");
    assert_eq!(body["source_code"], "JFK");
    assert_eq!(body["destination_code"], "CDG");
    assert!(body["flight_details"].is_null());
    assert_eq!(model.calls(), 3);
}

#[tokio::test]
async fn test_generate_plan_with_flights() {
    let flights = json!({"best_flights": [
        {"airline": "Delta", "price": "900", "total_duration": 425,
         "flights": [{"departure_airport": {"id": "JFK", "time": "08:00"}, "arrival_airport": {"id": "CDG", "time": "21:05"}}]},
        {"airline": "United", "price": "750", "total_duration": 610,
         "flights": [
            {"departure_airport": {"id": "JFK"}, "arrival_airport": {"id": "ORD"}},
            {"departure_airport": {"id": "ORD"}, "arrival_airport": {"id": "CDG"}}
         ],
         "layovers": [{"id": "ORD", "name": "O'Hare", "duration": 75}]}
    ]});
    let model = StubModel::new(vec![
        Ok("JFK".to_string()),
        Ok("CDG".to_string()),
        Ok("# Paris".to_string()),
        Ok(format!("```json\n{flights}\n```")),
    ]);
    let mut request = full_plan_body();
    request["include_flights"] = json!(true);

    let (status, body) = send(app(model), post_json("/api/generate-plan", request)).await;

    assert_eq!(status, StatusCode::OK);
    let details = body["flight_details"].as_str().unwrap();
    assert!(details.contains("## ✈️ Flight Options"));
    assert!(details.contains("#### Option 2: $750"));
    assert!(details.contains("<td>1 stop</td>"));
    assert!(body["travel_plan"].as_str().unwrap().starts_with(details));
}

#[tokio::test]
async fn test_generate_plan_flight_parse_failure_still_returns_plan() {
    let model = StubModel::new(vec![
        Ok("JFK".to_string()),
        Ok("CDG".to_string()),
        Ok("# Paris".to_string()),
        Ok("Sorry, no flights today".to_string()),
    ]);
    let mut request = full_plan_body();
    request["include_flights"] = json!(true);

    let (status, body) = send(app(model), post_json("/api/generate-plan", request)).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert!(body["flight_details"]
        .as_str()
        .unwrap()
        .contains("Unable to retrieve flight data in the correct format"));
}

#[tokio::test]
async fn test_generate_plan_missing_fields_makes_no_model_call() {
    for field in ["source", "destination", "dates", "budget", "travelers"] {
        let model = StubModel::new(vec![]);
        let mut request = full_plan_body();
        request.as_object_mut().unwrap().remove(field);

        let (status, body) = send(app(model.clone()), post_json("/api/generate-plan", request)).await;

        assert_eq!(status, StatusCode::BAD_REQUEST, "field {field}");
        assert_eq!(body["success"], false);
        assert_eq!(body["error"], "Missing required fields");
        assert_eq!(model.calls(), 0);
    }

    let model = StubModel::new(vec![]);
    let mut request = full_plan_body();
    request["interests"] = json!([]);
    let (status, _) = send(app(model.clone()), post_json("/api/generate-plan", request)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(model.calls(), 0);
}

#[tokio::test]
async fn test_generate_plan_rejects_malformed_json() {
    let model = StubModel::new(vec![]);
    let request = Request::builder()
        .method("POST")
        .uri("/api/generate-plan")
        .header("content-type", "application/json")
        .body(Body::from("{not json"))
        .unwrap();

    let (status, body) = send(app(model.clone()), request).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], false);
    assert_eq!(model.calls(), 0);
}

#[tokio::test]
async fn test_generate_plan_model_failure_is_bad_gateway() {
    let model = StubModel::new(vec![
        Ok("JFK".to_string()),
        Ok("CDG".to_string()),
        Err(ModelError::Api {
            status: 500,
            body: "internal provider stack trace".to_string(),
        }),
    ]);
    let (status, body) = send(app(model), post_json("/api/generate-plan", full_plan_body())).await;

    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert_eq!(body["success"], false);
    assert!(!body["error"].as_str().unwrap().contains("stack trace"));
}

#[tokio::test]
async fn test_recommend_destinations() {
    let model = StubModel::new(vec![Ok("# Top 5\n\n## Lisbon".to_string())]);
    let (status, body) = send(
        app(model),
        post_json(
            "/api/recommend-destinations",
            json!({"interests": ["beach"], "budget": "$2000", "dates": "August 5-15", "travelers": 2}),
        ),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert_eq!(body["recommendations"], "# Top 5\n\n## Lisbon");
}

#[tokio::test]
async fn test_recommend_destinations_requires_interests() {
    let model = StubModel::new(vec![]);
    let (status, body) = send(
        app(model.clone()),
        post_json(
            "/api/recommend-destinations",
            json!({"interests": [], "budget": "$2000", "dates": "August", "travelers": "2"}),
        ),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Missing required fields");
    assert_eq!(model.calls(), 0);
}

#[tokio::test]
async fn test_get_airport_code() {
    let model = StubModel::new(vec![Ok("Tokyo's main airport is NRT".to_string())]);
    let (status, body) = send(
        app(model),
        post_json("/api/get-airport-code", json!({"location": "Tokyo"})),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body,
        json!({"success": true, "location": "Tokyo", "airport_code": "NRT"})
    );
}

#[tokio::test]
async fn test_get_airport_code_errors() {
    let model = StubModel::new(vec![]);
    let (status, body) = send(app(model.clone()), post_json("/api/get-airport-code", json!({}))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Missing location");
    assert_eq!(model.calls(), 0);

    let model = StubModel::new(vec![Ok("unknown".to_string())]);
    let (status, body) = send(
        app(model),
        post_json("/api/get-airport-code", json!({"location": "Atlantis"})),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "Could not determine airport code");

    let model = StubModel::new(vec![Err(ModelError::Network("connection reset".to_string()))]);
    let (status, body) = send(
        app(model),
        post_json("/api/get-airport-code", json!({"location": "Tokyo"})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert_eq!(body["success"], false);
}

#[tokio::test]
async fn test_health() {
    let request = Request::builder()
        .uri("/api/health")
        .body(Body::empty())
        .unwrap();
    let (status, body) = send(app(StubModel::new(vec![])), request).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
}

#[tokio::test]
async fn test_root_serves_frontend() {
    let request = Request::builder().uri("/").body(Body::empty()).unwrap();
    let (status, body) = send_raw(app(StubModel::new(vec![])), request).await;

    assert_eq!(status, StatusCode::OK);
    assert!(body.contains("<title>Travel Planner</title>"));
}

#[tokio::test]
async fn test_oversized_body_is_rejected_before_model_call() {
    let mut request = full_plan_body();
    request["budget"] = json!("x".repeat(MAX_BODY_BYTES + 1));

    let model = StubModel::new(vec![]);
    let (status, body) = send(app(model.clone()), post_json("/api/generate-plan", request.clone())).await;
    assert_eq!(status, StatusCode::PAYLOAD_TOO_LARGE);
    assert_eq!(body["success"], false);
    assert_eq!(body["error"], "Request body is too large");
    assert_eq!(model.calls(), 0);

    let payload = request.to_string();
    let with_length = Request::builder()
        .method("POST")
        .uri("/api/generate-plan")
        .header("content-type", "application/json")
        .header("content-length", payload.len())
        .body(Body::from(payload))
        .unwrap();
    let (status, body) = send(app(model.clone()), with_length).await;
    assert_eq!(status, StatusCode::PAYLOAD_TOO_LARGE);
    assert_eq!(body["error"], "Request body is too large");
    assert_eq!(model.calls(), 0);
}
