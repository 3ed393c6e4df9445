//! Integration tests for the valuation API endpoints

use axum::{
    body::Body,
    http::{Request, StatusCode},
    Router,
};
use serde_json::{json, Value};
use std::path::PathBuf;
use std::sync::Arc;
use tower::ServiceExt;
use valuation_lib::{
    health::components, predictor::DEFAULT_ARTIFACT_PATH, HealthRegistry, StructuredLogger,
    ValuationMetrics, ValuationPredictor,
};
use valuation_server::api::{create_router, AppState, SUCCESS_MESSAGE};

fn artifact_path() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("../..")
        .join(DEFAULT_ARTIFACT_PATH)
}

async fn setup_app(predictor: ValuationPredictor, load: bool) -> (Router, Arc<AppState>) {
    let health_registry = HealthRegistry::new();
    health_registry.register(components::API).await;
    health_registry.register(components::PREDICTOR).await;

    if load {
        let info = predictor.model_info().unwrap();
        health_registry.set_model_loaded(info.version).await;
    }

    let state = Arc::new(AppState::new(
        Arc::new(predictor),
        health_registry,
        ValuationMetrics::new(),
        StructuredLogger::new("test"),
    ));
    (create_router(state.clone()), state)
}

async fn setup_test_app() -> (Router, Arc<AppState>) {
    setup_app(ValuationPredictor::from_path(artifact_path()), true).await
}

async fn send(app: Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    (status, serde_json::from_slice(&body).unwrap_or(Value::Null))
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

fn post_json(uri: &str, body: &Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

#[tokio::test]
async fn test_form_schema() {
    let (app, _state) = setup_test_app().await;

    let (status, body) = send(app, get("/api/v1/form")).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["fields"].as_array().unwrap().len(), 12);
    assert_eq!(body["fields"][0]["name"], "area");
    assert_eq!(body["fields"][0]["min"], 200.0);
    assert_eq!(body["fields"][0]["max"], 10000.0);
}

#[tokio::test]
async fn test_predict_reference_scenario() {
    let (app, _state) = setup_test_app().await;

    let input = json!({
        "area": 900,
        "bedrooms": 2,
        "bathrooms": 2,
        "balconies": 1,
        "age": 5,
        "total_floors": 15,
        "latitude": 19.0760,
        "longitude": 72.8777,
        "city": "Mumbai",
        "locality": "Andheri West",
        "property_type": "Apartment",
        "furnished": "Unfurnished"
    });
    let (status, body) = send(app, post_json("/api/v1/predict", &input)).await;

    assert_eq!(status, StatusCode::OK);
    let price = body["price_per_sqft"].as_f64().unwrap();
    assert_eq!(price, 19_500.0);
    assert_eq!(body["estimated_value"].as_f64().unwrap(), price * 900.0);
    assert_eq!(body["message"], SUCCESS_MESSAGE);
    assert_eq!(body["model_version"], "2024.06-gbr");
}

#[tokio::test]
async fn test_predict_clamps_out_of_range_input() {
    let (app, _state) = setup_test_app().await;

    let (status, body) = send(
        app,
        post_json("/api/v1/predict", &json!({"area": 50000, "bedrooms": 0})),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["area"].as_f64().unwrap(), 10_000.0);
    assert!(body["estimated_value"].as_f64().unwrap().is_finite());
}

#[tokio::test]
async fn test_predict_with_all_defaults() {
    let (app, _state) = setup_test_app().await;

    let (status, body) = send(app, post_json("/api/v1/predict", &json!({}))).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["area"].as_f64().unwrap(), 900.0);
}

#[tokio::test]
async fn test_predict_rejects_unknown_choice() {
    let (app, _state) = setup_test_app().await;

    let (status, body) = send(
        app,
        post_json("/api/v1/predict", &json!({"property_type": "Penthouse"})),
    )
    .await;

    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["kind"], "input");
}

fn reference_record() -> Value {
    json!({
        "area": 900.0,
        "bedroom_num": 2,
        "bathroom_num": 2,
        "balcony_num": 1,
        "age": 5,
        "total_floors": 15,
        "latitude": 19.076,
        "longitude": 72.8777,
        "city": "Mumbai",
        "locality": "Andheri West",
        "property_type": "Apartment",
        "furnished": "Unfurnished"
    })
}

#[tokio::test]
async fn test_predict_record() {
    let (app, _state) = setup_test_app().await;

    let (status, body) = send(app, post_json("/api/v1/predict/record", &reference_record())).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["price_per_sqft"].as_f64().unwrap(), 19_500.0);
}

#[tokio::test]
async fn test_predict_record_rejects_unknown_category() {
    let (app, _state) = setup_test_app().await;

    let mut record = reference_record();
    record["property_type"] = json!("Penthouse");
    let (status, body) = send(app, post_json("/api/v1/predict/record", &record)).await;

    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["kind"], "unknown_category");
    assert!(body.get("price_per_sqft").is_none());
}

#[tokio::test]
async fn test_predict_record_rejects_missing_field() {
    let (app, _state) = setup_test_app().await;

    let mut record = reference_record();
    record.as_object_mut().unwrap().remove("furnished");
    let (status, body) = send(app, post_json("/api/v1/predict/record", &record)).await;

    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["kind"], "missing_field");
}

#[tokio::test]
async fn test_predict_record_rejects_out_of_range() {
    let (app, _state) = setup_test_app().await;

    let mut record = reference_record();
    record["bedroom_num"] = json!(12);
    let (status, body) = send(app, post_json("/api/v1/predict/record", &record)).await;

    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["kind"], "input_range");
}

#[tokio::test]
async fn test_predict_record_rejects_fractional_counts() {
    let (app, _state) = setup_test_app().await;

    for (field, value) in [("bedroom_num", json!(2.5)), ("total_floors", json!(15.0000001))] {
        let mut record = reference_record();
        record[field] = value;
        let (status, body) = send(app.clone(), post_json("/api/v1/predict/record", &record)).await;

        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY, "{}", field);
        assert_eq!(body["kind"], "wrong_type");
        assert!(body["error"].as_str().unwrap().contains(field));
        assert!(body.get("price_per_sqft").is_none());
    }
}

#[tokio::test]
async fn test_predict_rejects_undecodable_form_with_json_error() {
    let (app, _state) = setup_test_app().await;

    let (status, body) = send(
        app.clone(),
        post_json("/api/v1/predict", &json!({"bedrooms": 2.5})),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["kind"], "wrong_type");
    assert!(body["error"].as_str().unwrap().contains("bedrooms"));

    let (_, body) = send(
        app.clone(),
        post_json("/api/v1/predict/record", &json!({"area": [900]})),
    )
    .await;
    assert_eq!(body["kind"], "wrong_type");

    let response = app.oneshot(get("/metrics")).await.unwrap();
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let text = String::from_utf8(body.to_vec()).unwrap();
    assert!(text.contains(r#"valuation_prediction_errors_total{kind="wrong_type"}"#));
}

#[tokio::test]
async fn test_predict_rejects_malformed_json() {
    let (app, _state) = setup_test_app().await;

    let request = Request::builder()
        .method("POST")
        .uri("/api/v1/predict")
        .header("content-type", "application/json")
        .body(Body::from("{\"area\": "))
        .unwrap();
    let (status, body) = send(app, request).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["kind"], "invalid_body");
}

#[tokio::test]
async fn test_service_usable_after_rejected_request() {
    let (app, _state) = setup_test_app().await;

    let mut bad = reference_record();
    bad["furnished"] = json!("Luxury");
    let (status, _) = send(app.clone(), post_json("/api/v1/predict/record", &bad)).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);

    let (status, _) = send(app, post_json("/api/v1/predict/record", &reference_record())).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_model_info() {
    let (app, _state) = setup_test_app().await;

    let (status, body) = send(app, get("/api/v1/model")).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["estimator"], "tree_ensemble");
    assert_eq!(body["features"].as_array().unwrap().len(), 12);
}

#[tokio::test]
async fn test_missing_artifact_is_unavailable() {
    let dir = tempfile::TempDir::new().unwrap();
    let predictor = ValuationPredictor::from_path(dir.path().join("missing.json"));
    let (app, state) = setup_app(predictor, false).await;

    let (status, body) = send(app.clone(), post_json("/api/v1/predict", &json!({}))).await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(body["kind"], "load");
    assert!(!state.predictor.is_loaded());

    let (status, body) = send(app, get("/readyz")).await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(body["ready"], false);
}

#[tokio::test]
async fn test_healthz_and_readyz_when_loaded() {
    let (app, _state) = setup_test_app().await;

    let (status, body) = send(app.clone(), get("/healthz")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["model_version"], "2024.06-gbr");

    let (status, body) = send(app, get("/readyz")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["ready"], true);
}

#[tokio::test]
async fn test_healthz_returns_503_when_unhealthy() {
    let (app, state) = setup_test_app().await;

    state
        .health_registry
        .set_unhealthy(components::PREDICTOR, "artifact unreadable")
        .await;

    let (status, body) = send(app, get("/healthz")).await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(body["status"], "unhealthy");
}

#[tokio::test]
async fn test_metrics_endpoint() {
    let (app, _state) = setup_test_app().await;

    let (status, _) = send(app.clone(), post_json("/api/v1/predict", &json!({}))).await;
    assert_eq!(status, StatusCode::OK);

    let response = app.oneshot(get("/metrics")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let text = String::from_utf8(body.to_vec()).unwrap();
    assert!(text.contains("valuation_predictions_total"));
}
