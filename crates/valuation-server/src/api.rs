//! HTTP API: form schema, predictions, health checks and Prometheus metrics

use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use prometheus::{Encoder, TextEncoder};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Instant;
use tracing::info;
use valuation_lib::{
    error_kind, form_schema, valuate, ComponentStatus, FormInput, HealthRegistry,
    PropertyForm, PropertyRecord, StructuredLogger, Valuation, ValuationError,
    ValuationMetrics, ValuationPredictor,
};

pub const SUCCESS_MESSAGE: &str = "Prediction generated successfully";

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub predictor: Arc<ValuationPredictor>,
    pub health_registry: HealthRegistry,
    pub metrics: ValuationMetrics,
    pub logger: StructuredLogger,
}

impl AppState {
    pub fn new(
        predictor: Arc<ValuationPredictor>,
        health_registry: HealthRegistry,
        metrics: ValuationMetrics,
        logger: StructuredLogger,
    ) -> Self {
        Self {
            predictor,
            health_registry,
            metrics,
            logger,
        }
    }

    /// Value one record, recording metrics and logs
    fn valuate(&self, record: &PropertyRecord) -> Result<Valuation, ValuationError> {
        let start = Instant::now();
        let result = valuate(&self.predictor, record);
        let elapsed = start.elapsed();

        match &result {
            Ok(valuation) => {
                self.metrics.observe_prediction_latency(elapsed.as_secs_f64());
                self.metrics.inc_predictions();
                self.logger.log_prediction(
                    valuation.area,
                    valuation.price_per_sqft,
                    valuation.estimated_value,
                    elapsed.as_micros() as u64,
                );
            }
            Err(e) => self.record_failure(e),
        }
        result
    }

    fn record_failure(&self, error: &ValuationError) {
        let kind = error_kind(error);
        self.metrics.inc_prediction_errors(kind);
        self.logger.log_prediction_failed(kind, &error.to_string());
    }

    /// Turn an unreadable request body into an API error, counting it like
    /// any other rejected request
    fn reject_body(&self, rejection: JsonRejection) -> ApiError {
        let kind = match &rejection {
            JsonRejection::JsonDataError(_) => "wrong_type",
            _ => "invalid_body",
        };
        let message = rejection.body_text();
        self.metrics.inc_prediction_errors(kind);
        self.logger.log_prediction_failed(kind, &message);
        ApiError::Body {
            status: rejection.status(),
            kind,
            message,
        }
    }
}

/// Successful valuation response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PredictResponse {
    pub price_per_sqft: f64,
    pub estimated_value: f64,
    pub area: f64,
    pub model_version: String,
    pub message: String,
}

/// Error body returned for rejected requests
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    pub kind: String,
}

/// A failed request on its way to the client
pub enum ApiError {
    Valuation(ValuationError),
    /// The body could not be read as the expected JSON
    Body {
        status: StatusCode,
        kind: &'static str,
        message: String,
    },
}

impl From<ValuationError> for ApiError {
    fn from(error: ValuationError) -> Self {
        Self::Valuation(error)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, body) = match self {
            ApiError::Valuation(error) => {
                // A missing model is the service's fault; anything else is the request's.
                let status = if error.is_recoverable() {
                    StatusCode::UNPROCESSABLE_ENTITY
                } else {
                    StatusCode::SERVICE_UNAVAILABLE
                };
                let body = ErrorResponse {
                    error: error.to_string(),
                    kind: error_kind(&error).to_string(),
                };
                (status, body)
            }
            ApiError::Body {
                status,
                kind,
                message,
            } => (
                status,
                ErrorResponse {
                    error: message,
                    kind: kind.to_string(),
                },
            ),
        };
        (status, Json(body)).into_response()
    }
}

fn respond(state: &AppState, valuation: Valuation) -> Result<Json<PredictResponse>, ApiError> {
    let model_version = state
        .predictor
        .model_info()
        .map_err(ValuationError::from)?
        .version;
    Ok(Json(PredictResponse {
        price_per_sqft: valuation.price_per_sqft,
        estimated_value: valuation.estimated_value,
        area: valuation.area,
        model_version,
        message: SUCCESS_MESSAGE.to_string(),
    }))
}

/// Form controls with bounds and defaults
async fn form() -> impl IntoResponse {
    Json(form_schema())
}

/// Predict from form input; numeric entries are clamped, missing ones defaulted
async fn predict(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<FormInput>, JsonRejection>,
) -> Result<Json<PredictResponse>, ApiError> {
    let Json(input) = payload.map_err(|rejection| state.reject_body(rejection))?;
    let form = PropertyForm::from_input(&input).map_err(|e| {
        let e = ValuationError::from(e);
        state.record_failure(&e);
        e
    })?;
    let valuation = state.valuate(&form.submit())?;
    respond(&state, valuation)
}

/// Predict from a raw record, applying the form's bounds first
async fn predict_record(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<PropertyRecord>, JsonRejection>,
) -> Result<Json<PredictResponse>, ApiError> {
    let Json(record) = payload.map_err(|rejection| state.reject_body(rejection))?;
    record.check_bounds().map_err(|e| {
        let e = ValuationError::from(e);
        state.record_failure(&e);
        e
    })?;
    let valuation = state.valuate(&record)?;
    respond(&state, valuation)
}

/// Loaded model description
async fn model(State(state): State<Arc<AppState>>) -> Result<impl IntoResponse, ApiError> {
    let info = state.predictor.model_info().map_err(ValuationError::from)?;
    Ok(Json(info))
}

/// Health check response - returns 200 if healthy, 503 if unhealthy
async fn healthz(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let health = state.health_registry.health().await;

    let status_code = match health.status {
        ComponentStatus::Healthy | ComponentStatus::Degraded => StatusCode::OK,
        ComponentStatus::Unhealthy => StatusCode::SERVICE_UNAVAILABLE,
    };

    (status_code, Json(health))
}

/// Readiness check response - returns 200 once the model is loaded
async fn readyz(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let readiness = state.health_registry.readiness().await;

    let status_code = if readiness.ready {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    (status_code, Json(readiness))
}

/// Prometheus metrics endpoint
async fn metrics() -> impl IntoResponse {
    let encoder = TextEncoder::new();
    let metric_families = prometheus::gather();
    let mut buffer = Vec::new();

    if let Err(e) = encoder.encode(&metric_families, &mut buffer) {
        return (
            StatusCode::INTERNAL_SERVER_ERROR,
            [("content-type", "text/plain; charset=utf-8")],
            e.to_string().into_bytes(),
        );
    }

    (
        StatusCode::OK,
        [("content-type", "text/plain; charset=utf-8")],
        buffer,
    )
}

/// Create the API router
pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/api/v1/form", get(form))
        .route("/api/v1/predict", post(predict))
        .route("/api/v1/predict/record", post(predict_record))
        .route("/api/v1/model", get(model))
        .route("/healthz", get(healthz))
        .route("/readyz", get(readyz))
        .route("/metrics", get(metrics))
        .with_state(state)
}

/// Start the API server, stopping when `shutdown` resolves
pub async fn serve(
    addr: &str,
    state: Arc<AppState>,
    shutdown: impl std::future::Future<Output = ()> + Send + 'static,
) -> anyhow::Result<()> {
    let app = create_router(state);

    info!(addr = %addr, "Starting API server");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown)
        .await?;

    Ok(())
}
