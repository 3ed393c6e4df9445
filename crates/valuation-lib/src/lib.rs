//! Property valuation library
//!
//! This crate provides the core functionality for:
//! - Collecting property details through a clamped input form
//! - Loading a pre-trained valuation model once per process
//! - Predicting price per square foot and deriving total value
//! - Health checks and observability

pub mod error;
pub mod form;
pub mod health;
pub mod models;
pub mod observability;
pub mod predictor;
pub mod valuation;

pub use error::{InputError, InputRangeError, LoadError, PredictionError, ValuationError};
pub use form::{form_schema, FormInput, FormSchema, PropertyForm};
pub use health::{
    ComponentHealth, ComponentStatus, HealthRegistry, HealthResponse, ReadinessResponse,
};
pub use models::*;
pub use observability::{StructuredLogger, ValuationMetrics};
pub use predictor::{Regressor, ValuationPredictor};
pub use valuation::{error_kind, valuate};
