//! Error types for the valuation library
//!
//! Load failures are fatal to the process, prediction failures are
//! per-request and recoverable.

use std::path::PathBuf;
use thiserror::Error;

/// Failure to load the model artifact. No prediction is possible after this.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("model artifact not found at {path}")]
    NotFound { path: PathBuf },

    #[error("failed to read model artifact {path}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse model artifact {path}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("unsupported artifact format version {found} (supported: {supported})")]
    UnsupportedFormatVersion { found: u32, supported: u32 },

    #[error("artifact is incompatible with this runtime: {0}")]
    Incompatible(String),

    #[error("checksum mismatch for {path}: expected {expected}, got {actual}")]
    ChecksumMismatch {
        path: PathBuf,
        expected: String,
        actual: String,
    },

    #[error("failed to load ONNX graph {path}: {message}")]
    Onnx { path: PathBuf, message: String },
}

/// Failure to produce a prediction for a single record.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum PredictionError {
    #[error("record is missing required field '{0}'")]
    MissingField(String),

    #[error("record has field '{0}' which the model was not trained on")]
    UnexpectedField(String),

    #[error("field '{field}' must be {expected}")]
    WrongType {
        field: String,
        expected: &'static str,
    },

    #[error("unknown value '{value}' for field '{field}'")]
    UnknownCategory { field: String, value: String },

    #[error("model produced a non-finite estimate ({0})")]
    NonFinite(f64),

    #[error("inference failed: {0}")]
    Inference(String),
}

/// A record field lies outside the bounds the form enforces.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("field '{field}' = {value} is outside [{min}, {max}]")]
pub struct InputRangeError {
    pub field: String,
    pub value: f64,
    pub min: f64,
    pub max: f64,
}

/// A form submission that no form control could have produced.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum InputError {
    #[error("'{value}' is not a valid choice for {field} (expected one of: {choices})")]
    UnknownChoice {
        field: &'static str,
        value: String,
        choices: String,
    },
}

/// Any failure surfaced by a valuation request.
#[derive(Debug, Error)]
pub enum ValuationError {
    #[error(transparent)]
    Load(#[from] LoadError),

    #[error(transparent)]
    Prediction(#[from] PredictionError),

    #[error(transparent)]
    InputRange(#[from] InputRangeError),

    #[error(transparent)]
    Input(#[from] InputError),
}

impl ValuationError {
    /// Whether the caller can retry with different input
    pub fn is_recoverable(&self) -> bool {
        !matches!(self, ValuationError::Load(_))
    }
}
