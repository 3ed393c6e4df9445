//! Caller-side valuation: price per square foot times area

use crate::error::{PredictionError, ValuationError};
use crate::models::{fields, PropertyRecord, Valuation};
use crate::predictor::ValuationPredictor;

/// Predict the price per square foot and derive the total value
pub fn valuate(
    predictor: &ValuationPredictor,
    record: &PropertyRecord,
) -> Result<Valuation, ValuationError> {
    let price_per_sqft = predictor.predict(record)?;
    let area = record.number(fields::AREA)?;
    Ok(Valuation::from_prediction(price_per_sqft, area))
}

/// Short, stable label for an error, used in metrics and logs
pub fn error_kind(error: &ValuationError) -> &'static str {
    match error {
        ValuationError::Load(_) => "load",
        ValuationError::InputRange(_) => "input_range",
        ValuationError::Input(_) => "input",
        ValuationError::Prediction(e) => match e {
            PredictionError::MissingField(_) => "missing_field",
            PredictionError::UnexpectedField(_) => "unexpected_field",
            PredictionError::WrongType { .. } => "wrong_type",
            PredictionError::UnknownCategory { .. } => "unknown_category",
            PredictionError::NonFinite(_) => "non_finite",
            PredictionError::Inference(_) => "inference",
        },
    }
}
