//! Post-processing of raw estimator outputs
//!
//! Models trained on a transformed target (log price per square foot is
//! common) are mapped back to price per square foot here.

use crate::error::PredictionError;
use serde::{Deserialize, Serialize};

/// Transform applied to the target during training
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TargetTransform {
    #[default]
    Identity,
    Log,
    Log1p,
}

impl TargetTransform {
    /// Map a raw estimator output back to the target's scale
    pub fn inverse(&self, raw: f64) -> f64 {
        match self {
            TargetTransform::Identity => raw,
            TargetTransform::Log => raw.exp(),
            TargetTransform::Log1p => raw.exp_m1(),
        }
    }

    /// Invert the transform and reject estimates that are not finite
    pub fn finish(&self, raw: f64) -> Result<f64, PredictionError> {
        let value = self.inverse(raw);
        if value.is_finite() {
            Ok(value)
        } else {
            Err(PredictionError::NonFinite(value))
        }
    }
}
