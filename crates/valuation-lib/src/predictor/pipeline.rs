//! Fitted preprocessing + estimator pipeline

use super::features::Preprocessor;
use super::inference::Estimator;
use super::output::TargetTransform;
use super::Regressor;
use crate::error::PredictionError;
use crate::models::{ModelInfo, PropertyRecord};

/// A complete valuation model: encode, estimate, invert the target transform
pub struct ValuationPipeline {
    name: String,
    version: String,
    target: String,
    preprocessor: Preprocessor,
    estimator: Box<dyn Estimator>,
    transform: TargetTransform,
}

impl ValuationPipeline {
    pub fn new(
        name: impl Into<String>,
        version: impl Into<String>,
        target: impl Into<String>,
        preprocessor: Preprocessor,
        estimator: Box<dyn Estimator>,
        transform: TargetTransform,
    ) -> Self {
        Self {
            name: name.into(),
            version: version.into(),
            target: target.into(),
            preprocessor,
            estimator,
            transform,
        }
    }

    pub fn preprocessor(&self) -> &Preprocessor {
        &self.preprocessor
    }
}

impl Regressor for ValuationPipeline {
    fn predict(&self, record: &PropertyRecord) -> Result<f64, PredictionError> {
        let features = self.preprocessor.transform(record)?;
        let raw = self.estimator.predict(&features)?;
        self.transform.finish(raw)
    }

    fn describe(&self) -> ModelInfo {
        ModelInfo {
            name: self.name.clone(),
            version: self.version.clone(),
            estimator: self.estimator.kind().to_string(),
            target: self.target.clone(),
            features: self.preprocessor.column_names(),
        }
    }
}
