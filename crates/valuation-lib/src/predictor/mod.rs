//! ML valuation engine

mod artifact;
mod features;
mod handle;
mod inference;
mod output;
mod pipeline;


pub use artifact::{
    ArtifactDocument, ArtifactLoader, FileArtifactLoader, PreprocessorSpec,
    DEFAULT_ARTIFACT_PATH, FORMAT_VERSION,
};
pub use features::{ColumnSpec, HandleUnknown, Preprocessor};
pub use handle::ValuationPredictor;
pub use inference::{
    compute_checksum, Estimator, EstimatorSpec, LinearEstimator, OnnxEstimator, Tree,
    TreeEnsemble, TreeNode,
};
pub use output::TargetTransform;
pub use pipeline::ValuationPipeline;

use crate::error::PredictionError;
use crate::models::{ModelInfo, PropertyRecord};

/// A trained model that prices one property record
pub trait Regressor: Send + Sync {
    /// Price per square foot for the record
    fn predict(&self, record: &PropertyRecord) -> Result<f64, PredictionError>;

    /// Describe the model
    fn describe(&self) -> ModelInfo;
}
