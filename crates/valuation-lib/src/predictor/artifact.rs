//! Model artifact loading
//!
//! The artifact is a JSON document describing a fitted pipeline: the column
//! transformer, the estimator and the target transform. ONNX estimators keep
//! their graph in a separate file next to the artifact.

use super::features::{ColumnSpec, Preprocessor};
use super::inference::EstimatorSpec;
use super::output::TargetTransform;
use super::pipeline::ValuationPipeline;
use super::Regressor;
use crate::error::LoadError;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::{debug, info};

/// Artifact location relative to the working directory
pub const DEFAULT_ARTIFACT_PATH: &str = "models/mumbai_real_estate_investment_model.json";

/// Artifact format version this runtime understands
pub const FORMAT_VERSION: u32 = 1;

/// Serialized form of a fitted pipeline
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArtifactDocument {
    pub format_version: u32,
    pub name: String,
    pub version: String,
    #[serde(default = "default_target")]
    pub target: String,
    pub preprocessor: PreprocessorSpec,
    #[serde(default)]
    pub target_transform: TargetTransform,
    pub estimator: EstimatorSpec,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PreprocessorSpec {
    pub columns: Vec<ColumnSpec>,
}

fn default_target() -> String {
    "price_per_sqft".to_string()
}

impl ArtifactDocument {
    /// Parse an artifact document from JSON text
    pub fn from_json(path: &Path, text: &str) -> Result<Self, LoadError> {
        serde_json::from_str(text).map_err(|source| LoadError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Check compatibility and build the runnable pipeline
    ///
    /// `artifact_dir` resolves relative paths inside the document.
    pub fn into_pipeline(self, artifact_dir: &Path) -> Result<ValuationPipeline, LoadError> {
        if self.format_version != FORMAT_VERSION {
            return Err(LoadError::UnsupportedFormatVersion {
                found: self.format_version,
                supported: FORMAT_VERSION,
            });
        }

        let preprocessor = Preprocessor::new(self.preprocessor.columns)?;
        let estimator = self
            .estimator
            .build(preprocessor.output_width(), artifact_dir)?;

        Ok(ValuationPipeline::new(
            self.name,
            self.version,
            self.target,
            preprocessor,
            estimator,
            self.target_transform,
        ))
    }
}

/// Source of the trained model
///
/// Called at most once per [`ValuationPredictor`](super::ValuationPredictor).
pub trait ArtifactLoader: Send + Sync {
    fn load(&self) -> Result<Box<dyn Regressor>, LoadError>;

    /// Where the artifact comes from, for diagnostics
    fn source(&self) -> String;
}

/// Loads the artifact from a file on disk
#[derive(Debug, Clone)]
pub struct FileArtifactLoader {
    path: PathBuf,
}

impl FileArtifactLoader {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read, parse and build the pipeline stored at this loader's path
    pub fn load_pipeline(&self) -> Result<ValuationPipeline, LoadError> {
        let start = Instant::now();
        debug!(path = %self.path.display(), "Reading model artifact");

        let text = std::fs::read_to_string(&self.path).map_err(|source| {
            if source.kind() == std::io::ErrorKind::NotFound {
                LoadError::NotFound {
                    path: self.path.clone(),
                }
            } else {
                LoadError::Io {
                    path: self.path.clone(),
                    source,
                }
            }
        })?;

        let document = ArtifactDocument::from_json(&self.path, &text)?;
        let artifact_dir = self.path.parent().unwrap_or_else(|| Path::new("."));
        let pipeline = document.into_pipeline(artifact_dir)?;

        info!(
            path = %self.path.display(),
            elapsed_ms = start.elapsed().as_millis() as u64,
            "Model artifact loaded"
        );
        Ok(pipeline)
    }
}

impl Default for FileArtifactLoader {
    fn default() -> Self {
        Self::new(DEFAULT_ARTIFACT_PATH)
    }
}

impl ArtifactLoader for FileArtifactLoader {
    fn load(&self) -> Result<Box<dyn Regressor>, LoadError> {
        Ok(Box::new(self.load_pipeline()?))
    }

    fn source(&self) -> String {
        self.path.display().to_string()
    }
}
