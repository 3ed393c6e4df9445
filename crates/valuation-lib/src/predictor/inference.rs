//! Estimators that map an encoded feature vector to a price estimate
//!
//! Three families are supported: linear models, additive regression tree
//! ensembles (gradient boosting, random forests averaged into leaf values),
//! and arbitrary ONNX graphs run through tract.

use crate::error::{LoadError, PredictionError};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::path::{Path, PathBuf};
use std::time::Instant;
use tract_onnx::prelude::*;
use tracing::{debug, warn};

/// Maximum inference latency before warning
const MAX_INFERENCE_MS: u128 = 5;

type TractModel = SimplePlan<TypedFact, Box<dyn TypedOp>, Graph<TypedFact, Box<dyn TypedOp>>>;

/// A fitted regressor over encoded features
pub trait Estimator: Send + Sync {
    /// Predict the (possibly transformed) target for one feature vector
    fn predict(&self, features: &[f64]) -> Result<f64, PredictionError>;

    /// Short name of the estimator family
    fn kind(&self) -> &'static str;
}

/// Serialized estimator section of the artifact
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum EstimatorSpec {
    Linear {
        intercept: f64,
        coefficients: Vec<f64>,
    },
    TreeEnsemble {
        #[serde(default)]
        base_score: f64,
        trees: Vec<Tree>,
    },
    Onnx {
        /// Graph file, relative to the artifact's directory
        path: PathBuf,
        #[serde(default)]
        sha256: Option<String>,
    },
}

impl EstimatorSpec {
    /// Build a runnable estimator for `width` input features
    pub fn build(self, width: usize, artifact_dir: &Path) -> Result<Box<dyn Estimator>, LoadError> {
        match self {
            EstimatorSpec::Linear {
                intercept,
                coefficients,
            } => Ok(Box::new(LinearEstimator::new(intercept, coefficients, width)?)),
            EstimatorSpec::TreeEnsemble { base_score, trees } => {
                Ok(Box::new(TreeEnsemble::new(base_score, trees, width)?))
            }
            EstimatorSpec::Onnx { path, sha256 } => {
                let path = artifact_dir.join(path);
                Ok(Box::new(OnnxEstimator::from_file(&path, sha256.as_deref(), width)?))
            }
        }
    }
}

/// Ordinary linear model: `intercept + coefficients · features`
#[derive(Debug, Clone)]
pub struct LinearEstimator {
    intercept: f64,
    coefficients: Vec<f64>,
}

impl LinearEstimator {
    pub fn new(intercept: f64, coefficients: Vec<f64>, width: usize) -> Result<Self, LoadError> {
        if coefficients.len() != width {
            return Err(LoadError::Incompatible(format!(
                "linear model has {} coefficients but the preprocessor produces {} features",
                coefficients.len(),
                width
            )));
        }
        if !intercept.is_finite() || coefficients.iter().any(|c| !c.is_finite()) {
            return Err(LoadError::Incompatible(
                "linear model has non-finite parameters".to_string(),
            ));
        }
        Ok(Self {
            intercept,
            coefficients,
        })
    }
}

impl Estimator for LinearEstimator {
    fn predict(&self, features: &[f64]) -> Result<f64, PredictionError> {
        if features.len() != self.coefficients.len() {
            return Err(PredictionError::Inference(format!(
                "expected {} features, got {}",
                self.coefficients.len(),
                features.len()
            )));
        }
        Ok(self.intercept
            + self
                .coefficients
                .iter()
                .zip(features)
                .map(|(c, x)| c * x)
                .sum::<f64>())
    }

    fn kind(&self) -> &'static str {
        "linear"
    }
}

/// A node in a regression tree
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TreeNode {
    Split {
        feature: usize,
        threshold: f64,
        left: usize,
        right: usize,
        /// Direction for missing (NaN) values
        #[serde(default = "default_left")]
        default_left: bool,
    },
    Leaf {
        value: f64,
    },
}

fn default_left() -> bool {
    true
}

/// A regression tree stored as a flat node array, root at index 0
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tree {
    pub nodes: Vec<TreeNode>,
}

impl Tree {
    fn validate(&self, index: usize, width: usize) -> Result<(), LoadError> {
        let invalid = |reason: String| {
            LoadError::Incompatible(format!("tree {}: {}", index, reason))
        };

        if self.nodes.is_empty() {
            return Err(invalid("has no nodes".to_string()));
        }
        for (i, node) in self.nodes.iter().enumerate() {
            match node {
                TreeNode::Split {
                    feature,
                    threshold,
                    left,
                    right,
                    ..
                } => {
                    if *feature >= width {
                        return Err(invalid(format!(
                            "node {} splits on feature {} but only {} features exist",
                            i, feature, width
                        )));
                    }
                    if threshold.is_nan() {
                        return Err(invalid(format!("node {} has a NaN threshold", i)));
                    }
                    // Children must come after their parent, which also rules out cycles.
                    for child in [*left, *right] {
                        if child <= i || child >= self.nodes.len() {
                            return Err(invalid(format!(
                                "node {} has invalid child index {}",
                                i, child
                            )));
                        }
                    }
                }
                TreeNode::Leaf { value } => {
                    if !value.is_finite() {
                        return Err(invalid(format!("leaf {} is not finite", i)));
                    }
                }
            }
        }
        Ok(())
    }

    /// Walk from the root to a leaf and return its value
    pub fn evaluate(&self, features: &[f64]) -> f64 {
        let mut index = 0;
        loop {
            match &self.nodes[index] {
                TreeNode::Leaf { value } => return *value,
                TreeNode::Split {
                    feature,
                    threshold,
                    left,
                    right,
                    default_left,
                } => {
                    let x = features[*feature];
                    let go_left = if x.is_nan() {
                        *default_left
                    } else {
                        x < *threshold
                    };
                    index = if go_left { *left } else { *right };
                }
            }
        }
    }
}

/// Additive ensemble of regression trees
#[derive(Debug, Clone)]
pub struct TreeEnsemble {
    base_score: f64,
    trees: Vec<Tree>,
    width: usize,
}

impl TreeEnsemble {
    pub fn new(base_score: f64, trees: Vec<Tree>, width: usize) -> Result<Self, LoadError> {
        if !base_score.is_finite() {
            return Err(LoadError::Incompatible("base score is not finite".to_string()));
        }
        for (i, tree) in trees.iter().enumerate() {
            tree.validate(i, width)?;
        }
        Ok(Self {
            base_score,
            trees,
            width,
        })
    }
}

impl Estimator for TreeEnsemble {
    fn predict(&self, features: &[f64]) -> Result<f64, PredictionError> {
        if features.len() != self.width {
            return Err(PredictionError::Inference(format!(
                "expected {} features, got {}",
                self.width,
                features.len()
            )));
        }
        Ok(self.base_score + self.trees.iter().map(|t| t.evaluate(features)).sum::<f64>())
    }

    fn kind(&self) -> &'static str {
        "tree_ensemble"
    }
}

/// ONNX graph with a single `[1, width]` f32 input and a scalar output
pub struct OnnxEstimator {
    model: TractModel,
    width: usize,
}

impl OnnxEstimator {
    /// Load an ONNX graph from disk, verifying its checksum if one is given
    pub fn from_file(path: &Path, sha256: Option<&str>, width: usize) -> Result<Self, LoadError> {
        let bytes = std::fs::read(path).map_err(|source| {
            if source.kind() == std::io::ErrorKind::NotFound {
                LoadError::NotFound {
                    path: path.to_path_buf(),
                }
            } else {
                LoadError::Io {
                    path: path.to_path_buf(),
                    source,
                }
            }
        })?;

        if let Some(expected) = sha256 {
            let actual = compute_checksum(&bytes);
            if !actual.eq_ignore_ascii_case(expected) {
                return Err(LoadError::ChecksumMismatch {
                    path: path.to_path_buf(),
                    expected: expected.to_string(),
                    actual,
                });
            }
        }

        let model = Self::load_model(&bytes, width).map_err(|e| LoadError::Onnx {
            path: path.to_path_buf(),
            message: format!("{:#}", e),
        })?;
        Ok(Self { model, width })
    }

    /// Parse, type and optimize an ONNX model from bytes
    fn load_model(model_bytes: &[u8], width: usize) -> TractResult<TractModel> {
        tract_onnx::onnx()
            .model_for_read(&mut std::io::Cursor::new(model_bytes))?
            .with_input_fact(0, f32::fact([1, width]).into())?
            .into_optimized()?
            .into_runnable()
    }
}

impl Estimator for OnnxEstimator {
    fn predict(&self, features: &[f64]) -> Result<f64, PredictionError> {
        let start = Instant::now();

        let data: Vec<f32> = features.iter().map(|&x| x as f32).collect();
        let input: Tensor = tract_ndarray::Array2::from_shape_vec((1, self.width), data)
            .map_err(|e| PredictionError::Inference(e.to_string()))?
            .into();

        let result = self
            .model
            .run(tvec!(input.into()))
            .map_err(|e| PredictionError::Inference(format!("{:#}", e)))?;
        let output = result
            .first()
            .ok_or_else(|| PredictionError::Inference("no output from model".to_string()))?;
        let value = output
            .to_array_view::<f32>()
            .map_err(|e| PredictionError::Inference(format!("{:#}", e)))?
            .iter()
            .next()
            .copied()
            .ok_or_else(|| PredictionError::Inference("model output is empty".to_string()))?;

        let elapsed = start.elapsed();
        if elapsed.as_millis() > MAX_INFERENCE_MS {
            warn!(elapsed_ms = elapsed.as_millis(), "Inference exceeded {}ms target", MAX_INFERENCE_MS);
        } else {
            debug!(elapsed_us = elapsed.as_micros(), "Inference completed");
        }

        Ok(value as f64)
    }

    fn kind(&self) -> &'static str {
        "onnx"
    }
}

/// Hex-encoded SHA-256 of a byte slice
pub fn compute_checksum(data: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(data);
    hex::encode(hasher.finalize())
}
