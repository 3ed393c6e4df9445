//! Process-lifetime handle to the trained model
//!
//! The handle starts uninitialized and loads the artifact on first use.
//! Concurrent first callers block until the single load finishes; once
//! ready the model is never reloaded.

use super::artifact::{ArtifactLoader, FileArtifactLoader};
use super::Regressor;
use crate::error::{LoadError, ValuationError};
use crate::models::{ModelInfo, PropertyRecord};
use once_cell::sync::OnceCell;
use std::path::PathBuf;
use tracing::{error, info};

/// Lazily loaded valuation model
pub struct ValuationPredictor {
    loader: Box<dyn ArtifactLoader>,
    model: OnceCell<Box<dyn Regressor>>,
}

impl ValuationPredictor {
    pub fn new(loader: impl ArtifactLoader + 'static) -> Self {
        Self {
            loader: Box::new(loader),
            model: OnceCell::new(),
        }
    }

    /// Predictor backed by the artifact file at `path`
    pub fn from_path(path: impl Into<PathBuf>) -> Self {
        Self::new(FileArtifactLoader::new(path))
    }

    /// Load the model if this has not happened yet
    pub fn ensure_loaded(&self) -> Result<&dyn Regressor, LoadError> {
        let model = self.model.get_or_try_init(|| {
            info!(source = %self.loader.source(), "Loading valuation model");
            self.loader.load().map_err(|e| {
                error!(source = %self.loader.source(), error = %e, "Failed to load valuation model");
                e
            })
        })?;
        Ok(model.as_ref())
    }

    pub fn is_loaded(&self) -> bool {
        self.model.get().is_some()
    }

    /// Price per square foot for one record
    ///
    /// The record is passed to the model as is; the caller derives the total
    /// value from the result.
    pub fn predict(&self, record: &PropertyRecord) -> Result<f64, ValuationError> {
        let model = self.ensure_loaded()?;
        Ok(model.predict(record)?)
    }

    pub fn model_info(&self) -> Result<ModelInfo, LoadError> {
        Ok(self.ensure_loaded()?.describe())
    }

    pub fn source(&self) -> String {
        self.loader.source()
    }
}

impl Default for ValuationPredictor {
    fn default() -> Self {
        Self::new(FileArtifactLoader::default())
    }
}
