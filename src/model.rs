//! The regression model seam.
//!
//! The pipeline only sees [`Regressor`]. The bundled artifact format is a JSON
//! linear model; anything else can be plugged in behind the trait.

use std::fs;
use std::path::Path;
use std::sync::Arc;

use serde::Deserialize;

use crate::constants::FEATURE_NAMES;
use crate::error::ModelLoadError;
use crate::models::FeatureVector;

/// A pre-trained model mapping a feature vector to a PM2.5 estimate.
pub trait Regressor: Send + Sync {
    fn predict(&self, features: &FeatureVector) -> anyhow::Result<f64>;
}

/// Process-wide model handle. `None` when loading failed at startup.
pub type ModelHandle = Option<Arc<dyn Regressor>>;

#[derive(Debug, Clone, Deserialize)]
pub struct LinearModel {
    features: Vec<String>,
    coefficients: Vec<f64>,
    intercept: f64,
}

impl LinearModel {
    pub fn from_json(text: &str) -> Result<Self, ModelLoadError> {
        let model: LinearModel = serde_json::from_str(text)?;
        model.validate()?;
        Ok(model)
    }

    pub fn load(path: &Path) -> Result<Self, ModelLoadError> {
        let text = fs::read_to_string(path).map_err(|source| ModelLoadError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&text)
    }

    fn validate(&self) -> Result<(), ModelLoadError> {
        if self.features.iter().map(String::as_str).ne(FEATURE_NAMES) {
            return Err(ModelLoadError::FeatureMismatch {
                expected: FEATURE_NAMES.iter().map(|s| s.to_string()).collect(),
                found: self.features.clone(),
            });
        }
        if self.coefficients.len() != FEATURE_NAMES.len() {
            return Err(ModelLoadError::CoefficientCount {
                expected: FEATURE_NAMES.len(),
                found: self.coefficients.len(),
            });
        }
        Ok(())
    }
}

impl Regressor for LinearModel {
    fn predict(&self, features: &FeatureVector) -> anyhow::Result<f64> {
        let pm25 = features
            .values()
            .iter()
            .zip(&self.coefficients)
            .fold(self.intercept, |acc, (x, w)| acc + x * w);

        if !pm25.is_finite() {
            anyhow::bail!("model produced a non-finite prediction: {pm25}");
        }
        Ok(pm25)
    }
}

/// Loads the artifact once at startup. Failure degrades to an absent handle.
pub fn load_handle(path: &Path) -> ModelHandle {
    match LinearModel::load(path) {
        Ok(model) => {
            tracing::info!("Loaded model from {}", path.display());
            Some(Arc::new(model))
        }
        Err(e) => {
            tracing::error!("Model unavailable, predictions will be refused: {}", e);
            None
        }
    }
}
