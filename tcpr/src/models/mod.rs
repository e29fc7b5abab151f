//! Pre-trained model capabilities
//!
//! The core only talks to models through the narrow traits below, so it can
//! run against stub models in tests. Concrete JSON-backed implementations
//! live in the submodules; how those artifacts are produced is outside this
//! crate.

pub mod linear;
pub mod scaler;
pub mod tfidf;

pub use linear::{LinearRegressor, LogisticClassifier};
pub use scaler::StandardScaler;
pub use tfidf::TfidfVectorizer;

use crate::error::{Error, Result};
use serde::de::DeserializeOwned;
use std::path::Path;
use tracing::info;

/// Text → fixed-width weighted term vector over a closed vocabulary
pub trait TextWeighting: Send + Sync {
    /// Number of output dimensions
    fn width(&self) -> usize;

    /// Weight the terms of `text`; out-of-vocabulary terms are ignored
    fn transform(&self, text: &str) -> Vec<f64>;
}

/// Scalar → scaled numeric feature dimensions
pub trait NumericScaler: Send + Sync {
    /// Number of output dimensions
    fn width(&self) -> usize;

    fn transform(&self, value: f64) -> Vec<f64>;
}

/// Feature vector → real value (predicted duration)
pub trait Regressor: Send + Sync {
    /// Feature width the model was trained on
    fn input_width(&self) -> usize;

    fn predict(&self, features: &[f64]) -> f64;
}

/// Feature vector → positive-class probability in [0, 1]
pub trait Classifier: Send + Sync {
    /// Feature width the model was trained on
    fn input_width(&self) -> usize;

    fn predict_proba(&self, features: &[f64]) -> f64;
}

/// The four models a prediction needs, loaded once and never mutated
pub struct ModelSet {
    pub text_weighting: Box<dyn TextWeighting>,
    pub scaler: Box<dyn NumericScaler>,
    pub regressor: Box<dyn Regressor>,
    pub classifier: Box<dyn Classifier>,
}

impl ModelSet {
    /// Assemble a model set, checking that all widths line up
    pub fn new(
        text_weighting: Box<dyn TextWeighting>,
        scaler: Box<dyn NumericScaler>,
        regressor: Box<dyn Regressor>,
        classifier: Box<dyn Classifier>,
    ) -> Result<Self> {
        let models = Self {
            text_weighting,
            scaler,
            regressor,
            classifier,
        };
        models.check_widths()?;
        Ok(models)
    }

    /// Width of the feature vector the models expect
    pub fn input_width(&self) -> usize {
        self.regressor.input_width()
    }

    /// Width the feature builder produces
    pub fn feature_width(&self) -> usize {
        self.text_weighting.width() + self.scaler.width()
    }

    fn check_widths(&self) -> Result<()> {
        if self.classifier.input_width() != self.regressor.input_width() {
            return Err(Error::DimensionMismatch {
                context: "classifier input".to_string(),
                expected: self.regressor.input_width(),
                actual: self.classifier.input_width(),
            });
        }
        if self.feature_width() != self.input_width() {
            return Err(Error::DimensionMismatch {
                context: "feature width vs model input".to_string(),
                expected: self.input_width(),
                actual: self.feature_width(),
            });
        }
        Ok(())
    }
}

/// Read and deserialize one JSON artifact
///
/// Every failure is reported as `ModelUnavailable` naming the artifact.
pub(crate) fn load_json_artifact<T: DeserializeOwned>(artifact: &str, path: &Path) -> Result<T> {
    let content = std::fs::read_to_string(path)
        .map_err(|e| Error::model_unavailable(artifact, format!("{}: {}", path.display(), e)))?;
    let value = serde_json::from_str(&content)
        .map_err(|e| Error::model_unavailable(artifact, format!("{}: {}", path.display(), e)))?;
    info!("Loaded {} artifact from {}", artifact, path.display());
    Ok(value)
}
