//! Duration and pass-rate prediction
//!
//! Pure inference over the shared read-only models: a feature vector goes in,
//! a rounded (duration, pass rate) pair comes out.

use crate::error::{Error, Result, ZeroDurationError};
use crate::features::FeatureVector;
use crate::models::ModelSet;
use serde::{Deserialize, Serialize};

/// Model outputs for one feature vector
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Prediction {
    /// Seconds, ≥ 0, two decimals
    pub duration: f64,
    /// Percent in [0, 100], one decimal
    pub pass_rate: f64,
}

/// Complete per-case result, the unit the ranker works on
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictionResult {
    pub case_id: String,
    /// Step descriptions as entered
    pub steps: Vec<String>,
    pub predicted_duration: f64,
    pub predicted_pass_rate: f64,
    /// Most similar historical cases, best first, at most three
    pub similar_case_ids: Vec<String>,
    /// Verbatim input line
    pub raw: String,
}

impl PredictionResult {
    /// `(1 - pass_rate / 100) / duration`: likely failures that run fast
    /// come first
    ///
    /// Derived rather than stored, so it always agrees with the predicted
    /// values. A zero predicted duration leaves the priority undefined.
    pub fn priority_score(&self) -> std::result::Result<f64, ZeroDurationError> {
        if self.predicted_duration == 0.0 {
            return Err(ZeroDurationError {
                case_id: self.case_id.clone(),
            });
        }
        Ok((1.0 - self.predicted_pass_rate / 100.0) / self.predicted_duration)
    }
}

#[derive(Clone, Copy)]
pub struct Predictor<'a> {
    models: &'a ModelSet,
}

impl<'a> Predictor<'a> {
    pub fn new(models: &'a ModelSet) -> Self {
        Self { models }
    }

    pub fn predict(&self, features: &FeatureVector) -> Result<Prediction> {
        let expected = self.models.input_width();
        if features.len() != expected {
            return Err(Error::DimensionMismatch {
                context: "predictor input".to_string(),
                expected,
                actual: features.len(),
            });
        }

        let duration = finite("regressor", self.models.regressor.predict(features.as_slice()))?;
        let probability = finite(
            "classifier",
            self.models.classifier.predict_proba(features.as_slice()),
        )?;

        Ok(Prediction {
            duration: round_to(duration.max(0.0), 2),
            pass_rate: round_to((probability * 100.0).clamp(0.0, 100.0), 1),
        })
    }
}

fn finite(model: &'static str, value: f64) -> Result<f64> {
    if value.is_finite() {
        Ok(value)
    } else {
        Err(Error::PredictionFailed { model, value })
    }
}

/// Round half away from zero to `decimals` places
pub fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round() / factor
}
