//! Feature construction
//!
//! A test case becomes `[keyword dims] ++ [scaled step-count dims]`. The
//! width is fixed by the loaded models and is checked on every build; a
//! mismatch means the artifacts on disk come from different training runs.

use crate::error::{Error, Result};
use crate::models::ModelSet;
use crate::parser::{strip_step_markers, TestCase};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Fixed-width numeric representation of a test case
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FeatureVector(Vec<f64>);

impl FeatureVector {
    pub fn new(values: Vec<f64>) -> Self {
        Self(values)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn as_slice(&self) -> &[f64] {
        &self.0
    }

    /// Euclidean norm
    pub fn norm(&self) -> f64 {
        self.0.iter().map(|v| v * v).sum::<f64>().sqrt()
    }

    /// Cosine similarity; 0 when either side has zero norm
    pub fn cosine_similarity(&self, other: &[f64]) -> f64 {
        let other_norm = other.iter().map(|v| v * v).sum::<f64>().sqrt();
        let norm = self.norm();
        if norm == 0.0 || other_norm == 0.0 {
            return 0.0;
        }
        let dot: f64 = self.0.iter().zip(other).map(|(a, b)| a * b).sum();
        dot / (norm * other_norm)
    }
}

impl From<Vec<f64>> for FeatureVector {
    fn from(values: Vec<f64>) -> Self {
        Self(values)
    }
}

/// Builds feature vectors with the loaded weighting model and scaler
#[derive(Clone, Copy)]
pub struct FeatureBuilder<'a> {
    models: &'a ModelSet,
}

impl<'a> FeatureBuilder<'a> {
    pub fn new(models: &'a ModelSet) -> Self {
        Self { models }
    }

    /// Width every built vector must have
    pub fn expected_width(&self) -> usize {
        self.models.input_width()
    }

    /// Build the feature vector of one test case
    pub fn build(&self, case: &TestCase) -> Result<FeatureVector> {
        let keywords = strip_step_markers(&case.step_segment);
        let mut values = self.models.text_weighting.transform(&keywords);
        values.extend(
            self.models
                .scaler
                .transform(f64::from(case.declared_step_count)),
        );

        let expected = self.expected_width();
        if values.len() != expected {
            return Err(Error::DimensionMismatch {
                context: format!("feature vector for {}", case.id),
                expected,
                actual: values.len(),
            });
        }

        debug!(case_id = %case.id, width = values.len(), "Built feature vector");
        Ok(FeatureVector(values))
    }
}
