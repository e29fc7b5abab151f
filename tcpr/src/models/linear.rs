//! Linear duration regressor and logistic pass classifier

use super::{load_json_artifact, Classifier, Regressor};
use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Coefficients and intercept shared by both linear models
#[derive(Debug, Clone, Serialize, Deserialize)]
struct LinearWeights {
    coef: Vec<f64>,
    intercept: f64,
}

impl LinearWeights {
    fn check(&self, artifact: &str) -> Result<()> {
        if self.coef.is_empty() {
            return Err(Error::model_unavailable(artifact, "empty coefficient vector"));
        }
        if !self.intercept.is_finite() || self.coef.iter().any(|c| !c.is_finite()) {
            return Err(Error::model_unavailable(artifact, "non-finite coefficient"));
        }
        Ok(())
    }

    fn decision(&self, features: &[f64]) -> f64 {
        self.coef
            .iter()
            .zip(features)
            .map(|(w, x)| w * x)
            .sum::<f64>()
            + self.intercept
    }
}

/// Ordinary linear model: `coef · x + intercept`
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LinearRegressor {
    weights: LinearWeights,
}

impl LinearRegressor {
    const ARTIFACT: &'static str = "regressor";

    pub fn new(coef: Vec<f64>, intercept: f64) -> Result<Self> {
        let weights = LinearWeights { coef, intercept };
        weights.check(Self::ARTIFACT)?;
        Ok(Self { weights })
    }

    pub fn load(path: &Path) -> Result<Self> {
        let model: Self = load_json_artifact(Self::ARTIFACT, path)?;
        model.weights.check(Self::ARTIFACT)?;
        Ok(model)
    }
}

impl Regressor for LinearRegressor {
    fn input_width(&self) -> usize {
        self.weights.coef.len()
    }

    fn predict(&self, features: &[f64]) -> f64 {
        self.weights.decision(features)
    }
}

/// Binary logistic model: `sigmoid(coef · x + intercept)`
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LogisticClassifier {
    weights: LinearWeights,
}

impl LogisticClassifier {
    const ARTIFACT: &'static str = "classifier";

    pub fn new(coef: Vec<f64>, intercept: f64) -> Result<Self> {
        let weights = LinearWeights { coef, intercept };
        weights.check(Self::ARTIFACT)?;
        Ok(Self { weights })
    }

    pub fn load(path: &Path) -> Result<Self> {
        let model: Self = load_json_artifact(Self::ARTIFACT, path)?;
        model.weights.check(Self::ARTIFACT)?;
        Ok(model)
    }
}

impl Classifier for LogisticClassifier {
    fn input_width(&self) -> usize {
        self.weights.coef.len()
    }

    fn predict_proba(&self, features: &[f64]) -> f64 {
        sigmoid(self.weights.decision(features))
    }
}

fn sigmoid(z: f64) -> f64 {
    // Split on sign so exp() never overflows
    if z >= 0.0 {
        1.0 / (1.0 + (-z).exp())
    } else {
        let e = z.exp();
        e / (1.0 + e)
    }
}
