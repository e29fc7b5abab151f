//! Standard (z-score) scaling of numeric features

use super::{load_json_artifact, NumericScaler};
use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

const ARTIFACT: &str = "numeric scaler";

/// Pre-fit standard scaler: `(x - mean) / scale` per output dimension
///
/// A zero scale is treated as 1, so constant training features pass through
/// centered but unscaled.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StandardScaler {
    mean: Vec<f64>,
    scale: Vec<f64>,
}

impl StandardScaler {
    pub fn new(mean: Vec<f64>, scale: Vec<f64>) -> Result<Self> {
        let scaler = Self { mean, scale };
        scaler.check()?;
        Ok(scaler)
    }

    pub fn load(path: &Path) -> Result<Self> {
        let scaler: Self = load_json_artifact(ARTIFACT, path)?;
        scaler.check()?;
        Ok(scaler)
    }

    fn check(&self) -> Result<()> {
        if self.mean.is_empty() || self.mean.len() != self.scale.len() {
            return Err(Error::model_unavailable(
                ARTIFACT,
                format!(
                    "expected matching non-empty mean/scale, got {}/{}",
                    self.mean.len(),
                    self.scale.len()
                ),
            ));
        }
        if let Some(mean) = self.mean.iter().find(|m| !m.is_finite()) {
            return Err(Error::model_unavailable(
                ARTIFACT,
                format!("non-finite mean {}", mean),
            ));
        }
        // Zero means "constant feature"; anything else must divide safely
        let unusable = |s: &&f64| **s != 0.0 && !(s.is_normal() && **s > 0.0);
        if let Some(scale) = self.scale.iter().find(unusable) {
            return Err(Error::model_unavailable(
                ARTIFACT,
                format!("scale {:e} is not a positive normal number", scale),
            ));
        }
        Ok(())
    }
}

impl NumericScaler for StandardScaler {
    fn width(&self) -> usize {
        self.mean.len()
    }

    fn transform(&self, value: f64) -> Vec<f64> {
        self.mean
            .iter()
            .zip(&self.scale)
            .map(|(mean, scale)| {
                let scale = if *scale == 0.0 { 1.0 } else { *scale };
                (value - mean) / scale
            })
            .collect()
    }
}
