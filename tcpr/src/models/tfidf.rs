//! TF-IDF term weighting over a fixed vocabulary
//!
//! Tokens are runs of two or more word characters. Term counts are multiplied
//! by the stored inverse document frequencies and the row is normalized.
//! The vocabulary is closed: unknown terms contribute nothing.

use super::{load_json_artifact, TextWeighting};
use crate::error::{Error, Result};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;

static TOKEN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\b\w\w+\b").expect("token pattern is valid"));

const ARTIFACT: &str = "text weighting";

/// Row normalization applied after weighting
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Norm {
    #[default]
    L2,
    L1,
    None,
}

/// Pre-fit TF-IDF vectorizer
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TfidfVectorizer {
    /// Term → output column
    vocabulary: HashMap<String, usize>,
    /// Inverse document frequency per column
    idf: Vec<f64>,
    #[serde(default = "default_lowercase")]
    lowercase: bool,
    /// Inclusive word n-gram range
    #[serde(default = "default_ngram_range")]
    ngram_range: (usize, usize),
    #[serde(default)]
    norm: Norm,
    /// Use `1 + ln(tf)` instead of raw counts
    #[serde(default)]
    sublinear_tf: bool,
}

fn default_lowercase() -> bool {
    true
}

fn default_ngram_range() -> (usize, usize) {
    (1, 1)
}

impl TfidfVectorizer {
    /// Unigram, lowercasing, L2-normalized vectorizer
    pub fn new(vocabulary: HashMap<String, usize>, idf: Vec<f64>) -> Result<Self> {
        let vectorizer = Self {
            vocabulary,
            idf,
            lowercase: true,
            ngram_range: default_ngram_range(),
            norm: Norm::L2,
            sublinear_tf: false,
        };
        vectorizer.check()?;
        Ok(vectorizer)
    }

    pub fn with_norm(mut self, norm: Norm) -> Self {
        self.norm = norm;
        self
    }

    pub fn with_sublinear_tf(mut self, sublinear_tf: bool) -> Self {
        self.sublinear_tf = sublinear_tf;
        self
    }

    pub fn with_ngram_range(mut self, min: usize, max: usize) -> Result<Self> {
        self.ngram_range = (min, max);
        self.check()?;
        Ok(self)
    }

    /// Load from a JSON artifact
    pub fn load(path: &Path) -> Result<Self> {
        let vectorizer: Self = load_json_artifact(ARTIFACT, path)?;
        vectorizer.check()?;
        Ok(vectorizer)
    }

    fn check(&self) -> Result<()> {
        if self.idf.len() != self.vocabulary.len() {
            return Err(Error::model_unavailable(
                ARTIFACT,
                format!(
                    "{} idf weights for {} vocabulary terms",
                    self.idf.len(),
                    self.vocabulary.len()
                ),
            ));
        }
        let mut seen = vec![false; self.idf.len()];
        for (term, &column) in &self.vocabulary {
            match seen.get_mut(column) {
                Some(slot) if !*slot => *slot = true,
                Some(_) => {
                    return Err(Error::model_unavailable(
                        ARTIFACT,
                        format!("column {} assigned twice (term {:?})", column, term),
                    ))
                }
                None => {
                    return Err(Error::model_unavailable(
                        ARTIFACT,
                        format!("term {:?} maps to out-of-range column {}", term, column),
                    ))
                }
            }
        }
        let (min, max) = self.ngram_range;
        if min == 0 || min > max {
            return Err(Error::model_unavailable(
                ARTIFACT,
                format!("invalid ngram range ({}, {})", min, max),
            ));
        }
        Ok(())
    }

    fn tokens(&self, text: &str) -> Vec<String> {
        let text = if self.lowercase {
            text.to_lowercase()
        } else {
            text.to_string()
        };
        TOKEN
            .find_iter(&text)
            .map(|m| m.as_str().to_string())
            .collect()
    }

    fn term_counts(&self, tokens: &[String]) -> HashMap<usize, f64> {
        let mut counts: HashMap<usize, f64> = HashMap::new();
        let (min, max) = self.ngram_range;
        for n in min..=max {
            for window in tokens.windows(n) {
                let term = window.join(" ");
                if let Some(&column) = self.vocabulary.get(&term) {
                    *counts.entry(column).or_insert(0.0) += 1.0;
                }
            }
        }
        counts
    }
}

impl TextWeighting for TfidfVectorizer {
    fn width(&self) -> usize {
        self.idf.len()
    }

    fn transform(&self, text: &str) -> Vec<f64> {
        let tokens = self.tokens(text);
        let mut row = vec![0.0; self.width()];

        for (column, count) in self.term_counts(&tokens) {
            let tf = if self.sublinear_tf {
                1.0 + count.ln()
            } else {
                count
            };
            row[column] = tf * self.idf[column];
        }

        let norm = match self.norm {
            Norm::L2 => row.iter().map(|v| v * v).sum::<f64>().sqrt(),
            Norm::L1 => row.iter().map(|v| v.abs()).sum::<f64>(),
            Norm::None => 1.0,
        };
        if norm > 0.0 {
            row.iter_mut().for_each(|v| *v /= norm);
        }
        row
    }
}
