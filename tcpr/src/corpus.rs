//! Historical test case corpus
//!
//! Loaded once at startup and read-only afterwards: feature rows for the
//! similarity lookup plus the stored steps, duration and result of every
//! historical case for display.

use crate::error::{Error, Result};
use crate::features::FeatureVector;
use crate::models::load_json_artifact;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::fmt;
use std::path::Path;
use tracing::{info, warn};

const ARTIFACT: &str = "corpus";

/// Recorded outcome of a historical run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Verdict {
    Pass,
    Fail,
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Verdict::Pass => write!(f, "PASS"),
            Verdict::Fail => write!(f, "FAIL"),
        }
    }
}

/// Stored metadata of a historical case
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CaseDetails {
    /// Step keywords as recorded
    #[serde(default)]
    pub steps: String,
    /// Measured duration in seconds
    #[serde(default)]
    pub duration: Option<f64>,
    #[serde(default)]
    pub result: Option<Verdict>,
}

/// On-disk layout of the corpus artifact
#[derive(Debug, Deserialize)]
struct CorpusFile {
    ids: Vec<String>,
    features: Vec<Vec<f64>>,
    #[serde(default)]
    details: HashMap<String, CaseDetails>,
}

/// Immutable table of historical cases
#[derive(Debug, Clone)]
pub struct Corpus {
    ids: Vec<String>,
    rows: Vec<FeatureVector>,
    details: HashMap<String, CaseDetails>,
}

impl Corpus {
    /// Build a corpus, checking that ids and rows line up and every row has
    /// `width` columns
    pub fn new(
        ids: Vec<String>,
        rows: Vec<FeatureVector>,
        details: HashMap<String, CaseDetails>,
        width: usize,
    ) -> Result<Self> {
        if ids.len() != rows.len() {
            return Err(Error::model_unavailable(
                ARTIFACT,
                format!("{} ids but {} feature rows", ids.len(), rows.len()),
            ));
        }
        if let Some((index, row)) = rows.iter().enumerate().find(|(_, r)| r.len() != width) {
            return Err(Error::DimensionMismatch {
                context: format!("corpus row {} ({})", index, ids[index]),
                expected: width,
                actual: row.len(),
            });
        }

        let mut seen = HashSet::new();
        for id in &ids {
            if !seen.insert(id.as_str()) {
                warn!("Corpus contains duplicate id {}", id);
            }
        }
        let missing = ids.iter().filter(|id| !details.contains_key(*id)).count();
        if missing > 0 {
            warn!("{} corpus entries have no stored details", missing);
        }

        Ok(Self { ids, rows, details })
    }

    /// Load the corpus artifact and check it against the model width
    pub fn load(path: &Path, width: usize) -> Result<Self> {
        let file: CorpusFile = load_json_artifact(ARTIFACT, path)?;
        let rows = file.features.into_iter().map(FeatureVector::new).collect();
        let corpus = Self::new(file.ids, rows, file.details, width)?;
        info!("Corpus holds {} historical cases", corpus.len());
        Ok(corpus)
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    /// Row width, `None` for an empty corpus
    pub fn width(&self) -> Option<usize> {
        self.rows.first().map(FeatureVector::len)
    }

    pub fn ids(&self) -> &[String] {
        &self.ids
    }

    /// Stored metadata of a case, if recorded
    pub fn details(&self, id: &str) -> Option<&CaseDetails> {
        self.details.get(id)
    }

    /// Cosine similarity of `query` against every row, in corpus order
    pub fn similarities(&self, query: &FeatureVector) -> Vec<f64> {
        self.rows
            .iter()
            .map(|row| query.cosine_similarity(row.as_slice()))
            .collect()
    }
}
