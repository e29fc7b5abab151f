//! Prediction context
//!
//! Owns the models and the corpus for the lifetime of the process. Built
//! once at startup; any artifact problem fails the build, so a context that
//! exists is always usable. Requests borrow it immutably.

use crate::corpus::{CaseDetails, Corpus};
use crate::error::{Error, Result};
use crate::features::FeatureBuilder;
use crate::models::{
    LinearRegressor, LogisticClassifier, ModelSet, StandardScaler, TfidfVectorizer,
};
use crate::parser::{parse_line, TestCase};
use crate::predictor::{PredictionResult, Predictor};
use crate::ranking::{RankingSession, SortMode};
use crate::similarity::{Neighbor, SimilarityIndex};
use rayon::prelude::*;
use tcpr_common::config::ArtifactPaths;
use tracing::{debug, info};

/// Single-case prediction with neighbor details for display
#[derive(Debug, Clone)]
pub struct CaseReport<'a> {
    pub result: PredictionResult,
    pub neighbors: Vec<Neighbor<'a>>,
}

pub struct PredictionContext {
    models: ModelSet,
    corpus: Corpus,
}

impl PredictionContext {
    /// Assemble a context from already-loaded parts
    pub fn new(models: ModelSet, corpus: Corpus) -> Result<Self> {
        let expected = models.input_width();
        if let Some(actual) = corpus.width() {
            if actual != expected {
                return Err(Error::DimensionMismatch {
                    context: "corpus rows vs model input".to_string(),
                    expected,
                    actual,
                });
            }
        }
        Ok(Self { models, corpus })
    }

    /// Load every artifact from disk
    ///
    /// Fails with `ModelUnavailable` or `DimensionMismatch`; callers treat
    /// either as fatal.
    pub fn load(paths: &ArtifactPaths) -> Result<Self> {
        let models = ModelSet::new(
            Box::new(TfidfVectorizer::load(&paths.text_weighting)?),
            Box::new(StandardScaler::load(&paths.scaler)?),
            Box::new(LinearRegressor::load(&paths.regressor)?),
            Box::new(LogisticClassifier::load(&paths.classifier)?),
        )?;
        let corpus = Corpus::load(&paths.corpus, models.input_width())?;
        info!(
            width = models.input_width(),
            corpus = corpus.len(),
            "Prediction context ready"
        );
        Self::new(models, corpus)
    }

    pub fn models(&self) -> &ModelSet {
        &self.models
    }

    pub fn corpus(&self) -> &Corpus {
        &self.corpus
    }

    /// Stored details of a historical case
    pub fn case_details(&self, id: &str) -> Option<&CaseDetails> {
        self.corpus.details(id)
    }

    /// Predict one parsed case
    pub fn predict_case(&self, case: &TestCase) -> Result<CaseReport<'_>> {
        let features = FeatureBuilder::new(&self.models).build(case)?;
        let prediction = Predictor::new(&self.models).predict(&features)?;
        let neighbors = SimilarityIndex::new(&self.corpus).nearest(&features, Some(&case.id));

        debug!(
            case_id = %case.id,
            duration = prediction.duration,
            pass_rate = prediction.pass_rate,
            "Case predicted"
        );

        Ok(CaseReport {
            result: PredictionResult {
                case_id: case.id.clone(),
                steps: case.steps.clone(),
                predicted_duration: prediction.duration,
                predicted_pass_rate: prediction.pass_rate,
                similar_case_ids: neighbors.iter().map(|n| n.id.to_string()).collect(),
                raw: case.raw.clone(),
            },
            neighbors,
        })
    }

    /// Parse and predict one line
    pub fn predict_line(&self, line: &str) -> Result<CaseReport<'_>> {
        let case = parse_line(line)?;
        self.predict_case(&case)
    }

    /// Predict every non-blank line of a batch, in submission order
    ///
    /// All lines are parsed before anything is predicted; the first invalid
    /// line aborts the batch and is echoed in the error.
    pub fn predict_batch(&self, input: &str) -> Result<Vec<PredictionResult>> {
        let cases = parse_batch(input)?;
        info!(cases = cases.len(), "Predicting batch");

        // Indexed parallel collect keeps submission order
        cases
            .par_iter()
            .map(|case| self.predict_case(case).map(|report| report.result))
            .collect()
    }

    /// Predict a batch and rank it
    pub fn rank_batch(&self, input: &str, mode: SortMode) -> Result<RankingSession> {
        let results = self.predict_batch(input)?;
        RankingSession::new(results, mode)
    }
}

/// Parse every non-blank line, stopping at the first invalid one
pub fn parse_batch(input: &str) -> Result<Vec<TestCase>> {
    input
        .lines()
        .enumerate()
        .filter(|(_, line)| !line.trim().is_empty())
        .map(|(index, line)| {
            parse_line(line).map_err(|source| Error::InvalidLine {
                line_number: index + 1,
                line: line.to_string(),
                source,
            })
        })
        .collect()
}
