//! Batch priority ranking
//!
//! Priorities ([`PredictionResult::priority_score`]) are computed once when
//! the session is built; switching the sort mode only reorders the
//! already-computed batch.
//!
//! Every ordering is derived from the original submission order with a
//! stable sort, so equal keys keep their submission order and sorting twice
//! by the same mode gives the same result.

use crate::error::{Error, Result, ZeroDurationError};
use crate::predictor::PredictionResult;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;
use tracing::{debug, warn};

/// Smallest batch that can be ranked
pub const MIN_BATCH_SIZE: usize = 2;

/// Sort criterion of a ranking session
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SortMode {
    /// Highest priority first
    #[default]
    Priority,
    /// Shortest duration first
    Duration,
    /// Lowest pass rate first
    PassRate,
    /// Case id, lexicographic
    Tcid,
}

impl SortMode {
    pub const ALL: [SortMode; 4] = [
        SortMode::Priority,
        SortMode::Duration,
        SortMode::PassRate,
        SortMode::Tcid,
    ];

    /// Human-readable label
    pub fn label(&self) -> &'static str {
        match self {
            SortMode::Priority => "Priority",
            SortMode::Duration => "Duration",
            SortMode::PassRate => "Pass Rate",
            SortMode::Tcid => "TCID",
        }
    }
}

impl fmt::Display for SortMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Unknown sort mode name
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown sort mode {0:?} (expected priority, duration, pass-rate or tcid)")]
pub struct UnknownSortMode(pub String);

impl FromStr for SortMode {
    type Err = UnknownSortMode;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let normalized: String = s
            .trim()
            .chars()
            .filter(|c| !matches!(c, '-' | '_' | ' '))
            .flat_map(char::to_lowercase)
            .collect();
        match normalized.as_str() {
            "priority" => Ok(SortMode::Priority),
            "duration" => Ok(SortMode::Duration),
            "passrate" => Ok(SortMode::PassRate),
            "tcid" | "id" => Ok(SortMode::Tcid),
            _ => Err(UnknownSortMode(s.to_string())),
        }
    }
}

/// A prediction together with its priority, computed once per session
#[derive(Debug, Clone, PartialEq)]
pub struct RankedCase {
    pub result: PredictionResult,
    pub priority: std::result::Result<f64, ZeroDurationError>,
}

impl RankedCase {
    fn new(result: PredictionResult) -> Self {
        let priority = result.priority_score();
        if let Err(e) = &priority {
            warn!("{}", e);
        }
        Self { result, priority }
    }

    /// Priority if defined
    pub fn priority_value(&self) -> Option<f64> {
        self.priority.as_ref().ok().copied()
    }
}

/// A ranked batch and its active sort mode
///
/// Owned by the caller; replaces any process-wide "current batch" state.
#[derive(Debug, Clone)]
pub struct RankingSession {
    /// Cases in submission order
    cases: Vec<RankedCase>,
    /// Indices into `cases` in display order
    order: Vec<usize>,
    mode: SortMode,
}

impl RankingSession {
    /// Rank a batch of at least [`MIN_BATCH_SIZE`] predictions
    pub fn new(results: Vec<PredictionResult>, mode: SortMode) -> Result<Self> {
        if results.len() < MIN_BATCH_SIZE {
            return Err(Error::DegenerateBatch {
                size: results.len(),
            });
        }

        let cases: Vec<RankedCase> = results.into_iter().map(RankedCase::new).collect();
        let mut session = Self {
            order: (0..cases.len()).collect(),
            cases,
            mode,
        };
        session.reorder();
        Ok(session)
    }

    pub fn mode(&self) -> SortMode {
        self.mode
    }

    pub fn len(&self) -> usize {
        self.cases.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cases.is_empty()
    }

    /// Switch sort mode; nothing is re-predicted
    pub fn set_mode(&mut self, mode: SortMode) {
        self.mode = mode;
        self.reorder();
    }

    /// Cases in the active order
    pub fn ranked(&self) -> impl ExactSizeIterator<Item = &RankedCase> + '_ {
        self.order.iter().map(move |&i| &self.cases[i])
    }

    /// Cases in submission order
    pub fn submitted(&self) -> &[RankedCase] {
        &self.cases
    }

    /// Case ids in the active order
    pub fn ranked_ids(&self) -> Vec<&str> {
        self.ranked().map(|c| c.result.case_id.as_str()).collect()
    }

    fn reorder(&mut self) {
        let cases = &self.cases;
        let mut order: Vec<usize> = (0..cases.len()).collect();
        // Vec::sort_by is stable
        order.sort_by(|&a, &b| compare(self.mode, &cases[a], &cases[b]));
        self.order = order;
        debug!(mode = %self.mode, cases = self.order.len(), "Batch reordered");
    }
}

fn compare(mode: SortMode, a: &RankedCase, b: &RankedCase) -> Ordering {
    match mode {
        // Descending; undefined priorities sink to the end
        SortMode::Priority => match (a.priority_value(), b.priority_value()) {
            (Some(x), Some(y)) => y.total_cmp(&x),
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => Ordering::Equal,
        },
        SortMode::Duration => a
            .result
            .predicted_duration
            .total_cmp(&b.result.predicted_duration),
        SortMode::PassRate => a
            .result
            .predicted_pass_rate
            .total_cmp(&b.result.predicted_pass_rate),
        SortMode::Tcid => a.result.case_id.cmp(&b.result.case_id),
    }
}
