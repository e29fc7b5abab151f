//! # TCPR - Test Case Prediction & Priority Ranking
//!
//! Predicts execution duration and pass probability for structured test case
//! descriptions, finds similar historical cases and ranks batches by priority.
//!
//! ```text
//! line → parser → TestCase → features → FeatureVector ─┬→ predictor ─┐
//!                                                      └→ similarity ┴→ PredictionResult
//! batch of PredictionResult → ranking → RankingSession → export
//! ```
//!
//! Models and corpus are loaded once into a [`PredictionContext`] and shared
//! by reference; nothing mutates them after startup.

pub mod context;
pub mod corpus;
pub mod error;
pub mod export;
pub mod features;
pub mod models;
pub mod parser;
pub mod predictor;
pub mod ranking;
pub mod similarity;

pub use crate::context::{parse_batch, CaseReport, PredictionContext};
pub use crate::error::{Error, ParseError, Result, ZeroDurationError};
pub use crate::export::{ExportFormat, Exporter};
pub use crate::parser::{parse_line, validate, TestCase};
pub use crate::predictor::PredictionResult;
pub use crate::ranking::{RankingSession, SortMode};
