//! End-to-end pipeline against stub models
//!
//! The stubs implement the public model traits, so no trained artifact is
//! involved.

use std::collections::HashMap;

use tcpr::corpus::{CaseDetails, Corpus, Verdict};
use tcpr::export::PAGE_BREAK;
use tcpr::features::FeatureVector;
use tcpr::models::{Classifier, ModelSet, NumericScaler, Regressor, TextWeighting};
use tcpr::similarity::SimilarityIndex;
use tcpr::{
    parse_line, validate, Error, ExportFormat, Exporter, ParseError, PredictionContext, SortMode,
};

/// One column per known keyword, counting occurrences
struct KeywordCounter(&'static [&'static str]);

impl TextWeighting for KeywordCounter {
    fn width(&self) -> usize {
        self.0.len()
    }

    fn transform(&self, text: &str) -> Vec<f64> {
        self.0
            .iter()
            .map(|kw| {
                text.split(|c: char| !c.is_alphanumeric())
                    .filter(|w| w == kw)
                    .count() as f64
            })
            .collect()
    }
}

struct PassThrough;

impl NumericScaler for PassThrough {
    fn width(&self) -> usize {
        1
    }

    fn transform(&self, value: f64) -> Vec<f64> {
        vec![value]
    }
}

/// Five seconds per declared step
struct PerStep(usize);

impl Regressor for PerStep {
    fn input_width(&self) -> usize {
        self.0
    }

    fn predict(&self, features: &[f64]) -> f64 {
        features[self.0 - 1] * 5.0
    }
}

/// Each "logout" keyword lowers the pass probability by 0.3
struct LogoutRisk(usize);

impl Classifier for LogoutRisk {
    fn input_width(&self) -> usize {
        self.0
    }

    fn predict_proba(&self, features: &[f64]) -> f64 {
        0.95 - 0.3 * features[1]
    }
}

const VOCABULARY: &[&str] = &["login", "logout", "search"];

fn models() -> ModelSet {
    let width = VOCABULARY.len() + 1;
    ModelSet::new(
        Box::new(KeywordCounter(VOCABULARY)),
        Box::new(PassThrough),
        Box::new(PerStep(width)),
        Box::new(LogoutRisk(width)),
    )
    .unwrap()
}

fn corpus(entries: &[(&str, [f64; 4])]) -> Corpus {
    let ids = entries.iter().map(|(id, _)| id.to_string()).collect();
    let rows = entries
        .iter()
        .map(|(_, row)| FeatureVector::new(row.to_vec()))
        .collect();
    let mut details = HashMap::new();
    details.insert(
        "H1".to_string(),
        CaseDetails {
            steps: "login search".to_string(),
            duration: Some(9.0),
            result: Some(Verdict::Pass),
        },
    );
    Corpus::new(ids, rows, details, 4).unwrap()
}

fn context() -> PredictionContext {
    let history = corpus(&[
        ("H1", [1.0, 0.0, 1.0, 2.0]),
        ("H2", [1.0, 1.0, 0.0, 2.0]),
        ("H3", [0.0, 0.0, 1.0, 1.0]),
        ("H4", [0.0, 1.0, 0.0, 1.0]),
    ]);
    PredictionContext::new(models(), history).unwrap()
}

#[test]
fn test_valid_two_step_case() {
    let case = parse_line("TC1,2,1-login; 2-logout").unwrap();
    assert_eq!(case.id, "TC1");
    assert_eq!(case.steps, vec!["1-login", "2-logout"]);
    assert!(validate("TC1,2,1-login; 2-logout"));
}

#[test]
fn test_step_count_mismatch() {
    assert_eq!(
        parse_line("TC2,3,1-a; 2-b"),
        Err(ParseError::StepCountMismatch {
            declared: 3,
            found: 2
        })
    );
    assert!(!validate("TC2,3,1-a; 2-b"));
}

#[test]
fn test_single_prediction() {
    let ctx = context();
    let report = ctx.predict_line("TC1,2,1-login; 2-logout").unwrap();
    assert_eq!(report.result.predicted_duration, 10.0);
    assert_eq!(report.result.predicted_pass_rate, 65.0);
    assert_eq!(report.result.similar_case_ids.len(), 3);
    assert_eq!(report.result.similar_case_ids[0], "H2");
}

#[test]
fn test_prediction_failure_messages() {
    let ctx = context();
    let empty = ctx.predict_line("").unwrap_err();
    assert_eq!(empty.user_message(), "Please enter a test case first.");

    let invalid = ctx.predict_line("TC9,x,1-login").unwrap_err();
    assert!(invalid.user_message().starts_with("Invalid format!"));
}

#[test]
fn test_similarity_drops_top_match_for_anonymous_query() {
    let history = corpus(&[
        ("A", [1.0, 0.0, 0.0, 1.0]),
        ("B", [0.9, 0.1, 0.0, 1.0]),
        ("C", [0.0, 1.0, 0.0, 1.0]),
        ("D", [0.0, 0.0, 1.0, 1.0]),
    ]);
    let index = SimilarityIndex::new(&history);
    let query = FeatureVector::new(vec![1.0, 0.0, 0.0, 1.0]);

    let ids: Vec<&str> = index.nearest(&query, None).iter().map(|n| n.id).collect();
    assert_eq!(ids.len(), 3);
    assert!(!ids.contains(&"A"));

    let single = corpus(&[("A", [1.0, 0.0, 0.0, 1.0])]);
    assert!(SimilarityIndex::new(&single).nearest(&query, None).is_empty());
}

#[test]
fn test_neighbor_details_available() {
    let ctx = context();
    let report = ctx.predict_line("NEW,1,1-search").unwrap();
    let h1 = report
        .neighbors
        .iter()
        .find(|n| n.id == "H1")
        .expect("H1 is among the neighbors");
    assert_eq!(h1.details.unwrap().result, Some(Verdict::Pass));
    assert_eq!(ctx.case_details("H1").unwrap().duration, Some(9.0));
    assert!(ctx.case_details("H2").is_none());
}

#[test]
fn test_rank_and_export_batch() {
    let ctx = context();
    let batch = "\
TC2,1,1-logout
TC1,2,1-login; 2-search

TC3,3,1-login; 2-logout; 3-logout
";
    let mut session = ctx.rank_batch(batch, SortMode::Priority).unwrap();
    assert_eq!(session.len(), 3);

    // TC2: 5s / 65% → 0.07; TC1: 10s / 95% → 0.005; TC3: 15s / 35% → 0.0433
    assert_eq!(session.ranked_ids(), vec!["TC2", "TC3", "TC1"]);

    session.set_mode(SortMode::Tcid);
    assert_eq!(session.ranked_ids(), vec!["TC1", "TC2", "TC3"]);

    let csv = Exporter::new(ExportFormat::Csv).render(&session).unwrap();
    let lines: Vec<&str> = csv.lines().collect();
    assert_eq!(lines[0], "SORTED BY: TCID");
    assert_eq!(lines[1], "TCID,Duration,Pass Rate,Steps");
    assert_eq!(lines[2], "TC1,10.00,95.0,1-login | 2-search");

    let paged = Exporter::new(ExportFormat::Paginated)
        .with_cases_per_page(1)
        .render(&session)
        .unwrap();
    assert_eq!(paged.split(PAGE_BREAK).count(), 3);
}

#[test]
fn test_batch_errors_name_the_line() {
    let ctx = context();
    let err = ctx
        .rank_batch("TC1,1,1-login\nTC2,two,1-logout\n", SortMode::Priority)
        .unwrap_err();
    assert_eq!(
        err.user_message(),
        "Invalid format: TC2,two,1-logout (step count is not a non-negative integer: \"two\")"
    );

    let single = ctx.rank_batch("TC1,1,1-login", SortMode::Priority).unwrap_err();
    assert!(matches!(single, Error::DegenerateBatch { size: 1 }));
    assert_eq!(single.user_message(), "Please enter at least 2 valid test cases.");
}

/// Classifier that has diverged
struct Diverged(usize);

impl Classifier for Diverged {
    fn input_width(&self) -> usize {
        self.0
    }

    fn predict_proba(&self, _features: &[f64]) -> f64 {
        f64::NAN
    }
}

#[test]
fn test_non_finite_model_output_is_reported() {
    let width = VOCABULARY.len() + 1;
    let models = ModelSet::new(
        Box::new(KeywordCounter(VOCABULARY)),
        Box::new(PassThrough),
        Box::new(PerStep(width)),
        Box::new(Diverged(width)),
    )
    .unwrap();
    let history = corpus(&[("H1", [1.0, 0.0, 1.0, 2.0])]);
    let ctx = PredictionContext::new(models, history).unwrap();

    let err = ctx.predict_line("TC1,2,1-login; 2-login").unwrap_err();
    assert!(matches!(err, Error::PredictionFailed { model: "classifier", .. }));
    assert!(err.user_message().starts_with("Prediction failed"));

    let batch = ctx.rank_batch("TC1,1,1-login\nTC2,1,1-logout", SortMode::Priority);
    assert!(matches!(batch, Err(Error::PredictionFailed { .. })));
}
