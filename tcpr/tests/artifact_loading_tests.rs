//! Loading the prediction context from JSON artifacts on disk
//!
//! Every test writes a complete artifact directory into a TempDir and then
//! breaks one file.

use std::fs;
use std::path::Path;

use tcpr::{Error, PredictionContext};
use tcpr_common::config::{ArtifactPaths, TomlConfig};
use tempfile::TempDir;

const TFIDF: &str = r#"{
    "vocabulary": {"login": 0, "logout": 1, "search": 2},
    "idf": [1.0, 1.0, 1.0]
}"#;

const SCALER: &str = r#"{"mean": [2.0], "scale": [1.0]}"#;

const REGRESSOR: &str = r#"{"coef": [1.0, 1.0, 1.0, 2.0], "intercept": 5.0}"#;

const CLASSIFIER: &str = r#"{"coef": [0.0, 0.0, 0.0, 0.0], "intercept": 0.0}"#;

const CORPUS: &str = r#"{
    "ids": ["C1", "C2", "C3", "C4"],
    "features": [
        [1.0, 0.0, 0.0, 0.0],
        [0.0, 1.0, 0.0, 0.0],
        [0.0, 0.0, 1.0, 0.0],
        [0.7, 0.7, 0.0, 0.1]
    ],
    "details": {
        "C1": {"steps": "login", "duration": 3.5, "result": "PASS"},
        "C4": {"steps": "login logout", "duration": 7.25, "result": "FAIL"}
    }
}"#;

fn write_artifacts(dir: &Path) -> ArtifactPaths {
    let paths = TomlConfig::default().artifact_paths(dir);
    fs::write(&paths.text_weighting, TFIDF).unwrap();
    fs::write(&paths.scaler, SCALER).unwrap();
    fs::write(&paths.regressor, REGRESSOR).unwrap();
    fs::write(&paths.classifier, CLASSIFIER).unwrap();
    fs::write(&paths.corpus, CORPUS).unwrap();
    paths
}

#[test]
fn test_load_and_predict() {
    let dir = TempDir::new().unwrap();
    let paths = write_artifacts(dir.path());

    let context = PredictionContext::load(&paths).unwrap();
    assert_eq!(context.models().input_width(), 4);
    assert_eq!(context.corpus().len(), 4);

    // tf-idf [0.707, 0.707, 0] + scaled step count 0 → 5 + √2
    let report = context.predict_line("NEW1,2,1-login; 2-logout").unwrap();
    assert_eq!(report.result.predicted_duration, 6.41);
    assert_eq!(report.result.predicted_pass_rate, 50.0);
    assert_eq!(report.result.similar_case_ids, vec!["C4", "C1", "C2"]);

    let best = &report.neighbors[0];
    let details = best.details.unwrap();
    assert_eq!(details.duration, Some(7.25));
    assert_eq!(details.result.unwrap().to_string(), "FAIL");
    assert!(report.neighbors[2].details.is_none());
}

#[test]
fn test_known_id_excluded_from_neighbors() {
    let dir = TempDir::new().unwrap();
    let paths = write_artifacts(dir.path());
    let context = PredictionContext::load(&paths).unwrap();

    let report = context.predict_line("C4,2,1-login; 2-logout").unwrap();
    assert_eq!(report.result.similar_case_ids, vec!["C1", "C2", "C3"]);
}

#[test]
fn test_missing_artifact_is_model_unavailable() {
    let dir = TempDir::new().unwrap();
    let paths = write_artifacts(dir.path());
    fs::remove_file(&paths.classifier).unwrap();

    match PredictionContext::load(&paths) {
        Err(Error::ModelUnavailable { artifact, .. }) => assert_eq!(artifact, "classifier"),
        Err(other) => panic!("expected ModelUnavailable, got {}", other),
        Ok(_) => panic!("expected ModelUnavailable, got a context"),
    }
}

#[test]
fn test_malformed_artifact_is_model_unavailable() {
    let dir = TempDir::new().unwrap();
    let paths = write_artifacts(dir.path());
    fs::write(&paths.text_weighting, "{ not json").unwrap();

    assert!(matches!(
        PredictionContext::load(&paths),
        Err(Error::ModelUnavailable { .. })
    ));
}

#[test]
fn test_inconsistent_idf_is_model_unavailable() {
    let dir = TempDir::new().unwrap();
    let paths = write_artifacts(dir.path());
    fs::write(
        &paths.text_weighting,
        r#"{"vocabulary": {"login": 0, "logout": 1}, "idf": [1.0]}"#,
    )
    .unwrap();

    assert!(matches!(
        PredictionContext::load(&paths),
        Err(Error::ModelUnavailable { .. })
    ));
}

#[test]
fn test_subnormal_scale_is_model_unavailable() {
    let dir = TempDir::new().unwrap();
    let paths = write_artifacts(dir.path());
    fs::write(&paths.scaler, r#"{"mean": [0.0], "scale": [1e-320]}"#).unwrap();

    match PredictionContext::load(&paths) {
        Err(Error::ModelUnavailable { artifact, .. }) => assert_eq!(artifact, "numeric scaler"),
        Err(other) => panic!("expected ModelUnavailable, got {}", other),
        Ok(_) => panic!("expected ModelUnavailable, got a context"),
    }
}

#[test]
fn test_model_width_skew_is_dimension_mismatch() {
    let dir = TempDir::new().unwrap();
    let paths = write_artifacts(dir.path());
    fs::write(&paths.classifier, r#"{"coef": [0.0, 0.0, 0.0], "intercept": 0.0}"#).unwrap();

    assert!(matches!(
        PredictionContext::load(&paths),
        Err(Error::DimensionMismatch {
            expected: 4,
            actual: 3,
            ..
        })
    ));
}

#[test]
fn test_corpus_width_skew_is_dimension_mismatch() {
    let dir = TempDir::new().unwrap();
    let paths = write_artifacts(dir.path());
    fs::write(
        &paths.corpus,
        r#"{"ids": ["C1"], "features": [[1.0, 0.0, 0.0]]}"#,
    )
    .unwrap();

    assert!(matches!(
        PredictionContext::load(&paths),
        Err(Error::DimensionMismatch {
            expected: 4,
            actual: 3,
            ..
        })
    ));
}

#[test]
fn test_custom_artifact_file_names() {
    let dir = TempDir::new().unwrap();
    let config = TomlConfig::from_toml_str(
        r#"
        [artifacts]
        corpus = "history-v2.json"
        "#,
    )
    .unwrap();

    let defaults = write_artifacts(dir.path());
    fs::rename(&defaults.corpus, dir.path().join("history-v2.json")).unwrap();

    let paths = config.artifact_paths(dir.path());
    let context = PredictionContext::load(&paths).unwrap();
    assert_eq!(context.corpus().len(), 4);
}
