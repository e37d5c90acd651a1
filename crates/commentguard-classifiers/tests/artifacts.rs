//! Artifact persistence tests

use commentguard_classifiers::{
    load_model, load_vectorizer, save_model, save_vectorizer, ArtifactPaths, LinearModel,
    ModelArtifact, ModerationPipeline, PipelineConfig, ScorerKind, ToxicityModel,
    VectorizerParams, VectorizerState,
};
use commentguard_core::{Error, NormalizedText};
use std::fs;
use tempfile::TempDir;

fn fitted() -> VectorizerState {
    let corpus: Vec<NormalizedText> = ["stupid ugly", "great stream", "ugly stream"]
        .iter()
        .map(|t| NormalizedText::new(*t).unwrap())
        .collect();
    let params = VectorizerParams {
        ngram_max: 2,
        min_df: 1,
        max_df: 1.0,
        ..Default::default()
    };
    VectorizerState::fit(&corpus, params).unwrap()
}

fn write_artifacts(dir: &TempDir, weights: usize) -> ArtifactPaths {
    let paths = ArtifactPaths::in_dir(dir.path());
    save_vectorizer(&fitted(), &paths.vectorizer).unwrap();
    let artifact = ModelArtifact::new(ScorerKind::Margin, LinearModel::zeros(weights));
    save_model(&artifact, &paths.model).unwrap();
    paths
}

#[test]
fn test_saved_artifacts_reload_identically() {
    let dir = TempDir::new().unwrap();
    let state = fitted();
    let paths = write_artifacts(&dir, state.dimension());

    let reloaded = load_vectorizer(&paths.vectorizer).unwrap();
    assert_eq!(reloaded.vocabulary, state.vocabulary);
    assert_eq!(reloaded.params, state.params);
    for (a, b) in reloaded.idf.iter().zip(&state.idf) {
        assert!((a - b).abs() < 1e-12);
    }

    let text = NormalizedText::new("ugly stream").unwrap();
    let before = state.transform(&text).unwrap();
    let after = reloaded.transform(&text).unwrap();
    assert_eq!(before.len(), after.len());
    for ((i, a), (j, b)) in before.iter().zip(after.iter()) {
        assert_eq!(i, j);
        assert!((a - b).abs() < 1e-12);
    }

    let model = load_model(&paths.model).unwrap();
    assert_eq!(model.kind(), ScorerKind::Margin);
    assert_eq!(model.model().dimension(), state.dimension());
}

#[test]
fn test_missing_artifact() {
    let dir = TempDir::new().unwrap();
    let paths = ArtifactPaths::in_dir(dir.path());

    let err = ToxicityModel::load(&paths).unwrap_err();
    assert!(matches!(err, Error::ModelLoad(_)));
}

#[test]
fn test_corrupt_artifact() {
    let dir = TempDir::new().unwrap();
    let paths = write_artifacts(&dir, fitted().dimension());
    fs::write(&paths.model, b"{ not json").unwrap();

    let err = ToxicityModel::load(&paths).unwrap_err();
    assert!(matches!(err, Error::ModelLoad(_)));
}

#[test]
fn test_version_mismatch() {
    let dir = TempDir::new().unwrap();
    let paths = write_artifacts(&dir, fitted().dimension());

    let content = fs::read_to_string(&paths.vectorizer).unwrap();
    let mut value: serde_json::Value = serde_json::from_str(&content).unwrap();
    value["version"] = serde_json::json!(99);
    fs::write(&paths.vectorizer, value.to_string()).unwrap();

    let err = load_vectorizer(&paths.vectorizer).unwrap_err();
    assert!(matches!(err, Error::ModelLoad(_)));
    assert!(err.to_string().contains("version 99"));
}

#[test]
fn test_swapped_artifacts_rejected() {
    let dir = TempDir::new().unwrap();
    let paths = write_artifacts(&dir, fitted().dimension());

    let err = load_model(&paths.vectorizer).unwrap_err();
    assert!(matches!(err, Error::ModelLoad(_)));
}

#[test]
fn test_dimension_mismatch_rejected() {
    let dir = TempDir::new().unwrap();
    let paths = write_artifacts(&dir, fitted().dimension() + 5);

    let err = ToxicityModel::load(&paths).unwrap_err();
    assert!(matches!(err, Error::ModelLoad(_)));
    assert!(err.to_string().contains("weights"));
}

#[test]
fn test_pipeline_from_config() {
    let dir = TempDir::new().unwrap();
    let paths = write_artifacts(&dir, fitted().dimension());

    let yaml = format!(
        "artifacts:\n  vectorizer: {}\n  model: {}\nsentiment:\n  strategy: disabled\npolicy:\n  preset: coarse\n",
        paths.vectorizer.display(),
        paths.model.display()
    );
    let config = PipelineConfig::from_yaml(&yaml).unwrap();
    let pipeline = ModerationPipeline::from_config(&config).unwrap();

    // zero weights: margin 0, sigmoid 0.5
    let assessment = pipeline.evaluate("ugly stream").unwrap();
    assert!((assessment.ml_score - 0.5).abs() < 1e-12);
    assert_eq!(pipeline.policy().name(), "coarse");
    assert_eq!(pipeline.sentiment_name(), None);
}
