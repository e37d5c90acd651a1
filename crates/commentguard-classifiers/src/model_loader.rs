//! Loading and saving trained artifacts
//!
//! Both artifacts are JSON files wrapped in a small envelope that records
//! what the payload is and which format version wrote it. Loading checks the
//! envelope, validates the payload, and makes sure the model's weight count
//! matches the vectorizer's vocabulary before anything is served.

use crate::scorer::{ModelArtifact, Scorer};
use crate::vectorizer::VectorizerState;
use commentguard_core::{Error, Result};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;

/// Current artifact format version
pub const ARTIFACT_VERSION: u32 = 1;

const VECTORIZER_FORMAT: &str = "commentguard.vectorizer";
const MODEL_FORMAT: &str = "commentguard.model";

#[derive(Debug, Serialize, Deserialize)]
struct Envelope<T> {
    format: String,
    version: u32,
    payload: T,
}

/// Locations of the two artifact files
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArtifactPaths {
    #[serde(default = "default_vectorizer_path")]
    pub vectorizer: PathBuf,

    #[serde(default = "default_model_path")]
    pub model: PathBuf,
}

impl Default for ArtifactPaths {
    fn default() -> Self {
        Self {
            vectorizer: default_vectorizer_path(),
            model: default_model_path(),
        }
    }
}

impl ArtifactPaths {
    /// Standard file names inside one directory
    pub fn in_dir(dir: impl AsRef<Path>) -> Self {
        let dir = dir.as_ref();
        Self {
            vectorizer: dir.join("vectorizer.json"),
            model: dir.join("model.json"),
        }
    }
}

/// A consistent vectorizer and scorer pair
#[derive(Debug)]
pub struct LoadedArtifacts {
    pub vectorizer: VectorizerState,
    pub scorer: Box<dyn Scorer>,
}

impl LoadedArtifacts {
    /// Load and cross-check both artifacts
    pub fn load(paths: &ArtifactPaths) -> Result<Self> {
        let vectorizer = load_vectorizer(&paths.vectorizer)?;
        let model = load_model(&paths.model)?;

        let vocabulary = vectorizer.dimension();
        let weights = model.model().dimension();
        if vocabulary != weights {
            return Err(Error::model_load(format!(
                "model has {weights} weights but vectorizer vocabulary has {vocabulary} terms"
            )));
        }

        info!(
            vectorizer = %paths.vectorizer.display(),
            model = %paths.model.display(),
            scorer = %model.kind(),
            dimension = vocabulary,
            "Loaded moderation artifacts"
        );

        Ok(Self {
            vectorizer,
            scorer: model.into_scorer(),
        })
    }
}

pub fn save_vectorizer(state: &VectorizerState, path: impl AsRef<Path>) -> Result<()> {
    write_envelope(VECTORIZER_FORMAT, state, path.as_ref())
}

pub fn load_vectorizer(path: impl AsRef<Path>) -> Result<VectorizerState> {
    let state: VectorizerState = read_envelope(VECTORIZER_FORMAT, path.as_ref())?;
    state.validate()?;
    Ok(state)
}

pub fn save_model(artifact: &ModelArtifact, path: impl AsRef<Path>) -> Result<()> {
    write_envelope(MODEL_FORMAT, artifact, path.as_ref())
}

pub fn load_model(path: impl AsRef<Path>) -> Result<ModelArtifact> {
    let artifact: ModelArtifact = read_envelope(MODEL_FORMAT, path.as_ref())?;
    artifact.model().validate()?;
    Ok(artifact)
}

fn write_envelope<T: Serialize>(format: &str, payload: &T, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }

    let envelope = Envelope {
        format: format.to_string(),
        version: ARTIFACT_VERSION,
        payload,
    };
    let json = serde_json::to_vec(&envelope)?;
    fs::write(path, json)?;

    info!(path = %path.display(), format, "Saved artifact");
    Ok(())
}

fn read_envelope<T: DeserializeOwned>(format: &str, path: &Path) -> Result<T> {
    let bytes = fs::read(path).map_err(|e| {
        Error::model_load(format!("failed to read {}: {e}", path.display()))
    })?;

    let envelope: Envelope<serde_json::Value> = serde_json::from_slice(&bytes).map_err(|e| {
        Error::model_load(format!("{} is not a valid artifact: {e}", path.display()))
    })?;

    if envelope.format != format {
        return Err(Error::model_load(format!(
            "{} holds '{}', expected '{format}'",
            path.display(),
            envelope.format
        )));
    }

    if envelope.version != ARTIFACT_VERSION {
        return Err(Error::model_load(format!(
            "{} has format version {}, expected {ARTIFACT_VERSION}",
            path.display(),
            envelope.version
        )));
    }

    serde_json::from_value(envelope.payload).map_err(|e| {
        Error::model_load(format!("{} has an invalid payload: {e}", path.display()))
    })
}

fn default_vectorizer_path() -> PathBuf {
    PathBuf::from("models/vectorizer.json")
}

fn default_model_path() -> PathBuf {
    PathBuf::from("models/model.json")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_paths() {
        let paths = ArtifactPaths::default();
        assert_eq!(paths.vectorizer, PathBuf::from("models/vectorizer.json"));
        assert_eq!(paths.model, PathBuf::from("models/model.json"));
    }

    #[test]
    fn test_in_dir() {
        let paths = ArtifactPaths::in_dir("/srv/guard");
        assert_eq!(paths.model, PathBuf::from("/srv/guard/model.json"));
    }

    #[test]
    fn test_missing_file_is_model_load_error() {
        let err = load_model("/definitely/not/here/model.json").unwrap_err();
        assert!(matches!(err, Error::ModelLoad(_)));
        assert!(err.is_fatal());
    }
}
