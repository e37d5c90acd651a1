//! Toxicity model: fitted vectorizer plus scorer

use crate::model_loader::{ArtifactPaths, LoadedArtifacts};
use crate::scorer::{Scorer, ScorerKind};
use crate::vectorizer::VectorizerState;
use commentguard_core::{Error, FeatureVector, NormalizedText, Result};

/// Scores normalized comments for cyberbullying likelihood.
///
/// Construction guarantees the scorer's dimension equals the vocabulary
/// size, so scoring can only fail on internal corruption.
#[derive(Debug)]
pub struct ToxicityModel {
    vectorizer: VectorizerState,
    scorer: Box<dyn Scorer>,
}

impl ToxicityModel {
    /// Pair a vectorizer with a scorer of matching dimension
    pub fn new(vectorizer: VectorizerState, scorer: Box<dyn Scorer>) -> Result<Self> {
        vectorizer.validate()?;
        if vectorizer.dimension() != scorer.dimension() {
            return Err(Error::model_load(format!(
                "scorer expects {} features, vectorizer produces {}",
                scorer.dimension(),
                vectorizer.dimension()
            )));
        }
        Ok(Self { vectorizer, scorer })
    }

    /// Load both artifacts from disk
    pub fn load(paths: &ArtifactPaths) -> Result<Self> {
        let LoadedArtifacts { vectorizer, scorer } = LoadedArtifacts::load(paths)?;
        Self::new(vectorizer, scorer)
    }

    pub fn vectorize(&self, text: &NormalizedText) -> Result<FeatureVector> {
        self.vectorizer.transform(text)
    }

    /// ML toxicity score in [0, 1]
    pub fn score(&self, text: &NormalizedText) -> Result<f64> {
        let features = self.vectorize(text)?;
        let score = self.scorer.score(&features)?;
        if !(0.0..=1.0).contains(&score) {
            return Err(Error::internal(format!("scorer produced out-of-range score {score}")));
        }
        Ok(score)
    }

    pub fn scorer_kind(&self) -> ScorerKind {
        self.scorer.kind()
    }

    pub fn vocabulary_size(&self) -> usize {
        self.vectorizer.dimension()
    }

    pub fn vectorizer(&self) -> &VectorizerState {
        &self.vectorizer
    }
}
