//! Scorer trait and linear model variants
//!
//! A trained model is a linear function over TF-IDF features. How its raw
//! decision value becomes a probability-like score depends on what the
//! model can report: a calibrated probability, an unbounded margin, or only
//! a hard label.

use commentguard_core::{Error, FeatureVector, Result};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Trait for all toxicity scorers
pub trait Scorer: Send + Sync + fmt::Debug {
    /// Score in [0, 1] that the features describe a cyberbullying comment
    fn score(&self, features: &FeatureVector) -> Result<f64>;

    /// Hard label: 1 for cyberbullying, 0 otherwise
    fn predict(&self, features: &FeatureVector) -> Result<u8> {
        Ok(u8::from(self.score(features)? >= 0.5))
    }

    /// How the score is derived
    fn kind(&self) -> ScorerKind;

    /// Expected feature dimension
    fn dimension(&self) -> usize;
}

/// Score derivation strategy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScorerKind {
    /// Model reports a class probability directly
    Probabilistic,
    /// Model reports a signed margin, squashed through a sigmoid
    Margin,
    /// Model reports only a label, used as 0.0 or 1.0
    Label,
}

impl ScorerKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Probabilistic => "probabilistic",
            Self::Margin => "margin",
            Self::Label => "label",
        }
    }
}

impl fmt::Display for ScorerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Weights and bias of a linear decision function
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LinearModel {
    pub weights: Vec<f64>,
    pub bias: f64,
}

impl LinearModel {
    pub fn new(weights: Vec<f64>, bias: f64) -> Self {
        Self { weights, bias }
    }

    pub fn zeros(dim: usize) -> Self {
        Self::new(vec![0.0; dim], 0.0)
    }

    /// `w · x + b`
    pub fn decision(&self, features: &FeatureVector) -> Result<f64> {
        Ok(features.dot(&self.weights)? + self.bias)
    }

    pub fn dimension(&self) -> usize {
        self.weights.len()
    }

    /// Reject weights that would poison every score
    pub fn validate(&self) -> Result<()> {
        if !self.bias.is_finite() || self.weights.iter().any(|w| !w.is_finite()) {
            return Err(Error::model_load("model contains non-finite weights"));
        }
        Ok(())
    }
}

/// Logistic model: score is the predicted probability
#[derive(Debug, Clone)]
pub struct ProbabilisticScorer {
    model: LinearModel,
}

impl ProbabilisticScorer {
    pub fn new(model: LinearModel) -> Self {
        Self { model }
    }
}

impl Scorer for ProbabilisticScorer {
    fn score(&self, features: &FeatureVector) -> Result<f64> {
        Ok(sigmoid(self.model.decision(features)?))
    }

    fn kind(&self) -> ScorerKind {
        ScorerKind::Probabilistic
    }

    fn dimension(&self) -> usize {
        self.model.dimension()
    }
}

/// Max-margin model: score is the sigmoid of the signed margin
#[derive(Debug, Clone)]
pub struct MarginScorer {
    model: LinearModel,
}

impl MarginScorer {
    pub fn new(model: LinearModel) -> Self {
        Self { model }
    }

    /// Raw signed distance from the separating hyperplane
    pub fn margin(&self, features: &FeatureVector) -> Result<f64> {
        self.model.decision(features)
    }
}

impl Scorer for MarginScorer {
    fn score(&self, features: &FeatureVector) -> Result<f64> {
        Ok(sigmoid(self.margin(features)?))
    }

    fn predict(&self, features: &FeatureVector) -> Result<u8> {
        Ok(u8::from(self.margin(features)? > 0.0))
    }

    fn kind(&self) -> ScorerKind {
        ScorerKind::Margin
    }

    fn dimension(&self) -> usize {
        self.model.dimension()
    }
}

/// Label-only model: score is exactly 0.0 or 1.0
#[derive(Debug, Clone)]
pub struct LabelScorer {
    model: LinearModel,
}

impl LabelScorer {
    pub fn new(model: LinearModel) -> Self {
        Self { model }
    }
}

impl Scorer for LabelScorer {
    fn score(&self, features: &FeatureVector) -> Result<f64> {
        Ok(if self.model.decision(features)? > 0.0 {
            1.0
        } else {
            0.0
        })
    }

    fn kind(&self) -> ScorerKind {
        ScorerKind::Label
    }

    fn dimension(&self) -> usize {
        self.model.dimension()
    }
}

/// Persisted form of a scorer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "scorer", rename_all = "snake_case")]
pub enum ModelArtifact {
    Probabilistic { model: LinearModel },
    Margin { model: LinearModel },
    Label { model: LinearModel },
}

impl ModelArtifact {
    pub fn new(kind: ScorerKind, model: LinearModel) -> Self {
        match kind {
            ScorerKind::Probabilistic => Self::Probabilistic { model },
            ScorerKind::Margin => Self::Margin { model },
            ScorerKind::Label => Self::Label { model },
        }
    }

    pub fn kind(&self) -> ScorerKind {
        match self {
            Self::Probabilistic { .. } => ScorerKind::Probabilistic,
            Self::Margin { .. } => ScorerKind::Margin,
            Self::Label { .. } => ScorerKind::Label,
        }
    }

    pub fn model(&self) -> &LinearModel {
        match self {
            Self::Probabilistic { model } | Self::Margin { model } | Self::Label { model } => model,
        }
    }

    pub fn into_scorer(self) -> Box<dyn Scorer> {
        match self {
            Self::Probabilistic { model } => Box::new(ProbabilisticScorer::new(model)),
            Self::Margin { model } => Box::new(MarginScorer::new(model)),
            Self::Label { model } => Box::new(LabelScorer::new(model)),
        }
    }
}

/// Logistic function, stable for large |x|
pub fn sigmoid(x: f64) -> f64 {
    if x >= 0.0 {
        1.0 / (1.0 + (-x).exp())
    } else {
        let e = x.exp();
        e / (1.0 + e)
    }
}
