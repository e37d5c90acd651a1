//! Configuration for the moderation pipeline

use crate::model_loader::ArtifactPaths;
use crate::sentiment::{SentimentStrategy, DEFAULT_BOOST_FACTOR};
use commentguard_core::{Error, Result};
use commentguard_policy::PolicyConfig;
use serde::{Deserialize, Serialize};

/// Everything needed to assemble a [`crate::ModerationPipeline`]
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// Trained artifact locations
    #[serde(default)]
    pub artifacts: ArtifactPaths,

    /// Sentiment stage
    #[serde(default)]
    pub sentiment: SentimentConfig,

    /// Decision thresholds
    #[serde(default)]
    pub policy: PolicyConfig,
}

/// Sentiment stage settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SentimentConfig {
    #[serde(default)]
    pub strategy: SentimentStrategy,

    /// Multiplier from negative polarity to score boost
    #[serde(default = "default_boost_factor")]
    pub boost_factor: f64,
}

impl Default for SentimentConfig {
    fn default() -> Self {
        Self {
            strategy: SentimentStrategy::default(),
            boost_factor: default_boost_factor(),
        }
    }
}

impl SentimentConfig {
    pub fn validate(&self) -> Result<()> {
        if !self.boost_factor.is_finite() || !(0.0..=1.0).contains(&self.boost_factor) {
            return Err(Error::config(format!(
                "boost_factor must be in [0, 1], got {}",
                self.boost_factor
            )));
        }
        Ok(())
    }
}

impl PipelineConfig {
    /// Load configuration from YAML string
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        let config: Self = serde_yaml::from_str(yaml)
            .map_err(|e| Error::config(format!("invalid pipeline yaml: {e}")))?;
        config.sentiment.validate()?;
        Ok(config)
    }

    /// Load configuration from file
    pub fn from_file(path: impl AsRef<std::path::Path>) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml(&content)
    }
}

fn default_boost_factor() -> f64 {
    DEFAULT_BOOST_FACTOR
}
