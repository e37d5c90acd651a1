//! Service configuration

use commentguard_classifiers::{PipelineConfig, SentimentStrategy};
use commentguard_policy::{PolicyConfig, PolicyPreset};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Full service configuration: pipeline plus HTTP server settings
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ServiceConfig {
    #[serde(flatten)]
    pub pipeline: PipelineConfig,

    #[serde(default)]
    pub server: ServerConfig,
}

/// HTTP server settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_listen")]
    pub listen: String,

    #[serde(default = "default_port")]
    pub port: u16,

    /// Accepted comments kept in the live feed
    #[serde(default = "default_feed_capacity")]
    pub feed_capacity: usize,

    /// Request body limit for moderation requests
    #[serde(default = "default_max_body_bytes")]
    pub max_body_bytes: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            listen: default_listen(),
            port: default_port(),
            feed_capacity: default_feed_capacity(),
            max_body_bytes: default_max_body_bytes(),
        }
    }
}

/// Values given on the command line, applied over the file
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub listen: Option<String>,
    pub port: Option<u16>,
    pub policy: Option<PolicyPreset>,
    pub sentiment: Option<SentimentStrategy>,
    pub vectorizer: Option<PathBuf>,
    pub model: Option<PathBuf>,
}

impl ServiceConfig {
    /// Load configuration from file and CLI overrides
    pub fn load(config_path: impl AsRef<Path>, overrides: &ConfigOverrides) -> anyhow::Result<Self> {
        let config_path = config_path.as_ref();

        // Try to load from file, or use defaults
        let mut config = if config_path.exists() {
            let content = std::fs::read_to_string(config_path)?;
            Self::from_yaml(&content)?
        } else {
            Self::default()
        };

        config.apply(overrides);
        Ok(config)
    }

    pub fn from_yaml(yaml: &str) -> anyhow::Result<Self> {
        let config: Self = serde_yaml::from_str(yaml)?;
        config.pipeline.sentiment.validate()?;
        Ok(config)
    }

    /// Apply CLI overrides
    pub fn apply(&mut self, overrides: &ConfigOverrides) {
        if let Some(listen) = &overrides.listen {
            self.server.listen = listen.clone();
        }
        if let Some(port) = overrides.port {
            self.server.port = port;
        }
        if let Some(preset) = overrides.policy {
            self.pipeline.policy = PolicyConfig::preset(preset);
        }
        if let Some(strategy) = overrides.sentiment {
            self.pipeline.sentiment.strategy = strategy;
        }
        if let Some(path) = &overrides.vectorizer {
            self.pipeline.artifacts.vectorizer = path.clone();
        }
        if let Some(path) = &overrides.model {
            self.pipeline.artifacts.model = path.clone();
        }
    }
}

fn default_listen() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

fn default_feed_capacity() -> usize {
    50
}

fn default_max_body_bytes() -> usize {
    16 * 1024
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_full_yaml() {
        let yaml = r#"
artifacts:
  vectorizer: ./m/vectorizer.json
  model: ./m/model.json
sentiment:
  strategy: keyword
policy:
  bands:
    - { outcome: safe, upper: 0.40 }
    - { outcome: warn, upper: 0.70 }
server:
  port: 9090
  feed_capacity: 10
"#;
        let config = ServiceConfig::from_yaml(yaml).unwrap();

        assert_eq!(config.pipeline.artifacts.model, PathBuf::from("./m/model.json"));
        assert_eq!(config.pipeline.sentiment.strategy, SentimentStrategy::Keyword);
        assert_eq!(config.pipeline.policy.bands.as_ref().map(Vec::len), Some(2));
        assert_eq!(config.server.port, 9090);
        assert_eq!(config.server.feed_capacity, 10);
        assert_eq!(config.server.listen, "0.0.0.0");
        assert_eq!(config.server.max_body_bytes, 16384);
    }

    #[test]
    fn test_missing_file_uses_defaults() {
        let config =
            ServiceConfig::load("/nonexistent/commentguard.yaml", &ConfigOverrides::default())
                .unwrap();
        assert_eq!(config.server, ServerConfig::default());
        assert_eq!(config.pipeline.sentiment.strategy, SentimentStrategy::Lexicon);
    }

    #[test]
    fn test_overrides_win() {
        let mut config = ServiceConfig::from_yaml("policy:\n  preset: live_stream\n").unwrap();
        config.apply(&ConfigOverrides {
            port: Some(3000),
            policy: Some(PolicyPreset::Coarse),
            sentiment: Some(SentimentStrategy::Disabled),
            ..Default::default()
        });

        assert_eq!(config.server.port, 3000);
        assert_eq!(config.pipeline.policy.preset, Some(PolicyPreset::Coarse));
        assert_eq!(config.pipeline.sentiment.strategy, SentimentStrategy::Disabled);
    }
}
