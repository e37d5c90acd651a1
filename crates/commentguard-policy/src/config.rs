//! Policy configuration as it appears in YAML files

use commentguard_core::{Error, Result};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::{Band, DecisionPolicy, PolicyPreset};

/// Policy section of the service configuration.
///
/// Either names a preset or lists explicit bands; never both.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PolicyConfig {
    /// Display name for explicit band lists
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    /// Named preset
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub preset: Option<PolicyPreset>,

    /// Explicit bands, ordered low to high
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bands: Option<Vec<Band>>,
}

impl PolicyConfig {
    /// Load a policy section from YAML string
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        serde_yaml::from_str(yaml)
            .map_err(|e| Error::config(format!("invalid policy yaml: {e}")))
    }

    /// Load a policy section from a file
    pub fn from_file(path: impl AsRef<std::path::Path>) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml(&content)
    }

    /// Config selecting a preset
    pub fn preset(preset: PolicyPreset) -> Self {
        Self {
            preset: Some(preset),
            ..Default::default()
        }
    }

    /// Build the runtime policy
    pub fn build(&self) -> Result<DecisionPolicy> {
        let policy = match (&self.preset, &self.bands) {
            (Some(_), Some(_)) => {
                return Err(Error::config(
                    "policy sets both `preset` and `bands`; choose one",
                ))
            }
            (_, Some(bands)) => {
                let name = self.name.clone().unwrap_or_else(|| "custom".to_string());
                DecisionPolicy::new(name, bands.clone())?
            }
            (Some(preset), None) => preset.policy(),
            (None, None) => DecisionPolicy::default(),
        };

        info!(
            policy = policy.name(),
            bands = policy.bands().len(),
            "Decision policy configured"
        );
        Ok(policy)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use commentguard_core::Outcome;

    #[test]
    fn test_preset_yaml() {
        let config = PolicyConfig::from_yaml("preset: coarse").unwrap();
        let policy = config.build().unwrap();

        assert_eq!(policy.name(), "coarse");
        assert_eq!(policy.decide(0.5, 0.0).outcome, Outcome::Warn);
    }

    #[test]
    fn test_explicit_bands_yaml() {
        let yaml = r#"
name: chat-overlay
bands:
  - outcome: safe
    upper: 0.2
    inclusive: true
  - outcome: warn
    upper: 0.6
"#;
        let policy = PolicyConfig::from_yaml(yaml).unwrap().build().unwrap();

        assert_eq!(policy.name(), "chat-overlay");
        assert_eq!(policy.decide(0.2, 0.0).outcome, Outcome::Safe);
        assert_eq!(policy.decide(0.6, 0.0).outcome, Outcome::Blocked);
    }

    #[test]
    fn test_blocked_band_below_safe_rejected() {
        let yaml = r#"
bands:
  - outcome: blocked
    upper: 0.3
  - outcome: safe
    upper: 0.8
"#;
        let err = PolicyConfig::from_yaml(yaml).unwrap().build().unwrap_err();
        assert!(matches!(err, Error::Policy(_)));
    }

    #[test]
    fn test_preset_and_bands_conflict() {
        let yaml = r#"
preset: coarse
bands:
  - outcome: safe
    upper: 0.5
"#;
        let err = PolicyConfig::from_yaml(yaml).unwrap().build().unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }

    #[test]
    fn test_empty_config_uses_default_preset() {
        let policy = PolicyConfig::default().build().unwrap();
        assert_eq!(policy.name(), "live_stream");
    }
}
