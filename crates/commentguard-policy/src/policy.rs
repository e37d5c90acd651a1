//! Decision policy: combine the classifier score with the sentiment boost
//! and map the result onto ordered threshold bands.

use commentguard_core::{Error, Outcome, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::Band;

/// Named threshold presets observed in deployment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum PolicyPreset {
    /// `<= 0.01` safe, `< 0.03` warn, otherwise blocked
    #[default]
    LiveStream,
    /// `< 0.40` safe, `< 0.70` warn, otherwise blocked
    Coarse,
}

impl PolicyPreset {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::LiveStream => "live_stream",
            Self::Coarse => "coarse",
        }
    }

    /// Build the policy this preset names
    pub fn policy(&self) -> DecisionPolicy {
        let bands = match self {
            Self::LiveStream => vec![
                Band::up_to(Outcome::Safe, 0.01),
                Band::below(Outcome::Warn, 0.03),
            ],
            Self::Coarse => vec![
                Band::below(Outcome::Safe, 0.40),
                Band::below(Outcome::Warn, 0.70),
            ],
        };

        DecisionPolicy {
            name: self.as_str().to_string(),
            bands,
            fallback: Outcome::Blocked,
        }
    }
}

impl fmt::Display for PolicyPreset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PolicyPreset {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.replace('-', "_").to_ascii_lowercase().as_str() {
            "live_stream" => Ok(Self::LiveStream),
            "coarse" => Ok(Self::Coarse),
            other => Err(Error::policy(format!(
                "unknown policy preset '{other}' (expected live_stream or coarse)"
            ))),
        }
    }
}

/// Result of applying the policy to one comment
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Decision {
    /// `clamp(ml_score + boost, 0, 1)`
    pub final_score: f64,

    pub outcome: Outcome,
}

/// Ordered threshold bands with a catch-all outcome above the last band
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DecisionPolicy {
    name: String,
    bands: Vec<Band>,
    fallback: Outcome,
}

impl DecisionPolicy {
    /// Create a custom policy.
    ///
    /// Bands must have finite upper bounds in [0, 1], strictly increasing,
    /// and outcomes that never get less severe from one band to the next.
    /// Scores above every band map to `Blocked`.
    pub fn new(name: impl Into<String>, bands: Vec<Band>) -> Result<Self> {
        for band in &bands {
            if !band.upper.is_finite() || !(0.0..=1.0).contains(&band.upper) {
                return Err(Error::policy(format!(
                    "band upper bound {} outside [0, 1]",
                    band.upper
                )));
            }
        }

        if let Some(pair) = bands.windows(2).find(|w| w[0].upper >= w[1].upper) {
            return Err(Error::policy(format!(
                "band bounds must be strictly increasing ({} then {})",
                pair[0].upper, pair[1].upper
            )));
        }

        if let Some(pair) = bands.windows(2).find(|w| w[0].outcome > w[1].outcome) {
            return Err(Error::policy(format!(
                "band outcomes must not decrease in severity ({} then {})",
                pair[0].outcome, pair[1].outcome
            )));
        }

        Ok(Self {
            name: name.into(),
            bands,
            fallback: Outcome::Blocked,
        })
    }

    /// `<= 0.01` safe, `< 0.03` warn, otherwise blocked
    pub fn live_stream() -> Self {
        PolicyPreset::LiveStream.policy()
    }

    /// `< 0.40` safe, `< 0.70` warn, otherwise blocked
    pub fn coarse() -> Self {
        PolicyPreset::Coarse.policy()
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn bands(&self) -> &[Band] {
        &self.bands
    }

    /// Outcome for scores above every band
    pub fn fallback(&self) -> Outcome {
        self.fallback
    }

    /// Combine the classifier score with the boost and pick an outcome
    pub fn decide(&self, ml_score: f64, boost: f64) -> Decision {
        let final_score = combine(ml_score, boost);

        Decision {
            final_score,
            outcome: self.outcome_for(final_score),
        }
    }

    /// Map an already-combined score to an outcome, first matching band wins
    pub fn outcome_for(&self, score: f64) -> Outcome {
        self.bands
            .iter()
            .find(|band| band.contains(score))
            .map(|band| band.outcome)
            .unwrap_or(self.fallback)
    }
}

impl Default for DecisionPolicy {
    fn default() -> Self {
        PolicyPreset::default().policy()
    }
}

/// Clamp `ml_score + boost` into [0, 1]. A non-finite sum fails closed at 1.0.
pub fn combine(ml_score: f64, boost: f64) -> f64 {
    let sum = ml_score + boost;
    if !sum.is_finite() {
        return 1.0;
    }
    sum.clamp(0.0, 1.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_live_stream_boundaries() {
        let policy = DecisionPolicy::live_stream();

        assert_eq!(policy.decide(0.0, 0.0).outcome, Outcome::Safe);
        assert_eq!(policy.decide(0.01, 0.0).outcome, Outcome::Safe);
        assert_eq!(policy.decide(0.011, 0.0).outcome, Outcome::Warn);
        assert_eq!(policy.decide(0.029, 0.0).outcome, Outcome::Warn);
        assert_eq!(policy.decide(0.03, 0.0).outcome, Outcome::Blocked);
        assert_eq!(policy.decide(0.5, 0.0).outcome, Outcome::Blocked);
    }

    #[test]
    fn test_coarse_boundaries() {
        let policy = DecisionPolicy::coarse();

        assert_eq!(policy.decide(0.01, 0.0).outcome, Outcome::Safe);
        assert_eq!(policy.decide(0.39, 0.0).outcome, Outcome::Safe);
        assert_eq!(policy.decide(0.40, 0.0).outcome, Outcome::Warn);
        assert_eq!(policy.decide(0.69, 0.0).outcome, Outcome::Warn);
        assert_eq!(policy.decide(0.70, 0.0).outcome, Outcome::Blocked);
    }

    #[test]
    fn test_final_score_is_clamped() {
        let policy = DecisionPolicy::coarse();

        let decision = policy.decide(0.9, 0.25);
        assert_eq!(decision.final_score, 1.0);
        assert_eq!(decision.outcome, Outcome::Blocked);

        assert_eq!(policy.decide(-0.2, 0.0).final_score, 0.0);
    }

    #[test]
    fn test_boost_can_move_outcome() {
        let policy = DecisionPolicy::coarse();

        assert_eq!(policy.decide(0.30, 0.0).outcome, Outcome::Safe);
        assert_eq!(policy.decide(0.30, 0.2).outcome, Outcome::Warn);
    }

    #[test]
    fn test_non_finite_fails_closed() {
        let policy = DecisionPolicy::coarse();

        assert_eq!(policy.decide(f64::NAN, 0.0).outcome, Outcome::Blocked);
        assert_eq!(policy.decide(f64::INFINITY, 0.0).final_score, 1.0);
    }

    #[test]
    fn test_custom_policy_validation() {
        assert!(DecisionPolicy::new(
            "bad-order",
            vec![Band::below(Outcome::Safe, 0.5), Band::below(Outcome::Warn, 0.2)]
        )
        .is_err());

        assert!(DecisionPolicy::new("out-of-range", vec![Band::below(Outcome::Safe, 1.5)]).is_err());

        let err = DecisionPolicy::new(
            "inverted",
            vec![Band::below(Outcome::Blocked, 0.3), Band::below(Outcome::Safe, 0.6)],
        )
        .unwrap_err();
        assert!(matches!(err, Error::Policy(_)));

        assert!(DecisionPolicy::new(
            "two-warn",
            vec![
                Band::below(Outcome::Safe, 0.2),
                Band::below(Outcome::Warn, 0.4),
                Band::below(Outcome::Warn, 0.6)
            ]
        )
        .is_ok());

        let policy = DecisionPolicy::new("lenient", vec![Band::below(Outcome::Safe, 0.9)]).unwrap();
        assert_eq!(policy.decide(0.95, 0.0).outcome, Outcome::Blocked);
    }

    #[test]
    fn test_preset_parse() {
        assert_eq!("live-stream".parse::<PolicyPreset>().unwrap(), PolicyPreset::LiveStream);
        assert_eq!("coarse".parse::<PolicyPreset>().unwrap(), PolicyPreset::Coarse);
        assert!("strict".parse::<PolicyPreset>().is_err());
    }
}
