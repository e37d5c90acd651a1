//! Threshold band definitions

use commentguard_core::Outcome;
use serde::{Deserialize, Serialize};

/// One score band: scores at or below (or strictly below) `upper` map to `outcome`
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Band {
    /// Outcome assigned to scores inside this band
    pub outcome: Outcome,

    /// Upper score bound (0.0-1.0)
    pub upper: f64,

    /// Whether `upper` itself falls inside the band
    #[serde(default)]
    pub inclusive: bool,
}

impl Band {
    /// Band covering `score < upper`
    pub fn below(outcome: Outcome, upper: f64) -> Self {
        Self {
            outcome,
            upper,
            inclusive: false,
        }
    }

    /// Band covering `score <= upper`
    pub fn up_to(outcome: Outcome, upper: f64) -> Self {
        Self {
            outcome,
            upper,
            inclusive: true,
        }
    }

    /// Check whether a score falls inside this band
    pub fn contains(&self, score: f64) -> bool {
        if self.inclusive {
            score <= self.upper
        } else {
            score < self.upper
        }
    }
}
