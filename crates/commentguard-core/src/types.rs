//! Core types for CommentGuard

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Cleaned comment text: lowercase ASCII words separated by single spaces.
///
/// Constructing one checks the contract, so anything holding a
/// `NormalizedText` can vectorize it without re-validating.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize)]
#[serde(transparent)]
pub struct NormalizedText(String);

impl NormalizedText {
    /// Wrap a string that must already be in normalized form
    pub fn new(text: impl Into<String>) -> Result<Self> {
        let text = text.into();

        if let Some(bad) = text.chars().find(|c| !(c.is_ascii_lowercase() || *c == ' ')) {
            return Err(Error::vectorization(format!(
                "normalized text contains disallowed character {bad:?}"
            )));
        }

        if text.starts_with(' ') || text.ends_with(' ') || text.contains("  ") {
            return Err(Error::vectorization(
                "normalized text must be single-space separated without padding",
            ));
        }

        Ok(Self(text))
    }

    /// Join already-clean tokens with single spaces
    pub fn from_tokens<I, S>(tokens: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut joined = String::new();
        for token in tokens {
            let token = token.as_ref();
            if token.is_empty() {
                continue;
            }
            if !joined.is_empty() {
                joined.push(' ');
            }
            joined.push_str(token);
        }
        Self::new(joined)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Whitespace tokens in order
    pub fn tokens(&self) -> impl Iterator<Item = &str> {
        self.0.split(' ').filter(|t| !t.is_empty())
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl fmt::Display for NormalizedText {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for NormalizedText {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Sparse feature vector with a fixed logical dimension
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureVector {
    dim: usize,
    /// (index, weight) pairs, strictly increasing by index, no explicit zeros
    entries: Vec<(usize, f64)>,
}

impl FeatureVector {
    /// Build from unsorted (index, weight) pairs.
    ///
    /// Duplicate indices are summed; zero weights are dropped.
    pub fn from_entries(dim: usize, mut entries: Vec<(usize, f64)>) -> Result<Self> {
        if let Some((idx, _)) = entries.iter().find(|(idx, _)| *idx >= dim) {
            return Err(Error::vectorization(format!(
                "feature index {idx} out of bounds for dimension {dim}"
            )));
        }

        entries.sort_by_key(|(idx, _)| *idx);

        let mut merged: Vec<(usize, f64)> = Vec::with_capacity(entries.len());
        for (idx, weight) in entries {
            match merged.last_mut() {
                Some((last, acc)) if *last == idx => *acc += weight,
                _ => merged.push((idx, weight)),
            }
        }
        merged.retain(|(_, w)| *w != 0.0);

        Ok(Self { dim, entries: merged })
    }

    /// All-zero vector of the given dimension
    pub fn zeros(dim: usize) -> Self {
        Self {
            dim,
            entries: Vec::new(),
        }
    }

    /// Logical dimension (vocabulary size)
    pub fn len(&self) -> usize {
        self.dim
    }

    pub fn is_empty(&self) -> bool {
        self.dim == 0
    }

    /// Number of non-zero entries
    pub fn nnz(&self) -> usize {
        self.entries.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (usize, f64)> + '_ {
        self.entries.iter().copied()
    }

    pub fn get(&self, index: usize) -> f64 {
        self.entries
            .binary_search_by_key(&index, |(idx, _)| *idx)
            .map(|pos| self.entries[pos].1)
            .unwrap_or(0.0)
    }

    /// Dot product against a dense weight vector of the same dimension
    pub fn dot(&self, weights: &[f64]) -> Result<f64> {
        if weights.len() != self.dim {
            return Err(Error::vectorization(format!(
                "dimension mismatch: vector has {}, weights have {}",
                self.dim,
                weights.len()
            )));
        }
        Ok(self.entries.iter().map(|(idx, w)| weights[*idx] * w).sum())
    }

    pub fn l2_norm(&self) -> f64 {
        self.entries.iter().map(|(_, w)| w * w).sum::<f64>().sqrt()
    }

    pub fn to_dense(&self) -> Vec<f64> {
        let mut dense = vec![0.0; self.dim];
        for (idx, w) in &self.entries {
            dense[*idx] = *w;
        }
        dense
    }
}

/// Final moderation decision, ordered from least to most severe
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Outcome {
    /// Post the comment
    Safe,
    /// Post, but ask the author to reconsider
    Warn,
    /// Refuse the comment
    Blocked,
}

impl Outcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Safe => "safe",
            Self::Warn => "warn",
            Self::Blocked => "blocked",
        }
    }

    /// User-facing notice for this outcome
    pub fn notice(&self) -> &'static str {
        match self {
            Self::Safe => "Posted",
            Self::Warn => "Consider editing",
            Self::Blocked => "Harmful message blocked",
        }
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Outcome {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "safe" => Ok(Self::Safe),
            "warn" => Ok(Self::Warn),
            "blocked" | "block" => Ok(Self::Blocked),
            other => Err(Error::policy(format!("unknown outcome '{other}'"))),
        }
    }
}

/// Coarse sentiment label for display
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SentimentLabel {
    Positive,
    Neutral,
    Negative,
}

impl SentimentLabel {
    /// Label a compound polarity in [-1, 1] using the ±0.05 neutral band
    pub fn from_polarity(polarity: f64) -> Self {
        if polarity >= 0.05 {
            Self::Positive
        } else if polarity <= -0.05 {
            Self::Negative
        } else {
            Self::Neutral
        }
    }
}

/// Full result of scoring one comment
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Assessment {
    /// Clamped combined score in [0, 1]
    pub final_score: f64,

    pub outcome: Outcome,

    /// Classifier output before the sentiment boost
    pub ml_score: f64,

    /// Sentiment-derived additive boost (0 when disabled or non-negative)
    pub boost: f64,

    pub normalized_text: NormalizedText,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub sentiment_label: Option<SentimentLabel>,

    /// Pipeline latency in microseconds
    pub latency_us: u64,
}

impl Assessment {
    /// Score as a whole percentage, the way the meter displays it
    pub fn percent(&self) -> u8 {
        (self.final_score * 100.0) as u8
    }
}

/// What the pipeline boundary hands back for every submission
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum Verdict {
    /// The comment was scored
    Evaluated(Assessment),

    /// The comment could not be evaluated; never equivalent to Safe
    Rejected {
        error_kind: String,
        reason: String,
    },
}

impl Verdict {
    pub fn rejected(err: &Error) -> Self {
        Self::Rejected {
            error_kind: err.kind().to_string(),
            reason: err.to_string(),
        }
    }

    pub fn outcome(&self) -> Option<Outcome> {
        match self {
            Self::Evaluated(a) => Some(a.outcome),
            Self::Rejected { .. } => None,
        }
    }

    pub fn is_rejected(&self) -> bool {
        matches!(self, Self::Rejected { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalized_text_contract() {
        assert!(NormalizedText::new("great stream today").is_ok());
        assert!(NormalizedText::new("").is_ok());
        assert!(NormalizedText::new("Great").is_err());
        assert!(NormalizedText::new("abc1").is_err());
        assert!(NormalizedText::new("two  spaces").is_err());
        assert!(NormalizedText::new(" padded").is_err());
    }

    #[test]
    fn test_from_tokens_skips_empty() {
        let text = NormalizedText::from_tokens(["stupid", "", "ugly"]).unwrap();
        assert_eq!(text.as_str(), "stupid ugly");
        assert_eq!(text.tokens().count(), 2);
    }

    #[test]
    fn test_feature_vector_merges_and_sorts() {
        let v = FeatureVector::from_entries(5, vec![(3, 1.0), (1, 0.5), (3, 1.0), (4, 0.0)]).unwrap();
        assert_eq!(v.len(), 5);
        assert_eq!(v.nnz(), 2);
        assert_eq!(v.get(3), 2.0);
        assert_eq!(v.get(0), 0.0);
        assert_eq!(v.to_dense(), vec![0.0, 0.5, 0.0, 2.0, 0.0]);
    }

    #[test]
    fn test_feature_vector_bounds_and_dot() {
        assert!(FeatureVector::from_entries(2, vec![(2, 1.0)]).is_err());

        let v = FeatureVector::from_entries(3, vec![(0, 2.0), (2, 1.0)]).unwrap();
        assert_eq!(v.dot(&[1.0, 5.0, 3.0]).unwrap(), 5.0);
        assert!(v.dot(&[1.0]).is_err());
    }

    #[test]
    fn test_sentiment_label_bands() {
        assert_eq!(SentimentLabel::from_polarity(0.05), SentimentLabel::Positive);
        assert_eq!(SentimentLabel::from_polarity(0.0), SentimentLabel::Neutral);
        assert_eq!(SentimentLabel::from_polarity(-0.05), SentimentLabel::Negative);
    }

    #[test]
    fn test_outcome_parse() {
        assert_eq!("Blocked".parse::<Outcome>().unwrap(), Outcome::Blocked);
        assert_eq!("warn".parse::<Outcome>().unwrap(), Outcome::Warn);
        assert!("maybe".parse::<Outcome>().is_err());
    }

    #[test]
    fn test_rejected_verdict_serialization() {
        let verdict = Verdict::rejected(&Error::invalid_input("empty comment"));
        let json = serde_json::to_value(&verdict).unwrap();
        assert_eq!(json["status"], "rejected");
        assert_eq!(json["error_kind"], "invalid_input");
        assert!(verdict.outcome().is_none());
    }
}
