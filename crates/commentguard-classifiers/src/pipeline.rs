//! Moderation pipeline
//!
//! Runs one comment through every stage in order:
//!
//! 1. Normalize the raw text
//! 2. Vectorize and score with the toxicity model
//! 3. Compute the sentiment boost (when enabled)
//! 4. Combine and map onto an outcome with the decision policy
//!
//! Stages hold no per-request state, so one pipeline can be shared across
//! threads behind an `Arc`.

use crate::config::PipelineConfig;
use crate::normalizer::Normalizer;
use crate::sentiment::{aggression_boost, PolarityScorer, DEFAULT_BOOST_FACTOR};
use crate::toxicity::ToxicityModel;
use commentguard_core::{Assessment, Error, Result, SentimentLabel, Verdict};
use commentguard_policy::DecisionPolicy;
use std::time::Instant;
use tracing::{debug, error, warn};

/// Normalizer, toxicity model, optional sentiment scorer and decision policy
#[derive(Debug)]
pub struct ModerationPipeline {
    normalizer: Normalizer,
    model: ToxicityModel,
    sentiment: Option<Box<dyn PolarityScorer>>,
    boost_factor: f64,
    policy: DecisionPolicy,
}

impl ModerationPipeline {
    /// Start building a pipeline around a toxicity model
    pub fn builder(model: ToxicityModel) -> PipelineBuilder {
        PipelineBuilder::new(model)
    }

    /// Load artifacts and assemble every stage from configuration
    pub fn from_config(config: &PipelineConfig) -> Result<Self> {
        config.sentiment.validate()?;

        let model = ToxicityModel::load(&config.artifacts)?;
        let mut builder = PipelineBuilder::new(model)
            .boost_factor(config.sentiment.boost_factor)
            .policy(config.policy.build()?);

        if let Some(scorer) = config.sentiment.strategy.build()? {
            builder = builder.sentiment(scorer);
        }

        builder.build()
    }

    /// Score one comment.
    ///
    /// Input that is empty, or has nothing left after normalization, is
    /// rejected with [`Error::InvalidInput`] instead of being scored.
    pub fn evaluate(&self, raw: &str) -> Result<Assessment> {
        let start = Instant::now();

        if raw.trim().is_empty() {
            return Err(Error::invalid_input("comment is empty"));
        }

        let normalized = self.normalizer.normalize(raw)?;
        if normalized.is_empty() {
            return Err(Error::invalid_input(
                "comment has no scorable words after normalization",
            ));
        }

        let ml_score = self.model.score(&normalized)?;

        let (boost, sentiment_label) = match &self.sentiment {
            Some(scorer) => {
                let polarity = scorer.polarity(normalized.as_str());
                let label = SentimentLabel::from_polarity(scorer.polarity(raw));
                (aggression_boost(polarity, self.boost_factor), Some(label))
            }
            None => (0.0, None),
        };

        let decision = self.policy.decide(ml_score, boost);
        let latency_us = start.elapsed().as_micros() as u64;

        debug!(
            ml_score,
            boost,
            final_score = decision.final_score,
            outcome = %decision.outcome,
            latency_us,
            "Evaluated comment"
        );

        Ok(Assessment {
            final_score: decision.final_score,
            outcome: decision.outcome,
            ml_score,
            boost,
            normalized_text: normalized,
            sentiment_label,
            latency_us,
        })
    }

    /// Score one comment, turning any failure into a rejected verdict
    pub fn moderate(&self, raw: &str) -> Verdict {
        match self.evaluate(raw) {
            Ok(assessment) => Verdict::Evaluated(assessment),
            Err(err) => {
                if err.is_fatal() {
                    error!(error = %err, kind = err.kind(), "Comment evaluation failed");
                } else {
                    warn!(error = %err, kind = err.kind(), "Comment rejected");
                }
                Verdict::rejected(&err)
            }
        }
    }

    pub fn policy(&self) -> &DecisionPolicy {
        &self.policy
    }

    pub fn model(&self) -> &ToxicityModel {
        &self.model
    }

    /// Active sentiment scorer name, if any
    pub fn sentiment_name(&self) -> Option<&str> {
        self.sentiment.as_deref().map(|s| s.name())
    }

    pub fn boost_factor(&self) -> f64 {
        self.boost_factor
    }
}

/// Builder for constructing pipelines fluently
#[derive(Debug)]
pub struct PipelineBuilder {
    model: ToxicityModel,
    normalizer: Option<Normalizer>,
    sentiment: Option<Box<dyn PolarityScorer>>,
    boost_factor: f64,
    policy: DecisionPolicy,
}

impl PipelineBuilder {
    pub fn new(model: ToxicityModel) -> Self {
        Self {
            model,
            normalizer: None,
            sentiment: None,
            boost_factor: DEFAULT_BOOST_FACTOR,
            policy: DecisionPolicy::default(),
        }
    }

    pub fn normalizer(mut self, normalizer: Normalizer) -> Self {
        self.normalizer = Some(normalizer);
        self
    }

    /// Enable the sentiment stage
    pub fn sentiment(mut self, scorer: Box<dyn PolarityScorer>) -> Self {
        self.sentiment = Some(scorer);
        self
    }

    pub fn boost_factor(mut self, factor: f64) -> Self {
        self.boost_factor = factor;
        self
    }

    pub fn policy(mut self, policy: DecisionPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn build(self) -> Result<ModerationPipeline> {
        if !self.boost_factor.is_finite() || self.boost_factor < 0.0 {
            return Err(Error::config(format!(
                "boost_factor must be a non-negative number, got {}",
                self.boost_factor
            )));
        }

        let normalizer = match self.normalizer {
            Some(normalizer) => normalizer,
            None => Normalizer::new()?,
        };

        Ok(ModerationPipeline {
            normalizer,
            model: self.model,
            sentiment: self.sentiment,
            boost_factor: self.boost_factor,
            policy: self.policy,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scorer::{LinearModel, ProbabilisticScorer};
    use crate::sentiment::{KeywordSentiment, LexiconSentiment};
    use crate::vectorizer::{VectorizerParams, VectorizerState};
    use commentguard_core::{NormalizedText, Outcome};

    /// Vocabulary: great, stream, stupid, ugly
    fn model(weights: Vec<f64>, bias: f64) -> ToxicityModel {
        let corpus = vec![
            NormalizedText::new("stupid ugly").unwrap(),
            NormalizedText::new("great stream").unwrap(),
        ];
        let params = VectorizerParams {
            ngram_max: 1,
            min_df: 1,
            max_df: 1.0,
            ..Default::default()
        };
        let vectorizer = VectorizerState::fit(&corpus, params).unwrap();
        let scorer = Box::new(ProbabilisticScorer::new(LinearModel::new(weights, bias)));
        ToxicityModel::new(vectorizer, scorer).unwrap()
    }

    fn pipeline() -> ModerationPipeline {
        ModerationPipeline::builder(model(vec![-8.0, -8.0, 8.0, 8.0], -3.0))
            .sentiment(Box::new(LexiconSentiment::new()))
            .build()
            .unwrap()
    }

    #[test]
    fn test_safe_comment() {
        let assessment = pipeline().evaluate("Great stream!").unwrap();

        assert_eq!(assessment.normalized_text.as_str(), "great stream");
        assert_eq!(assessment.boost, 0.0);
        assert!(assessment.final_score <= 0.01);
        assert_eq!(assessment.outcome, Outcome::Safe);
        assert_eq!(assessment.sentiment_label, Some(SentimentLabel::Positive));
    }

    #[test]
    fn test_insult_blocked() {
        let assessment = pipeline().evaluate("You are so stupid and ugly").unwrap();

        assert!(assessment.boost > 0.0);
        assert_eq!(assessment.outcome, Outcome::Blocked);
        assert_eq!(assessment.sentiment_label, Some(SentimentLabel::Negative));
    }

    #[test]
    fn test_empty_input_rejected() {
        let pipeline = pipeline();

        for input in ["", "   ", "!!! 123 😀"] {
            let err = pipeline.evaluate(input).unwrap_err();
            assert!(matches!(err, Error::InvalidInput(_)), "{input:?}");
        }

        let verdict = pipeline.moderate("");
        assert!(verdict.is_rejected());
        assert_eq!(verdict.outcome(), None);
    }

    #[test]
    fn test_boost_is_clamped() {
        // ml score of exactly 0.9 for any text
        let bias = (0.9f64 / 0.1).ln();
        let pipeline = ModerationPipeline::builder(model(vec![0.0; 4], bias))
            .sentiment(Box::new(KeywordSentiment::new().unwrap()))
            .policy(DecisionPolicy::coarse())
            .build()
            .unwrap();

        let assessment = pipeline.evaluate("stupid").unwrap();
        assert!((assessment.ml_score - 0.9).abs() < 1e-9);
        assert!((assessment.boost - 0.25).abs() < 1e-12);
        assert_eq!(assessment.final_score, 1.0);
        assert_eq!(assessment.outcome, Outcome::Blocked);
    }

    #[test]
    fn test_disabled_sentiment_has_no_boost() {
        let pipeline = ModerationPipeline::builder(model(vec![-8.0, -8.0, 8.0, 8.0], -3.0))
            .build()
            .unwrap();

        let assessment = pipeline.evaluate("stupid ugly").unwrap();
        assert_eq!(assessment.boost, 0.0);
        assert_eq!(assessment.sentiment_label, None);
        assert!((assessment.final_score - assessment.ml_score).abs() < 1e-12);
        assert_eq!(pipeline.sentiment_name(), None);
    }

    #[test]
    fn test_negative_boost_factor_rejected() {
        let result = ModerationPipeline::builder(model(vec![0.0; 4], 0.0))
            .boost_factor(-1.0)
            .build();
        assert!(result.is_err());
    }
}
