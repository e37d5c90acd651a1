//! Shared service state and per-comment moderation

use anyhow::Result;
use commentguard_classifiers::ModerationPipeline;
use commentguard_core::Assessment;
use metrics_exporter_prometheus::PrometheusHandle;
use parking_lot::Mutex;
use std::sync::Arc;
use tracing::{debug, error, info, warn};

use crate::config::ServiceConfig;
use crate::feed::{CommentFeed, FeedUpdate};

/// Application state shared across all requests
#[derive(Clone)]
pub struct AppState {
    /// Loaded configuration
    pub config: Arc<ServiceConfig>,

    /// Read-only moderation pipeline
    pub pipeline: Arc<ModerationPipeline>,

    /// Live feed of accepted comments
    pub feed: Arc<Mutex<CommentFeed>>,

    /// Prometheus metrics handle for rendering
    pub metrics_handle: PrometheusHandle,
}

impl AppState {
    /// Initialize application state from configuration
    pub fn new(config: ServiceConfig, metrics_handle: PrometheusHandle) -> Result<Self> {
        info!("Initializing application state");

        let pipeline = ModerationPipeline::from_config(&config.pipeline)?;
        info!(
            policy = pipeline.policy().name(),
            sentiment = pipeline.sentiment_name().unwrap_or("disabled"),
            scorer = %pipeline.model().scorer_kind(),
            vocabulary = pipeline.model().vocabulary_size(),
            "Moderation pipeline ready"
        );

        Ok(Self::with_pipeline(config, pipeline, metrics_handle))
    }

    /// State around an already-built pipeline
    pub fn with_pipeline(
        config: ServiceConfig,
        pipeline: ModerationPipeline,
        metrics_handle: PrometheusHandle,
    ) -> Self {
        let feed = CommentFeed::new(config.server.feed_capacity);
        Self {
            config: Arc::new(config),
            pipeline: Arc::new(pipeline),
            feed: Arc::new(Mutex::new(feed)),
            metrics_handle,
        }
    }
}

/// Result of moderating one submitted comment
#[derive(Debug, Clone)]
pub struct ModerationResult {
    pub assessment: Assessment,
    pub feed: FeedUpdate,
}

/// Evaluate a comment, record metrics and update the feed
pub fn moderate_comment(state: &AppState, text: &str) -> commentguard_core::Result<ModerationResult> {
    metrics::counter!("commentguard_requests_total").increment(1);

    let assessment = match state.pipeline.evaluate(text) {
        Ok(assessment) => assessment,
        Err(err) => {
            metrics::counter!("commentguard_rejections_total", "kind" => err.kind()).increment(1);
            if err.is_fatal() {
                error!(error = %err, kind = err.kind(), "Comment evaluation failed");
            } else {
                warn!(error = %err, "Comment rejected");
            }
            return Err(err);
        }
    };

    metrics::histogram!("commentguard_pipeline_latency_us").record(assessment.latency_us as f64);
    metrics::counter!("commentguard_outcomes_total", "outcome" => assessment.outcome.as_str())
        .increment(1);

    let feed = state.feed.lock().record(text, &assessment);

    debug!(
        outcome = %assessment.outcome,
        score = assessment.final_score,
        posted = feed.is_posted(),
        latency_us = assessment.latency_us,
        "Comment moderated"
    );

    Ok(ModerationResult { assessment, feed })
}
