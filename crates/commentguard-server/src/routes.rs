//! HTTP routes and handlers

use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use commentguard_classifiers::ScorerKind;
use commentguard_core::{Assessment, Error, Outcome};
use commentguard_policy::Band;
use serde::{Deserialize, Serialize};
use serde_json::json;
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::trace::TraceLayer;

use crate::feed::{FeedEntry, FeedUpdate};
use crate::service::{self, AppState};

pub fn create_router(state: AppState) -> Router {
    let body_limit = state.config.server.max_body_bytes;

    Router::new()
        .route("/health", get(health_check))
        .route("/metrics", get(metrics))
        .route("/v1/moderate", post(moderate))
        .route("/v1/feed", get(feed))
        .route("/v1/policy", get(policy))
        .fallback(fallback)
        .layer(RequestBodyLimitLayer::new(body_limit))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn health_check() -> &'static str {
    "OK"
}

async fn metrics(State(state): State<AppState>) -> String {
    state.metrics_handle.render()
}

/// Comment submission
#[derive(Debug, Serialize, Deserialize)]
pub struct ModerateRequest {
    pub text: String,
}

/// Moderation result returned to the client
#[derive(Debug, Serialize)]
pub struct ModerateResponse {
    #[serde(flatten)]
    pub assessment: Assessment,

    /// Short user-facing message for the outcome
    pub notice: &'static str,

    /// Score as a whole percentage for the meter
    pub percent: u8,

    #[serde(flatten)]
    pub feed: FeedUpdate,
}

async fn moderate(
    State(state): State<AppState>,
    payload: Result<Json<ModerateRequest>, JsonRejection>,
) -> Result<Json<ModerateResponse>, AppError> {
    let Json(request) = payload?;

    let result = service::moderate_comment(&state, &request.text)?;
    let assessment = result.assessment;

    Ok(Json(ModerateResponse {
        notice: assessment.outcome.notice(),
        percent: assessment.percent(),
        assessment,
        feed: result.feed,
    }))
}

#[derive(Debug, Serialize)]
struct FeedResponse {
    comments: Vec<FeedEntry>,
    warnings: u64,
    capacity: usize,
}

async fn feed(State(state): State<AppState>) -> Json<FeedResponse> {
    let feed = state.feed.lock();
    Json(FeedResponse {
        comments: feed.entries().cloned().collect(),
        warnings: feed.warnings(),
        capacity: feed.capacity(),
    })
}

#[derive(Debug, Serialize)]
struct PolicyResponse<'a> {
    name: &'a str,
    bands: &'a [Band],
    fallback: Outcome,
    sentiment: Option<&'a str>,
    boost_factor: f64,
    scorer: ScorerKind,
    vocabulary_size: usize,
}

async fn policy(State(state): State<AppState>) -> Response {
    let pipeline = &state.pipeline;
    Json(PolicyResponse {
        name: pipeline.policy().name(),
        bands: pipeline.policy().bands(),
        fallback: pipeline.policy().fallback(),
        sentiment: pipeline.sentiment_name(),
        boost_factor: pipeline.boost_factor(),
        scorer: pipeline.model().scorer_kind(),
        vocabulary_size: pipeline.model().vocabulary_size(),
    })
    .into_response()
}

async fn fallback() -> (StatusCode, &'static str) {
    (StatusCode::NOT_FOUND, "Not found")
}

/// Error handling
#[derive(Debug)]
pub enum AppError {
    /// Malformed or non-string request body, reported as invalid input
    InvalidRequest(String),
    /// Request body over the configured limit
    PayloadTooLarge,
    /// Comment could not be evaluated; never treated as safe
    Rejected { kind: &'static str, reason: String },
    InternalError(String),
}

impl From<Error> for AppError {
    fn from(err: Error) -> Self {
        if err.is_fatal() {
            AppError::InternalError(err.to_string())
        } else {
            AppError::Rejected {
                kind: err.kind(),
                reason: err.to_string(),
            }
        }
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        if rejection.status() == StatusCode::PAYLOAD_TOO_LARGE {
            AppError::PayloadTooLarge
        } else {
            AppError::InvalidRequest(rejection.body_text())
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, kind, message) = match self {
            AppError::InvalidRequest(msg) => (StatusCode::BAD_REQUEST, "invalid_input", msg),
            AppError::PayloadTooLarge => (
                StatusCode::PAYLOAD_TOO_LARGE,
                "payload_too_large",
                "comment body too large".to_string(),
            ),
            AppError::Rejected { kind, reason } => (StatusCode::UNPROCESSABLE_ENTITY, kind, reason),
            AppError::InternalError(msg) => {
                (StatusCode::INTERNAL_SERVER_ERROR, "internal", msg)
            }
        };

        let body = json!({
            "status": "rejected",
            "error": {
                "kind": kind,
                "message": message,
            }
        });

        (status, Json(body)).into_response()
    }
}
