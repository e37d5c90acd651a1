//! Integration tests for the CommentGuard HTTP service

use axum::body::{to_bytes, Body};
use axum::http::{header, Request, StatusCode};
use axum::Router;
use commentguard_classifiers::{
    LexiconSentiment, LinearModel, ModerationPipeline, ProbabilisticScorer, ToxicityModel,
    VectorizerParams, VectorizerState,
};
use commentguard_core::NormalizedText;
use commentguard_policy::DecisionPolicy;
use commentguard_server::{create_router, AppState, ServiceConfig};
use metrics_exporter_prometheus::PrometheusBuilder;
use serde_json::{json, Value};
use tower::ServiceExt;

fn pipeline() -> ModerationPipeline {
    let corpus: Vec<NormalizedText> = ["stupid ugly loser", "great stream today", "nice play"]
        .iter()
        .map(|t| NormalizedText::new(*t).unwrap())
        .collect();
    let params = VectorizerParams {
        ngram_max: 1,
        min_df: 1,
        max_df: 1.0,
        ..Default::default()
    };
    let vectorizer = VectorizerState::fit(&corpus, params).unwrap();

    // vocabulary: great loser nice play stream stupid today ugly
    let weights = vectorizer
        .vocabulary
        .keys()
        .map(|term| match term.as_str() {
            "stupid" | "ugly" | "loser" => 8.0,
            _ => -8.0,
        })
        .collect();
    let scorer = ProbabilisticScorer::new(LinearModel::new(weights, -4.0));
    let model = ToxicityModel::new(vectorizer, Box::new(scorer)).unwrap();

    ModerationPipeline::builder(model)
        .sentiment(Box::new(LexiconSentiment::new()))
        .policy(DecisionPolicy::live_stream())
        .build()
        .unwrap()
}

fn app_with(config: ServiceConfig) -> Router {
    let handle = PrometheusBuilder::new().build_recorder().handle();
    create_router(AppState::with_pipeline(config, pipeline(), handle))
}

fn app() -> Router {
    app_with(ServiceConfig::default())
}

async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, body)
}

fn post_comment(text: &str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/v1/moderate")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(json!({ "text": text }).to_string()))
        .unwrap()
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

#[tokio::test]
async fn test_health_endpoint() {
    let response = app().oneshot(get("/health")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    assert_eq!(&bytes[..], b"OK");
}

#[tokio::test]
async fn test_metrics_endpoint() {
    let response = app().oneshot(get("/metrics")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_safe_comment_posted() {
    let app = app();
    let (status, body) = send(&app, post_comment("Great stream today!")).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["outcome"], "safe");
    assert_eq!(body["notice"], "Posted");
    assert_eq!(body["feed"], "posted");
    assert_eq!(body["normalized_text"], "great stream today");
    assert_eq!(body["percent"], 0);

    let (_, feed) = send(&app, get("/v1/feed")).await;
    assert_eq!(feed["comments"].as_array().unwrap().len(), 1);
    assert_eq!(feed["comments"][0]["text"], "Great stream today!");
    assert_eq!(feed["warnings"], 0);
}

#[tokio::test]
async fn test_insult_blocked_and_withheld() {
    let app = app();
    let (status, body) = send(&app, post_comment("You are so stupid and ugly")).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["outcome"], "blocked");
    assert_eq!(body["notice"], "Harmful message blocked");
    assert_eq!(body["feed"], "withheld");
    assert_eq!(body["warnings"], 1);

    let (_, feed) = send(&app, get("/v1/feed")).await;
    assert!(feed["comments"].as_array().unwrap().is_empty());
    assert_eq!(feed["warnings"], 1);
}

#[tokio::test]
async fn test_empty_comment_rejected() {
    let app = app();
    let (status, body) = send(&app, post_comment("   ")).await;

    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["status"], "rejected");
    assert_eq!(body["error"]["kind"], "invalid_input");

    let (_, feed) = send(&app, get("/v1/feed")).await;
    assert!(feed["comments"].as_array().unwrap().is_empty());
    assert_eq!(feed["warnings"], 0);
}

#[tokio::test]
async fn test_malformed_body_is_bad_request() {
    let request = Request::builder()
        .method("POST")
        .uri("/v1/moderate")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from("{\"comment\": 1}"))
        .unwrap();

    let (status, body) = send(&app(), request).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["kind"], "invalid_input");
}

#[tokio::test]
async fn test_non_string_text_is_invalid_input() {
    let request = Request::builder()
        .method("POST")
        .uri("/v1/moderate")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from("{\"text\": 42}"))
        .unwrap();

    let (status, body) = send(&app(), request).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["kind"], "invalid_input");
}

#[tokio::test]
async fn test_oversized_body_refused() {
    let mut config = ServiceConfig::default();
    config.server.max_body_bytes = 64;
    let app = app_with(config);

    let (status, _) = send(&app, post_comment(&"nice ".repeat(100))).await;
    assert_eq!(status, StatusCode::PAYLOAD_TOO_LARGE);
}

#[tokio::test]
async fn test_feed_capacity_from_config() {
    let mut config = ServiceConfig::default();
    config.server.feed_capacity = 2;
    let app = app_with(config);

    for text in ["nice play", "great stream", "nice stream today"] {
        let (status, _) = send(&app, post_comment(text)).await;
        assert_eq!(status, StatusCode::OK);
    }

    let (_, feed) = send(&app, get("/v1/feed")).await;
    let texts: Vec<&str> = feed["comments"]
        .as_array()
        .unwrap()
        .iter()
        .map(|c| c["text"].as_str().unwrap())
        .collect();
    assert_eq!(texts, vec!["great stream", "nice stream today"]);
    assert_eq!(feed["capacity"], 2);
}

#[tokio::test]
async fn test_policy_endpoint() {
    let (status, body) = send(&app(), get("/v1/policy")).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["name"], "live_stream");
    assert_eq!(body["bands"].as_array().unwrap().len(), 2);
    assert_eq!(body["fallback"], "blocked");
    assert_eq!(body["sentiment"], "lexicon");
    assert_eq!(body["scorer"], "probabilistic");
    assert_eq!(body["vocabulary_size"], 8);
}

#[tokio::test]
async fn test_unknown_route() {
    let response = app().oneshot(get("/v1/nope")).await.unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}
