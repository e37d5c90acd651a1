//! CommentGuard Classifiers
//!
//! Everything between a raw comment and a moderation outcome:
//!
//! - [`normalizer`]: lowercasing, URL/emoji/punctuation stripping, stopword
//!   removal and noun lemmatization
//! - [`vectorizer`]: TF-IDF over word 1-3 grams with a frozen vocabulary
//! - [`scorer`] and [`toxicity`]: linear models turning features into a score
//! - [`sentiment`]: polarity scoring for the aggression boost
//! - [`pipeline`]: the stages wired together behind one call
//! - [`training`] and [`dataset`]: offline fitting and model selection
//!
//! Every stage is synchronous and stateless per request; a pipeline is
//! shared read-only across threads after loading.

pub mod config;
pub mod dataset;
pub mod lemmatizer;
pub mod model_loader;
pub mod normalizer;
pub mod pipeline;
pub mod scorer;
pub mod sentiment;
pub mod toxicity;
pub mod training;
pub mod vectorizer;

pub use config::{PipelineConfig, SentimentConfig};
pub use dataset::{load_csv, load_dataset, load_jsonl, read_csv, read_jsonl, LabeledComment};
pub use lemmatizer::Lemmatizer;
pub use model_loader::{
    load_model, load_vectorizer, save_model, save_vectorizer, ArtifactPaths, LoadedArtifacts,
};
pub use normalizer::Normalizer;
pub use pipeline::{ModerationPipeline, PipelineBuilder};
pub use scorer::{
    LabelScorer, LinearModel, MarginScorer, ModelArtifact, ProbabilisticScorer, Scorer,
    ScorerKind,
};
pub use sentiment::{
    aggression_boost, KeywordSentiment, LexiconSentiment, PolarityScorer, SentimentStrategy,
};
pub use toxicity::ToxicityModel;
pub use training::{
    stratified_split, train_and_select, Candidate, Metrics, TrainedModel, TrainingConfig,
    TrainingReport,
};
pub use vectorizer::{TfidfVectorizer, VectorizerParams, VectorizerState};

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::config::PipelineConfig;
    pub use crate::normalizer::Normalizer;
    pub use crate::pipeline::ModerationPipeline;
    pub use crate::scorer::{Scorer, ScorerKind};
    pub use crate::sentiment::{PolarityScorer, SentimentStrategy};
    pub use crate::toxicity::ToxicityModel;
    pub use crate::vectorizer::{TfidfVectorizer, VectorizerState};
}
