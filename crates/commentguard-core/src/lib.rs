//! CommentGuard Core
//!
//! Types and errors shared by the moderation pipeline crates.
//!
//! This crate provides:
//! - The error taxonomy and `Result` alias
//! - Pipeline data types: normalized text, sparse feature vectors,
//!   outcomes, and the per-comment verdict

pub mod error;
pub mod types;

pub use error::{Error, Result};
pub use types::{Assessment, FeatureVector, NormalizedText, Outcome, SentimentLabel, Verdict};

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::error::{Error, Result};
    pub use crate::types::{
        Assessment, FeatureVector, NormalizedText, Outcome, SentimentLabel, Verdict,
    };
}
