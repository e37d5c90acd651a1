//! CommentGuard Server
//!
//! HTTP moderation service around the comment pipeline. Submitted comments
//! are scored, accepted ones are appended to a bounded live feed, and
//! blocked ones only increment a warnings counter.

pub mod config;
pub mod feed;
pub mod routes;
pub mod service;

pub use config::{ConfigOverrides, ServerConfig, ServiceConfig};
pub use feed::{CommentFeed, FeedEntry, FeedUpdate};
pub use routes::{create_router, AppError};
pub use service::{moderate_comment, AppState, ModerationResult};
