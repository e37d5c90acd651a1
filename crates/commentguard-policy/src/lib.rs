//! CommentGuard Policy
//!
//! Maps a combined toxicity score onto moderation outcomes.
//!
//! A policy is an ordered list of threshold bands evaluated low to high;
//! the first band containing the score decides, and anything above the last
//! band is blocked. Thresholds are configuration, selected by preset name
//! (`live_stream`, `coarse`) or listed explicitly in YAML.

pub mod band;
pub mod config;
pub mod policy;

pub use band::Band;
pub use config::PolicyConfig;
pub use policy::{combine, Decision, DecisionPolicy, PolicyPreset};

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::band::Band;
    pub use crate::config::PolicyConfig;
    pub use crate::policy::{Decision, DecisionPolicy, PolicyPreset};
}
