//! Live comment feed
//!
//! Accepted comments (safe or warned) are appended to a bounded FIFO;
//! blocked comments never reach it and only bump the warnings counter.

use chrono::{DateTime, Utc};
use commentguard_core::{Assessment, Outcome};
use serde::Serialize;
use std::collections::VecDeque;
use uuid::Uuid;

/// One comment shown in the feed
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FeedEntry {
    pub id: Uuid,
    pub text: String,
    pub outcome: Outcome,
    pub final_score: f64,
    pub posted_at: DateTime<Utc>,
}

/// What happened to a submitted comment
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "feed", rename_all = "snake_case")]
pub enum FeedUpdate {
    Posted { id: Uuid },
    Withheld { warnings: u64 },
}

impl FeedUpdate {
    pub fn is_posted(&self) -> bool {
        matches!(self, Self::Posted { .. })
    }
}

/// Bounded feed of accepted comments plus a blocked-comment counter
#[derive(Debug)]
pub struct CommentFeed {
    entries: VecDeque<FeedEntry>,
    capacity: usize,
    warnings: u64,
}

impl CommentFeed {
    pub fn new(capacity: usize) -> Self {
        Self {
            entries: VecDeque::with_capacity(capacity.min(1024)),
            capacity,
            warnings: 0,
        }
    }

    /// Record an evaluated comment
    pub fn record(&mut self, text: &str, assessment: &Assessment) -> FeedUpdate {
        if assessment.outcome == Outcome::Blocked {
            self.warnings += 1;
            return FeedUpdate::Withheld {
                warnings: self.warnings,
            };
        }

        let entry = FeedEntry {
            id: Uuid::new_v4(),
            text: text.to_string(),
            outcome: assessment.outcome,
            final_score: assessment.final_score,
            posted_at: Utc::now(),
        };
        let id = entry.id;

        if self.capacity > 0 {
            while self.entries.len() >= self.capacity {
                self.entries.pop_front();
            }
            self.entries.push_back(entry);
        }

        FeedUpdate::Posted { id }
    }

    /// Entries oldest first
    pub fn entries(&self) -> impl Iterator<Item = &FeedEntry> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn warnings(&self) -> u64 {
        self.warnings
    }
}
