/// Ranking Module
///
/// Orders board posts under one of the competing feed algorithms.
///
/// # Architecture
/// - **Engine**: pure, synchronous scoring and sorting over `PostSnapshot`s
/// - **Service**: fetches aggregates from a `PostStore` concurrently, under a
///   deadline and an optional cancellation signal, then hands off to the engine
///
/// # Algorithms
/// - `default`: hotness, descending
/// - `fresh`: creation time, newest first
/// - `controversial`: controversy, descending
/// - `rising`: posts younger than 12h, by momentum descending
///
/// Equal scores are ordered by ascending post id so every ranking is reproducible.
pub mod engine;
pub mod service;

pub use engine::{rank, ranked_by, score, top};
pub use service::{CancelSignal, FetchOptions, RankingService};

use crate::models::PostId;
use crate::services::store::StoreError;
use std::fmt;
use std::str::FromStr;
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Algorithm {
    Default,
    Fresh,
    Controversial,
    Rising,
}

impl Algorithm {
    pub const ALL: [Algorithm; 4] = [
        Algorithm::Default,
        Algorithm::Fresh,
        Algorithm::Controversial,
        Algorithm::Rising,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Algorithm::Default => "default",
            Algorithm::Fresh => "fresh",
            Algorithm::Controversial => "controversial",
            Algorithm::Rising => "rising",
        }
    }
}

impl fmt::Display for Algorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Algorithm {
    type Err = RankingError;

    fn from_str(s: &str) -> Result<Self> {
        let token = s.trim();
        Algorithm::ALL
            .into_iter()
            .find(|algorithm| algorithm.as_str().eq_ignore_ascii_case(token))
            .ok_or_else(|| RankingError::UnknownAlgorithm(token.to_string()))
    }
}

#[derive(Debug, Error)]
pub enum RankingError {
    #[error("Unknown ranking algorithm: {0:?}")]
    UnknownAlgorithm(String),

    #[error("Post {post_id} is not part of the {algorithm} ranking")]
    PostNotRanked { post_id: PostId, algorithm: Algorithm },

    #[error("Aggregate fetch failed: {0}")]
    Store(#[from] StoreError),

    #[error("Aggregate fetch exceeded deadline of {0:?}")]
    DeadlineExceeded(Duration),

    #[error("Ranking cancelled")]
    Cancelled,
}

pub type Result<T> = std::result::Result<T, RankingError>;
