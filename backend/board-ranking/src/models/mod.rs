use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use uuid::Uuid;

pub type PostId = Uuid;
pub type CommentId = Uuid;

/// Post row as exposed by the storage layer
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Post {
    pub id: PostId,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Vote {
    pub post_id: PostId,
    pub value: i32,
}

/// Where a comment hangs in the reply tree: directly under a post, or under another comment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CommentParent {
    Post(PostId),
    Comment(CommentId),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Comment {
    pub id: CommentId,
    pub parent: CommentParent,
}

/// Vote tally for a single post
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VoteAggregates {
    pub sum: i64,
    pub count: u64,
    /// Votes whose value is exactly +1
    pub positive_count: u64,
}

impl VoteAggregates {
    /// Net tally clamped at zero, as shown next to a post
    pub fn vote_total(&self) -> i64 {
        self.sum.max(0)
    }
}

/// A post together with everything the scoring functions read
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PostSnapshot {
    pub id: PostId,
    pub created_at: DateTime<Utc>,
    pub votes: VoteAggregates,
    pub descendant_count: u64,
}

impl PostSnapshot {
    pub fn new(post: Post, votes: VoteAggregates, descendant_count: u64) -> Self {
        Self {
            id: post.id,
            created_at: post.created_at,
            votes,
            descendant_count,
        }
    }

    /// Votes plus replies, regardless of sentiment
    pub fn engagement(&self) -> u64 {
        self.votes.count.saturating_add(self.descendant_count)
    }
}

/// Output of a scoring function
///
/// Freshness sorts on the raw creation time; every other algorithm yields a real number.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum Score {
    Real(f64),
    Timestamp(DateTime<Utc>),
}

#[cfg(test)]
impl Score {
    pub(crate) fn as_f64(&self) -> Option<f64> {
        match self {
            Score::Real(value) => Some(*value),
            Score::Timestamp(_) => None,
        }
    }
}

impl Ord for Score {
    fn cmp(&self, other: &Self) -> Ordering {
        match (self, other) {
            (Score::Real(a), Score::Real(b)) => a.total_cmp(b),
            (Score::Timestamp(a), Score::Timestamp(b)) => a.cmp(b),
            // Never mixed within one ranking
            (Score::Real(_), Score::Timestamp(_)) => Ordering::Less,
            (Score::Timestamp(_), Score::Real(_)) => Ordering::Greater,
        }
    }
}

impl PartialOrd for Score {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for Score {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Score {}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankedPost {
    pub post_id: PostId,
    /// 1-based position in the ranking
    pub rank: usize,
    pub score: Score,
}
