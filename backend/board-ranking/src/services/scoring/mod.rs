// ============================================
// Scoring Functions
// ============================================
//
// Four independent, pure scores over a post snapshot:
// - hotness:     log-scaled net votes plus a signed linear age term
// - freshness:   the creation timestamp itself
// - controversy: log-scaled votes + replies with a damped age term
// - momentum:    Laplace-smoothed upvote ratio, used by the rising feed
//
// Age is measured in seconds from a fixed board epoch and may be negative;
// every score stays finite for any representable timestamp.

use crate::models::{PostSnapshot, Score};
use crate::utils::{log10_at_least_one, seconds_since, sign};
use chrono::{DateTime, Duration, Utc};

/// 2005-12-08T00:00:00Z, the instant post age is measured from
pub const EPOCH_UNIX_SECONDS: i64 = 1_134_000_000;

/// Divisor turning age seconds into score units
pub const TIME_NORMALIZER: f64 = 45_000.0;

/// Damping applied to the age term of the controversy score
pub const SOFT_TIME_WEIGHT: f64 = 0.2;

/// Posts older than this drop out of the rising feed
pub const RISING_WINDOW_HOURS: i64 = 12;

/// Seconds between the board epoch and the post's creation
pub fn age_seconds(post: &PostSnapshot) -> f64 {
    seconds_since(post.created_at, EPOCH_UNIX_SECONDS)
}

pub fn hotness(post: &PostSnapshot) -> f64 {
    let sum = post.votes.sum;
    log10_at_least_one(sum) + sign(sum) * age_seconds(post) / TIME_NORMALIZER
}

pub fn freshness(post: &PostSnapshot) -> DateTime<Utc> {
    post.created_at
}

pub fn controversy(post: &PostSnapshot) -> f64 {
    let engagement = i64::try_from(post.engagement()).unwrap_or(i64::MAX);
    log10_at_least_one(engagement)
        + SOFT_TIME_WEIGHT * sign(engagement) * age_seconds(post) / TIME_NORMALIZER
}

/// (positive + 1) / (count + 1); a post without votes scores exactly 1
pub fn momentum(post: &PostSnapshot) -> f64 {
    (post.votes.positive_count as f64 + 1.0) / (post.votes.count as f64 + 1.0)
}

pub fn expired_for_rising(post: &PostSnapshot, now: DateTime<Utc>) -> bool {
    now.signed_duration_since(post.created_at) > Duration::hours(RISING_WINDOW_HOURS)
}

/// Convenience wrappers producing a [`Score`]
pub fn hotness_score(post: &PostSnapshot) -> Score {
    Score::Real(hotness(post))
}

pub fn freshness_score(post: &PostSnapshot) -> Score {
    Score::Timestamp(freshness(post))
}

pub fn controversy_score(post: &PostSnapshot) -> Score {
    Score::Real(controversy(post))
}

pub fn momentum_score(post: &PostSnapshot) -> Score {
    Score::Real(momentum(post))
}
