use super::{Algorithm, RankingError, Result};
use crate::models::{PostId, PostSnapshot, RankedPost, Score};
use crate::services::scoring;
use chrono::{DateTime, Utc};
use tracing::debug;

/// Score a single post under `algorithm`.
///
/// Scores depend only on the snapshot; `now` drives the rising pre-filter in [`ranked_by`].
pub fn score(algorithm: Algorithm, post: &PostSnapshot, _now: DateTime<Utc>) -> Score {
    match algorithm {
        Algorithm::Default => scoring::hotness_score(post),
        Algorithm::Fresh => scoring::freshness_score(post),
        Algorithm::Controversial => scoring::controversy_score(post),
        Algorithm::Rising => scoring::momentum_score(post),
    }
}

/// Whether `post` takes part in the `algorithm` ranking at all
fn eligible(algorithm: Algorithm, post: &PostSnapshot, now: DateTime<Utc>) -> bool {
    match algorithm {
        Algorithm::Rising => !scoring::expired_for_rising(post, now),
        Algorithm::Default | Algorithm::Fresh | Algorithm::Controversial => true,
    }
}

/// Order `posts` under `algorithm`, best first
pub fn ranked_by(
    algorithm: Algorithm,
    posts: &[PostSnapshot],
    now: DateTime<Utc>,
) -> Vec<RankedPost> {
    let mut scored: Vec<(PostId, Score)> = posts
        .iter()
        .filter(|post| eligible(algorithm, post, now))
        .map(|post| (post.id, score(algorithm, post, now)))
        .collect();

    // Score descending, then post id ascending for equal scores
    scored.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));

    debug!(
        algorithm = %algorithm,
        input_count = posts.len(),
        ranked_count = scored.len(),
        top_score = ?scored.first().map(|(_, s)| *s),
        "Posts ranked"
    );

    scored
        .into_iter()
        .enumerate()
        .map(|(i, (post_id, score))| RankedPost {
            post_id,
            rank: i + 1,
            score,
        })
        .collect()
}

/// First `limit` entries of [`ranked_by`]
pub fn top(
    algorithm: Algorithm,
    posts: &[PostSnapshot],
    now: DateTime<Utc>,
    limit: usize,
) -> Vec<RankedPost> {
    let mut ranked = ranked_by(algorithm, posts, now);
    ranked.truncate(limit);
    ranked
}

/// 1-based position of `post_id` in the `algorithm` ranking
pub fn rank(
    algorithm: Algorithm,
    posts: &[PostSnapshot],
    post_id: PostId,
    now: DateTime<Utc>,
) -> Result<usize> {
    ranked_by(algorithm, posts, now)
        .into_iter()
        .find(|ranked| ranked.post_id == post_id)
        .map(|ranked| ranked.rank)
        .ok_or(RankingError::PostNotRanked { post_id, algorithm })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::VoteAggregates;
    use crate::services::aggregation::aggregate_votes;
    use crate::services::scoring::EPOCH_UNIX_SECONDS;
    use chrono::Duration;
    use uuid::Uuid;

    fn now() -> DateTime<Utc> {
        DateTime::from_timestamp(1_700_000_000, 0).unwrap()
    }

    fn post(id: u128, age_hours: i64, votes: Vec<i32>, descendants: u64) -> PostSnapshot {
        PostSnapshot {
            id: Uuid::from_u128(id),
            created_at: now() - Duration::hours(age_hours),
            votes: aggregate_votes(votes),
            descendant_count: descendants,
        }
    }

    fn ids(ranked: &[RankedPost]) -> Vec<u128> {
        ranked.iter().map(|r| r.post_id.as_u128()).collect()
    }

    fn board() -> Vec<PostSnapshot> {
        vec![
            post(1, 30, vec![1, 1, 1, 1, 1], 2),
            post(2, 2, vec![1, -1], 12),
            post(3, 1, vec![], 0),
            post(4, 5, vec![-1, -1, -1], 0),
            post(5, 48, vec![1; 40], 0),
        ]
    }

    #[test]
    fn test_default_ranks_by_hotness() {
        let posts = board();
        let ranked = ranked_by(Algorithm::Default, &posts, now());

        assert_eq!(ranked.len(), posts.len());
        for pair in ranked.windows(2) {
            assert!(pair[0].score >= pair[1].score);
        }
        // Negative net votes flip the age term and sink to the bottom
        assert_eq!(ranked.last().unwrap().post_id, Uuid::from_u128(4));
        assert_eq!(ranked[0].rank, 1);
    }

    #[test]
    fn test_fresh_is_newest_first_and_order_independent() {
        let posts = board();
        let ranked = ranked_by(Algorithm::Fresh, &posts, now());
        assert_eq!(ids(&ranked), vec![3, 2, 4, 1, 5]);

        let mut reversed = posts.clone();
        reversed.reverse();
        assert_eq!(ranked_by(Algorithm::Fresh, &reversed, now()), ranked);
    }

    #[test]
    fn test_controversial_prefers_engagement() {
        let posts = vec![
            post(1, 3, vec![1, -1, 1, -1], 20),
            post(2, 3, vec![1], 0),
            post(3, 3, vec![], 0),
        ];
        let ranked = ranked_by(Algorithm::Controversial, &posts, now());
        assert_eq!(ids(&ranked), vec![1, 2, 3]);
    }

    #[test]
    fn test_rising_filters_expired_posts() {
        let posts = board();
        let ranked = ranked_by(Algorithm::Rising, &posts, now());
        let cutoff = now() - Duration::hours(12);

        for entry in &ranked {
            let source = posts.iter().find(|p| p.id == entry.post_id).unwrap();
            assert!(source.created_at >= cutoff);
        }
        // Post 3 has no votes and therefore maximal momentum
        assert_eq!(ids(&ranked), vec![3, 2, 4]);
        assert_eq!(ranked[0].score, Score::Real(1.0));
    }

    #[test]
    fn test_rising_boundary_is_inclusive() {
        let exactly_twelve = post(1, 12, vec![], 0);
        let ranked = ranked_by(Algorithm::Rising, &[exactly_twelve], now());
        assert_eq!(ranked.len(), 1);
    }

    #[test]
    fn test_future_dated_post_stays_rising() {
        let posts = vec![
            post(1, 48, vec![1, 1], 0),
            post(2, -24 * 3_650, vec![-1, -1, -1, -1], 0),
            post(3, 1, vec![], 0),
        ];

        let ranked = ranked_by(Algorithm::Rising, &posts, now());
        assert_eq!(ids(&ranked), vec![3, 2]);
        assert_eq!(ranked[1].score, Score::Real(0.2));

        // Newest of all under fresh
        assert_eq!(rank(Algorithm::Fresh, &posts, Uuid::from_u128(2), now()).unwrap(), 1);
        for entry in ranked_by(Algorithm::Default, &posts, now()) {
            assert!(entry.score.as_f64().unwrap().is_finite());
        }
    }

    #[test]
    fn test_ties_break_by_ascending_id() {
        let posts = vec![post(9, 1, vec![], 0), post(2, 1, vec![], 0), post(5, 1, vec![], 0)];
        for algorithm in Algorithm::ALL {
            assert_eq!(ids(&ranked_by(algorithm, &posts, now())), vec![2, 5, 9]);
        }
    }

    #[test]
    fn test_ranking_is_deterministic() {
        let posts = board();
        for algorithm in Algorithm::ALL {
            assert_eq!(
                ranked_by(algorithm, &posts, now()),
                ranked_by(algorithm, &posts, now())
            );
        }
    }

    #[test]
    fn test_rank_positions() {
        let posts = board();
        for algorithm in Algorithm::ALL {
            let ranked = ranked_by(algorithm, &posts, now());
            let first = ranked[0].post_id;
            assert_eq!(rank(algorithm, &posts, first, now()).unwrap(), 1);
            for entry in &ranked {
                assert_eq!(rank(algorithm, &posts, entry.post_id, now()).unwrap(), entry.rank);
            }
        }
    }

    #[test]
    fn test_rank_not_found_for_filtered_post() {
        let posts = board();
        let expired = Uuid::from_u128(5);

        let err = rank(Algorithm::Rising, &posts, expired, now()).unwrap_err();
        assert!(matches!(
            err,
            RankingError::PostNotRanked { post_id, algorithm: Algorithm::Rising } if post_id == expired
        ));

        // Still ranked everywhere else
        assert!(rank(Algorithm::Default, &posts, expired, now()).is_ok());
    }

    #[test]
    fn test_rank_unknown_post() {
        let result = rank(Algorithm::Fresh, &board(), Uuid::from_u128(77), now());
        assert!(matches!(result, Err(RankingError::PostNotRanked { .. })));
    }

    #[test]
    fn test_top_truncates() {
        let posts = board();
        let top2 = top(Algorithm::Fresh, &posts, now(), 2);
        assert_eq!(ids(&top2), vec![3, 2]);
        assert_eq!(top(Algorithm::Fresh, &posts, now(), 100).len(), posts.len());
    }

    #[test]
    fn test_empty_board() {
        for algorithm in Algorithm::ALL {
            assert!(ranked_by(algorithm, &[], now()).is_empty());
        }
    }

    #[test]
    fn test_score_dispatch() {
        let created = DateTime::from_timestamp(EPOCH_UNIX_SECONDS, 0).unwrap() + Duration::hours(1);
        let p = PostSnapshot {
            id: Uuid::from_u128(1),
            created_at: created,
            votes: VoteAggregates {
                sum: 1,
                count: 3,
                positive_count: 2,
            },
            descendant_count: 0,
        };

        let hot = score(Algorithm::Default, &p, now()).as_f64().unwrap();
        assert!((hot - 0.08).abs() < 1e-9);
        assert_eq!(score(Algorithm::Fresh, &p, now()), Score::Timestamp(created));
        assert_eq!(score(Algorithm::Rising, &p, now()), Score::Real(0.75));
    }
}
