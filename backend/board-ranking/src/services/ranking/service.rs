use super::{engine, Algorithm, RankingError, Result};
use crate::models::{Post, PostId, PostSnapshot, RankedPost, Score};
use crate::services::store::PostStore;
use chrono::{DateTime, Utc};
use futures::stream::{self, StreamExt, TryStreamExt};
use std::future::Future;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::watch;
use tracing::{debug, info, warn};

/// Flip to `true` to abort an in-flight aggregate fetch
pub type CancelSignal = watch::Receiver<bool>;

/// Limits applied to the aggregate-fetching phase
#[derive(Debug, Clone)]
pub struct FetchOptions {
    /// Maximum number of posts whose aggregates are fetched at once
    pub concurrency: usize,
    /// Deadline for the whole fetch phase; `None` waits indefinitely
    pub timeout: Option<Duration>,
}

impl Default for FetchOptions {
    fn default() -> Self {
        Self {
            concurrency: 16,
            timeout: Some(Duration::from_secs(5)),
        }
    }
}

/// Ranking over a live `PostStore`
///
/// Fetches every post's vote tally and descendant count, then ranks the
/// resulting immutable snapshot with the pure engine.
pub struct RankingService<S: PostStore> {
    store: Arc<S>,
    options: FetchOptions,
}

impl<S: PostStore> Clone for RankingService<S> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
            options: self.options.clone(),
        }
    }
}

impl<S: PostStore> RankingService<S> {
    pub fn new(store: Arc<S>) -> Self {
        Self::with_options(store, FetchOptions::default())
    }

    pub fn with_options(store: Arc<S>, options: FetchOptions) -> Self {
        Self { store, options }
    }

    /// Snapshot of every post with its aggregates
    pub async fn snapshot(&self, cancel: Option<CancelSignal>) -> Result<Vec<PostSnapshot>> {
        let store = Arc::clone(&self.store);
        let concurrency = self.options.concurrency.max(1);

        self.guarded(cancel, async move {
            let posts = store.all_posts().await?;
            let post_count = posts.len();
            let started = Instant::now();

            let snapshots: Vec<PostSnapshot> = stream::iter(posts)
                .map(|post| fetch_snapshot(store.as_ref(), post))
                .buffer_unordered(concurrency)
                .try_collect()
                .await?;

            debug!(
                post_count,
                elapsed_ms = started.elapsed().as_millis() as u64,
                "Aggregates fetched"
            );
            Ok::<_, RankingError>(snapshots)
        })
        .await
    }

    /// Fetch aggregates and rank every post under `algorithm`
    pub async fn ranked_by(
        &self,
        algorithm: Algorithm,
        now: DateTime<Utc>,
        cancel: Option<CancelSignal>,
    ) -> Result<Vec<RankedPost>> {
        let started = Instant::now();
        let snapshots = self.snapshot(cancel).await?;
        let ranked = engine::ranked_by(algorithm, &snapshots, now);

        info!(
            algorithm = %algorithm,
            post_count = snapshots.len(),
            ranked_count = ranked.len(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "Ranking completed"
        );

        Ok(ranked)
    }

    /// Best `limit` posts under `algorithm`
    pub async fn top(
        &self,
        algorithm: Algorithm,
        now: DateTime<Utc>,
        limit: usize,
        cancel: Option<CancelSignal>,
    ) -> Result<Vec<RankedPost>> {
        let snapshots = self.snapshot(cancel).await?;
        let ranked = engine::top(algorithm, &snapshots, now, limit);

        info!(
            algorithm = %algorithm,
            post_count = snapshots.len(),
            limit,
            returned = ranked.len(),
            "Top posts selected"
        );

        Ok(ranked)
    }

    /// Same as [`RankingService::ranked_by`], taking the algorithm by name
    pub async fn ranked_by_name(
        &self,
        algorithm: &str,
        now: DateTime<Utc>,
        cancel: Option<CancelSignal>,
    ) -> Result<Vec<RankedPost>> {
        let algorithm: Algorithm = algorithm.parse()?;
        self.ranked_by(algorithm, now, cancel).await
    }

    /// 1-based rank of `post_id`, or `PostNotRanked` if the algorithm excludes it
    pub async fn rank(
        &self,
        algorithm: Algorithm,
        post_id: PostId,
        now: DateTime<Utc>,
        cancel: Option<CancelSignal>,
    ) -> Result<usize> {
        let snapshots = self.snapshot(cancel).await?;
        engine::rank(algorithm, &snapshots, post_id, now)
    }

    /// Score a single post, fetching only its own aggregates
    pub async fn score(
        &self,
        algorithm: Algorithm,
        post_id: PostId,
        now: DateTime<Utc>,
        cancel: Option<CancelSignal>,
    ) -> Result<Score> {
        let store = Arc::clone(&self.store);
        let snapshot = self
            .guarded(cancel, async move {
                let post = store.post(post_id).await?;
                fetch_snapshot(store.as_ref(), post).await
            })
            .await?;
        Ok(engine::score(algorithm, &snapshot, now))
    }

    /// Run `fut` under the configured deadline, aborting early on cancellation
    async fn guarded<T, F>(&self, cancel: Option<CancelSignal>, fut: F) -> Result<T>
    where
        F: Future<Output = Result<T>>,
    {
        let bounded = async {
            match self.options.timeout {
                Some(limit) => match tokio::time::timeout(limit, fut).await {
                    Ok(result) => result,
                    Err(_) => {
                        warn!(timeout_ms = limit.as_millis() as u64, "Aggregate fetch timed out");
                        Err(RankingError::DeadlineExceeded(limit))
                    }
                },
                None => fut.await,
            }
        };

        tokio::select! {
            biased;
            _ = cancelled(cancel) => {
                warn!("Aggregate fetch cancelled");
                Err(RankingError::Cancelled)
            }
            result = bounded => result,
        }
    }
}

async fn fetch_snapshot<S>(store: &S, post: Post) -> Result<PostSnapshot>
where
    S: PostStore + ?Sized,
{
    let (votes, descendant_count) = tokio::try_join!(
        store.vote_aggregates(post.id),
        store.descendant_count(post.id)
    )?;
    Ok(PostSnapshot::new(post, votes, descendant_count))
}

/// Resolves once the signal reads `true`; never resolves without a signal
async fn cancelled(cancel: Option<CancelSignal>) {
    let Some(mut rx) = cancel else {
        return std::future::pending().await;
    };
    loop {
        if *rx.borrow_and_update() {
            return;
        }
        if rx.changed().await.is_err() {
            // Sender gone without cancelling
            return std::future::pending().await;
        }
    }
}
