// ============================================
// Post Store (read-only storage interface)
// ============================================
//
// The ranking engine never talks to a database directly. Everything it reads
// goes through `PostStore`, so scoring stays a pure function of its inputs and
// can be exercised without any storage dependency.

pub mod memory;

pub use memory::{InMemoryPostStore, SnapshotFile};

use crate::models::{Post, PostId, VoteAggregates};
use async_trait::async_trait;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Storage unavailable: {0}")]
    Unavailable(String),

    #[error("Post not found: {0}")]
    PostNotFound(PostId),

    #[error("Invalid snapshot: {0}")]
    Snapshot(String),
}

pub type Result<T> = std::result::Result<T, StoreError>;

/// Read-only queries the ranking engine consumes
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PostStore: Send + Sync {
    async fn all_posts(&self) -> Result<Vec<Post>>;

    async fn vote_aggregates(&self, post_id: PostId) -> Result<VoteAggregates>;

    async fn descendant_count(&self, post_id: PostId) -> Result<u64>;

    async fn post(&self, post_id: PostId) -> Result<Post> {
        self.all_posts()
            .await?
            .into_iter()
            .find(|post| post.id == post_id)
            .ok_or(StoreError::PostNotFound(post_id))
    }
}
