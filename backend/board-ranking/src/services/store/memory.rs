use super::{PostStore, Result, StoreError};
use crate::models::{Comment, Post, PostId, Vote, VoteAggregates};
use crate::services::aggregation::{aggregate_votes, CommentTree};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::path::Path;
use tracing::{debug, info, warn};

/// On-disk snapshot consumed by the batch binary
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SnapshotFile {
    pub posts: Vec<Post>,
    #[serde(default)]
    pub votes: Vec<Vote>,
    #[serde(default)]
    pub comments: Vec<Comment>,
}

impl SnapshotFile {
    pub fn from_json_str(raw: &str) -> Result<Self> {
        serde_json::from_str(raw).map_err(|e| StoreError::Snapshot(e.to_string()))
    }

    pub async fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let raw = tokio::fs::read_to_string(path).await.map_err(|e| {
            StoreError::Unavailable(format!("failed to read {}: {}", path.display(), e))
        })?;
        Self::from_json_str(&raw)
    }
}

/// `PostStore` over an immutable in-memory snapshot of board rows
#[derive(Debug, Clone, Default)]
pub struct InMemoryPostStore {
    posts: Vec<Post>,
    known: HashSet<PostId>,
    votes: HashMap<PostId, Vec<i32>>,
    comments: CommentTree,
}

impl InMemoryPostStore {
    pub fn new(posts: Vec<Post>, votes: Vec<Vote>, comments: Vec<Comment>) -> Self {
        let known: HashSet<PostId> = posts.iter().map(|post| post.id).collect();
        let mut by_post: HashMap<PostId, Vec<i32>> = HashMap::new();
        let mut orphaned = 0usize;
        for vote in votes {
            if known.contains(&vote.post_id) {
                by_post.entry(vote.post_id).or_default().push(vote.value);
            } else {
                orphaned += 1;
            }
        }
        if orphaned > 0 {
            warn!(orphaned, "Ignoring votes for unknown posts");
        }

        let comments = CommentTree::new(comments);

        debug!(
            posts = posts.len(),
            voted_posts = by_post.len(),
            comments = comments.len(),
            "In-memory post store built"
        );

        Self {
            posts,
            known,
            votes: by_post,
            comments,
        }
    }

    pub fn from_snapshot(snapshot: SnapshotFile) -> Self {
        Self::new(snapshot.posts, snapshot.votes, snapshot.comments)
    }

    pub async fn load(path: impl AsRef<Path>) -> Result<Self> {
        let snapshot = SnapshotFile::load(path.as_ref()).await?;
        info!(
            path = %path.as_ref().display(),
            posts = snapshot.posts.len(),
            votes = snapshot.votes.len(),
            comments = snapshot.comments.len(),
            "Loaded board snapshot"
        );
        Ok(Self::from_snapshot(snapshot))
    }

    pub fn comments(&self) -> &CommentTree {
        &self.comments
    }

    fn ensure_known(&self, post_id: PostId) -> Result<()> {
        if self.known.contains(&post_id) {
            Ok(())
        } else {
            Err(StoreError::PostNotFound(post_id))
        }
    }
}

#[async_trait]
impl PostStore for InMemoryPostStore {
    async fn all_posts(&self) -> Result<Vec<Post>> {
        Ok(self.posts.clone())
    }

    async fn vote_aggregates(&self, post_id: PostId) -> Result<VoteAggregates> {
        self.ensure_known(post_id)?;
        let values = self.votes.get(&post_id).map(Vec::as_slice).unwrap_or(&[]);
        Ok(aggregate_votes(values.iter().copied()))
    }

    async fn descendant_count(&self, post_id: PostId) -> Result<u64> {
        self.ensure_known(post_id)?;
        Ok(self.comments.descendant_count(post_id))
    }
}
