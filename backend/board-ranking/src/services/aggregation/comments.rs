use crate::models::{Comment, CommentId, CommentParent, PostId};
use std::collections::{HashMap, HashSet};
use tracing::warn;

/// Read-only index over a board's comments
///
/// Built once from a snapshot of comment rows; answers descendant counts and
/// parent-chain lookups without recursion so arbitrarily deep threads are safe.
#[derive(Debug, Clone, Default)]
pub struct CommentTree {
    children: HashMap<CommentParent, Vec<CommentId>>,
    parents: HashMap<CommentId, CommentParent>,
}

impl CommentTree {
    pub fn new<I>(comments: I) -> Self
    where
        I: IntoIterator<Item = Comment>,
    {
        let mut tree = Self::default();
        for comment in comments {
            if let Some(previous) = tree.parents.insert(comment.id, comment.parent) {
                warn!(comment_id = %comment.id, ?previous, "Duplicate comment row, keeping the last");
                if let Some(siblings) = tree.children.get_mut(&previous) {
                    siblings.retain(|id| *id != comment.id);
                }
            }
            tree.children
                .entry(comment.parent)
                .or_default()
                .push(comment.id);
        }
        tree
    }

    pub fn len(&self) -> usize {
        self.parents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.parents.is_empty()
    }

    /// Total number of comments anywhere below `post_id`
    pub fn descendant_count(&self, post_id: PostId) -> u64 {
        let mut frontier: Vec<CommentId> = self.direct_children(CommentParent::Post(post_id)).to_vec();
        let mut visited: HashSet<CommentId> = HashSet::with_capacity(frontier.len());
        let mut count = 0u64;

        // Each comment is visited at most once, so the loop is bounded by the tree size
        while let Some(comment_id) = frontier.pop() {
            if !visited.insert(comment_id) {
                continue;
            }
            count += 1;
            frontier.extend_from_slice(self.direct_children(CommentParent::Comment(comment_id)));
        }

        count
    }

    /// Direct replies to a comment
    pub fn replies(&self, comment_id: CommentId) -> &[CommentId] {
        self.direct_children(CommentParent::Comment(comment_id))
    }

    /// The post a comment ultimately belongs to.
    ///
    /// `None` when the comment is unknown or its parent chain is broken or cyclic.
    pub fn root_post(&self, comment_id: CommentId) -> Option<PostId> {
        let mut current = comment_id;
        for _ in 0..=self.parents.len() {
            match self.parents.get(&current)? {
                CommentParent::Post(post_id) => return Some(*post_id),
                CommentParent::Comment(parent_id) => current = *parent_id,
            }
        }
        warn!(comment_id = %comment_id, "Cyclic comment chain");
        None
    }

    fn direct_children(&self, parent: CommentParent) -> &[CommentId] {
        self.children.get(&parent).map(Vec::as_slice).unwrap_or(&[])
    }
}
