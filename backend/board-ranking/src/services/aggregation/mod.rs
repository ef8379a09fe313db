// ============================================
// Aggregation Layer
// ============================================
//
// Turns raw vote and comment rows into the per-post inputs the scoring
// functions read:
// - votes: (sum, count, positive_count) per post
// - comments: transitive descendant count per post, via an iterative walk
//   over a parent -> children index

pub mod comments;
pub mod votes;

pub use comments::CommentTree;
pub use votes::aggregate_votes;
