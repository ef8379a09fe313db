pub mod aggregation;
pub mod ranking;
pub mod scoring;
pub mod store;

pub use aggregation::CommentTree;
pub use ranking::{Algorithm, RankingError, RankingService};
pub use store::{InMemoryPostStore, PostStore, StoreError};
