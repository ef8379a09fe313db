pub mod config;
pub mod models;
pub mod services;
pub mod utils;

pub use config::Config;
pub use models::{Comment, CommentParent, Post, PostSnapshot, RankedPost, Score, Vote, VoteAggregates};
pub use services::{
    Algorithm, CommentTree, InMemoryPostStore, PostStore, RankingError, RankingService,
    StoreError,
};
