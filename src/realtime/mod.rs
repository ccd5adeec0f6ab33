pub mod hub;
pub mod posts;

pub use hub::{PostFeedHub, PostInsertEvent};
