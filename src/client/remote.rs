use crate::client::error::ClientResult;
use crate::client::types::{FeedQuery, NewPost, NewReply, Post, PostRow, Profile, Reply, SessionUser};
use async_trait::async_trait;
use futures_util::stream::BoxStream;
use std::sync::Arc;
use tokio::sync::watch;
use uuid::Uuid;

/// Stream of raw rows inserted into `posts`.
pub type PostInsertStream = BoxStream<'static, ClientResult<PostRow>>;

/// Shared handle controllers are constructed with.
pub type RemoteHandle = Arc<dyn Remote>;

/// Everything the client needs from the data service.
#[async_trait]
pub trait Remote: Send + Sync {
    // Auth
    async fn sign_up(&self, email: &str, password: &str) -> ClientResult<SessionUser>;
    async fn sign_in(&self, email: &str, password: &str) -> ClientResult<SessionUser>;
    async fn sign_out(&self) -> ClientResult<()>;
    async fn current_user(&self) -> ClientResult<Option<SessionUser>>;
    /// Auth-state notifications; the current value is the session at subscription time.
    fn auth_changes(&self) -> watch::Receiver<Option<SessionUser>>;

    // Posts
    async fn feed(&self, query: &FeedQuery) -> ClientResult<Vec<Post>>;
    async fn posts_by_ids(&self, ids: &[i32]) -> ClientResult<Vec<Post>>;
    async fn create_post(&self, post: &NewPost) -> ClientResult<PostRow>;
    async fn delete_post(&self, id: i32) -> ClientResult<()>;

    // Replies
    async fn replies_for_post(&self, post_id: i32) -> ClientResult<Vec<Reply>>;
    async fn replies_by_user(&self, user_id: Uuid, include_private: bool)
        -> ClientResult<Vec<Reply>>;
    async fn create_reply(&self, reply: &NewReply) -> ClientResult<Reply>;
    async fn delete_reply(&self, id: i32) -> ClientResult<()>;
    async fn set_reply_visibility(&self, id: i32, is_public: bool) -> ClientResult<Reply>;

    // Profiles
    async fn profile(&self, id: Uuid) -> ClientResult<Option<Profile>>;
    async fn profile_by_nickname(&self, nickname: &str) -> ClientResult<Option<Profile>>;
    async fn update_nickname(&self, id: Uuid, nickname: &str) -> ClientResult<Profile>;

    // Likes
    async fn has_like(&self, post_id: i32, user_id: Uuid) -> ClientResult<bool>;
    async fn add_like(&self, post_id: i32, user_id: Uuid) -> ClientResult<()>;
    async fn remove_like(&self, post_id: i32, user_id: Uuid) -> ClientResult<()>;

    // Bookmarks
    async fn has_bookmark(&self, post_id: i32, user_id: Uuid) -> ClientResult<bool>;
    async fn add_bookmark(&self, post_id: i32, user_id: Uuid) -> ClientResult<()>;
    async fn remove_bookmark(&self, post_id: i32, user_id: Uuid) -> ClientResult<()>;
    async fn bookmarked_post_ids(&self, user_id: Uuid) -> ClientResult<Vec<i32>>;

    // Realtime
    async fn subscribe_post_inserts(&self) -> ClientResult<PostInsertStream>;
}
