use crate::client::config::MergePolicy;
use crate::client::error::{ClientError, ClientResult};
use crate::client::notice::{Confirm, Notifier};
use crate::client::remote::RemoteHandle;
use crate::client::session::SessionWatch;
use crate::client::task::Subscription;
use crate::client::types::{CategoryFilter, FeedQuery, LoadState, Post, PostRow};
use futures_util::StreamExt;
use std::sync::{Arc, Mutex, MutexGuard};

pub const DELETE_POST_PROMPT: &str = "确定要删除这篇帖子吗？它下面的所有回复也将被一并删除。";

#[derive(Debug, Default)]
struct FeedState {
    search: String,
    category: CategoryFilter,
    posts: Vec<Post>,
    load: LoadState,
}

/// The home page feed: filtered reads of the joined post view plus realtime inserts.
pub struct FeedController {
    remote: RemoteHandle,
    session: SessionWatch,
    notifier: Notifier,
    policy: MergePolicy,
    state: Mutex<FeedState>,
}

impl FeedController {
    pub fn new(
        remote: RemoteHandle,
        session: SessionWatch,
        notifier: Notifier,
        policy: MergePolicy,
    ) -> Arc<Self> {
        Arc::new(Self {
            remote,
            session,
            notifier,
            policy,
            state: Mutex::new(FeedState::default()),
        })
    }

    fn state(&self) -> MutexGuard<'_, FeedState> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn posts(&self) -> Vec<Post> {
        self.state().posts.clone()
    }

    pub fn load_state(&self) -> LoadState {
        self.state().load.clone()
    }

    pub fn query(&self) -> FeedQuery {
        let state = self.state();
        FeedQuery::new(&state.search, state.category)
    }

    pub async fn set_search(&self, term: impl Into<String>) {
        self.state().search = term.into();
        self.refresh().await;
    }

    pub async fn set_category(&self, category: CategoryFilter) {
        self.state().category = category;
        self.refresh().await;
    }

    /// Re-read the feed. Does nothing until the session is ready.
    pub async fn refresh(&self) {
        if !self.session.borrow().ready {
            tracing::debug!("Feed refresh skipped, session not ready");
            return;
        }

        let query = self.query();
        self.state().load = LoadState::Loading;

        match self.remote.feed(&query).await {
            Ok(posts) => {
                let mut state = self.state();
                state.posts = posts;
                state.load = LoadState::Ready;
            }
            Err(e) => {
                tracing::warn!("Failed to fetch posts: {}", e);
                self.notifier.error(format!("获取帖子失败：{e}"));
                let mut state = self.state();
                state.posts.clear();
                state.load = LoadState::Failed(e.to_string());
            }
        }
    }

    /// Merge a realtime insert. Returns whether the list changed.
    pub fn apply_insert(&self, row: PostRow) -> bool {
        merge_insert(&mut self.state().posts, row, self.policy)
    }

    /// Owner-only delete behind a confirmation. The card goes away only after the remote succeeds.
    pub async fn delete_post(&self, post_id: i32, confirm: &dyn Confirm) -> ClientResult<bool> {
        let owner = self.state().posts.iter().find(|p| p.id == post_id).map(|p| p.user_id);
        let caller = self.session.borrow().user_id();

        match (caller, owner) {
            (None, _) => return Err(ClientError::NotSignedIn),
            (Some(caller), Some(owner)) if caller != owner => return Err(ClientError::NotOwner),
            _ => {}
        }

        if !confirm.confirm(DELETE_POST_PROMPT) {
            return Ok(false);
        }

        match self.remote.delete_post(post_id).await {
            Ok(()) => {
                self.state().posts.retain(|p| p.id != post_id);
                self.notifier.success("帖子已删除！");
                Ok(true)
            }
            Err(e) => {
                tracing::warn!("Failed to delete post {}: {}", post_id, e);
                self.notifier.error(format!("删除帖子失败：{e}"));
                Err(e)
            }
        }
    }

    /// Subscribe to post inserts; dropping the returned guard unsubscribes.
    pub fn spawn_realtime(self: &Arc<Self>) -> Subscription {
        let feed = Arc::clone(self);
        Subscription::spawn(async move {
            let mut inserts = match feed.remote.subscribe_post_inserts().await {
                Ok(inserts) => inserts,
                Err(e) => {
                    tracing::warn!("Realtime subscription failed: {}", e);
                    return;
                }
            };
            tracing::info!("Realtime post feed attached");

            while let Some(event) = inserts.next().await {
                match event {
                    Ok(row) => {
                        feed.apply_insert(row);
                    }
                    Err(e) => tracing::warn!("Dropped realtime event: {}", e),
                }
            }
            tracing::info!("Realtime post feed ended");
        })
    }

    /// Refresh whenever the session gate turns ready.
    pub fn spawn_auto_refresh(self: &Arc<Self>) -> Subscription {
        let feed = Arc::clone(self);
        let mut session = self.session.clone();
        Subscription::spawn(async move {
            let mut was_ready = false;
            loop {
                let ready = session.borrow_and_update().ready;
                if ready && !was_ready {
                    feed.refresh().await;
                }
                was_ready = ready;
                if session.changed().await.is_err() {
                    break;
                }
            }
        })
    }
}

/// Put a freshly inserted row at the top of `posts` according to `policy`.
pub fn merge_insert(posts: &mut Vec<Post>, row: PostRow, policy: MergePolicy) -> bool {
    if policy == MergePolicy::DedupeById && posts.iter().any(|p| p.id == row.id) {
        tracing::debug!("Realtime insert for post {} already listed", row.id);
        return false;
    }
    posts.insert(0, Post::from(row));
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Category;
    use chrono::Utc;
    use uuid::Uuid;

    fn row(id: i32) -> PostRow {
        PostRow {
            id,
            created_at: Utc::now(),
            content: format!("post {id}"),
            user_id: Uuid::new_v4(),
            category: Category::LifeHelp,
        }
    }

    #[test]
    fn prepend_keeps_newest_first() {
        let mut posts = Vec::new();
        merge_insert(&mut posts, row(1), MergePolicy::Prepend);
        merge_insert(&mut posts, row(2), MergePolicy::Prepend);
        let ids: Vec<_> = posts.iter().map(|p| p.id).collect();
        assert_eq!(ids, vec![2, 1]);
    }

    #[test]
    fn prepend_duplicates_known_ids() {
        let mut posts = Vec::new();
        assert!(merge_insert(&mut posts, row(7), MergePolicy::Prepend));
        assert!(merge_insert(&mut posts, row(7), MergePolicy::Prepend));
        assert_eq!(posts.len(), 2);
    }

    #[test]
    fn dedupe_skips_known_ids() {
        let mut posts = Vec::new();
        assert!(merge_insert(&mut posts, row(7), MergePolicy::DedupeById));
        assert!(!merge_insert(&mut posts, row(7), MergePolicy::DedupeById));
        assert_eq!(posts.len(), 1);
    }

    #[test]
    fn inserted_post_has_no_counts() {
        let mut posts = Vec::new();
        merge_insert(&mut posts, row(3), MergePolicy::Prepend);
        assert_eq!(posts[0].like_count, 0);
        assert_eq!(posts[0].reply_count, 0);
        assert_eq!(posts[0].nickname, None);
    }
}
