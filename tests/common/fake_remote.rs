//! In-memory [`Remote`] for controller tests: records every call, can be told
//! to fail or stall specific operations, and pushes realtime inserts on demand.

use async_trait::async_trait;
use chrono::{Duration as ChronoDuration, Utc};
use futures_util::StreamExt;
use lulutong::client::{
    ClientError, ClientResult, FeedQuery, NewPost, NewReply, Post, PostInsertStream, PostRow,
    Profile, Remote, Reply, SessionUser,
};
use lulutong::models::Category;
use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::{mpsc, watch};
use tokio_stream::wrappers::UnboundedReceiverStream;
use uuid::Uuid;

#[derive(Default)]
struct Data {
    accounts: HashMap<String, (String, SessionUser)>,
    profiles: HashMap<Uuid, Profile>,
    posts: Vec<Post>,
    replies: Vec<Reply>,
    likes: HashSet<(i32, Uuid)>,
    bookmarks: Vec<(i32, Uuid)>,
    next_id: i32,
}

impl Data {
    fn next_id(&mut self) -> i32 {
        self.next_id += 1;
        self.next_id
    }

    fn nickname_of(&self, user_id: Uuid) -> Option<String> {
        self.profiles.get(&user_id).and_then(|p| p.nickname.clone())
    }
}

pub struct FakeRemote {
    data: Mutex<Data>,
    calls: Mutex<Vec<&'static str>>,
    feed_queries: Mutex<Vec<FeedQuery>>,
    created_posts: Mutex<Vec<NewPost>>,
    failures: Mutex<HashMap<&'static str, usize>>,
    delays: Mutex<HashMap<&'static str, VecDeque<Duration>>>,
    auth_tx: watch::Sender<Option<SessionUser>>,
    insert_txs: Mutex<Vec<mpsc::UnboundedSender<ClientResult<PostRow>>>>,
}

impl FakeRemote {
    pub fn new() -> Arc<Self> {
        let (auth_tx, _) = watch::channel(None);
        Arc::new(Self {
            data: Mutex::new(Data::default()),
            calls: Mutex::new(Vec::new()),
            feed_queries: Mutex::new(Vec::new()),
            created_posts: Mutex::new(Vec::new()),
            failures: Mutex::new(HashMap::new()),
            delays: Mutex::new(HashMap::new()),
            auth_tx,
            insert_txs: Mutex::new(Vec::new()),
        })
    }

    // ---- seeding -------------------------------------------------------

    pub fn seed_user(&self, email: &str, nickname: Option<&str>) -> SessionUser {
        let user = SessionUser {
            id: Uuid::new_v4(),
            email: email.to_string(),
        };
        let mut data = self.data.lock().unwrap();
        data.accounts
            .insert(email.to_string(), ("password".to_string(), user.clone()));
        data.profiles.insert(
            user.id,
            Profile {
                id: user.id,
                nickname: nickname.map(str::to_string),
            },
        );
        user
    }

    /// Seeds a post; later seeds are newer.
    pub fn seed_post(&self, author: &SessionUser, content: &str, category: Category) -> Post {
        let mut data = self.data.lock().unwrap();
        let id = data.next_id();
        let post = Post {
            id,
            created_at: Utc::now() + ChronoDuration::seconds(id as i64),
            content: content.to_string(),
            user_id: author.id,
            category,
            nickname: data.nickname_of(author.id),
            like_count: 0,
            reply_count: 0,
        };
        data.posts.push(post.clone());
        post
    }

    pub fn seed_reply(
        &self,
        author: &SessionUser,
        post_id: i32,
        content: &str,
        is_public: bool,
    ) -> Reply {
        let mut data = self.data.lock().unwrap();
        let id = data.next_id();
        let reply = Reply {
            id,
            created_at: Utc::now() + ChronoDuration::seconds(id as i64),
            content: content.to_string(),
            user_id: author.id,
            post_id,
            is_public,
            is_anonymous: false,
            nickname: data.nickname_of(author.id),
        };
        data.replies.push(reply.clone());
        reply
    }

    pub fn seed_like(&self, post_id: i32, user: &SessionUser) {
        self.data.lock().unwrap().likes.insert((post_id, user.id));
    }

    pub fn seed_bookmark(&self, post_id: i32, user: &SessionUser) {
        self.data.lock().unwrap().bookmarks.push((post_id, user.id));
    }

    /// Publish an auth-state change without going through sign-in.
    pub fn set_session(&self, user: Option<SessionUser>) {
        self.auth_tx.send_replace(user);
    }

    /// Deliver a realtime insert to every open subscription.
    pub fn push_insert(&self, row: PostRow) {
        self.insert_txs
            .lock()
            .unwrap()
            .retain(|tx| tx.send(Ok(row.clone())).is_ok());
    }

    pub fn subscriber_count(&self) -> usize {
        let mut txs = self.insert_txs.lock().unwrap();
        txs.retain(|tx| !tx.is_closed());
        txs.len()
    }

    // ---- scripting -----------------------------------------------------

    /// Make every subsequent `op` call fail.
    pub fn fail(&self, op: &'static str) {
        self.failures.lock().unwrap().insert(op, usize::MAX);
    }

    /// Make the next `times` calls of `op` fail.
    pub fn fail_times(&self, op: &'static str, times: usize) {
        self.failures.lock().unwrap().insert(op, times);
    }

    pub fn heal(&self, op: &'static str) {
        self.failures.lock().unwrap().remove(op);
    }

    /// Queue a delay for the next call of `op`. Queued delays are consumed in order.
    pub fn delay_next(&self, op: &'static str, delay: Duration) {
        self.delays
            .lock()
            .unwrap()
            .entry(op)
            .or_default()
            .push_back(delay);
    }

    // ---- inspection ----------------------------------------------------

    pub fn calls(&self) -> Vec<&'static str> {
        self.calls.lock().unwrap().clone()
    }

    pub fn count(&self, op: &str) -> usize {
        self.calls.lock().unwrap().iter().filter(|c| **c == op).count()
    }

    pub fn feed_queries(&self) -> Vec<FeedQuery> {
        self.feed_queries.lock().unwrap().clone()
    }

    pub fn created_posts(&self) -> Vec<NewPost> {
        self.created_posts.lock().unwrap().clone()
    }

    pub fn like_rows(&self, post_id: i32) -> usize {
        self.data
            .lock()
            .unwrap()
            .likes
            .iter()
            .filter(|(p, _)| *p == post_id)
            .count()
    }

    pub fn has_bookmark_row(&self, post_id: i32, user_id: Uuid) -> bool {
        self.data
            .lock()
            .unwrap()
            .bookmarks
            .contains(&(post_id, user_id))
    }

    pub fn reply_is_public(&self, reply_id: i32) -> Option<bool> {
        self.data
            .lock()
            .unwrap()
            .replies
            .iter()
            .find(|r| r.id == reply_id)
            .map(|r| r.is_public)
    }

    async fn enter(&self, op: &'static str) -> ClientResult<()> {
        self.calls.lock().unwrap().push(op);

        let delay = self
            .delays
            .lock()
            .unwrap()
            .get_mut(op)
            .and_then(|q| q.pop_front());
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }

        let mut failures = self.failures.lock().unwrap();
        if let Some(left) = failures.get_mut(op) {
            if *left > 0 {
                if *left != usize::MAX {
                    *left -= 1;
                }
                return Err(ClientError::remote(500, format!("{op} unavailable")));
            }
        }
        Ok(())
    }
}

#[async_trait]
impl Remote for FakeRemote {
    async fn sign_up(&self, email: &str, password: &str) -> ClientResult<SessionUser> {
        self.enter("sign_up").await?;
        let user = {
            let mut data = self.data.lock().unwrap();
            if data.accounts.contains_key(email) {
                return Err(ClientError::remote(409, "Email already registered"));
            }
            let user = SessionUser {
                id: Uuid::new_v4(),
                email: email.to_string(),
            };
            data.accounts
                .insert(email.to_string(), (password.to_string(), user.clone()));
            data.profiles.insert(
                user.id,
                Profile {
                    id: user.id,
                    nickname: None,
                },
            );
            user
        };
        self.auth_tx.send_replace(Some(user.clone()));
        Ok(user)
    }

    async fn sign_in(&self, email: &str, password: &str) -> ClientResult<SessionUser> {
        self.enter("sign_in").await?;
        let user = {
            let data = self.data.lock().unwrap();
            match data.accounts.get(email) {
                Some((stored, user)) if stored == password => user.clone(),
                _ => return Err(ClientError::remote(401, "Unauthorized")),
            }
        };
        self.auth_tx.send_replace(Some(user.clone()));
        Ok(user)
    }

    async fn sign_out(&self) -> ClientResult<()> {
        self.enter("sign_out").await?;
        self.auth_tx.send_replace(None);
        Ok(())
    }

    async fn current_user(&self) -> ClientResult<Option<SessionUser>> {
        // Answered from the state at request time, like a server would.
        let user = self.auth_tx.borrow().clone();
        self.enter("current_user").await?;
        Ok(user)
    }

    fn auth_changes(&self) -> watch::Receiver<Option<SessionUser>> {
        self.auth_tx.subscribe()
    }

    async fn feed(&self, query: &FeedQuery) -> ClientResult<Vec<Post>> {
        self.feed_queries.lock().unwrap().push(query.clone());
        self.enter("feed").await?;

        let data = self.data.lock().unwrap();
        let needle = query.search.as_deref().map(str::to_lowercase);
        let mut posts: Vec<Post> = data
            .posts
            .iter()
            .filter(|p| match &needle {
                Some(needle) => p.content.to_lowercase().contains(needle),
                None => true,
            })
            .filter(|p| match query.category.category() {
                Some(category) => p.category == category,
                None => true,
            })
            .cloned()
            .collect();
        posts.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(posts)
    }

    async fn posts_by_ids(&self, ids: &[i32]) -> ClientResult<Vec<Post>> {
        self.enter("posts_by_ids").await?;
        let data = self.data.lock().unwrap();
        let mut posts: Vec<Post> = data
            .posts
            .iter()
            .filter(|p| ids.contains(&p.id))
            .cloned()
            .collect();
        posts.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(posts)
    }

    async fn create_post(&self, post: &NewPost) -> ClientResult<PostRow> {
        self.created_posts.lock().unwrap().push(post.clone());
        self.enter("create_post").await?;

        let mut data = self.data.lock().unwrap();
        let id = data.next_id();
        let row = PostRow {
            id,
            created_at: Utc::now() + ChronoDuration::seconds(id as i64),
            content: post.content.clone(),
            user_id: post.user_id,
            category: post.category,
        };
        let mut view = Post::from(row.clone());
        view.nickname = data.nickname_of(post.user_id);
        data.posts.push(view);
        Ok(row)
    }

    async fn delete_post(&self, id: i32) -> ClientResult<()> {
        self.enter("delete_post").await?;
        let mut data = self.data.lock().unwrap();
        data.posts.retain(|p| p.id != id);
        data.replies.retain(|r| r.post_id != id);
        data.likes.retain(|(p, _)| *p != id);
        data.bookmarks.retain(|(p, _)| *p != id);
        Ok(())
    }

    async fn replies_for_post(&self, post_id: i32) -> ClientResult<Vec<Reply>> {
        self.enter("replies_for_post").await?;
        let data = self.data.lock().unwrap();
        let mut replies: Vec<Reply> = data
            .replies
            .iter()
            .filter(|r| r.post_id == post_id)
            .cloned()
            .collect();
        replies.sort_by(|a, b| a.created_at.cmp(&b.created_at));
        Ok(replies)
    }

    async fn replies_by_user(
        &self,
        user_id: Uuid,
        include_private: bool,
    ) -> ClientResult<Vec<Reply>> {
        self.enter("replies_by_user").await?;
        let data = self.data.lock().unwrap();
        let mut replies: Vec<Reply> = data
            .replies
            .iter()
            .filter(|r| r.user_id == user_id && (include_private || r.is_public))
            .cloned()
            .collect();
        replies.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(replies)
    }

    async fn create_reply(&self, reply: &NewReply) -> ClientResult<Reply> {
        self.enter("create_reply").await?;
        let mut data = self.data.lock().unwrap();
        let id = data.next_id();
        let created = Reply {
            id,
            created_at: Utc::now() + ChronoDuration::seconds(id as i64),
            content: reply.content.clone(),
            user_id: reply.user_id,
            post_id: reply.post_id,
            is_public: true,
            is_anonymous: reply.is_anonymous,
            nickname: data.nickname_of(reply.user_id),
        };
        data.replies.push(created.clone());
        Ok(created)
    }

    async fn delete_reply(&self, id: i32) -> ClientResult<()> {
        self.enter("delete_reply").await?;
        self.data.lock().unwrap().replies.retain(|r| r.id != id);
        Ok(())
    }

    async fn set_reply_visibility(&self, id: i32, is_public: bool) -> ClientResult<Reply> {
        self.enter("set_reply_visibility").await?;
        let mut data = self.data.lock().unwrap();
        let reply = data
            .replies
            .iter_mut()
            .find(|r| r.id == id)
            .ok_or(ClientError::remote(404, "Resource not found"))?;
        reply.is_public = is_public;
        Ok(reply.clone())
    }

    async fn profile(&self, id: Uuid) -> ClientResult<Option<Profile>> {
        self.enter("profile").await?;
        Ok(self.data.lock().unwrap().profiles.get(&id).cloned())
    }

    async fn profile_by_nickname(&self, nickname: &str) -> ClientResult<Option<Profile>> {
        self.enter("profile_by_nickname").await?;
        Ok(self
            .data
            .lock()
            .unwrap()
            .profiles
            .values()
            .find(|p| p.nickname.as_deref() == Some(nickname))
            .cloned())
    }

    async fn update_nickname(&self, id: Uuid, nickname: &str) -> ClientResult<Profile> {
        self.enter("update_nickname").await?;
        let mut data = self.data.lock().unwrap();
        let profile = data
            .profiles
            .get_mut(&id)
            .ok_or(ClientError::remote(404, "Resource not found"))?;
        profile.nickname = Some(nickname.to_string()).filter(|n| !n.trim().is_empty());
        Ok(profile.clone())
    }

    async fn has_like(&self, post_id: i32, user_id: Uuid) -> ClientResult<bool> {
        self.enter("has_like").await?;
        Ok(self.data.lock().unwrap().likes.contains(&(post_id, user_id)))
    }

    async fn add_like(&self, post_id: i32, user_id: Uuid) -> ClientResult<()> {
        self.enter("add_like").await?;
        self.data.lock().unwrap().likes.insert((post_id, user_id));
        Ok(())
    }

    async fn remove_like(&self, post_id: i32, user_id: Uuid) -> ClientResult<()> {
        self.enter("remove_like").await?;
        self.data.lock().unwrap().likes.remove(&(post_id, user_id));
        Ok(())
    }

    async fn has_bookmark(&self, post_id: i32, user_id: Uuid) -> ClientResult<bool> {
        self.enter("has_bookmark").await?;
        Ok(self.has_bookmark_row(post_id, user_id))
    }

    async fn add_bookmark(&self, post_id: i32, user_id: Uuid) -> ClientResult<()> {
        self.enter("add_bookmark").await?;
        let mut data = self.data.lock().unwrap();
        if !data.bookmarks.contains(&(post_id, user_id)) {
            data.bookmarks.push((post_id, user_id));
        }
        Ok(())
    }

    async fn remove_bookmark(&self, post_id: i32, user_id: Uuid) -> ClientResult<()> {
        self.enter("remove_bookmark").await?;
        self.data
            .lock()
            .unwrap()
            .bookmarks
            .retain(|row| *row != (post_id, user_id));
        Ok(())
    }

    async fn bookmarked_post_ids(&self, user_id: Uuid) -> ClientResult<Vec<i32>> {
        self.enter("bookmarked_post_ids").await?;
        Ok(self
            .data
            .lock()
            .unwrap()
            .bookmarks
            .iter()
            .rev()
            .filter(|(_, u)| *u == user_id)
            .map(|(p, _)| *p)
            .collect())
    }

    async fn subscribe_post_inserts(&self) -> ClientResult<PostInsertStream> {
        self.enter("subscribe_post_inserts").await?;
        let (tx, rx) = mpsc::unbounded_channel();
        self.insert_txs.lock().unwrap().push(tx);
        Ok(UnboundedReceiverStream::new(rx).boxed())
    }
}

pub fn row(id: i32, author: Uuid, content: &str, category: Category) -> PostRow {
    PostRow {
        id,
        created_at: Utc::now(),
        content: content.to_string(),
        user_id: author,
        category,
    }
}
