use crate::client::error::{ClientError, ClientResult};
use crate::client::notice::{Confirm, Notifier};
use crate::client::remote::RemoteHandle;
use crate::client::session::SessionWatch;
use crate::client::types::{LoadState, NewReply, Reply};
use std::sync::{Mutex, MutexGuard};

pub const DELETE_REPLY_PROMPT: &str = "确定要删除这条回复吗？";

#[derive(Debug, Default)]
struct ThreadState {
    replies: Vec<Reply>,
    draft: String,
    anonymous: bool,
    load: LoadState,
}

/// Replies under one post, with the reply form.
pub struct ReplyThread {
    remote: RemoteHandle,
    session: SessionWatch,
    notifier: Notifier,
    post_id: i32,
    state: Mutex<ThreadState>,
}

impl ReplyThread {
    pub fn new(
        remote: RemoteHandle,
        session: SessionWatch,
        notifier: Notifier,
        post_id: i32,
    ) -> Self {
        Self {
            remote,
            session,
            notifier,
            post_id,
            state: Mutex::new(ThreadState::default()),
        }
    }

    fn state(&self) -> MutexGuard<'_, ThreadState> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn post_id(&self) -> i32 {
        self.post_id
    }

    pub fn replies(&self) -> Vec<Reply> {
        self.state().replies.clone()
    }

    pub fn draft(&self) -> String {
        self.state().draft.clone()
    }

    pub fn load_state(&self) -> LoadState {
        self.state().load.clone()
    }

    pub fn set_draft(&self, content: impl Into<String>) {
        self.state().draft = content.into();
    }

    pub fn set_anonymous(&self, anonymous: bool) {
        self.state().anonymous = anonymous;
    }

    /// Whether the signed-in user may delete `reply`.
    pub fn can_delete(&self, reply: &Reply) -> bool {
        self.session.borrow().user_id() == Some(reply.user_id)
    }

    /// Oldest first. A failed fetch is logged and leaves the list as it was.
    pub async fn load(&self) {
        self.state().load = LoadState::Loading;
        match self.remote.replies_for_post(self.post_id).await {
            Ok(replies) => {
                let mut state = self.state();
                state.replies = replies;
                state.load = LoadState::Ready;
            }
            Err(e) => {
                tracing::warn!("Failed to fetch replies for post {}: {}", self.post_id, e);
                self.state().load = LoadState::Failed(e.to_string());
            }
        }
    }

    /// Submit the draft, then re-read the thread.
    pub async fn submit(&self) -> ClientResult<Reply> {
        let (content, is_anonymous) = {
            let state = self.state();
            (state.draft.clone(), state.anonymous)
        };
        if content.trim().is_empty() {
            return Err(ClientError::Validation("回复内容不能为空".to_string()));
        }

        let Some(user_id) = self.session.borrow().user_id() else {
            self.notifier.error(format!("回复失败：{}", ClientError::NotSignedIn));
            return Err(ClientError::NotSignedIn);
        };

        let new_reply = NewReply {
            post_id: self.post_id,
            user_id,
            content,
            is_anonymous,
        };

        match self.remote.create_reply(&new_reply).await {
            Ok(reply) => {
                self.notifier.success("回复成功！");
                self.state().draft.clear();
                self.load().await;
                Ok(reply)
            }
            Err(e) => {
                tracing::warn!("Failed to create reply on post {}: {}", self.post_id, e);
                self.notifier.error(format!("回复失败：{e}"));
                Err(e)
            }
        }
    }

    /// Owner-only delete behind a confirmation; local removal waits for the remote.
    pub async fn delete(&self, reply_id: i32, confirm: &dyn Confirm) -> ClientResult<bool> {
        let owner = self
            .state()
            .replies
            .iter()
            .find(|r| r.id == reply_id)
            .map(|r| r.user_id);
        let caller = self.session.borrow().user_id();

        match (caller, owner) {
            (None, _) => return Err(ClientError::NotSignedIn),
            (Some(caller), Some(owner)) if caller != owner => return Err(ClientError::NotOwner),
            _ => {}
        }

        if !confirm.confirm(DELETE_REPLY_PROMPT) {
            return Ok(false);
        }

        match self.remote.delete_reply(reply_id).await {
            Ok(()) => {
                self.state().replies.retain(|r| r.id != reply_id);
                self.notifier.success("删除成功！");
                Ok(true)
            }
            Err(e) => {
                tracing::warn!("Failed to delete reply {}: {}", reply_id, e);
                self.notifier.error(format!("删除失败：{e}"));
                Err(e)
            }
        }
    }
}
