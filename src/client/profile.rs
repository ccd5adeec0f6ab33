use crate::client::error::{ClientError, ClientResult};
use crate::client::notice::Notifier;
use crate::client::remote::RemoteHandle;
use crate::client::session::SessionWatch;
use crate::client::types::{Profile, Reply};
use std::sync::{Mutex, MutexGuard};

pub const PROFILE_NOT_FOUND: &str = "用户不存在。";

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum ProfileStatus {
    #[default]
    Idle,
    Loading,
    NotFound,
    Ready,
    Failed(String),
}

#[derive(Debug, Default)]
struct PageState {
    status: ProfileStatus,
    profile: Option<Profile>,
    replies: Vec<Reply>,
}

/// Public profile page looked up by nickname.
pub struct ProfilePage {
    remote: RemoteHandle,
    session: SessionWatch,
    notifier: Notifier,
    nickname: String,
    state: Mutex<PageState>,
}

impl ProfilePage {
    pub fn new(
        remote: RemoteHandle,
        session: SessionWatch,
        notifier: Notifier,
        nickname: impl Into<String>,
    ) -> Self {
        Self {
            remote,
            session,
            notifier,
            nickname: nickname.into(),
            state: Mutex::new(PageState::default()),
        }
    }

    fn state(&self) -> MutexGuard<'_, PageState> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn status(&self) -> ProfileStatus {
        self.state().status.clone()
    }

    pub fn profile(&self) -> Option<Profile> {
        self.state().profile.clone()
    }

    pub fn replies(&self) -> Vec<Reply> {
        self.state().replies.clone()
    }

    pub fn is_owner(&self) -> bool {
        let owner = self.state().profile.as_ref().map(|p| p.id);
        owner.is_some() && self.session.borrow().user_id() == owner
    }

    /// Waits for the session gate so ownership is known before replies are read.
    pub async fn load(&self) {
        let mut session = self.session.clone();
        let _ = session.wait_for(|s| s.ready).await;

        self.state().status = ProfileStatus::Loading;

        let profile = match self.remote.profile_by_nickname(&self.nickname).await {
            Ok(Some(profile)) => profile,
            Ok(None) => {
                self.state().status = ProfileStatus::NotFound;
                return;
            }
            Err(e) => {
                tracing::warn!("Failed to fetch profile {}: {}", self.nickname, e);
                self.state().status = ProfileStatus::Failed(e.to_string());
                return;
            }
        };

        let is_owner = self.session.borrow().user_id() == Some(profile.id);
        let replies = self.remote.replies_by_user(profile.id, is_owner).await;

        let mut state = self.state();
        state.profile = Some(profile);
        match replies {
            Ok(replies) => {
                state.replies = replies;
                state.status = ProfileStatus::Ready;
            }
            Err(e) => {
                tracing::warn!("Failed to fetch replies for {}: {}", self.nickname, e);
                state.status = ProfileStatus::Failed(e.to_string());
            }
        }
    }

    /// Owner-only: flip `is_public` remotely; the local flag follows only on success.
    pub async fn toggle_visibility(&self, reply_id: i32) -> ClientResult<bool> {
        if !self.is_owner() {
            return Err(ClientError::NotOwner);
        }

        let current = self
            .state()
            .replies
            .iter()
            .find(|r| r.id == reply_id)
            .map(|r| r.is_public)
            .ok_or_else(|| ClientError::Validation(format!("reply {reply_id} is not listed")))?;

        match self.remote.set_reply_visibility(reply_id, !current).await {
            Ok(updated) => {
                let mut state = self.state();
                if let Some(reply) = state.replies.iter_mut().find(|r| r.id == reply_id) {
                    reply.is_public = updated.is_public;
                }
                Ok(updated.is_public)
            }
            Err(e) => {
                tracing::warn!("Failed to update visibility of reply {}: {}", reply_id, e);
                self.notifier.error(format!("更新状态失败: {e}"));
                Err(e)
            }
        }
    }
}
