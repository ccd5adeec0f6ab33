use crate::client::error::{ClientError, ClientResult};
use crate::client::notice::Notifier;
use crate::client::remote::RemoteHandle;
use crate::client::session::SessionWatch;
use crate::client::types::{Post, Profile, Reply, SessionUser};
use std::sync::{Mutex, MutexGuard};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum AccountStatus {
    #[default]
    Idle,
    Loading,
    NotSignedIn,
    Ready,
    Failed(String),
}

#[derive(Debug, Default)]
struct AccountState {
    status: AccountStatus,
    user: Option<SessionUser>,
    nickname: String,
    replies: Vec<Reply>,
    bookmarks: Vec<Post>,
}

struct AccountData {
    profile: Option<Profile>,
    replies: Vec<Reply>,
    bookmarks: Vec<Post>,
}

/// The signed-in user's own page: nickname, every reply, bookmarked posts.
pub struct AccountView {
    remote: RemoteHandle,
    session: SessionWatch,
    notifier: Notifier,
    state: Mutex<AccountState>,
}

impl AccountView {
    pub fn new(remote: RemoteHandle, session: SessionWatch, notifier: Notifier) -> Self {
        Self {
            remote,
            session,
            notifier,
            state: Mutex::new(AccountState::default()),
        }
    }

    fn state(&self) -> MutexGuard<'_, AccountState> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn status(&self) -> AccountStatus {
        self.state().status.clone()
    }

    pub fn user(&self) -> Option<SessionUser> {
        self.state().user.clone()
    }

    pub fn nickname(&self) -> String {
        self.state().nickname.clone()
    }

    pub fn replies(&self) -> Vec<Reply> {
        self.state().replies.clone()
    }

    pub fn bookmarks(&self) -> Vec<Post> {
        self.state().bookmarks.clone()
    }

    pub fn set_nickname(&self, nickname: impl Into<String>) {
        self.state().nickname = nickname.into();
    }

    /// Waits for the session gate, then reads everything the page shows.
    pub async fn load(&self) {
        let mut session = self.session.clone();
        let user = match session.wait_for(|s| s.ready).await {
            Ok(snapshot) => snapshot.user.clone(),
            Err(_) => None,
        };

        let Some(user) = user else {
            let mut state = self.state();
            state.user = None;
            state.status = AccountStatus::NotSignedIn;
            return;
        };

        {
            let mut state = self.state();
            state.user = Some(user.clone());
            state.status = AccountStatus::Loading;
        }

        match self.fetch(&user).await {
            Ok(data) => {
                let mut state = self.state();
                state.nickname = data
                    .profile
                    .and_then(|p| p.nickname)
                    .unwrap_or_default();
                state.replies = data.replies;
                state.bookmarks = data.bookmarks;
                state.status = AccountStatus::Ready;
            }
            Err(e) => {
                tracing::warn!("Failed to load account page for {}: {}", user.id, e);
                self.state().status = AccountStatus::Failed(e.to_string());
            }
        }
    }

    async fn fetch(&self, user: &SessionUser) -> ClientResult<AccountData> {
        let profile = self.remote.profile(user.id).await?;
        let replies = self.remote.replies_by_user(user.id, true).await?;

        let ids = self.remote.bookmarked_post_ids(user.id).await?;
        let bookmarks = if ids.is_empty() {
            Vec::new()
        } else {
            self.remote.posts_by_ids(&ids).await?
        };

        Ok(AccountData {
            profile,
            replies,
            bookmarks,
        })
    }

    /// Save the nickname field to the caller's own profile.
    pub async fn save_nickname(&self) -> ClientResult<Profile> {
        let (user, nickname) = {
            let state = self.state();
            (state.user.clone(), state.nickname.clone())
        };
        let Some(user) = user else {
            return Err(ClientError::NotSignedIn);
        };

        match self.remote.update_nickname(user.id, &nickname).await {
            Ok(profile) => {
                self.notifier.success("更新成功！");
                Ok(profile)
            }
            Err(e) => {
                tracing::warn!("Failed to update nickname for {}: {}", user.id, e);
                self.notifier.error(format!("更新失败：{e}"));
                Err(e)
            }
        }
    }
}
