use crate::client::error::{ClientError, ClientResult};
use crate::client::notice::Notifier;
use crate::client::remote::RemoteHandle;
use crate::client::session::SessionWatch;
use std::sync::{Mutex, MutexGuard};
use uuid::Uuid;

/// The two per-user membership reactions a post card carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReactionKind {
    Like,
    Bookmark,
}

impl ReactionKind {
    fn login_prompt(self) -> &'static str {
        match self {
            ReactionKind::Like => "请先登录再点赞！",
            ReactionKind::Bookmark => "请先登录再收藏！",
        }
    }

    fn failure_prefix(self) -> &'static str {
        match self {
            ReactionKind::Like => "点赞失败：",
            ReactionKind::Bookmark => "收藏失败：",
        }
    }

    /// Only likes have a visible counter.
    fn counted(self) -> bool {
        matches!(self, ReactionKind::Like)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReactionCommand {
    Insert,
    Delete,
}

impl ReactionCommand {
    /// Membership once the command has been applied.
    fn target(self) -> bool {
        matches!(self, ReactionCommand::Insert)
    }
}

#[derive(Debug, Default)]
struct ReactionState {
    active: bool,
    /// Reactions by everyone but the current user.
    others: i64,
    /// Sequence number of the most recent toggle.
    latest: u64,
}

impl ReactionState {
    fn count(&self, kind: ReactionKind) -> i64 {
        if kind.counted() {
            self.others + i64::from(self.active)
        } else {
            0
        }
    }

    /// Adopt a membership value without moving the shown count.
    fn settle(&mut self, active: bool) {
        self.others += i64::from(self.active) - i64::from(active);
        self.active = active;
    }
}

/// Optimistic like or bookmark toggle for one post.
pub struct ReactionControl {
    remote: RemoteHandle,
    session: SessionWatch,
    notifier: Notifier,
    kind: ReactionKind,
    post_id: i32,
    state: Mutex<ReactionState>,
}

impl ReactionControl {
    pub fn new(
        remote: RemoteHandle,
        session: SessionWatch,
        notifier: Notifier,
        kind: ReactionKind,
        post_id: i32,
        initial_count: i64,
    ) -> Self {
        Self {
            remote,
            session,
            notifier,
            kind,
            post_id,
            state: Mutex::new(ReactionState {
                active: false,
                others: initial_count,
                latest: 0,
            }),
        }
    }

    pub fn like(
        remote: RemoteHandle,
        session: SessionWatch,
        notifier: Notifier,
        post_id: i32,
        like_count: i64,
    ) -> Self {
        Self::new(remote, session, notifier, ReactionKind::Like, post_id, like_count)
    }

    pub fn bookmark(
        remote: RemoteHandle,
        session: SessionWatch,
        notifier: Notifier,
        post_id: i32,
    ) -> Self {
        Self::new(remote, session, notifier, ReactionKind::Bookmark, post_id, 0)
    }

    fn state(&self) -> MutexGuard<'_, ReactionState> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn kind(&self) -> ReactionKind {
        self.kind
    }

    pub fn is_active(&self) -> bool {
        self.state().active
    }

    pub fn count(&self) -> i64 {
        self.state().count(self.kind)
    }

    /// Establish membership for the signed-in user. Signed out means inactive.
    pub async fn load(&self) {
        let Some(user_id) = self.session.borrow().user_id() else {
            return;
        };

        let seen = self.state().latest;
        match self.has_row(user_id).await {
            Ok(active) => {
                let mut state = self.state();
                // A toggle issued meanwhile wins over the fetched membership.
                if state.latest == seen {
                    state.settle(active);
                }
            }
            Err(e) => tracing::warn!(
                "Failed to check {:?} on post {}: {}",
                self.kind,
                self.post_id,
                e
            ),
        }
    }

    /// Flip locally, then tell the remote. A failed call is undone only while it
    /// is still the most recent toggle; later toggles already replaced its effect.
    pub async fn toggle(&self) -> ClientResult<ReactionCommand> {
        let Some(user_id) = self.session.borrow().user_id() else {
            self.notifier.info(self.kind.login_prompt());
            return Err(ClientError::NotSignedIn);
        };

        let (command, seq) = {
            let mut state = self.state();
            let command = if state.active {
                ReactionCommand::Delete
            } else {
                ReactionCommand::Insert
            };
            state.active = command.target();
            state.latest += 1;
            (command, state.latest)
        };

        if let Err(e) = self.send(command, user_id).await {
            tracing::warn!(
                "{:?} {:?} on post {} failed: {}",
                self.kind,
                command,
                self.post_id,
                e
            );
            {
                let mut state = self.state();
                if state.latest == seq {
                    state.active = !command.target();
                }
            }
            self.notifier.error(format!("{}{e}", self.kind.failure_prefix()));
            return Err(e);
        }
        Ok(command)
    }

    async fn has_row(&self, user_id: Uuid) -> ClientResult<bool> {
        match self.kind {
            ReactionKind::Like => self.remote.has_like(self.post_id, user_id).await,
            ReactionKind::Bookmark => self.remote.has_bookmark(self.post_id, user_id).await,
        }
    }

    async fn send(&self, command: ReactionCommand, user_id: Uuid) -> ClientResult<()> {
        match (self.kind, command) {
            (ReactionKind::Like, ReactionCommand::Insert) => {
                self.remote.add_like(self.post_id, user_id).await
            }
            (ReactionKind::Like, ReactionCommand::Delete) => {
                self.remote.remove_like(self.post_id, user_id).await
            }
            (ReactionKind::Bookmark, ReactionCommand::Insert) => {
                self.remote.add_bookmark(self.post_id, user_id).await
            }
            (ReactionKind::Bookmark, ReactionCommand::Delete) => {
                self.remote.remove_bookmark(self.post_id, user_id).await
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn settling_membership_keeps_shown_count() {
        let mut state = ReactionState {
            active: false,
            others: 5,
            latest: 0,
        };
        state.settle(true);
        assert!(state.active);
        assert_eq!(state.count(ReactionKind::Like), 5);
        assert_eq!(state.others, 4);
    }

    #[test]
    fn bookmarks_have_no_count() {
        let state = ReactionState {
            active: true,
            others: 3,
            latest: 1,
        };
        assert_eq!(state.count(ReactionKind::Bookmark), 0);
    }
}
