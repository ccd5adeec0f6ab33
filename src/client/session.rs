use crate::client::remote::{Remote, RemoteHandle};
use crate::client::task::Subscription;
use crate::client::types::{Profile, SessionUser};
use tokio::sync::watch;
use uuid::Uuid;

const FALLBACK_GREETING_NAME: &str = "我的账户";

/// What the rest of the client knows about the signed-in user.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SessionSnapshot {
    /// False until the first auth notification has been processed.
    pub ready: bool,
    pub user: Option<SessionUser>,
    pub profile: Option<Profile>,
}

impl SessionSnapshot {
    pub fn ready(user: Option<SessionUser>, profile: Option<Profile>) -> Self {
        Self {
            ready: true,
            user,
            profile,
        }
    }

    pub fn user_id(&self) -> Option<Uuid> {
        self.user.as_ref().map(|u| u.id)
    }

    pub fn nickname(&self) -> Option<&str> {
        self.profile.as_ref().and_then(|p| p.nickname.as_deref())
    }

    pub fn greeting(&self) -> String {
        let name = self
            .nickname()
            .filter(|n| !n.is_empty())
            .unwrap_or(FALLBACK_GREETING_NAME);
        format!("欢迎，{name}！")
    }
}

/// Receiving side controllers use to gate on and read the session.
pub type SessionWatch = watch::Receiver<SessionSnapshot>;

/// Listens for auth changes and keeps a [`SessionSnapshot`] current.
pub struct Session {
    state: SessionWatch,
    _listener: Subscription,
}

impl Session {
    pub fn start(remote: RemoteHandle) -> Self {
        let (tx, state) = watch::channel(SessionSnapshot::default());
        let mut changes = remote.auth_changes();

        let listener = Subscription::spawn(async move {
            // Mark the current value seen first so a change racing the lookup
            // below still wakes the loop.
            let announced = changes.borrow_and_update().clone();
            // First pass asks the remote directly; later ones trust the notification.
            let mut user = match remote.current_user().await {
                Ok(user) => user,
                Err(e) => {
                    tracing::warn!("Failed to resolve current user: {}", e);
                    announced
                }
            };

            loop {
                let profile = match &user {
                    Some(u) => resolve_profile(remote.as_ref(), u.id).await,
                    None => None,
                };
                tx.send_replace(SessionSnapshot::ready(user, profile));

                if changes.changed().await.is_err() {
                    break;
                }
                user = changes.borrow_and_update().clone();
            }
        });

        Self {
            state,
            _listener: listener,
        }
    }

    pub fn watch(&self) -> SessionWatch {
        self.state.clone()
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        self.state.borrow().clone()
    }

    pub fn is_ready(&self) -> bool {
        self.state.borrow().ready
    }

    pub fn current_user(&self) -> Option<SessionUser> {
        self.state.borrow().user.clone()
    }

    pub fn profile(&self) -> Option<Profile> {
        self.state.borrow().profile.clone()
    }

    pub fn greeting(&self) -> String {
        self.state.borrow().greeting()
    }

    /// Resolves once the first auth notification has been handled.
    pub async fn wait_ready(&self) {
        let mut state = self.state.clone();
        let _ = state.wait_for(|s| s.ready).await;
    }

    pub fn stop(self) {
        drop(self);
    }
}

async fn resolve_profile(remote: &dyn Remote, user_id: Uuid) -> Option<Profile> {
    match remote.profile(user_id).await {
        Ok(profile) => profile,
        Err(e) => {
            tracing::warn!("Failed to fetch profile for {}: {}", user_id, e);
            None
        }
    }
}
