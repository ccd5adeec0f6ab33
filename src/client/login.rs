use crate::client::error::{ClientError, ClientResult};
use crate::client::notice::Notifier;
use crate::client::remote::RemoteHandle;
use crate::client::types::SessionUser;
use std::sync::{Mutex, MutexGuard};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum AuthMode {
    #[default]
    SignIn,
    SignUp,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Credentials {
    pub email: String,
    pub password: String,
    pub mode: AuthMode,
}

/// Email + password form with a sign-in / sign-up toggle.
pub struct AuthForm {
    remote: RemoteHandle,
    notifier: Notifier,
    form: Mutex<Credentials>,
}

impl AuthForm {
    pub fn new(remote: RemoteHandle, notifier: Notifier) -> Self {
        Self {
            remote,
            notifier,
            form: Mutex::new(Credentials::default()),
        }
    }

    fn form(&self) -> MutexGuard<'_, Credentials> {
        self.form.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn set_email(&self, email: impl Into<String>) {
        self.form().email = email.into();
    }

    pub fn set_password(&self, password: impl Into<String>) {
        self.form().password = password.into();
    }

    pub fn toggle_mode(&self) -> AuthMode {
        let mut form = self.form();
        form.mode = match form.mode {
            AuthMode::SignIn => AuthMode::SignUp,
            AuthMode::SignUp => AuthMode::SignIn,
        };
        form.mode
    }

    pub fn mode(&self) -> AuthMode {
        self.form().mode
    }

    pub async fn submit(&self) -> ClientResult<SessionUser> {
        let creds = self.form().clone();

        if creds.email.trim().is_empty() || creds.password.is_empty() {
            let message = "请输入邮箱和密码";
            self.notifier.error(message);
            return Err(ClientError::Validation(message.to_string()));
        }

        match creds.mode {
            AuthMode::SignUp => match self.remote.sign_up(creds.email.trim(), &creds.password).await {
                Ok(user) => {
                    self.notifier.success("注册成功！请检查邮箱完成验证。");
                    Ok(user)
                }
                Err(e) => {
                    tracing::warn!("Sign-up failed: {}", e);
                    self.notifier.error(format!("注册失败：{e}"));
                    Err(e)
                }
            },
            AuthMode::SignIn => match self.remote.sign_in(creds.email.trim(), &creds.password).await {
                Ok(user) => {
                    self.notifier.success("登录成功！欢迎回来！");
                    Ok(user)
                }
                Err(e) => {
                    tracing::warn!("Sign-in failed: {}", e);
                    self.notifier.error(format!("登录失败：{e}"));
                    Err(e)
                }
            },
        }
    }

    pub async fn sign_out(&self) -> ClientResult<()> {
        self.remote.sign_out().await
    }
}
