use crate::client::error::{ClientError, ClientResult};
use crate::client::notice::Notifier;
use crate::client::remote::RemoteHandle;
use crate::client::session::SessionWatch;
use crate::client::types::{NewPost, PostRow};
use crate::models::Category;
use std::future::Future;
use std::sync::{Mutex, MutexGuard};

const MISSING_FIELDS: &str = "请填写内容并选择一个分类！";

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ComposerForm {
    pub content: String,
    pub category: Option<Category>,
}

/// New-post form.
pub struct PostComposer {
    remote: RemoteHandle,
    session: SessionWatch,
    notifier: Notifier,
    form: Mutex<ComposerForm>,
}

impl PostComposer {
    pub fn new(remote: RemoteHandle, session: SessionWatch, notifier: Notifier) -> Self {
        Self {
            remote,
            session,
            notifier,
            form: Mutex::new(ComposerForm::default()),
        }
    }

    fn form_mut(&self) -> MutexGuard<'_, ComposerForm> {
        self.form.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn form(&self) -> ComposerForm {
        self.form_mut().clone()
    }

    pub fn set_content(&self, content: impl Into<String>) {
        self.form_mut().content = content.into();
    }

    pub fn set_category(&self, category: Option<Category>) {
        self.form_mut().category = category;
    }

    /// Insert the post, then run `on_posted` (usually a feed refresh).
    pub async fn submit<F, Fut>(&self, on_posted: F) -> ClientResult<PostRow>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = ()>,
    {
        let form = self.form();
        let category = match form.category {
            Some(category) if !form.content.trim().is_empty() => category,
            _ => {
                self.notifier.error(MISSING_FIELDS);
                return Err(ClientError::Validation(MISSING_FIELDS.to_string()));
            }
        };

        let Some(user_id) = self.session.borrow().user_id() else {
            self.notifier.error(format!("发布失败：{}", ClientError::NotSignedIn));
            return Err(ClientError::NotSignedIn);
        };

        let new_post = NewPost {
            user_id,
            content: form.content,
            category,
        };

        match self.remote.create_post(&new_post).await {
            Ok(row) => {
                self.notifier.success("发布成功！");
                *self.form_mut() = ComposerForm::default();
                on_posted().await;
                Ok(row)
            }
            Err(e) => {
                tracing::warn!("Failed to create post: {}", e);
                self.notifier.error(format!("发布失败：{e}"));
                Err(e)
            }
        }
    }
}
