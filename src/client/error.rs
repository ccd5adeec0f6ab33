use thiserror::Error;

#[derive(Error, Debug)]
pub enum ClientError {
    /// Rejected before any remote call was made.
    #[error("{0}")]
    Validation(String),

    #[error("请先登录")]
    NotSignedIn,

    #[error("只能操作自己发布的内容")]
    NotOwner,

    #[error("{message}")]
    Remote { status: u16, message: String },

    #[error("网络错误: {0}")]
    Http(#[from] reqwest::Error),

    #[error("响应解析失败: {0}")]
    Decode(#[from] serde_json::Error),
}

impl ClientError {
    pub fn remote(status: u16, message: impl Into<String>) -> Self {
        ClientError::Remote {
            status,
            message: message.into(),
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, ClientError::Remote { status: 404, .. })
    }
}

pub type ClientResult<T> = Result<T, ClientError>;
