use crate::models::Category;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// Display name for authors without a nickname and for anonymous replies.
pub const ANONYMOUS_NAME: &str = "匿名用户";

/// A feed entry as read from `posts_with_profiles`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Post {
    pub id: i32,
    pub created_at: DateTime<Utc>,
    pub content: String,
    pub user_id: Uuid,
    pub category: Category,
    pub nickname: Option<String>,
    #[serde(default)]
    pub like_count: i64,
    #[serde(default)]
    pub reply_count: i64,
}

impl Post {
    pub fn author_name(&self) -> &str {
        self.nickname.as_deref().unwrap_or(ANONYMOUS_NAME)
    }
}

/// A raw `posts` row, as returned by an insert or carried by a change event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PostRow {
    pub id: i32,
    pub created_at: DateTime<Utc>,
    pub content: String,
    pub user_id: Uuid,
    pub category: Category,
}

impl From<PostRow> for Post {
    /// The raw row carries no join data, so the author is unknown and counts start at zero.
    fn from(row: PostRow) -> Self {
        Post {
            id: row.id,
            created_at: row.created_at,
            content: row.content,
            user_id: row.user_id,
            category: row.category,
            nickname: None,
            like_count: 0,
            reply_count: 0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Reply {
    pub id: i32,
    pub created_at: DateTime<Utc>,
    pub content: String,
    pub user_id: Uuid,
    pub post_id: i32,
    pub is_public: bool,
    pub is_anonymous: bool,
    /// Only populated when read through `replies_with_profiles`.
    #[serde(default)]
    pub nickname: Option<String>,
}

impl Reply {
    pub fn author_name(&self) -> &str {
        if self.is_anonymous {
            return ANONYMOUS_NAME;
        }
        self.nickname.as_deref().unwrap_or(ANONYMOUS_NAME)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Profile {
    pub id: Uuid,
    pub nickname: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionUser {
    pub id: Uuid,
    pub email: String,
}

/// Category selector of the feed; `All` is the "all" sentinel.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum CategoryFilter {
    #[default]
    All,
    Only(Category),
}

impl CategoryFilter {
    pub fn category(&self) -> Option<Category> {
        match self {
            CategoryFilter::All => None,
            CategoryFilter::Only(category) => Some(*category),
        }
    }
}

impl FromStr for CategoryFilter {
    type Err = crate::models::category::UnknownCategory;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "all" | "" => Ok(CategoryFilter::All),
            label => label.parse().map(CategoryFilter::Only),
        }
    }
}

impl fmt::Display for CategoryFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CategoryFilter::All => f.write_str("all"),
            CategoryFilter::Only(category) => f.write_str(category.as_str()),
        }
    }
}

/// One read of the joined post view.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FeedQuery {
    pub search: Option<String>,
    pub category: CategoryFilter,
}

impl FeedQuery {
    pub fn new(search: &str, category: CategoryFilter) -> Self {
        let search = Some(search.trim().to_string()).filter(|s| !s.is_empty());
        Self { search, category }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NewPost {
    #[serde(skip_serializing)]
    pub user_id: Uuid,
    pub content: String,
    pub category: Category,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NewReply {
    #[serde(skip_serializing)]
    pub post_id: i32,
    #[serde(skip_serializing)]
    pub user_id: Uuid,
    pub content: String,
    pub is_anonymous: bool,
}

/// Lifecycle of a single controller load. No retries.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum LoadState {
    #[default]
    Idle,
    Loading,
    Ready,
    Failed(String),
}
