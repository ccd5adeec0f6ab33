use crate::error::{AppError, AppResult};
use crate::middleware::AuthUser;
use crate::models::{Category, PostModel, PostWithProfileModel};
use crate::realtime::PostFeedHub;
use crate::response::ApiResponse;
use crate::services::post::{FeedFilter, PostService};
use axum::{extract::Path, extract::Query, response::IntoResponse, Extension, Json};
use chrono::{DateTime, Utc};
use sea_orm::DatabaseConnection;
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::Validate;

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreatePostRequest {
    /// Post body
    #[validate(length(min = 1, max = 5000))]
    pub content: String,
    /// One of 生活求助 / 学业探讨 / 失物招领
    pub category: Category,
}

/// A row of the `posts_with_profiles` view.
#[derive(Debug, Serialize, ToSchema)]
pub struct PostResponse {
    pub id: i32,
    pub created_at: DateTime<Utc>,
    pub content: String,
    pub user_id: Uuid,
    pub category: String,
    /// Author nickname; null when unset or the author is gone
    pub nickname: Option<String>,
    pub like_count: i64,
    pub reply_count: i64,
}

impl From<PostWithProfileModel> for PostResponse {
    fn from(p: PostWithProfileModel) -> Self {
        Self {
            id: p.id,
            created_at: p.created_at,
            content: p.content,
            user_id: p.user_id,
            category: p.category,
            nickname: p.nickname,
            like_count: p.like_count,
            reply_count: p.reply_count,
        }
    }
}

#[derive(Debug, Deserialize, IntoParams, ToSchema)]
pub struct FeedQuery {
    /// Case-insensitive substring of the content
    pub search: Option<String>,
    /// Category label; omit (or `all`) for every category
    pub category: Option<String>,
    /// Comma-separated post ids
    pub ids: Option<String>,
}

impl FeedQuery {
    fn into_filter(self) -> AppResult<FeedFilter> {
        let category = match self.category.as_deref().map(str::trim) {
            None | Some("") | Some("all") => None,
            Some(label) => Some(
                label
                    .parse::<Category>()
                    .map_err(|e| AppError::Validation(e.to_string()))?,
            ),
        };

        let ids = match self.ids {
            None => None,
            Some(raw) => Some(
                raw.split(',')
                    .map(str::trim)
                    .filter(|s| !s.is_empty())
                    .map(|s| {
                        s.parse::<i32>()
                            .map_err(|_| AppError::Validation(format!("Invalid post id: {s}")))
                    })
                    .collect::<AppResult<Vec<_>>>()?,
            ),
        };

        Ok(FeedFilter {
            search: self.search,
            category,
            ids,
        })
    }
}

#[utoipa::path(
    get,
    path = "/api/v1/posts",
    params(FeedQuery),
    responses(
        (status = 200, description = "Posts, newest first", body = Vec<PostResponse>),
        (status = 400, description = "Unknown category", body = AppError),
    ),
    tag = "posts"
)]
pub async fn list_posts(
    Extension(db): Extension<DatabaseConnection>,
    Query(params): Query<FeedQuery>,
) -> AppResult<impl IntoResponse> {
    let filter = params.into_filter()?;
    let service = PostService::new(db);
    let posts = service.feed(&filter).await?;
    let items: Vec<PostResponse> = posts.into_iter().map(PostResponse::from).collect();
    Ok(ApiResponse::ok(items))
}

#[utoipa::path(
    post,
    path = "/api/v1/posts",
    security(("jwt_token" = [])),
    request_body = CreatePostRequest,
    responses(
        (status = 200, description = "Inserted post row", body = PostModel),
        (status = 400, description = "Validation error", body = AppError),
        (status = 401, description = "Unauthorized", body = AppError),
    ),
    tag = "posts"
)]
pub async fn create_post(
    Extension(db): Extension<DatabaseConnection>,
    Extension(hub): Extension<PostFeedHub>,
    auth_user: AuthUser,
    Json(payload): Json<CreatePostRequest>,
) -> AppResult<impl IntoResponse> {
    if payload.content.trim().is_empty() {
        return Err(AppError::Validation("Content must not be empty".to_string()));
    }
    payload
        .validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;

    let service = PostService::new(db);
    let post = service
        .create(auth_user.user_id, &payload.content, payload.category)
        .await?;

    hub.publish_insert(&post);
    Ok(ApiResponse::ok(post))
}

#[utoipa::path(
    delete,
    path = "/api/v1/posts/{id}",
    security(("jwt_token" = [])),
    params(("id" = i32, Path, description = "Post ID")),
    responses(
        (status = 200, description = "Post deleted"),
        (status = 403, description = "Not the author", body = AppError),
        (status = 404, description = "Post not found", body = AppError),
    ),
    tag = "posts"
)]
pub async fn delete_post(
    Extension(db): Extension<DatabaseConnection>,
    auth_user: AuthUser,
    Path(id): Path<i32>,
) -> AppResult<impl IntoResponse> {
    let service = PostService::new(db);
    service.delete(id, auth_user.user_id).await?;
    Ok(ApiResponse::with_message((), "Post deleted"))
}
