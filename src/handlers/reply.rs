use crate::error::{AppError, AppResult};
use crate::middleware::{AuthUser, MaybeAuthUser};
use crate::models::{ReplyModel, ReplyWithProfileModel};
use crate::response::ApiResponse;
use crate::services::reply::ReplyService;
use axum::{extract::Path, extract::Query, response::IntoResponse, Extension, Json};
use sea_orm::DatabaseConnection;
use serde::Deserialize;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::Validate;

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateReplyRequest {
    #[validate(length(min = 1, max = 2000))]
    pub content: String,
    /// Hide the author's nickname when displayed
    #[serde(default)]
    pub is_anonymous: bool,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct VisibilityRequest {
    pub is_public: bool,
}

#[derive(Debug, Deserialize, IntoParams)]
pub struct UserRepliesQuery {
    /// Include replies hidden from the public profile (owner only)
    #[serde(default)]
    pub include_private: bool,
}

#[utoipa::path(
    get,
    path = "/api/v1/posts/{id}/replies",
    params(("id" = i32, Path, description = "Post ID")),
    responses(
        (status = 200, description = "Replies, oldest first", body = Vec<ReplyWithProfileModel>),
    ),
    tag = "replies"
)]
pub async fn list_replies(
    Extension(db): Extension<DatabaseConnection>,
    Path(post_id): Path<i32>,
) -> AppResult<impl IntoResponse> {
    let service = ReplyService::new(db);
    let replies = service.list_by_post(post_id).await?;
    Ok(ApiResponse::ok(replies))
}

#[utoipa::path(
    post,
    path = "/api/v1/posts/{id}/replies",
    security(("jwt_token" = [])),
    params(("id" = i32, Path, description = "Post ID")),
    request_body = CreateReplyRequest,
    responses(
        (status = 200, description = "Inserted reply row", body = ReplyModel),
        (status = 400, description = "Validation error", body = AppError),
        (status = 404, description = "Post not found", body = AppError),
    ),
    tag = "replies"
)]
pub async fn create_reply(
    Extension(db): Extension<DatabaseConnection>,
    auth_user: AuthUser,
    Path(post_id): Path<i32>,
    Json(payload): Json<CreateReplyRequest>,
) -> AppResult<impl IntoResponse> {
    if payload.content.trim().is_empty() {
        return Err(AppError::Validation("Content must not be empty".to_string()));
    }
    payload
        .validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;

    let service = ReplyService::new(db);
    let reply = service
        .create(post_id, auth_user.user_id, &payload.content, payload.is_anonymous)
        .await?;
    Ok(ApiResponse::ok(reply))
}

#[utoipa::path(
    delete,
    path = "/api/v1/replies/{id}",
    security(("jwt_token" = [])),
    params(("id" = i32, Path, description = "Reply ID")),
    responses(
        (status = 200, description = "Reply deleted"),
        (status = 403, description = "Not the author", body = AppError),
        (status = 404, description = "Reply not found", body = AppError),
    ),
    tag = "replies"
)]
pub async fn delete_reply(
    Extension(db): Extension<DatabaseConnection>,
    auth_user: AuthUser,
    Path(id): Path<i32>,
) -> AppResult<impl IntoResponse> {
    let service = ReplyService::new(db);
    service.delete(id, auth_user.user_id).await?;
    Ok(ApiResponse::with_message((), "Reply deleted"))
}

#[utoipa::path(
    put,
    path = "/api/v1/replies/{id}/visibility",
    security(("jwt_token" = [])),
    params(("id" = i32, Path, description = "Reply ID")),
    request_body = VisibilityRequest,
    responses(
        (status = 200, description = "Updated reply row", body = ReplyModel),
        (status = 403, description = "Not the author", body = AppError),
        (status = 404, description = "Reply not found", body = AppError),
    ),
    tag = "replies"
)]
pub async fn set_reply_visibility(
    Extension(db): Extension<DatabaseConnection>,
    auth_user: AuthUser,
    Path(id): Path<i32>,
    Json(payload): Json<VisibilityRequest>,
) -> AppResult<impl IntoResponse> {
    let service = ReplyService::new(db);
    let reply = service
        .set_visibility(id, auth_user.user_id, payload.is_public)
        .await?;
    Ok(ApiResponse::ok(reply))
}

#[utoipa::path(
    get,
    path = "/api/v1/users/{id}/replies",
    params(
        ("id" = Uuid, Path, description = "Author user ID"),
        UserRepliesQuery,
    ),
    responses(
        (status = 200, description = "Replies, newest first", body = Vec<ReplyModel>),
    ),
    tag = "replies"
)]
pub async fn list_user_replies(
    Extension(db): Extension<DatabaseConnection>,
    MaybeAuthUser(viewer): MaybeAuthUser,
    Path(user_id): Path<Uuid>,
    Query(params): Query<UserRepliesQuery>,
) -> AppResult<impl IntoResponse> {
    // Private replies are only ever shown to their author.
    let include_private = params.include_private && viewer == Some(user_id);

    let service = ReplyService::new(db);
    let replies = service.list_by_user(user_id, include_private).await?;
    Ok(ApiResponse::ok(replies))
}
