use crate::error::AppResult;
use crate::middleware::AuthUser;
use crate::response::ApiResponse;
use crate::services::like::LikeService;
use axum::{extract::Path, response::IntoResponse, Extension};
use sea_orm::DatabaseConnection;
use serde::Serialize;
use utoipa::ToSchema;

#[derive(Debug, Serialize, ToSchema)]
pub struct LikeStateResponse {
    /// Whether the caller has liked the post
    pub liked: bool,
}

#[utoipa::path(
    get,
    path = "/api/v1/posts/{id}/like",
    security(("jwt_token" = [])),
    params(("id" = i32, Path, description = "Post ID")),
    responses(
        (status = 200, description = "Like membership", body = LikeStateResponse),
        (status = 401, description = "Unauthorized", body = crate::error::AppError),
    ),
    tag = "likes"
)]
pub async fn get_like(
    Extension(db): Extension<DatabaseConnection>,
    auth_user: AuthUser,
    Path(post_id): Path<i32>,
) -> AppResult<impl IntoResponse> {
    let service = LikeService::new(db);
    let liked = service.exists(auth_user.user_id, post_id).await?;
    Ok(ApiResponse::ok(LikeStateResponse { liked }))
}

#[utoipa::path(
    put,
    path = "/api/v1/posts/{id}/like",
    security(("jwt_token" = [])),
    params(("id" = i32, Path, description = "Post ID")),
    responses(
        (status = 200, description = "Liked", body = LikeStateResponse),
        (status = 404, description = "Post not found", body = crate::error::AppError),
    ),
    tag = "likes"
)]
pub async fn add_like(
    Extension(db): Extension<DatabaseConnection>,
    auth_user: AuthUser,
    Path(post_id): Path<i32>,
) -> AppResult<impl IntoResponse> {
    let service = LikeService::new(db);
    let liked = service.add_like(auth_user.user_id, post_id).await?;
    Ok(ApiResponse::ok(LikeStateResponse { liked }))
}

#[utoipa::path(
    delete,
    path = "/api/v1/posts/{id}/like",
    security(("jwt_token" = [])),
    params(("id" = i32, Path, description = "Post ID")),
    responses(
        (status = 200, description = "Like removed", body = LikeStateResponse),
        (status = 401, description = "Unauthorized", body = crate::error::AppError),
    ),
    tag = "likes"
)]
pub async fn remove_like(
    Extension(db): Extension<DatabaseConnection>,
    auth_user: AuthUser,
    Path(post_id): Path<i32>,
) -> AppResult<impl IntoResponse> {
    let service = LikeService::new(db);
    let liked = service.remove_like(auth_user.user_id, post_id).await?;
    Ok(ApiResponse::ok(LikeStateResponse { liked }))
}
