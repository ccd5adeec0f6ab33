use crate::error::AppResult;
use crate::middleware::AuthUser;
use crate::response::ApiResponse;
use crate::services::bookmark::BookmarkService;
use axum::{extract::Path, response::IntoResponse, Extension};
use sea_orm::DatabaseConnection;
use serde::Serialize;
use utoipa::ToSchema;

#[derive(Debug, Serialize, ToSchema)]
pub struct BookmarkStateResponse {
    /// Whether the post is bookmarked by the caller
    pub bookmarked: bool,
}

#[utoipa::path(
    get,
    path = "/api/v1/posts/{id}/bookmark",
    security(("jwt_token" = [])),
    params(("id" = i32, Path, description = "Post ID")),
    responses(
        (status = 200, description = "Bookmark membership", body = BookmarkStateResponse),
        (status = 401, description = "Unauthorized", body = crate::error::AppError),
    ),
    tag = "bookmarks"
)]
pub async fn get_bookmark(
    Extension(db): Extension<DatabaseConnection>,
    auth_user: AuthUser,
    Path(post_id): Path<i32>,
) -> AppResult<impl IntoResponse> {
    let service = BookmarkService::new(db);
    let bookmarked = service.exists(auth_user.user_id, post_id).await?;
    Ok(ApiResponse::ok(BookmarkStateResponse { bookmarked }))
}

#[utoipa::path(
    put,
    path = "/api/v1/posts/{id}/bookmark",
    security(("jwt_token" = [])),
    params(("id" = i32, Path, description = "Post ID")),
    responses(
        (status = 200, description = "Bookmarked", body = BookmarkStateResponse),
        (status = 401, description = "Unauthorized", body = crate::error::AppError),
    ),
    tag = "bookmarks"
)]
pub async fn add_bookmark(
    Extension(db): Extension<DatabaseConnection>,
    auth_user: AuthUser,
    Path(post_id): Path<i32>,
) -> AppResult<impl IntoResponse> {
    let service = BookmarkService::new(db);
    let bookmarked = service.add_bookmark(auth_user.user_id, post_id).await?;
    Ok(ApiResponse::ok(BookmarkStateResponse { bookmarked }))
}

#[utoipa::path(
    delete,
    path = "/api/v1/posts/{id}/bookmark",
    security(("jwt_token" = [])),
    params(("id" = i32, Path, description = "Post ID")),
    responses(
        (status = 200, description = "Bookmark removed", body = BookmarkStateResponse),
        (status = 401, description = "Unauthorized", body = crate::error::AppError),
    ),
    tag = "bookmarks"
)]
pub async fn remove_bookmark(
    Extension(db): Extension<DatabaseConnection>,
    auth_user: AuthUser,
    Path(post_id): Path<i32>,
) -> AppResult<impl IntoResponse> {
    let service = BookmarkService::new(db);
    let bookmarked = service.remove_bookmark(auth_user.user_id, post_id).await?;
    Ok(ApiResponse::ok(BookmarkStateResponse { bookmarked }))
}

#[utoipa::path(
    get,
    path = "/api/v1/bookmarks",
    security(("jwt_token" = [])),
    responses(
        (status = 200, description = "Bookmarked post ids, newest first", body = Vec<i32>),
        (status = 401, description = "Unauthorized", body = crate::error::AppError),
    ),
    tag = "bookmarks"
)]
pub async fn list_bookmarks(
    Extension(db): Extension<DatabaseConnection>,
    auth_user: AuthUser,
) -> AppResult<impl IntoResponse> {
    let service = BookmarkService::new(db);
    let ids = service.list_post_ids(auth_user.user_id).await?;
    Ok(ApiResponse::ok(ids))
}
