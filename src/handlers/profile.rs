use crate::error::AppResult;
use crate::middleware::AuthUser;
use crate::models::ProfileModel;
use crate::response::ApiResponse;
use crate::services::profile::ProfileService;
use axum::{extract::Path, response::IntoResponse, Extension, Json};
use sea_orm::DatabaseConnection;
use serde::Deserialize;
use utoipa::ToSchema;
use uuid::Uuid;

#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateProfileRequest {
    /// New nickname; blank clears it
    pub nickname: String,
}

#[utoipa::path(
    get,
    path = "/api/v1/profiles/{id}",
    params(("id" = Uuid, Path, description = "Profile (user) ID")),
    responses(
        (status = 200, description = "Profile row", body = ProfileModel),
        (status = 404, description = "Profile not found"),
    ),
    tag = "profiles"
)]
pub async fn get_profile(
    Extension(db): Extension<DatabaseConnection>,
    Path(id): Path<Uuid>,
) -> AppResult<impl IntoResponse> {
    let service = ProfileService::new(db);
    let profile = service.get_by_id(id).await?;
    Ok(ApiResponse::ok(profile))
}

#[utoipa::path(
    get,
    path = "/api/v1/profiles/by-nickname/{nickname}",
    params(("nickname" = String, Path, description = "Nickname")),
    responses(
        (status = 200, description = "Profile row", body = ProfileModel),
        (status = 404, description = "No such nickname"),
    ),
    tag = "profiles"
)]
pub async fn get_profile_by_nickname(
    Extension(db): Extension<DatabaseConnection>,
    Path(nickname): Path<String>,
) -> AppResult<impl IntoResponse> {
    let service = ProfileService::new(db);
    let profile = service.get_by_nickname(&nickname).await?;
    Ok(ApiResponse::ok(profile))
}

#[utoipa::path(
    put,
    path = "/api/v1/profiles/me",
    security(("jwt_token" = [])),
    request_body = UpdateProfileRequest,
    responses(
        (status = 200, description = "Updated profile", body = ProfileModel),
        (status = 409, description = "Nickname already taken"),
    ),
    tag = "profiles"
)]
pub async fn update_my_profile(
    Extension(db): Extension<DatabaseConnection>,
    auth_user: AuthUser,
    Json(payload): Json<UpdateProfileRequest>,
) -> AppResult<impl IntoResponse> {
    let service = ProfileService::new(db);
    let profile = service
        .update_nickname(auth_user.user_id, &payload.nickname)
        .await?;
    Ok(ApiResponse::ok(profile))
}
