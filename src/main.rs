use axum::{extract::Extension, response::IntoResponse, routing::get, Json, Router};
use lulutong::{config, migration, realtime::PostFeedHub, routes, utils};
use sea_orm::{ConnectionTrait, DatabaseConnection, Statement};
use sea_orm_migration::MigratorTrait;
use serde_json::json;
use std::env;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};
use utoipa_swagger_ui::SwaggerUi;

#[derive(OpenApi)]
#[openapi(
    paths(
        health_check,
        // Auth routes
        lulutong::handlers::auth::sign_up,
        lulutong::handlers::auth::sign_in,
        lulutong::handlers::auth::get_current_user,
        // Post routes
        lulutong::handlers::post::list_posts,
        lulutong::handlers::post::create_post,
        lulutong::handlers::post::delete_post,
        // Reply routes
        lulutong::handlers::reply::list_replies,
        lulutong::handlers::reply::create_reply,
        lulutong::handlers::reply::delete_reply,
        lulutong::handlers::reply::set_reply_visibility,
        lulutong::handlers::reply::list_user_replies,
        // Profile routes
        lulutong::handlers::profile::get_profile,
        lulutong::handlers::profile::get_profile_by_nickname,
        lulutong::handlers::profile::update_my_profile,
        // Like routes
        lulutong::handlers::like::get_like,
        lulutong::handlers::like::add_like,
        lulutong::handlers::like::remove_like,
        // Bookmark routes
        lulutong::handlers::bookmark::get_bookmark,
        lulutong::handlers::bookmark::add_bookmark,
        lulutong::handlers::bookmark::remove_bookmark,
        lulutong::handlers::bookmark::list_bookmarks,
        // Realtime
        lulutong::realtime::posts::post_inserts,
    ),
    components(
        schemas(
            lulutong::response::ApiResponse<serde_json::Value>,
            lulutong::error::AppError,
            lulutong::models::Category,
            lulutong::models::PostModel,
            lulutong::models::ReplyModel,
            lulutong::models::ReplyWithProfileModel,
            lulutong::models::ProfileModel,
            // Auth
            lulutong::handlers::auth::SignUpRequest,
            lulutong::handlers::auth::SignInRequest,
            lulutong::handlers::auth::SessionResponse,
            lulutong::handlers::auth::UserResponse,
            // Post
            lulutong::handlers::post::PostResponse,
            lulutong::handlers::post::CreatePostRequest,
            lulutong::handlers::post::FeedQuery,
            // Reply
            lulutong::handlers::reply::CreateReplyRequest,
            lulutong::handlers::reply::VisibilityRequest,
            // Profile
            lulutong::handlers::profile::UpdateProfileRequest,
            // Reactions
            lulutong::handlers::like::LikeStateResponse,
            lulutong::handlers::bookmark::BookmarkStateResponse,
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "auth", description = "Account and session operations"),
        (name = "posts", description = "Post feed operations"),
        (name = "replies", description = "Reply operations"),
        (name = "profiles", description = "Profile operations"),
        (name = "likes", description = "Like operations"),
        (name = "bookmarks", description = "Bookmark operations"),
        (name = "realtime", description = "Change feed for inserted posts"),
    )
)]
struct ApiDoc;

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "jwt_token",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            );
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "lulutong=debug,tower_http=debug,axum=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Validate configuration before doing anything else
    let jwt_config = validate_config()?;

    utils::jwt::init_jwt_config(jwt_config)?;

    tracing::info!("Starting lulutong data service v{}...", env!("CARGO_PKG_VERSION"));

    let db = config::database::get_database().await?;
    tracing::info!("Database connected successfully");

    migration::Migrator::up(&db, None).await?;
    tracing::info!("Database migrations applied successfully");

    let auth_config = config::auth::AuthConfig::from_env();
    match auth_config.allowed_email_domain.as_deref() {
        Some(domain) => tracing::info!("Sign-up restricted to @{}", domain),
        None => tracing::warn!("ALLOWED_EMAIL_DOMAIN not set, any email may sign up"),
    }

    let hub = PostFeedHub::new();

    let app = create_app()
        .layer(Extension(db))
        .layer(Extension(hub))
        .layer(Extension(auth_config));

    let host = env::var("HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
    let port = env::var("PORT").unwrap_or_else(|_| "3000".to_string());
    let addr = format!("{}:{}", host, port);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("Listening on http://{}", addr);
    tracing::info!("Swagger UI available at http://{}/swagger-ui/", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server shut down gracefully");
    Ok(())
}

/// Validate all required configuration at startup (fail-fast).
fn validate_config() -> anyhow::Result<config::jwt::JwtConfig> {
    let jwt_config = config::jwt::JwtConfig::from_env()?;

    // DATABASE_URL is checked here for an early error; the connection happens later
    if env::var("DATABASE_URL").is_err() {
        return Err(anyhow::anyhow!(
            "DATABASE_URL environment variable must be set"
        ));
    }

    Ok(jwt_config)
}

fn build_cors_layer() -> CorsLayer {
    use axum::http::{header, HeaderValue, Method};

    let origins_str = env::var("CORS_ORIGINS").unwrap_or_else(|_| "*".to_string());

    let cors = CorsLayer::new()
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE]);

    if origins_str == "*" {
        cors.allow_origin(tower_http::cors::Any)
    } else {
        let origins: Vec<HeaderValue> = origins_str
            .split(',')
            .filter_map(|s| s.trim().parse().ok())
            .collect();
        cors.allow_origin(origins)
    }
}

fn create_app() -> Router {
    Router::new()
        .route("/", get(health_check))
        .merge(routes::create_routes())
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .layer(TraceLayer::new_for_http())
        .layer(build_cors_layer())
}

#[utoipa::path(
    get,
    path = "/",
    responses(
        (status = 200, description = "Health check successful", body = serde_json::Value)
    )
)]
async fn health_check(Extension(db): Extension<DatabaseConnection>) -> impl IntoResponse {
    let db_ok = db
        .query_one(Statement::from_string(
            sea_orm::DatabaseBackend::Postgres,
            "SELECT 1".to_string(),
        ))
        .await
        .is_ok();

    let status = if db_ok { "ok" } else { "degraded" };

    Json(json!({
        "status": status,
        "service": "lulutong",
        "version": env!("CARGO_PKG_VERSION"),
        "database": db_ok,
    }))
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to install CTRL+C signal handler: {}", e);
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received, gracefully shutting down...");
}
