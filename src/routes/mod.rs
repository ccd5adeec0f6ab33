use crate::handlers;
use crate::middleware::auth::auth_middleware;
use crate::realtime;
use axum::{middleware, routing, Router};

pub fn create_routes() -> Router {
    Router::new().nest("/api/v1", api_routes())
}

fn api_routes() -> Router {
    let auth = auth_routes();
    let public_read = public_read_routes();
    let protected = protected_routes().layer(middleware::from_fn(auth_middleware));

    auth.merge(public_read).merge(protected)
}

/// Auth routes: sign-up and password sign-in.
fn auth_routes() -> Router {
    Router::new()
        .route("/auth/signup", routing::post(handlers::sign_up))
        .route("/auth/token", routing::post(handlers::sign_in))
}

/// Public read routes: the joined views, profiles and the change feed.
fn public_read_routes() -> Router {
    Router::new()
        // Posts
        .route("/posts", routing::get(handlers::post::list_posts))
        // Replies
        .route(
            "/posts/{id}/replies",
            routing::get(handlers::reply::list_replies),
        )
        .route(
            "/users/{id}/replies",
            routing::get(handlers::reply::list_user_replies),
        )
        // Profiles
        .route(
            "/profiles/{id}",
            routing::get(handlers::profile::get_profile),
        )
        .route(
            "/profiles/by-nickname/{nickname}",
            routing::get(handlers::profile::get_profile_by_nickname),
        )
        // Realtime
        .route(
            "/realtime/posts",
            routing::get(realtime::posts::post_inserts),
        )
}

/// Protected routes: every authenticated read and write.
fn protected_routes() -> Router {
    Router::new()
        // Auth
        .route("/auth/user", routing::get(handlers::get_current_user))
        // Posts
        .route("/posts", routing::post(handlers::post::create_post))
        .route(
            "/posts/{id}",
            routing::delete(handlers::post::delete_post),
        )
        // Replies
        .route(
            "/posts/{id}/replies",
            routing::post(handlers::reply::create_reply),
        )
        .route(
            "/replies/{id}",
            routing::delete(handlers::reply::delete_reply),
        )
        .route(
            "/replies/{id}/visibility",
            routing::put(handlers::reply::set_reply_visibility),
        )
        // Profiles
        .route(
            "/profiles/me",
            routing::put(handlers::profile::update_my_profile),
        )
        // Likes
        .route(
            "/posts/{id}/like",
            routing::get(handlers::like::get_like)
                .put(handlers::like::add_like)
                .delete(handlers::like::remove_like),
        )
        // Bookmarks
        .route(
            "/posts/{id}/bookmark",
            routing::get(handlers::bookmark::get_bookmark)
                .put(handlers::bookmark::add_bookmark)
                .delete(handlers::bookmark::remove_bookmark),
        )
        .route(
            "/bookmarks",
            routing::get(handlers::bookmark::list_bookmarks),
        )
}
