#![allow(dead_code)]

pub mod fake_remote;

use lulutong::client::{ClientConfig, HttpRemote, SessionSnapshot, SessionUser, SessionWatch};
use lulutong::config::auth::AuthConfig;
use lulutong::realtime::PostFeedHub;
use reqwest::Client;
use sea_orm::DatabaseConnection;
use sea_orm_migration::MigratorTrait;
use std::sync::Once;
use tokio::sync::{watch, OnceCell};

static INIT: Once = Once::new();
static MIGRATIONS: OnceCell<()> = OnceCell::const_new();

fn init_env() {
    INIT.call_once(|| {
        dotenv::dotenv().ok();
        std::env::set_var(
            "JWT_SECRET",
            "integration_test_secret_that_is_at_least_32_characters_long",
        );
        let config = lulutong::config::jwt::JwtConfig::from_env().unwrap();
        let _ = lulutong::utils::jwt::init_jwt_config(config);
    });
}

/// A ready session, as the bootstrapper would publish it.
pub fn ready_session(user: Option<SessionUser>) -> (watch::Sender<SessionSnapshot>, SessionWatch) {
    watch::channel(SessionSnapshot::ready(user, None))
}

/// A session that has not processed its first auth notification yet.
pub fn pending_session() -> (watch::Sender<SessionSnapshot>, SessionWatch) {
    watch::channel(SessionSnapshot::default())
}

pub struct TestApp {
    pub addr: String,
    pub db: DatabaseConnection,
    pub hub: PostFeedHub,
    pub client: Client,
}

impl TestApp {
    pub fn url(&self, path: &str) -> String {
        format!("{}/api/v1{}", self.addr, path)
    }

    /// A fresh, signed-out HTTP client handle against this server.
    pub fn remote(&self) -> HttpRemote {
        HttpRemote::new(&ClientConfig::default().with_api_url(self.addr.clone())).unwrap()
    }
}

/// Spawn the data service on a random port.
/// Returns `None` (and the test should return early) when no database is configured.
pub async fn spawn_app() -> Option<TestApp> {
    init_env();

    let database_url = match std::env::var("TEST_DATABASE_URL")
        .or_else(|_| std::env::var("DATABASE_URL"))
    {
        Ok(url) => url,
        Err(_) => {
            eprintln!("TEST_DATABASE_URL / DATABASE_URL not set, skipping");
            return None;
        }
    };

    let db = sea_orm::Database::connect(&database_url)
        .await
        .expect("Failed to connect to test database");

    MIGRATIONS
        .get_or_init(|| async {
            lulutong::migration::Migrator::up(&db, None)
                .await
                .expect("Failed to run migrations");
        })
        .await;

    let hub = PostFeedHub::new();

    let app = axum::Router::new()
        .route("/", axum::routing::get(|| async { "ok" }))
        .merge(lulutong::routes::create_routes())
        .layer(axum::extract::Extension(db.clone()))
        .layer(axum::extract::Extension(hub.clone()))
        .layer(axum::extract::Extension(AuthConfig::default()));

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind random port");
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    Some(TestApp {
        addr: format!("http://{}", addr),
        db,
        hub,
        client: Client::new(),
    })
}

/// Unique per call so tests can share one database without truncating it.
pub fn unique_email(prefix: &str) -> String {
    format!("{}_{}@ruc.edu.cn", prefix, uuid::Uuid::new_v4().simple())
}

pub fn unique_tag() -> String {
    uuid::Uuid::new_v4().simple().to_string()
}

/// Poll `cond` until it holds, failing the test after two seconds.
pub async fn wait_until(mut cond: impl FnMut() -> bool) {
    let deadline = tokio::time::Instant::now() + std::time::Duration::from_secs(2);
    while !cond() {
        assert!(
            tokio::time::Instant::now() < deadline,
            "condition not reached in time"
        );
        tokio::time::sleep(std::time::Duration::from_millis(5)).await;
    }
}

/// Drain every notice sent so far.
pub fn drain_notices(
    rx: &mut tokio::sync::mpsc::UnboundedReceiver<lulutong::client::Notice>,
) -> Vec<lulutong::client::Notice> {
    let mut notices = Vec::new();
    while let Ok(notice) = rx.try_recv() {
        notices.push(notice);
    }
    notices
}
