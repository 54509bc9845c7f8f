//! Test utilities shared by unit and HTTP tests.

use crate::auth::password::{Argon2Params, hash_string_with_params};
use crate::auth::credentials::encode_basic;
use crate::auth::utils::generate_api_key;
use crate::config::Config;
use crate::db::handlers::{Repository, Sessions, Users};
use crate::db::models::sessions::{SessionCreateDBRequest, SessionDBResponse};
use crate::db::models::users::{UserCreateDBRequest, UserDBResponse};
use crate::types::UserId;
use crate::{AppState, Application};
use axum_test::TestServer;
use chrono::{Duration, Utc};
use sqlx::SqlitePool;
use sqlx::sqlite::SqlitePoolOptions;

pub const TEST_ROOT_PASSWORD: &str = "root-password";

/// Cheapest parameters Argon2 accepts, to keep tests fast.
pub fn test_argon2_params() -> Argon2Params {
    Argon2Params {
        memory_kib: 8,
        iterations: 1,
        parallelism: 1,
    }
}

pub fn create_test_config() -> Config {
    let mut config = Config::default();
    config.host = "127.0.0.1".to_string();
    config.port = 0;
    config.database.url = "sqlite::memory:".to_string();
    config.database.max_connections = 1;
    config.root_password = Some(TEST_ROOT_PASSWORD.to_string());
    config.auth.argon2 = test_argon2_params();
    config
}

/// A migrated in-memory database.
///
/// The pool holds exactly one connection that is never recycled; closing it would drop the
/// database. Tests must not hold a connection while calling code that acquires one.
pub async fn create_test_pool() -> SqlitePool {
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .min_connections(1)
        .idle_timeout(None)
        .max_lifetime(None)
        .connect("sqlite::memory:")
        .await
        .expect("Failed to open in-memory database");

    crate::migrator().run(&pool).await.expect("Failed to run migrations");
    pool
}

pub async fn create_test_state() -> AppState {
    AppState::builder().db(create_test_pool().await).config(create_test_config()).build()
}

/// Full application over a fresh database, with root's password set to [`TEST_ROOT_PASSWORD`].
pub async fn create_test_server() -> (TestServer, AppState) {
    create_test_server_with_config(create_test_config()).await
}

/// Full application over a fresh database with a custom config.
pub async fn create_test_server_with_config(config: Config) -> (TestServer, AppState) {
    let pool = create_test_pool().await;
    let state = AppState::builder().db(pool.clone()).config(config.clone()).build();

    let app = Application::new_with_pool(config, pool)
        .await
        .expect("Failed to create application");

    (app.into_test_server(), state)
}

/// Create request for a user whose password hash is a placeholder.
pub fn user_request(username: &str) -> UserCreateDBRequest {
    UserCreateDBRequest {
        username: username.to_string(),
        first_name: "Test".to_string(),
        last_name: "User".to_string(),
        email: format!("{username}@example.com"),
        phone: String::new(),
        password_hash: "not-a-real-hash".to_string(),
    }
}

/// Insert a user that can log in with `password`.
pub async fn create_test_user(pool: &SqlitePool, username: &str, password: &str) -> UserDBResponse {
    let mut request = user_request(username);
    request.password_hash = hash_string_with_params(password, Some(test_argon2_params())).expect("Failed to hash password");

    let mut conn = pool.acquire().await.expect("Failed to acquire connection");
    Users::new(&mut conn).create(&request).await.expect("Failed to create test user")
}

/// Insert a session for `user_id` valid for another day.
pub async fn create_test_session(pool: &SqlitePool, user_id: UserId) -> SessionDBResponse {
    let mut conn = pool.acquire().await.expect("Failed to acquire connection");
    Sessions::new(&mut conn)
        .create(&SessionCreateDBRequest {
            user_id,
            key: generate_api_key(),
            expires_at: Utc::now() + Duration::days(1),
        })
        .await
        .expect("Failed to create test session")
}

/// `Authorization` value for a fresh session belonging to the root user.
pub async fn root_key_header(pool: &SqlitePool) -> String {
    let root = {
        let mut conn = pool.acquire().await.expect("Failed to acquire connection");
        Users::new(&mut conn)
            .get_user_by_username("root")
            .await
            .expect("Failed to look up root")
            .expect("Root user missing")
    };
    let session = create_test_session(pool, root.id).await;
    encode_basic(&root.username, &session.key)
}

/// Serve the application on a random local port. Returns its base URL.
pub async fn spawn_test_app() -> (String, AppState) {
    let pool = create_test_pool().await;
    let config = create_test_config();
    let state = AppState::builder().db(pool.clone()).config(config.clone()).build();

    let router = Application::new_with_pool(config, pool)
        .await
        .expect("Failed to create application")
        .into_router();

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.expect("Failed to bind test listener");
    let addr = listener.local_addr().expect("Failed to read listener address");
    tokio::spawn(axum::serve(listener, router.into_make_service()).into_future());

    (format!("http://{addr}"), state)
}
