//! # chapterd
//!
//! Backend for a small organization's website: a JSON API over users, sessions and
//! notifications, stored in SQLite.
//!
//! ## Authentication
//!
//! Every protected route takes HTTP Basic credentials. `POST /api/v0/sessions` exchanges a
//! username and password for a session API key. Every other protected route expects
//! `username:api_key`, and each use pushes the session's expiry forward by the configured
//! duration. See [`auth`] for the strategies and the exact rejection messages.
//!
//! ## Layout
//!
//! - [`api`]: Axum handlers, request/response models and the error envelope
//! - [`auth`]: Credential parsing, authentication strategies, middleware and extractors
//! - [`db`]: Repositories over the SQLite schema in `migrations/`
//! - [`client`]: Typed HTTP client for the same API
//! - [`config`]: YAML + environment configuration
//! - [`telemetry`]: Tracing setup
//!
//! ## Startup
//!
//! [`Application::new`] opens the pool, applies migrations and, when the database holds no
//! users, creates a root account. [`Application::serve`] then runs until the shutdown future
//! resolves.

pub mod api;
pub mod auth;
pub mod client;
pub mod config;
pub mod db;
pub mod errors;
pub mod telemetry;
#[cfg(test)]
mod test_utils;
pub mod types;

use crate::api::handlers::{auth as login, notifications, sessions, status, users};
use crate::api::response::{method_not_allowed, not_found, strip_head_body};
use crate::auth::authenticator::Authenticator;
use crate::auth::middleware::{AuthGuard, require_auth};
use crate::auth::password::{self, Argon2Params};
use crate::auth::utils::{GENERATED_PASSWORD_LEN, generate_password};
use crate::db::handlers::{Repository, Users};
use crate::db::models::users::{UserCreateDBRequest, UserDBResponse};
use axum::{
    Router,
    middleware::{from_fn, from_fn_with_state},
    routing::{get, post},
};
use bon::Builder;
pub use config::Config;
use sqlx::SqlitePool;
use std::time::Duration;
use tokio::net::TcpListener;
use tokio::sync::oneshot;
use tower_http::trace::{DefaultMakeSpan, DefaultOnRequest, DefaultOnResponse, TraceLayer};
use tracing::{Level, debug, info, instrument, warn};

pub use types::{NotificationId, SessionId, UserId};

/// Application state shared across all request handlers.
///
/// ```ignore
/// let state = AppState::builder().db(pool).config(config).build();
/// ```
#[derive(Clone, Builder)]
pub struct AppState {
    pub db: SqlitePool,
    pub config: Config,
}

/// Get the database migrator
pub fn migrator() -> sqlx::migrate::Migrator {
    sqlx::migrate!("./migrations")
}

/// Create the root user if the database has no users yet.
///
/// When `password` is `None` a random one is generated and logged once, since there is no other
/// way to learn it. Returns the created user, or `None` when users already exist.
#[instrument(skip_all, fields(username = %username))]
pub async fn create_initial_root_user(
    username: &str,
    password: Option<&str>,
    params: Argon2Params,
    db: &SqlitePool,
) -> anyhow::Result<Option<UserDBResponse>> {
    let (password, generated) = match password {
        Some(password) => (password.to_string(), false),
        None => (generate_password(GENERATED_PASSWORD_LEN), true),
    };

    let hash_input = password.clone();
    let password_hash = tokio::task::spawn_blocking(move || password::hash_string_with_params(&hash_input, Some(params))).await??;

    // Use a transaction so concurrent starts cannot both create the account
    let mut tx = db.begin().await?;
    let mut user_repo = Users::new(&mut tx);

    if user_repo.count().await? > 0 {
        debug!("Users already exist, skipping root user creation");
        return Ok(None);
    }

    let created = user_repo
        .create(&UserCreateDBRequest {
            username: username.to_string(),
            first_name: "Root".to_string(),
            last_name: "User".to_string(),
            email: format!("{username}@localhost"),
            phone: String::new(),
            password_hash,
        })
        .await?;

    tx.commit().await?;

    if generated {
        warn!("Created root user '{}' with generated password: {}", username, password);
    } else {
        info!("Created root user '{}'", username);
    }

    Ok(Some(created))
}

/// Build the application router with all endpoints under `/api/v0`.
pub fn build_router(state: AppState) -> Router {
    let guard = |authenticator: Authenticator| from_fn_with_state(AuthGuard::new(state.clone(), authenticator), require_auth);
    let password_auth = guard(Authenticator::Password);
    let key_auth = guard(Authenticator::Key);
    let basic_auth = guard(Authenticator::Basic);

    let api_routes = Router::new()
        .route("/status", get(status::get_status).fallback(method_not_allowed))
        .route("/openapi.json", get(api::openapi::openapi_json).fallback(method_not_allowed))
        .route(
            "/login",
            get(login::login).route_layer(password_auth).fallback(method_not_allowed),
        )
        .route(
            "/sessions",
            post(sessions::create_session)
                .route_layer(basic_auth)
                .merge(
                    get(sessions::get_session)
                        .delete(sessions::delete_session)
                        .route_layer(key_auth.clone()),
                )
                .fallback(method_not_allowed),
        )
        .route(
            "/users",
            get(users::list_users)
                .post(users::create_user)
                .route_layer(key_auth.clone())
                .fallback(method_not_allowed),
        )
        .route(
            "/users/{id}",
            get(users::get_user)
                .put(users::update_user)
                .delete(users::delete_user)
                .route_layer(key_auth.clone())
                .fallback(method_not_allowed),
        )
        .route(
            "/notifications",
            get(notifications::list_notifications)
                .route_layer(key_auth)
                .fallback(method_not_allowed),
        )
        .with_state(state);

    Router::new()
        .nest("/api/v0", api_routes)
        .fallback(not_found)
        .layer(from_fn(strip_head_body))
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_request(DefaultOnRequest::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
}

/// Serve `router` until `shutdown` resolves, then give open connections `deadline` to finish.
///
/// Connections still running when the deadline passes are abandoned and end with the process.
pub async fn serve_with_deadline<F>(listener: TcpListener, router: Router, shutdown: F, deadline: Duration) -> anyhow::Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    let (signalled_tx, signalled_rx) = oneshot::channel::<()>();
    let shutdown = async move {
        shutdown.await;
        let _ = signalled_tx.send(());
    };

    let server = axum::serve(listener, router.into_make_service())
        .with_graceful_shutdown(shutdown)
        .into_future();
    tokio::pin!(server);

    let drain_deadline = async move {
        match signalled_rx.await {
            Ok(()) => tokio::time::sleep(deadline).await,
            // The server finished without a signal; the other branch wins
            Err(_) => std::future::pending().await,
        }
    };

    tokio::select! {
        result = &mut server => result?,
        () = drain_deadline => {
            warn!(
                "Connections still open {} after shutdown signal, closing without waiting",
                humantime::format_duration(deadline)
            );
        }
    }

    Ok(())
}

pub struct Application {
    router: Router,
    config: Config,
    pool: SqlitePool,
}

impl Application {
    /// Create a new application instance with all resources initialized
    pub async fn new(config: Config) -> anyhow::Result<Self> {
        debug!("Starting with database {}", config.database.url);

        let pool = db::connect(&config.database).await?;
        Self::new_with_pool(config, pool).await
    }

    /// Create an application over an existing pool.
    pub async fn new_with_pool(config: Config, pool: SqlitePool) -> anyhow::Result<Self> {
        if config.database.read_only {
            info!("Database is read-only, skipping migrations and root user setup");
        } else {
            migrator().run(&pool).await?;
            create_initial_root_user(&config.root_username, config.root_password.as_deref(), config.auth.argon2, &pool).await?;
        }

        info!(
            "Sessions expire after {} without use",
            humantime::format_duration(config.auth.session_duration)
        );

        let app_state = AppState::builder().db(pool.clone()).config(config.clone()).build();
        let router = build_router(app_state);

        Ok(Self { router, config, pool })
    }

    /// Convert application into a test server (for tests)
    #[cfg(test)]
    pub fn into_test_server(self) -> axum_test::TestServer {
        axum_test::TestServer::new(self.router).expect("Failed to create test server")
    }

    #[cfg(test)]
    pub fn into_router(self) -> Router {
        self.router
    }

    /// Start serving the application
    pub async fn serve<F>(self, shutdown: F) -> anyhow::Result<()>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let bind_addr = self.config.bind_address();
        let listener = TcpListener::bind(&bind_addr).await?;
        info!("Listening on http://{}", bind_addr);

        serve_with_deadline(listener, self.router, shutdown, self.config.shutdown_timeout).await?;

        // Close database connections
        info!("Closing database connections...");
        if tokio::time::timeout(self.config.shutdown_timeout, self.pool.close()).await.is_err() {
            warn!("Database connections still checked out, exiting without closing them");
        }

        Ok(())
    }
}
