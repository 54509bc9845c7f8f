use crate::{
    AppState,
    api::models::users::{UserInput, UserResponse, UsersResponse},
    auth::password,
    db::{
        errors::DbError,
        handlers::{Repository, Users, users::UserFilter},
        models::users::UserCreateDBRequest,
    },
    errors::{Error, Result},
    types::UserId,
};
use axum::{
    body::Bytes,
    extract::{Path, State},
    http::StatusCode,
    response::Json,
};

fn parse_user_id(raw: &str) -> Result<UserId> {
    raw.parse().map_err(|_| Error::bad_request("invalid user ID"))
}

fn user_not_found(id: UserId) -> Error {
    Error::NotFound {
        resource: "user".to_string(),
        id: id.to_string(),
    }
}

/// Validate a user body and hash its password off the async runtime.
async fn to_db_request(state: &AppState, body: &[u8]) -> Result<UserCreateDBRequest> {
    let input = UserInput::from_json(body)?;
    input.validate()?;

    let params = state.config.auth.argon2;
    let UserInput {
        username,
        first_name,
        last_name,
        email,
        phone,
        password,
    } = input;

    let password_hash = tokio::task::spawn_blocking(move || password::hash_string_with_params(&password, Some(params)))
        .await
        .map_err(|e| Error::Other(anyhow::anyhow!("password hashing task failed: {e}")))??;

    Ok(UserCreateDBRequest {
        username,
        first_name,
        last_name,
        email,
        phone,
        password_hash,
    })
}

/// List all users.
#[utoipa::path(
    get,
    path = "/users",
    tag = "users",
    summary = "List users",
    responses(
        (status = 200, description = "All users", body = UsersResponse),
        (status = 401, description = "Unauthorized"),
        (status = 500, description = "Internal server error"),
    ),
    security(
        ("BasicAuth" = [])
    )
)]
#[tracing::instrument(skip_all)]
pub async fn list_users(State(state): State<AppState>) -> Result<Json<UsersResponse>> {
    let mut conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    let users = Users::new(&mut conn).list(&UserFilter::default()).await?;

    Ok(Json(UsersResponse {
        users: users.into_iter().map(UserResponse::from).collect(),
    }))
}

/// Create a user.
#[utoipa::path(
    post,
    path = "/users",
    tag = "users",
    summary = "Create user",
    request_body = UserInput,
    responses(
        (status = 201, description = "User created", body = UsersResponse),
        (status = 400, description = "Invalid JSON, empty field or invalid email"),
        (status = 401, description = "Unauthorized"),
        (status = 409, description = "Username or email already taken"),
        (status = 500, description = "Internal server error"),
    ),
    security(
        ("BasicAuth" = [])
    )
)]
#[tracing::instrument(skip_all)]
pub async fn create_user(State(state): State<AppState>, body: Bytes) -> Result<(StatusCode, Json<UsersResponse>)> {
    let request = to_db_request(&state, &body).await?;

    let mut conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    let user = Users::new(&mut conn).create(&request).await?;

    tracing::info!(user_id = user.id, "Created user '{}'", user.username);
    Ok((StatusCode::CREATED, Json(UsersResponse::one(user))))
}

/// Get a user by ID.
#[utoipa::path(
    get,
    path = "/users/{id}",
    tag = "users",
    summary = "Get user",
    params(
        ("id" = i64, Path, description = "User ID"),
    ),
    responses(
        (status = 200, description = "The user", body = UsersResponse),
        (status = 400, description = "Invalid user ID"),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "User not found"),
        (status = 500, description = "Internal server error"),
    ),
    security(
        ("BasicAuth" = [])
    )
)]
#[tracing::instrument(skip_all, fields(id = %id))]
pub async fn get_user(State(state): State<AppState>, Path(id): Path<String>) -> Result<Json<UsersResponse>> {
    let id = parse_user_id(&id)?;

    let mut conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    let user = Users::new(&mut conn).get_by_id(id).await?.ok_or_else(|| user_not_found(id))?;

    Ok(Json(UsersResponse::one(user)))
}

/// Replace every field of a user, including the password.
#[utoipa::path(
    put,
    path = "/users/{id}",
    tag = "users",
    summary = "Update user",
    request_body = UserInput,
    params(
        ("id" = i64, Path, description = "User ID"),
    ),
    responses(
        (status = 200, description = "User updated", body = UsersResponse),
        (status = 400, description = "Invalid user ID, invalid JSON, empty field or invalid email"),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "User not found"),
        (status = 409, description = "Username or email already taken"),
        (status = 500, description = "Internal server error"),
    ),
    security(
        ("BasicAuth" = [])
    )
)]
#[tracing::instrument(skip_all, fields(id = %id))]
pub async fn update_user(State(state): State<AppState>, Path(id): Path<String>, body: Bytes) -> Result<Json<UsersResponse>> {
    let id = parse_user_id(&id)?;
    let request = to_db_request(&state, &body).await?;

    let mut conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    let user = Users::new(&mut conn).update(id, &request).await.map_err(|e| match e {
        DbError::NotFound => user_not_found(id),
        other => other.into(),
    })?;

    Ok(Json(UsersResponse::one(user)))
}

/// Delete a user along with their sessions and notifications.
#[utoipa::path(
    delete,
    path = "/users/{id}",
    tag = "users",
    summary = "Delete user",
    params(
        ("id" = i64, Path, description = "User ID"),
    ),
    responses(
        (status = 204, description = "User deleted"),
        (status = 400, description = "Invalid user ID"),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "User not found"),
        (status = 500, description = "Internal server error"),
    ),
    security(
        ("BasicAuth" = [])
    )
)]
#[tracing::instrument(skip_all, fields(id = %id))]
pub async fn delete_user(State(state): State<AppState>, Path(id): Path<String>) -> Result<StatusCode> {
    let id = parse_user_id(&id)?;

    let mut conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    if !Users::new(&mut conn).delete(id).await? {
        return Err(user_not_found(id));
    }

    tracing::info!(user_id = id, "Deleted user");
    Ok(StatusCode::NO_CONTENT)
}
