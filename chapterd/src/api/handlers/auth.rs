use crate::{
    api::models::users::{UserResponse, UsersResponse},
    auth::current_user::CurrentUser,
};
use axum::response::Json;

/// Check a username and password without creating a session.
#[utoipa::path(
    get,
    path = "/login",
    tag = "authentication",
    summary = "Check credentials",
    description = "Verify a username and password. Returns the user; no session is created.",
    responses(
        (status = 200, description = "Credentials are valid", body = UsersResponse),
        (status = 401, description = "Missing, malformed or wrong credentials"),
        (status = 500, description = "Internal server error"),
    ),
    security(
        ("BasicAuth" = [])
    )
)]
#[tracing::instrument(skip_all, fields(user_id = user.id))]
pub async fn login(CurrentUser(user): CurrentUser) -> Json<UsersResponse> {
    Json(UsersResponse::one(UserResponse::from(user)))
}
