use crate::{
    AppState,
    api::models::notifications::{NotificationResponse, NotificationsResponse},
    auth::current_user::CurrentUser,
    db::handlers::Notifications,
    errors::{Error, Result},
};
use axum::{extract::State, response::Json};

/// List the caller's notifications, newest first.
#[utoipa::path(
    get,
    path = "/notifications",
    tag = "notifications",
    summary = "List notifications",
    responses(
        (status = 200, description = "Notifications for the authenticated user", body = NotificationsResponse),
        (status = 401, description = "Unauthorized"),
        (status = 500, description = "Internal server error"),
    ),
    security(
        ("BasicAuth" = [])
    )
)]
#[tracing::instrument(skip_all, fields(user_id = user.id))]
pub async fn list_notifications(State(state): State<AppState>, CurrentUser(user): CurrentUser) -> Result<Json<NotificationsResponse>> {
    let mut conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    let notifications = Notifications::new(&mut conn).list_for_user(user.id).await?;

    Ok(Json(NotificationsResponse {
        notifications: notifications.into_iter().map(NotificationResponse::from).collect(),
    }))
}
