//! OpenAPI document for `/api/v0`.

use axum::response::Json;
use utoipa::{
    Modify, OpenApi,
    openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme},
};

use crate::api::{
    handlers,
    models::{
        notifications::{NotificationResponse, NotificationsResponse},
        sessions::{SessionEnvelope, SessionResponse},
        status::{StatusResponse, SystemStatus},
        users::{UserInput, UserResponse, UsersResponse},
    },
    response::{ErrorDetail, ErrorEnvelope},
};

/// HTTP Basic security scheme.
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.security_schemes.insert(
                "BasicAuth".to_string(),
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Basic)
                        .description(Some(
                            "`POST /sessions` and `/login` take `username:password`. Every other protected \
                            route takes `username:key`, where `key` comes from `POST /sessions`:\n\n\
                            ```\nAuthorization: Basic base64(username:key)\n```",
                        ))
                        .build(),
                ),
            );
        }
    }
}

#[derive(OpenApi)]
#[openapi(
    servers(
        (url = "/api/v0", description = "chapterd API")
    ),
    modifiers(&SecurityAddon),
    paths(
        handlers::status::get_status,
        handlers::auth::login,
        handlers::sessions::create_session,
        handlers::sessions::get_session,
        handlers::sessions::delete_session,
        handlers::users::list_users,
        handlers::users::create_user,
        handlers::users::get_user,
        handlers::users::update_user,
        handlers::users::delete_user,
        handlers::notifications::list_notifications,
    ),
    components(
        schemas(
            ErrorEnvelope,
            ErrorDetail,
            UserInput,
            UserResponse,
            UsersResponse,
            SessionResponse,
            SessionEnvelope,
            NotificationResponse,
            NotificationsResponse,
            SystemStatus,
            StatusResponse,
        )
    ),
    tags(
        (name = "status", description = "Server status"),
        (name = "authentication", description = "Credential checks"),
        (name = "sessions", description = "Session API keys"),
        (name = "users", description = "User management"),
        (name = "notifications", description = "User notifications"),
    ),
    info(
        title = "chapterd API",
        description = "JSON API for users, sessions and notifications",
    )
)]
pub struct ApiDoc;

/// Serve the OpenAPI document.
pub async fn openapi_json() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_document_lists_routes_and_basic_auth() {
        let doc = serde_json::to_value(ApiDoc::openapi()).unwrap();

        for path in ["/status", "/login", "/sessions", "/users", "/users/{id}", "/notifications"] {
            assert!(doc["paths"].get(path).is_some(), "missing {path}");
        }
        assert!(doc["paths"]["/sessions"].get("post").is_some());
        assert!(doc["paths"]["/sessions"].get("delete").is_some());
        assert_eq!(doc["components"]["securitySchemes"]["BasicAuth"]["scheme"], "basic");
    }
}
