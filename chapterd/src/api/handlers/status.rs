use crate::{
    api::models::status::{StatusResponse, SystemStatus},
    errors::Result,
};
use anyhow::Context;
use axum::response::Json;

/// Report host and process facts. Requires no authentication.
#[utoipa::path(
    get,
    path = "/status",
    tag = "status",
    summary = "Server status",
    responses(
        (status = 200, description = "Host and process information", body = StatusResponse),
        (status = 500, description = "Internal server error"),
    )
)]
#[tracing::instrument(skip_all)]
pub async fn get_status() -> Result<Json<StatusResponse>> {
    let hostname = hostname::get().context("failed to read hostname")?;
    let num_cpu = std::thread::available_parallelism().map(|n| n.get()).unwrap_or(1);

    Ok(Json(StatusResponse {
        status: SystemStatus {
            architecture: std::env::consts::ARCH.to_string(),
            hostname: hostname.to_string_lossy().into_owned(),
            num_cpu,
            pid: std::process::id(),
            platform: std::env::consts::OS.to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        },
    }))
}

#[cfg(test)]
mod tests {
    use crate::test_utils::*;
    use serde_json::Value;

    #[tokio::test]
    async fn test_status_without_credentials() {
        let (server, _state) = create_test_server().await;

        let response = server.get("/api/v0/status").await;
        response.assert_status_ok();
        let body: Value = response.json();
        let status = &body["status"];

        assert_eq!(status["architecture"], std::env::consts::ARCH);
        assert_eq!(status["platform"], std::env::consts::OS);
        assert_eq!(status["pid"], std::process::id());
        assert_eq!(status["version"], env!("CARGO_PKG_VERSION"));
        assert!(status["numCpu"].as_u64().unwrap() >= 1);
        assert!(status["hostname"].is_string());
    }
}
