//! API response models for the status endpoint.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Facts about the running process and its host.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SystemStatus {
    pub architecture: String,
    pub hostname: String,
    pub num_cpu: usize,
    pub pid: u32,
    pub platform: String,
    pub version: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct StatusResponse {
    pub status: SystemStatus,
}
