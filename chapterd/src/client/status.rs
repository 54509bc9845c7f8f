use reqwest::Method;

use super::{Client, Result};
use crate::api::models::status::{StatusResponse, SystemStatus};

/// `/status`: server facts. Needs no session.
pub struct StatusService<'a> {
    pub(super) client: &'a Client,
}

impl StatusService<'_> {
    pub async fn get(&self) -> Result<SystemStatus> {
        let request = self.client.request(Method::GET, "status")?;
        let response: StatusResponse = self.client.send(request).await?;
        Ok(response.status)
    }
}

#[cfg(test)]
mod tests {
    use crate::client::Client;
    use crate::test_utils::*;

    #[tokio::test]
    async fn test_status_without_session() {
        let (base, _state) = spawn_test_app().await;
        let client = Client::new(&base).unwrap();

        let status = client.status().get().await.unwrap();
        assert_eq!(status.pid, std::process::id());
        assert_eq!(status.version, env!("CARGO_PKG_VERSION"));
        assert!(status.num_cpu >= 1);
    }
}
