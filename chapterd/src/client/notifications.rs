use reqwest::Method;

use super::{Client, Result};
use crate::api::models::notifications::{NotificationResponse, NotificationsResponse};

/// `/notifications`: the authenticated user's notifications.
pub struct NotificationsService<'a> {
    pub(super) client: &'a Client,
}

impl NotificationsService<'_> {
    pub async fn list(&self) -> Result<Vec<NotificationResponse>> {
        let request = self.client.request(Method::GET, "notifications")?;
        let response: NotificationsResponse = self.client.send(request).await?;
        Ok(response.notifications)
    }
}
