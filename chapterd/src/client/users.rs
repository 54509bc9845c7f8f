use reqwest::Method;

use super::{Client, Error, Result};
use crate::api::models::users::{UserInput, UserResponse, UsersResponse};
use crate::types::UserId;

/// `/users`: user management.
pub struct UsersService<'a> {
    pub(super) client: &'a Client,
}

impl UsersService<'_> {
    pub async fn list(&self) -> Result<Vec<UserResponse>> {
        let request = self.client.request(Method::GET, "users")?;
        let response: UsersResponse = self.client.send(request).await?;
        Ok(response.users)
    }

    pub async fn get(&self, id: UserId) -> Result<UserResponse> {
        let request = self.client.request(Method::GET, &format!("users/{id}"))?;
        first_user(self.client.send(request).await?)
    }

    pub async fn create(&self, user: &UserInput) -> Result<UserResponse> {
        let request = self.client.request(Method::POST, "users")?.json(user);
        first_user(self.client.send(request).await?)
    }

    /// Replace every field of user `id`, including the password.
    pub async fn update(&self, id: UserId, user: &UserInput) -> Result<UserResponse> {
        let request = self.client.request(Method::PUT, &format!("users/{id}"))?.json(user);
        first_user(self.client.send(request).await?)
    }

    pub async fn delete(&self, id: UserId) -> Result<()> {
        let request = self.client.request(Method::DELETE, &format!("users/{id}"))?;
        self.client.send_empty(request).await
    }
}

fn first_user(response: UsersResponse) -> Result<UserResponse> {
    response.users.into_iter().next().ok_or(Error::Empty("user"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::*;

    fn input(username: &str) -> UserInput {
        UserInput {
            username: username.to_string(),
            first_name: "Grace".to_string(),
            last_name: "Hopper".to_string(),
            email: format!("{username}@example.com"),
            phone: "555-0100".to_string(),
            password: "cobol".to_string(),
        }
    }

    async fn root_client(base: &str) -> Client {
        let mut client = Client::new(base).unwrap();
        client.authenticate_password("root", TEST_ROOT_PASSWORD).await.unwrap();
        client
    }

    #[test_log::test(tokio::test)]
    async fn test_user_lifecycle() {
        let (base, _state) = spawn_test_app().await;
        let client = root_client(&base).await;

        let created = client.users().create(&input("grace")).await.unwrap();
        assert_eq!(created.username, "grace");
        assert_eq!(created.phone, "555-0100");

        assert_eq!(client.users().get(created.id).await.unwrap(), created);
        let usernames: Vec<_> = client.users().list().await.unwrap().into_iter().map(|u| u.username).collect();
        assert!(usernames.contains(&"root".to_string()));
        assert!(usernames.contains(&"grace".to_string()));

        let mut changes = input("grace");
        changes.last_name = "Murray".to_string();
        let updated = client.users().update(created.id, &changes).await.unwrap();
        assert_eq!(updated.id, created.id);
        assert_eq!(updated.last_name, "Murray");

        // The new user can sign in with the password from the request
        let mut grace = Client::new(&base).unwrap();
        grace.authenticate_password("grace", "cobol").await.unwrap();

        client.users().delete(created.id).await.unwrap();
        let err = client.users().get(created.id).await.unwrap_err();
        assert!(matches!(err, Error::Api { code: 404, ref message } if message == "user not found"));
    }

    #[tokio::test]
    async fn test_invalid_input_is_reported() {
        let (base, _state) = spawn_test_app().await;
        let client = root_client(&base).await;

        let mut missing_email = input("henry");
        missing_email.email.clear();

        let err = client.users().create(&missing_email).await.unwrap_err();
        assert!(matches!(err, Error::Api { code: 400, ref message } if message == "empty field: email"));
    }
}
