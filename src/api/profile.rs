//! Profile and follow endpoints

use super::client::ApiClient;
use super::error::ApiResult;
use super::ProfileApi;
use crate::models::User;
use async_trait::async_trait;
use reqwest::Method;

#[async_trait]
impl ProfileApi for ApiClient {
    async fn get_profile(&self, username: &str) -> ApiResult<User> {
        self.get_json(&format!("users/{}/", username), &[]).await
    }

    async fn follow_user(&self, username: &str) -> ApiResult<()> {
        self.send_no_content::<()>(Method::POST, &format!("users/{}/follow/", username), None)
            .await
    }

    async fn unfollow_user(&self, username: &str) -> ApiResult<()> {
        self.send_no_content::<()>(
            Method::DELETE,
            &format!("users/{}/follow/", username),
            None,
        )
        .await
    }
}
