//! Account endpoints

use super::client::{ApiClient, LOGIN_PATH, SIGNUP_PATH};
use super::error::ApiResult;
use super::AuthApi;
use crate::models::{LoginRequest, LoginResponse, SignupRequest, User};
use async_trait::async_trait;
use reqwest::Method;

#[async_trait]
impl AuthApi for ApiClient {
    async fn login(&self, username: &str, password: &str) -> ApiResult<LoginResponse> {
        let body = LoginRequest {
            username: username.to_string(),
            password: password.to_string(),
        };
        self.send_json(Method::POST, LOGIN_PATH, &body).await
    }

    async fn signup(&self, request: &SignupRequest) -> ApiResult<User> {
        self.send_json(Method::POST, SIGNUP_PATH, request).await
    }

    async fn refresh(&self) -> ApiResult<bool> {
        self.refresh_access_token().await
    }

    async fn logout(&self, refresh_token: &str) -> ApiResult<()> {
        let body = serde_json::json!({ "refresh": refresh_token });
        self.send_no_content(Method::POST, "users/logout/", Some(&body))
            .await
    }

    async fn current_user(&self) -> ApiResult<User> {
        self.get_json("users/me/", &[]).await
    }
}
