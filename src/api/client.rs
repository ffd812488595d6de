//! REST API Client
//!
//! Thin wrapper over `reqwest` that attaches the bearer token, tags each
//! request with an `X-Request-Id`, refreshes the access token once on a
//! 401, and decodes JSON bodies into typed DTOs.

use super::error::{message_from_body, ApiError, ApiResult};
use super::response::{interpret_list, Fetched};
use crate::config::ApiConfig;
use crate::models::{AuthTokens, Page};
use reqwest::{Client, Method, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::sync::{Arc, RwLock};
use std::time::Duration;

/// Token pair shared between the client and the auth session
pub type TokenHandle = Arc<RwLock<Option<AuthTokens>>>;

pub(crate) const REFRESH_PATH: &str = "users/token/refresh/";
pub(crate) const LOGIN_PATH: &str = "users/login/";
pub(crate) const SIGNUP_PATH: &str = "users/signup/";

/// Endpoints that take credentials instead of a token; a 401 from these
/// is a rejected form, not an expired session
const CREDENTIAL_PATHS: [&str; 3] = [LOGIN_PATH, SIGNUP_PATH, REFRESH_PATH];

/// REST API client
///
/// Cheap to clone; clones share the connection pool and the tokens.
#[derive(Clone)]
pub struct ApiClient {
    http: Client,
    base_url: String,
    tokens: TokenHandle,
}

type Query = [(String, String)];

impl ApiClient {
    /// Create a client for `base_url` (e.g. "http://localhost:8081/api")
    pub fn new(base_url: &str, timeout: Duration) -> ApiResult<Self> {
        let http = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ApiError::Config(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            tokens: Arc::new(RwLock::new(None)),
        })
    }

    /// Create a client from the `[api]` config section
    pub fn from_config(config: &ApiConfig) -> ApiResult<Self> {
        Self::new(&config.resolved_base_url(), config.request_timeout())
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Shared handle to the token pair
    pub fn tokens(&self) -> TokenHandle {
        Arc::clone(&self.tokens)
    }

    pub fn set_tokens(&self, tokens: Option<AuthTokens>) {
        if let Ok(mut guard) = self.tokens.write() {
            *guard = tokens;
        }
    }

    pub fn current_tokens(&self) -> Option<AuthTokens> {
        self.tokens.read().ok().and_then(|t| t.clone())
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    fn access_token(&self) -> Option<String> {
        self.tokens
            .read()
            .ok()
            .and_then(|t| t.as_ref().map(|t| t.access.clone()))
    }

    fn refresh_token(&self) -> Option<String> {
        self.tokens
            .read()
            .ok()
            .and_then(|t| t.as_ref().map(|t| t.refresh.clone()))
    }

    /// Send one request with the current access token
    async fn send_once(
        &self,
        method: &Method,
        path: &str,
        query: &Query,
        body: Option<&serde_json::Value>,
    ) -> ApiResult<Response> {
        let request_id = uuid::Uuid::new_v4().to_string();
        let mut request = self
            .http
            .request(method.clone(), self.url(path))
            .header("X-Request-Id", &request_id)
            .header("Accept", "application/json");

        if !query.is_empty() {
            request = request.query(query);
        }
        if let Some(token) = self.access_token() {
            request = request.bearer_auth(token);
        }
        if let Some(body) = body {
            request = request.json(body);
        }

        let response = request.send().await.map_err(|e| {
            tracing::warn!(
                request_id = %request_id,
                method = %method,
                path = %path,
                error = %e,
                "Request failed"
            );
            ApiError::from(e)
        })?;

        tracing::debug!(
            request_id = %request_id,
            method = %method,
            path = %path,
            status = response.status().as_u16(),
            "Request completed"
        );

        Ok(response)
    }

    /// Send a request, refreshing the access token and retrying once on 401
    ///
    /// Credential endpoints never refresh; their 401 body is returned as
    /// `ApiError::Api`.
    async fn execute(
        &self,
        method: Method,
        path: &str,
        query: &Query,
        body: Option<serde_json::Value>,
    ) -> ApiResult<Response> {
        let response = self.send_once(&method, path, query, body.as_ref()).await?;

        if response.status() != StatusCode::UNAUTHORIZED {
            return Ok(response);
        }
        if CREDENTIAL_PATHS.contains(&path) {
            return Err(api_error(response).await);
        }

        if self.refresh_access_token().await? {
            let retried = self.send_once(&method, path, query, body.as_ref()).await?;
            if retried.status() == StatusCode::UNAUTHORIZED {
                return Err(ApiError::Unauthorized);
            }
            return Ok(retried);
        }

        Err(ApiError::Unauthorized)
    }

    /// Exchange the refresh token for a new access token
    ///
    /// Returns `Ok(false)` when there is nothing to refresh or the server
    /// rejected the refresh token; in the latter case the tokens are
    /// cleared.
    pub async fn refresh_access_token(&self) -> ApiResult<bool> {
        let refresh = match self.refresh_token() {
            Some(r) => r,
            None => return Ok(false),
        };

        #[derive(Serialize)]
        struct RefreshRequest<'a> {
            refresh: &'a str,
        }

        #[derive(Deserialize)]
        struct RefreshResponse {
            access: String,
            #[serde(default)]
            refresh: Option<String>,
        }

        let body = serde_json::to_value(RefreshRequest { refresh: &refresh })?;
        let response = self
            .send_once(&Method::POST, REFRESH_PATH, &[], Some(&body))
            .await?;

        if !response.status().is_success() {
            tracing::info!(status = response.status().as_u16(), "Token refresh rejected, clearing session");
            self.set_tokens(None);
            return Ok(false);
        }

        let refreshed: RefreshResponse = response.json().await?;
        self.set_tokens(Some(AuthTokens {
            access: refreshed.access,
            refresh: refreshed.refresh.unwrap_or(refresh),
        }));
        tracing::debug!("Access token refreshed");
        Ok(true)
    }

    // ============================================
    // Typed helpers used by the resource impls
    // ============================================

    pub(crate) async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &Query,
    ) -> ApiResult<T> {
        let response = self.execute(Method::GET, path, query, None).await?;
        decode(response).await
    }

    pub(crate) async fn send_json<B: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        body: &B,
    ) -> ApiResult<T> {
        let body = serde_json::to_value(body)?;
        let response = self.execute(method, path, &[], Some(body)).await?;
        decode(response).await
    }

    /// Send a request whose response body is ignored
    pub(crate) async fn send_no_content<B: Serialize + ?Sized>(
        &self,
        method: Method,
        path: &str,
        body: Option<&B>,
    ) -> ApiResult<()> {
        let body = body.map(serde_json::to_value).transpose()?;
        let response = self.execute(method, path, &[], body).await?;
        if response.status().is_success() {
            Ok(())
        } else {
            Err(error_from_response(response).await)
        }
    }

    /// GET a paginated list and discriminate 200 / 206 / 204
    pub(crate) async fn get_list<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &Query,
    ) -> ApiResult<Fetched<Page<T>>> {
        let response = self.execute(Method::GET, path, query, None).await?;
        let status = response.status().as_u16();
        let warning = response
            .headers()
            .get("Warning")
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        let body = response.bytes().await?;

        let fetched = interpret_list(status, warning.as_deref(), &body)?;
        if let Some(w) = fetched.warning() {
            tracing::info!(path = %path, status, warning = %w, "List fetched with warning");
        }
        Ok(fetched)
    }
}

async fn decode<T: DeserializeOwned>(response: Response) -> ApiResult<T> {
    if !response.status().is_success() {
        return Err(error_from_response(response).await);
    }
    let bytes = response.bytes().await?;
    Ok(serde_json::from_slice(&bytes)?)
}

async fn error_from_response(response: Response) -> ApiError {
    if response.status() == StatusCode::UNAUTHORIZED {
        return ApiError::Unauthorized;
    }
    api_error(response).await
}

async fn api_error(response: Response) -> ApiError {
    let status = response.status();
    let text = response.text().await.unwrap_or_default();
    let message = if text.trim().is_empty() {
        status
            .canonical_reason()
            .unwrap_or("Unknown error")
            .to_string()
    } else {
        message_from_body(&text)
    };
    ApiError::Api {
        status: status.as_u16(),
        message,
    }
}
