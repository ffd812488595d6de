//! Auth Session
//!
//! Holds the current user and the token pair shared with the
//! [`ApiClient`](crate::api::ApiClient). Tokens are mirrored into the
//! key-value store so a session survives restarts.

use crate::api::{ApiError, ApiResult, AuthApi, TokenHandle};
use crate::models::{AuthTokens, User};
use crate::storage::{KeyValueStore, KeyValueStoreExt, AUTH_TOKENS_KEY};
use std::sync::{Arc, RwLock};

/// Current login state
pub struct AuthSession<A> {
    api: Arc<A>,
    tokens: TokenHandle,
    store: Arc<dyn KeyValueStore>,
    user: RwLock<Option<User>>,
}

impl<A: AuthApi> AuthSession<A> {
    pub fn new(api: Arc<A>, tokens: TokenHandle, store: Arc<dyn KeyValueStore>) -> Self {
        Self {
            api,
            tokens,
            store,
            user: RwLock::new(None),
        }
    }

    fn tokens(&self) -> Option<AuthTokens> {
        self.tokens.read().ok().and_then(|t| t.clone())
    }

    fn set_tokens(&self, tokens: Option<AuthTokens>) {
        if let Ok(mut guard) = self.tokens.write() {
            *guard = tokens;
        }
    }

    fn set_user(&self, user: Option<User>) {
        if let Ok(mut guard) = self.user.write() {
            *guard = user;
        }
    }

    pub fn is_authenticated(&self) -> bool {
        self.tokens().is_some()
    }

    pub fn current_user(&self) -> Option<User> {
        self.user.read().ok().and_then(|u| u.clone())
    }

    /// Route guard for protected operations
    pub fn require_auth(&self) -> ApiResult<User> {
        if !self.is_authenticated() {
            return Err(ApiError::Unauthorized);
        }
        self.current_user().ok_or(ApiError::Unauthorized)
    }

    /// Log in and persist the session
    pub async fn login(&self, username: &str, password: &str) -> ApiResult<User> {
        let response = self.api.login(username, password).await?;
        let tokens = response.tokens();
        self.set_tokens(Some(tokens.clone()));

        let user = match response.user {
            Some(user) => user,
            None => match self.api.current_user().await {
                Ok(user) => user,
                Err(e) => {
                    self.set_tokens(None);
                    return Err(e);
                }
            },
        };

        self.store.set_json(AUTH_TOKENS_KEY, &tokens)?;
        self.set_user(Some(user.clone()));

        tracing::info!(username = %user.username, "Logged in");
        Ok(user)
    }

    /// Clear the session locally; the server is notified best-effort
    pub async fn logout(&self) -> ApiResult<()> {
        if let Some(tokens) = self.tokens() {
            if let Err(e) = self.api.logout(&tokens.refresh).await {
                tracing::warn!(error = %e, "Server logout failed, clearing local session anyway");
            }
        }

        self.set_tokens(None);
        self.set_user(None);
        self.store.remove(AUTH_TOKENS_KEY)?;
        tracing::info!("Logged out");
        Ok(())
    }

    /// Reload a persisted session and fetch its user
    ///
    /// A session the server rejects is dropped. Transport errors keep the
    /// tokens so a later call can retry.
    pub async fn restore(&self) -> ApiResult<Option<User>> {
        let tokens: AuthTokens = match self.store.get_json(AUTH_TOKENS_KEY) {
            Some(t) => t,
            None => return Ok(None),
        };
        self.set_tokens(Some(tokens));

        match self.api.current_user().await {
            Ok(user) => {
                self.set_user(Some(user.clone()));
                self.persist_tokens()?;
                tracing::debug!(username = %user.username, "Session restored");
                Ok(Some(user))
            }
            Err(ApiError::Unauthorized) => {
                tracing::info!("Stored session expired");
                self.set_tokens(None);
                self.store.remove(AUTH_TOKENS_KEY)?;
                Ok(None)
            }
            Err(e) => Err(e),
        }
    }

    /// Mirror the in-memory tokens into storage
    ///
    /// The client may have refreshed or cleared them since login.
    pub fn persist_tokens(&self) -> ApiResult<()> {
        match self.tokens() {
            Some(tokens) => self.store.set_json(AUTH_TOKENS_KEY, &tokens)?,
            None => self.store.remove(AUTH_TOKENS_KEY)?,
        }
        Ok(())
    }
}
