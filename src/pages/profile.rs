//! Profile Page

use crate::api::{ApiError, ApiResult, ProfileApi};
use crate::models::User;
use crate::state::LoadState;
use std::fmt::Write;

pub const PROFILE_ERROR: &str = "Error fetching the profile. Please try again later.";
pub const PROFILE_NOT_FOUND: &str = "User not found.";

pub struct ProfilePage {
    username: String,
    profile: LoadState<User>,
}

impl ProfilePage {
    pub fn new(username: &str) -> Self {
        Self {
            username: username.to_string(),
            profile: LoadState::Loading,
        }
    }

    pub fn profile(&self) -> &LoadState<User> {
        &self.profile
    }

    pub async fn load<A: ProfileApi + ?Sized>(&mut self, api: &A) {
        self.profile = match api.get_profile(&self.username).await {
            Ok(user) => LoadState::Loaded(user),
            Err(e) if e.is_not_found() => LoadState::Error(PROFILE_NOT_FOUND.to_string()),
            Err(e) => LoadState::from_error(&e, PROFILE_ERROR),
        };
    }

    /// Follow or unfollow, updating the counts optimistically
    ///
    /// Rolls back on failure. Returns the new following state.
    pub async fn toggle_follow<A: ProfileApi + ?Sized>(&mut self, api: &A) -> ApiResult<bool> {
        let user = self.profile.value_mut().ok_or_else(|| ApiError::Api {
            status: 404,
            message: PROFILE_NOT_FOUND.to_string(),
        })?;
        let (was_following, old_count) = (user.is_following, user.followers_count);

        user.is_following = !was_following;
        user.followers_count = if was_following {
            old_count.saturating_sub(1)
        } else {
            old_count.saturating_add(1)
        };

        let result = if was_following {
            api.unfollow_user(&user.username).await
        } else {
            api.follow_user(&user.username).await
        };

        match result {
            Ok(()) => {
                tracing::info!(username = %user.username, following = user.is_following, "Follow state changed");
                Ok(user.is_following)
            }
            Err(e) => {
                tracing::warn!(username = %user.username, error = %e, "Follow toggle failed, rolling back");
                user.is_following = was_following;
                user.followers_count = old_count;
                Err(e)
            }
        }
    }

    pub fn render(&self) -> String {
        let user = match &self.profile {
            LoadState::Loading => return "Loading profile...\n".to_string(),
            LoadState::Error(message) => return format!("{}\n", message),
            LoadState::Loaded(user) => user,
        };

        let mut out = String::new();
        let _ = writeln!(out, "{} (@{})", user.display_name(), user.username);
        let _ = writeln!(
            out,
            "{} followers  {} following",
            user.followers_count, user.following_count
        );
        if user.is_following {
            let _ = writeln!(out, "You follow this user.");
        }
        out
    }
}
