//! Remote API
//!
//! Typed access to the diet-tracking REST service.
//!
//! ## Architecture
//!
//! - **client**: [`ApiClient`], the `reqwest` wrapper (auth header,
//!   refresh-on-401, JSON decoding)
//! - **response**: [`Fetched`], the 200 / 206 / 204 list outcome
//! - **params**: list query parameters
//! - one file per resource implementing the traits below for
//!   [`ApiClient`]
//!
//! Page models depend on the traits, not on [`ApiClient`], so they can be
//! driven by in-process fakes.

mod auth;
mod client;
mod error;
mod foods;
mod forum;
mod meal_plans;
mod nutrition;
mod params;
mod profile;
mod response;

pub use client::{ApiClient, TokenHandle};
pub use error::{ApiError, ApiResult};
pub use params::{FoodQuery, FoodSort, PostQuery, PostSort, SortOrder, DEFAULT_PAGE_SIZE};
pub use response::{interpret_list, Fetched, DEFAULT_EMPTY_WARNING, DEFAULT_PARTIAL_WARNING};

use crate::models::{
    Comment, CreateMealPlanRequest, CreatePostRequest, DailyNutritionLog, Food, FoodLogEntry,
    FoodProposal, ForumPost, LoginResponse, NewFoodLogEntry, NutritionTargets, Page, Recipe,
    SavedMealPlan, SignupRequest, Tag, User,
};
use async_trait::async_trait;
use chrono::NaiveDate;

/// Account endpoints
#[async_trait]
pub trait AuthApi: Send + Sync {
    async fn login(&self, username: &str, password: &str) -> ApiResult<LoginResponse>;

    async fn signup(&self, request: &SignupRequest) -> ApiResult<User>;

    /// Exchange the held refresh token; `Ok(false)` when it was rejected
    async fn refresh(&self) -> ApiResult<bool>;

    /// Invalidate the refresh token server side
    async fn logout(&self, refresh_token: &str) -> ApiResult<()>;

    async fn current_user(&self) -> ApiResult<User>;
}

/// Food catalog endpoints
#[async_trait]
pub trait FoodsApi: Send + Sync {
    async fn get_foods(&self, query: &FoodQuery) -> ApiResult<Fetched<Page<Food>>>;

    async fn get_food(&self, id: u64) -> ApiResult<Food>;

    async fn propose_food(&self, proposal: &FoodProposal) -> ApiResult<()>;
}

/// Forum endpoints
#[async_trait]
pub trait ForumApi: Send + Sync {
    async fn get_forum_posts(&self, query: &PostQuery) -> ApiResult<Fetched<Page<ForumPost>>>;

    async fn get_post(&self, id: u64) -> ApiResult<ForumPost>;

    async fn create_post(&self, request: &CreatePostRequest) -> ApiResult<ForumPost>;

    async fn like_post(&self, id: u64) -> ApiResult<()>;

    async fn unlike_post(&self, id: u64) -> ApiResult<()>;

    async fn get_comments(&self, post_id: u64) -> ApiResult<Vec<Comment>>;

    async fn add_comment(&self, post_id: u64, body: &str) -> ApiResult<Comment>;

    async fn get_tags(&self) -> ApiResult<Vec<Tag>>;

    /// Recipe attached to a post; `Ok(None)` when the post has none
    async fn get_recipe(&self, post_id: u64) -> ApiResult<Option<Recipe>>;
}

/// Nutrition logging endpoints
#[async_trait]
pub trait NutritionApi: Send + Sync {
    async fn get_daily_log(&self, date: NaiveDate) -> ApiResult<DailyNutritionLog>;

    async fn get_nutrition_targets(&self) -> ApiResult<NutritionTargets>;

    async fn log_food(&self, date: NaiveDate, entry: &NewFoodLogEntry) -> ApiResult<FoodLogEntry>;

    async fn delete_food_log(&self, entry_id: u64) -> ApiResult<()>;

    /// Daily logs for an inclusive date range
    async fn get_logs_range(
        &self,
        from: NaiveDate,
        to: NaiveDate,
    ) -> ApiResult<Vec<DailyNutritionLog>>;
}

/// Saved meal plan endpoints
#[async_trait]
pub trait MealPlanApi: Send + Sync {
    async fn get_saved_meal_plans(&self) -> ApiResult<Vec<SavedMealPlan>>;

    async fn create_saved_meal_plan(
        &self,
        request: &CreateMealPlanRequest,
    ) -> ApiResult<SavedMealPlan>;

    async fn delete_saved_meal_plan(&self, id: u64) -> ApiResult<()>;

    /// Schedule a saved plan's entries on a date
    async fn log_meal_plan(&self, id: u64, date: NaiveDate) -> ApiResult<()>;
}

/// Public profile and follow endpoints
#[async_trait]
pub trait ProfileApi: Send + Sync {
    async fn get_profile(&self, username: &str) -> ApiResult<User>;

    async fn follow_user(&self, username: &str) -> ApiResult<()>;

    async fn unfollow_user(&self, username: &str) -> ApiResult<()>;
}
