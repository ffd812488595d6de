//! API Data Types
//!
//! DTOs mirrored from the remote REST API. The client owns no lifecycle
//! for these: the last successful fetch replaces local state.
//!
//! - [`Food`], [`FoodProposal`]: food catalog
//! - [`ForumPost`], [`Comment`], [`Tag`], [`Recipe`]: forum
//! - [`DailyNutritionLog`], [`NutritionTargets`]: nutrition tracking
//! - [`SavedMealPlan`], [`MealPlanEntry`]: meal planning
//! - [`User`], [`AuthTokens`]: accounts
//! - [`Page`]: paginated list envelope

mod food;
mod forum;
mod meal_plan;
mod nutrition;
mod page;
mod user;

pub use food::{Food, FoodProposal};
pub use forum::{Author, Comment, CreatePostRequest, ForumPost, Recipe, RecipeIngredient, Tag};
pub use meal_plan::{CreateMealPlanRequest, MealPlanEntry, MealType, SavedMealPlan};
pub use nutrition::{
    DailyNutritionLog, FoodLogEntry, HydrationStatus, Micronutrients, NewFoodLogEntry,
    NutritionTargets, PlannedEntry,
};
pub use page::Page;
pub use user::{AuthTokens, LoginRequest, LoginResponse, SignupRequest, User};
