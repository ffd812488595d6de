//! Page Models
//!
//! One view model per screen. Each fetches on demand through the API
//! traits, keeps its own load state, validates its forms and renders
//! itself as plain text for the terminal front end.
//!
//! - **foods**: food catalog with server and local filtering
//! - **forum**: post list, post cache and liked-post tracking
//! - **post**: post detail, comments and post creation
//! - **nutrition**: daily nutrition dashboard
//! - **meal_planner**: draft and saved meal plans
//! - **auth_forms**: login and signup forms
//! - **profile**: public profile with follow toggle

pub mod auth_forms;
pub mod foods;
pub mod forum;
pub mod meal_planner;
pub mod nutrition;
pub mod post;
pub mod profile;

pub use auth_forms::{LoginForm, SignupForm};
pub use foods::{render_food, FoodProposalForm, FoodsPage, LocalFoodFilter};
pub use forum::{new_post_cache, toggle_like, ForumPage, LikeTracker, SharedPostCache};
pub use meal_planner::{MealPlanDraft, SavedPlansPage};
pub use nutrition::{DashboardView, NutritionDashboard};
pub use post::{PostDetail, PostForm, RecipeForm};
pub use profile::ProfilePage;
