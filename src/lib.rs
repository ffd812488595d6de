//! # Diet Tracker
//!
//! Client core for the diet-tracking service: typed REST access, session
//! handling, page models and local storage, with a terminal front end in
//! the `diet-tracker` binary.
//!
//! ## Features
//!
//! - **Typed API**: one async trait per resource, 200/206/204 list
//!   discrimination, refresh-and-retry on 401
//! - **Page models**: foods, forum, post detail, nutrition dashboard, meal
//!   planner, profile and auth forms, each rendering to text
//! - **Local state**: pagination, load states, a TTL post cache and
//!   optimistic toggles with rollback
//! - **Local storage**: JSON file store for tokens, liked posts and the
//!   language preference
//!
//! ## Modules
//!
//! - [`api`]: REST client and API traits
//! - [`auth`]: Login session
//! - [`pages`]: Page view models
//! - [`nutrition`]: Display metrics (bars, micronutrient grouping, totals)
//! - [`state`]: Pagination, load states and caching
//! - [`storage`]: Key-value persistence
//! - [`config`]: TOML configuration with environment overrides
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use diet_tracker::api::{ApiClient, FoodQuery};
//! use diet_tracker::pages::FoodsPage;
//! use std::time::Duration;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = ApiClient::new("http://localhost:8081/api", Duration::from_secs(30))?;
//!
//!     let mut foods = FoodsPage::new(10);
//!     foods.set_search(Some("oat".into()));
//!     foods.load(&client).await;
//!
//!     print!("{}", foods.render());
//!     Ok(())
//! }
//! ```

pub mod api;
pub mod auth;
pub mod config;
pub mod models;
pub mod nutrition;
pub mod pages;
pub mod state;
pub mod storage;
pub mod validation;

pub use api::{ApiClient, ApiError, ApiResult, Fetched};
pub use auth::AuthSession;
pub use config::{Config, ConfigError};
pub use state::{ListState, LoadState, Paginator, TtlCache};
pub use storage::{FileStore, KeyValueStore, MemoryStore, StorageError, StorageResult};
pub use validation::{FieldError, ValidationErrors};
