//! Forum types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Post or comment author
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Author {
    pub id: u64,
    pub username: String,
}

/// A forum tag such as "Recipe" or "Dietary tip"
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Tag {
    pub id: u64,
    pub name: String,
}

/// A forum post
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForumPost {
    pub id: u64,
    pub author: Author,
    pub title: String,
    pub body: String,
    #[serde(default)]
    pub tags: Vec<Tag>,
    #[serde(default)]
    pub likes: u32,
    #[serde(default)]
    pub is_liked: bool,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

impl ForumPost {
    pub fn has_tag(&self, name: &str) -> bool {
        self.tags.iter().any(|t| t.name.eq_ignore_ascii_case(name))
    }
}

/// Body for creating a post, optionally with a recipe
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreatePostRequest {
    pub title: String,
    pub body: String,
    /// Tag ids
    #[serde(default)]
    pub tags: Vec<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recipe: Option<Recipe>,
}

/// A comment on a post
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Comment {
    pub id: u64,
    pub post: u64,
    pub author: Author,
    pub body: String,
    pub created_at: DateTime<Utc>,
}

/// A recipe attached to a post
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Recipe {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub post: Option<u64>,
    pub ingredients: Vec<RecipeIngredient>,
    pub instructions: String,
}

/// One recipe ingredient, amount in grams
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecipeIngredient {
    pub food_id: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub food_name: Option<String>,
    pub amount: f64,
}
