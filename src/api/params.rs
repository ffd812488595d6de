//! Query parameters for list endpoints
//!
//! Pagination uses `page` / `page_size`; ordering uses the `ordering`
//! parameter with a leading `-` for descending.

use std::fmt;
use std::str::FromStr;

pub const DEFAULT_PAGE_SIZE: u32 = 10;

/// Sort direction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum SortOrder {
    #[default]
    Asc,
    Desc,
}

impl SortOrder {
    pub fn toggled(self) -> Self {
        match self {
            SortOrder::Asc => SortOrder::Desc,
            SortOrder::Desc => SortOrder::Asc,
        }
    }
}

/// Sortable food fields
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FoodSort {
    Name,
    Calories,
    Protein,
    Carbohydrate,
    Fat,
    NutritionScore,
}

impl FoodSort {
    pub fn field(&self) -> &'static str {
        match self {
            FoodSort::Name => "name",
            FoodSort::Calories => "calories",
            FoodSort::Protein => "protein",
            FoodSort::Carbohydrate => "carbohydrate",
            FoodSort::Fat => "fat",
            FoodSort::NutritionScore => "nutrition_score",
        }
    }
}

impl FromStr for FoodSort {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().replace('-', "_").as_str() {
            "name" => Ok(FoodSort::Name),
            "calories" => Ok(FoodSort::Calories),
            "protein" => Ok(FoodSort::Protein),
            "carbohydrate" | "carbs" => Ok(FoodSort::Carbohydrate),
            "fat" => Ok(FoodSort::Fat),
            "nutrition_score" | "score" => Ok(FoodSort::NutritionScore),
            other => Err(format!(
                "Unknown sort field: {}. Use: name, calories, protein, carbs, fat, score",
                other
            )),
        }
    }
}

/// Food list query
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FoodQuery {
    pub page: u32,
    pub page_size: u32,
    pub search: Option<String>,
    pub category: Option<String>,
    pub dietary_option: Option<String>,
    pub sort: Option<FoodSort>,
    pub order: SortOrder,
}

impl Default for FoodQuery {
    fn default() -> Self {
        Self {
            page: 1,
            page_size: DEFAULT_PAGE_SIZE,
            search: None,
            category: None,
            dietary_option: None,
            sort: None,
            order: SortOrder::Asc,
        }
    }
}

impl FoodQuery {
    pub fn to_query(&self) -> Vec<(String, String)> {
        let mut params = vec![
            ("page".to_string(), self.page.max(1).to_string()),
            ("page_size".to_string(), self.page_size.max(1).to_string()),
        ];
        push_non_empty(&mut params, "search", &self.search);
        push_non_empty(&mut params, "category", &self.category);
        push_non_empty(&mut params, "dietary_options", &self.dietary_option);
        if let Some(sort) = self.sort {
            params.push(("ordering".to_string(), ordering(sort.field(), self.order)));
        }
        params
    }
}

/// Forum post orderings
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum PostSort {
    #[default]
    Newest,
    Oldest,
    MostLiked,
}

impl PostSort {
    fn ordering(&self) -> &'static str {
        match self {
            PostSort::Newest => "-created_at",
            PostSort::Oldest => "created_at",
            PostSort::MostLiked => "-likes",
        }
    }
}

impl FromStr for PostSort {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().replace('-', "_").as_str() {
            "newest" | "new" => Ok(PostSort::Newest),
            "oldest" | "old" => Ok(PostSort::Oldest),
            "most_liked" | "likes" | "popular" => Ok(PostSort::MostLiked),
            other => Err(format!(
                "Unknown post sort: {}. Use: newest, oldest, most-liked",
                other
            )),
        }
    }
}

impl fmt::Display for PostSort {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            PostSort::Newest => "newest",
            PostSort::Oldest => "oldest",
            PostSort::MostLiked => "most-liked",
        };
        f.write_str(label)
    }
}

/// Forum post list query, also the post cache key
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PostQuery {
    pub page: u32,
    pub page_size: u32,
    /// Tag names; a post must carry at least one
    pub tags: Vec<String>,
    pub search: Option<String>,
    pub sort: PostSort,
}

impl Default for PostQuery {
    fn default() -> Self {
        Self {
            page: 1,
            page_size: DEFAULT_PAGE_SIZE,
            tags: Vec::new(),
            search: None,
            sort: PostSort::Newest,
        }
    }
}

impl PostQuery {
    pub fn to_query(&self) -> Vec<(String, String)> {
        let mut params = vec![
            ("page".to_string(), self.page.max(1).to_string()),
            ("page_size".to_string(), self.page_size.max(1).to_string()),
            ("ordering".to_string(), self.sort.ordering().to_string()),
        ];
        if !self.tags.is_empty() {
            params.push(("tags".to_string(), self.tags.join(",")));
        }
        push_non_empty(&mut params, "search", &self.search);
        params
    }
}

fn ordering(field: &str, order: SortOrder) -> String {
    match order {
        SortOrder::Asc => field.to_string(),
        SortOrder::Desc => format!("-{}", field),
    }
}

fn push_non_empty(params: &mut Vec<(String, String)>, key: &str, value: &Option<String>) {
    if let Some(v) = value.as_deref().map(str::trim).filter(|v| !v.is_empty()) {
        params.push((key.to_string(), v.to_string()));
    }
}
