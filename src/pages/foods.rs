//! Foods Page
//!
//! Paginated food catalog with server-side search, category, dietary
//! filter and ordering, plus a client-side filter/sort over the loaded
//! page.

use crate::api::{ApiResult, FoodQuery, FoodSort, FoodsApi, SortOrder};
use crate::models::{Food, FoodProposal};
use crate::state::{ListState, Paginator};
use crate::validation::{require, ValidationErrors};
use std::cmp::Ordering;
use std::fmt::Write;

pub const FOODS_EMPTY: &str = "No foods found.";
pub const FOODS_ERROR: &str = "Error fetching foods. Please try again later.";
pub const FOODS_FILTERED_OUT: &str = "No foods match the current filters.";

/// Filter applied to the already-loaded page without refetching
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LocalFoodFilter {
    /// Case-insensitive substring of the name
    pub text: Option<String>,
    /// Hide foods carrying any of these allergens
    pub exclude_allergens: Vec<String>,
    pub min_score: Option<f64>,
    pub sort: Option<(FoodSort, SortOrder)>,
}

impl LocalFoodFilter {
    fn matches(&self, food: &Food) -> bool {
        if let Some(text) = self.text.as_deref().map(str::trim).filter(|t| !t.is_empty()) {
            if !food.name.to_lowercase().contains(&text.to_lowercase()) {
                return false;
            }
        }
        if food.allergens.iter().any(|a| {
            self.exclude_allergens
                .iter()
                .any(|ex| a.eq_ignore_ascii_case(ex))
        }) {
            return false;
        }
        match self.min_score {
            Some(min) => food.nutrition_score >= min,
            None => true,
        }
    }
}

/// Order two foods by a sort field
pub fn compare_foods(a: &Food, b: &Food, sort: FoodSort) -> Ordering {
    let by = |x: f64, y: f64| x.partial_cmp(&y).unwrap_or(Ordering::Equal);
    match sort {
        FoodSort::Name => a.name.to_lowercase().cmp(&b.name.to_lowercase()),
        FoodSort::Calories => by(a.calories, b.calories),
        FoodSort::Protein => by(a.protein, b.protein),
        FoodSort::Carbohydrate => by(a.carbohydrate, b.carbohydrate),
        FoodSort::Fat => by(a.fat, b.fat),
        FoodSort::NutritionScore => by(a.nutrition_score, b.nutrition_score),
    }
}

/// Food catalog view model
#[derive(Debug, Clone)]
pub struct FoodsPage {
    query: FoodQuery,
    paginator: Paginator,
    state: ListState<Food>,
    local: LocalFoodFilter,
}

impl FoodsPage {
    pub fn new(page_size: u32) -> Self {
        let paginator = Paginator::new(page_size);
        let query = FoodQuery {
            page_size: paginator.page_size(),
            ..FoodQuery::default()
        };
        Self {
            query,
            paginator,
            state: ListState::Loading,
            local: LocalFoodFilter::default(),
        }
    }

    pub fn query(&self) -> &FoodQuery {
        &self.query
    }

    pub fn state(&self) -> &ListState<Food> {
        &self.state
    }

    pub fn paginator(&self) -> &Paginator {
        &self.paginator
    }

    pub fn local_filter_mut(&mut self) -> &mut LocalFoodFilter {
        &mut self.local
    }

    pub fn set_search(&mut self, search: Option<String>) {
        self.query.search = search;
        self.paginator.reset();
    }

    pub fn set_category(&mut self, category: Option<String>) {
        self.query.category = category;
        self.paginator.reset();
    }

    pub fn set_dietary_option(&mut self, option: Option<String>) {
        self.query.dietary_option = option;
        self.paginator.reset();
    }

    /// Sort by `field`; choosing the current field again flips the order
    pub fn sort_by(&mut self, field: FoodSort) {
        if self.query.sort == Some(field) {
            self.query.order = self.query.order.toggled();
        } else {
            self.query.sort = Some(field);
            self.query.order = SortOrder::Asc;
        }
        self.paginator.reset();
    }

    pub fn set_order(&mut self, order: SortOrder) {
        self.query.order = order;
    }

    /// Returns whether a reload is needed
    pub fn go_to_page(&mut self, page: u32) -> bool {
        self.paginator.go_to(page)
    }

    pub fn next_page(&mut self) -> bool {
        self.paginator.next()
    }

    pub fn previous_page(&mut self) -> bool {
        self.paginator.previous()
    }

    /// Jump to a page before the total is known (e.g. from the command line)
    pub fn start_at_page(&mut self, page: u32) {
        self.query.page = page.max(1);
    }

    /// Fetch the current page
    pub async fn load<A: FoodsApi + ?Sized>(&mut self, api: &A) {
        if self.paginator.count() > 0 {
            self.query.page = self.paginator.page();
        }
        self.state = ListState::Loading;

        tracing::debug!(page = self.query.page, "Loading foods");
        let result = api.get_foods(&self.query).await;

        if let Ok(fetched) = &result {
            if let Some(page) = fetched.value() {
                self.paginator.update_from(page);
                self.paginator.go_to(self.query.page);
            }
        }
        self.state = ListState::from_fetch(result, FOODS_EMPTY, FOODS_ERROR);
    }

    /// Loaded foods after the local filter and sort
    pub fn visible_foods(&self) -> Vec<&Food> {
        let mut foods: Vec<&Food> = self
            .state
            .items()
            .iter()
            .filter(|f| self.local.matches(f))
            .collect();

        if let Some((field, order)) = self.local.sort {
            foods.sort_by(|a, b| {
                let ord = compare_foods(a, b, field);
                match order {
                    SortOrder::Asc => ord,
                    SortOrder::Desc => ord.reverse(),
                }
            });
        }
        foods
    }

    pub fn render(&self) -> String {
        let mut out = String::new();

        match &self.state {
            ListState::Loading => out.push_str("Loading foods...\n"),
            ListState::Empty { message } | ListState::Error { message } => {
                let _ = writeln!(out, "{}", message);
            }
            ListState::Loaded { total, warning, .. } => {
                let _ = writeln!(out, "Foods ({} total)", total);
                if let Some(w) = warning {
                    let _ = writeln!(out, "Warning: {}", w);
                }
                let visible = self.visible_foods();
                if visible.is_empty() {
                    let _ = writeln!(out, "{}", FOODS_FILTERED_OUT);
                } else {
                    let _ = writeln!(
                        out,
                        "{:<6} {:<28} {:<14} {:>8} {:>7} {:>7} {:>7} {:>6}",
                        "ID", "Name", "Category", "kcal", "P (g)", "C (g)", "F (g)", "Score"
                    );
                    let _ = writeln!(out, "{}", "-".repeat(90));
                    for food in visible {
                        let _ = writeln!(out, "{}", food_row(food));
                    }
                }
                let _ = writeln!(
                    out,
                    "{}  Pages: {}",
                    self.paginator.label(),
                    self.paginator.control()
                );
            }
        }
        out
    }
}

fn food_row(food: &Food) -> String {
    format!(
        "{:<6} {:<28} {:<14} {:>8.1} {:>7.1} {:>7.1} {:>7.1} {:>6.1}",
        food.id,
        truncate(&food.name, 28),
        truncate(&food.category, 14),
        food.calories,
        food.protein,
        food.carbohydrate,
        food.fat,
        food.nutrition_score
    )
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let cut: String = s.chars().take(max.saturating_sub(1)).collect();
        format!("{}…", cut)
    }
}

/// Full detail view of one food
pub fn render_food(food: &Food) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{} (#{})", food.name, food.id);
    if !food.category.is_empty() {
        let _ = writeln!(out, "Category: {}", food.category);
    }
    let _ = writeln!(out, "Per {:.0} g serving:", food.serving_size);
    let _ = writeln!(out, "  Calories:      {:.1} kcal", food.calories);
    let _ = writeln!(out, "  Protein:       {:.1} g", food.protein);
    let _ = writeln!(out, "  Carbohydrate:  {:.1} g", food.carbohydrate);
    let _ = writeln!(out, "  Fat:           {:.1} g", food.fat);
    let _ = writeln!(out, "Nutrition score: {:.1} / 10", food.nutrition_score);
    if !food.dietary_options.is_empty() {
        let _ = writeln!(out, "Dietary: {}", food.dietary_options.join(", "));
    }
    if !food.allergens.is_empty() {
        let _ = writeln!(out, "Allergens: {}", food.allergens.join(", "));
    }
    if let Some(url) = &food.image_url {
        let _ = writeln!(out, "Image: {}", url);
    }
    out
}

/// Input for proposing a new food
#[derive(Debug, Clone, Default)]
pub struct FoodProposalForm {
    pub name: String,
    pub category: String,
    pub serving_size: f64,
    pub calories: f64,
    pub protein: f64,
    pub fat: f64,
    pub carbohydrate: f64,
    pub dietary_options: Vec<String>,
    pub image_url: Option<String>,
}

impl FoodProposalForm {
    pub fn validate(&self) -> Result<FoodProposal, ValidationErrors> {
        let mut errors = ValidationErrors::new();
        require(&mut errors, "name", &self.name);
        require(&mut errors, "category", &self.category);

        if self.serving_size <= 0.0 {
            errors.add("serving_size", "Serving size must be greater than zero.");
        }
        for (field, value) in [
            ("calories", self.calories),
            ("protein", self.protein),
            ("fat", self.fat),
            ("carbohydrate", self.carbohydrate),
        ] {
            if value < 0.0 || !value.is_finite() {
                errors.add(field, "Must be a non-negative number.");
            }
        }
        if self.protein + self.fat + self.carbohydrate > self.serving_size && self.serving_size > 0.0
        {
            errors.add("serving_size", "Macronutrients exceed the serving size.");
        }

        errors.into_result(FoodProposal {
            name: self.name.trim().to_string(),
            category: self.category.trim().to_string(),
            serving_size: self.serving_size,
            calories: self.calories,
            protein: self.protein,
            fat: self.fat,
            carbohydrate: self.carbohydrate,
            dietary_options: self
                .dietary_options
                .iter()
                .map(|o| o.trim().to_string())
                .filter(|o| !o.is_empty())
                .collect(),
            image_url: self
                .image_url
                .as_deref()
                .map(str::trim)
                .filter(|u| !u.is_empty())
                .map(str::to_string),
        })
    }

    /// Validate, then submit
    pub async fn submit<A: FoodsApi + ?Sized>(&self, api: &A) -> ApiResult<FoodProposal> {
        let proposal = self.validate()?;
        api.propose_food(&proposal).await?;
        tracing::info!(name = %proposal.name, "Food proposed");
        Ok(proposal)
    }
}
