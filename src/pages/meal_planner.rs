//! Meal Planner
//!
//! Builds a draft plan from catalog foods with live macro totals, saves it,
//! and lists, deletes or schedules saved plans.

use crate::api::{ApiResult, MealPlanApi};
use crate::models::{CreateMealPlanRequest, Food, MealPlanEntry, MealType, SavedMealPlan};
use crate::nutrition::{normalize_unit, MacroTotals};
use crate::state::ListState;
use crate::validation::{require, ValidationErrors};
use chrono::NaiveDate;
use std::collections::BTreeMap;
use std::fmt::Write;

pub const PLANS_EMPTY: &str = "No saved meal plans yet.";
pub const PLANS_ERROR: &str = "Error fetching saved meal plans. Please try again later.";

/// Units a draft entry may use
pub const SERVING_UNITS: &[&str] = &["g", "ml", "kg", "serving"];

/// One food in a draft plan
#[derive(Debug, Clone, PartialEq)]
pub struct DraftEntry {
    pub food: Food,
    pub amount: f64,
    pub unit: String,
    pub meal_type: MealType,
}

impl DraftEntry {
    pub fn totals(&self) -> MacroTotals {
        MacroTotals::for_food(&self.food, self.amount, &self.unit)
    }
}

/// Plan being assembled before it is saved
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MealPlanDraft {
    pub name: String,
    entries: Vec<DraftEntry>,
}

impl MealPlanDraft {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            entries: Vec::new(),
        }
    }

    pub fn entries(&self) -> &[DraftEntry] {
        &self.entries
    }

    pub fn add(&mut self, food: Food, amount: f64, unit: &str, meal_type: MealType) {
        self.entries.push(DraftEntry {
            food,
            amount,
            unit: normalize_unit(unit),
            meal_type,
        });
    }

    /// Remove the entry at `index`, if present
    pub fn remove(&mut self, index: usize) -> Option<DraftEntry> {
        if index < self.entries.len() {
            Some(self.entries.remove(index))
        } else {
            None
        }
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Totals across all entries, recomputed on every call
    pub fn totals(&self) -> MacroTotals {
        self.entries
            .iter()
            .fold(MacroTotals::default(), |acc, e| acc + e.totals())
    }

    pub fn totals_by_meal(&self) -> BTreeMap<MealType, MacroTotals> {
        let mut by_meal = BTreeMap::new();
        for entry in &self.entries {
            *by_meal.entry(entry.meal_type).or_insert_with(MacroTotals::default) += entry.totals();
        }
        by_meal
    }

    pub fn validate(&self) -> Result<CreateMealPlanRequest, ValidationErrors> {
        let mut errors = ValidationErrors::new();
        require(&mut errors, "name", &self.name);

        if self.entries.is_empty() {
            errors.add("entries", "Add at least one food to the plan.");
        }
        for (i, entry) in self.entries.iter().enumerate() {
            if entry.amount <= 0.0 || !entry.amount.is_finite() {
                errors.add(
                    &format!("entries[{}].amount", i),
                    "Amount must be greater than zero.",
                );
            }
            if !SERVING_UNITS.contains(&entry.unit.as_str()) {
                errors.add(
                    &format!("entries[{}].unit", i),
                    format!("Unit must be one of: {}.", SERVING_UNITS.join(", ")),
                );
            }
        }

        errors.into_result(CreateMealPlanRequest {
            name: self.name.trim().to_string(),
            entries: self
                .entries
                .iter()
                .map(|e| MealPlanEntry {
                    food_id: e.food.id,
                    food_name: Some(e.food.name.clone()),
                    serving_size: e.amount,
                    serving_unit: e.unit.clone(),
                    meal_type: e.meal_type,
                })
                .collect(),
        })
    }

    /// Validate and save; the draft is cleared on success
    pub async fn save<A: MealPlanApi + ?Sized>(&mut self, api: &A) -> ApiResult<SavedMealPlan> {
        let request = self.validate()?;
        let saved = api.create_saved_meal_plan(&request).await?;
        tracing::info!(plan_id = saved.id, name = %saved.name, "Meal plan saved");
        self.name.clear();
        self.entries.clear();
        Ok(saved)
    }

    pub fn render(&self) -> String {
        let mut out = String::new();
        let name = if self.name.trim().is_empty() {
            "(unnamed plan)"
        } else {
            self.name.as_str()
        };
        let _ = writeln!(out, "Draft: {}", name);
        for (i, e) in self.entries.iter().enumerate() {
            let t = e.totals();
            let _ = writeln!(
                out,
                "  {:>2}. {:<10} {:<24} {:>7.1} {:<7} {:>7.1} kcal",
                i + 1,
                e.meal_type,
                e.food.name,
                e.amount,
                e.unit,
                t.calories
            );
        }
        out.push_str(&render_totals(&self.totals()));
        out
    }
}

fn render_totals(t: &MacroTotals) -> String {
    format!(
        "Total: {:.1} kcal  P {:.1} g  C {:.1} g  F {:.1} g\n",
        t.calories, t.protein, t.carbohydrates, t.fat
    )
}

/// Saved plans list
#[derive(Debug, Clone, Default)]
pub struct SavedPlansPage {
    state: ListState<SavedMealPlan>,
}

impl SavedPlansPage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> &ListState<SavedMealPlan> {
        &self.state
    }

    pub async fn load<A: MealPlanApi + ?Sized>(&mut self, api: &A) {
        self.state = ListState::Loading;
        self.state =
            ListState::from_items(api.get_saved_meal_plans().await, PLANS_EMPTY, PLANS_ERROR);
    }

    /// Delete a plan and drop it from the list
    pub async fn delete<A: MealPlanApi + ?Sized>(&mut self, api: &A, id: u64) -> ApiResult<()> {
        api.delete_saved_meal_plan(id).await?;
        if let Some(items) = self.state.items_mut() {
            items.retain(|p| p.id != id);
            if items.is_empty() {
                self.state = ListState::Empty {
                    message: PLANS_EMPTY.to_string(),
                };
            }
        }
        tracing::info!(plan_id = id, "Meal plan deleted");
        Ok(())
    }

    /// Schedule a saved plan's entries on `date`
    pub async fn log_plan<A: MealPlanApi + ?Sized>(
        &self,
        api: &A,
        id: u64,
        date: NaiveDate,
    ) -> ApiResult<()> {
        api.log_meal_plan(id, date).await?;
        tracing::info!(plan_id = id, date = %date, "Meal plan logged");
        Ok(())
    }

    pub fn render(&self) -> String {
        match &self.state {
            ListState::Loading => "Loading saved plans...\n".to_string(),
            ListState::Empty { message } | ListState::Error { message } => {
                format!("{}\n", message)
            }
            ListState::Loaded { items, .. } => {
                let mut out = String::new();
                for plan in items {
                    out.push_str(&render_plan(plan));
                }
                out
            }
        }
    }
}

pub fn render_plan(plan: &SavedMealPlan) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "#{} {} ({} items)", plan.id, plan.name, plan.entries.len());
    for meal in MealType::ALL {
        let foods: Vec<String> = plan
            .entries
            .iter()
            .filter(|e| e.meal_type == meal)
            .map(|e| {
                let name = e
                    .food_name
                    .clone()
                    .unwrap_or_else(|| format!("food #{}", e.food_id));
                format!("{} {}{}", name, e.serving_size, e.serving_unit)
            })
            .collect();
        if !foods.is_empty() {
            let _ = writeln!(out, "  {:<10} {}", meal, foods.join(", "));
        }
    }
    let totals = MacroTotals {
        calories: plan.total_calories,
        protein: plan.total_protein,
        carbohydrates: plan.total_carbohydrates,
        fat: plan.total_fat,
    };
    let _ = write!(out, "  {}", render_totals(&totals));
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::ApiError;
    use async_trait::async_trait;
    use std::sync::Mutex;

    #[derive(Default)]
    struct FakePlans {
        plans: Mutex<Vec<SavedMealPlan>>,
        logged: Mutex<Vec<(u64, NaiveDate)>>,
        fail_list: bool,
    }

    #[async_trait]
    impl MealPlanApi for FakePlans {
        async fn get_saved_meal_plans(&self) -> ApiResult<Vec<SavedMealPlan>> {
            if self.fail_list {
                return Err(ApiError::Network("refused".into()));
            }
            Ok(self.plans.lock().unwrap().clone())
        }

        async fn create_saved_meal_plan(
            &self,
            request: &CreateMealPlanRequest,
        ) -> ApiResult<SavedMealPlan> {
            let plan = SavedMealPlan {
                id: 11,
                name: request.name.clone(),
                entries: request.entries.clone(),
                total_calories: 0.0,
                total_protein: 0.0,
                total_carbohydrates: 0.0,
                total_fat: 0.0,
                created_at: None,
            };
            self.plans.lock().unwrap().push(plan.clone());
            Ok(plan)
        }

        async fn delete_saved_meal_plan(&self, id: u64) -> ApiResult<()> {
            self.plans.lock().unwrap().retain(|p| p.id != id);
            Ok(())
        }

        async fn log_meal_plan(&self, id: u64, date: NaiveDate) -> ApiResult<()> {
            self.logged.lock().unwrap().push((id, date));
            Ok(())
        }
    }

    fn food(id: u64, calories: f64, protein: f64) -> Food {
        serde_json::from_value(serde_json::json!({
            "id": id, "name": format!("food {}", id), "serving_size": 100.0,
            "calories": calories, "protein": protein
        }))
        .unwrap()
    }

    #[test]
    fn test_totals_follow_entries() {
        let mut draft = MealPlanDraft::new("Cut");
        draft.add(food(1, 200.0, 10.0), 150.0, "g", MealType::Breakfast);
        draft.add(food(2, 100.0, 5.0), 2.0, "serving", MealType::Lunch);

        let totals = draft.totals();
        assert_eq!(totals.calories, 500.0);
        assert_eq!(totals.protein, 25.0);

        draft.remove(0);
        assert_eq!(draft.totals().calories, 200.0);
        assert_eq!(draft.totals_by_meal().len(), 1);
    }

    #[test]
    fn test_validate_rejects_bad_entries() {
        let mut draft = MealPlanDraft::new("  ");
        let errors = draft.validate().unwrap_err();
        assert!(errors.get("name").is_some());
        assert_eq!(errors.get("entries"), Some("Add at least one food to the plan."));

        draft.name = "Bulk".into();
        draft.add(food(1, 1.0, 1.0), -5.0, "cups", MealType::Snack);
        let errors = draft.validate().unwrap_err();
        assert!(errors.get("entries[0].amount").is_some());
        assert!(errors.get("entries[0].unit").is_some());
    }

    #[test]
    fn test_unit_aliases_are_saveable() {
        let mut draft = MealPlanDraft::new("Aliases");
        draft.add(food(1, 200.0, 10.0), 50.0, " Grams ", MealType::Breakfast);
        draft.add(food(2, 100.0, 5.0), 2.0, "servings", MealType::Lunch);
        draft.add(food(3, 80.0, 2.0), 1.0, "portion", MealType::Snack);

        let units: Vec<&str> = draft.entries().iter().map(|e| e.unit.as_str()).collect();
        assert_eq!(units, vec!["g", "serving", "serving"]);
        assert_eq!(draft.totals().calories, 380.0);

        let request = draft.validate().unwrap();
        assert_eq!(request.entries.len(), 3);
    }

    #[tokio::test]
    async fn test_save_then_list() {
        let api = FakePlans::default();
        let mut draft = MealPlanDraft::new("Weekday");
        draft.add(food(4, 120.0, 8.0), 200.0, "G", MealType::Dinner);

        let saved = draft.save(&api).await.unwrap();
        assert_eq!(saved.entries[0].serving_unit, "g");
        assert!(draft.entries().is_empty());

        let mut page = SavedPlansPage::new();
        page.load(&api).await;
        assert_eq!(page.state().items().len(), 1);
        assert!(page.render().contains("#11 Weekday (1 items)"));
    }

    #[tokio::test]
    async fn test_empty_and_error_copy() {
        let mut page = SavedPlansPage::new();
        page.load(&FakePlans::default()).await;
        assert_eq!(page.render(), format!("{}\n", PLANS_EMPTY));

        let failing = FakePlans {
            fail_list: true,
            ..FakePlans::default()
        };
        page.load(&failing).await;
        assert_eq!(page.render(), format!("{}\n", PLANS_ERROR));
    }

    #[tokio::test]
    async fn test_delete_last_plan_shows_empty() {
        let api = FakePlans::default();
        let mut draft = MealPlanDraft::new("Only");
        draft.add(food(1, 10.0, 1.0), 1.0, "serving", MealType::Lunch);
        draft.save(&api).await.unwrap();

        let mut page = SavedPlansPage::new();
        page.load(&api).await;
        page.delete(&api, 11).await.unwrap();
        assert_eq!(page.state().message(), Some(PLANS_EMPTY));
    }

    #[tokio::test]
    async fn test_log_plan() {
        let api = FakePlans::default();
        let page = SavedPlansPage::new();
        let date = NaiveDate::from_ymd_opt(2024, 7, 1).unwrap();
        page.log_plan(&api, 3, date).await.unwrap();
        assert_eq!(api.logged.lock().unwrap()[0], (3, date));
    }
}
