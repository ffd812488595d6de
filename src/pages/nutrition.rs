//! Nutrition Dashboard
//!
//! One day's log against the user's targets. Logged amounts come from the
//! daily log totals, planned amounts from its planned entries; both are
//! stacked against the target. The nutrition score and hydration block are
//! displayed exactly as the server sent them.

use crate::api::{ApiResult, NutritionApi};
use crate::models::{
    DailyNutritionLog, FoodLogEntry, MealType, Micronutrients, NewFoodLogEntry, NutritionTargets,
};
use crate::nutrition::{
    categorize, parse_micronutrient_key, HydrationDisplay, MacroTotals, MicronutrientGroup,
    MicronutrientKey, ScoreDisplay, StackedBar,
};
use crate::state::LoadState;
use crate::validation::ValidationErrors;
use chrono::NaiveDate;
use std::collections::{BTreeMap, BTreeSet};
use std::fmt::Write;

pub const NUTRITION_ERROR: &str = "Error fetching nutrition data. Please try again later.";
pub const TARGETS_ERROR: &str = "Error fetching nutrition targets.";
pub const HYDRATION_UNAVAILABLE: &str = "Hydration data unavailable.";
pub const SCORE_UNAVAILABLE: &str = "Nutrition score unavailable.";

const BAR_WIDTH: usize = 30;

/// One progress row
#[derive(Debug, Clone, PartialEq)]
pub struct NutrientRow {
    pub label: String,
    pub unit: String,
    pub bar: StackedBar,
}

impl NutrientRow {
    fn new(label: &str, unit: &str, logged: f64, planned: f64, target: f64) -> Self {
        Self {
            label: label.to_string(),
            unit: unit.to_string(),
            bar: StackedBar::new(logged, planned, target),
        }
    }

    fn render(&self) -> String {
        let target = if self.bar.target > 0.0 {
            format!("{:.1}", self.bar.target)
        } else {
            "-".to_string()
        };
        let mut line = format!(
            "  {:<22} {} {:>8.1} + {:<7.1} / {:>8} {}",
            self.label,
            self.bar.render(BAR_WIDTH),
            self.bar.logged,
            self.bar.planned,
            target,
            self.unit
        );
        if self.bar.over_target {
            line.push_str("  (over target)");
        }
        line
    }
}

/// Micronutrient rows under one group heading
#[derive(Debug, Clone, PartialEq)]
pub struct MicronutrientSection {
    pub group: MicronutrientGroup,
    pub rows: Vec<NutrientRow>,
}

/// Everything the dashboard shows, derived from a log and targets
#[derive(Debug, Clone, PartialEq)]
pub struct DashboardView {
    pub date: NaiveDate,
    pub macros: Vec<NutrientRow>,
    pub micronutrients: Vec<MicronutrientSection>,
    pub hydration: Option<HydrationDisplay>,
    pub score: Option<ScoreDisplay>,
    pub meals: BTreeMap<MealType, Vec<FoodLogEntry>>,
}

impl DashboardView {
    /// Build the view; without targets every bar has a zero target
    pub fn build(log: &DailyNutritionLog, targets: Option<&NutritionTargets>) -> Self {
        let planned = MacroTotals::from_planned(&log.planned_entries);
        let target = |f: fn(&NutritionTargets) -> f64| targets.map(f).unwrap_or(0.0);

        let macros = vec![
            NutrientRow::new(
                "Calories",
                "kcal",
                log.total_calories,
                planned.calories,
                target(|t| t.calories),
            ),
            NutrientRow::new(
                "Protein",
                "g",
                log.total_protein,
                planned.protein,
                target(|t| t.protein),
            ),
            NutrientRow::new(
                "Carbohydrates",
                "g",
                log.total_carbohydrates,
                planned.carbohydrates,
                target(|t| t.carbohydrates),
            ),
            NutrientRow::new("Fat", "g", log.total_fat, planned.fat, target(|t| t.fat)),
        ];

        let hydration = log.hydration.as_ref().and_then(|h| {
            let water = if h.water_ml > 0.0 { h.water_ml } else { log.water_ml };
            HydrationDisplay::new(water, h.target_ml, h.score_adjustment)
        });

        let mut meals: BTreeMap<MealType, Vec<FoodLogEntry>> = BTreeMap::new();
        for entry in &log.food_logs {
            meals.entry(entry.meal_type).or_default().push(entry.clone());
        }

        Self {
            date: log.date,
            macros,
            micronutrients: micronutrient_sections(log, targets),
            hydration,
            score: log.nutrition_score.map(ScoreDisplay::new),
            meals,
        }
    }

    pub fn render(&self) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "Nutrition for {}", self.date.format("%A, %d %B %Y"));
        let _ = writeln!(out, "  (# logged, + planned)");

        for row in &self.macros {
            let _ = writeln!(out, "{}", row.render());
        }

        for section in &self.micronutrients {
            let _ = writeln!(out, "\n{}", section.group.label());
            for row in &section.rows {
                let _ = writeln!(out, "{}", row.render());
            }
        }

        out.push('\n');
        match &self.hydration {
            Some(h) => {
                let cells = (h.width / 100.0 * BAR_WIDTH as f64).round() as usize;
                let _ = write!(
                    out,
                    "Hydration  [{}{}] {:.0} / {:.0} ml ({:.0}%)",
                    "~".repeat(cells.min(BAR_WIDTH)),
                    ".".repeat(BAR_WIDTH - cells.min(BAR_WIDTH)),
                    h.water_ml,
                    h.target_ml,
                    h.percent()
                );
                if let Some(adj) = h.score_adjustment {
                    let _ = write!(out, "  score {:+.1}", adj);
                }
                out.push('\n');
            }
            None => {
                let _ = writeln!(out, "{}", HYDRATION_UNAVAILABLE);
            }
        }
        match &self.score {
            Some(s) => {
                let cells = (s.width / 100.0 * BAR_WIDTH as f64).round() as usize;
                let _ = writeln!(
                    out,
                    "Score      [{}{}] {:.1} / 10 ({})",
                    "*".repeat(cells.min(BAR_WIDTH)),
                    ".".repeat(BAR_WIDTH - cells.min(BAR_WIDTH)),
                    s.score,
                    s.band()
                );
            }
            None => {
                let _ = writeln!(out, "{}", SCORE_UNAVAILABLE);
            }
        }

        for meal in MealType::ALL {
            let Some(entries) = self.meals.get(&meal) else {
                continue;
            };
            let _ = writeln!(out, "\n{}", capitalize(meal.as_str()));
            for e in entries {
                let _ = writeln!(
                    out,
                    "  #{:<5} {:<28} {:>6.0} {:<3} {:>7.1} kcal",
                    e.id, e.food_name, e.serving_size, e.serving_unit, e.calories
                );
            }
        }
        out
    }
}

/// Union of logged, planned and target keys, grouped and sorted by name
fn micronutrient_sections(
    log: &DailyNutritionLog,
    targets: Option<&NutritionTargets>,
) -> Vec<MicronutrientSection> {
    let mut planned = Micronutrients::new();
    for entry in &log.planned_entries {
        for (key, amount) in &entry.micronutrients {
            *planned.entry(key.clone()).or_insert(0.0) += amount;
        }
    }
    let empty = Micronutrients::new();
    let target_map = targets.map(|t| &t.micronutrients).unwrap_or(&empty);

    let keys: BTreeSet<&String> = log
        .micronutrients_summary
        .keys()
        .chain(planned.keys())
        .chain(target_map.keys())
        .collect();

    let mut grouped: BTreeMap<MicronutrientGroup, Vec<(MicronutrientKey, NutrientRow)>> =
        BTreeMap::new();
    for key in keys {
        let parsed = parse_micronutrient_key(key);
        let row = NutrientRow::new(
            &parsed.name,
            &parsed.unit,
            log.micronutrients_summary.get(key).copied().unwrap_or(0.0),
            planned.get(key).copied().unwrap_or(0.0),
            target_map.get(key).copied().unwrap_or(0.0),
        );
        grouped
            .entry(categorize(&parsed.name))
            .or_default()
            .push((parsed, row));
    }

    grouped
        .into_iter()
        .map(|(group, mut rows)| {
            rows.sort_by(|a, b| a.0.name.to_lowercase().cmp(&b.0.name.to_lowercase()));
            MicronutrientSection {
                group,
                rows: rows.into_iter().map(|(_, row)| row).collect(),
            }
        })
        .collect()
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Daily dashboard view model
pub struct NutritionDashboard {
    date: NaiveDate,
    log: LoadState<DailyNutritionLog>,
    targets: LoadState<NutritionTargets>,
}

impl NutritionDashboard {
    pub fn new(date: NaiveDate) -> Self {
        Self {
            date,
            log: LoadState::Loading,
            targets: LoadState::Loading,
        }
    }

    pub fn date(&self) -> NaiveDate {
        self.date
    }

    pub fn log(&self) -> &LoadState<DailyNutritionLog> {
        &self.log
    }

    pub fn targets(&self) -> &LoadState<NutritionTargets> {
        &self.targets
    }

    /// Switch day; the caller reloads
    pub fn set_date(&mut self, date: NaiveDate) {
        self.date = date;
        self.log = LoadState::Loading;
    }

    /// Fetch the day's log and the targets concurrently
    ///
    /// A day with no log yet (404) shows as an empty log.
    pub async fn load<A: NutritionApi + ?Sized>(&mut self, api: &A) {
        let (log, targets) = tokio::join!(api.get_daily_log(self.date), api.get_nutrition_targets());

        let date = self.date;
        let log = match log {
            Err(e) if e.is_not_found() => {
                tracing::debug!(date = %date, "No log for day, showing empty log");
                Ok(DailyNutritionLog::empty(date))
            }
            other => other,
        };
        self.log = LoadState::from_result(log, NUTRITION_ERROR);
        self.targets = LoadState::from_result(targets, TARGETS_ERROR);
    }

    /// Log a food for the dashboard's day, then reload
    pub async fn log_food<A: NutritionApi + ?Sized>(
        &mut self,
        api: &A,
        entry: &NewFoodLogEntry,
    ) -> ApiResult<FoodLogEntry> {
        validate_log_entry(entry)?;
        let logged = api.log_food(self.date, entry).await?;
        tracing::info!(food_id = entry.food_id, date = %self.date, "Food logged");
        self.load(api).await;
        Ok(logged)
    }

    /// Remove a logged entry, then reload
    pub async fn delete_entry<A: NutritionApi + ?Sized>(
        &mut self,
        api: &A,
        entry_id: u64,
    ) -> ApiResult<()> {
        api.delete_food_log(entry_id).await?;
        self.load(api).await;
        Ok(())
    }

    pub fn view(&self) -> Option<DashboardView> {
        self.log
            .value()
            .map(|log| DashboardView::build(log, self.targets.value()))
    }

    pub fn render(&self) -> String {
        match &self.log {
            LoadState::Loading => "Loading nutrition data...\n".to_string(),
            LoadState::Error(message) => format!("{}\n", message),
            LoadState::Loaded(log) => {
                let mut out = DashboardView::build(log, self.targets.value()).render();
                if let Some(message) = self.targets.error() {
                    let _ = writeln!(out, "{}", message);
                }
                out
            }
        }
    }
}

pub fn validate_log_entry(entry: &NewFoodLogEntry) -> Result<(), ValidationErrors> {
    let mut errors = ValidationErrors::new();
    if entry.serving_size <= 0.0 || !entry.serving_size.is_finite() {
        errors.add("serving_size", "Serving size must be greater than zero.");
    }
    if entry.serving_unit.trim().is_empty() {
        errors.add("serving_unit", "This field is required.");
    }
    errors.into_result(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::ApiError;
    use crate::models::PlannedEntry;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn day() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 5, 2).unwrap()
    }

    fn targets() -> NutritionTargets {
        let mut micronutrients = Micronutrients::new();
        micronutrients.insert("Vitamin C (mg)".into(), 90.0);
        micronutrients.insert("Iron (mg)".into(), 18.0);
        NutritionTargets {
            calories: 2000.0,
            protein: 100.0,
            carbohydrates: 250.0,
            fat: 70.0,
            micronutrients,
        }
    }

    fn log() -> DailyNutritionLog {
        let mut log = DailyNutritionLog::empty(day());
        log.total_calories = 1500.0;
        log.total_protein = 80.0;
        log.micronutrients_summary
            .insert("Vitamin C (mg)".into(), 45.0);
        log.micronutrients_summary.insert("Lycopene (µg)".into(), 3.0);

        let mut micros = Micronutrients::new();
        micros.insert("Iron (mg)".into(), 4.0);
        log.planned_entries.push(PlannedEntry {
            food_id: 9,
            food_name: "Lentils".into(),
            serving_size: 150.0,
            serving_unit: "g".into(),
            meal_type: MealType::Dinner,
            calories: 700.0,
            protein: 30.0,
            carbohydrates: 60.0,
            fat: 2.0,
            micronutrients: micros,
        });
        log.nutrition_score = Some(7.5);
        log
    }

    struct FakeNutrition {
        log: Option<DailyNutritionLog>,
        log_status: u16,
        log_calls: AtomicUsize,
    }

    impl FakeNutrition {
        fn with_log(log: DailyNutritionLog) -> Self {
            Self {
                log: Some(log),
                log_status: 200,
                log_calls: AtomicUsize::new(0),
            }
        }

        fn failing(status: u16) -> Self {
            Self {
                log: None,
                log_status: status,
                log_calls: AtomicUsize::new(0),
            }
        }
    }

    #[async_trait]
    impl NutritionApi for FakeNutrition {
        async fn get_daily_log(&self, _date: NaiveDate) -> ApiResult<DailyNutritionLog> {
            match &self.log {
                Some(log) => Ok(log.clone()),
                None => Err(ApiError::Api {
                    status: self.log_status,
                    message: "boom".into(),
                }),
            }
        }

        async fn get_nutrition_targets(&self) -> ApiResult<NutritionTargets> {
            Ok(targets())
        }

        async fn log_food(
            &self,
            _date: NaiveDate,
            entry: &NewFoodLogEntry,
        ) -> ApiResult<FoodLogEntry> {
            self.log_calls.fetch_add(1, Ordering::SeqCst);
            Ok(FoodLogEntry {
                id: 1,
                food_id: entry.food_id,
                food_name: "Yogurt".into(),
                serving_size: entry.serving_size,
                serving_unit: entry.serving_unit.clone(),
                meal_type: entry.meal_type,
                calories: 120.0,
                protein: 10.0,
                carbohydrates: 8.0,
                fat: 4.0,
                micronutrients: Micronutrients::new(),
                logged_at: None,
            })
        }

        async fn delete_food_log(&self, _entry_id: u64) -> ApiResult<()> {
            Ok(())
        }

        async fn get_logs_range(
            &self,
            _from: NaiveDate,
            _to: NaiveDate,
        ) -> ApiResult<Vec<DailyNutritionLog>> {
            Ok(Vec::new())
        }
    }

    #[test]
    fn test_macro_rows_stack_planned() {
        let view = DashboardView::build(&log(), Some(&targets()));
        let calories = &view.macros[0];
        assert_eq!(calories.bar.logged_width, 75.0);
        assert_eq!(calories.bar.planned_width, 25.0);
        assert!(calories.bar.over_target);

        let protein = &view.macros[1];
        assert_eq!(protein.bar.logged, 80.0);
        assert_eq!(protein.bar.planned, 30.0);
    }

    #[test]
    fn test_micronutrient_groups_union_keys() {
        let view = DashboardView::build(&log(), Some(&targets()));
        let groups: Vec<MicronutrientGroup> =
            view.micronutrients.iter().map(|s| s.group).collect();
        assert_eq!(
            groups,
            vec![
                MicronutrientGroup::Vitamin,
                MicronutrientGroup::Mineral,
                MicronutrientGroup::Other
            ]
        );

        let iron = &view.micronutrients[1].rows[0];
        assert_eq!(iron.label, "Iron");
        assert_eq!(iron.unit, "mg");
        assert_eq!(iron.bar.logged, 0.0);
        assert_eq!(iron.bar.planned, 4.0);
        assert_eq!(iron.bar.target, 18.0);

        let lycopene = &view.micronutrients[2].rows[0];
        assert_eq!(lycopene.bar.target, 0.0);
        assert_eq!(lycopene.bar.logged_width, 0.0);
    }

    #[test]
    fn test_missing_hydration_renders_unavailable() {
        let view = DashboardView::build(&log(), None);
        assert!(view.hydration.is_none());
        let text = view.render();
        assert!(text.contains(HYDRATION_UNAVAILABLE));
        assert!(text.contains("7.5 / 10 (Good)"));
    }

    #[test]
    fn test_hydration_from_server_target() {
        let mut log = log();
        log.hydration = Some(crate::models::HydrationStatus {
            water_ml: 2500.0,
            target_ml: 2000.0,
            ratio: Some(1.25),
            score_adjustment: Some(0.5),
        });
        let view = DashboardView::build(&log, None);
        let h = view.hydration.unwrap();
        assert_eq!(h.width, 100.0);
        assert_eq!(h.percent(), 125.0);
        assert!(view.render().contains("score +0.5"));
    }

    #[tokio::test]
    async fn test_hydration_without_target_renders_unavailable() {
        let log: DailyNutritionLog = serde_json::from_value(serde_json::json!({
            "date": "2024-05-02",
            "total_calories": 900.0,
            "nutrition_score": 6.0,
            "hydration": {"water_ml": 500.0}
        }))
        .unwrap();
        let api = FakeNutrition::with_log(log);
        let mut dashboard = NutritionDashboard::new(day());
        dashboard.load(&api).await;

        let text = dashboard.render();
        assert!(text.contains(HYDRATION_UNAVAILABLE));
        assert!(!text.contains(NUTRITION_ERROR));
    }

    #[tokio::test]
    async fn test_missing_day_shows_empty_log() {
        let api = FakeNutrition::failing(404);
        let mut dashboard = NutritionDashboard::new(day());
        dashboard.load(&api).await;

        let log = dashboard.log().value().unwrap();
        assert!(log.food_logs.is_empty());
        assert!(dashboard.render().contains(SCORE_UNAVAILABLE));
    }

    #[tokio::test]
    async fn test_server_error_shows_copy() {
        let api = FakeNutrition::failing(500);
        let mut dashboard = NutritionDashboard::new(day());
        dashboard.load(&api).await;
        assert_eq!(dashboard.render(), format!("{}\n", NUTRITION_ERROR));
    }

    #[tokio::test]
    async fn test_log_food_validates_first() {
        let api = FakeNutrition::with_log(log());
        let mut dashboard = NutritionDashboard::new(day());
        let entry = NewFoodLogEntry {
            food_id: 3,
            serving_size: 0.0,
            serving_unit: "g".into(),
            meal_type: MealType::Breakfast,
        };
        assert!(dashboard.log_food(&api, &entry).await.is_err());
        assert_eq!(api.log_calls.load(Ordering::SeqCst), 0);

        let entry = NewFoodLogEntry {
            serving_size: 150.0,
            ..entry
        };
        let logged = dashboard.log_food(&api, &entry).await.unwrap();
        assert_eq!(logged.calories, 120.0);
        assert!(dashboard.view().is_some());
    }

    #[test]
    fn test_meals_grouped_in_order() {
        let mut log = log();
        for (id, meal) in [(1, MealType::Dinner), (2, MealType::Breakfast)] {
            log.food_logs.push(FoodLogEntry {
                id,
                food_id: id,
                food_name: format!("food {}", id),
                serving_size: 100.0,
                serving_unit: "g".into(),
                meal_type: meal,
                calories: 50.0,
                protein: 0.0,
                carbohydrates: 0.0,
                fat: 0.0,
                micronutrients: Micronutrients::new(),
                logged_at: None,
            });
        }
        let text = DashboardView::build(&log, None).render();
        let breakfast = text.find("Breakfast").unwrap();
        let dinner = text.find("Dinner").unwrap();
        assert!(breakfast < dinner);
    }
}
