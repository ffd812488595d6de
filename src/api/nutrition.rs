//! Nutrition logging endpoints

use super::client::ApiClient;
use super::error::ApiResult;
use super::NutritionApi;
use crate::models::{DailyNutritionLog, FoodLogEntry, NewFoodLogEntry, NutritionTargets};
use async_trait::async_trait;
use chrono::NaiveDate;
use reqwest::Method;

fn date_param(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

#[async_trait]
impl NutritionApi for ApiClient {
    async fn get_daily_log(&self, date: NaiveDate) -> ApiResult<DailyNutritionLog> {
        self.get_json(
            &format!("meal-planner/daily-log/{}/", date_param(date)),
            &[],
        )
        .await
    }

    async fn get_nutrition_targets(&self) -> ApiResult<NutritionTargets> {
        self.get_json("meal-planner/targets/", &[]).await
    }

    async fn log_food(&self, date: NaiveDate, entry: &NewFoodLogEntry) -> ApiResult<FoodLogEntry> {
        self.send_json(
            Method::POST,
            &format!("meal-planner/daily-log/{}/entries/", date_param(date)),
            entry,
        )
        .await
    }

    async fn delete_food_log(&self, entry_id: u64) -> ApiResult<()> {
        self.send_no_content::<()>(
            Method::DELETE,
            &format!("meal-planner/food-logs/{}/", entry_id),
            None,
        )
        .await
    }

    async fn get_logs_range(
        &self,
        from: NaiveDate,
        to: NaiveDate,
    ) -> ApiResult<Vec<DailyNutritionLog>> {
        let query = [
            ("start_date".to_string(), date_param(from)),
            ("end_date".to_string(), date_param(to)),
        ];
        let fetched = self.get_list("meal-planner/daily-logs/", &query).await?;
        Ok(fetched.into_results())
    }
}
