//! Saved meal plan endpoints

use super::client::ApiClient;
use super::error::ApiResult;
use super::MealPlanApi;
use crate::models::{CreateMealPlanRequest, SavedMealPlan};
use async_trait::async_trait;
use chrono::NaiveDate;
use reqwest::Method;

#[async_trait]
impl MealPlanApi for ApiClient {
    async fn get_saved_meal_plans(&self) -> ApiResult<Vec<SavedMealPlan>> {
        let fetched = self.get_list("meal-planner/saved-plans/", &[]).await?;
        Ok(fetched.into_results())
    }

    async fn create_saved_meal_plan(
        &self,
        request: &CreateMealPlanRequest,
    ) -> ApiResult<SavedMealPlan> {
        self.send_json(Method::POST, "meal-planner/saved-plans/", request)
            .await
    }

    async fn delete_saved_meal_plan(&self, id: u64) -> ApiResult<()> {
        self.send_no_content::<()>(
            Method::DELETE,
            &format!("meal-planner/saved-plans/{}/", id),
            None,
        )
        .await
    }

    async fn log_meal_plan(&self, id: u64, date: NaiveDate) -> ApiResult<()> {
        let body = serde_json::json!({ "date": date.format("%Y-%m-%d").to_string() });
        self.send_no_content(
            Method::POST,
            &format!("meal-planner/saved-plans/{}/log/", id),
            Some(&body),
        )
        .await
    }
}
