//! Food catalog endpoints

use super::client::ApiClient;
use super::error::ApiResult;
use super::params::FoodQuery;
use super::response::Fetched;
use super::FoodsApi;
use crate::models::{Food, FoodProposal, Page};
use async_trait::async_trait;
use reqwest::Method;

#[async_trait]
impl FoodsApi for ApiClient {
    async fn get_foods(&self, query: &FoodQuery) -> ApiResult<Fetched<Page<Food>>> {
        self.get_list("foods/", &query.to_query()).await
    }

    async fn get_food(&self, id: u64) -> ApiResult<Food> {
        self.get_json(&format!("foods/{}/", id), &[]).await
    }

    async fn propose_food(&self, proposal: &FoodProposal) -> ApiResult<()> {
        self.send_no_content(Method::POST, "foods/propose/", Some(proposal))
            .await
    }
}
