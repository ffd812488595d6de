//! Forum endpoints

use super::client::ApiClient;
use super::error::ApiResult;
use super::params::PostQuery;
use super::response::Fetched;
use super::ForumApi;
use crate::models::{Comment, CreatePostRequest, ForumPost, Page, Recipe, Tag};
use async_trait::async_trait;
use reqwest::Method;

#[async_trait]
impl ForumApi for ApiClient {
    async fn get_forum_posts(&self, query: &PostQuery) -> ApiResult<Fetched<Page<ForumPost>>> {
        self.get_list("forum/posts/", &query.to_query()).await
    }

    async fn get_post(&self, id: u64) -> ApiResult<ForumPost> {
        self.get_json(&format!("forum/posts/{}/", id), &[]).await
    }

    async fn create_post(&self, request: &CreatePostRequest) -> ApiResult<ForumPost> {
        self.send_json(Method::POST, "forum/posts/", request).await
    }

    async fn like_post(&self, id: u64) -> ApiResult<()> {
        self.send_no_content::<()>(Method::POST, &format!("forum/posts/{}/like/", id), None)
            .await
    }

    async fn unlike_post(&self, id: u64) -> ApiResult<()> {
        self.send_no_content::<()>(Method::DELETE, &format!("forum/posts/{}/like/", id), None)
            .await
    }

    async fn get_comments(&self, post_id: u64) -> ApiResult<Vec<Comment>> {
        let fetched = self
            .get_list(&format!("forum/posts/{}/comments/", post_id), &[])
            .await?;
        Ok(fetched.into_results())
    }

    async fn add_comment(&self, post_id: u64, body: &str) -> ApiResult<Comment> {
        let payload = serde_json::json!({ "body": body });
        self.send_json(
            Method::POST,
            &format!("forum/posts/{}/comments/", post_id),
            &payload,
        )
        .await
    }

    async fn get_tags(&self) -> ApiResult<Vec<Tag>> {
        let fetched = self.get_list("forum/tags/", &[]).await?;
        Ok(fetched.into_results())
    }

    async fn get_recipe(&self, post_id: u64) -> ApiResult<Option<Recipe>> {
        match self
            .get_json(&format!("forum/posts/{}/recipe/", post_id), &[])
            .await
        {
            Ok(recipe) => Ok(Some(recipe)),
            Err(e) if e.is_not_found() => Ok(None),
            Err(e) => Err(e),
        }
    }
}
