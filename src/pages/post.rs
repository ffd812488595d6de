//! Post detail and post creation

use super::forum::{toggle_like, LikeTracker, SharedPostCache};
use crate::api::{ApiError, ApiResult, ForumApi};
use crate::models::{Comment, CreatePostRequest, ForumPost, Recipe, RecipeIngredient};
use crate::state::{ListState, LoadState};
use crate::validation::{require, ValidationErrors};
use std::fmt::Write;

pub const POST_ERROR: &str = "Error fetching the post. Please try again later.";
pub const COMMENTS_EMPTY: &str = "No comments yet.";
pub const COMMENTS_ERROR: &str = "Error fetching comments.";
pub const RECIPE_ERROR: &str = "Error fetching the recipe.";

pub const MAX_COMMENT_LEN: usize = 2000;

/// A single post with its comments and recipe
pub struct PostDetail {
    post_id: u64,
    post: LoadState<ForumPost>,
    comments: ListState<Comment>,
    recipe: LoadState<Option<Recipe>>,
}

impl PostDetail {
    pub fn new(post_id: u64) -> Self {
        Self {
            post_id,
            post: LoadState::Loading,
            comments: ListState::Loading,
            recipe: LoadState::Loading,
        }
    }

    pub fn post(&self) -> &LoadState<ForumPost> {
        &self.post
    }

    pub fn comments(&self) -> &ListState<Comment> {
        &self.comments
    }

    pub fn recipe(&self) -> Option<&Recipe> {
        self.recipe.value().and_then(|r| r.as_ref())
    }

    /// Fetch post, comments and recipe concurrently
    pub async fn load<A: ForumApi + ?Sized>(&mut self, api: &A, likes: &LikeTracker) {
        let (post, comments, recipe) = tokio::join!(
            api.get_post(self.post_id),
            api.get_comments(self.post_id),
            api.get_recipe(self.post_id)
        );

        self.post = LoadState::from_result(
            post.map(|mut p| {
                likes.apply(std::slice::from_mut(&mut p));
                p
            }),
            POST_ERROR,
        );
        self.comments = ListState::from_items(comments, COMMENTS_EMPTY, COMMENTS_ERROR);
        self.recipe = LoadState::from_result(recipe, RECIPE_ERROR);
    }

    /// Validate and post a comment, appending it on success
    pub async fn add_comment<A: ForumApi + ?Sized>(
        &mut self,
        api: &A,
        body: &str,
    ) -> ApiResult<Comment> {
        let body = validate_comment(body)?;
        let comment = api.add_comment(self.post_id, &body).await?;

        match &mut self.comments {
            ListState::Loaded { items, total, .. } => {
                items.push(comment.clone());
                *total += 1;
            }
            other => {
                *other = ListState::Loaded {
                    items: vec![comment.clone()],
                    total: 1,
                    warning: None,
                }
            }
        }
        Ok(comment)
    }

    pub async fn toggle_like<A: ForumApi + ?Sized>(
        &mut self,
        api: &A,
        likes: &LikeTracker,
        cache: Option<&SharedPostCache>,
    ) -> ApiResult<bool> {
        let post = self.post.value_mut().ok_or_else(|| ApiError::Api {
            status: 404,
            message: format!("Post {} is not loaded.", self.post_id),
        })?;
        let liked = toggle_like(api, post, likes).await?;
        let count = post.likes;

        if let Some(cache) = cache {
            if let Ok(mut cache) = cache.lock() {
                let id = self.post_id;
                cache.update_all(|page| {
                    for cached in page.results.iter_mut().filter(|p| p.id == id) {
                        cached.is_liked = liked;
                        cached.likes = count;
                    }
                });
            }
        }
        Ok(liked)
    }

    pub fn render(&self) -> String {
        let mut out = String::new();

        let post = match &self.post {
            LoadState::Loading => return "Loading post...\n".to_string(),
            LoadState::Error(message) => return format!("{}\n", message),
            LoadState::Loaded(post) => post,
        };

        let _ = writeln!(out, "{}", post.title);
        let _ = writeln!(
            out,
            "by {} on {}  {} {}",
            post.author.username,
            post.created_at.format("%Y-%m-%d %H:%M"),
            if post.is_liked { "♥" } else { "♡" },
            post.likes
        );
        if !post.tags.is_empty() {
            let names: Vec<&str> = post.tags.iter().map(|t| t.name.as_str()).collect();
            let _ = writeln!(out, "Tags: {}", names.join(", "));
        }
        let _ = writeln!(out, "\n{}\n", post.body);

        match &self.recipe {
            LoadState::Loaded(Some(recipe)) => out.push_str(&render_recipe(recipe)),
            LoadState::Error(message) => {
                let _ = writeln!(out, "{}", message);
            }
            _ => {}
        }

        let _ = writeln!(out, "Comments");
        match &self.comments {
            ListState::Loaded { items, .. } => {
                for c in items {
                    let _ = writeln!(
                        out,
                        "  {} ({}): {}",
                        c.author.username,
                        c.created_at.format("%Y-%m-%d"),
                        c.body
                    );
                }
            }
            ListState::Loading => out.push_str("  Loading...\n"),
            other => {
                let _ = writeln!(out, "  {}", other.message().unwrap_or_default());
            }
        }
        out
    }
}

fn render_recipe(recipe: &Recipe) -> String {
    let mut out = String::from("Recipe\n");
    for ingredient in &recipe.ingredients {
        let name = ingredient
            .food_name
            .clone()
            .unwrap_or_else(|| format!("food #{}", ingredient.food_id));
        let _ = writeln!(out, "  - {:.0} g {}", ingredient.amount, name);
    }
    let _ = writeln!(out, "{}\n", recipe.instructions);
    out
}

/// Trimmed comment body, or the field errors
pub fn validate_comment(body: &str) -> Result<String, ValidationErrors> {
    let mut errors = ValidationErrors::new();
    if require(&mut errors, "body", body) && body.trim().chars().count() > MAX_COMMENT_LEN {
        errors.add(
            "body",
            format!("Comments are limited to {} characters.", MAX_COMMENT_LEN),
        );
    }
    errors.into_result(body.trim().to_string())
}

/// Recipe section of the post form
#[derive(Debug, Clone, Default)]
pub struct RecipeForm {
    pub ingredients: Vec<RecipeIngredient>,
    pub instructions: String,
}

impl RecipeForm {
    fn validate_into(&self, errors: &mut ValidationErrors) -> Recipe {
        if self.ingredients.is_empty() {
            errors.add("recipe.ingredients", "Add at least one ingredient.");
        }
        if self.ingredients.iter().any(|i| i.amount <= 0.0) {
            errors.add("recipe.ingredients", "Ingredient amounts must be greater than zero.");
        }
        require(errors, "recipe.instructions", &self.instructions);

        Recipe {
            post: None,
            ingredients: self.ingredients.clone(),
            instructions: self.instructions.trim().to_string(),
        }
    }
}

/// New post input
#[derive(Debug, Clone, Default)]
pub struct PostForm {
    pub title: String,
    pub body: String,
    pub tags: Vec<u64>,
    pub recipe: Option<RecipeForm>,
}

impl PostForm {
    pub fn validate(&self) -> Result<CreatePostRequest, ValidationErrors> {
        let mut errors = ValidationErrors::new();
        require(&mut errors, "title", &self.title);
        require(&mut errors, "body", &self.body);
        let recipe = self.recipe.as_ref().map(|r| r.validate_into(&mut errors));

        let mut tags = self.tags.clone();
        tags.sort_unstable();
        tags.dedup();

        errors.into_result(CreatePostRequest {
            title: self.title.trim().to_string(),
            body: self.body.trim().to_string(),
            tags,
            recipe,
        })
    }

    /// Validate, create the post and drop cached list pages
    pub async fn submit<A: ForumApi + ?Sized>(
        &self,
        api: &A,
        cache: Option<&SharedPostCache>,
    ) -> ApiResult<ForumPost> {
        let request = self.validate()?;
        let post = api.create_post(&request).await?;

        if let Some(cache) = cache {
            if let Ok(mut cache) = cache.lock() {
                cache.clear();
            }
        }
        tracing::info!(post_id = post.id, "Post created");
        Ok(post)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::{Fetched, PostQuery};
    use crate::models::{Author, Page, Tag};
    use crate::pages::forum::new_post_cache;
    use crate::storage::{KeyValueStore, MemoryStore};
    use async_trait::async_trait;
    use chrono::{TimeZone, Utc};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::{Arc, Mutex};
    use std::time::Duration;

    #[derive(Default)]
    struct FakeForum {
        comment_calls: AtomicUsize,
        created: Mutex<Vec<CreatePostRequest>>,
        comments_fail: bool,
    }

    fn author() -> Author {
        Author {
            id: 2,
            username: "ayse".into(),
        }
    }

    fn sample_post(id: u64) -> ForumPost {
        ForumPost {
            id,
            author: author(),
            title: "Chickpea salad".into(),
            body: "Quick lunch".into(),
            tags: vec![Tag {
                id: 1,
                name: "Recipe".into(),
            }],
            likes: 3,
            is_liked: false,
            created_at: Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap(),
            updated_at: None,
        }
    }

    #[async_trait]
    impl ForumApi for FakeForum {
        async fn get_forum_posts(&self, _q: &PostQuery) -> ApiResult<Fetched<Page<ForumPost>>> {
            Ok(Fetched::Ok(Page::empty()))
        }

        async fn get_post(&self, id: u64) -> ApiResult<ForumPost> {
            Ok(sample_post(id))
        }

        async fn create_post(&self, request: &CreatePostRequest) -> ApiResult<ForumPost> {
            self.created.lock().unwrap().push(request.clone());
            let mut post = sample_post(99);
            post.title = request.title.clone();
            Ok(post)
        }

        async fn like_post(&self, _id: u64) -> ApiResult<()> {
            Ok(())
        }

        async fn unlike_post(&self, _id: u64) -> ApiResult<()> {
            Ok(())
        }

        async fn get_comments(&self, post_id: u64) -> ApiResult<Vec<Comment>> {
            if self.comments_fail {
                return Err(ApiError::Timeout);
            }
            Ok(vec![Comment {
                id: 1,
                post: post_id,
                author: author(),
                body: "Looks great".into(),
                created_at: Utc.with_ymd_and_hms(2024, 6, 2, 9, 0, 0).unwrap(),
            }])
        }

        async fn add_comment(&self, post_id: u64, body: &str) -> ApiResult<Comment> {
            self.comment_calls.fetch_add(1, Ordering::SeqCst);
            Ok(Comment {
                id: 2,
                post: post_id,
                author: author(),
                body: body.to_string(),
                created_at: Utc.with_ymd_and_hms(2024, 6, 3, 9, 0, 0).unwrap(),
            })
        }

        async fn get_tags(&self) -> ApiResult<Vec<Tag>> {
            Ok(Vec::new())
        }

        async fn get_recipe(&self, post_id: u64) -> ApiResult<Option<Recipe>> {
            Ok(Some(Recipe {
                post: Some(post_id),
                ingredients: vec![RecipeIngredient {
                    food_id: 5,
                    food_name: Some("Chickpeas".into()),
                    amount: 200.0,
                }],
                instructions: "Mix everything.".into(),
            }))
        }
    }

    fn likes() -> LikeTracker {
        let store: Arc<dyn KeyValueStore> = Arc::new(MemoryStore::new());
        LikeTracker::new(store)
    }

    #[tokio::test]
    async fn test_load_and_render() {
        let api = FakeForum::default();
        let mut detail = PostDetail::new(4);
        detail.load(&api, &likes()).await;

        let text = detail.render();
        assert!(text.starts_with("Chickpea salad\n"));
        assert!(text.contains("200 g Chickpeas"));
        assert!(text.contains("ayse (2024-06-02): Looks great"));
    }

    #[tokio::test]
    async fn test_comment_failure_keeps_post() {
        let api = FakeForum {
            comments_fail: true,
            ..FakeForum::default()
        };
        let mut detail = PostDetail::new(4);
        detail.load(&api, &likes()).await;

        assert!(detail.post().value().is_some());
        assert!(detail.render().contains(COMMENTS_ERROR));
    }

    #[tokio::test]
    async fn test_blank_comment_rejected_before_request() {
        let api = FakeForum::default();
        let mut detail = PostDetail::new(4);
        detail.load(&api, &likes()).await;

        let err = detail.add_comment(&api, "   ").await.unwrap_err();
        assert!(matches!(err, ApiError::Validation(_)));
        assert_eq!(api.comment_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_comment_appended() {
        let api = FakeForum::default();
        let mut detail = PostDetail::new(4);
        detail.load(&api, &likes()).await;

        detail.add_comment(&api, "  Tried it!  ").await.unwrap();
        assert_eq!(detail.comments().items().len(), 2);
        assert_eq!(detail.comments().items()[1].body, "Tried it!");
    }

    #[tokio::test]
    async fn test_like_from_detail_updates_cache() {
        let api = FakeForum::default();
        let cache = new_post_cache(Duration::from_secs(60));
        let mut page = Page::empty();
        page.results = vec![sample_post(4)];
        cache.lock().unwrap().insert(PostQuery::default(), page);

        let mut detail = PostDetail::new(4);
        let tracker = likes();
        detail.load(&api, &tracker).await;
        assert!(detail.toggle_like(&api, &tracker, Some(&cache)).await.unwrap());

        let cached = cache.lock().unwrap().get(&PostQuery::default()).unwrap();
        assert!(cached.results[0].is_liked);
        assert_eq!(cached.results[0].likes, 4);
    }

    #[test]
    fn test_post_form_validation() {
        let form = PostForm {
            title: "".into(),
            body: "text".into(),
            tags: vec![],
            recipe: Some(RecipeForm::default()),
        };
        let errors = form.validate().unwrap_err();
        assert_eq!(errors.get("title"), Some("This field is required."));
        assert_eq!(errors.get("recipe.ingredients"), Some("Add at least one ingredient."));
        assert!(errors.get("recipe.instructions").is_some());
    }

    #[tokio::test]
    async fn test_submit_clears_cache() {
        let api = FakeForum::default();
        let cache = new_post_cache(Duration::from_secs(60));
        cache
            .lock()
            .unwrap()
            .insert(PostQuery::default(), Page::empty());

        let form = PostForm {
            title: " Overnight oats ".into(),
            body: "Soak overnight.".into(),
            tags: vec![3, 1, 3],
            recipe: None,
        };
        let post = form.submit(&api, Some(&cache)).await.unwrap();

        assert_eq!(post.title, "Overnight oats");
        assert_eq!(api.created.lock().unwrap()[0].tags, vec![1, 3]);
        assert!(cache.lock().unwrap().is_empty());
    }
}
