//! Forum Page
//!
//! Paginated post list with tag filter and ordering. Fetched pages are kept
//! in a shared [`TtlCache`] keyed by query; liked state is mirrored into the
//! key-value store so it survives restarts.

use crate::api::{ApiError, ApiResult, Fetched, ForumApi, PostQuery, PostSort};
use crate::models::{ForumPost, Page, Tag};
use crate::state::{ListState, LoadState, Paginator, TtlCache};
use crate::storage::{KeyValueStore, KeyValueStoreExt, StorageResult, LIKED_POSTS_KEY};
use std::collections::BTreeMap;
use std::fmt::Write;
use std::sync::{Arc, Mutex};
use std::time::Duration;

pub const POSTS_EMPTY: &str = "No posts yet.";
pub const POSTS_ERROR: &str = "Error fetching posts. Please try again later.";
pub const TAGS_ERROR: &str = "Error fetching tags.";

/// Post pages shared by every forum view
pub type SharedPostCache = Arc<Mutex<TtlCache<PostQuery, Page<ForumPost>>>>;

pub fn new_post_cache(ttl: Duration) -> SharedPostCache {
    Arc::new(Mutex::new(TtlCache::new(ttl)))
}

/// Liked-post state persisted under `likedPosts`
#[derive(Clone)]
pub struct LikeTracker {
    store: Arc<dyn KeyValueStore>,
}

impl LikeTracker {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self { store }
    }

    /// Every recorded post id and whether it is liked
    pub fn all(&self) -> BTreeMap<u64, bool> {
        self.store.get_json(LIKED_POSTS_KEY).unwrap_or_default()
    }

    pub fn is_liked(&self, post_id: u64) -> Option<bool> {
        self.all().get(&post_id).copied()
    }

    pub fn record(&self, post_id: u64, liked: bool) -> StorageResult<()> {
        let mut liked_posts = self.all();
        liked_posts.insert(post_id, liked);
        self.store.set_json(LIKED_POSTS_KEY, &liked_posts)
    }

    /// Overlay the stored liked flags on freshly fetched posts
    pub fn apply(&self, posts: &mut [ForumPost]) {
        let liked_posts = self.all();
        for post in posts {
            if let Some(&liked) = liked_posts.get(&post.id) {
                post.is_liked = liked;
            }
        }
    }
}

/// Like or unlike `post`, updating it optimistically
///
/// On failure the post's liked flag and count are restored and the error
/// is returned. Returns the new liked state.
pub async fn toggle_like<A: ForumApi + ?Sized>(
    api: &A,
    post: &mut ForumPost,
    likes: &LikeTracker,
) -> ApiResult<bool> {
    let (was_liked, old_count) = (post.is_liked, post.likes);

    post.is_liked = !was_liked;
    post.likes = if was_liked {
        old_count.saturating_sub(1)
    } else {
        old_count.saturating_add(1)
    };

    let result = if was_liked {
        api.unlike_post(post.id).await
    } else {
        api.like_post(post.id).await
    };

    if let Err(e) = result {
        tracing::warn!(post_id = post.id, error = %e, "Like toggle failed, rolling back");
        post.is_liked = was_liked;
        post.likes = old_count;
        return Err(e);
    }

    if let Err(e) = likes.record(post.id, post.is_liked) {
        tracing::warn!(post_id = post.id, error = %e, "Failed to persist liked state");
    }
    Ok(post.is_liked)
}

/// Forum list view model
pub struct ForumPage {
    query: PostQuery,
    paginator: Paginator,
    state: ListState<ForumPost>,
    tags: LoadState<Vec<Tag>>,
    cache: SharedPostCache,
    likes: LikeTracker,
    /// Local title/body filter over the loaded page
    filter_text: Option<String>,
}

impl ForumPage {
    pub fn new(page_size: u32, cache: SharedPostCache, likes: LikeTracker) -> Self {
        let paginator = Paginator::new(page_size);
        let query = PostQuery {
            page_size: paginator.page_size(),
            ..PostQuery::default()
        };
        Self {
            query,
            paginator,
            state: ListState::Loading,
            tags: LoadState::Loading,
            cache,
            likes,
            filter_text: None,
        }
    }

    pub fn query(&self) -> &PostQuery {
        &self.query
    }

    pub fn state(&self) -> &ListState<ForumPost> {
        &self.state
    }

    pub fn paginator(&self) -> &Paginator {
        &self.paginator
    }

    pub fn tags(&self) -> &LoadState<Vec<Tag>> {
        &self.tags
    }

    pub fn set_tags(&mut self, tags: Vec<String>) {
        self.query.tags = tags;
        self.paginator.reset();
    }

    /// Add the tag to the filter, or remove it if already selected
    pub fn toggle_tag(&mut self, tag: &str) {
        match self
            .query
            .tags
            .iter()
            .position(|t| t.eq_ignore_ascii_case(tag))
        {
            Some(i) => {
                self.query.tags.remove(i);
            }
            None => self.query.tags.push(tag.to_string()),
        }
        self.paginator.reset();
    }

    pub fn set_search(&mut self, search: Option<String>) {
        self.query.search = search;
        self.paginator.reset();
    }

    pub fn set_sort(&mut self, sort: PostSort) {
        self.query.sort = sort;
        self.paginator.reset();
    }

    pub fn set_filter_text(&mut self, text: Option<String>) {
        self.filter_text = text;
    }

    pub fn start_at_page(&mut self, page: u32) {
        self.query.page = page.max(1);
    }

    pub fn go_to_page(&mut self, page: u32) -> bool {
        self.paginator.go_to(page)
    }

    pub fn next_page(&mut self) -> bool {
        self.paginator.next()
    }

    pub fn previous_page(&mut self) -> bool {
        self.paginator.previous()
    }

    fn cached(&self, key: &PostQuery) -> Option<Page<ForumPost>> {
        self.cache.lock().ok().and_then(|cache| cache.get(key))
    }

    /// Load the current page, from the cache when fresh
    pub async fn load<A: ForumApi + ?Sized>(&mut self, api: &A) {
        if self.paginator.count() > 0 {
            self.query.page = self.paginator.page();
        }
        let key = self.query.clone();

        let result = match self.cached(&key) {
            Some(page) => {
                tracing::debug!(page = key.page, "Post cache hit");
                Ok(Fetched::Ok(page))
            }
            None => {
                self.state = ListState::Loading;
                let fetched = api.get_forum_posts(&key).await;
                // Only full pages are cached
                if let Ok(Fetched::Ok(page)) = &fetched {
                    if let Ok(mut cache) = self.cache.lock() {
                        cache.insert(key.clone(), page.clone());
                    }
                }
                fetched
            }
        };

        let result = result.map(|fetched| {
            fetched.map(|mut page| {
                self.likes.apply(&mut page.results);
                page
            })
        });

        if let Ok(fetched) = &result {
            if let Some(page) = fetched.value() {
                self.paginator.update_from(page);
                self.paginator.go_to(key.page);
            }
        }
        self.state = ListState::from_fetch(result, POSTS_EMPTY, POSTS_ERROR);
    }

    /// Drop the cached copy of the current page and fetch it again
    pub async fn refresh<A: ForumApi + ?Sized>(&mut self, api: &A) {
        if let Ok(mut cache) = self.cache.lock() {
            cache.invalidate(&self.query);
        }
        self.load(api).await;
    }

    pub async fn load_tags<A: ForumApi + ?Sized>(&mut self, api: &A) {
        self.tags = LoadState::from_result(api.get_tags().await, TAGS_ERROR);
    }

    /// Like or unlike a post on the current page
    ///
    /// The cached pages are updated only once the server accepts the
    /// change.
    pub async fn toggle_like<A: ForumApi + ?Sized>(
        &mut self,
        api: &A,
        post_id: u64,
    ) -> ApiResult<bool> {
        let post = self
            .state
            .items_mut()
            .and_then(|items| items.iter_mut().find(|p| p.id == post_id))
            .ok_or_else(|| ApiError::Api {
                status: 404,
                message: format!("Post {} is not on this page.", post_id),
            })?;

        let liked = toggle_like(api, post, &self.likes).await?;
        let likes = post.likes;

        if let Ok(mut cache) = self.cache.lock() {
            cache.update_all(|page| {
                for cached in page.results.iter_mut().filter(|p| p.id == post_id) {
                    cached.is_liked = liked;
                    cached.likes = likes;
                }
            });
        }
        Ok(liked)
    }

    /// Loaded posts after the local text filter
    pub fn visible_posts(&self) -> Vec<&ForumPost> {
        let needle = self
            .filter_text
            .as_deref()
            .map(|t| t.trim().to_lowercase())
            .filter(|t| !t.is_empty());

        self.state
            .items()
            .iter()
            .filter(|post| match &needle {
                Some(n) => {
                    post.title.to_lowercase().contains(n) || post.body.to_lowercase().contains(n)
                }
                None => true,
            })
            .collect()
    }

    pub fn render(&self) -> String {
        let mut out = String::new();

        if !self.query.tags.is_empty() {
            let _ = writeln!(out, "Tags: {}", self.query.tags.join(", "));
        }

        match &self.state {
            ListState::Loading => out.push_str("Loading posts...\n"),
            ListState::Empty { message } | ListState::Error { message } => {
                let _ = writeln!(out, "{}", message);
            }
            ListState::Loaded { total, warning, .. } => {
                let _ = writeln!(out, "Forum ({} posts, {})", total, self.query.sort);
                if let Some(w) = warning {
                    let _ = writeln!(out, "Warning: {}", w);
                }
                for post in self.visible_posts() {
                    out.push_str(&render_post_summary(post));
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

/// One post as a list entry
pub fn render_post_summary(post: &ForumPost) -> String {
    let mut out = String::new();
    let heart = if post.is_liked { "♥" } else { "♡" };
    let _ = writeln!(
        out,
        "#{} {}  by {}  {} {}  {}",
        post.id,
        post.title,
        post.author.username,
        heart,
        post.likes,
        post.created_at.format("%Y-%m-%d")
    );
    if !post.tags.is_empty() {
        let names: Vec<&str> = post.tags.iter().map(|t| t.name.as_str()).collect();
        let _ = writeln!(out, "    [{}]", names.join("] ["));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Comment, CreatePostRequest, Recipe};
    use crate::storage::MemoryStore;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[derive(Default)]
    struct FakeForum {
        posts: Vec<ForumPost>,
        fail_like: bool,
        list_calls: AtomicUsize,
        like_calls: AtomicUsize,
        warning: Option<u16>,
    }

    #[async_trait]
    impl ForumApi for FakeForum {
        async fn get_forum_posts(&self, query: &PostQuery) -> ApiResult<Fetched<Page<ForumPost>>> {
            self.list_calls.fetch_add(1, Ordering::SeqCst);
            let mut page = Page::empty();
            page.results = self
                .posts
                .iter()
                .filter(|p| query.tags.is_empty() || query.tags.iter().any(|t| p.has_tag(t)))
                .cloned()
                .collect();
            page.count = page.results.len() as u64;
            match self.warning {
                Some(206) => Ok(Fetched::PartialOk(page, "Some posts are hidden.".into())),
                Some(204) => Ok(Fetched::Empty("No posts match these tags.".into())),
                _ => Ok(Fetched::Ok(page)),
            }
        }

        async fn get_post(&self, id: u64) -> ApiResult<ForumPost> {
            self.posts
                .iter()
                .find(|p| p.id == id)
                .cloned()
                .ok_or(ApiError::Api {
                    status: 404,
                    message: "Not found.".into(),
                })
        }

        async fn create_post(&self, _request: &CreatePostRequest) -> ApiResult<ForumPost> {
            Err(ApiError::Timeout)
        }

        async fn like_post(&self, _id: u64) -> ApiResult<()> {
            self.like_calls.fetch_add(1, Ordering::SeqCst);
            if self.fail_like {
                Err(ApiError::Network("connection reset".into()))
            } else {
                Ok(())
            }
        }

        async fn unlike_post(&self, id: u64) -> ApiResult<()> {
            self.like_post(id).await
        }

        async fn get_comments(&self, _post_id: u64) -> ApiResult<Vec<Comment>> {
            Ok(Vec::new())
        }

        async fn add_comment(&self, _post_id: u64, _body: &str) -> ApiResult<Comment> {
            Err(ApiError::Timeout)
        }

        async fn get_tags(&self) -> ApiResult<Vec<Tag>> {
            Ok(vec![Tag {
                id: 1,
                name: "Recipe".into(),
            }])
        }

        async fn get_recipe(&self, _post_id: u64) -> ApiResult<Option<Recipe>> {
            Ok(None)
        }
    }

    fn post(id: u64, title: &str, likes: u32, tag: &str) -> ForumPost {
        serde_json::from_value(serde_json::json!({
            "id": id,
            "author": {"id": 1, "username": "mert"},
            "title": title,
            "body": "body text",
            "tags": [{"id": 1, "name": tag}],
            "likes": likes,
            "created_at": "2024-04-10T08:30:00Z"
        }))
        .unwrap()
    }

    fn new_view() -> (ForumPage, LikeTracker) {
        let store: Arc<dyn KeyValueStore> = Arc::new(MemoryStore::new());
        let likes = LikeTracker::new(store);
        let view = ForumPage::new(10, new_post_cache(Duration::from_secs(300)), likes.clone());
        (view, likes)
    }

    #[tokio::test]
    async fn test_empty_forum_shows_copy() {
        let api = FakeForum::default();
        let (mut view, _) = new_view();
        view.load(&api).await;
        assert_eq!(view.render(), format!("{}\n", POSTS_EMPTY));
    }

    #[tokio::test]
    async fn test_no_content_warning_verbatim() {
        let api = FakeForum {
            warning: Some(204),
            ..FakeForum::default()
        };
        let (mut view, _) = new_view();
        view.set_tags(vec!["Vegan".into()]);
        view.load(&api).await;

        assert!(view.state().items().is_empty());
        assert_eq!(view.state().message(), Some("No posts match these tags."));
    }

    #[tokio::test]
    async fn test_second_load_served_from_cache() {
        let api = FakeForum {
            posts: vec![post(1, "Lentil soup", 2, "Recipe")],
            ..FakeForum::default()
        };
        let (mut view, _) = new_view();
        view.load(&api).await;
        view.load(&api).await;
        assert_eq!(api.list_calls.load(Ordering::SeqCst), 1);

        view.refresh(&api).await;
        assert_eq!(api.list_calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_stale_queries_leave_the_cache() {
        let api = FakeForum {
            posts: vec![post(1, "Lentil soup", 2, "Recipe")],
            ..FakeForum::default()
        };
        let store: Arc<dyn KeyValueStore> = Arc::new(MemoryStore::new());
        let cache = new_post_cache(Duration::from_millis(1));
        let mut view = ForumPage::new(10, cache.clone(), LikeTracker::new(store));

        for i in 0..20 {
            view.set_tags(vec![format!("tag-{}", i)]);
            view.load(&api).await;
            tokio::time::sleep(Duration::from_millis(2)).await;
        }
        assert_eq!(api.list_calls.load(Ordering::SeqCst), 20);
        assert!(cache.lock().unwrap().len() <= 1);
    }

    #[tokio::test]
    async fn test_like_count_saturates() {
        let api = FakeForum::default();
        let (_, likes) = new_view();
        let mut p = post(9, "Popular", u32::MAX, "Recipe");

        assert!(toggle_like(&api, &mut p, &likes).await.unwrap());
        assert_eq!(p.likes, u32::MAX);
    }

    #[tokio::test]
    async fn test_partial_pages_are_not_cached() {
        let api = FakeForum {
            posts: vec![post(1, "Lentil soup", 2, "Recipe")],
            warning: Some(206),
            ..FakeForum::default()
        };
        let (mut view, _) = new_view();
        view.load(&api).await;
        view.load(&api).await;

        assert_eq!(api.list_calls.load(Ordering::SeqCst), 2);
        assert_eq!(view.state().warning(), Some("Some posts are hidden."));
    }

    #[tokio::test]
    async fn test_failed_like_rolls_back() {
        let api = FakeForum {
            posts: vec![post(7, "Oat bars", 4, "Recipe")],
            fail_like: true,
            ..FakeForum::default()
        };
        let (mut view, likes) = new_view();
        view.load(&api).await;

        let err = view.toggle_like(&api, 7).await.unwrap_err();
        assert!(matches!(err, ApiError::Network(_)));

        let restored = &view.state().items()[0];
        assert!(!restored.is_liked);
        assert_eq!(restored.likes, 4);
        assert_eq!(likes.is_liked(7), None);
    }

    #[tokio::test]
    async fn test_like_persists_and_updates_cache() {
        let api = FakeForum {
            posts: vec![post(7, "Oat bars", 4, "Recipe")],
            ..FakeForum::default()
        };
        let (mut view, likes) = new_view();
        view.load(&api).await;

        assert!(view.toggle_like(&api, 7).await.unwrap());
        assert_eq!(view.state().items()[0].likes, 5);
        assert_eq!(likes.is_liked(7), Some(true));

        // Served from the cache, which must carry the new count
        view.load(&api).await;
        assert_eq!(api.list_calls.load(Ordering::SeqCst), 1);
        let cached = &view.state().items()[0];
        assert!(cached.is_liked);
        assert_eq!(cached.likes, 5);
    }

    #[tokio::test]
    async fn test_stored_likes_overlay_fetched_posts() {
        let api = FakeForum {
            posts: vec![post(3, "Protein pancakes", 1, "Recipe")],
            ..FakeForum::default()
        };
        let (mut view, likes) = new_view();
        likes.record(3, true).unwrap();
        view.load(&api).await;

        assert!(view.state().items()[0].is_liked);
        assert!(view.render().contains("♥ 1"));
    }

    #[tokio::test]
    async fn test_unlike_never_underflows() {
        let api = FakeForum::default();
        let store: Arc<dyn KeyValueStore> = Arc::new(MemoryStore::new());
        let likes = LikeTracker::new(store);
        let mut p = post(1, "x", 0, "Recipe");
        p.is_liked = true;

        assert!(!toggle_like(&api, &mut p, &likes).await.unwrap());
        assert_eq!(p.likes, 0);
    }

    #[tokio::test]
    async fn test_tag_toggle_and_local_filter() {
        let api = FakeForum {
            posts: vec![
                post(1, "Lentil soup", 0, "Recipe"),
                post(2, "Hydration tips", 0, "Dietary tip"),
            ],
            ..FakeForum::default()
        };
        let (mut view, _) = new_view();
        view.toggle_tag("Recipe");
        view.load(&api).await;
        assert_eq!(view.state().items().len(), 1);

        view.toggle_tag("recipe");
        assert!(view.query().tags.is_empty());
        view.load(&api).await;
        view.set_filter_text(Some("HYDRATION".into()));
        let visible = view.visible_posts();
        let titles: Vec<&str> = visible.iter().map(|p| p.title.as_str()).collect();
        assert_eq!(titles, vec!["Hydration tips"]);
    }

    #[tokio::test]
    async fn test_load_tags() {
        let api = FakeForum::default();
        let (mut view, _) = new_view();
        view.load_tags(&api).await;
        assert_eq!(view.tags().value().map(|t| t.len()), Some(1));
    }
}
