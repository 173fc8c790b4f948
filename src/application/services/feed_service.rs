use crate::application::ports::identity::{CurrentUser, IdentityProvider};
use crate::application::ports::repositories::{
    CommentRepository, LikeRepository, PostRepository,
};
use crate::domain::entities::{Author, Comment, EnrichedPost, Post, PostChanges};
use crate::shared::error::AppError;
use std::collections::HashSet;
use std::sync::Arc;

pub const DEFAULT_CATEGORY: &str = "general";

/// Draft of a new community post as submitted by the composer form.
#[derive(Debug, Clone, Default)]
pub struct NewPost {
    pub title: String,
    pub content: String,
    pub category: Option<String>,
    pub media_urls: Vec<String>,
}

/// Aggregation layer over the community collections: listing joins the author
/// metadata, and every listed post is merged with its live counter state.
/// Counter queries are batched (one grouped query per related collection), so
/// a feed of N posts costs three store round-trips instead of 3N.
pub struct FeedService {
    posts: Arc<dyn PostRepository>,
    comments: Arc<dyn CommentRepository>,
    likes: Arc<dyn LikeRepository>,
    identity: Arc<dyn IdentityProvider>,
}

impl FeedService {
    pub fn new(
        posts: Arc<dyn PostRepository>,
        comments: Arc<dyn CommentRepository>,
        likes: Arc<dyn LikeRepository>,
        identity: Arc<dyn IdentityProvider>,
    ) -> Self {
        Self {
            posts,
            comments,
            likes,
            identity,
        }
    }

    async fn require_user(&self) -> Result<CurrentUser, AppError> {
        self.identity
            .current_user()
            .await?
            .ok_or(AppError::Unauthenticated)
    }

    fn normalize_category(category: Option<String>) -> String {
        category
            .map(|value| value.trim().to_string())
            .filter(|value| !value.is_empty())
            .unwrap_or_else(|| DEFAULT_CATEGORY.to_string())
    }

    fn require_text(value: &str, field: &str) -> Result<String, AppError> {
        let trimmed = value.trim();
        if trimmed.is_empty() {
            return Err(AppError::Validation(format!("{field} must not be empty")));
        }
        Ok(trimmed.to_string())
    }

    /// Full listing, newest first. Hidden posts are present only when
    /// `visible_only` is false (the administrative view).
    pub async fn list_feed(&self, visible_only: bool) -> Result<Vec<EnrichedPost>, AppError> {
        let posts = self.posts.list_posts(visible_only).await?;
        self.enrich_all(posts).await
    }

    /// Merges each post with `comments_count`, `likes_count` and the
    /// requesting user's `user_liked` flag. `user_liked` defaults to false
    /// when nobody is signed in. A failing counter query fails the whole
    /// enrichment; counts are never silently zeroed.
    pub async fn enrich_all(&self, posts: Vec<Post>) -> Result<Vec<EnrichedPost>, AppError> {
        if posts.is_empty() {
            return Ok(Vec::new());
        }

        let ids: Vec<String> = posts.iter().map(|post| post.id.clone()).collect();
        let comment_counts = self.comments.count_comments(&ids).await?;
        let like_counts = self.likes.count_likes(&ids).await?;
        let liked = match self.identity.current_user().await? {
            Some(user) => self.likes.liked_by_user(&user.user_id, &ids).await?,
            None => HashSet::new(),
        };

        Ok(posts
            .into_iter()
            .map(|post| EnrichedPost {
                comments_count: comment_counts.get(&post.id).copied().unwrap_or(0),
                likes_count: like_counts.get(&post.id).copied().unwrap_or(0),
                user_liked: liked.contains(&post.id),
                post,
            })
            .collect())
    }

    pub async fn enrich(&self, post: Post) -> Result<EnrichedPost, AppError> {
        let mut enriched = self.enrich_all(vec![post]).await?;
        enriched
            .pop()
            .ok_or_else(|| AppError::Internal("enrichment dropped the post".to_string()))
    }

    /// One post by id with its current counter state, or `None` when it no
    /// longer exists. The live bridge uses this for targeted patches.
    pub async fn enriched_post(&self, id: &str) -> Result<Option<EnrichedPost>, AppError> {
        let Some(post) = self.posts.get_post(id).await? else {
            return Ok(None);
        };
        Ok(Some(self.enrich(post).await?))
    }

    pub async fn create_post(&self, draft: NewPost) -> Result<EnrichedPost, AppError> {
        let user = self.require_user().await?;
        let title = Self::require_text(&draft.title, "title")?;
        let content = Self::require_text(&draft.content, "content")?;
        let category = Self::normalize_category(draft.category);

        let post = Post::new(
            title,
            content,
            Author::from_user_id(user.user_id),
            category,
            draft.media_urls,
        );
        self.posts.create_post(&post).await?;

        // reread so the caller sees the stored row with the author join
        let stored = self
            .posts
            .get_post(&post.id)
            .await?
            .ok_or_else(|| AppError::Internal("post missing right after insert".to_string()))?;
        Ok(EnrichedPost::fresh(stored))
    }

    /// Partial update of title/content/category. Authorship/admin enforcement
    /// stays with the external store's row policy.
    pub async fn update_post(&self, id: &str, changes: PostChanges) -> Result<(), AppError> {
        if changes.is_empty() {
            return Err(AppError::Validation("no fields to update".to_string()));
        }
        self.posts.update_post_fields(id, &changes).await
    }

    /// Moderation switch. Writes the explicit target value; hidden posts stay
    /// in the administrative listing.
    pub async fn set_visibility(&self, id: &str, visible: bool) -> Result<(), AppError> {
        self.posts.set_post_visibility(id, visible).await
    }

    pub async fn delete_post(&self, id: &str) -> Result<(), AppError> {
        self.posts.delete_post(id).await
    }

    /// Like when absent, unlike when present; returns the resulting state.
    pub async fn toggle_like(&self, post_id: &str) -> Result<bool, AppError> {
        let user = self.require_user().await?;
        self.likes.toggle_like(post_id, &user.user_id).await
    }

    pub async fn add_comment(&self, post_id: &str, content: &str) -> Result<Comment, AppError> {
        let user = self.require_user().await?;
        let content = Self::require_text(content, "comment content")?;
        self.comments
            .create_comment(post_id, &user.user_id, &content)
            .await
    }
}
