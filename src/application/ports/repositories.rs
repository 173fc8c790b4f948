use crate::domain::entities::{Comment, Post, PostChanges, Profile};
use crate::shared::error::AppError;
use async_trait::async_trait;
use std::collections::{HashMap, HashSet};

/// Store adapter for `community_posts`. Listing joins the author's display
/// metadata; ordering is newest-first.
#[async_trait]
pub trait PostRepository: Send + Sync {
    async fn create_post(&self, post: &Post) -> Result<(), AppError>;
    async fn get_post(&self, id: &str) -> Result<Option<Post>, AppError>;
    async fn list_posts(&self, visible_only: bool) -> Result<Vec<Post>, AppError>;
    async fn update_post_fields(&self, id: &str, changes: &PostChanges) -> Result<(), AppError>;
    async fn set_post_visibility(&self, id: &str, visible: bool) -> Result<(), AppError>;
    /// Hard delete. Cascades to the post's comments and likes in the same
    /// transaction.
    async fn delete_post(&self, id: &str) -> Result<(), AppError>;
}

#[async_trait]
pub trait CommentRepository: Send + Sync {
    /// Inserts a comment for an existing post; `NotFound` when the post is
    /// gone.
    async fn create_comment(
        &self,
        post_id: &str,
        author_id: &str,
        content: &str,
    ) -> Result<Comment, AppError>;

    /// Comments of one post, oldest first, with author display metadata.
    async fn list_comments_by_post(&self, post_id: &str) -> Result<Vec<Comment>, AppError>;

    /// Comment cardinality grouped by post id for the given posts. Posts
    /// without comments are absent from the map.
    async fn count_comments(&self, post_ids: &[String]) -> Result<HashMap<String, u32>, AppError>;
}

#[async_trait]
pub trait LikeRepository: Send + Sync {
    /// Removes the (post, user) like when present, inserts it otherwise, as
    /// one transaction against the UNIQUE(post_id, user_id) constraint.
    /// Returns the resulting liked state.
    async fn toggle_like(&self, post_id: &str, user_id: &str) -> Result<bool, AppError>;

    async fn count_likes(&self, post_ids: &[String]) -> Result<HashMap<String, u32>, AppError>;

    /// Subset of `post_ids` the given user has liked.
    async fn liked_by_user(
        &self,
        user_id: &str,
        post_ids: &[String],
    ) -> Result<HashSet<String>, AppError>;
}

#[async_trait]
pub trait ProfileRepository: Send + Sync {
    async fn get_profile_by_user(&self, user_id: &str) -> Result<Option<Profile>, AppError>;
    /// Provisioning hook for seeding and tests; the feed itself never writes
    /// profiles.
    async fn upsert_profile(&self, profile: &Profile) -> Result<(), AppError>;
}
