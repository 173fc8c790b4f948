use crate::application::ports::repositories::{CommentRepository, PostRepository};
use crate::domain::entities::Comment;
use crate::shared::error::AppError;
use std::sync::Arc;

/// Lazy loader for one post's comment list, invoked when the reader expands a
/// comment section. It lives outside the live bridge on purpose: a fresh
/// comment shows up here only when the consumer reloads the thread, which the
/// composer flow does right after a successful `add_comment`.
pub struct CommentThreadLoader {
    posts: Arc<dyn PostRepository>,
    comments: Arc<dyn CommentRepository>,
}

impl CommentThreadLoader {
    pub fn new(posts: Arc<dyn PostRepository>, comments: Arc<dyn CommentRepository>) -> Self {
        Self { posts, comments }
    }

    /// Comments oldest first, each carrying author display metadata.
    /// `NotFound` when the post has been deleted; a stale thread is never
    /// served for a post that no longer exists.
    pub async fn load(&self, post_id: &str) -> Result<Vec<Comment>, AppError> {
        if self.posts.get_post(post_id).await?.is_none() {
            return Err(AppError::NotFound(format!("post {post_id} not found")));
        }
        self.comments.list_comments_by_post(post_id).await
    }
}
