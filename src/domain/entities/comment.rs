use super::profile::Author;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A reply attached to exactly one post. Comments are immutable once created
/// and disappear only through the parent post's cascade delete.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Comment {
    pub id: String,
    pub post_id: String,
    pub author: Author,
    pub content: String,
    pub created_at: DateTime<Utc>,
}

impl Comment {
    pub fn new(post_id: String, author: Author, content: String) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            post_id,
            author,
            content,
            created_at: Utc::now(),
        }
    }
}
