use super::profile::Author;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A community feed entry. Media attachments are opaque URLs into the external
/// object store; this subsystem never touches the binary content.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Post {
    pub id: String,
    pub title: String,
    pub content: String,
    pub author: Author,
    pub category: String,
    pub visible: bool,
    pub media_urls: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Post {
    pub fn new(
        title: String,
        content: String,
        author: Author,
        category: String,
        media_urls: Vec<String>,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            title,
            content,
            author,
            category,
            visible: true,
            media_urls,
            created_at: now,
            updated_at: now,
        }
    }
}

/// A post merged with its read-time aggregation. The counters are never
/// persisted; they are recomputed from the likes/comments collections on every
/// fetch.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EnrichedPost {
    #[serde(flatten)]
    pub post: Post,
    pub comments_count: u32,
    pub likes_count: u32,
    pub user_liked: bool,
}

impl EnrichedPost {
    /// A freshly persisted post has no children yet.
    pub fn fresh(post: Post) -> Self {
        Self {
            post,
            comments_count: 0,
            likes_count: 0,
            user_liked: false,
        }
    }
}

/// Fields an author (or admin) may change on an existing post. `None` leaves
/// the stored value untouched.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PostChanges {
    pub title: Option<String>,
    pub content: Option<String>,
    pub category: Option<String>,
}

impl PostChanges {
    pub fn is_empty(&self) -> bool {
        self.title.is_none() && self.content.is_none() && self.category.is_none()
    }
}
