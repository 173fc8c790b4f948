use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// An endorsement relation between one user and one post. The store enforces
/// at most one row per (post_id, user_id) pair.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Like {
    pub id: String,
    pub post_id: String,
    pub user_id: String,
    pub created_at: DateTime<Utc>,
}

impl Like {
    pub fn new(post_id: String, user_id: String) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            post_id,
            user_id,
            created_at: Utc::now(),
        }
    }
}
