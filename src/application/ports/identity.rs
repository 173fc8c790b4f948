use crate::domain::entities::Role;
use crate::shared::error::AppError;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CurrentUser {
    pub user_id: String,
    pub role: Role,
}

impl CurrentUser {
    pub fn member(user_id: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
            role: Role::Member,
        }
    }

    pub fn admin(user_id: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
            role: Role::Admin,
        }
    }
}

/// The external auth provider's `getUser()` seam. `None` means no session;
/// operations that require authentication fail with `Unauthenticated`.
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    async fn current_user(&self) -> Result<Option<CurrentUser>, AppError>;
}
