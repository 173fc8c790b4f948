use crate::application::ports::identity::{CurrentUser, IdentityProvider};
use crate::shared::error::AppError;
use async_trait::async_trait;
use tokio::sync::RwLock;

/// In-process session holder standing in for the external auth provider.
/// `sign_in`/`sign_out` mirror the token lifecycle the hosted backend drives.
#[derive(Default)]
pub struct SessionIdentity {
    current: RwLock<Option<CurrentUser>>,
}

impl SessionIdentity {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn sign_in(&self, user: CurrentUser) {
        let mut current = self.current.write().await;
        *current = Some(user);
    }

    pub async fn sign_out(&self) {
        let mut current = self.current.write().await;
        *current = None;
    }
}

#[async_trait]
impl IdentityProvider for SessionIdentity {
    async fn current_user(&self) -> Result<Option<CurrentUser>, AppError> {
        Ok(self.current.read().await.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn session_roundtrip() {
        let identity = SessionIdentity::new();
        assert!(identity.current_user().await.expect("query").is_none());

        identity.sign_in(CurrentUser::member("user-1")).await;
        let user = identity
            .current_user()
            .await
            .expect("query")
            .expect("signed in");
        assert_eq!(user.user_id, "user-1");

        identity.sign_out().await;
        assert!(identity.current_user().await.expect("query").is_none());
    }
}
