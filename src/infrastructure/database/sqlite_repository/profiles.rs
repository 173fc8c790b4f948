use super::queries::{SELECT_PROFILE_BY_USER, UPSERT_PROFILE};
use super::SqliteRepository;
use crate::application::ports::repositories::ProfileRepository;
use crate::domain::entities::{Profile, Role};
use crate::shared::error::AppError;
use async_trait::async_trait;
use sqlx::FromRow;
use std::str::FromStr;

#[derive(Debug, FromRow)]
struct ProfileRow {
    id: String,
    user_id: String,
    email: String,
    display_name: String,
    role: String,
    member_status: String,
}

impl ProfileRow {
    fn into_domain(self) -> Profile {
        Profile {
            id: self.id,
            user_id: self.user_id,
            email: self.email,
            display_name: self.display_name,
            role: Role::from_str(&self.role).unwrap_or_default(),
            member_status: self.member_status,
        }
    }
}

#[async_trait]
impl ProfileRepository for SqliteRepository {
    async fn get_profile_by_user(&self, user_id: &str) -> Result<Option<Profile>, AppError> {
        let row = sqlx::query_as::<_, ProfileRow>(SELECT_PROFILE_BY_USER)
            .bind(user_id)
            .fetch_optional(self.pool.get_pool())
            .await?;

        Ok(row.map(ProfileRow::into_domain))
    }

    async fn upsert_profile(&self, profile: &Profile) -> Result<(), AppError> {
        sqlx::query(UPSERT_PROFILE)
            .bind(&profile.id)
            .bind(&profile.user_id)
            .bind(&profile.email)
            .bind(&profile.display_name)
            .bind(profile.role.as_str())
            .bind(&profile.member_status)
            .execute(self.pool.get_pool())
            .await?;

        Ok(())
    }
}
