use super::mapper::{map_post_row, serialize_media_urls};
use super::queries::{
    DELETE_POST, DELETE_POST_COMMENTS, DELETE_POST_LIKES, INSERT_POST, SELECT_ALL_POSTS,
    SELECT_POST_BY_ID, SELECT_VISIBLE_POSTS, SET_POST_VISIBILITY, UPDATE_POST_FIELDS,
};
use super::SqliteRepository;
use crate::application::ports::repositories::PostRepository;
use crate::domain::entities::{Post, PostChanges};
use crate::infrastructure::realtime::{ChangeEvent, ChangeKind};
use crate::shared::error::AppError;
use async_trait::async_trait;
use chrono::Utc;

#[async_trait]
impl PostRepository for SqliteRepository {
    async fn create_post(&self, post: &Post) -> Result<(), AppError> {
        let media_json = serialize_media_urls(&post.media_urls);

        sqlx::query(INSERT_POST)
            .bind(&post.id)
            .bind(&post.title)
            .bind(&post.content)
            .bind(&post.author.user_id)
            .bind(&post.category)
            .bind(post.visible as i64)
            .bind(&media_json)
            .bind(post.created_at.timestamp_millis())
            .bind(post.updated_at.timestamp_millis())
            .execute(self.pool.get_pool())
            .await?;

        self.hub
            .publish(ChangeEvent::post(ChangeKind::Insert, &post.id));
        Ok(())
    }

    async fn get_post(&self, id: &str) -> Result<Option<Post>, AppError> {
        let row = sqlx::query(SELECT_POST_BY_ID)
            .bind(id)
            .fetch_optional(self.pool.get_pool())
            .await?;

        match row {
            Some(row) => Ok(Some(map_post_row(&row)?)),
            None => Ok(None),
        }
    }

    async fn list_posts(&self, visible_only: bool) -> Result<Vec<Post>, AppError> {
        let query = if visible_only {
            SELECT_VISIBLE_POSTS
        } else {
            SELECT_ALL_POSTS
        };
        let rows = sqlx::query(query).fetch_all(self.pool.get_pool()).await?;

        let mut posts = Vec::with_capacity(rows.len());
        for row in rows {
            posts.push(map_post_row(&row)?);
        }

        Ok(posts)
    }

    async fn update_post_fields(&self, id: &str, changes: &PostChanges) -> Result<(), AppError> {
        let result = sqlx::query(UPDATE_POST_FIELDS)
            .bind(changes.title.as_deref())
            .bind(changes.content.as_deref())
            .bind(changes.category.as_deref())
            .bind(Utc::now().timestamp_millis())
            .bind(id)
            .execute(self.pool.get_pool())
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("post {id} not found")));
        }

        self.hub.publish(ChangeEvent::post(ChangeKind::Update, id));
        Ok(())
    }

    async fn set_post_visibility(&self, id: &str, visible: bool) -> Result<(), AppError> {
        // single-statement write of the target value; two moderators cannot
        // interleave a read-then-negate here
        let result = sqlx::query(SET_POST_VISIBILITY)
            .bind(visible as i64)
            .bind(Utc::now().timestamp_millis())
            .bind(id)
            .execute(self.pool.get_pool())
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("post {id} not found")));
        }

        self.hub.publish(ChangeEvent::post(ChangeKind::Update, id));
        Ok(())
    }

    async fn delete_post(&self, id: &str) -> Result<(), AppError> {
        let mut tx = self.pool.get_pool().begin().await?;
        sqlx::query(DELETE_POST_LIKES)
            .bind(id)
            .execute(&mut *tx)
            .await?;
        sqlx::query(DELETE_POST_COMMENTS)
            .bind(id)
            .execute(&mut *tx)
            .await?;
        let result = sqlx::query(DELETE_POST).bind(id).execute(&mut *tx).await?;
        tx.commit().await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("post {id} not found")));
        }

        // child deletions are implied by the post delete
        self.hub.publish(ChangeEvent::post(ChangeKind::Delete, id));
        Ok(())
    }
}
