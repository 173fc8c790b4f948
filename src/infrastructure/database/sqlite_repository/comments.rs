use super::mapper::map_comment_row;
use super::queries::{
    INSERT_COMMENT, SELECT_COMMENTS_BY_POST, SELECT_COMMENT_BY_ID, SELECT_POST_EXISTS,
};
use super::SqliteRepository;
use crate::application::ports::repositories::CommentRepository;
use crate::domain::entities::{Author, Comment};
use crate::infrastructure::realtime::{ChangeEvent, ChangeKind};
use crate::shared::error::AppError;
use async_trait::async_trait;
use sqlx::{QueryBuilder, Row, Sqlite};
use std::collections::HashMap;

#[async_trait]
impl CommentRepository for SqliteRepository {
    async fn create_comment(
        &self,
        post_id: &str,
        author_id: &str,
        content: &str,
    ) -> Result<Comment, AppError> {
        let comment = Comment::new(
            post_id.to_string(),
            Author::from_user_id(author_id),
            content.to_string(),
        );

        // existence check and insert share one transaction so a comment can
        // never be created against a post that is already gone
        let mut tx = self.pool.get_pool().begin().await?;
        let exists = sqlx::query_scalar::<_, i64>(SELECT_POST_EXISTS)
            .bind(post_id)
            .fetch_optional(&mut *tx)
            .await?;
        if exists.is_none() {
            return Err(AppError::NotFound(format!("post {post_id} not found")));
        }
        sqlx::query(INSERT_COMMENT)
            .bind(&comment.id)
            .bind(&comment.post_id)
            .bind(author_id)
            .bind(&comment.content)
            .bind(comment.created_at.timestamp_millis())
            .execute(&mut *tx)
            .await?;
        tx.commit().await?;

        self.hub
            .publish(ChangeEvent::comment(ChangeKind::Insert, &comment.id, post_id));

        // reread with the author join so callers get display metadata
        let row = sqlx::query(SELECT_COMMENT_BY_ID)
            .bind(&comment.id)
            .fetch_optional(self.pool.get_pool())
            .await?;
        match row {
            Some(row) => map_comment_row(&row),
            None => Ok(comment),
        }
    }

    async fn list_comments_by_post(&self, post_id: &str) -> Result<Vec<Comment>, AppError> {
        let rows = sqlx::query(SELECT_COMMENTS_BY_POST)
            .bind(post_id)
            .fetch_all(self.pool.get_pool())
            .await?;

        let mut comments = Vec::with_capacity(rows.len());
        for row in rows {
            comments.push(map_comment_row(&row)?);
        }

        Ok(comments)
    }

    async fn count_comments(&self, post_ids: &[String]) -> Result<HashMap<String, u32>, AppError> {
        if post_ids.is_empty() {
            return Ok(HashMap::new());
        }

        let mut builder: QueryBuilder<Sqlite> = QueryBuilder::new(
            "SELECT post_id, COUNT(*) AS child_count FROM community_comments WHERE post_id IN (",
        );
        for (idx, id) in post_ids.iter().enumerate() {
            if idx > 0 {
                builder.push(", ");
            }
            builder.push_bind(id);
        }
        builder.push(") GROUP BY post_id");

        let rows = builder.build().fetch_all(self.pool.get_pool()).await?;

        let mut counts = HashMap::with_capacity(rows.len());
        for row in rows {
            let post_id: String = row.try_get("post_id")?;
            let count: i64 = row.try_get("child_count")?;
            counts.insert(post_id, u32::try_from(count.max(0)).unwrap_or(u32::MAX));
        }

        Ok(counts)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::ports::repositories::{PostRepository, ProfileRepository};
    use crate::domain::entities::{Post, Profile};
    use crate::infrastructure::database::connection_pool::ConnectionPool;
    use crate::infrastructure::database::Repository;
    use crate::infrastructure::realtime::ChangeHub;
    use std::sync::Arc;

    async fn setup_repository() -> (SqliteRepository, Post) {
        let pool = ConnectionPool::in_memory()
            .await
            .expect("failed to create pool");
        let repository = SqliteRepository::new(pool, Arc::new(ChangeHub::default()));
        repository
            .initialize()
            .await
            .expect("failed to run migrations");
        repository
            .upsert_profile(&Profile::new(
                "user-jose".into(),
                "jose@example.org".into(),
                "José".into(),
            ))
            .await
            .expect("seed profile");

        let post = Post::new(
            "Pedido de oração".to_string(),
            "corpo".to_string(),
            Author::from_user_id("user-jose"),
            "oração".to_string(),
            Vec::new(),
        );
        repository.create_post(&post).await.expect("seed post");

        (repository, post)
    }

    #[tokio::test]
    async fn create_comment_joins_author_metadata() {
        let (repo, post) = setup_repository().await;

        let comment = repo
            .create_comment(&post.id, "user-jose", "Amém")
            .await
            .expect("comment created");

        assert_eq!(comment.post_id, post.id);
        assert_eq!(comment.content, "Amém");
        assert_eq!(comment.author.display_name.as_deref(), Some("José"));
    }

    #[tokio::test]
    async fn create_comment_on_missing_post_is_not_found() {
        let (repo, _post) = setup_repository().await;

        let err = repo
            .create_comment("missing", "user-jose", "olá")
            .await
            .expect_err("must fail");
        assert!(matches!(err, AppError::NotFound(_)));
    }

    #[tokio::test]
    async fn list_comments_is_oldest_first() {
        let (repo, post) = setup_repository().await;

        for text in ["primeiro", "segundo", "terceiro"] {
            repo.create_comment(&post.id, "user-jose", text)
                .await
                .expect("comment created");
            // distinct timestamps keep the ordering assertion meaningful
            tokio::time::sleep(std::time::Duration::from_millis(5)).await;
        }

        let comments = repo
            .list_comments_by_post(&post.id)
            .await
            .expect("list comments");
        assert_eq!(comments.len(), 3);
        assert_eq!(comments[0].content, "primeiro");
        assert_eq!(comments[2].content, "terceiro");
        assert!(comments.windows(2).all(|w| w[0].created_at <= w[1].created_at));
    }

    #[tokio::test]
    async fn count_comments_groups_by_post() {
        let (repo, post) = setup_repository().await;
        let other = Post::new(
            "outro".to_string(),
            "corpo".to_string(),
            Author::from_user_id("user-jose"),
            "general".to_string(),
            Vec::new(),
        );
        repo.create_post(&other).await.expect("seed other post");

        repo.create_comment(&post.id, "user-jose", "um")
            .await
            .expect("comment");
        repo.create_comment(&post.id, "user-jose", "dois")
            .await
            .expect("comment");

        let ids = vec![post.id.clone(), other.id.clone()];
        let counts = repo.count_comments(&ids).await.expect("counts");
        assert_eq!(counts.get(&post.id).copied(), Some(2));
        assert_eq!(counts.get(&other.id), None);
    }
}
