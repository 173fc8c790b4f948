use super::queries::{
    DELETE_LIKE_BY_ID, INSERT_LIKE, SELECT_LIKE_ID_BY_POST_AND_USER, SELECT_POST_EXISTS,
};
use super::SqliteRepository;
use crate::application::ports::repositories::LikeRepository;
use crate::domain::entities::Like;
use crate::infrastructure::realtime::{ChangeEvent, ChangeKind};
use crate::shared::error::AppError;
use async_trait::async_trait;
use sqlx::{QueryBuilder, Row, Sqlite};
use std::collections::{HashMap, HashSet};

#[async_trait]
impl LikeRepository for SqliteRepository {
    async fn toggle_like(&self, post_id: &str, user_id: &str) -> Result<bool, AppError> {
        let mut tx = self.pool.get_pool().begin().await?;

        let existing = sqlx::query_scalar::<_, String>(SELECT_LIKE_ID_BY_POST_AND_USER)
            .bind(post_id)
            .bind(user_id)
            .fetch_optional(&mut *tx)
            .await?;

        if let Some(like_id) = existing {
            sqlx::query(DELETE_LIKE_BY_ID)
                .bind(&like_id)
                .execute(&mut *tx)
                .await?;
            tx.commit().await?;

            self.hub
                .publish(ChangeEvent::like(ChangeKind::Delete, &like_id, post_id));
            return Ok(false);
        }

        let exists = sqlx::query_scalar::<_, i64>(SELECT_POST_EXISTS)
            .bind(post_id)
            .fetch_optional(&mut *tx)
            .await?;
        if exists.is_none() {
            return Err(AppError::NotFound(format!("post {post_id} not found")));
        }

        let like = Like::new(post_id.to_string(), user_id.to_string());
        let result = sqlx::query(INSERT_LIKE)
            .bind(&like.id)
            .bind(&like.post_id)
            .bind(&like.user_id)
            .bind(like.created_at.timestamp_millis())
            .execute(&mut *tx)
            .await?;
        tx.commit().await?;

        // rows_affected 0 means the unique pair already exists (a racing
        // insert won); the end state is liked either way
        if result.rows_affected() > 0 {
            self.hub
                .publish(ChangeEvent::like(ChangeKind::Insert, &like.id, post_id));
        }
        Ok(true)
    }

    async fn count_likes(&self, post_ids: &[String]) -> Result<HashMap<String, u32>, AppError> {
        if post_ids.is_empty() {
            return Ok(HashMap::new());
        }

        let mut builder: QueryBuilder<Sqlite> = QueryBuilder::new(
            "SELECT post_id, COUNT(*) AS child_count FROM community_likes WHERE post_id IN (",
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

    async fn liked_by_user(
        &self,
        user_id: &str,
        post_ids: &[String],
    ) -> Result<HashSet<String>, AppError> {
        if post_ids.is_empty() {
            return Ok(HashSet::new());
        }

        let mut builder: QueryBuilder<Sqlite> =
            QueryBuilder::new("SELECT post_id FROM community_likes WHERE user_id = ");
        builder.push_bind(user_id);
        builder.push(" AND post_id IN (");
        for (idx, id) in post_ids.iter().enumerate() {
            if idx > 0 {
                builder.push(", ");
            }
            builder.push_bind(id);
        }
        builder.push(")");

        let rows = builder.build().fetch_all(self.pool.get_pool()).await?;

        let mut liked = HashSet::with_capacity(rows.len());
        for row in rows {
            liked.insert(row.try_get::<String, _>("post_id")?);
        }

        Ok(liked)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::ports::repositories::PostRepository;
    use crate::domain::entities::{Author, Post};
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

        let post = Post::new(
            "Aviso".to_string(),
            "corpo".to_string(),
            Author::from_user_id("user-ana"),
            "general".to_string(),
            Vec::new(),
        );
        repository.create_post(&post).await.expect("seed post");

        (repository, post)
    }

    #[tokio::test]
    async fn toggle_inserts_then_removes() {
        let (repo, post) = setup_repository().await;

        assert!(repo.toggle_like(&post.id, "user-ana").await.expect("like"));
        let counts = repo
            .count_likes(&[post.id.clone()])
            .await
            .expect("counts");
        assert_eq!(counts.get(&post.id).copied(), Some(1));

        assert!(!repo
            .toggle_like(&post.id, "user-ana")
            .await
            .expect("unlike"));
        let counts = repo
            .count_likes(&[post.id.clone()])
            .await
            .expect("counts");
        assert_eq!(counts.get(&post.id), None);
    }

    #[tokio::test]
    async fn duplicate_insert_is_absorbed_by_unique_pair() {
        let (repo, post) = setup_repository().await;

        repo.toggle_like(&post.id, "user-ana").await.expect("like");

        // a second raw insert for the same pair must not create a second row
        let duplicate = Like::new(post.id.clone(), "user-ana".to_string());
        let result = sqlx::query(INSERT_LIKE)
            .bind(&duplicate.id)
            .bind(&duplicate.post_id)
            .bind(&duplicate.user_id)
            .bind(duplicate.created_at.timestamp_millis())
            .execute(repo.pool.get_pool())
            .await
            .expect("insert runs");
        assert_eq!(result.rows_affected(), 0);

        let counts = repo
            .count_likes(&[post.id.clone()])
            .await
            .expect("counts");
        assert_eq!(counts.get(&post.id).copied(), Some(1));
    }

    #[tokio::test]
    async fn like_missing_post_is_not_found() {
        let (repo, _post) = setup_repository().await;
        let err = repo
            .toggle_like("missing", "user-ana")
            .await
            .expect_err("must fail");
        assert!(matches!(err, AppError::NotFound(_)));
    }

    #[tokio::test]
    async fn liked_by_user_returns_only_that_users_likes() {
        let (repo, post) = setup_repository().await;
        repo.toggle_like(&post.id, "user-ana").await.expect("like");
        repo.toggle_like(&post.id, "user-bia").await.expect("like");

        let ids = vec![post.id.clone(), "unrelated".to_string()];
        let liked = repo.liked_by_user("user-ana", &ids).await.expect("liked");
        assert!(liked.contains(&post.id));
        assert_eq!(liked.len(), 1);

        let liked = repo.liked_by_user("user-caio", &ids).await.expect("liked");
        assert!(liked.is_empty());
    }
}
