use crate::domain::entities::{Author, Comment, Post};
use crate::shared::error::AppError;
use chrono::{DateTime, Utc};
use sqlx::{sqlite::SqliteRow, Row};

pub(super) fn map_post_row(row: &SqliteRow) -> Result<Post, AppError> {
    let created_at: i64 = row.try_get("created_at")?;
    let updated_at: i64 = row.try_get("updated_at")?;
    let media_json: String = row.try_get("media_urls").unwrap_or_default();

    Ok(Post {
        id: row.try_get("id")?,
        title: row.try_get("title")?,
        content: row.try_get("content")?,
        author: map_author(row)?,
        category: row.try_get("category")?,
        visible: row.try_get::<i64, _>("visible")? != 0,
        media_urls: parse_media_urls(&media_json),
        created_at: DateTime::from_timestamp_millis(created_at).unwrap_or_else(Utc::now),
        updated_at: DateTime::from_timestamp_millis(updated_at).unwrap_or_else(Utc::now),
    })
}

pub(super) fn map_comment_row(row: &SqliteRow) -> Result<Comment, AppError> {
    let created_at: i64 = row.try_get("created_at")?;

    Ok(Comment {
        id: row.try_get("id")?,
        post_id: row.try_get("post_id")?,
        author: map_author(row)?,
        content: row.try_get("content")?,
        created_at: DateTime::from_timestamp_millis(created_at).unwrap_or_else(Utc::now),
    })
}

fn map_author(row: &SqliteRow) -> Result<Author, AppError> {
    Ok(Author {
        user_id: row.try_get("author_id")?,
        display_name: row
            .try_get::<Option<String>, _>("author_display_name")
            .unwrap_or(None),
        email: row.try_get::<Option<String>, _>("author_email").unwrap_or(None),
    })
}

pub(super) fn parse_media_urls(media_json: &str) -> Vec<String> {
    serde_json::from_str(media_json).unwrap_or_default()
}

pub(super) fn serialize_media_urls(urls: &[String]) -> String {
    serde_json::to_string(urls).unwrap_or_else(|_| "[]".to_string())
}
