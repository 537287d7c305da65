//! Threaded comments on faculty profiles.

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use ts_rs::TS;

/// A comment joined with its author's display fields.
#[derive(Debug, Clone, Serialize, sqlx::FromRow, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct Comment {
    pub id: i32,
    pub faculty_id: i32,
    pub user_id: i32,
    pub user_name: String,
    pub user_picture: Option<String>,
    pub content: String,
    pub parent_comment_id: Option<i32>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct NewComment {
    pub content: String,
    #[serde(default)]
    pub parent_comment_id: Option<i32>,
}

const COMMENT_SELECT: &str = r#"
    SELECT c.id, c.faculty_id, c.user_id, u.name AS user_name, u.picture AS user_picture,
           c.content, c.parent_comment_id, c.created_at
    FROM comments c
    JOIN users u ON u.id = c.user_id
"#;

pub async fn list_for_faculty(pool: &PgPool, faculty_id: i32) -> Result<Vec<Comment>> {
    sqlx::query_as(&format!(
        "{COMMENT_SELECT} WHERE c.faculty_id = $1 ORDER BY c.created_at"
    ))
    .bind(faculty_id)
    .fetch_all(pool)
    .await
    .context("failed to list comments")
}

pub async fn create_comment(
    pool: &PgPool,
    faculty_id: i32,
    user_id: i32,
    new: &NewComment,
) -> Result<Comment> {
    sqlx::query_as(
        r#"
        WITH inserted AS (
            INSERT INTO comments (faculty_id, user_id, content, parent_comment_id)
            VALUES ($1, $2, $3, $4)
            RETURNING id, faculty_id, user_id, content, parent_comment_id, created_at
        )
        SELECT i.id, i.faculty_id, i.user_id, u.name AS user_name, u.picture AS user_picture,
               i.content, i.parent_comment_id, i.created_at
        FROM inserted i
        JOIN users u ON u.id = i.user_id
        "#,
    )
    .bind(faculty_id)
    .bind(user_id)
    .bind(&new.content)
    .bind(new.parent_comment_id)
    .fetch_one(pool)
    .await
    .context("failed to create comment")
}

/// Author id of a comment, for the ownership check before deletion.
pub async fn get_author(pool: &PgPool, comment_id: i32) -> Result<Option<i32>> {
    let row: Option<(i32,)> = sqlx::query_as("SELECT user_id FROM comments WHERE id = $1")
        .bind(comment_id)
        .fetch_optional(pool)
        .await
        .context("failed to fetch comment author")?;
    Ok(row.map(|(user_id,)| user_id))
}

pub async fn delete_comment(pool: &PgPool, comment_id: i32) -> Result<bool> {
    let result = sqlx::query("DELETE FROM comments WHERE id = $1")
        .bind(comment_id)
        .execute(pool)
        .await
        .context("failed to delete comment")?;
    Ok(result.rows_affected() > 0)
}
