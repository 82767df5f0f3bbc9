use chrono::Utc;
use serde::Serialize;
use sqlx::{FromRow, PgPool, Postgres, QueryBuilder, Row};
use uuid::Uuid;

use crate::db::push_pagination;
use crate::models::Comment;
use crate::utils::error::AppError;

const COMMENT_COLUMNS: &str = "id, content, created_at, user_id, post_id";

#[derive(Debug, Clone)]
pub struct NewComment {
    pub content: String,
    pub post_id: Uuid,
    pub user_id: Uuid,
}

#[derive(Debug, Clone, Default)]
pub struct CommentUpdate {
    pub content: Option<String>,
}

impl CommentUpdate {
    pub fn is_empty(&self) -> bool {
        self.content.is_none()
    }
}

#[derive(Debug, Clone, Default)]
pub struct CommentListQuery {
    pub post_id: Option<Uuid>,
    pub page: Option<i64>,
    pub limit: Option<i64>,
}

/// A comment joined with its author's username for display.
#[derive(Debug, Serialize)]
pub struct CommentListItem {
    pub comment: Comment,
    pub username: String,
}

/// Persistence handler for the comments table.
pub struct CommentHandler {
    pool: PgPool,
}

impl CommentHandler {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn list(&self, query: &CommentListQuery) -> Result<Vec<CommentListItem>, AppError> {
        let mut builder = QueryBuilder::<Postgres>::new(
            "SELECT comments.id, comments.content, comments.created_at, \
             comments.user_id, comments.post_id, users.username \
             FROM comments INNER JOIN users ON comments.user_id = users.id",
        );

        if let Some(post_id) = query.post_id {
            builder.push(" WHERE comments.post_id = ").push_bind(post_id);
        }

        builder.push(" ORDER BY comments.created_at");
        push_pagination(&mut builder, query.page, query.limit);

        let rows = builder.build().fetch_all(&self.pool).await?;

        let items = rows
            .into_iter()
            .map(|row| {
                Ok(CommentListItem {
                    comment: Comment::from_row(&row)?,
                    username: row.try_get("username")?,
                })
            })
            .collect::<Result<Vec<_>, sqlx::Error>>()?;

        Ok(items)
    }

    pub async fn find_by_id(&self, comment_id: Uuid) -> Result<Option<Comment>, AppError> {
        let comment = sqlx::query_as::<_, Comment>(&format!(
            "SELECT {COMMENT_COLUMNS} FROM comments WHERE id = $1"
        ))
        .bind(comment_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(comment)
    }

    pub async fn create(&self, new_comment: NewComment) -> Result<Option<Comment>, AppError> {
        let comment_id = Uuid::new_v4();

        let comment = sqlx::query_as::<_, Comment>(&format!(
            "INSERT INTO comments (id, content, created_at, user_id, post_id) \
             VALUES ($1, $2, $3, $4, $5) \
             RETURNING {COMMENT_COLUMNS}"
        ))
        .bind(comment_id)
        .bind(&new_comment.content)
        .bind(Utc::now())
        .bind(new_comment.user_id)
        .bind(new_comment.post_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(comment)
    }

    pub async fn update(
        &self,
        comment_id: Uuid,
        patch: CommentUpdate,
    ) -> Result<Option<Comment>, AppError> {
        let Some(content) = patch.content else {
            return Err(AppError::ValidationError("No fields to update".to_string()));
        };

        let comment = sqlx::query_as::<_, Comment>(&format!(
            "UPDATE comments SET content = $1 WHERE id = $2 RETURNING {COMMENT_COLUMNS}"
        ))
        .bind(content)
        .bind(comment_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(comment)
    }

    pub async fn delete(&self, comment_id: Uuid) -> Result<Option<Comment>, AppError> {
        let comment = sqlx::query_as::<_, Comment>(&format!(
            "DELETE FROM comments WHERE id = $1 RETURNING {COMMENT_COLUMNS}"
        ))
        .bind(comment_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(comment)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_update_is_detected() {
        assert!(CommentUpdate::default().is_empty());
        assert!(!CommentUpdate {
            content: Some("edited".to_string()),
        }
        .is_empty());
    }
}
