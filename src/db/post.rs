use chrono::Utc;
use serde::Serialize;
use sqlx::{FromRow, PgPool, Postgres, QueryBuilder, Row};
use uuid::Uuid;

use crate::db::push_pagination;
use crate::models::Post;
use crate::utils::error::AppError;

const POST_COLUMNS: &str = "id, title, content, created_at, event_id, user_id";

#[derive(Debug, Clone)]
pub struct NewPost {
    pub title: String,
    pub content: String,
    pub event_id: Uuid,
    pub user_id: Uuid,
}

#[derive(Debug, Clone, Default)]
pub struct PostUpdate {
    pub title: Option<String>,
    pub content: Option<String>,
}

impl PostUpdate {
    pub fn is_empty(&self) -> bool {
        self.title.is_none() && self.content.is_none()
    }
}

#[derive(Debug, Clone, Default)]
pub struct PostListQuery {
    pub event_id: Option<Uuid>,
    pub page: Option<i64>,
    pub limit: Option<i64>,
}

/// A post joined with its author's username for display.
#[derive(Debug, Serialize)]
pub struct PostListItem {
    pub post: Post,
    pub username: String,
}

/// Persistence handler for the posts table.
pub struct PostHandler {
    pool: PgPool,
}

impl PostHandler {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Lists posts newest first, each with its author's username.
    pub async fn list(&self, query: &PostListQuery) -> Result<Vec<PostListItem>, AppError> {
        let mut builder = QueryBuilder::<Postgres>::new(
            "SELECT posts.id, posts.title, posts.content, posts.created_at, \
             posts.event_id, posts.user_id, users.username \
             FROM posts INNER JOIN users ON posts.user_id = users.id",
        );

        if let Some(event_id) = query.event_id {
            builder.push(" WHERE posts.event_id = ").push_bind(event_id);
        }

        builder.push(" ORDER BY posts.created_at DESC");
        push_pagination(&mut builder, query.page, query.limit);

        let rows = builder.build().fetch_all(&self.pool).await?;

        let items = rows
            .into_iter()
            .map(|row| {
                Ok(PostListItem {
                    post: Post::from_row(&row)?,
                    username: row.try_get("username")?,
                })
            })
            .collect::<Result<Vec<_>, sqlx::Error>>()?;

        Ok(items)
    }

    pub async fn find_by_id(&self, post_id: Uuid) -> Result<Option<Post>, AppError> {
        let post = sqlx::query_as::<_, Post>(&format!(
            "SELECT {POST_COLUMNS} FROM posts WHERE id = $1"
        ))
        .bind(post_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(post)
    }

    pub async fn create(&self, new_post: NewPost) -> Result<Option<Post>, AppError> {
        let post_id = Uuid::new_v4();

        let post = sqlx::query_as::<_, Post>(&format!(
            "INSERT INTO posts (id, title, content, created_at, event_id, user_id) \
             VALUES ($1, $2, $3, $4, $5, $6) \
             RETURNING {POST_COLUMNS}"
        ))
        .bind(post_id)
        .bind(&new_post.title)
        .bind(&new_post.content)
        .bind(Utc::now())
        .bind(new_post.event_id)
        .bind(new_post.user_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(post)
    }

    pub async fn update(&self, post_id: Uuid, patch: PostUpdate) -> Result<Option<Post>, AppError> {
        if patch.is_empty() {
            return Err(AppError::ValidationError("No fields to update".to_string()));
        }

        let mut builder = QueryBuilder::<Postgres>::new("UPDATE posts SET ");
        let mut fields = builder.separated(", ");

        if let Some(title) = patch.title {
            fields.push("title = ").push_bind_unseparated(title);
        }
        if let Some(content) = patch.content {
            fields.push("content = ").push_bind_unseparated(content);
        }

        builder
            .push(" WHERE id = ")
            .push_bind(post_id)
            .push(format!(" RETURNING {POST_COLUMNS}"));

        let post = builder
            .build_query_as::<Post>()
            .fetch_optional(&self.pool)
            .await?;

        Ok(post)
    }

    pub async fn delete(&self, post_id: Uuid) -> Result<Option<Post>, AppError> {
        let post = sqlx::query_as::<_, Post>(&format!(
            "DELETE FROM posts WHERE id = $1 RETURNING {POST_COLUMNS}"
        ))
        .bind(post_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(post)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_update_is_detected() {
        assert!(PostUpdate::default().is_empty());
        assert!(!PostUpdate {
            content: Some("edited".to_string()),
            ..Default::default()
        }
        .is_empty());
    }
}
