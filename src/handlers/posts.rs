use axum::extract::{Path, Query, State};
use axum::response::Response;
use axum::{Extension, Json};
use serde::Deserialize;
use uuid::Uuid;

use crate::db::post::{NewPost, PostListQuery, PostUpdate};
use crate::handlers::validate_pagination;
use crate::models::SafeUser;
use crate::policy::{authorize, Action};
use crate::state::AppState;
use crate::utils::error::AppError;
use crate::utils::response::success;

#[derive(Debug, Deserialize)]
pub struct PostListParams {
    #[serde(rename = "event-id")]
    pub event_id: Option<Uuid>,
    pub page: Option<i64>,
    pub limit: Option<i64>,
}

#[derive(Debug, Deserialize)]
pub struct CreatePostRequest {
    pub title: String,
    pub content: String,
    pub event_id: Uuid,
}

impl CreatePostRequest {
    fn validate(&self) -> Result<(), AppError> {
        if self.title.trim().is_empty() {
            return Err(AppError::ValidationError(
                "title must not be empty".to_string(),
            ));
        }
        if self.content.trim().is_empty() {
            return Err(AppError::ValidationError(
                "content must not be empty".to_string(),
            ));
        }

        Ok(())
    }
}

#[derive(Debug, Deserialize)]
pub struct UpdatePostRequest {
    pub title: Option<String>,
    pub content: Option<String>,
}

pub async fn list_posts(
    State(state): State<AppState>,
    Query(params): Query<PostListParams>,
) -> Result<Response, AppError> {
    validate_pagination(params.page, params.limit)?;

    let posts = state
        .post_handler()
        .list(&PostListQuery {
            event_id: params.event_id,
            page: params.page,
            limit: params.limit,
        })
        .await?;

    Ok(success(posts, "Posts retrieved"))
}

pub async fn get_post(
    State(state): State<AppState>,
    Path(post_id): Path<Uuid>,
) -> Result<Response, AppError> {
    let post = state
        .post_handler()
        .find_by_id(post_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Could not find post".to_string()))?;

    Ok(success(post, "Post retrieved"))
}

pub async fn create_post(
    State(state): State<AppState>,
    Extension(user): Extension<SafeUser>,
    Json(body): Json<CreatePostRequest>,
) -> Result<Response, AppError> {
    authorize(user.role, Action::CreatePost)?;
    body.validate()?;

    let post = state
        .post_handler()
        .create(NewPost {
            title: body.title,
            content: body.content,
            event_id: body.event_id,
            user_id: user.id,
        })
        .await?
        .ok_or_else(|| AppError::InternalServerError("Post not created".to_string()))?;

    Ok(success(post, "Post created"))
}

pub async fn update_post(
    State(state): State<AppState>,
    Extension(user): Extension<SafeUser>,
    Path(post_id): Path<Uuid>,
    Json(body): Json<UpdatePostRequest>,
) -> Result<Response, AppError> {
    authorize(user.role, Action::ManagePost)?;

    let post = state
        .post_handler()
        .update(
            post_id,
            PostUpdate {
                title: body.title,
                content: body.content,
            },
        )
        .await?
        .ok_or_else(|| AppError::InternalServerError("Could not update post".to_string()))?;

    Ok(success(post, "Post updated"))
}

pub async fn delete_post(
    State(state): State<AppState>,
    Extension(user): Extension<SafeUser>,
    Path(post_id): Path<Uuid>,
) -> Result<Response, AppError> {
    authorize(user.role, Action::ManagePost)?;

    let post = state
        .post_handler()
        .delete(post_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Could not find post".to_string()))?;

    Ok(success(post, "Post deleted"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_title_is_rejected() {
        let body = CreatePostRequest {
            title: "  ".to_string(),
            content: "hello".to_string(),
            event_id: Uuid::new_v4(),
        };
        assert!(body.validate().is_err());
    }

    #[test]
    fn blank_content_is_rejected() {
        let body = CreatePostRequest {
            title: "Patch notes".to_string(),
            content: String::new(),
            event_id: Uuid::new_v4(),
        };
        assert!(body.validate().is_err());
    }
}
