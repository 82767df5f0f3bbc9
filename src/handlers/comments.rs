use axum::extract::{Path, Query, State};
use axum::response::Response;
use axum::{Extension, Json};
use serde::Deserialize;
use uuid::Uuid;

use crate::db::comment::{CommentListQuery, CommentUpdate, NewComment};
use crate::handlers::validate_pagination;
use crate::models::SafeUser;
use crate::policy::{authorize, Action};
use crate::state::AppState;
use crate::utils::error::AppError;
use crate::utils::response::success;

#[derive(Debug, Deserialize)]
pub struct CommentListParams {
    #[serde(rename = "post-id")]
    pub post_id: Option<Uuid>,
    pub page: Option<i64>,
    pub limit: Option<i64>,
}

#[derive(Debug, Deserialize)]
pub struct CreateCommentRequest {
    pub content: String,
    pub post_id: Uuid,
}

#[derive(Debug, Deserialize)]
pub struct UpdateCommentRequest {
    pub content: Option<String>,
}

pub async fn list_comments(
    State(state): State<AppState>,
    Query(params): Query<CommentListParams>,
) -> Result<Response, AppError> {
    validate_pagination(params.page, params.limit)?;

    let comments = state
        .comment_handler()
        .list(&CommentListQuery {
            post_id: params.post_id,
            page: params.page,
            limit: params.limit,
        })
        .await?;

    Ok(success(comments, "Comments retrieved"))
}

pub async fn get_comment(
    State(state): State<AppState>,
    Path(comment_id): Path<Uuid>,
) -> Result<Response, AppError> {
    let comment = state
        .comment_handler()
        .find_by_id(comment_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Could not find comment".to_string()))?;

    Ok(success(comment, "Comment retrieved"))
}

pub async fn create_comment(
    State(state): State<AppState>,
    Extension(user): Extension<SafeUser>,
    Json(body): Json<CreateCommentRequest>,
) -> Result<Response, AppError> {
    authorize(user.role, Action::CreateComment)?;

    if body.content.trim().is_empty() {
        return Err(AppError::ValidationError(
            "content must not be empty".to_string(),
        ));
    }

    let comment = state
        .comment_handler()
        .create(NewComment {
            content: body.content,
            post_id: body.post_id,
            user_id: user.id,
        })
        .await?
        .ok_or_else(|| AppError::InternalServerError("Comment not created".to_string()))?;

    Ok(success(comment, "Comment created"))
}

pub async fn update_comment(
    State(state): State<AppState>,
    Extension(user): Extension<SafeUser>,
    Path(comment_id): Path<Uuid>,
    Json(body): Json<UpdateCommentRequest>,
) -> Result<Response, AppError> {
    authorize(user.role, Action::ManageComment)?;

    let comment = state
        .comment_handler()
        .update(
            comment_id,
            CommentUpdate {
                content: body.content,
            },
        )
        .await?
        .ok_or_else(|| AppError::InternalServerError("Could not update comment".to_string()))?;

    Ok(success(comment, "Comment updated"))
}

pub async fn delete_comment(
    State(state): State<AppState>,
    Extension(user): Extension<SafeUser>,
    Path(comment_id): Path<Uuid>,
) -> Result<Response, AppError> {
    authorize(user.role, Action::ManageComment)?;

    let comment = state
        .comment_handler()
        .delete(comment_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Could not find comment".to_string()))?;

    Ok(success(comment, "Comment deleted"))
}
