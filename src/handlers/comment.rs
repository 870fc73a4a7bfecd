// src/handlers/comment.rs

use axum::{
    Extension, Json,
    extract::{Path, Query, State},
    response::IntoResponse,
};
use sqlx::PgPool;
use validator::Validate;

use crate::{
    error::AppError,
    models::comment::{Comment, CommentListParams, CommentResponse, CommentTextRequest},
    response::ApiResponse,
    utils::jwt::Claims,
};

async fn fetch_comment(pool: &PgPool, id: i64) -> Result<Comment, AppError> {
    sqlx::query_as::<_, Comment>(
        "SELECT id, text, video_id, owner_id, created_at FROM comments WHERE id = $1",
    )
    .bind(id)
    .fetch_optional(pool)
    .await?
    .ok_or(AppError::NotFound("Comment not found".to_string()))
}

/// List comments on a video, newest first, with author usernames.
pub async fn list_comments(
    State(pool): State<PgPool>,
    Path(video_id): Path<i64>,
    Query(params): Query<CommentListParams>,
) -> Result<impl IntoResponse, AppError> {
    let page = params.page.unwrap_or(1).max(1);
    let limit = params.limit.unwrap_or(10).clamp(1, 100);

    let comments = sqlx::query_as::<_, CommentResponse>(
        "SELECT c.id, c.text, c.video_id, c.owner_id, u.username, c.created_at \
         FROM comments c \
         JOIN users u ON c.owner_id = u.id \
         WHERE c.video_id = $1 \
         ORDER BY c.created_at DESC \
         LIMIT $2 OFFSET $3",
    )
    .bind(video_id)
    .bind(limit)
    .bind(super::video::page_offset(page, limit))
    .fetch_all(&pool)
    .await?;

    Ok(ApiResponse::ok(comments, "Comments fetched successfully"))
}

/// Add a comment to a video. The authenticated user becomes the author.
pub async fn add_comment(
    State(pool): State<PgPool>,
    Extension(claims): Extension<Claims>,
    Path(video_id): Path<i64>,
    Json(payload): Json<CommentTextRequest>,
) -> Result<impl IntoResponse, AppError> {
    if let Err(validation_errors) = payload.validate() {
        return Err(AppError::BadRequest(validation_errors.to_string()));
    }

    let video = sqlx::query_as::<_, (i64,)>("SELECT id FROM videos WHERE id = $1")
        .bind(video_id)
        .fetch_optional(&pool)
        .await?;

    if video.is_none() {
        return Err(AppError::NotFound("Video not found".to_string()));
    }

    let comment = sqlx::query_as::<_, Comment>(
        "INSERT INTO comments (text, video_id, owner_id) VALUES ($1, $2, $3) \
         RETURNING id, text, video_id, owner_id, created_at",
    )
    .bind(&payload.text)
    .bind(video_id)
    .bind(claims.user_id()?)
    .fetch_one(&pool)
    .await?;

    Ok(ApiResponse::created(comment, "Comment added successfully"))
}

pub async fn update_comment(
    State(pool): State<PgPool>,
    Extension(claims): Extension<Claims>,
    Path(comment_id): Path<i64>,
    Json(payload): Json<CommentTextRequest>,
) -> Result<impl IntoResponse, AppError> {
    if let Err(validation_errors) = payload.validate() {
        return Err(AppError::BadRequest(validation_errors.to_string()));
    }

    let comment = fetch_comment(&pool, comment_id).await?;
    if comment.owner_id != claims.user_id()? {
        return Err(AppError::Forbidden(
            "You do not own this comment".to_string(),
        ));
    }

    let updated = sqlx::query_as::<_, Comment>(
        "UPDATE comments SET text = $1 WHERE id = $2 \
         RETURNING id, text, video_id, owner_id, created_at",
    )
    .bind(&payload.text)
    .bind(comment_id)
    .fetch_one(&pool)
    .await?;

    Ok(ApiResponse::ok(updated, "Comment updated"))
}

pub async fn delete_comment(
    State(pool): State<PgPool>,
    Extension(claims): Extension<Claims>,
    Path(comment_id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    let comment = fetch_comment(&pool, comment_id).await?;
    if comment.owner_id != claims.user_id()? {
        return Err(AppError::Forbidden(
            "You do not own this comment".to_string(),
        ));
    }

    sqlx::query("DELETE FROM comments WHERE id = $1")
        .bind(comment_id)
        .execute(&pool)
        .await?;

    Ok(ApiResponse::ok(
        serde_json::json!({}),
        "Comment deleted successfully",
    ))
}
