// src/handlers/like.rs

use axum::{Extension, extract::{Path, State}, response::IntoResponse};
use sqlx::PgPool;

use crate::{
    error::AppError, models::like::LikedVideoResponse, response::ApiResponse, utils::jwt::Claims,
};

async fn target_exists(pool: &PgPool, table: &str, id: i64) -> Result<bool, AppError> {
    let row = sqlx::query_as::<_, (i64,)>(&format!("SELECT id FROM {} WHERE id = $1", table))
        .bind(id)
        .fetch_optional(pool)
        .await?;
    Ok(row.is_some())
}

/// Single atomic toggle: insert-if-absent, otherwise delete.
///
/// The insert relies on the partial unique index over (liked_by, target),
/// so two concurrent toggles cannot produce a duplicate relation. Returns
/// true when the like was created, false when it was removed.
async fn toggle(
    pool: &PgPool,
    target_column: &str,
    target_id: i64,
    user_id: i64,
) -> Result<bool, AppError> {
    let inserted = sqlx::query(&format!(
        "INSERT INTO likes ({col}, liked_by) VALUES ($1, $2) \
         ON CONFLICT (liked_by, {col}) WHERE {col} IS NOT NULL DO NOTHING",
        col = target_column
    ))
    .bind(target_id)
    .bind(user_id)
    .execute(pool)
    .await?;

    if inserted.rows_affected() == 1 {
        return Ok(true);
    }

    sqlx::query(&format!(
        "DELETE FROM likes WHERE liked_by = $1 AND {col} = $2",
        col = target_column
    ))
    .bind(user_id)
    .bind(target_id)
    .execute(pool)
    .await?;

    Ok(false)
}

pub async fn toggle_video_like(
    State(pool): State<PgPool>,
    Extension(claims): Extension<Claims>,
    Path(video_id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    if !target_exists(&pool, "videos", video_id).await? {
        return Err(AppError::NotFound("Video not found".to_string()));
    }

    let liked = toggle(&pool, "video_id", video_id, claims.user_id()?).await?;
    let message = if liked {
        "Video liked successfully"
    } else {
        "Video unliked successfully"
    };

    Ok(ApiResponse::ok(serde_json::json!({ "liked": liked }), message))
}

pub async fn toggle_comment_like(
    State(pool): State<PgPool>,
    Extension(claims): Extension<Claims>,
    Path(comment_id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    if !target_exists(&pool, "comments", comment_id).await? {
        return Err(AppError::NotFound("Comment not found".to_string()));
    }

    let liked = toggle(&pool, "comment_id", comment_id, claims.user_id()?).await?;
    let message = if liked {
        "Comment liked successfully"
    } else {
        "Comment unliked successfully"
    };

    Ok(ApiResponse::ok(serde_json::json!({ "liked": liked }), message))
}

pub async fn toggle_tweet_like(
    State(pool): State<PgPool>,
    Extension(claims): Extension<Claims>,
    Path(tweet_id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    if !target_exists(&pool, "tweets", tweet_id).await? {
        return Err(AppError::NotFound("Tweet not found".to_string()));
    }

    let liked = toggle(&pool, "tweet_id", tweet_id, claims.user_id()?).await?;
    let message = if liked {
        "Tweet liked successfully"
    } else {
        "Tweet unliked successfully"
    };

    Ok(ApiResponse::ok(serde_json::json!({ "liked": liked }), message))
}

/// All videos liked by the authenticated user, newest like first.
pub async fn get_liked_videos(
    State(pool): State<PgPool>,
    Extension(claims): Extension<Claims>,
) -> Result<impl IntoResponse, AppError> {
    let videos = sqlx::query_as::<_, LikedVideoResponse>(
        "SELECT v.id AS video_id, v.title, v.description, v.thumbnail_url, \
                v.views, v.owner_id, u.username AS owner_username, \
                l.created_at AS liked_at \
         FROM likes l \
         JOIN videos v ON l.video_id = v.id \
         JOIN users u ON v.owner_id = u.id \
         WHERE l.liked_by = $1 AND l.video_id IS NOT NULL \
         ORDER BY l.created_at DESC",
    )
    .bind(claims.user_id()?)
    .fetch_all(&pool)
    .await?;

    Ok(ApiResponse::ok(videos, "Liked videos fetched successfully"))
}
