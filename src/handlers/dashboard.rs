// src/handlers/dashboard.rs

use axum::{extract::{Path, State}, response::IntoResponse};
use serde::Serialize;
use sqlx::PgPool;

use crate::{error::AppError, models::video::Video, response::ApiResponse};

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChannelStats {
    pub total_subscribers: i64,
    pub total_videos: i64,
    pub total_views: i64,
    pub total_likes: i64,
}

async fn channel_exists(pool: &PgPool, id: i64) -> Result<bool, AppError> {
    let row = sqlx::query_as::<_, (i64,)>("SELECT id FROM users WHERE id = $1")
        .bind(id)
        .fetch_optional(pool)
        .await?;
    Ok(row.is_some())
}

/// Aggregated statistics for a channel, computed store-side.
///
/// Each number comes from its own COUNT/SUM query; there is no cross-table
/// transaction, so the snapshot is only as consistent as the store's
/// default isolation.
pub async fn get_channel_stats(
    State(pool): State<PgPool>,
    Path(channel_id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    if !channel_exists(&pool, channel_id).await? {
        return Err(AppError::NotFound("Channel not found".to_string()));
    }

    let (total_subscribers,): (i64,) =
        sqlx::query_as("SELECT COUNT(*) FROM subscriptions WHERE channel_id = $1")
            .bind(channel_id)
            .fetch_one(&pool)
            .await?;

    let (total_videos, total_views): (i64, i64) = sqlx::query_as(
        "SELECT COUNT(*), COALESCE(SUM(views), 0)::BIGINT FROM videos WHERE owner_id = $1",
    )
    .bind(channel_id)
    .fetch_one(&pool)
    .await?;

    let (total_likes,): (i64,) = sqlx::query_as(
        "SELECT COUNT(*) FROM likes l \
         JOIN videos v ON l.video_id = v.id \
         WHERE v.owner_id = $1",
    )
    .bind(channel_id)
    .fetch_one(&pool)
    .await?;

    Ok(ApiResponse::ok(
        ChannelStats {
            total_subscribers,
            total_videos,
            total_views,
            total_likes,
        },
        "Channel stats fetched successfully",
    ))
}

/// All videos belonging to a channel.
pub async fn get_channel_videos(
    State(pool): State<PgPool>,
    Path(channel_id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    if !channel_exists(&pool, channel_id).await? {
        return Err(AppError::NotFound("Channel not found".to_string()));
    }

    let videos = sqlx::query_as::<_, Video>(
        "SELECT id, title, description, video_url, video_public_id, \
                thumbnail_url, thumbnail_public_id, views, is_published, \
                owner_id, created_at \
         FROM videos WHERE owner_id = $1 ORDER BY created_at DESC",
    )
    .bind(channel_id)
    .fetch_all(&pool)
    .await?;

    Ok(ApiResponse::ok(videos, "Videos fetched successfully"))
}
