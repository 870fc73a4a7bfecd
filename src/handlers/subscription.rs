// src/handlers/subscription.rs

use axum::{Extension, extract::{Path, State}, response::IntoResponse};
use sqlx::PgPool;

use crate::{
    error::AppError, models::subscription::ChannelUserResponse, response::ApiResponse,
    utils::jwt::Claims,
};

async fn user_exists(pool: &PgPool, id: i64) -> Result<bool, AppError> {
    let row = sqlx::query_as::<_, (i64,)>("SELECT id FROM users WHERE id = $1")
        .bind(id)
        .fetch_optional(pool)
        .await?;
    Ok(row.is_some())
}

/// Toggle the caller's subscription to a channel.
///
/// Same atomic insert-if-absent / delete-if-present shape as likes, backed
/// by the UNIQUE (channel_id, subscriber_id) constraint.
pub async fn toggle_subscription(
    State(pool): State<PgPool>,
    Extension(claims): Extension<Claims>,
    Path(channel_id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    let subscriber_id = claims.user_id()?;
    if channel_id == subscriber_id {
        return Err(AppError::BadRequest(
            "You cannot subscribe to yourself".to_string(),
        ));
    }
    if !user_exists(&pool, channel_id).await? {
        return Err(AppError::NotFound("Channel not found".to_string()));
    }

    let inserted = sqlx::query(
        "INSERT INTO subscriptions (channel_id, subscriber_id) VALUES ($1, $2) \
         ON CONFLICT (channel_id, subscriber_id) DO NOTHING",
    )
    .bind(channel_id)
    .bind(subscriber_id)
    .execute(&pool)
    .await?;

    if inserted.rows_affected() == 1 {
        return Ok(ApiResponse::ok(
            serde_json::json!({ "subscribed": true }),
            "Subscription added successfully",
        ));
    }

    sqlx::query("DELETE FROM subscriptions WHERE channel_id = $1 AND subscriber_id = $2")
        .bind(channel_id)
        .bind(subscriber_id)
        .execute(&pool)
        .await?;

    Ok(ApiResponse::ok(
        serde_json::json!({ "subscribed": false }),
        "Subscription removed successfully",
    ))
}

/// Subscribers of a channel (who follows this user).
pub async fn get_channel_subscribers(
    State(pool): State<PgPool>,
    Path(channel_id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    if !user_exists(&pool, channel_id).await? {
        return Err(AppError::NotFound("Channel not found".to_string()));
    }

    let subscribers = sqlx::query_as::<_, ChannelUserResponse>(
        "SELECT u.id AS user_id, u.username, u.fullname, u.avatar_url, \
                s.created_at AS subscribed_at \
         FROM subscriptions s \
         JOIN users u ON s.subscriber_id = u.id \
         WHERE s.channel_id = $1 \
         ORDER BY s.created_at DESC",
    )
    .bind(channel_id)
    .fetch_all(&pool)
    .await?;

    Ok(ApiResponse::ok(
        subscribers,
        "Subscribers fetched successfully",
    ))
}

/// Channels a user is subscribed to (who this user follows).
pub async fn get_subscribed_channels(
    State(pool): State<PgPool>,
    Path(subscriber_id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    if !user_exists(&pool, subscriber_id).await? {
        return Err(AppError::NotFound("Subscriber not found".to_string()));
    }

    let channels = sqlx::query_as::<_, ChannelUserResponse>(
        "SELECT u.id AS user_id, u.username, u.fullname, u.avatar_url, \
                s.created_at AS subscribed_at \
         FROM subscriptions s \
         JOIN users u ON s.channel_id = u.id \
         WHERE s.subscriber_id = $1 \
         ORDER BY s.created_at DESC",
    )
    .bind(subscriber_id)
    .fetch_all(&pool)
    .await?;

    Ok(ApiResponse::ok(channels, "Channels fetched successfully"))
}
