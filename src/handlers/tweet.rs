// src/handlers/tweet.rs

use axum::{
    Extension, Json,
    extract::{Path, State},
    response::IntoResponse,
};
use sqlx::PgPool;
use validator::Validate;

use crate::{
    error::AppError,
    models::tweet::{Tweet, TweetContentRequest},
    response::ApiResponse,
    utils::jwt::Claims,
};

async fn fetch_tweet(pool: &PgPool, id: i64) -> Result<Tweet, AppError> {
    sqlx::query_as::<_, Tweet>("SELECT id, content, owner_id, created_at FROM tweets WHERE id = $1")
        .bind(id)
        .fetch_optional(pool)
        .await?
        .ok_or(AppError::NotFound("Tweet not found".to_string()))
}

pub async fn create_tweet(
    State(pool): State<PgPool>,
    Extension(claims): Extension<Claims>,
    Json(payload): Json<TweetContentRequest>,
) -> Result<impl IntoResponse, AppError> {
    if let Err(validation_errors) = payload.validate() {
        return Err(AppError::BadRequest(validation_errors.to_string()));
    }

    let tweet = sqlx::query_as::<_, Tweet>(
        "INSERT INTO tweets (content, owner_id) VALUES ($1, $2) \
         RETURNING id, content, owner_id, created_at",
    )
    .bind(&payload.content)
    .bind(claims.user_id()?)
    .fetch_one(&pool)
    .await?;

    Ok(ApiResponse::created(tweet, "Tweet created successfully"))
}

pub async fn get_user_tweets(
    State(pool): State<PgPool>,
    Path(user_id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    let user = sqlx::query_as::<_, (i64,)>("SELECT id FROM users WHERE id = $1")
        .bind(user_id)
        .fetch_optional(&pool)
        .await?;

    if user.is_none() {
        return Err(AppError::NotFound("User not found".to_string()));
    }

    let tweets = sqlx::query_as::<_, Tweet>(
        "SELECT id, content, owner_id, created_at FROM tweets \
         WHERE owner_id = $1 ORDER BY created_at DESC",
    )
    .bind(user_id)
    .fetch_all(&pool)
    .await?;

    Ok(ApiResponse::ok(tweets, "Tweets fetched successfully"))
}

pub async fn update_tweet(
    State(pool): State<PgPool>,
    Extension(claims): Extension<Claims>,
    Path(tweet_id): Path<i64>,
    Json(payload): Json<TweetContentRequest>,
) -> Result<impl IntoResponse, AppError> {
    if let Err(validation_errors) = payload.validate() {
        return Err(AppError::BadRequest(validation_errors.to_string()));
    }

    let tweet = fetch_tweet(&pool, tweet_id).await?;
    if tweet.owner_id != claims.user_id()? {
        return Err(AppError::Forbidden("You do not own this tweet".to_string()));
    }

    let updated = sqlx::query_as::<_, Tweet>(
        "UPDATE tweets SET content = $1 WHERE id = $2 \
         RETURNING id, content, owner_id, created_at",
    )
    .bind(&payload.content)
    .bind(tweet_id)
    .fetch_one(&pool)
    .await?;

    Ok(ApiResponse::ok(updated, "Tweet updated successfully"))
}

pub async fn delete_tweet(
    State(pool): State<PgPool>,
    Extension(claims): Extension<Claims>,
    Path(tweet_id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    let tweet = fetch_tweet(&pool, tweet_id).await?;
    if tweet.owner_id != claims.user_id()? {
        return Err(AppError::Forbidden("You do not own this tweet".to_string()));
    }

    sqlx::query("DELETE FROM tweets WHERE id = $1")
        .bind(tweet_id)
        .execute(&pool)
        .await?;

    Ok(ApiResponse::ok(
        serde_json::json!({}),
        "Tweet deleted successfully",
    ))
}
