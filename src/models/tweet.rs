// src/models/tweet.rs

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

/// Represents the 'tweets' table in the database.
#[derive(Debug, Clone, FromRow, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Tweet {
    pub id: i64,
    pub content: String,
    pub owner_id: i64,
    pub created_at: chrono::DateTime<chrono::Utc>,
}

/// DTO for creating or updating a tweet.
#[derive(Debug, Deserialize, Validate)]
pub struct TweetContentRequest {
    #[validate(length(min = 1, max = 500, message = "Content is required."))]
    pub content: String,
}
