// src/models/comment.rs

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

/// Represents the 'comments' table in the database.
#[derive(Debug, Clone, FromRow, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Comment {
    pub id: i64,
    pub text: String,
    pub video_id: i64,
    pub owner_id: i64,
    pub created_at: chrono::DateTime<chrono::Utc>,
}

/// DTO for creating or updating a comment.
#[derive(Debug, Deserialize, Validate)]
pub struct CommentTextRequest {
    #[validate(length(
        min = 1,
        max = 1000,
        message = "Comment must be between 1 and 1000 characters"
    ))]
    pub text: String,
}

/// DTO for displaying a comment with author info.
#[derive(Debug, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct CommentResponse {
    pub id: i64,
    pub text: String,
    pub video_id: i64,
    pub owner_id: i64,
    pub username: String,
    pub created_at: chrono::DateTime<chrono::Utc>,
}

#[derive(Debug, Deserialize)]
pub struct CommentListParams {
    pub page: Option<i64>,
    pub limit: Option<i64>,
}
