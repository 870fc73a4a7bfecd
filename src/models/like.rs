// src/models/like.rs

use serde::Serialize;
use sqlx::FromRow;

/// A liked video joined with its core fields, for the liked-videos listing.
/// The likes table itself is polymorphic (exactly one of video_id /
/// comment_id / tweet_id is set); handlers write it directly.
#[derive(Debug, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct LikedVideoResponse {
    pub video_id: i64,
    pub title: String,
    pub description: String,
    pub thumbnail_url: String,
    pub views: i64,
    pub owner_id: i64,
    pub owner_username: String,
    pub liked_at: chrono::DateTime<chrono::Utc>,
}
