// src/models/video.rs

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

/// Represents the 'videos' table in the database.
#[derive(Debug, Clone, FromRow, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Video {
    pub id: i64,
    pub title: String,
    pub description: String,
    pub video_url: String,
    #[serde(skip)]
    pub video_public_id: String,
    pub thumbnail_url: String,
    #[serde(skip)]
    pub thumbnail_public_id: String,
    pub views: i64,
    pub is_published: bool,
    pub owner_id: i64,
    pub created_at: chrono::DateTime<chrono::Utc>,
}

/// Fields of the publish form (files arrive separately in the multipart body).
#[derive(Debug, Default, Validate)]
pub struct PublishVideoRequest {
    #[validate(length(min = 1, max = 200, message = "Title is required."))]
    pub title: String,
    #[validate(length(min = 1, message = "Description is required."))]
    pub description: String,
}

#[derive(Debug, Deserialize, Validate)]
pub struct UpdateVideoRequest {
    #[validate(length(min = 1, max = 200))]
    pub title: Option<String>,
    #[validate(length(min = 1))]
    pub description: Option<String>,
}

/// Query parameters for the paginated video listing.
/// page, limit and userId are required; the rest are optional.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VideoListParams {
    pub page: Option<i64>,
    pub limit: Option<i64>,
    /// Case-insensitive title substring filter.
    pub query: Option<String>,
    pub sort_by: Option<String>,
    pub sort_type: Option<String>,
    pub user_id: Option<i64>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VideoListResponse {
    pub videos: Vec<Video>,
    pub current_page: i64,
    pub total_pages: i64,
    pub total_videos: i64,
}
