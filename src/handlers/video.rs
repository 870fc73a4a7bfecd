// src/handlers/video.rs

use axum::{
    Extension, Json,
    extract::{Multipart, Path, Query, State},
    response::IntoResponse,
};
use sqlx::PgPool;
use validator::Validate;

use crate::{
    error::{AppError, is_unique_violation},
    media::{MediaClient, UploadedFile},
    models::video::{
        PublishVideoRequest, UpdateVideoRequest, Video, VideoListParams, VideoListResponse,
    },
    response::ApiResponse,
    utils::jwt::Claims,
};

const VIDEO_COLUMNS: &str = "id, title, description, video_url, video_public_id, \
     thumbnail_url, thumbnail_public_id, views, is_published, owner_id, created_at";

async fn fetch_video(pool: &PgPool, id: i64) -> Result<Video, AppError> {
    sqlx::query_as::<_, Video>(&format!(
        "SELECT {} FROM videos WHERE id = $1",
        VIDEO_COLUMNS
    ))
    .bind(id)
    .fetch_optional(pool)
    .await?
    .ok_or(AppError::NotFound("Video not found".to_string()))
}

fn require_owner(video: &Video, claims: &Claims) -> Result<(), AppError> {
    if video.owner_id != claims.user_id()? {
        return Err(AppError::Forbidden(
            "You do not own this video".to_string(),
        ));
    }
    Ok(())
}

/// Paginated, filterable, sortable video listing for one owner.
///
/// page, limit and userId are required. `query` filters by case-insensitive
/// title substring; sortBy/sortType pick a whitelisted column and direction.
pub async fn list_videos(
    State(pool): State<PgPool>,
    Query(params): Query<VideoListParams>,
) -> Result<impl IntoResponse, AppError> {
    let (page, limit) = match (params.page, params.limit) {
        (Some(p), Some(l)) if p >= 1 && l >= 1 => (p, l),
        _ => {
            return Err(AppError::BadRequest(
                "Please provide page and limit query parameters".to_string(),
            ));
        }
    };
    let owner_id = params
        .user_id
        .ok_or(AppError::BadRequest("User ID is required".to_string()))?;

    // The sort column is interpolated into SQL, so it must come from this
    // whitelist, never from raw caller input.
    let sort_column = match params.sort_by.as_deref() {
        None | Some("createdAt") => "created_at",
        Some("views") => "views",
        Some("title") => "title",
        Some(other) => {
            return Err(AppError::BadRequest(format!(
                "Cannot sort by '{}'",
                other
            )));
        }
    };
    let sort_direction = match params.sort_type.as_deref() {
        None | Some("desc") => "DESC",
        Some("asc") => "ASC",
        Some(other) => {
            return Err(AppError::BadRequest(format!(
                "Invalid sort direction '{}'",
                other
            )));
        }
    };

    let pattern = format!("%{}%", params.query.unwrap_or_default());

    let videos = sqlx::query_as::<_, Video>(&format!(
        "SELECT {} FROM videos \
         WHERE owner_id = $1 AND title ILIKE $2 \
         ORDER BY {} {} \
         LIMIT $3 OFFSET $4",
        VIDEO_COLUMNS, sort_column, sort_direction
    ))
    .bind(owner_id)
    .bind(&pattern)
    .bind(limit)
    .bind(page_offset(page, limit))
    .fetch_all(&pool)
    .await?;

    let (total_videos,): (i64,) =
        sqlx::query_as("SELECT COUNT(*) FROM videos WHERE owner_id = $1 AND title ILIKE $2")
            .bind(owner_id)
            .bind(&pattern)
            .fetch_one(&pool)
            .await?;

    Ok(ApiResponse::ok(
        VideoListResponse {
            videos,
            current_page: page,
            total_pages: total_pages(total_videos, limit),
            total_videos,
        },
        "Videos fetched successfully",
    ))
}

/// totalPages = ceil(totalCount / limit).
fn total_pages(total: i64, limit: i64) -> i64 {
    (total + limit - 1) / limit
}

/// OFFSET for a 1-based page. Saturating, so an absurdly large page number
/// yields an empty page instead of overflowing the multiplication.
pub(crate) fn page_offset(page: i64, limit: i64) -> i64 {
    page.saturating_sub(1).saturating_mul(limit)
}

/// Publishes a new video.
///
/// Multipart form: title, description, a `video` file and a `thumbnail`
/// file. A duplicate title is rejected before anything is uploaded; a
/// failure after an upload triggers best-effort compensating deletes so
/// no orphan asset survives the error.
pub async fn publish_video(
    State(pool): State<PgPool>,
    State(media): State<MediaClient>,
    Extension(claims): Extension<Claims>,
    mut multipart: Multipart,
) -> Result<impl IntoResponse, AppError> {
    let mut form = PublishVideoRequest::default();
    let mut video_file: Option<UploadedFile> = None;
    let mut thumbnail_file: Option<UploadedFile> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::BadRequest(e.to_string()))?
    {
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            "title" => {
                form.title = field
                    .text()
                    .await
                    .map_err(|e| AppError::BadRequest(e.to_string()))?;
            }
            "description" => {
                form.description = field
                    .text()
                    .await
                    .map_err(|e| AppError::BadRequest(e.to_string()))?;
            }
            "video" => video_file = Some(UploadedFile::read(field).await?),
            "thumbnail" => thumbnail_file = Some(UploadedFile::read(field).await?),
            _ => {}
        }
    }

    if let Err(validation_errors) = form.validate() {
        return Err(AppError::BadRequest(validation_errors.to_string()));
    }

    let video_file =
        video_file.ok_or(AppError::BadRequest("Video file is missing".to_string()))?;
    let thumbnail_file = thumbnail_file.ok_or(AppError::BadRequest(
        "Thumbnail file is missing".to_string(),
    ))?;

    let existing = sqlx::query_as::<_, (i64,)>("SELECT id FROM videos WHERE title = $1")
        .bind(&form.title)
        .fetch_optional(&pool)
        .await?;

    if existing.is_some() {
        return Err(AppError::Conflict("Video already exists".to_string()));
    }

    let video_asset = media.upload(&video_file.file_name, video_file.bytes).await?;

    let thumbnail_asset = match media
        .upload(&thumbnail_file.file_name, thumbnail_file.bytes)
        .await
    {
        Ok(asset) => asset,
        Err(e) => {
            media.release(&video_asset.public_id).await;
            return Err(e);
        }
    };

    let inserted = sqlx::query_as::<_, Video>(&format!(
        "INSERT INTO videos \
            (title, description, video_url, video_public_id, thumbnail_url, \
             thumbnail_public_id, owner_id) \
         VALUES ($1, $2, $3, $4, $5, $6, $7) \
         RETURNING {}",
        VIDEO_COLUMNS
    ))
    .bind(&form.title)
    .bind(&form.description)
    .bind(&video_asset.url)
    .bind(&video_asset.public_id)
    .bind(&thumbnail_asset.url)
    .bind(&thumbnail_asset.public_id)
    .bind(claims.user_id()?)
    .fetch_one(&pool)
    .await;

    let video = match inserted {
        Ok(video) => video,
        Err(e) => {
            media.release(&video_asset.public_id).await;
            media.release(&thumbnail_asset.public_id).await;
            if is_unique_violation(&e) {
                return Err(AppError::Conflict("Video already exists".to_string()));
            }
            tracing::error!("Failed to create video: {:?}", e);
            return Err(AppError::from(e));
        }
    };

    Ok(ApiResponse::created(video, "Video uploaded successfully"))
}

/// Fetches a single video and counts the view with an atomic increment.
pub async fn get_video(
    State(pool): State<PgPool>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    let video = sqlx::query_as::<_, Video>(&format!(
        "UPDATE videos SET views = views + 1 WHERE id = $1 RETURNING {}",
        VIDEO_COLUMNS
    ))
    .bind(id)
    .fetch_optional(&pool)
    .await?
    .ok_or(AppError::NotFound("Video not found".to_string()))?;

    Ok(ApiResponse::ok(video, "Video fetched successfully"))
}

pub async fn update_video(
    State(pool): State<PgPool>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<i64>,
    Json(payload): Json<UpdateVideoRequest>,
) -> Result<impl IntoResponse, AppError> {
    if let Err(validation_errors) = payload.validate() {
        return Err(AppError::BadRequest(validation_errors.to_string()));
    }

    let video = fetch_video(&pool, id).await?;
    require_owner(&video, &claims)?;

    let updated = sqlx::query_as::<_, Video>(&format!(
        "UPDATE videos SET title = COALESCE($1, title), \
             description = COALESCE($2, description) \
         WHERE id = $3 RETURNING {}",
        VIDEO_COLUMNS
    ))
    .bind(payload.title.as_deref())
    .bind(payload.description.as_deref())
    .bind(id)
    .fetch_one(&pool)
    .await
    .map_err(|e| {
        if is_unique_violation(&e) {
            AppError::Conflict("A video with that title already exists".to_string())
        } else {
            AppError::from(e)
        }
    })?;

    Ok(ApiResponse::ok(updated, "Video updated"))
}

pub async fn toggle_publish_status(
    State(pool): State<PgPool>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    let video = fetch_video(&pool, id).await?;
    require_owner(&video, &claims)?;

    let updated = sqlx::query_as::<_, Video>(&format!(
        "UPDATE videos SET is_published = NOT is_published WHERE id = $1 RETURNING {}",
        VIDEO_COLUMNS
    ))
    .bind(id)
    .fetch_one(&pool)
    .await?;

    let message = if updated.is_published {
        "Video published successfully"
    } else {
        "Video unpublished successfully"
    };

    Ok(ApiResponse::ok(updated, message))
}

/// Deletes a video. Only the owner may do this; both media assets are
/// released (best-effort, logged) before the row goes away.
pub async fn delete_video(
    State(pool): State<PgPool>,
    State(media): State<MediaClient>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    let video = fetch_video(&pool, id).await?;
    require_owner(&video, &claims)?;

    media.release(&video.video_public_id).await;
    media.release(&video.thumbnail_public_id).await;

    sqlx::query("DELETE FROM videos WHERE id = $1")
        .bind(id)
        .execute(&pool)
        .await?;

    tracing::info!("Video {} deleted by user {}", id, claims.sub);

    Ok(ApiResponse::ok(
        serde_json::json!({}),
        "Video deleted successfully",
    ))
}
