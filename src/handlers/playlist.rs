// src/handlers/playlist.rs

use axum::{
    Extension, Json,
    extract::{Path, State},
    response::IntoResponse,
};
use sqlx::PgPool;
use validator::Validate;

use crate::{
    error::AppError,
    models::playlist::{
        CreatePlaylistRequest, Playlist, PlaylistResponse, UpdatePlaylistRequest,
    },
    response::ApiResponse,
    utils::jwt::Claims,
};

async fn fetch_playlist(pool: &PgPool, id: i64) -> Result<Playlist, AppError> {
    sqlx::query_as::<_, Playlist>(
        "SELECT id, name, description, owner_id, created_at FROM playlists WHERE id = $1",
    )
    .bind(id)
    .fetch_optional(pool)
    .await?
    .ok_or(AppError::NotFound("Playlist not found".to_string()))
}

fn require_owner(playlist: &Playlist, claims: &Claims) -> Result<(), AppError> {
    if playlist.owner_id != claims.user_id()? {
        return Err(AppError::Forbidden(
            "You do not own this playlist".to_string(),
        ));
    }
    Ok(())
}

/// The playlist's video ids in sequence order.
async fn load_video_ids(pool: &PgPool, playlist_id: i64) -> Result<Vec<i64>, AppError> {
    let rows = sqlx::query_as::<_, (i64,)>(
        "SELECT video_id FROM playlist_videos WHERE playlist_id = $1 ORDER BY position",
    )
    .bind(playlist_id)
    .fetch_all(pool)
    .await?;

    Ok(rows.into_iter().map(|(id,)| id).collect())
}

async fn playlist_response(pool: &PgPool, playlist: Playlist) -> Result<PlaylistResponse, AppError> {
    let videos = load_video_ids(pool, playlist.id).await?;
    Ok(PlaylistResponse { playlist, videos })
}

pub async fn create_playlist(
    State(pool): State<PgPool>,
    Extension(claims): Extension<Claims>,
    Json(payload): Json<CreatePlaylistRequest>,
) -> Result<impl IntoResponse, AppError> {
    if let Err(validation_errors) = payload.validate() {
        return Err(AppError::BadRequest(validation_errors.to_string()));
    }

    let playlist = sqlx::query_as::<_, Playlist>(
        "INSERT INTO playlists (name, description, owner_id) VALUES ($1, $2, $3) \
         RETURNING id, name, description, owner_id, created_at",
    )
    .bind(&payload.name)
    .bind(payload.description.as_deref().unwrap_or_default())
    .bind(claims.user_id()?)
    .fetch_one(&pool)
    .await?;

    Ok(ApiResponse::created(
        PlaylistResponse {
            playlist,
            videos: Vec::new(),
        },
        "Playlist created successfully",
    ))
}

pub async fn get_playlist(
    State(pool): State<PgPool>,
    Path(playlist_id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    let playlist = fetch_playlist(&pool, playlist_id).await?;
    let response = playlist_response(&pool, playlist).await?;

    Ok(ApiResponse::ok(response, "Playlist fetched successfully"))
}

pub async fn get_user_playlists(
    State(pool): State<PgPool>,
    Path(user_id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    let playlists = sqlx::query_as::<_, Playlist>(
        "SELECT id, name, description, owner_id, created_at FROM playlists \
         WHERE owner_id = $1 ORDER BY created_at DESC",
    )
    .bind(user_id)
    .fetch_all(&pool)
    .await?;

    Ok(ApiResponse::ok(
        playlists,
        "User playlists fetched successfully",
    ))
}

pub async fn update_playlist(
    State(pool): State<PgPool>,
    Extension(claims): Extension<Claims>,
    Path(playlist_id): Path<i64>,
    Json(payload): Json<UpdatePlaylistRequest>,
) -> Result<impl IntoResponse, AppError> {
    if let Err(validation_errors) = payload.validate() {
        return Err(AppError::BadRequest(validation_errors.to_string()));
    }

    let playlist = fetch_playlist(&pool, playlist_id).await?;
    require_owner(&playlist, &claims)?;

    let updated = sqlx::query_as::<_, Playlist>(
        "UPDATE playlists SET name = COALESCE($1, name), \
             description = COALESCE($2, description) \
         WHERE id = $3 \
         RETURNING id, name, description, owner_id, created_at",
    )
    .bind(payload.name.as_deref())
    .bind(payload.description.as_deref())
    .bind(playlist_id)
    .fetch_one(&pool)
    .await?;

    let response = playlist_response(&pool, updated).await?;
    Ok(ApiResponse::ok(response, "Playlist updated successfully"))
}

pub async fn delete_playlist(
    State(pool): State<PgPool>,
    Extension(claims): Extension<Claims>,
    Path(playlist_id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    let playlist = fetch_playlist(&pool, playlist_id).await?;
    require_owner(&playlist, &claims)?;

    // Membership rows go with it (ON DELETE CASCADE on playlist_videos).
    sqlx::query("DELETE FROM playlists WHERE id = $1")
        .bind(playlist_id)
        .execute(&pool)
        .await?;

    Ok(ApiResponse::ok(
        serde_json::json!({}),
        "Playlist deleted successfully",
    ))
}

/// Appends a video to the playlist sequence.
///
/// The insert computes the next position and is a no-op on conflict, so a
/// video already present is rejected without any mutation.
pub async fn add_video_to_playlist(
    State(pool): State<PgPool>,
    Extension(claims): Extension<Claims>,
    Path((video_id, playlist_id)): Path<(i64, i64)>,
) -> Result<impl IntoResponse, AppError> {
    let playlist = fetch_playlist(&pool, playlist_id).await?;
    require_owner(&playlist, &claims)?;

    let video = sqlx::query_as::<_, (i64,)>("SELECT id FROM videos WHERE id = $1")
        .bind(video_id)
        .fetch_optional(&pool)
        .await?;
    if video.is_none() {
        return Err(AppError::NotFound("Video not found".to_string()));
    }

    let inserted = sqlx::query(
        "INSERT INTO playlist_videos (playlist_id, video_id, position) \
         SELECT $1, $2, COALESCE(MAX(position) + 1, 0) \
         FROM playlist_videos WHERE playlist_id = $1 \
         ON CONFLICT (playlist_id, video_id) DO NOTHING",
    )
    .bind(playlist_id)
    .bind(video_id)
    .execute(&pool)
    .await?;

    if inserted.rows_affected() == 0 {
        return Err(AppError::Conflict(
            "Video already exists in playlist".to_string(),
        ));
    }

    let response = playlist_response(&pool, playlist).await?;
    Ok(ApiResponse::ok(
        response,
        "Video added to playlist successfully",
    ))
}

/// Removes a video from the playlist sequence; absent means 404, untouched.
pub async fn remove_video_from_playlist(
    State(pool): State<PgPool>,
    Extension(claims): Extension<Claims>,
    Path((video_id, playlist_id)): Path<(i64, i64)>,
) -> Result<impl IntoResponse, AppError> {
    let playlist = fetch_playlist(&pool, playlist_id).await?;
    require_owner(&playlist, &claims)?;

    let deleted =
        sqlx::query("DELETE FROM playlist_videos WHERE playlist_id = $1 AND video_id = $2")
            .bind(playlist_id)
            .bind(video_id)
            .execute(&pool)
            .await?;

    if deleted.rows_affected() == 0 {
        return Err(AppError::NotFound(
            "Video not found in playlist".to_string(),
        ));
    }

    let response = playlist_response(&pool, playlist).await?;
    Ok(ApiResponse::ok(
        response,
        "Video removed from playlist successfully",
    ))
}
