// src/handlers/user.rs

use axum::{
    Extension, Json,
    extract::{Multipart, State},
    response::IntoResponse,
};
use sqlx::PgPool;
use validator::Validate;

use crate::{
    config::Config,
    error::{AppError, is_unique_violation},
    media::{MediaAsset, MediaClient, UploadedFile},
    models::user::{
        AuthResponse, ChangePasswordRequest, LoginRequest, RefreshTokenRequest, RegisterRequest,
        UpdateAccountRequest, User,
    },
    response::ApiResponse,
    utils::{
        hash::{hash_password, verify_password},
        jwt::{Claims, sign_access_token, sign_refresh_token, verify_refresh_token},
    },
};

const USER_COLUMNS: &str = "id, username, email, fullname, password, avatar_url, \
     avatar_public_id, cover_image_url, cover_image_public_id, refresh_token, created_at";

async fn fetch_user(pool: &PgPool, id: i64) -> Result<User, AppError> {
    sqlx::query_as::<_, User>(&format!("SELECT {} FROM users WHERE id = $1", USER_COLUMNS))
        .bind(id)
        .fetch_optional(pool)
        .await?
        .ok_or(AppError::NotFound("User not found".to_string()))
}

/// Issues a fresh access/refresh token pair and persists the refresh token
/// on the user row, replacing any previous one.
async fn issue_tokens(
    pool: &PgPool,
    config: &Config,
    user: &User,
) -> Result<(String, String), AppError> {
    let access_token = sign_access_token(user.id, &user.username, config)?;
    let refresh_token = sign_refresh_token(user.id, &user.username, config)?;

    sqlx::query("UPDATE users SET refresh_token = $1 WHERE id = $2")
        .bind(&refresh_token)
        .bind(user.id)
        .execute(pool)
        .await?;

    Ok((access_token, refresh_token))
}

/// Registers a new user.
///
/// Multipart form: fullname, email, username, password, an `avatar` file
/// (required) and a `coverImage` file (optional). Uploads land on the media
/// host before the insert; if the insert then fails, the uploaded assets are
/// released best-effort so the original error stays visible.
pub async fn register(
    State(pool): State<PgPool>,
    State(media): State<MediaClient>,
    mut multipart: Multipart,
) -> Result<impl IntoResponse, AppError> {
    let mut form = RegisterRequest::default();
    let mut avatar_file: Option<UploadedFile> = None;
    let mut cover_file: Option<UploadedFile> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::BadRequest(e.to_string()))?
    {
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            "fullname" => form.fullname = read_text(field).await?,
            "email" => form.email = read_text(field).await?,
            "username" => form.username = read_text(field).await?.to_lowercase(),
            "password" => form.password = read_text(field).await?,
            "avatar" => avatar_file = Some(UploadedFile::read(field).await?),
            "coverImage" => cover_file = Some(UploadedFile::read(field).await?),
            _ => {}
        }
    }

    if let Err(validation_errors) = form.validate() {
        return Err(AppError::BadRequest(validation_errors.to_string()));
    }

    let avatar_file = avatar_file.ok_or(AppError::BadRequest(
        "Avatar file is missing".to_string(),
    ))?;

    let existing = sqlx::query_as::<_, (i64,)>(
        "SELECT id FROM users WHERE username = $1 OR email = $2",
    )
    .bind(&form.username)
    .bind(&form.email)
    .fetch_optional(&pool)
    .await?;

    if existing.is_some() {
        return Err(AppError::Conflict(
            "User with these credentials already exists".to_string(),
        ));
    }

    // Hash before any upload so a hashing failure cannot leak an asset.
    let hashed_password = hash_password(&form.password)?;

    let avatar = media
        .upload(&avatar_file.file_name, avatar_file.bytes)
        .await?;

    let cover: Option<MediaAsset> = match cover_file {
        Some(file) => match media.upload(&file.file_name, file.bytes).await {
            Ok(asset) => Some(asset),
            Err(e) => {
                media.release(&avatar.public_id).await;
                return Err(e);
            }
        },
        None => None,
    };

    let inserted = sqlx::query_as::<_, User>(&format!(
        "INSERT INTO users \
            (username, email, fullname, password, avatar_url, avatar_public_id, \
             cover_image_url, cover_image_public_id) \
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8) \
         RETURNING {}",
        USER_COLUMNS
    ))
    .bind(&form.username)
    .bind(&form.email)
    .bind(&form.fullname)
    .bind(&hashed_password)
    .bind(&avatar.url)
    .bind(&avatar.public_id)
    .bind(cover.as_ref().map(|c| c.url.as_str()))
    .bind(cover.as_ref().map(|c| c.public_id.as_str()))
    .fetch_one(&pool)
    .await;

    let user = match inserted {
        Ok(user) => user,
        Err(e) => {
            // Compensating deletes, then surface the original failure.
            media.release(&avatar.public_id).await;
            if let Some(cover) = &cover {
                media.release(&cover.public_id).await;
            }
            if is_unique_violation(&e) {
                return Err(AppError::Conflict(
                    "User with these credentials already exists".to_string(),
                ));
            }
            tracing::error!("Failed to register user: {:?}", e);
            return Err(AppError::from(e));
        }
    };

    Ok(ApiResponse::created(user, "User registered successfully"))
}

async fn read_text(field: axum::extract::multipart::Field<'_>) -> Result<String, AppError> {
    field
        .text()
        .await
        .map_err(|e| AppError::BadRequest(e.to_string()))
}

/// Authenticates a user by username or email plus password.
///
/// Unknown user is 404; wrong password is 401. Success returns the user
/// (sans secrets) together with a fresh access/refresh token pair.
pub async fn login(
    State(pool): State<PgPool>,
    State(config): State<Config>,
    Json(payload): Json<LoginRequest>,
) -> Result<impl IntoResponse, AppError> {
    if let Err(validation_errors) = payload.validate() {
        return Err(AppError::BadRequest(validation_errors.to_string()));
    }
    if payload.username.is_none() && payload.email.is_none() {
        return Err(AppError::BadRequest(
            "Username or email is required".to_string(),
        ));
    }

    // Usernames are stored lowercased, so the lookup canonicalizes too.
    let username = payload.username.as_deref().unwrap_or_default().to_lowercase();

    let user = sqlx::query_as::<_, User>(&format!(
        "SELECT {} FROM users WHERE username = $1 OR email = $2",
        USER_COLUMNS
    ))
    .bind(&username)
    .bind(payload.email.as_deref().unwrap_or_default())
    .fetch_optional(&pool)
    .await?
    .ok_or(AppError::NotFound("User not found".to_string()))?;

    if !verify_password(&payload.password, &user.password)? {
        return Err(AppError::AuthError("Invalid credentials".to_string()));
    }

    let (access_token, refresh_token) = issue_tokens(&pool, &config, &user).await?;

    Ok(ApiResponse::ok(
        AuthResponse {
            user,
            access_token,
            refresh_token,
        },
        "User logged in successfully",
    ))
}

/// Rotates the refresh token.
///
/// The presented token must verify against the refresh secret AND exactly
/// match the token persisted on the user row; otherwise 401.
pub async fn refresh_token(
    State(pool): State<PgPool>,
    State(config): State<Config>,
    Json(payload): Json<RefreshTokenRequest>,
) -> Result<impl IntoResponse, AppError> {
    if payload.refresh_token.is_empty() {
        return Err(AppError::AuthError("Refresh token is required".to_string()));
    }

    let claims = verify_refresh_token(&payload.refresh_token, &config)?;
    let user = fetch_user(&pool, claims.user_id()?)
        .await
        .map_err(|_| AppError::AuthError("Invalid refresh token".to_string()))?;

    if user.refresh_token.as_deref() != Some(payload.refresh_token.as_str()) {
        return Err(AppError::AuthError(
            "Refresh token expired or revoked".to_string(),
        ));
    }

    let (access_token, refresh_token) = issue_tokens(&pool, &config, &user).await?;

    Ok(ApiResponse::ok(
        AuthResponse {
            user,
            access_token,
            refresh_token,
        },
        "Access token refreshed successfully",
    ))
}

/// Clears the stored refresh token so it can no longer be rotated.
pub async fn logout(
    State(pool): State<PgPool>,
    Extension(claims): Extension<Claims>,
) -> Result<impl IntoResponse, AppError> {
    sqlx::query("UPDATE users SET refresh_token = NULL WHERE id = $1")
        .bind(claims.user_id()?)
        .execute(&pool)
        .await?;

    Ok(ApiResponse::ok(
        serde_json::json!({}),
        "User logged out successfully",
    ))
}

pub async fn change_password(
    State(pool): State<PgPool>,
    Extension(claims): Extension<Claims>,
    Json(payload): Json<ChangePasswordRequest>,
) -> Result<impl IntoResponse, AppError> {
    if let Err(validation_errors) = payload.validate() {
        return Err(AppError::BadRequest(validation_errors.to_string()));
    }

    let user = fetch_user(&pool, claims.user_id()?).await?;

    if !verify_password(&payload.old_password, &user.password)? {
        return Err(AppError::AuthError("Old password is incorrect".to_string()));
    }

    let hashed_password = hash_password(&payload.new_password)?;
    sqlx::query("UPDATE users SET password = $1 WHERE id = $2")
        .bind(&hashed_password)
        .bind(user.id)
        .execute(&pool)
        .await?;

    Ok(ApiResponse::ok(
        serde_json::json!({}),
        "Password changed successfully",
    ))
}

pub async fn current_user(
    State(pool): State<PgPool>,
    Extension(claims): Extension<Claims>,
) -> Result<impl IntoResponse, AppError> {
    let user = fetch_user(&pool, claims.user_id()?).await?;
    Ok(ApiResponse::ok(user, "Current user details"))
}

pub async fn update_account(
    State(pool): State<PgPool>,
    Extension(claims): Extension<Claims>,
    Json(payload): Json<UpdateAccountRequest>,
) -> Result<impl IntoResponse, AppError> {
    if let Err(validation_errors) = payload.validate() {
        return Err(AppError::BadRequest(validation_errors.to_string()));
    }

    let user = sqlx::query_as::<_, User>(&format!(
        "UPDATE users SET fullname = $1, email = $2 WHERE id = $3 RETURNING {}",
        USER_COLUMNS
    ))
    .bind(&payload.fullname)
    .bind(&payload.email)
    .bind(claims.user_id()?)
    .fetch_one(&pool)
    .await
    .map_err(|e| {
        if is_unique_violation(&e) {
            AppError::Conflict("Email already in use".to_string())
        } else {
            AppError::from(e)
        }
    })?;

    Ok(ApiResponse::ok(user, "Account details updated"))
}

/// Replaces the avatar: uploads the new asset, swaps the row, then releases
/// the previous asset best-effort.
pub async fn update_avatar(
    State(pool): State<PgPool>,
    State(media): State<MediaClient>,
    Extension(claims): Extension<Claims>,
    multipart: Multipart,
) -> Result<impl IntoResponse, AppError> {
    let file = read_single_file(multipart).await?;
    let user = fetch_user(&pool, claims.user_id()?).await?;

    let asset = media.upload(&file.file_name, file.bytes).await?;

    let updated = sqlx::query_as::<_, User>(&format!(
        "UPDATE users SET avatar_url = $1, avatar_public_id = $2 WHERE id = $3 RETURNING {}",
        USER_COLUMNS
    ))
    .bind(&asset.url)
    .bind(&asset.public_id)
    .bind(user.id)
    .fetch_one(&pool)
    .await;

    let updated = match updated {
        Ok(updated) => updated,
        Err(e) => {
            media.release(&asset.public_id).await;
            return Err(AppError::from(e));
        }
    };

    media.release(&user.avatar_public_id).await;

    Ok(ApiResponse::ok(updated, "Avatar updated successfully"))
}

pub async fn update_cover_image(
    State(pool): State<PgPool>,
    State(media): State<MediaClient>,
    Extension(claims): Extension<Claims>,
    multipart: Multipart,
) -> Result<impl IntoResponse, AppError> {
    let file = read_single_file(multipart).await?;
    let user = fetch_user(&pool, claims.user_id()?).await?;

    let asset = media.upload(&file.file_name, file.bytes).await?;

    let updated = sqlx::query_as::<_, User>(&format!(
        "UPDATE users SET cover_image_url = $1, cover_image_public_id = $2 \
         WHERE id = $3 RETURNING {}",
        USER_COLUMNS
    ))
    .bind(&asset.url)
    .bind(&asset.public_id)
    .bind(user.id)
    .fetch_one(&pool)
    .await;

    let updated = match updated {
        Ok(updated) => updated,
        Err(e) => {
            media.release(&asset.public_id).await;
            return Err(AppError::from(e));
        }
    };

    if let Some(old_id) = &user.cover_image_public_id {
        media.release(old_id).await;
    }

    Ok(ApiResponse::ok(updated, "Cover image updated successfully"))
}

async fn read_single_file(mut multipart: Multipart) -> Result<UploadedFile, AppError> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::BadRequest(e.to_string()))?
    {
        if field.file_name().is_some() {
            return UploadedFile::read(field).await;
        }
    }

    Err(AppError::BadRequest("File is required".to_string()))
}
