// src/models/user.rs

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

/// Represents the 'users' table in the database.
#[derive(Debug, Clone, FromRow, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: i64,

    /// Unique username.
    pub username: String,

    /// Unique email address.
    pub email: String,

    pub fullname: String,

    /// Argon2 password hash.
    /// Skipped during serialization to prevent leaking sensitive data.
    #[serde(skip)]
    pub password: String,

    pub avatar_url: String,

    /// Media host id of the avatar, kept for deletion. Not exposed.
    #[serde(skip)]
    pub avatar_public_id: String,

    pub cover_image_url: Option<String>,

    #[serde(skip)]
    pub cover_image_public_id: Option<String>,

    /// Currently valid refresh token, if logged in.
    /// Skipped during serialization to prevent leaking sensitive data.
    #[serde(skip)]
    pub refresh_token: Option<String>,

    pub created_at: chrono::DateTime<chrono::Utc>,
}

/// Registration fields, assembled from the multipart form.
#[derive(Debug, Default, Validate)]
pub struct RegisterRequest {
    #[validate(length(min = 1, max = 100, message = "Fullname is required."))]
    pub fullname: String,
    #[validate(email(message = "A valid email is required."))]
    pub email: String,
    #[validate(length(
        min = 3,
        max = 50,
        message = "Username length must be between 3 and 50 characters."
    ))]
    pub username: String,
    #[validate(length(
        min = 8,
        max = 128,
        message = "Password length must be between 8 and 128 characters."
    ))]
    pub password: String,
}

/// DTO for login: username or email plus password.
#[derive(Debug, Deserialize, Validate)]
pub struct LoginRequest {
    pub username: Option<String>,
    pub email: Option<String>,
    #[validate(length(min = 1, max = 128))]
    pub password: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RefreshTokenRequest {
    pub refresh_token: String,
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ChangePasswordRequest {
    #[validate(length(min = 1))]
    pub old_password: String,
    #[validate(length(min = 8, max = 128, message = "New password is too short."))]
    pub new_password: String,
}

#[derive(Debug, Deserialize, Validate)]
pub struct UpdateAccountRequest {
    #[validate(length(min = 1, max = 100, message = "Fullname is required."))]
    pub fullname: String,
    #[validate(email(message = "A valid email is required."))]
    pub email: String,
}

/// Login/refresh response payload: the user plus both tokens.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthResponse {
    pub user: User,
    pub access_token: String,
    pub refresh_token: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    #[test]
    fn user_serialization_excludes_secrets() {
        let user = User {
            id: 1,
            username: "alice".to_string(),
            email: "alice@x.com".to_string(),
            fullname: "Alice".to_string(),
            password: "argon2-hash".to_string(),
            avatar_url: "https://cdn/avatar.png".to_string(),
            avatar_public_id: "av123".to_string(),
            cover_image_url: None,
            cover_image_public_id: None,
            refresh_token: Some("refresh".to_string()),
            created_at: Utc::now(),
        };

        let value = serde_json::to_value(&user).unwrap();
        assert!(value.get("password").is_none());
        assert!(value.get("refreshToken").is_none());
        assert!(value.get("avatarPublicId").is_none());
        assert_eq!(value["username"], "alice");
        assert_eq!(value["avatarUrl"], "https://cdn/avatar.png");
    }

    #[test]
    fn register_request_rejects_blank_fields() {
        let req = RegisterRequest {
            fullname: "".to_string(),
            email: "not-an-email".to_string(),
            username: "al".to_string(),
            password: "short".to_string(),
        };
        assert!(req.validate().is_err());
    }
}
