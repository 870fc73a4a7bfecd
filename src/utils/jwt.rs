// src/utils/jwt.rs

use std::time::{SystemTime, UNIX_EPOCH};

use axum::{
    body::Body,
    extract::State,
    http::{Request, header},
    middleware::Next,
    response::{IntoResponse, Response},
};
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};

use crate::{config::Config, error::AppError};

/// JWT Claims structure, shared by access and refresh tokens.
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct Claims {
    /// Subject - Stores the User ID (as string).
    pub sub: String,
    /// Username, carried for logging convenience.
    pub username: String,
    /// Expiration time as Unix timestamp.
    pub exp: usize,
}

impl Claims {
    /// The user id both sides of every ownership check are canonicalized to.
    pub fn user_id(&self) -> Result<i64, AppError> {
        self.sub
            .parse::<i64>()
            .map_err(|_| AppError::AuthError("Invalid token subject".to_string()))
    }
}

fn sign(id: i64, username: &str, secret: &str, expiry_seconds: u64) -> Result<String, AppError> {
    let expiration = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_err(|e| AppError::InternalServerError(e.to_string()))?
        .as_secs() as usize
        + expiry_seconds as usize;

    let claims = Claims {
        sub: id.to_string(),
        username: username.to_owned(),
        exp: expiration,
    };

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .map_err(|e| AppError::InternalServerError(e.to_string()))
}

/// Signs a short-lived access token for the user.
pub fn sign_access_token(id: i64, username: &str, config: &Config) -> Result<String, AppError> {
    sign(
        id,
        username,
        &config.access_token_secret,
        config.access_token_expiry,
    )
}

/// Signs a long-lived refresh token; the caller persists it on the user row.
pub fn sign_refresh_token(id: i64, username: &str, config: &Config) -> Result<String, AppError> {
    sign(
        id,
        username,
        &config.refresh_token_secret,
        config.refresh_token_expiry,
    )
}

fn verify(token: &str, secret: &str) -> Result<Claims, AppError> {
    let token_data = decode(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::default(),
    )
    .map_err(|_| AppError::AuthError("Invalid token".to_string()))?;

    Ok(token_data.claims)
}

pub fn verify_access_token(token: &str, config: &Config) -> Result<Claims, AppError> {
    verify(token, &config.access_token_secret)
}

pub fn verify_refresh_token(token: &str, config: &Config) -> Result<Claims, AppError> {
    verify(token, &config.refresh_token_secret)
}

/// Axum Middleware: Authentication.
///
/// Intercepts requests, validates the 'Authorization: Bearer <token>' header
/// against the access token secret. If valid, injects `Claims` into the
/// request extensions for handlers to use. If invalid, returns 401 through
/// the uniform error envelope before the handler body runs.
pub async fn auth_middleware(
    State(config): State<Config>,
    mut req: Request<Body>,
    next: Next,
) -> Result<Response, Response> {
    let auth_header = req
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok());

    let token = match auth_header {
        Some(header) if header.starts_with("Bearer ") => &header[7..],
        _ => {
            return Err(
                AppError::AuthError("Missing access token".to_string()).into_response(),
            );
        }
    };

    match verify_access_token(token, &config) {
        Ok(claims) => {
            req.extensions_mut().insert(claims);
            Ok(next.run(req).await)
        }
        Err(e) => Err(e.into_response()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_config() -> Config {
        Config {
            database_url: String::new(),
            access_token_secret: "access-secret".to_string(),
            access_token_expiry: 900,
            refresh_token_secret: "refresh-secret".to_string(),
            refresh_token_expiry: 864_000,
            media_base_url: String::new(),
            media_api_key: String::new(),
            rust_log: "error".to_string(),
        }
    }

    #[test]
    fn access_token_round_trips() {
        let config = test_config();
        let token = sign_access_token(42, "alice", &config).unwrap();
        let claims = verify_access_token(&token, &config).unwrap();
        assert_eq!(claims.user_id().unwrap(), 42);
        assert_eq!(claims.username, "alice");
    }

    #[test]
    fn access_token_rejected_by_refresh_secret() {
        let config = test_config();
        let token = sign_access_token(42, "alice", &config).unwrap();
        assert!(verify_refresh_token(&token, &config).is_err());
    }
}
