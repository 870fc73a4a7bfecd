// src/config.rs

use dotenvy::dotenv;
use std::env;

#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub access_token_secret: String,
    /// Access token lifetime in seconds (short-lived).
    pub access_token_expiry: u64,
    pub refresh_token_secret: String,
    /// Refresh token lifetime in seconds (long-lived, persisted per user).
    pub refresh_token_expiry: u64,
    pub media_base_url: String,
    pub media_api_key: String,
    pub rust_log: String,
}

impl Config {
    pub fn from_env() -> Self {
        dotenv().ok();

        let database_url = env::var("DATABASE_URL").expect("DATABASE_URL must be set");

        let access_token_secret =
            env::var("ACCESS_TOKEN_SECRET").expect("ACCESS_TOKEN_SECRET must be set");

        let access_token_expiry = env::var("ACCESS_TOKEN_EXPIRY")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(900); // 15 minutes

        let refresh_token_secret =
            env::var("REFRESH_TOKEN_SECRET").expect("REFRESH_TOKEN_SECRET must be set");

        let refresh_token_expiry = env::var("REFRESH_TOKEN_EXPIRY")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(864_000); // 10 days

        let media_base_url = env::var("MEDIA_BASE_URL").expect("MEDIA_BASE_URL must be set");

        let media_api_key = env::var("MEDIA_API_KEY").expect("MEDIA_API_KEY must be set");

        let rust_log = env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string());

        Self {
            database_url,
            access_token_secret,
            access_token_expiry,
            refresh_token_secret,
            refresh_token_expiry,
            media_base_url,
            media_api_key,
            rust_log,
        }
    }
}
