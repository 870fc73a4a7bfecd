// src/models/subscription.rs

use serde::Serialize;
use sqlx::FromRow;

/// A subscription row joined with the counterpart user's public fields.
/// The subscriptions table is a (channel, subscriber) pair, unique per pair;
/// handlers write it directly.
#[derive(Debug, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct ChannelUserResponse {
    pub user_id: i64,
    pub username: String,
    pub fullname: String,
    pub avatar_url: String,
    pub subscribed_at: chrono::DateTime<chrono::Utc>,
}
