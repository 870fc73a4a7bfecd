// src/response.rs

use axum::{Json, http::StatusCode};
use serde::Serialize;

/// Uniform success envelope wrapping every API result:
/// `{ statusCode, data, message, success }`, success = statusCode < 400.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiResponse<T: Serialize> {
    pub status_code: u16,
    pub data: T,
    pub message: String,
    pub success: bool,
}

impl<T: Serialize> ApiResponse<T> {
    pub fn new(status: StatusCode, data: T, message: impl Into<String>) -> (StatusCode, Json<Self>) {
        let code = status.as_u16();
        (
            status,
            Json(Self {
                status_code: code,
                data,
                message: message.into(),
                success: code < 400,
            }),
        )
    }

    pub fn ok(data: T, message: impl Into<String>) -> (StatusCode, Json<Self>) {
        Self::new(StatusCode::OK, data, message)
    }

    pub fn created(data: T, message: impl Into<String>) -> (StatusCode, Json<Self>) {
        Self::new(StatusCode::CREATED, data, message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn envelope_shape_is_camel_case() {
        let (_, body) = ApiResponse::ok(serde_json::json!({"id": 1}), "fetched");
        let value = serde_json::to_value(&body.0).unwrap();
        assert_eq!(value["statusCode"], 200);
        assert_eq!(value["success"], true);
        assert_eq!(value["message"], "fetched");
        assert_eq!(value["data"]["id"], 1);
    }

    #[test]
    fn created_sets_201() {
        let (status, body) = ApiResponse::created(1, "made");
        assert_eq!(status, StatusCode::CREATED);
        assert!(body.0.success);
        assert_eq!(body.0.status_code, 201);
    }
}
