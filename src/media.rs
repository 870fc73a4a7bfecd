// src/media.rs

use std::time::Duration;

use axum::extract::multipart::Field;
use reqwest::multipart::{Form, Part};
use serde::{Deserialize, Serialize};

use crate::error::AppError;

/// A file pulled out of an incoming multipart request body.
pub struct UploadedFile {
    pub file_name: String,
    pub bytes: Vec<u8>,
}

impl UploadedFile {
    pub async fn read(field: Field<'_>) -> Result<Self, AppError> {
        let file_name = field.file_name().unwrap_or("upload.bin").to_string();
        let bytes = field
            .bytes()
            .await
            .map_err(|e| AppError::BadRequest(format!("Failed to read upload: {}", e)))?
            .to_vec();

        Ok(Self { file_name, bytes })
    }
}

/// A stored asset on the media host: the public URL plus the opaque id
/// needed to request its deletion later.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MediaAsset {
    pub url: String,
    pub public_id: String,
}

/// HTTP client for the external media host.
///
/// Uploads binary assets (avatars, cover images, video files, thumbnails)
/// and deletes them by public id. Constructed once at startup and passed
/// through `AppState`; every call is bounded by the client timeout.
#[derive(Clone)]
pub struct MediaClient {
    http: reqwest::Client,
    base_url: String,
    api_key: String,
}

impl MediaClient {
    pub fn new(base_url: &str, api_key: &str) -> Self {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(60))
            .build()
            .expect("failed to build media host HTTP client");

        Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
        }
    }

    /// Uploads one file and returns its stable reference.
    pub async fn upload(&self, file_name: &str, bytes: Vec<u8>) -> Result<MediaAsset, AppError> {
        let part = Part::bytes(bytes).file_name(file_name.to_string());
        let form = Form::new().part("file", part);

        let resp = self
            .http
            .post(format!("{}/upload", self.base_url))
            .bearer_auth(&self.api_key)
            .multipart(form)
            .send()
            .await
            .map_err(|e| AppError::InternalServerError(format!("media upload failed: {}", e)))?;

        if !resp.status().is_success() {
            return Err(AppError::InternalServerError(format!(
                "media host rejected upload: {}",
                resp.status()
            )));
        }

        let asset = resp
            .json::<MediaAsset>()
            .await
            .map_err(|e| AppError::InternalServerError(format!("bad media host response: {}", e)))?;

        tracing::info!("Uploaded asset {} to media host", asset.public_id);
        Ok(asset)
    }

    /// Deletes an asset by public id.
    pub async fn delete(&self, public_id: &str) -> Result<(), AppError> {
        let resp = self
            .http
            .delete(format!("{}/assets/{}", self.base_url, public_id))
            .bearer_auth(&self.api_key)
            .send()
            .await
            .map_err(|e| AppError::InternalServerError(format!("media delete failed: {}", e)))?;

        if !resp.status().is_success() {
            return Err(AppError::InternalServerError(format!(
                "media host rejected delete of {}: {}",
                public_id,
                resp.status()
            )));
        }

        tracing::info!("Deleted asset {} from media host", public_id);
        Ok(())
    }

    /// Best-effort compensating delete: a failure here is logged and never
    /// masks the error that triggered the cleanup.
    pub async fn release(&self, public_id: &str) {
        if let Err(e) = self.delete(public_id).await {
            tracing::warn!("Compensating delete of asset {} failed: {}", public_id, e);
        }
    }
}
