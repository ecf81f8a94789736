//! Object Store Client
//!
//! Upload contract: raw bytes + a resource kind + a destination folder in,
//! a publicly resolvable URL out. Failures carry the provider's error
//! message when one is present in the response body.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use reqwest::StatusCode;
use serde::Deserialize;
use tracing::info;

use crate::config::ObjectStoreConfig;

use super::{ResourceKind, StorageError, StorageResult};

/// Result of a successful upload
#[derive(Debug, Clone)]
pub struct UploadReceipt {
    /// Publicly resolvable URL of the stored object
    pub url: String,
    /// Provider-assigned object identifier, when reported
    pub public_id: Option<String>,
}

/// External service that accepts uploaded bytes and returns a URL.
#[async_trait]
pub trait ObjectStore: Send + Sync {
    async fn upload(
        &self,
        bytes: Vec<u8>,
        kind: ResourceKind,
        folder: &str,
    ) -> StorageResult<UploadReceipt>;
}

// =============================================================================
// HTTP Implementation
// =============================================================================

#[derive(Debug, Deserialize)]
struct UploadResponse {
    secure_url: String,
    #[serde(default)]
    public_id: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ProviderErrorResponse {
    #[serde(default)]
    error: Option<ProviderErrorDetail>,
}

#[derive(Debug, Deserialize)]
struct ProviderErrorDetail {
    #[serde(default)]
    message: Option<String>,
}

/// Unsigned-preset HTTP upload client.
pub struct HttpObjectStore {
    client: reqwest::Client,
    base_url: String,
    cloud_name: String,
    upload_preset: String,
}

impl HttpObjectStore {
    pub fn new(config: &ObjectStoreConfig) -> StorageResult<Self> {
        if config.cloud_name.is_empty() {
            return Err(StorageError::NotConfigured(
                "object store cloud name is empty".to_string(),
            ));
        }

        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(180))
            .build()
            .map_err(|e| StorageError::Network(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            cloud_name: config.cloud_name.clone(),
            upload_preset: config.upload_preset.clone(),
        })
    }

    /// Builds the upload endpoint for a resource kind.
    fn upload_url(&self, kind: ResourceKind) -> String {
        format!(
            "{}/{}/{}/upload",
            self.base_url,
            self.cloud_name,
            kind.as_str()
        )
    }

    /// Extracts the provider's message from an error body.
    fn parse_provider_error(status: StatusCode, body: &str) -> StorageError {
        if let Ok(parsed) = serde_json::from_str::<ProviderErrorResponse>(body) {
            if let Some(message) = parsed.error.and_then(|e| e.message) {
                return StorageError::Rejected(format!("{} ({})", message, status));
            }
        }
        StorageError::Rejected(format!("Upload failed ({})", status))
    }
}

#[async_trait]
impl ObjectStore for HttpObjectStore {
    async fn upload(
        &self,
        bytes: Vec<u8>,
        kind: ResourceKind,
        folder: &str,
    ) -> StorageResult<UploadReceipt> {
        let url = self.upload_url(kind);
        let size = bytes.len();

        let form = Form::new()
            .text("upload_preset", self.upload_preset.clone())
            .text("folder", folder.to_string())
            .part("file", Part::bytes(bytes).file_name("upload.bin"));

        let response = self
            .client
            .post(&url)
            .multipart(form)
            .send()
            .await
            .map_err(|e| StorageError::Network(e.to_string()))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| StorageError::Network(e.to_string()))?;

        if !status.is_success() {
            return Err(Self::parse_provider_error(status, &body));
        }

        let parsed: UploadResponse = serde_json::from_str(&body)
            .map_err(|e| StorageError::InvalidResponse(e.to_string()))?;

        info!(
            "uploaded {} bytes as {} to folder '{}'",
            size,
            kind.as_str(),
            folder
        );

        Ok(UploadReceipt {
            url: parsed.secure_url,
            public_id: parsed.public_id,
        })
    }
}
