//! Project Store Client
//!
//! Keyed documents under a `projects` collection: create, field-level
//! update, and a most-recent-by-creation-time query. Every operation may
//! fail independently; callers treat failures as non-fatal, since durable
//! bookkeeping is secondary to returning a usable result.

use std::time::Duration;

use async_trait::async_trait;
use serde::Serialize;
use tracing::debug;

use crate::config::ProjectStoreConfig;
use crate::ProjectId;

use super::{ProjectRecord, ProjectStatus, StorageError, StorageResult};

/// Field-level update applied to an existing project record.
///
/// Unset fields are omitted from the wire payload so the store merges
/// rather than overwrites.
#[derive(Clone, Debug, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub final_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<ProjectStatus>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
}

impl ProjectPatch {
    /// Patch recording a successful render.
    pub fn completed(final_url: &str) -> Self {
        Self {
            final_url: Some(final_url.to_string()),
            status: Some(ProjectStatus::Completed),
            error_message: None,
        }
    }

    /// Patch recording a failed render.
    pub fn failed(message: &str) -> Self {
        Self {
            final_url: None,
            status: Some(ProjectStatus::Error),
            error_message: Some(message.to_string()),
        }
    }
}

/// External document database holding per-render metadata.
#[async_trait]
pub trait ProjectStore: Send + Sync {
    /// Creates a new project document.
    async fn create(&self, record: &ProjectRecord) -> StorageResult<()>;

    /// Applies a field-level update to an existing document.
    async fn update_fields(&self, id: &ProjectId, patch: &ProjectPatch) -> StorageResult<()>;

    /// Returns the most recent project by creation time, if any.
    async fn latest(&self) -> StorageResult<Option<ProjectRecord>>;
}

// =============================================================================
// HTTP Implementation
// =============================================================================

/// REST client over a hosted `projects` collection.
pub struct HttpProjectStore {
    client: reqwest::Client,
    base_url: String,
}

impl HttpProjectStore {
    pub fn new(config: &ProjectStoreConfig) -> StorageResult<Self> {
        if config.base_url.is_empty() {
            return Err(StorageError::NotConfigured(
                "project store base URL is empty".to_string(),
            ));
        }

        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .map_err(|e| StorageError::Network(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }

    fn collection_url(&self) -> String {
        format!("{}/projects", self.base_url)
    }

    fn document_url(&self, id: &str) -> String {
        format!("{}/projects/{}", self.base_url, id)
    }

    fn latest_url(&self) -> String {
        format!("{}/projects?orderBy=createdAt&order=desc&limit=1", self.base_url)
    }

    async fn check_status(response: reqwest::Response) -> StorageResult<reqwest::Response> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let body = response.text().await.unwrap_or_default();
        Err(StorageError::Rejected(format!(
            "Project store returned {}: {}",
            status,
            body.chars().take(200).collect::<String>()
        )))
    }
}

#[async_trait]
impl ProjectStore for HttpProjectStore {
    async fn create(&self, record: &ProjectRecord) -> StorageResult<()> {
        let response = self
            .client
            .post(self.collection_url())
            .json(record)
            .send()
            .await
            .map_err(|e| StorageError::Network(e.to_string()))?;

        Self::check_status(response).await?;
        debug!("created project record {}", record.id);
        Ok(())
    }

    async fn update_fields(&self, id: &ProjectId, patch: &ProjectPatch) -> StorageResult<()> {
        let response = self
            .client
            .patch(self.document_url(id))
            .json(patch)
            .send()
            .await
            .map_err(|e| StorageError::Network(e.to_string()))?;

        Self::check_status(response).await?;
        debug!("patched project record {}", id);
        Ok(())
    }

    async fn latest(&self) -> StorageResult<Option<ProjectRecord>> {
        let response = self
            .client
            .get(self.latest_url())
            .send()
            .await
            .map_err(|e| StorageError::Network(e.to_string()))?;

        let response = Self::check_status(response).await?;
        let mut records: Vec<ProjectRecord> = response
            .json()
            .await
            .map_err(|e| StorageError::InvalidResponse(e.to_string()))?;

        Ok(if records.is_empty() {
            None
        } else {
            Some(records.remove(0))
        })
    }
}
