//! External Storage Collaborators
//!
//! Two opaque services sit at the pipeline boundary: an object store that
//! accepts uploaded bytes and returns a retrievable URL, and a project
//! store (hosted document database) holding per-render metadata. Both are
//! trait seams so the orchestrator takes explicit dependency objects and
//! tests can substitute in-memory doubles. Project-store availability is
//! a first-class optional capability, not a caught-and-ignored failure.

pub mod object_store;
pub mod project_store;

mod models;
pub use models::*;
pub use object_store::{HttpObjectStore, ObjectStore, UploadReceipt};
pub use project_store::{HttpProjectStore, ProjectPatch, ProjectStore};

/// Storage-related error types
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("Network error: {0}")]
    Network(String),

    #[error("Provider rejected the request: {0}")]
    Rejected(String),

    #[error("Unexpected provider response: {0}")]
    InvalidResponse(String),

    #[error("Store is not configured: {0}")]
    NotConfigured(String),
}

pub type StorageResult<T> = Result<T, StorageError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = StorageError::Rejected("Invalid upload preset".to_string());
        assert!(err.to_string().contains("Invalid upload preset"));
    }
}
