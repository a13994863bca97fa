use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors produced by the document-store collaborator.
///
/// The store is an external service; this crate only classifies its
/// failures far enough to decide whether a workflow step may proceed.
#[derive(Debug, Clone, Error, Serialize, Deserialize)]
pub enum StoreError {
    #[error("read failed at {path}: {reason}")]
    ReadFailed { path: String, reason: String },

    #[error("write failed at {path}: {reason}")]
    WriteFailed { path: String, reason: String },

    #[error("subscription failed at {path}: {reason}")]
    SubscribeFailed { path: String, reason: String },
}

impl StoreError {
    pub fn read(path: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::ReadFailed {
            path: path.into(),
            reason: reason.into(),
        }
    }

    pub fn write(path: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::WriteFailed {
            path: path.into(),
            reason: reason.into(),
        }
    }
}

/// Service-boundary error type.
///
/// Every service operation resolves to one of these; callers translate them
/// into user-facing messages. A `CollaboratorWriteFailed` never implies
/// partial success: the workflow stays at the step preceding the write so
/// the user may retry.
#[derive(Debug, Error)]
pub enum CommerceError {
    #[error("not authenticated")]
    NotAuthenticated,

    #[error("validation error: {0}")]
    ValidationError(String),

    #[error("not found: {0}")]
    NotFound(String),

    #[error("collaborator write failed: {0}")]
    CollaboratorWriteFailed(#[from] StoreError),

    #[error("external service error: {0}")]
    ExternalServiceError(String),

    #[error("serialization error: {0}")]
    SerializationError(String),
}

impl From<serde_json::Error> for CommerceError {
    fn from(err: serde_json::Error) -> Self {
        CommerceError::SerializationError(err.to_string())
    }
}

impl CommerceError {
    /// Whether the error is recoverable by correcting input or signing in,
    /// as opposed to a collaborator failure the user can only retry.
    pub fn is_user_recoverable(&self) -> bool {
        matches!(
            self,
            CommerceError::NotAuthenticated
                | CommerceError::ValidationError(_)
                | CommerceError::NotFound(_)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn store_error_converts_to_collaborator_write_failed() {
        let err: CommerceError = StoreError::write("orders/u1", "timeout").into();
        assert!(matches!(err, CommerceError::CollaboratorWriteFailed(_)));
        assert!(!err.is_user_recoverable());
    }

    #[test]
    fn validation_error_is_user_recoverable() {
        let err = CommerceError::ValidationError("Please fill all shipping details".into());
        assert!(err.is_user_recoverable());
    }
}
