//! Image hosting collaborator.
//!
//! Review photos are stored with an external hosting API; only the
//! resulting URL (or the failure) matters to this crate.

use async_trait::async_trait;

use crate::errors::CommerceError;

#[async_trait]
pub trait ImageHost: Send + Sync {
    /// Uploads raw image bytes and returns the hosted URL.
    async fn upload(&self, image: Vec<u8>) -> Result<String, CommerceError>;
}
