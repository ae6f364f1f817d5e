use async_trait::async_trait;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Upload request failed: {0}")]
    Http(String),
    #[error("Upload rejected with status {status}: {body}")]
    Status { status: u16, body: String },
    #[error("Invalid upload response: {0}")]
    ParseError(String),
}

/// Content-addressed image storage
#[async_trait]
pub trait ImageStore: Send + Sync {
    /// Pin a file and return its public URL
    async fn pin(
        &self,
        file_name: &str,
        content_type: &str,
        bytes: Vec<u8>,
    ) -> Result<String, StorageError>;
}
