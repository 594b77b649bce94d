//! File storage types.

/// What the backend knows about a stored blob.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileMetadata {
    pub path: String,
    pub content_type: String,
    pub size: u64,
}

/// Request to write one blob.
#[derive(Debug, Clone)]
pub struct FileUploadRequest {
    pub path: String,
    pub content: Vec<u8>,
    pub content_type: String,
}

impl FileUploadRequest {
    pub fn new(path: impl Into<String>, content: Vec<u8>, content_type: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            content,
            content_type: content_type.into(),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum FileStorageError {
    #[error("File not found: {0}")]
    NotFound(String),

    #[error("Invalid path: {0}")]
    InvalidPath(String),

    #[error("Storage error: {0}")]
    StorageError(String),
}

impl From<opendal::Error> for FileStorageError {
    fn from(err: opendal::Error) -> Self {
        Self::StorageError(err.to_string())
    }
}

impl From<std::io::Error> for FileStorageError {
    fn from(err: std::io::Error) -> Self {
        Self::StorageError(err.to_string())
    }
}
