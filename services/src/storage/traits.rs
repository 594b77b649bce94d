//! Storage trait definitions.

use super::types::{FileMetadata, FileUploadRequest};
use std::future::Future;

/// Blob storage for uploaded files.
///
/// Paths are relative to the backend's root and never start with `/`.
pub trait FileStorage: Clone + Send + Sync + 'static {
    type Error: std::error::Error + Send + Sync + 'static;

    fn upload_file(
        &self,
        request: FileUploadRequest,
    ) -> impl Future<Output = Result<FileMetadata, Self::Error>> + Send;

    fn download_file(
        &self,
        path: &str,
    ) -> impl Future<Output = Result<Vec<u8>, Self::Error>> + Send;

    /// Returns `false` when there was nothing to delete.
    fn delete_file(&self, path: &str) -> impl Future<Output = Result<bool, Self::Error>> + Send;

    fn file_exists(&self, path: &str) -> impl Future<Output = Result<bool, Self::Error>> + Send;
}

/// Connectivity probe for `OpenDAL`-backed storage.
pub trait OpenDALDisk: Clone + Send + Sync + 'static {
    fn could_connected(&self) -> impl Future<Output = bool> + Send;
}
