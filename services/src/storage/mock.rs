//! Mock file storage for testing.

use super::traits::FileStorage;
use super::types::{FileMetadata, FileStorageError, FileUploadRequest};
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, RwLock};

/// In-memory mock implementation of `FileStorage` for testing.
#[derive(Clone, Default)]
pub struct MockFileStorage {
    files: Arc<RwLock<HashMap<String, Vec<u8>>>>,
    fail_writes: Arc<AtomicBool>,
}

impl MockFileStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// A storage whose writes always fail.
    pub fn failing_writes() -> Self {
        let storage = Self::default();
        storage.fail_writes.store(true, Ordering::SeqCst);
        storage
    }

    pub fn len(&self) -> usize {
        self.files.read().expect("lock poisoned").len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl FileStorage for MockFileStorage {
    type Error = FileStorageError;

    async fn upload_file(&self, request: FileUploadRequest) -> Result<FileMetadata, Self::Error> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(FileStorageError::StorageError(
                "MockFileStorage: writes disabled".to_owned(),
            ));
        }

        let metadata = FileMetadata {
            path: request.path.clone(),
            content_type: request.content_type,
            size: request.content.len() as u64,
        };

        self.files
            .write()
            .expect("lock poisoned")
            .insert(request.path, request.content);
        Ok(metadata)
    }

    async fn download_file(&self, path: &str) -> Result<Vec<u8>, Self::Error> {
        let files = self.files.read().expect("lock poisoned");
        files
            .get(path)
            .cloned()
            .ok_or_else(|| FileStorageError::NotFound(path.to_owned()))
    }

    async fn delete_file(&self, path: &str) -> Result<bool, Self::Error> {
        let mut files = self.files.write().expect("lock poisoned");
        Ok(files.remove(path).is_some())
    }

    async fn file_exists(&self, path: &str) -> Result<bool, Self::Error> {
        let files = self.files.read().expect("lock poisoned");
        Ok(files.contains_key(path))
    }
}
