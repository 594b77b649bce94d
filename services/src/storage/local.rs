//! Local disk storage backed by the `OpenDAL` `fs` service.

use super::traits::{FileStorage, OpenDALDisk};
use super::types::{FileMetadata, FileStorageError, FileUploadRequest};
use opendal::Operator;
use std::path::{Path, PathBuf};

/// Stores blobs as flat files under a root directory.
#[derive(Clone)]
pub struct LocalDisk {
    root: PathBuf,
    op: Operator,
}

impl LocalDisk {
    pub fn new(root: impl AsRef<Path>) -> Result<Self, FileStorageError> {
        let root = root.as_ref().to_path_buf();
        let root_str = root
            .to_str()
            .ok_or_else(|| FileStorageError::InvalidPath(root.display().to_string()))?;

        let builder = opendal::services::Fs::default().root(root_str);
        let op = Operator::new(builder)?.finish();

        Ok(Self { root, op })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Create the root directory if it is missing.
    pub async fn ensure_root(&self) -> Result<(), FileStorageError> {
        tokio::fs::create_dir_all(&self.root).await?;
        Ok(())
    }
}

// Blobs live directly under the root; anything that could escape it is refused.
fn validate_path(path: &str) -> Result<(), FileStorageError> {
    let is_plain_name = !path.is_empty()
        && path != "."
        && path != ".."
        && !path.contains(['/', '\\'])
        && !path.contains('\0');
    if is_plain_name {
        Ok(())
    } else {
        Err(FileStorageError::InvalidPath(path.to_owned()))
    }
}

impl OpenDALDisk for LocalDisk {
    async fn could_connected(&self) -> bool {
        self.op.check().await.is_ok()
    }
}

impl FileStorage for LocalDisk {
    type Error = FileStorageError;

    async fn upload_file(&self, request: FileUploadRequest) -> Result<FileMetadata, Self::Error> {
        validate_path(&request.path)?;
        self.ensure_root().await?;

        let size = request.content.len() as u64;
        self.op.write(&request.path, request.content).await?;

        tracing::debug!(path = %request.path, size, root = %self.root.display(), "Stored file");

        Ok(FileMetadata {
            path: request.path,
            content_type: request.content_type,
            size,
        })
    }

    async fn download_file(&self, path: &str) -> Result<Vec<u8>, Self::Error> {
        validate_path(path)?;
        self.op.read(path).await.map(|buf| buf.to_vec()).map_err(|e| {
            if e.kind() == opendal::ErrorKind::NotFound {
                FileStorageError::NotFound(path.to_owned())
            } else {
                FileStorageError::StorageError(e.to_string())
            }
        })
    }

    async fn delete_file(&self, path: &str) -> Result<bool, Self::Error> {
        validate_path(path)?;
        if !self.op.exists(path).await? {
            return Ok(false);
        }

        self.op.delete(path).await?;
        tracing::debug!(path, "Deleted file");
        Ok(true)
    }

    async fn file_exists(&self, path: &str) -> Result<bool, Self::Error> {
        validate_path(path)?;
        Ok(self.op.exists(path).await?)
    }
}
