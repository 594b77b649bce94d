//! Validate, write the blob, record the metadata.

use super::error::UploadError;
use super::validation::{build_storage_name, public_url, validate_content_type, validate_size};
use crate::config::Config;
use crate::database::{PostInsert, PostRow, SqlStorage};
use crate::storage::{FileStorage, FileUploadRequest};
use chrono::Utc;
use uuid::Uuid;

/// One received file plus its caption.
#[derive(Debug, Clone)]
pub struct UploadInput {
    pub original_filename: Option<String>,
    /// Already normalized with `normalize_content_type`.
    pub content_type: String,
    pub content: Vec<u8>,
    pub caption: Option<String>,
}

/// Store one upload.
///
/// Nothing is written unless validation passes. The blob is written before
/// the row; if the insert fails the blob is removed again (best effort) and
/// a generic [`UploadError::Persistence`] is returned.
pub async fn store_upload<S, F>(
    sql_storage: &S,
    file_storage: &F,
    config: &Config,
    input: UploadInput,
) -> Result<PostRow, UploadError>
where
    S: SqlStorage,
    F: FileStorage,
{
    let UploadInput {
        original_filename,
        content_type,
        content,
        caption,
    } = input;

    validate_content_type(&content_type, config.allowed_content_types())?;
    validate_size(content.len() as u64, config.max_upload_size_bytes())?;

    let file_name = build_storage_name(original_filename.as_deref());
    let size = content.len();

    file_storage
        .upload_file(FileUploadRequest::new(
            file_name.clone(),
            content,
            content_type.clone(),
        ))
        .await
        .map_err(|e| {
            tracing::error!(error = %e, file_name = %file_name, "Failed to write uploaded file");
            UploadError::Storage
        })?;

    let record = PostInsert {
        id: Uuid::new_v4(),
        caption: caption
            .map(|c| c.trim().to_owned())
            .filter(|c| !c.is_empty()),
        url: public_url(&file_name),
        file_type: content_type,
        file_name: file_name.clone(),
        created_at: Utc::now(),
    };

    match sql_storage.posts_insert(record).await {
        Ok(post) => {
            tracing::info!(id = %post.id, file_name = %post.file_name, size, "Upload stored");
            Ok(post)
        }
        Err(e) => {
            tracing::error!(
                error = ?e,
                file_name = %file_name,
                "Failed to persist upload metadata"
            );
            if let Err(cleanup) = file_storage.delete_file(&file_name).await {
                tracing::error!(
                    error = %cleanup,
                    file_name = %file_name,
                    "Failed to remove orphaned upload"
                );
            }
            Err(UploadError::Persistence)
        }
    }
}
