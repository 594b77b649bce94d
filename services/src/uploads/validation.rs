//! Checks that run before anything touches disk or database.

use super::error::UploadError;
use crate::config::UPLOADS_URL_PREFIX;
use std::path::Path;
use uuid::Uuid;

/// Longest extension (dot included) carried over into a storage name.
const MAX_EXTENSION_LEN: usize = 10;

/// Trimmed, lowercased content type; empty when the client sent none.
pub fn normalize_content_type(content_type: Option<&str>) -> String {
    content_type.unwrap_or_default().trim().to_ascii_lowercase()
}

pub fn validate_content_type(content_type: &str, allowed: &[&str]) -> Result<(), UploadError> {
    if allowed.contains(&content_type) {
        return Ok(());
    }

    let mut sorted = allowed.to_vec();
    sorted.sort_unstable();

    Err(UploadError::UnsupportedType {
        content_type: if content_type.is_empty() {
            "unknown".to_owned()
        } else {
            content_type.to_owned()
        },
        allowed: sorted.join(", "),
    })
}

pub fn validate_size(len: u64, max_size: u64) -> Result<(), UploadError> {
    if len == 0 {
        return Err(UploadError::EmptyFile);
    }
    if len > max_size {
        return Err(UploadError::TooLarge { max_size });
    }
    Ok(())
}

/// Random storage name keeping only a short, plain extension of the
/// client's filename, e.g. `3f2a…9c.png`.
pub fn build_storage_name(original_filename: Option<&str>) -> String {
    let stem = Uuid::new_v4().simple().to_string();
    match storage_extension(original_filename) {
        Some(ext) => format!("{stem}.{ext}"),
        None => stem,
    }
}

fn storage_extension(original_filename: Option<&str>) -> Option<String> {
    // Browsers on Windows may send the full client path.
    let name = original_filename?.rsplit(['/', '\\']).next()?;
    let ext = Path::new(name).extension()?.to_str()?;

    // `ext` excludes the dot
    let fits = !ext.is_empty() && ext.len() < MAX_EXTENSION_LEN;
    let plain = ext.chars().all(|c| c.is_ascii_alphanumeric());
    (fits && plain).then(|| ext.to_ascii_lowercase())
}

/// Public URL under which a stored file is served.
pub fn public_url(file_name: &str) -> String {
    format!("{UPLOADS_URL_PREFIX}/{file_name}")
}
