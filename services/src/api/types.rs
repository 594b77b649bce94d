//! Request and response bodies of the public API.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::database::PostRow;

/// Error response for API endpoints.
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Machine-readable error kind, e.g. `payload_too_large`.
    pub error: String,
    /// Human-readable detail.
    pub message: String,
}

impl ErrorResponse {
    pub fn new(error: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            message: message.into(),
        }
    }
}

/// A post as returned to clients.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PostItem {
    pub id: String,
    pub caption: Option<String>,
    /// Public URL of the stored image, relative to the service root.
    pub url: String,
    pub file_type: String,
    pub file_name: String,
    /// RFC 3339 timestamp.
    pub created_at: DateTime<Utc>,
}

impl From<PostRow> for PostItem {
    fn from(row: PostRow) -> Self {
        Self {
            id: row.id.to_string(),
            caption: row.caption,
            url: row.url,
            file_type: row.file_type,
            file_name: row.file_name,
            created_at: row.created_at,
        }
    }
}

/// Response for `POST /upload`.
#[derive(Debug, Serialize, Deserialize)]
pub struct UploadResponse {
    pub message: String,
    pub post: PostItem,
}

/// Response for `GET /feed`.
#[derive(Debug, Serialize, Deserialize)]
pub struct FeedResponse {
    pub posts: Vec<PostItem>,
    pub limit: i64,
    pub offset: i64,
    /// Number of posts overall, not just in this page.
    pub total: i64,
}

/// Query string of `GET /feed`. Absent values take the defaults.
#[derive(Debug, Default, Deserialize)]
pub struct FeedQuery {
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}
