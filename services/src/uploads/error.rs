//! Upload failures and their HTTP rendering.

use crate::api::types::ErrorResponse;
use axum::{
    Json,
    response::{IntoResponse, Response},
};
use http::StatusCode;

/// Everything that can stop an upload.
///
/// `Storage` and `Persistence` deliberately carry no detail: the cause is
/// logged where it happens and the client only sees a generic message.
#[derive(Debug, thiserror::Error)]
pub enum UploadError {
    #[error("Unsupported file type '{content_type}'. Allowed types: {allowed}")]
    UnsupportedType {
        content_type: String,
        allowed: String,
    },

    #[error("Uploaded file is empty.")]
    EmptyFile,

    #[error("File exceeds max allowed size of {max_size} bytes.")]
    TooLarge { max_size: u64 },

    #[error("{0}")]
    InvalidForm(String),

    #[error("Failed to store uploaded file.")]
    Storage,

    #[error("Failed to save upload metadata.")]
    Persistence,
}

impl UploadError {
    pub fn status(&self) -> StatusCode {
        match self {
            Self::UnsupportedType { .. } => StatusCode::UNSUPPORTED_MEDIA_TYPE,
            Self::EmptyFile | Self::InvalidForm(_) => StatusCode::BAD_REQUEST,
            Self::TooLarge { .. } => StatusCode::PAYLOAD_TOO_LARGE,
            Self::Storage | Self::Persistence => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Machine-readable kind placed in the `error` field.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::UnsupportedType { .. } => "unsupported_media_type",
            Self::EmptyFile => "empty_file",
            Self::TooLarge { .. } => "payload_too_large",
            Self::InvalidForm(_) => "bad_request",
            Self::Storage | Self::Persistence => "internal_error",
        }
    }
}

impl IntoResponse for UploadError {
    fn into_response(self) -> Response {
        let body = ErrorResponse::new(self.kind(), self.to_string());
        (self.status(), Json(body)).into_response()
    }
}
