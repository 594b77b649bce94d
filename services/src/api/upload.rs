//! `POST /upload`: multipart form with a `file` part and optional `caption`.

use axum::{
    Json,
    extract::{
        Multipart, State,
        multipart::{Field, MultipartError, MultipartRejection},
    },
    http::StatusCode,
};

use super::AppState;
use super::types::UploadResponse;
use crate::database::SqlStorage;
use crate::storage::FileStorage;
use crate::uploads::{
    UploadError, UploadInput, normalize_content_type, store_upload, validate_content_type,
};

const FILE_FIELD: &str = "file";
const CAPTION_FIELD: &str = "caption";

#[tracing::instrument(skip_all)]
pub(super) async fn upload<S, F>(
    State(state): State<AppState<S, F>>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<(StatusCode, Json<UploadResponse>), UploadError>
where
    S: SqlStorage,
    F: FileStorage,
{
    let mut multipart = multipart.map_err(|rejection| {
        tracing::warn!(%rejection, "Rejected upload form");
        UploadError::InvalidForm(rejection.body_text())
    })?;

    let max_size = state.config.max_upload_size_bytes();
    let mut file: Option<UploadInput> = None;
    let mut caption: Option<String> = None;

    while let Some(mut field) = multipart
        .next_field()
        .await
        .map_err(|e| form_error(&e, max_size))?
    {
        let name = field.name().map(str::to_owned);
        match name.as_deref() {
            Some(FILE_FIELD) if file.is_none() => {
                let original_filename = field.file_name().map(str::to_owned);
                let content_type = normalize_content_type(field.content_type());

                // Reject before reading any of the body.
                validate_content_type(&content_type, state.config.allowed_content_types())?;

                let content = read_capped(&mut field, max_size).await?;
                file = Some(UploadInput {
                    original_filename,
                    content_type,
                    content,
                    caption: None,
                });
            }
            Some(CAPTION_FIELD) => {
                caption = Some(field.text().await.map_err(|e| form_error(&e, max_size))?);
            }
            _ => {}
        }
    }

    let Some(mut input) = file else {
        return Err(UploadError::InvalidForm(format!(
            "Missing '{FILE_FIELD}' field in multipart form."
        )));
    };
    input.caption = caption;

    tracing::debug!(
        content_type = %input.content_type,
        size = input.content.len(),
        "Received upload"
    );

    let post = store_upload(
        &state.sql_storage,
        &state.file_storage,
        &state.config,
        input,
    )
    .await?;

    Ok((
        StatusCode::CREATED,
        Json(UploadResponse {
            message: "File uploaded successfully".to_owned(),
            post: post.into(),
        }),
    ))
}

/// Buffer a file part, giving up as soon as it exceeds `max_size`.
async fn read_capped(field: &mut Field<'_>, max_size: u64) -> Result<Vec<u8>, UploadError> {
    let mut content = Vec::new();
    while let Some(chunk) = field.chunk().await.map_err(|e| form_error(&e, max_size))? {
        if (content.len() + chunk.len()) as u64 > max_size {
            return Err(UploadError::TooLarge { max_size });
        }
        content.extend_from_slice(&chunk);
    }
    Ok(content)
}

fn form_error(err: &MultipartError, max_size: u64) -> UploadError {
    if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
        UploadError::TooLarge { max_size }
    } else {
        tracing::warn!(error = %err, "Malformed multipart form");
        UploadError::InvalidForm(err.body_text())
    }
}
