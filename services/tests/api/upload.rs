use axum::http::StatusCode;
use axum_test::multipart::{MultipartForm, Part};
use serde_json::json;
use snapfeed_services::{
    api::types::{ErrorResponse, UploadResponse},
    database::MockSqlStorage,
};

use crate::common::{PNG_BYTES, file_form, png_form, spawn_app, spawn_app_with_max_size};

#[tokio::test]
async fn test_upload_stores_file_and_metadata() {
    let app = spawn_app(MockSqlStorage::new()).await;

    let response = app
        .server
        .post("/upload")
        .multipart(png_form(Some("  sunset at the pier  ")))
        .await;

    response.assert_status(StatusCode::CREATED);
    let body: UploadResponse = response.json();
    assert_eq!(body.message, "File uploaded successfully");

    let post = body.post;
    assert_eq!(post.caption.as_deref(), Some("sunset at the pier"));
    assert_eq!(post.file_type, "image/png");
    assert!(post.file_name.ends_with(".png"));
    assert_eq!(post.url, format!("/uploads/{}", post.file_name));
    assert!(uuid::Uuid::parse_str(&post.id).is_ok());

    assert_eq!(app.stored_files(), vec![post.file_name.clone()]);
    assert_eq!(std::fs::read(app.stored_path(&post.file_name)).unwrap(), PNG_BYTES);

    let rows = app.sql.posts();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].id.to_string(), post.id);
    assert_eq!(rows[0].file_name, post.file_name);
}

#[tokio::test]
async fn test_uploaded_file_is_served_at_its_url() {
    let app = spawn_app(MockSqlStorage::new()).await;

    let body: UploadResponse = app.server.post("/upload").multipart(png_form(None)).await.json();
    assert_eq!(body.post.caption, None);

    let served = app.server.get(&body.post.url).await;
    served.assert_status_ok();
    assert_eq!(served.as_bytes().as_ref(), PNG_BYTES);
}

#[tokio::test]
async fn test_missing_upload_is_not_found() {
    let app = spawn_app(MockSqlStorage::new()).await;

    let response = app.server.get("/uploads/does-not-exist.png").await;
    response.assert_status(StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_disallowed_type_is_rejected_without_side_effects() {
    let app = spawn_app(MockSqlStorage::new()).await;

    let response = app
        .server
        .post("/upload")
        .multipart(file_form(b"just some text", "notes.txt", "text/plain"))
        .await;

    response.assert_status(StatusCode::UNSUPPORTED_MEDIA_TYPE);
    let body: ErrorResponse = response.json();
    assert_eq!(body.error, "unsupported_media_type");
    assert_eq!(
        body.message,
        "Unsupported file type 'text/plain'. Allowed types: image/jpeg, image/png, image/webp"
    );
    assert!(app.stored_files().is_empty());
    assert!(app.sql.is_empty());
}

#[tokio::test]
async fn test_content_type_is_matched_case_insensitively() {
    let app = spawn_app(MockSqlStorage::new()).await;

    let response = app
        .server
        .post("/upload")
        .multipart(file_form(PNG_BYTES, "photo.webp", "IMAGE/WEBP"))
        .await;

    response.assert_status(StatusCode::CREATED);
    let body: UploadResponse = response.json();
    assert_eq!(body.post.file_type, "image/webp");
}

#[tokio::test]
async fn test_empty_file_is_rejected() {
    let app = spawn_app(MockSqlStorage::new()).await;

    let response = app
        .server
        .post("/upload")
        .multipart(file_form(b"", "empty.png", "image/png"))
        .await;

    response.assert_status(StatusCode::BAD_REQUEST);
    response.assert_json(&json!({
        "error": "empty_file",
        "message": "Uploaded file is empty."
    }));
    assert!(app.stored_files().is_empty());
    assert!(app.sql.is_empty());
}

#[tokio::test]
async fn test_file_over_limit_is_rejected() {
    let app = spawn_app_with_max_size(MockSqlStorage::new(), 16).await;

    let response = app
        .server
        .post("/upload")
        .multipart(file_form(&[7u8; 17], "big.jpg", "image/jpeg"))
        .await;

    response.assert_status(StatusCode::PAYLOAD_TOO_LARGE);
    response.assert_json(&json!({
        "error": "payload_too_large",
        "message": "File exceeds max allowed size of 16 bytes."
    }));
    assert!(app.stored_files().is_empty());
    assert!(app.sql.is_empty());
}

#[tokio::test]
async fn test_file_at_limit_is_accepted() {
    let app = spawn_app_with_max_size(MockSqlStorage::new(), 16).await;

    let response = app
        .server
        .post("/upload")
        .multipart(file_form(&[7u8; 16], "exact.jpg", "image/jpeg"))
        .await;

    response.assert_status(StatusCode::CREATED);
    assert_eq!(app.sql.len(), 1);
}

#[tokio::test]
async fn test_oversized_file_is_cut_off_while_streaming() {
    let app = spawn_app_with_max_size(MockSqlStorage::new(), 16).await;

    let response = app
        .server
        .post("/upload")
        .multipart(file_form(&vec![1u8; 256 * 1024], "huge.png", "image/png"))
        .await;

    response.assert_status(StatusCode::PAYLOAD_TOO_LARGE);
    let body: ErrorResponse = response.json();
    assert_eq!(body.error, "payload_too_large");
    assert!(app.stored_files().is_empty());
}

#[tokio::test]
async fn test_request_over_body_limit_is_rejected() {
    let app = spawn_app_with_max_size(MockSqlStorage::new(), 16).await;

    // The file itself fits; the caption alone pushes the body past the
    // ceiling plus form overhead.
    let form = MultipartForm::new()
        .add_text("caption", "a".repeat(80 * 1024))
        .add_part(
            "file",
            Part::bytes(b"tiny".to_vec())
                .file_name("tiny.png")
                .mime_type("image/png"),
        );

    let response = app.server.post("/upload").multipart(form).await;

    response.assert_status(StatusCode::PAYLOAD_TOO_LARGE);
    response.assert_json(&json!({
        "error": "payload_too_large",
        "message": "File exceeds max allowed size of 16 bytes."
    }));
    assert!(app.stored_files().is_empty());
    assert!(app.sql.is_empty());
}

#[tokio::test]
async fn test_missing_file_part_is_bad_request() {
    let app = spawn_app(MockSqlStorage::new()).await;

    let response = app
        .server
        .post("/upload")
        .multipart(MultipartForm::new().add_text("caption", "no file here"))
        .await;

    response.assert_status(StatusCode::BAD_REQUEST);
    let body: ErrorResponse = response.json();
    assert_eq!(body.error, "bad_request");
    assert!(app.sql.is_empty());
}

#[tokio::test]
async fn test_non_multipart_body_is_bad_request() {
    let app = spawn_app(MockSqlStorage::new()).await;

    let response = app
        .server
        .post("/upload")
        .json(&json!({ "file": "not a form" }))
        .await;

    response.assert_status(StatusCode::BAD_REQUEST);
    let body: ErrorResponse = response.json();
    assert_eq!(body.error, "bad_request");
}

#[tokio::test]
async fn test_failed_insert_removes_stored_file() {
    let app = spawn_app(MockSqlStorage::failing_inserts()).await;

    let response = app.server.post("/upload").multipart(png_form(None)).await;

    response.assert_status(StatusCode::INTERNAL_SERVER_ERROR);
    let body: ErrorResponse = response.json();
    assert_eq!(body.error, "internal_error");
    assert_eq!(body.message, "Failed to save upload metadata.");
    assert!(!body.message.contains("MockSqlStorage"));
    assert!(app.stored_files().is_empty());
    assert!(app.sql.is_empty());
}

#[tokio::test]
async fn test_each_upload_gets_a_distinct_name() {
    let app = spawn_app(MockSqlStorage::new()).await;

    let first: UploadResponse = app.server.post("/upload").multipart(png_form(None)).await.json();
    let second: UploadResponse = app.server.post("/upload").multipart(png_form(None)).await.json();

    assert_ne!(first.post.file_name, second.post.file_name);
    assert_eq!(app.stored_files().len(), 2);
    assert_eq!(app.sql.len(), 2);
}
