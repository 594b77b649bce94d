use axum::http::StatusCode;
use snapfeed_services::{
    api::types::{ErrorResponse, FeedResponse, UploadResponse},
    database::MockSqlStorage,
};

use crate::common::{png_form, spawn_app};

#[tokio::test]
async fn test_empty_feed_uses_defaults() {
    let app = spawn_app(MockSqlStorage::new()).await;

    let response = app.server.get("/feed").await;

    response.assert_status_ok();
    let body: FeedResponse = response.json();
    assert!(body.posts.is_empty());
    assert_eq!(body.limit, 20);
    assert_eq!(body.offset, 0);
    assert_eq!(body.total, 0);
}

#[tokio::test]
async fn test_feed_returns_newest_first() {
    let app = spawn_app(MockSqlStorage::new()).await;

    let first: UploadResponse = app
        .server
        .post("/upload")
        .multipart(png_form(Some("first")))
        .await
        .json();
    let second: UploadResponse = app
        .server
        .post("/upload")
        .multipart(png_form(Some("second")))
        .await
        .json();

    let page: FeedResponse = app.server.get("/feed?limit=1").await.json();
    assert_eq!(page.total, 2);
    assert_eq!(page.limit, 1);
    assert_eq!(page.posts.len(), 1);
    assert_eq!(page.posts[0].id, second.post.id);

    let next: FeedResponse = app.server.get("/feed?limit=1&offset=1").await.json();
    assert_eq!(next.total, 2);
    assert_eq!(next.offset, 1);
    assert_eq!(next.posts[0].id, first.post.id);
    assert_eq!(next.posts[0].caption.as_deref(), Some("first"));

    let past_end: FeedResponse = app.server.get("/feed?offset=5").await.json();
    assert!(past_end.posts.is_empty());
    assert_eq!(past_end.total, 2);
}

#[tokio::test]
async fn test_invalid_feed_queries_are_rejected() {
    let app = spawn_app(MockSqlStorage::new()).await;

    for query in ["limit=0", "limit=101", "offset=-1", "limit=abc", "offset=1.5"] {
        let response = app.server.get(&format!("/feed?{query}")).await;
        response.assert_status(StatusCode::BAD_REQUEST);
        let body: ErrorResponse = response.json();
        assert_eq!(body.error, "bad_request", "query {query}");
    }
}

#[tokio::test]
async fn test_feed_failure_is_generic() {
    let app = spawn_app(MockSqlStorage::failing_reads()).await;

    let response = app.server.get("/feed").await;

    response.assert_status(StatusCode::INTERNAL_SERVER_ERROR);
    let body: ErrorResponse = response.json();
    assert_eq!(body.error, "internal_error");
    assert_eq!(body.message, "Failed to fetch feed.");
}
