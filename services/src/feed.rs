//! Paginated feed of stored posts, newest first.

use crate::api::types::ErrorResponse;
use crate::database::{FeedParams, PostRow, SqlStorage};
use axum::{
    Json,
    response::{IntoResponse, Response},
};
use http::StatusCode;

pub const DEFAULT_LIMIT: i64 = 20;
pub const MAX_LIMIT: i64 = 100;

#[derive(Debug, thiserror::Error)]
pub enum FeedError {
    #[error("{0}")]
    InvalidQuery(String),

    #[error("Failed to fetch feed.")]
    Query,
}

impl IntoResponse for FeedError {
    fn into_response(self) -> Response {
        let (status, kind) = match self {
            Self::InvalidQuery(_) => (StatusCode::BAD_REQUEST, "bad_request"),
            Self::Query => (StatusCode::INTERNAL_SERVER_ERROR, "internal_error"),
        };
        (status, Json(ErrorResponse::new(kind, self.to_string()))).into_response()
    }
}

/// Apply defaults and reject windows outside `1..=MAX_LIMIT` / `offset >= 0`.
pub fn feed_params(limit: Option<i64>, offset: Option<i64>) -> Result<FeedParams, FeedError> {
    let limit = limit.unwrap_or(DEFAULT_LIMIT);
    let offset = offset.unwrap_or(0);

    if !(1..=MAX_LIMIT).contains(&limit) {
        return Err(FeedError::InvalidQuery(format!(
            "limit must be between 1 and {MAX_LIMIT}, got {limit}"
        )));
    }
    if offset < 0 {
        return Err(FeedError::InvalidQuery(format!(
            "offset must be zero or greater, got {offset}"
        )));
    }

    Ok(FeedParams { limit, offset })
}

/// One page of posts plus the total count of all posts.
pub async fn fetch_feed<S: SqlStorage>(
    sql_storage: &S,
    params: FeedParams,
) -> Result<(Vec<PostRow>, i64), FeedError> {
    let posts = sql_storage.posts_list(params).await.map_err(|e| {
        tracing::error!(error = ?e, ?params, "Failed to list posts");
        FeedError::Query
    })?;
    let total = sql_storage.posts_count().await.map_err(|e| {
        tracing::error!(error = ?e, "Failed to count posts");
        FeedError::Query
    })?;

    Ok((posts, total))
}
