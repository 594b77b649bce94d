//! Public HTTP API: image upload and feed.

use axum::{
    Router,
    extract::DefaultBodyLimit,
    routing::{get, post},
};
use std::sync::Arc;

use crate::config::Config;
use crate::database::SqlStorage;
use crate::storage::FileStorage;

mod feed;
pub mod types;
mod upload;

/// Room for multipart boundaries, part headers and the caption on top of
/// the file itself.
const FORM_OVERHEAD_BYTES: usize = 64 * 1024;

/// Shared state handed to every handler.
#[derive(Clone)]
pub struct AppState<S, F> {
    pub sql_storage: S,
    pub file_storage: F,
    pub config: Arc<Config>,
}

impl<S, F> AppState<S, F> {
    pub fn new(sql_storage: S, file_storage: F, config: Config) -> Self {
        Self {
            sql_storage,
            file_storage,
            config: Arc::new(config),
        }
    }
}

/// Creates the router for `/upload` and `/feed`.
///
/// The upload route gets a body limit just above the configured maximum
/// file size so oversized requests are cut off while streaming.
pub fn routes<S, F>(config: &Config) -> Router<AppState<S, F>>
where
    S: SqlStorage,
    F: FileStorage,
{
    let body_limit = usize::try_from(config.max_upload_size_bytes())
        .unwrap_or(usize::MAX)
        .saturating_add(FORM_OVERHEAD_BYTES);

    Router::new()
        .route(
            "/upload",
            post(upload::upload::<S, F>).layer(DefaultBodyLimit::max(body_limit)),
        )
        .route("/feed", get(feed::feed::<S, F>))
}
