//! `GET /feed?limit=&offset=`.

use axum::{
    Json,
    extract::{Query, State, rejection::QueryRejection},
};

use super::AppState;
use super::types::{FeedQuery, FeedResponse};
use crate::database::SqlStorage;
use crate::feed::{FeedError, feed_params, fetch_feed};
use crate::storage::FileStorage;

pub(super) async fn feed<S, F>(
    State(state): State<AppState<S, F>>,
    query: Result<Query<FeedQuery>, QueryRejection>,
) -> Result<Json<FeedResponse>, FeedError>
where
    S: SqlStorage,
    F: FileStorage,
{
    let Query(query) = query.map_err(|rejection| FeedError::InvalidQuery(rejection.body_text()))?;
    let params = feed_params(query.limit, query.offset)?;

    let (posts, total) = fetch_feed(&state.sql_storage, params).await?;

    Ok(Json(FeedResponse {
        posts: posts.into_iter().map(Into::into).collect(),
        limit: params.limit,
        offset: params.offset,
        total,
    }))
}
