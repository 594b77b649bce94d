//! Snapfeed HTTP service.
//!
//! Image uploads are stored on local disk with metadata in `PostgreSQL`, and
//! listed through a paginated newest-first feed.
//!
//! [`routes`] assembles the full router over any [`SqlStorage`] and
//! [`FileStorage`] pair, so tests run against in-memory backends.

use crate::api::AppState;
use crate::config::Config;
use crate::database::SqlStorage;
use crate::storage::FileStorage;
use axum::{
    Router,
    extract::{Request, State},
    http::{HeaderName, HeaderValue, StatusCode, header},
    response::{IntoResponse, Response},
    routing::{any, get},
};
use opentelemetry::{global, propagation::Extractor};
use snapfeed_utils::version_info::{RuntimeEnv, format_version_for_runtime_env};
use tower_http::{services::ServeDir, trace::TraceLayer};
use tracing_opentelemetry::OpenTelemetrySpanExt as _;

pub mod api;
pub mod config;
pub mod database;
pub mod feed;
pub mod storage;
pub mod telemetry;
pub mod uploads;

struct HeaderExtractor<'a>(&'a axum::http::HeaderMap);

impl<'a> Extractor for HeaderExtractor<'a> {
    fn get(&self, key: &str) -> Option<&str> {
        self.0.get(key).and_then(|v| v.to_str().ok())
    }

    fn keys(&self) -> Vec<&str> {
        self.0.keys().map(|k| k.as_str()).collect()
    }
}

/// Builds the full application router.
///
/// Stored files are served read-only from the configured upload directory
/// under [`config::UPLOADS_URL_PREFIX`].
pub async fn routes<S, F>(sql_storage: S, file_storage: F, config: Config) -> Router
where
    S: SqlStorage,
    F: FileStorage,
{
    let uploads = ServeDir::new(config.upload_dir());
    let api_routes = api::routes::<S, F>(&config);
    let state = AppState::new(sql_storage, file_storage, config);

    Router::new()
        .route("/is-health", get(health_check::<S, F>))
        .merge(api_routes)
        .nest_service(crate::config::UPLOADS_URL_PREFIX, uploads)
        .fallback(any(catch_all))
        .layer(
            TraceLayer::new_for_http().make_span_with(|request: &Request<_>| {
                let parent_context = global::get_text_map_propagator(|propagator| {
                    propagator.extract(&HeaderExtractor(request.headers()))
                });

                let span = tracing::info_span!(
                    "http_request",
                    http_request.method = ?request.method(),
                    http_request.uri = ?request.uri(),
                    http_request.version = ?request.version(),
                    http_request.user_agent = ?request.headers().get(header::USER_AGENT),
                );

                span.set_parent(parent_context);

                span
            }),
        )
        .with_state(state)
}

async fn health_check<S, F>(State(state): State<AppState<S, F>>) -> Response
where
    S: SqlStorage,
    F: FileStorage,
{
    let mut response = if state.sql_storage.is_connected().await {
        (StatusCode::OK, "OK").into_response()
    } else {
        (StatusCode::BAD_GATEWAY, "502").into_response()
    };

    let env_value = state.config.environment().to_string();
    if let Ok(value) = HeaderValue::from_str(&env_value) {
        response
            .headers_mut()
            .insert(HeaderName::from_static("x-service-env"), value);
    }

    let runtime_env: RuntimeEnv = state.config.environment().into();
    let version_value = format_version_for_runtime_env(runtime_env);
    match HeaderValue::from_str(&version_value) {
        Ok(value) => {
            response
                .headers_mut()
                .insert(HeaderName::from_static("x-service-version"), value);
        }
        Err(e) => tracing::warn!(error = %e, version = %version_value, "Invalid version header"),
    }

    response
}

async fn catch_all() -> impl IntoResponse {
    (StatusCode::NOT_FOUND, "nothing to see here")
}
