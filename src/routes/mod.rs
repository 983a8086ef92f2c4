//! Router assembly.
//!
//! SYSTEM CONTEXT
//! ==============
//! This module binds the agent API, the video proxy and the health check
//! under a single Axum router. When a static directory is configured, the
//! built canvas frontend is served for every other path.

pub mod agent;
pub mod media;

use std::path::PathBuf;

use axum::Router;
use axum::http::StatusCode;
use axum::routing::get;
use tower_http::compression::CompressionLayer;
use tower_http::compression::predicate::{DefaultPredicate, NotForContentType, Predicate};
use tower_http::cors::{Any, CorsLayer};
use tower_http::services::{ServeDir, ServeFile};
use tower_http::trace::TraceLayer;

use crate::services::media::VIDEO_PROXY_PATH;
use crate::state::AppState;

fn api_routes(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route(
            "/api/agent/messages",
            get(agent::list_messages)
                .post(agent::send_message)
                .delete(agent::clear_messages),
        )
        .route(VIDEO_PROXY_PATH, get(media::video))
        .route("/healthz", get(healthz))
        .layer(cors)
        .with_state(state)
}

/// Full application router: API routes plus the optional static frontend.
pub fn app(state: AppState, static_dir: Option<PathBuf>) -> Router {
    let router = match static_dir {
        Some(dir) => {
            let index = dir.join("index.html");
            let frontend = ServeDir::new(&dir)
                .append_index_html_on_directories(true)
                .fallback(ServeFile::new(index));
            api_routes(state).fallback_service(frontend)
        }
        None => api_routes(state),
    };
    // Video is already compressed.
    let compress = DefaultPredicate::new().and(NotForContentType::const_new("video/"));
    router
        .layer(CompressionLayer::new().compress_when(compress))
        .layer(TraceLayer::new_for_http())
}

async fn healthz() -> (StatusCode, &'static str) {
    (StatusCode::OK, "ok")
}
