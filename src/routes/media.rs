//! Media routes.

use axum::body::Body;
use axum::extract::{Query, State};
use axum::http::{StatusCode, header};
use axum::response::Response;
use serde::Deserialize;

use super::agent::{ApiError, to_api_error};
use crate::services::agent::AgentError;
use crate::services::media;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct VideoQuery {
    pub uri: String,
}

/// `GET /api/media/video?uri=...`: stream a generated video from the provider.
pub async fn video(State(state): State<AppState>, Query(query): Query<VideoQuery>) -> Result<Response, ApiError> {
    let upstream = media::fetch_video(&state, &query.uri)
        .await
        .map_err(to_api_error)?;

    let mut builder = Response::builder()
        .status(StatusCode::OK)
        .header(header::CACHE_CONTROL, "private, max-age=3600");
    for name in [header::CONTENT_TYPE, header::CONTENT_LENGTH] {
        if let Some(value) = upstream.headers().get(&name) {
            builder = builder.header(name, value.clone());
        }
    }
    builder
        .body(Body::from_stream(upstream.bytes_stream()))
        .map_err(|e| to_api_error(AgentError::Internal(e.to_string())))
}

#[cfg(test)]
#[path = "media_test.rs"]
mod tests;
