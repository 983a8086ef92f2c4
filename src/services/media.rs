//! Media service: authenticated downloads of generated videos.
//!
//! Provider video URIs only open with the API key, so video assets point at
//! the server's proxy route instead and the key never leaves the process.

use tracing::info;

use super::agent::AgentError;
use crate::state::AppState;

/// Route that streams a provider video to the browser.
pub const VIDEO_PROXY_PATH: &str = "/api/media/video";

// Only the path and query of this URL are kept.
const PROXY_ORIGIN: &str = "http://cineflow.local";

/// Asset content URL for a provider video URI: the proxy path with the URI
/// form-encoded as `uri`.
///
/// # Errors
///
/// Returns [`AgentError::Internal`] if the proxy URL cannot be built.
pub fn video_content_url(uri: &str) -> Result<String, AgentError> {
    let url = reqwest::Url::parse_with_params(&format!("{PROXY_ORIGIN}{VIDEO_PROXY_PATH}"), [("uri", uri)])
        .map_err(|e| AgentError::Internal(e.to_string()))?;
    Ok(format!("{}?{}", url.path(), url.query().unwrap_or_default()))
}

/// Open the provider download for `uri`.
///
/// # Errors
///
/// Returns [`AgentError::MediaNotConfigured`] without a media client, or the
/// client's error for untrusted URIs and failed downloads.
pub async fn fetch_video(state: &AppState, uri: &str) -> Result<reqwest::Response, AgentError> {
    let media = state.media.as_ref().ok_or(AgentError::MediaNotConfigured)?;
    let response = media.fetch_video(uri).await?;
    info!(status = response.status().as_u16(), "media: proxying video");
    Ok(response)
}

#[cfg(test)]
#[path = "media_test.rs"]
mod tests;
