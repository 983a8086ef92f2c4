//! LLM configuration parsed from environment variables.

use super::types::LlmError;

pub const DEFAULT_API_KEY_ENV: &str = "API_KEY";
pub const DEFAULT_CHAT_MODEL: &str = "gemini-3-pro-preview";
pub const DEFAULT_IMAGE_MODEL: &str = "gemini-2.5-flash-image";
pub const DEFAULT_VIDEO_MODEL: &str = "veo-3.1-fast-generate-preview";
pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";
pub const DEFAULT_LLM_REQUEST_TIMEOUT_SECS: u64 = 120;
pub const DEFAULT_LLM_CONNECT_TIMEOUT_SECS: u64 = 10;
pub const DEFAULT_VIDEO_POLL_INTERVAL_SECS: u64 = 5;
pub const DEFAULT_VIDEO_MAX_POLLS: u32 = 60;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LlmTimeouts {
    pub request_secs: u64,
    pub connect_secs: u64,
}

/// How long-running video operations are polled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VideoPolling {
    pub interval_secs: u64,
    pub max_polls: u32,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LlmConfig {
    pub api_key: String,
    pub model: String,
    pub image_model: String,
    pub video_model: String,
    pub base_url: String,
    pub timeouts: LlmTimeouts,
    pub video_polling: VideoPolling,
}

impl LlmConfig {
    /// Build typed LLM config from environment variables.
    ///
    /// Required:
    /// - the key variable named by `LLM_API_KEY_ENV` (default `API_KEY`)
    ///
    /// Optional:
    /// - `LLM_MODEL`, `LLM_IMAGE_MODEL`, `LLM_VIDEO_MODEL`
    /// - `LLM_BASE_URL`: default Generative Language API base URL
    /// - `LLM_REQUEST_TIMEOUT_SECS`: default 120
    /// - `LLM_CONNECT_TIMEOUT_SECS`: default 10
    /// - `LLM_VIDEO_POLL_INTERVAL_SECS`: default 5
    /// - `LLM_VIDEO_MAX_POLLS`: default 60, must be non-zero
    ///
    /// # Errors
    ///
    /// Returns [`LlmError::MissingApiKey`] when the key is absent or empty and
    /// [`LlmError::ConfigParse`] when a numeric setting is malformed.
    pub fn from_env() -> Result<Self, LlmError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as [`LlmConfig::from_env`] but reads through `lookup`.
    ///
    /// # Errors
    ///
    /// See [`LlmConfig::from_env`].
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, LlmError> {
        let key_var = lookup("LLM_API_KEY_ENV").unwrap_or_else(|| DEFAULT_API_KEY_ENV.to_string());
        let api_key = lookup(&key_var)
            .filter(|key| !key.trim().is_empty())
            .ok_or_else(|| LlmError::MissingApiKey { var: key_var.clone() })?;

        let model = lookup("LLM_MODEL").unwrap_or_else(|| DEFAULT_CHAT_MODEL.to_string());
        let image_model = lookup("LLM_IMAGE_MODEL").unwrap_or_else(|| DEFAULT_IMAGE_MODEL.to_string());
        let video_model = lookup("LLM_VIDEO_MODEL").unwrap_or_else(|| DEFAULT_VIDEO_MODEL.to_string());
        let base_url = lookup("LLM_BASE_URL")
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string())
            .trim_end_matches('/')
            .to_string();
        let timeouts = LlmTimeouts {
            request_secs: parse_or(&lookup, "LLM_REQUEST_TIMEOUT_SECS", DEFAULT_LLM_REQUEST_TIMEOUT_SECS)?,
            connect_secs: parse_or(&lookup, "LLM_CONNECT_TIMEOUT_SECS", DEFAULT_LLM_CONNECT_TIMEOUT_SECS)?,
        };
        let video_polling = VideoPolling {
            interval_secs: parse_or(&lookup, "LLM_VIDEO_POLL_INTERVAL_SECS", DEFAULT_VIDEO_POLL_INTERVAL_SECS)?,
            max_polls: parse_or(&lookup, "LLM_VIDEO_MAX_POLLS", DEFAULT_VIDEO_MAX_POLLS)?,
        };
        if video_polling.max_polls == 0 {
            return Err(LlmError::ConfigParse("LLM_VIDEO_MAX_POLLS must be at least 1".into()));
        }

        Ok(Self { api_key, model, image_model, video_model, base_url, timeouts, video_polling })
    }
}

fn parse_or<T: std::str::FromStr>(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &str,
    default: T,
) -> Result<T, LlmError> {
    match lookup(key) {
        None => Ok(default),
        Some(raw) => raw
            .trim()
            .parse::<T>()
            .map_err(|_| LlmError::ConfigParse(format!("invalid {key}: '{raw}'"))),
    }
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
