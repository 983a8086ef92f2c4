//! Provider-neutral message types, errors, and the traits the agent calls through.

use serde::{Deserialize, Serialize};

// =============================================================================
// ERROR
// =============================================================================

/// Errors produced by LLM and media-generation calls.
#[derive(Debug, thiserror::Error)]
pub enum LlmError {
    /// A configuration value could not be parsed.
    #[error("config parse failed: {0}")]
    ConfigParse(String),

    /// The required API key environment variable is not set.
    #[error("missing API key: env var {var} not set")]
    MissingApiKey { var: String },

    /// The HTTP request to the provider failed.
    #[error("API request failed: {0}")]
    ApiRequest(String),

    /// The provider returned a non-success HTTP status.
    #[error("API response error: status {status}")]
    ApiResponse { status: u16, body: String },

    /// The provider response body could not be deserialized.
    #[error("API response parse failed: {0}")]
    ApiParse(String),

    /// The underlying HTTP client could not be constructed.
    #[error("HTTP client build failed: {0}")]
    HttpClientBuild(String),

    /// A long-running generation did not finish within the poll budget.
    #[error("generation timed out after {polls} polls")]
    GenerationTimeout { polls: u32 },

    /// The provider finished a long-running generation with an error.
    #[error("generation failed: {0}")]
    OperationFailed(String),

    /// The provider answered but produced nothing usable.
    #[error("empty result: {0}")]
    EmptyResult(String),

    /// A media URI outside the provider's API was requested.
    #[error("untrusted media URI: {0}")]
    UntrustedUri(String),
}

impl crate::error::ErrorCode for LlmError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::ConfigParse(_) => "E_CONFIG_PARSE",
            Self::MissingApiKey { .. } => "E_MISSING_API_KEY",
            Self::ApiRequest(_) => "E_API_REQUEST",
            Self::ApiResponse { .. } => "E_API_RESPONSE",
            Self::ApiParse(_) => "E_API_PARSE",
            Self::HttpClientBuild(_) => "E_HTTP_CLIENT_BUILD",
            Self::GenerationTimeout { .. } => "E_GENERATION_TIMEOUT",
            Self::OperationFailed(_) => "E_OPERATION_FAILED",
            Self::EmptyResult(_) => "E_EMPTY_RESULT",
            Self::UntrustedUri(_) => "E_UNTRUSTED_URI",
        }
    }

    fn retryable(&self) -> bool {
        matches!(
            self,
            Self::ApiRequest(_) | Self::ApiResponse { status: 429 | 500..=599, .. } | Self::GenerationTimeout { .. }
        )
    }
}

// =============================================================================
// INLINE IMAGES
// =============================================================================

/// Base64 image bytes with their MIME type, as carried inside a `data:` URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InlineImage {
    pub mime_type: String,
    pub data: String,
}

impl InlineImage {
    /// Split a `data:<mime>;base64,<payload>` URL. Anything else is `None`.
    #[must_use]
    pub fn from_data_url(url: &str) -> Option<Self> {
        let rest = url.strip_prefix("data:")?;
        let (header, data) = rest.split_once(',')?;
        let mime_type = header.strip_suffix(";base64")?;
        if data.is_empty() {
            return None;
        }
        let mime_type = if mime_type.is_empty() { "image/png" } else { mime_type };
        Some(Self { mime_type: mime_type.to_owned(), data: data.to_owned() })
    }

    #[must_use]
    pub fn to_data_url(&self) -> String {
        format!("data:{};base64,{}", self.mime_type, self.data)
    }
}

// =============================================================================
// CONTENT BLOCKS
// =============================================================================

/// A structured content block in a message or API response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum ContentBlock {
    /// A plain text segment.
    #[serde(rename = "text")]
    Text { text: String },

    /// An inline base64 image.
    #[serde(rename = "image")]
    Image { media_type: String, data: String },

    /// A tool invocation emitted by the model.
    #[serde(rename = "tool_use")]
    ToolUse {
        /// Call identifier, unique within one response.
        id: String,
        /// Name of the tool being called.
        name: String,
        /// JSON arguments for the tool.
        input: serde_json::Value,
        /// Opaque provider token that must be echoed back with the call.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        signature: Option<String>,
    },

    /// The output returned from a tool call back to the model.
    #[serde(rename = "tool_result")]
    ToolResult {
        /// Matches the `id` of the originating [`ContentBlock::ToolUse`].
        tool_use_id: String,
        /// Serialized tool output.
        content: String,
        /// `true` when the tool call produced an error.
        #[serde(skip_serializing_if = "Option::is_none")]
        is_error: Option<bool>,
    },

    /// Any unrecognized block type; ignored downstream.
    #[serde(other)]
    Unknown,
}

/// Message content: plain text or structured blocks.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Content {
    Text(String),
    Blocks(Vec<ContentBlock>),
}

// =============================================================================
// TOOL DEFINITION
// =============================================================================

/// A tool definition passed to the provider.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Tool {
    pub name: String,
    pub description: String,
    pub input_schema: serde_json::Value,
}

// =============================================================================
// MESSAGE TYPES
// =============================================================================

/// A single message in a conversation. `role` is `"user"` or `"assistant"`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    pub role: String,
    pub content: Content,
}

impl Message {
    #[must_use]
    pub fn user(content: Content) -> Self {
        Self { role: "user".into(), content }
    }

    #[must_use]
    pub fn assistant(content: Content) -> Self {
        Self { role: "assistant".into(), content }
    }
}

/// Response from an LLM chat call.
///
/// `stop_reason` is `"tool_use"` whenever the content holds tool calls.
#[derive(Debug, Serialize, Deserialize)]
pub struct ChatResponse {
    pub content: Vec<ContentBlock>,
    pub model: String,
    pub stop_reason: String,
    pub input_tokens: u64,
    pub output_tokens: u64,
}

// =============================================================================
// TRAITS
// =============================================================================

/// Provider-neutral async trait for LLM chat. Enables mocking in tests.
#[async_trait::async_trait]
pub trait LlmChat: Send + Sync {
    /// Send a chat request to the provider.
    ///
    /// # Errors
    ///
    /// Returns an [`LlmError`] if the request fails or the response is malformed.
    async fn chat(
        &self,
        max_tokens: u32,
        system: &str,
        messages: &[Message],
        tools: Option<&[Tool]>,
    ) -> Result<ChatResponse, LlmError>;
}

/// Image and video generation.
#[async_trait::async_trait]
pub trait MediaGen: Send + Sync {
    /// Generate one image and return it as a `data:` URL.
    ///
    /// # Errors
    ///
    /// Returns an [`LlmError`] if the request fails or no image comes back.
    async fn generate_image(&self, prompt: &str, reference: Option<&InlineImage>) -> Result<String, LlmError>;

    /// Generate one video clip and return its provider file URI. The URI
    /// needs the API key to download; see [`MediaGen::fetch_video`].
    ///
    /// # Errors
    ///
    /// Returns an [`LlmError`] if the request fails, the operation fails, or
    /// the poll budget runs out.
    async fn generate_video(&self, prompt: &str, reference: Option<&InlineImage>) -> Result<String, LlmError>;

    /// Open an authenticated download of a URI returned by
    /// [`MediaGen::generate_video`]. The body is left unread for streaming.
    ///
    /// # Errors
    ///
    /// Returns [`LlmError::UntrustedUri`] for URIs outside the provider API,
    /// or an [`LlmError`] if the download fails.
    async fn fetch_video(&self, uri: &str) -> Result<reqwest::Response, LlmError>;
}

#[cfg(test)]
#[path = "types_test.rs"]
mod tests;
