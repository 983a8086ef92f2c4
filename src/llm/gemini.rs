//! Gemini (Generative Language API) client.
//!
//! Chat goes through `models/{model}:generateContent` with function
//! declarations; images through the same endpoint on the image model; video
//! through `predictLongRunning` plus operation polling. Request building and
//! response parsing are pure functions so they can be tested without HTTP.

use std::collections::HashMap;
use std::time::Duration;

use serde::Serialize;
use serde_json::{Value, json};
use tracing::{debug, info};

use super::config::{LlmConfig, VideoPolling};
use super::types::{ChatResponse, Content, ContentBlock, InlineImage, LlmChat, LlmError, MediaGen, Message, Tool};

const VIDEO_ASPECT_RATIO: &str = "16:9";
const VIDEO_RESOLUTION: &str = "720p";

// =============================================================================
// CLIENT
// =============================================================================

pub struct GeminiClient {
    http: reqwest::Client,
    api_key: String,
    base_url: String,
    model: String,
    image_model: String,
    video_model: String,
    polling: VideoPolling,
}

impl GeminiClient {
    /// Build a client from a parsed config.
    ///
    /// # Errors
    ///
    /// Returns [`LlmError::HttpClientBuild`] if the HTTP client fails to build.
    pub fn new(config: LlmConfig) -> Result<Self, LlmError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeouts.request_secs))
            .connect_timeout(Duration::from_secs(config.timeouts.connect_secs))
            .build()
            .map_err(|e| LlmError::HttpClientBuild(e.to_string()))?;
        Ok(Self {
            http,
            api_key: config.api_key,
            base_url: config.base_url,
            model: config.model,
            image_model: config.image_model,
            video_model: config.video_model,
            polling: config.video_polling,
        })
    }

    /// Chat model name (e.g. `"gemini-3-pro-preview"`).
    #[must_use]
    pub fn model(&self) -> &str {
        &self.model
    }

    async fn post_json(&self, path: &str, body: &impl Serialize) -> Result<String, LlmError> {
        let url = format!("{}/{}", self.base_url, path);
        let response = self
            .http
            .post(url)
            .header("x-goog-api-key", &self.api_key)
            .json(body)
            .send()
            .await
            .map_err(|e| LlmError::ApiRequest(e.to_string()))?;
        read_body(response).await
    }

    async fn get(&self, path: &str) -> Result<String, LlmError> {
        let url = format!("{}/{}", self.base_url, path);
        let response = self
            .http
            .get(url)
            .header("x-goog-api-key", &self.api_key)
            .send()
            .await
            .map_err(|e| LlmError::ApiRequest(e.to_string()))?;
        read_body(response).await
    }
}

async fn read_body(response: reqwest::Response) -> Result<String, LlmError> {
    let status = response.status().as_u16();
    let text = response
        .text()
        .await
        .map_err(|e| LlmError::ApiRequest(e.to_string()))?;
    if status != 200 {
        return Err(LlmError::ApiResponse { status, body: text });
    }
    Ok(text)
}

#[async_trait::async_trait]
impl LlmChat for GeminiClient {
    async fn chat(
        &self,
        max_tokens: u32,
        system: &str,
        messages: &[Message],
        tools: Option<&[Tool]>,
    ) -> Result<ChatResponse, LlmError> {
        let body = build_chat_request(max_tokens, system, messages, tools);
        let text = self
            .post_json(&format!("models/{}:generateContent", self.model), &body)
            .await?;
        let mut response = parse_chat_response(&text)?;
        if response.model.is_empty() {
            response.model.clone_from(&self.model);
        }
        Ok(response)
    }
}

#[async_trait::async_trait]
impl MediaGen for GeminiClient {
    async fn generate_image(&self, prompt: &str, reference: Option<&InlineImage>) -> Result<String, LlmError> {
        let body = build_image_request(prompt, reference);
        let text = self
            .post_json(&format!("models/{}:generateContent", self.image_model), &body)
            .await?;
        let image = parse_image_response(&text)?;
        info!(model = %self.image_model, mime_type = %image.mime_type, "gemini: image generated");
        Ok(image.to_data_url())
    }

    async fn generate_video(&self, prompt: &str, reference: Option<&InlineImage>) -> Result<String, LlmError> {
        let body = build_video_request(prompt, reference);
        let text = self
            .post_json(&format!("models/{}:predictLongRunning", self.video_model), &body)
            .await?;
        let name = parse_operation_name(&text)?;
        info!(model = %self.video_model, operation = %name, "gemini: video operation started");

        for poll in 1..=self.polling.max_polls {
            tokio::time::sleep(Duration::from_secs(self.polling.interval_secs)).await;
            let text = self.get(&name).await?;
            match parse_operation(&text)? {
                OperationStatus::Pending => debug!(operation = %name, poll, "gemini: video pending"),
                OperationStatus::Done(uri) => {
                    info!(operation = %name, poll, "gemini: video ready");
                    return Ok(uri);
                }
            }
        }
        Err(LlmError::GenerationTimeout { polls: self.polling.max_polls })
    }

    async fn fetch_video(&self, uri: &str) -> Result<reqwest::Response, LlmError> {
        if !is_trusted_media_uri(&self.base_url, uri) {
            return Err(LlmError::UntrustedUri(uri.to_string()));
        }
        let response = self
            .http
            .get(uri)
            .header("x-goog-api-key", &self.api_key)
            .send()
            .await
            .map_err(|e| LlmError::ApiRequest(e.to_string()))?;
        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(LlmError::ApiResponse { status, body });
        }
        debug!(uri = %uri, "gemini: video download opened");
        Ok(response)
    }
}

/// Only URIs on the API origin, under the API base path, are fetched with the key.
pub(crate) fn is_trusted_media_uri(base_url: &str, uri: &str) -> bool {
    let (Ok(base), Ok(target)) = (reqwest::Url::parse(base_url), reqwest::Url::parse(uri)) else {
        return false;
    };
    let prefix = format!("{}/", base.path().trim_end_matches('/'));
    target.scheme() == base.scheme()
        && target.host_str() == base.host_str()
        && target.port_or_known_default() == base.port_or_known_default()
        && target.username().is_empty()
        && target.password().is_none()
        && target.path().starts_with(&prefix)
}

// =============================================================================
// WIRE TYPES
// =============================================================================

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct GenerateRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    system_instruction: Option<WireContent>,
    contents: Vec<WireContent>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    tools: Vec<WireToolSet>,
    #[serde(skip_serializing_if = "Option::is_none")]
    generation_config: Option<GenerationConfig>,
}

#[derive(Debug, Serialize)]
pub(crate) struct WireContent {
    #[serde(skip_serializing_if = "Option::is_none")]
    role: Option<&'static str>,
    parts: Vec<Part>,
}

/// One content part. `thoughtSignature` sits beside the part payload, not inside it.
#[derive(Debug, Serialize)]
pub(crate) struct Part {
    #[serde(flatten)]
    data: PartData,
    #[serde(rename = "thoughtSignature", skip_serializing_if = "Option::is_none")]
    thought_signature: Option<String>,
}

impl From<PartData> for Part {
    fn from(data: PartData) -> Self {
        Self { data, thought_signature: None }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) enum PartData {
    Text(String),
    InlineData {
        #[serde(rename = "mimeType")]
        mime_type: String,
        data: String,
    },
    FunctionCall {
        name: String,
        args: Value,
    },
    FunctionResponse {
        name: String,
        response: Value,
    },
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct WireToolSet {
    function_declarations: Vec<FunctionDeclaration>,
}

#[derive(Debug, Serialize)]
struct FunctionDeclaration {
    name: String,
    description: String,
    parameters: Value,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    max_output_tokens: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    response_modalities: Option<Vec<&'static str>>,
}

// =============================================================================
// REQUEST BUILDING
// =============================================================================

pub(crate) fn build_chat_request(
    max_tokens: u32,
    system: &str,
    messages: &[Message],
    tools: Option<&[Tool]>,
) -> GenerateRequest {
    let system_instruction =
        (!system.trim().is_empty()).then(|| WireContent { role: None, parts: vec![PartData::Text(system.to_string()).into()] });

    // Function responses must carry the function name; results only know the call id.
    let mut call_names: HashMap<&str, &str> = HashMap::new();
    let mut contents = Vec::new();
    for message in messages {
        let role = if message.role == "assistant" { "model" } else { "user" };
        let parts = match &message.content {
            Content::Text(text) if text.is_empty() => Vec::new(),
            Content::Text(text) => vec![Part::from(PartData::Text(text.clone()))],
            Content::Blocks(blocks) => {
                let mut parts: Vec<Part> = Vec::new();
                for block in blocks {
                    match block {
                        ContentBlock::Text { text } if !text.is_empty() => parts.push(PartData::Text(text.clone()).into()),
                        ContentBlock::Image { media_type, data } => {
                            parts.push(PartData::InlineData { mime_type: media_type.clone(), data: data.clone() }.into());
                        }
                        ContentBlock::ToolUse { id, name, input, signature } => {
                            call_names.insert(id, name);
                            parts.push(Part {
                                data: PartData::FunctionCall { name: name.clone(), args: input.clone() },
                                thought_signature: signature.clone(),
                            });
                        }
                        ContentBlock::ToolResult { tool_use_id, content, is_error } => {
                            let name = call_names.get(tool_use_id.as_str()).copied().unwrap_or(tool_use_id.as_str());
                            parts.push(
                                PartData::FunctionResponse {
                                    name: name.to_string(),
                                    response: function_response_body(content, is_error.unwrap_or(false)),
                                }
                                .into(),
                            );
                        }
                        ContentBlock::Text { .. } | ContentBlock::Unknown => {}
                    }
                }
                parts
            }
        };
        if !parts.is_empty() {
            contents.push(WireContent { role: Some(role), parts });
        }
    }

    let tools = tools
        .filter(|t| !t.is_empty())
        .map(|t| {
            vec![WireToolSet {
                function_declarations: t
                    .iter()
                    .map(|tool| FunctionDeclaration {
                        name: tool.name.clone(),
                        description: tool.description.clone(),
                        parameters: tool.input_schema.clone(),
                    })
                    .collect(),
            }]
        })
        .unwrap_or_default();

    GenerateRequest {
        system_instruction,
        contents,
        tools,
        generation_config: Some(GenerationConfig { max_output_tokens: Some(max_tokens), response_modalities: None }),
    }
}

/// Function responses must be JSON objects; bare values are wrapped.
fn function_response_body(content: &str, is_error: bool) -> Value {
    if is_error {
        return json!({ "error": content });
    }
    match serde_json::from_str::<Value>(content) {
        Ok(value @ Value::Object(_)) => value,
        Ok(value) => json!({ "result": value }),
        Err(_) => json!({ "result": content }),
    }
}

pub(crate) fn build_image_request(prompt: &str, reference: Option<&InlineImage>) -> GenerateRequest {
    let mut parts: Vec<Part> = Vec::new();
    if let Some(image) = reference {
        parts.push(PartData::InlineData { mime_type: image.mime_type.clone(), data: image.data.clone() }.into());
    }
    parts.push(PartData::Text(prompt.to_string()).into());
    GenerateRequest {
        system_instruction: None,
        contents: vec![WireContent { role: Some("user"), parts }],
        tools: Vec::new(),
        generation_config: Some(GenerationConfig { max_output_tokens: None, response_modalities: Some(vec!["IMAGE"]) }),
    }
}

pub(crate) fn build_video_request(prompt: &str, reference: Option<&InlineImage>) -> Value {
    let mut instance = json!({ "prompt": prompt });
    if let Some(image) = reference {
        instance["image"] = json!({ "bytesBase64Encoded": image.data, "mimeType": image.mime_type });
    }
    json!({
        "instances": [instance],
        "parameters": {
            "aspectRatio": VIDEO_ASPECT_RATIO,
            "resolution": VIDEO_RESOLUTION,
            "sampleCount": 1,
        },
    })
}

// =============================================================================
// RESPONSE PARSING
// =============================================================================

fn first_candidate_parts(root: &Value) -> Result<&[Value], LlmError> {
    let Some(candidate) = root
        .get("candidates")
        .and_then(Value::as_array)
        .and_then(|arr| arr.first())
    else {
        let reason = root
            .get("promptFeedback")
            .and_then(|f| f.get("blockReason"))
            .and_then(Value::as_str)
            .unwrap_or("no candidates");
        return Err(LlmError::EmptyResult(reason.to_string()));
    };
    Ok(candidate
        .get("content")
        .and_then(|c| c.get("parts"))
        .and_then(Value::as_array)
        .map_or(&[], Vec::as_slice))
}

pub(crate) fn parse_chat_response(json_text: &str) -> Result<ChatResponse, LlmError> {
    let root: Value = serde_json::from_str(json_text).map_err(|e| LlmError::ApiParse(e.to_string()))?;
    let model = root
        .get("modelVersion")
        .and_then(Value::as_str)
        .map(str::to_owned)
        .unwrap_or_default();
    let input_tokens = root
        .get("usageMetadata")
        .and_then(|u| u.get("promptTokenCount"))
        .and_then(Value::as_u64)
        .unwrap_or(0);
    let output_tokens = root
        .get("usageMetadata")
        .and_then(|u| u.get("candidatesTokenCount"))
        .and_then(Value::as_u64)
        .unwrap_or(0);

    let parts = first_candidate_parts(&root)?;
    let mut content = Vec::new();
    for (index, part) in parts.iter().enumerate() {
        if part.get("thought").and_then(Value::as_bool) == Some(true) {
            continue;
        }
        if let Some(text) = part.get("text").and_then(Value::as_str) {
            if !text.is_empty() {
                content.push(ContentBlock::Text { text: text.to_string() });
            }
        } else if let Some(call) = part.get("functionCall") {
            let Some(name) = call.get("name").and_then(Value::as_str) else {
                return Err(LlmError::ApiParse("functionCall missing name".to_string()));
            };
            let id = call
                .get("id")
                .and_then(Value::as_str)
                .map_or_else(|| format!("call_{index}"), str::to_owned);
            let input = call
                .get("args")
                .cloned()
                .unwrap_or_else(|| Value::Object(serde_json::Map::default()));
            let signature = part
                .get("thoughtSignature")
                .and_then(Value::as_str)
                .map(str::to_owned);
            content.push(ContentBlock::ToolUse { id, name: name.to_string(), input, signature });
        }
    }

    let finish_reason = root
        .get("candidates")
        .and_then(|c| c.get(0))
        .and_then(|c| c.get("finishReason"))
        .and_then(Value::as_str)
        .unwrap_or("STOP");
    let stop_reason = if content
        .iter()
        .any(|block| matches!(block, ContentBlock::ToolUse { .. }))
    {
        "tool_use"
    } else if finish_reason == "MAX_TOKENS" {
        "max_tokens"
    } else {
        "end_turn"
    };

    Ok(ChatResponse { content, model, stop_reason: stop_reason.to_string(), input_tokens, output_tokens })
}

pub(crate) fn parse_image_response(json_text: &str) -> Result<InlineImage, LlmError> {
    let root: Value = serde_json::from_str(json_text).map_err(|e| LlmError::ApiParse(e.to_string()))?;
    first_candidate_parts(&root)?
        .iter()
        .find_map(|part| {
            let inline = part.get("inlineData")?;
            let data = inline.get("data").and_then(Value::as_str)?;
            let mime_type = inline
                .get("mimeType")
                .and_then(Value::as_str)
                .unwrap_or("image/png");
            Some(InlineImage { mime_type: mime_type.to_string(), data: data.to_string() })
        })
        .ok_or_else(|| LlmError::EmptyResult("response held no image".to_string()))
}

#[derive(Debug, PartialEq, Eq)]
pub(crate) enum OperationStatus {
    Pending,
    Done(String),
}

pub(crate) fn parse_operation_name(json_text: &str) -> Result<String, LlmError> {
    let root: Value = serde_json::from_str(json_text).map_err(|e| LlmError::ApiParse(e.to_string()))?;
    root.get("name")
        .and_then(Value::as_str)
        .filter(|name| !name.is_empty())
        .map(str::to_owned)
        .ok_or_else(|| LlmError::ApiParse("operation missing name".to_string()))
}

pub(crate) fn parse_operation(json_text: &str) -> Result<OperationStatus, LlmError> {
    let root: Value = serde_json::from_str(json_text).map_err(|e| LlmError::ApiParse(e.to_string()))?;
    if let Some(error) = root.get("error") {
        let message = error
            .get("message")
            .and_then(Value::as_str)
            .unwrap_or("unknown error");
        return Err(LlmError::OperationFailed(message.to_string()));
    }
    if root.get("done").and_then(Value::as_bool) != Some(true) {
        return Ok(OperationStatus::Pending);
    }
    root.pointer("/response/generateVideoResponse/generatedSamples/0/video/uri")
        .and_then(Value::as_str)
        .map(|uri| OperationStatus::Done(uri.to_string()))
        .ok_or_else(|| LlmError::EmptyResult("operation finished without a video".to_string()))
}

#[cfg(test)]
#[path = "gemini_test.rs"]
mod tests;
