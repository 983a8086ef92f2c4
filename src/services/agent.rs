//! Agent service: chat prompt + canvas context → tool calls → new assets.
//!
//! DESIGN
//! ======
//! A prompt arrives with the assets the user selected as context. The
//! service records the user message, marks the conversation busy, and runs
//! the prompt on a spawned task so the busy flag is cleared and the reply
//! recorded even if the HTTP caller goes away. The prompt is sent to the
//! LLM with the CineFlow tools; each tool call becomes an asset (character,
//! scene, text, generated image, or generated video) returned to the client
//! for placement on the canvas.

use std::sync::{Arc, OnceLock};
use std::time::Duration;

use canvas::camera::Point;
use canvas::doc::{Asset, AssetDraft, AssetId, AssetKind};
use rand::Rng;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use tracing::{info, warn};
use uuid::Uuid;

use crate::error::ErrorCode;
use crate::llm::tools::cineflow_tools;
use crate::llm::types::{ChatResponse, Content, ContentBlock, InlineImage, LlmError, Message, Tool};
use crate::llm::{LlmChat, MediaGen};
use crate::services::media::video_content_url;
use crate::state::AppState;

const DEFAULT_AI_MAX_TOOL_ITERATIONS: usize = 6;
const DEFAULT_AI_MAX_TOKENS: u32 = 4096;
const DEFAULT_AI_MAX_RETRIES: u32 = 2;
const DEFAULT_AI_RETRY_BACKOFF_MS: u64 = 500;

/// Prior turns sent to the model with each prompt.
const HISTORY_LIMIT: usize = 20;

const CASCADE_ORIGIN: Point = Point { x: 500.0, y: 300.0 };
const CASCADE_STEP: f64 = 40.0;
const IMAGE_ASSET_SIZE: (f64, f64) = (480.0, 320.0);
const VIDEO_ASSET_SIZE: (f64, f64) = (480.0, 270.0);

fn env_parse<T>(key: &str, default: T) -> T
where
    T: std::str::FromStr + Copy,
{
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse::<T>().ok())
        .unwrap_or(default)
}

/// Bounds on one prompt's provider traffic.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AgentLimits {
    pub max_tool_iterations: usize,
    pub max_tokens: u32,
    pub max_retries: u32,
    pub retry_backoff_ms: u64,
}

impl Default for AgentLimits {
    fn default() -> Self {
        Self {
            max_tool_iterations: DEFAULT_AI_MAX_TOOL_ITERATIONS,
            max_tokens: DEFAULT_AI_MAX_TOKENS,
            max_retries: DEFAULT_AI_MAX_RETRIES,
            retry_backoff_ms: DEFAULT_AI_RETRY_BACKOFF_MS,
        }
    }
}

impl AgentLimits {
    /// Limits from `AI_MAX_TOOL_ITERATIONS`, `AI_MAX_TOKENS`, `AI_MAX_RETRIES`
    /// and `AI_RETRY_BACKOFF_MS`, read once per process.
    #[must_use]
    pub fn from_env() -> Self {
        static VALUE: OnceLock<AgentLimits> = OnceLock::new();
        *VALUE.get_or_init(|| Self {
            max_tool_iterations: env_parse("AI_MAX_TOOL_ITERATIONS", DEFAULT_AI_MAX_TOOL_ITERATIONS),
            max_tokens: env_parse("AI_MAX_TOKENS", DEFAULT_AI_MAX_TOKENS),
            max_retries: env_parse("AI_MAX_RETRIES", DEFAULT_AI_MAX_RETRIES),
            retry_backoff_ms: env_parse("AI_RETRY_BACKOFF_MS", DEFAULT_AI_RETRY_BACKOFF_MS),
        })
    }
}

// =============================================================================
// TYPES
// =============================================================================

#[derive(Debug, thiserror::Error)]
pub enum AgentError {
    #[error("prompt is empty")]
    EmptyPrompt,
    #[error("agent is busy with another prompt")]
    Busy,
    #[error("LLM not configured")]
    LlmNotConfigured,
    #[error("media generation not configured")]
    MediaNotConfigured,
    #[error("invalid tool input: {0}")]
    InvalidToolInput(String),
    #[error("LLM error: {0}")]
    Llm(#[from] LlmError),
    #[error("internal error: {0}")]
    Internal(String),
}

impl ErrorCode for AgentError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::EmptyPrompt => "E_EMPTY_PROMPT",
            Self::Busy => "E_AGENT_BUSY",
            Self::LlmNotConfigured => "E_LLM_NOT_CONFIGURED",
            Self::MediaNotConfigured => "E_MEDIA_NOT_CONFIGURED",
            Self::InvalidToolInput(_) => "E_INVALID_TOOL_INPUT",
            Self::Llm(_) => "E_LLM_ERROR",
            Self::Internal(_) => "E_INTERNAL",
        }
    }

    fn retryable(&self) -> bool {
        matches!(self, Self::Busy) || matches!(self, Self::Llm(e) if e.retryable())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

/// One entry in the agent conversation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub id: Uuid,
    pub role: Role,
    pub text: String,
    /// Context asset ids for user messages; created asset ids for replies.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub attachments: Vec<AssetId>,
    /// Set on assistant messages that report a failed prompt.
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub is_error: bool,
}

impl ChatMessage {
    fn user(text: &str, attachments: Vec<AssetId>) -> Self {
        Self { id: Uuid::new_v4(), role: Role::User, text: text.to_owned(), attachments, is_error: false }
    }

    fn assistant(text: String, attachments: Vec<AssetId>) -> Self {
        Self { id: Uuid::new_v4(), role: Role::Assistant, text, attachments, is_error: false }
    }

    fn failure(err: &AgentError) -> Self {
        Self { id: Uuid::new_v4(), role: Role::Assistant, text: err.to_string(), attachments: Vec::new(), is_error: true }
    }
}

/// A canvas asset the user attached to a prompt.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContextAsset {
    pub id: AssetId,
    pub kind: AssetKind,
    pub title: String,
    pub content: String,
}

impl From<&Asset> for ContextAsset {
    fn from(asset: &Asset) -> Self {
        Self { id: asset.id, kind: asset.kind, title: asset.title.clone(), content: asset.content.clone() }
    }
}

/// Reply to a prompt: the recorded assistant message and the assets to place.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentReply {
    pub message: ChatMessage,
    pub assets: Vec<Asset>,
}

/// Text and assets produced by one prompt, before it is recorded.
#[derive(Debug)]
pub(crate) struct PromptOutcome {
    pub text: String,
    pub assets: Vec<Asset>,
}

// =============================================================================
// CONVERSATION
// =============================================================================

/// Message log plus the flag that serializes prompts.
#[derive(Debug, Default)]
pub struct Conversation {
    messages: Vec<ChatMessage>,
    busy: bool,
}

impl Conversation {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    #[must_use]
    pub fn is_busy(&self) -> bool {
        self.busy
    }

    /// Drop every message.
    ///
    /// # Errors
    ///
    /// Returns [`AgentError::Busy`] while a prompt is running.
    pub fn clear(&mut self) -> Result<(), AgentError> {
        if self.is_busy() {
            return Err(AgentError::Busy);
        }
        self.messages.clear();
        Ok(())
    }

    /// Record the user message and mark busy. Returns the history before it.
    fn begin(&mut self, message: ChatMessage) -> Result<Vec<ChatMessage>, AgentError> {
        if self.is_busy() {
            return Err(AgentError::Busy);
        }
        let history = self.messages.clone();
        self.messages.push(message);
        self.busy = true;
        Ok(history)
    }

    /// Record the outcome of the running prompt and clear busy.
    fn finish(&mut self, outcome: Result<PromptOutcome, AgentError>) -> Result<AgentReply, AgentError> {
        self.busy = false;
        match outcome {
            Ok(outcome) => {
                let ids = outcome.assets.iter().map(|a| a.id).collect();
                let message = ChatMessage::assistant(outcome.text, ids);
                self.messages.push(message.clone());
                Ok(AgentReply { message, assets: outcome.assets })
            }
            Err(err) => {
                self.messages.push(ChatMessage::failure(&err));
                Err(err)
            }
        }
    }
}

// =============================================================================
// MAIN ENTRY POINTS
// =============================================================================

/// Snapshot of the conversation.
pub async fn list_messages(state: &AppState) -> Vec<ChatMessage> {
    state.conversation.read().await.messages().to_vec()
}

/// Clear the conversation.
///
/// # Errors
///
/// Returns [`AgentError::Busy`] while a prompt is running.
pub async fn clear_conversation(state: &AppState) -> Result<(), AgentError> {
    state.conversation.write().await.clear()?;
    info!("agent: conversation cleared");
    Ok(())
}

/// Run one prompt end to end and record both sides of the exchange.
///
/// # Errors
///
/// Fails fast with [`AgentError::EmptyPrompt`], [`AgentError::LlmNotConfigured`]
/// or [`AgentError::Busy`] without touching the conversation. Any later
/// failure is recorded as an error message and returned.
pub async fn send_message(state: &AppState, text: &str, context: Vec<ContextAsset>) -> Result<AgentReply, AgentError> {
    let prompt = text.trim();
    if prompt.is_empty() {
        return Err(AgentError::EmptyPrompt);
    }
    let Some(llm) = state.llm.clone() else {
        return Err(AgentError::LlmNotConfigured);
    };

    let attachments = context.iter().map(|c| c.id).collect();
    let history = state
        .conversation
        .write()
        .await
        .begin(ChatMessage::user(prompt, attachments))?;

    let media = state.media.clone();
    let conversation = Arc::clone(&state.conversation);
    let limits = AgentLimits::from_env();
    let prompt = prompt.to_owned();
    // A panic stays inside the inner task. The outer task records the outcome
    // and clears busy whether or not the caller is still waiting.
    let task = tokio::spawn(async move {
        let run = tokio::spawn(async move {
            handle_prompt(llm.as_ref(), media.as_deref(), &limits, &history, &prompt, &context).await
        });
        let outcome = match run.await {
            Ok(outcome) => outcome,
            Err(join_err) => {
                warn!(error = %join_err, "agent: prompt task failed");
                Err(AgentError::Internal(join_err.to_string()))
            }
        };
        conversation.write().await.finish(outcome)
    });

    match task.await {
        Ok(result) => result,
        Err(join_err) => {
            warn!(error = %join_err, "agent: recording task failed");
            state
                .conversation
                .write()
                .await
                .finish(Err(AgentError::Internal(join_err.to_string())))
        }
    }
}

pub(crate) async fn handle_prompt(
    llm: &dyn LlmChat,
    media: Option<&dyn MediaGen>,
    limits: &AgentLimits,
    history: &[ChatMessage],
    prompt: &str,
    context: &[ContextAsset],
) -> Result<PromptOutcome, AgentError> {
    info!(prompt_len = prompt.len(), context = context.len(), "agent: prompt received");

    let system = build_system_prompt(context);
    let tools = cineflow_tools();
    let mut messages = history_messages(history);
    messages.push(build_user_turn(prompt, context));

    let mut layout = Cascade::default();
    let mut assets = Vec::new();
    let mut final_text: Option<String> = None;

    for iteration in 0..limits.max_tool_iterations {
        let response = match chat_with_retry(llm, limits, &system, &messages, &tools).await {
            Ok(response) => response,
            // Assets from earlier rounds are already generated; keep them.
            Err(e) if !assets.is_empty() => {
                warn!(iteration, assets = assets.len(), error = %e, "agent: LLM failed after tools ran");
                final_text = Some(format!(
                    "Added {} asset(s) to the canvas, then the assistant stopped: {e}",
                    assets.len()
                ));
                break;
            }
            Err(e) => return Err(e.into()),
        };

        info!(
            iteration,
            stop_reason = %response.stop_reason,
            input_tokens = response.input_tokens,
            output_tokens = response.output_tokens,
            "agent: LLM response"
        );

        let text_parts: Vec<&str> = response
            .content
            .iter()
            .filter_map(|b| match b {
                ContentBlock::Text { text } => Some(text.as_str()),
                _ => None,
            })
            .collect();
        if !text_parts.is_empty() {
            final_text = Some(text_parts.join("\n"));
        }

        let tool_calls: Vec<(String, String, Value)> = response
            .content
            .iter()
            .filter_map(|b| match b {
                ContentBlock::ToolUse { id, name, input, .. } => Some((id.clone(), name.clone(), input.clone())),
                _ => None,
            })
            .collect();
        if tool_calls.is_empty() {
            break;
        }

        let stop_reason = response.stop_reason.clone();
        messages.push(Message::assistant(Content::Blocks(response.content)));

        let mut tool_results = Vec::new();
        for (tool_id, tool_name, input) in &tool_calls {
            info!(iteration, tool = %tool_name, "agent: executing tool");
            let (content, is_error) = match execute_tool(media, tool_name, input, context, &mut layout).await {
                Ok(asset) => {
                    let summary = json!({ "id": asset.id, "kind": asset.kind, "title": asset.title }).to_string();
                    assets.push(asset);
                    (summary, None)
                }
                Err(e) => {
                    warn!(iteration, tool = %tool_name, error = %e, "agent: tool error");
                    (e.to_string(), Some(true))
                }
            };
            tool_results.push(ContentBlock::ToolResult { tool_use_id: tool_id.clone(), content, is_error });
        }
        messages.push(Message::user(Content::Blocks(tool_results)));

        if stop_reason != "tool_use" {
            break;
        }
    }

    let text = final_text.unwrap_or_else(|| {
        if assets.is_empty() { "Done.".into() } else { format!("Done. Added {} asset(s) to the canvas.", assets.len()) }
    });

    info!(assets = assets.len(), "agent: prompt complete");
    Ok(PromptOutcome { text, assets })
}

async fn chat_with_retry(
    llm: &dyn LlmChat,
    limits: &AgentLimits,
    system: &str,
    messages: &[Message],
    tools: &[Tool],
) -> Result<ChatResponse, LlmError> {
    let mut attempt = 0;
    loop {
        match llm
            .chat(limits.max_tokens, system, messages, Some(tools))
            .await
        {
            Ok(response) => return Ok(response),
            Err(e) if e.retryable() && attempt < limits.max_retries => {
                attempt += 1;
                let delay = retry_delay(limits.retry_backoff_ms, attempt);
                warn!(attempt, delay_ms = delay.as_millis(), error = %e, "agent: retrying LLM call");
                tokio::time::sleep(delay).await;
            }
            Err(e) => return Err(e),
        }
    }
}

/// Linear back-off with up to half a step of jitter.
pub(crate) fn retry_delay(base_ms: u64, attempt: u32) -> Duration {
    let linear = base_ms.saturating_mul(u64::from(attempt));
    let jitter = if base_ms < 2 { 0 } else { rand::rng().random_range(0..=base_ms / 2) };
    Duration::from_millis(linear.saturating_add(jitter))
}

// =============================================================================
// PROMPT BUILDING
// =============================================================================

pub(crate) fn build_system_prompt(context: &[ContextAsset]) -> String {
    let mut prompt = String::from(
        "You are CineFlow AI, a creative partner for filmmakers working on an infinite canvas.\n\
         Help users develop films by analyzing their context (characters, scenes, images) and \
         proposing ideas, loglines, and scripts.\n\n\
         You can add assets to the canvas with the provided tools:\n\
         - createCharacter and createScene for story cards.\n\
         - createText for notes, outlines, and script excerpts.\n\
         - generateImage for storyboard frames and concept art.\n\
         - generateVideo for short clips (slow; only when asked).\n\n\
         Selected context:\n",
    );

    if context.is_empty() {
        prompt.push_str("(nothing selected)\n");
    } else {
        for asset in context {
            prompt.push_str(&format!("- id={} kind={} title={:?}\n", asset.id, asset.kind.label(), asset.title));
        }
    }

    prompt.push_str(
        "\nLeave x and y out unless the user asks for a specific layout; new assets are \
         arranged automatically. Answer in the user's language.",
    );
    prompt
}

/// Earlier successful turns, oldest first, capped at [`HISTORY_LIMIT`].
pub(crate) fn history_messages(history: &[ChatMessage]) -> Vec<Message> {
    let usable: Vec<&ChatMessage> = history
        .iter()
        .filter(|m| !m.is_error && !m.text.is_empty())
        .collect();
    let start = usable.len().saturating_sub(HISTORY_LIMIT);
    usable[start..]
        .iter()
        .map(|m| match m.role {
            Role::User => Message::user(Content::Text(m.text.clone())),
            Role::Assistant => Message::assistant(Content::Text(m.text.clone())),
        })
        .collect()
}

pub(crate) fn build_user_turn(prompt: &str, context: &[ContextAsset]) -> Message {
    let mut blocks = vec![ContentBlock::Text { text: prompt.to_owned() }];
    for asset in context {
        let inline = (asset.kind == AssetKind::Image)
            .then(|| InlineImage::from_data_url(&asset.content))
            .flatten();
        match inline {
            Some(image) => blocks.push(ContentBlock::Image { media_type: image.mime_type, data: image.data }),
            None => blocks.push(ContentBlock::Text {
                text: format!("[Context {} - {}]: {}", asset.kind.label(), asset.title, asset.content),
            }),
        }
    }
    Message::user(Content::Blocks(blocks))
}

// =============================================================================
// TOOL EXECUTION
// =============================================================================

/// Positions for assets the model placed without coordinates.
#[derive(Debug, Default)]
pub(crate) struct Cascade {
    placed: u32,
}

impl Cascade {
    fn next(&mut self) -> Point {
        let offset = f64::from(self.placed) * CASCADE_STEP;
        self.placed += 1;
        Point::new(CASCADE_ORIGIN.x + offset, CASCADE_ORIGIN.y + offset)
    }

    fn place(&mut self, input: &Value) -> Point {
        let x = input.get("x").and_then(Value::as_f64);
        let y = input.get("y").and_then(Value::as_f64);
        match (x, y) {
            (Some(x), Some(y)) if x.is_finite() && y.is_finite() => Point::new(x, y),
            _ => self.next(),
        }
    }
}

fn required_str<'a>(tool: &str, input: &'a Value, field: &str) -> Result<&'a str, AgentError> {
    input
        .get(field)
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .ok_or_else(|| AgentError::InvalidToolInput(format!("{tool}: missing {field}")))
}

fn optional_str(input: &Value, field: &str) -> Option<String> {
    input
        .get(field)
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_owned)
}

/// First inline image among the context assets, used as a generation reference.
fn context_reference(input: &Value, context: &[ContextAsset]) -> Option<InlineImage> {
    if input.get("useContextImage").and_then(Value::as_bool) != Some(true) {
        return None;
    }
    context
        .iter()
        .filter(|c| c.kind == AssetKind::Image)
        .find_map(|c| InlineImage::from_data_url(&c.content))
}

pub(crate) async fn execute_tool(
    media: Option<&dyn MediaGen>,
    tool_name: &str,
    input: &Value,
    context: &[ContextAsset],
    layout: &mut Cascade,
) -> Result<Asset, AgentError> {
    let draft = match tool_name {
        "createCharacter" => AssetDraft {
            kind: Some(AssetKind::Character),
            title: Some(required_str(tool_name, input, "name")?.to_owned()),
            content: Some(optional_str(input, "description").unwrap_or_default()),
            ..AssetDraft::default()
        },
        "createScene" => AssetDraft {
            kind: Some(AssetKind::Scene),
            title: Some(required_str(tool_name, input, "title")?.to_owned()),
            content: Some(optional_str(input, "description").unwrap_or_default()),
            ..AssetDraft::default()
        },
        "createText" => AssetDraft {
            kind: Some(AssetKind::Text),
            title: Some(optional_str(input, "title").unwrap_or_else(|| "Note".into())),
            content: Some(required_str(tool_name, input, "text")?.to_owned()),
            ..AssetDraft::default()
        },
        "generateImage" => {
            let prompt = required_str(tool_name, input, "prompt")?;
            let media = media.ok_or(AgentError::MediaNotConfigured)?;
            let reference = context_reference(input, context);
            let url = media.generate_image(prompt, reference.as_ref()).await?;
            AssetDraft {
                kind: Some(AssetKind::Image),
                title: Some(optional_str(input, "title").unwrap_or_else(|| "Generated image".into())),
                content: Some(url),
                description: Some(prompt.to_owned()),
                width: Some(IMAGE_ASSET_SIZE.0),
                height: Some(IMAGE_ASSET_SIZE.1),
                ..AssetDraft::default()
            }
        }
        "generateVideo" => {
            let prompt = required_str(tool_name, input, "prompt")?;
            let media = media.ok_or(AgentError::MediaNotConfigured)?;
            let reference = context_reference(input, context);
            let uri = media.generate_video(prompt, reference.as_ref()).await?;
            AssetDraft {
                kind: Some(AssetKind::Video),
                title: Some(optional_str(input, "title").unwrap_or_else(|| "Generated video".into())),
                content: Some(video_content_url(&uri)?),
                description: Some(prompt.to_owned()),
                width: Some(VIDEO_ASSET_SIZE.0),
                height: Some(VIDEO_ASSET_SIZE.1),
                ..AssetDraft::default()
            }
        }
        _ => return Err(AgentError::InvalidToolInput(format!("unknown tool: {tool_name}"))),
    };

    let draft = AssetDraft { position: Some(layout.place(input)), ..draft };
    Ok(draft.into_asset())
}

#[cfg(test)]
#[path = "agent_test.rs"]
mod tests;
