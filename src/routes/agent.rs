//! Agent chat routes.

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::Json;
use serde::Deserialize;

use crate::error::ErrorBody;
use crate::llm::LlmError;
use crate::services::agent::{self, AgentError, AgentReply, ChatMessage, ContextAsset};
use crate::state::AppState;

pub(crate) type ApiError = (StatusCode, Json<ErrorBody>);

#[derive(Debug, Deserialize)]
pub struct SendMessageBody {
    pub text: String,
    #[serde(default)]
    pub context: Vec<ContextAsset>,
}

/// `GET /api/agent/messages`: conversation so far.
pub async fn list_messages(State(state): State<AppState>) -> Json<Vec<ChatMessage>> {
    Json(agent::list_messages(&state).await)
}

/// `POST /api/agent/messages`: send a prompt with optional canvas context.
pub async fn send_message(
    State(state): State<AppState>,
    Json(body): Json<SendMessageBody>,
) -> Result<Json<AgentReply>, ApiError> {
    agent::send_message(&state, &body.text, body.context)
        .await
        .map(Json)
        .map_err(to_api_error)
}

/// `DELETE /api/agent/messages`: clear the conversation.
pub async fn clear_messages(State(state): State<AppState>) -> Result<StatusCode, ApiError> {
    agent::clear_conversation(&state)
        .await
        .map_err(to_api_error)?;
    Ok(StatusCode::NO_CONTENT)
}

pub(crate) fn agent_error_to_status(err: &AgentError) -> StatusCode {
    match err {
        AgentError::EmptyPrompt | AgentError::InvalidToolInput(_) | AgentError::Llm(LlmError::UntrustedUri(_)) => {
            StatusCode::BAD_REQUEST
        }
        AgentError::Busy => StatusCode::CONFLICT,
        AgentError::LlmNotConfigured | AgentError::MediaNotConfigured => StatusCode::SERVICE_UNAVAILABLE,
        AgentError::Llm(_) => StatusCode::BAD_GATEWAY,
        AgentError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

pub(crate) fn to_api_error(err: AgentError) -> ApiError {
    (agent_error_to_status(&err), Json(ErrorBody::from_error(&err)))
}

#[cfg(test)]
#[path = "agent_test.rs"]
mod tests;
