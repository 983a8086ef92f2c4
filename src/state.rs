//! Shared application state.
//!
//! DESIGN
//! ======
//! `AppState` is injected into Axum handlers via the `State` extractor.
//! It holds the optional provider clients and the single agent
//! conversation. The conversation lock is never held across a provider call.

use std::sync::Arc;

use tokio::sync::RwLock;

use crate::llm::{LlmChat, MediaGen};
use crate::services::agent::Conversation;

/// Shared application state, injected into Axum handlers via State extractor.
/// Clone is required by Axum; all inner fields are Arc-wrapped.
#[derive(Clone)]
pub struct AppState {
    /// Optional LLM client. `None` if LLM env vars are not configured.
    pub llm: Option<Arc<dyn LlmChat>>,
    /// Optional image/video generator. Usually the same client as `llm`.
    pub media: Option<Arc<dyn MediaGen>>,
    pub conversation: Arc<RwLock<Conversation>>,
}

impl AppState {
    #[must_use]
    pub fn new(llm: Option<Arc<dyn LlmChat>>, media: Option<Arc<dyn MediaGen>>) -> Self {
        Self { llm, media, conversation: Arc::new(RwLock::new(Conversation::new())) }
    }
}

// =============================================================================
// TEST HELPERS
// =============================================================================
