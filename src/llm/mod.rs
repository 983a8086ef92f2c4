//! LLM: Gemini adapter for the CineFlow agent.
//!
//! DESIGN
//! ======
//! The agent talks to two traits: [`LlmChat`] for tool-using chat and
//! [`MediaGen`] for image and video generation. [`GeminiClient`] implements
//! both against the Generative Language REST API; tests substitute mocks.
//! Configuration comes from environment variables (see [`config`]).

pub mod config;
pub mod gemini;
pub mod tools;
pub mod types;

use config::LlmConfig;
pub use gemini::GeminiClient;
pub use types::{LlmChat, LlmError, MediaGen};

impl GeminiClient {
    /// Build a Gemini client from environment variables.
    ///
    /// # Errors
    ///
    /// Returns an error if the API key is missing, a setting is malformed, or
    /// the HTTP client fails to build.
    pub fn from_env() -> Result<Self, LlmError> {
        Self::new(LlmConfig::from_env()?)
    }
}
