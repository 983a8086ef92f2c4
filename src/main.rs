mod error;
mod llm;
mod routes;
mod services;
mod state;

use std::path::PathBuf;
use std::sync::Arc;

const DEFAULT_PORT: u16 = 3000;

#[tokio::main]
async fn main() -> std::io::Result<()> {
    tracing_subscriber::fmt::init();

    let port = match std::env::var("PORT") {
        Ok(raw) => raw.parse::<u16>().unwrap_or_else(|_| {
            tracing::warn!(value = %raw, default = DEFAULT_PORT, "invalid PORT, using default");
            DEFAULT_PORT
        }),
        Err(_) => DEFAULT_PORT,
    };
    let static_dir = std::env::var("STATIC_DIR").ok().map(PathBuf::from);

    // Non-fatal: the canvas works without the agent.
    let state = match llm::GeminiClient::from_env() {
        Ok(client) => {
            tracing::info!(model = client.model(), "Gemini client initialized");
            let client = Arc::new(client);
            let chat: Arc<dyn llm::LlmChat> = client.clone();
            let media: Arc<dyn llm::MediaGen> = client;
            state::AppState::new(Some(chat), Some(media))
        }
        Err(e) => {
            tracing::warn!(error = %e, "Gemini client not configured, agent disabled");
            state::AppState::new(None, None)
        }
    };

    if let Some(dir) = &static_dir {
        tracing::info!(dir = %dir.display(), "serving static frontend");
    }
    let app = routes::app(state, static_dir);
    let listener = tokio::net::TcpListener::bind(format!("0.0.0.0:{port}")).await?;

    tracing::info!(%port, "cineflow listening");
    axum::serve(listener, app).await
}
