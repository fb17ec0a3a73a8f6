use std::sync::Arc;

use anyhow::Context;
use pdf_chat_backend::{
    config::Config,
    observability::init_tracing,
    routes::create_router,
    services::llm::GeminiClient,
    state::AppState,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::from_env().context("invalid configuration")?;
    init_tracing(config.log_format);

    let gemini = GeminiClient::new(&config.gemini).context("failed to build HTTP client")?;
    tracing::info!(model = gemini.model(), "Gemini client configured");

    let state = Arc::new(AppState::new(&config, Arc::new(gemini)));
    let app = create_router(state);

    let listener = tokio::net::TcpListener::bind(config.bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", config.bind_addr))?;

    tracing::info!(addr = %config.bind_addr, "PDF chat server listening");
    axum::serve(listener, app).await?;
    Ok(())
}
