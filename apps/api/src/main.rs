mod agent;
mod config;
mod errors;
mod extract;
mod llm_client;
mod routes;
mod state;
mod tailoring;

#[cfg(test)]
mod test_support;

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Result;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::Config;
use crate::extract::pdf::PdfTextExtractor;
use crate::extract::web::WebPageExtractor;
use crate::llm_client::LlmClient;
use crate::routes::build_router;
use crate::state::AppState;
use crate::tailoring::agent::ResumeTailor;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first; a missing API key stops startup here.
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!(
                "{crate_name}={level},tower_http={level}",
                crate_name = env!("CARGO_CRATE_NAME"),
                level = &config.rust_log
            ))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting resume tailor API v{}", env!("CARGO_PKG_VERSION"));

    // Initialize LLM client (fails fast on a blank credential)
    let llm = LlmClient::new(config.llm_settings())?;
    info!("LLM client initialized (model: {})", llm.model());

    let web = WebPageExtractor::new(config.fetch_timeout())?
        .with_max_page_bytes(config.max_page_bytes);
    let pdf = PdfTextExtractor::new(config.pdf_timeout());
    info!(
        "Extractors initialized (fetch timeout {}s, PDF timeout {}s)",
        config.fetch_timeout_secs, config.pdf_timeout_secs
    );

    let state = AppState {
        llm: Arc::new(llm),
        pdf,
        web,
        tailor: ResumeTailor,
    };

    let app = build_router(state, config.max_upload_bytes)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
