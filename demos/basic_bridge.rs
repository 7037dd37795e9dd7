//! Start a chatui-bridge server programmatically.
//!
//! Usage:
//!   cargo run --example basic_bridge -- path/to/config.json

use chatui_bridge::{build_router, AppState, BridgeConfig, SharedJournal};
use std::path::PathBuf;
use std::sync::Arc;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt::init();

    let path = std::env::args()
        .nth(1)
        .map_or_else(|| PathBuf::from("config.json"), PathBuf::from);
    let config = BridgeConfig::load(&path)?;

    println!("Backend: {}", config.chatbot_ui_url);

    let state = Arc::new(AppState::new(config, SharedJournal::disabled())?);

    let app = build_router(state);
    let listener = tokio::net::TcpListener::bind("127.0.0.1:8080").await?;

    println!("Listening on http://127.0.0.1:8080");
    println!();
    println!("  OPENAI_BASE_URL=http://127.0.0.1:8080/v1");

    axum::serve(listener, app).await?;
    Ok(())
}
