use anyhow::Context;
use chatui_bridge::config::{DEFAULT_CONFIG_PATH, DEFAULT_PORT};
use chatui_bridge::{build_router, AppState, BridgeConfig, SharedJournal};
use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(
    name = "chatui-bridge",
    about = "OpenAI-compatible chat completions front end for a Chatbot UI backend",
    version
)]
struct Cli {
    /// Path to config file (JSON)
    #[arg(short, long, default_value = DEFAULT_CONFIG_PATH)]
    config: PathBuf,

    /// Port to listen on
    #[arg(short, long, default_value_t = DEFAULT_PORT)]
    port: u16,

    /// Request journal path
    #[arg(long, default_value = "chatui-bridge.log")]
    log_file: PathBuf,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "chatui_bridge=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Nothing binds until the config has loaded.
    let config = BridgeConfig::load(&cli.config).context("Failed to load config")?;

    let journal = SharedJournal::open(&cli.log_file).with_context(|| {
        format!("Failed to open request journal {}", cli.log_file.display())
    })?;

    info!("chatui-bridge v{}", env!("CARGO_PKG_VERSION"));
    info!("  Backend:   {}", config.chatbot_ui_url);
    info!("  Port:      {}", cli.port);
    info!("  Journal:   {}", cli.log_file.display());

    journal.info(
        "startup",
        format!(
            "Starting chatui-bridge backend={} port={}",
            config.chatbot_ui_url, cli.port
        ),
    );

    let state = Arc::new(AppState::new(config, journal.clone())?);

    let app = build_router(state);
    let bind_addr = format!("0.0.0.0:{}", cli.port);
    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("Failed to bind {}", bind_addr))?;

    info!("Listening on http://{}", bind_addr);

    axum::serve(listener, app).await?;
    journal.flush().await;

    Ok(())
}
