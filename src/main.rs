use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use chatlet::config::Config;
use chatlet::gateway::{start_gateway, AppState};
use chatlet::models::OpenAiBackend;
use chatlet::store::ChatStore;

#[derive(Parser, Debug)]
#[command(name = "chatlet", version, about = "Minimal self-hosted LLM chat client")]
struct Cli {
    /// Path to configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Listen address (overrides config)
    #[arg(long)]
    addr: Option<SocketAddr>,

    /// Chats directory (overrides config)
    #[arg(long)]
    chats_dir: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    let config_path = cli
        .config
        .unwrap_or_else(|| chatlet::chatlet_home().join("config.yaml"));
    let config = Config::load(&config_path)
        .with_context(|| format!("load config {}", config_path.display()))?;

    let addr = cli.addr.unwrap_or(config.addr);
    let chats_dir = cli.chats_dir.unwrap_or_else(|| config.chats_dir());

    // Fail fast: no credential, no server.
    let backend = OpenAiBackend::from_env(&config.model)?;
    info!(model = %config.model, "completions backend ready");

    let store = ChatStore::new(&chats_dir);
    store.ensure_dir().await?;
    info!(chats_dir = %chats_dir.display(), "chat store ready");

    let state = AppState::new(Arc::new(backend), store);
    let gateway = start_gateway(addr, state, config.static_dir.clone()).await?;

    info!(addr = %gateway.addr, "chatlet listening");

    tokio::signal::ctrl_c().await?;
    info!("shutting down");
    gateway.handle.abort();

    Ok(())
}
