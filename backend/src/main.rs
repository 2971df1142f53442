use anyhow::Context;
use backend::api::{self, AppState};
use clap::Parser;
use duelchess::EngineConfig;
use std::net::SocketAddr;
use std::path::PathBuf;
use tokio::net::TcpListener;
use tokio::sync::broadcast::error::RecvError;
use tracing::{debug, info, warn};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "backend", about = "Duel Chess HTTP server")]
struct Args {
    /// Address to listen on
    #[arg(long, env = "DUELCHESS_BIND", default_value = "0.0.0.0:3000")]
    bind: SocketAddr,

    /// Engine config file (JSON); falls back to DUELCHESS_CONFIG, then defaults
    #[arg(long)]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();
    let config = EngineConfig::resolve(args.config).context("loading engine config")?;
    info!(
        "[CONFIG] starting_bp={} max_allocation={} base_regeneration={}",
        config.starting_bp, config.max_allocation_per_duel, config.base_regeneration
    );

    let state = AppState::new(config)?;

    // Audit trail of everything the engine publishes
    let mut events = state.notifier.subscribe();
    tokio::spawn(async move {
        loop {
            match events.recv().await {
                Ok(note) => debug!(game_id = %note.game_id, event = ?note.event, "[NOTIFY]"),
                Err(RecvError::Lagged(skipped)) => {
                    warn!("[NOTIFY] Audit log lagged, skipped {} events", skipped)
                }
                Err(RecvError::Closed) => break,
            }
        }
    });

    let listener = TcpListener::bind(args.bind)
        .await
        .with_context(|| format!("binding {}", args.bind))?;
    info!("[API] Listening on {}", args.bind);
    axum::serve(listener, api::router(state)).await?;
    Ok(())
}
