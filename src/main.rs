//! Take Six table server (default binary).
//!
//! Usage: `take-six-server <port> <players-per-game> [options]`

use anyhow::{Context, Result};
use clap::Parser;
use tracing::info;

use take_six::server::{check_tcp_listen_available, logging, run_server, Args, ServerConfig};

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    logging::init(args.debug)?;

    let config = ServerConfig::from_env().with_args(&args);
    config.validate()?;

    check_tcp_listen_available(&config.host, config.port)
        .with_context(|| format!("cannot listen on {}", config.bind_addr()))?;

    info!(
        port = config.port,
        players_per_game = config.players_per_game,
        score_limit = config.score_limit,
        log_dir = ?config.log_dir,
        "starting server"
    );

    tokio::select! {
        result = run_server(config, None) => result,
        _ = tokio::signal::ctrl_c() => {
            info!("shutting down");
            Ok(())
        }
    }
}
