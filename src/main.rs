use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use tokio::net::TcpListener;
use tracing_subscriber::EnvFilter;

use strife_game_engine::config::{load_config, load_default_config};
use strife_game_engine::registry::SessionRegistry;
use strife_game_engine::server::GameServer;

#[derive(Parser)]
#[command(name = "strife-server", about = "Fields of Strife tic-tac-toe server")]
struct Cli {
    /// Port to listen on (overrides the config file)
    #[arg(short, long, env = "STRIFE_PORT")]
    port: Option<u16>,

    /// Path to strife.toml (default: auto-discover)
    #[arg(long, env = "STRIFE_CONFIG")]
    config: Option<PathBuf>,

    /// Directory of static files (overrides the config file)
    #[arg(long, env = "STRIFE_PUBLIC_ROOT")]
    public_root: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("info".parse()?))
        .init();

    let cli = Cli::parse();

    let mut config = match cli.config {
        Some(ref path) => load_config(path).map_err(|e| format!("Failed to load config: {}", e))?,
        None => load_default_config(),
    };
    if let Some(port) = cli.port {
        config.port = port;
    }
    if let Some(root) = cli.public_root {
        config.public_root = root;
    }

    let addr: SocketAddr = format!("{}:{}", config.bind, config.port).parse()?;
    let listener = TcpListener::bind(addr).await?;
    tracing::info!(
        %addr,
        public_root = %config.public_root.display(),
        max_body_bytes = config.max_body_bytes,
        "starting game server"
    );

    let registry = Arc::new(SessionRegistry::new());
    let server = Arc::new(GameServer::new(registry, &config));
    server.serve(listener).await?;

    Ok(())
}
