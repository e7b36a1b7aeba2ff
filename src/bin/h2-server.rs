use std::path::PathBuf;
use std::rc::Rc;

use clap::Parser;
use h2wire::handler::HandlerRegistry;
use h2wire::reactor::{drive, EventLoop};
use h2wire::{Connection, ConnectionConfig};
use tokio::net::TcpListener;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "h2-server")]
#[command(about = "Accept framed connections and answer the SETTINGS handshake")]
struct Args {
    /// Port to listen on
    #[arg(short, long, default_value_t = 8080)]
    port: u16,

    /// Connection configuration file (JSON)
    #[arg(long)]
    config: Option<PathBuf>,
}

fn main() -> h2wire::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let args = Args::parse();
    let config = match &args.config {
        Some(path) => ConnectionConfig::from_json_file(path)?,
        None => ConnectionConfig::default(),
    };

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;
    let local = tokio::task::LocalSet::new();
    local.block_on(&runtime, serve(args.port, config))
}

async fn serve(port: u16, config: ConnectionConfig) -> h2wire::Result<()> {
    let listener = TcpListener::bind(("0.0.0.0", port)).await?;
    tracing::info!("Listening on {}", listener.local_addr()?);

    let events = EventLoop::new();
    let registry = Rc::new(HandlerRegistry::standard());

    loop {
        let (stream, peer) = match listener.accept().await {
            Ok(accepted) => accepted,
            Err(e) => {
                tracing::warn!("accept failed: {}", e);
                continue;
            }
        };
        tracing::info!("Accepted connection from {}", peer);

        match Connection::with_config(stream, events.clone(), config.clone(), Rc::clone(&registry)) {
            Ok(mut conn) => {
                tokio::task::spawn_local(async move { drive(&mut conn).await });
            }
            Err(e) => tracing::error!("Failed to set up connection from {}: {}", peer, e),
        }
    }
}
