use std::path::PathBuf;
use std::rc::Rc;

use clap::Parser;
use h2wire::handler::HandlerRegistry;
use h2wire::reactor::{drive, EventLoop};
use h2wire::{Connection, ConnectionConfig};
use tokio::net::TcpStream;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "h2-client")]
#[command(about = "Connect to a framed server and send the client SETTINGS")]
struct Args {
    /// Server host name or address
    host: String,

    /// Server port
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
    local.block_on(&runtime, run(args.host, args.port, config))
}

async fn run(host: String, port: u16, config: ConnectionConfig) -> h2wire::Result<()> {
    let stream = TcpStream::connect((host.as_str(), port)).await?;
    tracing::info!("Connected to {}", stream.peer_addr()?);

    let settings = config.initial_settings.clone();
    let mut conn = Connection::with_config(
        stream,
        EventLoop::new(),
        config,
        Rc::new(HandlerRegistry::standard()),
    )?;
    conn.settings_send(&settings)?;

    drive(&mut conn).await;
    Ok(())
}
