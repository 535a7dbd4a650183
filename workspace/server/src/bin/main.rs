use clap::Parser;

use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use meshblu_data_server::Result;

/// Signed data service.
#[derive(Parser, Debug)]
#[clap(name = "mdata-server", author, version, about, long_about = None)]
struct Cli {
    /// Bind to host:port.
    #[clap(short, long, default_value = "127.0.0.1:9070")]
    bind: String,

    /// Config file to load.
    #[clap(short, long, parse(from_os_str))]
    config: PathBuf,
}

async fn run() -> Result<()> {
    let args = Cli::parse();
    meshblu_data_server::start(args.bind, args.config).await
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    match run().await {
        Ok(_) => {}
        Err(e) => {
            tracing::error!("{}", e);
        }
    }
    Ok(())
}
