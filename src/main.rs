use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use url::Url;

use meshblu_data::Result;
use meshblu_data_core::{Credentials, KeyFamily};

/// Signed data submission service.
#[derive(Parser, Debug)]
#[clap(name = "mdata", author, version, about, long_about = None)]
struct Cli {
    #[clap(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Generate a signing key pair.
    Keygen {
        /// Key family, rsa or ecdsa.
        #[clap(short, long, default_value = "rsa")]
        family: KeyFamily,

        /// Write the key files to directory.
        #[clap(parse(from_os_str))]
        dir: PathBuf,
    },
    /// Sign and save a message.
    Save {
        /// Server URL.
        #[clap(short, long, default_value = "http://127.0.0.1:9070")]
        server: Url,

        /// PEM private key for the signature.
        #[clap(short, long, env = "MDATA_PRIVATE_KEY", parse(from_os_str))]
        key: PathBuf,

        /// Key identifier sent with the signature.
        #[clap(long, default_value = "mdata")]
        key_id: String,

        /// Route hops, the first is the sending device.
        #[clap(short, long, required = true)]
        route: Vec<String>,

        /// JSON file containing the message data.
        #[clap(parse(from_os_str))]
        file: PathBuf,
    },
    /// List stored data.
    List {
        /// Server URL.
        #[clap(short, long, default_value = "http://127.0.0.1:9070")]
        server: Url,

        /// Credential identifier.
        #[clap(short, long, env = "MDATA_AUTH_ID")]
        uuid: String,

        /// Credential token.
        #[clap(short, long, env = "MDATA_AUTH_TOKEN")]
        token: String,

        /// Device that sent the data.
        #[clap(short, long)]
        device: Option<String>,

        /// Sensor of the device, requires a device.
        #[clap(long, requires = "device")]
        sensor: Option<String>,

        /// Query parameters as name=value.
        #[clap(short, long, parse(try_from_str = parse_param))]
        query: Vec<(String, String)>,
    },
    /// Start a server.
    Server {
        /// Bind to host:port.
        #[clap(short, long, default_value = "127.0.0.1:9070")]
        bind: String,

        /// Config file to load.
        #[clap(short, long, parse(from_os_str))]
        config: PathBuf,
    },
}

fn parse_param(value: &str) -> std::result::Result<(String, String), String> {
    value
        .split_once('=')
        .map(|(name, value)| (name.to_owned(), value.to_owned()))
        .ok_or_else(|| format!("expected name=value, got {}", value))
}

async fn run() -> Result<()> {
    let args = Cli::parse();

    match args.command {
        Command::Keygen { family, dir } => {
            let public_key = meshblu_data_client::keygen(dir, family).await?;
            println!("{}", public_key);
        }
        Command::Save {
            server,
            key,
            key_id,
            route,
            file,
        } => {
            meshblu_data_client::save(server, key, key_id, route, file).await?;
        }
        Command::List {
            server,
            uuid,
            token,
            device,
            sensor,
            query,
        } => {
            let doc = meshblu_data_client::list(
                server,
                Credentials::new(uuid, token),
                device,
                sensor,
                query,
            )
            .await?;
            serde_json::to_writer_pretty(std::io::stdout(), &doc)?;
        }
        Command::Server { bind, config } => {
            meshblu_data_server::start(bind, config).await?;
        }
    }

    Ok(())
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
