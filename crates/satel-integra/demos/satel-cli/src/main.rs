//! Command-line front end for `satel-integra`: connects to a panel, issues a
//! single command, and prints whatever comes back. Useful for poking at a
//! real panel during development; not meant as a long-running agent — for
//! that, use `satel_integra::Client` directly and consume its event stream.

use clap::{Parser, Subcommand};
use satel_integra::{ArmMode, Client, ClientConfig, ClientEvent, ClientStatus};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "satel-cli")]
#[command(about = "Talk to a Satel Integra panel over its integration protocol")]
struct Args {
    /// Panel host or IP address.
    #[arg(long)]
    host: String,

    /// TCP port. Defaults to the plaintext port, or the encrypted port when
    /// `--integration-key` is given.
    #[arg(long)]
    port: Option<u16>,

    /// Integration key, enabling AES-192 encryption on the encrypted port.
    #[arg(long)]
    integration_key: Option<String>,

    /// User code used for commands that need one.
    #[arg(long, default_value = "")]
    user_code: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Read and print the panel's version and capabilities.
    Version,
    /// Arm the given partitions in mode 0.
    Arm {
        #[arg(required = true)]
        parts: Vec<u16>,
    },
    /// Disarm the given partitions.
    Disarm {
        #[arg(required = true)]
        parts: Vec<u16>,
    },
    /// Connect and print every event until interrupted.
    Watch,
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .without_time()
        .init();

    let args = Args::parse();

    let rt = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .expect("failed to create runtime");

    rt.block_on(run(args));
}

async fn run(args: Args) {
    let mut config = match &args.integration_key {
        Some(key) => ClientConfig::tcp_encrypted(&args.host, key),
        None => ClientConfig::tcp(&args.host, args.port.unwrap_or(satel_integra::DEFAULT_TCP_PORT)),
    };
    if let Some(port) = args.port {
        config = match config.endpoint {
            satel_integra::Endpoint::Tcp { host, .. } => {
                ClientConfig { endpoint: satel_integra::Endpoint::Tcp { host, port }, ..config }
            }
            other => ClientConfig { endpoint: other, ..config },
        };
    }
    config = config.with_user_code(args.user_code).with_auto_reconnect(false).with_retries(0);

    let (client, mut events) = Client::new(config);

    tracing::info!("waiting for connection");
    loop {
        match events.recv().await {
            Some(ClientEvent::Status(ClientStatus::Connected)) => break,
            Some(ClientEvent::Status(ClientStatus::Disconnected)) => {
                tracing::error!("failed to connect");
                std::process::exit(1);
            }
            Some(_) => continue,
            None => std::process::exit(1),
        }
    }
    tracing::info!("connected");

    match args.command {
        Command::Version => match client.read_integra_version().await {
            Ok(version) => println!("{version:?}"),
            Err(e) => tracing::error!(error = %e, "failed to read version"),
        },
        Command::Arm { parts } => match client.arm(ArmMode::Mode0, &parts, None).await {
            Ok(()) => println!("armed partitions {parts:?}"),
            Err(e) => tracing::error!(error = %e, "arm failed"),
        },
        Command::Disarm { parts } => match client.disarm(&parts, None).await {
            Ok(()) => println!("disarmed partitions {parts:?}"),
            Err(e) => tracing::error!(error = %e, "disarm failed"),
        },
        Command::Watch => {
            while let Some(event) = events.recv().await {
                println!("{event:?}");
            }
        }
    }

    client.disconnect().await;
}
