mod config;
mod console;
mod runner;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use common::{Role, SessionEndpoint, Symbol, log, logger};
use tokio::sync::mpsc;

use config::{CONFIG_FILE, PeerConfig, get_config_manager};

#[derive(Parser)]
#[command(name = "tictactoe_peer")]
struct Args {
    #[arg(long, default_value = CONFIG_FILE)]
    config: PathBuf,
    #[arg(long)]
    use_log_prefix: bool,
    /// Write the effective settings back to the config file
    #[arg(long)]
    save_config: bool,
    #[command(subcommand)]
    mode: Mode,
}

#[derive(Subcommand)]
enum Mode {
    /// Listen for one connector and run the tournament
    Host {
        #[arg(long)]
        port: Option<u16>,
        #[arg(long)]
        symbol: Option<Symbol>,
        #[arg(long, allow_hyphen_values = true)]
        rounds: Option<i64>,
        #[arg(long)]
        bind: Option<String>,
    },
    /// Join a host
    Connect {
        #[arg(long)]
        address: Option<String>,
    },
}

impl Mode {
    fn role(&self) -> Role {
        match self {
            Mode::Host { .. } => Role::Host,
            Mode::Connect { .. } => Role::Connector,
        }
    }

    fn apply_overrides(&self, config: &mut PeerConfig) {
        match self {
            Mode::Host {
                port,
                symbol,
                rounds,
                bind,
            } => {
                if let Some(port) = port {
                    config.host.port = *port;
                }
                if let Some(symbol) = symbol {
                    config.host.symbol = *symbol;
                }
                if let Some(rounds) = rounds {
                    config.host.rounds = *rounds;
                }
                if let Some(bind) = bind {
                    config.host.bind_address = bind.clone();
                }
            }
            Mode::Connect { address } => {
                if let Some(address) = address {
                    config.connector.address = address.clone();
                }
            }
        }
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();
    let role = args.mode.role();

    let prefix = if args.use_log_prefix {
        Some(role.to_string())
    } else {
        None
    };
    logger::init_logger(prefix);

    let config_manager = get_config_manager(&args.config);
    let mut config = config_manager.get_config()?;
    args.mode.apply_overrides(&mut config);
    config.validate_for(role)?;

    if args.save_config {
        config_manager.set_config(&config)?;
        log!("Saved config to {}", args.config.display());
    }

    let (event_sender, events) = mpsc::unbounded_channel();
    let (endpoint, receive_loop) = match role {
        Role::Host => {
            let listener =
                SessionEndpoint::listen(&config.host.listen_address(), config.host.setup(), event_sender).await?;
            println!("Waiting for a connector on {}", listener.local_addr()?);
            listener.accept().await?
        }
        Role::Connector => SessionEndpoint::connect(&config.connector.address, event_sender).await?,
    };

    let receive_task = tokio::spawn(receive_loop.run());
    runner::run(endpoint, events).await;
    receive_task.await?;

    log!("Session closed");
    Ok(())
}
