//! CLI for postbox
//!
//! Subcommands:
//! - `server`: run the broker behind its WebSocket server
//! - `send`: deposit a personal or topic message
//! - `read`: fetch a personal or topic message

use std::path::PathBuf;
use std::sync::Arc;

use clap::{Args, Parser, Subcommand};
use postbox::broker::{Broker, EventKind};
use postbox::client::MessagingClient;
use postbox::config::load_config_from;
use postbox::transport::{ServerResponse, start_websocket_server};
use postbox::utils::logging;
use tracing::{error, info};

const DEFAULT_URL: &str = "ws://127.0.0.1:8989";

#[derive(Parser)]
#[command(name = "postbox", version, about = "In-memory personal and topic message broker")]
struct Cli {
    /// Log level (error, warn, info, debug, trace); RUST_LOG takes precedence
    #[arg(long, global = true)]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Start the WebSocket server
    Server {
        /// Configuration file; defaults to config/default.* when present
        #[arg(long)]
        config: Option<PathBuf>,
    },
    /// Send a message to a person or a topic
    Send {
        #[arg(long, default_value = DEFAULT_URL)]
        url: String,
        #[command(flatten)]
        target: TargetKind,
        /// Recipient or topic name
        #[arg(long)]
        to: String,
        #[arg(long)]
        message: String,
        /// Topic message lifetime in seconds (topic only)
        #[arg(long)]
        timeout: Option<u64>,
    },
    /// Read a message addressed to a person or a topic
    Read {
        #[arg(long, default_value = DEFAULT_URL)]
        url: String,
        #[command(flatten)]
        target: TargetKind,
        /// Recipient or topic name
        #[arg(long)]
        name: String,
        /// Fetch every stored message instead of one
        #[arg(long)]
        all: bool,
    },
}

#[derive(Args)]
#[group(required = true, multiple = false)]
struct TargetKind {
    /// Address a personal mailbox
    #[arg(long)]
    personal: bool,
    /// Address a topic
    #[arg(long)]
    topic: bool,
}

impl TargetKind {
    fn kind(&self) -> EventKind {
        if self.topic {
            EventKind::Topic
        } else {
            EventKind::Personal
        }
    }
}

#[tokio::main]
async fn main() {
    let _ = dotenvy::dotenv();
    let cli = Cli::parse();

    let result = match cli.command {
        Command::Server { config } => run_server(config, cli.log_level).await,
        Command::Send {
            url,
            target,
            to,
            message,
            timeout,
        } => {
            logging::init(cli.log_level.as_deref().unwrap_or("warn"));
            run_send(&url, target.kind(), &to, &message, timeout).await
        }
        Command::Read {
            url,
            target,
            name,
            all,
        } => {
            logging::init(cli.log_level.as_deref().unwrap_or("warn"));
            run_read(&url, target.kind(), &name, all).await
        }
    };

    if let Err(e) = result {
        error!("{e}");
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}

async fn run_server(
    config: Option<PathBuf>,
    log_level: Option<String>,
) -> Result<(), Box<dyn std::error::Error>> {
    let settings = load_config_from(config.as_deref())?;
    logging::init(log_level.as_deref().unwrap_or(&settings.logging.level));

    let addr = format!("{}:{}", settings.server.host, settings.server.port);
    info!(
        max_timeout_secs = settings.broker.max_timeout_secs,
        personal_capacity = settings.broker.personal_capacity,
        "starting postbox"
    );
    let broker = Arc::new(Broker::new(settings.broker));

    tokio::select! {
        res = start_websocket_server(&addr, broker) => {
            res?;
            error!("WebSocket server exited unexpectedly.");
        }
        _ = tokio::signal::ctrl_c() => {
            info!("Shutdown signal received. Exiting gracefully.");
        }
    }

    Ok(())
}

async fn run_send(
    url: &str,
    kind: EventKind,
    to: &str,
    message: &str,
    timeout: Option<u64>,
) -> Result<(), Box<dyn std::error::Error>> {
    match (kind, timeout) {
        (EventKind::Topic, None) => return Err("--timeout is required with --topic".into()),
        (EventKind::Personal, Some(_)) => {
            return Err("--timeout is only valid with --topic".into());
        }
        _ => {}
    }

    let response = MessagingClient::new(url)
        .post(kind, to, message, timeout)
        .await?;
    show_response(&response);
    Ok(())
}

async fn run_read(
    url: &str,
    kind: EventKind,
    name: &str,
    all: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let response = MessagingClient::new(url).fetch(kind, name, all).await?;
    show_response(&response);
    Ok(())
}

fn show_response(response: &ServerResponse) {
    println!("Response code: {}", response.status);
    println!("Response body:\n{}", response.body);
}
