//! Tollgate local driver
//!
//! Wires the configured ticket store into `TicketService` and reads commands
//! from stdin, one per line, answering each with one line of JSON:
//!
//! ```text
//! open <plate> <lot>
//! close <ticket-id>
//! show <ticket-id>
//! remove <ticket-id>
//! quit
//! ```
//!
//! Logs go to stderr so stdout stays machine readable.

use anyhow::Context;
use serde_json::{json, Value};
use std::env;
use std::str::SplitWhitespace;
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio_util::sync::CancellationToken;
use tollgate_core::{
    config::{LogConfig, LogFormat, StoreBackend, StoreConfig},
    traits::TicketStore,
    AppConfig,
};
use tollgate_services::TicketService;
use tollgate_store::{MemoryTicketStore, RedisTicketStore};
use tracing::{info, warn};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// One parsed stdin command
#[derive(Debug, PartialEq)]
enum Command {
    Open { plate: String, lot: i32 },
    Close(String),
    Show(String),
    Remove(String),
    Quit,
}

fn id_arg(parts: &mut SplitWhitespace<'_>, verb: &str) -> Result<String, String> {
    parts
        .next()
        .map(str::to_string)
        .ok_or_else(|| format!("usage: {} <ticket-id>", verb))
}

fn parse_command(line: &str) -> Result<Command, String> {
    let mut parts = line.split_whitespace();
    let verb = parts.next().ok_or_else(|| "empty command".to_string())?;

    match verb.to_lowercase().as_str() {
        "open" | "entry" => {
            let plate = parts.next().ok_or("usage: open <plate> <lot>")?.to_string();
            let lot = parts
                .next()
                .ok_or("usage: open <plate> <lot>")?
                .parse::<i32>()
                .map_err(|e| format!("invalid lot: {}", e))?;
            Ok(Command::Open { plate, lot })
        }
        "close" | "exit" => Ok(Command::Close(id_arg(&mut parts, "close")?)),
        "show" => Ok(Command::Show(id_arg(&mut parts, "show")?)),
        "remove" => Ok(Command::Remove(id_arg(&mut parts, "remove")?)),
        "quit" => Ok(Command::Quit),
        other => Err(format!("unknown command: {}", other)),
    }
}

async fn execute<S: TicketStore + ?Sized>(
    service: &TicketService<S>,
    command: Command,
    cancel: &CancellationToken,
) -> Value {
    match command {
        Command::Open { plate, lot } => {
            // Plate validation belongs to the caller, not the core
            if plate.trim().is_empty() {
                return json!({ "error": "plate is required" });
            }
            let ticket = service.open(&plate, lot, cancel).await;
            json!({ "ticketId": ticket.id })
        }
        Command::Close(id) => match service.close(&id, cancel).await {
            Some(settlement) => json!({
                "plate": settlement.ticket.plate,
                "parkingLot": settlement.ticket.lot,
                "parkedDurationMinutes": settlement.elapsed_minutes,
                "charge": settlement.ticket.charge,
                "alreadySettled": settlement.already_settled,
            }),
            None => json!({ "error": "Ticket not found" }),
        },
        Command::Show(id) => match service.lookup(&id, cancel).await {
            Some(ticket) => json!(ticket),
            None => json!({ "error": "Ticket not found" }),
        },
        Command::Remove(id) => match service.remove(&id, cancel).await {
            Ok(()) => json!({ "removed": id }),
            Err(e) => json!({ "error": e.error_code(), "message": e.to_string() }),
        },
        Command::Quit => json!({ "bye": true }),
    }
}

/// Initialize tracing/logging
fn init_tracing(config: &LogConfig) {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(format!(
            "tollgate={},tollgate_services={},tollgate_store={},redis=warn",
            config.level, config.level, config.level
        ))
    });

    let json = config.format == LogFormat::Json;

    tracing_subscriber::registry()
        .with(env_filter)
        .with(json.then(|| fmt::layer().json().with_writer(std::io::stderr)))
        .with((!json).then(|| {
            fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(true)
                .with_file(true)
                .with_line_number(true)
        }))
        .init();
}

async fn build_store(config: &StoreConfig) -> anyhow::Result<Arc<dyn TicketStore>> {
    match config.backend {
        StoreBackend::Memory => {
            warn!("Using in-memory ticket store; tickets are lost on exit");
            Ok(Arc::new(MemoryTicketStore::new()))
        }
        StoreBackend::Redis => {
            info!(
                "Connecting to Redis ticket store, table {}",
                config.table_name
            );
            let store = RedisTicketStore::new(&config.redis_url, &config.table_name)
                .await
                .context("failed to connect to Redis")?;
            store.ping().await.context("Redis did not answer PING")?;
            info!("Redis ticket store ready, table {}", store.table());
            Ok(Arc::new(store))
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables from .env file
    dotenvy::dotenv().ok();

    let config = match env::var("TOLLGATE_CONFIG") {
        Ok(path) => AppConfig::from_file(&path),
        Err(_) => AppConfig::load(),
    }
    .context("failed to load configuration")?;

    init_tracing(&config.log);

    info!("Starting Tollgate v{}", env!("CARGO_PKG_VERSION"));

    let store = build_store(&config.store).await?;
    let service =
        TicketService::with_system_defaults(store).with_store_timeout(config.store.timeout());

    let cancel = CancellationToken::new();
    {
        let cancel = cancel.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                info!("Interrupted, shutting down");
                cancel.cancel();
            }
        });
    }

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        let line = tokio::select! {
            _ = cancel.cancelled() => break,
            line = lines.next_line() => line.context("failed to read stdin")?,
        };

        let Some(line) = line else { break };
        if line.trim().is_empty() {
            continue;
        }

        let reply = match parse_command(&line) {
            Ok(Command::Quit) => break,
            Ok(command) => execute(&service, command, &cancel).await,
            Err(message) => json!({ "error": message }),
        };
        println!("{}", reply);
    }

    info!("Tollgate stopped");
    Ok(())
}
