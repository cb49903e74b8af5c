use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use serde_json::json;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;
use tracktrace_core::app::initialize;
use tracktrace_core::impls::{InMemoryTableStore, StoreSnapshot};
use tracktrace_core::ports::{SystemClock, UlidGenerator};
use tracktrace_core::{AssemblyLine, Dispatcher, Operation, PackageLine, StoreConfig};

#[derive(Parser, Debug)]
#[command(author, version, about = "Track assemblies and packages through manufacturing", long_about = None)]
struct Args {
    /// JSON snapshot holding the tables between runs. Created on first write.
    #[arg(long, value_name = "FILE", default_value = "tracktrace-state.json")]
    state: PathBuf,
    /// JSON store configuration (timestamp_format, check_references, prefer_atomic_replace).
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,
    /// Default log level when RUST_LOG is unset.
    #[arg(long, default_value = "warn")]
    log_level: String,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run one named operation with positional arguments.
    Invoke {
        operation: String,
        #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
        args: Vec<String>,
    },
    /// Record counts per status for both tables.
    Stats,
    /// List the operation names the dispatcher accepts.
    Operations,
}

type CliDispatcher = Dispatcher<InMemoryTableStore, UlidGenerator<SystemClock>, SystemClock>;

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let args = Args::parse();
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&args.log_level)),
        )
        .init();

    if let Command::Operations = args.command {
        for op in Operation::ALL {
            let kind = if op.is_query() { "query" } else { "invoke" };
            println!("{op}\t{kind}");
        }
        return Ok(ExitCode::SUCCESS);
    }

    let config = load_config(args.config.as_deref())?;
    let store = load_state(&args.state)?;
    initialize(&store)
        .await
        .context("failed to initialize tables")?;
    let dispatcher: CliDispatcher = Dispatcher::with_config(
        store.clone(),
        UlidGenerator::new(SystemClock),
        SystemClock,
        config,
    );

    match args.command {
        Command::Invoke { operation, args: op_args } => {
            let outcome = dispatcher.respond(&operation, &op_args).await;
            let mutating = operation
                .parse::<Operation>()
                .map(|op| !op.is_query())
                .unwrap_or(false);
            if mutating {
                save_state(&args.state, &store.snapshot().await)?;
            }
            match outcome {
                Ok(payload) => {
                    print_payload(&payload)?;
                    Ok(ExitCode::SUCCESS)
                }
                Err(failure) => {
                    eprintln!("{}", String::from_utf8_lossy(&failure));
                    Ok(ExitCode::FAILURE)
                }
            }
        }
        Command::Stats => {
            let records = dispatcher.record_store();
            let assemblies = records.status_counts::<AssemblyLine>().await?;
            let packages = records.status_counts::<PackageLine>().await?;
            let report = json!({ "assemblies": assemblies, "packages": packages });
            println!("{}", serde_json::to_string_pretty(&report)?);
            Ok(ExitCode::SUCCESS)
        }
        Command::Operations => Ok(ExitCode::SUCCESS),
    }
}

fn load_config(path: Option<&Path>) -> Result<StoreConfig> {
    let Some(path) = path else {
        return Ok(StoreConfig::default());
    };
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read config from {}", path.display()))?;
    StoreConfig::from_json(&text)
        .with_context(|| format!("invalid config in {}", path.display()))
}

fn load_state(path: &Path) -> Result<InMemoryTableStore> {
    if !path.exists() {
        debug!(path = %path.display(), "no snapshot yet; starting empty");
        return Ok(InMemoryTableStore::new());
    }
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read state from {}", path.display()))?;
    let snapshot: StoreSnapshot = serde_json::from_str(&text)
        .with_context(|| format!("corrupt state file {}", path.display()))?;
    Ok(InMemoryTableStore::from_snapshot(snapshot))
}

fn save_state(path: &Path, snapshot: &StoreSnapshot) -> Result<()> {
    let text = serde_json::to_string_pretty(snapshot)?;
    std::fs::write(path, text)
        .with_context(|| format!("failed to write state to {}", path.display()))?;
    info!(path = %path.display(), tables = snapshot.table_names().count(), "state saved");
    Ok(())
}

fn print_payload(payload: &[u8]) -> Result<()> {
    if payload.is_empty() {
        return Ok(());
    }
    let value: serde_json::Value = serde_json::from_slice(payload)?;
    println!("{}", serde_json::to_string_pretty(&value)?);
    Ok(())
}
