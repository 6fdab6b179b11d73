use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use sgsync::api::{ApiClient, Credentials};
use sgsync::config::Config;
use sgsync::ingress::{self, model::DesiredIngress};
use std::path::PathBuf;
use tracing::Level;

/// Reconcile security group ingress rules
#[derive(Parser, Debug)]
#[command(name = "sgsync", version = sgsync::VERSION, about, long_about = None)]
struct Args {
    /// API endpoint (overrides config and region default)
    #[arg(long)]
    endpoint: Option<String>,

    /// Log level for debugging
    #[arg(long, value_enum, default_value = "off")]
    log_level: LogLevel,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Reconcile a group's rules for one port against the declared set
    Sync {
        /// Target security group id
        #[arg(long)]
        group: String,

        /// TCP port the rules apply to
        #[arg(long)]
        port: u16,

        /// Allowed CIDR block or bare IPv4 address (repeatable)
        #[arg(long = "cidr")]
        cidrs: Vec<String>,

        /// Allowed peer group name (repeatable)
        #[arg(long = "peer")]
        peers: Vec<String>,

        /// Network scope for peer name resolution
        #[arg(long)]
        vpc: Option<String>,

        /// Compute and print the plan without applying it
        #[arg(long)]
        dry_run: bool,
    },
    /// Remove every rule for one port on a group
    Clear {
        /// Target security group id
        #[arg(long)]
        group: String,

        /// TCP port the rules apply to
        #[arg(long)]
        port: u16,

        /// Compute and print the plan without applying it
        #[arg(long)]
        dry_run: bool,
    },
    /// Print the live rule set for one port on a group
    Show {
        /// Target security group id
        #[arg(long)]
        group: String,

        /// TCP port the rules apply to
        #[arg(long)]
        port: u16,
    },
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum LogLevel {
    Off,
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    fn to_tracing_level(self) -> Option<Level> {
        match self {
            LogLevel::Off => None,
            LogLevel::Error => Some(Level::ERROR),
            LogLevel::Warn => Some(Level::WARN),
            LogLevel::Info => Some(Level::INFO),
            LogLevel::Debug => Some(Level::DEBUG),
            LogLevel::Trace => Some(Level::TRACE),
        }
    }
}

fn setup_logging(level: LogLevel) -> Option<tracing_appender::non_blocking::WorkerGuard> {
    let tracing_level = level.to_tracing_level()?;

    let log_path = get_log_path();

    if let Some(parent) = log_path.parent() {
        let _ = std::fs::create_dir_all(parent);
    }

    let file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(&log_path)
        .expect("Failed to open log file");

    let (non_blocking, guard) = tracing_appender::non_blocking(file);

    tracing_subscriber::fmt()
        .with_max_level(tracing_level)
        .with_writer(non_blocking)
        .with_ansi(false)
        .with_target(true)
        .with_thread_ids(false)
        .with_file(true)
        .with_line_number(true)
        .init();

    tracing::info!("sgsync started with log level: {:?}", level);
    tracing::info!("Log file: {:?}", log_path);

    Some(guard)
}

fn get_log_path() -> PathBuf {
    if let Some(config_dir) = dirs::config_dir() {
        return config_dir.join("sgsync").join("sgsync.log");
    }
    if let Some(home) = dirs::home_dir() {
        return home.join(".sgsync").join("sgsync.log");
    }
    PathBuf::from("sgsync.log")
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let _log_guard = setup_logging(args.log_level);

    let config = Config::load();
    let endpoint = args
        .endpoint
        .clone()
        .unwrap_or_else(|| config.effective_endpoint());

    let credentials = Credentials::resolve()?;
    let client = ApiClient::new(&endpoint, credentials)?;

    match args.command {
        Command::Sync {
            group,
            port,
            cidrs,
            peers,
            vpc,
            dry_run,
        } => {
            let desired = DesiredIngress {
                group_id: group,
                port,
                cidrs,
                peer_names: peers,
                vpc_id: vpc.or(config.vpc_id),
            };
            let outcome = if dry_run {
                ingress::plan(&client, &desired).await?
            } else {
                ingress::reconcile(&client, &desired).await?
            };
            report(&outcome, dry_run)?;
        }
        Command::Clear { group, port, dry_run } => {
            let outcome = if dry_run {
                let desired = DesiredIngress {
                    group_id: group,
                    port,
                    cidrs: Vec::new(),
                    peer_names: Vec::new(),
                    vpc_id: None,
                };
                ingress::plan(&client, &desired).await?
            } else {
                ingress::clear(&client, &group, port).await?
            };
            report(&outcome, dry_run)?;
        }
        Command::Show { group, port } => {
            let live = ingress::fetch::fetch_live(&client, &group, port).await;
            println!("{}", serde_json::to_string_pretty(&live)?);
        }
    }

    Ok(())
}

fn report(outcome: &ingress::ReconcileOutcome, dry_run: bool) -> Result<()> {
    println!(
        "{}",
        serde_json::to_string_pretty(outcome).context("failed to render outcome")?
    );
    for name in &outcome.unresolved {
        eprintln!("warning: peer group name {name:?} resolved to no group");
    }
    if dry_run && !outcome.plan.is_empty() {
        eprintln!("dry run: plan not applied");
    }
    Ok(())
}
