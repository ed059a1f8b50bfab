//! Tidewave - session engine host
//!
//! Reads one JSON command per stdin line, drives the browser session and
//! writes one JSON reply per stdout line. Logs go to stderr.

mod host;
mod ipc;

use anyhow::Context;
use clap::Parser;
use host::{spawn_reader, Host};
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::path::PathBuf;
use tidewave_core::{
    init_logging, Config, JsonFileStore, LogConfig, LogFormat, MemoryStore, PersistentStore,
};
use tidewave_shell::BrowserSession;
use tokio::io::BufReader;
use tracing::{error, info};

#[derive(Parser, Debug)]
#[command(name = "tidewave")]
#[command(about = "Simulated browser session engine driven by JSON commands")]
#[command(version)]
struct Args {
    /// JSON configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Directory for persisted session state (overrides the config)
    #[arg(long)]
    data_dir: Option<PathBuf>,

    /// Keep all state in memory; nothing survives the process
    #[arg(long)]
    memory: bool,

    /// Seed for the simulation RNG, for reproducible runs
    #[arg(long)]
    seed: Option<u64>,

    /// Log output format: pretty, compact or json
    #[arg(long, default_value = "pretty")]
    log_format: LogFormat,

    /// Verbose logging
    #[arg(short, long)]
    verbose: bool,
}

fn main() {
    let args = Args::parse();

    let log_config = if args.verbose {
        LogConfig::debug()
    } else {
        LogConfig::default()
    };
    init_logging(log_config.with_format(args.log_format));

    info!("Starting Tidewave...");

    if let Err(e) = run(args) {
        error!("Fatal: {:#}", e);
        std::process::exit(1);
    }
}

fn run(args: Args) -> anyhow::Result<()> {
    let mut config = match args.config {
        Some(ref path) => Config::load(path)
            .with_context(|| format!("loading config from {}", path.display()))?,
        None => Config::default(),
    };
    if let Some(dir) = args.data_dir {
        config.data_dir = dir;
    }

    let store: Box<dyn PersistentStore> = if args.memory {
        info!("Using in-memory store");
        Box::new(MemoryStore::new())
    } else {
        Box::new(JsonFileStore::open(&config.data_dir)?)
    };

    let export_dir = std::env::current_dir().unwrap_or_else(|_| config.data_dir.clone());
    let rng = match args.seed {
        Some(seed) => {
            info!("Simulation seed: {}", seed);
            StdRng::seed_from_u64(seed)
        }
        None => StdRng::from_entropy(),
    };

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("building runtime")?;

    runtime.block_on(async move {
        let session = BrowserSession::open(store, config).with_rng(rng);
        let (host, loads_rx) = Host::new(session, export_dir);
        let (commands, reader) = spawn_reader(BufReader::new(tokio::io::stdin()));

        let session = host.run(loads_rx, commands, tokio::io::stdout()).await?;
        reader.abort();

        info!(
            url = %session.current_url(),
            bookmarks = session.bookmarks().len(),
            "Session closed"
        );
        Ok::<(), anyhow::Error>(())
    })
}
