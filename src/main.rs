//! # Shift Lookup CLI (`shifts`)
//!
//! ## Commands
//!
//! | Command | Description |
//! |---------|-------------|
//! | `shifts lookup <id>` | Look up one 9-digit identifier |
//! | `shifts history` | Show this device's recent searches, grouped by day |
//! | `shifts interactive` | Read identifiers from stdin, one search per line |
//! | `shifts scan <source> <term>` | Scan a CSV sheet (file or URL) for a term |
//! | `shifts device` | Print this installation's device identity |
//!
//! Logging goes to stderr and is controlled by `RUST_LOG` (default `warn`).

use anyhow::Result;
use chrono::Local;
use clap::{Parser, Subcommand};
use shift_lookup::config::{self, Config};
use shift_lookup::core::grid::search_in_grid;
use shift_lookup::firestore::FirestoreClient;
use shift_lookup::{grid_source, identity, render, LookupApp};
use std::io::Write;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing_subscriber::EnvFilter;

/// Shift Lookup: look up work-shift schedules by identifier.
#[derive(Parser)]
#[command(
    name = "shifts",
    about = "Look up work-shift schedules by a 9-digit identifier",
    version
)]
struct Cli {
    /// Path to configuration file (TOML).
    #[arg(long, global = true, default_value = "./config/shifts.toml")]
    config: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Look up the schedule for one identifier.
    ///
    /// Loads this device's history, runs the search, prints the result
    /// cards, and records the search in the remote history log.
    Lookup {
        /// The 9-digit identifier.
        term: String,
    },

    /// Show recent searches for this device, grouped by day.
    History,

    /// Read identifiers from stdin and search each one.
    ///
    /// Every line is treated as the full contents of the input box.
    Interactive,

    /// Scan a CSV sheet for a term and print the reconstructed shift lines.
    ///
    /// Does not read the config file or contact the remote store.
    Scan {
        /// Local CSV path or `http(s)://` URL.
        source: String,
        /// Case-insensitive substring to look for.
        term: String,
        /// Print matches as JSON.
        #[arg(long)]
        json: bool,
    },

    /// Print (creating if needed) the device identity.
    Device,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    // Commands that don't require a valid config
    match &cli.command {
        Commands::Scan { source, term, json } => {
            return run_scan(source, term, *json).await;
        }
        Commands::Device => {
            let cfg = config::load_config(&cli.config).unwrap_or_else(|_| Config::minimal());
            let device = identity::resolve_or_create(&cfg.device.identity_path)?;
            println!("{}", device);
            return Ok(());
        }
        _ => {}
    }

    let cfg = config::load_config(&cli.config)?;
    let device = identity::resolve_or_create(&cfg.device.identity_path)?;
    let store = Arc::new(FirestoreClient::new(&cfg.remote)?);
    let mut app = LookupApp::new(store, cfg.history.limit);
    app.start(device).await;

    match cli.command {
        Commands::Lookup { term } => {
            let state = app.search(&term).await;
            print!("{}", render::search_outcome(state));
        }
        Commands::History => {
            print_history(&app);
        }
        Commands::Interactive => {
            run_interactive(&mut app).await?;
        }
        Commands::Scan { .. } | Commands::Device => {
            // Handled above (before config loading)
            unreachable!()
        }
    }

    app.flush().await;
    Ok(())
}

async fn run_scan(source: &str, term: &str, json: bool) -> Result<()> {
    let grid = grid_source::load_grid(source).await?;
    let found = search_in_grid(&grid, term);
    tracing::info!(rows = grid.len(), matches = found.len(), "scan finished");

    if json {
        println!("{}", serde_json::to_string_pretty(&found)?);
    } else if found.is_empty() {
        println!("{}", render::not_found(term));
    } else {
        print!("{}", render::matches(&found));
    }
    Ok(())
}

fn print_history(app: &LookupApp<FirestoreClient>) {
    let history = &app.state().history;
    if history.is_empty() {
        println!("Chưa có lịch sử tra cứu.");
        return;
    }
    print!(
        "{}",
        render::history(history, Local::now().date_naive(), &Local)
    );
}

async fn run_interactive(app: &mut LookupApp<FirestoreClient>) -> Result<()> {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    loop {
        print!("> ");
        std::io::stdout().flush()?;

        let Some(line) = lines.next_line().await? else {
            break;
        };
        match line.strip_suffix('\r').unwrap_or(&line) {
            ":history" => print_history(app),
            ":quit" => break,
            term => {
                let state = app.search(term).await;
                print!("{}", render::search_outcome(state));
            }
        }
    }
    Ok(())
}
