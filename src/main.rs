#![forbid(unsafe_code)]

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing_subscriber::{EnvFilter, fmt::format::FmtSpan};

use perf_triage::config::load_config;
use perf_triage::{check_cmd, export_cmd, ingest_cmd, new_cmd, parse_cmd, render_cmd};

#[derive(Parser, Debug)]
#[command(name = "perf-triage")]
#[command(about = "Parse, check and archive weekly performance triage logs", long_about = None)]
struct Cli {
    /// Enable verbose logging (or set PERF_TRIAGE_LOG)
    #[arg(long, global = true)]
    verbose: bool,

    /// Path to triage.toml (defaults are used when omitted)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Parse one triage log and print it as JSON
    Parse {
        /// Path to the triage log (Markdown)
        file: PathBuf,
        /// Write the JSON to this file instead of stdout
        #[arg(long)]
        json: Option<PathBuf>,
    },

    /// Parse and validate a batch of triage logs
    Check {
        /// Files or directories to check
        #[arg(required = true)]
        paths: Vec<PathBuf>,
        /// Write machine-readable JSON report to this file
        #[arg(long)]
        json: Option<PathBuf>,
        /// Write Markdown report to this file
        #[arg(long)]
        markdown: Option<PathBuf>,
        /// Fail the run on validation warnings too
        #[arg(long)]
        strict: bool,
    },

    /// Rewrite a triage log in canonical form
    Render {
        /// Path to the triage log (Markdown)
        file: PathBuf,
        /// Write to this file instead of stdout
        #[arg(long)]
        output: Option<PathBuf>,
    },

    /// Scaffold an empty triage log
    New {
        /// Log date (YYYY-MM-DD)
        #[arg(long)]
        date: String,
        /// Triager handle
        #[arg(long)]
        author: String,
        /// First commit of the revision range
        #[arg(long)]
        start: String,
        /// Last commit of the revision range
        #[arg(long)]
        end: String,
        /// Write to this file instead of stdout
        #[arg(long)]
        output: Option<PathBuf>,
    },

    /// Append parsed logs to the JSONL history store
    Ingest {
        /// Files or directories to ingest
        #[arg(required = true)]
        paths: Vec<PathBuf>,
        /// Path to the JSONL history store
        #[arg(long)]
        store: PathBuf,
    },

    /// Export the history store to CSV
    Export {
        /// Path to the JSONL history store
        #[arg(long)]
        store: PathBuf,
        /// Write CSV to this file instead of stdout
        #[arg(long)]
        csv: Option<PathBuf>,
        /// Only export logs triaged by this handle
        #[arg(long)]
        author: Option<String>,
    },
}

fn init_tracing(verbose: bool) {
    let env = std::env::var("PERF_TRIAGE_LOG").unwrap_or_else(|_| {
        if verbose { "perf_triage=debug".to_string() } else { "perf_triage=info".to_string() }
    });
    let _ = tracing_subscriber::fmt()
        .with_span_events(FmtSpan::ACTIVE)
        .with_writer(std::io::stderr)
        .with_ansi(true)
        .with_env_filter(EnvFilter::new(env))
        .try_init();
}

fn main() {
    color_eyre::install().ok();
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let result = load_config(cli.config.as_deref()).and_then(|config| match cli.command {
        Commands::Parse { file, json } => parse_cmd::run(file, json).map(|_| 0),
        Commands::Check { paths, json, markdown, strict } => {
            check_cmd::run(paths, &config.check, strict, json, markdown)
        }
        Commands::Render { file, output } => render_cmd::run(file, output).map(|_| 0),
        Commands::New { date, author, start, end, output } => {
            new_cmd::run(&config.links, date, author, start, end, output).map(|_| 0)
        }
        Commands::Ingest { paths, store } => ingest_cmd::run(paths, &config.check, store),
        Commands::Export { store, csv, author } => export_cmd::run(store, csv, author).map(|_| 0),
    });

    match result {
        Ok(code) => std::process::exit(code),
        Err(e) => {
            eprintln!("{:#}", e);
            std::process::exit(1);
        }
    }
}
