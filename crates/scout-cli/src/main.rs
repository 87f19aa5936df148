//! # scout
//!
//! Terminal front end for the research backend: runs a streaming research
//! session, answers human-feedback questions from stdin, and manages the
//! documents the backend can draw on.

#![deny(unsafe_code)]

mod files;
mod research;

use std::path::PathBuf;

use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use scout_core::ReportSettings;
use scout_settings::ScoutSettings;
use scout_settings::loader::{load_settings_from_path, parse_url_list, settings_path};

/// Scout research client.
#[derive(Parser, Debug)]
#[command(name = "scout", version, about = "Scout research client")]
struct Cli {
    /// Settings file (defaults to `~/.scout/settings.json`).
    #[arg(long, global = true)]
    settings: Option<PathBuf>,

    /// Log level filter (overrides settings; `RUST_LOG` wins over both).
    #[arg(long, global = true)]
    log_level: Option<String>,

    /// Backend API URL, or a comma-separated list of candidates.
    #[arg(long, global = true)]
    api_url: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run one research task and stream the report to stdout.
    Research(ResearchArgs),
    /// Manage documents on the backend.
    #[command(subcommand)]
    Files(FilesCommand),
    /// Probe `HEAD {url}/health` for each URL.
    Health {
        /// Base URLs to probe.
        #[arg(required = true)]
        urls: Vec<String>,
    },
}

#[derive(Args, Debug)]
struct ResearchArgs {
    /// The research prompt.
    task: String,

    /// Report flavour.
    #[arg(long, default_value = "research_report")]
    report_type: String,

    /// Source mode: `web`, `local`, `hybrid`, ...
    #[arg(long, default_value = "web")]
    report_source: String,

    /// Writing tone.
    #[arg(long, default_value = "Objective")]
    tone: String,

    /// Client origin used to pick the backend (e.g. `http://localhost:3000`).
    #[arg(long)]
    origin: Option<String>,
}

impl ResearchArgs {
    fn report_settings(&self) -> ReportSettings {
        ReportSettings {
            report_type: self.report_type.clone(),
            report_source: self.report_source.clone(),
            tone: self.tone.clone(),
        }
    }
}

#[derive(Subcommand, Debug)]
enum FilesCommand {
    /// List uploaded documents.
    List,
    /// Upload a local file.
    Upload {
        /// File to upload.
        path: PathBuf,
    },
    /// Delete a document by name.
    Delete {
        /// Document name as listed.
        name: String,
    },
}

/// Settings file, then environment, then command-line flags.
fn load_settings(cli: &Cli) -> ScoutSettings {
    let path = cli.settings.clone().unwrap_or_else(settings_path);
    let mut settings = load_settings_from_path(&path).unwrap_or_default();
    if let Some(level) = &cli.log_level {
        settings.logging.level.clone_from(level);
    }
    if let Some(raw) = &cli.api_url {
        let urls = parse_url_list(raw);
        if !urls.is_empty() {
            settings.endpoints.api_urls = urls;
        }
    }
    if let Command::Research(args) = &cli.command {
        if let Some(origin) = &args.origin {
            settings.endpoints.origin = Some(origin.clone());
        }
    }
    settings
}

fn init_logging(settings: &ScoutSettings) {
    if settings.logging.json {
        scout_core::logging::init_json_subscriber(&settings.logging.level);
    } else {
        scout_core::logging::init_subscriber(&settings.logging.level);
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let settings = load_settings(&cli);
    init_logging(&settings);
    if scout_settings::init_settings(settings).is_err() {
        tracing::warn!("settings were already installed; keeping the first copy");
    }
    let settings = scout_settings::get_settings();
    tracing::debug!(version = scout_core::constants::VERSION, "scout starting");

    match cli.command {
        Command::Research(args) => {
            research::run(settings.clone(), &args.task, args.report_settings()).await
        }
        Command::Files(command) => files::run(settings, command).await,
        Command::Health { urls } => files::health(settings, &urls).await,
    }
}
