#![forbid(unsafe_code)]

//! cvsearch CLI
//!
//! Faceted search over Common Voice transcription records: serve the
//! search page, run one-shot searches, and load the index.

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use cvsearch_core::Settings;

mod commands;
mod page;
mod serve;

/// cvsearch - transcription search administration and serving
#[derive(Parser, Debug)]
#[command(name = "cvsearch")]
#[command(about = "Faceted search over Common Voice transcription records", long_about = None)]
struct Args {
    /// Configuration file path
    #[arg(short, long, env = "CVSEARCH_CONFIG")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Serve the search page over HTTP
    Serve {
        /// Address to bind
        #[arg(short, long, default_value = "127.0.0.1:8080", env = "CVSEARCH_BIND")]
        bind: String,
    },
    /// Run one search and print the page to the terminal
    Search {
        /// Free-text search term
        term: Option<String>,
        /// Filter by gender
        #[arg(long)]
        gender: Option<String>,
        /// Filter by age bucket label (18-30, 31-50, 51+)
        #[arg(long)]
        age: Option<String>,
        /// Filter by accent
        #[arg(long)]
        accent: Option<String>,
        /// Page to fetch
        #[arg(long, default_value_t = 1)]
        page: usize,
    },
    /// Create the index with settings and mappings
    Init,
    /// Bulk-import a Common Voice CSV into the index
    Import {
        /// CSV file to load
        file: PathBuf,
        /// Documents per bulk request
        #[arg(long, default_value_t = 500)]
        batch_size: usize,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();
    let settings = Settings::load(args.config.as_deref())?;

    match args.command {
        Command::Serve { bind } => serve::run(settings, &bind).await,
        Command::Search {
            term,
            gender,
            age,
            accent,
            page,
        } => commands::search(settings, term, gender, age, accent, page).await,
        Command::Init => commands::init(settings).await,
        Command::Import { file, batch_size } => {
            commands::import(settings, &file, batch_size).await
        }
    }
}
