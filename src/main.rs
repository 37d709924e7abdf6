//! Cortical CLI - semantic fingerprint lookups against the encoding service.
//!
//! `CORTICAL_API_KEY` must be set unless the config file carries a key.

use std::error::Error;
use std::io;
use std::path::PathBuf;

use clap::{ArgAction, Parser, Subcommand};
use cortical::{CorticalClient, CorticalConfig};
use tracing_subscriber::EnvFilter;
use tracing_subscriber::filter::LevelFilter;

#[derive(Debug, Parser)]
#[command(name = "cortical")]
#[command(version)]
#[command(about = "Semantic fingerprint client", long_about = None)]
struct Cli {
    /// YAML configuration file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Raise log verbosity (-v info, -vv debug)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Fingerprint for a single term
    Fingerprint { term: String },

    /// Fingerprint for free text
    Text { text: String },

    /// Dense 0/1 string for a term
    Sdr { term: String },

    /// Terms nearest to a term's fingerprint
    Similar { term: String },

    /// Senses of a term
    Contexts { term: String },

    /// Service metrics between two texts
    Compare { left: String, right: String },

    /// Sentences and tokens
    Tokenize { text: String },

    /// Keywords of a text
    Keywords { text: String },
}

fn main() -> Result<(), Box<dyn Error>> {
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => CorticalConfig::from_file(path)?,
        None => CorticalConfig::default(),
    }
    .with_env_overrides()?;
    let mut client_config = config.into_client_config();
    client_config.verbosity = client_config.verbosity.saturating_add(cli.verbose);

    let filter = EnvFilter::builder()
        .with_default_directive(LevelFilter::from_level(client_config.log_level()).into())
        .from_env_lossy();
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();

    let client = CorticalClient::new(client_config)?;
    let output = match cli.command {
        Command::Fingerprint { term } => {
            serde_json::to_string_pretty(&client.fingerprint_for_term(&term)?)?
        }
        Command::Text { text } => {
            serde_json::to_string_pretty(&client.fingerprint_for_text(&text)?)?
        }
        Command::Sdr { term } => client.binary_string_for_term(&term)?,
        Command::Similar { term } => {
            let info = client.fingerprint_for_term(&term)?;
            serde_json::to_string_pretty(&client.nearest_terms(info.bitmap())?)?
        }
        Command::Contexts { term } => {
            serde_json::to_string_pretty(&client.term_contexts(&term)?)?
        }
        Command::Compare { left, right } => {
            let left = client.fingerprint_for_text(&left)?;
            let right = client.fingerprint_for_text(&right)?;
            serde_json::to_string_pretty(&client.compare(left.bitmap(), right.bitmap())?)?
        }
        Command::Tokenize { text } => {
            serde_json::to_string_pretty(&client.tokenize(&text)?)?
        }
        Command::Keywords { text } => {
            serde_json::to_string_pretty(&client.extract_keywords(&text)?)?
        }
    };

    println!("{output}");
    Ok(())
}
