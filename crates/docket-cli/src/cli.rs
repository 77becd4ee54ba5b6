//! CLI command definitions and argument parsing

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// docket - segment legal productions and extract facts
#[derive(Debug, Parser)]
#[command(name = "docket")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Pipeline configuration file (TOML); defaults apply when omitted
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    #[command(subcommand)]
    pub command: Command,
}

/// CLI commands
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Process a production from a directory of page text files
    Process(ProcessArgs),

    /// Print the default configuration as TOML
    Config,
}

/// Arguments for the process command
#[derive(Debug, Parser)]
pub struct ProcessArgs {
    /// Directory of pre-extracted page text (page-0001.txt, ...)
    pub pages: PathBuf,

    /// Case that owns the production (UUID); a fresh case when omitted
    #[arg(long)]
    pub case: Option<String>,

    /// SQLite database path
    #[arg(long, default_value = "docket.db")]
    pub db: PathBuf,

    /// Party that produced the documents
    #[arg(long, default_value = "Unknown")]
    pub party: String,

    /// Producing party's batch identifier
    #[arg(long, default_value = "VOL001")]
    pub batch: String,

    /// Use the offline mock oracle instead of Ollama
    #[arg(long)]
    pub mock: bool,

    /// Ollama endpoint
    #[arg(long, env = "DOCKET_OLLAMA_URL", default_value = "http://localhost:11434")]
    pub ollama_url: String,

    /// Ollama model name
    #[arg(long, env = "DOCKET_MODEL", default_value = "llama3.1")]
    pub model: String,
}
