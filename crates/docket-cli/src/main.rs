//! docket CLI - command-line interface for the production pipeline

use clap::Parser;
use docket_cli::{commands, Cli, CliError, Command, EventPrinter};
use docket_pipeline::PipelineConfig;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    if let Err(e) = run().await {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

async fn run() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => {
            let raw = std::fs::read_to_string(path)?;
            PipelineConfig::from_toml(&raw).map_err(CliError::Config)?
        }
        None => PipelineConfig::default(),
    };

    let printer = EventPrinter::new(!cli.no_color);

    match cli.command {
        Command::Process(args) => commands::execute_process(args, config, &printer).await?,
        Command::Config => commands::execute_config()?,
    }

    Ok(())
}
