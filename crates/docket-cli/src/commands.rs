//! Command implementations

use crate::cli::ProcessArgs;
use crate::error::{CliError, Result};
use crate::output::EventPrinter;
use docket_domain::{CaseId, Confidentiality, Production};
use docket_oracle::{
    DirectoryPageSource, LlmClient, MockClient, OllamaClient, PageSource,
};
use docket_pipeline::{PipelineConfig, PipelineError, PipelineOrchestrator, RunRegistry};
use docket_progress::ProgressBus;
use docket_store::{HashEmbedder, SqliteStore, DEFAULT_DIMENSION};
use std::sync::{Arc, Mutex};
use tokio::sync::broadcast;
use tracing::warn;

/// Run a production end to end, streaming progress to stdout
pub async fn execute_process(
    args: ProcessArgs,
    config: PipelineConfig,
    printer: &EventPrinter,
) -> Result<()> {
    let case_id = match &args.case {
        Some(s) => CaseId::from_string(s).map_err(CliError::InvalidInput)?,
        None => CaseId::new(),
    };

    let pages = DirectoryPageSource::open(args.pages.clone())
        .map_err(|e| CliError::Pages(e.to_string()))?;
    let total_pages = pages.total_pages();

    let client: Arc<dyn LlmClient> = if args.mock {
        Arc::new(mock_oracle())
    } else {
        Arc::new(OllamaClient::new(&args.ollama_url, &args.model))
    };

    let store = SqliteStore::new(&args.db, DEFAULT_DIMENSION)?;
    let orchestrator = Arc::new(PipelineOrchestrator::new(
        client,
        Arc::new(Mutex::new(store)),
        Arc::new(HashEmbedder::new(DEFAULT_DIMENSION)),
        Arc::new(ProgressBus::new()),
        Arc::new(RunRegistry::new()),
        config,
    )?);

    let production = Production::new(
        case_id,
        total_pages,
        args.party.clone(),
        args.batch.clone(),
        Confidentiality::None,
    );
    let (production_id, handle) =
        orchestrator.begin_production(production, Arc::new(pages))?;

    println!("case {}  production {}", case_id, production_id);

    let bus = orchestrator.bus();
    let (backlog, mut live) = bus.subscribe(case_id, production_id)?;

    // Ctrl-C requests cooperative cancellation; a second Ctrl-C kills the
    // process the usual way
    {
        let orchestrator = Arc::clone(&orchestrator);
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                let _ = orchestrator.cancel(case_id, production_id);
            }
        });
    }

    let mut terminal_seen = false;
    for event in &backlog {
        println!("{}", printer.render(&event.kind));
        terminal_seen = terminal_seen || event.kind.is_terminal();
    }
    while !terminal_seen {
        match live.recv().await {
            Ok(event) => {
                println!("{}", printer.render(&event.kind));
                terminal_seen = event.kind.is_terminal();
            }
            Err(broadcast::error::RecvError::Lagged(missed)) => {
                warn!(missed, "progress subscriber lagged; some events not shown");
            }
            Err(broadcast::error::RecvError::Closed) => break,
        }
    }

    match handle.await {
        Ok(Ok(report)) => {
            println!("\n{}", printer.render_report(&report));
            Ok(())
        }
        Ok(Err(e)) => Err(e.into()),
        Err(e) => Err(CliError::Pipeline(PipelineError::Internal(format!(
            "run task join error: {}",
            e
        )))),
    }
}

/// Print the default configuration as TOML
pub fn execute_config() -> Result<()> {
    let toml = PipelineConfig::default()
        .to_toml()
        .map_err(CliError::Config)?;
    println!("{}", toml);
    Ok(())
}

/// Offline oracle: no boundaries, no classification, no facts. Useful for
/// exercising the pipeline plumbing without a model.
fn mock_oracle() -> MockClient {
    MockClient::with_handler(|prompt| {
        if prompt.starts_with("Classify the following") {
            Ok("{}".to_string())
        } else {
            Ok("[]".to_string())
        }
    })
}
