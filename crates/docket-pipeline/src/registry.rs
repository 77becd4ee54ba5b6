//! Run registry and cancellation
//!
//! Every live run is registered under its production id with the case
//! that owns it. Cancellation flips a watch channel the orchestrator
//! polls between units of work: no new pool work is dispatched, in-flight
//! calls finish or time out, and persisted data stays.

use crate::error::PipelineError;
use docket_domain::{CaseId, ProductionId};
use std::collections::HashMap;
use std::sync::Mutex;
use tokio::sync::watch;
use tracing::info;

struct RunEntry {
    case_id: CaseId,
    cancel: watch::Sender<bool>,
}

/// Registry of live production runs
#[derive(Default)]
pub struct RunRegistry {
    runs: Mutex<HashMap<ProductionId, RunEntry>>,
}

impl RunRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a run and get its cancellation receiver
    pub fn register(&self, case_id: CaseId, production_id: ProductionId) -> watch::Receiver<bool> {
        let (sender, receiver) = watch::channel(false);
        let mut runs = self.runs.lock().unwrap_or_else(|e| e.into_inner());
        runs.insert(production_id, RunEntry { case_id, cancel: sender });
        receiver
    }

    /// Request cancellation of a run. The lookup is keyed by the caller's
    /// authorized case; a foreign case cannot cancel (or probe for) the
    /// run.
    pub fn cancel(
        &self,
        authorized: CaseId,
        production_id: ProductionId,
    ) -> Result<(), PipelineError> {
        let runs = self.runs.lock().unwrap_or_else(|e| e.into_inner());
        match runs.get(&production_id) {
            Some(entry) if entry.case_id == authorized => {
                info!(%authorized, %production_id, "cancellation requested");
                let _ = entry.cancel.send(true);
                Ok(())
            }
            _ => Err(PipelineError::UnknownRun),
        }
    }

    /// Whether a run is still registered
    pub fn is_live(&self, production_id: ProductionId) -> bool {
        let runs = self.runs.lock().unwrap_or_else(|e| e.into_inner());
        runs.contains_key(&production_id)
    }

    /// Remove a finished run
    pub fn remove(&self, production_id: ProductionId) {
        let mut runs = self.runs.lock().unwrap_or_else(|e| e.into_inner());
        runs.remove(&production_id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_register_and_cancel() {
        let registry = RunRegistry::new();
        let case = CaseId::new();
        let production = ProductionId::new();

        let receiver = registry.register(case, production);
        assert!(!*receiver.borrow());

        registry.cancel(case, production).unwrap();
        assert!(*receiver.borrow());
    }

    #[test]
    fn test_foreign_case_cannot_cancel() {
        let registry = RunRegistry::new();
        let owner = CaseId::new();
        let production = ProductionId::new();
        let receiver = registry.register(owner, production);

        let result = registry.cancel(CaseId::new(), production);
        assert!(matches!(result, Err(PipelineError::UnknownRun)));
        assert!(!*receiver.borrow());
    }

    #[test]
    fn test_cancel_unknown_run() {
        let registry = RunRegistry::new();
        let result = registry.cancel(CaseId::new(), ProductionId::new());
        assert!(matches!(result, Err(PipelineError::UnknownRun)));
    }

    #[test]
    fn test_remove() {
        let registry = RunRegistry::new();
        let case = CaseId::new();
        let production = ProductionId::new();

        registry.register(case, production);
        assert!(registry.is_live(production));
        registry.remove(production);
        assert!(!registry.is_live(production));
        assert!(registry.cancel(case, production).is_err());
    }
}
