//! Boundary detection over the oracle capability

use crate::parser;
use crate::prompt;
use crate::windower::PageWindow;
use docket_domain::BoundaryCandidate;
use docket_oracle::{CapabilityError, LlmClient};
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

/// Detects document boundaries within one analysis window.
///
/// Every call is bounded by the configured timeout; a timeout surfaces as
/// a transient failure so the caller's bounded retry applies. An
/// unparseable response is permanent: retrying the identical prompt is
/// not expected to produce different structure.
pub struct BoundaryDetector {
    client: Arc<dyn LlmClient>,
    call_timeout: Duration,
}

impl BoundaryDetector {
    /// Create a detector over `client` with a per-call timeout
    pub fn new(client: Arc<dyn LlmClient>, call_timeout: Duration) -> Self {
        Self {
            client,
            call_timeout,
        }
    }

    /// Detect boundary candidates in one window. `page_texts[i]` is the
    /// text of page `window.pages.start + i`.
    pub async fn detect(
        &self,
        window: &PageWindow,
        page_texts: &[String],
    ) -> Result<Vec<BoundaryCandidate>, CapabilityError> {
        let prompt = prompt::boundary_prompt(window, page_texts);

        let response = tokio::time::timeout(self.call_timeout, self.client.generate(&prompt))
            .await
            .map_err(|_| {
                CapabilityError::Transient(format!(
                    "boundary detection timed out after {:?}",
                    self.call_timeout
                ))
            })??;

        let candidates = parser::parse_boundary_response(&response, window)
            .map_err(|e| CapabilityError::Permanent(e.to_string()))?;

        debug!(
            window = window.index,
            pages = %format!("{}-{}", window.pages.start, window.pages.end),
            candidates = candidates.len(),
            "boundary detection complete"
        );
        Ok(candidates)
    }
}
