//! Core fact extraction over one finalized segment

use crate::chunking::{chunk_text, Chunk};
use crate::config::ExtractorConfig;
use crate::dedup::{self, DedupDecision};
use crate::error::ExtractorError;
use crate::parser::parse_fact_response;
use crate::patterns::extract_entities;
use crate::prompt::fact_prompt;
use crate::types::FactCandidate;
use docket_domain::traits::FactStore;
use docket_domain::{Fact, FactId, Segment};
use docket_oracle::retry::with_retry;
use docket_oracle::{CapabilityError, LlmClient};
use docket_store::EmbeddingModel;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::time::timeout;
use tracing::{debug, info, warn};

/// Backoff before the single retry of a transient mining call
const RETRY_BACKOFF: Duration = Duration::from_millis(500);

/// Outcome of extracting one segment
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SegmentExtraction {
    /// Facts persisted, in discovery order
    pub fact_ids: Vec<FactId>,
    /// Candidates dropped as duplicates of persisted facts
    pub duplicates_dropped: usize,
    /// Chunks the segment text was split into
    pub chunks: usize,
    /// Chunks whose mining call or response failed after retry
    pub failed_chunks: usize,
}

/// Mines, enriches, deduplicates, and persists facts for segments.
///
/// The store is shared with the rest of the pipeline behind a mutex;
/// dedup and persistence for one candidate happen under a single lock
/// acquisition so two concurrent extractions cannot both persist the
/// same statement.
pub struct FactExtractor<S>
where
    S: FactStore,
{
    client: Arc<dyn LlmClient>,
    store: Arc<Mutex<S>>,
    embedder: Arc<dyn EmbeddingModel>,
    config: ExtractorConfig,
}

impl<S> FactExtractor<S>
where
    S: FactStore,
    S::Error: std::fmt::Display,
{
    /// Create an extractor over a shared store
    pub fn new(
        client: Arc<dyn LlmClient>,
        store: Arc<Mutex<S>>,
        embedder: Arc<dyn EmbeddingModel>,
        config: ExtractorConfig,
    ) -> Self {
        Self {
            client,
            store,
            embedder,
            config,
        }
    }

    /// Extract facts from one segment's text.
    ///
    /// Chunk-level failures degrade the result; store failures abort it.
    /// Facts persisted before an abort stay persisted.
    pub async fn extract(
        &self,
        segment: &Segment,
        text: &str,
    ) -> Result<SegmentExtraction, ExtractorError> {
        let chunks = chunk_text(text, self.config.chunk_size, self.config.chunk_overlap);
        let mut result = SegmentExtraction {
            chunks: chunks.len(),
            ..SegmentExtraction::default()
        };

        info!(
            segment = %segment.id,
            ordinal = segment.ordinal,
            chunks = chunks.len(),
            "starting fact extraction"
        );

        for chunk in &chunks {
            let candidates = match self.mine_chunk(segment, chunk).await {
                Ok(candidates) => candidates,
                Err(e) => {
                    warn!(
                        segment = %segment.id,
                        chunk_offset = chunk.offset,
                        "chunk mining failed: {}",
                        e
                    );
                    result.failed_chunks += 1;
                    continue;
                }
            };

            for candidate in candidates {
                self.process_candidate(segment, chunk, candidate, &mut result)?;
            }
        }

        info!(
            segment = %segment.id,
            persisted = result.fact_ids.len(),
            duplicates = result.duplicates_dropped,
            failed_chunks = result.failed_chunks,
            "fact extraction complete"
        );
        Ok(result)
    }

    /// One oracle call for one chunk, with timeout and a single retry
    async fn mine_chunk(
        &self,
        segment: &Segment,
        chunk: &Chunk,
    ) -> Result<Vec<FactCandidate>, ExtractorError> {
        let prompt = fact_prompt(segment.document_type.as_str(), &chunk.text);
        let call_timeout = self.config.call_timeout();

        let response = with_retry(1, RETRY_BACKOFF, || async {
            timeout(call_timeout, self.client.generate(&prompt))
                .await
                .map_err(|_| {
                    CapabilityError::Transient(format!(
                        "fact mining timed out after {:?}",
                        call_timeout
                    ))
                })?
        })
        .await?;

        parse_fact_response(&response)
    }

    /// Enrich, dedup, and persist one candidate
    fn process_candidate(
        &self,
        segment: &Segment,
        chunk: &Chunk,
        candidate: FactCandidate,
        result: &mut SegmentExtraction,
    ) -> Result<(), ExtractorError> {
        let embedding = match self.embedder.embed(&candidate.text) {
            Ok(embedding) => embedding,
            Err(e) => {
                warn!("embedding failed for candidate, skipping: {}", e);
                return Ok(());
            }
        };

        let entities = extract_entities(&candidate.text);
        let fact = Fact {
            id: FactId::new(),
            case_id: segment.case_id,
            segment_id: segment.id,
            text: candidate.text,
            category: candidate.category,
            confidence: candidate.confidence,
            source_span: (chunk.offset, chunk.offset + chunk.char_len),
            entities,
            embedding,
        };

        // Dedup and persist under one lock so concurrent segments cannot
        // race the same statement past each other
        let mut store = self
            .store
            .lock()
            .map_err(|e| ExtractorError::Store(format!("store lock error: {}", e)))?;

        let decision = dedup::evaluate(
            &*store,
            segment.case_id,
            &fact.text,
            &fact.embedding,
            &self.config,
        )
        .map_err(|e| ExtractorError::Store(e.to_string()))?;

        match decision {
            DedupDecision::Duplicate {
                existing,
                vector_similarity,
                text_similarity,
            } => {
                debug!(
                    %existing,
                    vector_similarity,
                    text_similarity,
                    "dropping duplicate fact candidate"
                );
                result.duplicates_dropped += 1;
            }
            DedupDecision::New => {
                let id = fact.id;
                store
                    .persist_fact(segment.case_id, fact)
                    .map_err(|e| ExtractorError::Store(e.to_string()))?;
                result.fact_ids.push(id);
            }
        }
        Ok(())
    }
}
