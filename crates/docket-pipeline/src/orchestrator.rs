//! Production run orchestration
//!
//! A run moves through fixed phases: window the page run, detect
//! boundaries at bounded concurrency, merge into a verified partition
//! (with one adaptive fallback pass), classify and persist segments in
//! page order, then extract facts at bounded concurrency with event
//! batches flushed in page order. Registration returns the production id
//! immediately; the run proceeds on a spawned task.
//!
//! Failure semantics are partial-success: a degraded window or chunk
//! never fails the run, a store failure or partition violation does, and
//! nothing persisted is ever rolled back.

use crate::config::PipelineConfig;
use crate::error::PipelineError;
use crate::flush::OrdinalFlusher;
use crate::registry::RunRegistry;
use docket_domain::traits::{FactStore, SegmentStore};
use docket_domain::{
    BoundaryCandidate, CaseId, PageRange, Production, ProductionId, ProgressEventKind, Segment,
    SegmentId,
};
use docket_extractor::FactExtractor;
use docket_oracle::retry::with_retry;
use docket_oracle::{LlmClient, PageSource};
use docket_progress::ProgressBus;
use docket_segmenter::{merger, windower, BoundaryDetector, PageWindow, SegmentClassifier};
use docket_store::EmbeddingModel;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};
use tokio::sync::{watch, Semaphore};
use tokio::task::{JoinHandle, JoinSet};
use tracing::{error, info, warn};

/// Backoff before the single retry of a transient capability call
const RETRY_BACKOFF: Duration = Duration::from_millis(500);

/// Summary of a finished (or cancelled) run
#[derive(Debug, Clone)]
pub struct RunReport {
    /// The production that was processed
    pub production_id: ProductionId,
    /// Segments persisted
    pub segments: usize,
    /// Facts persisted across all segments
    pub facts_persisted: usize,
    /// Candidates dropped as duplicates
    pub duplicates_dropped: usize,
    /// Windows whose detection failed after retry
    pub degraded_windows: usize,
    /// Whether the run ended by cancellation
    pub cancelled: bool,
    /// Wall time of the run
    pub elapsed: Duration,
}

#[derive(Default)]
struct ExtractionTotals {
    facts_persisted: usize,
    duplicates_dropped: usize,
    skipped: usize,
}

/// Orchestrates production runs over a shared store and progress bus
pub struct PipelineOrchestrator<S> {
    client: Arc<dyn LlmClient>,
    store: Arc<Mutex<S>>,
    embedder: Arc<dyn EmbeddingModel>,
    bus: Arc<ProgressBus>,
    registry: Arc<RunRegistry>,
    config: PipelineConfig,
}

impl<S> PipelineOrchestrator<S>
where
    S: SegmentStore + FactStore + Send + 'static,
    <S as SegmentStore>::Error: std::fmt::Display,
    <S as FactStore>::Error: std::fmt::Display,
{
    /// Create an orchestrator; the configuration is validated up front
    pub fn new(
        client: Arc<dyn LlmClient>,
        store: Arc<Mutex<S>>,
        embedder: Arc<dyn EmbeddingModel>,
        bus: Arc<ProgressBus>,
        registry: Arc<RunRegistry>,
        config: PipelineConfig,
    ) -> Result<Self, PipelineError> {
        config.validate().map_err(PipelineError::Config)?;
        Ok(Self {
            client,
            store,
            embedder,
            bus,
            registry,
            config,
        })
    }

    /// The progress bus runs publish to
    pub fn bus(&self) -> Arc<ProgressBus> {
        Arc::clone(&self.bus)
    }

    /// The shared store runs persist to
    pub fn store(&self) -> Arc<Mutex<S>> {
        Arc::clone(&self.store)
    }

    /// Register a run and start it. Returns the production id immediately
    /// together with the join handle of the spawned run task.
    pub fn begin_production(
        self: &Arc<Self>,
        production: Production,
        pages: Arc<dyn PageSource>,
    ) -> Result<(ProductionId, JoinHandle<Result<RunReport, PipelineError>>), PipelineError> {
        if production.total_pages == 0 {
            return Err(PipelineError::Config(
                "production has zero pages".to_string(),
            ));
        }

        let production_id = production.id;
        let case_id = production.case_id;
        self.bus.open(case_id, production_id)?;
        let cancel = self.registry.register(case_id, production_id);

        info!(%case_id, %production_id, total_pages = production.total_pages, "run registered");

        let orchestrator = Arc::clone(self);
        let handle = tokio::spawn(async move {
            let result = orchestrator.run(production, pages, cancel).await;
            orchestrator.registry.remove(production_id);
            if let Err(e) = &result {
                error!(%production_id, "run failed: {}", e);
                // The stream may already be terminal; nothing to do then
                let _ = orchestrator.bus.publish(
                    case_id,
                    production_id,
                    ProgressEventKind::Error {
                        message: e.to_string(),
                    },
                );
            }
            result
        });

        Ok((production_id, handle))
    }

    /// Request cancellation of a live run
    pub fn cancel(
        &self,
        authorized: CaseId,
        production_id: ProductionId,
    ) -> Result<(), PipelineError> {
        self.registry.cancel(authorized, production_id)
    }

    async fn run(
        &self,
        production: Production,
        pages: Arc<dyn PageSource>,
        cancel: watch::Receiver<bool>,
    ) -> Result<RunReport, PipelineError> {
        let started = Instant::now();
        let case_id = production.case_id;
        let production_id = production.id;
        let total_pages = production.total_pages;

        self.bus.publish(
            case_id,
            production_id,
            ProgressEventKind::Started { total_pages },
        )?;

        let page_texts = self.fetch_pages(&pages, total_pages).await?;

        let segmenter = &self.config.segmenter;
        let (candidates, mut degraded_windows) = self
            .detect_all(
                &page_texts,
                total_pages,
                segmenter.window_size,
                segmenter.window_overlap,
                &cancel,
            )
            .await?;
        let mut partition = merger::merge(
            candidates,
            total_pages,
            segmenter.confidence_threshold,
            segmenter.coalesce_tolerance,
        )?;

        // One-shot adaptive fallback: a long production that merged into a
        // single segment gets one more pass with a halved window. The
        // re-run result stands either way.
        if merger::needs_fallback(partition.len(), total_pages, segmenter.fallback_min_pages) {
            let window_size = segmenter.fallback_window_size();
            let overlap = segmenter.window_overlap.min(window_size - 1);
            info!(%production_id, window_size, "re-running detection with fallback window");

            let (candidates, degraded) = self
                .detect_all(&page_texts, total_pages, window_size, overlap, &cancel)
                .await?;
            degraded_windows += degraded;
            partition = merger::merge(
                candidates,
                total_pages,
                segmenter.confidence_threshold,
                segmenter.coalesce_tolerance,
            )?;
        }

        let (segments, classification_cancelled) = self
            .finalize_segments(&production, &partition, &page_texts, &cancel)
            .await?;

        if classification_cancelled {
            self.bus
                .publish(case_id, production_id, ProgressEventKind::Cancelled)?;
            return Ok(RunReport {
                production_id,
                segments: segments.len(),
                facts_persisted: 0,
                duplicates_dropped: 0,
                degraded_windows,
                cancelled: true,
                elapsed: started.elapsed(),
            });
        }

        let totals = self
            .extract_all(&segments, &page_texts, &cancel, case_id, production_id)
            .await?;

        let cancelled = totals.skipped > 0 || *cancel.borrow();
        if cancelled {
            self.bus
                .publish(case_id, production_id, ProgressEventKind::Cancelled)?;
        } else {
            self.bus.publish(
                case_id,
                production_id,
                ProgressEventKind::Completed {
                    segments: segments.len(),
                },
            )?;
        }

        Ok(RunReport {
            production_id,
            segments: segments.len(),
            facts_persisted: totals.facts_persisted,
            duplicates_dropped: totals.duplicates_dropped,
            degraded_windows,
            cancelled,
            elapsed: started.elapsed(),
        })
    }

    /// Fetch every page's text up front, with one retry per page
    async fn fetch_pages(
        &self,
        pages: &Arc<dyn PageSource>,
        total_pages: u32,
    ) -> Result<Vec<String>, PipelineError> {
        if pages.total_pages() < total_pages {
            return Err(PipelineError::PageSource(format!(
                "source has {} pages, production declares {}",
                pages.total_pages(),
                total_pages
            )));
        }

        let mut texts = Vec::with_capacity(total_pages as usize);
        for page in 1..=total_pages {
            let text = with_retry(1, RETRY_BACKOFF, || pages.page_text(page))
                .await
                .map_err(|e| PipelineError::PageSource(e.to_string()))?;
            texts.push(text);
        }
        Ok(texts)
    }

    /// Detect boundaries for every window at bounded concurrency. A
    /// window that fails after retry contributes zero candidates.
    async fn detect_all(
        &self,
        page_texts: &[String],
        total_pages: u32,
        window_size: u32,
        overlap: u32,
        cancel: &watch::Receiver<bool>,
    ) -> Result<(Vec<BoundaryCandidate>, usize), PipelineError> {
        let windows = windower::windows(total_pages, window_size, overlap);
        let detector = Arc::new(BoundaryDetector::new(
            Arc::clone(&self.client),
            self.config.segmenter.call_timeout(),
        ));
        let semaphore = Arc::new(Semaphore::new(self.config.detection_concurrency));
        let mut join_set = JoinSet::new();

        for window in windows {
            let detector = Arc::clone(&detector);
            let semaphore = Arc::clone(&semaphore);
            let cancel = cancel.clone();
            let texts = window_texts(page_texts, &window);

            join_set.spawn(async move {
                let _permit = match semaphore.acquire_owned().await {
                    Ok(permit) => permit,
                    Err(_) => return (window.index, Ok(Vec::new())),
                };
                if *cancel.borrow() {
                    return (window.index, Ok(Vec::new()));
                }
                let result = with_retry(1, RETRY_BACKOFF, || detector.detect(&window, &texts)).await;
                (window.index, result)
            });
        }

        let mut candidates = Vec::new();
        let mut degraded = 0usize;
        while let Some(joined) = join_set.join_next().await {
            let (index, result) = joined
                .map_err(|e| PipelineError::Internal(format!("detection task join error: {}", e)))?;
            match result {
                Ok(found) => candidates.extend(found),
                Err(e) => {
                    warn!(window = index, "window detection failed after retry: {}", e);
                    degraded += 1;
                }
            }
        }
        Ok((candidates, degraded))
    }

    /// Classify, persist, and announce segments in page order
    async fn finalize_segments(
        &self,
        production: &Production,
        partition: &[PageRange],
        page_texts: &[String],
        cancel: &watch::Receiver<bool>,
    ) -> Result<(Vec<Segment>, bool), PipelineError> {
        let classifier = SegmentClassifier::new(
            Arc::clone(&self.client),
            self.config.segmenter.call_timeout(),
        );
        let mut segments = Vec::new();

        for (ordinal, pages) in partition.iter().enumerate() {
            if *cancel.borrow() {
                return Ok((segments, true));
            }

            let text = segment_text(page_texts, pages);
            let classification = classifier.classify(*pages, &text).await;

            let segment = Segment {
                id: SegmentId::new(),
                case_id: production.case_id,
                production_id: production.id,
                ordinal: ordinal as u32,
                pages: *pages,
                document_type: classification.document_type,
                title: classification.title,
                id_range: classification.id_range,
                confidence: classification.confidence,
            };

            {
                let mut store = self
                    .store
                    .lock()
                    .map_err(|e| PipelineError::Store(format!("store lock error: {}", e)))?;
                store
                    .persist_segment(production.case_id, segment.clone())
                    .map_err(|e| PipelineError::Store(e.to_string()))?;
            }

            self.bus.publish(
                production.case_id,
                production.id,
                ProgressEventKind::SegmentFound {
                    ordinal: segment.ordinal,
                    segment_id: segment.id,
                    pages: segment.pages,
                    document_type: segment.document_type.as_str().to_string(),
                },
            )?;
            segments.push(segment);
        }
        Ok((segments, false))
    }

    /// Extract facts for every segment at bounded concurrency, flushing
    /// each segment's event batch in page order regardless of completion
    /// order
    async fn extract_all(
        &self,
        segments: &[Segment],
        page_texts: &[String],
        cancel: &watch::Receiver<bool>,
        case_id: CaseId,
        production_id: ProductionId,
    ) -> Result<ExtractionTotals, PipelineError> {
        let semaphore = Arc::new(Semaphore::new(self.config.extraction_concurrency));
        let mut join_set = JoinSet::new();

        for segment in segments {
            let semaphore = Arc::clone(&semaphore);
            let cancel = cancel.clone();
            let extractor = FactExtractor::new(
                Arc::clone(&self.client),
                Arc::clone(&self.store),
                Arc::clone(&self.embedder),
                self.config.extractor.clone(),
            );
            let segment = segment.clone();
            let text = segment_text(page_texts, &segment.pages);

            join_set.spawn(async move {
                let _permit = match semaphore.acquire_owned().await {
                    Ok(permit) => permit,
                    Err(_) => return (segment.ordinal, Ok(None)),
                };
                if *cancel.borrow() {
                    return (segment.ordinal, Ok(None));
                }
                let result = extractor.extract(&segment, &text).await;
                (segment.ordinal, result.map(Some))
            });
        }

        let mut flusher = OrdinalFlusher::new();
        let mut totals = ExtractionTotals::default();

        while let Some(joined) = join_set.join_next().await {
            let (ordinal, result) = joined.map_err(|e| {
                PipelineError::Internal(format!("extraction task join error: {}", e))
            })?;

            let batch = match result {
                Ok(Some(extraction)) => {
                    totals.facts_persisted += extraction.fact_ids.len();
                    totals.duplicates_dropped += extraction.duplicates_dropped;

                    let mut batch = Vec::with_capacity(extraction.fact_ids.len() + 2);
                    batch.push(ProgressEventKind::Chunking {
                        ordinal,
                        chunks: extraction.chunks,
                    });
                    for fact_id in &extraction.fact_ids {
                        batch.push(ProgressEventKind::FactExtracted {
                            ordinal,
                            fact_id: *fact_id,
                        });
                    }
                    batch.push(ProgressEventKind::SegmentCompleted {
                        ordinal,
                        facts_persisted: extraction.fact_ids.len(),
                        duplicates_dropped: extraction.duplicates_dropped,
                    });
                    batch
                }
                Ok(None) => {
                    totals.skipped += 1;
                    Vec::new()
                }
                Err(e) => {
                    // Store failures are unrecoverable; stop the pool.
                    // Facts already persisted stay persisted.
                    join_set.abort_all();
                    return Err(e.into());
                }
            };

            for kind in flusher.submit(ordinal, batch) {
                self.bus.publish(case_id, production_id, kind)?;
            }
        }

        Ok(totals)
    }
}

fn window_texts(page_texts: &[String], window: &PageWindow) -> Vec<String> {
    let start = (window.pages.start - 1) as usize;
    let end = window.pages.end as usize;
    page_texts[start..end].to_vec()
}

fn segment_text(page_texts: &[String], pages: &PageRange) -> String {
    let start = (pages.start - 1) as usize;
    let end = pages.end as usize;
    page_texts[start..end].join("\n")
}
