//! Per-production progress streams
//!
//! One stream per `(case_id, production_id)`: an append-only event log
//! plus a broadcast channel for live fan-out. Sequence assignment, log
//! append, state transition, and broadcast all happen under the stream's
//! log lock, so a subscriber's backlog and its live receiver partition
//! the stream exactly: nothing missed, nothing duplicated.

use crate::error::ProgressError;
use docket_domain::{CaseId, ProductionId, ProgressEvent, ProgressEventKind, RunState};
use std::collections::HashMap;
use std::sync::{Arc, Mutex, RwLock};
use tokio::sync::broadcast;
use tracing::debug;

/// Broadcast buffer per stream; a subscriber this far behind observes a
/// `Lagged` error and should replay from its last sequence instead
const DEFAULT_CAPACITY: usize = 256;

struct StreamLog {
    events: Vec<ProgressEvent>,
    state: RunState,
}

struct StreamInner {
    log: Mutex<StreamLog>,
    sender: broadcast::Sender<ProgressEvent>,
}

/// The process-wide progress bus
pub struct ProgressBus {
    streams: RwLock<HashMap<(CaseId, ProductionId), Arc<StreamInner>>>,
    capacity: usize,
}

impl ProgressBus {
    /// Create a bus with the default per-stream broadcast capacity
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CAPACITY)
    }

    /// Create a bus with an explicit per-stream broadcast capacity
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            streams: RwLock::new(HashMap::new()),
            capacity,
        }
    }

    /// Open the stream for a production. Must happen before the first
    /// publish; opening the same stream twice is an error.
    pub fn open(&self, case_id: CaseId, production_id: ProductionId) -> Result<(), ProgressError> {
        let mut streams = self.streams.write().unwrap_or_else(|e| e.into_inner());
        if streams.contains_key(&(case_id, production_id)) {
            return Err(ProgressError::AlreadyOpen);
        }

        let (sender, _) = broadcast::channel(self.capacity);
        streams.insert(
            (case_id, production_id),
            Arc::new(StreamInner {
                log: Mutex::new(StreamLog {
                    events: Vec::new(),
                    state: RunState::NotStarted,
                }),
                sender,
            }),
        );
        debug!(%case_id, %production_id, "progress stream opened");
        Ok(())
    }

    /// Append one event to a stream and fan it out. Returns the assigned
    /// sequence. Rejected once the stream is terminal.
    pub fn publish(
        &self,
        case_id: CaseId,
        production_id: ProductionId,
        kind: ProgressEventKind,
    ) -> Result<u64, ProgressError> {
        let stream = self.stream(case_id, production_id)?;
        let mut log = stream.log.lock().unwrap_or_else(|e| e.into_inner());

        if log.state.is_terminal() {
            return Err(ProgressError::Terminal);
        }

        log.state = match &kind {
            ProgressEventKind::Started { .. } => RunState::Running,
            ProgressEventKind::Completed { .. } => RunState::Completed,
            ProgressEventKind::Error { .. } => RunState::Failed,
            ProgressEventKind::Cancelled => RunState::Cancelled,
            _ => log.state,
        };

        let sequence = log.events.len() as u64;
        let event = ProgressEvent {
            case_id,
            production_id,
            sequence,
            kind,
        };
        log.events.push(event.clone());
        // No receivers is fine; the log is the durable record
        let _ = stream.sender.send(event);
        Ok(sequence)
    }

    /// Subscribe to a stream: the full backlog so far plus a live
    /// receiver for everything after it. The lookup is keyed by the
    /// caller's authorized case, so a foreign case cannot observe the
    /// stream (or learn that it exists).
    pub fn subscribe(
        &self,
        authorized: CaseId,
        production_id: ProductionId,
    ) -> Result<(Vec<ProgressEvent>, broadcast::Receiver<ProgressEvent>), ProgressError> {
        let stream = self.stream(authorized, production_id)?;
        let log = stream.log.lock().unwrap_or_else(|e| e.into_inner());

        // Receiver created under the log lock: it sees exactly the events
        // published after the backlog snapshot
        let receiver = stream.sender.subscribe();
        Ok((log.events.clone(), receiver))
    }

    /// Events of a stream from `sequence` onward, for reconnecting
    /// subscribers
    pub fn replay_from(
        &self,
        authorized: CaseId,
        production_id: ProductionId,
        sequence: u64,
    ) -> Result<Vec<ProgressEvent>, ProgressError> {
        let stream = self.stream(authorized, production_id)?;
        let log = stream.log.lock().unwrap_or_else(|e| e.into_inner());

        let start = (sequence as usize).min(log.events.len());
        Ok(log.events[start..].to_vec())
    }

    /// Current lifecycle state of a stream
    pub fn state(
        &self,
        authorized: CaseId,
        production_id: ProductionId,
    ) -> Result<RunState, ProgressError> {
        let stream = self.stream(authorized, production_id)?;
        let log = stream.log.lock().unwrap_or_else(|e| e.into_inner());
        Ok(log.state)
    }

    fn stream(
        &self,
        case_id: CaseId,
        production_id: ProductionId,
    ) -> Result<Arc<StreamInner>, ProgressError> {
        let streams = self.streams.read().unwrap_or_else(|e| e.into_inner());
        streams
            .get(&(case_id, production_id))
            .cloned()
            .ok_or(ProgressError::UnknownStream)
    }
}

impl Default for ProgressBus {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn open_stream(bus: &ProgressBus) -> (CaseId, ProductionId) {
        let case = CaseId::new();
        let production = ProductionId::new();
        bus.open(case, production).unwrap();
        (case, production)
    }

    #[test]
    fn test_publish_assigns_increasing_sequences() {
        let bus = ProgressBus::new();
        let (case, production) = open_stream(&bus);

        let s0 = bus
            .publish(case, production, ProgressEventKind::Started { total_pages: 40 })
            .unwrap();
        let s1 = bus
            .publish(
                case,
                production,
                ProgressEventKind::Chunking { ordinal: 0, chunks: 3 },
            )
            .unwrap();
        assert_eq!((s0, s1), (0, 1));
    }

    #[test]
    fn test_state_machine_transitions() {
        let bus = ProgressBus::new();
        let (case, production) = open_stream(&bus);

        assert_eq!(bus.state(case, production).unwrap(), RunState::NotStarted);
        bus.publish(case, production, ProgressEventKind::Started { total_pages: 10 })
            .unwrap();
        assert_eq!(bus.state(case, production).unwrap(), RunState::Running);
        bus.publish(case, production, ProgressEventKind::Completed { segments: 2 })
            .unwrap();
        assert_eq!(bus.state(case, production).unwrap(), RunState::Completed);
    }

    #[test]
    fn test_no_events_after_terminal() {
        let bus = ProgressBus::new();
        let (case, production) = open_stream(&bus);

        bus.publish(case, production, ProgressEventKind::Started { total_pages: 10 })
            .unwrap();
        bus.publish(case, production, ProgressEventKind::Cancelled)
            .unwrap();

        let result = bus.publish(
            case,
            production,
            ProgressEventKind::Completed { segments: 1 },
        );
        assert_eq!(result, Err(ProgressError::Terminal));
        assert_eq!(bus.state(case, production).unwrap(), RunState::Cancelled);
    }

    #[test]
    fn test_error_event_fails_the_run() {
        let bus = ProgressBus::new();
        let (case, production) = open_stream(&bus);

        bus.publish(case, production, ProgressEventKind::Started { total_pages: 10 })
            .unwrap();
        bus.publish(
            case,
            production,
            ProgressEventKind::Error { message: "store unreachable".to_string() },
        )
        .unwrap();
        assert_eq!(bus.state(case, production).unwrap(), RunState::Failed);
    }

    #[test]
    fn test_double_open_rejected() {
        let bus = ProgressBus::new();
        let (case, production) = open_stream(&bus);
        assert_eq!(bus.open(case, production), Err(ProgressError::AlreadyOpen));
    }

    #[test]
    fn test_subscribe_gets_backlog() {
        let bus = ProgressBus::new();
        let (case, production) = open_stream(&bus);

        bus.publish(case, production, ProgressEventKind::Started { total_pages: 40 })
            .unwrap();
        bus.publish(
            case,
            production,
            ProgressEventKind::Chunking { ordinal: 0, chunks: 2 },
        )
        .unwrap();

        let (backlog, _receiver) = bus.subscribe(case, production).unwrap();
        assert_eq!(backlog.len(), 2);
        assert_eq!(backlog[0].kind.name(), "started");
        assert_eq!(backlog[1].sequence, 1);
    }

    #[tokio::test]
    async fn test_subscriber_sees_backlog_then_live_without_gap() {
        let bus = ProgressBus::new();
        let (case, production) = open_stream(&bus);

        bus.publish(case, production, ProgressEventKind::Started { total_pages: 40 })
            .unwrap();

        let (backlog, mut receiver) = bus.subscribe(case, production).unwrap();
        assert_eq!(backlog.len(), 1);

        bus.publish(case, production, ProgressEventKind::Completed { segments: 1 })
            .unwrap();

        let live = receiver.recv().await.unwrap();
        assert_eq!(live.sequence, 1);

        // Combined view is the whole stream, non-decreasing
        let mut sequences: Vec<u64> = backlog.iter().map(|e| e.sequence).collect();
        sequences.push(live.sequence);
        assert_eq!(sequences, vec![0, 1]);
    }

    #[test]
    fn test_replay_from() {
        let bus = ProgressBus::new();
        let (case, production) = open_stream(&bus);

        bus.publish(case, production, ProgressEventKind::Started { total_pages: 40 })
            .unwrap();
        bus.publish(
            case,
            production,
            ProgressEventKind::Chunking { ordinal: 0, chunks: 2 },
        )
        .unwrap();
        bus.publish(case, production, ProgressEventKind::Completed { segments: 1 })
            .unwrap();

        let replayed = bus.replay_from(case, production, 1).unwrap();
        assert_eq!(replayed.len(), 2);
        assert_eq!(replayed[0].sequence, 1);

        // Replay past the end is empty, not an error
        assert!(bus.replay_from(case, production, 99).unwrap().is_empty());
    }

    #[test]
    fn test_foreign_case_cannot_observe_stream() {
        let bus = ProgressBus::new();
        let (case, production) = open_stream(&bus);
        bus.publish(case, production, ProgressEventKind::Started { total_pages: 10 })
            .unwrap();

        let intruder = CaseId::new();
        assert_eq!(
            bus.subscribe(intruder, production).unwrap_err(),
            ProgressError::UnknownStream
        );
        assert_eq!(
            bus.replay_from(intruder, production, 0).unwrap_err(),
            ProgressError::UnknownStream
        );
        assert_eq!(
            bus.state(intruder, production).unwrap_err(),
            ProgressError::UnknownStream
        );
    }

    #[test]
    fn test_streams_are_independent() {
        let bus = ProgressBus::new();
        let (case_a, production_a) = open_stream(&bus);
        let (case_b, production_b) = open_stream(&bus);

        bus.publish(case_a, production_a, ProgressEventKind::Started { total_pages: 5 })
            .unwrap();
        let s = bus
            .publish(case_b, production_b, ProgressEventKind::Started { total_pages: 9 })
            .unwrap();

        // Each stream numbers from zero
        assert_eq!(s, 0);
        let (backlog_b, _) = bus.subscribe(case_b, production_b).unwrap();
        assert_eq!(backlog_b.len(), 1);
        assert!(matches!(
            backlog_b[0].kind,
            ProgressEventKind::Started { total_pages: 9 }
        ));
    }
}
