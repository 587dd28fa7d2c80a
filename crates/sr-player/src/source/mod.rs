// Copyright 2025 Schelling Point Labs Inc
// SPDX-License-Identifier: AGPL-3.0-only

//! Recording sources
//!
//! A source settles once, from `Waiting` to either `Ready` or `Failed`, and
//! only then exposes its events. Every event list handed out is complete and
//! time ordered; a source never exposes a partially decoded recording.

mod blob;
mod file;
mod live;

use std::fmt;
use std::sync::Arc;

use parking_lot::{Mutex, RwLock};
use serde::Serialize;
use sr_domain_types::SourceEvent;
use tracing::{debug, warn};

use crate::error::SourceError;

pub use blob::BlobSource;
pub use file::FileSource;
pub use live::LiveSource;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ReadyState {
    Waiting,
    Ready,
    Failed,
}

impl ReadyState {
    pub fn is_settled(self) -> bool {
        !matches!(self, ReadyState::Waiting)
    }
}

impl fmt::Display for ReadyState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReadyState::Waiting => write!(f, "waiting"),
            ReadyState::Ready => write!(f, "ready"),
            ReadyState::Failed => write!(f, "failed"),
        }
    }
}

/// Total length of a recording
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase", tag = "kind", content = "ms")]
pub enum RecordingDuration {
    /// Time of the last event
    Known(u64),
    /// Still streaming, or not loaded yet
    Unknown,
}

impl RecordingDuration {
    pub fn known(self) -> Option<u64> {
        match self {
            RecordingDuration::Known(ms) => Some(ms),
            RecordingDuration::Unknown => None,
        }
    }

    pub(crate) fn of(events: &[SourceEvent]) -> Self {
        RecordingDuration::Known(events.last().map(|event| event.time).unwrap_or_default())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SourceMetadata {
    pub duration: RecordingDuration,
    pub event_count: usize,
}

/// Receives source lifecycle notifications
pub trait SourceObserver: Send + Sync {
    fn on_ready_state(&self, _state: ReadyState) {}

    /// New events were appended; `total` is the new event count
    fn on_events(&self, _total: usize) {}
}

/// Provider of a time-ordered event sequence
pub trait Source: Send + Sync {
    fn ready_state(&self) -> ReadyState;

    /// All events currently available, `None` until the source is ready
    fn events(&self) -> Option<Arc<[SourceEvent]>>;

    fn metadata(&self) -> SourceMetadata;

    /// The error that failed the source
    fn failure(&self) -> Option<SourceError>;

    /// Register an observer; it is told the current state right away
    fn subscribe(&self, observer: Arc<dyn SourceObserver>);
}

struct CellState {
    ready: ReadyState,
    events: Option<Arc<[SourceEvent]>>,
    duration: RecordingDuration,
    failure: Option<SourceError>,
}

/// Settle-once state shared by the source implementations
pub(crate) struct SourceCell {
    state: RwLock<CellState>,
    observers: Mutex<Vec<Arc<dyn SourceObserver>>>,
}

impl SourceCell {
    pub(crate) fn new() -> Self {
        Self {
            state: RwLock::new(CellState {
                ready: ReadyState::Waiting,
                events: None,
                duration: RecordingDuration::Unknown,
                failure: None,
            }),
            observers: Mutex::new(Vec::new()),
        }
    }

    pub(crate) fn ready_state(&self) -> ReadyState {
        self.state.read().ready
    }

    pub(crate) fn events(&self) -> Option<Arc<[SourceEvent]>> {
        let state = self.state.read();
        match state.ready {
            ReadyState::Ready => state.events.clone(),
            ReadyState::Waiting | ReadyState::Failed => None,
        }
    }

    pub(crate) fn metadata(&self) -> SourceMetadata {
        let state = self.state.read();
        SourceMetadata {
            duration: state.duration,
            event_count: state.events.as_ref().map_or(0, |events| events.len()),
        }
    }

    pub(crate) fn failure(&self) -> Option<SourceError> {
        self.state.read().failure.clone()
    }

    pub(crate) fn subscribe(&self, observer: Arc<dyn SourceObserver>) {
        let current = self.ready_state();
        self.observers.lock().push(Arc::clone(&observer));
        observer.on_ready_state(current);
    }

    /// `Waiting -> Ready` with a complete event list
    pub(crate) fn resolve(&self, events: Arc<[SourceEvent]>, duration: RecordingDuration) -> Result<(), SourceError> {
        let total = events.len();
        {
            let mut state = self.state.write();
            if state.ready.is_settled() {
                return Err(SourceError::Settled { state: state.ready });
            }
            state.ready = ReadyState::Ready;
            state.events = Some(events);
            state.duration = duration;
        }
        debug!(event_count = total, duration = ?duration, "Source ready");
        self.notify(|observer| observer.on_ready_state(ReadyState::Ready));
        Ok(())
    }

    /// `Waiting | Ready -> Failed`; events are withdrawn
    pub(crate) fn fail(&self, error: SourceError) {
        {
            let mut state = self.state.write();
            if state.ready == ReadyState::Failed {
                return;
            }
            state.ready = ReadyState::Failed;
            state.events = None;
            state.failure = Some(error.clone());
        }
        warn!(error = %error, "Source failed");
        self.notify(|observer| observer.on_ready_state(ReadyState::Failed));
    }

    /// Tell observers the event list grew to `total`
    pub(crate) fn notify_events(&self, total: usize) {
        self.notify(|observer| observer.on_events(total));
    }

    fn notify(&self, f: impl Fn(&dyn SourceObserver)) {
        let observers = self.observers.lock().clone();
        for observer in &observers {
            f(observer.as_ref());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sr_domain_types::DomPatch;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[derive(Default)]
    struct Counter {
        ready: AtomicUsize,
        failed: AtomicUsize,
    }

    impl SourceObserver for Counter {
        fn on_ready_state(&self, state: ReadyState) {
            match state {
                ReadyState::Ready => self.ready.fetch_add(1, Ordering::SeqCst),
                ReadyState::Failed => self.failed.fetch_add(1, Ordering::SeqCst),
                ReadyState::Waiting => 0,
            };
        }
    }

    #[sr_test_utils::logged_test]
    fn cell_settles_once() {
        let cell = SourceCell::new();
        let counter = Arc::new(Counter::default());
        cell.subscribe(counter.clone());
        assert!(cell.events().is_none());

        let events: Arc<[SourceEvent]> = vec![SourceEvent::new(3, DomPatch::remove(1u64))].into();
        cell.resolve(events.clone(), RecordingDuration::of(&events)).unwrap();
        assert_eq!(cell.metadata().duration, RecordingDuration::Known(3));
        assert!(matches!(
            cell.resolve(events, RecordingDuration::Unknown),
            Err(SourceError::Settled {
                state: ReadyState::Ready
            })
        ));
        assert_eq!(counter.ready.load(Ordering::SeqCst), 1);
    }

    #[sr_test_utils::logged_test]
    fn failed_cell_withdraws_events() {
        let cell = SourceCell::new();
        cell.fail(SourceError::Task("boom".to_string()));
        cell.fail(SourceError::Task("again".to_string()));
        assert_eq!(cell.ready_state(), ReadyState::Failed);
        assert!(cell.events().is_none());
        assert!(matches!(cell.failure(), Some(SourceError::Task(msg)) if msg == "boom"));

        let counter = Arc::new(Counter::default());
        cell.subscribe(counter.clone());
        assert_eq!(counter.failed.load(Ordering::SeqCst), 1);
    }
}
