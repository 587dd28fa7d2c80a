// Copyright 2025 Schelling Point Labs Inc
// SPDX-License-Identifier: AGPL-3.0-only

use std::sync::Arc;

use parking_lot::Mutex;
use sr_domain_types::SourceEvent;
use sr_format::View;
use tracing::{debug, trace};

use super::{ReadyState, RecordingDuration, Source, SourceCell, SourceMetadata, SourceObserver};
use crate::error::SourceError;

#[derive(Default)]
struct LiveBuffer {
    events: Vec<SourceEvent>,
    /// Cached shared copy of `events`, rebuilt after appends
    shared: Option<Arc<[SourceEvent]>>,
    finished: bool,
}

/// Source fed incrementally by a capture pipeline
///
/// Ready from the start with an empty, growing event list. The duration is
/// unknown until [`finish`](Self::finish) is called.
pub struct LiveSource {
    cell: SourceCell,
    view: View<SourceEvent>,
    buffer: Mutex<LiveBuffer>,
}

impl Default for LiveSource {
    fn default() -> Self {
        Self::new()
    }
}

impl LiveSource {
    pub fn new() -> Self {
        let cell = SourceCell::new();
        // A fresh cell is always waiting
        let _ = cell.resolve(Arc::from(Vec::new()), RecordingDuration::Unknown);
        Self {
            cell,
            view: View::new(),
            buffer: Mutex::new(LiveBuffer::default()),
        }
    }

    /// Append one event; it must pass validation and keep time order
    pub fn push(&self, event: SourceEvent) -> Result<(), SourceError> {
        self.push_all(std::iter::once(event))
    }

    /// Append a batch atomically: either every event is accepted or none
    pub fn push_all(&self, events: impl IntoIterator<Item = SourceEvent>) -> Result<(), SourceError> {
        let state = self.cell.ready_state();
        if state != ReadyState::Ready {
            return Err(SourceError::Settled { state });
        }
        let total = {
            let mut buffer = self.buffer.lock();
            if buffer.finished {
                return Err(SourceError::Finished);
            }
            let mut previous = buffer.events.last().map(|event| event.time);
            let start = buffer.events.len();
            for event in events {
                let checked = match previous {
                    Some(previous) if event.time < previous => Err(SourceError::OutOfOrder {
                        previous,
                        time: event.time,
                    }),
                    _ => self
                        .view
                        .validate(&event)
                        .map_err(|err| SourceError::Invalid(Arc::new(err))),
                };
                if let Err(err) = checked {
                    buffer.events.truncate(start);
                    return Err(err);
                }
                previous = Some(event.time);
                trace!(kind = %event.kind(), time = event.time, "Live event");
                buffer.events.push(event);
            }
            if buffer.events.len() == start {
                return Ok(());
            }
            buffer.shared = None;
            buffer.events.len()
        };
        self.cell.notify_events(total);
        Ok(())
    }

    /// Close the stream; the duration becomes known
    pub fn finish(&self) {
        let mut buffer = self.buffer.lock();
        if !buffer.finished {
            buffer.finished = true;
            debug!(event_count = buffer.events.len(), "Live source finished");
        }
    }

    pub fn is_finished(&self) -> bool {
        self.buffer.lock().finished
    }

    /// Fail the stream, for example when the capture side disconnects
    pub fn fail(&self, error: SourceError) {
        self.cell.fail(error);
    }
}

impl Source for LiveSource {
    fn ready_state(&self) -> ReadyState {
        self.cell.ready_state()
    }

    fn events(&self) -> Option<Arc<[SourceEvent]>> {
        if self.cell.ready_state() != ReadyState::Ready {
            return None;
        }
        let mut buffer = self.buffer.lock();
        let LiveBuffer { events, shared, .. } = &mut *buffer;
        Some(Arc::clone(shared.get_or_insert_with(|| Arc::from(events.as_slice()))))
    }

    fn metadata(&self) -> SourceMetadata {
        let buffer = self.buffer.lock();
        let duration = if buffer.finished {
            RecordingDuration::of(&buffer.events)
        } else {
            RecordingDuration::Unknown
        };
        SourceMetadata {
            duration,
            event_count: buffer.events.len(),
        }
    }

    fn failure(&self) -> Option<SourceError> {
        self.cell.failure()
    }

    fn subscribe(&self, observer: Arc<dyn SourceObserver>) {
        self.cell.subscribe(observer);
    }
}
