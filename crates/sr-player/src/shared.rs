// Copyright 2025 Schelling Point Labs Inc
// SPDX-License-Identifier: AGPL-3.0-only

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use parking_lot::Mutex;

use crate::clock::PlaybackClock;
use crate::error::PlaybackError;
use crate::frame::Frame;
use crate::observer::PlaybackState;

struct Inner {
    clock: Mutex<PlaybackClock>,
    /// Bumped by every seek and pause; a replay that sees a newer value stops
    generation: AtomicU64,
}

/// Clock handle shared between a UI thread and the auto-advance task
///
/// Requests are serialized, and a newer seek (or a pause) makes any replay
/// still in progress give up at its next batch boundary with
/// [`PlaybackError::Superseded`].
#[derive(Clone)]
pub struct SharedClock {
    inner: Arc<Inner>,
}

impl SharedClock {
    pub fn new(clock: PlaybackClock) -> Self {
        Self {
            inner: Arc::new(Inner {
                clock: Mutex::new(clock),
                generation: AtomicU64::new(0),
            }),
        }
    }

    fn bump(&self) -> u64 {
        self.inner.generation.fetch_add(1, Ordering::SeqCst) + 1
    }

    fn is_stale(&self, generation: u64) -> bool {
        self.inner.generation.load(Ordering::SeqCst) != generation
    }

    pub fn seek(&self, target: u64) -> Result<Frame, PlaybackError> {
        let generation = self.bump();
        let mut clock = self.inner.clock.lock();
        if self.is_stale(generation) {
            return Err(PlaybackError::Superseded { target });
        }
        clock.seek_with(target, &|| self.is_stale(generation))
    }

    pub fn tick(&self) -> Result<Option<Frame>, PlaybackError> {
        let generation = self.inner.generation.load(Ordering::SeqCst);
        let mut clock = self.inner.clock.lock();
        clock.tick_with(&|| self.is_stale(generation))
    }

    pub fn play(&self) -> Result<(), PlaybackError> {
        self.inner.clock.lock().play()
    }

    pub fn pause(&self) {
        self.bump();
        self.inner.clock.lock().pause();
    }

    pub fn state(&self) -> PlaybackState {
        self.inner.clock.lock().state()
    }

    pub fn frame(&self) -> Frame {
        self.inner.clock.lock().frame().clone()
    }

    /// Run `f` with exclusive access to the clock
    pub fn with<R>(&self, f: impl FnOnce(&mut PlaybackClock) -> R) -> R {
        f(&mut self.inner.clock.lock())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::PlayerConfig;
    use crate::source::{LiveSource, Source};
    use sr_domain_types::{DomPatch, NodeData, SnapshotNode, SourceEvent, SyntheticId};

    fn busy_session(inserts: u64) -> Vec<SourceEvent> {
        let mut events = vec![SourceEvent::new(
            0,
            DomPatch::snapshot(1u64, vec![SnapshotNode::document(1u64, vec![])]),
        )];
        for n in 0..inserts {
            events.push(SourceEvent::new(
                n + 1,
                DomPatch::insert(1u64, n + 2, 0, NodeData::element("p")),
            ));
        }
        events
    }

    #[sr_test_utils::logged_test]
    fn stale_generation_supersedes_replay() {
        let live = Arc::new(LiveSource::new());
        live.push_all(busy_session(50)).unwrap();
        let source: Arc<dyn Source> = live;

        let mut clock = PlaybackClock::new(PlayerConfig::default().with_replay_batch_size(10));
        clock.attach(source).unwrap();
        let shared = SharedClock::new(clock);

        // Cancel as soon as the first batch boundary is reached
        let err = shared
            .with(|clock| clock.seek_with(50, &|| true))
            .unwrap_err();
        assert!(matches!(err, PlaybackError::Superseded { target: 50 }));
        assert!(!err.is_fatal());

        // Partial progress is kept and the next seek finishes the job
        let partial = shared.with(|clock| clock.tree().len());
        assert!(partial > 1 && partial < 51);
        let frame = shared.seek(50).unwrap();
        assert_eq!(frame.tree.len(), 51);
        assert!(frame.tree.contains(SyntheticId::new(51)));
    }

    #[sr_test_utils::logged_test]
    fn clones_share_one_clock() {
        let live = Arc::new(LiveSource::new());
        live.push_all(busy_session(3)).unwrap();
        let mut clock = PlaybackClock::new(PlayerConfig::default());
        clock.attach(live).unwrap();

        let shared = SharedClock::new(clock);
        let other = shared.clone();
        shared.seek(2).unwrap();
        assert_eq!(other.state().time, 2);
        assert_eq!(other.frame().tree.len(), 3);
    }
}
