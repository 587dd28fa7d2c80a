// Copyright 2025 Schelling Point Labs Inc
// SPDX-License-Identifier: AGPL-3.0-only

//! Playback clock
//!
//! The clock owns the current tree and maps a requested time to a [`Frame`].
//! Seeking forward applies the patches in between; seeking backward rebuilds
//! from the nearest checkpoint (or from nothing) because patches cannot be
//! undone. Any patch failure is fatal: the clock keeps the last good frame,
//! reports `Failed`, and refuses to move until a new source is attached.

use std::sync::Arc;

use sr_domain_types::SourceEvent;
use sr_vtree::VTree;
use tracing::{debug, error, info, trace, warn};

use crate::checkpoint::CheckpointStore;
use crate::config::{PlayerConfig, check_speed};
use crate::error::{PlaybackError, SourceError};
use crate::frame::Frame;
use crate::observer::{PlaybackObserver, PlaybackState, PlaybackStatus};
use crate::resources::ResourceMap;
use crate::source::{ReadyState, RecordingDuration, Source};
use crate::time::{MonotonicTime, TimeSource};

/// Media time pinned to a wall-clock instant while playing
#[derive(Debug, Clone, Copy)]
struct Anchor {
    wall_ms: u64,
    media_ms: u64,
}

pub struct PlaybackClock {
    config: PlayerConfig,
    time_source: Arc<dyn TimeSource>,
    source: Option<Arc<dyn Source>>,
    events: Arc<[SourceEvent]>,
    duration: RecordingDuration,
    tree: VTree,
    /// Number of leading events reflected in `tree`
    applied: usize,
    time: u64,
    /// Aux events crossed by a superseded forward replay, owed to the next frame
    pending_crossed: Vec<SourceEvent>,
    checkpoints: CheckpointStore,
    ready: ReadyState,
    status: PlaybackStatus,
    failure: Option<PlaybackError>,
    anchor: Option<Anchor>,
    frame: Frame,
    resources: Arc<ResourceMap>,
    observers: Vec<Arc<dyn PlaybackObserver>>,
    published: Option<PlaybackState>,
}

impl PlaybackClock {
    pub fn new(config: PlayerConfig) -> Self {
        Self::with_time_source(config, Arc::new(MonotonicTime::new()))
    }

    pub fn with_time_source(config: PlayerConfig, time_source: Arc<dyn TimeSource>) -> Self {
        let resources = Arc::new(ResourceMap::new());
        let checkpoints = CheckpointStore::new(config.checkpoint_interval, config.max_checkpoints);
        Self {
            config,
            time_source,
            source: None,
            events: Arc::from(Vec::new()),
            duration: RecordingDuration::Unknown,
            tree: VTree::new(),
            applied: 0,
            time: 0,
            pending_crossed: Vec::new(),
            checkpoints,
            ready: ReadyState::Waiting,
            status: PlaybackStatus::Paused,
            failure: None,
            anchor: None,
            frame: Frame::empty(Arc::clone(&resources)),
            resources,
            observers: Vec::new(),
            published: None,
        }
    }

    pub fn config(&self) -> &PlayerConfig {
        &self.config
    }

    pub fn time(&self) -> u64 {
        self.time
    }

    pub fn ready_state(&self) -> ReadyState {
        self.ready
    }

    pub fn status(&self) -> PlaybackStatus {
        self.status
    }

    pub fn duration(&self) -> RecordingDuration {
        self.duration
    }

    pub fn state(&self) -> PlaybackState {
        PlaybackState {
            ready: self.ready,
            status: self.status,
            time: self.time,
            duration: self.duration,
        }
    }

    /// The last successfully materialized frame
    pub fn frame(&self) -> &Frame {
        &self.frame
    }

    pub fn tree(&self) -> &VTree {
        &self.tree
    }

    pub fn failure(&self) -> Option<&PlaybackError> {
        self.failure.as_ref()
    }

    pub fn checkpoints(&self) -> &CheckpointStore {
        &self.checkpoints
    }

    pub fn set_resources(&mut self, resources: ResourceMap) {
        self.resources = Arc::new(resources);
    }

    /// Register an observer; it receives the current state right away
    pub fn subscribe(&mut self, observer: Arc<dyn PlaybackObserver>) {
        observer.on_state(&self.state());
        self.observers.push(observer);
    }

    /// Replace the source and materialize its start
    ///
    /// The previous tree stays in place unless the new source is ready.
    pub fn attach(&mut self, source: Arc<dyn Source>) -> Result<Frame, PlaybackError> {
        match source.ready_state() {
            ReadyState::Ready => {}
            ReadyState::Failed => {
                return Err(match source.failure() {
                    Some(err) => PlaybackError::Source(err),
                    None => PlaybackError::SourceNotReady {
                        state: ReadyState::Failed,
                    },
                });
            }
            ReadyState::Waiting => {
                return Err(PlaybackError::SourceNotReady {
                    state: ReadyState::Waiting,
                });
            }
        }
        let Some(events) = source.events() else {
            return Err(PlaybackError::SourceNotReady {
                state: source.ready_state(),
            });
        };

        info!(
            event_count = events.len(),
            duration = ?source.metadata().duration,
            "Attaching source to playback clock"
        );
        // Replay the start on a staging clock without observers; nothing
        // here changes until it succeeds
        let mut staged = PlaybackClock::with_time_source(self.config.clone(), Arc::clone(&self.time_source));
        staged.resources = Arc::clone(&self.resources);
        staged.frame = Frame::empty(Arc::clone(&self.resources));
        staged.duration = source.metadata().duration;
        staged.events = events;
        staged.source = Some(source);
        staged.ready = ReadyState::Ready;
        let frame = staged.seek(0)?;

        staged.observers = std::mem::take(&mut self.observers);
        staged.published = self.published;
        *self = staged;
        self.publish();
        Ok(frame)
    }

    /// Materialize the tree at `target` (clamped to a known duration)
    pub fn seek(&mut self, target: u64) -> Result<Frame, PlaybackError> {
        self.seek_with(target, &|| false)
    }

    /// `seek` that gives up between replay batches once `cancelled` is true
    pub(crate) fn seek_with(&mut self, target: u64, cancelled: &dyn Fn() -> bool) -> Result<Frame, PlaybackError> {
        self.ensure_playable()?;
        self.sync_source()?;
        let target = self.clamp(target);
        debug!(from = self.time, to = target, "Seeking");

        let frame = self.advance(target, cancelled)?;
        match self.status {
            PlaybackStatus::Playing => {
                self.anchor = Some(Anchor {
                    wall_ms: self.time_source.now_ms(),
                    media_ms: target,
                });
            }
            PlaybackStatus::Ended if !self.at_end() => self.status = PlaybackStatus::Paused,
            PlaybackStatus::Ended | PlaybackStatus::Paused => {}
        }
        self.publish();
        Ok(frame)
    }

    /// Start auto-advancing from the current time; restarts an ended recording
    pub fn play(&mut self) -> Result<(), PlaybackError> {
        self.ensure_playable()?;
        let speed = self.config.speed;
        if check_speed(speed).is_err() {
            return Err(PlaybackError::InvalidSpeed { speed });
        }
        if self.status == PlaybackStatus::Ended {
            self.status = PlaybackStatus::Paused;
            self.seek(0)?;
        }
        self.anchor = Some(Anchor {
            wall_ms: self.time_source.now_ms(),
            media_ms: self.time,
        });
        self.status = PlaybackStatus::Playing;
        debug!(time = self.time, speed = self.config.speed, "Playback started");
        self.publish();
        Ok(())
    }

    /// Stop auto-advancing; the current frame stays
    pub fn pause(&mut self) {
        if self.status == PlaybackStatus::Playing {
            self.status = PlaybackStatus::Paused;
            self.anchor = None;
            debug!(time = self.time, "Playback paused");
            self.publish();
        }
    }

    /// Change the playback rate; the current position is kept
    pub fn set_speed(&mut self, speed: f64) -> Result<(), PlaybackError> {
        if check_speed(speed).is_err() {
            return Err(PlaybackError::InvalidSpeed { speed });
        }
        self.config.speed = speed;
        if self.anchor.is_some() {
            self.anchor = Some(Anchor {
                wall_ms: self.time_source.now_ms(),
                media_ms: self.time,
            });
        }
        Ok(())
    }

    /// One catch-up step toward the wall-clock target while playing
    pub fn tick(&mut self) -> Result<Option<Frame>, PlaybackError> {
        self.tick_with(&|| false)
    }

    pub(crate) fn tick_with(&mut self, cancelled: &dyn Fn() -> bool) -> Result<Option<Frame>, PlaybackError> {
        let Some(anchor) = self.anchor.filter(|_| self.status == PlaybackStatus::Playing) else {
            return Ok(None);
        };
        self.ensure_playable()?;
        self.sync_source()?;

        let elapsed = self.time_source.now_ms().saturating_sub(anchor.wall_ms);
        let target = self.clamp(anchor.media_ms.saturating_add((elapsed as f64 * self.config.speed) as u64));
        trace!(elapsed, target, "Tick");

        let frame = self.advance(target, cancelled)?;
        if self.at_end() {
            self.status = PlaybackStatus::Ended;
            self.anchor = None;
            info!(time = self.time, "Playback reached the end of the recording");
        }
        self.publish();
        Ok(Some(frame))
    }

    fn at_end(&self) -> bool {
        matches!(self.duration, RecordingDuration::Known(end) if self.time >= end)
    }

    fn clamp(&self, target: u64) -> u64 {
        match self.duration {
            RecordingDuration::Known(end) => target.min(end),
            RecordingDuration::Unknown => target,
        }
    }

    fn ensure_playable(&self) -> Result<(), PlaybackError> {
        if let Some(failure) = &self.failure {
            return Err(PlaybackError::Failed(Box::new(failure.clone())));
        }
        if self.source.is_none() {
            return Err(PlaybackError::NoSource);
        }
        Ok(())
    }

    /// Pick up events a live source appended since the last call
    fn sync_source(&mut self) -> Result<(), PlaybackError> {
        let Some(source) = self.source.clone() else {
            return Err(PlaybackError::NoSource);
        };
        if source.ready_state() == ReadyState::Failed {
            let err = source.failure().unwrap_or(SourceError::Settled {
                state: ReadyState::Failed,
            });
            return Err(self.fail(PlaybackError::Source(err)));
        }
        if let Some(events) = source.events() {
            if events.len() != self.events.len() {
                trace!(before = self.events.len(), after = events.len(), "Source grew");
                self.events = events;
            }
        }
        self.duration = source.metadata().duration;
        Ok(())
    }

    /// Replay DOM patches up to `target` and publish the resulting frame
    fn advance(&mut self, target: u64, cancelled: &dyn Fn() -> bool) -> Result<Frame, PlaybackError> {
        let events = Arc::clone(&self.events);
        let rewinding = self
            .applied
            .checked_sub(1)
            .is_some_and(|last| events[last].time > target);

        let (mut tree, mut index, mut reached) = if rewinding {
            match self.checkpoints.nearest(target) {
                Some(checkpoint) => {
                    debug!(
                        target,
                        checkpoint_time = checkpoint.time,
                        replay_from = checkpoint.next_index,
                        "Rebuilding from checkpoint"
                    );
                    (checkpoint.tree.clone(), checkpoint.next_index, checkpoint.time)
                }
                None => {
                    debug!(target, "Rebuilding from the start of the recording");
                    (VTree::new(), 0, 0)
                }
            }
        } else {
            (self.tree.clone(), self.applied, self.time)
        };

        let batch_size = self.config.replay_batch_size.max(1);
        let mut in_batch = 0;
        let mut crossed = std::mem::take(&mut self.pending_crossed);
        if rewinding {
            crossed.clear();
        }
        let mut previous = index.checked_sub(1).map(|last| events[last].time);

        while let Some(event) = events.get(index).filter(|event| event.time <= target) {
            if in_batch == batch_size {
                in_batch = 0;
                if cancelled() {
                    debug!(target, reached, "Replay superseded");
                    self.tree = tree;
                    self.applied = index;
                    self.time = reached;
                    self.pending_crossed = crossed;
                    return Err(PlaybackError::Superseded { target });
                }
            }
            if let Some(previous) = previous.filter(|previous| event.time < *previous) {
                return Err(self.fail(PlaybackError::OutOfOrder {
                    index,
                    previous,
                    time: event.time,
                }));
            }
            match event.as_patch() {
                Some(patch) => {
                    if let Err(source) = tree.apply(patch) {
                        return Err(self.fail(PlaybackError::Patch {
                            index,
                            time: event.time,
                            source,
                        }));
                    }
                    self.checkpoints.offer(index + 1, event.time, &tree);
                }
                None if !rewinding => crossed.push(event.clone()),
                None => {}
            }
            previous = Some(event.time);
            reached = event.time;
            index += 1;
            in_batch += 1;
        }

        self.tree = tree;
        self.applied = index;
        self.time = target;
        let frame = Frame::new(
            target,
            self.tree.clone(),
            events,
            self.config.aux_window_ms,
            crossed,
            Arc::clone(&self.resources),
        );
        self.frame = frame.clone();
        Ok(frame)
    }

    fn fail(&mut self, err: PlaybackError) -> PlaybackError {
        error!(error = %err, time = self.time, "Playback failed");
        if self.status == PlaybackStatus::Playing {
            warn!("Auto-advance stopped by failure");
        }
        self.ready = ReadyState::Failed;
        self.status = PlaybackStatus::Paused;
        self.anchor = None;
        self.failure = Some(err.clone());
        self.publish();
        err
    }

    fn publish(&mut self) {
        let state = self.state();
        if self.published == Some(state) {
            return;
        }
        self.published = Some(state);
        for observer in &self.observers {
            observer.on_state(&state);
        }
    }
}
