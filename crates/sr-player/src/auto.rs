// Copyright 2025 Schelling Point Labs Inc
// SPDX-License-Identifier: AGPL-3.0-only

use std::time::Duration;

use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tokio::time::{interval, MissedTickBehavior};
use tracing::{debug, trace, warn};

use crate::error::PlaybackError;
use crate::shared::SharedClock;

/// Background task ticking a [`SharedClock`] at a fixed period
///
/// Ticks only do work while the clock is playing. The task ends on
/// [`stop`](Self::stop) or when playback fails.
pub struct AutoAdvance {
    shutdown: Option<oneshot::Sender<()>>,
    handle: JoinHandle<()>,
}

impl AutoAdvance {
    /// Tick at the clock's configured `tick_interval_ms`
    pub fn start(clock: SharedClock) -> Self {
        let period = clock.with(|clock| clock.config().tick_interval());
        Self::spawn(clock, period)
    }

    pub fn spawn(clock: SharedClock, period: Duration) -> Self {
        let (shutdown_tx, mut shutdown_rx) = oneshot::channel::<()>();
        let handle = tokio::spawn(async move {
            let mut tick = interval(period);
            tick.set_missed_tick_behavior(MissedTickBehavior::Skip);
            debug!(period_ms = period.as_millis() as u64, "Auto-advance started");
            loop {
                tokio::select! {
                    _ = &mut shutdown_rx => break,
                    _ = tick.tick() => {
                        match clock.tick() {
                            Ok(Some(frame)) => trace!(time = frame.time, "Advanced"),
                            Ok(None) => {}
                            Err(PlaybackError::Superseded { target }) => {
                                trace!(target, "Tick superseded by a seek");
                            }
                            Err(err) => {
                                warn!(error = %err, "Auto-advance stopping after playback failure");
                                break;
                            }
                        }
                    }
                }
            }
            debug!("Auto-advance stopped");
        });
        Self {
            shutdown: Some(shutdown_tx),
            handle,
        }
    }

    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }

    /// Stop ticking and wait for the task to exit
    pub async fn stop(mut self) {
        if let Some(shutdown) = self.shutdown.take() {
            let _ = shutdown.send(());
        }
        if let Err(err) = (&mut self.handle).await {
            warn!(error = %err, "Auto-advance task did not exit cleanly");
        }
    }
}

impl Drop for AutoAdvance {
    fn drop(&mut self) {
        if self.shutdown.is_some() {
            self.handle.abort();
        }
    }
}
