// Copyright 2025 Schelling Point Labs Inc
// SPDX-License-Identifier: AGPL-3.0-only

//! Player configuration
//!
//! Read from an optional TOML file, then overridden by `SR_PLAYER__*`
//! environment variables (`SR_PLAYER__SPEED=2`), then validated.

use std::borrow::Cow;
use std::collections::HashMap;
use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tracing::debug;
use validator::{Validate, ValidationError};

pub const ENV_PREFIX: &str = "SR_PLAYER";

/// Playback rates accepted by the clock
pub const SPEED_RANGE: std::ops::RangeInclusive<f64> = 0.0625..=16.0;

/// Finite and within [`SPEED_RANGE`]
pub fn check_speed(speed: f64) -> Result<(), ValidationError> {
    if speed.is_finite() && SPEED_RANGE.contains(&speed) {
        return Ok(());
    }
    Err(ValidationError::new("speed").with_message(Cow::Borrowed("speed must be within 0.0625..=16")))
}

fn validate_speed(config: &PlayerConfig) -> Result<(), ValidationError> {
    check_speed(config.speed)
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[validate(schema(function = "validate_speed"))]
#[serde(default)]
pub struct PlayerConfig {
    /// Playback rate relative to wall-clock time
    pub speed: f64,

    /// Auto-advance tick period
    #[validate(range(min = 1, max = 1000, message = "tick interval must be 1..=1000 ms"))]
    pub tick_interval_ms: u64,

    /// DOM patches between checkpoints; 0 disables checkpoints
    pub checkpoint_interval: usize,

    #[validate(range(min = 1, message = "at least one checkpoint must be kept"))]
    pub max_checkpoints: usize,

    /// Auxiliary events in `(t - aux_window_ms, t]` are reported with each frame
    #[validate(range(max = 3_600_000, message = "aux window must be at most one hour"))]
    pub aux_window_ms: u64,

    /// Events replayed between checks for a superseding seek
    #[validate(range(min = 1, message = "replay batch size must be positive"))]
    pub replay_batch_size: usize,
}

impl Default for PlayerConfig {
    fn default() -> Self {
        Self {
            speed: 1.0,
            tick_interval_ms: 16,
            checkpoint_interval: 500,
            max_checkpoints: 64,
            aux_window_ms: 1_000,
            replay_batch_size: 256,
        }
    }
}

impl PlayerConfig {
    /// Load from `path` (if any) and the process environment
    pub fn load(path: Option<&Path>) -> Result<Self> {
        Self::load_with_env(path, None)
    }

    /// Like [`load`](Self::load) with an explicit environment map instead of
    /// the process environment
    pub fn load_with_env(path: Option<&Path>, env: Option<HashMap<String, String>>) -> Result<Self> {
        let mut builder = config::Config::builder();
        if let Some(path) = path {
            builder = builder.add_source(
                config::File::from(path)
                    .format(config::FileFormat::Toml)
                    .required(true),
            );
        }
        let built = builder
            .add_source(
                config::Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true)
                    .source(env),
            )
            .build()
            .context("Failed to read player configuration")?;

        let config: PlayerConfig = built
            .try_deserialize()
            .context("Failed to parse player configuration")?;
        config.validate().context("Invalid player configuration")?;
        debug!(?config, "Loaded player configuration");
        Ok(config)
    }

    pub fn with_speed(mut self, speed: f64) -> Self {
        self.speed = speed;
        self
    }

    pub fn with_checkpoints(mut self, interval: usize, max: usize) -> Self {
        self.checkpoint_interval = interval;
        self.max_checkpoints = max;
        self
    }

    pub fn with_aux_window_ms(mut self, window: u64) -> Self {
        self.aux_window_ms = window;
        self
    }

    pub fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.tick_interval_ms.max(1))
    }

    pub fn with_replay_batch_size(mut self, size: usize) -> Self {
        self.replay_batch_size = size;
        self
    }
}
