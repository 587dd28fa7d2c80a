// Copyright 2025 Schelling Point Labs Inc
// SPDX-License-Identifier: AGPL-3.0-only

//! Resource map handed to renderers alongside each frame
//!
//! Recordings refer to stylesheets, images and fonts by key. The storage
//! layer supplies the key to location mapping; locations may be absolute or
//! relative to a base URL. Resolution is lazy and cached.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::Mutex;
use serde::Deserialize;
use tracing::warn;
use url::Url;

#[derive(Debug, Clone, Default)]
pub struct ResourceMap {
    base: Option<Url>,
    entries: HashMap<String, String>,
    resolved: Arc<Mutex<HashMap<String, Option<Url>>>>,
}

impl ResourceMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Relative locations are joined onto `base`
    pub fn with_base(base: Url) -> Self {
        Self {
            base: Some(base),
            ..Self::default()
        }
    }

    pub fn insert(&mut self, key: impl Into<String>, location: impl Into<String>) {
        // Clones share the cache until one of them changes
        self.resolved = Arc::default();
        self.entries.insert(key.into(), location.into());
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn contains(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    /// Location for `key`, or `None` when unknown or unparseable
    pub fn resolve(&self, key: &str) -> Option<Url> {
        if let Some(cached) = self.resolved.lock().get(key) {
            return cached.clone();
        }
        let location = self.entries.get(key)?;
        let parsed = match &self.base {
            Some(base) => base.join(location),
            None => Url::parse(location),
        };
        let url = match parsed {
            Ok(url) => Some(url),
            Err(err) => {
                warn!(key, location = %location, error = %err, "Unresolvable resource location");
                None
            }
        };
        self.resolved.lock().insert(key.to_string(), url.clone());
        url
    }

    /// Parse a JSON object of `key -> location`
    pub fn from_json(json: &str, base: Option<Url>) -> serde_json::Result<Self> {
        #[derive(Deserialize)]
        #[serde(transparent)]
        struct Entries(HashMap<String, String>);

        let Entries(entries) = serde_json::from_str(json)?;
        Ok(Self {
            base,
            entries,
            resolved: Arc::default(),
        })
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for ResourceMap {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut map = ResourceMap::new();
        for (key, location) in iter {
            map.insert(key, location);
        }
        map
    }
}
