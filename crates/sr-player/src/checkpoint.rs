// Copyright 2025 Schelling Point Labs Inc
// SPDX-License-Identifier: AGPL-3.0-only

// Periodic tree checkpoints bounding the cost of backward seeks
//
// A checkpoint is the tree right after event `next_index - 1` was applied.
// Rebuilding from a checkpoint and replaying the remaining events yields the
// same tree as replaying from the beginning; trees are copy-on-write, so a
// checkpoint shares every node that later patches did not touch.

use sr_vtree::VTree;
use tracing::debug;

#[derive(Debug, Clone)]
pub struct Checkpoint {
    /// Index of the first event not reflected in `tree`
    pub next_index: usize,
    /// Time of the last event reflected in `tree`
    pub time: u64,
    pub tree: VTree,
}

#[derive(Debug, Clone)]
pub struct CheckpointStore {
    /// DOM patches between checkpoints; 0 disables checkpointing
    interval: usize,
    max: usize,
    entries: Vec<Checkpoint>,
    /// Highest event index offered so far
    frontier: usize,
    pending: usize,
}

impl CheckpointStore {
    pub fn new(interval: usize, max: usize) -> Self {
        Self {
            interval,
            max,
            entries: Vec::new(),
            frontier: 0,
            pending: 0,
        }
    }

    pub fn disabled() -> Self {
        Self::new(0, 0)
    }

    pub fn is_enabled(&self) -> bool {
        self.interval > 0 && self.max > 0
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn interval(&self) -> usize {
        self.interval
    }

    pub fn iter(&self) -> impl Iterator<Item = &Checkpoint> {
        self.entries.iter()
    }

    /// Latest checkpoint whose state is not ahead of `time`
    pub fn nearest(&self, time: u64) -> Option<&Checkpoint> {
        let after = self.entries.partition_point(|checkpoint| checkpoint.time <= time);
        after.checked_sub(1).map(|index| &self.entries[index])
    }

    /// Called after each applied DOM patch; records a checkpoint every
    /// `interval` patches of previously unseen territory
    pub fn offer(&mut self, next_index: usize, time: u64, tree: &VTree) {
        if !self.is_enabled() || next_index <= self.frontier {
            return;
        }
        self.frontier = next_index;
        self.pending += 1;
        if self.pending < self.interval {
            return;
        }
        self.pending = 0;
        self.entries.push(Checkpoint {
            next_index,
            time,
            tree: tree.clone(),
        });
        debug!(next_index, time, nodes = tree.len(), "Recorded checkpoint");
        if self.entries.len() > self.max {
            self.thin();
        }
    }

    /// Drop every other checkpoint and double the spacing
    fn thin(&mut self) {
        let mut index = 0;
        self.entries.retain(|_| {
            index += 1;
            index % 2 == 0
        });
        self.interval = self.interval.saturating_mul(2);
        debug!(
            remaining = self.entries.len(),
            interval = self.interval,
            "Thinned checkpoints"
        );
    }

    pub fn clear(&mut self) {
        self.entries.clear();
        self.frontier = 0;
        self.pending = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[sr_test_utils::logged_test]
    fn records_every_interval_patches() {
        let tree = VTree::new();
        let mut store = CheckpointStore::new(3, 10);
        for index in 1..=9 {
            store.offer(index, index as u64 * 10, &tree);
        }
        let indices: Vec<usize> = store.iter().map(|c| c.next_index).collect();
        assert_eq!(indices, vec![3, 6, 9]);
    }

    #[sr_test_utils::logged_test]
    fn revisited_events_are_not_counted_twice() {
        let tree = VTree::new();
        let mut store = CheckpointStore::new(2, 10);
        store.offer(1, 10, &tree);
        store.offer(1, 10, &tree);
        store.offer(2, 20, &tree);
        assert_eq!(store.len(), 1);
        store.offer(1, 10, &tree);
        store.offer(2, 20, &tree);
        store.offer(3, 30, &tree);
        assert_eq!(store.len(), 1);
    }

    #[sr_test_utils::logged_test]
    fn nearest_is_at_or_before_time() {
        let tree = VTree::new();
        let mut store = CheckpointStore::new(1, 10);
        store.offer(1, 10, &tree);
        store.offer(2, 20, &tree);
        store.offer(3, 20, &tree);
        assert!(store.nearest(9).is_none());
        assert_eq!(store.nearest(10).map(|c| c.next_index), Some(1));
        assert_eq!(store.nearest(25).map(|c| c.next_index), Some(3));
    }

    #[sr_test_utils::logged_test]
    fn thinning_keeps_store_bounded() {
        let tree = VTree::new();
        let mut store = CheckpointStore::new(1, 4);
        for index in 1..=40 {
            store.offer(index, index as u64, &tree);
        }
        assert!(store.len() <= 4);
        assert!(store.interval() > 1);
        let times: Vec<u64> = store.iter().map(|c| c.time).collect();
        assert!(times.windows(2).all(|pair| pair[0] < pair[1]));
    }

    #[sr_test_utils::logged_test]
    fn disabled_store_records_nothing() {
        let mut store = CheckpointStore::disabled();
        store.offer(1, 1, &VTree::new());
        assert!(store.is_empty());
    }
}
