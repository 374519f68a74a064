#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Deterministic wave scheduler that releases enemies from a FIFO queue.
//!
//! A wave is expanded into `(kind, delay)` entries when it starts. Every tick
//! the scheduler accumulates game time and releases the head entry once its
//! delay has elapsed. At most one enemy leaves the queue per tick and the
//! accumulator restarts from zero after each release, so leftover time is not
//! carried into the next delay.

use std::{collections::VecDeque, time::Duration};

use voxel_defence_core::{EnemyKind, WaveSpec};

/// Entry waiting in the spawn queue.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PendingSpawn {
    /// Kind of enemy to release.
    pub kind: EnemyKind,
    /// Game time that must accumulate before the release.
    pub delay: Duration,
}

/// Pure system that owns the spawn queue of the running wave.
#[derive(Debug, Default)]
pub struct WaveSpawner {
    queue: VecDeque<PendingSpawn>,
    accumulator: Duration,
}

impl WaveSpawner {
    /// Creates a scheduler with an empty queue.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces the queue with the expanded groups of `wave`.
    pub fn load(&mut self, wave: &WaveSpec) {
        self.queue.clear();
        self.queue.extend(
            wave.pending_spawns()
                .map(|(kind, delay)| PendingSpawn { kind, delay }),
        );
        self.accumulator = Duration::ZERO;
    }

    /// Drops every pending entry.
    pub fn clear(&mut self) {
        self.queue.clear();
        self.accumulator = Duration::ZERO;
    }

    /// Accumulates `dt` and releases the head entry once its delay elapsed.
    pub fn advance(&mut self, dt: Duration) -> Option<EnemyKind> {
        let head = *self.queue.front()?;
        self.accumulator = self.accumulator.saturating_add(dt);
        if self.accumulator < head.delay {
            return None;
        }

        let _ = self.queue.pop_front();
        self.accumulator = Duration::ZERO;
        Some(head.kind)
    }

    /// Reports whether every entry has been released.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    /// Number of enemies still waiting for release.
    #[must_use]
    pub fn remaining(&self) -> usize {
        self.queue.len()
    }

    /// Game time accumulated toward the head entry.
    #[must_use]
    pub fn accumulated(&self) -> Duration {
        self.accumulator
    }
}
