#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Autonomous player that starts waves and builds towers on its own.
//!
//! The autopilot thinks once per [`THINK_INTERVAL`] of game time. When the
//! field is quiet it starts the next wave; otherwise, with enough money, it
//! picks a random tower kind and probes up to [`MAX_PLACEMENT_ATTEMPTS`]
//! random cells, placing the tower on the first legal one. Every random
//! choice comes from a seeded [`ChaCha8Rng`] so sessions replay exactly.

use std::{ops::Range, time::Duration};

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use tracing::debug;
use voxel_defence_core::{Catalog, Command, GridCell, TowerKind};

/// Game time between two autopilot decisions.
pub const THINK_INTERVAL: Duration = Duration::from_secs(1);

/// Random cells probed before a build decision is abandoned.
pub const MAX_PLACEMENT_ATTEMPTS: usize = 10;

/// Money the autopilot keeps before considering a purchase.
pub const BUILD_THRESHOLD: u32 = 100;

/// Columns and rows the autopilot draws candidate cells from.
pub const CANDIDATE_CELLS: Range<i32> = -10..10;

/// Session facts the autopilot bases its decisions on.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct AutopilotState {
    /// Whether a wave is currently running.
    pub wave_active: bool,
    /// Number of enemies still on the path.
    pub live_enemies: usize,
    /// Money available to spend.
    pub money: u32,
}

/// Pure system that emits commands on behalf of an absent player.
#[derive(Debug)]
pub struct Autopilot {
    rng: ChaCha8Rng,
    accumulator: Duration,
}

impl Autopilot {
    /// Creates an autopilot whose random choices derive from `seed`.
    #[must_use]
    pub fn new(seed: u64) -> Self {
        Self {
            rng: ChaCha8Rng::seed_from_u64(seed),
            accumulator: Duration::ZERO,
        }
    }

    /// Accumulates `dt` and, once per think interval, emits at most one command.
    ///
    /// The `placeable` closure must report whether a tower may legally stand
    /// on the provided cell; affordability is checked against `catalog`.
    pub fn handle<F>(
        &mut self,
        dt: Duration,
        state: AutopilotState,
        catalog: &Catalog,
        mut placeable: F,
        out: &mut Vec<Command>,
    ) where
        F: FnMut(GridCell) -> bool,
    {
        self.accumulator = self.accumulator.saturating_add(dt);
        if self.accumulator < THINK_INTERVAL {
            return;
        }
        self.accumulator = Duration::ZERO;

        if !state.wave_active && state.live_enemies == 0 {
            out.push(Command::StartWave);
            return;
        }

        if state.money < BUILD_THRESHOLD {
            return;
        }

        let kind = TowerKind::ALL[self.rng.gen_range(0..TowerKind::ALL.len())];
        if state.money < catalog.tower(kind).cost {
            return;
        }

        for _ in 0..MAX_PLACEMENT_ATTEMPTS {
            let cell = GridCell::new(
                self.rng.gen_range(CANDIDATE_CELLS),
                self.rng.gen_range(CANDIDATE_CELLS),
            );
            if placeable(cell) {
                out.push(Command::PlaceTower { kind, cell });
                return;
            }
        }

        debug!(?kind, "autopilot found no legal cell");
    }

    /// Game time accumulated toward the next decision.
    #[must_use]
    pub fn accumulated(&self) -> Duration {
        self.accumulator
    }
}
