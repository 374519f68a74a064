#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Pure system that computes deterministic tower targets from world snapshots.
//!
//! Each tower picks the live enemy closest to it on the ground plane, provided
//! the enemy lies strictly inside the tower's range. When several enemies are
//! equally close the earliest candidate wins, which for id-sorted views means
//! the enemy that spawned first.

use glam::Vec2;
use voxel_defence_core::{EnemyId, EnemyView, GroundPoint, TowerId, TowerView};

/// Target assignment produced for a single tower.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TowerTarget {
    /// Tower that acquired the target.
    pub tower: TowerId,
    /// Enemy the tower should shoot at.
    pub enemy: EnemyId,
    /// Ground distance between the tower and the enemy.
    pub distance: f32,
}

/// Enemy considered by [`select_target`].
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TargetCandidate {
    /// Identifier of the enemy.
    pub enemy: EnemyId,
    /// Ground position of the enemy.
    pub position: Vec2,
}

/// Tower targeting system that reuses scratch buffers to avoid repeated allocations.
#[derive(Debug, Default)]
pub struct TowerTargeting {
    candidates: Vec<TargetCandidate>,
}

impl TowerTargeting {
    /// Creates a new tower targeting system with empty scratch buffers.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Computes tower targets for the provided world snapshot.
    ///
    /// The output buffer is cleared before populating it with the latest
    /// assignments. Towers without an enemy in range produce no entry.
    pub fn handle(&mut self, towers: &TowerView, enemies: &EnemyView, out: &mut Vec<TowerTarget>) {
        out.clear();

        if towers.is_empty() || enemies.is_empty() {
            return;
        }

        self.candidates.clear();
        self.candidates.reserve(enemies.len());
        self.candidates
            .extend(enemies.iter().map(|snapshot| TargetCandidate {
                enemy: snapshot.id,
                position: ground(snapshot.position.ground()),
            }));

        for tower in towers.iter() {
            let origin = ground(tower.position);
            if let Some((enemy, distance)) = closest_in_range(origin, tower.range, &self.candidates)
            {
                out.push(TowerTarget {
                    tower: tower.id,
                    enemy,
                    distance,
                });
            }
        }
    }
}

/// Selects the closest candidate strictly inside `range` of `origin`.
///
/// Ties keep the candidate that appears first in `candidates`.
#[must_use]
pub fn select_target(origin: Vec2, range: f32, candidates: &[TargetCandidate]) -> Option<EnemyId> {
    closest_in_range(origin, range, candidates).map(|(enemy, _)| enemy)
}

fn closest_in_range(
    origin: Vec2,
    range: f32,
    candidates: &[TargetCandidate],
) -> Option<(EnemyId, f32)> {
    let mut best: Option<(EnemyId, f32)> = None;
    for candidate in candidates {
        let distance = origin.distance(candidate.position);
        if !(distance < range) {
            continue;
        }
        match best {
            Some((_, closest)) if distance >= closest => {}
            _ => best = Some((candidate.enemy, distance)),
        }
    }
    best
}

fn ground(point: GroundPoint) -> Vec2 {
    Vec2::new(point.x, point.z)
}
