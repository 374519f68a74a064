//! Authoritative tower state management utilities.

use std::{collections::BTreeMap, time::Duration};

use glam::{Vec2, Vec3};
use voxel_defence_core::{
    EnemyId, GridCell, GroundPoint, TowerId, TowerKind, TowerSnapshot, TowerStats,
};

const DAMAGE_PER_LEVEL: f32 = 1.2;
const RANGE_PER_LEVEL: f32 = 1.1;
const COOLDOWN_PER_LEVEL: f64 = 0.9;

/// Height above the turret at which projectiles are released.
const MUZZLE_OFFSET: f32 = 0.5;

/// Shot produced by a tower whose cooldown elapsed.
#[derive(Clone, Copy, Debug, PartialEq)]
pub(crate) struct Shot {
    pub(crate) target: EnemyId,
    pub(crate) damage: f32,
    pub(crate) origin: Vec3,
}

/// Tower stored inside the world.
#[derive(Clone, Debug)]
pub(crate) struct TowerState {
    pub(crate) id: TowerId,
    pub(crate) kind: TowerKind,
    pub(crate) cell: GridCell,
    /// Ground position; `y` holds the world z coordinate.
    pub(crate) position: Vec2,
    pub(crate) level: u32,
    pub(crate) base_cost: u32,
    pub(crate) range: f32,
    pub(crate) damage: f32,
    pub(crate) cooldown: Duration,
    pub(crate) height: f32,
    pub(crate) last_shot_at: Option<Duration>,
    pub(crate) target: Option<EnemyId>,
}

impl TowerState {
    pub(crate) fn new(
        id: TowerId,
        kind: TowerKind,
        cell: GridCell,
        stats: &TowerStats,
        tile_size: f32,
    ) -> Self {
        let center = cell.world_position(tile_size);
        Self {
            id,
            kind,
            cell,
            position: Vec2::new(center.x, center.z),
            level: 1,
            base_cost: stats.cost,
            range: stats.range,
            damage: stats.damage,
            cooldown: stats.cooldown(),
            height: stats.height,
            last_shot_at: None,
            target: None,
        }
    }

    /// Fires at `target` when the tower never fired or its cooldown elapsed.
    pub(crate) fn try_fire(
        &mut self,
        now: Duration,
        target: EnemyId,
        damage_multiplier: f32,
    ) -> Option<Shot> {
        if let Some(last) = self.last_shot_at {
            if now.saturating_sub(last) < self.cooldown {
                return None;
            }
        }
        self.last_shot_at = Some(now);
        Some(Shot {
            target,
            damage: self.damage * damage_multiplier,
            origin: Vec3::new(self.position.x, self.height + MUZZLE_OFFSET, self.position.y),
        })
    }

    /// Raises the level by one; the caller pays for it.
    pub(crate) fn upgrade(&mut self) {
        self.level = self.level.saturating_add(1);
        self.damage *= DAMAGE_PER_LEVEL;
        self.range *= RANGE_PER_LEVEL;
        self.cooldown = self.cooldown.mul_f64(COOLDOWN_PER_LEVEL);
    }

    /// Price of the next level: `floor(base_cost * 0.5 * level)`.
    pub(crate) fn upgrade_cost(&self) -> u32 {
        let cost = u64::from(self.base_cost) * u64::from(self.level) / 2;
        u32::try_from(cost).unwrap_or(u32::MAX)
    }

    /// Money returned on sale, independent of level.
    pub(crate) fn sell_refund(&self) -> u32 {
        self.base_cost / 2
    }

    pub(crate) fn snapshot(&self) -> TowerSnapshot {
        TowerSnapshot {
            id: self.id,
            kind: self.kind,
            cell: self.cell,
            position: GroundPoint::new(self.position.x, self.position.y),
            level: self.level,
            range: self.range,
            damage: self.damage,
            cooldown: self.cooldown,
            target: self.target,
        }
    }
}

/// Registry that stores towers and manages identifier allocation.
#[derive(Debug)]
pub(crate) struct TowerRegistry {
    entries: BTreeMap<TowerId, TowerState>,
    next_tower_id: TowerId,
}

impl TowerRegistry {
    /// Creates an empty tower registry with a reset identifier counter.
    pub(crate) fn new() -> Self {
        Self {
            entries: BTreeMap::new(),
            next_tower_id: TowerId::new(0),
        }
    }

    pub(crate) fn insert(
        &mut self,
        kind: TowerKind,
        cell: GridCell,
        stats: &TowerStats,
        tile_size: f32,
    ) -> TowerId {
        let id = self.next_tower_id;
        self.next_tower_id = TowerId::new(id.get().saturating_add(1));
        let _ = self
            .entries
            .insert(id, TowerState::new(id, kind, cell, stats, tile_size));
        id
    }

    pub(crate) fn get(&self, id: TowerId) -> Option<&TowerState> {
        self.entries.get(&id)
    }

    pub(crate) fn get_mut(&mut self, id: TowerId) -> Option<&mut TowerState> {
        self.entries.get_mut(&id)
    }

    pub(crate) fn remove(&mut self, id: TowerId) -> Option<TowerState> {
        self.entries.remove(&id)
    }

    pub(crate) fn iter(&self) -> impl Iterator<Item = &TowerState> {
        self.entries.values()
    }

    pub(crate) fn iter_mut(&mut self) -> impl Iterator<Item = &mut TowerState> {
        self.entries.values_mut()
    }

    /// Tower standing exactly on `cell`, if any.
    pub(crate) fn at_cell(&self, cell: GridCell) -> Option<TowerId> {
        self.entries
            .values()
            .find(|tower| tower.cell == cell)
            .map(|tower| tower.id)
    }

    /// Reports whether a tower stands closer than `spacing` on both axes.
    pub(crate) fn crowds(&self, point: Vec2, spacing: f32) -> bool {
        self.entries.values().any(|tower| {
            (tower.position.x - point.x).abs() < spacing
                && (tower.position.y - point.y).abs() < spacing
        })
    }

    pub(crate) fn clear(&mut self) {
        self.entries.clear();
        self.next_tower_id = TowerId::new(0);
    }
}
