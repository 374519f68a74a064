//! Enemy state and its per-tick movement along the path.

use std::time::Duration;

use glam::{Vec2, Vec3};
use voxel_defence_core::{
    DifficultyModifiers, EnemyId, EnemyKind, EnemySnapshot, EnemyStats, GroundPoint, WorldPoint,
    ENEMY_TRAVEL_HEIGHT,
};

/// Distance at which a waypoint counts as reached.
pub(crate) const WAYPOINT_TOLERANCE: f32 = 0.1;

/// Time an enemy keeps flashing after taking damage.
pub(crate) const FLASH_DURATION: Duration = Duration::from_millis(50);

#[derive(Clone, Debug)]
pub(crate) struct Enemy {
    pub(crate) id: EnemyId,
    pub(crate) kind: EnemyKind,
    pub(crate) hp: f32,
    pub(crate) max_hp: f32,
    pub(crate) damage: u32,
    pub(crate) speed: f32,
    pub(crate) reward: u32,
    /// Ground position; `y` holds the world z coordinate.
    pub(crate) position: Vec2,
    pub(crate) waypoint_index: usize,
    pub(crate) is_dead: bool,
    pub(crate) reached_end: bool,
    last_hit_at: Option<Duration>,
}

impl Enemy {
    /// Creates an enemy at `start` with difficulty-adjusted hit points and reward.
    pub(crate) fn spawn(
        id: EnemyId,
        kind: EnemyKind,
        stats: &EnemyStats,
        modifiers: DifficultyModifiers,
        start: GroundPoint,
    ) -> Self {
        let max_hp = stats.hp * modifiers.hp_multiplier;
        let reward = (stats.reward as f32 * modifiers.reward_multiplier).floor().max(0.0) as u32;
        Self {
            id,
            kind,
            hp: max_hp,
            max_hp,
            damage: stats.damage,
            speed: stats.speed,
            reward,
            position: Vec2::new(start.x, start.z),
            waypoint_index: 0,
            is_dead: false,
            reached_end: false,
            last_hit_at: None,
        }
    }

    /// Moves toward the next waypoint, carrying leftover travel past reached waypoints.
    pub(crate) fn advance(&mut self, dt_secs: f32, waypoints: &[GroundPoint]) {
        if self.is_dead || self.reached_end {
            return;
        }

        let mut budget = (self.speed * dt_secs).max(0.0);
        loop {
            let Some(next) = waypoints.get(self.waypoint_index + 1) else {
                self.reached_end = true;
                return;
            };
            let target = Vec2::new(next.x, next.z);
            let distance = self.position.distance(target);

            if distance < WAYPOINT_TOLERANCE {
                if self.arrive(waypoints.len()) {
                    return;
                }
                continue;
            }

            if budget <= 0.0 {
                return;
            }

            if budget >= distance {
                self.position = target;
                budget -= distance;
                if self.arrive(waypoints.len()) {
                    return;
                }
                continue;
            }

            self.position += (target - self.position) / distance * budget;
            return;
        }
    }

    fn arrive(&mut self, waypoint_count: usize) -> bool {
        self.waypoint_index += 1;
        if self.waypoint_index + 1 >= waypoint_count {
            self.reached_end = true;
        }
        self.reached_end
    }

    /// Subtracts hit points and reports whether this call killed the enemy.
    pub(crate) fn apply_damage(&mut self, amount: f32, now: Duration) -> bool {
        if self.is_dead {
            return false;
        }
        self.hp = (self.hp - amount.max(0.0)).max(0.0);
        self.last_hit_at = Some(now);
        if self.hp <= 0.0 {
            self.is_dead = true;
            return true;
        }
        false
    }

    pub(crate) fn is_flashing(&self, now: Duration) -> bool {
        self.last_hit_at
            .map_or(false, |hit| now.saturating_sub(hit) < FLASH_DURATION)
    }

    pub(crate) fn world_position(&self) -> Vec3 {
        Vec3::new(self.position.x, ENEMY_TRAVEL_HEIGHT, self.position.y)
    }

    pub(crate) fn snapshot(&self, now: Duration) -> EnemySnapshot {
        EnemySnapshot {
            id: self.id,
            kind: self.kind,
            position: WorldPoint::new(self.position.x, ENEMY_TRAVEL_HEIGHT, self.position.y),
            hp: self.hp,
            max_hp: self.max_hp,
            flashing: self.is_flashing(now),
        }
    }
}
