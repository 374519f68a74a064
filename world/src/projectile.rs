//! Homing projectiles that resolve against their target every tick.

use std::time::Duration;

use glam::Vec3;
use voxel_defence_core::{EnemyId, ProjectileId, ProjectileSnapshot, WorldPoint};

/// Travel speed in world units per second.
pub(crate) const PROJECTILE_SPEED: f32 = 25.0;

/// Distance to the target at which a projectile strikes.
pub(crate) const STRIKE_RADIUS: f32 = 0.5;

/// Flight time after which a projectile is discarded.
pub(crate) const PROJECTILE_LIFETIME: Duration = Duration::from_secs(3);

/// Result of advancing a projectile by one tick.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum ProjectileOutcome {
    Travelling,
    Hit,
    Expired,
}

#[derive(Clone, Debug)]
pub(crate) struct Projectile {
    pub(crate) id: ProjectileId,
    pub(crate) target: EnemyId,
    pub(crate) damage: f32,
    pub(crate) position: Vec3,
    age: Duration,
}

impl Projectile {
    pub(crate) fn new(id: ProjectileId, target: EnemyId, damage: f32, origin: Vec3) -> Self {
        Self {
            id,
            target,
            damage,
            position: origin,
            age: Duration::ZERO,
        }
    }

    /// Homes toward `target_position` without overshooting it.
    ///
    /// A missing target or an exhausted lifetime expires the projectile.
    pub(crate) fn advance(
        &mut self,
        dt: Duration,
        target_position: Option<Vec3>,
    ) -> ProjectileOutcome {
        self.age = self.age.saturating_add(dt);
        let Some(target) = target_position else {
            return ProjectileOutcome::Expired;
        };
        if self.age > PROJECTILE_LIFETIME {
            return ProjectileOutcome::Expired;
        }

        let offset = target - self.position;
        let distance = offset.length();
        let step = PROJECTILE_SPEED * dt.as_secs_f32();
        if distance <= step {
            self.position = target;
        } else {
            self.position += offset / distance * step;
        }

        if self.position.distance(target) < STRIKE_RADIUS {
            ProjectileOutcome::Hit
        } else {
            ProjectileOutcome::Travelling
        }
    }

    pub(crate) fn snapshot(&self) -> ProjectileSnapshot {
        ProjectileSnapshot {
            id: self.id,
            position: WorldPoint::new(self.position.x, self.position.y, self.position.z),
            target: self.target,
        }
    }
}
