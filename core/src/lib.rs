#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Core contracts shared across the Voxel Defence engine.
//!
//! This crate defines the message surface that connects adapters, the
//! authoritative world, and pure systems. Adapters submit [`Command`] values
//! describing desired mutations, the world executes those commands via its
//! `apply` entry point, and then broadcasts [`Event`] values for collaborators
//! to react to deterministically. Read-only snapshots of enemies, towers and
//! projectiles are exposed through the view types defined here.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub mod catalog;

pub use catalog::{
    ArenaConfig, Catalog, CatalogError, Difficulty, DifficultyModifiers, EconomyConfig,
    EnemyKind, EnemyStats, Hero, HeroAbility, Path, Rgb, SpawnGroup, TowerKind, TowerStats,
    WaveSpec, HERO_ABILITY_DURATION,
};

/// Longest frame delta the simulation accepts in a single tick.
pub const MAX_FRAME_DELTA: Duration = Duration::from_millis(100);

/// Fastest time scale a session may run at.
pub const MAX_TIME_SCALE: f32 = 4.0;

/// Height above the ground at which enemies travel.
pub const ENEMY_TRAVEL_HEIGHT: f32 = 0.5;

/// Converts a host-provided frame delta in seconds into a clamped duration.
///
/// Negative, NaN and infinite deltas collapse to zero; everything else is
/// clamped to [`MAX_FRAME_DELTA`] so a stalled host cannot tunnel entities.
#[must_use]
pub fn sanitize_frame_delta(seconds: f64) -> Duration {
    if !seconds.is_finite() || seconds <= 0.0 {
        return Duration::ZERO;
    }
    let max = MAX_FRAME_DELTA.as_secs_f64();
    Duration::from_secs_f64(seconds.min(max))
}

/// Lifecycle phase of a game session.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SessionPhase {
    /// No session is running; the host shows its menu.
    #[default]
    Menu,
    /// The simulation advances and accepts gameplay commands.
    Playing,
    /// Every configured wave was cleared.
    Won,
    /// The life pool was exhausted.
    Lost,
}

impl SessionPhase {
    /// Reports whether the session reached a terminal phase.
    #[must_use]
    pub const fn is_over(self) -> bool {
        matches!(self, Self::Won | Self::Lost)
    }
}

/// Progress of the wave currently being played.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum WavePhase {
    /// No wave is running.
    #[default]
    Idle,
    /// Enemies are still queued for release.
    Spawning,
    /// The queue is empty but enemies remain on the path.
    Draining,
}

/// Commands that express all permissible world mutations.
#[derive(Clone, Debug, PartialEq)]
pub enum Command {
    /// Starts a fresh session with the provided modifiers.
    StartSession {
        /// Hero whose ability is available during the session.
        hero: Hero,
        /// Difficulty applied to every spawned enemy.
        difficulty: Difficulty,
        /// Whether the autopilot plays the session.
        autonomous: bool,
    },
    /// Discards the running session and returns to the menu.
    RestartSession,
    /// Advances the simulation clock by the provided delta time.
    Tick {
        /// Host frame delta; clamped to [`MAX_FRAME_DELTA`] before use.
        dt: Duration,
    },
    /// Releases the next configured wave.
    StartWave,
    /// Requests placement of a tower at the provided grid cell.
    PlaceTower {
        /// Type of tower to construct.
        kind: TowerKind,
        /// Cell the tower should occupy.
        cell: GridCell,
    },
    /// Selects a tower for inspection, upgrade or sale.
    SelectTower {
        /// Identifier of the tower to select.
        tower: TowerId,
    },
    /// Clears the current selection.
    ClearSelection,
    /// Upgrades a tower by one level.
    UpgradeTower {
        /// Identifier of the tower to upgrade.
        tower: TowerId,
    },
    /// Sells a tower for half its purchase price.
    SellTower {
        /// Identifier of the tower to sell.
        tower: TowerId,
    },
    /// Changes the factor applied to every frame delta.
    SetTimeScale {
        /// Requested factor; non-finite and negative values are ignored.
        factor: f32,
    },
    /// Triggers the hero ability of the running session.
    ActivateHeroAbility,
}

/// Events broadcast by the world after processing commands.
#[derive(Clone, Debug, PartialEq)]
pub enum Event {
    /// Indicates that the simulation clock advanced.
    TimeAdvanced {
        /// Scaled game time that elapsed in the tick.
        dt: Duration,
    },
    /// Announces that a new session began.
    SessionStarted {
        /// Hero chosen for the session.
        hero: Hero,
        /// Difficulty chosen for the session.
        difficulty: Difficulty,
        /// Whether the autopilot plays the session.
        autonomous: bool,
    },
    /// Announces that the session was discarded and the world returned to the menu.
    SessionReset,
    /// Money, lives or wave progress changed.
    StatsChanged {
        /// Updated economy snapshot.
        stats: SessionStats,
    },
    /// The selected tower changed.
    SelectionChanged {
        /// Newly selected tower, if any.
        tower: Option<TowerId>,
    },
    /// The session reached a terminal phase.
    GameOver {
        /// `true` for victory, `false` for defeat.
        won: bool,
    },
    /// Human readable notification for the player.
    Message {
        /// Text to display.
        text: String,
    },
    /// A wave started releasing enemies.
    WaveStarted {
        /// One-based wave number.
        wave: u32,
    },
    /// A wave was cleared.
    WaveCompleted {
        /// One-based wave number.
        wave: u32,
    },
    /// An enemy entered the path.
    EnemySpawned {
        /// Identifier allocated to the enemy.
        enemy: EnemyId,
        /// Kind of enemy spawned.
        kind: EnemyKind,
    },
    /// An enemy reached the end of the path.
    EnemyLeaked {
        /// Identifier of the enemy that broke through.
        enemy: EnemyId,
        /// Lives removed by the breakthrough.
        damage: u32,
    },
    /// An enemy was killed and its reward credited.
    EnemyKilled {
        /// Identifier of the killed enemy.
        enemy: EnemyId,
        /// Money credited for the kill.
        reward: u32,
        /// Where the enemy died.
        position: GroundPoint,
    },
    /// A tower fired a projectile.
    ProjectileFired {
        /// Identifier allocated to the projectile.
        projectile: ProjectileId,
        /// Tower that fired.
        tower: TowerId,
        /// Enemy the projectile homes on.
        target: EnemyId,
    },
    /// Confirms that a tower was placed.
    TowerPlaced {
        /// Identifier assigned to the tower.
        tower: TowerId,
        /// Type of tower placed.
        kind: TowerKind,
        /// Cell occupied by the tower.
        cell: GridCell,
    },
    /// Reports that a placement request was rejected.
    TowerPlacementRejected {
        /// Type of tower requested.
        kind: TowerKind,
        /// Cell provided in the request.
        cell: GridCell,
        /// Reason the placement failed.
        reason: PlacementError,
    },
    /// Confirms that a tower gained a level.
    TowerUpgraded {
        /// Identifier of the upgraded tower.
        tower: TowerId,
        /// Level reached after the upgrade.
        level: u32,
        /// Money spent on the upgrade.
        cost: u32,
    },
    /// Reports that an upgrade request was rejected.
    TowerUpgradeRejected {
        /// Identifier provided in the request.
        tower: TowerId,
        /// Reason the upgrade failed.
        reason: UpgradeError,
    },
    /// Confirms that a tower was sold.
    TowerSold {
        /// Identifier of the sold tower.
        tower: TowerId,
        /// Money refunded.
        refund: u32,
    },
    /// Reports that a sale request was rejected.
    TowerSaleRejected {
        /// Identifier provided in the request.
        tower: TowerId,
        /// Reason the sale failed.
        reason: SaleError,
    },
    /// The time scale changed.
    TimeScaleChanged {
        /// Factor now applied to frame deltas.
        factor: f32,
    },
    /// The hero ability became active.
    HeroAbilityActivated {
        /// Hero whose ability fired.
        hero: Hero,
    },
    /// The hero ability ran out.
    HeroAbilityExpired {
        /// Hero whose ability ended.
        hero: Hero,
    },
}

/// Economy and progress values shown by the HUD.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
pub struct SessionStats {
    /// Money available for spending.
    pub money: u32,
    /// Remaining lives; the session is lost at zero or below.
    pub lives: i32,
    /// Number of waves started so far.
    pub wave: u32,
    /// Number of configured waves.
    pub total_waves: u32,
}

/// Unique identifier assigned to an enemy.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EnemyId(u32);

impl EnemyId {
    /// Creates a new enemy identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// Unique identifier assigned to a tower.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TowerId(u32);

impl TowerId {
    /// Creates a new tower identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the tower identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// Unique identifier assigned to a projectile.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ProjectileId(u32);

impl ProjectileId {
    /// Creates a new projectile identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the projectile identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// Continuous position on the ground plane.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct GroundPoint {
    /// Coordinate along the x axis.
    pub x: f32,
    /// Coordinate along the z axis.
    pub z: f32,
}

impl GroundPoint {
    /// Creates a new ground position.
    #[must_use]
    pub const fn new(x: f32, z: f32) -> Self {
        Self { x, z }
    }

    /// Euclidean distance to another ground position.
    #[must_use]
    pub fn distance(self, other: GroundPoint) -> f32 {
        (self.x - other.x).hypot(self.z - other.z)
    }

    /// Shortest distance to the segment spanning `start` and `end`.
    #[must_use]
    pub fn distance_to_segment(self, start: GroundPoint, end: GroundPoint) -> f32 {
        let dx = end.x - start.x;
        let dz = end.z - start.z;
        let length_sq = dx * dx + dz * dz;
        if length_sq <= f32::EPSILON {
            return self.distance(start);
        }
        let t = (((self.x - start.x) * dx + (self.z - start.z) * dz) / length_sq).clamp(0.0, 1.0);
        self.distance(GroundPoint::new(start.x + dx * t, start.z + dz * t))
    }
}

/// Position in 3D world space, `y` pointing up.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct WorldPoint {
    /// Coordinate along the x axis.
    pub x: f32,
    /// Height above the ground.
    pub y: f32,
    /// Coordinate along the z axis.
    pub z: f32,
}

impl WorldPoint {
    /// Creates a new world position.
    #[must_use]
    pub const fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }

    /// Projection onto the ground plane.
    #[must_use]
    pub const fn ground(self) -> GroundPoint {
        GroundPoint::new(self.x, self.z)
    }
}

/// Integer placement cell; cell `(c, r)` is centred at `(c * tile, r * tile)`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct GridCell {
    column: i32,
    row: i32,
}

impl GridCell {
    /// Creates a new grid cell coordinate.
    #[must_use]
    pub const fn new(column: i32, row: i32) -> Self {
        Self { column, row }
    }

    /// Column index of the cell along the x axis.
    #[must_use]
    pub const fn column(&self) -> i32 {
        self.column
    }

    /// Row index of the cell along the z axis.
    #[must_use]
    pub const fn row(&self) -> i32 {
        self.row
    }

    /// Snaps a ground position to the nearest cell centre.
    ///
    /// Returns `None` for non-finite input or a non-positive tile size.
    #[must_use]
    pub fn snap(x: f32, z: f32, tile_size: f32) -> Option<Self> {
        if !(tile_size > 0.0) || !x.is_finite() || !z.is_finite() {
            return None;
        }
        let column = (x / tile_size).round();
        let row = (z / tile_size).round();
        if column.abs() > i32::MAX as f32 || row.abs() > i32::MAX as f32 {
            return None;
        }
        Some(Self::new(column as i32, row as i32))
    }

    /// Ground position of the cell centre.
    #[must_use]
    pub fn world_position(&self, tile_size: f32) -> GroundPoint {
        GroundPoint::new(self.column as f32 * tile_size, self.row as f32 * tile_size)
    }
}

/// Reasons a tower placement request may be rejected by the world.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, Error)]
pub enum PlacementError {
    /// No session is being played.
    #[error("towers can only be placed while a session is being played")]
    InvalidPhase,
    /// The cell lies outside the buildable area.
    #[error("cell lies outside the buildable area")]
    OutOfBounds,
    /// Another tower already stands at the cell.
    #[error("cell is occupied by another tower")]
    Occupied,
    /// The cell is within the clearance distance of the path.
    #[error("cell is too close to the enemy path")]
    TooCloseToPath,
    /// The player cannot afford the tower.
    #[error("not enough money to build the tower")]
    InsufficientFunds,
}

/// Reasons a tower upgrade request may be rejected by the world.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, Error)]
pub enum UpgradeError {
    /// No session is being played.
    #[error("towers can only be upgraded while a session is being played")]
    InvalidPhase,
    /// No tower with the provided identifier exists.
    #[error("no such tower")]
    MissingTower,
    /// The player cannot afford the upgrade.
    #[error("not enough money to upgrade the tower")]
    InsufficientFunds,
}

/// Reasons a tower sale request may be rejected by the world.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, Error)]
pub enum SaleError {
    /// No session is being played.
    #[error("towers can only be sold while a session is being played")]
    InvalidPhase,
    /// No tower with the provided identifier exists.
    #[error("no such tower")]
    MissingTower,
}

/// Immutable representation of a single enemy's state used for queries.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct EnemySnapshot {
    /// Unique identifier assigned to the enemy.
    pub id: EnemyId,
    /// Kind of enemy.
    pub kind: EnemyKind,
    /// Current world position.
    pub position: WorldPoint,
    /// Remaining hit points.
    pub hp: f32,
    /// Hit points at spawn.
    pub max_hp: f32,
    /// Whether the enemy is inside its damage flash window.
    pub flashing: bool,
}

impl EnemySnapshot {
    /// Remaining health as a fraction of the maximum, in `0.0..=1.0`.
    #[must_use]
    pub fn health_fraction(&self) -> f32 {
        if self.max_hp <= 0.0 {
            return 0.0;
        }
        (self.hp / self.max_hp).clamp(0.0, 1.0)
    }
}

/// Read-only snapshot describing all live enemies.
#[derive(Clone, Debug, Default)]
pub struct EnemyView {
    snapshots: Vec<EnemySnapshot>,
}

impl EnemyView {
    /// Creates a new enemy view from the provided snapshots.
    #[must_use]
    pub fn from_snapshots(mut snapshots: Vec<EnemySnapshot>) -> Self {
        snapshots.sort_by_key(|snapshot| snapshot.id);
        Self { snapshots }
    }

    /// Iterator over the captured enemy snapshots in deterministic order.
    pub fn iter(&self) -> impl Iterator<Item = &EnemySnapshot> {
        self.snapshots.iter()
    }

    /// Number of captured enemies.
    #[must_use]
    pub fn len(&self) -> usize {
        self.snapshots.len()
    }

    /// Reports whether the view contains no enemies.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.snapshots.is_empty()
    }

    /// Consumes the view, yielding the underlying snapshots.
    #[must_use]
    pub fn into_vec(self) -> Vec<EnemySnapshot> {
        self.snapshots
    }
}

/// Immutable representation of a single tower's state used for queries.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TowerSnapshot {
    /// Identifier allocated to the tower by the world.
    pub id: TowerId,
    /// Kind of tower that was constructed.
    pub kind: TowerKind,
    /// Cell occupied by the tower.
    pub cell: GridCell,
    /// Ground position of the tower.
    pub position: GroundPoint,
    /// Upgrade level, starting at one.
    pub level: u32,
    /// Current targeting radius.
    pub range: f32,
    /// Current damage per projectile.
    pub damage: f32,
    /// Current minimum time between shots.
    pub cooldown: std::time::Duration,
    /// Enemy tracked during the last tick, if any.
    pub target: Option<EnemyId>,
}

/// Read-only snapshot describing all towers.
#[derive(Clone, Debug, Default)]
pub struct TowerView {
    snapshots: Vec<TowerSnapshot>,
}

impl TowerView {
    /// Creates a new tower view from the provided snapshots.
    #[must_use]
    pub fn from_snapshots(mut snapshots: Vec<TowerSnapshot>) -> Self {
        snapshots.sort_by_key(|snapshot| snapshot.id);
        Self { snapshots }
    }

    /// Iterator over the captured tower snapshots in deterministic order.
    pub fn iter(&self) -> impl Iterator<Item = &TowerSnapshot> {
        self.snapshots.iter()
    }

    /// Number of captured towers.
    #[must_use]
    pub fn len(&self) -> usize {
        self.snapshots.len()
    }

    /// Reports whether the view contains no towers.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.snapshots.is_empty()
    }

    /// Consumes the view, yielding the underlying snapshots.
    #[must_use]
    pub fn into_vec(self) -> Vec<TowerSnapshot> {
        self.snapshots
    }
}

/// Immutable representation of a projectile in flight.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ProjectileSnapshot {
    /// Identifier allocated to the projectile.
    pub id: ProjectileId,
    /// Current world position.
    pub position: WorldPoint,
    /// Enemy the projectile homes on.
    pub target: EnemyId,
}

/// Read-only snapshot describing all projectiles in flight.
#[derive(Clone, Debug, Default)]
pub struct ProjectileView {
    snapshots: Vec<ProjectileSnapshot>,
}

impl ProjectileView {
    /// Creates a new projectile view from the provided snapshots.
    #[must_use]
    pub fn from_snapshots(mut snapshots: Vec<ProjectileSnapshot>) -> Self {
        snapshots.sort_by_key(|snapshot| snapshot.id);
        Self { snapshots }
    }

    /// Iterator over the captured projectile snapshots in deterministic order.
    pub fn iter(&self) -> impl Iterator<Item = &ProjectileSnapshot> {
        self.snapshots.iter()
    }

    /// Number of projectiles in flight.
    #[must_use]
    pub fn len(&self) -> usize {
        self.snapshots.len()
    }

    /// Reports whether no projectile is in flight.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.snapshots.is_empty()
    }

    /// Consumes the view, yielding the underlying snapshots.
    #[must_use]
    pub fn into_vec(self) -> Vec<ProjectileSnapshot> {
        self.snapshots
    }
}

/// Ghost-indicator answer for a prospective placement.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PlacementPreview {
    /// Kind of tower proposed for placement.
    pub kind: TowerKind,
    /// Cell under consideration.
    pub cell: GridCell,
    /// Legality of the cell, independent of funds.
    pub legality: Result<(), PlacementError>,
    /// Whether the player can currently afford the tower.
    pub affordable: bool,
}

impl PlacementPreview {
    /// Reports whether a placement request would currently be accepted.
    #[must_use]
    pub fn placeable(&self) -> bool {
        self.legality.is_ok() && self.affordable
    }
}
