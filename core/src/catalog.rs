//! Static gameplay tables loaded once when a session starts.
//!
//! The catalog is pure data: tower and enemy statistics, wave compositions,
//! the enemy path and the arena tuning used by placement validation. Gameplay
//! code never branches on a kind beyond looking its statistics up here.

use std::{fmt, str::FromStr, time::Duration};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::GroundPoint;

/// Duration a hero ability stays active once triggered.
pub const HERO_ABILITY_DURATION: Duration = Duration::from_secs(5);

/// Longest tower cooldown or spawn interval a catalog may configure, in seconds.
pub const MAX_TIMING_SECS: f32 = 3_600.0;

/// Packed `0xRRGGBB` display color attached to catalog entries.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Rgb(u32);

impl Rgb {
    /// Creates a color from a packed `0xRRGGBB` value. Bits above 24 are dropped.
    #[must_use]
    pub const fn from_hex(value: u32) -> Self {
        Self(value & 0x00ff_ffff)
    }

    /// Packed `0xRRGGBB` representation.
    #[must_use]
    pub const fn hex(&self) -> u32 {
        self.0
    }

    /// Red component of the color.
    #[must_use]
    pub const fn red(&self) -> u8 {
        ((self.0 >> 16) & 0xff) as u8
    }

    /// Green component of the color.
    #[must_use]
    pub const fn green(&self) -> u8 {
        ((self.0 >> 8) & 0xff) as u8
    }

    /// Blue component of the color.
    #[must_use]
    pub const fn blue(&self) -> u8 {
        (self.0 & 0xff) as u8
    }
}

/// Types of towers that can be constructed.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TowerKind {
    /// Balanced all-round tower.
    Basic,
    /// Long range, heavy damage, slow cadence.
    Sniper,
    /// Short range, light damage, very fast cadence.
    Rapid,
}

impl TowerKind {
    /// Every tower kind in catalog order.
    pub const ALL: [TowerKind; 3] = [TowerKind::Basic, TowerKind::Sniper, TowerKind::Rapid];
}

/// Types of enemies that waves can contain.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EnemyKind {
    /// Standard walker.
    Basic,
    /// Fragile but quick.
    Fast,
    /// Slow, armoured and hits the base hard.
    Tank,
}

/// Base statistics of a tower kind before any upgrade.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TowerStats {
    /// Purchase price in money units.
    pub cost: u32,
    /// Targeting radius in world units.
    pub range: f32,
    /// Damage carried by each projectile.
    pub damage: f32,
    /// Minimum game time between two shots, in seconds.
    pub cooldown_secs: f32,
    /// Height of the turret; projectiles leave half a unit above it.
    pub height: f32,
    /// Display color.
    pub color: Rgb,
}

impl TowerStats {
    /// Cooldown converted to a game-clock duration.
    #[must_use]
    pub fn cooldown(&self) -> Duration {
        seconds(self.cooldown_secs)
    }
}

/// Base statistics of an enemy kind before difficulty modifiers.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct EnemyStats {
    /// Hit points at spawn.
    pub hp: f32,
    /// Lives removed when the enemy reaches the end of the path.
    pub damage: u32,
    /// Ground speed in world units per second.
    pub speed: f32,
    /// Money credited when the enemy is killed.
    pub reward: u32,
    /// Body radius, used by renderers.
    pub radius: f32,
    /// Display color.
    pub color: Rgb,
}

/// Tower statistics keyed by kind.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TowerTable {
    /// Statistics for [`TowerKind::Basic`].
    pub basic: TowerStats,
    /// Statistics for [`TowerKind::Sniper`].
    pub sniper: TowerStats,
    /// Statistics for [`TowerKind::Rapid`].
    pub rapid: TowerStats,
}

impl TowerTable {
    /// Looks up the statistics of a tower kind.
    #[must_use]
    pub const fn get(&self, kind: TowerKind) -> &TowerStats {
        match kind {
            TowerKind::Basic => &self.basic,
            TowerKind::Sniper => &self.sniper,
            TowerKind::Rapid => &self.rapid,
        }
    }
}

/// Enemy statistics keyed by kind.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct EnemyTable {
    /// Statistics for [`EnemyKind::Basic`].
    pub basic: EnemyStats,
    /// Statistics for [`EnemyKind::Fast`].
    pub fast: EnemyStats,
    /// Statistics for [`EnemyKind::Tank`].
    pub tank: EnemyStats,
}

impl EnemyTable {
    /// Looks up the statistics of an enemy kind.
    #[must_use]
    pub const fn get(&self, kind: EnemyKind) -> &EnemyStats {
        match kind {
            EnemyKind::Basic => &self.basic,
            EnemyKind::Fast => &self.fast,
            EnemyKind::Tank => &self.tank,
        }
    }
}

/// Group of identical enemies released one after another.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct SpawnGroup {
    /// Kind of enemy released by the group.
    pub kind: EnemyKind,
    /// Number of enemies in the group.
    pub count: u32,
    /// Delay before each enemy of the group, in seconds.
    pub interval_secs: f32,
}

impl SpawnGroup {
    /// Delay before each enemy of the group.
    #[must_use]
    pub fn interval(&self) -> Duration {
        seconds(self.interval_secs)
    }
}

/// Ordered composition of a single wave.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct WaveSpec {
    /// Spawn groups released in order.
    pub groups: Vec<SpawnGroup>,
}

impl WaveSpec {
    /// Creates a wave from its spawn groups.
    #[must_use]
    pub fn new(groups: Vec<SpawnGroup>) -> Self {
        Self { groups }
    }

    /// Expands the groups into individual `(kind, delay)` entries in release order.
    pub fn pending_spawns(&self) -> impl Iterator<Item = (EnemyKind, Duration)> + '_ {
        self.groups.iter().flat_map(|group| {
            let interval = group.interval();
            (0..group.count).map(move |_| (group.kind, interval))
        })
    }

    /// Total number of enemies released by the wave.
    #[must_use]
    pub fn enemy_count(&self) -> u32 {
        self.groups.iter().map(|group| group.count).sum()
    }
}

/// Fixed polyline travelled by every enemy.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Path {
    waypoints: Vec<GroundPoint>,
}

impl Path {
    /// Creates a path, rejecting polylines with fewer than two waypoints.
    pub fn new(waypoints: Vec<GroundPoint>) -> Result<Self, CatalogError> {
        if waypoints.len() < 2 {
            return Err(CatalogError::PathTooShort {
                waypoints: waypoints.len(),
            });
        }
        Ok(Self { waypoints })
    }

    /// Ordered waypoints of the path.
    #[must_use]
    pub fn waypoints(&self) -> &[GroundPoint] {
        &self.waypoints
    }

    /// Waypoint where enemies spawn.
    #[must_use]
    pub fn start(&self) -> GroundPoint {
        self.waypoints.first().copied().unwrap_or_default()
    }

    /// Waypoint guarded by the player.
    #[must_use]
    pub fn end(&self) -> GroundPoint {
        self.waypoints.last().copied().unwrap_or_default()
    }

    /// Consecutive waypoint pairs forming the path segments.
    pub fn segments(&self) -> impl Iterator<Item = (GroundPoint, GroundPoint)> + '_ {
        self.waypoints
            .windows(2)
            .map(|pair| (pair[0], pair[1]))
    }
}

/// Arena tuning used by placement validation.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct ArenaConfig {
    /// Edge length of a placement cell in world units.
    pub tile_size: f32,
    /// Towers must satisfy `|x| <= bound` and `|z| <= bound`.
    pub placement_bound: f32,
    /// Two towers may not be closer than this on both axes.
    pub tower_spacing: f32,
    /// Minimum distance between a tower and any path segment.
    pub path_clearance: f32,
}

/// Starting economy of a session.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct EconomyConfig {
    /// Money available when a session starts.
    pub starting_money: u32,
    /// Lives available when a session starts.
    pub base_health: i32,
}

/// Complete set of static gameplay tables.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Catalog {
    /// Tower statistics.
    pub towers: TowerTable,
    /// Enemy statistics.
    pub enemies: EnemyTable,
    /// Waves in the order they are played.
    pub waves: Vec<WaveSpec>,
    /// Path travelled by enemies.
    pub path: Path,
    /// Placement tuning.
    pub arena: ArenaConfig,
    /// Starting economy.
    pub economy: EconomyConfig,
}

impl Catalog {
    /// Tables shipped with the game.
    #[must_use]
    pub fn standard() -> Self {
        Self {
            towers: TowerTable {
                basic: TowerStats {
                    cost: 100,
                    range: 8.0,
                    damage: 10.0,
                    cooldown_secs: 1.0,
                    height: 1.5,
                    color: Rgb::from_hex(0x0088ff),
                },
                sniper: TowerStats {
                    cost: 250,
                    range: 16.0,
                    damage: 50.0,
                    cooldown_secs: 2.0,
                    height: 3.0,
                    color: Rgb::from_hex(0x00ff00),
                },
                rapid: TowerStats {
                    cost: 400,
                    range: 6.0,
                    damage: 5.0,
                    cooldown_secs: 0.2,
                    height: 1.2,
                    color: Rgb::from_hex(0x00ffff),
                },
            },
            enemies: EnemyTable {
                basic: EnemyStats {
                    hp: 30.0,
                    damage: 1,
                    speed: 3.0,
                    reward: 10,
                    radius: 0.5,
                    color: Rgb::from_hex(0xff3333),
                },
                fast: EnemyStats {
                    hp: 15.0,
                    damage: 1,
                    speed: 6.0,
                    reward: 15,
                    radius: 0.4,
                    color: Rgb::from_hex(0xffff00),
                },
                tank: EnemyStats {
                    hp: 100.0,
                    damage: 5,
                    speed: 1.5,
                    reward: 30,
                    radius: 0.8,
                    color: Rgb::from_hex(0xff00ff),
                },
            },
            waves: vec![
                WaveSpec::new(vec![
                    group(EnemyKind::Basic, 5, 1.0),
                    group(EnemyKind::Fast, 2, 1.5),
                ]),
                WaveSpec::new(vec![
                    group(EnemyKind::Basic, 10, 0.8),
                    group(EnemyKind::Fast, 5, 1.2),
                    group(EnemyKind::Tank, 1, 2.0),
                ]),
                WaveSpec::new(vec![
                    group(EnemyKind::Fast, 15, 0.5),
                    group(EnemyKind::Tank, 3, 2.0),
                    group(EnemyKind::Basic, 20, 0.4),
                ]),
            ],
            path: Path {
                waypoints: [
                    (-18.0, -18.0),
                    (-10.0, -18.0),
                    (-10.0, -10.0),
                    (0.0, -10.0),
                    (0.0, 0.0),
                    (10.0, 0.0),
                    (10.0, 10.0),
                    (-10.0, 10.0),
                    (-10.0, 18.0),
                    (18.0, 18.0),
                ]
                .into_iter()
                .map(|(x, z)| GroundPoint::new(x, z))
                .collect(),
            },
            arena: ArenaConfig {
                tile_size: 2.0,
                placement_bound: 38.0,
                tower_spacing: 1.0,
                path_clearance: 1.5,
            },
            economy: EconomyConfig {
                starting_money: 500,
                base_health: 20,
            },
        }
    }

    /// Statistics of a tower kind.
    #[must_use]
    pub const fn tower(&self, kind: TowerKind) -> &TowerStats {
        self.towers.get(kind)
    }

    /// Statistics of an enemy kind.
    #[must_use]
    pub const fn enemy(&self, kind: EnemyKind) -> &EnemyStats {
        self.enemies.get(kind)
    }

    /// Wave at the provided zero-based index, if configured.
    #[must_use]
    pub fn wave(&self, index: usize) -> Option<&WaveSpec> {
        self.waves.get(index)
    }

    /// Number of configured waves.
    #[must_use]
    pub fn wave_count(&self) -> usize {
        self.waves.len()
    }

    /// Checks the tables for values the simulation cannot run with.
    pub fn validate(&self) -> Result<(), CatalogError> {
        if self.path.waypoints.len() < 2 {
            return Err(CatalogError::PathTooShort {
                waypoints: self.path.waypoints.len(),
            });
        }
        if let Some(index) = self
            .path
            .waypoints
            .iter()
            .position(|point| !(point.x.is_finite() && point.z.is_finite()))
        {
            return Err(CatalogError::NonFiniteWaypoint { index });
        }
        if self.waves.is_empty() {
            return Err(CatalogError::NoWaves);
        }
        for (index, wave) in self.waves.iter().enumerate() {
            if wave.enemy_count() == 0 {
                return Err(CatalogError::EmptyWave { wave: index + 1 });
            }
            if let Some(group) = wave
                .groups
                .iter()
                .position(|group| !(0.0..=MAX_TIMING_SECS).contains(&group.interval_secs))
            {
                return Err(CatalogError::InvalidSpawnInterval {
                    wave: index + 1,
                    group: group + 1,
                });
            }
        }
        for kind in TowerKind::ALL {
            let stats = self.tower(kind);
            if !(stats.cooldown_secs > 0.0 && stats.cooldown_secs <= MAX_TIMING_SECS) {
                return Err(CatalogError::InvalidCooldown { kind });
            }
            if !positive(stats.range) {
                return Err(CatalogError::NonPositiveRange { kind });
            }
        }
        for kind in [EnemyKind::Basic, EnemyKind::Fast, EnemyKind::Tank] {
            let stats = self.enemy(kind);
            if !positive(stats.speed) {
                return Err(CatalogError::NonPositiveSpeed { kind });
            }
            if !positive(stats.hp) {
                return Err(CatalogError::NonPositiveHealth { kind });
            }
        }
        if !positive(self.arena.tile_size) {
            return Err(CatalogError::NonPositiveTileSize);
        }
        Ok(())
    }
}

impl Default for Catalog {
    fn default() -> Self {
        Self::standard()
    }
}

fn positive(value: f32) -> bool {
    value.is_finite() && value > 0.0
}

/// Saturating conversion; validated catalogs never reach the bounds.
fn seconds(value: f32) -> Duration {
    Duration::try_from_secs_f32(value.max(0.0)).unwrap_or(Duration::MAX)
}

const fn group(kind: EnemyKind, count: u32, interval_secs: f32) -> SpawnGroup {
    SpawnGroup {
        kind,
        count,
        interval_secs,
    }
}

/// Reasons a catalog cannot drive a session.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum CatalogError {
    /// The path needs at least a start and an end waypoint.
    #[error("path needs at least 2 waypoints, found {waypoints}")]
    PathTooShort {
        /// Number of waypoints provided.
        waypoints: usize,
    },
    /// A waypoint coordinate is infinite or NaN.
    #[error("path waypoint {index} must have finite coordinates")]
    NonFiniteWaypoint {
        /// Zero-based index of the waypoint.
        index: usize,
    },
    /// No waves were configured.
    #[error("catalog contains no waves")]
    NoWaves,
    /// A wave releases no enemies.
    #[error("wave {wave} releases no enemies")]
    EmptyWave {
        /// One-based wave number.
        wave: usize,
    },
    /// A spawn group delay is negative, NaN or longer than [`MAX_TIMING_SECS`].
    #[error("wave {wave} group {group} needs a spawn interval between 0 and 3600 seconds")]
    InvalidSpawnInterval {
        /// One-based wave number.
        wave: usize,
        /// One-based group number within the wave.
        group: usize,
    },
    /// A tower cooldown is not positive or exceeds [`MAX_TIMING_SECS`].
    #[error("tower {kind:?} needs a cooldown above 0 and at most 3600 seconds")]
    InvalidCooldown {
        /// Offending tower kind.
        kind: TowerKind,
    },
    /// A tower kind has a range that is not a positive finite number.
    #[error("tower {kind:?} must have a positive range")]
    NonPositiveRange {
        /// Offending tower kind.
        kind: TowerKind,
    },
    /// An enemy kind has a speed that is not a positive finite number.
    #[error("enemy {kind:?} must have a positive speed")]
    NonPositiveSpeed {
        /// Offending enemy kind.
        kind: EnemyKind,
    },
    /// An enemy kind has hit points that are not a positive finite number.
    #[error("enemy {kind:?} must have positive hit points")]
    NonPositiveHealth {
        /// Offending enemy kind.
        kind: EnemyKind,
    },
    /// The placement tile size is not a positive finite number.
    #[error("arena tile size must be positive")]
    NonPositiveTileSize,
}

/// Difficulty selected for a session.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    /// Unmodified enemies.
    #[default]
    Easy,
    /// Sturdier enemies, smaller rewards.
    Normal,
    /// Much sturdier enemies, much smaller rewards.
    Hard,
}

/// Multipliers applied uniformly to every enemy spawned during a session.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DifficultyModifiers {
    /// Multiplier applied to enemy hit points.
    pub hp_multiplier: f32,
    /// Multiplier applied to kill rewards before flooring.
    pub reward_multiplier: f32,
}

impl Difficulty {
    /// Enemy multipliers associated with the difficulty.
    #[must_use]
    pub const fn modifiers(self) -> DifficultyModifiers {
        let (hp_multiplier, reward_multiplier) = match self {
            Self::Easy => (1.0, 1.0),
            Self::Normal => (1.15, 0.8),
            Self::Hard => (1.4, 0.7),
        };
        DifficultyModifiers {
            hp_multiplier,
            reward_multiplier,
        }
    }
}

/// Hero chosen for a session; determines the active ability.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Hero {
    /// Ability doubles tower damage.
    #[default]
    Warrior,
    /// Ability halves enemy speed.
    Mage,
}

/// Effect applied while a hero ability is active.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum HeroAbility {
    /// Multiplies the damage baked into newly fired projectiles.
    DamageBoost {
        /// Damage multiplier.
        multiplier: f32,
    },
    /// Multiplies the movement of every enemy.
    Slow {
        /// Speed multiplier.
        speed_multiplier: f32,
    },
}

impl Hero {
    /// Ability granted by the hero.
    #[must_use]
    pub const fn ability(self) -> HeroAbility {
        match self {
            Self::Warrior => HeroAbility::DamageBoost { multiplier: 2.0 },
            Self::Mage => HeroAbility::Slow {
                speed_multiplier: 0.5,
            },
        }
    }
}

impl HeroAbility {
    /// Damage multiplier contributed by the ability.
    #[must_use]
    pub const fn damage_multiplier(self) -> f32 {
        match self {
            Self::DamageBoost { multiplier } => multiplier,
            Self::Slow { .. } => 1.0,
        }
    }

    /// Enemy speed multiplier contributed by the ability.
    #[must_use]
    pub const fn speed_multiplier(self) -> f32 {
        match self {
            Self::DamageBoost { .. } => 1.0,
            Self::Slow { speed_multiplier } => speed_multiplier,
        }
    }
}

/// Error returned when parsing a hero or difficulty name fails.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
#[error("unknown {what} `{value}`")]
pub struct ParseNameError {
    what: &'static str,
    value: String,
}

impl FromStr for Difficulty {
    type Err = ParseNameError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "easy" => Ok(Self::Easy),
            "normal" => Ok(Self::Normal),
            "hard" => Ok(Self::Hard),
            _ => Err(ParseNameError {
                what: "difficulty",
                value: value.to_owned(),
            }),
        }
    }
}

impl FromStr for Hero {
    type Err = ParseNameError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "warrior" => Ok(Self::Warrior),
            "mage" => Ok(Self::Mage),
            _ => Err(ParseNameError {
                what: "hero",
                value: value.to_owned(),
            }),
        }
    }
}

impl fmt::Display for Hero {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Warrior => f.write_str("warrior"),
            Self::Mage => f.write_str("mage"),
        }
    }
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Easy => f.write_str("easy"),
            Self::Normal => f.write_str("normal"),
            Self::Hard => f.write_str("hard"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn standard_catalog_is_valid() {
        assert_eq!(Catalog::standard().validate(), Ok(()));
    }

    #[test]
    fn wave_expansion_preserves_group_order() {
        let catalog = Catalog::standard();
        let first = catalog.wave(0).expect("first wave");
        let spawns: Vec<_> = first.pending_spawns().collect();

        assert_eq!(spawns.len(), 7);
        assert!(spawns[..5]
            .iter()
            .all(|(kind, delay)| *kind == EnemyKind::Basic && *delay == Duration::from_secs(1)));
        assert!(spawns[5..]
            .iter()
            .all(|(kind, delay)| *kind == EnemyKind::Fast
                && *delay == Duration::from_millis(1500)));
    }

    #[test]
    fn short_path_is_rejected() {
        let error = Path::new(vec![GroundPoint::new(0.0, 0.0)]).expect_err("one waypoint");
        assert_eq!(error, CatalogError::PathTooShort { waypoints: 1 });
    }

    #[test]
    fn validation_reports_empty_wave() {
        let mut catalog = Catalog::standard();
        catalog.waves[1].groups.clear();
        assert_eq!(catalog.validate(), Err(CatalogError::EmptyWave { wave: 2 }));
    }

    #[test]
    fn validation_rejects_nan_speed() {
        let mut catalog = Catalog::standard();
        catalog.enemies.fast.speed = f32::NAN;
        assert_eq!(
            catalog.validate(),
            Err(CatalogError::NonPositiveSpeed {
                kind: EnemyKind::Fast
            })
        );
    }

    #[test]
    fn validation_rejects_unbounded_cooldown() {
        let mut catalog = Catalog::standard();
        catalog.towers.basic.cooldown_secs = f32::INFINITY;
        assert_eq!(
            catalog.validate(),
            Err(CatalogError::InvalidCooldown {
                kind: TowerKind::Basic
            })
        );

        catalog.towers.basic.cooldown_secs = MAX_TIMING_SECS + 1.0;
        assert!(catalog.validate().is_err());
    }

    #[test]
    fn validation_rejects_huge_or_negative_spawn_interval() {
        let mut catalog = Catalog::standard();
        catalog.waves[0].groups[1].interval_secs = 1e20;
        assert_eq!(
            catalog.validate(),
            Err(CatalogError::InvalidSpawnInterval { wave: 1, group: 2 })
        );

        catalog.waves[0].groups[1].interval_secs = -1.0;
        assert!(catalog.validate().is_err());
        catalog.waves[0].groups[1].interval_secs = f32::NAN;
        assert!(catalog.validate().is_err());
        catalog.waves[0].groups[1].interval_secs = 0.0;
        assert_eq!(catalog.validate(), Ok(()));
    }

    #[test]
    fn validation_rejects_infinite_stats_and_waypoints() {
        let mut catalog = Catalog::standard();
        catalog.towers.sniper.range = f32::INFINITY;
        assert_eq!(
            catalog.validate(),
            Err(CatalogError::NonPositiveRange {
                kind: TowerKind::Sniper
            })
        );

        let mut catalog = Catalog::standard();
        catalog.enemies.tank.hp = f32::INFINITY;
        assert_eq!(
            catalog.validate(),
            Err(CatalogError::NonPositiveHealth {
                kind: EnemyKind::Tank
            })
        );

        let mut catalog = Catalog::standard();
        let mut waypoints = catalog.path.waypoints().to_vec();
        waypoints[1].z = f32::NEG_INFINITY;
        catalog.path = Path::new(waypoints).expect("enough waypoints");
        assert_eq!(
            catalog.validate(),
            Err(CatalogError::NonFiniteWaypoint { index: 1 })
        );
    }

    #[test]
    fn timing_conversion_saturates_instead_of_panicking() {
        let mut stats = Catalog::standard().towers.basic;
        stats.cooldown_secs = f32::INFINITY;
        assert_eq!(stats.cooldown(), Duration::MAX);

        let group = group(EnemyKind::Basic, 1, 1e20);
        assert_eq!(group.interval(), Duration::MAX);
    }

    #[test]
    fn difficulty_modifiers_match_tuning() {
        let hard = Difficulty::Hard.modifiers();
        assert!((hard.hp_multiplier - 1.4).abs() < f32::EPSILON);
        assert!((hard.reward_multiplier - 0.7).abs() < f32::EPSILON);
        assert_eq!(Difficulty::Easy.modifiers().hp_multiplier, 1.0);
    }

    #[test]
    fn hero_abilities_affect_disjoint_channels() {
        let warrior = Hero::Warrior.ability();
        let mage = Hero::Mage.ability();
        assert_eq!(warrior.damage_multiplier(), 2.0);
        assert_eq!(warrior.speed_multiplier(), 1.0);
        assert_eq!(mage.damage_multiplier(), 1.0);
        assert_eq!(mage.speed_multiplier(), 0.5);
    }

    #[test]
    fn names_parse_case_insensitively() {
        assert_eq!("Hard".parse::<Difficulty>(), Ok(Difficulty::Hard));
        assert_eq!(" mage ".parse::<Hero>(), Ok(Hero::Mage));
        assert!("paladin".parse::<Hero>().is_err());
    }

    #[test]
    fn rgb_splits_channels() {
        let color = Rgb::from_hex(0xff_3366);
        assert_eq!((color.red(), color.green(), color.blue()), (0xff, 0x33, 0x66));
    }

    #[test]
    fn catalog_survives_toml_round_trip() {
        let catalog = Catalog::standard();
        let text = toml::to_string(&catalog).expect("serialize catalog");
        let restored: Catalog = toml::from_str(&text).expect("deserialize catalog");
        assert_eq!(restored, catalog);
    }
}
