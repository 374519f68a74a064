#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Shared rendering contracts for Voxel Defence adapters.
//!
//! Adapters never read the world directly. They assemble a [`Scene`] from the
//! snapshot views exposed by the world's query module and hand it to a
//! [`RenderingBackend`], which reports per-frame [`FrameInput`] back.

use anyhow::Result as AnyResult;
use glam::{Vec2, Vec3};
use voxel_defence_core::{
    Catalog, EnemyId, EnemyKind, EnemyView, GridCell, PlacementError, PlacementPreview,
    ProjectileId, ProjectileView, Rgb, SessionPhase, SessionStats, TowerId, TowerKind, TowerView,
    ENEMY_TRAVEL_HEIGHT,
};
use std::{error::Error, fmt, time::Duration};

/// Amount selected towers are lightened towards white.
const SELECTION_HIGHLIGHT: f32 = 0.4;

/// RGBA color used when presenting frames.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Color {
    /// Red channel intensity in the range 0.0..=1.0.
    pub red: f32,
    /// Green channel intensity in the range 0.0..=1.0.
    pub green: f32,
    /// Blue channel intensity in the range 0.0..=1.0.
    pub blue: f32,
    /// Alpha channel intensity in the range 0.0..=1.0.
    pub alpha: f32,
}

impl Color {
    /// Opaque white, used for damage flashes.
    pub const WHITE: Self = Self::new(1.0, 1.0, 1.0, 1.0);

    /// Ghost color of a placement the world would accept.
    pub const PREVIEW_VALID: Self = Self::new(0.0, 1.0, 0.0, 0.5);

    /// Ghost color of a placement the world would reject.
    pub const PREVIEW_INVALID: Self = Self::new(1.0, 0.0, 0.0, 0.5);

    /// Creates a new color from floating point channels.
    #[must_use]
    pub const fn new(red: f32, green: f32, blue: f32, alpha: f32) -> Self {
        Self {
            red,
            green,
            blue,
            alpha,
        }
    }

    /// Creates an opaque color from byte RGB values.
    #[must_use]
    pub const fn from_rgb_u8(red: u8, green: u8, blue: u8) -> Self {
        Self {
            red: red as f32 / 255.0,
            green: green as f32 / 255.0,
            blue: blue as f32 / 255.0,
            alpha: 1.0,
        }
    }

    /// Converts a catalog display color.
    #[must_use]
    pub const fn from_catalog(color: Rgb) -> Self {
        Self::from_rgb_u8(color.red(), color.green(), color.blue())
    }

    /// Returns a new color lightened towards white by the provided amount.
    #[must_use]
    pub fn lighten(self, amount: f32) -> Self {
        let amount = amount.clamp(0.0, 1.0);

        Self {
            red: lighten_channel(self.red, amount),
            green: lighten_channel(self.green, amount),
            blue: lighten_channel(self.blue, amount),
            alpha: self.alpha,
        }
    }
}

fn lighten_channel(channel: f32, amount: f32) -> f32 {
    channel + (1.0 - channel) * amount
}

/// Input snapshot gathered by adapters before updating the scene.
#[derive(Clone, Debug, PartialEq, Default)]
pub struct FrameInput {
    /// Cursor projected onto the ground plane, `y` holding the world z coordinate.
    pub cursor_ground: Option<Vec2>,
    /// Tower kind whose build button was pressed on this frame.
    pub arm: Option<TowerKind>,
    /// Whether the adapter detected a click on the ground.
    pub confirm_action: bool,
    /// Whether the adapter detected a cancel request.
    pub cancel_action: bool,
    /// Whether the next wave was requested.
    pub start_wave: bool,
    /// Whether the hero ability was triggered.
    pub activate_ability: bool,
    /// Whether the selected tower should be upgraded.
    pub upgrade_selected: bool,
    /// Whether the selected tower should be sold.
    pub sell_selected: bool,
}

impl FrameInput {
    /// Grid cell under the cursor, if the cursor hit the ground.
    #[must_use]
    pub fn cursor_cell(&self, tile_size: f32) -> Option<GridCell> {
        self.cursor_ground
            .and_then(|cursor| GridCell::snap(cursor.x, cursor.y, tile_size))
    }
}

/// Ground plane and placement grid drawn beneath the arena.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GroundPresentation {
    /// Half of the side length of the square ground plane.
    pub half_extent: f32,
    /// Side length of a single grid tile.
    pub tile_size: f32,
    /// Color used when drawing grid lines.
    pub line_color: Color,
}

impl GroundPresentation {
    /// Creates a ground descriptor.
    ///
    /// Returns an error when `tile_size` is not a positive finite number.
    pub fn new(
        half_extent: f32,
        tile_size: f32,
        line_color: Color,
    ) -> std::result::Result<Self, RenderingError> {
        if !(tile_size.is_finite() && tile_size > 0.0) {
            return Err(RenderingError::InvalidTileSize { tile_size });
        }

        Ok(Self {
            half_extent: half_extent.abs(),
            tile_size,
            line_color,
        })
    }

    /// Ground covering the placement area of `catalog`.
    pub fn for_catalog(catalog: &Catalog) -> std::result::Result<Self, RenderingError> {
        Self::new(
            catalog.arena.placement_bound + catalog.arena.tile_size,
            catalog.arena.tile_size,
            Color::from_rgb_u8(0x44, 0x44, 0x44),
        )
    }

    /// Number of grid lines drawn along each axis.
    #[must_use]
    pub fn lines_per_axis(&self) -> u32 {
        let tiles = (2.0 * self.half_extent / self.tile_size).floor();
        if tiles.is_finite() {
            (tiles as u32).saturating_add(1)
        } else {
            0
        }
    }

    /// Reports whether `point` lies on the ground plane.
    #[must_use]
    pub fn contains(&self, point: Vec2) -> bool {
        point.x.abs() <= self.half_extent && point.y.abs() <= self.half_extent
    }
}

/// Enemy rendered as a body with a floating health bar.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SceneEnemy {
    /// Identifier allocated by the world.
    pub id: EnemyId,
    /// Kind of the enemy.
    pub kind: EnemyKind,
    /// Centre of the body.
    pub position: Vec3,
    /// Body radius.
    pub radius: f32,
    /// Fill color, white while the damage flash lasts.
    pub color: Color,
    /// Remaining hit points as a fraction of the maximum.
    pub health_fraction: f32,
}

/// Tower rendered as a turret on its grid cell.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SceneTower {
    /// Identifier allocated by the world.
    pub id: TowerId,
    /// Kind of the tower.
    pub kind: TowerKind,
    /// Base of the turret on the ground.
    pub position: Vec3,
    /// Turret height.
    pub height: f32,
    /// Current level.
    pub level: u32,
    /// Current range, drawn as a ring around selected towers.
    pub range: f32,
    /// Fill color.
    pub color: Color,
    /// Whether the player selected this tower.
    pub selected: bool,
    /// Enemy the tower is tracking.
    pub target: Option<EnemyId>,
}

/// Projectile in flight.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SceneProjectile {
    /// Identifier allocated by the world.
    pub id: ProjectileId,
    /// Current position.
    pub position: Vec3,
}

/// Ghost indicator shown while a tower kind is armed.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TowerPreview {
    /// Kind of tower proposed for placement.
    pub kind: TowerKind,
    /// Cell under the cursor.
    pub cell: GridCell,
    /// Ground position of the cell.
    pub position: Vec3,
    /// Range ring radius of the proposed tower.
    pub range: f32,
    /// Ghost color.
    pub color: Color,
    /// Reason the world would reject the placement, if any.
    pub rejection: Option<PlacementError>,
}

impl TowerPreview {
    /// Builds the ghost indicator for a world placement preview.
    #[must_use]
    pub fn from_preview(preview: PlacementPreview, catalog: &Catalog) -> Self {
        let ground = preview.cell.world_position(catalog.arena.tile_size);
        let rejection = match preview.legality {
            Err(reason) => Some(reason),
            Ok(()) if !preview.affordable => Some(PlacementError::InsufficientFunds),
            Ok(()) => None,
        };
        Self {
            kind: preview.kind,
            cell: preview.cell,
            position: Vec3::new(ground.x, 0.0, ground.z),
            range: catalog.tower(preview.kind).range,
            color: if rejection.is_none() {
                Color::PREVIEW_VALID
            } else {
                Color::PREVIEW_INVALID
            },
            rejection,
        }
    }

    /// Reports whether the world would accept the placement.
    #[must_use]
    pub fn placeable(&self) -> bool {
        self.rejection.is_none()
    }
}

/// Heads-up display content.
#[derive(Clone, Debug, PartialEq)]
pub struct HudPresentation {
    /// Economy and wave counters.
    pub stats: SessionStats,
    /// Session lifecycle phase.
    pub phase: SessionPhase,
    /// Latest notification, if one is still on screen.
    pub message: Option<String>,
}

/// Read-only world state a scene is assembled from.
#[derive(Clone, Copy, Debug)]
pub struct SceneSources<'a> {
    /// Static tables of the running session.
    pub catalog: &'a Catalog,
    /// Live enemies.
    pub enemies: &'a EnemyView,
    /// Placed towers.
    pub towers: &'a TowerView,
    /// Projectiles in flight.
    pub projectiles: &'a ProjectileView,
    /// Economy and wave counters.
    pub stats: SessionStats,
    /// Session lifecycle phase.
    pub phase: SessionPhase,
    /// Selected tower.
    pub selected: Option<TowerId>,
    /// Placement preview under the cursor while a kind is armed.
    pub preview: Option<PlacementPreview>,
}

/// Scene description combining the ground, the path and every inhabitant.
#[derive(Clone, Debug, PartialEq)]
pub struct Scene {
    /// Ground plane and placement grid.
    pub ground: GroundPresentation,
    /// Path waypoints lifted slightly above the ground.
    pub path: Vec<Vec3>,
    /// Enemies in ascending identifier order.
    pub enemies: Vec<SceneEnemy>,
    /// Towers in ascending identifier order.
    pub towers: Vec<SceneTower>,
    /// Projectiles in ascending identifier order.
    pub projectiles: Vec<SceneProjectile>,
    /// Placement ghost, if a kind is armed.
    pub tower_preview: Option<TowerPreview>,
    /// Heads-up display.
    pub hud: HudPresentation,
}

impl Scene {
    /// Assembles a scene from world snapshots.
    #[must_use]
    pub fn from_sources(ground: GroundPresentation, sources: SceneSources<'_>) -> Self {
        let catalog = sources.catalog;

        let path = catalog
            .path
            .waypoints()
            .iter()
            .map(|point| Vec3::new(point.x, 0.05, point.z))
            .collect();

        let enemies = sources
            .enemies
            .iter()
            .map(|enemy| {
                let stats = catalog.enemy(enemy.kind);
                SceneEnemy {
                    id: enemy.id,
                    kind: enemy.kind,
                    position: Vec3::new(enemy.position.x, enemy.position.y, enemy.position.z),
                    radius: stats.radius,
                    color: if enemy.flashing {
                        Color::WHITE
                    } else {
                        Color::from_catalog(stats.color)
                    },
                    health_fraction: enemy.health_fraction(),
                }
            })
            .collect();

        let towers = sources
            .towers
            .iter()
            .map(|tower| {
                let stats = catalog.tower(tower.kind);
                let selected = sources.selected == Some(tower.id);
                let color = Color::from_catalog(stats.color);
                SceneTower {
                    id: tower.id,
                    kind: tower.kind,
                    position: Vec3::new(tower.position.x, 0.0, tower.position.z),
                    height: stats.height,
                    level: tower.level,
                    range: tower.range,
                    color: if selected {
                        color.lighten(SELECTION_HIGHLIGHT)
                    } else {
                        color
                    },
                    selected,
                    target: tower.target,
                }
            })
            .collect();

        let projectiles = sources
            .projectiles
            .iter()
            .map(|projectile| SceneProjectile {
                id: projectile.id,
                position: Vec3::new(
                    projectile.position.x,
                    projectile.position.y,
                    projectile.position.z,
                ),
            })
            .collect();

        Self {
            ground,
            path,
            enemies,
            towers,
            projectiles,
            tower_preview: sources
                .preview
                .map(|preview| TowerPreview::from_preview(preview, catalog)),
            hud: HudPresentation {
                stats: sources.stats,
                phase: sources.phase,
                message: None,
            },
        }
    }

    /// Selected tower, if it is still standing.
    #[must_use]
    pub fn selected_tower(&self) -> Option<&SceneTower> {
        self.towers.iter().find(|tower| tower.selected)
    }

    /// Height at which enemy health bars float.
    #[must_use]
    pub fn health_bar_height(enemy: &SceneEnemy) -> f32 {
        ENEMY_TRAVEL_HEIGHT + enemy.radius + 0.3
    }
}

/// Presentation descriptor consumed by rendering backends.
#[derive(Clone, Debug, PartialEq)]
pub struct Presentation {
    /// Title used by the created window.
    pub window_title: String,
    /// Solid color used to clear each frame.
    pub clear_color: Color,
    /// Scene content that should be displayed.
    pub scene: Scene,
}

impl Presentation {
    /// Constructs a new presentation descriptor.
    #[must_use]
    pub fn new<T>(window_title: T, clear_color: Color, scene: Scene) -> Self
    where
        T: Into<String>,
    {
        Self {
            window_title: window_title.into(),
            clear_color,
            scene,
        }
    }
}

/// Rendering backend capable of presenting Voxel Defence scenes.
pub trait RenderingBackend {
    /// Runs the rendering backend until it is requested to exit.
    ///
    /// The provided `update_scene` closure receives the frame delta and the
    /// per-frame input captured by the adapter, and replaces the scene before
    /// it is presented. Returning `false` requests the backend to stop.
    fn run<F>(self, presentation: Presentation, update_scene: F) -> AnyResult<()>
    where
        F: FnMut(Duration, FrameInput, &mut Scene) -> bool + 'static;
}

/// Errors that can occur when constructing rendering descriptors.
#[derive(Debug, PartialEq)]
pub enum RenderingError {
    /// Tile size must be positive to lay out the placement grid.
    InvalidTileSize {
        /// Provided tile size that failed validation.
        tile_size: f32,
    },
}

impl fmt::Display for RenderingError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidTileSize { tile_size } => {
                write!(f, "tile size must be positive (received {tile_size})")
            }
        }
    }
}

impl Error for RenderingError {}
