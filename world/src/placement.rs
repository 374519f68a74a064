//! Legality rules for tower placement.

use glam::Vec2;
use voxel_defence_core::{ArenaConfig, GridCell, GroundPoint, Path, PlacementError};

use crate::towers::TowerRegistry;

/// Checks bounds, spacing and path clearance for `cell`, ignoring funds and phase.
pub(crate) fn validate(
    cell: GridCell,
    arena: &ArenaConfig,
    path: &Path,
    towers: &TowerRegistry,
) -> Result<(), PlacementError> {
    let point = cell.world_position(arena.tile_size);

    if point.x.abs() > arena.placement_bound || point.z.abs() > arena.placement_bound {
        return Err(PlacementError::OutOfBounds);
    }

    if towers.crowds(Vec2::new(point.x, point.z), arena.tower_spacing) {
        return Err(PlacementError::Occupied);
    }

    if too_close_to_path(point, path, arena.path_clearance) {
        return Err(PlacementError::TooCloseToPath);
    }

    Ok(())
}

fn too_close_to_path(point: GroundPoint, path: &Path, clearance: f32) -> bool {
    path.segments()
        .any(|(start, end)| point.distance_to_segment(start, end) < clearance)
}

#[cfg(test)]
mod tests {
    use super::*;
    use voxel_defence_core::{Catalog, TowerKind};

    fn check(cell: GridCell, towers: &TowerRegistry) -> Result<(), PlacementError> {
        let catalog = Catalog::standard();
        validate(cell, &catalog.arena, &catalog.path, towers)
    }

    #[test]
    fn open_ground_is_legal() {
        assert_eq!(check(GridCell::new(3, -2), &TowerRegistry::new()), Ok(()));
    }

    #[test]
    fn cells_beyond_the_bound_are_rejected() {
        let towers = TowerRegistry::new();
        assert_eq!(check(GridCell::new(19, 3), &towers), Ok(()));
        assert_eq!(
            check(GridCell::new(20, 3), &towers),
            Err(PlacementError::OutOfBounds)
        );
        assert_eq!(
            check(GridCell::new(3, -20), &towers),
            Err(PlacementError::OutOfBounds)
        );
    }

    #[test]
    fn path_clearance_is_enforced() {
        let towers = TowerRegistry::new();
        assert_eq!(
            check(GridCell::new(0, -2), &towers),
            Err(PlacementError::TooCloseToPath),
            "cell centre sits on the path",
        );
        assert_eq!(
            check(GridCell::new(-4, -8), &towers),
            Ok(()),
            "two units from a segment clears the path",
        );

        let mut catalog = Catalog::standard();
        catalog.arena.path_clearance = 2.5;
        assert_eq!(
            validate(GridCell::new(-4, -8), &catalog.arena, &catalog.path, &towers),
            Err(PlacementError::TooCloseToPath)
        );
    }

    #[test]
    fn occupied_cell_is_rejected() {
        let catalog = Catalog::standard();
        let mut towers = TowerRegistry::new();
        let _ = towers.insert(
            TowerKind::Basic,
            GridCell::new(3, -2),
            catalog.tower(TowerKind::Basic),
            catalog.arena.tile_size,
        );

        assert_eq!(
            check(GridCell::new(3, -2), &towers),
            Err(PlacementError::Occupied)
        );
        assert_eq!(check(GridCell::new(4, -2), &towers), Ok(()));
    }
}
