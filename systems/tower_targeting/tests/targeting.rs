use std::time::Duration;

use glam::Vec2;
use voxel_defence_core::{
    EnemyId, EnemyKind, EnemySnapshot, EnemyView, GridCell, GroundPoint, TowerId, TowerKind,
    TowerSnapshot, TowerView, WorldPoint,
};
use voxel_defence_system_tower_targeting::{select_target, TargetCandidate, TowerTargeting};

fn sniper_at(id: u32, x: f32, z: f32) -> TowerSnapshot {
    TowerSnapshot {
        id: TowerId::new(id),
        kind: TowerKind::Sniper,
        cell: GridCell::new(0, 0),
        position: GroundPoint::new(x, z),
        level: 1,
        range: 16.0,
        damage: 50.0,
        cooldown: Duration::from_secs(2),
        target: None,
    }
}

fn walker(id: u32, x: f32, z: f32) -> EnemySnapshot {
    EnemySnapshot {
        id: EnemyId::new(id),
        kind: EnemyKind::Fast,
        position: WorldPoint::new(x, 0.5, z),
        hp: 15.0,
        max_hp: 15.0,
        flashing: false,
    }
}

#[test]
fn retargets_as_enemies_move_out_of_range() {
    let mut targeting = TowerTargeting::new();
    let towers = TowerView::from_snapshots(vec![sniper_at(1, 0.0, 0.0)]);
    let mut out = Vec::new();

    let frames = [
        vec![walker(1, 10.0, 0.0), walker(2, 15.0, 0.0)],
        vec![walker(1, 16.0, 0.0), walker(2, 15.5, 0.0)],
        vec![walker(1, 17.0, 0.0), walker(2, 16.5, 0.0)],
    ];
    let mut selections = Vec::new();
    for frame in frames {
        targeting.handle(&towers, &EnemyView::from_snapshots(frame), &mut out);
        selections.push(out.first().map(|target| target.enemy.get()));
    }

    assert_eq!(selections, vec![Some(1), Some(2), None]);
}

#[test]
fn candidate_order_decides_ties() {
    let candidates = [
        TargetCandidate {
            enemy: EnemyId::new(7),
            position: Vec2::new(0.0, 2.0),
        },
        TargetCandidate {
            enemy: EnemyId::new(3),
            position: Vec2::new(2.0, 0.0),
        },
    ];

    assert_eq!(
        select_target(Vec2::ZERO, 5.0, &candidates),
        Some(EnemyId::new(7)),
        "the first candidate found keeps the tie",
    );
    assert_eq!(select_target(Vec2::ZERO, 2.0, &candidates), None);
}
