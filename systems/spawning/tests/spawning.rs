use std::time::Duration;

use voxel_defence_core::{Catalog, EnemyKind, SpawnGroup, WaveSpec};
use voxel_defence_system_spawning::WaveSpawner;

fn frames(spawner: &mut WaveSpawner, frame: Duration, count: usize) -> Vec<Option<EnemyKind>> {
    (0..count).map(|_| spawner.advance(frame)).collect()
}

#[test]
fn first_wave_releases_groups_in_order() {
    let catalog = Catalog::standard();
    let mut spawner = WaveSpawner::new();
    spawner.load(catalog.wave(0).expect("first wave"));

    let mut released = Vec::new();
    for _ in 0..200 {
        if let Some(kind) = spawner.advance(Duration::from_millis(100)) {
            released.push(kind);
        }
    }

    assert_eq!(
        released,
        vec![
            EnemyKind::Basic,
            EnemyKind::Basic,
            EnemyKind::Basic,
            EnemyKind::Basic,
            EnemyKind::Basic,
            EnemyKind::Fast,
            EnemyKind::Fast,
        ],
        "groups must drain in declaration order",
    );
    assert!(spawner.is_empty());
}

#[test]
fn release_waits_for_the_full_delay() {
    let mut spawner = WaveSpawner::new();
    spawner.load(&WaveSpec::new(vec![SpawnGroup {
        kind: EnemyKind::Basic,
        count: 2,
        interval_secs: 1.0,
    }]));

    let released = frames(&mut spawner, Duration::from_millis(250), 8);
    assert_eq!(
        released,
        vec![
            None,
            None,
            None,
            Some(EnemyKind::Basic),
            None,
            None,
            None,
            Some(EnemyKind::Basic),
        ],
    );
}

#[test]
fn oversized_tick_releases_a_single_enemy() {
    let mut spawner = WaveSpawner::new();
    spawner.load(&WaveSpec::new(vec![SpawnGroup {
        kind: EnemyKind::Fast,
        count: 3,
        interval_secs: 0.5,
    }]));

    assert_eq!(spawner.advance(Duration::from_secs(10)), Some(EnemyKind::Fast));
    assert_eq!(spawner.remaining(), 2);
    assert_eq!(
        spawner.accumulated(),
        Duration::ZERO,
        "leftover time is discarded after a release",
    );
}

#[test]
fn clear_drops_pending_entries() {
    let mut spawner = WaveSpawner::new();
    spawner.load(Catalog::standard().wave(2).expect("third wave"));
    assert_eq!(spawner.remaining(), 38);

    spawner.clear();
    assert!(spawner.is_empty());
    assert_eq!(spawner.advance(Duration::from_secs(1)), None);
}
