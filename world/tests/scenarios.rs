use std::time::Duration;

use voxel_defence_core::{
    Catalog, Command, Difficulty, EnemyKind, Event, GridCell, GroundPoint, Hero, Path,
    PlacementError, SaleError, SessionPhase, SpawnGroup, TowerId, TowerKind, UpgradeError,
    WaveSpec, WavePhase,
};
use voxel_defence_world::{apply, query, World};

fn wave(kind: EnemyKind, count: u32) -> WaveSpec {
    WaveSpec::new(vec![SpawnGroup {
        kind,
        count,
        interval_secs: 0.0,
    }])
}

fn short_path(length: f32) -> Path {
    Path::new(vec![GroundPoint::new(0.0, 0.0), GroundPoint::new(length, 0.0)])
        .expect("two waypoints form a path")
}

fn start(world: &mut World, hero: Hero) -> Vec<Event> {
    let mut events = Vec::new();
    apply(
        world,
        Command::StartSession {
            hero,
            difficulty: Difficulty::Easy,
            autonomous: false,
        },
        &mut events,
    );
    events
}

fn run(world: &mut World, command: Command) -> Vec<Event> {
    let mut events = Vec::new();
    apply(world, command, &mut events);
    events
}

fn tick(world: &mut World, millis: u64, count: usize) -> Vec<Event> {
    let mut events = Vec::new();
    for _ in 0..count {
        apply(
            world,
            Command::Tick {
                dt: Duration::from_millis(millis),
            },
            &mut events,
        );
    }
    events
}

fn placed(events: &[Event]) -> TowerId {
    events
        .iter()
        .find_map(|event| match event {
            Event::TowerPlaced { tower, .. } => Some(*tower),
            _ => None,
        })
        .expect("tower placed")
}

#[test]
fn leaked_enemies_cost_lives() {
    let mut catalog = Catalog::standard();
    catalog.path = short_path(4.0);
    catalog.waves = vec![wave(EnemyKind::Basic, 5), wave(EnemyKind::Basic, 5)];
    let mut world = World::with_catalog(catalog, 1).expect("valid catalog");
    let _ = start(&mut world, Hero::Warrior);
    let _ = run(&mut world, Command::StartWave);

    let events = tick(&mut world, 100, 40);

    let leaks = events
        .iter()
        .filter(|event| matches!(event, Event::EnemyLeaked { damage: 1, .. }))
        .count();
    assert_eq!(leaks, 5, "every basic enemy reached the end");
    assert_eq!(query::stats(&world).lives, 15);
    assert_eq!(query::session_phase(&world), SessionPhase::Playing);
    assert_eq!(query::wave_phase(&world), WavePhase::Idle);
    assert!(events.contains(&Event::WaveCompleted { wave: 1 }));
}

#[test]
fn lives_exhausted_loses_the_session() {
    let mut catalog = Catalog::standard();
    catalog.path = short_path(4.0);
    catalog.waves = vec![wave(EnemyKind::Tank, 5)];
    let mut world = World::with_catalog(catalog, 1).expect("valid catalog");
    let _ = start(&mut world, Hero::Warrior);
    let _ = run(&mut world, Command::StartWave);

    let events = tick(&mut world, 100, 60);

    let leaks = events
        .iter()
        .filter(|event| matches!(event, Event::EnemyLeaked { .. }))
        .count();
    let losses = events
        .iter()
        .filter(|event| **event == Event::GameOver { won: false })
        .count();
    assert_eq!(leaks, 4, "the fourth tank drains the last life");
    assert_eq!(losses, 1);
    assert_eq!(query::stats(&world).lives, 0);
    assert_eq!(query::session_phase(&world), SessionPhase::Lost);

    let after = tick(&mut world, 100, 3);
    assert!(after
        .iter()
        .all(|event| matches!(event, Event::TimeAdvanced { .. })));
    assert!(run(&mut world, Command::StartWave).is_empty());
}

#[test]
fn sniper_kill_credits_reward_once_and_wins_final_wave() {
    let mut catalog = Catalog::standard();
    catalog.waves = vec![wave(EnemyKind::Basic, 1)];
    let mut world = World::with_catalog(catalog, 1).expect("valid catalog");
    let _ = start(&mut world, Hero::Warrior);
    let _ = placed(&run(
        &mut world,
        Command::PlaceTower {
            kind: TowerKind::Sniper,
            cell: GridCell::new(-9, -8),
        },
    ));
    let _ = run(&mut world, Command::StartWave);

    let events = tick(&mut world, 20, 100);

    let rewards: Vec<u32> = events
        .iter()
        .filter_map(|event| match event {
            Event::EnemyKilled { reward, .. } => Some(*reward),
            _ => None,
        })
        .collect();
    assert_eq!(rewards, vec![10]);
    assert_eq!(query::stats(&world).money, 500 - 250 + 10);
    assert!(events.contains(&Event::GameOver { won: true }));
    assert_eq!(query::session_phase(&world), SessionPhase::Won);
    assert!(query::enemy_view(&world).is_empty());
    assert!(query::projectile_view(&world).is_empty());
}

#[test]
fn projectile_expires_when_target_leaks() {
    let mut catalog = Catalog::standard();
    catalog.path = short_path(0.6);
    catalog.waves = vec![wave(EnemyKind::Fast, 1), wave(EnemyKind::Fast, 1)];
    let mut world = World::with_catalog(catalog, 1).expect("valid catalog");
    let _ = start(&mut world, Hero::Warrior);
    let _ = placed(&run(
        &mut world,
        Command::PlaceTower {
            kind: TowerKind::Basic,
            cell: GridCell::new(0, 3),
        },
    ));
    let _ = run(&mut world, Command::StartWave);

    let mut events = Vec::new();
    for _ in 0..50 {
        events.extend(tick(&mut world, 10, 1));
        if events
            .iter()
            .any(|event| matches!(event, Event::EnemyLeaked { .. }))
        {
            break;
        }
    }

    let fired = events
        .iter()
        .filter(|event| matches!(event, Event::ProjectileFired { .. }))
        .count();
    assert_eq!(fired, 1);
    assert!(query::projectile_view(&world).is_empty());
    assert!(!events
        .iter()
        .any(|event| matches!(event, Event::EnemyKilled { .. })));
    assert_eq!(query::stats(&world).lives, 19);
}

#[test]
fn tower_respects_cooldown() {
    let mut catalog = Catalog::standard();
    catalog.waves = vec![wave(EnemyKind::Tank, 1)];
    let mut world = World::with_catalog(catalog, 1).expect("valid catalog");
    let _ = start(&mut world, Hero::Warrior);
    let _ = placed(&run(
        &mut world,
        Command::PlaceTower {
            kind: TowerKind::Basic,
            cell: GridCell::new(-9, -8),
        },
    ));
    let _ = run(&mut world, Command::StartWave);

    let mut fired_at = Vec::new();
    for _ in 0..250 {
        let events = tick(&mut world, 10, 1);
        if events
            .iter()
            .any(|event| matches!(event, Event::ProjectileFired { .. }))
        {
            fired_at.push(query::clock(&world));
        }
    }

    assert_eq!(
        fired_at,
        vec![
            Duration::from_millis(10),
            Duration::from_millis(1_010),
            Duration::from_millis(2_010),
        ]
    );
}

#[test]
fn upgrades_compound_and_respect_funds() {
    let mut world = World::new();
    let _ = start(&mut world, Hero::Warrior);
    let tower = placed(&run(
        &mut world,
        Command::PlaceTower {
            kind: TowerKind::Basic,
            cell: GridCell::new(3, -2),
        },
    ));

    let mut costs = Vec::new();
    for _ in 0..3 {
        for event in run(&mut world, Command::UpgradeTower { tower }) {
            if let Event::TowerUpgraded { cost, .. } = event {
                costs.push(cost);
            }
        }
    }
    assert_eq!(costs, vec![50, 100, 150]);
    assert_eq!(query::stats(&world).money, 100);

    let snapshot = query::tower_view(&world)
        .into_vec()
        .pop()
        .expect("tower present");
    assert_eq!(snapshot.level, 4);
    assert!((snapshot.damage - 10.0 * 1.2_f32.powi(3)).abs() < 1e-3);
    assert!((snapshot.range - 8.0 * 1.1_f32.powi(3)).abs() < 1e-3);
    assert!((snapshot.cooldown.as_secs_f64() - 0.9_f64.powi(3)).abs() < 1e-6);

    assert_eq!(query::upgrade_cost(&world, tower), Some(200));
    assert_eq!(
        run(&mut world, Command::UpgradeTower { tower }),
        vec![Event::TowerUpgradeRejected {
            tower,
            reason: UpgradeError::InsufficientFunds,
        }]
    );
}

#[test]
fn path_clearance_is_checked_before_funds() {
    let mut world = World::new();
    let _ = start(&mut world, Hero::Warrior);
    for (column, row) in [(3, -2), (5, -2), (7, -2), (3, -6), (5, -6)] {
        let _ = placed(&run(
            &mut world,
            Command::PlaceTower {
                kind: TowerKind::Basic,
                cell: GridCell::new(column, row),
            },
        ));
    }
    assert_eq!(query::stats(&world).money, 0);

    let on_path = GridCell::new(0, -2);
    assert_eq!(
        run(
            &mut world,
            Command::PlaceTower {
                kind: TowerKind::Basic,
                cell: on_path,
            },
        ),
        vec![Event::TowerPlacementRejected {
            kind: TowerKind::Basic,
            cell: on_path,
            reason: PlacementError::TooCloseToPath,
        }]
    );

    let preview = query::placement_preview(&world, TowerKind::Basic, on_path);
    assert_eq!(preview.legality, Err(PlacementError::TooCloseToPath));
    assert!(!preview.affordable);

    let open = query::placement_preview(&world, TowerKind::Basic, GridCell::new(9, -6));
    assert_eq!(open.legality, Ok(()));
    assert!(!open.placeable(), "legal but unaffordable");
}

#[test]
fn selling_refunds_half_and_clears_selection() {
    let mut world = World::new();
    let _ = start(&mut world, Hero::Warrior);
    let tower = placed(&run(
        &mut world,
        Command::PlaceTower {
            kind: TowerKind::Sniper,
            cell: GridCell::new(3, -2),
        },
    ));
    let _ = run(&mut world, Command::SelectTower { tower });
    assert_eq!(
        query::selected_tower(&world).map(|snapshot| snapshot.id),
        Some(tower)
    );
    assert_eq!(query::tower_at(&world, GridCell::new(3, -2)), Some(tower));

    let events = run(&mut world, Command::SellTower { tower });

    assert!(events.contains(&Event::TowerSold { tower, refund: 125 }));
    assert!(events.contains(&Event::SelectionChanged { tower: None }));
    assert_eq!(query::stats(&world).money, 375);
    assert!(query::tower_view(&world).is_empty());
    assert_eq!(
        run(&mut world, Command::SellTower { tower }),
        vec![Event::TowerSaleRejected {
            tower,
            reason: SaleError::MissingTower,
        }]
    );
}

#[test]
fn hero_ability_expires_after_five_seconds() {
    let mut world = World::new();
    let _ = start(&mut world, Hero::Mage);

    assert_eq!(
        run(&mut world, Command::ActivateHeroAbility),
        vec![Event::HeroAbilityActivated { hero: Hero::Mage }]
    );
    assert!(run(&mut world, Command::ActivateHeroAbility).is_empty());

    let before = tick(&mut world, 100, 49);
    assert!(!before.contains(&Event::HeroAbilityExpired { hero: Hero::Mage }));
    assert_eq!(
        query::hero_ability_remaining(&world),
        Some(Duration::from_millis(100))
    );

    let expiry = tick(&mut world, 100, 1);
    assert!(expiry.contains(&Event::HeroAbilityExpired { hero: Hero::Mage }));
    assert_eq!(query::hero_ability_remaining(&world), None);
}

fn lead_enemy_x(world: &World) -> f32 {
    query::enemy_view(world)
        .iter()
        .next()
        .map(|enemy| enemy.position.x)
        .expect("an enemy is walking")
}

#[test]
fn mage_ability_halves_enemy_travel() {
    let walk = |activate: bool| {
        let mut catalog = Catalog::standard();
        catalog.path = short_path(30.0);
        catalog.waves = vec![wave(EnemyKind::Basic, 1)];
        let mut world = World::with_catalog(catalog, 1).expect("valid catalog");
        let _ = start(&mut world, Hero::Mage);
        if activate {
            let _ = run(&mut world, Command::ActivateHeroAbility);
        }
        let _ = run(&mut world, Command::StartWave);
        let _ = tick(&mut world, 100, 10);
        lead_enemy_x(&world)
    };

    let normal = walk(false);
    let slowed = walk(true);

    assert!((normal - 3.0).abs() < 1e-3, "basic enemy walks 3 units per second");
    assert!(
        (slowed - normal * 0.5).abs() < 1e-3,
        "slowed {slowed} against normal {normal}"
    );
}

/// World in which a basic tower at (0, 6) covers the start of a straight path
/// walked by a single 15 hp enemy.
fn boosted_shot_world() -> World {
    let mut catalog = Catalog::standard();
    catalog.path = short_path(40.0);
    catalog.enemies.basic.hp = 15.0;
    catalog.waves = vec![wave(EnemyKind::Basic, 1)];
    let mut world = World::with_catalog(catalog, 1).expect("valid catalog");
    let _ = start(&mut world, Hero::Warrior);
    let _ = placed(&run(
        &mut world,
        Command::PlaceTower {
            kind: TowerKind::Basic,
            cell: GridCell::new(0, 3),
        },
    ));
    world
}

#[test]
fn warrior_boost_stays_with_shots_fired_before_expiry() {
    let mut world = boosted_shot_world();
    let _ = run(&mut world, Command::ActivateHeroAbility);
    let _ = tick(&mut world, 10, 497);
    let _ = run(&mut world, Command::StartWave);

    let mut events = Vec::new();
    for _ in 0..60 {
        events.extend(tick(&mut world, 10, 1));
        if events
            .iter()
            .any(|event| matches!(event, Event::EnemyKilled { .. }))
        {
            break;
        }
    }

    let position = |wanted: fn(&Event) -> bool| events.iter().position(wanted);
    let fired = position(|event| matches!(event, Event::ProjectileFired { .. }))
        .expect("tower fired");
    let expired = position(|event| matches!(event, Event::HeroAbilityExpired { .. }))
        .expect("ability expired");
    let killed =
        position(|event| matches!(event, Event::EnemyKilled { .. })).expect("enemy killed");
    assert!(fired < expired, "shot left the tower while the ability was active");
    assert!(expired < killed, "shot landed after the ability ended");
    let shots = events
        .iter()
        .filter(|event| matches!(event, Event::ProjectileFired { .. }))
        .count();
    assert_eq!(shots, 1, "a single doubled shot kills a 15 hp enemy");
}

#[test]
fn unboosted_shot_leaves_enemy_wounded() {
    let mut world = boosted_shot_world();
    let _ = run(&mut world, Command::StartWave);

    let events = tick(&mut world, 10, 60);

    let shots = events
        .iter()
        .filter(|event| matches!(event, Event::ProjectileFired { .. }))
        .count();
    assert_eq!(shots, 1);
    assert!(!events
        .iter()
        .any(|event| matches!(event, Event::EnemyKilled { .. })));
    let enemy = query::enemy_view(&world)
        .iter()
        .next()
        .copied()
        .expect("enemy survives");
    assert!((enemy.hp - 5.0).abs() < 1e-3, "hp left: {}", enemy.hp);
}

#[test]
fn catalog_with_unbounded_timings_never_reaches_the_world() {
    let mut catalog = Catalog::standard();
    catalog.towers.basic.cooldown_secs = f32::INFINITY;
    assert!(World::with_catalog(catalog, 1).is_err());

    let mut catalog = Catalog::standard();
    catalog.waves[0].groups[0].interval_secs = 1e20;
    assert!(World::with_catalog(catalog, 1).is_err());
}

#[test]
fn time_scale_multiplies_clamped_frames() {
    let mut world = World::new();
    assert_eq!(
        run(&mut world, Command::SetTimeScale { factor: 2.0 }),
        vec![Event::TimeScaleChanged { factor: 2.0 }]
    );
    let _ = start(&mut world, Hero::Warrior);

    let events = tick(&mut world, 250, 1);

    assert_eq!(
        events.first(),
        Some(&Event::TimeAdvanced {
            dt: Duration::from_millis(200)
        })
    );
    assert_eq!(query::clock(&world), Duration::from_millis(200));
    assert_eq!(query::time_scale(&world), 2.0);
}

#[test]
fn autonomous_sessions_replay_identically() {
    let play = || {
        let mut world = World::with_catalog(Catalog::standard(), 7).expect("valid catalog");
        let mut events = Vec::new();
        apply(
            &mut world,
            Command::StartSession {
                hero: Hero::Warrior,
                difficulty: Difficulty::Normal,
                autonomous: true,
            },
            &mut events,
        );
        for _ in 0..1_200 {
            apply(
                &mut world,
                Command::Tick {
                    dt: Duration::from_millis(50),
                },
                &mut events,
            );
        }
        (events, query::tower_view(&world).into_vec())
    };

    let (first_events, first_towers) = play();
    let (second_events, second_towers) = play();

    assert!(first_events.contains(&Event::WaveStarted { wave: 1 }));
    assert_eq!(first_events, second_events);
    assert_eq!(first_towers, second_towers);
}
