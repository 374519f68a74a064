#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Authoritative world state management for Voxel Defence.
//!
//! The world owns every live enemy, tower and projectile. Hosts mutate it only
//! through [`apply`], which executes a [`Command`] and appends the resulting
//! [`Event`] values to the caller's buffer. A `Command::Tick` runs the whole
//! simulation step in a fixed order: autopilot, hero ability expiry, spawning,
//! wave completion, enemy movement, tower fire and projectile resolution.

mod enemy;
mod placement;
mod projectile;
mod session;
mod towers;

use std::{collections::BTreeMap, mem, time::Duration};

use glam::Vec2;
use tracing::{debug, info};
use voxel_defence_core::{
    Catalog, CatalogError, Command, Difficulty, EnemyId, EnemyKind, EnemyView, Event, GridCell,
    GroundPoint, Hero, PlacementError, ProjectileId, SaleError, SessionPhase, TowerId, TowerKind,
    TowerView, UpgradeError, MAX_FRAME_DELTA,
};
use voxel_defence_system_autopilot::{Autopilot, AutopilotState};
use voxel_defence_system_spawning::WaveSpawner;
use voxel_defence_system_tower_targeting::{TowerTarget, TowerTargeting};

use crate::{
    enemy::Enemy,
    projectile::{Projectile, ProjectileOutcome},
    session::Session,
    towers::{Shot, TowerRegistry, TowerState},
};

const DEFAULT_AUTOPILOT_SEED: u64 = 0x42f0_e1eb_d4a5_3c21;

/// Represents the authoritative Voxel Defence world state.
#[derive(Debug)]
pub struct World {
    catalog: Catalog,
    autopilot_seed: u64,
    session: Session,
    clock: Duration,
    enemies: BTreeMap<EnemyId, Enemy>,
    next_enemy_id: EnemyId,
    towers: TowerRegistry,
    projectiles: BTreeMap<ProjectileId, Projectile>,
    next_projectile_id: ProjectileId,
    spawner: WaveSpawner,
    targeting: TowerTargeting,
    autopilot: Option<Autopilot>,
    targets: Vec<TowerTarget>,
    pending_commands: Vec<Command>,
}

impl World {
    /// Creates a world in the menu phase using the standard catalog.
    #[must_use]
    pub fn new() -> Self {
        Self::from_validated(Catalog::standard(), DEFAULT_AUTOPILOT_SEED)
    }

    /// Creates a world from a custom catalog after validating it.
    ///
    /// `autopilot_seed` drives every random choice of autonomous sessions.
    pub fn with_catalog(catalog: Catalog, autopilot_seed: u64) -> Result<Self, CatalogError> {
        catalog.validate()?;
        Ok(Self::from_validated(catalog, autopilot_seed))
    }

    fn from_validated(catalog: Catalog, autopilot_seed: u64) -> Self {
        Self {
            catalog,
            autopilot_seed,
            session: Session::menu(),
            clock: Duration::ZERO,
            enemies: BTreeMap::new(),
            next_enemy_id: EnemyId::new(0),
            towers: TowerRegistry::new(),
            projectiles: BTreeMap::new(),
            next_projectile_id: ProjectileId::new(0),
            spawner: WaveSpawner::new(),
            targeting: TowerTargeting::new(),
            autopilot: None,
            targets: Vec::new(),
            pending_commands: Vec::new(),
        }
    }

    fn clear_entities(&mut self) {
        self.enemies.clear();
        self.next_enemy_id = EnemyId::new(0);
        self.towers.clear();
        self.projectiles.clear();
        self.next_projectile_id = ProjectileId::new(0);
        self.spawner.clear();
        self.targets.clear();
        self.clock = Duration::ZERO;
    }

    fn stats_changed(&self, out_events: &mut Vec<Event>) {
        out_events.push(Event::StatsChanged {
            stats: self.session.stats(self.catalog.wave_count()),
        });
    }

    fn start_session(
        &mut self,
        hero: Hero,
        difficulty: Difficulty,
        autonomous: bool,
        out_events: &mut Vec<Event>,
    ) {
        self.session = self
            .session
            .start(hero, difficulty, autonomous, &self.catalog.economy);
        self.clear_entities();
        self.autopilot = autonomous.then(|| Autopilot::new(self.autopilot_seed));

        info!(%hero, %difficulty, autonomous, "session started");
        out_events.push(Event::SessionStarted {
            hero,
            difficulty,
            autonomous,
        });
        self.stats_changed(out_events);
    }

    fn restart_session(&mut self, out_events: &mut Vec<Event>) {
        self.session = self.session.reset();
        self.clear_entities();
        self.autopilot = None;

        info!("session reset");
        out_events.push(Event::SessionReset);
        out_events.push(Event::SelectionChanged { tower: None });
        self.stats_changed(out_events);
    }

    fn start_wave(&mut self, out_events: &mut Vec<Event>) {
        if !self.session.is_playing() {
            debug!("wave start ignored outside a running session");
            return;
        }
        if self.session.wave_active {
            debug!("wave start ignored while a wave is active");
            return;
        }
        let index = self.session.waves_started as usize;
        let Some(wave) = self.catalog.wave(index) else {
            debug!("wave start ignored, every wave has been started");
            return;
        };

        self.spawner.load(wave);
        self.session.wave_active = true;
        self.session.waves_started += 1;
        let number = self.session.waves_started;

        info!(wave = number, enemies = wave.enemy_count(), "wave started");
        out_events.push(Event::WaveStarted { wave: number });
        self.stats_changed(out_events);
        out_events.push(Event::Message {
            text: format!("Wave {number} Started!"),
        });
    }

    fn place_tower(&mut self, kind: TowerKind, cell: GridCell, out_events: &mut Vec<Event>) {
        match self.try_place_tower(kind, cell) {
            Ok(tower) => {
                out_events.push(Event::TowerPlaced { tower, kind, cell });
                self.stats_changed(out_events);
            }
            Err(reason) => {
                debug!(?kind, ?cell, %reason, "tower placement rejected");
                out_events.push(Event::TowerPlacementRejected { kind, cell, reason });
            }
        }
    }

    fn try_place_tower(
        &mut self,
        kind: TowerKind,
        cell: GridCell,
    ) -> Result<TowerId, PlacementError> {
        if !self.session.is_playing() {
            return Err(PlacementError::InvalidPhase);
        }
        placement::validate(cell, &self.catalog.arena, &self.catalog.path, &self.towers)?;

        let stats = self.catalog.tower(kind);
        if !self.session.spend(stats.cost) {
            return Err(PlacementError::InsufficientFunds);
        }
        Ok(self
            .towers
            .insert(kind, cell, stats, self.catalog.arena.tile_size))
    }

    fn select_tower(&mut self, tower: Option<TowerId>, out_events: &mut Vec<Event>) {
        let selection = tower.filter(|id| self.towers.get(*id).is_some());
        self.session.selection = selection;
        out_events.push(Event::SelectionChanged { tower: selection });
    }

    fn upgrade_tower(&mut self, tower: TowerId, out_events: &mut Vec<Event>) {
        match self.try_upgrade_tower(tower) {
            Ok((level, cost)) => {
                out_events.push(Event::TowerUpgraded { tower, level, cost });
                self.stats_changed(out_events);
            }
            Err(reason) => {
                debug!(tower = tower.get(), %reason, "tower upgrade rejected");
                out_events.push(Event::TowerUpgradeRejected { tower, reason });
            }
        }
    }

    fn try_upgrade_tower(&mut self, tower: TowerId) -> Result<(u32, u32), UpgradeError> {
        if !self.session.is_playing() {
            return Err(UpgradeError::InvalidPhase);
        }
        let state = self
            .towers
            .get_mut(tower)
            .ok_or(UpgradeError::MissingTower)?;
        let cost = state.upgrade_cost();
        if !self.session.spend(cost) {
            return Err(UpgradeError::InsufficientFunds);
        }
        state.upgrade();
        Ok((state.level, cost))
    }

    fn sell_tower(&mut self, tower: TowerId, out_events: &mut Vec<Event>) {
        match self.try_sell_tower(tower) {
            Ok(refund) => {
                out_events.push(Event::TowerSold { tower, refund });
                if self.session.selection == Some(tower) {
                    self.session.selection = None;
                    out_events.push(Event::SelectionChanged { tower: None });
                }
                self.stats_changed(out_events);
            }
            Err(reason) => {
                debug!(tower = tower.get(), %reason, "tower sale rejected");
                out_events.push(Event::TowerSaleRejected { tower, reason });
            }
        }
    }

    fn try_sell_tower(&mut self, tower: TowerId) -> Result<u32, SaleError> {
        if !self.session.is_playing() {
            return Err(SaleError::InvalidPhase);
        }
        let state = self.towers.remove(tower).ok_or(SaleError::MissingTower)?;
        let refund = state.sell_refund();
        self.session.credit(refund);
        Ok(refund)
    }

    fn set_time_scale(&mut self, factor: f32, out_events: &mut Vec<Event>) {
        match self.session.set_time_scale(factor) {
            Some(factor) => out_events.push(Event::TimeScaleChanged { factor }),
            None => debug!(factor, "time scale ignored"),
        }
    }

    fn activate_hero_ability(&mut self, out_events: &mut Vec<Event>) {
        if !self.session.activate_ability(self.clock) {
            debug!("hero ability unavailable");
            return;
        }
        let hero = self.session.hero;
        info!(%hero, "hero ability activated");
        out_events.push(Event::HeroAbilityActivated { hero });
    }

    fn tick(&mut self, dt: Duration, out_events: &mut Vec<Event>) {
        let dt = self.session.scale(dt.min(MAX_FRAME_DELTA));
        out_events.push(Event::TimeAdvanced { dt });
        if !self.session.is_playing() {
            return;
        }
        self.clock = self.clock.saturating_add(dt);

        self.think_autonomously(dt, out_events);
        if self.session.expire_ability(self.clock) {
            let hero = self.session.hero;
            info!(%hero, "hero ability expired");
            out_events.push(Event::HeroAbilityExpired { hero });
        }
        self.release_spawns(dt, out_events);
        if self.detect_wave_completion(out_events) {
            return;
        }
        if self.advance_enemies(dt, out_events) {
            return;
        }
        self.fire_towers(out_events);
        self.resolve_projectiles(dt, out_events);
    }

    fn think_autonomously(&mut self, dt: Duration, out_events: &mut Vec<Event>) {
        let Some(autopilot) = self.autopilot.as_mut() else {
            return;
        };
        let state = AutopilotState {
            wave_active: self.session.wave_active,
            live_enemies: self.enemies.len(),
            money: self.session.money,
        };
        let catalog = &self.catalog;
        let towers = &self.towers;
        let mut commands = mem::take(&mut self.pending_commands);
        autopilot.handle(
            dt,
            state,
            catalog,
            |cell| placement::validate(cell, &catalog.arena, &catalog.path, towers).is_ok(),
            &mut commands,
        );

        for command in commands.drain(..) {
            match command {
                Command::StartWave => self.start_wave(out_events),
                Command::PlaceTower { kind, cell } => self.place_tower(kind, cell, out_events),
                other => debug!(?other, "autopilot command ignored"),
            }
        }
        self.pending_commands = commands;
    }

    fn release_spawns(&mut self, dt: Duration, out_events: &mut Vec<Event>) {
        if !self.session.wave_active {
            return;
        }
        if let Some(kind) = self.spawner.advance(dt) {
            self.spawn_enemy(kind, out_events);
        }
    }

    fn spawn_enemy(&mut self, kind: EnemyKind, out_events: &mut Vec<Event>) {
        let id = self.next_enemy_id;
        self.next_enemy_id = EnemyId::new(id.get().saturating_add(1));
        let enemy = Enemy::spawn(
            id,
            kind,
            self.catalog.enemy(kind),
            self.session.difficulty.modifiers(),
            self.catalog.path.start(),
        );
        let _ = self.enemies.insert(id, enemy);

        debug!(enemy = id.get(), ?kind, "enemy spawned");
        out_events.push(Event::EnemySpawned { enemy: id, kind });
    }

    fn detect_wave_completion(&mut self, out_events: &mut Vec<Event>) -> bool {
        if !self.session.wave_active || !self.spawner.is_empty() || !self.enemies.is_empty() {
            return false;
        }
        self.session.wave_active = false;
        let wave = self.session.waves_started;

        info!(wave, "wave complete");
        out_events.push(Event::WaveCompleted { wave });
        out_events.push(Event::Message {
            text: "Wave Complete!".to_owned(),
        });

        if wave as usize >= self.catalog.wave_count() {
            self.session.phase = SessionPhase::Won;
            info!("every wave cleared, session won");
            out_events.push(Event::GameOver { won: true });
            return true;
        }
        false
    }

    fn advance_enemies(&mut self, dt: Duration, out_events: &mut Vec<Event>) -> bool {
        let dt_secs = dt.as_secs_f32() * self.session.speed_multiplier();
        let waypoints = self.catalog.path.waypoints();
        let mut leaked = Vec::new();
        for enemy in self.enemies.values_mut() {
            enemy.advance(dt_secs, waypoints);
            if enemy.reached_end {
                leaked.push(enemy.id);
            }
        }

        for id in leaked {
            let Some(enemy) = self.enemies.remove(&id) else {
                continue;
            };
            self.session.lose_lives(enemy.damage);
            debug!(enemy = id.get(), damage = enemy.damage, "enemy leaked");
            out_events.push(Event::EnemyLeaked {
                enemy: id,
                damage: enemy.damage,
            });
            self.stats_changed(out_events);
        }

        if self.session.lives <= 0 {
            self.session.phase = SessionPhase::Lost;
            info!(wave = self.session.waves_started, "lives exhausted, session lost");
            out_events.push(Event::GameOver { won: false });
            return true;
        }
        false
    }

    fn fire_towers(&mut self, out_events: &mut Vec<Event>) {
        let towers =
            TowerView::from_snapshots(self.towers.iter().map(TowerState::snapshot).collect());
        let enemies = self.enemy_view();
        self.targeting.handle(&towers, &enemies, &mut self.targets);

        let now = self.clock;
        let multiplier = self.session.damage_multiplier();
        let targets = &self.targets;
        let mut shots: Vec<(TowerId, Shot)> = Vec::new();
        for tower in self.towers.iter_mut() {
            tower.target = targets
                .binary_search_by_key(&tower.id, |target| target.tower)
                .ok()
                .map(|index| targets[index].enemy);
            let Some(enemy) = tower.target else {
                continue;
            };
            if let Some(shot) = tower.try_fire(now, enemy, multiplier) {
                shots.push((tower.id, shot));
            }
        }

        for (tower, shot) in shots {
            let id = self.next_projectile_id;
            self.next_projectile_id = ProjectileId::new(id.get().saturating_add(1));
            let _ = self
                .projectiles
                .insert(id, Projectile::new(id, shot.target, shot.damage, shot.origin));
            out_events.push(Event::ProjectileFired {
                projectile: id,
                tower,
                target: shot.target,
            });
        }
    }

    fn resolve_projectiles(&mut self, dt: Duration, out_events: &mut Vec<Event>) {
        let ids: Vec<ProjectileId> = self.projectiles.keys().copied().collect();
        for id in ids {
            let Some(projectile) = self.projectiles.get_mut(&id) else {
                continue;
            };
            let target_position = self
                .enemies
                .get(&projectile.target)
                .filter(|enemy| !enemy.is_dead)
                .map(Enemy::world_position);

            match projectile.advance(dt, target_position) {
                ProjectileOutcome::Travelling => {}
                ProjectileOutcome::Expired => {
                    let _ = self.projectiles.remove(&id);
                }
                ProjectileOutcome::Hit => {
                    let (target, damage) = (projectile.target, projectile.damage);
                    let _ = self.projectiles.remove(&id);
                    self.strike(target, damage, out_events);
                }
            }
        }
    }

    fn strike(&mut self, target: EnemyId, damage: f32, out_events: &mut Vec<Event>) {
        let Some(enemy) = self.enemies.get_mut(&target) else {
            return;
        };
        if !enemy.apply_damage(damage, self.clock) {
            return;
        }
        let (reward, position) = (enemy.reward, enemy.position);
        let _ = self.enemies.remove(&target);
        self.session.credit(reward);

        debug!(enemy = target.get(), reward, "enemy killed");
        out_events.push(Event::EnemyKilled {
            enemy: target,
            reward,
            position: ground(position),
        });
        self.stats_changed(out_events);
    }

    fn enemy_view(&self) -> EnemyView {
        EnemyView::from_snapshots(
            self.enemies
                .values()
                .map(|enemy| enemy.snapshot(self.clock))
                .collect(),
        )
    }
}

impl Default for World {
    fn default() -> Self {
        Self::new()
    }
}

fn ground(position: Vec2) -> GroundPoint {
    GroundPoint::new(position.x, position.y)
}

/// Applies the provided command to the world, mutating state deterministically.
pub fn apply(world: &mut World, command: Command, out_events: &mut Vec<Event>) {
    match command {
        Command::StartSession {
            hero,
            difficulty,
            autonomous,
        } => world.start_session(hero, difficulty, autonomous, out_events),
        Command::RestartSession => world.restart_session(out_events),
        Command::Tick { dt } => world.tick(dt, out_events),
        Command::StartWave => world.start_wave(out_events),
        Command::PlaceTower { kind, cell } => world.place_tower(kind, cell, out_events),
        Command::SelectTower { tower } => world.select_tower(Some(tower), out_events),
        Command::ClearSelection => world.select_tower(None, out_events),
        Command::UpgradeTower { tower } => world.upgrade_tower(tower, out_events),
        Command::SellTower { tower } => world.sell_tower(tower, out_events),
        Command::SetTimeScale { factor } => world.set_time_scale(factor, out_events),
        Command::ActivateHeroAbility => world.activate_hero_ability(out_events),
    }
}

/// Query functions that provide read-only access to the world state.
pub mod query {
    use std::time::Duration;

    use super::{placement, TowerState, World};
    use voxel_defence_core::{
        Catalog, Difficulty, EnemyView, GridCell, Hero, Path, PlacementError, PlacementPreview,
        ProjectileView, SessionPhase, SessionStats, TowerId, TowerKind, TowerSnapshot, TowerView,
        WavePhase,
    };

    /// Captures a read-only view of the enemies on the path.
    #[must_use]
    pub fn enemy_view(world: &World) -> EnemyView {
        world.enemy_view()
    }

    /// Captures a read-only view of every tower.
    #[must_use]
    pub fn tower_view(world: &World) -> TowerView {
        TowerView::from_snapshots(world.towers.iter().map(TowerState::snapshot).collect())
    }

    /// Captures a read-only view of the projectiles in flight.
    #[must_use]
    pub fn projectile_view(world: &World) -> ProjectileView {
        ProjectileView::from_snapshots(
            world
                .projectiles
                .values()
                .map(|projectile| projectile.snapshot())
                .collect(),
        )
    }

    /// Money, lives and wave progress of the current session.
    #[must_use]
    pub fn stats(world: &World) -> SessionStats {
        world.session.stats(world.catalog.wave_count())
    }

    /// Lifecycle phase of the current session.
    #[must_use]
    pub fn session_phase(world: &World) -> SessionPhase {
        world.session.phase
    }

    /// Progress of the running wave.
    #[must_use]
    pub fn wave_phase(world: &World) -> WavePhase {
        if !world.session.wave_active {
            WavePhase::Idle
        } else if !world.spawner.is_empty() {
            WavePhase::Spawning
        } else {
            WavePhase::Draining
        }
    }

    /// Hero chosen for the current session.
    #[must_use]
    pub fn hero(world: &World) -> Hero {
        world.session.hero
    }

    /// Difficulty chosen for the current session.
    #[must_use]
    pub fn difficulty(world: &World) -> Difficulty {
        world.session.difficulty
    }

    /// Reports whether the autopilot plays the current session.
    #[must_use]
    pub fn is_autonomous(world: &World) -> bool {
        world.session.autonomous
    }

    /// Snapshot of the selected tower, if any.
    #[must_use]
    pub fn selected_tower(world: &World) -> Option<TowerSnapshot> {
        world
            .session
            .selection
            .and_then(|id| world.towers.get(id))
            .map(TowerState::snapshot)
    }

    /// Tower standing on `cell`, if any.
    #[must_use]
    pub fn tower_at(world: &World, cell: GridCell) -> Option<TowerId> {
        world.towers.at_cell(cell)
    }

    /// Price of the next level of `tower`.
    #[must_use]
    pub fn upgrade_cost(world: &World, tower: TowerId) -> Option<u32> {
        world.towers.get(tower).map(TowerState::upgrade_cost)
    }

    /// Money returned when selling `tower`.
    #[must_use]
    pub fn sell_refund(world: &World, tower: TowerId) -> Option<u32> {
        world.towers.get(tower).map(TowerState::sell_refund)
    }

    /// Legality and affordability of placing `kind` on `cell`, reported independently.
    #[must_use]
    pub fn placement_preview(world: &World, kind: TowerKind, cell: GridCell) -> PlacementPreview {
        let legality = if world.session.is_playing() {
            placement::validate(
                cell,
                &world.catalog.arena,
                &world.catalog.path,
                &world.towers,
            )
        } else {
            Err(PlacementError::InvalidPhase)
        };
        PlacementPreview {
            kind,
            cell,
            legality,
            affordable: world.session.money >= world.catalog.tower(kind).cost,
        }
    }

    /// Path travelled by every enemy.
    #[must_use]
    pub fn path(world: &World) -> &Path {
        &world.catalog.path
    }

    /// Static tables the world runs with.
    #[must_use]
    pub fn catalog(world: &World) -> &Catalog {
        &world.catalog
    }

    /// Game time elapsed since the session started.
    #[must_use]
    pub fn clock(world: &World) -> Duration {
        world.clock
    }

    /// Factor applied to every host frame delta.
    #[must_use]
    pub fn time_scale(world: &World) -> f32 {
        world.session.time_scale
    }

    /// Time left on the active hero ability.
    #[must_use]
    pub fn hero_ability_remaining(world: &World) -> Option<Duration> {
        world.session.ability_remaining(world.clock)
    }
}
