//! Frame-by-frame driver that turns adapter input into world commands.

use std::{cell::RefCell, rc::Rc, time::Duration};

use tracing::info;
use voxel_defence_core::{Command, Difficulty, Event, GridCell, Hero, SessionStats};
use voxel_defence_rendering::{FrameInput, GroundPresentation, Scene, SceneSources};
use voxel_defence_system_builder::{Builder, BuilderInput};
use voxel_defence_world::{apply, query, World};

/// Game time a notification stays on the HUD.
const MESSAGE_DURATION: Duration = Duration::from_secs(2);

/// Tallies of a played session, logged when the host exits.
#[derive(Clone, Debug, Default, PartialEq)]
pub(crate) struct SessionReport {
    pub(crate) frames: u64,
    pub(crate) stats: SessionStats,
    pub(crate) waves_completed: u32,
    pub(crate) towers_placed: u32,
    pub(crate) kills: u32,
    pub(crate) leaks: u32,
    pub(crate) rejected_commands: u32,
    pub(crate) outcome: Option<bool>,
}

impl SessionReport {
    fn record(&mut self, events: &[Event]) {
        for event in events {
            match event {
                Event::StatsChanged { stats } => self.stats = *stats,
                Event::WaveCompleted { .. } => self.waves_completed += 1,
                Event::TowerPlaced { .. } => self.towers_placed += 1,
                Event::EnemyKilled { .. } => self.kills += 1,
                Event::EnemyLeaked { .. } => self.leaks += 1,
                Event::TowerPlacementRejected { .. }
                | Event::TowerUpgradeRejected { .. }
                | Event::TowerSaleRejected { .. } => self.rejected_commands += 1,
                Event::GameOver { won } => self.outcome = Some(*won),
                _ => {}
            }
        }
    }

    pub(crate) fn log_summary(&self) {
        let outcome = match self.outcome {
            Some(true) => "won",
            Some(false) => "lost",
            None => "unfinished",
        };
        info!(
            outcome,
            frames = self.frames,
            wave = self.stats.wave,
            total_waves = self.stats.total_waves,
            waves_completed = self.waves_completed,
            money = self.stats.money,
            lives = self.stats.lives,
            towers_placed = self.towers_placed,
            kills = self.kills,
            leaks = self.leaks,
            rejected_commands = self.rejected_commands,
            "session summary"
        );
    }
}

/// Notification text stamped with the game clock it appeared at.
#[derive(Clone, Debug)]
struct Notice {
    text: String,
    shown_at: Duration,
}

impl Notice {
    fn visible_at(&self, now: Duration) -> bool {
        now.checked_sub(self.shown_at)
            .is_some_and(|age| age < MESSAGE_DURATION)
    }
}

/// Owns the world and the builder, advancing both once per frame.
#[derive(Debug)]
pub(crate) struct Controller {
    world: World,
    ground: GroundPresentation,
    builder: Builder,
    events: Vec<Event>,
    commands: Vec<Command>,
    notice: Option<Notice>,
    report: Rc<RefCell<SessionReport>>,
}

impl Controller {
    pub(crate) fn new(world: World, ground: GroundPresentation) -> Self {
        Self {
            world,
            ground,
            builder: Builder::new(),
            events: Vec::new(),
            commands: Vec::new(),
            notice: None,
            report: Rc::new(RefCell::new(SessionReport::default())),
        }
    }

    /// Shared handle to the report, readable after the controller moved into a backend.
    pub(crate) fn report(&self) -> Rc<RefCell<SessionReport>> {
        Rc::clone(&self.report)
    }

    pub(crate) fn start(
        &mut self,
        hero: Hero,
        difficulty: Difficulty,
        autonomous: bool,
        time_scale: f32,
    ) {
        self.commands.push(Command::SetTimeScale { factor: time_scale });
        self.commands.push(Command::StartSession {
            hero,
            difficulty,
            autonomous,
        });
        self.flush();
    }

    /// Advances one frame and refreshes `scene`; returns `false` once the session is over.
    pub(crate) fn frame(&mut self, dt: Duration, input: FrameInput, scene: &mut Scene) -> bool {
        let cursor = input.cursor_cell(query::catalog(&self.world).arena.tile_size);
        self.route_input(&input, cursor);
        self.commands.push(Command::Tick { dt });
        self.flush();
        self.report.borrow_mut().frames += 1;

        *scene = self.scene(cursor);
        !query::session_phase(&self.world).is_over()
    }

    fn route_input(&mut self, input: &FrameInput, cursor: Option<GridCell>) {
        let world = &self.world;
        self.builder.handle(
            &self.events,
            BuilderInput {
                arm: input.arm,
                cancel: input.cancel_action,
                confirm: input.confirm_action,
                cursor_cell: cursor,
            },
            |cell| query::tower_at(world, cell),
            &mut self.commands,
        );

        if input.start_wave {
            self.commands.push(Command::StartWave);
        }
        if input.activate_ability {
            self.commands.push(Command::ActivateHeroAbility);
        }
        if let Some(tower) = query::selected_tower(&self.world).map(|tower| tower.id) {
            if input.upgrade_selected {
                self.commands.push(Command::UpgradeTower { tower });
            }
            if input.sell_selected {
                self.commands.push(Command::SellTower { tower });
            }
        }
    }

    fn flush(&mut self) {
        self.events.clear();
        for command in self.commands.drain(..) {
            apply(&mut self.world, command, &mut self.events);
        }
        self.report.borrow_mut().record(&self.events);

        let now = query::clock(&self.world);
        for event in &self.events {
            if let Event::Message { text } = event {
                info!(%text, "notification");
                self.notice = Some(Notice {
                    text: text.clone(),
                    shown_at: now,
                });
            }
        }
    }

    /// Scene for the current world state, with a ghost under `cursor` while a kind is armed.
    pub(crate) fn scene(&self, cursor: Option<GridCell>) -> Scene {
        let world = &self.world;
        let enemies = query::enemy_view(world);
        let towers = query::tower_view(world);
        let projectiles = query::projectile_view(world);
        let preview = self
            .builder
            .armed()
            .zip(cursor)
            .map(|(kind, cell)| query::placement_preview(world, kind, cell));

        let mut scene = Scene::from_sources(
            self.ground,
            SceneSources {
                catalog: query::catalog(world),
                enemies: &enemies,
                towers: &towers,
                projectiles: &projectiles,
                stats: query::stats(world),
                phase: query::session_phase(world),
                selected: query::selected_tower(world).map(|tower| tower.id),
                preview,
            },
        );
        scene.hud.message = self
            .notice
            .as_ref()
            .filter(|notice| notice.visible_at(query::clock(world)))
            .map(|notice| notice.text.clone());
        scene
    }
}
