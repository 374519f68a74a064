#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Command-line adapter that plays Voxel Defence sessions headlessly.

mod controller;
mod headless;

use std::{
    fs,
    path::{Path, PathBuf},
};

use anyhow::{Context, Result};
use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;
use voxel_defence_core::{sanitize_frame_delta, Catalog, Difficulty, Hero};
use voxel_defence_rendering::{Color, GroundPresentation, Presentation, RenderingBackend};
use voxel_defence_world::{query, World};

use crate::{controller::Controller, headless::HeadlessBackend};

/// Runs a Voxel Defence session without a window.
#[derive(Debug, Parser)]
#[command(name = "voxel-defence", version, about)]
struct CliArgs {
    /// Hero whose ability is available during the session.
    #[arg(long, default_value = "warrior")]
    hero: Hero,
    /// Difficulty applied to every spawned enemy.
    #[arg(long, default_value = "easy")]
    difficulty: Difficulty,
    /// Lets the autopilot start waves and place towers.
    #[arg(long)]
    autonomous: bool,
    /// Host time to simulate, in seconds.
    #[arg(long, default_value_t = 300)]
    seconds: u64,
    /// Host frame delta, in milliseconds.
    #[arg(
        long = "frame-ms",
        default_value_t = 16,
        value_parser = clap::value_parser!(u64).range(1..=100)
    )]
    frame_ms: u64,
    /// Factor applied to every frame delta.
    #[arg(long = "time-scale", default_value_t = 1.0)]
    time_scale: f32,
    /// Seed driving the autopilot's random choices.
    #[arg(long, default_value_t = 1)]
    seed: u64,
    /// TOML file replacing the standard catalog.
    #[arg(long)]
    catalog: Option<PathBuf>,
}

/// Entry point for the Voxel Defence command-line interface.
fn main() -> Result<()> {
    init_tracing();
    let args = CliArgs::parse();

    let catalog = match &args.catalog {
        Some(path) => load_catalog(path)?,
        None => Catalog::standard(),
    };
    let world = World::with_catalog(catalog, args.seed).context("catalog failed validation")?;
    let ground = GroundPresentation::for_catalog(query::catalog(&world))
        .context("catalog cannot be laid out")?;

    let frame_dt = sanitize_frame_delta(args.frame_ms as f64 / 1_000.0);
    let frames = args.seconds.saturating_mul(1_000) / args.frame_ms;

    let mut controller = Controller::new(world, ground);
    controller.start(args.hero, args.difficulty, args.autonomous, args.time_scale);
    let report = controller.report();
    let presentation = Presentation::new(
        "Voxel Defence",
        Color::from_rgb_u8(0x87, 0xce, 0xeb),
        controller.scene(None),
    );

    info!(frames, frame_ms = args.frame_ms, "running headless session");
    HeadlessBackend::new(frame_dt, frames).run(presentation, move |dt, input, scene| {
        controller.frame(dt, input, scene)
    })?;

    report.borrow().log_summary();
    Ok(())
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();
}

fn load_catalog(path: &Path) -> Result<Catalog> {
    let text = fs::read_to_string(path)
        .with_context(|| format!("failed to read catalog {}", path.display()))?;
    parse_catalog(&text).with_context(|| format!("invalid catalog {}", path.display()))
}

fn parse_catalog(text: &str) -> Result<Catalog> {
    let catalog: Catalog = toml::from_str(text).context("catalog is not valid TOML")?;
    catalog.validate()?;
    Ok(catalog)
}
