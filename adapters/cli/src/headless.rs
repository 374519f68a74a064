//! Rendering backend that steps scenes without opening a window.

use std::time::Duration;

use anyhow::Result as AnyResult;
use tracing::debug;
use voxel_defence_rendering::{FrameInput, Presentation, RenderingBackend, Scene};

/// Backend that feeds a fixed frame delta and no input for a bounded number of frames.
#[derive(Clone, Copy, Debug)]
pub(crate) struct HeadlessBackend {
    frame_dt: Duration,
    frames: u64,
}

impl HeadlessBackend {
    pub(crate) fn new(frame_dt: Duration, frames: u64) -> Self {
        Self { frame_dt, frames }
    }
}

impl RenderingBackend for HeadlessBackend {
    fn run<F>(self, presentation: Presentation, mut update_scene: F) -> AnyResult<()>
    where
        F: FnMut(Duration, FrameInput, &mut Scene) -> bool + 'static,
    {
        let Presentation {
            window_title,
            mut scene,
            ..
        } = presentation;
        debug!(title = %window_title, frames = self.frames, "headless backend started");

        for frame in 0..self.frames {
            if !update_scene(self.frame_dt, FrameInput::default(), &mut scene) {
                debug!(frame, "session over, stopping early");
                break;
            }
        }

        debug!(
            enemies = scene.enemies.len(),
            towers = scene.towers.len(),
            projectiles = scene.projectiles.len(),
            "headless backend stopped"
        );
        Ok(())
    }
}
