#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Pure builder-mode system responsible for emitting placement and selection commands.

use voxel_defence_core::{Command, Event, GridCell, TowerId, TowerKind};

/// Input snapshot distilled from adapter-provided frame input data.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct BuilderInput {
    /// Tower kind whose build button was pressed on this frame.
    pub arm: Option<TowerKind>,
    /// Indicates whether the player cancelled the current mode on this frame.
    pub cancel: bool,
    /// Indicates whether the player clicked the ground on this frame.
    pub confirm: bool,
    /// Cell currently hovered by the cursor.
    pub cursor_cell: Option<GridCell>,
}

/// Builder-mode system that translates input into placement and selection commands.
#[derive(Debug, Clone, Default)]
pub struct Builder {
    armed: Option<TowerKind>,
}

impl Builder {
    /// Creates a new builder with no tower kind armed.
    #[must_use]
    pub const fn new() -> Self {
        Self { armed: None }
    }

    /// Tower kind placed by the next confirm, if any.
    #[must_use]
    pub const fn armed(&self) -> Option<TowerKind> {
        self.armed
    }

    /// Consumes world events and adapter-derived input to emit builder commands.
    ///
    /// The `tower_at` closure should mirror the semantics of the world's
    /// `query::tower_at` helper so the system can identify the clicked tower.
    pub fn handle<F>(
        &mut self,
        events: &[Event],
        input: BuilderInput,
        mut tower_at: F,
        out: &mut Vec<Command>,
    ) where
        F: FnMut(GridCell) -> Option<TowerId>,
    {
        for event in events {
            if matches!(event, Event::SessionReset | Event::GameOver { .. }) {
                self.armed = None;
            }
        }

        if let Some(kind) = input.arm {
            self.armed = if self.armed == Some(kind) {
                None
            } else {
                Some(kind)
            };
        }

        if input.cancel {
            self.armed = None;
            out.push(Command::ClearSelection);
            return;
        }

        if !input.confirm {
            return;
        }

        let Some(cell) = input.cursor_cell else {
            return;
        };

        match self.armed {
            Some(kind) => out.push(Command::PlaceTower { kind, cell }),
            None => match tower_at(cell) {
                Some(tower) => out.push(Command::SelectTower { tower }),
                None => out.push(Command::ClearSelection),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn arming_same_kind_twice_toggles_off() {
        let mut builder = Builder::new();
        let mut out = Vec::new();
        let arm = BuilderInput {
            arm: Some(TowerKind::Sniper),
            ..BuilderInput::default()
        };

        builder.handle(&[], arm, |_| None, &mut out);
        assert_eq!(builder.armed(), Some(TowerKind::Sniper));

        builder.handle(&[], arm, |_| None, &mut out);
        assert_eq!(builder.armed(), None);
        assert!(out.is_empty());
    }

    #[test]
    fn arming_other_kind_switches() {
        let mut builder = Builder::new();
        let mut out = Vec::new();

        for kind in [TowerKind::Basic, TowerKind::Rapid] {
            builder.handle(
                &[],
                BuilderInput {
                    arm: Some(kind),
                    ..BuilderInput::default()
                },
                |_| None,
                &mut out,
            );
        }

        assert_eq!(builder.armed(), Some(TowerKind::Rapid));
    }
}
