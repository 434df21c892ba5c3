use crate::render::view_window::ViewWindow;
use crate::state::measurement::MeasureMode;
use crate::state::viewer_state::ViewerState;

/// A local change on one viewer that a linked viewer may replay.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ViewerCommand {
    SelectScan(usize),
    SetWindow(ViewWindow),
    SetMode(MeasureMode),
    SetRulerIndices([usize; 2]),
    SetRulerLevels([f64; 2]),
}

/// Mirrors changes between the two compare viewers while locked.
///
/// Each viewer records its own writes in an outbox; [`CompareLink::pump`]
/// drains both outboxes every frame and, when locked, replays each command
/// on the opposite viewer. Replayed commands are not re-recorded, so there
/// is no echo.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CompareLink {
    locked: bool,
}

impl CompareLink {
    pub fn is_locked(&self) -> bool {
        self.locked
    }

    pub fn set_locked(&mut self, locked: bool) {
        if self.locked != locked {
            tracing::info!(locked, "compare lock changed");
        }
        self.locked = locked;
    }

    pub fn toggle(&mut self) {
        self.set_locked(!self.locked);
    }

    /// Returns the number of commands replayed.
    pub fn pump(&self, left: &mut ViewerState, right: &mut ViewerState) -> usize {
        let from_left = left.drain_commands();
        let from_right = right.drain_commands();
        if !self.locked {
            return 0;
        }
        for cmd in &from_left {
            right.apply_remote(*cmd);
        }
        for cmd in &from_right {
            left.apply_remote(*cmd);
        }
        from_left.len() + from_right.len()
    }
}
