use serde::{Deserialize, Serialize};

use crate::processing::surface::{SliceAxis, Surface};
use crate::sensor::capture::CaptureSession;
use crate::state::preferences::Preferences;
use crate::state::profile::Scan;
use crate::state::sync::CompareLink;
use crate::state::viewer_state::{ViewerOptions, ViewerState};

pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Page {
    #[default]
    Captured,
    Compare,
    Slice,
    Live,
}

impl Page {
    pub const ALL: [Page; 4] = [Page::Captured, Page::Compare, Page::Slice, Page::Live];

    pub fn label(&self) -> &'static str {
        match self {
            Page::Captured => "Captured Data",
            Page::Compare => "Compare",
            Page::Slice => "Slice",
            Page::Live => "Live Sensor",
        }
    }
}

/// Which cut of the surface the slice page shows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SliceSelection {
    pub axis: SliceAxis,
    pub x: usize,
    pub y: usize,
    pub show: bool,
}

/// Everything the pages own. Each viewer belongs to exactly one page.
#[derive(Debug)]
pub struct AppState {
    pub page: Page,
    pub captured: ViewerState,
    pub compare_left: ViewerState,
    pub compare_right: ViewerState,
    pub compare_link: CompareLink,
    pub slice_viewer: ViewerState,
    pub live_viewer: ViewerState,
    pub capture: CaptureSession,
    surface: Surface,
    surface_revision: u64,
    slice: SliceSelection,
}

impl AppState {
    pub fn new() -> Self {
        let display_only = ViewerOptions {
            with_file_loader: false,
            with_measurement_display: true,
        };
        Self {
            page: Page::default(),
            captured: ViewerState::new("Captured Data", ViewerOptions::default()),
            compare_left: ViewerState::new("Left", ViewerOptions::default()),
            compare_right: ViewerState::new("Right", ViewerOptions::default()),
            compare_link: CompareLink::default(),
            slice_viewer: ViewerState::new("Slice", display_only),
            live_viewer: ViewerState::new("Live Profile", display_only),
            capture: CaptureSession::default(),
            surface: Surface::default(),
            surface_revision: 0,
            slice: SliceSelection::default(),
        }
    }

    pub fn from_preferences(prefs: &Preferences) -> Self {
        let mut state = Self::new();
        state.page = prefs.page;
        state.slice = SliceSelection {
            axis: prefs.active_slice,
            x: prefs.slice_x,
            y: prefs.slice_y,
            show: prefs.show_slice,
        };
        state
    }

    /// Copy the page and slice selection back for persistence.
    pub fn store_preferences(&self, prefs: &mut Preferences) {
        prefs.page = self.page;
        prefs.active_slice = self.slice.axis;
        prefs.slice_x = self.slice.x;
        prefs.slice_y = self.slice.y;
        prefs.show_slice = self.slice.show;
    }

    /// Per-frame bookkeeping: mirror the compare pair and discard commands
    /// recorded by viewers that have no link.
    pub fn end_frame(&mut self) {
        self.compare_link
            .pump(&mut self.compare_left, &mut self.compare_right);
        self.captured.drain_commands();
        self.slice_viewer.drain_commands();
        self.live_viewer.drain_commands();
    }

    pub fn surface(&self) -> &Surface {
        &self.surface
    }

    /// Bumped whenever the surface is replaced or cleared.
    pub fn surface_revision(&self) -> u64 {
        self.surface_revision
    }

    pub fn slice(&self) -> SliceSelection {
        self.slice
    }

    pub fn set_surface(&mut self, surface: Surface) {
        let (x, y) = surface.clamp_slice_indices(self.slice.x, self.slice.y);
        self.slice.x = x;
        self.slice.y = y;
        self.surface = surface;
        self.surface_revision += 1;
        self.refresh_slice_viewer();
    }

    pub fn set_slice(&mut self, selection: SliceSelection) {
        if selection != self.slice {
            self.slice = selection;
            self.refresh_slice_viewer();
        }
    }

    /// Empty the surface and forget the slice selection.
    pub fn clear_surface(&mut self) {
        self.surface = Surface::default();
        self.surface_revision += 1;
        self.slice = SliceSelection::default();
        self.refresh_slice_viewer();
    }

    /// Largest valid X and Y slice index, or `None` without a surface.
    pub fn slice_bounds(&self) -> Option<(usize, usize)> {
        if self.surface.is_empty() {
            return None;
        }
        Some((
            self.surface.col_count().saturating_sub(1),
            self.surface.row_count() - 1,
        ))
    }

    fn refresh_slice_viewer(&mut self) {
        if self.slice.show && !self.surface.is_empty() {
            let z = self.surface.slice(self.slice.axis, self.slice.x, self.slice.y);
            self.slice_viewer.set_scans(vec![Scan::new(0.0, z)]);
        } else {
            self.slice_viewer.clear();
        }
        self.slice_viewer.reset_view();
    }

    /// Show a freshly polled profile and record it if a capture is running.
    pub fn receive_live_profile(&mut self, z: Vec<f64>, now_ms: f64, sample_interval_ms: u64) {
        self.capture.offer(&z, now_ms, sample_interval_ms);
        self.live_viewer.update_profile(Scan::new(now_ms, z));
    }

    /// Hand the recorded capture to the captured-data page.
    pub fn send_capture_to_captured(&mut self) -> bool {
        if self.capture.scans().is_empty() {
            return false;
        }
        self.captured.set_scans(self.capture.scans().to_vec());
        self.captured.reset_view();
        true
    }
}

impl Default for AppState {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn surface() -> Surface {
        Surface::new(vec![vec![1.0, 2.0, 3.0, 4.0], vec![5.0, 6.0, 7.0, 8.0]])
    }

    #[test]
    fn hidden_slice_leaves_viewer_empty() {
        let mut state = AppState::new();
        state.set_surface(surface());
        assert!(!state.slice_viewer.has_data());
    }

    #[test]
    fn slice_changes_feed_the_viewer_and_reset_it() {
        let mut state = AppState::new();
        state.set_surface(surface());
        state.set_slice(SliceSelection { show: true, x: 2, ..state.slice() });
        assert_eq!(state.slice_viewer.scans()[0].z, vec![3.0, 7.0]);

        state.slice_viewer.handle_pointer(crate::PointerEvent::Wheel { x: 300.0, delta_y: 1.0 });
        state.set_slice(SliceSelection { axis: SliceAxis::Y, y: 1, ..state.slice() });
        assert_eq!(state.slice_viewer.scans()[0].z, vec![5.0, 6.0, 7.0, 8.0]);
        assert_eq!(state.slice_viewer.window().zoom, 1);
        assert_eq!(state.slice_viewer.window().pan, 0);
    }

    #[test]
    fn loading_clamps_stale_slice_indices() {
        let prefs = Preferences {
            slice_x: 40,
            slice_y: 9,
            show_slice: true,
            ..Preferences::default()
        };
        let mut state = AppState::from_preferences(&prefs);
        state.set_surface(surface());
        assert_eq!((state.slice().x, state.slice().y), (1, 0));
        assert_eq!(state.slice_bounds(), Some((3, 1)));

        state.clear_surface();
        assert_eq!(state.slice(), SliceSelection::default());
        assert!(state.slice_bounds().is_none());
    }

    #[test]
    fn live_profiles_are_captured_then_forwarded() {
        let mut state = AppState::new();
        state.receive_live_profile(vec![1.0, 2.0], 0.0, 10);
        assert!(state.capture.scans().is_empty());
        assert!(!state.send_capture_to_captured());

        state.capture.start();
        state.receive_live_profile(vec![1.0, 2.0], 100.0, 10);
        state.receive_live_profile(vec![3.0, 4.0], 105.0, 10);
        state.receive_live_profile(vec![5.0, 6.0], 120.0, 10);
        assert_eq!(state.capture.scans().len(), 2);
        assert_eq!(state.live_viewer.scans()[0].z, vec![5.0, 6.0]);

        assert!(state.send_capture_to_captured());
        assert_eq!(state.captured.scans().len(), 2);
    }

    #[test]
    fn preferences_round_trip_page_and_slice() {
        let mut state = AppState::new();
        state.page = Page::Slice;
        state.set_slice(SliceSelection { axis: SliceAxis::Y, x: 0, y: 3, show: true });
        let mut prefs = Preferences::default();
        state.store_preferences(&mut prefs);
        assert_eq!(prefs.page, Page::Slice);
        let restored = AppState::from_preferences(&prefs);
        assert_eq!(restored.slice(), state.slice());
    }
}
