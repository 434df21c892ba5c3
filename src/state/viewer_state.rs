use std::sync::atomic::{AtomicU64, Ordering};

use serde::{Deserialize, Serialize};

use crate::processing::metrics::Readout;
use crate::render::plot_interaction::{DragSession, InputEffects, InputStateMachine, InteractionTarget, PointerEvent};
use crate::render::primitives::RenderScene;
use crate::render::view_window::{PlotFrame, ViewWindow, ZAxis};
use crate::state::measurement::{MeasureMode, MeasurementController};
use crate::state::profile::{Scan, ShiftedProfile};
use crate::state::sync::ViewerCommand;

static NEXT_VIEWER_ID: AtomicU64 = AtomicU64::new(1);

fn next_viewer_id() -> u64 {
    NEXT_VIEWER_ID.fetch_add(1, Ordering::Relaxed)
}

/// Per-viewer feature switches chosen by the hosting page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ViewerOptions {
    /// Show the "Load Data" button.
    pub with_file_loader: bool,
    /// Show path distance and Z range rows for the ruler.
    pub with_measurement_display: bool,
}

impl Default for ViewerOptions {
    fn default() -> Self {
        Self {
            with_file_loader: true,
            with_measurement_display: true,
        }
    }
}

/// One profile display: its scans, view window, measurement tools and drag
/// gesture. Owned by exactly one page and only changed through its methods.
#[derive(Debug, Clone)]
pub struct ViewerState {
    pub id: u64,
    pub title: String,
    pub options: ViewerOptions,
    pub frame: PlotFrame,
    scans: Vec<Scan>,
    current: usize,
    profile: ShiftedProfile,
    window: ViewWindow,
    controller: MeasurementController,
    input: InputStateMachine,
    outbox: Vec<ViewerCommand>,
}

impl ViewerState {
    pub fn new(title: impl Into<String>, options: ViewerOptions) -> Self {
        Self {
            id: next_viewer_id(),
            title: title.into(),
            options,
            frame: PlotFrame::default(),
            scans: Vec::new(),
            current: 0,
            profile: ShiftedProfile::default(),
            window: ViewWindow::default(),
            controller: MeasurementController::default(),
            input: InputStateMachine::default(),
            outbox: Vec::new(),
        }
    }

    pub fn scans(&self) -> &[Scan] {
        &self.scans
    }

    pub fn current(&self) -> usize {
        self.current
    }

    pub fn current_scan(&self) -> Option<&Scan> {
        self.scans.get(self.current)
    }

    pub fn profile(&self) -> &ShiftedProfile {
        &self.profile
    }

    pub fn has_data(&self) -> bool {
        !self.profile.is_empty()
    }

    pub fn window(&self) -> ViewWindow {
        self.window
    }

    pub fn controller(&self) -> &MeasurementController {
        &self.controller
    }

    pub fn mode(&self) -> MeasureMode {
        self.controller.mode()
    }

    pub fn drag_session(&self) -> DragSession {
        self.input.session()
    }

    pub fn z_axis(&self) -> ZAxis {
        ZAxis::for_profile(&self.profile)
    }

    /// Replace the whole scan set (a file load) and show the first scan.
    pub fn set_scans(&mut self, scans: Vec<Scan>) {
        tracing::debug!(viewer = self.id, count = scans.len(), "scan set replaced");
        self.scans = scans;
        self.current = 0;
        self.swap_profile(false);
    }

    /// Replace the displayed profile in place, keeping zoom, pan, the
    /// measurement tools and any drag in progress. Used for streaming sources.
    pub fn update_profile(&mut self, scan: Scan) {
        self.scans = vec![scan];
        self.current = 0;
        self.swap_profile(true);
    }

    pub fn clear(&mut self) {
        self.set_scans(Vec::new());
    }

    /// Back to zoom 1, pan 0, first scan.
    pub fn reset_view(&mut self) {
        self.window.reset();
        if self.current != 0 {
            self.current = 0;
            self.swap_profile(false);
        }
    }

    pub fn select_scan(&mut self, idx: usize) {
        if self.select_scan_local(idx) {
            self.outbox.push(ViewerCommand::SelectScan(self.current));
        }
    }

    fn select_scan_local(&mut self, idx: usize) -> bool {
        let idx = idx.min(self.scans.len().saturating_sub(1));
        if idx == self.current {
            return false;
        }
        self.current = idx;
        self.swap_profile(false);
        true
    }

    pub fn set_window(&mut self, window: ViewWindow) {
        let window = ViewWindow::new(window.zoom, window.pan);
        if window != self.window {
            self.window = window;
            self.outbox.push(ViewerCommand::SetWindow(window));
        }
    }

    pub fn toggle_ruler(&mut self) {
        let axis = self.z_axis();
        let before = self.controller.mode();
        self.controller.toggle_ruler(self.profile.len(), &axis);
        self.after_mode_change(before);
    }

    pub fn toggle_point(&mut self) {
        let before = self.controller.mode();
        self.controller.toggle_point(self.profile.len());
        self.after_mode_change(before);
    }

    pub fn disable_measurement(&mut self) {
        let before = self.controller.mode();
        self.controller.disable();
        self.after_mode_change(before);
    }

    fn after_mode_change(&mut self, before: MeasureMode) {
        let mode = self.controller.mode();
        if mode == before {
            return;
        }
        self.input.cancel();
        self.outbox.push(ViewerCommand::SetMode(mode));
        if mode == MeasureMode::Ruler {
            // Enabling may have respread the levels.
            self.outbox
                .push(ViewerCommand::SetRulerLevels(self.controller.ruler().levels));
        }
    }

    /// Feed one pointer event through the input state machine.
    pub fn handle_pointer(&mut self, event: PointerEvent) -> InputEffects {
        let mut target = InteractionTarget {
            profile: &self.profile,
            window: &mut self.window,
            controller: &mut self.controller,
            frame: self.frame,
        };
        let effects = self.input.handle(event, &mut target);

        if effects.window {
            self.outbox.push(ViewerCommand::SetWindow(self.window));
        }
        if effects.ruler_indices {
            self.outbox
                .push(ViewerCommand::SetRulerIndices(self.controller.ruler().indices));
        }
        if effects.ruler_levels {
            self.outbox
                .push(ViewerCommand::SetRulerLevels(self.controller.ruler().levels));
        }
        effects
    }

    /// Replay a command recorded by a linked viewer. Nothing is re-recorded.
    pub fn apply_remote(&mut self, cmd: ViewerCommand) {
        match cmd {
            ViewerCommand::SelectScan(idx) => {
                self.select_scan_local(idx);
            }
            ViewerCommand::SetWindow(window) => {
                self.window = ViewWindow::new(window.zoom, window.pan);
            }
            ViewerCommand::SetMode(mode) => {
                let axis = self.z_axis();
                if self.controller.set_mode(mode, self.profile.len(), &axis) {
                    self.input.cancel();
                }
            }
            ViewerCommand::SetRulerIndices(indices) => {
                let ruler = self.controller.ruler_mut();
                ruler.indices = indices;
                ruler.clamp_indices(self.profile.len());
            }
            ViewerCommand::SetRulerLevels(levels) => {
                let axis = self.z_axis();
                self.controller.ruler_mut().levels = levels.map(|z| axis.clamp(z));
            }
        }
    }

    /// Take everything recorded since the last call.
    pub fn drain_commands(&mut self) -> Vec<ViewerCommand> {
        std::mem::take(&mut self.outbox)
    }

    pub fn readout(&self) -> Readout {
        Readout::compute(&self.profile, &self.window, &self.controller)
    }

    pub fn scene(&self) -> RenderScene {
        RenderScene::build(&self.profile, &self.window, &self.controller, self.frame)
    }

    /// "Scan 3 / 10" plus the formatted timestamp when there is one.
    pub fn scan_label(&self) -> Option<String> {
        let scan = self.current_scan()?;
        let mut label = format!("Scan {} / {}", self.current + 1, self.scans.len());
        if let Some(ts) = crate::data::datetime::format_timestamp_ms(scan.timestamp) {
            label.push_str(" - ");
            label.push_str(&ts);
        }
        Some(label)
    }

    /// Recompute the shifted profile and pull existing state into the new
    /// bounds. A drag survives only when `keep_drag` is set and there is
    /// still something to drag over.
    fn swap_profile(&mut self, keep_drag: bool) {
        let raw = self.scans.get(self.current).map(|s| s.z.as_slice()).unwrap_or(&[]);
        self.profile = ShiftedProfile::from_samples(raw);
        let n = self.profile.len();

        if !keep_drag || n == 0 {
            self.input.cancel();
        }
        self.controller.ruler_mut().clamp_indices(n);
        if n == 0 {
            self.controller.disable();
            return;
        }
        let axis = self.z_axis();
        if self.controller.is_ruler() && self.controller.ruler().levels_need_reset(&axis) {
            self.controller.ruler_mut().reset_levels(&axis);
        }
        let profile = &self.profile;
        self.controller
            .points_mut()
            .reconcile(n, |i| profile.display_value(i));
    }
}
