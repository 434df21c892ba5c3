use crate::render::view_window::{keep_handles_visible, PlotFrame, ScreenMapping, ViewWindow, ZAxis};
use crate::state::measurement::MeasurementController;
use crate::state::profile::ShiftedProfile;

/// How close (in canvas pixels) the pointer must be to a ruler line to grab it.
pub const HANDLE_GRAB_PX: f64 = 5.0;

/// The single drag gesture in progress, if any.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum DragSession {
    #[default]
    Idle,
    /// Dragging ruler vertical line 0 (A) or 1 (B).
    VerticalHandle(usize),
    /// Dragging ruler horizontal line 0 (A) or 1 (B).
    HorizontalHandle(usize),
    Pan { start_x: f64, start_pan: usize },
}

impl DragSession {
    pub fn is_active(&self) -> bool {
        !matches!(self, DragSession::Idle)
    }
}

/// Pointer input in canvas coordinates (origin at the canvas' top-left).
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PointerEvent {
    Press { x: f64, y: f64 },
    Move { x: f64, y: f64 },
    Release,
    Leave,
    /// Positive `delta_y` scrolls up, which zooms in.
    Wheel { x: f64, delta_y: f64 },
    Click { x: f64, y: f64 },
}

/// What sits under the pointer when a drag starts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HitTarget {
    VerticalHandle(usize),
    HorizontalHandle(usize),
    Background,
}

/// Which parts of the viewer an event touched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct InputEffects {
    pub window: bool,
    pub ruler_indices: bool,
    pub ruler_levels: bool,
    pub clicked: bool,
}

impl InputEffects {
    pub fn any(&self) -> bool {
        self.window || self.ruler_indices || self.ruler_levels || self.clicked
    }
}

/// Mutable view of everything an event may change.
pub struct InteractionTarget<'a> {
    pub profile: &'a ShiftedProfile,
    pub window: &'a mut ViewWindow,
    pub controller: &'a mut MeasurementController,
    pub frame: PlotFrame,
}

impl InteractionTarget<'_> {
    fn mapping(&self) -> ScreenMapping {
        ScreenMapping::new(
            self.frame,
            self.window.span(self.profile.len()),
            ZAxis::for_profile(self.profile),
        )
    }
}

/// Turns pointer events into window and measurement updates.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct InputStateMachine {
    session: DragSession,
}

impl InputStateMachine {
    pub fn session(&self) -> DragSession {
        self.session
    }

    pub fn cancel(&mut self) {
        self.session = DragSession::Idle;
    }

    /// Topmost primitive under the pointer. Horizontal lines are drawn over
    /// vertical ones and B over A, so they are tested in that order.
    pub fn hit_test(target: &InteractionTarget<'_>, x: f64, y: f64) -> HitTarget {
        if !target.controller.is_ruler() {
            return HitTarget::Background;
        }
        let map = target.mapping();
        let ruler = target.controller.ruler();
        let frame = target.frame;

        if x >= frame.left() - HANDLE_GRAB_PX && x <= frame.right() + HANDLE_GRAB_PX {
            for which in [1, 0] {
                let hy = map.z_to_screen_y(ruler.levels[which]);
                if (y - hy).abs() <= HANDLE_GRAB_PX {
                    return HitTarget::HorizontalHandle(which);
                }
            }
        }
        for which in [1, 0] {
            let idx = ruler.indices[which];
            if !map.span.contains(idx) {
                continue;
            }
            let hx = map.index_to_screen_x(idx as f64);
            if (x - hx).abs() <= HANDLE_GRAB_PX {
                return HitTarget::VerticalHandle(which);
            }
        }
        HitTarget::Background
    }

    pub fn handle(&mut self, event: PointerEvent, target: &mut InteractionTarget<'_>) -> InputEffects {
        let n = target.profile.len();
        let mut effects = InputEffects::default();
        if n == 0 {
            self.session = DragSession::Idle;
            return effects;
        }

        match event {
            PointerEvent::Press { x, y } => {
                self.session = match Self::hit_test(target, x, y) {
                    HitTarget::VerticalHandle(which) => DragSession::VerticalHandle(which),
                    HitTarget::HorizontalHandle(which) => DragSession::HorizontalHandle(which),
                    HitTarget::Background if target.controller.is_ruler() => DragSession::Idle,
                    HitTarget::Background => DragSession::Pan {
                        start_x: x,
                        start_pan: target.window.span(n).start,
                    },
                };
            }
            PointerEvent::Move { x, y } => match self.session {
                DragSession::Idle => {}
                DragSession::VerticalHandle(which) => {
                    let idx = target.mapping().screen_x_to_index(x);
                    let ruler = target.controller.ruler_mut();
                    if ruler.indices[which] != idx {
                        ruler.indices[which] = idx;
                        effects.ruler_indices = true;
                    }
                }
                DragSession::HorizontalHandle(which) => {
                    let z = target.mapping().screen_y_to_z(y);
                    let ruler = target.controller.ruler_mut();
                    if ruler.levels[which] != z {
                        ruler.levels[which] = z;
                        effects.ruler_levels = true;
                    }
                }
                DragSession::Pan { start_x, start_pan } => {
                    let denom = target.mapping().step_denominator();
                    let shift = ((x - start_x) / denom).round();
                    let shift = if shift.is_finite() { shift as i64 } else { 0 };
                    let before = target.window.pan;
                    target.window.set_pan(n, start_pan as i64 - shift);
                    effects.window = target.window.pan != before;
                }
            },
            PointerEvent::Release | PointerEvent::Leave => {
                self.session = DragSession::Idle;
            }
            PointerEvent::Wheel { x, delta_y } => {
                let step = if delta_y > 0.0 {
                    1
                } else if delta_y < 0.0 {
                    -1
                } else {
                    return effects;
                };
                let frac = target.mapping().width_fraction(x);
                let zoom = target.window.zoom as i64 + step;
                if target.window.zoom_at(n, zoom, frac) {
                    effects.window = true;
                    if target.controller.is_ruler() {
                        let span = target.window.span(n);
                        let pan = keep_handles_visible(
                            span.start,
                            span.len,
                            n,
                            target.controller.ruler().indices,
                        );
                        target.window.set_pan(n, pan as i64);
                    }
                }
            }
            PointerEvent::Click { x, .. } => {
                if target.controller.is_point() {
                    let idx = target.mapping().screen_x_to_index(x);
                    let z = target.profile.display_value(idx);
                    effects.clicked = target.controller.record_click(idx, z);
                }
            }
        }
        effects
    }
}
