//! Drawing-agnostic description of one viewer frame.
//!
//! [`RenderScene::build`] turns the viewer's state into lines, points and
//! labelled ticks in canvas coordinates; the egui layer only paints them.

use crate::render::view_window::{PlotFrame, ScreenMapping, ViewWindow, ZAxis};
use crate::state::measurement::MeasurementController;
use crate::state::profile::ShiftedProfile;

/// Spacing of the X axis ticks in millimetres.
pub const X_TICK_EVERY_MM: f64 = 20.0;
/// Number of Z axis ticks, both ends included.
pub const Z_TICK_COUNT: usize = 5;
pub const MARKER_RADIUS: f64 = 5.0;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScreenPoint {
    pub x: f64,
    pub y: f64,
}

impl ScreenPoint {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// A labelled axis tick. `pos` is the canvas x for X ticks and the canvas y
/// for Z ticks.
#[derive(Debug, Clone, PartialEq)]
pub struct Tick {
    pub pos: f64,
    pub value: f64,
    pub label: String,
}

/// Ruler line ready to draw. `which` is 0 for A and 1 for B.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HandleLine {
    pub which: usize,
    pub from: ScreenPoint,
    pub to: ScreenPoint,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Marker {
    pub which: usize,
    pub center: ScreenPoint,
    pub radius: f64,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct RenderScene {
    pub frame: PlotFrame,
    pub x_ticks: Vec<Tick>,
    pub z_ticks: Vec<Tick>,
    /// Visible samples, left to right.
    pub polyline: Vec<ScreenPoint>,
    pub vertical_handles: Vec<HandleLine>,
    pub horizontal_handles: Vec<HandleLine>,
    pub markers: Vec<Marker>,
    /// Straight line between the two clicked points.
    pub chord: Option<(ScreenPoint, ScreenPoint)>,
    /// Profile samples between the two clicked points.
    pub curve_overlay: Vec<ScreenPoint>,
}

impl RenderScene {
    pub fn is_empty(&self) -> bool {
        self.polyline.is_empty()
    }

    pub fn build(
        profile: &ShiftedProfile,
        window: &ViewWindow,
        controller: &MeasurementController,
        frame: PlotFrame,
    ) -> Self {
        let n = profile.len();
        if n == 0 {
            return Self {
                frame,
                ..Self::default()
            };
        }

        let span = window.span(n);
        let map = ScreenMapping::new(frame, span, ZAxis::for_profile(profile));
        let at = |idx: usize| {
            ScreenPoint::new(
                map.index_to_screen_x(idx as f64),
                map.z_to_screen_y(profile.display_value(idx)),
            )
        };

        let polyline = (span.start..=span.last()).map(at).collect();

        let mut vertical_handles = Vec::new();
        let mut horizontal_handles = Vec::new();
        if controller.is_ruler() {
            let ruler = controller.ruler();
            for (which, &idx) in ruler.indices.iter().enumerate() {
                if span.contains(idx) {
                    let x = map.index_to_screen_x(idx as f64);
                    vertical_handles.push(HandleLine {
                        which,
                        from: ScreenPoint::new(x, frame.top()),
                        to: ScreenPoint::new(x, frame.bottom()),
                    });
                }
            }
            for (which, &z) in ruler.levels.iter().enumerate() {
                if z.is_finite() {
                    let y = map.z_to_screen_y(z);
                    horizontal_handles.push(HandleLine {
                        which,
                        from: ScreenPoint::new(frame.left(), y),
                        to: ScreenPoint::new(frame.right(), y),
                    });
                }
            }
        }

        // Clicked points stay recorded when scrolled away; only the visible
        // part is drawn.
        let mut markers = Vec::new();
        let mut chord = None;
        let mut curve_overlay = Vec::new();
        if controller.is_point() {
            for (which, p) in controller.points().iter().enumerate() {
                if span.contains(p.index) {
                    markers.push(Marker {
                        which,
                        center: ScreenPoint::new(
                            map.index_to_screen_x(p.index as f64),
                            map.z_to_screen_y(p.z),
                        ),
                        radius: MARKER_RADIUS,
                    });
                }
            }
            if let Some((a, b)) = controller.points().pair() {
                let lo = a.index.min(b.index).max(span.start);
                let hi = a.index.max(b.index).min(span.last());
                if lo <= hi {
                    curve_overlay = (lo..=hi)
                        .filter(|&i| profile.get(i).is_some_and(f64::is_finite))
                        .map(at)
                        .collect();
                }
                if span.contains(a.index) && span.contains(b.index) {
                    chord = Some((
                        ScreenPoint::new(map.index_to_screen_x(a.index as f64), map.z_to_screen_y(a.z)),
                        ScreenPoint::new(map.index_to_screen_x(b.index as f64), map.z_to_screen_y(b.z)),
                    ));
                }
            }
        }

        Self {
            frame,
            x_ticks: x_ticks(&map, profile.x_step_mm()),
            z_ticks: z_ticks(&map),
            polyline,
            vertical_handles,
            horizontal_handles,
            markers,
            chord,
            curve_overlay,
        }
    }
}

/// Ticks every [`X_TICK_EVERY_MM`] across the visible range, aligned to
/// multiples of the spacing.
pub fn x_ticks(map: &ScreenMapping, step_mm: f64) -> Vec<Tick> {
    let min_mm = map.span.start as f64 * step_mm;
    let max_mm = map.span.last() as f64 * step_mm;
    let first = (min_mm / X_TICK_EVERY_MM).ceil() as i64;

    let mut ticks = Vec::new();
    let mut k = first;
    loop {
        let mm = k as f64 * X_TICK_EVERY_MM;
        if mm > max_mm + 1e-6 {
            break;
        }
        let idx = if step_mm > 0.0 { mm / step_mm } else { 0.0 };
        ticks.push(Tick {
            pos: map.index_to_screen_x(idx),
            value: mm,
            label: format!("{mm:.0}"),
        });
        k += 1;
    }
    ticks
}

/// [`Z_TICK_COUNT`] evenly spaced ticks from the axis floor to its top.
pub fn z_ticks(map: &ScreenMapping) -> Vec<Tick> {
    let axis = map.z_axis;
    let step = axis.span() / (Z_TICK_COUNT - 1) as f64;
    (0..Z_TICK_COUNT)
        .map(|i| {
            let value = axis.min + i as f64 * step;
            Tick {
                pos: map.z_to_screen_y(value),
                value,
                label: format!("{value:.1}"),
            }
        })
        .collect()
}
