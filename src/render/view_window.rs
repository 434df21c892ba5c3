use serde::{Deserialize, Serialize};

use crate::state::profile::{x_step_mm, ShiftedProfile};

pub const ZOOM_MIN: u32 = 1;
pub const ZOOM_MAX: u32 = 8;

/// The Z axis never shows less than this many millimetres.
pub const Z_AXIS_FLOOR: f64 = 8.0;
/// Headroom above the tallest sample.
pub const Z_AXIS_PAD: f64 = 2.0;

/// Pixel layout of the plot canvas. All screen coordinates produced by the
/// engine are relative to the canvas' top-left corner.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlotFrame {
    pub width: f64,
    pub height: f64,
    pub margin_left: f64,
    pub margin_right: f64,
    pub margin_top: f64,
    pub margin_bottom: f64,
}

impl Default for PlotFrame {
    fn default() -> Self {
        Self {
            width: 680.0,
            height: 260.0,
            margin_left: 48.0,
            margin_right: 10.0,
            margin_top: 10.0,
            margin_bottom: 34.0,
        }
    }
}

impl PlotFrame {
    /// Same margins, different canvas size.
    pub fn with_size(self, width: f64, height: f64) -> Self {
        Self { width, height, ..self }
    }

    pub fn draw_w(&self) -> f64 {
        (self.width - self.margin_left - self.margin_right).max(0.0)
    }

    pub fn draw_h(&self) -> f64 {
        (self.height - self.margin_top - self.margin_bottom).max(0.0)
    }

    pub fn left(&self) -> f64 {
        self.margin_left
    }

    pub fn right(&self) -> f64 {
        self.margin_left + self.draw_w()
    }

    pub fn top(&self) -> f64 {
        self.margin_top
    }

    pub fn bottom(&self) -> f64 {
        self.margin_top + self.draw_h()
    }
}

/// Contiguous visible sub-range of a profile.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WindowSpan {
    /// First visible index (the clamped pan).
    pub start: usize,
    /// Number of visible samples, never zero.
    pub len: usize,
}

impl WindowSpan {
    /// Last visible index, inclusive.
    pub fn last(&self) -> usize {
        self.start + self.len - 1
    }

    pub fn contains(&self, idx: usize) -> bool {
        idx >= self.start && idx <= self.last()
    }

    pub fn clamp_index(&self, idx: i64) -> usize {
        idx.clamp(self.start as i64, self.last() as i64) as usize
    }
}

/// Visible window for an `n`-sample profile at `zoom`, with `pan` clamped so
/// the window never runs past the end.
pub fn compute_window(n: usize, zoom: u32, pan: usize) -> WindowSpan {
    let len = window_len(n, zoom);
    let pan_max = n.saturating_sub(len);
    WindowSpan {
        start: pan.min(pan_max),
        len,
    }
}

fn window_len(n: usize, zoom: u32) -> usize {
    let zoom = zoom.max(ZOOM_MIN) as f64;
    ((n as f64 / zoom).round() as usize).max(1)
}

/// Zoom level and pan offset of one viewer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ViewWindow {
    pub zoom: u32,
    pub pan: usize,
}

impl Default for ViewWindow {
    fn default() -> Self {
        Self {
            zoom: ZOOM_MIN,
            pan: 0,
        }
    }
}

impl ViewWindow {
    pub fn new(zoom: u32, pan: usize) -> Self {
        Self {
            zoom: zoom.clamp(ZOOM_MIN, ZOOM_MAX),
            pan,
        }
    }

    pub fn span(&self, n: usize) -> WindowSpan {
        compute_window(n, self.zoom, self.pan)
    }

    pub fn pan_max(&self, n: usize) -> usize {
        n.saturating_sub(window_len(n, self.zoom))
    }

    /// Set the pan offset, clamped to `[0, pan_max]`.
    pub fn set_pan(&mut self, n: usize, pan: i64) {
        self.pan = pan.clamp(0, self.pan_max(n) as i64) as usize;
    }

    /// Change the zoom level while keeping the sample under the cursor in
    /// place. `frac` is the cursor's horizontal position inside the drawing
    /// area, 0 at the left edge and 1 at the right edge.
    ///
    /// Returns `false` when the clamped zoom equals the current one.
    pub fn zoom_at(&mut self, n: usize, new_zoom: i64, frac: f64) -> bool {
        let new_zoom = new_zoom.clamp(ZOOM_MIN as i64, ZOOM_MAX as i64) as u32;
        if new_zoom == self.zoom {
            return false;
        }
        let frac = if frac.is_finite() { frac.clamp(0.0, 1.0) } else { 0.0 };

        let old = self.span(n);
        let new_len = window_len(n, new_zoom);
        let under_cursor = old.start as f64 + (frac * old.len.saturating_sub(1) as f64).round();
        let new_pan = (under_cursor - frac * new_len.saturating_sub(1) as f64).round() as i64;

        self.zoom = new_zoom;
        self.set_pan(n, new_pan);
        true
    }

    /// Start and end of the visible range in millimetres.
    pub fn visible_x_mm(&self, n: usize) -> (f64, f64) {
        let span = self.span(n);
        let step = x_step_mm(n);
        (span.start as f64 * step, span.last() as f64 * step)
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

/// Nudge `pan` so both ruler handles fall inside `[pan, pan + win - 1]`.
/// When they cannot both fit, the higher handle wins.
pub fn keep_handles_visible(pan: usize, win: usize, n: usize, handles: [usize; 2]) -> usize {
    let lo = handles[0].min(handles[1]) as i64;
    let hi = handles[0].max(handles[1]) as i64;
    let win = win.max(1) as i64;

    let mut p = pan as i64;
    if lo < p {
        p = lo;
    }
    if hi > p + win - 1 {
        p = hi - (win - 1);
    }
    p.clamp(0, (n as i64 - win).max(0)) as usize
}

/// Vertical axis range in (shifted) millimetres.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ZAxis {
    pub min: f64,
    pub max: f64,
    pub pad: f64,
}

impl Default for ZAxis {
    fn default() -> Self {
        Self {
            min: 0.0,
            max: Z_AXIS_FLOOR,
            pad: Z_AXIS_PAD,
        }
    }
}

impl ZAxis {
    pub fn for_profile(profile: &ShiftedProfile) -> Self {
        let max = profile.max().map_or(Z_AXIS_FLOOR, |m| m.max(Z_AXIS_FLOOR));
        Self { max, ..Self::default() }
    }

    /// Highest value shown on the axis.
    pub fn top(&self) -> f64 {
        self.max + self.pad
    }

    pub fn span(&self) -> f64 {
        let span = self.top() - self.min;
        if span.abs() < f64::EPSILON || !span.is_finite() {
            1.0
        } else {
            span
        }
    }

    pub fn clamp(&self, z: f64) -> f64 {
        z.clamp(self.min, self.top())
    }

    pub fn contains(&self, z: f64) -> bool {
        z.is_finite() && z >= self.min && z <= self.top()
    }
}

/// Affine maps between sample space and canvas pixels for one frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScreenMapping {
    pub frame: PlotFrame,
    pub span: WindowSpan,
    pub z_axis: ZAxis,
    /// Pixels between neighbouring visible samples (0 for a one-sample window).
    pub step_x: f64,
}

impl ScreenMapping {
    pub fn new(frame: PlotFrame, span: WindowSpan, z_axis: ZAxis) -> Self {
        let step_x = if span.len > 1 {
            frame.draw_w() / (span.len - 1) as f64
        } else {
            0.0
        };
        Self {
            frame,
            span,
            z_axis,
            step_x,
        }
    }

    pub fn index_to_screen_x(&self, idx: f64) -> f64 {
        self.frame.left() + (idx - self.span.start as f64) * self.step_x
    }

    pub fn z_to_screen_y(&self, z: f64) -> f64 {
        self.frame.bottom() - ((z - self.z_axis.min) / self.z_axis.span()) * self.frame.draw_h()
    }

    /// Nearest visible sample under a canvas x coordinate.
    pub fn screen_x_to_index(&self, x: f64) -> usize {
        let px = x - self.frame.left();
        let idx = (self.span.start as f64 + px / self.step_denominator()).round();
        let idx = if idx.is_finite() { idx as i64 } else { self.span.start as i64 };
        self.span.clamp_index(idx)
    }

    /// Z value under a canvas y coordinate, clamped to the axis.
    pub fn screen_y_to_z(&self, y: f64) -> f64 {
        let draw_h = self.frame.draw_h();
        if draw_h <= 0.0 {
            return self.z_axis.min;
        }
        let z = self.z_axis.top() - ((y - self.frame.top()) / draw_h) * self.z_axis.span();
        self.z_axis.clamp(z)
    }

    /// Horizontal pointer position as a fraction of the drawing width.
    pub fn width_fraction(&self, x: f64) -> f64 {
        let draw_w = self.frame.draw_w();
        if draw_w <= 0.0 {
            return 0.0;
        }
        ((x - self.frame.left()) / draw_w).clamp(0.0, 1.0)
    }

    /// Divisor used to turn pixel offsets into sample offsets.
    pub fn step_denominator(&self) -> f64 {
        if self.step_x > 0.0 {
            self.step_x
        } else {
            1.0
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn window_length_and_pan_bounds_hold_for_all_zooms() {
        for n in 1..=257usize {
            for zoom in ZOOM_MIN..=ZOOM_MAX {
                for pan in [0usize, 1, n / 2, n, n + 10] {
                    let span = compute_window(n, zoom, pan);
                    let expected = ((n as f64 / zoom as f64).round() as usize).max(1);
                    assert_eq!(span.len, expected);
                    assert!(span.start <= n.saturating_sub(span.len));
                    assert!(span.start + span.len <= n);
                }
            }
        }
    }

    #[test]
    fn empty_profile_still_has_a_one_sample_window() {
        let span = compute_window(0, 4, 12);
        assert_eq!(span, WindowSpan { start: 0, len: 1 });
    }

    #[test]
    fn zoom_keeps_sample_under_cursor() {
        let n = 100;
        for frac in [0.0, 0.25, 0.5, 0.8, 1.0] {
            let mut window = ViewWindow::default();
            let mapping = |w: &ViewWindow| {
                ScreenMapping::new(PlotFrame::default(), w.span(n), ZAxis::default())
            };
            let x = PlotFrame::default().left() + frac * PlotFrame::default().draw_w();
            let before = mapping(&window).screen_x_to_index(x);
            assert!(window.zoom_at(n, 2, frac));
            let after = mapping(&window).screen_x_to_index(x);
            assert!(
                (before as i64 - after as i64).abs() <= 1,
                "frac {frac}: {before} vs {after}"
            );
        }
    }

    #[test]
    fn zoom_clamps_to_supported_levels() {
        let mut window = ViewWindow::new(8, 0);
        assert!(!window.zoom_at(100, 9, 0.5));
        assert_eq!(window.zoom, 8);
        assert!(window.zoom_at(100, -3, 0.5));
        assert_eq!(window.zoom, 1);
        assert_eq!(window.pan, 0);
    }

    #[test]
    fn zoom_out_reclamps_pan() {
        let mut window = ViewWindow::new(8, 80);
        assert!(window.zoom_at(100, 1, 1.0));
        assert_eq!(window.span(100), WindowSpan { start: 0, len: 100 });
    }

    #[test]
    fn handles_are_pulled_into_view() {
        assert_eq!(keep_handles_visible(0, 50, 100, [40, 60]), 11);
        assert_eq!(keep_handles_visible(30, 50, 100, [10, 20]), 10);
        assert_eq!(keep_handles_visible(20, 50, 100, [30, 40]), 20);
        // Too far apart: the higher one stays visible.
        assert_eq!(keep_handles_visible(0, 10, 100, [5, 50]), 41);
        // Stale handles past the end are clamped with the pan.
        assert_eq!(keep_handles_visible(0, 10, 20, [5, 500]), 10);
    }

    #[test]
    fn screen_mapping_round_trips_indices() {
        let span = compute_window(4, 1, 0);
        let map = ScreenMapping::new(PlotFrame::default(), span, ZAxis::default());
        for idx in 0..4 {
            let x = map.index_to_screen_x(idx as f64);
            assert_eq!(map.screen_x_to_index(x), idx);
        }
        assert_eq!(map.screen_x_to_index(-500.0), 0);
        assert_eq!(map.screen_x_to_index(5000.0), 3);
    }

    #[test]
    fn screen_y_maps_axis_extremes() {
        let span = compute_window(10, 1, 0);
        let map = ScreenMapping::new(PlotFrame::default(), span, ZAxis::default());
        let frame = PlotFrame::default();
        assert!((map.z_to_screen_y(0.0) - frame.bottom()).abs() < 1e-9);
        assert!((map.z_to_screen_y(10.0) - frame.top()).abs() < 1e-9);
        assert!((map.screen_y_to_z(frame.top()) - 10.0).abs() < 1e-9);
        assert_eq!(map.screen_y_to_z(frame.bottom() + 100.0), 0.0);
        assert_eq!(map.screen_y_to_z(-100.0), 10.0);
    }

    #[test]
    fn single_sample_window_has_zero_step() {
        let span = compute_window(1, 1, 0);
        let map = ScreenMapping::new(PlotFrame::default(), span, ZAxis::default());
        assert_eq!(map.step_x, 0.0);
        assert_eq!(map.step_denominator(), 1.0);
        assert_eq!(map.screen_x_to_index(300.0), 0);
    }

    #[test]
    fn z_axis_never_shrinks_below_floor() {
        let small = ShiftedProfile::from_samples(&[0.0, 1.0]);
        assert_eq!(ZAxis::for_profile(&small).max, Z_AXIS_FLOOR);
        let tall = ShiftedProfile::from_samples(&[0.0, 20.0]);
        assert_eq!(ZAxis::for_profile(&tall).top(), 22.0);
    }
}
