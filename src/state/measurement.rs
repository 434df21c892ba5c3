use std::collections::VecDeque;

use serde::{Deserialize, Serialize};

use crate::render::view_window::ZAxis;

pub const DEFAULT_RULER_INDICES: [usize; 2] = [10, 30];
pub const DEFAULT_RULER_LEVELS: [f64; 2] = [0.0, 1.0];

/// Point mode keeps only the most recent clicks.
pub const MAX_CLICKED_POINTS: usize = 2;

/// Which measurement tool is active. Exactly one value at any time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum MeasureMode {
    #[default]
    None,
    Ruler,
    Point,
}

impl MeasureMode {
    pub fn label(&self) -> &'static str {
        match self {
            MeasureMode::None => "Off",
            MeasureMode::Ruler => "Ruler",
            MeasureMode::Point => "Point",
        }
    }
}

/// Two draggable vertical lines (sample indices) and two draggable
/// horizontal lines (shifted Z levels).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RulerState {
    pub indices: [usize; 2],
    pub levels: [f64; 2],
}

impl Default for RulerState {
    fn default() -> Self {
        Self {
            indices: DEFAULT_RULER_INDICES,
            levels: DEFAULT_RULER_LEVELS,
        }
    }
}

impl RulerState {
    /// Inclusive index range between the vertical handles, low end first.
    pub fn index_range(&self) -> (usize, usize) {
        let [a, b] = self.indices;
        (a.min(b), a.max(b))
    }

    /// Horizontal handles are unusable when they coincide, are non-finite,
    /// or sit outside the axis.
    pub fn levels_need_reset(&self, axis: &ZAxis) -> bool {
        let [a, b] = self.levels;
        a == b || !a.is_finite() || !b.is_finite() || !axis.contains(a) || !axis.contains(b)
    }

    /// Spread the horizontal handles over the middle 60 % of the data range.
    pub fn reset_levels(&mut self, axis: &ZAxis) {
        let span = axis.max - axis.min;
        self.levels = [axis.min + 0.2 * span, axis.max - 0.2 * span];
    }

    /// Keep the vertical handles inside an `n`-sample profile.
    pub fn clamp_indices(&mut self, n: usize) {
        let last = n.saturating_sub(1);
        for idx in &mut self.indices {
            *idx = (*idx).min(last);
        }
    }
}

/// A sample picked by clicking in point mode.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ClickedPoint {
    pub index: usize,
    pub z: f64,
}

/// Sliding buffer of the last [`MAX_CLICKED_POINTS`] clicks, oldest first.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PointMeasureState {
    points: VecDeque<ClickedPoint>,
}

impl PointMeasureState {
    pub fn push(&mut self, point: ClickedPoint) {
        if self.points.len() == MAX_CLICKED_POINTS {
            self.points.pop_front();
        }
        self.points.push_back(point);
    }

    pub fn clear(&mut self) {
        self.points.clear();
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &ClickedPoint> {
        self.points.iter()
    }

    /// Both points, in click order, once two have been recorded.
    pub fn pair(&self) -> Option<(ClickedPoint, ClickedPoint)> {
        match (self.points.front(), self.points.get(1)) {
            (Some(a), Some(b)) => Some((*a, *b)),
            _ => None,
        }
    }

    /// Drop points that no longer index into the profile and refresh the Z of
    /// the rest from `z_at`.
    pub fn reconcile(&mut self, n: usize, z_at: impl Fn(usize) -> f64) {
        self.points.retain(|p| p.index < n);
        for p in &mut self.points {
            p.z = z_at(p.index);
        }
    }
}

/// Owns the ruler and point tools and enforces that at most one is active.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MeasurementController {
    mode: MeasureMode,
    ruler: RulerState,
    points: PointMeasureState,
}

impl MeasurementController {
    pub fn mode(&self) -> MeasureMode {
        self.mode
    }

    pub fn is_ruler(&self) -> bool {
        self.mode == MeasureMode::Ruler
    }

    pub fn is_point(&self) -> bool {
        self.mode == MeasureMode::Point
    }

    pub fn ruler(&self) -> &RulerState {
        &self.ruler
    }

    pub fn ruler_mut(&mut self) -> &mut RulerState {
        &mut self.ruler
    }

    pub fn points(&self) -> &PointMeasureState {
        &self.points
    }

    pub fn points_mut(&mut self) -> &mut PointMeasureState {
        &mut self.points
    }

    /// Switch to the ruler. No-op without data. Leaving point mode discards
    /// its clicks; unusable horizontal handles are respread over `axis`.
    pub fn enable_ruler(&mut self, n: usize, axis: &ZAxis) -> bool {
        if n == 0 {
            return false;
        }
        if self.mode == MeasureMode::Point {
            self.points.clear();
        }
        self.mode = MeasureMode::Ruler;
        if self.ruler.levels_need_reset(axis) {
            self.ruler.reset_levels(axis);
        }
        tracing::debug!(levels = ?self.ruler.levels, "ruler enabled");
        true
    }

    /// Switch to point mode with an empty click list. No-op without data.
    pub fn enable_point(&mut self, n: usize) -> bool {
        if n == 0 {
            return false;
        }
        self.mode = MeasureMode::Point;
        self.points.clear();
        tracing::debug!("point measurement enabled");
        true
    }

    /// Turn measurement off. Clicked points are cleared; ruler handles keep
    /// their positions for the next time the ruler is enabled.
    pub fn disable(&mut self) {
        if self.mode == MeasureMode::Point {
            self.points.clear();
        }
        self.mode = MeasureMode::None;
    }

    pub fn toggle_ruler(&mut self, n: usize, axis: &ZAxis) -> bool {
        if self.is_ruler() {
            self.disable();
            true
        } else {
            self.enable_ruler(n, axis)
        }
    }

    pub fn toggle_point(&mut self, n: usize) -> bool {
        if self.is_point() {
            self.disable();
            true
        } else {
            self.enable_point(n)
        }
    }

    /// Apply a mode chosen elsewhere (e.g. a mirrored viewer).
    pub fn set_mode(&mut self, mode: MeasureMode, n: usize, axis: &ZAxis) -> bool {
        if mode == self.mode {
            return true;
        }
        match mode {
            MeasureMode::None => {
                self.disable();
                true
            }
            MeasureMode::Ruler => self.enable_ruler(n, axis),
            MeasureMode::Point => self.enable_point(n),
        }
    }

    /// Record a click; only accepted in point mode.
    pub fn record_click(&mut self, index: usize, z: f64) -> bool {
        if !self.is_point() {
            return false;
        }
        self.points.push(ClickedPoint { index, z });
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn axis() -> ZAxis {
        ZAxis {
            min: 0.0,
            max: 10.0,
            pad: 2.0,
        }
    }

    #[test]
    fn third_click_drops_the_oldest() {
        let mut ctl = MeasurementController::default();
        assert!(ctl.enable_point(20));
        for idx in [5, 10, 15] {
            assert!(ctl.record_click(idx, idx as f64));
        }
        let kept: Vec<usize> = ctl.points().iter().map(|p| p.index).collect();
        assert_eq!(kept, vec![10, 15]);
    }

    #[test]
    fn clicks_are_ignored_outside_point_mode() {
        let mut ctl = MeasurementController::default();
        assert!(!ctl.record_click(3, 1.0));
        ctl.enable_ruler(20, &axis());
        assert!(!ctl.record_click(3, 1.0));
        assert!(ctl.points().is_empty());
    }

    #[test]
    fn enabling_ruler_ends_point_mode_and_clears_clicks() {
        let mut ctl = MeasurementController::default();
        ctl.enable_point(20);
        ctl.record_click(1, 0.5);
        ctl.record_click(2, 0.7);
        assert!(ctl.enable_ruler(20, &axis()));
        assert_eq!(ctl.mode(), MeasureMode::Ruler);
        assert!(ctl.points().is_empty());
    }

    #[test]
    fn enabling_point_ends_ruler_mode() {
        let mut ctl = MeasurementController::default();
        ctl.enable_ruler(20, &axis());
        assert!(ctl.enable_point(20));
        assert_eq!(ctl.mode(), MeasureMode::Point);
        assert!(!ctl.is_ruler());
    }

    #[test]
    fn enabling_requires_data() {
        let mut ctl = MeasurementController::default();
        assert!(!ctl.enable_ruler(0, &axis()));
        assert!(!ctl.enable_point(0));
        assert_eq!(ctl.mode(), MeasureMode::None);
    }

    #[test]
    fn degenerate_levels_are_respread() {
        let mut ctl = MeasurementController::default();
        ctl.ruler_mut().levels = [3.0, 3.0];
        ctl.enable_ruler(20, &axis());
        assert_eq!(ctl.ruler().levels, [2.0, 8.0]);

        let mut ctl = MeasurementController::default();
        ctl.ruler_mut().levels = [f64::NAN, 1.0];
        ctl.enable_ruler(20, &axis());
        assert_eq!(ctl.ruler().levels, [2.0, 8.0]);
    }

    #[test]
    fn usable_levels_survive_enable() {
        let mut ctl = MeasurementController::default();
        ctl.ruler_mut().levels = [1.5, 4.0];
        ctl.enable_ruler(20, &axis());
        assert_eq!(ctl.ruler().levels, [1.5, 4.0]);
    }

    #[test]
    fn out_of_range_levels_are_respread() {
        let mut ctl = MeasurementController::default();
        ctl.ruler_mut().levels = [1.0, 40.0];
        ctl.enable_ruler(20, &axis());
        assert_eq!(ctl.ruler().levels, [2.0, 8.0]);
    }

    #[test]
    fn disabling_keeps_ruler_handles() {
        let mut ctl = MeasurementController::default();
        ctl.enable_ruler(50, &axis());
        ctl.ruler_mut().indices = [4, 44];
        ctl.disable();
        assert_eq!(ctl.mode(), MeasureMode::None);
        assert_eq!(ctl.ruler().indices, [4, 44]);
    }

    #[test]
    fn toggles_flip_between_off_and_on() {
        let mut ctl = MeasurementController::default();
        ctl.toggle_point(10);
        ctl.record_click(1, 1.0);
        ctl.toggle_point(10);
        assert_eq!(ctl.mode(), MeasureMode::None);
        assert!(ctl.points().is_empty());
        ctl.toggle_ruler(10, &axis());
        assert!(ctl.is_ruler());
        ctl.toggle_ruler(10, &axis());
        assert_eq!(ctl.mode(), MeasureMode::None);
    }

    #[test]
    fn reconcile_drops_points_past_the_end() {
        let mut points = PointMeasureState::default();
        points.push(ClickedPoint { index: 2, z: 0.0 });
        points.push(ClickedPoint { index: 40, z: 0.0 });
        points.reconcile(10, |i| i as f64 * 0.5);
        assert_eq!(points.len(), 1);
        assert_eq!(points.pair(), None);
        assert_eq!(points.iter().next().map(|p| p.z), Some(1.0));
    }

    #[test]
    fn indices_are_clamped_to_profile() {
        let mut ruler = RulerState::default();
        ruler.clamp_indices(20);
        assert_eq!(ruler.indices, [10, 19]);
        ruler.clamp_indices(0);
        assert_eq!(ruler.indices, [0, 0]);
    }
}
