use crate::processing::geometry::{curve_distance, delta_x_mm, delta_z_mm, range_min_max, Chord};
use crate::render::view_window::ViewWindow;
use crate::state::measurement::MeasurementController;
use crate::state::profile::ShiftedProfile;

/// Shown in place of a value that cannot be computed.
pub const UNAVAILABLE: &str = "--";

/// What the small swatch in front of a metric label looks like. Colours are
/// resolved by the theme.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Legend {
    None,
    Line { color: LegendColor, dashed: bool, opacity: f32 },
    Dot { color: LegendColor },
}

impl Legend {
    fn line(color: LegendColor) -> Self {
        Legend::Line { color, dashed: false, opacity: 1.0 }
    }

    fn dashed(color: LegendColor, opacity: f32) -> Self {
        Legend::Line { color, dashed: true, opacity }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LegendColor {
    Axis,
    RulerVertical,
    RulerHorizontal,
    Overlay,
    Profile,
    PointA,
    PointB,
    Text,
}

#[derive(Debug, Clone, PartialEq)]
pub struct MetricRow {
    pub label: &'static str,
    pub value: String,
    pub legend: Legend,
}

impl MetricRow {
    fn new(label: &'static str, legend: Legend, value: String) -> Self {
        Self { label, value, legend }
    }
}

/// Numbers behind the ruler rows.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RulerReadout {
    pub visible_x_mm: (f64, f64),
    pub delta_x_mm: f64,
    pub levels: [f64; 2],
    pub delta_z_mm: f64,
    pub path_mm: Option<f64>,
    pub z_range: Option<(f64, f64)>,
}

/// Numbers behind the point rows.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointReadout {
    /// `(x_mm, z_mm)` of the first and second click.
    pub a: (f64, f64),
    pub b: (f64, f64),
    pub path_mm: Option<f64>,
    pub chord: Option<Chord>,
}

/// All readouts of one viewer, recomputed from its state on demand.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Readout {
    pub ruler: Option<RulerReadout>,
    pub point: Option<PointReadout>,
}

impl Readout {
    pub fn compute(profile: &ShiftedProfile, window: &ViewWindow, controller: &MeasurementController) -> Self {
        let n = profile.len();
        let step = profile.x_step_mm();
        let samples = profile.samples();

        let ruler = (controller.is_ruler() && n > 0).then(|| {
            let r = controller.ruler();
            let (lo, hi) = r.index_range();
            RulerReadout {
                visible_x_mm: window.visible_x_mm(n),
                delta_x_mm: delta_x_mm(r.indices[0], r.indices[1], step),
                levels: r.levels,
                delta_z_mm: delta_z_mm(r.levels[0], r.levels[1]),
                path_mm: curve_distance(samples, lo, hi),
                z_range: range_min_max(samples, lo, hi),
            }
        });

        let point = if controller.is_point() {
            controller.points().pair().map(|(a, b)| {
                let z_of = |idx: usize, fallback: f64| profile.get(idx).unwrap_or(fallback);
                let za = z_of(a.index, a.z);
                let zb = z_of(b.index, b.z);
                PointReadout {
                    a: (a.index as f64 * step, a.z),
                    b: (b.index as f64 * step, b.z),
                    path_mm: curve_distance(samples, a.index, b.index),
                    chord: Chord::between((a.index, za), (b.index, zb), step),
                }
            })
        } else {
            None
        };

        Self { ruler, point }
    }

    pub fn is_on(&self) -> bool {
        self.ruler.is_some() || self.point.is_some()
    }

    /// Rows of the metrics table. The path and range rows of the ruler only
    /// appear with `with_measurement_display`.
    pub fn rows(&self, with_measurement_display: bool) -> Vec<MetricRow> {
        let status = if self.is_on() { "On" } else { "Measure Off" };
        let mut rows = vec![MetricRow::new("Status", Legend::None, status.to_string())];

        if let Some(r) = &self.ruler {
            rows.push(MetricRow::new(
                "Visible X (mm)",
                Legend::line(LegendColor::Axis),
                format!("{:.1} – {:.1}", r.visible_x_mm.0, r.visible_x_mm.1),
            ));
            rows.push(MetricRow::new(
                "ΔX (red lines)",
                Legend::line(LegendColor::RulerVertical),
                mm(Some(r.delta_x_mm)),
            ));
            rows.push(MetricRow::new(
                "Z@A / Z@B",
                Legend::line(LegendColor::RulerHorizontal),
                format!("{} / {}", mm(Some(r.levels[0])), mm(Some(r.levels[1]))),
            ));
            rows.push(MetricRow::new(
                "ΔZ (orange lines)",
                Legend::line(LegendColor::RulerHorizontal),
                mm(Some(r.delta_z_mm)),
            ));
            if with_measurement_display {
                rows.push(MetricRow::new(
                    "Path Distance (curve)",
                    Legend::dashed(LegendColor::Overlay, 1.0),
                    mm(r.path_mm),
                ));
                rows.push(MetricRow::new(
                    "Z Min / Max (range)",
                    Legend::line(LegendColor::Profile),
                    format!("{} / {}", mm(r.z_range.map(|z| z.0)), mm(r.z_range.map(|z| z.1))),
                ));
            }
        }

        if let Some(p) = &self.point {
            rows.push(MetricRow::new(
                "Point A (x, z)",
                Legend::Dot { color: LegendColor::PointA },
                format!("{}, {}", mm(Some(p.a.0)), mm(Some(p.a.1))),
            ));
            rows.push(MetricRow::new(
                "Point B (x, z)",
                Legend::Dot { color: LegendColor::PointB },
                format!("{}, {}", mm(Some(p.b.0)), mm(Some(p.b.1))),
            ));
            rows.push(MetricRow::new(
                "Path Distance (curve)",
                Legend::dashed(LegendColor::Overlay, 1.0),
                mm(p.path_mm),
            ));
            rows.push(MetricRow::new(
                "Straight Distance",
                Legend::dashed(LegendColor::Overlay, 0.35),
                mm(p.chord.map(|c| c.length_mm)),
            ));
            rows.push(MetricRow::new(
                "Angle",
                Legend::Dot { color: LegendColor::Text },
                format!("{}°", number(p.chord.map(|c| c.angle_deg))),
            ));
        }

        rows
    }
}

fn number(v: Option<f64>) -> String {
    match v {
        Some(v) if v.is_finite() => format!("{v:.2}"),
        _ => UNAVAILABLE.to_string(),
    }
}

fn mm(v: Option<f64>) -> String {
    format!("{} mm", number(v))
}
