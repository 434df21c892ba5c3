//! Length, angle and range measurements over a shifted profile.
//!
//! All results are in millimetres (angles in degrees). Index ranges are
//! order-independent and every function degrades to `None` instead of
//! failing when the profile cannot support the measurement.

use crate::state::profile::x_step_mm;

fn normalize(n: usize, i0: usize, i1: usize) -> (usize, usize) {
    let start = i0.min(i1);
    let end = i0.max(i1).min(n.saturating_sub(1));
    (start, end)
}

/// Arc length between two sample indices: the sum of the straight segments
/// joining consecutive samples. Segments touching a non-finite sample are
/// skipped.
pub fn curve_distance(samples: &[f64], i0: usize, i1: usize) -> Option<f64> {
    let n = samples.len();
    if n < 2 {
        return None;
    }
    let step = x_step_mm(n);
    let (start, end) = normalize(n, i0, i1);
    if start >= end {
        return Some(0.0);
    }

    let total = samples[start..=end]
        .windows(2)
        .filter(|w| w[0].is_finite() && w[1].is_finite())
        .map(|w| step.hypot(w[1] - w[0]))
        .sum();
    Some(total)
}

/// Straight line between two profile points.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Chord {
    /// Signed horizontal offset from the first point to the second.
    pub dx_mm: f64,
    /// Signed vertical offset from the first point to the second.
    pub dz_mm: f64,
    pub length_mm: f64,
    /// Inclination in degrees, `atan2(dz, dx)`.
    pub angle_deg: f64,
}

impl Chord {
    pub fn between(a: (usize, f64), b: (usize, f64), step_mm: f64) -> Option<Self> {
        let dx_mm = (b.0 as f64 - a.0 as f64) * step_mm;
        let dz_mm = b.1 - a.1;
        if !dz_mm.is_finite() || !dx_mm.is_finite() {
            return None;
        }
        Some(Self {
            dx_mm,
            dz_mm,
            length_mm: dx_mm.hypot(dz_mm),
            angle_deg: dz_mm.atan2(dx_mm).to_degrees(),
        })
    }
}

/// Lowest and highest finite sample over the inclusive range.
pub fn range_min_max(samples: &[f64], i0: usize, i1: usize) -> Option<(f64, f64)> {
    if samples.is_empty() {
        return None;
    }
    let (start, end) = normalize(samples.len(), i0, i1);
    if start > end {
        return None;
    }
    samples[start..=end]
        .iter()
        .copied()
        .filter(|v| v.is_finite())
        .fold(None, |acc, v| match acc {
            None => Some((v, v)),
            Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
        })
}

pub fn delta_x_mm(idx_a: usize, idx_b: usize, step_mm: f64) -> f64 {
    idx_a.abs_diff(idx_b) as f64 * step_mm
}

pub fn delta_z_mm(z_a: f64, z_b: f64) -> f64 {
    (z_a - z_b).abs()
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f64 = 1e-9;

    #[test]
    fn curve_distance_sums_segments() {
        let z = [0.0, 3.0, 4.0, 0.0];
        let expected = 80f64.hypot(3.0) + 80f64.hypot(1.0) + 80f64.hypot(4.0);
        let got = curve_distance(&z, 0, 3).unwrap();
        assert!((got - expected).abs() < EPS);
        assert!((got - 240.1624).abs() < 1e-3);
        // Order of the range does not matter.
        assert_eq!(curve_distance(&z, 3, 0), Some(got));
    }

    #[test]
    fn curve_distance_needs_two_samples() {
        assert_eq!(curve_distance(&[], 0, 0), None);
        assert_eq!(curve_distance(&[1.0], 0, 0), None);
        assert_eq!(curve_distance(&[1.0, 2.0], 1, 1), Some(0.0));
    }

    #[test]
    fn curve_distance_skips_non_finite_segments() {
        let z = [0.0, f64::NAN, 0.0, 0.0];
        // Only the last segment survives.
        let got = curve_distance(&z, 0, 3).unwrap();
        assert!((got - 80.0).abs() < EPS);
    }

    #[test]
    fn curve_distance_clamps_end_index() {
        let z = [0.0, 0.0, 0.0];
        assert_eq!(curve_distance(&z, 0, 50), Some(240.0));
    }

    #[test]
    fn curve_distance_grows_with_range() {
        let z: Vec<f64> = (0..60).map(|i| ((i as f64) * 0.37).sin() * 3.0).collect();
        let mut prev = 0.0;
        for end in 10..60 {
            let d = curve_distance(&z, 10, end).unwrap();
            assert!(d + EPS >= prev);
            prev = d;
        }
    }

    #[test]
    fn chord_is_flat_between_equal_heights() {
        let chord = Chord::between((0, 0.0), (3, 0.0), 80.0).unwrap();
        assert!((chord.length_mm - 240.0).abs() < EPS);
        assert!(chord.angle_deg.abs() < EPS);
    }

    #[test]
    fn chord_angle_is_signed() {
        let up = Chord::between((0, 0.0), (1, 1.0), 1.0).unwrap();
        assert!((up.angle_deg - 45.0).abs() < EPS);
        let back = Chord::between((1, 1.0), (0, 0.0), 1.0).unwrap();
        assert!((back.angle_deg + 135.0).abs() < EPS);
        assert!(Chord::between((0, f64::NAN), (1, 0.0), 1.0).is_none());
    }

    #[test]
    fn range_min_max_ignores_non_finite() {
        let z = [5.0, f64::NAN, 1.0, 9.0];
        assert_eq!(range_min_max(&z, 0, 2), Some((1.0, 5.0)));
        assert_eq!(range_min_max(&z, 3, 0), Some((1.0, 9.0)));
        assert_eq!(range_min_max(&z, 1, 1), None);
        assert_eq!(range_min_max(&[], 0, 4), None);
    }

    #[test]
    fn deltas_are_absolute() {
        assert_eq!(delta_x_mm(30, 10, 2.0), 40.0);
        assert_eq!(delta_z_mm(1.0, 4.5), 3.5);
    }
}
