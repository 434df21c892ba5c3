use serde::{Deserialize, Serialize};

/// Fixed physical width covered by one profile, regardless of sample count.
pub const X_RANGE_MM: f64 = 240.0;

/// One captured scan: a timestamp (milliseconds since the Unix epoch, or 0
/// for synthetic profiles) and its Z samples in millimetres.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Scan {
    pub timestamp: f64,
    pub z: Vec<f64>,
}

impl Scan {
    pub fn new(timestamp: f64, z: Vec<f64>) -> Self {
        Self { timestamp, z }
    }
}

/// Millimetres between two neighbouring samples of an `n`-sample profile.
/// Zero when there is nothing to space out.
pub fn x_step_mm(n: usize) -> f64 {
    if n > 1 {
        X_RANGE_MM / (n - 1) as f64
    } else {
        0.0
    }
}

/// A profile translated so that its lowest finite sample sits at Z = 0.
///
/// Non-finite samples are carried through unchanged so that distance sums can
/// skip them; drawing code asks for [`ShiftedProfile::display_value`] instead,
/// which substitutes the profile floor.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ShiftedProfile {
    z: Vec<f64>,
    offset: f64,
    max: Option<f64>,
}

impl ShiftedProfile {
    pub fn from_samples(raw: &[f64]) -> Self {
        let min = raw
            .iter()
            .copied()
            .filter(|v| v.is_finite())
            .fold(f64::INFINITY, f64::min);
        let offset = if min.is_finite() { -min } else { 0.0 };

        let z: Vec<f64> = raw.iter().map(|v| v + offset).collect();
        let max = z
            .iter()
            .copied()
            .filter(|v| v.is_finite())
            .fold(None, |acc: Option<f64>, v| Some(acc.map_or(v, |m| m.max(v))));

        Self { z, offset, max }
    }

    pub fn len(&self) -> usize {
        self.z.len()
    }

    pub fn is_empty(&self) -> bool {
        self.z.is_empty()
    }

    pub fn samples(&self) -> &[f64] {
        &self.z
    }

    /// Raw shifted sample, possibly non-finite.
    pub fn get(&self, idx: usize) -> Option<f64> {
        self.z.get(idx).copied()
    }

    /// Sample safe for drawing: non-finite and out-of-range reads fall back
    /// to the profile floor (0).
    pub fn display_value(&self, idx: usize) -> f64 {
        match self.z.get(idx) {
            Some(v) if v.is_finite() => *v,
            _ => 0.0,
        }
    }

    /// Amount added to every raw sample.
    pub fn offset(&self) -> f64 {
        self.offset
    }

    /// Highest finite shifted sample.
    pub fn max(&self) -> Option<f64> {
        self.max
    }

    pub fn x_step_mm(&self) -> f64 {
        x_step_mm(self.z.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn x_step_guards_degenerate_profiles() {
        assert_eq!(x_step_mm(0), 0.0);
        assert_eq!(x_step_mm(1), 0.0);
        assert_eq!(x_step_mm(4), 80.0);
    }

    #[test]
    fn shift_moves_minimum_to_zero() {
        let shifted = ShiftedProfile::from_samples(&[-2.0, 1.0, 3.0]);
        assert_eq!(shifted.samples(), &[0.0, 3.0, 5.0]);
        assert_eq!(shifted.offset(), 2.0);
        assert_eq!(shifted.max(), Some(5.0));

        let positive = ShiftedProfile::from_samples(&[4.0, 6.0]);
        assert_eq!(positive.samples(), &[0.0, 2.0]);
    }

    #[test]
    fn non_finite_samples_are_kept_but_not_drawn() {
        let shifted = ShiftedProfile::from_samples(&[1.0, f64::NAN, 3.0]);
        assert_eq!(shifted.get(0), Some(0.0));
        assert!(shifted.get(1).is_some_and(f64::is_nan));
        assert_eq!(shifted.display_value(1), 0.0);
        assert_eq!(shifted.display_value(99), 0.0);
        assert_eq!(shifted.max(), Some(2.0));
    }

    #[test]
    fn all_non_finite_profile_has_no_max() {
        let shifted = ShiftedProfile::from_samples(&[f64::NAN, f64::INFINITY]);
        assert_eq!(shifted.offset(), 0.0);
        assert_eq!(shifted.max(), None);
        assert!(ShiftedProfile::from_samples(&[]).is_empty());
    }
}
