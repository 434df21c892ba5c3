use serde::{Deserialize, Serialize};

/// Direction of the profile cut through a surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum SliceAxis {
    /// One column across every scan.
    #[default]
    X,
    /// One whole scan.
    Y,
}

impl SliceAxis {
    pub fn label(&self) -> &'static str {
        match self {
            SliceAxis::X => "X Slice",
            SliceAxis::Y => "Y Slice",
        }
    }
}

/// A stack of scans forming a height map: `rows[y][x]`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Surface {
    rows: Vec<Vec<f64>>,
}

impl Surface {
    pub fn new(rows: Vec<Vec<f64>>) -> Self {
        Self { rows }
    }

    pub fn rows(&self) -> &[Vec<f64>] {
        &self.rows
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// Width of the first row; rows are not required to be equal.
    pub fn col_count(&self) -> usize {
        self.rows.first().map_or(0, Vec::len)
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Column `col` of every row; rows too short for it contribute 0.
    pub fn x_slice(&self, col: usize) -> Vec<f64> {
        self.rows
            .iter()
            .map(|r| r.get(col).copied().unwrap_or(0.0))
            .collect()
    }

    /// Row `row`, or an empty profile when out of range.
    pub fn y_slice(&self, row: usize) -> Vec<f64> {
        self.rows.get(row).cloned().unwrap_or_default()
    }

    pub fn slice(&self, axis: SliceAxis, x: usize, y: usize) -> Vec<f64> {
        match axis {
            SliceAxis::X => self.x_slice(x),
            SliceAxis::Y => self.y_slice(y),
        }
    }

    /// Pull stale slice indices into range after a load: an X index past the
    /// last column moves to the middle column, a Y index past the last row
    /// moves to 0.
    pub fn clamp_slice_indices(&self, x: usize, y: usize) -> (usize, usize) {
        if self.is_empty() {
            return (x, y);
        }
        let max_x = self.col_count().saturating_sub(1);
        let max_y = self.row_count() - 1;
        let x = if x > max_x { max_x / 2 } else { x };
        let y = if y > max_y { 0 } else { y };
        (x, y)
    }

    /// Finite min and max over all cells.
    pub fn z_range(&self) -> Option<(f64, f64)> {
        self.rows
            .iter()
            .flatten()
            .copied()
            .filter(|v| v.is_finite())
            .fold(None, |acc, v| match acc {
                None => Some((v, v)),
                Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn surface() -> Surface {
        Surface::new(vec![
            vec![1.0, 2.0, 3.0],
            vec![4.0, 5.0],
            vec![7.0, 8.0, 9.0],
        ])
    }

    #[test]
    fn x_slice_fills_short_rows_with_zero() {
        assert_eq!(surface().x_slice(2), vec![3.0, 0.0, 9.0]);
        assert_eq!(surface().x_slice(0), vec![1.0, 4.0, 7.0]);
    }

    #[test]
    fn y_slice_is_the_row() {
        assert_eq!(surface().y_slice(2), vec![7.0, 8.0, 9.0]);
        assert!(surface().y_slice(5).is_empty());
    }

    #[test]
    fn stale_indices_are_reset() {
        let s = surface();
        assert_eq!(s.clamp_slice_indices(1, 1), (1, 1));
        assert_eq!(s.clamp_slice_indices(10, 10), (1, 0));
        assert_eq!(Surface::default().clamp_slice_indices(10, 10), (10, 10));
    }

    #[test]
    fn z_range_skips_nan() {
        let s = Surface::new(vec![vec![f64::NAN, 2.0], vec![-1.0, 5.0]]);
        assert_eq!(s.z_range(), Some((-1.0, 5.0)));
        assert_eq!(Surface::default().z_range(), None);
    }
}
