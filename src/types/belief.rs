//! Probability mass over grid cells.

use std::fmt::{Display, Formatter};

use ndarray::Array2;

use super::grid::rectangular_dims;
use crate::error::{LocResult, LocalizerError};

/// Immutable H×W probability distribution over robot positions
///
/// Stored row-major. There are no mutators: every filter step builds a new
/// `Belief` from the previous one.
#[derive(Clone, Debug, PartialEq)]
pub struct Belief {
    probs: Array2<f64>,
}

impl Belief {
    /// Wrap an array produced by one of the filter steps
    pub(crate) fn from_array(probs: Array2<f64>) -> Self {
        Belief { probs }
    }

    /// Every cell holds exactly `1 / (height * width)`
    pub fn uniform(height: usize, width: usize) -> LocResult<Self> {
        let area = height * width;
        if area == 0 {
            return Err(LocalizerError::InvalidGrid(format!(
                "zero-area grid ({height}x{width})"
            )));
        }
        let per_cell = 1.0 / area as f64;
        Ok(Belief {
            probs: Array2::from_elem((height, width), per_cell),
        })
    }

    /// Build a belief from row vectors
    ///
    /// Rows must form a non-empty rectangle of finite, non-negative values.
    /// The total is not checked: the next sense step renormalizes.
    pub fn from_rows(rows: Vec<Vec<f64>>) -> LocResult<Self> {
        let (height, width) = rectangular_dims(&rows).map_err(LocalizerError::DimensionMismatch)?;
        if let Some(bad) = rows.iter().flatten().find(|p| !p.is_finite() || **p < 0.0) {
            return Err(LocalizerError::InvalidParameters(format!(
                "belief entries must be finite and non-negative, found {bad}"
            )));
        }
        let flat: Vec<f64> = rows.into_iter().flatten().collect();
        let probs = Array2::from_shape_vec((height, width), flat).map_err(|e| {
            LocalizerError::DimensionMismatch(format!("Failed to build belief array: {e}"))
        })?;
        Ok(Belief { probs })
    }

    /// (height, width)
    pub fn dims(&self) -> (usize, usize) {
        self.probs.dim()
    }

    pub fn get(&self, row: usize, col: usize) -> Option<f64> {
        self.probs.get((row, col)).copied()
    }

    pub fn as_array(&self) -> &Array2<f64> {
        &self.probs
    }

    /// Total probability mass (1.0 for a normalized belief)
    pub fn total(&self) -> f64 {
        self.probs.sum()
    }

    /// Most probable cell as (row, col, probability)
    ///
    /// Ties resolve to the first cell in row-major order.
    pub fn most_likely(&self) -> (usize, usize, f64) {
        let mut best = (0, 0, f64::NEG_INFINITY);
        for ((row, col), &p) in self.probs.indexed_iter() {
            if p > best.2 {
                best = (row, col, p);
            }
        }
        best
    }

    pub fn to_rows(&self) -> Vec<Vec<f64>> {
        self.probs.rows().into_iter().map(|row| row.to_vec()).collect()
    }

    /// Fixed-precision table, one grid row per line
    pub fn render(&self, precision: usize) -> String {
        self.probs
            .rows()
            .into_iter()
            .map(|row| {
                row.iter()
                    .map(|p| format!("{:.*}", precision, p))
                    .collect::<Vec<_>>()
                    .join(" ")
            })
            .collect::<Vec<_>>()
            .join("\n")
    }
}

impl Display for Belief {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(f, "{}", self.render(3))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn test_uniform_exact() {
        let belief = Belief::uniform(3, 4).unwrap();
        assert!(belief.as_array().iter().all(|&p| p == 1.0 / 12.0));
        assert_abs_diff_eq!(belief.total(), 1.0, epsilon = 1e-12);
    }

    #[test]
    fn test_uniform_zero_area() {
        assert!(matches!(
            Belief::uniform(0, 5),
            Err(LocalizerError::InvalidGrid(_))
        ));
    }

    #[test]
    fn test_from_rows_ragged() {
        let err = Belief::from_rows(vec![vec![0.5, 0.5], vec![0.0]]).unwrap_err();
        assert!(matches!(err, LocalizerError::DimensionMismatch(_)));
    }

    #[test]
    fn test_from_rows_negative() {
        let err = Belief::from_rows(vec![vec![1.5, -0.5]]).unwrap_err();
        assert!(matches!(err, LocalizerError::InvalidParameters(_)));
    }

    #[test]
    fn test_most_likely_first_on_ties() {
        let belief = Belief::from_rows(vec![vec![0.1, 0.4], vec![0.4, 0.1]]).unwrap();
        assert_eq!(belief.most_likely(), (0, 1, 0.4));
    }

    #[test]
    fn test_to_rows_and_render() {
        let rows = vec![vec![0.375, 0.125], vec![0.125, 0.375]];
        let belief = Belief::from_rows(rows.clone()).unwrap();
        assert_eq!(belief.to_rows(), rows);
        assert_eq!(belief.render(1), "0.4 0.1\n0.1 0.4");
        assert_eq!(belief.to_string(), "0.375 0.125\n0.125 0.375");
    }
}
