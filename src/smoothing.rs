use ndarray::Array2;

use crate::error::{LocResult, LocalizerError};
use crate::types::{wrap_index, Belief};

/// Scale a non-negative array so its entries sum to 1.0
///
/// Entries are first divided by the largest one, so finite values near
/// `f64::MAX` do not overflow the sum. Zero mass or a non-finite entry is
/// reported as a degenerate distribution instead of filling the array
/// with NaN.
pub fn normalize(unnormalized: &Array2<f64>) -> LocResult<Array2<f64>> {
    let peak = unnormalized.iter().fold(0.0_f64, |acc, &p| acc.max(p));
    let finite = unnormalized.iter().all(|p| p.is_finite());
    if !finite || peak <= 0.0 {
        return Err(LocalizerError::DegenerateDistribution(format!(
            "cannot normalize total mass {}",
            unnormalized.sum()
        )));
    }
    let scaled = unnormalized.mapv(|p| p / peak);
    let total = scaled.sum();
    Ok(scaled.mapv(|p| p / total))
}

/// 3x3 motion-noise stencil
///
/// A cell keeps `1 - blurring` of its mass. Each of the 4 orthogonal
/// neighbours receives `blurring / 6` and each of the 4 diagonal neighbours
/// `blurring / 12`, so the weights always sum to 1.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BlurKernel {
    blurring: f64,
    weights: [[f64; 3]; 3],
}

impl BlurKernel {
    pub fn new(blurring: f64) -> LocResult<Self> {
        if !blurring.is_finite() || !(0.0..=1.0).contains(&blurring) {
            return Err(LocalizerError::InvalidParameters(format!(
                "blurring must be within [0, 1], got {blurring}"
            )));
        }
        let center = 1.0 - blurring;
        let edge = blurring / 6.0;
        let corner = blurring / 12.0;
        Ok(BlurKernel {
            blurring,
            weights: [
                [corner, edge, corner],
                [edge, center, edge],
                [corner, edge, corner],
            ],
        })
    }

    /// Weight for a neighbour offset, both components in -1..=1
    pub fn weight(&self, d_row: i64, d_col: i64) -> f64 {
        self.weights[(d_row + 1) as usize][(d_col + 1) as usize]
    }

    /// Zero blurring leaves every cell untouched
    pub fn is_identity(&self) -> bool {
        self.blurring == 0.0
    }

    pub fn total(&self) -> f64 {
        self.weights.iter().flatten().sum()
    }
}

/// Spread each cell's mass over its 3x3 toroidal neighbourhood
///
/// Mass is scattered rather than gathered, so grids narrower than the
/// stencil (1xN, 2x2) still conserve total mass where neighbours coincide.
/// The output carries the same total as the input; rounding drift is
/// rescaled away, and an all-zero belief passes through unchanged.
pub fn blur(belief: &Belief, blurring: f64) -> LocResult<Belief> {
    let kernel = BlurKernel::new(blurring)?;
    if kernel.is_identity() {
        return Ok(belief.clone());
    }

    let (height, width) = belief.dims();
    let mut blurred = Array2::<f64>::zeros((height, width));
    for ((row, col), &mass) in belief.as_array().indexed_iter() {
        if mass == 0.0 {
            continue;
        }
        for d_row in -1..=1 {
            for d_col in -1..=1 {
                let dest = [wrap_index(row, d_row, height), wrap_index(col, d_col, width)];
                blurred[dest] += mass * kernel.weight(d_row, d_col);
            }
        }
    }

    let before = belief.total();
    let after = blurred.sum();
    if before > 0.0 && after > 0.0 {
        blurred.mapv_inplace(|p| p * (before / after));
    }
    Ok(Belief::from_array(blurred))
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use ndarray::arr2;

    #[test]
    fn test_normalize_scales_to_one() {
        let out = normalize(&arr2(&[[0.15, 0.05], [0.05, 0.15]])).unwrap();
        assert_abs_diff_eq!(out.sum(), 1.0, epsilon = 1e-12);
        assert_abs_diff_eq!(out[[0, 0]], 0.375, epsilon = 1e-12);
        assert_abs_diff_eq!(out[[0, 1]], 0.125, epsilon = 1e-12);
    }

    #[test]
    fn test_normalize_zero_mass() {
        let err = normalize(&Array2::zeros((2, 2))).unwrap_err();
        assert!(matches!(err, LocalizerError::DegenerateDistribution(_)));
    }

    #[test]
    fn test_normalize_non_finite_mass() {
        let err = normalize(&arr2(&[[f64::INFINITY, 1.0]])).unwrap_err();
        assert!(matches!(err, LocalizerError::DegenerateDistribution(_)));
    }

    #[test]
    fn test_normalize_huge_finite_values() {
        let out = normalize(&arr2(&[[f64::MAX, f64::MAX / 3.0], [0.0, 0.0]])).unwrap();
        assert_abs_diff_eq!(out.sum(), 1.0, epsilon = 1e-12);
        assert_abs_diff_eq!(out[[0, 0]], 0.75, epsilon = 1e-12);
        assert_abs_diff_eq!(out[[0, 1]], 0.25, epsilon = 1e-12);
    }

    #[test]
    fn test_blur_keeps_non_unit_total() {
        let belief = Belief::from_rows(vec![vec![0.25, 0.25], vec![0.0, 0.0]]).unwrap();
        for blurring in [0.0, 0.1, 0.5, 1.0] {
            let blurred = blur(&belief, blurring).unwrap();
            assert_abs_diff_eq!(blurred.total(), 0.5, epsilon = 1e-12);
        }
    }

    #[test]
    fn test_blur_passes_all_zero_belief() {
        let belief = Belief::from_rows(vec![vec![0.0; 3]; 2]).unwrap();
        for blurring in [0.0, 0.1, 1.0] {
            let blurred = blur(&belief, blurring).unwrap();
            assert_eq!(blurred, belief);
        }
    }

    #[test]
    fn test_kernel_weights_sum_to_one() {
        for blurring in [0.0, 0.1, 0.12, 0.5, 1.0] {
            let kernel = BlurKernel::new(blurring).unwrap();
            assert_abs_diff_eq!(kernel.total(), 1.0, epsilon = 1e-12);
        }
    }

    #[test]
    fn test_kernel_rejects_out_of_range() {
        assert!(BlurKernel::new(-0.1).is_err());
        assert!(BlurKernel::new(1.5).is_err());
        assert!(BlurKernel::new(f64::NAN).is_err());
    }

    #[test]
    fn test_zero_blur_is_exact_noop() {
        let belief = Belief::from_rows(vec![vec![0.7, 0.1], vec![0.2, 0.0]]).unwrap();
        assert_eq!(blur(&belief, 0.0).unwrap(), belief);
    }

    #[test]
    fn test_point_mass_spreads_to_neighbours() {
        let mut rows = vec![vec![0.0; 5]; 5];
        rows[2][2] = 1.0;
        let belief = Belief::from_rows(rows).unwrap();

        let blurred = blur(&belief, 0.12).unwrap();
        assert_abs_diff_eq!(blurred.total(), 1.0, epsilon = 1e-12);
        assert_abs_diff_eq!(blurred.get(2, 2).unwrap(), 0.88, epsilon = 1e-12);
        assert_abs_diff_eq!(blurred.get(1, 2).unwrap(), 0.02, epsilon = 1e-12);
        assert_abs_diff_eq!(blurred.get(3, 3).unwrap(), 0.01, epsilon = 1e-12);
        assert_eq!(blurred.get(0, 0).unwrap(), 0.0);
    }

    #[test]
    fn test_blur_wraps_around_edges() {
        let mut rows = vec![vec![0.0; 4]; 3];
        rows[0][0] = 1.0;
        let belief = Belief::from_rows(rows).unwrap();

        let blurred = blur(&belief, 0.6).unwrap();
        assert_abs_diff_eq!(blurred.get(2, 0).unwrap(), 0.1, epsilon = 1e-12);
        assert_abs_diff_eq!(blurred.get(0, 3).unwrap(), 0.1, epsilon = 1e-12);
        assert_abs_diff_eq!(blurred.get(2, 3).unwrap(), 0.05, epsilon = 1e-12);
    }

    #[test]
    fn test_blur_conserves_mass_on_tiny_grids() {
        for (h, w) in [(1, 1), (1, 4), (2, 2), (2, 3)] {
            let belief = Belief::uniform(h, w).unwrap();
            let blurred = blur(&belief, 0.9).unwrap();
            assert_abs_diff_eq!(blurred.total(), 1.0, epsilon = 1e-12);
        }
    }

    #[test]
    fn test_uniform_is_blur_fixed_point() {
        let belief = Belief::uniform(4, 6).unwrap();
        let blurred = blur(&belief, 0.3).unwrap();
        for &p in blurred.as_array().iter() {
            assert_abs_diff_eq!(p, 1.0 / 24.0, epsilon = 1e-12);
        }
    }
}
