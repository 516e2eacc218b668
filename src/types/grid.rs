//! Fixed color map the robot localizes against.

use ndarray::Array2;

use crate::error::{LocResult, LocalizerError};

/// Immutable H×W array of color labels
///
/// Rows and columns wrap around: the cell past the last column is column 0,
/// the cell above row 0 is the last row.
#[derive(Clone, Debug, PartialEq)]
pub struct Grid<C> {
    cells: Array2<C>,
}

impl<C> Grid<C> {
    /// Build a grid from row vectors
    ///
    /// Rejects an empty grid and rows of unequal length.
    pub fn from_rows(rows: Vec<Vec<C>>) -> LocResult<Self> {
        let (height, width) = rectangular_dims(&rows).map_err(LocalizerError::InvalidGrid)?;
        let flat: Vec<C> = rows.into_iter().flatten().collect();
        let cells = Array2::from_shape_vec((height, width), flat)
            .map_err(|e| LocalizerError::InvalidGrid(format!("Failed to build grid array: {e}")))?;
        Ok(Grid { cells })
    }

    /// (height, width)
    pub fn dims(&self) -> (usize, usize) {
        self.cells.dim()
    }

    pub fn height(&self) -> usize {
        self.cells.nrows()
    }

    pub fn width(&self) -> usize {
        self.cells.ncols()
    }

    pub fn get(&self, row: usize, col: usize) -> Option<&C> {
        self.cells.get((row, col))
    }

    /// Color at a position that wraps around both axes
    pub fn get_wrapped(&self, row: i64, col: i64) -> &C {
        let (height, width) = self.dims();
        &self.cells[[wrap_index(0, row, height), wrap_index(0, col, width)]]
    }

    pub fn cells(&self) -> &Array2<C> {
        &self.cells
    }
}

impl<C: Clone + PartialEq> Grid<C> {
    /// Distinct colors in row-major order of first appearance
    pub fn palette(&self) -> Vec<C> {
        let mut colors: Vec<C> = Vec::new();
        for color in self.cells.iter() {
            if !colors.contains(color) {
                colors.push(color.clone());
            }
        }
        colors
    }
}

/// Apply a signed offset to an index on a ring of `len` cells
///
/// Uses a Euclidean modulo so negative offsets land on the opposite edge.
/// `len` must be non-zero.
pub fn wrap_index(index: usize, offset: i64, len: usize) -> usize {
    let len = len as i64;
    let offset = offset.rem_euclid(len);
    ((index as i64 % len + offset) % len) as usize
}

/// Shape of a row-vector table, or a message describing why it isn't one
pub(crate) fn rectangular_dims<T>(rows: &[Vec<T>]) -> Result<(usize, usize), String> {
    let height = rows.len();
    let width = rows.first().map(Vec::len).unwrap_or(0);
    if height == 0 || width == 0 {
        return Err(format!("zero-area grid ({height}x{width})"));
    }
    if let Some((row, cells)) = rows.iter().enumerate().find(|(_, r)| r.len() != width) {
        return Err(format!(
            "row {} has {} cells, expected {}",
            row,
            cells.len(),
            width
        ));
    }
    Ok((height, width))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn checkerboard() -> Grid<char> {
        Grid::from_rows(vec![vec!['r', 'g', 'r'], vec!['g', 'r', 'g']]).unwrap()
    }

    #[test]
    fn test_from_rows_dims() {
        let grid = checkerboard();
        assert_eq!(grid.dims(), (2, 3));
        assert_eq!(grid.get(1, 2), Some(&'g'));
        assert_eq!(grid.get(2, 0), None);
    }

    #[test]
    fn test_empty_grid_rejected() {
        let err = Grid::<char>::from_rows(vec![]).unwrap_err();
        assert!(matches!(err, LocalizerError::InvalidGrid(_)));

        let err = Grid::<char>::from_rows(vec![vec![], vec![]]).unwrap_err();
        assert!(matches!(err, LocalizerError::InvalidGrid(_)));
    }

    #[test]
    fn test_ragged_grid_rejected() {
        let err = Grid::from_rows(vec![vec![1, 2], vec![3]]).unwrap_err();
        assert_eq!(
            err,
            LocalizerError::InvalidGrid("row 1 has 1 cells, expected 2".to_string())
        );
    }

    #[test]
    fn test_wrap_index_negative_offsets() {
        assert_eq!(wrap_index(0, -1, 4), 3);
        assert_eq!(wrap_index(1, -6, 4), 3);
        assert_eq!(wrap_index(3, 1, 4), 0);
        assert_eq!(wrap_index(2, 4, 4), 2);
        assert_eq!(wrap_index(0, i64::MIN, 3), (i64::MIN.rem_euclid(3)) as usize);
    }

    #[test]
    fn test_get_wrapped() {
        let grid = checkerboard();
        assert_eq!(*grid.get_wrapped(-1, -1), 'g');
        assert_eq!(*grid.get_wrapped(2, 3), 'r');
    }

    #[test]
    fn test_palette_order() {
        assert_eq!(checkerboard().palette(), vec!['r', 'g']);
    }
}
