use thiserror::Error;

/// Localizer error types
#[derive(Error, Debug, Clone, PartialEq)]
pub enum LocalizerError {
    #[error("Invalid grid: {0}")]
    InvalidGrid(String),

    #[error("Degenerate distribution: {0}")]
    DegenerateDistribution(String),

    #[error("Dimension mismatch: {0}")]
    DimensionMismatch(String),

    #[error("Invalid parameters: {0}")]
    InvalidParameters(String),
}

/// Result type for filter operations
pub type LocResult<T> = Result<T, LocalizerError>;

/// Reject a shape pair that disagrees, naming both sides
pub fn check_dims(what: &str, expected: (usize, usize), found: (usize, usize)) -> LocResult<()> {
    if expected != found {
        return Err(LocalizerError::DimensionMismatch(format!(
            "{} is {}x{}, expected {}x{}",
            what, found.0, found.1, expected.0, expected.1
        )));
    }
    Ok(())
}
