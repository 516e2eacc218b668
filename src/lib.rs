//! Two-dimensional discrete Bayes localization on a toroidal color grid.
//!
//! The belief over robot positions is updated by alternating a sense step
//! (hit/miss color likelihood) and a move step (toroidal shift followed by a
//! motion-noise blur). Both steps are pure functions over immutable
//! [`Belief`] values.

pub mod config;
pub mod error;
pub mod filters;
pub mod scenario;
pub mod simulate;
pub mod smoothing;
pub mod types;

pub use config::{FilterConfig, SensorModel};
pub use error::{LocResult, LocalizerError};
pub use filters::{initialize_beliefs, move_beliefs, sense, shift, HistogramFilter};
pub use smoothing::{blur, normalize, BlurKernel};
pub use types::{Belief, Grid};
