pub mod belief;
pub mod grid;

pub use belief::Belief;
pub use grid::{wrap_index, Grid};
