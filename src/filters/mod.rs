pub mod histogram;

pub use histogram::{initialize_beliefs, move_beliefs, sense, shift, HistogramFilter};
