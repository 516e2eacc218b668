//! Discrete Bayes (histogram) filter over a toroidal color grid.
//!
//! The free functions are pure: each takes a belief and returns a new one.
//! [`HistogramFilter`] threads the belief through them for callers that
//! prefer a stateful loop.

use ndarray::{Array2, Zip};

use crate::config::{FilterConfig, SensorModel};
use crate::error::{check_dims, LocResult};
use crate::smoothing::{blur, normalize};
use crate::types::{wrap_index, Belief, Grid};

/// Uniform prior over every cell of the grid
pub fn initialize_beliefs<C>(grid: &Grid<C>) -> LocResult<Belief> {
    let (height, width) = grid.dims();
    Belief::uniform(height, width)
}

/// Measurement update for one color reading
///
/// Cells whose color matches `color` are weighted by `p_hit`, all others by
/// `p_miss`, then the posterior is renormalized.
pub fn sense<C: PartialEq>(
    color: &C,
    grid: &Grid<C>,
    beliefs: &Belief,
    p_hit: f64,
    p_miss: f64,
) -> LocResult<Belief> {
    let model = SensorModel::new(p_hit, p_miss)?;
    check_dims("belief", grid.dims(), beliefs.dims())?;

    let unnormalized = Zip::from(grid.cells())
        .and(beliefs.as_array())
        .map_collect(|cell, &prior| prior * model.likelihood(cell == color));

    let posterior = normalize(&unnormalized).map_err(|e| {
        log::warn!("sense update collapsed (p_hit={p_hit}, p_miss={p_miss}): {e}");
        e
    })?;
    Ok(Belief::from_array(posterior))
}

/// Deterministic part of the motion update
///
/// Moves the mass in cell (i, j) to ((i + dy) mod H, (j + dx) mod W). The
/// mapping is a bijection on the torus, so every destination receives
/// exactly one source value.
pub fn shift(dy: i64, dx: i64, beliefs: &Belief) -> Belief {
    let (height, width) = beliefs.dims();
    let mut shifted = Array2::<f64>::zeros((height, width));
    for ((row, col), &mass) in beliefs.as_array().indexed_iter() {
        shifted[[wrap_index(row, dy, height), wrap_index(col, dx, width)]] = mass;
    }
    Belief::from_array(shifted)
}

/// Motion update: shift by (dy, dx) then blur for execution noise
pub fn move_beliefs(dy: i64, dx: i64, beliefs: &Belief, blurring: f64) -> LocResult<Belief> {
    blur(&shift(dy, dx, beliefs), blurring)
}

/// Stateful histogram filter over a fixed grid
///
/// Each update replaces the belief with the result of the pure step. A
/// failed update leaves the previous belief in place.
#[derive(Clone, Debug)]
pub struct HistogramFilter<C> {
    grid: Grid<C>,
    config: FilterConfig,
    belief: Belief,
    steps: u64,
}

impl<C: PartialEq> HistogramFilter<C> {
    pub fn new(grid: Grid<C>, config: FilterConfig) -> LocResult<Self> {
        config.validate()?;
        let belief = initialize_beliefs(&grid)?;
        Ok(HistogramFilter {
            grid,
            config,
            belief,
            steps: 0,
        })
    }

    pub fn sense(&mut self, color: &C) -> LocResult<&Belief> {
        let posterior = sense(
            color,
            &self.grid,
            &self.belief,
            self.config.p_hit,
            self.config.p_miss,
        )?;
        Ok(self.commit(posterior))
    }

    pub fn move_by(&mut self, dy: i64, dx: i64) -> LocResult<&Belief> {
        let moved = move_beliefs(dy, dx, &self.belief, self.config.blurring)?;
        Ok(self.commit(moved))
    }

    /// Sense then move as a single update
    ///
    /// If either half fails the belief is unchanged.
    pub fn step(&mut self, color: &C, motion: (i64, i64)) -> LocResult<&Belief> {
        let posterior = sense(
            color,
            &self.grid,
            &self.belief,
            self.config.p_hit,
            self.config.p_miss,
        )?;
        let moved = move_beliefs(motion.0, motion.1, &posterior, self.config.blurring)?;
        Ok(self.commit(moved))
    }

    /// Back to the uniform prior
    pub fn reset(&mut self) -> LocResult<()> {
        self.belief = initialize_beliefs(&self.grid)?;
        self.steps = 0;
        Ok(())
    }

    pub fn belief(&self) -> &Belief {
        &self.belief
    }

    pub fn grid(&self) -> &Grid<C> {
        &self.grid
    }

    pub fn config(&self) -> &FilterConfig {
        &self.config
    }

    /// Number of completed updates since construction or the last reset
    pub fn steps(&self) -> u64 {
        self.steps
    }

    fn commit(&mut self, belief: Belief) -> &Belief {
        self.belief = belief;
        self.steps += 1;
        let (row, col, p) = self.belief.most_likely();
        log::debug!(
            "update {}: most likely cell ({}, {}) p={:.4}",
            self.steps,
            row,
            col,
            p
        );
        &self.belief
    }
}
