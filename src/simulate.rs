//! Simulated robot driving a histogram filter over a known grid.

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use serde::Serialize;

use crate::config::{FilterConfig, SensorModel};
use crate::error::{LocResult, LocalizerError};
use crate::filters::HistogramFilter;
use crate::types::{wrap_index, Grid};

/// Grid of colors drawn uniformly from `colors`
pub fn random_grid<R: Rng>(
    height: usize,
    width: usize,
    colors: &[String],
    rng: &mut R,
) -> LocResult<Grid<String>> {
    if colors.is_empty() {
        return Err(LocalizerError::InvalidParameters(
            "at least one color is required".to_string(),
        ));
    }
    let rows: Vec<Vec<String>> = (0..height)
        .map(|_| {
            (0..width)
                .map(|_| colors[rng.gen_range(0..colors.len())].clone())
                .collect()
        })
        .collect();
    Grid::from_rows(rows)
}

#[derive(Clone, Debug, Serialize)]
pub struct SimulationStep {
    pub reading: String,
    pub motion: (i64, i64),
    pub true_position: (usize, usize),
    pub estimate: (usize, usize),
    pub probability: f64,
}

impl SimulationStep {
    pub fn is_correct(&self) -> bool {
        self.estimate == self.true_position
    }
}

#[derive(Clone, Debug, Serialize)]
pub struct SimulationSummary {
    pub steps: usize,
    pub correct_estimates: usize,
    pub final_correct: bool,
    pub final_probability: f64,
}

/// Robot with a hidden true position on a toroidal grid
///
/// Readings report the true color with probability
/// `p_hit / (p_hit + p_miss)`, otherwise another palette color. Moves
/// slip by one cell with probability `blurring`.
pub struct Simulation {
    filter: HistogramFilter<String>,
    sensor: SensorModel,
    palette: Vec<String>,
    true_position: (usize, usize),
    rng: StdRng,
}

impl Simulation {
    pub fn new(grid: Grid<String>, config: FilterConfig, seed: u64) -> LocResult<Self> {
        let mut rng = StdRng::seed_from_u64(seed);
        let true_position = (
            rng.gen_range(0..grid.height()),
            rng.gen_range(0..grid.width()),
        );
        Self::with_position(grid, config, true_position, rng)
    }

    /// Start from a known true position
    pub fn with_position(
        grid: Grid<String>,
        config: FilterConfig,
        true_position: (usize, usize),
        rng: StdRng,
    ) -> LocResult<Self> {
        let (height, width) = grid.dims();
        if true_position.0 >= height || true_position.1 >= width {
            return Err(LocalizerError::InvalidParameters(format!(
                "start {:?} outside {}x{} grid",
                true_position, height, width
            )));
        }
        let sensor = config.sensor_model()?;
        let palette = grid.palette();
        Ok(Simulation {
            filter: HistogramFilter::new(grid, config)?,
            sensor,
            palette,
            true_position,
            rng,
        })
    }

    pub fn filter(&self) -> &HistogramFilter<String> {
        &self.filter
    }

    pub fn true_position(&self) -> (usize, usize) {
        self.true_position
    }

    /// Noisy color reading at the true position
    pub fn read_sensor(&mut self) -> String {
        let (row, col) = self.true_position;
        let truth = self.filter.grid().get_wrapped(row as i64, col as i64).clone();
        if self.rng.gen_bool(self.sensor.hit_rate()) {
            return truth;
        }
        let others: Vec<&String> = self.palette.iter().filter(|c| **c != truth).collect();
        match others.choose(&mut self.rng) {
            Some(other) => (*other).clone(),
            None => truth,
        }
    }

    /// Apply a commanded move to the true position, slipping one cell with
    /// probability `blurring`
    fn actuate(&mut self, dy: i64, dx: i64) {
        let (mut dy, mut dx) = (dy, dx);
        if self.rng.gen_bool(self.filter.config().blurring) {
            dy += self.rng.gen_range(-1..=1);
            dx += self.rng.gen_range(-1..=1);
        }
        let (height, width) = self.filter.grid().dims();
        self.true_position = (
            wrap_index(self.true_position.0, dy, height),
            wrap_index(self.true_position.1, dx, width),
        );
    }

    /// Read the sensor, update the filter, then move by (dy, dx)
    pub fn step(&mut self, dy: i64, dx: i64) -> LocResult<SimulationStep> {
        let reading = self.read_sensor();
        let belief = self.filter.step(&reading, (dy, dx))?;
        let (row, col, probability) = belief.most_likely();
        self.actuate(dy, dx);
        Ok(SimulationStep {
            reading,
            motion: (dy, dx),
            true_position: self.true_position,
            estimate: (row, col),
            probability,
        })
    }

    /// Random walk of `steps` moves, each component drawn from -1..=1
    pub fn run(&mut self, steps: usize) -> LocResult<SimulationSummary> {
        let mut correct_estimates = 0;
        let mut last: Option<SimulationStep> = None;
        for _ in 0..steps {
            let dy = self.rng.gen_range(-1..=1);
            let dx = self.rng.gen_range(-1..=1);
            let outcome = self.step(dy, dx)?;
            if outcome.is_correct() {
                correct_estimates += 1;
            }
            log::debug!(
                "true {:?} estimate {:?} p={:.3} reading {}",
                outcome.true_position,
                outcome.estimate,
                outcome.probability,
                outcome.reading
            );
            last = Some(outcome);
        }
        Ok(SimulationSummary {
            steps,
            correct_estimates,
            final_correct: last.as_ref().map(SimulationStep::is_correct).unwrap_or(false),
            final_probability: last.map(|s| s.probability).unwrap_or(0.0),
        })
    }
}
