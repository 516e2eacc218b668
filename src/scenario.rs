//! Scripted localization runs loaded from JSON.
//!
//! A scenario file holds the color grid, the sequence of
//! (observation, motion) pairs, and optionally the filter tuning:
//!
//! ```text
//! {
//!   "grid": [["r", "g"], ["g", "r"]],
//!   "filter": { "p_hit": 0.6, "p_miss": 0.2, "blurring": 0.12 },
//!   "steps": [ { "observation": "r", "motion": [1, 0] } ]
//! }
//! ```
//!
//! Files ending in `.gz` are read through a gzip decoder.

use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use flate2::read::GzDecoder;
use serde::{Deserialize, Serialize};

use crate::config::FilterConfig;
use crate::error::LocResult;
use crate::filters::HistogramFilter;
use crate::types::{Belief, Grid};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ScenarioStep {
    pub observation: String,
    /// (dy, dx), applied after the observation
    #[serde(default)]
    pub motion: [i64; 2],
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Scenario {
    pub grid: Vec<Vec<String>>,
    #[serde(default)]
    pub steps: Vec<ScenarioStep>,
    #[serde(default)]
    pub filter: Option<FilterConfig>,
}

impl Scenario {
    pub fn grid(&self) -> LocResult<Grid<String>> {
        Grid::from_rows(self.grid.clone())
    }

    /// Tuning embedded in the file, or the defaults
    pub fn config(&self) -> FilterConfig {
        self.filter.unwrap_or_default()
    }
}

pub fn load_scenario(path: &Path) -> anyhow::Result<Scenario> {
    let file = File::open(path)?;
    if path.extension().map(|e| e == "gz").unwrap_or(false) {
        let gz = GzDecoder::new(file);
        let reader = BufReader::new(gz);
        Ok(serde_json::from_reader(reader)?)
    } else {
        let reader = BufReader::new(file);
        Ok(serde_json::from_reader(reader)?)
    }
}

#[derive(Clone, Debug, Serialize)]
pub struct StepReport {
    pub step: usize,
    pub observation: String,
    pub motion: [i64; 2],
    pub most_likely: (usize, usize),
    pub probability: f64,
}

#[derive(Clone, Debug, Serialize)]
pub struct RunReport {
    pub generated_at: String,
    pub config: FilterConfig,
    pub steps: Vec<StepReport>,
    pub most_likely: (usize, usize),
    pub probability: f64,
    pub final_belief: Vec<Vec<f64>>,
}

/// Run every step of the scenario with the given tuning
pub fn run(scenario: &Scenario, config: FilterConfig) -> LocResult<RunReport> {
    run_with(scenario, config, |_, _| {})
}

/// Run the scenario, calling `on_step` with each step's report and belief
pub fn run_with<F>(scenario: &Scenario, config: FilterConfig, mut on_step: F) -> LocResult<RunReport>
where
    F: FnMut(&StepReport, &Belief),
{
    let mut filter = HistogramFilter::new(scenario.grid()?, config)?;
    let mut steps = Vec::with_capacity(scenario.steps.len());

    for (index, scripted) in scenario.steps.iter().enumerate() {
        let [dy, dx] = scripted.motion;
        let belief = filter.step(&scripted.observation, (dy, dx))?;
        let (row, col, probability) = belief.most_likely();
        let report = StepReport {
            step: index + 1,
            observation: scripted.observation.clone(),
            motion: scripted.motion,
            most_likely: (row, col),
            probability,
        };
        on_step(&report, belief);
        steps.push(report);
    }

    let belief = filter.belief();
    let (row, col, probability) = belief.most_likely();
    log::info!(
        "scenario finished after {} steps: most likely cell ({}, {}) p={:.4}",
        steps.len(),
        row,
        col,
        probability
    );

    Ok(RunReport {
        generated_at: chrono::Utc::now().to_rfc3339(),
        config,
        steps,
        most_likely: (row, col),
        probability,
        final_belief: belief.to_rows(),
    })
}
