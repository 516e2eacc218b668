use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;
use grid_localizer::scenario::{load_scenario, run_with};

#[derive(Parser, Debug)]
#[command(name = "localizer")]
#[command(about = "Histogram filter localization over a colored toroidal grid", long_about = None)]
struct Args {
    /// Scenario file (.json or .json.gz)
    #[arg(value_name = "SCENARIO")]
    scenario: PathBuf,

    /// Likelihood multiplier when the reading matches the cell color
    #[arg(long)]
    p_hit: Option<f64>,

    /// Likelihood multiplier when the reading does not match
    #[arg(long)]
    p_miss: Option<f64>,

    /// Fraction of mass leaked to neighbouring cells per move, in [0, 1]
    #[arg(long)]
    blurring: Option<f64>,

    /// Decimal places when printing beliefs
    #[arg(long, default_value = "3")]
    precision: usize,

    /// Print the belief after every step, not just the last
    #[arg(long)]
    verbose: bool,

    /// Write the JSON run report here
    #[arg(long)]
    report: Option<PathBuf>,
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = Args::parse();

    let scenario = load_scenario(&args.scenario)?;
    let config = scenario
        .config()
        .with_overrides(args.p_hit, args.p_miss, args.blurring);
    config.validate()?;

    log::info!("Loaded {}", args.scenario.display());
    log::info!(
        "  Grid: {}x{}, {} steps",
        scenario.grid.len(),
        scenario.grid.first().map(Vec::len).unwrap_or(0),
        scenario.steps.len()
    );
    log::info!(
        "  p_hit={} p_miss={} blurring={}",
        config.p_hit,
        config.p_miss,
        config.blurring
    );

    let report = run_with(&scenario, config, |step, belief| {
        if args.verbose {
            println!(
                "step {} (saw {}, moved {:?}):\n{}\n",
                step.step,
                step.observation,
                step.motion,
                belief.render(args.precision)
            );
        }
    })?;

    println!("Final belief:");
    for row in &report.final_belief {
        let cells: Vec<String> = row
            .iter()
            .map(|p| format!("{:.*}", args.precision, p))
            .collect();
        println!("  {}", cells.join(" "));
    }
    println!(
        "Most likely cell: ({}, {}) p={:.*}",
        report.most_likely.0, report.most_likely.1, args.precision, report.probability
    );

    if let Some(path) = &args.report {
        std::fs::write(path, serde_json::to_string_pretty(&report)?)?;
        log::info!("Report written to {}", path.display());
    }

    Ok(())
}
