//! Random-world localization run
//!
//! Builds a random color grid, hides a robot somewhere on it and lets the
//! histogram filter chase it with noisy readings and slipping moves.

use anyhow::Result;
use clap::Parser;
use grid_localizer::simulate::{random_grid, Simulation};
use grid_localizer::FilterConfig;
use rand::rngs::StdRng;
use rand::SeedableRng;

#[derive(Parser, Debug)]
#[command(name = "simulate")]
struct Args {
    /// RNG seed for the world, the start cell and the noise
    #[arg(long, default_value = "0")]
    seed: u64,

    #[arg(long, default_value = "5")]
    height: usize,

    #[arg(long, default_value = "5")]
    width: usize,

    /// Number of sense/move steps
    #[arg(long, default_value = "25")]
    steps: usize,

    /// Comma-separated color palette
    #[arg(long, default_value = "red,green", value_delimiter = ',')]
    colors: Vec<String>,

    #[arg(long)]
    p_hit: Option<f64>,

    #[arg(long)]
    p_miss: Option<f64>,

    #[arg(long)]
    blurring: Option<f64>,

    /// Print the summary as JSON
    #[arg(long, default_value_t = false)]
    json: bool,
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = Args::parse();

    let config = FilterConfig::default().with_overrides(args.p_hit, args.p_miss, args.blurring);
    config.validate()?;

    let mut rng = StdRng::seed_from_u64(args.seed);
    let grid = random_grid(args.height, args.width, &args.colors, &mut rng)?;
    let mut sim = Simulation::new(grid, config, args.seed.wrapping_add(1))?;
    log::info!(
        "Simulating {} steps on a {}x{} grid, robot starts at {:?}",
        args.steps,
        args.height,
        args.width,
        sim.true_position()
    );

    let summary = sim.run(args.steps)?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
    } else {
        println!("{}", sim.filter().belief());
        println!(
            "True cell {:?}, estimate correct on {}/{} steps, final p={:.3}",
            sim.true_position(),
            summary.correct_estimates,
            summary.steps,
            summary.final_probability
        );
    }

    Ok(())
}
