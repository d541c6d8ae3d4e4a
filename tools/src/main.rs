//! sir-sim: headless runner for the SIRD grid epidemic.
//!
//! Usage:
//!   sir-sim --mode sequential
//!   sir-sim --mode parallel --threads 8 --output parallel/output
//!   sir-sim --mode scaling --days 100
//!   sir-sim --config data/sim_config.json --seed 7 --days 200 --quiet

use anyhow::{bail, Result};
use epidemic_core::{
    config::SimConfig,
    engine::{RunOutput, RunSummary, SimulationDriver},
    scaling::{self, ScalingTable, DEFAULT_SCALING_DAYS, DEFAULT_THREAD_COUNTS},
    types::Day,
};
use sir_tools::args::{arg_value, parse_arg, thread_count};
use std::{env, fs, path::Path};

const DEFAULT_CONFIG: &str = "data/sim_config.json";
const RULE: &str = "=============================================================";

fn main() -> Result<()> {
    env_logger::init();

    let args: Vec<String> = env::args().collect();
    let mode = arg_value(&args, "--mode").unwrap_or("sequential");
    let quiet = args.iter().any(|a| a == "--quiet");
    let threads = thread_count(&args, available_cores());

    let mut config = load_config(arg_value(&args, "--config"))?;
    config.seed = parse_arg(&args, "--seed", config.seed);
    if mode != "scaling" {
        config.days = parse_arg(&args, "--days", config.days);
    }
    config.validate()?;
    log::debug!("Effective config: {}", serde_json::to_string(&config)?);

    match mode {
        "sequential" | "parallel" => {
            let default_output = format!("{mode}/output");
            let output = arg_value(&args, "--output").unwrap_or(&default_output);
            run_single(config, mode, threads, output, quiet)
        }
        "scaling" => {
            let days: Day = parse_arg(&args, "--days", DEFAULT_SCALING_DAYS);
            let output = arg_value(&args, "--output").unwrap_or("results");
            run_scaling(&config, days, output)
        }
        other => bail!("unknown mode '{other}' (expected sequential, parallel or scaling)"),
    }
}

fn load_config(path: Option<&str>) -> Result<SimConfig> {
    match path {
        Some(path) => SimConfig::load(path),
        None if Path::new(DEFAULT_CONFIG).exists() => SimConfig::load(DEFAULT_CONFIG),
        None => {
            log::warn!("{DEFAULT_CONFIG} not found, using built-in defaults");
            Ok(SimConfig::default())
        }
    }
}

fn run_single(config: SimConfig, mode: &str, threads: usize, output: &str, quiet: bool) -> Result<()> {
    let verbose = !quiet;
    let title = if mode == "parallel" { "PARALLEL" } else { "SEQUENTIAL" };
    if verbose {
        println!("{RULE}");
        println!("        SIR MONTE-CARLO SIMULATION - {title} VERSION");
        println!("{RULE}");
        println!();
        print_parameters(&config);
        if mode == "parallel" {
            println!("  Available cores:  {}", available_cores());
            println!("  Cores used:       {threads}");
        }
        println!();
        println!("Starting simulation...");
        println!();
    }

    let driver = if mode == "parallel" {
        SimulationDriver::parallel(config, threads)?
    } else {
        SimulationDriver::sequential(config)?
    };
    let mut driver = driver.with_output(output)?.verbose(verbose);
    let summary = driver.run()?;

    if verbose {
        print_summary(&summary, &RunOutput::in_dir(output));
    } else {
        println!(
            "{} run {}: {} days in {:.2}s",
            summary.engine, summary.run_id, summary.days_simulated, summary.execution_time.seconds
        );
    }
    Ok(())
}

fn run_scaling(config: &SimConfig, days: Day, output: &str) -> Result<()> {
    println!("{RULE}");
    println!("            STRONG SCALING EXPERIMENT");
    println!("{RULE}");
    println!();
    println!("  Grid:  {0}x{0}", config.grid_size);
    println!("  Days:  {days}");
    println!();

    let points = scaling::run_strong_scaling(config, &DEFAULT_THREAD_COUNTS, days)?;
    fs::create_dir_all(output)?;
    let csv_path = Path::new(output).join("scaling_results.csv");
    scaling::save_csv(&csv_path, &points)?;

    println!("{RULE}");
    println!("              SCALING RESULTS");
    println!("{RULE}");
    print!("{}", ScalingTable(&points));
    println!();
    println!("Saved {}", csv_path.display());
    Ok(())
}

fn print_parameters(config: &SimConfig) {
    println!("Parameters:");
    println!(
        "  Grid size:        {0}x{0} ({1} individuals)",
        config.grid_size,
        thousands(config.total_cells() as u64)
    );
    println!("  Days to simulate: {}", config.days);
    println!("  Initial infected: {}", config.initial_infected);
    println!("  P(infection):     {:.2}", config.model.infection_prob);
    println!("  P(recovery):      {:.2}", config.model.recovery_prob);
    println!("  P(death):         {:.2}", config.model.death_prob);
    println!("  Seed:             {}", config.seed);
}

fn print_summary(summary: &RunSummary, output: &RunOutput) {
    let last = &summary.final_record;
    let affected = last.counts().ever_infected();
    println!();
    println!("{RULE}");
    println!("                    RESULTS SUMMARY");
    println!("{RULE}");
    println!("Total execution time: {:.2} seconds", summary.execution_time.seconds);
    if let Some(cores) = summary.execution_time.cores {
        println!("Cores used: {cores}");
    }
    println!();
    println!("Final susceptible: {:>10}", thousands(last.susceptible));
    println!("Final infected:    {:>10}", thousands(last.infected));
    println!("Final recovered:   {:>10}", thousands(last.recovered));
    println!("Final dead:        {:>10}", thousands(last.dead));
    println!(
        "Total affected:    {:>10} ({:.2}%)",
        thousands(affected),
        summary.percent_affected()
    );
    println!();
    println!("Generated files:");
    println!("  - {}", output.stats_file.display());
    println!("  - {}", output.timing_file.display());
    println!("  - {}/", output.snapshot_dir.display());
    println!("  - {}", output.manifest.display());
    println!();
    println!("Run {} completed.", summary.run_id);
}

fn available_cores() -> usize {
    std::thread::available_parallelism().map(|n| n.get()).unwrap_or(1)
}

/// 1234567 -> "1,234,567".
fn thousands(n: u64) -> String {
    let digits = n.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    out
}
