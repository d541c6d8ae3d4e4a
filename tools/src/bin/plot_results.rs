//! plot-results: PNG charts from run output.
//!
//! Usage:
//!   plot-results <sequential|parallel|comparison|scaling> [--root dir] [--results dir]
//!
//! Runs are read from <root>/sequential/output and <root>/parallel/output;
//! charts go to <results> (default <root>/results).

use anyhow::Result;
use epidemic_core::{
    render::charts::{plot_comparison, plot_epidemic_evolution, plot_scaling},
    scaling,
    statistics::read_csv,
};
use sir_tools::args::arg_value;
use std::{
    env, fs,
    path::{Path, PathBuf},
    process,
};

const USAGE: &str =
    "Usage: plot-results <sequential|parallel|comparison|scaling> [--root dir] [--results dir]";

fn main() -> Result<()> {
    env_logger::init();

    let args: Vec<String> = env::args().skip(1).collect();
    let Some(mode) = args.first().map(String::as_str).filter(|a| !a.starts_with("--")) else {
        println!("{USAGE}");
        process::exit(1);
    };
    let root = PathBuf::from(arg_value(&args, "--root").unwrap_or("."));
    let results = arg_value(&args, "--results")
        .map(PathBuf::from)
        .unwrap_or_else(|| root.join("results"));
    let stats_of = |run: &str| root.join(run).join("output").join("statistics.csv");

    match mode {
        "sequential" | "parallel" => {
            let records = read_csv(stats_of(mode))?;
            let title = if mode == "sequential" {
                "Epidemic evolution - Sequential"
            } else {
                "Epidemic evolution - Parallel"
            };
            let output = prepare(&results, &format!("{mode}_evolution.png"))?;
            plot_epidemic_evolution(&records, &output, title)?;
            println!("Chart saved: {}", output.display());
        }
        "comparison" => {
            let sequential = read_csv(stats_of("sequential"))?;
            let parallel = read_csv(stats_of("parallel"))?;
            let output = prepare(&results, "comparison.png")?;
            plot_comparison(&sequential, &parallel, &output)?;
            println!("Comparison saved: {}", output.display());
        }
        "scaling" => {
            let points = scaling::load_csv(results.join("scaling_results.csv"))?;
            let output = prepare(&results, "scaling_analysis.png")?;
            plot_scaling(&points, &output)?;
            println!("Scaling analysis saved: {}", output.display());
        }
        other => {
            println!("Invalid mode '{other}'. Use: sequential, parallel, comparison or scaling");
            println!("{USAGE}");
        }
    }
    Ok(())
}

fn prepare(results: &Path, file: &str) -> Result<PathBuf> {
    fs::create_dir_all(results)?;
    Ok(results.join(file))
}
