//! compare-runs: check that two runs agree and analyse their timings.
//!
//! Usage:
//!   compare-runs <seq_stats.csv> <par_stats.csv> [<seq_time.txt> <par_time.txt>] [--report path]

use anyhow::Result;
use epidemic_core::{
    compare::{render_execution_analysis, StatsComparison, SummaryReport},
    statistics::read_csv,
    timing::{ExecutionTime, Speedup},
};
use sir_tools::args::{arg_value, positional_args};
use std::{env, path::Path, process};

const DEFAULT_REPORT: &str = "results/comparison_report.txt";
const USAGE: &str =
    "Usage: compare-runs <seq_stats.csv> <par_stats.csv> [<seq_time.txt> <par_time.txt>] [--report path]";

fn main() -> Result<()> {
    env_logger::init();

    let args: Vec<String> = env::args().skip(1).collect();
    let positional = positional_args(&args, &["--report"]);
    if positional.len() < 2 {
        eprintln!("{USAGE}");
        process::exit(1);
    }
    let report_path = arg_value(&args, "--report").unwrap_or(DEFAULT_REPORT);

    let sequential = read_csv(positional[0])?;
    let parallel = read_csv(positional[1])?;
    let comparison = StatsComparison::compute(&sequential, &parallel)?;
    println!("{}", comparison.render());

    if let [_, _, seq_time, par_time, ..] = positional.as_slice() {
        let seq = ExecutionTime::load(Path::new(seq_time))?;
        let par = ExecutionTime::load(Path::new(par_time))?;
        let speedup = Speedup::between(&seq, &par);
        println!();
        println!("{}", render_execution_analysis(&speedup));

        let report = SummaryReport { comparison: &comparison, speedup: &speedup };
        report.save(Path::new(report_path))?;
        println!();
        println!("Report saved to: {report_path}");
    }

    println!();
    println!("Comparison complete.");
    Ok(())
}
