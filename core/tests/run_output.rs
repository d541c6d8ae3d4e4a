//! Files written by a run: statistics CSV, timing file, run manifest.

use epidemic_core::{
    config::{ModelConfig, SimConfig},
    engine::{RunOutput, SimulationDriver},
    manifest::{RunManifest, StopReason},
    statistics::{check_conservation, is_monotonic, read_csv},
    timing::ExecutionTime,
};
use std::fs;

#[test]
fn statistics_csv_has_exact_header_and_one_row_per_day() {
    let dir = tempfile::tempdir().unwrap();
    let mut driver = SimulationDriver::sequential(SimConfig::default_test())
        .unwrap()
        .with_output(dir.path())
        .unwrap();
    let summary = driver.run().unwrap();

    let layout = RunOutput::in_dir(dir.path());
    let content = fs::read_to_string(&layout.stats_file).unwrap();
    assert_eq!(content.lines().next(), Some("Day,Susceptible,Infected,Recovered,Dead,R0"));

    let records = read_csv(&layout.stats_file).unwrap();
    assert_eq!(records.len() as u64, summary.days_simulated + 1);
    for (i, record) in records.iter().enumerate() {
        assert_eq!(record.day, i as u64, "days must increase by 1 from 0");
    }
    assert_eq!(records.last().unwrap().infected, summary.final_record.infected);
}

#[test]
fn written_rows_round_trip_to_four_decimals() {
    let dir = tempfile::tempdir().unwrap();
    let mut driver = SimulationDriver::sequential(SimConfig::default_test())
        .unwrap()
        .with_output(dir.path())
        .unwrap();
    driver.run().unwrap();

    let records = read_csv(RunOutput::in_dir(dir.path()).stats_file).unwrap();
    for (read, live) in records.iter().zip(driver.history()) {
        assert_eq!(read.counts(), live.counts());
        assert!((read.r0 - live.r0).abs() < 5e-5, "day {}: R0 {} vs {}", read.day, read.r0, live.r0);
    }
}

#[test]
fn population_is_conserved_and_absorbing_states_grow() {
    let mut driver = SimulationDriver::sequential(SimConfig::default_test()).unwrap();
    driver.run().unwrap();
    let history = driver.history();

    check_conservation(history).unwrap();
    assert!(is_monotonic(history), "dead/recovered decreased or susceptible increased");
    let cells = SimConfig::default_test().total_cells() as u64;
    assert!(history.iter().all(|r| r.population() == cells));
}

#[test]
fn sequential_timing_file_has_one_line() {
    let dir = tempfile::tempdir().unwrap();
    let mut driver = SimulationDriver::sequential(SimConfig::default_test())
        .unwrap()
        .with_output(dir.path())
        .unwrap();
    driver.run().unwrap();

    let path = RunOutput::in_dir(dir.path()).timing_file;
    let content = fs::read_to_string(&path).unwrap();
    assert_eq!(content.lines().count(), 1);
    let timing = ExecutionTime::load(&path).unwrap();
    assert_eq!(timing.core_count(), 1);
    assert!(timing.seconds >= 0.0);
}

#[test]
fn parallel_timing_file_carries_the_core_count() {
    let dir = tempfile::tempdir().unwrap();
    let mut driver = SimulationDriver::parallel(SimConfig::default_test(), 3)
        .unwrap()
        .with_output(dir.path())
        .unwrap();
    driver.run().unwrap();

    let path = RunOutput::in_dir(dir.path()).timing_file;
    let content = fs::read_to_string(&path).unwrap();
    assert_eq!(content.lines().nth(1), Some("3"));
    assert_eq!(ExecutionTime::load(&path).unwrap().core_count(), 3);
}

#[test]
fn epidemic_that_dies_out_stops_early() {
    // Everyone infected recovers on day 1 and nobody can be infected.
    let config = SimConfig {
        days: 365,
        model: ModelConfig { infection_prob: 0.0, recovery_prob: 1.0, death_prob: 0.0 },
        ..SimConfig::default_test()
    };
    let dir = tempfile::tempdir().unwrap();
    let mut driver = SimulationDriver::sequential(config.clone())
        .unwrap()
        .with_output(dir.path())
        .unwrap();
    let summary = driver.run().unwrap();

    assert_eq!(summary.stop_reason, StopReason::NoInfected);
    assert_eq!(summary.days_simulated, 1);
    assert_eq!(summary.final_record.infected, 0);
    assert_eq!(summary.final_record.recovered, config.initial_infected as u64);

    let records = read_csv(RunOutput::in_dir(dir.path()).stats_file).unwrap();
    assert_eq!(records.len(), 2, "day 0 and the final day are both recorded");
}

#[test]
fn run_without_infected_stops_at_day_zero() {
    let config = SimConfig { initial_infected: 0, ..SimConfig::default_test() };
    let mut driver = SimulationDriver::sequential(config).unwrap();
    let summary = driver.run().unwrap();
    assert_eq!(summary.days_simulated, 0);
    assert_eq!(summary.stop_reason, StopReason::NoInfected);
    assert_eq!(driver.history().len(), 1);
}

#[test]
fn manifest_records_the_run() {
    let dir = tempfile::tempdir().unwrap();
    let mut driver = SimulationDriver::parallel(SimConfig::default_test(), 2)
        .unwrap()
        .with_output(dir.path())
        .unwrap();
    let summary = driver.run().unwrap();

    let manifest = RunManifest::load(&RunOutput::in_dir(dir.path()).manifest).unwrap();
    assert_eq!(manifest.run_id, summary.run_id);
    assert_eq!(manifest.engine, "parallel");
    assert_eq!(manifest.workers, 2);
    assert_eq!(manifest.r0_estimator, "cumulative_ratio");
    assert_eq!(manifest.days_simulated, summary.days_simulated);
    assert_eq!(manifest.config, SimConfig::default_test());
}

#[test]
fn sequential_and_parallel_manifests_are_comparable() {
    let seq_dir = tempfile::tempdir().unwrap();
    let par_dir = tempfile::tempdir().unwrap();
    SimulationDriver::sequential(SimConfig::default_test())
        .unwrap()
        .with_output(seq_dir.path())
        .unwrap()
        .run()
        .unwrap();
    SimulationDriver::parallel(SimConfig::default_test(), 4)
        .unwrap()
        .with_output(par_dir.path())
        .unwrap()
        .run()
        .unwrap();

    let seq = RunManifest::load(&RunOutput::in_dir(seq_dir.path()).manifest).unwrap();
    let par = RunManifest::load(&RunOutput::in_dir(par_dir.path()).manifest).unwrap();
    assert!(seq.comparable_with(&par));
    assert_ne!(seq.run_id, par.run_id);
}
