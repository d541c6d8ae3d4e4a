//! Run comparison: difference symmetry, validation bands, timing analysis
//! and the summary report.

use epidemic_core::{
    compare::{day_by_day_diff, render_execution_analysis, StatsComparison, SummaryReport, Validation},
    config::SimConfig,
    engine::{RunOutput, SimulationDriver},
    error::SimError,
    statistics::{read_csv, DayRecord},
    timing::{ExecutionTime, Speedup},
};
use std::fs;

fn rec(day: u64, s: u64, i: u64, r: u64, d: u64, r0: f64) -> DayRecord {
    DayRecord { day, susceptible: s, infected: i, recovered: r, dead: d, r0 }
}

#[test]
fn day_by_day_difference_is_symmetric() {
    let a = vec![rec(0, 90, 10, 0, 0, 0.0), rec(1, 80, 15, 4, 1, 2.0), rec(2, 70, 12, 15, 3, 3.0)];
    let b = vec![rec(0, 90, 10, 0, 0, 0.0), rec(1, 82, 12, 5, 1, 1.8), rec(2, 71, 10, 16, 3, 2.9)];
    assert_eq!(day_by_day_diff(&a, &b), day_by_day_diff(&b, &a));
    assert_eq!(day_by_day_diff(&a, &b)[1], [2, 3, 1, 0]);
}

#[test]
fn identical_runs_validate_as_identical() {
    let mut seq = SimulationDriver::sequential(SimConfig::default_test()).unwrap();
    let mut par = SimulationDriver::parallel(SimConfig::default_test(), 4).unwrap();
    seq.run().unwrap();
    par.run().unwrap();

    let comparison = StatsComparison::compute(seq.history(), par.history()).unwrap();
    assert!(comparison.days_match());
    assert!(comparison.is_identical());
    assert_eq!(comparison.total_final_diff, 0);
    let columns = comparison.columns.as_ref().unwrap();
    assert!(columns.iter().all(|c| c.max == 0 && c.mean == 0.0));
    assert!(comparison.render().contains("VALIDATION: OK - results IDENTICAL"));
}

#[test]
fn small_final_difference_is_practically_identical() {
    let a = vec![rec(0, 100, 0, 0, 0, 0.0), rec(1, 50, 20, 25, 5, 1.0)];
    let b = vec![rec(0, 100, 0, 0, 0, 0.0), rec(1, 60, 15, 20, 5, 1.0)];
    let comparison = StatsComparison::compute(&a, &b).unwrap();
    assert_eq!(comparison.total_final_diff, 20);
    assert_eq!(comparison.validation, Validation::PracticallyIdentical);
}

#[test]
fn large_final_difference_is_significant() {
    let a = vec![rec(0, 1000, 0, 0, 0, 0.0), rec(1, 600, 200, 150, 50, 1.0)];
    let b = vec![rec(0, 1000, 0, 0, 0, 0.0), rec(1, 650, 150, 150, 50, 1.0)];
    let comparison = StatsComparison::compute(&a, &b).unwrap();
    assert_eq!(comparison.total_final_diff, 100);
    assert_eq!(comparison.validation, Validation::Significant);
    assert!(comparison.render().contains("total: 100"));
}

#[test]
fn different_day_counts_compare_final_state_only() {
    let a = vec![rec(0, 10, 1, 0, 0, 0.0), rec(1, 9, 1, 1, 0, 2.0)];
    let b = vec![rec(0, 10, 1, 0, 0, 0.0)];
    let comparison = StatsComparison::compute(&a, &b).unwrap();
    assert!(!comparison.days_match());
    assert!(comparison.columns.is_none());
    assert!(comparison.render().contains("DIFFERENT"));
}

#[test]
fn empty_series_is_an_error() {
    let a = vec![rec(0, 10, 1, 0, 0, 0.0)];
    let err = StatsComparison::compute(&a, &[]).unwrap_err();
    assert!(matches!(err, SimError::EmptyStatistics { .. }));
}

#[test]
fn execution_analysis_reports_speedup_and_efficiency() {
    let dir = tempfile::tempdir().unwrap();
    let seq_path = dir.path().join("seq.txt");
    let par_path = dir.path().join("par.txt");
    fs::write(&seq_path, "100.0\n").unwrap();
    fs::write(&par_path, "25.0\n4\n").unwrap();

    let speedup = Speedup::between(
        &ExecutionTime::load(&seq_path).unwrap(),
        &ExecutionTime::load(&par_path).unwrap(),
    );
    let text = render_execution_analysis(&speedup);
    assert!(text.contains("4.00x"), "{text}");
    assert!(text.contains("100.0%"), "{text}");
}

#[test]
fn missing_core_line_means_one_core() {
    let dir = tempfile::tempdir().unwrap();
    let par_path = dir.path().join("par.txt");
    fs::write(&par_path, "50.0").unwrap();
    let speedup = Speedup::between(
        &ExecutionTime::sequential(100.0),
        &ExecutionTime::load(&par_path).unwrap(),
    );
    assert_eq!(speedup.cores, 1);
    assert_eq!(format!("{:.2}", speedup.speedup), "2.00");
    assert_eq!(format!("{:.1}%", speedup.efficiency_percent()), "200.0%");
}

#[test]
fn unparsable_timing_file_is_an_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("bad.txt");
    fs::write(&path, "12.0\nfour\n").unwrap();
    assert!(matches!(ExecutionTime::load(&path), Err(SimError::MalformedTiming { .. })));
}

#[test]
fn summary_report_is_written_from_run_files() {
    let root = tempfile::tempdir().unwrap();
    let seq_out = RunOutput::in_dir(root.path().join("sequential"));
    let par_out = RunOutput::in_dir(root.path().join("parallel"));
    SimulationDriver::sequential(SimConfig::default_test())
        .unwrap()
        .with_output(&seq_out.dir)
        .unwrap()
        .run()
        .unwrap();
    SimulationDriver::parallel(SimConfig::default_test(), 2)
        .unwrap()
        .with_output(&par_out.dir)
        .unwrap()
        .run()
        .unwrap();

    let comparison = StatsComparison::compute(
        &read_csv(&seq_out.stats_file).unwrap(),
        &read_csv(&par_out.stats_file).unwrap(),
    )
    .unwrap();
    let speedup = Speedup::between(
        &ExecutionTime::load(&seq_out.timing_file).unwrap(),
        &ExecutionTime::load(&par_out.timing_file).unwrap(),
    );
    let report_path = root.path().join("results").join("comparison_report.txt");
    SummaryReport { comparison: &comparison, speedup: &speedup }
        .save(&report_path)
        .unwrap();

    let report = fs::read_to_string(&report_path).unwrap();
    for section in ["1. CONFIGURATION", "2. FINAL RESULTS", "3. PERFORMANCE", "4. VALIDATION"] {
        assert!(report.contains(section), "missing {section}");
    }
    assert!(report.contains("Cores used:         2"));
    assert!(report.contains("Status: VALIDATED - identical results"));
}
