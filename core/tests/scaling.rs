//! Strong-scaling experiment and its CSV.

use epidemic_core::{
    config::SimConfig,
    error::SimError,
    scaling::{load_csv, run_strong_scaling, save_csv, scaling_points},
};
use std::fs;

#[test]
fn single_worker_scaling_run_is_its_own_baseline() {
    let points = run_strong_scaling(&SimConfig::default_test(), &[1], 10).unwrap();
    assert_eq!(points.len(), 1);
    assert_eq!(points[0].cores, 1);
    assert_eq!(points[0].speedup, 1.0);
    assert_eq!(points[0].efficiency, 1.0);
}

#[test]
fn counts_above_available_parallelism_are_skipped() {
    let points = run_strong_scaling(&SimConfig::default_test(), &[1, usize::MAX], 5).unwrap();
    assert_eq!(points.iter().map(|p| p.cores).collect::<Vec<_>>(), vec![1]);
}

#[test]
fn no_usable_worker_count_is_a_config_error() {
    let err = run_strong_scaling(&SimConfig::default_test(), &[0], 5).unwrap_err();
    assert!(matches!(err, SimError::InvalidConfig(_)));
}

#[test]
fn scaling_csv_uses_four_decimals() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("scaling_results.csv");
    let points = scaling_points(&[(1, 10.0), (2, 6.0), (4, 4.0)]);
    save_csv(&path, &points).unwrap();

    let content = fs::read_to_string(&path).unwrap();
    let mut lines = content.lines();
    assert_eq!(lines.next(), Some("Cores,Time,Speedup,Efficiency"));
    assert_eq!(lines.next(), Some("1,10.0000,1.0000,1.0000"));
    assert_eq!(lines.next(), Some("2,6.0000,1.6667,0.8333"));
    assert_eq!(lines.next(), Some("4,4.0000,2.5000,0.6250"));

    let loaded = load_csv(&path).unwrap();
    assert_eq!(loaded.len(), 3);
    assert_eq!(loaded[2].cores, 4);
    assert_eq!(loaded[2].efficiency, 0.625);
}
