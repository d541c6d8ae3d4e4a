//! SIRD epidemic on a square grid: a sequential engine, a block-parallel
//! engine that reproduces it exactly, and the reporting layer that
//! compares, plots and animates their output.

pub mod compare;
pub mod config;
pub mod engine;
pub mod error;
pub mod grid;
pub mod manifest;
pub mod model;
pub mod parallel;
pub mod r0;
pub mod render;
pub mod rng;
pub mod scaling;
pub mod snapshot;
pub mod statistics;
pub mod stepper;
pub mod timing;
pub mod types;
