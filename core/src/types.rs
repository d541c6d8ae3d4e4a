//! Shared primitive types used across the engine and the reporting layer.

/// A simulated day. Day 0 is the initial state, before any transition.
pub type Day = u64;

/// Row-major position of a cell inside a grid.
pub type CellIndex = usize;

/// The canonical run identifier.
pub type RunId = String;
