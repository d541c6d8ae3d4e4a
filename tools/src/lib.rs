//! Helpers shared by the sir-tools binaries.

pub mod args;
