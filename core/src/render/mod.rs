//! Reporting output: console grid samples, PNG charts and GIF animations.
//!
//! Every chart or animation function opens its own bitmap backend, draws
//! into it and presents it before returning. Nothing is shared between calls.

pub mod animation;
pub mod charts;
pub mod console;

use crate::{error::SimError, grid::CellState};
use plotters::style::RGBColor;

pub const SUSCEPTIBLE_COLOR: RGBColor = RGBColor(0x3b, 0x82, 0xf6);
pub const INFECTED_COLOR:    RGBColor = RGBColor(0xef, 0x44, 0x44);
pub const RECOVERED_COLOR:   RGBColor = RGBColor(0x22, 0xc5, 0x5e);
pub const DEAD_COLOR:        RGBColor = RGBColor(0x37, 0x41, 0x51);

pub fn state_color(state: CellState) -> RGBColor {
    match state {
        CellState::Susceptible => SUSCEPTIBLE_COLOR,
        CellState::Infected => INFECTED_COLOR,
        CellState::Recovered => RECOVERED_COLOR,
        CellState::Dead => DEAD_COLOR,
    }
}

pub(crate) fn render_err<E: std::fmt::Display>(e: E) -> SimError {
    SimError::Render(e.to_string())
}
