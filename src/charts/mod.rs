//! Charts module - Chart rendering

mod plotter;

pub use plotter::{encoding_caption, format_stat, ChartPlotter};
