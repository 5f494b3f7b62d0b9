//! Stats module - Descriptive statistics and correlation

mod calculator;
mod correlation;

pub use calculator::{ColumnSummary, Histogram, StatsCalculator, SummaryStats};
pub use correlation::CorrelationMatrix;
