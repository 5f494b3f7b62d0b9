//! Statistics Calculator Module
//! Descriptive statistics, histogram binning and kernel density estimation.

use crate::data::{DataProcessor, ProcessorError};
use polars::prelude::DataFrame;
use statrs::distribution::{Continuous, Normal};

/// Upper bound on automatic histogram bins.
pub const MAX_BINS: usize = 200;

/// Descriptive statistics over the non-missing values of one column.
#[derive(Debug, Clone, PartialEq)]
pub struct SummaryStats {
    pub count: usize,
    pub mean: f64,
    pub median: f64,
    /// Sample standard deviation; NaN for a single value.
    pub std: f64,
    pub min: f64,
    pub max: f64,
    pub p25: f64,
    pub p75: f64,
}

/// One row of the describe table.
#[derive(Debug, Clone, PartialEq)]
pub struct ColumnSummary {
    pub column: String,
    /// `None` when the column has no values.
    pub stats: Option<SummaryStats>,
}

/// Equal-width bins plus a density curve scaled to the bin counts.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Histogram {
    /// `counts.len() + 1` edges.
    pub bin_edges: Vec<f64>,
    pub counts: Vec<usize>,
    pub density: Vec<[f64; 2]>,
}

impl Histogram {
    pub fn bin_width(&self) -> f64 {
        match self.bin_edges.as_slice() {
            [first, second, ..] => second - first,
            _ => 0.0,
        }
    }

    pub fn bin_centers(&self) -> Vec<f64> {
        self.bin_edges
            .windows(2)
            .map(|w| (w[0] + w[1]) / 2.0)
            .collect()
    }

    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }
}

/// Handles statistical calculations.
pub struct StatsCalculator;

impl StatsCalculator {
    /// Compute descriptive statistics for an array of values.
    ///
    /// Missing values must already be removed. Returns `None` for an empty slice.
    pub fn compute_descriptive_stats(values: &[f64]) -> Option<SummaryStats> {
        let n = values.len();
        if n == 0 {
            return None;
        }

        let mut sorted = values.to_vec();
        sorted.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));

        let mean = values.iter().sum::<f64>() / n as f64;
        let median = if n % 2 == 0 {
            (sorted[n / 2 - 1] + sorted[n / 2]) / 2.0
        } else {
            sorted[n / 2]
        };

        let std = if n > 1 {
            let variance = values.iter().map(|x| (x - mean).powi(2)).sum::<f64>() / (n - 1) as f64;
            variance.sqrt()
        } else {
            f64::NAN
        };

        Some(SummaryStats {
            count: n,
            mean,
            median,
            std,
            min: sorted[0],
            max: sorted[n - 1],
            p25: Self::percentile(&sorted, 25.0),
            p75: Self::percentile(&sorted, 75.0),
        })
    }

    /// Statistics for one column of the (filtered) dataset.
    pub fn column_stats(
        df: &DataFrame,
        column: &str,
    ) -> Result<Option<SummaryStats>, ProcessorError> {
        let values = DataProcessor::present_values(df, column)?;
        Ok(Self::compute_descriptive_stats(&values))
    }

    /// Describe table over the given numeric columns.
    pub fn describe(
        df: &DataFrame,
        columns: &[String],
    ) -> Result<Vec<ColumnSummary>, ProcessorError> {
        columns
            .iter()
            .map(|column| {
                Ok(ColumnSummary {
                    column: column.clone(),
                    stats: Self::column_stats(df, column)?,
                })
            })
            .collect()
    }

    /// Calculate percentile using linear interpolation (NumPy compatible).
    fn percentile(sorted_values: &[f64], p: f64) -> f64 {
        let n = sorted_values.len();
        if n == 0 {
            return f64::NAN;
        }
        if n == 1 {
            return sorted_values[0];
        }

        let rank = (p / 100.0) * (n - 1) as f64;
        let lower = rank.floor() as usize;
        let upper = (rank.ceil() as usize).min(n - 1);
        let frac = rank - lower as f64;

        if lower == upper {
            sorted_values[lower]
        } else {
            sorted_values[lower] * (1.0 - frac) + sorted_values[upper] * frac
        }
    }

    /// Number of bins: the finer of the Sturges and Freedman-Diaconis rules.
    fn auto_bin_count(sorted_values: &[f64]) -> usize {
        let n = sorted_values.len();
        if n < 2 {
            return 1;
        }
        let range = sorted_values[n - 1] - sorted_values[0];
        if range <= 0.0 {
            return 1;
        }

        let sturges = (n as f64).log2().ceil() as usize + 1;
        let iqr =
            Self::percentile(sorted_values, 75.0) - Self::percentile(sorted_values, 25.0);
        let fd_width = 2.0 * iqr / (n as f64).cbrt();
        let fd = if fd_width > 0.0 {
            (range / fd_width).ceil() as usize
        } else {
            0
        };

        sturges.max(fd).clamp(1, MAX_BINS)
    }

    /// Bin the values and overlay a Gaussian KDE evaluated at `kde_points` positions.
    pub fn histogram(values: &[f64], kde_points: usize) -> Histogram {
        if values.is_empty() {
            return Histogram::default();
        }

        let mut sorted = values.to_vec();
        sorted.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
        let min = sorted[0];
        let max = sorted[sorted.len() - 1];

        let bins = Self::auto_bin_count(&sorted);
        let (low, width) = if max > min {
            (min, (max - min) / bins as f64)
        } else {
            // Constant column: one unit-wide bin centred on the value.
            (min - 0.5, 1.0)
        };

        let bin_edges: Vec<f64> = (0..=bins).map(|i| low + i as f64 * width).collect();
        let mut counts = vec![0usize; bins];
        for &v in values {
            let idx = (((v - low) / width).floor() as usize).min(bins - 1);
            counts[idx] += 1;
        }

        let density = Self::kde_curve(&sorted, width, kde_points);

        Histogram {
            bin_edges,
            counts,
            density,
        }
    }

    /// Gaussian KDE with Scott's bandwidth, scaled so its area matches the histogram.
    fn kde_curve(sorted_values: &[f64], bin_width: f64, points: usize) -> Vec<[f64; 2]> {
        let n = sorted_values.len();
        let Some(stats) = Self::compute_descriptive_stats(sorted_values) else {
            return Vec::new();
        };
        if n < 2 || points < 2 || !(stats.std > 0.0) {
            return Vec::new();
        }
        let Ok(kernel) = Normal::new(0.0, 1.0) else {
            return Vec::new();
        };

        let bandwidth = stats.std * (n as f64).powf(-0.2);
        let scale = bin_width / bandwidth;
        let step = (stats.max - stats.min) / (points - 1) as f64;

        (0..points)
            .map(|i| {
                let x = stats.min + i as f64 * step;
                let sum: f64 = sorted_values
                    .iter()
                    .map(|xi| kernel.pdf((x - xi) / bandwidth))
                    .sum();
                [x, sum * scale]
            })
            .collect()
    }
}
