//! Correlation Module
//! Pairwise Pearson correlation over numeric columns.

use crate::data::{DataProcessor, ProcessorError};
use polars::prelude::DataFrame;
use rayon::prelude::*;

/// Symmetric matrix of Pearson coefficients, indexed like `columns`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CorrelationMatrix {
    pub columns: Vec<String>,
    pub values: Vec<Vec<f64>>,
}

impl CorrelationMatrix {
    /// Compute the matrix using pairwise-complete observations.
    ///
    /// The diagonal is 1.0 for any column with at least one value. Pairs with
    /// fewer than two shared observations, or no variance, are NaN.
    pub fn compute(df: &DataFrame, columns: &[String]) -> Result<Self, ProcessorError> {
        let data: Vec<Vec<Option<f64>>> = columns
            .iter()
            .map(|column| DataProcessor::numeric_values(df, column))
            .collect::<Result<_, _>>()?;

        let n = columns.len();
        let pairs: Vec<(usize, usize)> = (0..n)
            .flat_map(|i| (i + 1..n).map(move |j| (i, j)))
            .collect();

        // Each pair is computed once and mirrored, so the result is exactly symmetric.
        let coefficients: Vec<(usize, usize, f64)> = pairs
            .par_iter()
            .map(|&(i, j)| (i, j, pearson(&data[i], &data[j])))
            .collect();

        let mut values = vec![vec![f64::NAN; n]; n];
        for (i, column) in data.iter().enumerate() {
            if column.iter().any(Option::is_some) {
                values[i][i] = 1.0;
            }
        }
        for (i, j, r) in coefficients {
            values[i][j] = r;
            values[j][i] = r;
        }

        log::debug!("Computed {}x{} correlation matrix", n, n);
        Ok(Self {
            columns: columns.to_vec(),
            values,
        })
    }

    pub fn get(&self, row: usize, col: usize) -> f64 {
        self.values
            .get(row)
            .and_then(|r| r.get(col))
            .copied()
            .unwrap_or(f64::NAN)
    }
}

/// Pearson coefficient over rows where both sides are present.
fn pearson(xs: &[Option<f64>], ys: &[Option<f64>]) -> f64 {
    let pairs: Vec<(f64, f64)> = xs
        .iter()
        .zip(ys)
        .filter_map(|(x, y)| Some(((*x)?, (*y)?)))
        .collect();

    let n = pairs.len();
    if n < 2 {
        return f64::NAN;
    }

    let mean_x = pairs.iter().map(|p| p.0).sum::<f64>() / n as f64;
    let mean_y = pairs.iter().map(|p| p.1).sum::<f64>() / n as f64;

    let (mut sxx, mut syy, mut sxy) = (0.0, 0.0, 0.0);
    for (x, y) in &pairs {
        let dx = x - mean_x;
        let dy = y - mean_y;
        sxx += dx * dx;
        syy += dy * dy;
        sxy += dx * dy;
    }

    if sxx == 0.0 || syy == 0.0 {
        return f64::NAN;
    }
    (sxy / (sxx * syy).sqrt()).clamp(-1.0, 1.0)
}
