//! Analysis Module
//! Builds every dashboard view from the loaded dataset and the sidebar selections.

use crate::config::DashboardConfig;
use crate::data::{
    numeric_columns, unique_values, DataLoadError, DataLoader, DataProcessor, PreviewTable,
    ProcessorError, RowFilter, ScatterEncodings, ScatterParams,
};
use crate::stats::{ColumnSummary, CorrelationMatrix, Histogram, StatsCalculator, SummaryStats};
use polars::prelude::DataFrame;
use std::sync::Arc;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum DashboardError {
    #[error(transparent)]
    Load(#[from] DataLoadError),
    #[error(transparent)]
    Processing(#[from] ProcessorError),
}

/// Current sidebar choices. `None` brand means no filtering.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Selection {
    pub brand: Option<String>,
    pub histogram_column: Option<String>,
    pub x_column: Option<String>,
    pub y_column: Option<String>,
}

impl Selection {
    /// First numeric column for the histogram, first and second for the scatter.
    pub fn with_defaults(numeric_columns: &[String]) -> Self {
        Self {
            brand: None,
            histogram_column: numeric_columns.first().cloned(),
            x_column: numeric_columns.first().cloned(),
            y_column: numeric_columns.get(1).cloned(),
        }
    }
}

/// Views derived from the current selection. Recomputed on every change.
#[derive(Debug, Clone, Default)]
pub struct Analysis {
    pub filtered_rows: usize,
    pub histogram_column: Option<String>,
    /// `None` when the column is entirely missing or no rows remain.
    pub summary: Option<SummaryStats>,
    pub histogram: Histogram,
    /// `None` with fewer than two numeric columns.
    pub correlation: Option<CorrelationMatrix>,
    /// `None` with fewer than two numeric columns.
    pub scatter: Option<ScatterParams>,
}

/// Loaded dataset plus the views that do not depend on the selection.
pub struct Dashboard {
    pub config: DashboardConfig,
    pub dataset: Arc<DataFrame>,
    pub numeric_columns: Vec<String>,
    /// "All" followed by the sorted brands; empty without a brand column.
    pub brand_options: Vec<String>,
    pub preview: PreviewTable,
    pub describe: Vec<ColumnSummary>,
}

impl Dashboard {
    /// Load the configured CSV (memoized per path) and prepare the static views.
    pub fn open(config: DashboardConfig) -> Result<Self, DashboardError> {
        let dataset = DataLoader::load_cached(&config.data_path)?;
        Self::from_dataset(dataset, config)
    }

    pub fn from_dataset(
        dataset: Arc<DataFrame>,
        config: DashboardConfig,
    ) -> Result<Self, DashboardError> {
        let numeric_columns = numeric_columns(&dataset);
        if numeric_columns.len() < 2 {
            log::warn!(
                "Only {} numeric column(s); correlation and scatter are disabled",
                numeric_columns.len()
            );
        }

        let brands = unique_values(&dataset, &config.brand_column);
        let brand_options = if brands.is_empty() {
            Vec::new()
        } else {
            std::iter::once(config.all_label.clone())
                .chain(brands)
                .collect()
        };

        let preview = DataProcessor::preview(&dataset, config.preview_rows);
        let describe = StatsCalculator::describe(&dataset, &numeric_columns)?;

        Ok(Self {
            config,
            dataset,
            numeric_columns,
            brand_options,
            preview,
            describe,
        })
    }

    pub fn has_pairwise_views(&self) -> bool {
        self.numeric_columns.len() >= 2
    }

    fn row_filter(&self, selection: &Selection) -> Option<RowFilter> {
        selection
            .brand
            .as_ref()
            .filter(|brand| **brand != self.config.all_label)
            .map(|brand| RowFilter::new(self.config.brand_column.clone(), brand.clone()))
    }

    fn numeric_choice(&self, column: &Option<String>) -> Option<String> {
        column
            .as_ref()
            .filter(|c| self.numeric_columns.contains(*c))
            .cloned()
    }

    /// Filter, then compute statistics, histogram, correlation and scatter.
    pub fn analyze(&self, selection: &Selection) -> Result<Analysis, ProcessorError> {
        let filter = self.row_filter(selection);
        let filtered = DataProcessor::filter_rows(&self.dataset, filter.as_ref())?;

        let histogram_column = self.numeric_choice(&selection.histogram_column);
        let (summary, histogram) = match &histogram_column {
            Some(column) => {
                let values = DataProcessor::present_values(&filtered, column)?;
                (
                    StatsCalculator::compute_descriptive_stats(&values),
                    StatsCalculator::histogram(&values, self.config.kde_points),
                )
            }
            None => (None, Histogram::default()),
        };

        let (correlation, scatter) = if self.has_pairwise_views() {
            let correlation = CorrelationMatrix::compute(&filtered, &self.numeric_columns)?;
            let scatter = match (
                self.numeric_choice(&selection.x_column),
                self.numeric_choice(&selection.y_column),
            ) {
                (Some(x), Some(y)) => Some(DataProcessor::prepare_scatter(
                    &filtered,
                    &x,
                    &y,
                    &self.scatter_encodings(),
                )?),
                _ => None,
            };
            (Some(correlation), scatter)
        } else {
            (None, None)
        };

        log::debug!(
            "Analysis: {} rows, histogram {:?}, scatter {}",
            filtered.height(),
            histogram_column,
            scatter.as_ref().map_or(0, |s| s.points.len())
        );

        Ok(Analysis {
            filtered_rows: filtered.height(),
            histogram_column,
            summary,
            histogram,
            correlation,
            scatter,
        })
    }

    fn scatter_encodings(&self) -> ScatterEncodings {
        ScatterEncodings {
            color_column: self.config.grade_column.clone(),
            size_column: self.config.sugar_column.clone(),
            label_column: self.config.name_column.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use polars::prelude::*;

    fn dashboard(df: DataFrame) -> Dashboard {
        Dashboard::from_dataset(Arc::new(df), DashboardConfig::default()).unwrap()
    }

    fn products() -> DataFrame {
        df!(
            "product_name" => ["Cola", "Yogurt", "Biscuit"],
            "brands" => ["A", "B", "A"],
            "sugars_100g" => [Some(5.0), None, Some(15.0)],
            "saturated-fat_100g" => [Some(0.0), Some(2.0), Some(9.0)],
            "nutriscore_grade" => ["e", "b", "d"]
        )
        .unwrap()
    }

    #[test]
    fn defaults_pick_first_and_second_numeric_columns() {
        let dash = dashboard(products());
        let selection = Selection::with_defaults(&dash.numeric_columns);

        assert_eq!(selection.histogram_column.as_deref(), Some("sugars_100g"));
        assert_eq!(selection.x_column.as_deref(), Some("sugars_100g"));
        assert_eq!(selection.y_column.as_deref(), Some("saturated-fat_100g"));
        assert_eq!(dash.brand_options, ["All", "A", "B"]);
    }

    #[test]
    fn brand_selection_filters_every_view() {
        let dash = dashboard(products());
        let selection = Selection {
            brand: Some("A".to_string()),
            ..Selection::with_defaults(&dash.numeric_columns)
        };
        let analysis = dash.analyze(&selection).unwrap();

        assert_eq!(analysis.filtered_rows, 2);
        let summary = analysis.summary.unwrap();
        assert_eq!(summary.mean, 10.0);
        assert_eq!(summary.median, 10.0);
        assert_eq!(analysis.scatter.unwrap().points.len(), 2);
    }

    #[test]
    fn all_label_means_no_filter() {
        let dash = dashboard(products());
        let selection = Selection {
            brand: Some("All".to_string()),
            ..Selection::with_defaults(&dash.numeric_columns)
        };
        assert_eq!(dash.analyze(&selection).unwrap().filtered_rows, 3);
    }

    #[test]
    fn empty_filter_result_renders_empty_views() {
        let dash = dashboard(products());
        let selection = Selection {
            brand: Some("Nobody".to_string()),
            ..Selection::with_defaults(&dash.numeric_columns)
        };
        let analysis = dash.analyze(&selection).unwrap();

        assert_eq!(analysis.filtered_rows, 0);
        assert!(analysis.summary.is_none());
        assert!(analysis.histogram.is_empty());
        assert!(analysis.scatter.unwrap().points.is_empty());
    }

    #[test]
    fn single_numeric_column_disables_pairwise_views() {
        let dash = dashboard(df!("product_name" => ["a", "b"], "sugars_100g" => [1.0, 2.0]).unwrap());
        let analysis = dash
            .analyze(&Selection::with_defaults(&dash.numeric_columns))
            .unwrap();

        assert!(!dash.has_pairwise_views());
        assert!(analysis.correlation.is_none());
        assert!(analysis.scatter.is_none());
        assert!(analysis.summary.is_some());
        assert!(dash.brand_options.is_empty());
    }

    #[test]
    fn no_numeric_columns_is_not_an_error() {
        let dash = dashboard(df!("product_name" => ["a"], "brands" => ["x"]).unwrap());
        let analysis = dash
            .analyze(&Selection::with_defaults(&dash.numeric_columns))
            .unwrap();

        assert!(analysis.histogram_column.is_none());
        assert!(analysis.summary.is_none());
        assert!(dash.describe.is_empty());
    }

    #[test]
    fn stale_column_choice_is_ignored() {
        let dash = dashboard(products());
        let selection = Selection {
            histogram_column: Some("brands".to_string()),
            ..Selection::with_defaults(&dash.numeric_columns)
        };
        let analysis = dash.analyze(&selection).unwrap();
        assert!(analysis.histogram_column.is_none());
        assert!(analysis.summary.is_none());
    }

    #[test]
    fn missing_data_file_fails_to_open() {
        let dir = tempfile::tempdir().unwrap();
        let config = DashboardConfig {
            data_path: dir.path().join("nutridiab_filtré.csv"),
            ..DashboardConfig::default()
        };
        assert!(matches!(
            Dashboard::open(config),
            Err(DashboardError::Load(DataLoadError::NotFound(_)))
        ));
    }
}
