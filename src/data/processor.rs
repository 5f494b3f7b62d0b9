//! Data Processor Module
//! Row filtering, column extraction and scatter preparation.

use super::loader::{has_column, is_numeric};
use polars::prelude::*;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ProcessorError {
    #[error("Polars error: {0}")]
    PolarsError(#[from] PolarsError),
    #[error("Column '{0}' not found")]
    MissingColumn(String),
    #[error("Column '{0}' is not numeric")]
    NotNumeric(String),
}

/// Keep only rows whose `column` equals `value`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RowFilter {
    pub column: String,
    pub value: String,
}

impl RowFilter {
    pub fn new(column: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            column: column.into(),
            value: value.into(),
        }
    }
}

/// Columns used for the optional scatter encodings.
#[derive(Debug, Clone)]
pub struct ScatterEncodings {
    pub color_column: String,
    pub size_column: String,
    pub label_column: String,
}

/// One optional per-point attribute, aligned with `ScatterParams::points`.
#[derive(Debug, Clone, PartialEq)]
pub struct ScatterAttribute<T> {
    pub column: String,
    pub values: Vec<Option<T>>,
}

/// Everything needed to draw the X/Y comparison.
#[derive(Debug, Clone, PartialEq)]
pub struct ScatterParams {
    pub x_column: String,
    pub y_column: String,
    /// Rows where both X and Y are present, in row order.
    pub points: Vec<[f64; 2]>,
    pub color: Option<ScatterAttribute<String>>,
    pub size: Option<ScatterAttribute<f64>>,
    pub label: Option<ScatterAttribute<String>>,
}

/// First rows of the dataset rendered as text.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PreviewTable {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

/// Handles filtering and extraction operations.
pub struct DataProcessor;

impl DataProcessor {
    /// Apply an optional equality filter.
    ///
    /// No filter, or a filter on a column the dataset lacks, returns every row.
    /// Values are compared as strings, case-sensitively.
    pub fn filter_rows(
        df: &DataFrame,
        filter: Option<&RowFilter>,
    ) -> Result<DataFrame, ProcessorError> {
        let Some(filter) = filter else {
            return Ok(df.clone());
        };

        if !has_column(df, &filter.column) {
            log::debug!("Filter column '{}' absent, keeping all rows", filter.column);
            return Ok(df.clone());
        }

        let filtered = df
            .clone()
            .lazy()
            .filter(
                col(filter.column.as_str())
                    .cast(DataType::String)
                    .eq(lit(filter.value.as_str())),
            )
            .collect()?;

        log::info!(
            "Filter {} = '{}' kept {} of {} rows",
            filter.column,
            filter.value,
            filtered.height(),
            df.height()
        );
        Ok(filtered)
    }

    /// Row-aligned numeric values. Nulls and NaN both come back as `None`.
    pub fn numeric_values(df: &DataFrame, column: &str) -> Result<Vec<Option<f64>>, ProcessorError> {
        let series = df
            .column(column)
            .map_err(|_| ProcessorError::MissingColumn(column.to_string()))?;
        if !is_numeric(series.dtype()) {
            return Err(ProcessorError::NotNumeric(column.to_string()));
        }

        let value_f64 = series.cast(&DataType::Float64)?;
        let values = value_f64
            .f64()?
            .into_iter()
            .map(|v| v.filter(|x| !x.is_nan()))
            .collect();
        Ok(values)
    }

    /// Non-missing values of a numeric column.
    pub fn present_values(df: &DataFrame, column: &str) -> Result<Vec<f64>, ProcessorError> {
        Ok(Self::numeric_values(df, column)?
            .into_iter()
            .flatten()
            .collect())
    }

    /// Row-aligned values of any column in string form.
    pub fn text_values(df: &DataFrame, column: &str) -> Result<Vec<Option<String>>, ProcessorError> {
        let series = df
            .column(column)
            .map_err(|_| ProcessorError::MissingColumn(column.to_string()))?
            .cast(&DataType::String)?;

        let values = series
            .as_materialized_series()
            .str()?
            .into_iter()
            .map(|v| v.map(str::to_string))
            .collect();
        Ok(values)
    }

    /// Collect the X/Y pairs and whichever encodings the dataset supports.
    pub fn prepare_scatter(
        df: &DataFrame,
        x_column: &str,
        y_column: &str,
        encodings: &ScatterEncodings,
    ) -> Result<ScatterParams, ProcessorError> {
        let xs = Self::numeric_values(df, x_column)?;
        let ys = Self::numeric_values(df, y_column)?;

        let kept: Vec<usize> = xs
            .iter()
            .zip(&ys)
            .enumerate()
            .filter(|(_, (x, y))| x.is_some() && y.is_some())
            .map(|(i, _)| i)
            .collect();

        let points = kept
            .iter()
            .filter_map(|&i| Some([xs[i]?, ys[i]?]))
            .collect();

        let color = Self::optional_attribute(df, &encodings.color_column, &kept, Self::text_values)?;
        let label = Self::optional_attribute(df, &encodings.label_column, &kept, Self::text_values)?;
        let size = if df
            .column(&encodings.size_column)
            .is_ok_and(|c| is_numeric(c.dtype()))
        {
            Self::optional_attribute(df, &encodings.size_column, &kept, Self::numeric_values)?
        } else {
            if has_column(df, &encodings.size_column) {
                log::debug!("Size column '{}' is not numeric", encodings.size_column);
            }
            None
        };

        Ok(ScatterParams {
            x_column: x_column.to_string(),
            y_column: y_column.to_string(),
            points,
            color,
            size,
            label,
        })
    }

    fn optional_attribute<T: Clone>(
        df: &DataFrame,
        column: &str,
        kept: &[usize],
        extract: fn(&DataFrame, &str) -> Result<Vec<Option<T>>, ProcessorError>,
    ) -> Result<Option<ScatterAttribute<T>>, ProcessorError> {
        if !has_column(df, column) {
            log::debug!("Column '{}' absent, encoding omitted", column);
            return Ok(None);
        }

        let all = extract(df, column)?;
        Ok(Some(ScatterAttribute {
            column: column.to_string(),
            values: kept.iter().map(|&i| all[i].clone()).collect(),
        }))
    }

    /// Render the first `n` rows as strings. Missing cells are empty.
    pub fn preview(df: &DataFrame, n: usize) -> PreviewTable {
        let head = df.head(Some(n));
        let columns = head
            .get_column_names()
            .iter()
            .map(|s| s.to_string())
            .collect();

        let rows = (0..head.height())
            .map(|i| {
                head.get_columns()
                    .iter()
                    .map(|col| col.get(i).map(format_cell).unwrap_or_default())
                    .collect()
            })
            .collect();

        PreviewTable { columns, rows }
    }
}

fn format_cell(value: AnyValue) -> String {
    match value {
        AnyValue::Null => String::new(),
        AnyValue::String(s) => s.to_string(),
        AnyValue::StringOwned(s) => s.to_string(),
        AnyValue::Float64(v) if v.is_nan() => String::new(),
        AnyValue::Float32(v) if v.is_nan() => String::new(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn encodings() -> ScatterEncodings {
        ScatterEncodings {
            color_column: "nutriscore_grade".to_string(),
            size_column: "sugars_100g".to_string(),
            label_column: "product_name".to_string(),
        }
    }

    fn products() -> DataFrame {
        df!(
            "product_name" => ["Cola", "Yogurt", "Biscuit", "Juice"],
            "brands" => ["A", "B", "A", "a"],
            "sugars_100g" => [Some(10.6), None, Some(25.0), Some(9.0)],
            "fat_100g" => [Some(0.0), Some(3.1), Some(18.5), None],
            "nutriscore_grade" => [Some("e"), Some("b"), None, Some("c")]
        )
        .unwrap()
    }

    #[test]
    fn filter_keeps_exact_matches_only() {
        let df = df!("brands" => ["A", "B", "A"], "sugars_100g" => [1.0, 2.0, 3.0]).unwrap();
        let filtered = DataProcessor::filter_rows(&df, Some(&RowFilter::new("brands", "A"))).unwrap();

        assert_eq!(filtered.height(), 2);
        let brands = DataProcessor::text_values(&filtered, "brands").unwrap();
        assert!(brands.iter().all(|b| b.as_deref() == Some("A")));
    }

    #[test]
    fn filter_is_case_sensitive() {
        let filtered =
            DataProcessor::filter_rows(&products(), Some(&RowFilter::new("brands", "a"))).unwrap();
        assert_eq!(filtered.height(), 1);
    }

    #[test]
    fn no_filter_returns_dataset_unchanged() {
        let df = products();
        let unfiltered = DataProcessor::filter_rows(&df, None).unwrap();
        assert!(unfiltered.equals_missing(&df));

        let absent = RowFilter::new("manufacturer", "A");
        let unfiltered = DataProcessor::filter_rows(&df, Some(&absent)).unwrap();
        assert!(unfiltered.equals_missing(&df));
    }

    #[test]
    fn filter_without_matches_is_empty_not_an_error() {
        let filtered =
            DataProcessor::filter_rows(&products(), Some(&RowFilter::new("brands", "Z"))).unwrap();
        assert_eq!(filtered.height(), 0);
        assert_eq!(filtered.width(), 5);
    }

    #[test]
    fn numeric_values_treat_nan_as_missing() {
        let df = df!("sugars_100g" => [Some(5.0), Some(f64::NAN), None, Some(15.0)]).unwrap();
        assert_eq!(
            DataProcessor::numeric_values(&df, "sugars_100g").unwrap(),
            [Some(5.0), None, None, Some(15.0)]
        );
        assert_eq!(
            DataProcessor::present_values(&df, "sugars_100g").unwrap(),
            [5.0, 15.0]
        );
    }

    #[test]
    fn numeric_values_reject_text_and_unknown_columns() {
        let df = products();
        assert!(matches!(
            DataProcessor::numeric_values(&df, "brands"),
            Err(ProcessorError::NotNumeric(_))
        ));
        assert!(matches!(
            DataProcessor::numeric_values(&df, "salt_100g"),
            Err(ProcessorError::MissingColumn(_))
        ));
    }

    #[test]
    fn scatter_keeps_rows_with_both_values() {
        let params =
            DataProcessor::prepare_scatter(&products(), "sugars_100g", "fat_100g", &encodings())
                .unwrap();

        // Yogurt lacks sugar, Juice lacks fat.
        assert_eq!(params.points, [[10.6, 0.0], [25.0, 18.5]]);

        let color = params.color.unwrap();
        assert_eq!(color.column, "nutriscore_grade");
        assert_eq!(color.values, [Some("e".to_string()), None]);

        let label = params.label.unwrap();
        assert_eq!(
            label.values,
            [Some("Cola".to_string()), Some("Biscuit".to_string())]
        );

        assert_eq!(params.size.unwrap().values, [Some(10.6), Some(25.0)]);
    }

    #[test]
    fn scatter_omits_color_without_grade_column() {
        let df = products().drop("nutriscore_grade").unwrap();
        let params =
            DataProcessor::prepare_scatter(&df, "sugars_100g", "fat_100g", &encodings()).unwrap();

        assert!(params.color.is_none());
        assert!(params.label.is_some());
        assert!(params.size.is_some());
    }

    #[test]
    fn scatter_omits_size_when_sugar_is_not_numeric() {
        let df = df!(
            "sugars_100g" => ["high", "low"],
            "fat_100g" => [1.0, 2.0],
            "salt_100g" => [0.1, 0.2]
        )
        .unwrap();
        let params =
            DataProcessor::prepare_scatter(&df, "fat_100g", "salt_100g", &encodings()).unwrap();

        assert_eq!(params.points.len(), 2);
        assert!(params.size.is_none());
        assert!(params.color.is_none());
        assert!(params.label.is_none());
    }

    #[test]
    fn preview_renders_first_rows_as_text() {
        let preview = DataProcessor::preview(&products(), 2);

        assert_eq!(preview.columns.len(), 5);
        assert_eq!(preview.rows.len(), 2);
        assert_eq!(preview.rows[0][0], "Cola");
        assert_eq!(preview.rows[1][2], "");
    }
}
