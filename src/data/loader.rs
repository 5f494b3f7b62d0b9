//! CSV Data Loader Module
//! Loads the nutrition CSV once per path using Polars and answers column queries.

use polars::prelude::*;
use std::collections::{BTreeSet, HashMap};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, OnceLock, PoisonError};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum DataLoadError {
    #[error("Data file not found: {}", .0.display())]
    NotFound(PathBuf),
    #[error("Failed to load CSV {}: {source}", .path.display())]
    Csv {
        path: PathBuf,
        #[source]
        source: PolarsError,
    },
}

/// Loaded datasets keyed by file path. Entries are never invalidated.
static DATASET_CACHE: OnceLock<Mutex<HashMap<PathBuf, Arc<DataFrame>>>> = OnceLock::new();

/// Handles CSV file loading with Polars.
pub struct DataLoader;

impl DataLoader {
    /// Load a CSV file, reusing the in-memory copy if this path was loaded before.
    ///
    /// Failed loads are not cached.
    pub fn load_cached(path: &Path) -> Result<Arc<DataFrame>, DataLoadError> {
        let cache = DATASET_CACHE.get_or_init(|| Mutex::new(HashMap::new()));
        let mut cache = cache.lock().unwrap_or_else(PoisonError::into_inner);

        if let Some(df) = cache.get(path) {
            log::debug!("Dataset cache hit for {}", path.display());
            return Ok(Arc::clone(df));
        }

        let df = Arc::new(Self::load_csv(path)?);
        cache.insert(path.to_path_buf(), Arc::clone(&df));
        Ok(df)
    }

    /// Read a CSV file from disk.
    pub fn load_csv(path: &Path) -> Result<DataFrame, DataLoadError> {
        if !path.is_file() {
            return Err(DataLoadError::NotFound(path.to_path_buf()));
        }

        let df = LazyCsvReader::new(path)
            .with_has_header(true)
            .with_infer_schema_length(Some(10000))
            // Cells that fail to parse as the inferred dtype load as null.
            .with_ignore_errors(true)
            .finish()
            .and_then(|lazy| lazy.collect())
            .map_err(|source| DataLoadError::Csv {
                path: path.to_path_buf(),
                source,
            })?;

        log::info!(
            "Loaded {} rows, {} columns from {}",
            df.height(),
            df.width(),
            path.display()
        );
        Ok(df)
    }
}

/// Whether a dtype holds quantitative values.
pub fn is_numeric(dtype: &DataType) -> bool {
    matches!(
        dtype,
        DataType::Float32
            | DataType::Float64
            | DataType::Int8
            | DataType::Int16
            | DataType::Int32
            | DataType::Int64
            | DataType::UInt8
            | DataType::UInt16
            | DataType::UInt32
            | DataType::UInt64
    )
}

/// Get list of numeric column names, in the order they appear in the file.
pub fn numeric_columns(df: &DataFrame) -> Vec<String> {
    df.get_columns()
        .iter()
        .filter(|col| is_numeric(col.dtype()))
        .map(|col| col.name().to_string())
        .collect()
}

pub fn has_column(df: &DataFrame, name: &str) -> bool {
    df.get_column_names().iter().any(|c| c.as_str() == name)
}

/// Get the sorted, distinct, non-missing values of a column as strings.
pub fn unique_values(df: &DataFrame, column: &str) -> Vec<String> {
    let values = df
        .column(column)
        .and_then(|col| col.cast(&DataType::String))
        .and_then(|col| {
            let set: BTreeSet<String> = col
                .as_materialized_series()
                .str()?
                .into_iter()
                .flatten()
                .map(str::to_string)
                .collect();
            Ok(set)
        });

    match values {
        Ok(set) => set.into_iter().collect(),
        Err(e) => {
            log::debug!("No unique values for '{}': {}", column, e);
            Vec::new()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_csv(dir: &Path, name: &str, contents: &str) -> PathBuf {
        write_bytes(dir, name, contents.as_bytes())
    }

    fn write_bytes(dir: &Path, name: &str, contents: &[u8]) -> PathBuf {
        let path = dir.join(name);
        let mut file = std::fs::File::create(&path).unwrap();
        file.write_all(contents).unwrap();
        path
    }

    const SAMPLE: &str = "product_name,brands,sugars_100g,fat_100g,nutriscore_grade\n\
                          Cola,A,10.6,0,e\n\
                          Yogurt,B,,3.1,b\n\
                          Biscuit,A,25,18.5,d\n";

    #[test]
    fn load_reads_header_and_rows() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_csv(dir.path(), "products.csv", SAMPLE);

        let df = DataLoader::load_csv(&path).unwrap();
        assert_eq!(df.height(), 3);
        let names: Vec<String> = df.get_column_names().iter().map(|s| s.to_string()).collect();
        assert_eq!(
            names,
            ["product_name", "brands", "sugars_100g", "fat_100g", "nutriscore_grade"]
        );
        assert_eq!(df.column("sugars_100g").unwrap().null_count(), 1);
    }

    #[test]
    fn cached_load_returns_the_same_dataset() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_csv(dir.path(), "cached.csv", SAMPLE);

        let first = DataLoader::load_cached(&path).unwrap();
        // Later reads come from memory, not the file.
        std::fs::remove_file(&path).unwrap();
        let second = DataLoader::load_cached(&path).unwrap();

        assert!(Arc::ptr_eq(&first, &second));
        assert!(first.equals_missing(&second));
    }

    #[test]
    fn missing_file_is_a_load_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = DataLoader::load_cached(&dir.path().join("absent.csv")).unwrap_err();
        assert!(matches!(err, DataLoadError::NotFound(_)));
    }

    #[test]
    fn empty_file_is_a_load_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_csv(dir.path(), "empty.csv", "");
        let err = DataLoader::load_csv(&path).unwrap_err();
        assert!(matches!(err, DataLoadError::Csv { .. }));
    }

    #[test]
    fn ragged_rows_are_a_load_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_csv(dir.path(), "ragged.csv", "a,b\n1,2\n3,4,5,6\n");
        let err = DataLoader::load_csv(&path).unwrap_err();
        assert!(matches!(err, DataLoadError::Csv { .. }));
    }

    #[test]
    fn unterminated_quote_is_a_load_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_csv(dir.path(), "quote.csv", "a,b\n1,\"2\n3,4\n");
        let err = DataLoader::load_csv(&path).unwrap_err();
        assert!(matches!(err, DataLoadError::Csv { .. }));
    }

    #[test]
    fn invalid_utf8_is_a_load_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_bytes(dir.path(), "latin1.csv", b"\xff\xfe,b\n1,2\n");
        let err = DataLoader::load_csv(&path).unwrap_err();
        assert!(matches!(err, DataLoadError::Csv { .. }));
    }

    #[test]
    fn header_only_file_loads_with_no_rows() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_csv(dir.path(), "header.csv", "a,b\n");
        let df = DataLoader::load_csv(&path).unwrap();
        assert_eq!(df.shape(), (0, 2));
    }

    #[test]
    fn unparseable_cell_past_inference_window_loads_as_null() {
        let mut contents = String::from("sugars_100g\n");
        for i in 0..10_001 {
            contents.push_str(&format!("{}\n", i));
        }
        contents.push_str("lots\n");

        let dir = tempfile::tempdir().unwrap();
        let path = write_csv(dir.path(), "late_text.csv", &contents);
        let df = DataLoader::load_csv(&path).unwrap();

        let column = df.column("sugars_100g").unwrap();
        assert!(is_numeric(column.dtype()));
        assert_eq!(df.height(), 10_002);
        assert_eq!(column.null_count(), 1);
    }

    #[test]
    fn numeric_columns_keep_file_order() {
        let df = df!(
            "product_name" => ["a", "b"],
            "sugars_100g" => [1.0, 2.0],
            "brands" => ["x", "y"],
            "energy_kcal" => [10i64, 20],
            "fat_100g" => [Some(0.5), None]
        )
        .unwrap();

        assert_eq!(
            numeric_columns(&df),
            ["sugars_100g", "energy_kcal", "fat_100g"]
        );
        assert!(has_column(&df, "brands"));
        assert!(!has_column(&df, "nutriscore_grade"));
    }

    #[test]
    fn unique_values_are_sorted_and_skip_missing() {
        let df = df!("brands" => [Some("Nestle"), None, Some("Danone"), Some("Nestle")]).unwrap();
        assert_eq!(unique_values(&df, "brands"), ["Danone", "Nestle"]);
        assert!(unique_values(&df, "absent").is_empty());
    }
}
