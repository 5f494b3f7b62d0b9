//! Data module - CSV loading, filtering and column extraction

mod loader;
mod processor;

pub use loader::{has_column, numeric_columns, unique_values, DataLoadError, DataLoader};
pub use processor::{
    DataProcessor, PreviewTable, ProcessorError, RowFilter, ScatterAttribute, ScatterEncodings,
    ScatterParams,
};
