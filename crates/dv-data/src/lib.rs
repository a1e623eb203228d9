//! Data sources for the visualization platform

pub mod config;
#[cfg(feature = "frame")]
pub mod frame;
pub mod sources;

#[cfg(feature = "frame")]
use arrow::error::ArrowError;
use dv_core::ModelError;
use thiserror::Error;

// Re-exports
pub use config::SourceConfig;
#[cfg(feature = "frame")]
pub use frame::{FrameIndex, IndexLevel, LabeledFrame};
pub use sources::{
    Column, ColumnDataSource, ColumnMap, ColumnsRef, DataSource, HasDataSource, MissingColumn,
    ServerDataSource, SourceData, SourceOptions, TransformValue,
};

/// Errors that can occur in data operations
#[derive(Error, Debug)]
pub enum DataError {
    #[error("expected a mapping of columns or a frame, got {0}")]
    InvalidArgument(String),

    #[error("column_names {declared:?} do not match the columns present {present:?}")]
    ColumnNamesMismatch {
        declared: Vec<String>,
        present: Vec<String>,
    },

    #[error("column '{column}' has {actual} rows, expected {expected}")]
    LengthMismatch {
        column: String,
        expected: usize,
        actual: usize,
    },

    #[error("selected index {index} is out of bounds for {row_count} rows")]
    SelectionOutOfBounds { index: usize, row_count: usize },

    #[error("Frame error: {0}")]
    Frame(Box<dyn std::error::Error + Send + Sync>),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Model error: {0}")]
    Model(#[from] ModelError),

    #[error("Configuration error: {0}")]
    Config(String),
}

#[cfg(feature = "frame")]
impl From<ArrowError> for DataError {
    fn from(error: ArrowError) -> Self {
        DataError::Frame(Box::new(error))
    }
}
