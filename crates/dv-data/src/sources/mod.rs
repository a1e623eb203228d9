//! Data source models
//!
//! ```text
//!   DataSource            column_names + selected
//!     ├── ColumnDataSource   + data (name -> values)
//!     └── ServerDataSource   + data_url, owner_username, data, transform
//!
//!   ColumnsRef            (source ref, column subset)
//! ```

pub mod column_data_source;
pub mod data_source;
pub mod notebook;
pub mod server_source;

use indexmap::IndexMap;

pub use column_data_source::{ColumnDataSource, MissingColumn, SourceData, SourceOptions};
pub use data_source::{ColumnsRef, DataSource, HasDataSource};
pub use server_source::{ServerDataSource, TransformValue};

/// A single column of values
pub type Column = Vec<serde_json::Value>;

/// Column name to values, in insertion order
pub type ColumnMap = IndexMap<String, Column>;
