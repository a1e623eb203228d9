//! Column data source: named columns of values

use std::collections::HashSet;

use dv_core::model::{self, Model, ModelId};
use dv_core::ModelError;
use serde::Serialize;
use thiserror::Error;
use tracing::{debug, warn};

#[cfg(feature = "frame")]
use crate::frame::LabeledFrame;
use crate::config::SourceConfig;
use crate::sources::{notebook, Column, ColumnMap, DataSource, HasDataSource};
use crate::DataError;

/// Prefix of generated column names
const DEFAULT_NAME_PREFIX: &str = "Series";

/// Input accepted when building a [`ColumnDataSource`]
#[derive(Debug)]
pub enum SourceData {
    /// Columns keyed by name
    Columns(ColumnMap),

    /// A labeled frame, converted with [`ColumnDataSource::from_df`]
    #[cfg(feature = "frame")]
    Frame(LabeledFrame),
}

impl Default for SourceData {
    fn default() -> Self {
        SourceData::Columns(ColumnMap::new())
    }
}

impl From<ColumnMap> for SourceData {
    fn from(columns: ColumnMap) -> Self {
        SourceData::Columns(columns)
    }
}

impl<K: Into<String>, const N: usize> From<[(K, Column); N]> for SourceData {
    fn from(columns: [(K, Column); N]) -> Self {
        SourceData::Columns(columns.into_iter().map(|(k, v)| (k.into(), v)).collect())
    }
}

#[cfg(feature = "frame")]
impl From<LabeledFrame> for SourceData {
    fn from(frame: LabeledFrame) -> Self {
        SourceData::Frame(frame)
    }
}

impl TryFrom<serde_json::Value> for SourceData {
    type Error = DataError;

    /// Accepts a JSON object whose values are all arrays
    fn try_from(value: serde_json::Value) -> Result<Self, Self::Error> {
        let entries = match value {
            serde_json::Value::Object(entries) => entries,
            other => return Err(DataError::InvalidArgument(other.to_string())),
        };

        let mut columns = ColumnMap::with_capacity(entries.len());
        for (name, values) in entries {
            match values {
                serde_json::Value::Array(values) => {
                    columns.insert(name, values);
                }
                other => {
                    return Err(DataError::InvalidArgument(format!(
                        "column '{}' = {}",
                        name, other
                    )))
                }
            }
        }
        Ok(SourceData::Columns(columns))
    }
}

/// Attributes applied after the columns have been added
#[derive(Debug, Clone, Default)]
pub struct SourceOptions {
    /// Explicit column order
    pub column_names: Option<Vec<String>>,

    /// Initially selected rows
    pub selected: Option<Vec<usize>>,
}

impl SourceOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_column_names<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.column_names = Some(names.into_iter().map(Into::into).collect());
        self
    }

    pub fn with_selected(mut self, selected: impl IntoIterator<Item = usize>) -> Self {
        self.selected = Some(selected.into_iter().collect());
        self
    }
}

/// Warning raised when [`ColumnDataSource::remove`] cannot find a column
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Unable to find column '{name}' in data source")]
pub struct MissingColumn {
    pub name: String,
    /// Whether the name was found (and removed) from `column_names`
    pub in_column_names: bool,
    /// Whether the key was found in `data`; it is only removed when the name
    /// was also in `column_names`
    pub in_data: bool,
}

/// Maps names of columns to sequences of values.
///
/// There is an implicit assumption that all the columns have the same
/// length. It is only checked when asked to, see [`ColumnDataSource::validate`].
#[derive(Debug, Serialize)]
pub struct ColumnDataSource {
    #[serde(flatten)]
    base: DataSource,

    data: ColumnMap,
}

impl ColumnDataSource {
    /// Create a source with no columns
    pub fn empty() -> Self {
        Self {
            base: DataSource::new(),
            data: ColumnMap::new(),
        }
    }

    /// Create a source from a mapping of columns or a frame
    pub fn new(data: impl Into<SourceData>) -> Result<Self, DataError> {
        Self::with_options(data, SourceOptions::default(), &SourceConfig::default())
    }

    /// Create a source from untyped JSON, which must be an object of arrays
    pub fn from_json(value: serde_json::Value) -> Result<Self, DataError> {
        Self::new(SourceData::try_from(value)?)
    }

    /// Create a source, then apply `options` and the checks from `config`
    pub fn with_options(
        data: impl Into<SourceData>,
        options: SourceOptions,
        config: &SourceConfig,
    ) -> Result<Self, DataError> {
        let columns = match data.into() {
            SourceData::Columns(columns) => columns,
            #[cfg(feature = "frame")]
            SourceData::Frame(frame) => Self::from_df(&frame)?,
        };

        let mut source = Self::empty();
        for (name, column) in columns {
            source.add_named(column, name);
        }

        if let Some(names) = options.column_names {
            if config.validate_column_names {
                source.check_column_names(&names)?;
            }
            source.base.column_names = names;
        }
        if let Some(selected) = options.selected {
            source.base.selected = selected;
        }

        if config.validates_rows() {
            let rows = if config.validate_lengths {
                source.check_lengths()?
            } else {
                source.row_count()
            };
            if config.validate_selection {
                source.check_selection(rows)?;
            }
        }

        debug!(
            "Created ColumnDataSource {} with {} columns",
            source.base.id(),
            source.data.len()
        );
        Ok(source)
    }

    /// The column mapping
    pub fn data(&self) -> &ColumnMap {
        &self.data
    }

    /// Mutable access to the column mapping.
    ///
    /// Changes made here are not mirrored into `column_names`.
    pub fn data_mut(&mut self) -> &mut ColumnMap {
        &mut self.data
    }

    /// Values of a single column
    pub fn column(&self, name: &str) -> Option<&Column> {
        self.data.get(name)
    }

    /// Number of rows, taken from the first column
    pub fn row_count(&self) -> usize {
        self.data.values().next().map(Vec::len).unwrap_or(0)
    }

    /// Append a column under a generated name of the form `"Series N"`.
    ///
    /// Returns the name used.
    pub fn add(&mut self, column: Column) -> String {
        let name = self.default_column_name();
        self.add_named(column, name)
    }

    /// Append a column under `name`, replacing any data already stored there.
    ///
    /// The name is always appended to `column_names`, so adding an existing
    /// name twice lists it twice. Returns the name used.
    pub fn add_named(&mut self, column: Column, name: impl Into<String>) -> String {
        let name = name.into();
        debug!("Adding column '{}' ({} values)", name, column.len());
        self.base.column_names.push(name.clone());
        self.data.insert(name.clone(), column);
        name
    }

    /// Remove a column from `column_names` and `data`.
    ///
    /// A missing column is not an error: a warning is logged and returned.
    /// `data` is only touched once the name has left `column_names`, and a
    /// name removed from `column_names` stays removed even if `data` lacks it.
    pub fn remove(&mut self, name: &str) -> Option<MissingColumn> {
        let (in_column_names, in_data) =
            match self.base.column_names.iter().position(|c| c == name) {
                Some(pos) => {
                    self.base.column_names.remove(pos);
                    (true, self.data.shift_remove(name).is_some())
                }
                None => (false, self.data.contains_key(name)),
            };

        if in_column_names && in_data {
            debug!("Removed column '{}'", name);
            return None;
        }

        let missing = MissingColumn {
            name: name.to_string(),
            in_column_names,
            in_data,
        };
        warn!("{}", missing);
        Some(missing)
    }

    /// Convert a frame into a column mapping, including its row index.
    ///
    /// The index column is named after the index itself, the joined names of
    /// its levels, or `"index"`.
    #[cfg(feature = "frame")]
    pub fn from_df(frame: &LabeledFrame) -> Result<ColumnMap, DataError> {
        let columns = frame.to_columns()?;
        debug!("Converted frame with {} rows into {} columns", frame.num_rows(), columns.len());
        Ok(columns)
    }

    /// Convert this source into a frame.
    ///
    /// A non-empty `column_names` selects and orders the frame's columns;
    /// otherwise every column is used in insertion order.
    #[cfg(feature = "frame")]
    pub fn to_df(&self) -> Result<LabeledFrame, DataError> {
        let frame = if self.base.column_names.is_empty() {
            let names: Vec<String> = self.data.keys().cloned().collect();
            LabeledFrame::from_columns(&names, &self.data)?
        } else {
            LabeledFrame::from_columns(&self.base.column_names, &self.data)?
        };
        Ok(frame)
    }

    /// Check the row invariants and return the row count
    pub fn validate(&self) -> Result<usize, DataError> {
        let rows = self.check_lengths()?;
        self.check_selection(rows)?;
        Ok(rows)
    }

    /// Values of `name` at the selected rows; indices past the end are skipped
    pub fn selected_rows(&self, name: &str) -> Option<Vec<&serde_json::Value>> {
        let column = self.data.get(name)?;
        Some(
            self.base
                .selected
                .iter()
                .filter_map(|&row| column.get(row))
                .collect(),
        )
    }

    /// Script that updates this source in place on a live notebook page
    pub fn notebook_script(&self) -> Result<String, DataError> {
        notebook::update_script(self)
    }

    fn default_column_name(&self) -> String {
        let mut n = self.data.len();
        loop {
            let name = format!("{} {}", DEFAULT_NAME_PREFIX, n);
            if !self.data.contains_key(&name) {
                return name;
            }
            n += 1;
        }
    }

    fn check_column_names(&self, declared: &[String]) -> Result<(), DataError> {
        let unique: HashSet<&str> = declared.iter().map(String::as_str).collect();
        let consistent = unique.len() == declared.len()
            && declared.len() == self.data.len()
            && declared.iter().all(|name| self.data.contains_key(name));

        if consistent {
            Ok(())
        } else {
            Err(DataError::ColumnNamesMismatch {
                declared: declared.to_vec(),
                present: self.data.keys().cloned().collect(),
            })
        }
    }

    fn check_lengths(&self) -> Result<usize, DataError> {
        let expected = self.row_count();
        for (name, column) in &self.data {
            if column.len() != expected {
                return Err(DataError::LengthMismatch {
                    column: name.clone(),
                    expected,
                    actual: column.len(),
                });
            }
        }
        Ok(expected)
    }

    fn check_selection(&self, row_count: usize) -> Result<(), DataError> {
        match self.base.selected.iter().find(|&&row| row >= row_count) {
            Some(&index) => Err(DataError::SelectionOutOfBounds { index, row_count }),
            None => Ok(()),
        }
    }
}

impl Default for ColumnDataSource {
    fn default() -> Self {
        Self::empty()
    }
}

impl Model for ColumnDataSource {
    fn id(&self) -> ModelId {
        self.base.id()
    }

    fn type_name(&self) -> &'static str {
        "ColumnDataSource"
    }

    fn attributes(&self) -> Result<serde_json::Value, ModelError> {
        model::snapshot(self)
    }
}

impl HasDataSource for ColumnDataSource {
    fn data_source(&self) -> &DataSource {
        &self.base
    }

    fn data_source_mut(&mut self) -> &mut DataSource {
        &mut self.base
    }
}
