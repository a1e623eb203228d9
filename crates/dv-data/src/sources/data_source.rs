//! Base data source and column references

use dv_core::model::{self, Model, ModelId, ModelRef};
use dv_core::ModelError;
use serde::{Deserialize, Serialize};

/// Column ordering and row selection shared by every data source
///
/// Not generally useful on its own; concrete sources embed one.
#[derive(Debug, Serialize)]
pub struct DataSource {
    #[serde(skip)]
    id: ModelId,

    /// Names of all the columns, in display order
    pub column_names: Vec<String>,

    /// Selected row indices
    pub selected: Vec<usize>,
}

impl DataSource {
    /// Create an empty data source with a fresh id
    pub fn new() -> Self {
        Self {
            id: model::new_id(),
            column_names: Vec::new(),
            selected: Vec::new(),
        }
    }
}

impl Default for DataSource {
    fn default() -> Self {
        Self::new()
    }
}

impl Model for DataSource {
    fn id(&self) -> ModelId {
        self.id
    }

    fn type_name(&self) -> &'static str {
        "DataSource"
    }

    fn attributes(&self) -> Result<serde_json::Value, ModelError> {
        model::snapshot(self)
    }
}

/// Access to the embedded [`DataSource`] of a concrete source
pub trait HasDataSource: Model {
    fn data_source(&self) -> &DataSource;

    fn data_source_mut(&mut self) -> &mut DataSource;

    fn column_names(&self) -> &[String] {
        &self.data_source().column_names
    }

    fn selected(&self) -> &[usize] {
        &self.data_source().selected
    }

    /// Replace the selection. Indices are not checked against the row count.
    fn set_selected<I>(&mut self, indices: I)
    where
        I: IntoIterator<Item = usize>,
        Self: Sized,
    {
        self.data_source_mut().selected = indices.into_iter().collect();
    }

    fn clear_selection(&mut self) {
        self.data_source_mut().selected.clear();
    }

    /// Refer to a set of columns on this source.
    ///
    /// The names are not checked against the columns the source holds.
    fn columns<I, S>(&self, names: I) -> ColumnsRef
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
        Self: Sized,
    {
        ColumnsRef::new(self.model_ref(), names)
    }
}

impl HasDataSource for DataSource {
    fn data_source(&self) -> &DataSource {
        self
    }

    fn data_source_mut(&mut self) -> &mut DataSource {
        self
    }
}

/// A collection of columns on a specific data source
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnsRef {
    source: ModelRef,
    columns: Vec<String>,
}

impl ColumnsRef {
    pub fn new<I, S>(source: ModelRef, columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            source,
            columns: columns.into_iter().map(Into::into).collect(),
        }
    }

    /// The referenced source
    pub fn source(&self) -> &ModelRef {
        &self.source
    }

    /// The referenced column names
    pub fn columns(&self) -> &[String] {
        &self.columns
    }
}
