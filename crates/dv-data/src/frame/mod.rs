//! Labeled frames: Arrow record batches with a row index
//!
//! A frame is the tabular structure sources convert to and from. Columns live
//! in a [`RecordBatch`]; rows are labeled by a [`FrameIndex`] of one or more
//! (optionally named) levels.

use std::sync::Arc;

use arrow::array::{
    Array, ArrayRef, AsArray, BooleanArray, Float64Array, Int64Array, NullArray, StringArray,
};
use arrow::compute::cast;
use arrow::datatypes::{DataType, Field, Float64Type, Int64Type, Schema, UInt64Type};
use arrow::error::ArrowError;
use arrow::record_batch::{RecordBatch, RecordBatchOptions};
use arrow::util::display::{ArrayFormatter, FormatOptions};
use serde_json::Value;

use crate::sources::{Column, ColumnMap};

/// Name given to the index column when the index has no usable name
const DEFAULT_INDEX_NAME: &str = "index";

/// One level of a row index
#[derive(Debug, Clone)]
pub struct IndexLevel {
    pub name: Option<String>,
    pub values: ArrayRef,
}

impl IndexLevel {
    pub fn new(name: Option<String>, values: ArrayRef) -> Self {
        Self { name, values }
    }
}

/// Row labels of a frame
#[derive(Debug, Clone)]
pub struct FrameIndex {
    levels: Vec<IndexLevel>,
}

impl FrameIndex {
    /// Unnamed positional index `0..len`
    pub fn range(len: usize) -> Self {
        let values: ArrayRef = Arc::new(Int64Array::from_iter_values(0..len as i64));
        Self {
            levels: vec![IndexLevel::new(None, values)],
        }
    }

    /// Single-level index
    pub fn single(name: Option<String>, values: ArrayRef) -> Self {
        Self {
            levels: vec![IndexLevel::new(name, values)],
        }
    }

    /// Multi-level index; every level must have the same length
    pub fn multi(levels: Vec<IndexLevel>) -> Result<Self, ArrowError> {
        let len = match levels.first() {
            Some(level) => level.values.len(),
            None => {
                return Err(ArrowError::InvalidArgumentError(
                    "an index needs at least one level".to_string(),
                ))
            }
        };
        if let Some(level) = levels.iter().find(|l| l.values.len() != len) {
            return Err(ArrowError::InvalidArgumentError(format!(
                "index level {:?} has {} labels, expected {}",
                level.name,
                level.values.len(),
                len
            )));
        }
        Ok(Self { levels })
    }

    pub fn len(&self) -> usize {
        self.levels[0].values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn levels(&self) -> &[IndexLevel] {
        &self.levels
    }

    /// Name of a single-level index; multi-level indexes have none
    pub fn name(&self) -> Option<&str> {
        match self.levels.as_slice() {
            [level] => level.name.as_deref(),
            _ => None,
        }
    }

    /// Names of every level
    pub fn names(&self) -> Vec<Option<&str>> {
        self.levels.iter().map(|l| l.name.as_deref()).collect()
    }

    /// Name of the column the index becomes when converted to columns
    pub fn column_name(&self) -> String {
        if let Some(name) = self.name().filter(|n| !n.is_empty()) {
            return name.to_string();
        }

        let named: Vec<&str> = self
            .names()
            .into_iter()
            .flatten()
            .filter(|n| !n.is_empty())
            .collect();
        if named.is_empty() {
            DEFAULT_INDEX_NAME.to_string()
        } else {
            named.join("_")
        }
    }

    /// Labels as values; multi-level labels become one array per row
    pub fn to_values(&self) -> Result<Column, ArrowError> {
        let mut levels = self
            .levels
            .iter()
            .map(|level| array_to_values(level.values.as_ref()))
            .collect::<Result<Vec<_>, _>>()?;

        if levels.len() == 1 {
            return Ok(levels.remove(0));
        }

        Ok((0..self.len())
            .map(|row| Value::Array(levels.iter().map(|level| level[row].clone()).collect()))
            .collect())
    }
}

/// Columns plus row labels
#[derive(Debug, Clone)]
pub struct LabeledFrame {
    batch: RecordBatch,
    index: FrameIndex,
}

impl LabeledFrame {
    /// Wrap a batch with a positional index
    pub fn new(batch: RecordBatch) -> Self {
        let index = FrameIndex::range(batch.num_rows());
        Self { batch, index }
    }

    /// Wrap a batch with explicit row labels
    pub fn with_index(batch: RecordBatch, index: FrameIndex) -> Result<Self, ArrowError> {
        if index.len() != batch.num_rows() {
            return Err(ArrowError::InvalidArgumentError(format!(
                "index has {} labels but the batch has {} rows",
                index.len(),
                batch.num_rows()
            )));
        }
        Ok(Self { batch, index })
    }

    pub fn batch(&self) -> &RecordBatch {
        &self.batch
    }

    pub fn index(&self) -> &FrameIndex {
        &self.index
    }

    pub fn num_rows(&self) -> usize {
        self.batch.num_rows()
    }

    pub fn column_names(&self) -> Vec<String> {
        self.batch
            .schema()
            .fields()
            .iter()
            .map(|f| f.name().clone())
            .collect()
    }

    /// Build a frame from `names`, in that order, taken from `data`
    pub fn from_columns(names: &[String], data: &ColumnMap) -> Result<Self, ArrowError> {
        let mut fields = Vec::with_capacity(names.len());
        let mut arrays = Vec::with_capacity(names.len());

        for name in names {
            let column = data.get(name).ok_or_else(|| {
                ArrowError::InvalidArgumentError(format!("column '{}' not found in data", name))
            })?;
            let array = values_to_array(column);
            fields.push(Field::new(name, array.data_type().clone(), true));
            arrays.push(array);
        }

        let row_count = arrays.first().map(|a| a.len()).unwrap_or(0);
        let options = RecordBatchOptions::new().with_row_count(Some(row_count));
        let batch =
            RecordBatch::try_new_with_options(Arc::new(Schema::new(fields)), arrays, &options)?;
        Ok(Self::new(batch))
    }

    /// Every column as values, plus the index as one more column
    pub fn to_columns(&self) -> Result<ColumnMap, ArrowError> {
        let schema = self.batch.schema();
        let mut columns = ColumnMap::with_capacity(self.batch.num_columns() + 1);

        for (field, array) in schema.fields().iter().zip(self.batch.columns()) {
            columns.insert(field.name().clone(), array_to_values(array.as_ref())?);
        }
        columns.insert(self.index.column_name(), self.index.to_values()?);
        Ok(columns)
    }
}

/// Kind of Arrow array a column of values fits in
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ValueKind {
    Null,
    Boolean,
    Int64,
    Float64,
    Utf8,
    Json,
}

impl ValueKind {
    fn of(value: &Value) -> Self {
        match value {
            Value::Null => ValueKind::Null,
            Value::Bool(_) => ValueKind::Boolean,
            Value::Number(n) if n.is_i64() => ValueKind::Int64,
            Value::Number(_) => ValueKind::Float64,
            Value::String(_) => ValueKind::Utf8,
            Value::Array(_) | Value::Object(_) => ValueKind::Json,
        }
    }

    fn merge(self, other: Self) -> Self {
        match (self, other) {
            (a, b) if a == b => a,
            (ValueKind::Null, b) => b,
            (a, ValueKind::Null) => a,
            (ValueKind::Int64, ValueKind::Float64) | (ValueKind::Float64, ValueKind::Int64) => {
                ValueKind::Float64
            }
            _ => ValueKind::Json,
        }
    }
}

/// Convert a column of values to the narrowest fitting array.
///
/// Mixed columns fall back to strings holding each value's JSON text.
fn values_to_array(values: &[Value]) -> ArrayRef {
    let kind = values
        .iter()
        .map(ValueKind::of)
        .fold(ValueKind::Null, ValueKind::merge);

    match kind {
        ValueKind::Null => Arc::new(NullArray::new(values.len())),
        ValueKind::Boolean => Arc::new(values.iter().map(Value::as_bool).collect::<BooleanArray>()),
        ValueKind::Int64 => Arc::new(values.iter().map(Value::as_i64).collect::<Int64Array>()),
        ValueKind::Float64 => Arc::new(values.iter().map(Value::as_f64).collect::<Float64Array>()),
        ValueKind::Utf8 => Arc::new(values.iter().map(Value::as_str).collect::<StringArray>()),
        ValueKind::Json => Arc::new(
            values
                .iter()
                .map(|v| match v {
                    Value::Null => None,
                    Value::String(s) => Some(s.clone()),
                    other => Some(other.to_string()),
                })
                .collect::<StringArray>(),
        ),
    }
}

/// Convert an array to plain values; nulls and NaN become `Value::Null`.
///
/// Types without a JSON counterpart (dates, timestamps, ...) are rendered
/// with Arrow's display formatting.
fn array_to_values(array: &dyn Array) -> Result<Column, ArrowError> {
    let len = array.len();
    let values = match array.data_type() {
        DataType::Null => vec![Value::Null; len],
        DataType::Boolean => {
            let array = array.as_boolean();
            (0..len)
                .map(|i| nullable(array, i, || Value::Bool(array.value(i))))
                .collect()
        }
        DataType::Int8 | DataType::Int16 | DataType::Int32 | DataType::Int64 => {
            let cast_array = cast(array, &DataType::Int64)?;
            let array = cast_array.as_primitive::<Int64Type>();
            (0..len)
                .map(|i| nullable(array, i, || Value::from(array.value(i))))
                .collect()
        }
        DataType::UInt8 | DataType::UInt16 | DataType::UInt32 | DataType::UInt64 => {
            let cast_array = cast(array, &DataType::UInt64)?;
            let array = cast_array.as_primitive::<UInt64Type>();
            (0..len)
                .map(|i| nullable(array, i, || Value::from(array.value(i))))
                .collect()
        }
        DataType::Float16 | DataType::Float32 | DataType::Float64 => {
            let cast_array = cast(array, &DataType::Float64)?;
            let array = cast_array.as_primitive::<Float64Type>();
            (0..len)
                .map(|i| {
                    nullable(array, i, || {
                        serde_json::Number::from_f64(array.value(i))
                            .map(Value::Number)
                            .unwrap_or(Value::Null)
                    })
                })
                .collect()
        }
        DataType::Utf8 | DataType::LargeUtf8 => {
            let cast_array = cast(array, &DataType::Utf8)?;
            let array = cast_array.as_string::<i32>();
            (0..len)
                .map(|i| nullable(array, i, || Value::from(array.value(i))))
                .collect()
        }
        _ => {
            let formatter = ArrayFormatter::try_new(array, &FormatOptions::default())?;
            (0..len)
                .map(|i| nullable(array, i, || Value::from(formatter.value(i).to_string())))
                .collect()
        }
    };
    Ok(values)
}

fn nullable(array: &dyn Array, row: usize, value: impl FnOnce() -> Value) -> Value {
    if array.is_null(row) {
        Value::Null
    } else {
        value()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use arrow::array::{Date32Array, Float32Array, Int32Array};
    use serde_json::json;

    fn batch() -> RecordBatch {
        let schema = Schema::new(vec![
            Field::new("a", DataType::Int32, false),
            Field::new("b", DataType::Float32, true),
        ]);
        RecordBatch::try_new(
            Arc::new(schema),
            vec![
                Arc::new(Int32Array::from(vec![1, 2, 3])),
                Arc::new(Float32Array::from(vec![Some(0.5), None, Some(2.5)])),
            ],
        )
        .unwrap()
    }

    fn labels() -> ArrayRef {
        Arc::new(StringArray::from(vec!["r0", "r1", "r2"]))
    }

    #[test]
    fn test_unnamed_index_column_is_index() {
        let columns = LabeledFrame::new(batch()).to_columns().unwrap();

        assert_eq!(columns.keys().collect::<Vec<_>>(), ["a", "b", "index"]);
        assert_eq!(columns["index"], vec![json!(0), json!(1), json!(2)]);
        assert_eq!(columns["a"], vec![json!(1), json!(2), json!(3)]);
        assert_eq!(columns["b"], vec![json!(0.5), Value::Null, json!(2.5)]);
    }

    #[test]
    fn test_named_index_column() {
        let index = FrameIndex::single(Some("date".into()), labels());
        let frame = LabeledFrame::with_index(batch(), index).unwrap();
        let columns = frame.to_columns().unwrap();

        assert_eq!(columns["date"], vec![json!("r0"), json!("r1"), json!("r2")]);
        assert!(!columns.contains_key("index"));
    }

    #[test]
    fn test_empty_index_name_falls_back() {
        let index = FrameIndex::single(Some(String::new()), labels());
        assert_eq!(index.column_name(), "index");
    }

    #[test]
    fn test_multi_index_joins_level_names() {
        let years: ArrayRef = Arc::new(Int64Array::from(vec![2020, 2020, 2021]));
        let index = FrameIndex::multi(vec![
            IndexLevel::new(Some("year".into()), years.clone()),
            IndexLevel::new(None, labels()),
            IndexLevel::new(Some("site".into()), labels()),
        ])
        .unwrap();

        assert_eq!(index.name(), None);
        assert_eq!(index.column_name(), "year_site");

        let frame = LabeledFrame::with_index(batch(), index).unwrap();
        let columns = frame.to_columns().unwrap();
        assert_eq!(columns["year_site"][0], json!([2020, "r0", "r0"]));
    }

    #[test]
    fn test_unnamed_multi_index_is_index() {
        let index = FrameIndex::multi(vec![
            IndexLevel::new(None, labels()),
            IndexLevel::new(None, labels()),
        ])
        .unwrap();
        assert_eq!(index.column_name(), "index");
    }

    #[test]
    fn test_multi_index_level_lengths_must_match() {
        let short: ArrayRef = Arc::new(Int64Array::from(vec![1]));
        assert!(FrameIndex::multi(vec![
            IndexLevel::new(None, labels()),
            IndexLevel::new(None, short),
        ])
        .is_err());
        assert!(FrameIndex::multi(Vec::new()).is_err());
    }

    #[test]
    fn test_index_length_must_match_batch() {
        let short: ArrayRef = Arc::new(Int64Array::from(vec![1]));
        let index = FrameIndex::single(None, short);
        assert!(LabeledFrame::with_index(batch(), index).is_err());
    }

    #[test]
    fn test_from_columns_orders_and_filters() {
        let mut data = ColumnMap::new();
        data.insert("a".into(), vec![json!(1), json!(2)]);
        data.insert("b".into(), vec![json!(3), json!(4)]);
        data.insert("c".into(), vec![json!(5), json!(6)]);

        let frame = LabeledFrame::from_columns(&["b".to_string(), "a".to_string()], &data).unwrap();
        assert_eq!(frame.column_names(), ["b", "a"]);
        assert_eq!(frame.num_rows(), 2);
        assert_eq!(frame.index().name(), None);
    }

    #[test]
    fn test_from_columns_missing_name_fails() {
        let data = ColumnMap::new();
        let err = LabeledFrame::from_columns(&["nope".to_string()], &data).unwrap_err();
        assert!(err.to_string().contains("nope"));
    }

    #[test]
    fn test_from_columns_unequal_lengths_fail() {
        let mut data = ColumnMap::new();
        data.insert("a".into(), vec![json!(1), json!(2)]);
        data.insert("b".into(), vec![json!(3)]);
        assert!(LabeledFrame::from_columns(&["a".to_string(), "b".to_string()], &data).is_err());
    }

    #[test]
    fn test_no_columns_gives_empty_frame() {
        let frame = LabeledFrame::from_columns(&[], &ColumnMap::new()).unwrap();
        assert_eq!(frame.num_rows(), 0);
        assert!(frame.column_names().is_empty());
    }

    #[test]
    fn test_value_kinds() {
        assert_eq!(
            values_to_array(&[json!(1), Value::Null, json!(2)]).data_type(),
            &DataType::Int64
        );
        assert_eq!(values_to_array(&[json!(1), json!(2.5)]).data_type(), &DataType::Float64);
        assert_eq!(values_to_array(&[json!(true), json!(false)]).data_type(), &DataType::Boolean);
        assert_eq!(values_to_array(&[json!("x")]).data_type(), &DataType::Utf8);
        assert_eq!(values_to_array(&[Value::Null]).data_type(), &DataType::Null);

        let mixed = values_to_array(&[json!(1), json!("x"), json!([1, 2])]);
        assert_eq!(
            array_to_values(mixed.as_ref()).unwrap(),
            vec![json!("1"), json!("x"), json!("[1,2]")]
        );
    }

    #[test]
    fn test_dates_render_as_text() {
        let dates = Date32Array::from(vec![Some(0), None]);
        assert_eq!(
            array_to_values(&dates).unwrap(),
            vec![json!("1970-01-01"), Value::Null]
        );
    }

    #[test]
    fn test_nan_becomes_null() {
        let floats = Float64Array::from(vec![f64::NAN, 1.0]);
        assert_eq!(array_to_values(&floats).unwrap(), vec![Value::Null, json!(1.0)]);
    }
}
