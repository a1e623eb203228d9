//! Data source that refers to data held by a plot server
//!
//! The data is loaded on demand by the client; nothing is fetched or
//! transformed here.

use dv_core::model::{self, Model, ModelId, ModelRef};
use dv_core::ModelError;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::sources::{ColumnMap, DataSource, HasDataSource};

/// Parameter of a server-side transform: another model or a primitive value
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TransformValue {
    Model(ModelRef),
    Value(serde_json::Value),
}

impl From<ModelRef> for TransformValue {
    fn from(model: ModelRef) -> Self {
        TransformValue::Model(model)
    }
}

impl From<serde_json::Value> for TransformValue {
    fn from(value: serde_json::Value) -> Self {
        TransformValue::Value(value)
    }
}

impl From<&str> for TransformValue {
    fn from(value: &str) -> Self {
        TransformValue::Value(value.into())
    }
}

impl From<String> for TransformValue {
    fn from(value: String) -> Self {
        TransformValue::Value(value.into())
    }
}

impl From<f64> for TransformValue {
    fn from(value: f64) -> Self {
        TransformValue::Value(value.into())
    }
}

impl From<i64> for TransformValue {
    fn from(value: i64) -> Self {
        TransformValue::Value(value.into())
    }
}

impl From<bool> for TransformValue {
    fn from(value: bool) -> Self {
        TransformValue::Value(value.into())
    }
}

#[derive(Debug, Serialize)]
pub struct ServerDataSource {
    #[serde(flatten)]
    base: DataSource,

    /// URL of the server endpoint for the data
    pub data_url: String,

    /// User to authenticate as when the server runs in multi-user mode
    pub owner_username: String,

    /// Columns included directly; merged with the server's by the client
    pub data: ColumnMap,

    /// Parameters of the server-side transform. Minimally a tag naming the
    /// downsampling routine to use.
    pub transform: IndexMap<String, TransformValue>,
}

impl ServerDataSource {
    pub fn new(data_url: impl Into<String>) -> Self {
        Self {
            base: DataSource::new(),
            data_url: data_url.into(),
            owner_username: String::new(),
            data: ColumnMap::new(),
            transform: IndexMap::new(),
        }
    }

    pub fn with_owner(mut self, owner_username: impl Into<String>) -> Self {
        self.owner_username = owner_username.into();
        self
    }

    pub fn with_data(mut self, data: ColumnMap) -> Self {
        self.data = data;
        self
    }

    pub fn with_transform(mut self, key: impl Into<String>, value: impl Into<TransformValue>) -> Self {
        self.transform.insert(key.into(), value.into());
        self
    }

    pub fn transform_param(&self, key: &str) -> Option<&TransformValue> {
        self.transform.get(key)
    }
}

impl Model for ServerDataSource {
    fn id(&self) -> ModelId {
        self.base.id()
    }

    fn type_name(&self) -> &'static str {
        "ServerDataSource"
    }

    fn attributes(&self) -> Result<serde_json::Value, ModelError> {
        model::snapshot(self)
    }
}

impl HasDataSource for ServerDataSource {
    fn data_source(&self) -> &DataSource {
        &self.base
    }

    fn data_source_mut(&mut self) -> &mut DataSource {
        &mut self.base
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sources::ColumnDataSource;
    use serde_json::json;

    #[test]
    fn test_descriptor_fields() {
        let source = ServerDataSource::new("http://localhost:5006/bokeh/data/points")
            .with_owner("defaultuser")
            .with_transform("resample", "heatmap")
            .with_transform("spread", 3i64);

        assert_eq!(source.data_url, "http://localhost:5006/bokeh/data/points");
        assert_eq!(source.owner_username, "defaultuser");
        assert_eq!(source.transform_param("resample"), Some(&TransformValue::Value(json!("heatmap"))));
        assert_eq!(source.transform_param("spread"), Some(&TransformValue::Value(json!(3))));
        assert!(source.transform_param("missing").is_none());
    }

    #[test]
    fn test_transform_model_reference_serializes_as_ref() {
        let range = ColumnDataSource::empty();
        let source = ServerDataSource::new("/data").with_transform("x_range", range.model_ref());

        let json = source.attributes().unwrap();
        assert_eq!(json["transform"]["x_range"]["type"], "ColumnDataSource");
        assert_eq!(json["transform"]["x_range"]["id"], range.id().to_string());
        assert_eq!(json["data_url"], "/data");
        assert_eq!(json["column_names"], json!([]));
    }

    #[test]
    fn test_transform_value_deserializes_untagged() {
        let id = model::new_id();
        let parsed: TransformValue =
            serde_json::from_value(json!({"id": id, "type": "Range1d"})).unwrap();
        assert_eq!(parsed, TransformValue::Model(ModelRef::new(id, "Range1d")));

        let parsed: TransformValue = serde_json::from_value(json!(0.5)).unwrap();
        assert_eq!(parsed, TransformValue::Value(json!(0.5)));
    }

    #[test]
    fn test_overlay_data_and_selection() {
        let mut overlay = ColumnMap::new();
        overlay.insert("color".into(), vec![json!("red")]);

        let mut source = ServerDataSource::new("/data").with_data(overlay.clone());
        source.set_selected([0]);

        assert_eq!(source.data, overlay);
        assert_eq!(source.selected(), [0]);
        assert!(source.columns(["color"]).source().refers_to(&source));
    }
}
