//! Model identity and serialized snapshots
//!
//! Every object that takes part in a plot carries a stable id and a type name.
//! Other models point at it through a [`ModelRef`] rather than owning it.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::ModelError;

/// Unique identifier for a model
pub type ModelId = Uuid;

/// Reference to a model by id and type name
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ModelRef {
    pub id: ModelId,
    #[serde(rename = "type")]
    pub type_name: String,
}

impl ModelRef {
    /// Create a reference to an arbitrary model
    pub fn new(id: ModelId, type_name: impl Into<String>) -> Self {
        Self {
            id,
            type_name: type_name.into(),
        }
    }

    /// Whether this reference points at `model`
    pub fn refers_to(&self, model: &dyn Model) -> bool {
        self.id == model.id()
    }
}

/// Trait for all plot models
pub trait Model {
    /// Identity of this model instance
    fn id(&self) -> ModelId;

    /// Name of the model type as seen by consumers of the snapshot
    fn type_name(&self) -> &'static str;

    /// Attribute snapshot, one entry per declared attribute
    fn attributes(&self) -> Result<serde_json::Value, ModelError>;

    /// Reference to this model
    fn model_ref(&self) -> ModelRef {
        ModelRef::new(self.id(), self.type_name())
    }

    /// Full snapshot: the reference plus the attributes
    fn to_json(&self) -> Result<serde_json::Value, ModelError> {
        let attributes = self.attributes()?;
        Ok(serde_json::json!({
            "id": self.id(),
            "type": self.type_name(),
            "attributes": attributes,
        }))
    }
}

/// Serialize any model attribute struct into a JSON object
pub fn snapshot<T: Serialize>(value: &T) -> Result<serde_json::Value, ModelError> {
    let json = serde_json::to_value(value)?;
    if !json.is_object() {
        return Err(ModelError::NotAnObject(json.to_string()));
    }
    Ok(json)
}

/// Generate a fresh model id
pub fn new_id() -> ModelId {
    Uuid::new_v4()
}
