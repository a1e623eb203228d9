//! Core functionality for the data visualization platform
//!
//! This crate provides model identity and the serialized snapshot form
//! shared by every plot object.

pub mod model;

use thiserror::Error;

// Re-export commonly used types
pub use model::{Model, ModelId, ModelRef};

/// Errors that can occur while snapshotting models
#[derive(Error, Debug)]
pub enum ModelError {
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Model attributes must serialize to an object, got {0}")]
    NotAnObject(String),
}
