//! Storage layer: schema definition, model definition and model lookup.
//!
//! The registry talks to storage only through [`DocumentStore`]; [`SledStore`]
//! is the implementation used by [`crate::database::ModelDatabase`].

pub mod error;
pub mod model;
pub mod sled_store;

pub use error::{StoreError, StoreResult};
pub use model::{ModelHandle, SchemaHandle};
pub use sled_store::SledStore;

use crate::schema::types::{
    FieldFragment, FieldType, SchemaError, SchemaOptions, StorageSchema, ID_FIELD,
};
use std::collections::HashSet;

/// Storage operations the model registry relies on.
///
/// All calls are synchronous. `define_model` must refuse a name that is
/// already defined, so callers have to check `has_model` first.
pub trait DocumentStore: Send + Sync {
    fn define_schema(
        &self,
        fields: Vec<FieldFragment>,
        options: SchemaOptions,
    ) -> Result<SchemaHandle, SchemaError>;

    fn has_model(&self, name: &str) -> bool;

    fn get_model(&self, name: &str) -> Option<ModelHandle>;

    fn define_model(&self, name: &str, schema: SchemaHandle) -> StoreResult<ModelHandle>;
}

/// Structural checks every store applies before accepting a schema.
pub fn validate_schema(schema: &StorageSchema) -> Result<(), SchemaError> {
    let mut seen = HashSet::new();
    for field in &schema.fields {
        if field.name.trim().is_empty() {
            return Err(SchemaError::InvalidField(
                "schema contains a field with an empty name".to_string(),
            ));
        }
        if !seen.insert(field.name.as_str()) {
            return Err(SchemaError::InvalidField(format!(
                "field '{}' is defined more than once",
                field.name
            )));
        }
        if field.name == ID_FIELD && field.field_type != FieldType::String {
            return Err(SchemaError::InvalidField(format!(
                "'{}' must be a string field",
                ID_FIELD
            )));
        }
        if field.field_type == FieldType::ObjectRef && field.reference.is_none() {
            return Err(SchemaError::InvalidField(format!(
                "reference field '{}' has no target collection",
                field.name
            )));
        }
    }
    Ok(())
}
