use crate::schema::collection::CollectionDescription;
use crate::schema::mapper::{FieldMapper, StandardFieldMapper};
use crate::schema::types::{
    FieldFragment, FieldType, SchemaError, SchemaOptions, StorageSchema, CREATED_AT, UPDATED_AT,
};
use log::debug;
use std::collections::HashSet;
use std::sync::Arc;

/// Builds storage schemas from collection descriptions.
///
/// Every schema gets the mapped fields in description order, followed by the
/// numeric `createdAt`/`updatedAt` audit fields and [`SchemaOptions::collection`].
pub struct SchemaBuilder<M = StandardFieldMapper> {
    mapper: Arc<M>,
}

impl<M> Clone for SchemaBuilder<M> {
    fn clone(&self) -> Self {
        Self {
            mapper: Arc::clone(&self.mapper),
        }
    }
}

impl Default for SchemaBuilder<StandardFieldMapper> {
    fn default() -> Self {
        Self::new(StandardFieldMapper)
    }
}

impl<M: FieldMapper> SchemaBuilder<M> {
    pub fn new(mapper: M) -> Self {
        Self {
            mapper: Arc::new(mapper),
        }
    }

    pub fn build_schema(
        &self,
        description: &CollectionDescription,
    ) -> Result<StorageSchema, SchemaError> {
        let mut fields = Vec::with_capacity(description.fields.len() + 2);
        let mut seen = HashSet::new();

        for field in &description.fields {
            let fragment = self.mapper.map(field)?;
            if fragment.name == CREATED_AT || fragment.name == UPDATED_AT {
                // audit fields are always numeric timestamps
                debug!(
                    "Collection '{}': field '{}' replaced by audit timestamp",
                    description.name, fragment.name
                );
                continue;
            }
            if !seen.insert(fragment.name.clone()) {
                return Err(SchemaError::InvalidField(format!(
                    "field '{}' is declared more than once in collection '{}'",
                    fragment.name, description.name
                )));
            }
            fields.push(fragment);
        }

        fields.push(FieldFragment::new(CREATED_AT, FieldType::Number));
        fields.push(FieldFragment::new(UPDATED_AT, FieldType::Number));

        Ok(StorageSchema::new(fields, SchemaOptions::collection()))
    }
}
