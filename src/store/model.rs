//! Schema-bound model handles and their document operations.

use super::error::{StoreError, StoreResult};
use crate::schema::types::{
    FieldType, StorageSchema, TimestampSource, CREATED_AT, ID_FIELD, UPDATED_AT,
};
use serde_json::{Map, Value};
use std::fmt;
use std::ops::Deref;
use std::sync::Arc;

/// A validated, immutable storage schema as accepted by the store.
#[derive(Debug, Clone, PartialEq)]
pub struct SchemaHandle(Arc<StorageSchema>);

impl SchemaHandle {
    pub(crate) fn new(schema: StorageSchema) -> Self {
        Self(Arc::new(schema))
    }
}

impl Deref for SchemaHandle {
    type Target = StorageSchema;

    fn deref(&self) -> &StorageSchema {
        &self.0
    }
}

struct Model {
    name: String,
    schema: SchemaHandle,
    documents: sled::Tree,
}

/// Queryable reference to one collection.
///
/// Clones share the same underlying model; use [`ModelHandle::same_model`] to
/// compare identity.
#[derive(Clone)]
pub struct ModelHandle {
    inner: Arc<Model>,
}

impl fmt::Debug for ModelHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ModelHandle")
            .field("name", &self.inner.name)
            .field("fields", &self.inner.schema.field_names())
            .finish()
    }
}

impl ModelHandle {
    pub(crate) fn new(name: &str, schema: SchemaHandle, documents: sled::Tree) -> Self {
        Self {
            inner: Arc::new(Model {
                name: name.to_string(),
                schema,
                documents,
            }),
        }
    }

    pub fn name(&self) -> &str {
        &self.inner.name
    }

    pub fn schema(&self) -> &StorageSchema {
        &self.inner.schema
    }

    /// Whether both handles refer to the same registered model.
    pub fn same_model(&self, other: &ModelHandle) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }

    /// Inserts a new document and returns it as stored.
    pub fn insert(&self, document: Value) -> StoreResult<Value> {
        let mut document = self.expect_object(document)?;
        let id = self.resolve_id(&mut document)?;
        self.apply_strictness(&mut document);

        if let Some(source) = self.schema().options.timestamps {
            let now = timestamp(source);
            document.insert(CREATED_AT.to_string(), now.clone());
            document.insert(UPDATED_AT.to_string(), now);
        }
        self.validate(&document)?;

        let document = Value::Object(document);
        let bytes = serde_json::to_vec(&document)?;
        let swapped = self
            .inner
            .documents
            .compare_and_swap(id.as_bytes(), None::<&[u8]>, Some(bytes))?;
        if swapped.is_err() {
            return Err(StoreError::DuplicateKey {
                collection: self.name().to_string(),
                id,
            });
        }
        self.inner.documents.flush()?;

        Ok(document)
    }

    pub fn find_by_id(&self, id: &str) -> StoreResult<Option<Value>> {
        match self.inner.documents.get(id.as_bytes())? {
            Some(bytes) => Ok(Some(serde_json::from_slice(&bytes)?)),
            None => Ok(None),
        }
    }

    /// All documents of the collection in key order.
    pub fn find_all(&self) -> StoreResult<Vec<Value>> {
        let mut documents = Vec::new();
        for entry in self.inner.documents.iter() {
            let (_, bytes) = entry?;
            documents.push(serde_json::from_slice(&bytes)?);
        }
        Ok(documents)
    }

    /// Shallow-merges `patch` into an existing document.
    ///
    /// `_id` and `createdAt` cannot be changed. Returns `None` when no document
    /// has the given id.
    pub fn update(&self, id: &str, patch: Value) -> StoreResult<Option<Value>> {
        let patch = self.expect_object(patch)?;
        let documents = &self.inner.documents;

        // retried until no other writer touched the document in between
        loop {
            let current = match documents.get(id.as_bytes())? {
                Some(bytes) => bytes,
                None => return Ok(None),
            };
            let mut document = match serde_json::from_slice::<Value>(&current)? {
                Value::Object(document) => document,
                _ => return Ok(None),
            };

            for (key, value) in &patch {
                if key == ID_FIELD || key == CREATED_AT {
                    continue;
                }
                document.insert(key.clone(), value.clone());
            }
            self.apply_strictness(&mut document);

            if let Some(source) = self.schema().options.timestamps {
                document.insert(UPDATED_AT.to_string(), timestamp(source));
            }
            self.validate(&document)?;

            let document = Value::Object(document);
            let swapped = documents.compare_and_swap(
                id.as_bytes(),
                Some(current),
                Some(serde_json::to_vec(&document)?),
            )?;
            match swapped {
                Ok(()) => {
                    documents.flush()?;
                    return Ok(Some(document));
                }
                Err(conflict) if conflict.current.is_none() => return Ok(None),
                Err(_) => continue,
            }
        }
    }

    pub fn delete(&self, id: &str) -> StoreResult<bool> {
        let existed = self.inner.documents.remove(id.as_bytes())?.is_some();
        self.inner.documents.flush()?;
        Ok(existed)
    }

    pub fn count(&self) -> usize {
        self.inner.documents.len()
    }

    fn validation_error(&self, reason: String) -> StoreError {
        StoreError::Validation {
            collection: self.name().to_string(),
            reason,
        }
    }

    fn expect_object(&self, value: Value) -> StoreResult<Map<String, Value>> {
        match value {
            Value::Object(map) => Ok(map),
            other => Err(self.validation_error(format!(
                "expected a JSON object, got {}",
                other
            ))),
        }
    }

    fn resolve_id(&self, document: &mut Map<String, Value>) -> StoreResult<String> {
        match document.get(ID_FIELD) {
            Some(Value::String(id)) if !id.is_empty() => Ok(id.clone()),
            Some(Value::String(_)) | Some(Value::Null) | None if self.schema().options.auto_id => {
                let id = uuid::Uuid::new_v4().to_string();
                document.insert(ID_FIELD.to_string(), Value::String(id.clone()));
                Ok(id)
            }
            Some(other) if !other.is_null() && !other.is_string() => Err(self.validation_error(
                format!("'{}' must be a string, got {}", ID_FIELD, other),
            )),
            _ => Err(self.validation_error(format!(
                "documents must supply their own '{}'",
                ID_FIELD
            ))),
        }
    }

    fn apply_strictness(&self, document: &mut Map<String, Value>) {
        let schema = self.schema();
        if !schema.options.strict_field_checking {
            return;
        }
        let timestamps = schema.has_timestamps();
        document.retain(|key, _| {
            key == ID_FIELD
                || schema.field(key).is_some()
                || (timestamps && (key == CREATED_AT || key == UPDATED_AT))
        });
    }

    fn validate(&self, document: &Map<String, Value>) -> StoreResult<()> {
        for field in &self.schema().fields {
            let value = match document.get(&field.name) {
                Some(Value::Null) | None => {
                    if field.required {
                        return Err(
                            self.validation_error(format!("field '{}' is required", field.name))
                        );
                    }
                    continue;
                }
                Some(value) => value,
            };

            if !matches_type(&field.field_type, value) {
                return Err(self.validation_error(format!(
                    "field '{}' expects {:?}, got {}",
                    field.name, field.field_type, value
                )));
            }

            if !field.allowed_values.is_empty() {
                if let Some(text) = value.as_str() {
                    if !field.allowed_values.iter().any(|allowed| allowed == text) {
                        return Err(self.validation_error(format!(
                            "field '{}' does not accept '{}'",
                            field.name, text
                        )));
                    }
                }
            }
        }
        Ok(())
    }
}

fn matches_type(field_type: &FieldType, value: &Value) -> bool {
    match field_type {
        FieldType::String | FieldType::ObjectRef => value.is_string(),
        FieldType::Number => value.is_number(),
        FieldType::Boolean => value.is_boolean(),
        FieldType::Date => value.is_string() || value.is_number(),
        FieldType::Array(inner) => value
            .as_array()
            .is_some_and(|items| items.iter().all(|item| matches_type(inner, item))),
        FieldType::Mixed => true,
    }
}

fn timestamp(source: TimestampSource) -> Value {
    let now = chrono::Utc::now();
    match source {
        TimestampSource::EpochMillis => Value::from(now.timestamp_millis()),
        TimestampSource::Rfc3339 => Value::from(now.to_rfc3339()),
    }
}
