use super::error::{StoreError, StoreResult};
use super::model::{ModelHandle, SchemaHandle};
use super::{validate_schema, DocumentStore};
use crate::schema::types::{FieldFragment, SchemaError, SchemaOptions, StorageSchema};
use log::{info, warn};
use std::collections::HashMap;
use std::path::Path;
use std::sync::{Mutex, PoisonError};

/// Prefix of the sled tree holding a collection's documents.
const COLLECTION_TREE_PREFIX: &str = "collection:";

/// Document store backed by a sled database.
///
/// Each model owns a `collection:<name>` tree; schemas of defined models are
/// persisted as JSON in the `schemas` tree.
pub struct SledStore {
    db: sled::Db,
    schemas_tree: sled::Tree,
    models: Mutex<HashMap<String, ModelHandle>>,
}

impl SledStore {
    pub fn new(db: sled::Db) -> StoreResult<Self> {
        let schemas_tree = db.open_tree("schemas")?;
        Ok(Self {
            db,
            schemas_tree,
            models: Mutex::new(HashMap::new()),
        })
    }

    /// Opens (or creates) a database directory.
    pub fn open(path: &Path) -> StoreResult<Self> {
        Self::new(sled::open(path)?)
    }

    /// In-memory database removed on drop.
    pub fn temporary() -> StoreResult<Self> {
        Self::new(sled::Config::new().temporary(true).open()?)
    }

    /// The schema persisted for a collection, if any.
    pub fn stored_schema(&self, name: &str) -> StoreResult<Option<StorageSchema>> {
        match self.schemas_tree.get(name.as_bytes())? {
            Some(bytes) => Ok(Some(serde_json::from_slice(&bytes)?)),
            None => Ok(None),
        }
    }

    pub fn stored_schema_names(&self) -> StoreResult<Vec<String>> {
        let mut names = Vec::new();
        for entry in self.schemas_tree.iter() {
            let (key, _) = entry?;
            names.push(String::from_utf8_lossy(&key).to_string());
        }
        Ok(names)
    }

    fn persist_schema(&self, name: &str, schema: &StorageSchema) -> StoreResult<()> {
        if let Some(previous) = self.stored_schema(name)? {
            if &previous != schema {
                warn!(
                    "Schema for '{}' differs from the one persisted by an earlier run; replacing it",
                    name
                );
            }
        }
        self.schemas_tree
            .insert(name.as_bytes(), serde_json::to_vec(schema)?)?;
        self.schemas_tree.flush()?;
        Ok(())
    }
}

impl DocumentStore for SledStore {
    fn define_schema(
        &self,
        fields: Vec<FieldFragment>,
        options: SchemaOptions,
    ) -> Result<SchemaHandle, SchemaError> {
        let schema = StorageSchema::new(fields, options);
        validate_schema(&schema)?;
        Ok(SchemaHandle::new(schema))
    }

    fn has_model(&self, name: &str) -> bool {
        self.models
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .contains_key(name)
    }

    fn get_model(&self, name: &str) -> Option<ModelHandle> {
        self.models
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(name)
            .cloned()
    }

    fn define_model(&self, name: &str, schema: SchemaHandle) -> StoreResult<ModelHandle> {
        let mut models = self.models.lock().unwrap_or_else(PoisonError::into_inner);
        if models.contains_key(name) {
            return Err(StoreError::ModelExists(name.to_string()));
        }

        let documents = self
            .db
            .open_tree(format!("{}{}", COLLECTION_TREE_PREFIX, name))?;
        self.persist_schema(name, &schema)?;

        let model = ModelHandle::new(name, schema, documents);
        models.insert(name.to_string(), model.clone());
        info!("Defined model '{}'", name);
        Ok(model)
    }
}
