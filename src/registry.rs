//! Process-wide mapping from collection name to model handle.

use crate::error::{RegistryError, RegistryResult};
use crate::schema::types::StorageSchema;
use crate::store::{DocumentStore, ModelHandle};
use log::{debug, info};
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

/// Snapshot of registered models keyed by collection name.
pub type ModelMap = HashMap<String, ModelHandle>;

/// Registry of models, one per collection name for the life of the process.
///
/// Entries are only ever added. Lookup, store check and creation happen under
/// a single lock, so parallel callers racing on the same name all receive the
/// handle created by the first one and the store sees one definition.
pub struct ModelRegistry {
    store: Arc<dyn DocumentStore>,
    models: Mutex<HashMap<String, ModelHandle>>,
}

impl ModelRegistry {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self {
            store,
            models: Mutex::new(HashMap::new()),
        }
    }

    fn lock(&self) -> RegistryResult<MutexGuard<'_, HashMap<String, ModelHandle>>> {
        self.models
            .lock()
            .map_err(|_| RegistryError::Lock("model registry"))
    }

    /// Returns the model registered under `name`, creating it from `schema`
    /// when there is none yet.
    ///
    /// The first registration wins: for an existing name `schema` is ignored,
    /// even when it differs. A model the store already knows about is adopted
    /// without being defined again.
    pub fn get_or_create(
        &self,
        name: &str,
        schema: Option<StorageSchema>,
    ) -> RegistryResult<ModelHandle> {
        let mut models = self.lock()?;

        if let Some(model) = models.get(name) {
            debug!("Model '{}' already registered", name);
            return Ok(model.clone());
        }

        if self.store.has_model(name) {
            if let Some(model) = self.store.get_model(name) {
                info!("Adopting model '{}' already defined in the store", name);
                models.insert(name.to_string(), model.clone());
                return Ok(model);
            }
        }

        let StorageSchema { fields, options } =
            schema.ok_or_else(|| RegistryError::MissingSchema(name.to_string()))?;
        let schema = self
            .store
            .define_schema(fields, options)
            .map_err(|e| RegistryError::schema(name, e))?;
        let model = self.store.define_model(name, schema)?;

        models.insert(name.to_string(), model.clone());
        info!("Registered model '{}'", name);
        Ok(model)
    }

    /// The model for `name`, or `None` when that collection is not configured yet.
    pub fn get(&self, name: &str) -> RegistryResult<Option<ModelHandle>> {
        Ok(self.lock()?.get(name).cloned())
    }

    pub fn contains(&self, name: &str) -> RegistryResult<bool> {
        Ok(self.lock()?.contains_key(name))
    }

    /// Registered collection names, sorted.
    pub fn names(&self) -> RegistryResult<Vec<String>> {
        let mut names: Vec<String> = self.lock()?.keys().cloned().collect();
        names.sort();
        Ok(names)
    }

    pub fn len(&self) -> RegistryResult<usize> {
        Ok(self.lock()?.len())
    }

    pub fn is_empty(&self) -> RegistryResult<bool> {
        Ok(self.lock()?.is_empty())
    }

    /// Copy of the full registry content.
    pub fn snapshot(&self) -> RegistryResult<ModelMap> {
        Ok(self.lock()?.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::types::{FieldFragment, FieldType, SchemaError, SchemaOptions};
    use crate::store::{SchemaHandle, SledStore, StoreResult};
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct CountingStore {
        inner: SledStore,
        schema_definitions: AtomicUsize,
    }

    impl DocumentStore for CountingStore {
        fn define_schema(
            &self,
            fields: Vec<FieldFragment>,
            options: SchemaOptions,
        ) -> Result<SchemaHandle, SchemaError> {
            self.schema_definitions.fetch_add(1, Ordering::SeqCst);
            self.inner.define_schema(fields, options)
        }

        fn has_model(&self, name: &str) -> bool {
            self.inner.has_model(name)
        }

        fn get_model(&self, name: &str) -> Option<ModelHandle> {
            self.inner.get_model(name)
        }

        fn define_model(&self, name: &str, schema: SchemaHandle) -> StoreResult<ModelHandle> {
            self.inner.define_model(name, schema)
        }
    }

    fn counting_registry() -> (Arc<CountingStore>, ModelRegistry) {
        let store = Arc::new(CountingStore {
            inner: SledStore::temporary().unwrap(),
            schema_definitions: AtomicUsize::new(0),
        });
        let registry = ModelRegistry::new(store.clone());
        (store, registry)
    }

    fn schema_with(field: &str) -> StorageSchema {
        StorageSchema::new(
            vec![FieldFragment::new(field, FieldType::String)],
            SchemaOptions::collection(),
        )
    }

    #[test]
    fn test_get_or_create_is_idempotent() {
        let (store, registry) = counting_registry();

        let first = registry.get_or_create("posts", Some(schema_with("title"))).unwrap();
        let second = registry.get_or_create("posts", Some(schema_with("body"))).unwrap();
        let third = registry.get_or_create("posts", None).unwrap();

        assert!(first.same_model(&second));
        assert!(first.same_model(&third));
        assert!(second.schema().field("title").is_some());
        assert!(second.schema().field("body").is_none());
        assert_eq!(store.schema_definitions.load(Ordering::SeqCst), 1);
        assert_eq!(registry.len().unwrap(), 1);
    }

    #[test]
    fn test_missing_schema_for_new_name() {
        let (_, registry) = counting_registry();
        assert!(matches!(
            registry.get_or_create("posts", None),
            Err(RegistryError::MissingSchema(name)) if name == "posts"
        ));
        assert!(!registry.contains("posts").unwrap());
    }

    #[test]
    fn test_failed_schema_leaves_no_entry() {
        let (_, registry) = counting_registry();
        let broken = StorageSchema::new(
            vec![
                FieldFragment::new("title", FieldType::String),
                FieldFragment::new("title", FieldType::String),
            ],
            SchemaOptions::collection(),
        );

        assert!(matches!(
            registry.get_or_create("posts", Some(broken)),
            Err(RegistryError::SchemaConstruction { .. })
        ));
        assert_eq!(registry.get("posts").unwrap().map(|m| m.name().to_string()), None);

        // a later valid registration still succeeds
        registry.get_or_create("posts", Some(schema_with("title"))).unwrap();
        assert!(registry.contains("posts").unwrap());
    }

    #[test]
    fn test_adopts_model_defined_directly_in_store() {
        let (store, registry) = counting_registry();
        let schema = store
            .define_schema(
                vec![FieldFragment::new("title", FieldType::String)],
                SchemaOptions::collection(),
            )
            .unwrap();
        let direct = store.define_model("posts", schema).unwrap();

        let adopted = registry.get_or_create("posts", Some(schema_with("body"))).unwrap();
        assert!(adopted.same_model(&direct));
        assert_eq!(store.schema_definitions.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_parallel_registration_defines_once() {
        let (store, registry) = counting_registry();
        let registry = Arc::new(registry);

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let registry = Arc::clone(&registry);
                std::thread::spawn(move || {
                    registry
                        .get_or_create("posts", Some(schema_with("title")))
                        .unwrap()
                })
            })
            .collect();
        let models: Vec<ModelHandle> = handles.into_iter().map(|h| h.join().unwrap()).collect();

        assert!(models.iter().all(|m| m.same_model(&models[0])));
        assert_eq!(store.schema_definitions.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_names_and_snapshot() {
        let (_, registry) = counting_registry();
        registry.get_or_create("pages", Some(schema_with("title"))).unwrap();
        registry.get_or_create("posts", Some(schema_with("title"))).unwrap();

        assert_eq!(registry.names().unwrap(), vec!["pages", "posts"]);
        let snapshot = registry.snapshot().unwrap();
        assert_eq!(snapshot.len(), 2);
        assert!(snapshot.contains_key("posts"));
    }
}
