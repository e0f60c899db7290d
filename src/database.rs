use crate::auth::AuthService;
use crate::bootstrap::{bootstrap_system_collections, SystemModels};
use crate::config::RegistryConfig;
use crate::error::{RegistryError, RegistryResult};
use crate::registry::{ModelMap, ModelRegistry};
use crate::resolver::CollectionResolver;
use crate::source::CollectionSource;
use crate::store::{DocumentStore, SledStore};
use log::info;
use std::sync::Arc;

/// A database with its model registry, system collections and auth service.
///
/// Opening runs the system collection bootstrap and wires the auth service
/// before anything else can touch the registry. Collection models are
/// resolved lazily from the [`CollectionSource`].
///
/// # Examples
///
/// ```rust,no_run
/// use fold_models::config::RegistryConfig;
/// use fold_models::database::ModelDatabase;
/// use fold_models::schema::{CollectionDescription, FieldDescription, FieldKind};
/// use std::path::PathBuf;
///
/// # async fn run() -> fold_models::error::RegistryResult<()> {
/// let db = ModelDatabase::open(RegistryConfig::new(PathBuf::from("data")))?;
/// db.source().publish(vec![CollectionDescription::new(
///     "posts",
///     vec![FieldDescription::new("title", FieldKind::Text)],
/// )]);
/// let models = db.collection_models().await?;
/// assert!(models.contains_key("posts"));
/// # Ok(())
/// # }
/// ```
pub struct ModelDatabase {
    config: RegistryConfig,
    registry: Arc<ModelRegistry>,
    system_models: SystemModels,
    auth: AuthService,
    source: CollectionSource,
}

impl ModelDatabase {
    /// Opens the sled database at `storage_path/db_name`.
    pub fn open(config: RegistryConfig) -> RegistryResult<Self> {
        config.validate()?;
        let path = config.database_path();
        std::fs::create_dir_all(&config.storage_path)?;
        info!("Opening model database at {}", path.display());
        let store = SledStore::open(&path)?;
        Self::with_store(config, Arc::new(store))
    }

    /// Builds the database over an already opened store.
    pub fn with_store(config: RegistryConfig, store: Arc<dyn DocumentStore>) -> RegistryResult<Self> {
        let registry = Arc::new(ModelRegistry::new(store));
        let system_models = bootstrap_system_collections(&registry)?;
        let auth = AuthService::from_registry(&registry, &config.auth)?;
        info!("Auth service ready in {} mode", auth.environment());

        let source = CollectionSource::new();
        if let Some(dir) = &config.collections_dir {
            source.load_dir(dir).map_err(|e| {
                RegistryError::Configuration(format!(
                    "Failed to load collections from {}: {}",
                    dir.display(),
                    e
                ))
            })?;
        }

        Ok(Self {
            config,
            registry,
            system_models,
            auth,
            source,
        })
    }

    pub fn config(&self) -> &RegistryConfig {
        &self.config
    }

    pub fn registry(&self) -> &Arc<ModelRegistry> {
        &self.registry
    }

    pub fn auth(&self) -> &AuthService {
        &self.auth
    }

    pub fn system_models(&self) -> &SystemModels {
        &self.system_models
    }

    pub fn source(&self) -> &CollectionSource {
        &self.source
    }

    /// Resolves the collections of the source into models.
    ///
    /// Pending until the source carries at least one collection.
    pub async fn collection_models(&self) -> RegistryResult<ModelMap> {
        CollectionResolver::with_standard_mapper(Arc::clone(&self.registry))
            .resolve_all(self.source.subscribe())
            .await
    }
}
