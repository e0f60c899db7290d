use crate::config::ConfigError;
use crate::schema::types::SchemaError;
use crate::store::StoreError;

/// Unified error type for registry, resolver, bootstrap and auth wiring.
///
/// Re-registering an existing collection is not an error, and neither is a
/// configuration stream that never delivers data: the first is a no-op and the
/// second simply leaves the resolution future pending.
#[derive(Debug, thiserror::Error)]
pub enum RegistryError {
    /// A collection description cannot be registered (e.g. it has no name).
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Mapping or schema construction failed for one collection; the drain
    /// that hit it stops, earlier registrations stay.
    #[error("Failed to build schema for collection '{collection}': {source}")]
    SchemaConstruction {
        collection: String,
        #[source]
        source: SchemaError,
    },

    /// A model was requested for the first time without a schema.
    #[error("No model registered for '{0}' and no schema supplied to create it")]
    MissingSchema(String),

    #[error("Storage error: {0}")]
    Store(#[from] StoreError),

    /// `resolve_all` was called while a pass on the same resolver is pending.
    #[error("A resolution pass is already in progress on this resolver")]
    AlreadyResolving,

    /// Auth wiring ran before the system collections were bootstrapped.
    #[error("Initialization order error: {0}")]
    InitializationOrder(String),

    #[error("Config error: {0}")]
    Config(#[from] ConfigError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to acquire {0} lock")]
    Lock(&'static str),
}

impl RegistryError {
    pub(crate) fn schema(collection: &str, source: SchemaError) -> Self {
        Self::SchemaConstruction {
            collection: collection.to_string(),
            source,
        }
    }
}

/// Result type alias for operations that can result in a RegistryError
pub type RegistryResult<T> = Result<T, RegistryError>;
