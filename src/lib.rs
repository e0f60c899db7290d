//! # Fold Models
//!
//! A runtime model registry for a sled-backed document database. Collection
//! descriptions arriving from external configuration are turned into storage
//! schemas and models on demand, exactly once per collection name, and the
//! three system collections used by authentication are bootstrapped eagerly.
//!
//! ## Core Components
//!
//! * `schema` - Collection descriptions, field mapping and schema building
//! * `store` - Storage layer: schemas, models and the sled document store
//! * `registry` - Process-wide model registry keyed by collection name
//! * `source` - Observable source of collection descriptions
//! * `resolver` - Resolution of a collection stream into registered models
//! * `bootstrap` - The `auth_session`, `auth_key` and `auth_user` collections
//! * `auth` - Authentication service wiring over the system collections
//! * `database` - Facade that opens a database and wires everything together
//! * `config` / `logging` / `error` - Configuration, logging and error types
//!
//! ## Architecture
//!
//! The resolver depends on the schema builder and the model registry; the
//! bootstrap depends on the registry only, since its shapes are fixed. The
//! auth service is assembled from the three handles the bootstrap registered,
//! so it must run after it. Every model goes through [`ModelRegistry::get_or_create`],
//! which is the single point guaranteeing one model per name.

pub mod auth;
pub mod bootstrap;
pub mod config;
pub mod database;
pub mod error;
pub mod logging;
pub mod registry;
pub mod resolver;
pub mod schema;
pub mod source;
pub mod store;

// Re-export main types for convenience
pub use auth::{build_auth_service, AuthEnvironment, AuthService, AuthSettings};
pub use bootstrap::{bootstrap_system_collections, SystemModels};
pub use config::{load_registry_config, RegistryConfig};
pub use database::ModelDatabase;
pub use error::{RegistryError, RegistryResult};
pub use logging::{LogConfig, LoggingSystem};
pub use registry::{ModelMap, ModelRegistry};
pub use resolver::{CollectionResolver, ResolverState};
pub use schema::{CollectionDescription, FieldDescription, FieldKind, SchemaBuilder};
pub use source::CollectionSource;
pub use store::{DocumentStore, ModelHandle, SledStore};
