//! Fixed system collections backing the authentication subsystem.
//!
//! These shapes are not field-mapped: each one is declared here directly and
//! keyed by the record's own `_id` instead of a generated identifier.

use crate::error::RegistryResult;
use crate::registry::ModelRegistry;
use crate::schema::types::{
    FieldFragment, FieldType, SchemaOptions, StorageSchema, TimestampSource, ID_FIELD,
};
use crate::store::ModelHandle;
use log::{debug, info};

pub const AUTH_SESSION: &str = "auth_session";
pub const AUTH_KEY: &str = "auth_key";
pub const AUTH_USER: &str = "auth_user";

/// Names of all system collections, in bootstrap order.
pub const SYSTEM_COLLECTIONS: [&str; 3] = [AUTH_SESSION, AUTH_KEY, AUTH_USER];

/// Handles to the three system models.
#[derive(Debug, Clone)]
pub struct SystemModels {
    pub session: ModelHandle,
    pub key: ModelHandle,
    pub user: ModelHandle,
}

fn natural_key() -> FieldFragment {
    FieldFragment::new(ID_FIELD, FieldType::String).with_required(true)
}

fn user_reference() -> FieldFragment {
    FieldFragment::new("user_id", FieldType::String).with_required(true)
}

pub fn session_schema() -> StorageSchema {
    StorageSchema::new(
        vec![
            natural_key(),
            user_reference(),
            FieldFragment::new("active_expires", FieldType::Number).with_required(true),
            FieldFragment::new("idle_expires", FieldType::Number).with_required(true),
        ],
        SchemaOptions::natural_key(),
    )
}

pub fn key_schema() -> StorageSchema {
    StorageSchema::new(
        vec![
            natural_key(),
            user_reference(),
            FieldFragment::new("hashed_password", FieldType::String),
        ],
        SchemaOptions::natural_key(),
    )
}

pub fn user_schema() -> StorageSchema {
    StorageSchema::new(
        vec![
            natural_key(),
            FieldFragment::new("email", FieldType::String).with_required(true),
            FieldFragment::new("username", FieldType::String),
            FieldFragment::new("role", FieldType::String),
            FieldFragment::new("avatar", FieldType::String),
            FieldFragment::new("is_registered", FieldType::Boolean),
            FieldFragment::new("blocked", FieldType::Boolean),
            FieldFragment::new("last_auth_method", FieldType::String),
            FieldFragment::new("last_active_at", FieldType::Date),
            FieldFragment::new("expires_at", FieldType::Date),
            FieldFragment::new("reset_requested_at", FieldType::Date),
            FieldFragment::new("reset_token", FieldType::String),
        ],
        SchemaOptions::natural_key().with_timestamps(TimestampSource::Rfc3339),
    )
}

/// The fixed schema of a system collection, `None` for any other name.
pub fn system_schema(name: &str) -> Option<StorageSchema> {
    match name {
        AUTH_SESSION => Some(session_schema()),
        AUTH_KEY => Some(key_schema()),
        AUTH_USER => Some(user_schema()),
        _ => None,
    }
}

/// Ensures the three system models exist and returns their handles.
///
/// Safe to run any number of times; existing models are left untouched.
pub fn bootstrap_system_collections(registry: &ModelRegistry) -> RegistryResult<SystemModels> {
    for name in SYSTEM_COLLECTIONS {
        if registry.contains(name)? {
            debug!("System collection '{}' already registered", name);
            continue;
        }
        registry.get_or_create(name, system_schema(name))?;
        info!("Bootstrapped system collection '{}'", name);
    }

    Ok(SystemModels {
        session: registry.get_or_create(AUTH_SESSION, None)?,
        key: registry.get_or_create(AUTH_KEY, None)?,
        user: registry.get_or_create(AUTH_USER, None)?,
    })
}
