use super::auth_config::{AuthEnvironment, AuthSettings, MiddlewareAdapter};
use crate::bootstrap::{SystemModels, AUTH_KEY, AUTH_SESSION, AUTH_USER};
use crate::error::{RegistryError, RegistryResult};
use crate::registry::ModelRegistry;
use crate::store::{ModelHandle, StoreResult};
use serde_json::Value;
use std::fmt;
use std::sync::Arc;

/// Hook applied to every user record read through the auth service.
pub type UserTransform = Arc<dyn Fn(Value) -> Value + Send + Sync>;

/// The user record is passed through unchanged; replace it to reshape users.
pub fn identity_user_transform() -> UserTransform {
    Arc::new(|user| user)
}

/// Authentication service assembled from the system models.
#[derive(Clone)]
pub struct AuthService {
    models: SystemModels,
    settings: AuthSettings,
    transform_database_user: UserTransform,
}

impl fmt::Debug for AuthService {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuthService")
            .field("models", &self.models)
            .field("settings", &self.settings)
            .finish_non_exhaustive()
    }
}

impl AuthService {
    pub fn builder() -> AuthServiceBuilder {
        AuthServiceBuilder::default()
    }

    /// Wires the service from the system models found in `registry`.
    pub fn from_registry(registry: &ModelRegistry, settings: &AuthSettings) -> RegistryResult<Self> {
        Self::builder()
            .session_opt(registry.get(AUTH_SESSION)?)
            .key_opt(registry.get(AUTH_KEY)?)
            .user_opt(registry.get(AUTH_USER)?)
            .settings(settings.clone())
            .build()
    }

    pub fn session_model(&self) -> &ModelHandle {
        &self.models.session
    }

    pub fn key_model(&self) -> &ModelHandle {
        &self.models.key
    }

    pub fn user_model(&self) -> &ModelHandle {
        &self.models.user
    }

    pub fn models(&self) -> &SystemModels {
        &self.models
    }

    pub fn environment(&self) -> AuthEnvironment {
        self.settings.environment
    }

    pub fn is_dev(&self) -> bool {
        self.settings.environment == AuthEnvironment::Dev
    }

    pub fn auto_database_cleanup(&self) -> bool {
        self.settings.auto_database_cleanup
    }

    pub fn middleware(&self) -> MiddlewareAdapter {
        self.settings.middleware
    }

    pub fn transform_user(&self, user: Value) -> Value {
        (self.transform_database_user)(user)
    }

    /// Reads a user record and applies the user transform.
    pub fn get_user(&self, user_id: &str) -> StoreResult<Option<Value>> {
        Ok(self
            .models
            .user
            .find_by_id(user_id)?
            .map(|user| self.transform_user(user)))
    }
}

/// Step-by-step construction of an [`AuthService`].
#[derive(Default)]
pub struct AuthServiceBuilder {
    session: Option<ModelHandle>,
    key: Option<ModelHandle>,
    user: Option<ModelHandle>,
    settings: AuthSettings,
    transform: Option<UserTransform>,
}

impl AuthServiceBuilder {
    pub fn session(self, model: ModelHandle) -> Self {
        self.session_opt(Some(model))
    }

    pub fn key(self, model: ModelHandle) -> Self {
        self.key_opt(Some(model))
    }

    pub fn user(self, model: ModelHandle) -> Self {
        self.user_opt(Some(model))
    }

    pub fn session_opt(mut self, model: Option<ModelHandle>) -> Self {
        self.session = model;
        self
    }

    pub fn key_opt(mut self, model: Option<ModelHandle>) -> Self {
        self.key = model;
        self
    }

    pub fn user_opt(mut self, model: Option<ModelHandle>) -> Self {
        self.user = model;
        self
    }

    pub fn models(self, models: SystemModels) -> Self {
        self.session(models.session)
            .key(models.key)
            .user(models.user)
    }

    pub fn settings(mut self, settings: AuthSettings) -> Self {
        self.settings = settings;
        self
    }

    pub fn environment(mut self, environment: AuthEnvironment) -> Self {
        self.settings.environment = environment;
        self
    }

    pub fn auto_database_cleanup(mut self, enabled: bool) -> Self {
        self.settings.auto_database_cleanup = enabled;
        self
    }

    pub fn middleware(mut self, middleware: MiddlewareAdapter) -> Self {
        self.settings.middleware = middleware;
        self
    }

    pub fn transform_database_user<F>(mut self, transform: F) -> Self
    where
        F: Fn(Value) -> Value + Send + Sync + 'static,
    {
        self.transform = Some(Arc::new(transform));
        self
    }

    /// Fails with [`RegistryError::InitializationOrder`] when a system model
    /// is missing, which means the bootstrap has not run yet.
    pub fn build(self) -> RegistryResult<AuthService> {
        let session = require(self.session, AUTH_SESSION)?;
        let key = require(self.key, AUTH_KEY)?;
        let user = require(self.user, AUTH_USER)?;

        Ok(AuthService {
            models: SystemModels { session, key, user },
            settings: self.settings,
            transform_database_user: self.transform.unwrap_or_else(identity_user_transform),
        })
    }
}

fn require(model: Option<ModelHandle>, name: &str) -> RegistryResult<ModelHandle> {
    model.ok_or_else(|| {
        RegistryError::InitializationOrder(format!(
            "'{}' model is not registered; bootstrap the system collections before wiring auth",
            name
        ))
    })
}

/// Assembles the auth service from the three system models.
pub fn build_auth_service(
    session: Option<ModelHandle>,
    key: Option<ModelHandle>,
    user: Option<ModelHandle>,
    environment: AuthEnvironment,
) -> RegistryResult<AuthService> {
    AuthService::builder()
        .session_opt(session)
        .key_opt(key)
        .user_opt(user)
        .environment(environment)
        .build()
}
