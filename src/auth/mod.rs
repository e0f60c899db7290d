//! Authentication service wiring over the system collections

pub mod auth_config;
pub mod auth_service;

pub use auth_config::{AuthEnvironment, AuthSettings, MiddlewareAdapter};
pub use auth_service::{
    build_auth_service, identity_user_transform, AuthService, AuthServiceBuilder, UserTransform,
};
