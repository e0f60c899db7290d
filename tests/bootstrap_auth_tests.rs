use fold_models::auth::{build_auth_service, AuthEnvironment, AuthService, AuthSettings};
use fold_models::bootstrap::{bootstrap_system_collections, AUTH_KEY, AUTH_SESSION, AUTH_USER};
use fold_models::error::RegistryError;
use fold_models::resolver::CollectionResolver;
use fold_models::schema::types::{CREATED_AT, UPDATED_AT};
use serde_json::json;

mod test_helpers;
use test_helpers::{collection, counting_registry, scripted};

#[test]
fn test_bootstrap_twice_registers_three_models() {
    let (store, registry) = counting_registry();

    let first = bootstrap_system_collections(&registry).unwrap();
    let second = bootstrap_system_collections(&registry).unwrap();

    assert_eq!(registry.names().unwrap(), vec![AUTH_KEY, AUTH_SESSION, AUTH_USER]);
    assert_eq!(store.model_definitions(), 3);
    assert!(first.user.same_model(&second.user));
    assert!(first.session.same_model(&second.session));
    assert!(first.key.same_model(&second.key));
}

#[test]
fn test_only_user_collection_has_timestamps() {
    let (_, registry) = counting_registry();
    let models = bootstrap_system_collections(&registry).unwrap();

    assert!(models.user.schema().has_timestamps());
    assert!(!models.session.schema().has_timestamps());
    assert!(!models.key.schema().has_timestamps());

    let user = models
        .user
        .insert(json!({"_id": "u1", "email": "ada@example.com"}))
        .unwrap();
    assert!(user[CREATED_AT].is_string());
    assert!(user[UPDATED_AT].is_string());

    let session = models
        .session
        .insert(json!({
            "_id": "s1",
            "user_id": "u1",
            "active_expires": 1_700_000_000_000u64,
            "idle_expires": 1_700_000_100_000u64,
        }))
        .unwrap();
    assert!(session.get(CREATED_AT).is_none());
}

#[test]
fn test_system_records_need_explicit_keys() {
    let (_, registry) = counting_registry();
    let models = bootstrap_system_collections(&registry).unwrap();

    assert!(models
        .key
        .insert(json!({"user_id": "u1", "hashed_password": "x"}))
        .is_err());
    assert!(models
        .key
        .insert(json!({"_id": "email:ada@example.com", "user_id": "u1"}))
        .is_ok());
}

#[test]
fn test_dev_auth_service_uses_registered_handles() {
    let (_, registry) = counting_registry();
    bootstrap_system_collections(&registry).unwrap();

    let auth = build_auth_service(
        registry.get(AUTH_SESSION).unwrap(),
        registry.get(AUTH_KEY).unwrap(),
        registry.get(AUTH_USER).unwrap(),
        AuthEnvironment::Dev,
    )
    .unwrap();

    assert!(auth.is_dev());
    assert_eq!(auth.environment().to_string(), "DEV");
    assert!(auth.user_model().same_model(&registry.get(AUTH_USER).unwrap().unwrap()));
    assert!(auth.session_model().same_model(&registry.get(AUTH_SESSION).unwrap().unwrap()));
    assert!(auth.key_model().same_model(&registry.get(AUTH_KEY).unwrap().unwrap()));
}

#[test]
fn test_auth_before_bootstrap_is_rejected() {
    let (_, registry) = counting_registry();
    let result = AuthService::from_registry(&registry, &AuthSettings::default());
    assert!(matches!(result, Err(RegistryError::InitializationOrder(_))));

    let result = build_auth_service(None, None, None, AuthEnvironment::Prod);
    assert!(matches!(result, Err(RegistryError::InitializationOrder(_))));
}

#[tokio::test]
async fn test_collection_named_like_system_collection_keeps_system_shape() {
    let (store, registry) = counting_registry();
    let models = bootstrap_system_collections(&registry).unwrap();
    let resolver = CollectionResolver::with_standard_mapper(registry.clone());
    let (stream, _) = scripted(vec![Some(vec![collection(AUTH_USER, &["nickname"])])]);

    let resolved = resolver.resolve_all(stream).await.unwrap();

    assert!(resolved[AUTH_USER].same_model(&models.user));
    assert!(resolved[AUTH_USER].schema().field("nickname").is_none());
    assert_eq!(store.model_definitions(), 3);
}
