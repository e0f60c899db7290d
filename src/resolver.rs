//! Resolution of a live collection configuration stream into registered models.
//!
//! A pass waits for the first emission that actually carries collection
//! descriptions, registers every one of them, drops the stream and completes
//! with the registry's content. Emissions that are empty are skipped; anything
//! emitted after the consumed one is never observed.

use crate::error::{RegistryError, RegistryResult};
use crate::registry::{ModelMap, ModelRegistry};
use crate::schema::builder::SchemaBuilder;
use crate::schema::collection::CollectionDescription;
use crate::schema::mapper::{FieldMapper, StandardFieldMapper};
use crate::source::CollectionSnapshot;
use futures::{Stream, StreamExt};
use log::{debug, error, info, warn};
use std::sync::{Arc, Mutex, PoisonError};

/// Lifecycle of a resolution pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResolverState {
    /// No pass has been started, or the last one was abandoned or failed.
    Idle,
    /// Subscribed, no usable emission yet.
    Waiting,
    /// Registering the descriptions of the consumed emission.
    Draining,
    /// The last pass completed and detached from its stream.
    Resolved,
}

/// Turns a stream of collection snapshots into a completed model map.
///
/// One pass at a time per instance; use separate instances for concurrent
/// passes. Once a pass has resolved (or its future was dropped) the same
/// instance can run another one.
pub struct CollectionResolver<M = StandardFieldMapper> {
    registry: Arc<ModelRegistry>,
    builder: SchemaBuilder<M>,
    state: Mutex<ResolverState>,
}

impl CollectionResolver<StandardFieldMapper> {
    pub fn with_standard_mapper(registry: Arc<ModelRegistry>) -> Self {
        Self::new(registry, SchemaBuilder::default())
    }
}

impl<M: FieldMapper> CollectionResolver<M> {
    pub fn new(registry: Arc<ModelRegistry>, builder: SchemaBuilder<M>) -> Self {
        Self {
            registry,
            builder,
            state: Mutex::new(ResolverState::Idle),
        }
    }

    pub fn state(&self) -> ResolverState {
        *self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Waits for the first non-empty emission, registers all of its
    /// collections and resolves with every model in the registry.
    ///
    /// Never completes if the stream never carries collections. Fails with
    /// [`RegistryError::AlreadyResolving`] when another pass on this resolver
    /// is still pending, and with [`RegistryError::SchemaConstruction`] when a
    /// description cannot be turned into a schema; collections registered
    /// before that point stay registered.
    pub async fn resolve_all<S>(&self, mut stream: S) -> RegistryResult<ModelMap>
    where
        S: Stream<Item = CollectionSnapshot> + Unpin,
    {
        let mut pass = self.begin()?;

        while let Some(snapshot) = stream.next().await {
            let collections = match snapshot {
                Some(collections) if !collections.is_empty() => collections,
                _ => {
                    debug!("Ignoring emission without collections");
                    continue;
                }
            };

            pass.set(ResolverState::Draining);
            let drained = self.drain(&collections);
            // detach before anyone can observe the result
            drop(stream);

            let models = drained?;
            pass.resolved();
            return Ok(models);
        }

        debug!("Collection stream ended without delivering collections");
        std::future::pending().await
    }

    fn begin(&self) -> RegistryResult<Pass<'_>> {
        let mut state = self
            .state
            .lock()
            .map_err(|_| RegistryError::Lock("resolver state"))?;
        if matches!(*state, ResolverState::Waiting | ResolverState::Draining) {
            return Err(RegistryError::AlreadyResolving);
        }
        *state = ResolverState::Waiting;
        Ok(Pass {
            state: &self.state,
            resolved: false,
        })
    }

    fn drain(&self, collections: &[CollectionDescription]) -> RegistryResult<ModelMap> {
        for description in collections {
            if !description.has_name() {
                warn!(
                    "Skipping collection description without a name ({} fields)",
                    description.fields.len()
                );
                continue;
            }

            let schema = self.builder.build_schema(description).map_err(|e| {
                error!(
                    "Aborting resolution at collection '{}': {}",
                    description.name, e
                );
                RegistryError::schema(&description.name, e)
            })?;
            self.registry.get_or_create(&description.name, Some(schema))?;
        }

        let models = self.registry.snapshot()?;
        info!(
            "Resolved {} collections into {} registered models",
            collections.len(),
            models.len()
        );
        Ok(models)
    }
}

/// Tracks one pass; an unfinished pass returns the resolver to `Idle`.
struct Pass<'a> {
    state: &'a Mutex<ResolverState>,
    resolved: bool,
}

impl Pass<'_> {
    fn set(&self, next: ResolverState) {
        *self.state.lock().unwrap_or_else(PoisonError::into_inner) = next;
    }

    fn resolved(&mut self) {
        self.set(ResolverState::Resolved);
        self.resolved = true;
    }
}

impl Drop for Pass<'_> {
    fn drop(&mut self) {
        if !self.resolved {
            self.set(ResolverState::Idle);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::types::{FieldDescription, FieldKind};
    use crate::store::SledStore;
    use futures::stream;

    fn resolver() -> CollectionResolver {
        let store = Arc::new(SledStore::temporary().unwrap());
        CollectionResolver::with_standard_mapper(Arc::new(ModelRegistry::new(store)))
    }

    fn posts() -> CollectionDescription {
        CollectionDescription::new(
            "posts",
            vec![FieldDescription::new("title", FieldKind::Text)],
        )
    }

    #[tokio::test]
    async fn test_state_transitions() {
        let resolver = resolver();
        assert_eq!(resolver.state(), ResolverState::Idle);

        let models = resolver
            .resolve_all(stream::iter(vec![None, Some(vec![posts()])]))
            .await
            .unwrap();
        assert!(models.contains_key("posts"));
        assert_eq!(resolver.state(), ResolverState::Resolved);

        // a resolved instance may run another pass
        let again = resolver
            .resolve_all(stream::iter(vec![Some(vec![posts()])]))
            .await
            .unwrap();
        assert!(again["posts"].same_model(&models["posts"]));
    }

    #[tokio::test]
    async fn test_second_pass_while_waiting_is_rejected() {
        let resolver = resolver();

        let mut first = Box::pin(resolver.resolve_all(stream::pending::<CollectionSnapshot>()));
        assert!(futures::poll!(first.as_mut()).is_pending());
        assert_eq!(resolver.state(), ResolverState::Waiting);

        let second = resolver
            .resolve_all(stream::iter(vec![Some(vec![posts()])]))
            .await;
        assert!(matches!(second, Err(RegistryError::AlreadyResolving)));

        // abandoning the pending pass frees the resolver
        drop(first);
        assert_eq!(resolver.state(), ResolverState::Idle);
    }

    #[tokio::test]
    async fn test_failed_drain_returns_to_idle() {
        let resolver = resolver();
        let broken = CollectionDescription::new(
            "broken",
            vec![FieldDescription::new(
                "place",
                FieldKind::Unknown("geo".to_string()),
            )],
        );

        let result = resolver
            .resolve_all(stream::iter(vec![Some(vec![broken])]))
            .await;
        assert!(matches!(
            result,
            Err(RegistryError::SchemaConstruction { collection, .. }) if collection == "broken"
        ));
        assert_eq!(resolver.state(), ResolverState::Idle);
    }
}
