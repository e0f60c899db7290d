#![allow(dead_code)]

use fold_models::logging::LoggingSystem;
use fold_models::registry::ModelRegistry;
use fold_models::schema::types::{FieldFragment, SchemaError, SchemaOptions};
use fold_models::schema::{CollectionDescription, FieldDescription, FieldKind};
use fold_models::source::CollectionSnapshot;
use fold_models::store::{DocumentStore, ModelHandle, SchemaHandle, SledStore, StoreResult};
use futures::Stream;
use std::collections::VecDeque;
use std::pin::Pin;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::task::{Context, Poll};

/// Sled store that counts schema and model definitions.
pub struct CountingStore {
    inner: SledStore,
    schema_definitions: AtomicUsize,
    model_definitions: AtomicUsize,
}

impl CountingStore {
    pub fn new() -> Self {
        Self {
            inner: SledStore::temporary().expect("Failed to open temporary store"),
            schema_definitions: AtomicUsize::new(0),
            model_definitions: AtomicUsize::new(0),
        }
    }

    pub fn schema_definitions(&self) -> usize {
        self.schema_definitions.load(Ordering::SeqCst)
    }

    pub fn model_definitions(&self) -> usize {
        self.model_definitions.load(Ordering::SeqCst)
    }
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
        self.model_definitions.fetch_add(1, Ordering::SeqCst);
        self.inner.define_model(name, schema)
    }
}

pub fn counting_registry() -> (Arc<CountingStore>, Arc<ModelRegistry>) {
    LoggingSystem::init_for_tests();
    let store = Arc::new(CountingStore::new());
    let registry = Arc::new(ModelRegistry::new(store.clone()));
    (store, registry)
}

pub fn collection(name: &str, fields: &[&str]) -> CollectionDescription {
    CollectionDescription::new(
        name,
        fields
            .iter()
            .map(|field| FieldDescription::new(*field, FieldKind::Text))
            .collect(),
    )
}

pub fn posts_collection() -> CollectionDescription {
    collection("posts", &["title"])
}

/// Replays scripted emissions, then stays silent like a live source.
///
/// Records how many emissions were taken and whether the consumer dropped it.
pub struct ScriptedStream {
    emissions: VecDeque<CollectionSnapshot>,
    probe: StreamProbe,
}

#[derive(Clone, Default)]
pub struct StreamProbe {
    pulled: Arc<AtomicUsize>,
    dropped: Arc<AtomicBool>,
}

impl StreamProbe {
    pub fn pulled(&self) -> usize {
        self.pulled.load(Ordering::SeqCst)
    }

    pub fn dropped(&self) -> bool {
        self.dropped.load(Ordering::SeqCst)
    }
}

pub fn scripted(emissions: Vec<CollectionSnapshot>) -> (ScriptedStream, StreamProbe) {
    let probe = StreamProbe::default();
    let stream = ScriptedStream {
        emissions: emissions.into(),
        probe: probe.clone(),
    };
    (stream, probe)
}

impl Stream for ScriptedStream {
    type Item = CollectionSnapshot;

    fn poll_next(mut self: Pin<&mut Self>, _cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        match self.emissions.pop_front() {
            Some(emission) => {
                self.probe.pulled.fetch_add(1, Ordering::SeqCst);
                Poll::Ready(Some(emission))
            }
            None => Poll::Pending,
        }
    }
}

impl Drop for ScriptedStream {
    fn drop(&mut self) {
        self.probe.dropped.store(true, Ordering::SeqCst);
    }
}
