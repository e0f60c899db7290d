//! Live source of collection descriptions.

use crate::schema::collection::{load_collections_from_dir, CollectionDescription};
use crate::schema::types::SchemaError;
use log::info;
use std::path::Path;
use tokio::sync::watch;
use tokio_stream::wrappers::WatchStream;

/// What the source holds: nothing until configuration arrives, then the full
/// list of collection descriptions.
pub type CollectionSnapshot = Option<Vec<CollectionDescription>>;

/// Observable holder of the current collection configuration.
///
/// Subscribers first see the current value, then every later change.
#[derive(Debug)]
pub struct CollectionSource {
    sender: watch::Sender<CollectionSnapshot>,
}

impl Default for CollectionSource {
    fn default() -> Self {
        Self::new()
    }
}

impl CollectionSource {
    /// A source with no configuration yet.
    pub fn new() -> Self {
        let (sender, _) = watch::channel(None);
        Self { sender }
    }

    pub fn with_collections(collections: Vec<CollectionDescription>) -> Self {
        let (sender, _) = watch::channel(Some(collections));
        Self { sender }
    }

    pub fn publish(&self, collections: Vec<CollectionDescription>) {
        info!("Publishing {} collection descriptions", collections.len());
        self.sender.send_replace(Some(collections));
    }

    pub fn clear(&self) {
        self.sender.send_replace(None);
    }

    pub fn current(&self) -> CollectionSnapshot {
        self.sender.borrow().clone()
    }

    /// Stream of snapshots starting with the current one.
    pub fn subscribe(&self) -> WatchStream<CollectionSnapshot> {
        WatchStream::new(self.sender.subscribe())
    }

    /// Publishes every collection description found in `dir`.
    pub fn load_dir(&self, dir: &Path) -> Result<usize, SchemaError> {
        let collections = load_collections_from_dir(dir)?;
        let count = collections.len();
        self.publish(collections);
        Ok(count)
    }
}
