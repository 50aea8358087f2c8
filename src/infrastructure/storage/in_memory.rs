use crate::core::errors::LedgerError;
use crate::infrastructure::storage::{RealtimeStore, Snapshot, split_path};
use async_trait::async_trait;
use serde_json::Value;
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::sync::{RwLock, broadcast};

const CHANNEL_CAPACITY: usize = 64;

#[derive(Clone)]
pub struct InMemoryRealtimeStore {
    collections: Arc<RwLock<HashMap<String, BTreeMap<String, Value>>>>,
    channels: Arc<RwLock<HashMap<String, broadcast::Sender<Snapshot>>>>,
    offline: Arc<AtomicBool>,
}

impl Default for InMemoryRealtimeStore {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryRealtimeStore {
    pub fn new() -> Self {
        InMemoryRealtimeStore {
            collections: Arc::new(RwLock::new(HashMap::new())),
            channels: Arc::new(RwLock::new(HashMap::new())),
            offline: Arc::new(AtomicBool::new(false)),
        }
    }

    /// While offline every write is rejected, the way a permission-denied
    /// remote would.
    pub fn set_offline(&self, offline: bool) {
        self.offline.store(offline, Ordering::SeqCst);
    }

    fn ensure_online(&self) -> Result<(), LedgerError> {
        if self.offline.load(Ordering::SeqCst) {
            return Err(LedgerError::StorageError("permission denied".to_string()));
        }
        Ok(())
    }

    async fn collect(&self, collection: &str) -> Snapshot {
        let collections = self.collections.read().await;
        Snapshot {
            collection: collection.to_string(),
            records: collections
                .get(collection)
                .map(|records| records.iter().map(|(k, v)| (k.clone(), v.clone())).collect())
                .unwrap_or_default(),
        }
    }

    async fn publish(&self, collection: &str) {
        let snapshot = self.collect(collection).await;
        let channels = self.channels.read().await;
        if let Some(sender) = channels.get(collection) {
            // No live receivers is not an error.
            let _ = sender.send(snapshot);
        }
    }
}

#[async_trait]
impl RealtimeStore for InMemoryRealtimeStore {
    async fn subscribe(&self, collection: &str) -> Result<broadcast::Receiver<Snapshot>, LedgerError> {
        let mut channels = self.channels.write().await;
        let sender = channels
            .entry(collection.to_string())
            .or_insert_with(|| broadcast::channel(CHANNEL_CAPACITY).0);
        Ok(sender.subscribe())
    }

    async fn snapshot(&self, collection: &str) -> Result<Snapshot, LedgerError> {
        self.ensure_online()?;
        Ok(self.collect(collection).await)
    }

    async fn write(&self, collection: &str, id: &str, record: Value) -> Result<(), LedgerError> {
        self.ensure_online()?;
        {
            let mut collections = self.collections.write().await;
            collections
                .entry(collection.to_string())
                .or_default()
                .insert(id.to_string(), record);
        }
        self.publish(collection).await;
        Ok(())
    }

    async fn update(&self, path: &str, partial: Value) -> Result<(), LedgerError> {
        self.ensure_online()?;
        let (collection, id) = split_path(path)?;
        let Value::Object(fields) = partial else {
            return Err(LedgerError::StorageError(format!(
                "Update for {} must be an object",
                path
            )));
        };
        {
            let mut collections = self.collections.write().await;
            let record = collections
                .entry(collection.to_string())
                .or_default()
                .entry(id.to_string())
                .or_insert_with(|| Value::Object(Default::default()));
            match record {
                Value::Object(existing) => existing.extend(fields),
                other => *other = Value::Object(fields),
            }
        }
        self.publish(collection).await;
        Ok(())
    }

    async fn delete(&self, path: &str) -> Result<(), LedgerError> {
        self.ensure_online()?;
        let (collection, id) = split_path(path)?;
        {
            let mut collections = self.collections.write().await;
            if let Some(records) = collections.get_mut(collection) {
                records.remove(id);
            }
        }
        self.publish(collection).await;
        Ok(())
    }
}
