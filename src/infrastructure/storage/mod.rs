use crate::core::errors::LedgerError;
use async_trait::async_trait;
use serde_json::Value;
use tokio::sync::broadcast;

/// Full contents of one collection, keyed by record id, in key order.
#[derive(Clone, Debug, Default)]
pub struct Snapshot {
    pub collection: String,
    pub records: Vec<(String, Value)>,
}

impl Snapshot {
    pub fn exists(&self) -> bool {
        !self.records.is_empty()
    }
}

/// Hosted document store with real-time subscriptions. Paths are
/// `collection/id`.
#[async_trait]
pub trait RealtimeStore: Send + Sync {
    async fn subscribe(&self, collection: &str) -> Result<broadcast::Receiver<Snapshot>, LedgerError>;
    async fn snapshot(&self, collection: &str) -> Result<Snapshot, LedgerError>;
    async fn write(&self, collection: &str, id: &str, record: Value) -> Result<(), LedgerError>;
    async fn update(&self, path: &str, partial: Value) -> Result<(), LedgerError>;
    async fn delete(&self, path: &str) -> Result<(), LedgerError>;
}

pub fn record_path(collection: &str, id: &str) -> String {
    format!("{}/{}", collection, id)
}

pub(crate) fn split_path(path: &str) -> Result<(&str, &str), LedgerError> {
    path.split_once('/')
        .filter(|(collection, id)| !collection.is_empty() && !id.is_empty() && !id.contains('/'))
        .ok_or_else(|| LedgerError::StorageError(format!("Invalid record path: {}", path)))
}

pub mod in_memory;
