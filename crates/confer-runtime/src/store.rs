//! Read-only record store backing selection dependencies.

use std::collections::HashMap;

use async_trait::async_trait;
use serde::Serialize;
use thiserror::Error;
use uuid::Uuid;

/// Errors surfaced by record store implementations.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The backing store could not be reached or answered abnormally.
    #[error("store backend failure: {0}")]
    Backend(String),
    /// A record body could not be encoded or decoded.
    #[error("record payload codec failure: {0}")]
    Codec(#[from] serde_json::Error),
}

/// A record's display name and identifier, as enumerated for a selection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordRef {
    pub name: String,
    pub id: Uuid,
}

/// The two reads the resolution pipeline performs.
///
/// `list_all` feeds schema computation (every record becomes a selection
/// alternative); `find_by_id` feeds injection. The store may change between
/// the two calls, which is why injection re-fetches instead of trusting the
/// enumeration.
#[async_trait]
pub trait RecordStore: Send + Sync {
    /// Enumerate name/id pairs for every record in `collection`.
    ///
    /// An unknown collection yields an empty list, not an error.
    async fn list_all(&self, collection: &str) -> Result<Vec<RecordRef>, StoreError>;

    /// Fetch one record body, or `None` when the id is gone.
    async fn find_by_id(
        &self,
        collection: &str,
        id: Uuid,
    ) -> Result<Option<serde_json::Value>, StoreError>;
}

/// In-process store for tests, demos, and single-binary deployments.
#[derive(Debug, Default)]
pub struct MemoryStore {
    collections: HashMap<String, Vec<StoredRecord>>,
}

#[derive(Debug, Clone)]
struct StoredRecord {
    name: String,
    id: Uuid,
    body: serde_json::Value,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a record under a freshly minted id and return that id.
    pub fn insert<T: Serialize>(
        &mut self,
        collection: &str,
        name: &str,
        record: &T,
    ) -> Result<Uuid, StoreError> {
        let id = Uuid::now_v7();
        self.insert_with_id(collection, name, id, record)?;
        Ok(id)
    }

    /// Insert a record under a caller-chosen id.
    pub fn insert_with_id<T: Serialize>(
        &mut self,
        collection: &str,
        name: &str,
        id: Uuid,
        record: &T,
    ) -> Result<(), StoreError> {
        let body = serde_json::to_value(record)?;
        self.collections
            .entry(collection.to_string())
            .or_default()
            .push(StoredRecord {
                name: name.to_string(),
                id,
                body,
            });
        Ok(())
    }

    /// Remove a record; returns whether anything was removed.
    pub fn remove(&mut self, collection: &str, id: Uuid) -> bool {
        match self.collections.get_mut(collection) {
            Some(records) => {
                let before = records.len();
                records.retain(|r| r.id != id);
                records.len() < before
            }
            None => false,
        }
    }
}

#[async_trait]
impl RecordStore for MemoryStore {
    async fn list_all(&self, collection: &str) -> Result<Vec<RecordRef>, StoreError> {
        let refs = self
            .collections
            .get(collection)
            .map(|records| {
                records
                    .iter()
                    .map(|r| RecordRef {
                        name: r.name.clone(),
                        id: r.id,
                    })
                    .collect()
            })
            .unwrap_or_default();
        Ok(refs)
    }

    async fn find_by_id(
        &self,
        collection: &str,
        id: Uuid,
    ) -> Result<Option<serde_json::Value>, StoreError> {
        let body = self
            .collections
            .get(collection)
            .and_then(|records| records.iter().find(|r| r.id == id))
            .map(|r| r.body.clone());
        Ok(body)
    }
}
