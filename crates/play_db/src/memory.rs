//! In-memory collection backing
//!
//! Keeps entities together with their BSON encoding so filters are evaluated
//! exactly as they would be rendered for MongoDB. Useful for tests and for
//! running services without a database. It also counts store calls, which
//! lets tests prove that invalid arguments never reach the store.

use crate::codec;
use crate::collection::{DeleteResult, ItemCollection, ReplaceResult};
use crate::entity::Entity;
use crate::error::DbError;
use crate::filter::Filter;
use mongodb::bson::Document;
use parking_lot::{Mutex, RwLock};
use std::sync::atomic::{AtomicU64, Ordering};
use tracing::{debug, warn};

#[derive(Debug, Clone)]
struct StoredItem<T> {
    document: Document,
    item: T,
}

/// A collection held in process memory
#[derive(Debug)]
pub struct InMemoryCollection<T> {
    items: RwLock<Vec<StoredItem<T>>>,
    calls: AtomicU64,
    acknowledged: bool,
    failure: Mutex<Option<String>>,
}

impl<T: Entity> InMemoryCollection<T> {
    /// Create an empty collection that acknowledges every write
    pub fn new() -> Self {
        Self {
            items: RwLock::new(Vec::new()),
            calls: AtomicU64::new(0),
            acknowledged: true,
            failure: Mutex::new(None),
        }
    }

    /// Create an empty collection that applies writes but reports them as
    /// unacknowledged, like a MongoDB collection with write concern `w: 0`
    pub fn unacknowledged() -> Self {
        Self {
            acknowledged: false,
            ..Self::new()
        }
    }

    /// Create a collection pre-populated with `items`
    pub fn with_items(items: impl IntoIterator<Item = T>) -> Result<Self, DbError> {
        let collection = Self::new();
        {
            let mut stored = collection.items.write();
            for item in items {
                let entry = Self::encode(item)?;
                Self::ensure_unique(&stored, &entry.document)?;
                stored.push(entry);
            }
        }
        Ok(collection)
    }

    /// Number of store operations performed so far
    pub fn calls(&self) -> u64 {
        self.calls.load(Ordering::SeqCst)
    }

    /// Number of stored entities
    pub fn len(&self) -> usize {
        self.items.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Make every following operation fail with `message`, or clear the
    /// failure with `None`
    pub fn set_failure(&self, message: Option<&str>) {
        *self.failure.lock() = message.map(str::to_string);
    }

    fn begin(&self, operation: &str) -> Result<(), DbError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Some(message) = self.failure.lock().clone() {
            warn!("In-memory {} failed: {}", operation, message);
            return Err(DbError::CollectionError(message));
        }
        Ok(())
    }

    fn encode(item: T) -> Result<StoredItem<T>, DbError> {
        let document = codec::to_document(&item)?;
        Ok(StoredItem { document, item })
    }

    fn ensure_unique(stored: &[StoredItem<T>], document: &Document) -> Result<(), DbError> {
        let id = document.get(T::ID_FIELD);
        if id.is_some() && stored.iter().any(|s| s.document.get(T::ID_FIELD) == id) {
            return Err(DbError::CollectionError(format!(
                "duplicate key error: {} already exists",
                T::ID_FIELD
            )));
        }
        Ok(())
    }

    fn find_sync(&self, filter: &Filter) -> Result<Vec<T>, DbError> {
        self.begin("find")?;
        let stored = self.items.read();
        Ok(stored
            .iter()
            .filter(|s| filter.matches(&s.document))
            .map(|s| s.item.clone())
            .collect())
    }

    fn find_one_sync(&self, filter: &Filter) -> Result<Option<T>, DbError> {
        self.begin("find_one")?;
        let stored = self.items.read();
        Ok(stored
            .iter()
            .find(|s| filter.matches(&s.document))
            .map(|s| s.item.clone()))
    }

    fn insert_one_sync(&self, item: &T) -> Result<(), DbError> {
        self.begin("insert_one")?;
        let entry = Self::encode(item.clone())?;
        let mut stored = self.items.write();
        Self::ensure_unique(&stored, &entry.document)?;
        stored.push(entry);
        debug!("In-memory insert, {} items stored", stored.len());
        Ok(())
    }

    fn replace_one_sync(&self, filter: &Filter, replacement: &T) -> Result<ReplaceResult, DbError> {
        self.begin("replace_one")?;
        let entry = Self::encode(replacement.clone())?;
        let mut stored = self.items.write();

        let Some(existing) = stored.iter_mut().find(|s| filter.matches(&s.document)) else {
            return Ok(self.replace_result(0, 0));
        };

        if entry.document.get(T::ID_FIELD) != existing.document.get(T::ID_FIELD) {
            return Err(DbError::CollectionError(format!(
                "replacement would modify the immutable field '{}'",
                T::ID_FIELD
            )));
        }

        if entry.document == existing.document {
            return Ok(self.replace_result(1, 0));
        }

        *existing = entry;
        Ok(self.replace_result(1, 1))
    }

    fn delete_one_sync(&self, filter: &Filter) -> Result<DeleteResult, DbError> {
        self.begin("delete_one")?;
        let mut stored = self.items.write();
        let deleted_count = match stored.iter().position(|s| filter.matches(&s.document)) {
            Some(index) => {
                stored.remove(index);
                1
            }
            None => 0,
        };

        Ok(DeleteResult {
            acknowledged: self.acknowledged,
            deleted_count: if self.acknowledged { deleted_count } else { 0 },
        })
    }

    fn replace_result(&self, matched_count: u64, modified_count: u64) -> ReplaceResult {
        // unacknowledged writes carry no counts
        if !self.acknowledged {
            return ReplaceResult {
                acknowledged: false,
                matched_count: 0,
                modified_count: 0,
            };
        }
        ReplaceResult {
            acknowledged: true,
            matched_count,
            modified_count,
        }
    }
}

impl<T: Entity> Default for InMemoryCollection<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Entity> ItemCollection<T> for InMemoryCollection<T> {
    async fn find(&self, filter: &Filter) -> Result<Vec<T>, DbError> {
        self.find_sync(filter)
    }

    async fn find_one(&self, filter: &Filter) -> Result<Option<T>, DbError> {
        self.find_one_sync(filter)
    }

    async fn insert_one(&self, item: &T) -> Result<(), DbError> {
        self.insert_one_sync(item)
    }

    async fn replace_one(&self, filter: &Filter, replacement: &T) -> Result<ReplaceResult, DbError> {
        self.replace_one_sync(filter, replacement)
    }

    async fn delete_one(&self, filter: &Filter) -> Result<DeleteResult, DbError> {
        self.delete_one_sync(filter)
    }
}
