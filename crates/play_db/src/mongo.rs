//! MongoDB collection backing
//!
//! Thin wrapper over [`mongodb::Collection`]: filters are rendered to query
//! documents and driver errors are returned unchanged.

use crate::collection::{DeleteResult, ItemCollection, ReplaceResult};
use crate::entity::Entity;
use crate::error::DbError;
use crate::filter::Filter;
use mongodb::options::Acknowledgment;
use mongodb::Collection;
use tracing::{debug, error};

/// A typed MongoDB collection
#[derive(Debug, Clone)]
pub struct MongoCollection<T>
where
    T: Send + Sync,
{
    inner: Collection<T>,
}

impl<T: Entity> MongoCollection<T> {
    /// Wrap a driver collection handle
    pub fn new(inner: Collection<T>) -> Self {
        Self { inner }
    }

    /// The wrapped driver collection
    pub fn inner(&self) -> &Collection<T> {
        &self.inner
    }

    /// Collection name
    pub fn name(&self) -> &str {
        self.inner.name()
    }

    /// Whether writes on this collection report results.
    ///
    /// Only an explicit `w: 0` write concern disables acknowledgement.
    pub fn is_acknowledged(&self) -> bool {
        !matches!(
            self.inner.write_concern().and_then(|wc| wc.w.as_ref()),
            Some(Acknowledgment::Nodes(0))
        )
    }

    fn log_failure(&self, operation: &str, e: mongodb::error::Error) -> DbError {
        error!("MongoDB {} on '{}' failed: {}", operation, self.inner.name(), e);
        DbError::MongoError(e)
    }
}

impl<T: Entity> ItemCollection<T> for MongoCollection<T> {
    async fn find(&self, filter: &Filter) -> Result<Vec<T>, DbError> {
        let query = filter.to_document();
        debug!("find on '{}': {}", self.inner.name(), query);

        let mut cursor = self
            .inner
            .find(query)
            .await
            .map_err(|e| self.log_failure("find", e))?;

        let mut items = Vec::new();
        while cursor.advance().await.map_err(|e| self.log_failure("find", e))? {
            items.push(
                cursor
                    .deserialize_current()
                    .map_err(|e| self.log_failure("find", e))?,
            );
        }
        Ok(items)
    }

    async fn find_one(&self, filter: &Filter) -> Result<Option<T>, DbError> {
        let query = filter.to_document();
        debug!("find_one on '{}': {}", self.inner.name(), query);

        self.inner
            .find_one(query)
            .await
            .map_err(|e| self.log_failure("find_one", e))
    }

    async fn insert_one(&self, item: &T) -> Result<(), DbError> {
        debug!("insert_one on '{}': {}", self.inner.name(), item.id());

        self.inner
            .insert_one(item)
            .await
            .map_err(|e| self.log_failure("insert_one", e))?;
        Ok(())
    }

    async fn replace_one(&self, filter: &Filter, replacement: &T) -> Result<ReplaceResult, DbError> {
        let query = filter.to_document();
        debug!("replace_one on '{}': {}", self.inner.name(), query);

        let result = self
            .inner
            .replace_one(query, replacement)
            .await
            .map_err(|e| self.log_failure("replace_one", e))?;

        Ok(ReplaceResult {
            acknowledged: self.is_acknowledged(),
            matched_count: result.matched_count,
            modified_count: result.modified_count,
        })
    }

    async fn delete_one(&self, filter: &Filter) -> Result<DeleteResult, DbError> {
        let query = filter.to_document();
        debug!("delete_one on '{}': {}", self.inner.name(), query);

        let result = self
            .inner
            .delete_one(query)
            .await
            .map_err(|e| self.log_failure("delete_one", e))?;

        Ok(DeleteResult {
            acknowledged: self.is_acknowledged(),
            deleted_count: result.deleted_count,
        })
    }
}
