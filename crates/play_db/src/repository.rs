//! Repository traits and the generic item repository
//!
//! [`ItemRepository`] is the CRUD interface service code depends on.
//! [`CollectionRepository`] implements it for any [`ItemContext`] by handing
//! each operation to the context's collection handle, after rejecting nil
//! identifiers.

use crate::collection::ItemCollection;
use crate::context::ItemContext;
use crate::entity::{require_id, Entity};
use crate::error::DbError;
use crate::filter::Filter;
use std::future::Future;
use std::marker::PhantomData;
use tracing::debug;
use uuid::Uuid;

/// What an update did to the stored entity
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpdateOutcome {
    /// The entity was found and replaced with a different value
    Modified,
    /// The entity was found but the replacement was identical
    Unchanged,
    /// No entity has the given identifier
    NotFound,
    /// The store did not acknowledge the write, so the effect is unknown
    Unacknowledged,
}

impl UpdateOutcome {
    /// `true` only if the write was acknowledged and changed a record
    pub fn is_modified(self) -> bool {
        self == UpdateOutcome::Modified
    }
}

/// A trait for item repositories
///
/// This trait defines the CRUD operations over a collection of entities of
/// type `T`. Every operation is a single call to the backing store; store
/// errors propagate unchanged.
pub trait ItemRepository<T>: Send + Sync
where
    T: Entity,
{
    /// Every entity in the collection, in no particular order
    fn get_all(&self) -> impl Future<Output = Result<Vec<T>, DbError>> + Send;

    /// Every entity matching `filter`, in no particular order
    ///
    /// The filter is forwarded to the store as is.
    fn get_all_matching(
        &self,
        filter: &Filter,
    ) -> impl Future<Output = Result<Vec<T>, DbError>> + Send;

    /// The entity with the given identifier
    ///
    /// # Errors
    ///
    /// [`DbError::InvalidArgument`] if `id` is nil; the store is not contacted.
    fn get(&self, id: Uuid) -> impl Future<Output = Result<Option<T>, DbError>> + Send;

    /// The first entity matching `filter`
    fn get_matching(&self, filter: &Filter)
        -> impl Future<Output = Result<Option<T>, DbError>> + Send;

    /// Insert a new entity
    ///
    /// Identifiers are never generated here, so an item with a nil identifier
    /// is rejected before the store is contacted. Duplicate identifiers are
    /// rejected by the store, not here.
    ///
    /// # Errors
    ///
    /// [`DbError::InvalidArgument`] if the item's identifier is nil.
    fn create(&self, item: T) -> impl Future<Output = Result<(), DbError>> + Send;

    /// Replace the entity with the given identifier
    ///
    /// # Returns
    ///
    /// An [`UpdateOutcome`] separating a missing entity from an identical
    /// replacement. Nothing is inserted when the entity is missing.
    ///
    /// # Errors
    ///
    /// [`DbError::InvalidArgument`] if `id` or the item's identifier is nil.
    fn update(&self, id: Uuid, item: T)
        -> impl Future<Output = Result<UpdateOutcome, DbError>> + Send;

    /// Delete the entity with the given identifier
    ///
    /// # Returns
    ///
    /// `true` if the store acknowledged the delete and removed a record,
    /// `false` otherwise
    ///
    /// # Errors
    ///
    /// [`DbError::InvalidArgument`] if `id` is nil.
    fn delete(&self, id: Uuid) -> impl Future<Output = Result<bool, DbError>> + Send;
}

/// A trait for repository factories
///
/// Generic over the repository type and the source it is built from.
pub trait RepositoryFactory<R, C> {
    /// Create a new repository instance from `source`
    fn create_repository(&self, source: C) -> R;
}

/// Item repository over any item context
#[derive(Debug)]
pub struct CollectionRepository<T, C> {
    context: C,
    _entity: PhantomData<fn() -> T>,
}

impl<T, C> CollectionRepository<T, C>
where
    T: Entity,
    C: ItemContext<T>,
{
    /// Create a new repository over `context`
    pub fn new(context: C) -> Self {
        Self {
            context,
            _entity: PhantomData,
        }
    }

    /// The context this repository reads and writes through
    pub fn context(&self) -> &C {
        &self.context
    }
}

impl<T, C: Clone> Clone for CollectionRepository<T, C> {
    fn clone(&self) -> Self {
        Self {
            context: self.context.clone(),
            _entity: PhantomData,
        }
    }
}

impl<T, C> ItemRepository<T> for CollectionRepository<T, C>
where
    T: Entity,
    C: ItemContext<T>,
{
    async fn get_all(&self) -> Result<Vec<T>, DbError> {
        debug!("Finding all items");
        self.context.items().find(&Filter::All).await
    }

    async fn get_all_matching(&self, filter: &Filter) -> Result<Vec<T>, DbError> {
        debug!("Finding items matching {:?}", filter);
        self.context.items().find(filter).await
    }

    async fn get(&self, id: Uuid) -> Result<Option<T>, DbError> {
        let id = require_id(id, "id")?;
        debug!("Finding item {}", id);

        let filter = Filter::by_id::<T>(id)?;
        self.context.items().find_one(&filter).await
    }

    async fn get_matching(&self, filter: &Filter) -> Result<Option<T>, DbError> {
        debug!("Finding first item matching {:?}", filter);
        self.context.items().find_one(filter).await
    }

    async fn create(&self, item: T) -> Result<(), DbError> {
        let id = require_id(item.id(), "item.id")?;
        debug!("Creating item {}", id);

        self.context.items().insert_one(&item).await
    }

    async fn update(&self, id: Uuid, item: T) -> Result<UpdateOutcome, DbError> {
        let id = require_id(id, "id")?;
        require_id(item.id(), "item.id")?;
        debug!("Updating item {}", id);

        let filter = Filter::by_id::<T>(id)?;
        let result = self.context.items().replace_one(&filter, &item).await?;

        let outcome = if !result.acknowledged {
            UpdateOutcome::Unacknowledged
        } else if result.modified_count > 0 {
            UpdateOutcome::Modified
        } else if result.matched_count > 0 {
            UpdateOutcome::Unchanged
        } else {
            UpdateOutcome::NotFound
        };
        debug!("Update of item {}: {:?}", id, outcome);
        Ok(outcome)
    }

    async fn delete(&self, id: Uuid) -> Result<bool, DbError> {
        let id = require_id(id, "id")?;
        debug!("Deleting item {}", id);

        let filter = Filter::by_id::<T>(id)?;
        let result = self.context.items().delete_one(&filter).await?;

        Ok(result.acknowledged && result.deleted_count > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::InMemoryItemContext;
    use crate::filter::field;
    use crate::memory::InMemoryCollection;
    use serde::{Deserialize, Serialize};

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    struct Widget {
        #[serde(rename = "_id")]
        id: Uuid,
        size: i32,
    }

    impl Entity for Widget {
        fn id(&self) -> Uuid {
            self.id
        }
    }

    #[tokio::test]
    async fn test_each_operation_is_one_collection_call() {
        let items = std::sync::Arc::new(InMemoryCollection::<Widget>::new());
        let repository: CollectionRepository<Widget, _> =
            CollectionRepository::new(InMemoryItemContext::shared(std::sync::Arc::clone(&items)));
        let widget = Widget {
            id: Uuid::new_v4(),
            size: 3,
        };

        repository.create(widget.clone()).await.expect("create");
        assert_eq!(repository.get(widget.id).await.expect("get"), Some(widget.clone()));
        assert_eq!(repository.get_all().await.expect("get_all").len(), 1);
        let small = field("size").lt(5);
        assert_eq!(repository.get_all_matching(&small).await.expect("matching").len(), 1);
        assert_eq!(
            repository.get_matching(&small).await.expect("first"),
            Some(widget.clone())
        );
        let bigger = Widget { size: 4, ..widget.clone() };
        assert_eq!(
            repository.update(widget.id, bigger).await.expect("update"),
            UpdateOutcome::Modified
        );
        assert!(repository.delete(widget.id).await.expect("delete"));

        assert_eq!(items.calls(), 7);
    }

    #[test]
    fn test_only_modified_counts_as_success() {
        assert!(UpdateOutcome::Modified.is_modified());
        assert!(!UpdateOutcome::Unchanged.is_modified());
        assert!(!UpdateOutcome::NotFound.is_modified());
        assert!(!UpdateOutcome::Unacknowledged.is_modified());
    }
}
