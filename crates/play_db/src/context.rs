//! Item contexts
//!
//! A context hands a repository its typed collection handle. The handle is
//! owned by whoever built the context; repositories only borrow it.

use crate::collection::ItemCollection;
use crate::entity::Entity;
use crate::memory::InMemoryCollection;
use crate::mongo::MongoCollection;
use std::marker::PhantomData;
use std::sync::Arc;

/// Provides the collection of items of type `T`
pub trait ItemContext<T>: Send + Sync
where
    T: Entity,
{
    /// The collection handle type
    type Items: ItemCollection<T>;

    /// The collection of items
    fn items(&self) -> &Self::Items;
}

/// A context around a single collection handle
#[derive(Debug)]
pub struct CollectionContext<T, C> {
    items: Arc<C>,
    _entity: PhantomData<fn() -> T>,
}

impl<T, C> CollectionContext<T, C>
where
    T: Entity,
    C: ItemCollection<T>,
{
    /// Create a context that owns `items`
    pub fn new(items: C) -> Self {
        Self::shared(Arc::new(items))
    }

    /// Create a context over a handle shared with other owners
    pub fn shared(items: Arc<C>) -> Self {
        Self {
            items,
            _entity: PhantomData,
        }
    }

    /// The shared handle
    pub fn handle(&self) -> Arc<C> {
        Arc::clone(&self.items)
    }
}

impl<T, C> Clone for CollectionContext<T, C> {
    fn clone(&self) -> Self {
        Self {
            items: Arc::clone(&self.items),
            _entity: PhantomData,
        }
    }
}

impl<T, C> ItemContext<T> for CollectionContext<T, C>
where
    T: Entity,
    C: ItemCollection<T>,
{
    type Items = C;

    fn items(&self) -> &Self::Items {
        &self.items
    }
}

/// Context backed by a MongoDB collection
pub type MongoItemContext<T> = CollectionContext<T, MongoCollection<T>>;

/// Context backed by an in-memory collection
pub type InMemoryItemContext<T> = CollectionContext<T, InMemoryCollection<T>>;
