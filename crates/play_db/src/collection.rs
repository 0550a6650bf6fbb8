//! The collection handle seam
//!
//! This module defines the driver primitives an item repository needs from a
//! document store. It is implemented for MongoDB collections
//! ([`crate::mongo::MongoCollection`]) and for an in-memory store
//! ([`crate::memory::InMemoryCollection`]), so repositories can be exercised
//! against a substitutable store.

use crate::entity::Entity;
use crate::error::DbError;
use crate::filter::Filter;
use std::future::Future;

/// Result metadata of a replace-one operation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReplaceResult {
    /// The store confirmed the write and reported counts
    pub acknowledged: bool,
    /// Number of documents matching the filter
    pub matched_count: u64,
    /// Number of documents actually changed
    pub modified_count: u64,
}

/// Result metadata of a delete-one operation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeleteResult {
    /// The store confirmed the write and reported counts
    pub acknowledged: bool,
    /// Number of documents removed
    pub deleted_count: u64,
}

/// A typed handle to a collection of entities.
///
/// Every method is a single call to the backing store. Errors raised by the
/// store are returned unchanged.
pub trait ItemCollection<T>: Send + Sync
where
    T: Entity,
{
    /// Every entity matching the filter, in no particular order
    fn find(&self, filter: &Filter) -> impl Future<Output = Result<Vec<T>, DbError>> + Send;

    /// The first entity matching the filter, if any
    fn find_one(&self, filter: &Filter) -> impl Future<Output = Result<Option<T>, DbError>> + Send;

    /// Insert a single entity
    fn insert_one(&self, item: &T) -> impl Future<Output = Result<(), DbError>> + Send;

    /// Replace the first entity matching the filter
    fn replace_one(
        &self,
        filter: &Filter,
        replacement: &T,
    ) -> impl Future<Output = Result<ReplaceResult, DbError>> + Send;

    /// Delete the first entity matching the filter
    fn delete_one(&self, filter: &Filter) -> impl Future<Output = Result<DeleteResult, DbError>> + Send;
}
