//! Generic item repository over a document store
//!
//! This crate provides a CRUD repository that works for any entity type with
//! a unique identifier. Each repository operation is a single call on a
//! collection handle; the handle is either a MongoDB collection or an
//! in-memory store with the same semantics.
//!
//! # Layers
//!
//! - [`Entity`]: the identity contract (`fn id(&self) -> Uuid`)
//! - [`ItemCollection`]: find / insert / replace / delete primitives of a store
//! - [`ItemContext`]: hands a repository its collection handle
//! - [`ItemRepository`]: the CRUD interface, implemented by [`CollectionRepository`]
//! - [`Filter`]: declarative predicates rendered to MongoDB queries
//!
//! # Example
//!
//! ```rust,no_run
//! use play_config::load_config;
//! use play_db::{DbClient, Entity, ItemRepository};
//! use serde::{Deserialize, Serialize};
//! use std::sync::Arc;
//! use uuid::Uuid;
//!
//! #[derive(Debug, Clone, Serialize, Deserialize)]
//! struct CatalogItem {
//!     #[serde(rename = "_id")]
//!     id: Uuid,
//!     name: String,
//! }
//!
//! impl Entity for CatalogItem {
//!     fn id(&self) -> Uuid {
//!         self.id
//!     }
//! }
//!
//! async fn run() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = Arc::new(load_config()?);
//!     let client = DbClient::new(&config).await?;
//!     let items = play_db::CollectionRepository::new(client.item_context::<CatalogItem>("items"));
//!
//!     let potion = CatalogItem { id: Uuid::new_v4(), name: "Potion".to_string() };
//!     items.create(potion.clone()).await?;
//!     assert!(items.get(potion.id).await?.is_some());
//!     Ok(())
//! }
//! ```

pub mod client;
mod codec;
pub mod collection;
pub mod context;
pub mod entity;
pub mod error;
pub mod factory;
pub mod filter;
pub mod memory;
pub mod mongo;
pub mod repository;

// Re-export the main types for ease of use
pub use client::DbClient;
pub use collection::{DeleteResult, ItemCollection, ReplaceResult};
pub use context::{CollectionContext, InMemoryItemContext, ItemContext, MongoItemContext};
pub use entity::Entity;
pub use error::DbError;
pub use factory::{InMemoryItemRepository, ItemRepositoryFactory, MongoItemRepository};
pub use filter::{field, Filter};
pub use memory::InMemoryCollection;
pub use mongo::MongoCollection;
pub use repository::{CollectionRepository, ItemRepository, RepositoryFactory, UpdateOutcome};
