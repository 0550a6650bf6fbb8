//! Factories for item repositories

use crate::client::DbClient;
use crate::context::{InMemoryItemContext, MongoItemContext};
use crate::entity::Entity;
use crate::memory::InMemoryCollection;
use crate::repository::{CollectionRepository, RepositoryFactory};
use std::sync::Arc;
use tracing::debug;

/// Item repository backed by MongoDB
pub type MongoItemRepository<T> = CollectionRepository<T, MongoItemContext<T>>;

/// Item repository backed by process memory
pub type InMemoryItemRepository<T> = CollectionRepository<T, InMemoryItemContext<T>>;

/// Factory for item repositories over one named collection
///
/// ```rust,no_run
/// use play_db::{DbClient, Entity, ItemRepositoryFactory, MongoItemRepository, RepositoryFactory};
/// # use serde::{Deserialize, Serialize};
/// # use uuid::Uuid;
/// # #[derive(Debug, Clone, Serialize, Deserialize)]
/// # struct CatalogItem { #[serde(rename = "_id")] id: Uuid }
/// # impl Entity for CatalogItem { fn id(&self) -> Uuid { self.id } }
///
/// # async fn example(client: &DbClient) {
/// let factory = ItemRepositoryFactory::new("items");
/// let repository: MongoItemRepository<CatalogItem> = factory.create_repository(client);
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct ItemRepositoryFactory {
    collection: String,
}

impl ItemRepositoryFactory {
    /// Create a factory for repositories over `collection`
    ///
    /// # Arguments
    ///
    /// * `collection` - The collection name every created repository uses
    pub fn new(collection: impl Into<String>) -> Self {
        Self {
            collection: collection.into(),
        }
    }

    /// The collection repositories are created for
    pub fn collection(&self) -> &str {
        &self.collection
    }
}

impl<T: Entity> RepositoryFactory<MongoItemRepository<T>, &DbClient> for ItemRepositoryFactory {
    fn create_repository(&self, db_client: &DbClient) -> MongoItemRepository<T> {
        debug!("Creating item repository for collection '{}'", self.collection);
        CollectionRepository::new(db_client.item_context(&self.collection))
    }
}

impl<T: Entity> RepositoryFactory<InMemoryItemRepository<T>, Arc<InMemoryCollection<T>>>
    for ItemRepositoryFactory
{
    fn create_repository(&self, items: Arc<InMemoryCollection<T>>) -> InMemoryItemRepository<T> {
        debug!("Creating in-memory item repository for '{}'", self.collection);
        CollectionRepository::new(InMemoryItemContext::shared(items))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::ItemContext;
    use serde::{Deserialize, Serialize};
    use uuid::Uuid;

    #[derive(Debug, Clone, Serialize, Deserialize)]
    struct Gadget {
        #[serde(rename = "_id")]
        id: Uuid,
    }

    impl Entity for Gadget {
        fn id(&self) -> Uuid {
            self.id
        }
    }

    #[tokio::test]
    async fn test_mongo_repositories_use_the_named_collection() {
        let client = DbClient::from_url("mongodb://localhost:27017", "catalog")
            .await
            .expect("client");
        let factory = ItemRepositoryFactory::new("gadgets");

        let repository: MongoItemRepository<Gadget> = factory.create_repository(&client);

        assert_eq!(factory.collection(), "gadgets");
        assert_eq!(repository.context().items().name(), "gadgets");
    }

    #[test]
    fn test_in_memory_repositories_share_the_collection() {
        let items = Arc::new(InMemoryCollection::<Gadget>::new());

        let repository: InMemoryItemRepository<Gadget> =
            ItemRepositoryFactory::new("gadgets").create_repository(Arc::clone(&items));

        assert!(Arc::ptr_eq(&repository.context().handle(), &items));
    }
}
