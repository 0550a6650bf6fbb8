//! Property tests: reads reflect writes, filtered reads match a reference predicate


use fixtures::{create_test_repository, CatalogItem};
use play_db::{field, ItemRepository, UpdateOutcome};
use proptest::prelude::*;
use std::collections::HashSet;
use uuid::Uuid;

fn item_strategy() -> impl Strategy<Value = CatalogItem> {
    (any::<u128>(), "[a-z]{1,8}", 0.0f64..100.0, 0i32..50).prop_map(
        |(id, name, price, quantity)| CatalogItem {
            // u128 0 would be the nil id
            id: Uuid::from_u128(id.max(1)),
            description: format!("{} description", name),
            name,
            price,
            quantity,
        },
    )
}

fn unique_items() -> impl Strategy<Value = Vec<CatalogItem>> {
    prop::collection::vec(item_strategy(), 0..20).prop_map(|items| {
        let mut seen = HashSet::new();
        items.into_iter().filter(|i| seen.insert(i.id)).collect()
    })
}

fn runtime() -> tokio::runtime::Runtime {
    tokio::runtime::Builder::new_current_thread()
        .build()
        .expect("tokio runtime")
}

proptest! {
    // Every created item can be read back by id
    #[test]
    fn test_created_items_are_retrievable(items in unique_items()) {
        runtime().block_on(async {
            let (repository, _) = create_test_repository();
            for item in &items {
                repository.create(item.clone()).await.expect("create");
            }
            for item in &items {
                let stored = repository.get(item.id).await.expect("get");
                assert_eq!(stored.as_ref(), Some(item));
            }
            assert_eq!(repository.get_all().await.expect("get_all").len(), items.len());
        });
    }

    // A price/quantity filter selects exactly what the equivalent closure selects
    #[test]
    fn test_filtered_reads_match_reference(
        items in unique_items(),
        max_price in 0.0f64..100.0,
        min_quantity in 0i32..50,
    ) {
        runtime().block_on(async {
            let (repository, _) = create_test_repository();
            for item in &items {
                repository.create(item.clone()).await.expect("create");
            }

            let filter = field("price").lte(max_price).and(field("quantity").gte(min_quantity));
            let found: HashSet<Uuid> = repository
                .get_all_matching(&filter)
                .await
                .expect("get_all_matching")
                .into_iter()
                .map(|i| i.id)
                .collect();
            let expected: HashSet<Uuid> = items
                .iter()
                .filter(|i| i.price <= max_price && i.quantity >= min_quantity)
                .map(|i| i.id)
                .collect();

            assert_eq!(found, expected);
        });
    }

    // Updating or deleting an unknown id never changes the collection
    #[test]
    fn test_unknown_ids_leave_collection_untouched(items in unique_items(), unknown in any::<u128>()) {
        let unknown = Uuid::from_u128(unknown.max(1));
        prop_assume!(!items.iter().any(|i| i.id == unknown));

        runtime().block_on(async {
            let (repository, collection) = create_test_repository();
            for item in &items {
                repository.create(item.clone()).await.expect("create");
            }

            let replacement = CatalogItem { id: unknown, ..fixtures::create_test_item("unknown", 1.0) };
            let outcome = repository.update(unknown, replacement).await.expect("update");
            assert_eq!(outcome, UpdateOutcome::NotFound);
            assert!(!repository.delete(unknown).await.expect("delete"));
            assert_eq!(collection.len(), items.len());
        });
    }
}
