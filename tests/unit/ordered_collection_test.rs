//! Unit tests for the ordered collection over the in-memory record store.

use std::sync::Arc;

use startpage::database::{MemoryRecordStore, StoreOp};
use startpage::managers::drag_reorder::move_item;
use startpage::managers::ordered_collection::{next_order, OrderedCollection};
use startpage::types::errors::{CollectionError, StoreError};
use startpage::types::item::{OrderableItem, OwnerId};
use startpage::types::task::{Task, TaskDraft};

fn setup() -> (Arc<MemoryRecordStore<Task>>, OrderedCollection<Task>) {
    let store = Arc::new(MemoryRecordStore::<Task>::new());
    let collection = OrderedCollection::<Task>::new(store.clone());
    (store, collection)
}

fn task(id: &str, owner: &str, order: Option<u32>, created_at: Option<i64>) -> Task {
    Task {
        id: id.to_string(),
        text: id.to_uppercase(),
        done: false,
        created_at,
        order,
        owner_id: Some(owner.to_string()),
    }
}

fn draft(text: &str) -> TaskDraft {
    TaskDraft {
        text: text.to_string(),
    }
}

fn ids(items: &[Task]) -> Vec<&str> {
    items.iter().map(|t| t.id.as_str()).collect()
}

#[tokio::test]
async fn test_list_without_owner_is_empty_and_reads_nothing() {
    let (store, collection) = setup();
    store.seed(task("a", "u1", Some(0), None));

    let items = collection.list(None).await.unwrap();
    assert!(items.is_empty());
    assert_eq!(store.total_calls(), 0);
}

#[tokio::test]
async fn test_list_empty_collection_is_not_an_error() {
    let (_store, collection) = setup();
    let items = collection.list(Some(&OwnerId::new("u1"))).await.unwrap();
    assert!(items.is_empty());
}

#[tokio::test]
async fn test_list_applies_sort_rule() {
    let (store, collection) = setup();
    store.seed(task("legacy-new", "u1", None, Some(300)));
    store.seed(task("second", "u1", Some(5), Some(1)));
    store.seed(task("legacy-old", "u1", None, Some(100)));
    store.seed(task("first", "u1", Some(1), Some(999)));
    store.seed(task("legacy-undated", "u1", None, None));

    let items = collection.list(Some(&OwnerId::new("u1"))).await.unwrap();
    assert_eq!(
        ids(&items),
        vec!["first", "second", "legacy-undated", "legacy-old", "legacy-new"]
    );
}

#[tokio::test]
async fn test_list_propagates_read_failure() {
    let (store, collection) = setup();
    store.fail(StoreOp::Query);
    let result = collection.list(Some(&OwnerId::new("u1"))).await;
    assert!(matches!(result, Err(CollectionError::Store(StoreError::Unavailable(_)))));
}

#[tokio::test]
async fn test_append_goes_after_current_maximum() {
    let (store, collection) = setup();
    let owner = OwnerId::new("u1");
    for (id, order) in [("a", 0), ("b", 1), ("c", 2)] {
        store.seed(task(id, "u1", Some(order), None));
    }

    let created = collection.append(Some(&owner), draft("d")).await.unwrap();
    assert_eq!(created.order, Some(3));
    assert_eq!(store.calls(StoreOp::Query), 1);
    assert_eq!(store.calls(StoreOp::Create), 1);

    let items = collection.list(Some(&owner)).await.unwrap();
    assert_eq!(items.last().map(|t| t.text.as_str()), Some("d"));
}

#[tokio::test]
async fn test_append_to_empty_or_legacy_list_starts_at_zero() {
    let (store, collection) = setup();
    let owner = OwnerId::new("u1");

    let first = collection.append(Some(&owner), draft("first")).await.unwrap();
    assert_eq!(first.order, Some(0));

    let (legacy_store, legacy_collection) = setup();
    legacy_store.seed(task("old", "u1", None, Some(10)));
    let appended = legacy_collection.append(Some(&owner), draft("new")).await.unwrap();
    assert_eq!(appended.order, Some(0));
    assert_eq!(store.len(), 1);
}

#[tokio::test]
async fn test_append_with_gaps_uses_maximum() {
    let (store, collection) = setup();
    store.seed(task("a", "u1", Some(2), None));
    store.seed(task("b", "u1", Some(7), None));
    let created = collection
        .append(Some(&OwnerId::new("u1")), draft("c"))
        .await
        .unwrap();
    assert_eq!(created.order, Some(8));
}

#[tokio::test]
async fn test_append_without_owner_fails() {
    let (store, collection) = setup();
    let result = collection.append(None, draft("x")).await;
    assert_eq!(result.unwrap_err(), CollectionError::NoSession);
    assert_eq!(store.total_calls(), 0);
}

#[tokio::test]
async fn test_reorder_rewrites_contiguous_orders() {
    let (store, collection) = setup();
    let owner = OwnerId::new("u1");
    for text in ["A", "B", "C"] {
        collection.append(Some(&owner), draft(text)).await.unwrap();
    }
    let items = collection.list(Some(&owner)).await.unwrap();
    let moved = move_item(&items, 0, 2).unwrap();

    collection.reorder(&owner, &moved).await.unwrap();

    let reloaded = collection.list(Some(&owner)).await.unwrap();
    let texts: Vec<(&str, Option<u32>)> =
        reloaded.iter().map(|t| (t.text.as_str(), t.order)).collect();
    assert_eq!(texts, vec![("B", Some(0)), ("C", Some(1)), ("A", Some(2))]);
    assert_eq!(store.calls(StoreOp::Patch), 3);
}

#[tokio::test]
async fn test_reorder_restores_contiguity_over_legacy_records() {
    let (store, collection) = setup();
    let owner = OwnerId::new("u1");
    store.seed(task("x", "u1", None, Some(5)));
    store.seed(task("y", "u1", Some(9), None));
    store.seed(task("z", "u1", None, Some(1)));

    let items = collection.list(Some(&owner)).await.unwrap();
    collection.reorder(&owner, &items).await.unwrap();

    let orders: Vec<Option<u32>> = collection
        .list(Some(&owner))
        .await
        .unwrap()
        .iter()
        .map(|t| t.order)
        .collect();
    assert_eq!(orders, vec![Some(0), Some(1), Some(2)]);
}

#[tokio::test]
async fn test_reorder_partial_failure_is_reported_and_not_undone() {
    let (store, collection) = setup();
    let owner = OwnerId::new("u1");
    for (id, order) in [("a", 0), ("b", 1), ("c", 2)] {
        store.seed(task(id, "u1", Some(order), None));
    }
    store.fail_patch_for("b");

    let sequence = vec![
        task("c", "u1", Some(2), None),
        task("b", "u1", Some(1), None),
        task("a", "u1", Some(0), None),
    ];
    let err = collection.reorder(&owner, &sequence).await.unwrap_err();
    match err {
        CollectionError::ReorderFailed { failed, total, .. } => {
            assert_eq!(failed, 1);
            assert_eq!(total, 3);
        }
        other => panic!("unexpected error: {:?}", other),
    }

    // The successful writes stay.
    assert_eq!(store.get("c").unwrap().order, Some(0));
    assert_eq!(store.get("b").unwrap().order, Some(1));
    assert_eq!(store.get("a").unwrap().order, Some(2));

    // The mixed state is still totally ordered.
    let items = collection.list(Some(&owner)).await.unwrap();
    assert_eq!(ids(&items), vec!["c", "b", "a"]);
}

#[tokio::test]
async fn test_reorder_rejects_foreign_items_before_writing() {
    let (store, collection) = setup();
    let owner = OwnerId::new("u1");
    store.seed(task("mine", "u1", Some(0), None));
    store.seed(task("theirs", "u2", Some(0), None));

    let sequence = vec![task("theirs", "u2", Some(0), None), task("mine", "u1", Some(0), None)];
    let err = collection.reorder(&owner, &sequence).await.unwrap_err();

    assert_eq!(err, CollectionError::ForeignItem("theirs".to_string()));
    assert_eq!(store.write_calls(), 0);
    assert_eq!(store.get("theirs").unwrap().order, Some(0));
}

#[tokio::test]
async fn test_list_is_isolated_per_owner() {
    let (store, collection) = setup();
    store.seed(task("a1", "alice", Some(0), None));
    store.seed(task("b1", "bob", Some(0), None));
    store.seed(task("b2", "bob", Some(1), None));

    let alice = collection.list(Some(&OwnerId::new("alice"))).await.unwrap();
    assert_eq!(ids(&alice), vec!["a1"]);
    assert!(alice.iter().all(|t| t.is_owned_by(&OwnerId::new("alice"))));

    let bob = collection.list(Some(&OwnerId::new("bob"))).await.unwrap();
    assert_eq!(ids(&bob), vec!["b1", "b2"]);
}

#[tokio::test]
async fn test_overlapping_reorders_leave_one_complete_sequence() {
    let (store, collection) = setup();
    let owner = OwnerId::new("u1");
    for (id, order) in [("a", 0), ("b", 1), ("c", 2), ("d", 3)] {
        store.seed(task(id, "u1", Some(order), None));
    }
    let items = collection.list(Some(&owner)).await.unwrap();
    let first = move_item(&items, 0, 3).unwrap();
    let second = move_item(&items, 3, 0).unwrap();

    let (r1, r2) = tokio::join!(
        collection.reorder(&owner, &first),
        collection.reorder(&owner, &second)
    );
    r1.unwrap();
    r2.unwrap();

    let result = collection.list(Some(&owner)).await.unwrap();
    let final_ids = ids(&result);
    assert!(final_ids == ids(&first) || final_ids == ids(&second));
    assert_eq!(next_order(&result), 4);
}
