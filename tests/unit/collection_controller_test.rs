//! Unit tests for optimistic mutations: local apply, settle and the recovery
//! strategy of each mutation kind.

use std::sync::Arc;

use startpage::database::{MemoryRecordStore, StoreOp};
use startpage::managers::collection_controller::{
    is_placeholder, CollectionController, Mutation, MutationKind, Settlement,
};
use startpage::managers::drag_reorder::DragEnd;
use startpage::managers::ordered_collection::OrderedCollection;
use startpage::types::bookmark::{Bookmark, BookmarkDraft};
use startpage::types::errors::{CollectionError, MutationError, StoreError};
use startpage::types::item::{OrderableItem, OwnerId};
use startpage::types::task::{Task, TaskDraft};

const OWNER: &str = "u1";

fn task(id: &str, order: u32) -> Task {
    Task {
        id: id.to_string(),
        text: format!("task {}", id),
        done: false,
        created_at: Some(1),
        order: Some(order),
        owner_id: Some(OWNER.to_string()),
    }
}

/// Store seeded with tasks a, b, c (orders 0..3) and a loaded controller.
async fn setup_tasks() -> (Arc<MemoryRecordStore<Task>>, CollectionController<Task>) {
    let store = Arc::new(MemoryRecordStore::<Task>::new());
    for (i, id) in ["a", "b", "c"].iter().enumerate() {
        store.seed(task(id, i as u32));
    }
    let collection = Arc::new(OrderedCollection::<Task>::new(store.clone()));
    let mut controller = CollectionController::new(collection, Some(OwnerId::new(OWNER)));
    controller.reload().await.unwrap();
    (store, controller)
}

fn ids<T: OrderableItem>(items: &[T]) -> Vec<String> {
    items.iter().map(|t| t.id().to_string()).collect()
}

// === Add ===

#[tokio::test]
async fn test_add_replaces_placeholder_with_stored_record() {
    let (store, mut controller) = setup_tasks().await;

    let settlement = controller
        .add(TaskDraft {
            text: "d".to_string(),
        })
        .await
        .unwrap();

    assert_eq!(settlement, Settlement::Refreshed);
    assert_eq!(controller.items().len(), 4);
    let last = controller.items().last().unwrap();
    assert_eq!(last.text, "d");
    assert_eq!(last.order, Some(3));
    assert!(!is_placeholder(&last.id));
    assert!(controller.items().iter().all(|t| !is_placeholder(&t.id)));
    assert_eq!(store.len(), 4);
}

#[tokio::test]
async fn test_add_failure_reloads_and_surfaces_error() {
    let (store, mut controller) = setup_tasks().await;
    store.fail(StoreOp::Create);

    let err = controller
        .add(TaskDraft {
            text: "d".to_string(),
        })
        .await
        .unwrap_err();

    assert!(matches!(err, MutationError::AddFailed(_)));
    assert_eq!(ids(controller.items()), vec!["a", "b", "c"]);
    assert_eq!(store.len(), 3);
}

#[tokio::test]
async fn test_add_without_owner_is_rejected() {
    let store = Arc::new(MemoryRecordStore::<Task>::new());
    let collection = Arc::new(OrderedCollection::<Task>::new(store.clone()));
    let mut controller = CollectionController::new(collection, None);

    let err = controller
        .add(TaskDraft {
            text: "x".to_string(),
        })
        .await
        .unwrap_err();
    assert_eq!(err, MutationError::NoSession);
    assert!(controller.items().is_empty());
    assert_eq!(store.total_calls(), 0);
}

// === Toggle ===

#[tokio::test]
async fn test_toggle_confirms_without_reload() {
    let (store, mut controller) = setup_tasks().await;
    let queries = store.calls(StoreOp::Query);

    let settlement = controller.toggle("b").await.unwrap();

    assert_eq!(settlement, Settlement::Confirmed);
    assert!(controller.find("b").unwrap().done);
    assert!(store.get("b").unwrap().done);
    assert_eq!(store.calls(StoreOp::Query), queries);
}

#[tokio::test]
async fn test_toggle_failure_rolls_back_without_reload() {
    let (store, mut controller) = setup_tasks().await;
    store.fail(StoreOp::Patch);
    let queries = store.calls(StoreOp::Query);

    let settlement = controller.toggle("b").await.unwrap();

    assert_eq!(settlement, Settlement::RolledBack);
    assert!(!controller.find("b").unwrap().done);
    assert_eq!(store.calls(StoreOp::Query), queries);
    assert_eq!(ids(controller.items()), vec!["a", "b", "c"]);
}

#[tokio::test]
async fn test_toggle_unknown_item() {
    let (store, mut controller) = setup_tasks().await;
    let err = controller.toggle("zzz").await.unwrap_err();
    assert_eq!(err, MutationError::ItemNotFound("zzz".to_string()));
    assert_eq!(store.write_calls(), 0);
}

// === Edit ===

#[tokio::test]
async fn test_edit_failure_restores_prior_bookmark() {
    let store = Arc::new(MemoryRecordStore::<Bookmark>::new());
    store.seed(Bookmark {
        id: "bm".to_string(),
        title: "Old".to_string(),
        url: "https://old.example".to_string(),
        description: None,
        icon_name: Some("Globe".to_string()),
        image_url: Some("https://img.example/x.png".to_string()),
        created_at: Some(1),
        order: Some(0),
        owner_id: Some(OWNER.to_string()),
    });
    let collection = Arc::new(OrderedCollection::<Bookmark>::new(store.clone()));
    let mut controller = CollectionController::new(collection, Some(OwnerId::new(OWNER)));
    controller.reload().await.unwrap();
    let before = controller.find("bm").cloned().unwrap();

    let draft = BookmarkDraft {
        title: "New".to_string(),
        url: "https://new.example".to_string(),
        description: Some("fresh".to_string()),
        icon_name: Some("Code2".to_string()),
    };

    store.fail(StoreOp::Patch);
    let settlement = controller.edit("bm", draft.clone()).await.unwrap();
    assert_eq!(settlement, Settlement::RolledBack);
    assert_eq!(controller.find("bm"), Some(&before));

    store.heal();
    let settlement = controller.edit("bm", draft).await.unwrap();
    assert_eq!(settlement, Settlement::Confirmed);
    let stored = store.get("bm").unwrap();
    assert_eq!(stored.title, "New");
    assert_eq!(stored.icon_name.as_deref(), Some("Code2"));
    assert!(stored.image_url.is_none());
    assert_eq!(stored.order, Some(0));
    assert_eq!(controller.find("bm"), Some(&stored));
}

// === Delete ===

#[tokio::test]
async fn test_cancel_delete_makes_no_store_call() {
    let (store, mut controller) = setup_tasks().await;
    let calls = store.total_calls();

    controller.request_delete("b").unwrap();
    assert_eq!(controller.pending_delete(), Some("b"));
    controller.cancel_delete();

    assert_eq!(controller.pending_delete(), None);
    assert_eq!(store.total_calls(), calls);
    assert_eq!(ids(controller.items()), vec!["a", "b", "c"]);
}

#[tokio::test]
async fn test_confirm_delete_removes_item() {
    let (store, mut controller) = setup_tasks().await;
    controller.request_delete("b").unwrap();

    let settlement = controller.confirm_delete().await.unwrap();

    assert_eq!(settlement, Settlement::Confirmed);
    assert_eq!(ids(controller.items()), vec!["a", "c"]);
    assert!(store.get("b").is_none());
    // Siblings keep their order values.
    assert_eq!(store.get("c").unwrap().order, Some(2));
}

#[tokio::test]
async fn test_delete_failure_reloads_ground_truth() {
    let (store, mut controller) = setup_tasks().await;
    store.fail(StoreOp::Delete);
    controller.request_delete("b").unwrap();

    let settlement = controller.confirm_delete().await.unwrap();

    assert_eq!(settlement, Settlement::Reloaded);
    assert_eq!(ids(controller.items()), vec!["a", "b", "c"]);
}

#[tokio::test]
async fn test_confirm_without_request() {
    let (_store, mut controller) = setup_tasks().await;
    assert_eq!(
        controller.confirm_delete().await.unwrap_err(),
        MutationError::NoPendingDelete
    );
}

#[tokio::test]
async fn test_request_delete_unknown_item() {
    let (_store, mut controller) = setup_tasks().await;
    assert!(controller.request_delete("nope").is_err());
    assert_eq!(controller.pending_delete(), None);
}

// === Reorder ===

#[tokio::test]
async fn test_drag_to_same_index_makes_no_writes() {
    let (store, mut controller) = setup_tasks().await;

    let outcome = controller.on_drag_end(DragEnd::new(1, Some(1))).await.unwrap();
    assert_eq!(outcome, None);
    let outcome = controller.on_drag_end(DragEnd::new(1, None)).await.unwrap();
    assert_eq!(outcome, None);

    assert_eq!(store.write_calls(), 0);
    assert_eq!(ids(controller.items()), vec!["a", "b", "c"]);
}

#[tokio::test]
async fn test_drag_reorders_locally_and_remotely() {
    let (store, mut controller) = setup_tasks().await;

    let outcome = controller.on_drag_end(DragEnd::new(0, Some(2))).await.unwrap();

    assert_eq!(outcome, Some(Settlement::Confirmed));
    assert_eq!(ids(controller.items()), vec!["b", "c", "a"]);
    let local: Vec<Option<u32>> = controller.items().iter().map(|t| t.order).collect();
    assert_eq!(local, vec![Some(0), Some(1), Some(2)]);
    assert_eq!(store.get("b").unwrap().order, Some(0));
    assert_eq!(store.get("c").unwrap().order, Some(1));
    assert_eq!(store.get("a").unwrap().order, Some(2));
}

#[tokio::test]
async fn test_reorder_failure_reloads() {
    let (store, mut controller) = setup_tasks().await;
    store.fail_patch_for("a");

    let outcome = controller.on_drag_end(DragEnd::new(0, Some(2))).await.unwrap();

    assert_eq!(outcome, Some(Settlement::Reloaded));
    // b and c were rewritten to 0 and 1; a kept 0 and sorts by id among equals.
    assert_eq!(ids(controller.items()), vec!["a", "b", "c"]);
    assert_eq!(store.get("b").unwrap().order, Some(0));
}

#[tokio::test]
async fn test_failed_reload_after_failed_write_is_stale() {
    let (store, mut controller) = setup_tasks().await;
    store.fail(StoreOp::Delete);
    store.fail(StoreOp::Query);
    controller.request_delete("a").unwrap();

    let settlement = controller.confirm_delete().await.unwrap();

    assert_eq!(settlement, Settlement::Stale);
    assert!(controller.load_error().is_some());
    // The optimistic removal is still what the list shows.
    assert_eq!(ids(controller.items()), vec!["b", "c"]);
}

// === Two-phase protocol ===

#[tokio::test]
async fn test_apply_local_then_settle_with_external_result() {
    let (store, mut controller) = setup_tasks().await;
    let mut edited = controller.find("c").cloned().unwrap();
    edited.text = "changed".to_string();

    let handle = controller.apply_local(Mutation::Edit(edited)).unwrap();
    assert_eq!(handle.kind(), MutationKind::Edit);
    assert_eq!(controller.find("c").unwrap().text, "changed");

    let failure = Err(CollectionError::Store(StoreError::Unavailable("x".to_string())));
    let settlement = controller.settle(handle, failure).await;
    assert_eq!(settlement, Settlement::RolledBack);
    assert_eq!(controller.find("c").unwrap().text, "task c");
    assert_eq!(store.write_calls(), 0);
}
