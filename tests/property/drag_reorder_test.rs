//! Property-based tests for drag-reorder planning and the full-rewrite
//! reorder it feeds.

use std::sync::Arc;

use proptest::prelude::*;
use startpage::database::{MemoryRecordStore, RecordStore};
use startpage::managers::collection_controller::CollectionController;
use startpage::managers::drag_reorder::{plan_drag, DragEnd};
use startpage::managers::ordered_collection::OrderedCollection;
use startpage::types::item::OwnerId;
use startpage::types::task::{Task, TaskDraft};

fn arb_list_and_drag() -> impl Strategy<Value = (usize, usize, Option<usize>)> {
    (1usize..12).prop_flat_map(|len| (Just(len), 0..len, prop::option::of(0..len)))
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(50))]

    /// A planned move is a permutation that puts the dragged element at the
    /// destination and keeps the others in relative order.
    #[test]
    fn planned_move_is_a_stable_permutation((len, source, destination) in arb_list_and_drag()) {
        let items: Vec<usize> = (0..len).collect();
        let drag = DragEnd::new(source, destination);

        match plan_drag(&items, drag) {
            None => prop_assert!(destination.is_none() || destination == Some(source)),
            Some(moved) => {
                let dest = destination.unwrap();
                prop_assert_eq!(moved.len(), len);
                prop_assert_eq!(moved[dest], source);
                let others: Vec<usize> = moved.iter().copied().filter(|&x| x != source).collect();
                let expected: Vec<usize> = items.iter().copied().filter(|&x| x != source).collect();
                prop_assert_eq!(others, expected);
            }
        }
    }

    /// After any successful drag the stored orders are exactly `0..n-1` in
    /// the new list order; a no-op drag writes nothing.
    #[test]
    fn drag_restores_contiguous_orders((len, source, destination) in arb_list_and_drag()) {
        let rt = tokio::runtime::Runtime::new().unwrap();
        rt.block_on(async {
            let store = Arc::new(MemoryRecordStore::<Task>::new());
            let owner = OwnerId::new("u1");
            for i in 0..len {
                // Sparse legacy orders to start from.
                let order = if i % 3 == 0 { None } else { Some((i * 7) as u32) };
                store
                    .create(&owner, TaskDraft { text: format!("t{}", i) }, order)
                    .await
                    .unwrap();
            }
            let collection = Arc::new(OrderedCollection::<Task>::new(store.clone()));
            let mut controller = CollectionController::new(collection, Some(owner));
            controller.reload().await.unwrap();
            let writes_before = store.write_calls();

            let outcome = controller.on_drag_end(DragEnd::new(source, destination)).await.unwrap();

            if outcome.is_none() {
                prop_assert_eq!(store.write_calls(), writes_before);
                return Ok(());
            }
            for (index, item) in controller.items().iter().enumerate() {
                prop_assert_eq!(store.get(&item.id).unwrap().order, Some(index as u32));
            }
            Ok(())
        })?;
    }
}
