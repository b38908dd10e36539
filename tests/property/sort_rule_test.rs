//! Property-based tests for the read-side Sort Rule and `next_order`.
//!
//! The store returns records in arbitrary order and `order` values may be
//! missing, duplicated or sparse. Whatever the snapshot, the sorted list must
//! be the same and the comparator must be a total order.

use std::cmp::Ordering;

use proptest::prelude::*;
use startpage::managers::ordered_collection::{compare_items, next_order, sort_items};
use startpage::types::task::Task;

/// Tasks with unique ids and small value ranges so that ties are common.
fn arb_tasks() -> impl Strategy<Value = Vec<Task>> {
    prop::collection::vec(
        (prop::option::of(0u32..5), prop::option::of(0i64..4)),
        0..25,
    )
    .prop_map(|fields| {
        fields
            .into_iter()
            .enumerate()
            .map(|(i, (order, created_at))| Task {
                id: format!("t{:02}", i),
                text: String::new(),
                done: false,
                created_at,
                order,
                owner_id: Some("u1".to_string()),
            })
            .collect()
    })
}

fn ids(items: &[Task]) -> Vec<String> {
    items.iter().map(|t| t.id.clone()).collect()
}

// **Sort totality**
//
// *For any* snapshot and any permutation of it, sorting yields the same
// sequence.
proptest! {
    #![proptest_config(ProptestConfig::with_cases(50))]

    #[test]
    fn sort_is_independent_of_store_order(
        (tasks, shuffled) in arb_tasks().prop_flat_map(|tasks| {
            let shuffled = Just(tasks.clone()).prop_shuffle();
            (Just(tasks), shuffled)
        })
    ) {
        let mut a = tasks;
        let mut b = shuffled;
        sort_items(&mut a);
        sort_items(&mut b);
        prop_assert_eq!(ids(&a), ids(&b));
    }

    #[test]
    fn comparator_is_antisymmetric_and_transitive(tasks in arb_tasks()) {
        for x in &tasks {
            prop_assert_eq!(compare_items(x, x), Ordering::Equal);
            for y in &tasks {
                prop_assert_eq!(compare_items(x, y), compare_items(y, x).reverse());
                for z in &tasks {
                    if compare_items(x, y) != Ordering::Greater
                        && compare_items(y, z) != Ordering::Greater
                    {
                        prop_assert_ne!(compare_items(x, z), Ordering::Greater);
                    }
                }
            }
        }
    }

    #[test]
    fn ordered_items_precede_legacy_items(tasks in arb_tasks()) {
        let mut sorted = tasks;
        sort_items(&mut sorted);
        let first_legacy = sorted.iter().position(|t| t.order.is_none()).unwrap_or(sorted.len());
        prop_assert!(sorted[first_legacy..].iter().all(|t| t.order.is_none()));
        prop_assert!(sorted[..first_legacy]
            .windows(2)
            .all(|w| w[0].order <= w[1].order));
        prop_assert!(sorted[first_legacy..]
            .windows(2)
            .all(|w| w[0].created_at.unwrap_or(0) <= w[1].created_at.unwrap_or(0)));
    }

    #[test]
    fn next_order_is_past_every_existing_order(tasks in arb_tasks()) {
        let next = next_order(&tasks);
        prop_assert!(tasks.iter().filter_map(|t| t.order).all(|o| o < next));
        if tasks.iter().all(|t| t.order.is_none()) {
            prop_assert_eq!(next, 0);
        }
    }
}

#[test]
fn next_order_examples() {
    let mk = |order: Option<u32>| Task {
        id: "x".to_string(),
        text: String::new(),
        done: false,
        created_at: None,
        order,
        owner_id: None,
    };
    assert_eq!(next_order(&[mk(Some(0)), mk(Some(1)), mk(Some(2))]), 3);
    assert_eq!(next_order::<Task>(&[]), 0);
    assert_eq!(next_order(&[mk(None), mk(None)]), 0);
    assert_eq!(next_order(&[mk(None), mk(Some(4))]), 5);
}
