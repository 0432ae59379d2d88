//! Property-based tests for task display ordering and filtering.
//!
//! Uses proptest to verify:
//! 1. `TaskFilter::compare` is antisymmetric and transitive for every filter.
//! 2. Sorting under `All` yields pending tasks oldest first, then completed
//!    tasks newest first.
//! 3. The repository's filtered views partition the collection and agree
//!    with its stats.

#![allow(clippy::expect_used, clippy::unwrap_used)]

use std::cmp::Ordering;

use chrono::{DateTime, TimeZone, Utc};
use proptest::prelude::*;
use taskdeck::store::{DurableStore, InMemoryStore};
use taskdeck::tasks::TaskRepository;
use taskdeck_proto::codec::encode_tasks;
use taskdeck_proto::task::{Task, TaskFilter, TaskId, TaskStatus};

// --- Strategies ---

fn arb_filter() -> impl Strategy<Value = TaskFilter> {
    prop_oneof![
        Just(TaskFilter::Pending),
        Just(TaskFilter::Completed),
        Just(TaskFilter::All),
    ]
}

fn arb_created_at() -> impl Strategy<Value = DateTime<Utc>> {
    // Narrow range so equal timestamps show up regularly.
    (0i64..50).prop_map(|min| Utc.timestamp_opt(1_700_000_000 + min * 60, 0).unwrap())
}

/// Strategy for a collection with unique ids.
fn arb_tasks(max: usize) -> impl Strategy<Value = Vec<Task>> {
    prop::collection::vec((arb_created_at(), any::<bool>()), 0..max).prop_map(|specs| {
        specs
            .into_iter()
            .enumerate()
            .map(|(i, (created_at, pending))| Task {
                id: TaskId::from(format!("t{i}")),
                title: format!("Task {i}"),
                description: String::new(),
                created_at,
                status: if pending {
                    TaskStatus::Pending
                } else {
                    TaskStatus::Completed
                },
                user_id: "u1".to_string(),
            })
            .collect()
    })
}

fn runtime() -> tokio::runtime::Runtime {
    tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .unwrap()
}

// --- Property tests ---

proptest! {
    #[test]
    fn compare_is_antisymmetric_and_transitive(
        filter in arb_filter(),
        tasks in arb_tasks(8),
    ) {
        for a in &tasks {
            for b in &tasks {
                prop_assert_eq!(filter.compare(a, b), filter.compare(b, a).reverse());
                for c in &tasks {
                    if filter.compare(a, b) != Ordering::Greater
                        && filter.compare(b, c) != Ordering::Greater
                    {
                        prop_assert_ne!(filter.compare(a, c), Ordering::Greater);
                    }
                }
            }
        }
    }

    #[test]
    fn all_filter_orders_pending_then_completed(mut tasks in arb_tasks(40)) {
        let original_len = tasks.len();
        TaskFilter::All.sort(&mut tasks);
        prop_assert_eq!(tasks.len(), original_len);

        let split = tasks.iter().position(|t| !t.is_pending()).unwrap_or(tasks.len());
        let (pending, completed) = tasks.split_at(split);
        prop_assert!(completed.iter().all(|t| !t.is_pending()));
        for pair in pending.windows(2) {
            prop_assert!(pair[0].created_at <= pair[1].created_at);
        }
        for pair in completed.windows(2) {
            prop_assert!(pair[0].created_at >= pair[1].created_at);
        }
    }

    #[test]
    fn filtered_views_partition_collection(tasks in arb_tasks(30)) {
        let rt = runtime();
        let (pending, completed, all, stats) = rt.block_on(async {
            let store = InMemoryStore::new();
            store.write("initialized:u1", "true").await.unwrap();
            store.write("tasks:u1", &encode_tasks(&tasks).unwrap()).await.unwrap();
            let repo = TaskRepository::with_seed(store, 0);
            (
                repo.get_filtered_tasks("u1", TaskFilter::Pending).await,
                repo.get_filtered_tasks("u1", TaskFilter::Completed).await,
                repo.get_filtered_tasks("u1", TaskFilter::All).await,
                repo.get_task_stats("u1").await,
            )
        });

        prop_assert!(pending.iter().all(Task::is_pending));
        prop_assert!(completed.iter().all(|t| !t.is_pending()));
        prop_assert_eq!(pending.len() + completed.len(), all.len());
        prop_assert_eq!(all.len(), tasks.len());
        prop_assert_eq!(stats.total, tasks.len());
        prop_assert_eq!(stats.pending, pending.len());
        prop_assert_eq!(stats.completed, completed.len());
        prop_assert_eq!(stats.pending + stats.completed, stats.total);
    }
}
