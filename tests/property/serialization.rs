//! Property-based tests for the stored task collection format.
//!
//! Uses proptest to verify:
//! 1. Any task collection survives encode → decode unchanged.
//! 2. Encoded text always uses the camelCase field names.
//! 3. Arbitrary text never causes a panic in `decode_tasks`.
//! 4. `TaskDraft` accepts exactly the trimmed titles of valid length.

use chrono::{DateTime, TimeZone, Utc};
use proptest::prelude::*;
use taskdeck_proto::codec::{decode_tasks, encode_tasks};
use taskdeck_proto::draft::{MAX_TITLE_LENGTH, MIN_TITLE_LENGTH, TaskDraft};
use taskdeck_proto::task::{Task, TaskId, TaskStatus};
use uuid::Uuid;

// --- Strategies for task types ---

/// Strategy for generating arbitrary `TaskId` values.
fn arb_task_id() -> impl Strategy<Value = TaskId> {
    prop_oneof![
        any::<u128>().prop_map(|n| TaskId::from_uuid(Uuid::from_u128(n))),
        "[a-z0-9-]{1,24}".prop_map(TaskId::from),
    ]
}

/// Strategy for generating creation times between 1970 and 2100 at
/// millisecond precision.
fn arb_created_at() -> impl Strategy<Value = DateTime<Utc>> {
    (0i64..4_102_444_800_000).prop_map(|ms| {
        Utc.timestamp_millis_opt(ms)
            .single()
            .unwrap_or(DateTime::UNIX_EPOCH)
    })
}

fn arb_status() -> impl Strategy<Value = TaskStatus> {
    prop_oneof![Just(TaskStatus::Pending), Just(TaskStatus::Completed)]
}

/// Strategy for generating arbitrary `Task` values, including unicode text.
fn arb_task() -> impl Strategy<Value = Task> {
    (
        arb_task_id(),
        "\\PC{0,100}",
        "\\PC{0,200}",
        arb_created_at(),
        arb_status(),
        "[a-zA-Z0-9_@.]{1,32}",
    )
        .prop_map(|(id, title, description, created_at, status, user_id)| Task {
            id,
            title,
            description,
            created_at,
            status,
            user_id,
        })
}

// --- Property tests ---

proptest! {
    #[test]
    fn collection_round_trip(tasks in prop::collection::vec(arb_task(), 0..20)) {
        let text = encode_tasks(&tasks).unwrap();
        let decoded = decode_tasks(&text).unwrap();
        prop_assert_eq!(tasks, decoded);
    }

    #[test]
    fn encoded_fields_are_camel_case(task in arb_task()) {
        let text = encode_tasks(std::slice::from_ref(&task)).unwrap();
        prop_assert!(text.contains("\"createdAt\""));
        prop_assert!(text.contains("\"userId\""));
        prop_assert!(!text.contains("\"created_at\""));
    }

    #[test]
    fn decode_never_panics(text in "\\PC{0,512}") {
        // Must not panic; errors are fine.
        let _ = decode_tasks(&text);
    }

    #[test]
    fn decode_never_panics_on_json_like_input(
        text in r#"\[(\{("[a-zA-Z]{1,10}":("[^"]{0,10}"|[0-9]{1,5}|null|true),?){0,6}\},?){0,3}\]"#
    ) {
        let _ = decode_tasks(&text);
    }

    #[test]
    fn draft_accepts_only_valid_title_lengths(
        title in "[a-zA-Z ]{0,120}",
        padding in " {0,3}",
    ) {
        let padded = format!("{padding}{title}{padding}");
        let trimmed_len = title.trim().chars().count();
        let result = TaskDraft::new(&padded, "");
        let valid = (MIN_TITLE_LENGTH..=MAX_TITLE_LENGTH).contains(&trimmed_len);
        prop_assert_eq!(result.is_ok(), valid);
        if let Ok(draft) = result {
            prop_assert_eq!(draft.title(), title.trim());
        }
    }
}
