//! Property-based tests for identifier normalization and board ordering.
//!
//! Uses proptest to verify:
//! 1. A numeric id and its decimal string decode to the same identifier.
//! 2. A raw board reference and an embedded one naming the same board are equal.
//! 3. Random JSON text never panics the task decoder.
//! 4. Board sorting yields non-decreasing creation times and keeps every board.

use chrono::{DateTime, Utc};
use proptest::prelude::*;
use taskboard_proto::board::{Board, BoardRef, sort_boards};
use taskboard_proto::id::{BoardId, TaskId};
use taskboard_proto::task::Task;

/// Strategy for identifier strings the backend plausibly emits.
fn arb_id_text() -> impl Strategy<Value = String> {
    "[a-f0-9]{1,24}"
}

/// Strategy for optional creation timestamps.
fn arb_created_at() -> impl Strategy<Value = Option<DateTime<Utc>>> {
    prop::option::of((0_i64..4_000_000_000).prop_map(|secs| {
        DateTime::from_timestamp(secs, 0).unwrap_or_default()
    }))
}

/// Strategy for a board with an arbitrary creation time.
fn arb_board() -> impl Strategy<Value = Board> {
    (arb_id_text(), arb_created_at()).prop_map(|(id, created_at)| Board {
        id: BoardId::new(id),
        title: String::new(),
        description: None,
        project: None,
        owner: None,
        created_at,
    })
}

proptest! {
    /// Integer ids normalize to their decimal string.
    #[test]
    fn numeric_and_string_ids_agree(n in any::<u64>()) {
        let from_number: TaskId = serde_json::from_str(&n.to_string()).expect("number decodes");
        let from_string: TaskId =
            serde_json::from_str(&format!("\"{n}\"")).expect("string decodes");
        prop_assert_eq!(from_number, from_string);
    }

    /// Raw and embedded references to the same board compare equal.
    #[test]
    fn raw_and_embedded_board_refs_agree(id in arb_id_text(), title in "[A-Za-z ]{0,16}") {
        let raw: BoardRef = serde_json::from_str(&format!("\"{id}\"")).expect("raw decodes");
        let embedded: BoardRef =
            serde_json::from_str(&format!(r#"{{"_id":"{id}","title":"{title}"}}"#))
                .expect("embedded decodes");
        prop_assert_eq!(raw.id(), embedded.id());
        prop_assert_eq!(raw, embedded);
    }

    /// Random text never panics the task decoder.
    #[test]
    fn random_text_decode_no_panic(text in ".{0,256}") {
        let _ = serde_json::from_str::<Task>(&text);
    }

    /// Sorting orders by creation time and keeps every board.
    #[test]
    fn sort_boards_orders_by_creation(mut boards in prop::collection::vec(arb_board(), 0..32)) {
        let before = boards.len();
        sort_boards(&mut boards);
        prop_assert_eq!(boards.len(), before);
        for pair in boards.windows(2) {
            prop_assert!(pair[0].created_at <= pair[1].created_at);
        }
    }
}
