mod common;

use common::*;
use listing_core::{update, Effect, ItemId, MediaBoard, Msg, Origin};
use proptest::prelude::*;

#[derive(Debug, Clone)]
enum Op {
    Add(usize),
    Remove(usize),
    Reorder { from: usize, before: Option<usize> },
}

fn op() -> impl Strategy<Value = Op> {
    prop_oneof![
        (0usize..4).prop_map(Op::Add),
        (0usize..12).prop_map(Op::Remove),
        (0usize..12, proptest::option::of(0usize..12))
            .prop_map(|(from, before)| Op::Reorder { from, before }),
    ]
}

fn pick(board: &MediaBoard, index: usize) -> Option<ItemId> {
    let ids = board.item_ids();
    if ids.is_empty() {
        None
    } else {
        Some(ids[index % ids.len()].clone())
    }
}

fn apply(board: MediaBoard, op: &Op, counter: &mut usize) -> (MediaBoard, Vec<Effect>) {
    match op {
        Op::Add(count) => {
            let names: Vec<String> = (0..*count)
                .map(|_| {
                    *counter += 1;
                    format!("f{counter}.jpg")
                })
                .collect();
            let refs: Vec<&str> = names.iter().map(String::as_str).collect();
            (select(board, &refs), Vec::new())
        }
        Op::Remove(index) => match pick(&board, *index) {
            Some(id) => update(board, Msg::RemoveClicked(id)),
            None => (board, Vec::new()),
        },
        Op::Reorder { from, before } => {
            let Some(item) = pick(&board, *from) else {
                return (board, Vec::new());
            };
            let before = before.and_then(|index| pick(&board, index));
            update(board, Msg::Reorder { item, before })
        }
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    #[test]
    fn orders_stay_contiguous(stored_count in 0usize..6, ops in proptest::collection::vec(op(), 0..30)) {
        let mut board = initialized(
            (0..stored_count).map(|i| stored(&format!("s{i}"), Some(i as i64))).collect(),
        );
        let mut counter = 0;
        for op in &ops {
            board = apply(board, op, &mut counter).0;
            let expected: Vec<usize> = (0..board.items().len()).collect();
            prop_assert_eq!(orders(&board), expected);
            prop_assert!(board.pending_files().len() <= board.max_files());
        }
    }

    #[test]
    fn committed_priorities_match_visual_order(stored_count in 1usize..6, ops in proptest::collection::vec(op(), 1..30)) {
        let mut board = initialized(
            (0..stored_count).map(|i| stored(&format!("s{i}"), Some(i as i64))).collect(),
        );
        let mut counter = 0;
        for op in &ops {
            let (next, effects) = apply(board, op, &mut counter);
            board = next;
            for effect in effects {
                match effect {
                    Effect::PersistPriorities { assignments } => {
                        let visual: Vec<_> = board
                            .items()
                            .iter()
                            .filter(|item| item.origin() == Origin::Existing)
                            .map(|item| item.id.clone())
                            .collect();
                        let emitted: Vec<_> = assignments
                            .iter()
                            .map(|a| ItemId::Existing(a.media_id.clone()))
                            .collect();
                        prop_assert_eq!(emitted, visual);
                        let priorities: Vec<u32> = assignments.iter().map(|a| a.priority).collect();
                        let expected: Vec<u32> = (0..priorities.len() as u32).collect();
                        prop_assert_eq!(priorities, expected);
                    }
                    Effect::PendingFilesReordered { files } => {
                        let visual: Vec<_> = board
                            .items()
                            .iter()
                            .filter(|item| item.origin() == Origin::New)
                            .map(|item| item.id.clone())
                            .collect();
                        let emitted: Vec<_> = files.iter().map(|f| ItemId::Pending(f.handle)).collect();
                        prop_assert_eq!(emitted, visual);
                    }
                    _ => {}
                }
            }
        }
    }

    #[test]
    fn ids_are_surviving_stored_plus_pending(stored_count in 0usize..6, ops in proptest::collection::vec(op(), 0..30)) {
        let mut board = initialized(
            (0..stored_count).map(|i| stored(&format!("s{i}"), Some(i as i64))).collect(),
        );
        let mut counter = 0;
        for op in &ops {
            board = apply(board, op, &mut counter).0;
        }
        let removed = board.removed_ids();
        let mut expected: Vec<ItemId> = board
            .existing_items()
            .iter()
            .filter(|media| !removed.contains(&media.id))
            .map(|media| ItemId::Existing(media.id.clone()))
            .chain(board.pending_files().iter().map(|f| ItemId::Pending(f.handle)))
            .collect();
        let mut actual = board.item_ids();
        expected.sort();
        actual.sort();
        prop_assert_eq!(actual, expected);
    }
}
