mod common;

use common::*;
use listing_core::{update, AddStats, Effect, ItemId, MediaBoard, MediaId, MediaKind, Msg};

#[test]
fn add_files_beyond_capacity_admits_only_the_remainder() {
    init_logging();
    let names: Vec<String> = (0..8).map(|i| format!("p{i}.jpg")).collect();
    let refs: Vec<&str> = names.iter().map(String::as_str).collect();
    let board = select(initialized(vec![stored("m0", Some(0))]), &refs);
    assert_eq!(board.max_files(), 10);

    let board = select(board, &["a.jpg", "b.jpg", "c.jpg", "d.jpg", "e.jpg"]);

    assert_eq!(board.pending_files().len(), 10);
    assert_eq!(board.items().len(), 11);
    let names: Vec<_> = board.pending_files()[8..]
        .iter()
        .map(|file| file.filename.as_str())
        .collect();
    assert_eq!(names, vec!["a.jpg", "b.jpg"]);
    assert_eq!(
        board.view().last_add_stats,
        Some(AddStats {
            accepted: 2,
            dropped: 3
        })
    );
    assert!(!board.view().can_add_files());
    assert_eq!(board.view().count_label(), "10/10 files");
    assert_contiguous(&board);
}

#[test]
fn stored_media_do_not_use_up_capacity() {
    let board = initialized((0..10).map(|i| stored(&format!("m{i}"), Some(i))).collect());
    assert!(board.view().can_add_files());
    assert_eq!(board.view().count_label(), "0/10 files");

    let board = select(board, &["new.jpg"]);

    assert_eq!(board.pending_files().len(), 1);
    assert_eq!(board.items().len(), 11);
    assert_eq!(board.view().count_label(), "1/10 files");
    assert_contiguous(&board);
}

#[test]
fn full_board_accepts_nothing() {
    let mut board = MediaBoard::with_max_files(1);
    let stats = board.add_files(vec![picked("a.jpg")]);
    assert_eq!(stats.accepted, 1);
    let stats = board.add_files(vec![picked("b.jpg")]);
    assert_eq!(stats, AddStats { accepted: 0, dropped: 1 });
    assert_eq!(board.pending_files().len(), 1);
}

#[test]
fn new_files_infer_kind_and_get_previews() {
    let board = select(MediaBoard::new(), &["tour.mp4"]);
    let file = &board.pending_files()[0];
    assert_eq!(file.kind, MediaKind::Video);
    assert!(file.preview.starts_with("preview://"));
    let row = &board.view().rows[0];
    assert_eq!(row.source, file.preview);
    assert_eq!(row.size, Some(2048));
}

#[test]
fn orders_stay_contiguous_across_adds_and_removes() {
    let board = initialized(vec![stored("a", Some(0)), stored("b", Some(1))]);
    let board = select(board, &["1.jpg", "2.jpg", "3.jpg"]);
    assert_contiguous(&board);

    let second = ItemId::Pending(board.pending_files()[1].handle);
    let (board, _) = update(board, Msg::RemoveClicked(second));
    assert_contiguous(&board);

    let (board, _) = update(board, Msg::RemoveClicked(existing("a")));
    assert_contiguous(&board);

    let board = select(board, &["4.jpg"]);
    assert_contiguous(&board);
    assert_eq!(board.items().len(), 4);
}

#[test]
fn removing_pending_file_keeps_relative_order() {
    let board = initialized(vec![stored("a", Some(0))]);
    let board = select(board, &["1.jpg", "2.jpg", "3.jpg"]);
    let handles: Vec<u64> = board.pending_files().iter().map(|f| f.handle).collect();
    let before = board.items().len();

    let (board, effects) = update(board, Msg::RemoveClicked(ItemId::Pending(handles[1])));

    assert!(effects.is_empty());
    assert_eq!(board.items().len(), before - 1);
    assert_eq!(
        board.item_ids(),
        vec![
            existing("a"),
            ItemId::Pending(handles[0]),
            ItemId::Pending(handles[2]),
        ]
    );
    assert_eq!(board.pending_index(handles[2]), Some(1));
}

#[test]
fn removing_stored_item_requests_deletion_and_sticks() {
    let items = vec![stored("a", Some(0)), stored("b", Some(1))];
    let board = initialized(items.clone());

    let (board, effects) = update(board, Msg::RemoveClicked(existing("a")));
    assert_eq!(
        effects,
        vec![Effect::RemovalRequested {
            media_id: MediaId::new("a")
        }]
    );
    assert_eq!(board.removed_ids(), vec![MediaId::new("a")]);

    // The source still lists the removed item.
    let (board, _) = update(board, Msg::ExistingChanged(items.clone()));
    assert_eq!(board.item_ids(), vec![existing("b")]);

    let (board, _) = update(
        board,
        Msg::Initialize {
            existing: items,
            pending: Vec::new(),
        },
    );
    assert_eq!(board.item_ids(), vec![existing("b")]);
    assert_eq!(board.view().removed, vec![MediaId::new("a")]);
}

#[test]
fn removing_unknown_item_is_ignored() {
    let board = initialized(vec![stored("a", Some(0))]);
    let (board, effects) = update(board, Msg::RemoveClicked(existing("zzz")));
    assert!(effects.is_empty());
    assert!(board.removed_ids().is_empty());
}

#[test]
fn description_edits_reach_both_origins() {
    let board = initialized(vec![stored("a", Some(0))]);
    let board = select(board, &["1.jpg"]);
    let handle = board.pending_files()[0].handle;

    let (board, effects) = update(
        board,
        Msg::DescriptionEdited {
            item: existing("a"),
            description: "Front yard".into(),
        },
    );
    assert_eq!(
        effects,
        vec![Effect::UpdateDescription {
            media_id: MediaId::new("a"),
            description: "Front yard".into()
        }]
    );

    let (board, effects) = update(
        board,
        Msg::DescriptionEdited {
            item: ItemId::Pending(handle),
            description: "Kitchen".into(),
        },
    );
    assert!(effects.is_empty());
    assert_eq!(board.pending_files()[0].description, "Kitchen");

    let descriptions: Vec<_> = board.view().rows.into_iter().map(|r| r.description).collect();
    assert_eq!(descriptions, vec!["Front yard", "Kitchen"]);
}
