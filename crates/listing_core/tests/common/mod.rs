#![allow(dead_code)]

use std::sync::Once;

use listing_core::{
    update, Effect, ItemId, MediaBoard, MediaKind, Msg, PersistedMediaItem, SelectedFile,
};

pub fn init_logging() {
    static INIT: Once = Once::new();
    INIT.call_once(listing_logging::initialize_for_tests);
}

pub fn stored(id: &str, priority: Option<i64>) -> PersistedMediaItem {
    PersistedMediaItem {
        id: listing_core::MediaId::new(id),
        kind: MediaKind::Image,
        url: format!("https://cdn.example.com/images/{id}.jpg"),
        filename: format!("{id}.jpg"),
        file_size: Some(1024),
        mime_type: Some("image/jpeg".to_string()),
        priority,
        created_at_ms: 1_700_000_000_000,
        description: None,
    }
}

pub fn picked(name: &str) -> SelectedFile {
    let mime = if name.ends_with(".mp4") {
        "video/mp4"
    } else {
        "image/jpeg"
    };
    SelectedFile::new(format!("/photos/{name}"), name, 2048, mime)
}

pub fn existing(id: &str) -> ItemId {
    ItemId::existing(id)
}

pub fn initialized(items: Vec<PersistedMediaItem>) -> MediaBoard {
    let (board, _) = update(
        MediaBoard::new(),
        Msg::Initialize {
            existing: items,
            pending: Vec::new(),
        },
    );
    board
}

pub fn select(board: MediaBoard, names: &[&str]) -> MediaBoard {
    let files = names.iter().map(|name| picked(name)).collect();
    update(board, Msg::FilesSelected(files)).0
}

pub fn orders(board: &MediaBoard) -> Vec<usize> {
    board.items().iter().map(|item| item.order).collect()
}

pub fn assert_contiguous(board: &MediaBoard) {
    let expected: Vec<usize> = (0..board.items().len()).collect();
    assert_eq!(orders(board), expected);
}

pub fn pending_handles(effects: &[Effect]) -> Option<Vec<u64>> {
    effects.iter().find_map(|effect| match effect {
        Effect::PendingFilesReordered { files } => {
            Some(files.iter().map(|file| file.handle).collect())
        }
        _ => None,
    })
}
