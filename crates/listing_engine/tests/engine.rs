mod common;

use std::sync::Arc;
use std::time::{Duration, Instant};

use common::{init_logging, stored, FakeStore, FakeUploader};
use listing_core::{update, ItemId, MediaBoard, MediaId, Msg};
use listing_engine::{EngineEvent, EngineHandle, SyncRequest};

#[test]
fn engine_reports_completion_for_submitted_request() {
    init_logging();
    let store = Arc::new(FakeStore::with_items(vec![stored("a", 0), stored("b", 1)]));
    let engine = EngineHandle::new(store.clone(), Arc::new(FakeUploader::default()));

    let (board, _) = update(
        MediaBoard::new(),
        Msg::Initialize {
            existing: vec![stored("a", 0), stored("b", 1)],
            pending: Vec::new(),
        },
    );
    let (board, _) = update(board, Msg::RemoveClicked(ItemId::existing("a")));
    engine.submit(SyncRequest::from_board(42, "prop_1", &board));

    let deadline = Instant::now() + Duration::from_secs(5);
    let mut progress = 0;
    let report = loop {
        assert!(Instant::now() < deadline, "no completion event");
        match engine.recv_timeout(Duration::from_millis(100)) {
            Some(EngineEvent::Progress(event)) => {
                assert_eq!(event.request_id, 42);
                progress += 1;
            }
            Some(EngineEvent::SyncCompleted { request_id, report }) => {
                assert_eq!(request_id, 42);
                break report;
            }
            None => {}
        }
    };

    assert!(progress >= 2);
    assert_eq!(report.removed, vec![MediaId::new("a")]);
    assert_eq!(store.calls(), vec!["remove a".to_string()]);
}
