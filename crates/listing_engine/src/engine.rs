use std::sync::{mpsc, Arc};
use std::thread;
use std::time::Duration;

use listing_logging::listing_error;

use crate::sync::{sync_media, ChannelProgressSink};
use crate::{EngineEvent, MediaStore, SyncRequest, Uploader};

enum EngineCommand {
    Sync(SyncRequest),
}

/// Runs save requests on a background thread that owns a tokio runtime.
///
/// Events come back over a channel. There is no cancellation: dropping the
/// handle abandons whatever is still in flight.
pub struct EngineHandle {
    cmd_tx: mpsc::Sender<EngineCommand>,
    event_rx: mpsc::Receiver<EngineEvent>,
}

impl EngineHandle {
    pub fn new(store: Arc<dyn MediaStore>, uploader: Arc<dyn Uploader>) -> Self {
        let (cmd_tx, cmd_rx) = mpsc::channel();
        let (event_tx, event_rx) = mpsc::channel();

        thread::spawn(move || {
            let runtime = match tokio::runtime::Runtime::new() {
                Ok(runtime) => runtime,
                Err(err) => {
                    listing_error!("failed to start engine runtime: {err}");
                    return;
                }
            };
            while let Ok(command) = cmd_rx.recv() {
                let store = store.clone();
                let uploader = uploader.clone();
                let event_tx = event_tx.clone();
                runtime.spawn(async move {
                    handle_command(store.as_ref(), uploader.as_ref(), command, event_tx).await;
                });
            }
        });

        Self { cmd_tx, event_rx }
    }

    pub fn submit(&self, request: SyncRequest) {
        let _ = self.cmd_tx.send(EngineCommand::Sync(request));
    }

    pub fn try_recv(&self) -> Option<EngineEvent> {
        self.event_rx.try_recv().ok()
    }

    pub fn recv_timeout(&self, timeout: Duration) -> Option<EngineEvent> {
        self.event_rx.recv_timeout(timeout).ok()
    }
}

async fn handle_command(
    store: &dyn MediaStore,
    uploader: &dyn Uploader,
    command: EngineCommand,
    event_tx: mpsc::Sender<EngineEvent>,
) {
    match command {
        EngineCommand::Sync(request) => {
            let request_id = request.request_id;
            let sink = ChannelProgressSink::new(event_tx.clone());
            let report = sync_media(store, uploader, request, &sink).await;
            let _ = event_tx.send(EngineEvent::SyncCompleted { request_id, report });
        }
    }
}
