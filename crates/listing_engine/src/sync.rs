use listing_logging::{listing_error, listing_info, listing_warn};

use crate::{
    EngineEvent, FailureKind, MediaStore, NewMedia, SyncProgress, SyncReport, SyncRequest,
    SyncStage, UploadError, Uploader,
};

pub trait ProgressSink: Send + Sync {
    fn emit(&self, event: EngineEvent);
}

pub struct ChannelProgressSink {
    tx: std::sync::mpsc::Sender<EngineEvent>,
}

impl ChannelProgressSink {
    pub fn new(tx: std::sync::mpsc::Sender<EngineEvent>) -> Self {
        Self { tx }
    }
}

impl ProgressSink for ChannelProgressSink {
    fn emit(&self, event: EngineEvent) {
        let _ = self.tx.send(event);
    }
}

/// Sink that drops every event.
pub struct NullProgressSink;

impl ProgressSink for NullProgressSink {
    fn emit(&self, _event: EngineEvent) {}
}

/// Saves an editing session: removals, description edits, the priority
/// order, then one upload per pending file.
///
/// Nothing here is transactional. A failed step is logged and the remaining
/// steps still run; a failed upload leaves its file in `report.failed`.
pub async fn sync_media(
    store: &dyn MediaStore,
    uploader: &dyn Uploader,
    request: SyncRequest,
    sink: &dyn ProgressSink,
) -> SyncReport {
    let request_id = request.request_id;
    let progress = |stage: SyncStage, file| {
        sink.emit(EngineEvent::Progress(SyncProgress {
            request_id,
            stage,
            file,
        }));
    };
    let mut report = SyncReport::default();

    if !request.removals.is_empty() {
        progress(SyncStage::Removing, None);
    }
    for media_id in &request.removals {
        match store.remove_media(media_id).await {
            Ok(()) => report.removed.push(media_id.clone()),
            Err(err) => listing_error!("failed to remove media {media_id}: {err}"),
        }
    }

    if !request.descriptions.is_empty() {
        progress(SyncStage::Describing, None);
    }
    for (media_id, description) in &request.descriptions {
        if request.removals.contains(media_id) {
            continue;
        }
        if let Err(err) = store.update_description(media_id, description).await {
            listing_error!("failed to update description of {media_id}: {err}");
        }
    }

    let priorities: Vec<_> = request
        .priorities
        .iter()
        .filter(|assignment| !request.removals.contains(&assignment.media_id))
        .cloned()
        .collect();
    if !priorities.is_empty() {
        progress(SyncStage::Reordering, None);
        match store
            .reorder_priorities(&request.property_id, &priorities)
            .await
        {
            Ok(()) => report.priorities_submitted = true,
            // The reordered list stays on screen; there is no rollback.
            Err(err) => listing_error!("error updating media priorities: {err}"),
        }
    }

    for (index, file) in request.uploads.iter().enumerate() {
        progress(SyncStage::Uploading, Some(file.handle));
        let receipt = match uploader.upload(file).await {
            Ok(receipt) => receipt,
            Err(err) => {
                listing_warn!("error uploading file {}: {err}", file.filename);
                report.failed.push((file.handle, err));
                continue;
            }
        };

        progress(SyncStage::Registering, Some(file.handle));
        let description = Some(file.description.clone()).filter(|text| !text.is_empty());
        let media = NewMedia {
            property_id: request.property_id.clone(),
            kind: file.kind,
            filename: file.filename.clone(),
            url: receipt.url,
            file_size: Some(file.size),
            mime_type: Some(file.mime_type.clone()),
            description,
            priority: request.first_new_priority + index as i64,
        };
        match store.add_media(media).await {
            Ok(stored) => report.uploaded.push((file.handle, stored)),
            Err(err) => {
                listing_warn!("uploaded {} but could not register it: {err}", file.filename);
                report.failed.push((
                    file.handle,
                    UploadError::new(FailureKind::Registration, err.to_string()),
                ));
            }
        }
    }

    progress(SyncStage::Done, None);
    listing_info!(
        "sync {} for property {}: removed {}, uploaded {}, failed {}",
        request_id,
        request.property_id,
        report.removed.len(),
        report.uploaded.len(),
        report.failed.len()
    );
    report
}
