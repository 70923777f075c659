#![allow(dead_code)]

use std::path::Path;
use std::sync::{Arc, Mutex, Once};

use listing_core::{
    FileHandle, MediaId, MediaKind, PendingFile, PersistedMediaItem, PriorityAssignment,
};
use listing_engine::{
    EngineEvent, FailureKind, MediaStore, NewMedia, ProgressSink, StoreError, UploadError,
    UploadReceipt, Uploader,
};

pub fn init_logging() {
    static INIT: Once = Once::new();
    INIT.call_once(listing_logging::initialize_for_tests);
}

pub fn stored(id: &str, priority: i64) -> PersistedMediaItem {
    PersistedMediaItem {
        id: MediaId::new(id),
        kind: MediaKind::Image,
        url: format!("https://cdn.example.com/images/{id}.jpg"),
        filename: format!("{id}.jpg"),
        file_size: Some(1024),
        mime_type: Some("image/jpeg".to_string()),
        priority: Some(priority),
        created_at_ms: 1_700_000_000_000,
        description: None,
    }
}

pub fn pending(handle: FileHandle, path: &Path, mime_type: &str) -> PendingFile {
    let filename = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default();
    PendingFile {
        handle,
        path: path.to_path_buf(),
        filename: filename.clone(),
        size: std::fs::metadata(path).map(|meta| meta.len()).unwrap_or(0),
        mime_type: mime_type.to_string(),
        kind: MediaKind::from_mime(mime_type),
        preview: format!("preview://{handle}/{filename}"),
        description: String::new(),
    }
}

/// In-memory store that records every call in order.
#[derive(Default)]
pub struct FakeStore {
    pub calls: Mutex<Vec<String>>,
    pub items: Mutex<Vec<PersistedMediaItem>>,
    pub fail_reorder: bool,
    pub fail_register: Vec<String>,
}

impl FakeStore {
    pub fn with_items(items: Vec<PersistedMediaItem>) -> Self {
        Self {
            items: Mutex::new(items),
            ..Self::default()
        }
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    fn record(&self, call: String) {
        self.calls.lock().unwrap().push(call);
    }
}

#[async_trait::async_trait]
impl MediaStore for FakeStore {
    async fn list_media(&self, property_id: &str) -> Result<Vec<PersistedMediaItem>, StoreError> {
        self.record(format!("list {property_id}"));
        Ok(self.items.lock().unwrap().clone())
    }

    async fn reorder_priorities(
        &self,
        property_id: &str,
        order: &[PriorityAssignment],
    ) -> Result<(), StoreError> {
        let listed: Vec<String> = order
            .iter()
            .map(|a| format!("{}={}", a.media_id, a.priority))
            .collect();
        self.record(format!("reorder {property_id} {}", listed.join(",")));
        if self.fail_reorder {
            return Err(StoreError::Backend("reorder rejected".to_string()));
        }
        let mut items = self.items.lock().unwrap();
        for assignment in order {
            if let Some(item) = items.iter_mut().find(|item| item.id == assignment.media_id) {
                item.priority = Some(i64::from(assignment.priority));
            }
        }
        Ok(())
    }

    async fn remove_media(&self, media_id: &MediaId) -> Result<(), StoreError> {
        self.record(format!("remove {media_id}"));
        self.items.lock().unwrap().retain(|item| &item.id != media_id);
        Ok(())
    }

    async fn add_media(&self, media: NewMedia) -> Result<PersistedMediaItem, StoreError> {
        self.record(format!("add {} priority={}", media.filename, media.priority));
        if self.fail_register.contains(&media.filename) {
            return Err(StoreError::Backend("insert failed".to_string()));
        }
        let mut items = self.items.lock().unwrap();
        let item = PersistedMediaItem {
            id: MediaId::new(format!("media_{}", items.len() + 100)),
            kind: media.kind,
            url: media.url,
            filename: media.filename,
            file_size: media.file_size,
            mime_type: media.mime_type,
            priority: Some(media.priority),
            created_at_ms: 1_700_000_000_000,
            description: media.description,
        };
        items.push(item.clone());
        Ok(item)
    }

    async fn update_description(
        &self,
        media_id: &MediaId,
        description: &str,
    ) -> Result<(), StoreError> {
        self.record(format!("describe {media_id} {description}"));
        let mut items = self.items.lock().unwrap();
        match items.iter_mut().find(|item| &item.id == media_id) {
            Some(item) => {
                item.description = Some(description.to_string());
                Ok(())
            }
            None => Err(StoreError::MediaNotFound(media_id.clone())),
        }
    }
}

/// Uploader that succeeds for every file except the named ones.
#[derive(Default)]
pub struct FakeUploader {
    pub failing: Vec<String>,
    pub uploaded: Mutex<Vec<String>>,
}

impl FakeUploader {
    pub fn failing(names: &[&str]) -> Self {
        Self {
            failing: names.iter().map(|name| name.to_string()).collect(),
            ..Self::default()
        }
    }
}

#[async_trait::async_trait]
impl Uploader for FakeUploader {
    async fn upload(&self, file: &PendingFile) -> Result<UploadReceipt, UploadError> {
        self.uploaded.lock().unwrap().push(file.filename.clone());
        if self.failing.contains(&file.filename) {
            return Err(UploadError {
                kind: FailureKind::HttpStatus(500),
                message: "Upload failed".to_string(),
            });
        }
        let bucket = file.kind.bucket();
        Ok(UploadReceipt {
            path: format!("{bucket}/{}", file.filename),
            url: format!("https://cdn.example.com/{bucket}/{}", file.filename),
            filename: file.filename.clone(),
            size: file.size,
            mime_type: file.mime_type.clone(),
        })
    }
}

#[derive(Default)]
pub struct TestSink {
    events: Arc<Mutex<Vec<EngineEvent>>>,
}

impl TestSink {
    pub fn take(&self) -> Vec<EngineEvent> {
        self.events.lock().unwrap().drain(..).collect()
    }
}

impl ProgressSink for TestSink {
    fn emit(&self, event: EngineEvent) {
        self.events.lock().unwrap().push(event);
    }
}
