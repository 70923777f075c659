use std::fmt;

use listing_core::{
    FileHandle, MediaBoard, MediaId, MediaKind, Msg, PendingFile, PersistedMediaItem,
    PriorityAssignment,
};

pub type RequestId = u64;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncStage {
    Removing,
    Describing,
    Reordering,
    Uploading,
    Registering,
    Done,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncProgress {
    pub request_id: RequestId,
    pub stage: SyncStage,
    pub file: Option<FileHandle>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EngineEvent {
    Progress(SyncProgress),
    SyncCompleted {
        request_id: RequestId,
        report: SyncReport,
    },
}

/// What the upload endpoint returns for a stored file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadReceipt {
    pub path: String,
    pub url: String,
    pub filename: String,
    pub size: u64,
    pub mime_type: String,
}

/// A media record to register after its file was uploaded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewMedia {
    pub property_id: String,
    pub kind: MediaKind,
    pub filename: String,
    pub url: String,
    pub file_size: Option<u64>,
    pub mime_type: Option<String>,
    pub description: Option<String>,
    pub priority: i64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadError {
    pub kind: FailureKind,
    pub message: String,
}

impl UploadError {
    pub(crate) fn new(kind: FailureKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

impl fmt::Display for UploadError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.message.is_empty() {
            write!(f, "{}", self.kind)
        } else {
            write!(f, "{}: {}", self.kind, self.message)
        }
    }
}

impl std::error::Error for UploadError {}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FailureKind {
    Io,
    TooLarge { max_bytes: u64, actual: u64 },
    UnsupportedType { mime_type: String },
    HttpStatus(u16),
    Timeout,
    Network,
    InvalidResponse,
    Registration,
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FailureKind::Io => write!(f, "could not read file"),
            FailureKind::TooLarge { max_bytes, actual } => {
                write!(f, "file too large (max {max_bytes}, actual {actual})")
            }
            FailureKind::UnsupportedType { mime_type } => {
                write!(f, "file type not supported: {mime_type}")
            }
            FailureKind::HttpStatus(code) => write!(f, "http status {code}"),
            FailureKind::Timeout => write!(f, "timeout"),
            FailureKind::Network => write!(f, "network error"),
            FailureKind::InvalidResponse => write!(f, "invalid upload response"),
            FailureKind::Registration => write!(f, "could not register media"),
        }
    }
}

/// Everything a save needs from an editing session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncRequest {
    pub request_id: RequestId,
    pub property_id: String,
    pub removals: Vec<MediaId>,
    pub descriptions: Vec<(MediaId, String)>,
    /// Empty unless the session reordered stored media.
    pub priorities: Vec<PriorityAssignment>,
    pub uploads: Vec<PendingFile>,
    /// Priority given to the first uploaded file.
    pub first_new_priority: i64,
}

impl SyncRequest {
    pub fn from_board(request_id: RequestId, property_id: impl Into<String>, board: &MediaBoard) -> Self {
        let stored_count = board.priority_assignments().len();
        Self {
            request_id,
            property_id: property_id.into(),
            removals: board.removed_ids(),
            descriptions: board
                .edited_descriptions()
                .iter()
                .map(|(id, text)| (id.clone(), text.clone()))
                .collect(),
            priorities: board.reordered_priorities(),
            uploads: board.pending_files().to_vec(),
            first_new_priority: stored_count as i64,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SyncReport {
    pub removed: Vec<MediaId>,
    pub priorities_submitted: bool,
    pub uploaded: Vec<(FileHandle, PersistedMediaItem)>,
    pub failed: Vec<(FileHandle, UploadError)>,
}

impl SyncReport {
    pub fn is_complete(&self) -> bool {
        self.failed.is_empty()
    }

    /// Board messages that fold the outcome of each file back into the session.
    pub fn into_messages(self) -> Vec<Msg> {
        let uploaded = self
            .uploaded
            .into_iter()
            .map(|(handle, media)| Msg::UploadSucceeded { handle, media });
        let failed = self.failed.into_iter().map(|(handle, err)| Msg::UploadFailed {
            handle,
            reason: err.to_string(),
        });
        uploaded.chain(failed).collect()
    }
}
