use std::fmt;
use std::path::PathBuf;

/// Local key for a file selected during an editing session. Never reused
/// within one board.
pub type FileHandle = u64;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum MediaKind {
    Image,
    Video,
    Document,
}

impl MediaKind {
    pub fn from_mime(mime: &str) -> Self {
        let mime = mime.trim().to_ascii_lowercase();
        if mime.starts_with("image/") {
            MediaKind::Image
        } else if mime.starts_with("video/") {
            MediaKind::Video
        } else {
            MediaKind::Document
        }
    }

    /// Object-storage bucket hint sent alongside an upload.
    pub fn bucket(self) -> &'static str {
        match self {
            MediaKind::Image => "images",
            MediaKind::Video => "videos",
            MediaKind::Document => "documents",
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            MediaKind::Image => "image",
            MediaKind::Video => "video",
            MediaKind::Document => "document",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim() {
            "image" => Some(MediaKind::Image),
            "video" => Some(MediaKind::Video),
            "document" => Some(MediaKind::Document),
            _ => None,
        }
    }
}

impl fmt::Display for MediaKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MediaId(pub String);

impl MediaId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for MediaId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A media record already stored for a property.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PersistedMediaItem {
    pub id: MediaId,
    pub kind: MediaKind,
    pub url: String,
    pub filename: String,
    pub file_size: Option<u64>,
    pub mime_type: Option<String>,
    /// Lower sorts first. Missing values sort as 0.
    pub priority: Option<i64>,
    pub created_at_ms: i64,
    pub description: Option<String>,
}

impl PersistedMediaItem {
    pub fn effective_priority(&self) -> i64 {
        self.priority.unwrap_or(0)
    }
}

/// A file handed over by a picker or drop target, before the board wraps it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectedFile {
    pub path: PathBuf,
    pub filename: String,
    pub size: u64,
    pub mime_type: String,
}

impl SelectedFile {
    pub fn new(
        path: impl Into<PathBuf>,
        filename: impl Into<String>,
        size: u64,
        mime_type: impl Into<String>,
    ) -> Self {
        Self {
            path: path.into(),
            filename: filename.into(),
            size,
            mime_type: mime_type.into(),
        }
    }
}

/// A selected local file waiting to be uploaded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingFile {
    pub handle: FileHandle,
    pub path: PathBuf,
    pub filename: String,
    pub size: u64,
    pub mime_type: String,
    pub kind: MediaKind,
    pub preview: String,
    pub description: String,
}

impl PendingFile {
    pub(crate) fn wrap(handle: FileHandle, file: SelectedFile) -> Self {
        let kind = MediaKind::from_mime(&file.mime_type);
        let preview = format!("preview://{handle}/{}", file.filename);
        Self {
            handle,
            path: file.path,
            filename: file.filename,
            size: file.size,
            mime_type: file.mime_type,
            kind,
            preview,
            description: String::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ItemId {
    Existing(MediaId),
    Pending(FileHandle),
}

impl ItemId {
    pub fn existing(id: impl Into<String>) -> Self {
        ItemId::Existing(MediaId::new(id))
    }
}

impl fmt::Display for ItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ItemId::Existing(id) => write!(f, "existing-{id}"),
            ItemId::Pending(handle) => write!(f, "new-{handle}"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Origin {
    Existing,
    New,
}

/// One entry of the unified list. `order` always equals the entry's index.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnifiedItem {
    pub id: ItemId,
    pub order: usize,
}

impl UnifiedItem {
    pub fn origin(&self) -> Origin {
        match self.id {
            ItemId::Existing(_) => Origin::Existing,
            ItemId::Pending(_) => Origin::New,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PriorityAssignment {
    pub media_id: MediaId,
    pub priority: u32,
}

impl PriorityAssignment {
    pub fn new(media_id: impl Into<String>, priority: u32) -> Self {
        Self {
            media_id: MediaId::new(media_id),
            priority,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kind_and_bucket_follow_mime_prefix() {
        assert_eq!(MediaKind::from_mime("image/png"), MediaKind::Image);
        assert_eq!(MediaKind::from_mime("VIDEO/mp4"), MediaKind::Video);
        assert_eq!(MediaKind::from_mime("application/pdf"), MediaKind::Document);
        assert_eq!(MediaKind::from_mime(""), MediaKind::Document);
        assert_eq!(MediaKind::Video.bucket(), "videos");
        assert_eq!(MediaKind::Document.bucket(), "documents");
    }

    #[test]
    fn pending_file_gets_preview_and_kind() {
        let file = PendingFile::wrap(3, SelectedFile::new("/tmp/a.jpg", "a.jpg", 10, "image/jpeg"));
        assert_eq!(file.kind, MediaKind::Image);
        assert_eq!(file.preview, "preview://3/a.jpg");
        assert!(file.description.is_empty());
    }
}
