use crate::{BoardPhase, ItemId, MediaId, MediaKind, Origin};

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct AddStats {
    pub accepted: usize,
    pub dropped: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct BoardViewModel {
    pub phase: BoardPhase,
    pub rows: Vec<MediaRowView>,
    pub max_files: usize,
    pub last_add_stats: Option<AddStats>,
    pub removed: Vec<MediaId>,
    pub dirty: bool,
}

impl BoardViewModel {
    /// Badge text such as `3/10 files`, counting files not yet uploaded.
    pub fn count_label(&self) -> String {
        format!("{}/{} files", self.new_file_count(), self.max_files)
    }

    pub fn can_add_files(&self) -> bool {
        self.new_file_count() < self.max_files
    }

    pub fn new_file_count(&self) -> usize {
        self.rows.iter().filter(|row| row.origin == Origin::New).count()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MediaRowView {
    pub id: ItemId,
    pub order: usize,
    pub origin: Origin,
    pub kind: MediaKind,
    pub filename: String,
    /// Stored URL for existing media, preview reference for new files.
    pub source: String,
    pub description: String,
    pub size: Option<u64>,
    pub upload_error: Option<String>,
}
