use crate::{MediaId, PendingFile, PriorityAssignment};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    /// Renumbered priorities for stored media, in display order.
    PersistPriorities { assignments: Vec<PriorityAssignment> },
    /// Pending files in their new display order.
    PendingFilesReordered { files: Vec<PendingFile> },
    /// A stored item was marked for deletion; the caller issues the request.
    RemovalRequested { media_id: MediaId },
    UpdateDescription { media_id: MediaId, description: String },
}
