use crate::{FileHandle, ItemId, PendingFile, PersistedMediaItem, SelectedFile};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Msg {
    /// Start of an editing session: stored media plus files carried over from a form.
    Initialize {
        existing: Vec<PersistedMediaItem>,
        pending: Vec<PendingFile>,
    },
    /// Reactive query delivered a fresh list of stored media.
    ExistingChanged(Vec<PersistedMediaItem>),
    /// User picked or dropped local files.
    FilesSelected(Vec<SelectedFile>),
    /// User clicked the remove button on a card.
    RemoveClicked(ItemId),
    /// User edited the description of a card.
    DescriptionEdited { item: ItemId, description: String },
    /// Drag-and-drop outcome in one step: move `item` in front of `before`
    /// (`None` moves it to the end).
    Reorder { item: ItemId, before: Option<ItemId> },
    /// Pointer grabbed a card.
    DragStarted(ItemId),
    /// Dragged card hovers in front of `before`.
    DragOver { item: ItemId, before: Option<ItemId> },
    /// Pointer released: commit the order.
    DragEnded,
    /// Drag aborted (escape, dropped outside).
    DragCancelled,
    /// Upload and registration of a pending file finished.
    UploadSucceeded {
        handle: FileHandle,
        media: PersistedMediaItem,
    },
    /// Upload of a pending file failed; the file stays for retry.
    UploadFailed { handle: FileHandle, reason: String },
    /// Fallback for placeholder wiring.
    NoOp,
}
