use crate::{Effect, MediaBoard, Msg};

/// Pure update function: applies a message to the board and returns any effects.
pub fn update(mut board: MediaBoard, msg: Msg) -> (MediaBoard, Vec<Effect>) {
    let effects = match msg {
        Msg::Initialize { existing, pending } => {
            board.initialize(existing, pending);
            Vec::new()
        }
        Msg::ExistingChanged(existing) => {
            board.replace_existing(existing);
            Vec::new()
        }
        Msg::FilesSelected(files) => {
            if !files.is_empty() {
                board.add_files(files);
            }
            Vec::new()
        }
        Msg::RemoveClicked(id) => board.remove(&id).into_iter().collect(),
        Msg::DescriptionEdited { item, description } => {
            board.edit_description(&item, description).into_iter().collect()
        }
        Msg::Reorder { item, before } => board.reorder(&item, before.as_ref()),
        Msg::DragStarted(item) => {
            board.begin_drag(&item);
            Vec::new()
        }
        Msg::DragOver { item, before } => {
            board.drag_over(&item, before.as_ref());
            Vec::new()
        }
        Msg::DragEnded => board.end_drag(),
        Msg::DragCancelled => {
            board.cancel_drag();
            Vec::new()
        }
        Msg::UploadSucceeded { handle, media } => {
            board.upload_succeeded(handle, media);
            Vec::new()
        }
        Msg::UploadFailed { handle, reason } => {
            board.upload_failed(handle, reason);
            Vec::new()
        }
        Msg::NoOp => Vec::new(),
    };

    (board, effects)
}
