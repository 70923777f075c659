use std::collections::{BTreeMap, BTreeSet};

use listing_logging::{listing_debug, listing_warn};

use crate::view_model::{AddStats, BoardViewModel, MediaRowView};
use crate::{
    Effect, FileHandle, ItemId, MediaId, Origin, PendingFile, PersistedMediaItem,
    PriorityAssignment, SelectedFile, UnifiedItem,
};

pub const DEFAULT_MAX_FILES: usize = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BoardPhase {
    #[default]
    Idle,
    Dragging,
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct DragState {
    item: ItemId,
    snapshot: Vec<ItemId>,
}

/// Unified media list for one property editing session.
///
/// Merges stored media and freshly selected files into a single ordered list
/// and turns reorders into priority assignments. Nothing here performs IO.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MediaBoard {
    max_files: usize,
    existing: Vec<PersistedMediaItem>,
    pending: Vec<PendingFile>,
    items: Vec<UnifiedItem>,
    removed: BTreeSet<MediaId>,
    priority_overrides: BTreeMap<MediaId, u32>,
    edited_descriptions: BTreeMap<MediaId, String>,
    upload_errors: BTreeMap<FileHandle, String>,
    drag: Option<DragState>,
    deferred_existing: Option<Vec<PersistedMediaItem>>,
    next_handle: FileHandle,
    last_add_stats: Option<AddStats>,
    dirty: bool,
}

impl Default for MediaBoard {
    fn default() -> Self {
        Self::with_max_files(DEFAULT_MAX_FILES)
    }
}

impl MediaBoard {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_max_files(max_files: usize) -> Self {
        Self {
            max_files,
            existing: Vec::new(),
            pending: Vec::new(),
            items: Vec::new(),
            removed: BTreeSet::new(),
            priority_overrides: BTreeMap::new(),
            edited_descriptions: BTreeMap::new(),
            upload_errors: BTreeMap::new(),
            drag: None,
            deferred_existing: None,
            next_handle: 1,
            last_add_stats: None,
            dirty: false,
        }
    }

    pub fn phase(&self) -> BoardPhase {
        if self.drag.is_some() {
            BoardPhase::Dragging
        } else {
            BoardPhase::Idle
        }
    }

    pub fn max_files(&self) -> usize {
        self.max_files
    }

    pub fn items(&self) -> &[UnifiedItem] {
        &self.items
    }

    pub fn item_ids(&self) -> Vec<ItemId> {
        self.items.iter().map(|item| item.id.clone()).collect()
    }

    pub fn pending_files(&self) -> &[PendingFile] {
        &self.pending
    }

    pub fn existing_items(&self) -> &[PersistedMediaItem] {
        &self.existing
    }

    pub fn removed_ids(&self) -> Vec<MediaId> {
        self.removed.iter().cloned().collect()
    }

    /// Descriptions edited on stored media during this session.
    pub fn edited_descriptions(&self) -> &BTreeMap<MediaId, String> {
        &self.edited_descriptions
    }

    /// Position of a pending file within the pending array.
    pub fn pending_index(&self, handle: FileHandle) -> Option<usize> {
        self.pending.iter().position(|file| file.handle == handle)
    }

    /// Stored media in display order, numbered by position among stored media only.
    pub fn priority_assignments(&self) -> Vec<PriorityAssignment> {
        self.items
            .iter()
            .filter_map(|item| match &item.id {
                ItemId::Existing(id) => Some(id.clone()),
                ItemId::Pending(_) => None,
            })
            .enumerate()
            .map(|(index, media_id)| PriorityAssignment {
                media_id,
                priority: index as u32,
            })
            .collect()
    }

    /// Current assignments if stored media were reordered this session, else empty.
    pub fn reordered_priorities(&self) -> Vec<PriorityAssignment> {
        if self.priority_overrides.is_empty() {
            Vec::new()
        } else {
            self.priority_assignments()
        }
    }

    /// Replaces both sources and rebuilds the list. Removals stay in effect.
    pub fn initialize(&mut self, existing: Vec<PersistedMediaItem>, pending: Vec<PendingFile>) {
        if self.drag.take().is_some() {
            listing_debug!("initialize dropped an unfinished drag");
        }
        self.deferred_existing = None;
        let highest = pending.iter().map(|file| file.handle).max().unwrap_or(0);
        self.next_handle = self.next_handle.max(highest + 1);
        self.existing = existing;
        self.pending = pending;
        self.upload_errors
            .retain(|handle, _| self.pending.iter().any(|file| file.handle == *handle));
        self.rebuild();
    }

    /// Accepts a fresh stored-media list. Deferred while a drag is in progress.
    pub fn replace_existing(&mut self, existing: Vec<PersistedMediaItem>) {
        if self.drag.is_some() {
            listing_debug!("deferring source refresh of {} items until drag ends", existing.len());
            self.deferred_existing = Some(existing);
            return;
        }
        self.existing = existing;
        self.rebuild();
    }

    /// Appends files up to the remaining capacity; the surplus is dropped.
    /// `max_files` caps the files waiting for upload, not stored media.
    pub fn add_files(&mut self, files: Vec<SelectedFile>) -> AddStats {
        if self.drag.is_some() {
            listing_debug!("ignoring {} selected files while dragging", files.len());
            return AddStats {
                accepted: 0,
                dropped: files.len(),
            };
        }
        let capacity = self.max_files.saturating_sub(self.pending.len());
        let offered = files.len();
        let mut accepted = 0;
        for file in files.into_iter().take(capacity) {
            let handle = self.next_handle;
            self.next_handle += 1;
            self.pending.push(PendingFile::wrap(handle, file));
            self.items.push(UnifiedItem {
                id: ItemId::Pending(handle),
                order: self.items.len(),
            });
            accepted += 1;
        }
        let stats = AddStats {
            accepted,
            dropped: offered - accepted,
        };
        if stats.dropped > 0 {
            listing_warn!(
                "media limit {} reached: accepted {} of {} selected files",
                self.max_files,
                stats.accepted,
                offered
            );
        }
        self.last_add_stats = Some(stats.clone());
        self.dirty = true;
        stats
    }

    pub fn remove(&mut self, id: &ItemId) -> Option<Effect> {
        if self.drag.is_some() {
            listing_debug!("ignoring removal of {id} while dragging");
            return None;
        }
        let position = self.items.iter().position(|item| &item.id == id)?;
        self.items.remove(position);
        self.renumber();
        self.dirty = true;
        match id {
            ItemId::Existing(media_id) => {
                self.removed.insert(media_id.clone());
                self.priority_overrides.remove(media_id);
                self.edited_descriptions.remove(media_id);
                Some(Effect::RemovalRequested {
                    media_id: media_id.clone(),
                })
            }
            ItemId::Pending(handle) => {
                self.pending.retain(|file| file.handle != *handle);
                self.upload_errors.remove(handle);
                None
            }
        }
    }

    pub fn edit_description(&mut self, id: &ItemId, description: String) -> Option<Effect> {
        match id {
            ItemId::Existing(media_id) => {
                if !self.items.iter().any(|item| &item.id == id) {
                    return None;
                }
                self.edited_descriptions
                    .insert(media_id.clone(), description.clone());
                self.dirty = true;
                Some(Effect::UpdateDescription {
                    media_id: media_id.clone(),
                    description,
                })
            }
            ItemId::Pending(handle) => {
                let file = self.pending.iter_mut().find(|file| file.handle == *handle)?;
                file.description = description;
                self.dirty = true;
                None
            }
        }
    }

    /// One-shot drag outcome. Emits the derived orders when the list changed.
    pub fn reorder(&mut self, item: &ItemId, before: Option<&ItemId>) -> Vec<Effect> {
        if self.drag.is_some() {
            listing_debug!("ignoring reorder of {item} while dragging");
            return Vec::new();
        }
        if self.move_item(item, before) {
            self.commit_order()
        } else {
            Vec::new()
        }
    }

    pub fn begin_drag(&mut self, item: &ItemId) -> bool {
        if self.drag.is_some() || !self.items.iter().any(|entry| &entry.id == item) {
            return false;
        }
        self.drag = Some(DragState {
            item: item.clone(),
            snapshot: self.item_ids(),
        });
        self.dirty = true;
        true
    }

    pub fn drag_over(&mut self, item: &ItemId, before: Option<&ItemId>) {
        let dragging = matches!(&self.drag, Some(drag) if &drag.item == item);
        if dragging {
            self.move_item(item, before);
        }
    }

    pub fn end_drag(&mut self) -> Vec<Effect> {
        let Some(drag) = self.drag.take() else {
            return Vec::new();
        };
        self.dirty = true;
        let effects = if drag.snapshot != self.item_ids() {
            self.commit_order()
        } else {
            Vec::new()
        };
        self.apply_deferred();
        effects
    }

    pub fn cancel_drag(&mut self) {
        let Some(drag) = self.drag.take() else {
            return;
        };
        let mut restored = Vec::with_capacity(drag.snapshot.len());
        for id in drag.snapshot {
            if self.items.iter().any(|item| item.id == id) {
                restored.push(UnifiedItem { id, order: 0 });
            }
        }
        self.items = restored;
        self.renumber();
        self.dirty = true;
        self.apply_deferred();
    }

    /// Swaps an uploaded pending file for its stored record, keeping its position.
    pub fn upload_succeeded(&mut self, handle: FileHandle, media: PersistedMediaItem) {
        let Some(index) = self.pending_index(handle) else {
            listing_debug!("upload result for unknown file {handle}");
            return;
        };
        self.pending.remove(index);
        self.upload_errors.remove(&handle);
        let old_id = ItemId::Pending(handle);
        let new_id = ItemId::Existing(media.id.clone());
        for item in self.items.iter_mut().filter(|item| item.id == old_id) {
            item.id = new_id.clone();
        }
        if let Some(drag) = self.drag.as_mut() {
            for id in drag.snapshot.iter_mut().filter(|id| **id == old_id) {
                *id = new_id.clone();
            }
            if drag.item == old_id {
                drag.item = new_id.clone();
            }
        }
        self.existing.push(media);
        self.dirty = true;
    }

    pub fn upload_failed(&mut self, handle: FileHandle, reason: String) {
        if self.pending_index(handle).is_none() {
            return;
        }
        listing_warn!("upload of file {handle} failed, kept for retry: {reason}");
        self.upload_errors.insert(handle, reason);
        self.dirty = true;
    }

    pub fn view(&self) -> BoardViewModel {
        let rows = self
            .items
            .iter()
            .filter_map(|item| self.row_view(item))
            .collect();
        BoardViewModel {
            phase: self.phase(),
            rows,
            max_files: self.max_files,
            last_add_stats: self.last_add_stats.clone(),
            removed: self.removed_ids(),
            dirty: self.dirty,
        }
    }

    pub fn consume_dirty(&mut self) -> bool {
        std::mem::take(&mut self.dirty)
    }

    fn row_view(&self, item: &UnifiedItem) -> Option<MediaRowView> {
        match &item.id {
            ItemId::Existing(media_id) => {
                let media = self.existing.iter().find(|media| &media.id == media_id)?;
                let description = self
                    .edited_descriptions
                    .get(media_id)
                    .cloned()
                    .or_else(|| media.description.clone())
                    .unwrap_or_default();
                Some(MediaRowView {
                    id: item.id.clone(),
                    order: item.order,
                    origin: Origin::Existing,
                    kind: media.kind,
                    filename: media.filename.clone(),
                    source: media.url.clone(),
                    description,
                    size: media.file_size,
                    upload_error: None,
                })
            }
            ItemId::Pending(handle) => {
                let file = self.pending.iter().find(|file| file.handle == *handle)?;
                Some(MediaRowView {
                    id: item.id.clone(),
                    order: item.order,
                    origin: Origin::New,
                    kind: file.kind,
                    filename: file.filename.clone(),
                    source: file.preview.clone(),
                    description: file.description.clone(),
                    size: Some(file.size),
                    upload_error: self.upload_errors.get(handle).cloned(),
                })
            }
        }
    }

    fn rebuild(&mut self) {
        let mut visible: Vec<&PersistedMediaItem> = self
            .existing
            .iter()
            .filter(|media| !self.removed.contains(&media.id))
            .collect();
        // Stable: equal priorities keep the order the source returned.
        visible.sort_by_key(|media| {
            self.priority_overrides
                .get(&media.id)
                .map(|priority| i64::from(*priority))
                .unwrap_or_else(|| media.effective_priority())
        });
        let mut items: Vec<UnifiedItem> = visible
            .into_iter()
            .map(|media| UnifiedItem {
                id: ItemId::Existing(media.id.clone()),
                order: 0,
            })
            .collect();
        items.extend(self.pending.iter().map(|file| UnifiedItem {
            id: ItemId::Pending(file.handle),
            order: 0,
        }));
        self.items = items;
        self.renumber();
        self.dirty = true;
    }

    fn apply_deferred(&mut self) {
        if let Some(existing) = self.deferred_existing.take() {
            self.existing = existing;
            self.rebuild();
        }
    }

    /// Moves `item` in front of `before` (or to the end). Returns whether the
    /// order changed.
    fn move_item(&mut self, item: &ItemId, before: Option<&ItemId>) -> bool {
        if before == Some(item) {
            return false;
        }
        let Some(from) = self.items.iter().position(|entry| &entry.id == item) else {
            return false;
        };
        if let Some(target) = before {
            if !self.items.iter().any(|entry| &entry.id == target) {
                return false;
            }
        }
        let previous = self.item_ids();
        let entry = self.items.remove(from);
        let to = match before {
            Some(target) => self
                .items
                .iter()
                .position(|other| &other.id == target)
                .unwrap_or(self.items.len()),
            None => self.items.len(),
        };
        self.items.insert(to, entry);
        self.renumber();
        let changed = previous != self.item_ids();
        if changed {
            self.dirty = true;
        }
        changed
    }

    fn commit_order(&mut self) -> Vec<Effect> {
        let assignments = self.priority_assignments();
        for assignment in &assignments {
            self.priority_overrides
                .insert(assignment.media_id.clone(), assignment.priority);
        }

        let mut reordered = Vec::with_capacity(self.pending.len());
        for item in &self.items {
            if let ItemId::Pending(handle) = item.id {
                if let Some(index) = self.pending.iter().position(|file| file.handle == handle) {
                    reordered.push(self.pending.swap_remove(index));
                }
            }
        }
        self.pending = reordered;

        listing_debug!(
            "committed order: {} stored, {} pending",
            assignments.len(),
            self.pending.len()
        );
        vec![
            Effect::PersistPriorities { assignments },
            Effect::PendingFilesReordered {
                files: self.pending.clone(),
            },
        ]
    }

    fn renumber(&mut self) {
        for (index, item) in self.items.iter_mut().enumerate() {
            item.order = index;
        }
    }
}
