//! Listing core: pure media-board state machine, view-model helpers and
//! property domain types.
mod analytics;
mod effect;
mod listing;
mod media;
mod msg;
mod state;
mod update;
mod view_model;

pub use analytics::{DashboardStats, TopProperty, TOP_PROPERTIES};
pub use effect::Effect;
pub use listing::{
    Amenity, CustomField, FieldType, FieldValue, FormError, Property, PropertyDraft,
    PropertyPatch, PropertyStatus, PropertyType,
};
pub use media::{
    FileHandle, ItemId, MediaId, MediaKind, Origin, PendingFile, PersistedMediaItem,
    PriorityAssignment, SelectedFile, UnifiedItem,
};
pub use msg::Msg;
pub use state::{BoardPhase, MediaBoard, DEFAULT_MAX_FILES};
pub use update::update;
pub use view_model::{AddStats, BoardViewModel, MediaRowView};
