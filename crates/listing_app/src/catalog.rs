//! Local RON catalog of properties and their media.
//!
//! Stands in for the hosted document store: the binary reads and writes
//! `.listing_catalog.ron` in the catalog directory, and every mutation is
//! flushed to disk through an atomic write.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};

use listing_core::{
    Amenity, CustomField, FieldType, FieldValue, FormError, MediaId, MediaKind,
    PersistedMediaItem, PriorityAssignment, Property, PropertyDraft, PropertyPatch,
    PropertyStatus, PropertyType,
};
use listing_engine::{
    write_atomic, ImportOutcome, MediaStore, NewMedia, PersistError, PropertyExport, StoreError,
};
use listing_logging::{listing_debug, listing_info, listing_warn};
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub const CATALOG_FILENAME: &str = ".listing_catalog.ron";

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("cannot read catalog {path:?}: {source}")]
    Read { path: PathBuf, source: io::Error },
    #[error("catalog {path:?} is not valid RON ({message}); fix or move it aside")]
    Corrupt { path: PathBuf, message: String },
    #[error("unknown property {0}")]
    UnknownProperty(String),
    #[error("property {property_id} has no amenity {name}")]
    UnknownAmenity { property_id: String, name: String },
    #[error("{}", join_form_errors(.0))]
    Invalid(Vec<FormError>),
    #[error("{0} name must not be empty")]
    MissingName(&'static str),
    #[error(transparent)]
    Persist(#[from] PersistError),
}

fn join_form_errors(errors: &[FormError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

/// Availability and notes change; icon and color stay.
#[derive(Debug, Clone, Default)]
pub struct AmenityUpdate {
    pub is_available: Option<bool>,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct StoredField {
    name: String,
    value: String,
    field_type: String,
    unit: String,
    icon: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct StoredAmenity {
    name: String,
    is_available: bool,
    icon: String,
    color: String,
    notes: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct StoredProperty {
    id: String,
    title: String,
    description: String,
    price: f64,
    currency: String,
    location: String,
    property_type: String,
    status: String,
    views: u64,
    likes: u64,
    shares: u64,
    notes: u64,
    added_at: String,
    #[serde(default)]
    custom_fields: Vec<StoredField>,
    #[serde(default)]
    amenities: Vec<StoredAmenity>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct StoredMedia {
    id: String,
    property_id: String,
    kind: String,
    url: String,
    filename: String,
    file_size: Option<u64>,
    mime_type: Option<String>,
    priority: Option<i64>,
    created_at_ms: i64,
    description: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
struct CatalogState {
    next_id: u64,
    properties: Vec<StoredProperty>,
    media: Vec<StoredMedia>,
}

impl CatalogState {
    fn allocate_id(&mut self, prefix: &str) -> String {
        self.next_id += 1;
        format!("{prefix}_{}", self.next_id)
    }
}

pub struct Catalog {
    dir: PathBuf,
    state: Mutex<CatalogState>,
}

impl Catalog {
    /// Loads the catalog in `dir`. Only a missing file yields an empty
    /// catalog; a file that cannot be read or parsed is an error and is
    /// never overwritten.
    pub fn load(dir: &Path) -> Result<Self, CatalogError> {
        Ok(Self {
            dir: dir.to_path_buf(),
            state: Mutex::new(read_state(dir)?),
        })
    }

    pub fn properties(&self) -> Vec<Property> {
        self.lock()
            .properties
            .iter()
            .map(to_property)
            .collect()
    }

    /// Stored media of a property, or `None` for an unknown property.
    pub fn media(&self, property_id: &str) -> Option<Vec<PersistedMediaItem>> {
        let state = self.lock();
        state
            .properties
            .iter()
            .any(|p| p.id == property_id)
            .then(|| media_of(&state, property_id))
    }

    /// Everything the CSV export needs for one property.
    pub fn export(&self, property_id: &str) -> Option<PropertyExport> {
        let state = self.lock();
        let stored = state.properties.iter().find(|p| p.id == property_id)?;
        Some(PropertyExport {
            property: to_property(stored),
            custom_fields: stored.custom_fields.iter().map(to_custom_field).collect(),
            amenities: stored.amenities.iter().map(to_amenity).collect(),
            media: media_of(&state, property_id),
        })
    }

    /// Adds a validated import as a new property and returns its id.
    pub fn insert_import(
        &self,
        outcome: &ImportOutcome,
        added_at: &str,
        now_ms: i64,
    ) -> Result<String, CatalogError> {
        outcome.draft.validate().map_err(CatalogError::Invalid)?;
        let mut state = self.lock();
        let id = state.allocate_id("prop");
        let property = outcome.draft.clone().into_property(id.clone(), added_at);
        state.properties.push(StoredProperty {
            custom_fields: outcome.custom_fields.iter().map(from_custom_field).collect(),
            amenities: outcome.amenities.iter().map(from_amenity).collect(),
            ..from_property(&property)
        });
        for (priority, media) in outcome.media.iter().enumerate() {
            let media_id = state.allocate_id("media");
            state.media.push(StoredMedia {
                id: media_id,
                property_id: id.clone(),
                kind: media.kind.as_str().to_string(),
                url: media.url.clone(),
                filename: media.filename.clone(),
                file_size: None,
                mime_type: Some(media.mime_type.clone()).filter(|m| !m.is_empty()),
                priority: Some(priority as i64),
                created_at_ms: now_ms,
                description: Some(media.description.clone()).filter(|d| !d.is_empty()),
            });
        }
        self.flush(&state)?;
        listing_info!(
            "imported property {} with {} media references",
            id,
            outcome.media.len()
        );
        Ok(id)
    }

    /// Creates a property from a form draft; counters start at zero.
    pub fn create_property(
        &self,
        draft: PropertyDraft,
        added_at: &str,
    ) -> Result<String, CatalogError> {
        draft.validate().map_err(CatalogError::Invalid)?;
        let mut state = self.lock();
        let id = state.allocate_id("prop");
        state
            .properties
            .push(from_property(&draft.into_property(id.clone(), added_at)));
        self.flush(&state)?;
        listing_info!("created property {id}");
        Ok(id)
    }

    /// Applies `patch` and re-validates the result before anything is written.
    pub fn update_property(
        &self,
        property_id: &str,
        patch: &PropertyPatch,
    ) -> Result<Property, CatalogError> {
        let mut state = self.lock();
        let stored = property_mut(&mut state, property_id)?;
        let mut property = to_property(stored);
        let draft = patch.apply(property.to_draft());
        draft.validate().map_err(CatalogError::Invalid)?;
        property.apply_draft(draft);
        *stored = StoredProperty {
            custom_fields: std::mem::take(&mut stored.custom_fields),
            amenities: std::mem::take(&mut stored.amenities),
            ..from_property(&property)
        };
        self.flush(&state)?;
        listing_info!("updated property {property_id}");
        Ok(property)
    }

    /// Adds a custom field, or replaces the field with the same name.
    pub fn set_custom_field(
        &self,
        property_id: &str,
        field: &CustomField,
    ) -> Result<(), CatalogError> {
        let name = field.name.trim();
        if name.is_empty() {
            return Err(CatalogError::MissingName("custom field"));
        }
        let field = StoredField {
            name: name.to_string(),
            ..from_custom_field(field)
        };
        let mut state = self.lock();
        let stored = property_mut(&mut state, property_id)?;
        match stored.custom_fields.iter_mut().find(|f| f.name == field.name) {
            Some(existing) => *existing = field,
            None => stored.custom_fields.push(field),
        }
        self.flush(&state)?;
        Ok(())
    }

    /// Returns whether a field with that name existed.
    pub fn remove_custom_field(&self, property_id: &str, name: &str) -> Result<bool, CatalogError> {
        let mut state = self.lock();
        let stored = property_mut(&mut state, property_id)?;
        let before = stored.custom_fields.len();
        stored.custom_fields.retain(|f| f.name != name.trim());
        if stored.custom_fields.len() == before {
            return Ok(false);
        }
        self.flush(&state)?;
        Ok(true)
    }

    /// Adds an amenity, or replaces the amenity with the same name.
    pub fn set_amenity(&self, property_id: &str, amenity: &Amenity) -> Result<(), CatalogError> {
        let name = amenity.name.trim();
        if name.is_empty() {
            return Err(CatalogError::MissingName("amenity"));
        }
        let amenity = StoredAmenity {
            name: name.to_string(),
            ..from_amenity(amenity)
        };
        let mut state = self.lock();
        let stored = property_mut(&mut state, property_id)?;
        match stored.amenities.iter_mut().find(|a| a.name == amenity.name) {
            Some(existing) => *existing = amenity,
            None => stored.amenities.push(amenity),
        }
        self.flush(&state)?;
        Ok(())
    }

    pub fn update_amenity(
        &self,
        property_id: &str,
        name: &str,
        update: &AmenityUpdate,
    ) -> Result<Amenity, CatalogError> {
        let mut state = self.lock();
        let stored = property_mut(&mut state, property_id)?;
        let amenity = stored
            .amenities
            .iter_mut()
            .find(|a| a.name == name.trim())
            .ok_or_else(|| CatalogError::UnknownAmenity {
                property_id: property_id.to_string(),
                name: name.to_string(),
            })?;
        if let Some(is_available) = update.is_available {
            amenity.is_available = is_available;
        }
        if let Some(notes) = &update.notes {
            amenity.notes = notes.clone();
        }
        let updated = to_amenity(amenity);
        self.flush(&state)?;
        Ok(updated)
    }

    /// Returns whether an amenity with that name existed.
    pub fn remove_amenity(&self, property_id: &str, name: &str) -> Result<bool, CatalogError> {
        let mut state = self.lock();
        let stored = property_mut(&mut state, property_id)?;
        let before = stored.amenities.len();
        stored.amenities.retain(|a| a.name != name.trim());
        if stored.amenities.len() == before {
            return Ok(false);
        }
        self.flush(&state)?;
        Ok(true)
    }

    pub fn path(&self) -> PathBuf {
        self.dir.join(CATALOG_FILENAME)
    }

    fn lock(&self) -> MutexGuard<'_, CatalogState> {
        match self.state.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    fn flush(&self, state: &CatalogState) -> Result<(), PersistError> {
        let pretty = ron::ser::PrettyConfig::new();
        let content = ron::ser::to_string_pretty(state, pretty).map_err(|err| {
            PersistError::Io(io::Error::new(io::ErrorKind::InvalidData, err))
        })?;
        write_atomic(&self.dir, CATALOG_FILENAME, content.as_bytes())?;
        listing_debug!("catalog written to {:?}", self.path());
        Ok(())
    }

    fn flush_for_store(&self, state: &CatalogState) -> Result<(), StoreError> {
        self.flush(state)
            .map_err(|err| StoreError::Backend(err.to_string()))
    }
}

#[async_trait::async_trait]
impl MediaStore for Catalog {
    async fn list_media(&self, property_id: &str) -> Result<Vec<PersistedMediaItem>, StoreError> {
        self.media(property_id)
            .ok_or_else(|| StoreError::PropertyNotFound(property_id.to_string()))
    }

    async fn reorder_priorities(
        &self,
        property_id: &str,
        order: &[PriorityAssignment],
    ) -> Result<(), StoreError> {
        let mut state = self.lock();
        for assignment in order {
            if let Some(media) = state
                .media
                .iter_mut()
                .find(|m| m.property_id == property_id && m.id == assignment.media_id.as_str())
            {
                media.priority = Some(i64::from(assignment.priority));
            }
        }
        self.flush_for_store(&state)
    }

    async fn remove_media(&self, media_id: &MediaId) -> Result<(), StoreError> {
        let mut state = self.lock();
        let before = state.media.len();
        state.media.retain(|m| m.id != media_id.as_str());
        if state.media.len() == before {
            return Ok(());
        }
        self.flush_for_store(&state)
    }

    async fn add_media(&self, media: NewMedia) -> Result<PersistedMediaItem, StoreError> {
        let mut state = self.lock();
        if !state.properties.iter().any(|p| p.id == media.property_id) {
            return Err(StoreError::PropertyNotFound(media.property_id));
        }
        let id = state.allocate_id("media");
        let stored = StoredMedia {
            id,
            property_id: media.property_id,
            kind: media.kind.as_str().to_string(),
            url: media.url,
            filename: media.filename,
            file_size: media.file_size,
            mime_type: media.mime_type,
            priority: Some(media.priority),
            created_at_ms: chrono::Utc::now().timestamp_millis(),
            description: media.description,
        };
        let item = to_media(&stored);
        state.media.push(stored);
        self.flush_for_store(&state)?;
        Ok(item)
    }

    async fn update_description(
        &self,
        media_id: &MediaId,
        description: &str,
    ) -> Result<(), StoreError> {
        let mut state = self.lock();
        let media = state
            .media
            .iter_mut()
            .find(|m| m.id == media_id.as_str())
            .ok_or_else(|| StoreError::MediaNotFound(media_id.clone()))?;
        media.description = Some(description.to_string());
        self.flush_for_store(&state)
    }
}

fn read_state(dir: &Path) -> Result<CatalogState, CatalogError> {
    let path = dir.join(CATALOG_FILENAME);
    let content = match fs::read_to_string(&path) {
        Ok(text) => text,
        Err(err) if err.kind() == io::ErrorKind::NotFound => {
            listing_debug!("No catalog at {:?}, starting empty", path);
            return Ok(CatalogState::default());
        }
        Err(source) => {
            listing_warn!("Failed to read catalog from {:?}: {}", path, source);
            return Err(CatalogError::Read { path, source });
        }
    };
    match ron::from_str(&content) {
        Ok(state) => {
            listing_info!("Loaded catalog from {:?}", path);
            Ok(state)
        }
        Err(err) => {
            listing_warn!("Failed to parse catalog from {:?}: {}", path, err);
            Err(CatalogError::Corrupt {
                path,
                message: err.to_string(),
            })
        }
    }
}

fn property_mut<'a>(
    state: &'a mut CatalogState,
    property_id: &str,
) -> Result<&'a mut StoredProperty, CatalogError> {
    state
        .properties
        .iter_mut()
        .find(|p| p.id == property_id)
        .ok_or_else(|| CatalogError::UnknownProperty(property_id.to_string()))
}

fn media_of(state: &CatalogState, property_id: &str) -> Vec<PersistedMediaItem> {
    state
        .media
        .iter()
        .filter(|m| m.property_id == property_id)
        .map(to_media)
        .collect()
}

fn to_media(stored: &StoredMedia) -> PersistedMediaItem {
    PersistedMediaItem {
        id: MediaId::new(stored.id.clone()),
        kind: MediaKind::parse(&stored.kind).unwrap_or(MediaKind::Document),
        url: stored.url.clone(),
        filename: stored.filename.clone(),
        file_size: stored.file_size,
        mime_type: stored.mime_type.clone(),
        priority: stored.priority,
        created_at_ms: stored.created_at_ms,
        description: stored.description.clone(),
    }
}

fn to_property(stored: &StoredProperty) -> Property {
    Property {
        id: stored.id.clone(),
        title: stored.title.clone(),
        description: stored.description.clone(),
        price: stored.price,
        currency: stored.currency.clone(),
        location: stored.location.clone(),
        property_type: PropertyType::parse(&stored.property_type).unwrap_or_default(),
        status: PropertyStatus::parse(&stored.status).unwrap_or_default(),
        views: stored.views,
        likes: stored.likes,
        shares: stored.shares,
        notes: stored.notes,
        added_at: stored.added_at.clone(),
    }
}

fn from_property(property: &Property) -> StoredProperty {
    StoredProperty {
        id: property.id.clone(),
        title: property.title.clone(),
        description: property.description.clone(),
        price: property.price,
        currency: property.currency.clone(),
        location: property.location.clone(),
        property_type: property.property_type.as_str().to_string(),
        status: property.status.as_str().to_string(),
        views: property.views,
        likes: property.likes,
        shares: property.shares,
        notes: property.notes,
        added_at: property.added_at.clone(),
        custom_fields: Vec::new(),
        amenities: Vec::new(),
    }
}

fn to_custom_field(stored: &StoredField) -> CustomField {
    let field_type = FieldType::parse(&stored.field_type).unwrap_or_default();
    CustomField {
        name: stored.name.clone(),
        value: FieldValue::parse_as(field_type, &stored.value),
        field_type,
        unit: stored.unit.clone(),
        icon: stored.icon.clone(),
    }
}

fn from_custom_field(field: &CustomField) -> StoredField {
    StoredField {
        name: field.name.clone(),
        value: field.value.to_string(),
        field_type: field.field_type.as_str().to_string(),
        unit: field.unit.clone(),
        icon: field.icon.clone(),
    }
}

fn to_amenity(stored: &StoredAmenity) -> Amenity {
    Amenity {
        name: stored.name.clone(),
        is_available: stored.is_available,
        icon: stored.icon.clone(),
        color: stored.color.clone(),
        notes: stored.notes.clone(),
    }
}

fn from_amenity(amenity: &Amenity) -> StoredAmenity {
    StoredAmenity {
        name: amenity.name.clone(),
        is_available: amenity.is_available,
        icon: amenity.icon.clone(),
        color: amenity.color.clone(),
        notes: amenity.notes.clone(),
    }
}
