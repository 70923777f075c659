//! Flat CSV form of one property.
//!
//! A file is a header row plus one data row. Repeated records are spread over
//! numbered column groups: `custom_field_<n>_<attr>`, `amenity_<n>_<attr>` and
//! `media_<kind>_<n>_<attr>`, with `n` starting at 1.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use listing_core::{
    Amenity, CustomField, FieldType, FieldValue, MediaKind, PersistedMediaItem, Property,
    PropertyDraft, PropertyStatus, PropertyType,
};
use listing_logging::{listing_debug, listing_info};

use crate::filename::export_filename;
use crate::persist::{write_atomic, PersistError};

pub const BASE_HEADERS: [&str; 13] = [
    "id",
    "title",
    "type",
    "price",
    "currency",
    "status",
    "location",
    "description",
    "views",
    "likes",
    "shares",
    "notes",
    "added_at",
];

pub const REQUIRED_HEADERS: [&str; 8] = [
    "id",
    "title",
    "type",
    "price",
    "currency",
    "status",
    "location",
    "description",
];

const CUSTOM_FIELD_ATTRS: [&str; 5] = ["name", "value", "fieldType", "unit", "icon"];
const AMENITY_ATTRS: [&str; 5] = ["name", "isAvailable", "icon", "color", "notes"];
const MEDIA_ATTRS: [&str; 4] = ["url", "filename", "description", "mime_type"];
const MEDIA_KINDS: [MediaKind; 3] = [MediaKind::Image, MediaKind::Video, MediaKind::Document];

#[derive(Debug, thiserror::Error)]
pub enum CsvError {
    #[error("not a csv file: {0}")]
    NotCsv(String),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("persist error: {0}")]
    Persist(#[from] PersistError),
}

/// Everything exported for one property.
#[derive(Debug, Clone, PartialEq)]
pub struct PropertyExport {
    pub property: Property,
    pub custom_fields: Vec<CustomField>,
    pub amenities: Vec<Amenity>,
    pub media: Vec<PersistedMediaItem>,
}

/// A media reference read back from `media_*` columns.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportedMedia {
    pub kind: MediaKind,
    pub url: String,
    pub filename: String,
    pub description: String,
    pub mime_type: String,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct ImportOutcome {
    pub draft: PropertyDraft,
    pub custom_fields: Vec<CustomField>,
    pub amenities: Vec<Amenity>,
    pub media: Vec<ImportedMedia>,
    pub errors: Vec<String>,
    pub warnings: Vec<String>,
}

impl ImportOutcome {
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    fn failed(message: impl Into<String>) -> Self {
        Self {
            errors: vec![message.into()],
            ..Self::default()
        }
    }
}

/// Makes a value safe for the quoted single-line export format.
pub fn sanitize_value(value: &str) -> String {
    let replaced: String = value
        .chars()
        .map(|c| match c {
            ',' | '\n' | '\r' | '\t' => ' ',
            other => other,
        })
        .collect::<String>()
        .replace('"', "\"\"");
    replaced.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn render_row(cells: &[String]) -> String {
    cells
        .iter()
        .map(|cell| format!("\"{cell}\""))
        .collect::<Vec<_>>()
        .join(",")
}

pub fn export_property(export: &PropertyExport) -> String {
    let property = &export.property;
    let mut headers: Vec<String> = BASE_HEADERS.iter().map(|h| h.to_string()).collect();
    let mut row: Vec<String> = vec![
        property.id.clone(),
        property.title.clone(),
        property.property_type.to_string(),
        property.price.to_string(),
        if property.currency.trim().is_empty() {
            "USD".to_string()
        } else {
            property.currency.clone()
        },
        property.status.to_string(),
        property.location.clone(),
        property.description.clone(),
        property.views.to_string(),
        property.likes.to_string(),
        property.shares.to_string(),
        property.notes.to_string(),
        property.added_at.clone(),
    ];

    for (index, field) in export.custom_fields.iter().enumerate() {
        headers.extend(group_headers("custom_field", index + 1, &CUSTOM_FIELD_ATTRS));
        row.extend([
            field.name.clone(),
            field.value.to_string(),
            field.field_type.as_str().to_string(),
            field.unit.clone(),
            field.icon.clone(),
        ]);
    }

    for (index, amenity) in export.amenities.iter().enumerate() {
        headers.extend(group_headers("amenity", index + 1, &AMENITY_ATTRS));
        row.extend([
            amenity.name.clone(),
            amenity.is_available.to_string(),
            amenity.icon.clone(),
            amenity.color.clone(),
            amenity.notes.clone(),
        ]);
    }

    let mut media: Vec<&PersistedMediaItem> = export.media.iter().collect();
    media.sort_by_key(|item| item.effective_priority());
    for kind in MEDIA_KINDS {
        let prefix = format!("media_{}", kind.as_str());
        for (index, item) in media.iter().filter(|item| item.kind == kind).enumerate() {
            headers.extend(group_headers(&prefix, index + 1, &MEDIA_ATTRS));
            row.extend([
                item.url.clone(),
                item.filename.clone(),
                item.description.clone().unwrap_or_default(),
                item.mime_type.clone().unwrap_or_default(),
            ]);
        }
    }

    let row: Vec<String> = row.iter().map(|cell| sanitize_value(cell)).collect();
    format!("{}\n{}", render_row(&headers), render_row(&row))
}

/// Writes the export next to other exports in `dir` and returns its path.
pub fn write_export(dir: &Path, export: &PropertyExport) -> Result<PathBuf, CsvError> {
    let filename = export_filename(&export.property.title, &export.property.id);
    let content = export_property(export);
    let path = write_atomic(dir, &filename, content.as_bytes())?;
    listing_info!("exported property {} to {:?}", export.property.id, path);
    Ok(path)
}

/// The sample file offered to users who want to prepare an import by hand.
pub fn import_template() -> String {
    let mut headers: Vec<String> = BASE_HEADERS.iter().map(|h| h.to_string()).collect();
    for index in 1..=3 {
        headers.extend(group_headers("custom_field", index, &CUSTOM_FIELD_ATTRS));
    }
    for index in 1..=3 {
        headers.extend(group_headers("amenity", index, &AMENITY_ATTRS));
    }
    let data: Vec<String> = [
        "prop_123",
        "Sample Property",
        "House",
        "500000",
        "USD",
        "For Sale",
        "123 Main St, City, State",
        "Beautiful 3-bedroom house with modern amenities",
        "150",
        "25",
        "8",
        "3",
        "2024-01-15",
        "Bedrooms",
        "3",
        "number",
        "",
        "Bed",
        "Bathrooms",
        "2",
        "number",
        "",
        "Bath",
        "Square Feet",
        "2000",
        "number",
        "sqft",
        "Ruler",
        "Pool",
        "true",
        "Waves",
        "text-blue-500",
        "Olympic size pool",
        "Garage",
        "true",
        "Car",
        "text-gray-600",
        "2 car garage",
        "WiFi",
        "true",
        "Wifi",
        "text-green-500",
        "High speed internet",
    ]
    .iter()
    .map(|cell| cell.to_string())
    .collect();
    format!("{}\n{}", render_row(&headers), render_row(&data))
}

pub fn read_import_file(path: &Path) -> Result<ImportOutcome, CsvError> {
    let is_csv = path
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("csv"));
    if !is_csv {
        return Err(CsvError::NotCsv(path.display().to_string()));
    }
    let content = fs::read_to_string(path)?;
    Ok(import_property(&content))
}

pub fn import_property(content: &str) -> ImportOutcome {
    let mut lines = content.lines().filter(|line| !line.trim().is_empty());
    let (Some(header_line), Some(data_line)) = (lines.next(), lines.next()) else {
        return ImportOutcome::failed(
            "CSV file must have at least a header row and one data row",
        );
    };
    let headers = split_record(header_line);
    let row = split_record(data_line);
    let mut outcome = ImportOutcome::default();

    let missing: Vec<&str> = REQUIRED_HEADERS
        .iter()
        .copied()
        .filter(|required| !headers.iter().any(|h| h == required))
        .collect();
    if !missing.is_empty() {
        outcome
            .errors
            .push(format!("Missing required headers: {}", missing.join(", ")));
    }

    let cell = |name| lookup(&headers, &row, name);

    let mut draft = PropertyDraft {
        title: cell("title").to_string(),
        description: cell("description").to_string(),
        price: parse_price(cell("price")),
        location: cell("location").to_string(),
        ..PropertyDraft::default()
    };
    if !cell("currency").is_empty() {
        draft.currency = cell("currency").to_string();
    }
    match cell("type") {
        "" => {}
        raw => match PropertyType::parse(raw) {
            Some(kind) => draft.property_type = kind,
            None => outcome
                .warnings
                .push(format!("Unknown property type '{raw}', using House")),
        },
    }
    match cell("status") {
        "" => {}
        raw => match PropertyStatus::parse(raw) {
            Some(status) => draft.status = status,
            None => outcome
                .warnings
                .push(format!("Unknown status '{raw}', using For Sale")),
        },
    }
    if let Err(form_errors) = draft.validate() {
        outcome
            .errors
            .extend(form_errors.into_iter().map(|err| err.to_string()));
    }
    outcome.draft = draft;

    let groups = collect_groups(&headers, &row);

    if let Some(fields) = groups.get("custom_field") {
        for (position, attrs) in fields.values().enumerate() {
            let get = |key: &str| attrs.get(key).cloned().unwrap_or_default();
            let field_type = FieldType::parse(&get("fieldType")).unwrap_or_default();
            let name = attrs
                .get("name")
                .cloned()
                .unwrap_or_else(|| format!("Custom Field {}", position + 1));
            outcome.custom_fields.push(CustomField {
                name,
                value: FieldValue::parse_as(field_type, &get("value")),
                field_type,
                unit: get("unit"),
                icon: get("icon"),
            });
        }
    }

    if let Some(amenities) = groups.get("amenity") {
        for (position, attrs) in amenities.values().enumerate() {
            let get = |key: &str, default: &str| {
                attrs.get(key).cloned().unwrap_or_else(|| default.to_string())
            };
            let name = attrs
                .get("name")
                .cloned()
                .unwrap_or_else(|| format!("Custom Amenity {}", position + 1));
            outcome.amenities.push(Amenity {
                name,
                is_available: attrs.get("isAvailable").map(String::as_str) == Some("true"),
                icon: get("icon", "Star"),
                color: get("color", "text-gray-600"),
                notes: get("notes", ""),
            });
        }
    }

    for kind in MEDIA_KINDS {
        let Some(entries) = groups.get(&format!("media_{}", kind.as_str())) else {
            continue;
        };
        for attrs in entries.values() {
            let Some(url) = attrs.get("url") else {
                outcome
                    .warnings
                    .push(format!("Skipped {kind} entry without a url"));
                continue;
            };
            let get = |key: &str| attrs.get(key).cloned().unwrap_or_default();
            outcome.media.push(ImportedMedia {
                kind,
                url: url.clone(),
                filename: get("filename"),
                description: get("description"),
                mime_type: get("mime_type"),
            });
        }
    }

    if outcome.custom_fields.is_empty() {
        outcome
            .warnings
            .push("No custom fields found in CSV".to_string());
    }
    if outcome.amenities.is_empty() {
        outcome.warnings.push("No amenities found in CSV".to_string());
    }
    listing_debug!(
        "parsed import: {} errors, {} warnings, {} custom fields, {} amenities, {} media",
        outcome.errors.len(),
        outcome.warnings.len(),
        outcome.custom_fields.len(),
        outcome.amenities.len(),
        outcome.media.len()
    );
    outcome
}

type Groups = BTreeMap<String, BTreeMap<u32, BTreeMap<String, String>>>;

/// Buckets `<prefix>_<n>_<attr>` cells by prefix and index. Empty cells are skipped.
fn collect_groups(headers: &[String], row: &[String]) -> Groups {
    let mut groups = Groups::new();
    for (header, value) in headers.iter().zip(row.iter()) {
        if value.is_empty() {
            continue;
        }
        let Some((prefix, index, attr)) = split_group_header(header) else {
            continue;
        };
        groups
            .entry(prefix.to_string())
            .or_default()
            .entry(index)
            .or_default()
            .insert(attr.to_string(), value.clone());
    }
    groups
}

fn split_group_header(header: &str) -> Option<(&str, u32, &str)> {
    let prefix = ["custom_field", "amenity", "media_image", "media_video", "media_document"]
        .into_iter()
        .find(|prefix| {
            header
                .strip_prefix(prefix)
                .is_some_and(|rest| rest.starts_with('_'))
        })?;
    let rest = &header[prefix.len() + 1..];
    let (index, attr) = rest.split_once('_')?;
    if attr.is_empty() || index.is_empty() || !index.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    Some((prefix, index.parse().ok()?, attr))
}

fn group_headers(prefix: &str, index: usize, attrs: &[&str]) -> Vec<String> {
    attrs
        .iter()
        .map(|attr| format!("{prefix}_{index}_{attr}"))
        .collect()
}

/// Splits one line into trimmed cells. Double-quoted cells may contain commas
/// and `""` escapes.
fn split_record(line: &str) -> Vec<String> {
    let mut cells = Vec::new();
    let mut current = String::new();
    let mut in_quotes = false;
    let mut chars = line.trim_end_matches('\r').chars().peekable();
    while let Some(c) = chars.next() {
        match c {
            '"' if in_quotes && chars.peek() == Some(&'"') => {
                current.push('"');
                chars.next();
            }
            '"' => in_quotes = !in_quotes,
            ',' if !in_quotes => cells.push(std::mem::take(&mut current).trim().to_string()),
            other => current.push(other),
        }
    }
    cells.push(current.trim().to_string());
    cells
}

fn lookup<'a>(headers: &[String], row: &'a [String], name: &str) -> &'a str {
    headers
        .iter()
        .position(|h| h == name)
        .and_then(|index| row.get(index))
        .map(String::as_str)
        .unwrap_or("")
}

fn parse_price(raw: &str) -> f64 {
    raw.trim()
        .parse::<f64>()
        .ok()
        .filter(|price| price.is_finite())
        .unwrap_or(0.0)
}
