use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum PropertyType {
    #[default]
    House,
    Apartment,
    Land,
    Commercial,
}

impl PropertyType {
    pub const ALL: [PropertyType; 4] = [
        PropertyType::House,
        PropertyType::Apartment,
        PropertyType::Land,
        PropertyType::Commercial,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            PropertyType::House => "House",
            PropertyType::Apartment => "Apartment",
            PropertyType::Land => "Land",
            PropertyType::Commercial => "Commercial",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.as_str() == raw.trim())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum PropertyStatus {
    #[default]
    ForSale,
    ForRent,
    Sold,
}

impl PropertyStatus {
    pub const ALL: [PropertyStatus; 3] = [
        PropertyStatus::ForSale,
        PropertyStatus::ForRent,
        PropertyStatus::Sold,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            PropertyStatus::ForSale => "For Sale",
            PropertyStatus::ForRent => "For Rent",
            PropertyStatus::Sold => "Sold",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|status| status.as_str() == raw.trim())
    }

    /// Listings still on the market.
    pub fn is_active(self) -> bool {
        matches!(self, PropertyStatus::ForSale | PropertyStatus::ForRent)
    }
}

impl fmt::Display for PropertyType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl fmt::Display for PropertyStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Property {
    pub id: String,
    pub title: String,
    pub description: String,
    pub price: f64,
    pub currency: String,
    pub location: String,
    pub property_type: PropertyType,
    pub status: PropertyStatus,
    pub views: u64,
    pub likes: u64,
    pub shares: u64,
    pub notes: u64,
    /// Date the listing was added, `YYYY-MM-DD`.
    pub added_at: String,
}

/// Editable subset of a property, as filled in by the listing form or a CSV row.
#[derive(Debug, Clone, PartialEq)]
pub struct PropertyDraft {
    pub title: String,
    pub description: String,
    pub price: f64,
    pub currency: String,
    pub location: String,
    pub property_type: PropertyType,
    pub status: PropertyStatus,
}

impl Default for PropertyDraft {
    fn default() -> Self {
        Self {
            title: String::new(),
            description: String::new(),
            price: 0.0,
            currency: "USD".to_string(),
            location: String::new(),
            property_type: PropertyType::default(),
            status: PropertyStatus::default(),
        }
    }
}

impl PropertyDraft {
    /// Client-side checks run before any request is issued.
    pub fn validate(&self) -> Result<(), Vec<FormError>> {
        let mut errors = Vec::new();
        if self.title.trim().is_empty() {
            errors.push(FormError::MissingTitle);
        }
        if self.description.trim().is_empty() {
            errors.push(FormError::MissingDescription);
        }
        if !(self.price > 0.0) {
            errors.push(FormError::NonPositivePrice);
        }
        if self.location.trim().is_empty() {
            errors.push(FormError::MissingLocation);
        }
        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }

    pub fn into_property(self, id: impl Into<String>, added_at: impl Into<String>) -> Property {
        Property {
            id: id.into(),
            title: self.title,
            description: self.description,
            price: self.price,
            currency: self.currency,
            location: self.location,
            property_type: self.property_type,
            status: self.status,
            views: 0,
            likes: 0,
            shares: 0,
            notes: 0,
            added_at: added_at.into(),
        }
    }
}

impl Property {
    pub fn to_draft(&self) -> PropertyDraft {
        PropertyDraft {
            title: self.title.clone(),
            description: self.description.clone(),
            price: self.price,
            currency: self.currency.clone(),
            location: self.location.clone(),
            property_type: self.property_type,
            status: self.status,
        }
    }

    /// Overwrites the editable fields; counters and `added_at` are kept.
    pub fn apply_draft(&mut self, draft: PropertyDraft) {
        self.title = draft.title;
        self.description = draft.description;
        self.price = draft.price;
        self.currency = draft.currency;
        self.location = draft.location;
        self.property_type = draft.property_type;
        self.status = draft.status;
    }
}

/// Partial edit of a property: only the fields that are `Some` change.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PropertyPatch {
    pub title: Option<String>,
    pub description: Option<String>,
    pub price: Option<f64>,
    pub currency: Option<String>,
    pub location: Option<String>,
    pub property_type: Option<PropertyType>,
    pub status: Option<PropertyStatus>,
}

impl PropertyPatch {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    pub fn apply(&self, mut draft: PropertyDraft) -> PropertyDraft {
        if let Some(title) = &self.title {
            draft.title = title.clone();
        }
        if let Some(description) = &self.description {
            draft.description = description.clone();
        }
        if let Some(price) = self.price {
            draft.price = price;
        }
        if let Some(currency) = &self.currency {
            draft.currency = currency.clone();
        }
        if let Some(location) = &self.location {
            draft.location = location.clone();
        }
        if let Some(property_type) = self.property_type {
            draft.property_type = property_type;
        }
        if let Some(status) = self.status {
            draft.status = status;
        }
        draft
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormError {
    MissingTitle,
    MissingDescription,
    NonPositivePrice,
    MissingLocation,
}

impl fmt::Display for FormError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FormError::MissingTitle => write!(f, "Title is required"),
            FormError::MissingDescription => write!(f, "Description is required"),
            FormError::NonPositivePrice => write!(f, "Price must be greater than 0"),
            FormError::MissingLocation => write!(f, "Location is required"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum FieldType {
    #[default]
    Text,
    Number,
    Boolean,
    Metric,
    Currency,
    Percentage,
}

impl FieldType {
    pub fn as_str(self) -> &'static str {
        match self {
            FieldType::Text => "text",
            FieldType::Number => "number",
            FieldType::Boolean => "boolean",
            FieldType::Metric => "metric",
            FieldType::Currency => "currency",
            FieldType::Percentage => "percentage",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim() {
            "text" => Some(FieldType::Text),
            "number" => Some(FieldType::Number),
            "boolean" => Some(FieldType::Boolean),
            "metric" => Some(FieldType::Metric),
            "currency" => Some(FieldType::Currency),
            "percentage" => Some(FieldType::Percentage),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    Text(String),
    Number(f64),
    Bool(bool),
}

impl FieldValue {
    /// Interprets raw text according to the declared field type.
    pub fn parse_as(field_type: FieldType, raw: &str) -> Self {
        match field_type {
            FieldType::Boolean => FieldValue::Bool(raw == "true"),
            FieldType::Number => match raw.trim().parse::<f64>() {
                Ok(number) if number.is_finite() => FieldValue::Number(number),
                _ => FieldValue::Text(raw.to_string()),
            },
            _ => FieldValue::Text(raw.to_string()),
        }
    }
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldValue::Text(text) => f.write_str(text),
            FieldValue::Number(number) => write!(f, "{number}"),
            FieldValue::Bool(flag) => write!(f, "{flag}"),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct CustomField {
    pub name: String,
    pub value: FieldValue,
    pub field_type: FieldType,
    pub unit: String,
    pub icon: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Amenity {
    pub name: String,
    pub is_available: bool,
    pub icon: String,
    pub color: String,
    pub notes: String,
}
