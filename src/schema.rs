//! The CMS-agnostic content model.
//!
//! A [`ContentSchema`] is produced upstream by the domain-mapping step and
//! describes what a portfolio contains: entities (content types), their
//! fields, and the relationships between them. It is deserialized from the
//! camelCase JSON the upstream services emit and is never mutated here.
//!
//! ```json
//! {
//!   "version": "1.0.0",
//!   "entities": [{
//!     "id": "gig", "name": "Gig", "pluralName": "Gigs",
//!     "fields": [
//!       { "id": "f1", "name": "title", "label": "Title", "type": "text", "required": true },
//!       { "id": "f2", "name": "venueName", "label": "Venue", "type": "text" }
//!     ]
//!   }],
//!   "relationships": [],
//!   "metadata": { "name": "Jazz portfolio" }
//! }
//! ```
//!
//! Structural invariants (unique entity ids, unique field names, resolvable
//! relationship endpoints) are not enforced by the types; they are checked by
//! [`crate::validate`] before a site is generated.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

/// Deepest allowed nesting of `structure` fields inside `structure` fields.
///
/// A top-level structure is depth 1. Anything deeper is a validation error and
/// is truncated by the field mapper.
pub const MAX_STRUCTURE_DEPTH: usize = 3;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContentSchema {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    #[serde(default)]
    pub entities: Vec<EntitySchema>,
    #[serde(default)]
    pub relationships: Vec<RelationshipSchema>,
    #[serde(default)]
    pub metadata: SchemaMetadata,
}

impl ContentSchema {
    /// Look up an entity by id.
    pub fn entity(&self, id: &str) -> Option<&EntitySchema> {
        self.entities.iter().find(|e| e.id == id)
    }

    /// Total number of top-level fields across all entities.
    pub fn field_count(&self) -> usize {
        self.entities.iter().map(|e| e.fields.len()).sum()
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SchemaMetadata {
    #[serde(default)]
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<String>,
}

/// One content type, e.g. "Gig" or "Project".
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EntitySchema {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub plural_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Field whose value is used as the item title.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_field: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sortable: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamps: Option<bool>,
    /// Field whose value the slug is derived from.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub slug_source: Option<String>,
    #[serde(default)]
    pub fields: Vec<FieldSchema>,
}

impl EntitySchema {
    pub fn field(&self, name: &str) -> Option<&FieldSchema> {
        self.fields.iter().find(|f| f.name == name)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldSchema {
    #[serde(default)]
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub label: String,
    #[serde(rename = "type")]
    pub field_type: FieldType,
    #[serde(default)]
    pub required: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub help_text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub placeholder: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub width: Option<Width>,
    #[serde(default)]
    pub options: FieldOptions,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub validation: Option<FieldValidation>,
}

impl FieldSchema {
    /// Minimal field with the label derived from the name.
    pub fn new(name: impl Into<String>, field_type: FieldType) -> Self {
        let name = name.into();
        Self {
            id: name.clone(),
            label: name.clone(),
            name,
            field_type,
            required: false,
            help_text: None,
            placeholder: None,
            width: None,
            options: FieldOptions::default(),
            validation: None,
        }
    }

    /// True when either the field flag or its validation block demands a value.
    pub fn is_required(&self) -> bool {
        self.required
            || self
                .validation
                .as_ref()
                .and_then(|v| v.required)
                .unwrap_or(false)
    }

    /// Label for display, falling back to the field name.
    pub fn display_label(&self) -> &str {
        if self.label.trim().is_empty() {
            &self.name
        } else {
            &self.label
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Width {
    #[default]
    Full,
    Half,
    Third,
    Quarter,
}

/// Type-specific configuration. Every key is optional; which ones matter
/// depends on the field type.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldOptions {
    // text
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_length: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_length: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pattern: Option<String>,
    // numbers
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub step: Option<f64>,
    // choices
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub choices: Vec<FieldChoice>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub allow_custom: Option<bool>,
    // media
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub accept: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_size: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_files: Option<u32>,
    // structure
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub fields: Vec<FieldSchema>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_items: Option<u32>,
    // relations
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_entity: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub multiple: Option<bool>,
    // rich text
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub allowed_blocks: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub allowed_formats: Vec<String>,
    // generic
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_value: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub readonly: Option<bool>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FieldChoice {
    /// String or number in the upstream model.
    pub value: Value,
    pub label: String,
    #[serde(default)]
    pub disabled: bool,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FieldValidation {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub required: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unique: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pattern: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub custom: Vec<ValidationRule>,
}

/// A named rule the target may or may not know how to execute.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidationRule {
    #[serde(rename = "type")]
    pub rule_type: String,
    #[serde(default)]
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub params: Option<Value>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RelationshipSchema {
    #[serde(default)]
    pub id: String,
    #[serde(rename = "type")]
    pub kind: RelationshipKind,
    pub from: String,
    pub to: String,
    #[serde(default)]
    pub label: String,
    #[serde(default, alias = "inversLabel", skip_serializing_if = "Option::is_none")]
    pub inverse_label: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub required: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cascade_delete: Option<bool>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RelationshipKind {
    #[serde(rename = "one-to-one")]
    OneToOne,
    #[serde(rename = "one-to-many")]
    OneToMany,
    #[serde(rename = "many-to-many")]
    ManyToMany,
}

/// Generic field types of the content model.
///
/// The set is closed: the mapper, serializer and template renderer each
/// `match` on it without a wildcard arm. Identifiers outside the known set
/// deserialize into [`FieldType::Unknown`] rather than failing, so a schema
/// from a newer upstream still loads; the validator warns about them.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum FieldType {
    Text,
    Textarea,
    Richtext,
    Markdown,
    Code,
    Number,
    Range,
    Boolean,
    Select,
    Multiselect,
    Radio,
    Checkbox,
    Date,
    Time,
    Datetime,
    Image,
    File,
    Gallery,
    Files,
    Json,
    List,
    Structure,
    Blocks,
    Relation,
    Relations,
    Url,
    Email,
    Tel,
    Color,
    Location,
    Tags,
    Unknown(String),
}

impl FieldType {
    /// Every known type, in declaration order.
    pub const ALL: [FieldType; 31] = [
        Self::Text,
        Self::Textarea,
        Self::Richtext,
        Self::Markdown,
        Self::Code,
        Self::Number,
        Self::Range,
        Self::Boolean,
        Self::Select,
        Self::Multiselect,
        Self::Radio,
        Self::Checkbox,
        Self::Date,
        Self::Time,
        Self::Datetime,
        Self::Image,
        Self::File,
        Self::Gallery,
        Self::Files,
        Self::Json,
        Self::List,
        Self::Structure,
        Self::Blocks,
        Self::Relation,
        Self::Relations,
        Self::Url,
        Self::Email,
        Self::Tel,
        Self::Color,
        Self::Location,
        Self::Tags,
    ];

    pub fn as_str(&self) -> &str {
        match self {
            Self::Text => "text",
            Self::Textarea => "textarea",
            Self::Richtext => "richtext",
            Self::Markdown => "markdown",
            Self::Code => "code",
            Self::Number => "number",
            Self::Range => "range",
            Self::Boolean => "boolean",
            Self::Select => "select",
            Self::Multiselect => "multiselect",
            Self::Radio => "radio",
            Self::Checkbox => "checkbox",
            Self::Date => "date",
            Self::Time => "time",
            Self::Datetime => "datetime",
            Self::Image => "image",
            Self::File => "file",
            Self::Gallery => "gallery",
            Self::Files => "files",
            Self::Json => "json",
            Self::List => "list",
            Self::Structure => "structure",
            Self::Blocks => "blocks",
            Self::Relation => "relation",
            Self::Relations => "relations",
            Self::Url => "url",
            Self::Email => "email",
            Self::Tel => "tel",
            Self::Color => "color",
            Self::Location => "location",
            Self::Tags => "tags",
            Self::Unknown(name) => name,
        }
    }

    /// Image, file, gallery and files: the types that live in a media tab.
    pub fn is_media(&self) -> bool {
        matches!(self, Self::Image | Self::File | Self::Gallery | Self::Files)
    }
}

impl From<String> for FieldType {
    fn from(value: String) -> Self {
        Self::ALL
            .into_iter()
            .find(|t| t.as_str() == value)
            .unwrap_or(Self::Unknown(value))
    }
}

impl From<&str> for FieldType {
    fn from(value: &str) -> Self {
        Self::from(value.to_string())
    }
}

impl From<FieldType> for String {
    fn from(value: FieldType) -> Self {
        value.as_str().to_string()
    }
}

impl fmt::Display for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
