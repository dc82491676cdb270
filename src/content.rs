//! Content items produced by the content-structuring step.
//!
//! A [`StructuredContentCollection`] bundles the schema it was mapped against
//! with the items for each entity. Field values are arbitrary JSON; the
//! serializer interprets them according to the field type of the entity.

use crate::schema::ContentSchema;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StructuredContentCollection {
    pub schema: ContentSchema,
    /// Entity id → items of that entity.
    #[serde(default)]
    pub content: BTreeMap<String, Vec<ContentItem>>,
    #[serde(default)]
    pub metadata: CollectionMetadata,
}

impl StructuredContentCollection {
    /// All items across all entities, in entity-id order.
    pub fn items(&self) -> impl Iterator<Item = &ContentItem> {
        self.content.values().flatten()
    }

    pub fn item_count(&self) -> usize {
        self.content.values().map(Vec::len).sum()
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CollectionMetadata {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub generated_at: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub generator: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContentItem {
    pub id: String,
    /// Id of the entity this item conforms to.
    pub entity_type: String,
    #[serde(default)]
    pub fields: Map<String, Value>,
    pub metadata: ItemMetadata,
}

impl ContentItem {
    /// The value of a field, treating JSON `null` as absent.
    pub fn value(&self, name: &str) -> Option<&Value> {
        self.fields.get(name).filter(|v| !v.is_null())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemMetadata {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub slug: Option<String>,
    #[serde(default)]
    pub status: ContentStatus,
    pub created_at: String,
    pub updated_at: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub published_at: Option<String>,
}

/// Editorial status in the content model.
///
/// Any status string the upstream model invents lands in `Other`, which the
/// serializer treats like a draft.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContentStatus {
    #[default]
    Draft,
    Published,
    Archived,
    #[serde(other)]
    Other,
}

impl From<&str> for ContentStatus {
    fn from(value: &str) -> Self {
        match value {
            "draft" => Self::Draft,
            "published" => Self::Published,
            "archived" => Self::Archived,
            _ => Self::Other,
        }
    }
}
