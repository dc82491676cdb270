//! Shared builders and fixtures for unit tests.
//!
//! Small hand-built schemas cover most tests; the `fixtures/portfolio/`
//! documents are a realistic jazz-musician portfolio used where a test needs
//! the whole pipeline.
//!
//! ```rust
//! use crate::test_helpers::*;
//!
//! let entity = gig_entity();
//! let it = item("gig", json!({ "title": "Jazz Night" }));
//! ```

use serde_json::{Value, json};

use crate::content::{ContentItem, ContentStatus, ItemMetadata, StructuredContentCollection};
use crate::design::DesignSystemSchema;
use crate::naming::content_label;
use crate::schema::{ContentSchema, EntitySchema, FieldChoice, FieldSchema, FieldType};

// =========================================================================
// Schema builders
// =========================================================================

/// Entity named after its id (`gig` → `Gig`, collection `Gigs`).
pub fn entity_with_fields(id: &str, fields: Vec<FieldSchema>) -> EntitySchema {
    let name = content_label(id);
    EntitySchema {
        id: id.to_string(),
        plural_name: format!("{name}s"),
        name,
        fields,
        ..EntitySchema::default()
    }
}

/// `field1` … `fieldN`, all plain text.
pub fn text_fields(n: usize) -> Vec<FieldSchema> {
    (1..=n)
        .map(|i| FieldSchema::new(format!("field{i}"), FieldType::Text))
        .collect()
}

/// Gig: required title, venue name, and an upcoming/past status select.
pub fn gig_entity() -> EntitySchema {
    let mut title = FieldSchema::new("title", FieldType::Text);
    title.required = true;
    let mut status = FieldSchema::new("status", FieldType::Select);
    status.options.choices = ["upcoming", "past"]
        .iter()
        .map(|v| FieldChoice {
            value: json!(v),
            label: content_label(v),
            disabled: false,
        })
        .collect();
    EntitySchema {
        id: "gig".into(),
        name: "Gig".into(),
        plural_name: "Gigs".into(),
        fields: vec![title, FieldSchema::new("venueName", FieldType::Text), status],
        ..EntitySchema::default()
    }
}

// =========================================================================
// Content builders
// =========================================================================

/// Draft item with fixed timestamps. `fields` must be a JSON object.
pub fn item(entity_type: &str, fields: Value) -> ContentItem {
    let fields = match fields {
        Value::Object(map) => map,
        other => panic!("item fields must be an object, got {other}"),
    };
    ContentItem {
        id: "item-1".into(),
        entity_type: entity_type.to_string(),
        fields,
        metadata: ItemMetadata {
            slug: None,
            status: ContentStatus::Draft,
            created_at: "2024-03-01T12:00:00Z".into(),
            updated_at: "2024-03-01T12:00:00Z".into(),
            author: None,
            published_at: None,
        },
    }
}

// =========================================================================
// Design builders
// =========================================================================

/// Tokens in every category the theme renders, an h1/h2 type scale, a
/// four-step spacing scale, and a small palette.
pub fn sample_design() -> DesignSystemSchema {
    serde_json::from_value(json!({
        "tokens": {
            "colors": { "brand": { "primary": "#1d4ed8" }, "background": "#ffffff" },
            "shadows": { "sm": "0 1px 2px rgba(0, 0, 0, 0.05)" },
            "radii": { "md": "0.375rem" },
            "zIndex": { "modal": 100 },
            "transitions": { "easeInOut": "200ms ease-in-out" }
        },
        "typography": {
            "baseFontSize": 16,
            "scale": 1.25,
            "headingFont": "Playfair Display, serif",
            "bodyFont": "Inter, sans-serif",
            "styles": {
                "h1": { "fontSize": "3rem", "fontWeight": 700, "lineHeight": 1.1 },
                "h2": { "fontSize": "2.25rem", "fontWeight": 600, "lineHeight": 1.2 }
            }
        },
        "spacing": { "baseUnit": 4, "scale": [0, 1, 2, 4] },
        "colors": {
            "primary": { "500": "#3b82f6" },
            "semantic": { "success": "#16a34a" }
        },
        "breakpoints": { "md": "768px", "lg": "1024px" }
    }))
    .expect("sample design is valid")
}

// =========================================================================
// Fixture documents
// =========================================================================

pub fn portfolio_schema() -> ContentSchema {
    serde_json::from_str(include_str!("../fixtures/portfolio/schema.json")).expect("schema fixture")
}

pub fn portfolio_content() -> StructuredContentCollection {
    serde_json::from_str(include_str!("../fixtures/portfolio/content.json")).expect("content fixture")
}

pub fn portfolio_design() -> DesignSystemSchema {
    serde_json::from_str(include_str!("../fixtures/portfolio/design.json")).expect("design fixture")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::validate::validate_schema;

    #[test]
    fn fixtures_parse_and_validate() {
        let schema = portfolio_schema();
        let report = validate_schema(&schema);
        assert!(report.valid, "{:?}", report.errors);
        let content = portfolio_content();
        assert!(content.item_count() > 0);
        assert!(portfolio_design().colors.is_extended());
    }

    #[test]
    fn content_fixture_only_uses_known_entities() {
        let schema = portfolio_schema();
        for entity_id in portfolio_content().content.keys() {
            assert!(schema.entity(entity_id).is_some(), "unknown entity {entity_id}");
        }
    }
}
