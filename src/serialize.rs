//! Content items → Kirby content files.
//!
//! A Kirby content file is a list of `Label: value` entries separated by
//! `----` lines:
//!
//! ```text
//! Title: Jazz Night
//!
//! ----
//!
//! Description:
//!
//! A long-form value spans several lines
//! and starts after a blank line.
//!
//! ----
//!
//! Created: 2024-03-01 20:00:00
//! ```
//!
//! Single-line values have embedded newlines escaped as `\n`. Block values
//! escape body lines that read exactly `----`, which would otherwise end the
//! entry. Null or missing field values are skipped; nothing here fails.
//!
//! Each item lands in `content/<collection>/<folder>/<template>.txt` where the
//! folder encodes the Kirby status: `_drafts/<slug>` for drafts, `<n>_<slug>`
//! for listed pages (n counts the entity's listed items from 1) and `<slug>`
//! for unlisted pages.

use crate::config::ContentConfig;
use crate::content::{ContentItem, ContentStatus};
use crate::naming::{
    MAX_SLUG_LEN, collection_slug, content_label, field_key, sanitize_slug, template_name,
};
use crate::schema::{EntitySchema, FieldSchema, FieldType};
use crate::types::GeneratedFile;
use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime};
use pulldown_cmark::{Options, Parser, html as md_html};
use serde_json::{Map, Value};
use std::collections::HashSet;

const SEPARATOR: &str = "\n\n----\n\n";
const DATETIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";
const TIME_FORMAT: &str = "%H:%M";

/// Field names tried, in order, when an entity has no usable display field.
const TITLE_CANDIDATES: [&str; 3] = ["title", "name", "heading"];

/// Kirby page status.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TargetStatus {
    Draft,
    Listed,
    Unlisted,
}

impl TargetStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Draft => "draft",
            Self::Listed => "listed",
            Self::Unlisted => "unlisted",
        }
    }
}

/// Editorial status → Kirby status. Unrecognized statuses stay drafts.
pub fn map_status(status: ContentStatus) -> TargetStatus {
    match status {
        ContentStatus::Draft => TargetStatus::Draft,
        ContentStatus::Published => TargetStatus::Listed,
        ContentStatus::Archived => TargetStatus::Unlisted,
        ContentStatus::Other => TargetStatus::Draft,
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SerializedRecord {
    pub text: String,
    pub slug: String,
    pub status: TargetStatus,
}

/// One `Label: value` entry before it is rendered.
#[derive(Debug, Clone, PartialEq, Eq)]
enum Entry {
    Line(String),
    Block(String),
}

/// Entries keyed case-insensitively the way Kirby reads them back. The first
/// entry for a key wins; a metadata entry never shadows an entity field.
struct Entries {
    list: Vec<(String, Entry)>,
    keys: HashSet<String>,
}

impl Entries {
    fn with_capacity(n: usize) -> Self {
        Self {
            list: Vec::with_capacity(n),
            keys: HashSet::with_capacity(n),
        }
    }

    fn push(&mut self, label: String, entry: Entry) {
        if self.keys.insert(field_key(&label)) {
            self.list.push((label, entry));
        } else {
            tracing::debug!(label = %label, "dropping entry with a repeated key");
        }
    }
}

/// Serialize one item against its entity definition.
pub fn serialize_item(
    item: &ContentItem,
    entity: &EntitySchema,
    config: &ContentConfig,
) -> SerializedRecord {
    let title = resolve_title(item, entity);
    let slug = resolve_slug(item, entity, &title);

    let mut entries = Entries::with_capacity(entity.fields.len() + 5);
    if !entity.fields.iter().any(|f| field_key(&f.name) == "title") {
        entries.push("Title".to_string(), Entry::Line(title.clone()));
    }
    for field in &entity.fields {
        if let Some(value) = item.value(&field.name) {
            entries.push(content_label(&field.name), serialize_value(field, value, config));
        }
    }
    if config.include_metadata {
        let meta = &item.metadata;
        entries.push("Created".to_string(), Entry::Line(format_datetime_str(&meta.created_at)));
        entries.push("Updated".to_string(), Entry::Line(format_datetime_str(&meta.updated_at)));
        if let Some(author) = &meta.author {
            entries.push("Author".to_string(), Entry::Line(author.clone()));
        }
        if let Some(published) = &meta.published_at {
            entries.push("Published".to_string(), Entry::Line(format_datetime_str(published)));
        }
    }

    SerializedRecord {
        text: render_entries(&entries.list),
        slug,
        status: map_status(item.metadata.status),
    }
}

fn render_entries(entries: &[(String, Entry)]) -> String {
    let mut text = entries
        .iter()
        .map(|(label, entry)| match entry {
            Entry::Line(value) => format!("{label}: {}", escape_line(value)),
            Entry::Block(body) => format!("{label}:\n\n{}", escape_block(body)),
        })
        .collect::<Vec<_>>()
        .join(SEPARATOR);
    text.push('\n');
    text
}

fn escape_line(value: &str) -> String {
    value.replace("\r\n", "\\n").replace('\n', "\\n").replace('\r', "")
}

fn escape_block(body: &str) -> String {
    body.trim_end_matches(['\n', '\r'])
        .lines()
        .map(|line| if line == "----" { "\\----" } else { line })
        .collect::<Vec<_>>()
        .join("\n")
}

// =============================================================================
// Title and slug resolution
// =============================================================================

/// Item title: display field, then `title`/`name`/`heading`, then the first
/// plain text field, then the item id. Blank values never win.
pub fn resolve_title(item: &ContentItem, entity: &EntitySchema) -> String {
    let populated = |name: &str| {
        item.value(name)
            .map(scalar)
            .filter(|s| !s.trim().is_empty())
    };

    entity
        .display_field
        .as_deref()
        .and_then(populated)
        .or_else(|| TITLE_CANDIDATES.iter().find_map(|name| populated(name)))
        .or_else(|| {
            entity
                .fields
                .iter()
                .find(|f| f.field_type == FieldType::Text)
                .and_then(|f| populated(&f.name))
        })
        .unwrap_or_else(|| item.id.clone())
}

/// Item slug: explicit metadata slug, then the entity's slug source field,
/// then the title. Candidates that sanitize to nothing are skipped; the title
/// candidate is returned even when empty.
pub fn resolve_slug(item: &ContentItem, entity: &EntitySchema, title: &str) -> String {
    let explicit = item.metadata.slug.as_deref().map(sanitize_slug);
    let source = entity
        .slug_source
        .as_deref()
        .and_then(|name| item.value(name))
        .map(|v| sanitize_slug(&scalar(v)));

    explicit
        .into_iter()
        .chain(source)
        .find(|s| !s.is_empty())
        .unwrap_or_else(|| sanitize_slug(title))
}

// =============================================================================
// Per-type value rules
// =============================================================================

fn serialize_value(field: &FieldSchema, value: &Value, config: &ContentConfig) -> Entry {
    match &field.field_type {
        FieldType::Text
        | FieldType::Textarea
        | FieldType::Email
        | FieldType::Url
        | FieldType::Tel
        | FieldType::Color => Entry::Line(scalar(value)),
        FieldType::Richtext => {
            let text = scalar(value);
            if config.markdown_richtext && !looks_like_html(&text) {
                Entry::Block(markdown_to_html(&text))
            } else {
                Entry::Block(text)
            }
        }
        FieldType::Markdown | FieldType::Code => Entry::Block(scalar(value)),
        FieldType::Number | FieldType::Range | FieldType::Select | FieldType::Radio => {
            Entry::Line(scalar(value))
        }
        FieldType::Boolean => Entry::Line(match as_bool(value) {
            Some(b) => config.boolean_format.format(b).to_string(),
            None => scalar(value),
        }),
        FieldType::Date | FieldType::Datetime => Entry::Line(format_datetime(value)),
        FieldType::Time => Entry::Line(format_time(value)),
        FieldType::Multiselect | FieldType::Checkbox | FieldType::Tags => {
            Entry::Line(join_list(value, scalar))
        }
        FieldType::Image | FieldType::File => Entry::Line(join_list(value, media_name)),
        FieldType::Gallery | FieldType::Files => Entry::Line(join_list(value, media_name)),
        FieldType::List => Entry::Block(list_block(value)),
        FieldType::Structure => Entry::Block(structure_block(field, value)),
        FieldType::Blocks | FieldType::Json => Entry::Block(pretty_json(value)),
        FieldType::Relation | FieldType::Relations => Entry::Line(join_list(value, relation_id)),
        FieldType::Location => Entry::Line(location(value)),
        FieldType::Unknown(_) => Entry::Line(scalar(value)),
    }
}

/// Best-effort string form of any JSON value.
fn scalar(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        Value::Array(_) | Value::Object(_) => value.to_string(),
    }
}

fn as_bool(value: &Value) -> Option<bool> {
    match value {
        Value::Bool(b) => Some(*b),
        Value::Number(n) => n.as_i64().map(|n| n != 0),
        Value::String(s) => match s.trim().to_ascii_lowercase().as_str() {
            "true" | "yes" | "1" | "on" => Some(true),
            "false" | "no" | "0" | "off" => Some(false),
            _ => None,
        },
        _ => None,
    }
}

/// Arrays are joined with `, `; anything else goes through `item` alone.
fn join_list(value: &Value, item: fn(&Value) -> String) -> String {
    match value {
        Value::Array(items) => items
            .iter()
            .filter(|v| !v.is_null())
            .map(item)
            .collect::<Vec<_>>()
            .join(", "),
        other => item(other),
    }
}

fn object_key(value: &Value, keys: &[&str]) -> Option<String> {
    let obj = value.as_object()?;
    keys.iter()
        .find_map(|k| obj.get(*k).filter(|v| !v.is_null()))
        .map(scalar)
}

fn media_name(value: &Value) -> String {
    object_key(value, &["filename"]).unwrap_or_else(|| scalar(value))
}

fn relation_id(value: &Value) -> String {
    object_key(value, &["id"]).unwrap_or_else(|| scalar(value))
}

fn location(value: &Value) -> String {
    let pair = match value {
        Value::Object(obj) => {
            let get = |a: &str, b: &str| obj.get(a).or_else(|| obj.get(b)).map(scalar);
            get("lat", "latitude").zip(get("lng", "longitude"))
        }
        Value::Array(items) if items.len() == 2 => Some((scalar(&items[0]), scalar(&items[1]))),
        _ => None,
    };
    match pair {
        Some((lat, lng)) => format!("{lat},{lng}"),
        None => scalar(value),
    }
}

fn list_block(value: &Value) -> String {
    match value {
        Value::Array(items) => items
            .iter()
            .filter(|v| !v.is_null())
            .map(|v| format!("- {}", escape_line(&scalar(v))))
            .collect::<Vec<_>>()
            .join("\n"),
        other => scalar(other),
    }
}

/// Kirby structure values are YAML: a `-` line per row, then indented
/// `key: value` lines in nested-schema order followed by any extra keys.
fn structure_block(field: &FieldSchema, value: &Value) -> String {
    let Value::Array(rows) = value else {
        return scalar(value);
    };
    let mut lines = Vec::new();
    for row in rows {
        match row {
            Value::Object(obj) => {
                lines.push("-".to_string());
                for (key, v) in ordered_row(field, obj) {
                    lines.push(format!("  {}: {}", field_key(key), yaml_scalar(v)));
                }
            }
            Value::Null => {}
            other => lines.push(format!("- {}", yaml_scalar(other))),
        }
    }
    lines.join("\n")
}

fn ordered_row<'a>(field: &'a FieldSchema, row: &'a Map<String, Value>) -> Vec<(&'a str, &'a Value)> {
    let nested = &field.options.fields;
    let mut ordered: Vec<(&str, &Value)> = nested
        .iter()
        .filter_map(|f| row.get(&f.name).map(|v| (f.name.as_str(), v)))
        .filter(|(_, v)| !v.is_null())
        .collect();
    ordered.extend(
        row.iter()
            .filter(|(k, v)| !v.is_null() && !nested.iter().any(|f| &f.name == *k))
            .map(|(k, v)| (k.as_str(), v)),
    );
    ordered
}

/// Render a value as a single-line YAML scalar, quoting when needed.
/// Nested arrays and objects use JSON flow syntax, which YAML also reads.
fn yaml_scalar(value: &Value) -> String {
    match value {
        Value::Array(_) | Value::Object(_) => value.to_string(),
        Value::String(s) if s.contains('\n') => Value::String(s.clone()).to_string(),
        _ => serde_yaml::to_string(value)
            .map(|s| s.trim_end().to_string())
            .unwrap_or_else(|_| value.to_string()),
    }
}

fn pretty_json(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => serde_json::to_string_pretty(other).unwrap_or_else(|_| other.to_string()),
    }
}

fn looks_like_html(text: &str) -> bool {
    let t = text.trim_start();
    t.starts_with('<') && t.contains('>')
}

fn markdown_to_html(markdown: &str) -> String {
    let parser = Parser::new_ext(markdown, Options::ENABLE_STRIKETHROUGH | Options::ENABLE_TABLES);
    let mut html = String::new();
    md_html::push_html(&mut html, parser);
    html
}

// =============================================================================
// Dates
// =============================================================================

fn parse_datetime(raw: &str) -> Option<NaiveDateTime> {
    let raw = raw.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.naive_local());
    }
    for pattern in [
        "%Y-%m-%dT%H:%M:%S%.f",
        "%Y-%m-%d %H:%M:%S%.f",
        "%Y-%m-%dT%H:%M",
        "%Y-%m-%d %H:%M",
    ] {
        if let Ok(dt) = NaiveDateTime::parse_from_str(raw, pattern) {
            return Some(dt);
        }
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .map(|d| d.and_time(NaiveTime::MIN))
}

fn format_datetime_str(raw: &str) -> String {
    parse_datetime(raw)
        .map(|dt| dt.format(DATETIME_FORMAT).to_string())
        .unwrap_or_else(|| raw.to_string())
}

/// Dates become `YYYY-MM-DD HH:MM:SS`; numbers are read as unix seconds.
/// Unparseable input is written unchanged.
fn format_datetime(value: &Value) -> String {
    match value {
        Value::String(s) => format_datetime_str(s),
        Value::Number(n) => n
            .as_i64()
            .and_then(|secs| DateTime::from_timestamp(secs, 0))
            .map(|dt| dt.naive_utc().format(DATETIME_FORMAT).to_string())
            .unwrap_or_else(|| n.to_string()),
        other => scalar(other),
    }
}

fn format_time(value: &Value) -> String {
    let raw = scalar(value);
    let trimmed = raw.trim();
    ["%H:%M:%S%.f", "%H:%M"]
        .iter()
        .find_map(|p| NaiveTime::parse_from_str(trimmed, p).ok())
        .or_else(|| parse_datetime(trimmed).map(|dt| dt.time()))
        .map(|t| t.format(TIME_FORMAT).to_string())
        .unwrap_or(raw)
}

// =============================================================================
// Content paths
// =============================================================================

/// Page folder inside the entity collection for a given status and slug.
pub fn page_dir(status: TargetStatus, slug: &str, listed_position: usize) -> String {
    match status {
        TargetStatus::Draft => format!("_drafts/{slug}"),
        TargetStatus::Listed => format!("{listed_position}_{slug}"),
        TargetStatus::Unlisted => slug.to_string(),
    }
}

/// `content/<collection>/<page_dir>/<template>.txt`
pub fn content_path(entity: &EntitySchema, page_dir: &str) -> String {
    format!(
        "content/{}/{page_dir}/{}.txt",
        collection_slug(&entity.plural_name, &entity.id),
        template_name(&entity.id)
    )
}

/// Serialize every item of one entity into content files.
///
/// Listed items are numbered in input order. Slugs are unique within the
/// entity: repeats get `-2`, `-3`, … and an empty slug falls back to the
/// item id.
pub fn serialize_entity_items(
    items: &[ContentItem],
    entity: &EntitySchema,
    config: &ContentConfig,
) -> Vec<GeneratedFile> {
    let mut used = HashSet::new();
    let mut listed = 0;
    items
        .iter()
        .map(|item| {
            let record = serialize_item(item, entity, config);
            let slug = unique_slug(&record.slug, &item.id, &mut used);
            if record.status == TargetStatus::Listed {
                listed += 1;
            }
            let path = content_path(entity, &page_dir(record.status, &slug, listed));
            GeneratedFile::text(path, record.text)
        })
        .collect()
}

fn unique_slug(slug: &str, item_id: &str, used: &mut HashSet<String>) -> String {
    let base = if slug.is_empty() {
        let from_id = sanitize_slug(item_id);
        if from_id.is_empty() { "item".to_string() } else { from_id }
    } else {
        slug.to_string()
    };
    let mut candidate = base.clone();
    let mut n = 2;
    while used.contains(&candidate) {
        let suffix = format!("-{n}");
        // Slugs are ASCII, so byte slicing is safe.
        let keep = base.len().min(MAX_SLUG_LEN.saturating_sub(suffix.len()));
        candidate = format!("{}{suffix}", base[..keep].trim_end_matches('-'));
        n += 1;
    }
    used.insert(candidate.clone());
    candidate
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::BooleanFormat;
    use crate::test_helpers::{entity_with_fields, gig_entity, item};
    use proptest::prelude::*;
    use serde_json::json;

    fn config() -> ContentConfig {
        ContentConfig {
            include_metadata: false,
            ..ContentConfig::default()
        }
    }

    fn single(field: FieldSchema, value: Value) -> String {
        let entity = entity_with_fields("thing", vec![FieldSchema::new("title", FieldType::Text), field.clone()]);
        let mut fields = Map::new();
        fields.insert("title".to_string(), json!("T"));
        fields.insert(field.name.clone(), value);
        let it = item("thing", Value::Object(fields));
        serialize_item(&it, &entity, &config()).text
    }

    // =========================================================================
    // Scenario
    // =========================================================================

    #[test]
    fn gig_scenario() {
        let entity = gig_entity();
        let mut it = item(
            "gig",
            json!({ "title": "Jazz Night", "venueName": "Blue Note", "status": "upcoming" }),
        );
        it.metadata.status = ContentStatus::Published;
        let record = serialize_item(&it, &entity, &config());
        let lines: Vec<&str> = record.text.lines().collect();
        assert!(lines.contains(&"Title: Jazz Night"));
        assert!(lines.contains(&"VenueName: Blue Note"));
        assert!(lines.contains(&"Status: upcoming"));
        assert_eq!(record.slug, "jazz-night");
        assert_eq!(record.status, TargetStatus::Listed);
    }

    #[test]
    fn entries_are_separated_and_end_with_newline() {
        let entity = gig_entity();
        let it = item("gig", json!({ "title": "A", "venueName": "B" }));
        let record = serialize_item(&it, &entity, &config());
        assert_eq!(record.text, "Title: A\n\n----\n\nVenueName: B\n");
    }

    // =========================================================================
    // Status
    // =========================================================================

    #[test]
    fn status_map() {
        assert_eq!(map_status(ContentStatus::Draft), TargetStatus::Draft);
        assert_eq!(map_status(ContentStatus::Published), TargetStatus::Listed);
        assert_eq!(map_status(ContentStatus::Archived), TargetStatus::Unlisted);
        assert_eq!(map_status(ContentStatus::from("scheduled")), TargetStatus::Draft);
    }

    // =========================================================================
    // Title and slug
    // =========================================================================

    #[test]
    fn title_prefers_display_field() {
        let mut entity = entity_with_fields(
            "album",
            vec![FieldSchema::new("name", FieldType::Text), FieldSchema::new("headline", FieldType::Text)],
        );
        entity.display_field = Some("headline".into());
        let it = item("album", json!({ "name": "Kind of Blue", "headline": "Modal Masterpiece" }));
        assert_eq!(resolve_title(&it, &entity), "Modal Masterpiece");
    }

    #[test]
    fn title_falls_back_through_conventional_names() {
        let mut entity = entity_with_fields("album", vec![FieldSchema::new("name", FieldType::Text)]);
        entity.display_field = Some("missing".into());
        let it = item("album", json!({ "name": "Kind of Blue" }));
        assert_eq!(resolve_title(&it, &entity), "Kind of Blue");
    }

    #[test]
    fn title_uses_first_text_field_then_id() {
        let entity = entity_with_fields(
            "photo",
            vec![FieldSchema::new("year", FieldType::Number), FieldSchema::new("caption", FieldType::Text)],
        );
        let it = item("photo", json!({ "year": 1959, "caption": "Studio session" }));
        assert_eq!(resolve_title(&it, &entity), "Studio session");

        let it = item("photo", json!({ "year": 1959, "caption": "   " }));
        assert_eq!(resolve_title(&it, &entity), it.id);
    }

    #[test]
    fn title_entry_prepended_when_entity_has_no_title_field() {
        let entity = entity_with_fields("album", vec![FieldSchema::new("name", FieldType::Text)]);
        let it = item("album", json!({ "name": "Kind of Blue" }));
        let text = serialize_item(&it, &entity, &config()).text;
        assert!(text.starts_with("Title: Kind of Blue\n\n----\n\nName: Kind of Blue"));
    }

    #[test]
    fn slug_prefers_explicit_then_source() {
        let mut entity = gig_entity();
        entity.slug_source = Some("venueName".into());
        let mut it = item("gig", json!({ "title": "Jazz Night", "venueName": "Blue Note" }));
        assert_eq!(serialize_item(&it, &entity, &config()).slug, "blue-note");

        it.metadata.slug = Some("Custom Slug!".into());
        assert_eq!(serialize_item(&it, &entity, &config()).slug, "custom-slug");

        it.metadata.slug = Some("???".into());
        assert_eq!(serialize_item(&it, &entity, &config()).slug, "blue-note");
    }

    // =========================================================================
    // Escaping
    // =========================================================================

    #[test]
    fn single_line_values_escape_newlines() {
        let text = single(FieldSchema::new("venueName", FieldType::Text), json!("Blue\nNote"));
        assert!(text.contains("VenueName: Blue\\nNote"));
    }

    #[test]
    fn block_values_escape_separator_lines() {
        let text = single(
            FieldSchema::new("notes", FieldType::Markdown),
            json!("before\n----\nafter\n"),
        );
        assert!(text.contains("Notes:\n\nbefore\n\\----\nafter"));
        assert!(text.ends_with("after\n"));
    }

    // =========================================================================
    // Per-type rules
    // =========================================================================

    #[test]
    fn booleans_follow_configured_format() {
        let entity = entity_with_fields("gig", vec![FieldSchema::new("soldOut", FieldType::Boolean)]);
        let it = item("gig", json!({ "soldOut": true }));
        for (format, expected) in [
            (BooleanFormat::TrueFalse, "SoldOut: true"),
            (BooleanFormat::YesNo, "SoldOut: yes"),
            (BooleanFormat::OneZero, "SoldOut: 1"),
        ] {
            let cfg = ContentConfig {
                boolean_format: format,
                ..config()
            };
            assert!(serialize_item(&it, &entity, &cfg).text.contains(expected));
        }
    }

    #[test]
    fn dates_are_normalized() {
        let f = FieldSchema::new("date", FieldType::Datetime);
        assert!(single(f.clone(), json!("2024-03-01T20:30:00Z")).contains("Date: 2024-03-01 20:30:00"));
        assert!(single(f.clone(), json!("2024-03-01")).contains("Date: 2024-03-01 00:00:00"));
        assert!(single(f.clone(), json!("2024-03-01 20:30")).contains("Date: 2024-03-01 20:30:00"));
        assert!(single(f, json!("next friday")).contains("Date: next friday"));
    }

    #[test]
    fn times_use_hours_and_minutes() {
        let f = FieldSchema::new("doors", FieldType::Time);
        assert!(single(f.clone(), json!("19:30:00")).contains("Doors: 19:30"));
        assert!(single(f.clone(), json!("2024-03-01T19:45:00")).contains("Doors: 19:45"));
        assert!(single(f, json!("evening")).contains("Doors: evening"));
    }

    #[test]
    fn multi_choice_is_comma_joined() {
        let text = single(FieldSchema::new("genres", FieldType::Multiselect), json!(["jazz", "bebop"]));
        assert!(text.contains("Genres: jazz, bebop"));
        let text = single(FieldSchema::new("tags", FieldType::Tags), json!("solo"));
        assert!(text.contains("Tags: solo"));
    }

    #[test]
    fn media_uses_filenames() {
        let text = single(FieldSchema::new("poster", FieldType::Image), json!({ "filename": "poster.jpg", "alt": "x" }));
        assert!(text.contains("Poster: poster.jpg"));
        let text = single(
            FieldSchema::new("photos", FieldType::Gallery),
            json!(["a.jpg", { "filename": "b.jpg" }]),
        );
        assert!(text.contains("Photos: a.jpg, b.jpg"));
    }

    #[test]
    fn lists_render_one_item_per_line() {
        let text = single(FieldSchema::new("credits", FieldType::List), json!(["Miles", "Coltrane"]));
        assert!(text.contains("Credits:\n\n- Miles\n- Coltrane"));
    }

    #[test]
    fn structures_follow_nested_field_order() {
        let mut f = FieldSchema::new("setlist", FieldType::Structure);
        f.options.fields = vec![
            FieldSchema::new("song", FieldType::Text),
            FieldSchema::new("minutes", FieldType::Number),
        ];
        let text = single(
            f,
            json!([
                { "minutes": 9, "song": "So What", "soloist": "Miles" },
                { "song": "Blue in Green: take 2" }
            ]),
        );
        assert!(text.contains("Setlist:\n\n-\n  song: So What\n  minutes: 9\n  soloist: Miles\n-\n  song: "));
        // Values that would break the YAML are quoted.
        assert!(!text.contains("song: Blue in Green"));
        assert!(text.contains("Blue in Green: take 2"));
    }

    #[test]
    fn blocks_and_json_are_pretty_printed() {
        let text = single(FieldSchema::new("body", FieldType::Blocks), json!([{ "type": "text" }]));
        assert!(text.contains("Body:\n\n[\n  {\n    \"type\": \"text\"\n  }\n]"));
    }

    #[test]
    fn relations_use_ids() {
        let text = single(FieldSchema::new("venue", FieldType::Relation), json!({ "id": "blue-note" }));
        assert!(text.contains("Venue: blue-note"));
        let text = single(
            FieldSchema::new("bands", FieldType::Relations),
            json!([{ "id": "a" }, "b"]),
        );
        assert!(text.contains("Bands: a, b"));
    }

    #[test]
    fn location_is_lat_lng() {
        let f = FieldSchema::new("where", FieldType::Location);
        assert!(single(f.clone(), json!({ "lat": 40.73, "lng": -74.0 })).contains("Where: 40.73,-74.0"));
        assert!(single(f, json!("New York")).contains("Where: New York"));
    }

    #[test]
    fn unknown_types_are_coerced() {
        let text = single(FieldSchema::new("stars", FieldType::from("rating")), json!({ "value": 4 }));
        assert!(text.contains("Stars: {\"value\":4}"));
    }

    #[test]
    fn null_values_are_skipped() {
        let text = single(FieldSchema::new("venueName", FieldType::Text), Value::Null);
        assert!(!text.contains("VenueName"));
    }

    #[test]
    fn richtext_markdown_is_rendered() {
        let f = FieldSchema::new("bio", FieldType::Richtext);
        assert!(single(f.clone(), json!("Plays **tenor**")).contains("<strong>tenor</strong>"));
        assert!(single(f, json!("<p>Already html</p>")).contains("Bio:\n\n<p>Already html</p>"));
    }

    #[test]
    fn richtext_left_alone_when_disabled() {
        let entity = entity_with_fields("gig", vec![FieldSchema::new("bio", FieldType::Richtext)]);
        let it = item("gig", json!({ "bio": "Plays **tenor**" }));
        let cfg = ContentConfig {
            markdown_richtext: false,
            ..config()
        };
        assert!(serialize_item(&it, &entity, &cfg).text.contains("Plays **tenor**"));
    }

    #[test]
    fn metadata_trailer() {
        let entity = gig_entity();
        let mut it = item("gig", json!({ "title": "A" }));
        it.metadata.author = Some("Ada".into());
        it.metadata.published_at = Some("2024-03-02T10:00:00Z".into());
        let text = serialize_item(&it, &entity, &ContentConfig::default()).text;
        assert!(text.contains("Created: 2024-03-01 12:00:00"));
        assert!(text.contains("Author: Ada"));
        assert!(text.contains("Published: 2024-03-02 10:00:00"));
    }

    #[test]
    fn capitalized_title_field_is_not_repeated() {
        let entity = entity_with_fields("album", vec![FieldSchema::new("Title", FieldType::Text)]);
        let it = item("album", json!({ "Title": "Kind of Blue" }));
        let text = serialize_item(&it, &entity, &config()).text;
        assert_eq!(text.matches("Title:").count(), 1, "{text}");
        assert!(text.starts_with("Title: Kind of Blue\n"));
    }

    #[test]
    fn metadata_never_shadows_a_field() {
        let entity = entity_with_fields(
            "gig",
            vec![
                FieldSchema::new("title", FieldType::Text),
                FieldSchema::new("author", FieldType::Text),
            ],
        );
        let mut it = item("gig", json!({ "title": "A", "author": "The Quartet" }));
        it.metadata.author = Some("Ada".into());
        let text = serialize_item(&it, &entity, &ContentConfig::default()).text;
        assert_eq!(text.matches("Author:").count(), 1, "{text}");
        assert!(text.contains("Author: The Quartet"));
    }

    #[test]
    fn labels_of_spaced_names_read_back_as_field_keys() {
        let entity = entity_with_fields(
            "gig",
            vec![
                FieldSchema::new("title", FieldType::Text),
                FieldSchema::new("Venue Name", FieldType::Text),
            ],
        );
        let it = item("gig", json!({ "title": "A", "Venue Name": "Blue Note" }));
        let text = serialize_item(&it, &entity, &config()).text;
        assert!(text.contains("\n\n----\n\nVenue_Name: Blue Note\n"), "{text}");
    }

    // =========================================================================
    // Paths
    // =========================================================================

    #[test]
    fn content_paths_encode_status() {
        let entity = gig_entity();
        let mut a = item("gig", json!({ "title": "Jazz Night" }));
        a.metadata.status = ContentStatus::Published;
        let b = item("gig", json!({ "title": "Rehearsal" }));
        let mut c = item("gig", json!({ "title": "Old Show" }));
        c.metadata.status = ContentStatus::Archived;
        let mut d = item("gig", json!({ "title": "Encore" }));
        d.metadata.status = ContentStatus::Published;

        let files = serialize_entity_items(&[a, b, c, d], &entity, &config());
        let paths: Vec<&str> = files.iter().map(|f| f.path.as_str()).collect();
        assert_eq!(
            paths,
            vec![
                "content/gigs/1_jazz-night/gig.txt",
                "content/gigs/_drafts/rehearsal/gig.txt",
                "content/gigs/old-show/gig.txt",
                "content/gigs/2_encore/gig.txt",
            ]
        );
    }

    #[test]
    fn duplicate_and_empty_slugs_are_disambiguated() {
        let entity = gig_entity();
        let mut a = item("gig", json!({ "title": "Jazz Night" }));
        a.id = "g1".into();
        let mut b = item("gig", json!({ "title": "Jazz  Night!" }));
        b.id = "g2".into();
        let mut c = item("gig", json!({ "title": "!!!" }));
        c.id = "G 3".into();
        let files = serialize_entity_items(&[a, b, c], &entity, &config());
        assert_eq!(files[0].path, "content/gigs/_drafts/jazz-night/gig.txt");
        assert_eq!(files[1].path, "content/gigs/_drafts/jazz-night-2/gig.txt");
        assert_eq!(files[2].path, "content/gigs/_drafts/g-3/gig.txt");
    }

    #[test]
    fn disambiguated_slugs_respect_the_length_cap() {
        let entity = gig_entity();
        let title = "word ".repeat(40);
        let mut a = item("gig", json!({ "title": title.clone() }));
        a.id = "g1".into();
        let mut b = item("gig", json!({ "title": title }));
        b.id = "g2".into();
        let files = serialize_entity_items(&[a, b], &entity, &config());
        let slugs: Vec<&str> = files
            .iter()
            .map(|f| f.path.split('/').nth(3).unwrap())
            .collect();
        assert_ne!(slugs[0], slugs[1]);
        assert!(slugs[1].ends_with("-2"));
        for slug in slugs {
            assert!(slug.len() <= MAX_SLUG_LEN, "{} chars", slug.len());
            assert!(!slug.contains("--"));
        }
    }

    proptest! {
        #[test]
        fn slug_is_sanitized_title_without_overrides(title in "\\PC{0,60}") {
            let entity = gig_entity();
            let it = item("gig", json!({ "title": title }));
            let record = serialize_item(&it, &entity, &config());
            let resolved = resolve_title(&it, &entity);
            prop_assert_eq!(record.slug, sanitize_slug(&resolved));
        }

        #[test]
        fn sanitize_is_idempotent(s in "\\PC{0,200}") {
            let once = sanitize_slug(&s);
            prop_assert_eq!(sanitize_slug(&once), once.clone());
        }
    }
}
