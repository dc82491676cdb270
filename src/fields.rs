//! Generic field definitions → Kirby panel fields.
//!
//! The content model knows 31 field types; the Kirby panel offers a smaller
//! vocabulary. [`map_field`] folds one onto the other:
//!
//! | Generic                                 | Kirby                              |
//! |-----------------------------------------|------------------------------------|
//! | text, textarea, markdown                | text, textarea (buttons off / on)  |
//! | richtext                                | writer                             |
//! | code, json                              | textarea with monospace font       |
//! | number, range                           | number, range                      |
//! | boolean                                 | toggle                             |
//! | select, multiselect, radio, checkbox    | select, multiselect, radio, checkboxes |
//! | date, time, datetime                    | date, time, date (time dropped)    |
//! | image, file, gallery, files             | files with a `max` count           |
//! | list, structure, blocks                 | list, structure, blocks            |
//! | relation, relations                     | pages (single / multiple)          |
//! | url, email, tel, color, tags            | same name                          |
//! | location, unknown                       | text, with a compatibility note    |
//!
//! Mapping is total and never fails. Anything the panel cannot express is
//! reported through [`compatibility_notes`] instead.

use crate::naming::{field_key, template_name};
use crate::schema::{FieldSchema, FieldType, MAX_STRUCTURE_DEPTH, Width};
use crate::types::OrderedMap;
use serde::Serialize;
use serde_json::Value;

/// Panel fields keyed by their lowercase field key, in schema order.
pub type FieldMap = OrderedMap<TargetField>;

/// One Kirby blueprint field definition.
///
/// Serializes to the YAML Kirby expects under a `fields:` key; unset options
/// are omitted.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TargetField {
    #[serde(rename = "type")]
    pub kind: &'static str,
    pub label: String,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub required: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub help: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub placeholder: Option<String>,
    pub width: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default: Option<Value>,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub disabled: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub minlength: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub maxlength: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pattern: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub step: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub buttons: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub font: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub marks: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub options: Option<OrderedMap<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub multiple: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub uploads: Option<Uploads>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub query: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fields: Option<FieldMap>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fieldsets: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub validate: Option<Vec<String>>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Uploads {
    pub accept: String,
}

impl TargetField {
    pub(crate) fn new(kind: &'static str, label: impl Into<String>) -> Self {
        Self {
            kind,
            label: label.into(),
            required: false,
            help: None,
            placeholder: None,
            width: "1/1",
            default: None,
            disabled: false,
            minlength: None,
            maxlength: None,
            pattern: None,
            min: None,
            max: None,
            step: None,
            buttons: None,
            font: None,
            marks: None,
            options: None,
            multiple: None,
            uploads: None,
            query: None,
            fields: None,
            fieldsets: None,
            validate: None,
        }
    }
}

/// Panel column width for a field width.
pub fn kirby_width(width: Option<Width>) -> &'static str {
    match width.unwrap_or_default() {
        Width::Full => "1/1",
        Width::Half => "1/2",
        Width::Third => "1/3",
        Width::Quarter => "1/4",
    }
}

/// Map one generic field onto a Kirby field.
pub fn map_field(field: &FieldSchema) -> TargetField {
    map_field_at(field, 0)
}

/// Map a field list into a panel field map, preserving order.
pub fn map_fields(fields: &[FieldSchema]) -> FieldMap {
    map_fields_at(fields, 0)
}

fn map_fields_at(fields: &[FieldSchema], depth: usize) -> FieldMap {
    fields
        .iter()
        .map(|f| (field_key(&f.name), map_field_at(f, depth)))
        .collect()
}

/// `depth` counts the structure fields enclosing `field`.
fn map_field_at(field: &FieldSchema, depth: usize) -> TargetField {
    let opts = &field.options;
    let mut target = match &field.field_type {
        FieldType::Text => text_like("text", field),
        FieldType::Textarea => {
            let mut t = text_like("textarea", field);
            t.buttons = Some(false);
            t
        }
        FieldType::Markdown => {
            let mut t = text_like("textarea", field);
            t.buttons = Some(true);
            t
        }
        FieldType::Richtext => {
            let mut t = TargetField::new("writer", field.display_label());
            if !opts.allowed_formats.is_empty() {
                t.marks = Some(opts.allowed_formats.clone());
            }
            t
        }
        FieldType::Code | FieldType::Json => {
            let mut t = TargetField::new("textarea", field.display_label());
            t.buttons = Some(false);
            t.font = Some("monospace");
            t
        }
        FieldType::Number => numeric("number", field),
        FieldType::Range => numeric("range", field),
        FieldType::Boolean => TargetField::new("toggle", field.display_label()),
        FieldType::Select => choice("select", field),
        FieldType::Multiselect => choice("multiselect", field),
        FieldType::Radio => choice("radio", field),
        FieldType::Checkbox => choice("checkboxes", field),
        FieldType::Date | FieldType::Datetime => TargetField::new("date", field.display_label()),
        FieldType::Time => TargetField::new("time", field.display_label()),
        FieldType::Image => {
            let mut t = files(field, 1);
            if t.uploads.is_none() {
                t.uploads = Some(Uploads {
                    accept: "image/*".to_string(),
                });
            }
            t
        }
        FieldType::File | FieldType::Gallery | FieldType::Files => {
            files(field, opts.max_files.unwrap_or(1))
        }
        FieldType::List => TargetField::new("list", field.display_label()),
        FieldType::Structure => {
            let mut t = TargetField::new("structure", field.display_label());
            let own_depth = depth + 1;
            t.fields = Some(if own_depth > MAX_STRUCTURE_DEPTH {
                FieldMap::new()
            } else {
                map_fields_at(&opts.fields, own_depth)
            });
            t.max = opts.max_items.map(Value::from);
            t
        }
        FieldType::Blocks => {
            let mut t = TargetField::new("blocks", field.display_label());
            if !opts.allowed_blocks.is_empty() {
                t.fieldsets = Some(opts.allowed_blocks.clone());
            }
            t
        }
        FieldType::Relation => pages(field, false),
        FieldType::Relations => pages(field, opts.multiple.unwrap_or(true)),
        FieldType::Url => TargetField::new("url", field.display_label()),
        FieldType::Email => TargetField::new("email", field.display_label()),
        FieldType::Tel => TargetField::new("tel", field.display_label()),
        FieldType::Color => TargetField::new("color", field.display_label()),
        FieldType::Tags => TargetField::new("tags", field.display_label()),
        FieldType::Location => {
            let mut t = TargetField::new("text", field.display_label());
            t.placeholder = Some("lat,lng".to_string());
            t
        }
        FieldType::Unknown(_) => TargetField::new("text", field.display_label()),
    };

    target.required = field.is_required();
    target.width = kirby_width(field.width);
    if field.help_text.is_some() {
        target.help = field.help_text.clone();
    }
    if field.placeholder.is_some() {
        target.placeholder = field.placeholder.clone();
    }
    target.default = opts.default_value.clone();
    target.disabled = opts.readonly.unwrap_or(false);
    apply_validation(&mut target, field);
    target
}

fn text_like(kind: &'static str, field: &FieldSchema) -> TargetField {
    let mut t = TargetField::new(kind, field.display_label());
    t.minlength = field.options.min_length;
    t.maxlength = field.options.max_length;
    t.pattern = field.options.pattern.clone();
    t
}

fn numeric(kind: &'static str, field: &FieldSchema) -> TargetField {
    let mut t = TargetField::new(kind, field.display_label());
    t.min = field.options.min.map(number);
    t.max = field.options.max.map(number);
    t.step = field.options.step.map(number);
    t
}

fn choice(kind: &'static str, field: &FieldSchema) -> TargetField {
    let mut t = TargetField::new(kind, field.display_label());
    t.options = Some(
        field
            .options
            .choices
            .iter()
            .filter(|c| !c.disabled)
            .map(|c| (choice_key(&c.value), c.label.clone()))
            .collect(),
    );
    t
}

fn files(field: &FieldSchema, max: u32) -> TargetField {
    let mut t = TargetField::new("files", field.display_label());
    t.max = Some(Value::from(max));
    t.multiple = Some(max > 1);
    if !field.options.accept.is_empty() {
        t.uploads = Some(Uploads {
            accept: field.options.accept.join(", "),
        });
    }
    t
}

fn pages(field: &FieldSchema, multiple: bool) -> TargetField {
    let mut t = TargetField::new("pages", field.display_label());
    t.multiple = Some(multiple);
    t.query = field.options.target_entity.as_deref().map(|target| {
        format!(
            "site.index.filterBy(\"intendedTemplate\", \"{}\")",
            template_name(target)
        )
    });
    t
}

/// Copy required/min/max/pattern and custom rule tags. `unique` has no panel
/// equivalent and is left to the validator to report.
fn apply_validation(target: &mut TargetField, field: &FieldSchema) {
    let Some(rules) = &field.validation else {
        return;
    };
    let is_text = matches!(
        field.field_type,
        FieldType::Text | FieldType::Textarea | FieldType::Markdown
    );
    if is_text {
        if target.minlength.is_none() {
            target.minlength = rules.min.map(|v| v.max(0.0) as u32);
        }
        if target.maxlength.is_none() {
            target.maxlength = rules.max.map(|v| v.max(0.0) as u32);
        }
    } else if target.kind == "number" || target.kind == "range" {
        if target.min.is_none() {
            target.min = rules.min.map(number);
        }
        if target.max.is_none() {
            target.max = rules.max.map(number);
        }
    }
    if target.pattern.is_none() && is_text {
        target.pattern = rules.pattern.clone();
    }
    if !rules.custom.is_empty() {
        target.validate = Some(rules.custom.iter().map(|r| r.rule_type.clone()).collect());
    }
}

/// Whole numbers stay integers in the YAML output.
fn number(v: f64) -> Value {
    if v.fract() == 0.0 && v.abs() < i64::MAX as f64 {
        Value::from(v as i64)
    } else {
        Value::from(v)
    }
}

fn choice_key(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

// =============================================================================
// Compatibility notes
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoteKind {
    /// Stored as text; a plugin is needed for a proper editor.
    NeedsPlugin,
    /// Part of the value is dropped by the panel widget.
    Lossy,
    /// Type identifier outside the known set.
    UnknownType,
    /// Structure nested past the depth limit; nested fields dropped.
    Truncated,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompatibilityNote {
    /// Dotted field path, e.g. `setlist.songs`.
    pub path: String,
    pub kind: NoteKind,
    pub message: String,
}

/// Everything the panel cannot represent faithfully for `field`, including
/// its nested structure fields.
pub fn compatibility_notes(field: &FieldSchema) -> Vec<CompatibilityNote> {
    let mut notes = Vec::new();
    collect_notes(field, "", 0, &mut notes);
    notes
}

fn collect_notes(field: &FieldSchema, prefix: &str, depth: usize, out: &mut Vec<CompatibilityNote>) {
    let path = if prefix.is_empty() {
        field.name.clone()
    } else {
        format!("{prefix}.{}", field.name)
    };
    let note = |kind, message: String| CompatibilityNote {
        path: path.clone(),
        kind,
        message,
    };
    match &field.field_type {
        FieldType::Location => out.push(note(
            NoteKind::NeedsPlugin,
            "location is stored as \"lat,lng\" text; a map plugin is needed for a picker".into(),
        )),
        FieldType::Datetime => out.push(note(
            NoteKind::Lossy,
            "datetime is edited with a date-only field; the time part is not editable".into(),
        )),
        FieldType::Unknown(name) => out.push(note(
            NoteKind::UnknownType,
            format!("unknown field type \"{name}\" is edited as plain text"),
        )),
        FieldType::Structure => {
            let own_depth = depth + 1;
            if own_depth > MAX_STRUCTURE_DEPTH {
                out.push(note(
                    NoteKind::Truncated,
                    format!(
                        "structure nested {own_depth} levels deep; fields below level {MAX_STRUCTURE_DEPTH} are dropped"
                    ),
                ));
            } else {
                for nested in &field.options.fields {
                    collect_notes(nested, &path, own_depth, out);
                }
            }
        }
        _ => {}
    }
}
