//! Structural checks run before anything is generated.
//!
//! Errors block generation; warnings and info are surfaced to the caller and
//! never dropped. Validation itself never fails: every problem becomes an
//! issue in the report.
//!
//! | Severity | Codes |
//! |----------|-------|
//! | error    | `missing-entity-id`, `missing-entity-name`, `duplicate-entity-id`, `duplicate-template-name`, `reserved-template-name`, `duplicate-collection`, `reserved-collection`, `duplicate-field-name`, `invalid-field-name`, `unknown-relationship-from`, `unknown-relationship-to`, `structure-too-deep` |
//! | warning  | `missing-version`, `no-entities`, `empty-entity`, `no-title-field`, `compatibility-note`, `unknown-field-type`, `unique-not-supported`, `unknown-target-entity` |
//! | info     | `entity-count`, `field-count`, `relationship-count` |
//!
//! Names are compared the way they end up on disk: entities by
//! [`template_name`] and [`collection_slug`], fields by [`field_key`]. Two
//! entities that differ only in case would otherwise write the same files.

use crate::fields::{NoteKind, compatibility_notes};
use crate::naming::{collection_slug, field_key, is_valid_field_key, template_name};
use crate::schema::{ContentSchema, EntitySchema, FieldSchema, FieldType, MAX_STRUCTURE_DEPTH};
use std::collections::{HashMap, HashSet};
use std::fmt;

/// Template names taken by the shared templates and fixed pages.
pub const RESERVED_TEMPLATES: [&str; 5] = ["home", "default", "site", "error", "design-tokens"];

/// Top-level content folders taken by fixed pages.
pub const RESERVED_COLLECTIONS: [&str; 3] = ["home", "error", "design-tokens"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Error,
    Warning,
    Info,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Error => "error",
            Self::Warning => "warning",
            Self::Info => "info",
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationIssue {
    pub severity: Severity,
    pub code: &'static str,
    pub message: String,
    /// Location in the schema, e.g. `entities[2].fields[0]`.
    pub path: Option<String>,
    pub suggestion: Option<String>,
}

impl ValidationIssue {
    fn new(severity: Severity, code: &'static str, message: impl Into<String>) -> Self {
        Self {
            severity,
            code,
            message: message.into(),
            path: None,
            suggestion: None,
        }
    }

    fn at(mut self, path: impl Into<String>) -> Self {
        self.path = Some(path.into());
        self
    }

    fn suggest(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestion = Some(suggestion.into());
        self
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationReport {
    pub valid: bool,
    pub errors: Vec<ValidationIssue>,
    pub warnings: Vec<ValidationIssue>,
    pub info: Vec<ValidationIssue>,
}

impl ValidationReport {
    fn push(&mut self, issue: ValidationIssue) {
        match issue.severity {
            Severity::Error => self.errors.push(issue),
            Severity::Warning => self.warnings.push(issue),
            Severity::Info => self.info.push(issue),
        }
    }

    /// Error messages, prefixed with their schema path when known.
    pub fn error_messages(&self) -> Vec<String> {
        self.errors
            .iter()
            .map(|e| match &e.path {
                Some(path) => format!("{path}: {}", e.message),
                None => e.message.clone(),
            })
            .collect()
    }

    pub fn has_code(&self, code: &str) -> bool {
        self.errors
            .iter()
            .chain(&self.warnings)
            .chain(&self.info)
            .any(|i| i.code == code)
    }
}

/// Validate a content schema.
pub fn validate_schema(schema: &ContentSchema) -> ValidationReport {
    let mut report = ValidationReport::default();

    if schema.version.as_deref().is_none_or(|v| v.trim().is_empty()) {
        report.push(
            ValidationIssue::new(Severity::Warning, "missing-version", "schema has no version")
                .at("version")
                .suggest("set a version such as \"1.0.0\""),
        );
    }
    if schema.entities.is_empty() {
        report.push(ValidationIssue::new(
            Severity::Warning,
            "no-entities",
            "schema defines no entities; only the scaffold will be generated",
        ));
    }

    let entity_ids: HashSet<&str> = schema.entities.iter().map(|e| e.id.as_str()).collect();
    let mut seen_ids = HashSet::new();
    let mut templates: HashMap<String, &str> = HashMap::new();
    let mut collections: HashMap<String, &str> = HashMap::new();
    for (i, entity) in schema.entities.iter().enumerate() {
        let path = format!("entities[{i}]");
        if entity.id.trim().is_empty() {
            report.push(
                ValidationIssue::new(Severity::Error, "missing-entity-id", "entity has no id")
                    .at(&path),
            );
        } else if !seen_ids.insert(entity.id.as_str()) {
            report.push(
                ValidationIssue::new(
                    Severity::Error,
                    "duplicate-entity-id",
                    format!("entity id \"{}\" is used more than once", entity.id),
                )
                .at(&path),
            );
        }
        if entity.name.trim().is_empty() {
            report.push(
                ValidationIssue::new(Severity::Error, "missing-entity-name", "entity has no name")
                    .at(&path),
            );
        }
        check_entity(entity, &path, &entity_ids, &mut report);
        check_output_names(entity, &path, &mut templates, &mut collections, &mut report);
    }

    for (i, rel) in schema.relationships.iter().enumerate() {
        let path = format!("relationships[{i}]");
        if !entity_ids.contains(rel.from.as_str()) {
            report.push(
                ValidationIssue::new(
                    Severity::Error,
                    "unknown-relationship-from",
                    format!("relationship source \"{}\" is not a known entity", rel.from),
                )
                .at(&path),
            );
        }
        if !entity_ids.contains(rel.to.as_str()) {
            report.push(
                ValidationIssue::new(
                    Severity::Error,
                    "unknown-relationship-to",
                    format!("relationship target \"{}\" is not a known entity", rel.to),
                )
                .at(&path),
            );
        }
    }

    report.push(ValidationIssue::new(
        Severity::Info,
        "entity-count",
        format!("{} entities", schema.entities.len()),
    ));
    report.push(ValidationIssue::new(
        Severity::Info,
        "field-count",
        format!("{} fields", schema.field_count()),
    ));
    report.push(ValidationIssue::new(
        Severity::Info,
        "relationship-count",
        format!("{} relationships", schema.relationships.len()),
    ));

    report.valid = report.errors.is_empty();
    report
}

/// Errors for entities whose template or content folder is taken by an
/// earlier entity or by a fixed page. Exact id repeats are already reported
/// as `duplicate-entity-id` and are not reported again.
fn check_output_names<'a>(
    entity: &'a EntitySchema,
    path: &str,
    templates: &mut HashMap<String, &'a str>,
    collections: &mut HashMap<String, &'a str>,
    report: &mut ValidationReport,
) {
    if entity.id.trim().is_empty() {
        return;
    }
    let template = template_name(&entity.id);
    if RESERVED_TEMPLATES.contains(&template.as_str()) {
        report.push(
            ValidationIssue::new(
                Severity::Error,
                "reserved-template-name",
                format!("entity \"{}\" would replace the built-in \"{template}\" template", entity.id),
            )
            .at(path)
            .suggest("rename the entity id"),
        );
    }
    match templates.get(&template) {
        Some(&other) if other != entity.id => report.push(
            ValidationIssue::new(
                Severity::Error,
                "duplicate-template-name",
                format!(
                    "entities \"{other}\" and \"{}\" both map to template \"{template}\"",
                    entity.id
                ),
            )
            .at(path)
            .suggest("entity ids must differ after lowercasing and replacing separators"),
        ),
        Some(_) => {}
        None => {
            templates.insert(template, &entity.id);
        }
    }

    let collection = collection_slug(&entity.plural_name, &entity.id);
    if RESERVED_COLLECTIONS.contains(&collection.as_str()) {
        report.push(
            ValidationIssue::new(
                Severity::Error,
                "reserved-collection",
                format!("collection folder \"content/{collection}\" is reserved"),
            )
            .at(path)
            .suggest("change the plural name"),
        );
    }
    match collections.get(&collection) {
        Some(&other) if other != entity.id => report.push(
            ValidationIssue::new(
                Severity::Error,
                "duplicate-collection",
                format!(
                    "entities \"{other}\" and \"{}\" share the collection folder \"content/{collection}\"",
                    entity.id
                ),
            )
            .at(path)
            .suggest("give each entity a distinct plural name"),
        ),
        Some(_) => {}
        None => {
            collections.insert(collection, &entity.id);
        }
    }
}

fn check_entity(
    entity: &EntitySchema,
    path: &str,
    entity_ids: &HashSet<&str>,
    report: &mut ValidationReport,
) {
    let label = if entity.name.is_empty() {
        entity.id.as_str()
    } else {
        entity.name.as_str()
    };

    if entity.fields.is_empty() {
        report.push(
            ValidationIssue::new(
                Severity::Warning,
                "empty-entity",
                format!("entity \"{label}\" has no fields"),
            )
            .at(path),
        );
    } else if !has_title_field(entity) {
        report.push(
            ValidationIssue::new(
                Severity::Warning,
                "no-title-field",
                format!("entity \"{label}\" has no field usable as a title; item ids will be used"),
            )
            .at(path)
            .suggest("add a text field named \"title\" or set displayField"),
        );
    }

    check_field_names(&entity.fields, path, label, report);
    for (j, field) in entity.fields.iter().enumerate() {
        check_field(field, &format!("{path}.fields[{j}]"), entity_ids, report);
    }
}

/// Field names must be usable as panel keys and PHP method names, and unique
/// per field list once normalized. Structure rows are checked recursively.
fn check_field_names(fields: &[FieldSchema], path: &str, label: &str, report: &mut ValidationReport) {
    let mut keys = HashSet::new();
    for (j, field) in fields.iter().enumerate() {
        let field_path = format!("{path}.fields[{j}]");
        let key = field_key(&field.name);
        if !is_valid_field_key(&key) {
            report.push(
                ValidationIssue::new(
                    Severity::Error,
                    "invalid-field-name",
                    format!("field name \"{}\" in \"{label}\" is not a usable key", field.name),
                )
                .at(&field_path)
                .suggest("start the name with a letter"),
            );
        } else if !keys.insert(key) {
            report.push(
                ValidationIssue::new(
                    Severity::Error,
                    "duplicate-field-name",
                    format!("field \"{}\" appears more than once in \"{label}\"", field.name),
                )
                .at(&field_path)
                .suggest("field names must differ after lowercasing and replacing separators"),
            );
        }
        if field.field_type == FieldType::Structure {
            check_field_names(&field.options.fields, &field_path, label, report);
        }
    }
}

fn has_title_field(entity: &EntitySchema) -> bool {
    let display = entity.display_field.as_deref();
    entity.fields.iter().any(|f| {
        Some(f.name.as_str()) == display
            || matches!(field_key(&f.name).as_str(), "title" | "name" | "heading")
            || f.field_type == FieldType::Text
    })
}

fn check_field(
    field: &FieldSchema,
    path: &str,
    entity_ids: &HashSet<&str>,
    report: &mut ValidationReport,
) {
    for note in compatibility_notes(field) {
        let code = match note.kind {
            NoteKind::UnknownType => "unknown-field-type",
            NoteKind::NeedsPlugin | NoteKind::Lossy => "compatibility-note",
            // Reported below as an error.
            NoteKind::Truncated => continue,
        };
        report.push(
            ValidationIssue::new(Severity::Warning, code, format!("{}: {}", note.path, note.message))
                .at(path),
        );
    }

    let depth = structure_depth(field);
    if depth > MAX_STRUCTURE_DEPTH {
        report.push(
            ValidationIssue::new(
                Severity::Error,
                "structure-too-deep",
                format!(
                    "structure \"{}\" nests {depth} levels; at most {MAX_STRUCTURE_DEPTH} are supported",
                    field.name
                ),
            )
            .at(path)
            .suggest("flatten the inner structure or turn it into a relation"),
        );
    }

    walk_fields(field, &mut |f| {
        if f.validation.as_ref().and_then(|v| v.unique).unwrap_or(false) {
            report.push(
                ValidationIssue::new(
                    Severity::Warning,
                    "unique-not-supported",
                    format!("uniqueness of \"{}\" cannot be enforced by the panel", f.name),
                )
                .at(path),
            );
        }
        if let Some(target) = &f.options.target_entity {
            if !entity_ids.contains(target.as_str()) {
                report.push(
                    ValidationIssue::new(
                        Severity::Warning,
                        "unknown-target-entity",
                        format!("\"{}\" points at unknown entity \"{target}\"", f.name),
                    )
                    .at(path),
                );
            }
        }
    });
}

/// Number of nested structure levels, 1 for a flat structure and 0 for any
/// other field.
pub fn structure_depth(field: &FieldSchema) -> usize {
    match field.field_type {
        FieldType::Structure => {
            1 + field
                .options
                .fields
                .iter()
                .map(structure_depth)
                .max()
                .unwrap_or(0)
        }
        _ => 0,
    }
}

fn walk_fields(field: &FieldSchema, visit: &mut dyn FnMut(&FieldSchema)) {
    visit(field);
    for nested in &field.options.fields {
        walk_fields(nested, visit);
    }
}
