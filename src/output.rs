//! CLI output formatting for every command.
//!
//! Output leads with what was produced, not with files: an entity line
//! carries its positional index and name, and the files it produced are
//! indented context underneath. Diagnostics are grouped by severity.
//!
//! # Output Format
//!
//! ## Validate
//!
//! ```text
//! Schema is valid (0 errors, 1 warning)
//! Warnings
//!     001 entities[2]: entity 'project' has no fields
//!         Suggestion: add at least one field
//! Info
//!     3 entities
//! ```
//!
//! ## Content
//!
//! ```text
//! Content
//! 001 album (1 item)
//! 002 gig (2 items)
//! Skipped
//!     ghost/item-1: no entity 'ghost' in schema
//! Serialized 3 items across 2 entities
//! ```
//!
//! ## Generate
//!
//! ```text
//! Generated 52 files → site/
//!     3 entities, 4 items
//!     Digest: 9f2c…
//! Next steps
//!     1. Install Kirby: composer install
//! ```
//!
//! # Architecture
//!
//! Each command has a `format_*` function (returns `Vec<String>`) for
//! testability and a `print_*` wrapper that writes to stdout. Format
//! functions are pure: no I/O, no side effects.

use crate::adapter::{ContentConversion, GenerationSummary, SchemaConversion, ThemeConversion};
use crate::types::GeneratedFile;
use crate::validate::{ValidationIssue, ValidationReport};
use std::path::Path;

// ============================================================================
// Shared helpers
// ============================================================================

/// Format a 1-based positional index as 3-digit zero-padded.
fn format_index(pos: usize) -> String {
    format!("{:0>3}", pos)
}

/// Return indentation string: 4 spaces per depth level.
fn indent(depth: usize) -> String {
    "    ".repeat(depth)
}

/// `1 item`, `2 items`, `2 entities`.
fn count(n: usize, noun: &str) -> String {
    if n == 1 {
        format!("{n} {noun}")
    } else if let Some(stem) = noun.strip_suffix('y') {
        format!("{n} {stem}ies")
    } else {
        format!("{n} {noun}s")
    }
}

fn file_list(title: &str, files: &[GeneratedFile]) -> Vec<String> {
    if files.is_empty() {
        return Vec::new();
    }
    let mut lines = vec![title.to_string()];
    lines.extend(files.iter().map(|f| format!("{}{}", indent(1), f.path)));
    lines
}

// ============================================================================
// Validate
// ============================================================================

fn issue_lines(index: usize, issue: &ValidationIssue) -> Vec<String> {
    let head = match &issue.path {
        Some(path) => format!("{}{} {}: {}", indent(1), format_index(index), path, issue.message),
        None => format!("{}{} {}", indent(1), format_index(index), issue.message),
    };
    let mut lines = vec![head];
    if let Some(ref suggestion) = issue.suggestion {
        lines.push(format!("{}Suggestion: {}", indent(2), suggestion));
    }
    lines
}

pub fn format_validation_report(report: &ValidationReport) -> Vec<String> {
    let verdict = if report.valid { "valid" } else { "invalid" };
    let mut lines = vec![format!(
        "Schema is {} ({}, {})",
        verdict,
        count(report.errors.len(), "error"),
        count(report.warnings.len(), "warning")
    )];

    for (title, issues) in [("Errors", &report.errors), ("Warnings", &report.warnings)] {
        if issues.is_empty() {
            continue;
        }
        lines.push(title.to_string());
        for (i, issue) in issues.iter().enumerate() {
            lines.extend(issue_lines(i + 1, issue));
        }
    }

    if !report.info.is_empty() {
        lines.push("Info".to_string());
        lines.extend(report.info.iter().map(|i| format!("{}{}", indent(1), i.message)));
    }
    lines
}

pub fn print_validation_report(report: &ValidationReport) {
    for line in format_validation_report(report) {
        println!("{}", line);
    }
}

// ============================================================================
// Individual conversions
// ============================================================================

pub fn format_schema_conversion(conversion: &SchemaConversion) -> Vec<String> {
    let mut lines = file_list("Blueprints", &conversion.blueprints);
    lines.extend(file_list("Templates", &conversion.templates));
    lines.push(format!(
        "Generated {}, {}, {}",
        count(conversion.blueprint_count, "blueprint"),
        count(conversion.template_count, "template"),
        count(conversion.snippet_count, "snippet")
    ));
    lines
}

pub fn print_schema_conversion(conversion: &SchemaConversion) {
    for line in format_schema_conversion(conversion) {
        println!("{}", line);
    }
}

pub fn format_content_conversion(conversion: &ContentConversion) -> Vec<String> {
    let mut lines = vec!["Content".to_string()];
    for (i, (entity, n)) in conversion.counts.iter().enumerate() {
        lines.push(format!("{} {} ({})", format_index(i + 1), entity, count(*n, "item")));
    }
    if !conversion.skipped.is_empty() {
        lines.push("Skipped".to_string());
        for skipped in &conversion.skipped {
            lines.push(format!(
                "{}{}/{}: {}",
                indent(1),
                skipped.entity_type,
                skipped.item_id,
                skipped.reason
            ));
        }
    }
    lines.push(format!(
        "Serialized {} across {}",
        count(conversion.item_count(), "item"),
        count(conversion.counts.len(), "entity")
    ));
    lines
}

pub fn print_content_conversion(conversion: &ContentConversion) {
    for line in format_content_conversion(conversion) {
        println!("{}", line);
    }
}

pub fn format_theme_conversion(conversion: &ThemeConversion) -> Vec<String> {
    let mut lines = file_list("Stylesheets", &conversion.files);
    lines.push(format!("Rendered {}", count(conversion.token_count, "token")));
    lines
}

pub fn print_theme_conversion(conversion: &ThemeConversion) {
    for line in format_theme_conversion(conversion) {
        println!("{}", line);
    }
}

// ============================================================================
// Generate
// ============================================================================

pub fn format_generation_summary(summary: &GenerationSummary, output: &Path) -> Vec<String> {
    let mut lines = vec![
        format!(
            "Generated {} → {}",
            count(summary.file_count, "file"),
            output.display()
        ),
        format!(
            "{}{}, {}",
            indent(1),
            count(summary.entity_count, "entity"),
            count(summary.item_count, "item")
        ),
        format!("{}Digest: {}", indent(1), summary.digest),
    ];

    if !summary.warnings.is_empty() {
        lines.push("Warnings".to_string());
        lines.extend(summary.warnings.iter().map(|w| format!("{}{}", indent(1), w)));
    }

    if !summary.instructions.is_empty() {
        lines.push("Next steps".to_string());
        for (i, step) in summary.instructions.iter().enumerate() {
            lines.push(format!("{}{}. {}", indent(1), i + 1, step));
        }
    }
    lines
}

pub fn print_generation_summary(summary: &GenerationSummary, output: &Path) {
    for line in format_generation_summary(summary, output) {
        println!("{}", line);
    }
}
