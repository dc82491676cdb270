//! Design tokens → stylesheets.
//!
//! Four files under `assets/css/`:
//!
//! | File            | Content                                                |
//! |-----------------|--------------------------------------------------------|
//! | `theme.css`     | `:root` custom properties for every token              |
//! | `base.css`      | optional reset, body and heading typography, links     |
//! | `utilities.css` | spacing utilities per scale step, layout helpers       |
//! | `main.css`      | `@import` of base, theme and utilities, in that order  |
//!
//! Token sections are always written in the same order (colors, typography,
//! spacing, shadows, borders, radii, z-index, transitions, breakpoints) so
//! regenerating an unchanged design system yields identical files.

use crate::config::ThemeConfig;
use crate::design::{DesignSystemSchema, TextStyle, TokenGroup};
use crate::naming::css_ident;
use crate::types::GeneratedFile;
use serde_json::Value;

pub const CSS_DIR: &str = "assets/css";

/// Spacing utility prefixes and the properties each one sets.
const SPACING_UTILITIES: [(&str, &[&str]); 8] = [
    ("m", &["margin"]),
    ("mt", &["margin-top"]),
    ("mb", &["margin-bottom"]),
    ("mx", &["margin-left", "margin-right"]),
    ("p", &["padding"]),
    ("pt", &["padding-top"]),
    ("pb", &["padding-bottom"]),
    ("px", &["padding-left", "padding-right"]),
];

/// Generate the stylesheet set.
pub fn generate_theme(design: &DesignSystemSchema, config: &ThemeConfig) -> Vec<GeneratedFile> {
    vec![
        GeneratedFile::text(format!("{CSS_DIR}/theme.css"), theme_css(design)),
        GeneratedFile::text(format!("{CSS_DIR}/base.css"), base_css(design, config)),
        GeneratedFile::text(format!("{CSS_DIR}/utilities.css"), utilities_css(design)),
        GeneratedFile::text(format!("{CSS_DIR}/main.css"), MAIN_CSS),
    ]
}

const MAIN_CSS: &str = "@import url(\"base.css\");\n@import url(\"theme.css\");\n@import url(\"utilities.css\");\n";

// =============================================================================
// theme.css
// =============================================================================

/// Render the `:root` custom properties.
pub fn theme_css(design: &DesignSystemSchema) -> String {
    let tokens = &design.tokens;
    let typo = &design.typography;
    let mut sections: Vec<(&str, Vec<String>)> = Vec::new();

    sections.push(("Colors", group_vars("color", &tokens.colors)));

    let mut typography = vec![
        var("font-heading", &typo.heading_font),
        var("font-body", &typo.body_font),
        var("font-size-base", &format!("{}px", fmt_num(typo.base_font_size))),
        var("type-scale", &fmt_num(typo.scale)),
    ];
    typography.extend(group_vars("font", &tokens.fonts));
    for (key, style) in &typo.styles {
        typography.extend(text_style_vars(key, style));
    }
    sections.push(("Typography", typography));

    let spacing = &design.spacing;
    let mut space = vec![var("spacing-unit", &format!("{}px", fmt_num(spacing.base_unit)))];
    space.extend(spacing.scale.iter().enumerate().map(|(i, step)| {
        var(&format!("space-{i}"), &px(spacing.base_unit * step))
    }));
    space.extend(group_vars("spacing", &tokens.spacing));
    sections.push(("Spacing", space));

    sections.push(("Shadows", group_vars("shadow", &tokens.shadows)));
    sections.push(("Borders", group_vars("border", &tokens.borders)));
    sections.push(("Radii", group_vars("radius", &tokens.radii)));
    sections.push(("Z-index", group_vars("z", &tokens.z_index)));
    sections.push(("Transitions", group_vars("transition", &tokens.transitions)));
    sections.push(("Breakpoints", group_vars("breakpoint", &design.breakpoints)));

    let mut out = String::from("/* Design tokens */\n:root {\n");
    for (title, vars) in sections.iter().filter(|(_, vars)| !vars.is_empty()) {
        out.push_str(&format!("  /* {title} */\n"));
        for line in vars {
            out.push_str(&format!("  {line}\n"));
        }
    }
    out.push_str("}\n");

    if design.colors.is_extended() {
        out.push_str("\n/* Palette */\n:root {\n");
        for line in palette_vars(design) {
            out.push_str(&format!("  {line}\n"));
        }
        out.push_str("}\n");
    }
    out
}

fn var(name: &str, value: &str) -> String {
    format!("--{name}: {value};")
}

/// Flatten a token group into declarations. Nested maps join their keys
/// with `-`; null values are skipped.
fn group_vars(prefix: &str, group: &TokenGroup) -> Vec<String> {
    let mut out = Vec::new();
    for (name, value) in group {
        flatten_token(&format!("{prefix}-{}", css_ident(name)), value, &mut out);
    }
    out
}

fn flatten_token(name: &str, value: &Value, out: &mut Vec<String>) {
    match value {
        Value::Null => {}
        Value::Object(map) => {
            for (key, nested) in map {
                flatten_token(&format!("{name}-{}", css_ident(key)), nested, out);
            }
        }
        other => out.push(var(name, &css_value(other))),
    }
}

/// CSS text of a token value. Arrays are font stacks and join with `, `.
fn css_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Array(items) => items.iter().map(css_value).collect::<Vec<_>>().join(", "),
        Value::Null | Value::Object(_) => String::new(),
    }
}

fn text_style_vars(key: &str, style: &TextStyle) -> Vec<String> {
    let base = format!("text-{}", css_ident(key));
    let mut out = Vec::new();
    for (suffix, value) in [
        ("size", &style.font_size),
        ("weight", &style.font_weight),
        ("line-height", &style.line_height),
    ] {
        if !value.is_null() {
            out.push(var(&format!("{base}-{suffix}"), &css_value(value)));
        }
    }
    if let Some(spacing) = &style.letter_spacing {
        out.push(var(&format!("{base}-letter-spacing"), spacing));
    }
    out
}

fn palette_vars(design: &DesignSystemSchema) -> Vec<String> {
    let colors = &design.colors;
    let mut out = Vec::new();
    for (ramp, shades) in colors.ramps() {
        for (shade, hex) in shades {
            out.push(var(&format!("color-{ramp}-{}", css_ident(shade)), hex));
        }
    }
    for (name, hex) in &colors.semantic {
        out.push(var(&format!("color-{}", css_ident(name)), hex));
    }
    out
}

fn fmt_num(n: f64) -> String {
    if n.fract() == 0.0 {
        format!("{}", n as i64)
    } else {
        format!("{n}")
    }
}

fn px(n: f64) -> String {
    if n == 0.0 {
        "0".to_string()
    } else {
        format!("{}px", fmt_num(n))
    }
}

// =============================================================================
// base.css
// =============================================================================

const RESET_CSS: &str = r#"/* Reset */
*, *::before, *::after {
  box-sizing: border-box;
}

* {
  margin: 0;
}

img, picture, video, svg {
  display: block;
  max-width: 100%;
}

input, button, textarea, select {
  font: inherit;
}
"#;

const LINKS_AND_CONTAINER_CSS: &str = r#"a {
  color: var(--color-primary, currentColor);
  text-decoration-thickness: 1px;
  text-underline-offset: 0.15em;
}

a:hover {
  text-decoration: none;
}

.container {
  width: 100%;
  max-width: var(--container-width, 72rem);
  margin-inline: auto;
  padding-inline: var(--space-4, 1rem);
}
"#;

/// Render the base stylesheet. Heading rules are written only for the
/// `h1`..`h6` keys present in the typography styles.
pub fn base_css(design: &DesignSystemSchema, config: &ThemeConfig) -> String {
    let mut blocks: Vec<String> = Vec::new();
    if config.reset {
        blocks.push(RESET_CSS.to_string());
    }

    let body_line_height = design
        .typography
        .styles
        .get("body")
        .map(|s| &s.line_height)
        .filter(|v| !v.is_null())
        .map(css_value)
        .unwrap_or_else(|| "1.6".to_string());
    blocks.push(format!(
        "body {{\n  font-family: var(--font-body);\n  font-size: var(--font-size-base);\n  line-height: {body_line_height};\n  color: var(--color-text, #111);\n  background: var(--color-background, #fff);\n}}\n"
    ));

    for level in 1..=6 {
        let key = format!("h{level}");
        if let Some(style) = design.typography.styles.get(&key) {
            blocks.push(heading_rule(&key, style));
        }
    }

    blocks.push(LINKS_AND_CONTAINER_CSS.to_string());
    blocks.join("\n")
}

fn heading_rule(selector: &str, style: &TextStyle) -> String {
    let mut lines = vec![format!("{selector} {{"), "  font-family: var(--font-heading);".to_string()];
    for (property, value) in [
        ("font-size", &style.font_size),
        ("font-weight", &style.font_weight),
        ("line-height", &style.line_height),
    ] {
        if !value.is_null() {
            lines.push(format!("  {property}: {};", css_value(value)));
        }
    }
    if let Some(spacing) = &style.letter_spacing {
        lines.push(format!("  letter-spacing: {spacing};"));
    }
    lines.push("}".to_string());
    format!("{}\n", lines.join("\n"))
}

// =============================================================================
// utilities.css
// =============================================================================

const LAYOUT_UTILITIES: &str = r#"/* Text */
.text-left { text-align: left; }
.text-center { text-align: center; }
.text-right { text-align: right; }

/* Display */
.block { display: block; }
.inline-block { display: inline-block; }
.hidden { display: none; }
.grid { display: grid; }
.flex { display: flex; }
.inline-flex { display: inline-flex; }

/* Flex */
.flex-col { flex-direction: column; }
.flex-wrap { flex-wrap: wrap; }
.items-center { align-items: center; }
.justify-center { justify-content: center; }
.justify-between { justify-content: space-between; }
"#;

/// Render spacing utilities (eight classes per spacing-scale step) followed
/// by the fixed layout helpers.
pub fn utilities_css(design: &DesignSystemSchema) -> String {
    let mut out = String::from("/* Spacing */\n");
    for i in 0..design.spacing.scale.len() {
        for (prefix, properties) in SPACING_UTILITIES {
            let decls = properties
                .iter()
                .map(|p| format!("{p}: var(--space-{i});"))
                .collect::<Vec<_>>()
                .join(" ");
            out.push_str(&format!(".{prefix}-{i} {{ {decls} }}\n"));
        }
    }
    out.push('\n');
    out.push_str(LAYOUT_UTILITIES);
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::sample_design;

    fn css(design: &DesignSystemSchema) -> String {
        theme_css(design)
    }

    #[test]
    fn emits_four_stylesheets() {
        let files = generate_theme(&sample_design(), &ThemeConfig::default());
        let paths: Vec<&str> = files.iter().map(|f| f.path.as_str()).collect();
        assert_eq!(
            paths,
            vec![
                "assets/css/theme.css",
                "assets/css/base.css",
                "assets/css/utilities.css",
                "assets/css/main.css",
            ]
        );
    }

    #[test]
    fn main_imports_in_fixed_order() {
        let files = generate_theme(&DesignSystemSchema::default(), &ThemeConfig::default());
        let main = files[3].as_text().unwrap();
        let base = main.find("base.css").unwrap();
        let theme = main.find("theme.css").unwrap();
        let utilities = main.find("utilities.css").unwrap();
        assert!(base < theme && theme < utilities);
    }

    #[test]
    fn sections_follow_fixed_order() {
        let out = css(&sample_design());
        let order = [
            "/* Colors */",
            "/* Typography */",
            "/* Spacing */",
            "/* Shadows */",
            "/* Radii */",
            "/* Z-index */",
            "/* Transitions */",
            "/* Breakpoints */",
        ];
        let positions: Vec<usize> = order.iter().map(|s| out.find(s).unwrap()).collect();
        assert!(positions.windows(2).all(|w| w[0] < w[1]), "{out}");
    }

    #[test]
    fn empty_groups_are_omitted() {
        let out = css(&DesignSystemSchema::default());
        assert!(!out.contains("/* Colors */"));
        assert!(!out.contains("/* Palette */"));
        assert!(out.contains("--font-size-base: 16px;"));
    }

    #[test]
    fn nested_tokens_flatten_with_dashes() {
        let out = css(&sample_design());
        assert!(out.contains("--color-brand-primary: #1d4ed8;"));
        assert!(out.contains("--z-modal: 100;"));
        assert!(out.contains("--transition-ease-in-out: 200ms ease-in-out;"));
    }

    #[test]
    fn spacing_scale_becomes_space_steps() {
        let out = css(&sample_design());
        assert!(out.contains("--space-0: 0;"));
        assert!(out.contains("--space-2: 8px;"));
    }

    #[test]
    fn palette_block_only_when_present() {
        let out = css(&sample_design());
        assert!(out.contains("/* Palette */"));
        assert!(out.contains("--color-primary-500: #3b82f6;"));
        assert!(out.contains("--color-success: #16a34a;"));
    }

    #[test]
    fn headings_only_for_existing_styles() {
        let out = base_css(&sample_design(), &ThemeConfig::default());
        assert!(out.contains("h1 {"));
        assert!(out.contains("h2 {"));
        assert!(!out.contains("h3 {"));
        assert!(out.contains("font-size: 3rem;"));
        assert!(out.contains(".container {"));
    }

    #[test]
    fn reset_is_optional() {
        let design = sample_design();
        assert!(base_css(&design, &ThemeConfig::default()).starts_with("/* Reset */"));
        let out = base_css(&design, &ThemeConfig { reset: false });
        assert!(!out.contains("/* Reset */"));
        assert!(out.starts_with("body {"));
    }

    #[test]
    fn eight_spacing_utilities_per_step() {
        let design = sample_design();
        let out = utilities_css(&design);
        let spacing_classes = out
            .lines()
            .filter(|l| SPACING_UTILITIES.iter().any(|(p, _)| l.starts_with(&format!(".{p}-"))))
            .count();
        assert_eq!(spacing_classes, 8 * design.spacing.scale.len());
        assert!(out.contains(".mx-1 { margin-left: var(--space-1); margin-right: var(--space-1); }"));
        assert!(out.contains(".text-center { text-align: center; }"));
    }
}
