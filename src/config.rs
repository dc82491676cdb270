//! Generator configuration.
//!
//! Handles loading, validating, and merging `folio.toml`. Stock defaults are
//! overridden by whatever the user file specifies; the file is optional.
//!
//! ## Configuration Options
//!
//! ```toml
//! # All options are optional - defaults shown below
//!
//! [site]
//! title = "Portfolio"
//! language = "en"
//! debug = false             # Kirby debug mode in site/config/config.php
//! panel_install = false     # Allow installing the panel on a public server
//! dev_server_script = true  # Emit an executable serve.sh
//!
//! [blueprints]
//! tabs = true               # Tabbed layout for entities with more than 6 fields
//! drafts = true             # Attach the draft/listed/unlisted status block
//! design_tokens_panel = true
//!
//! [blueprints.options]
//! change_slug = true
//! change_status = true
//! delete = true
//! duplicate = true
//! preview = true
//! read = true
//! update = true
//!
//! [content]
//! boolean_format = "true-false"  # or "yes-no", "one-zero"
//! include_metadata = true        # Created/Updated/Author/Published trailer
//! markdown_richtext = true       # Render markdown in richtext values to HTML
//!
//! [theme]
//! reset = true              # Prepend a CSS reset to base.css
//! ```
//!
//! Unknown keys are rejected to catch typos early.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use thiserror::Error;

/// Name of the config file looked up in the working directory.
pub const CONFIG_FILENAME: &str = "folio.toml";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("Config validation error: {0}")]
    Validation(String),
}

/// Generator configuration loaded from `folio.toml`.
///
/// Constructed once per run and passed by reference to every generator;
/// nothing mutates it after loading.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SiteConfig {
    /// Site-wide settings and scaffold switches.
    pub site: SiteSettings,
    /// Panel layout of generated blueprints.
    pub blueprints: BlueprintConfig,
    /// Content file serialization conventions.
    pub content: ContentConfig,
    /// Stylesheet generation switches.
    pub theme: ThemeConfig,
}

impl SiteConfig {
    /// Validate config values are within acceptable ranges.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.site.title.trim().is_empty() {
            return Err(ConfigError::Validation(
                "site.title must not be empty".into(),
            ));
        }
        if self.site.language.len() != 2 || !self.site.language.chars().all(|c| c.is_ascii_lowercase()) {
            return Err(ConfigError::Validation(
                "site.language must be a two-letter lowercase code".into(),
            ));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SiteSettings {
    /// Site title written to `content/site.txt` and the panel.
    pub title: String,
    /// Two-letter language code used in the page wrapper.
    pub language: String,
    /// Kirby debug mode.
    pub debug: bool,
    /// Allow the panel installer on non-local hosts.
    pub panel_install: bool,
    /// Emit an executable `serve.sh` for the PHP development server.
    pub dev_server_script: bool,
}

impl Default for SiteSettings {
    fn default() -> Self {
        Self {
            title: "Portfolio".to_string(),
            language: "en".to_string(),
            debug: false,
            panel_install: false,
            dev_server_script: true,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct BlueprintConfig {
    /// Use tabs for entities with more than six fields.
    pub tabs: bool,
    /// Attach the draft/listed/unlisted status block.
    pub drafts: bool,
    /// Emit the design-token editing blueprint.
    pub design_tokens_panel: bool,
    /// Page options block attached to every entity blueprint.
    pub options: PageOptions,
}

impl Default for BlueprintConfig {
    fn default() -> Self {
        Self {
            tabs: true,
            drafts: true,
            design_tokens_panel: true,
            options: PageOptions::default(),
        }
    }
}

/// Panel permissions for generated pages.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PageOptions {
    pub change_slug: bool,
    pub change_status: bool,
    pub delete: bool,
    pub duplicate: bool,
    pub preview: bool,
    pub read: bool,
    pub update: bool,
}

impl Default for PageOptions {
    fn default() -> Self {
        Self {
            change_slug: true,
            change_status: true,
            delete: true,
            duplicate: true,
            preview: true,
            read: true,
            update: true,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ContentConfig {
    /// How boolean values are written.
    pub boolean_format: BooleanFormat,
    /// Append Created/Updated/Author/Published entries.
    pub include_metadata: bool,
    /// Render markdown found in richtext values to HTML.
    pub markdown_richtext: bool,
}

impl Default for ContentConfig {
    fn default() -> Self {
        Self {
            boolean_format: BooleanFormat::TrueFalse,
            include_metadata: true,
            markdown_richtext: true,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum BooleanFormat {
    #[default]
    TrueFalse,
    YesNo,
    OneZero,
}

impl BooleanFormat {
    pub fn format(self, value: bool) -> &'static str {
        match (self, value) {
            (Self::TrueFalse, true) => "true",
            (Self::TrueFalse, false) => "false",
            (Self::YesNo, true) => "yes",
            (Self::YesNo, false) => "no",
            (Self::OneZero, true) => "1",
            (Self::OneZero, false) => "0",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ThemeConfig {
    /// Prepend a CSS reset block to `base.css`.
    pub reset: bool,
}

impl Default for ThemeConfig {
    fn default() -> Self {
        Self { reset: true }
    }
}

// =============================================================================
// Config loading, merging, and validation
// =============================================================================

/// `SiteConfig::default()` as a TOML table: the bottom layer every
/// `folio.toml` is merged onto.
pub fn stock_defaults_value() -> Result<toml::Value, ConfigError> {
    toml::Value::try_from(SiteConfig::default())
        .map_err(|e| ConfigError::Validation(format!("default config must serialize: {e}")))
}

/// Layer `overlay` over `base`. Tables merge per key and recurse; any other
/// overlay value replaces the base value. Base keys absent from the overlay
/// survive.
pub fn merge_toml(base: toml::Value, overlay: toml::Value) -> toml::Value {
    match (base, overlay) {
        (toml::Value::Table(mut base_table), toml::Value::Table(overlay_table)) => {
            for (key, overlay_val) in overlay_table {
                let merged = match base_table.remove(&key) {
                    Some(base_val) => merge_toml(base_val, overlay_val),
                    None => overlay_val,
                };
                base_table.insert(key, merged);
            }
            toml::Value::Table(base_table)
        }
        (_, overlay) => overlay,
    }
}

/// Load a config file as a raw TOML value.
///
/// Returns `Ok(None)` if the file does not exist.
/// Returns `Err` if the file exists but contains invalid TOML.
pub fn load_raw_config(config_path: &Path) -> Result<Option<toml::Value>, ConfigError> {
    if !config_path.exists() {
        return Ok(None);
    }
    let content = fs::read_to_string(config_path)?;
    let value: toml::Value = toml::from_str(&content)?;
    Ok(Some(value))
}

/// Merge an optional overlay onto a base value, then deserialize and validate.
pub fn resolve_config(
    base: toml::Value,
    overlay: Option<toml::Value>,
) -> Result<SiteConfig, ConfigError> {
    let merged = match overlay {
        Some(ov) => merge_toml(base, ov),
        None => base,
    };
    let config: SiteConfig = merged.try_into()?;
    config.validate()?;
    Ok(config)
}

/// Load config from the given file path.
///
/// Merges user values on top of stock defaults, rejects unknown keys,
/// and validates the result. A missing file yields the stock defaults.
pub fn load_config(config_path: &Path) -> Result<SiteConfig, ConfigError> {
    let base = stock_defaults_value()?;
    let overlay = load_raw_config(config_path)?;
    resolve_config(base, overlay)
}

/// Returns a fully-commented stock `folio.toml` with all keys and explanations.
///
/// Used by the `gen-config` CLI command.
pub fn stock_config_toml() -> &'static str {
    r##"# folio-gen Configuration
# =======================
# All settings are optional. Remove or comment out any you don't need.
# Values shown below are the defaults. Unknown keys will cause an error.

# ---------------------------------------------------------------------------
# Site
# ---------------------------------------------------------------------------
[site]
# Site title, written to content/site.txt.
title = "Portfolio"

# Two-letter language code for the <html lang> attribute.
language = "en"

# Kirby debug mode (never enable on a public server).
debug = false

# Allow the panel installer on a non-local server.
panel_install = false

# Emit an executable serve.sh that runs the PHP development server.
dev_server_script = true

# ---------------------------------------------------------------------------
# Blueprints (panel layout)
# ---------------------------------------------------------------------------
[blueprints]
# Split entities with more than 6 fields into content/media/settings tabs.
tabs = true

# Attach the draft / listed / unlisted status block to every page.
drafts = true

# Emit site/blueprints/pages/design-tokens.yml for editing tokens in the panel.
design_tokens_panel = true

# Page options attached to every generated page blueprint.
[blueprints.options]
change_slug = true
change_status = true
delete = true
duplicate = true
preview = true
read = true
update = true

# ---------------------------------------------------------------------------
# Content files
# ---------------------------------------------------------------------------
[content]
# How boolean values are written: "true-false", "yes-no" or "one-zero".
boolean_format = "true-false"

# Append Created / Updated / Author / Published entries to every record.
include_metadata = true

# Render markdown found in richtext values to HTML for the writer field.
markdown_richtext = true

# ---------------------------------------------------------------------------
# Theme
# ---------------------------------------------------------------------------
[theme]
# Prepend a CSS reset block to base.css.
reset = true
"##
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn default_config_has_site_settings() {
        let config = SiteConfig::default();
        assert_eq!(config.site.title, "Portfolio");
        assert_eq!(config.site.language, "en");
        assert!(config.site.dev_server_script);
    }

    #[test]
    fn default_config_has_blueprint_settings() {
        let config = SiteConfig::default();
        assert!(config.blueprints.tabs);
        assert!(config.blueprints.drafts);
        assert!(config.blueprints.design_tokens_panel);
        assert_eq!(config.blueprints.options, PageOptions::default());
    }

    #[test]
    fn parse_partial_config() {
        let toml = r#"
[content]
boolean_format = "yes-no"
"#;
        let config: SiteConfig = toml::from_str(toml).unwrap();
        assert_eq!(config.content.boolean_format, BooleanFormat::YesNo);
        // Defaults preserved
        assert!(config.content.include_metadata);
        assert!(config.blueprints.tabs);
    }

    #[test]
    fn parse_nested_options() {
        let toml = r#"
[blueprints.options]
delete = false
"#;
        let config: SiteConfig = toml::from_str(toml).unwrap();
        assert!(!config.blueprints.options.delete);
        assert!(config.blueprints.options.duplicate);
    }

    #[test]
    fn boolean_formats() {
        assert_eq!(BooleanFormat::TrueFalse.format(true), "true");
        assert_eq!(BooleanFormat::YesNo.format(false), "no");
        assert_eq!(BooleanFormat::OneZero.format(true), "1");
    }

    // =========================================================================
    // load_config tests
    // =========================================================================

    #[test]
    fn load_config_returns_default_when_no_file() {
        let tmp = TempDir::new().unwrap();
        let config = load_config(&tmp.path().join(CONFIG_FILENAME)).unwrap();
        assert_eq!(config.site.title, "Portfolio");
    }

    #[test]
    fn load_config_reads_file() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join(CONFIG_FILENAME);
        fs::write(
            &path,
            r#"
[site]
title = "Blue Note Quartet"

[blueprints]
tabs = false
"#,
        )
        .unwrap();

        let config = load_config(&path).unwrap();
        assert_eq!(config.site.title, "Blue Note Quartet");
        assert!(!config.blueprints.tabs);
        // Unspecified values should be defaults
        assert!(config.blueprints.drafts);
        assert_eq!(config.site.language, "en");
    }

    #[test]
    fn load_config_invalid_toml_is_error() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join(CONFIG_FILENAME);
        fs::write(&path, "this is not valid toml [[[").unwrap();

        let result = load_config(&path);
        assert!(matches!(result, Err(ConfigError::Toml(_))));
    }

    #[test]
    fn load_config_validates_values() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join(CONFIG_FILENAME);
        fs::write(&path, "[site]\ntitle = \"  \"\n").unwrap();

        let result = load_config(&path);
        assert!(matches!(result, Err(ConfigError::Validation(_))));
    }

    // =========================================================================
    // Unknown key rejection tests
    // =========================================================================

    #[test]
    fn unknown_key_rejected() {
        let toml_str = r#"
[blueprints]
tab = true
"#;
        let result: Result<SiteConfig, _> = toml::from_str(toml_str);
        let err = result.unwrap_err().to_string();
        assert!(err.contains("unknown field"));
    }

    #[test]
    fn unknown_section_rejected() {
        let result: Result<SiteConfig, _> = toml::from_str("[themes]\nreset = true\n");
        assert!(result.is_err());
    }

    #[test]
    fn unknown_boolean_format_rejected() {
        let result: Result<SiteConfig, _> =
            toml::from_str("[content]\nboolean_format = \"on-off\"\n");
        assert!(result.is_err());
    }

    // =========================================================================
    // merge_toml tests
    // =========================================================================

    #[test]
    fn merge_toml_scalar_override() {
        let base: toml::Value = toml::from_str(r#"tabs = true"#).unwrap();
        let overlay: toml::Value = toml::from_str(r#"tabs = false"#).unwrap();
        let merged = merge_toml(base, overlay);
        assert_eq!(merged.get("tabs").unwrap().as_bool(), Some(false));
    }

    #[test]
    fn merge_toml_deep_nested() {
        let base: toml::Value = toml::from_str(
            r#"
[blueprints.options]
delete = true
read = true
"#,
        )
        .unwrap();
        let overlay: toml::Value = toml::from_str(
            r#"
[blueprints.options]
delete = false
"#,
        )
        .unwrap();
        let merged = merge_toml(base, overlay);
        let options = merged.get("blueprints").unwrap().get("options").unwrap();
        assert_eq!(options.get("delete").unwrap().as_bool(), Some(false));
        assert_eq!(options.get("read").unwrap().as_bool(), Some(true));
    }

    // =========================================================================
    // Validation tests
    // =========================================================================

    #[test]
    fn validate_default_config_passes() {
        assert!(SiteConfig::default().validate().is_ok());
    }

    #[test]
    fn validate_language_code() {
        let mut config = SiteConfig::default();
        config.site.language = "english".to_string();
        assert!(config.validate().is_err());
        config.site.language = "de".to_string();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn resolve_config_with_overlay() {
        let base = stock_defaults_value().unwrap();
        let overlay: toml::Value = toml::from_str("[theme]\nreset = false\n").unwrap();
        let config = resolve_config(base, Some(overlay)).unwrap();
        assert!(!config.theme.reset);
        assert_eq!(config.site.title, "Portfolio");
    }

    // =========================================================================
    // stock_config_toml tests
    // =========================================================================

    #[test]
    fn stock_config_toml_roundtrips_to_defaults() {
        let config: SiteConfig = toml::from_str(stock_config_toml()).unwrap();
        let defaults = SiteConfig::default();
        assert_eq!(config.site.title, defaults.site.title);
        assert_eq!(config.blueprints.options, defaults.blueprints.options);
        assert_eq!(config.content.boolean_format, defaults.content.boolean_format);
        assert_eq!(config.theme.reset, defaults.theme.reset);
    }

    #[test]
    fn stock_config_toml_contains_all_sections() {
        let content = stock_config_toml();
        for section in ["[site]", "[blueprints]", "[blueprints.options]", "[content]", "[theme]"] {
            assert!(content.contains(section), "missing {section}");
        }
    }

    #[test]
    fn stock_defaults_value_has_all_sections() {
        let val = stock_defaults_value().unwrap();
        assert!(val.is_table());
        for section in ["site", "blueprints", "content", "theme"] {
            assert!(val.get(section).is_some(), "missing {section}");
        }
    }
}
