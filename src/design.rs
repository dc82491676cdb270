//! Design-token collection produced by the design-automation step.
//!
//! Token groups are ordered maps from token name to a JSON scalar or a
//! nested map (`{"primary": {"500": "#3b82f6"}}`). Nested maps are flattened
//! by the theme generator with `-` joining the keys.
//!
//! Every part is optional: a design system with only a couple of colors still
//! yields a valid stylesheet set.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// Ordered name → value map for one token category.
pub type TokenGroup = BTreeMap<String, Value>;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct DesignSystemSchema {
    pub tokens: DesignTokens,
    pub typography: TypographyConfig,
    pub spacing: SpacingConfig,
    pub colors: ColorPalette,
    pub breakpoints: TokenGroup,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct DesignTokens {
    pub colors: TokenGroup,
    pub fonts: TokenGroup,
    pub spacing: TokenGroup,
    pub shadows: TokenGroup,
    pub borders: TokenGroup,
    pub radii: TokenGroup,
    pub z_index: TokenGroup,
    pub transitions: TokenGroup,
}

impl DesignTokens {
    pub fn token_count(&self) -> usize {
        [
            &self.colors,
            &self.fonts,
            &self.spacing,
            &self.shadows,
            &self.borders,
            &self.radii,
            &self.z_index,
            &self.transitions,
        ]
        .iter()
        .map(|group| group.len())
        .sum()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct TypographyConfig {
    /// Root font size in pixels.
    pub base_font_size: f64,
    /// Modular scale ratio between heading levels.
    pub scale: f64,
    pub heading_font: String,
    pub body_font: String,
    /// Style key (`body`, `h1` … `h6`, `caption`, …) → text style.
    pub styles: BTreeMap<String, TextStyle>,
}

impl Default for TypographyConfig {
    fn default() -> Self {
        Self {
            base_font_size: 16.0,
            scale: 1.25,
            heading_font: "system-ui, sans-serif".to_string(),
            body_font: "system-ui, sans-serif".to_string(),
            styles: BTreeMap::new(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TextStyle {
    #[serde(default)]
    pub font_size: Value,
    #[serde(default)]
    pub font_weight: Value,
    #[serde(default)]
    pub line_height: Value,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub letter_spacing: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SpacingConfig {
    /// Base unit in pixels; scale entries are multipliers of it.
    pub base_unit: f64,
    pub scale: Vec<f64>,
}

impl Default for SpacingConfig {
    fn default() -> Self {
        Self {
            base_unit: 4.0,
            scale: vec![0.0, 1.0, 2.0, 3.0, 4.0, 6.0, 8.0, 12.0, 16.0],
        }
    }
}

/// Shade ramp (`"50"` … `"900"` → hex) per palette role.
pub type ShadeRamp = BTreeMap<String, String>;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ColorPalette {
    pub primary: ShadeRamp,
    pub secondary: ShadeRamp,
    pub accent: ShadeRamp,
    pub neutral: ShadeRamp,
    pub semantic: BTreeMap<String, String>,
}

impl ColorPalette {
    /// Named ramps in their fixed output order.
    pub fn ramps(&self) -> [(&'static str, &ShadeRamp); 4] {
        [
            ("primary", &self.primary),
            ("secondary", &self.secondary),
            ("accent", &self.accent),
            ("neutral", &self.neutral),
        ]
    }

    /// True when any ramp or semantic color is present.
    pub fn is_extended(&self) -> bool {
        self.ramps().iter().any(|(_, ramp)| !ramp.is_empty()) || !self.semantic.is_empty()
    }
}
