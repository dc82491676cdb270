//! Page blueprints: how each entity is laid out in the Kirby panel.
//!
//! ## Layout selection
//!
//! ```text
//! tabs enabled && fields > 6 ──► tabs: content | media | settings
//!                                 (each tab laid out with the column rule)
//! otherwise              ──────► column rule on all fields
//!
//! column rule: fields > 8 ──► two 1/2 columns, left holds ceil(n/2)
//!              otherwise  ──► one 1/1 column
//! ```
//!
//! Every column holds exactly one `type: fields` section. Section keys are
//! `fields`, or `left` / `right` after a split; inside a tab they are prefixed
//! with the tab id (`content_left`) because Kirby requires section keys to be
//! unique across the whole blueprint.

use crate::config::{BlueprintConfig, PageOptions, SiteConfig};
use crate::fields::{FieldMap, TargetField, map_fields};
use crate::naming::{collection_slug, field_key, template_name};
use crate::schema::{ContentSchema, EntitySchema, FieldSchema, FieldType};
use crate::types::OrderedMap;
use serde::Serialize;

/// Entities with more fields than this get tabs (when tabs are enabled).
pub const TAB_THRESHOLD: usize = 6;
/// Field lists longer than this are split into two columns.
pub const SPLIT_THRESHOLD: usize = 8;

/// Key of the fixed slug field on the settings tab.
const SLUG_FIELD: &str = "slug";

/// Directory all page blueprints live in.
pub const PAGE_BLUEPRINT_DIR: &str = "site/blueprints/pages";

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PageBlueprint {
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub num: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<OrderedMap<StatusOption>>,
    pub options: BlueprintOptions,
    #[serde(flatten)]
    pub layout: Layout,
}

/// Top-level layout: a tab map or a bare column list.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Layout {
    Tabs(OrderedMap<Tab>),
    Columns(Vec<Column>),
}

impl Layout {
    pub fn tabs(&self) -> Option<&OrderedMap<Tab>> {
        match self {
            Self::Tabs(tabs) => Some(tabs),
            Self::Columns(_) => None,
        }
    }

    pub fn columns(&self) -> Option<&[Column]> {
        match self {
            Self::Tabs(_) => None,
            Self::Columns(columns) => Some(columns),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Tab {
    pub label: String,
    pub icon: &'static str,
    pub columns: Vec<Column>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Column {
    pub width: &'static str,
    pub sections: OrderedMap<Section>,
}

/// A panel section. Entity blueprints only use `fields` sections; the site
/// blueprint adds `pages` and `files` sections.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Section {
    #[serde(rename = "type")]
    pub kind: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub headline: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub template: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub layout: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fields: Option<FieldMap>,
}

impl Section {
    fn fields(fields: FieldMap) -> Self {
        Self {
            kind: "fields",
            headline: None,
            parent: None,
            template: None,
            layout: None,
            fields: Some(fields),
        }
    }

    /// Field map of a `fields` section.
    pub fn field_map(&self) -> Option<&FieldMap> {
        self.fields.as_ref()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StatusOption {
    pub label: &'static str,
    pub text: &'static str,
}

/// Page options block, with Kirby's camelCase keys.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BlueprintOptions {
    pub change_slug: bool,
    pub change_status: bool,
    pub delete: bool,
    pub duplicate: bool,
    pub preview: bool,
    pub read: bool,
    pub update: bool,
}

impl From<&PageOptions> for BlueprintOptions {
    fn from(o: &PageOptions) -> Self {
        Self {
            change_slug: o.change_slug,
            change_status: o.change_status,
            delete: o.delete,
            duplicate: o.duplicate,
            preview: o.preview,
            read: o.read,
            update: o.update,
        }
    }
}

fn status_block() -> OrderedMap<StatusOption> {
    let mut status = OrderedMap::new();
    status.insert(
        "draft",
        StatusOption {
            label: "Draft",
            text: "The page is still in draft mode and only visible to editors",
        },
    );
    status.insert(
        "listed",
        StatusOption {
            label: "Published",
            text: "The page is public and listed",
        },
    );
    status.insert(
        "unlisted",
        StatusOption {
            label: "Unlisted",
            text: "The page is public but hidden from listings",
        },
    );
    status
}

/// Blueprint file name for an entity: `<template>.yml`.
pub fn blueprint_filename(entity: &EntitySchema) -> String {
    format!("{}.yml", template_name(&entity.id))
}

/// Root-relative path of an entity blueprint.
pub fn blueprint_path(entity: &EntitySchema) -> String {
    format!("{PAGE_BLUEPRINT_DIR}/{}", blueprint_filename(entity))
}

/// Build the panel blueprint for one entity.
pub fn generate_blueprint(entity: &EntitySchema, config: &BlueprintConfig) -> PageBlueprint {
    let layout = if config.tabs && entity.fields.len() > TAB_THRESHOLD {
        Layout::Tabs(plan_tabs(&entity.fields))
    } else {
        Layout::Columns(plan_columns(&entity.fields, None))
    };
    PageBlueprint {
        title: entity.name.clone(),
        icon: entity.icon.clone(),
        num: entity.sortable.unwrap_or(false).then_some("default"),
        status: config.drafts.then(status_block),
        options: BlueprintOptions::from(&config.options),
        layout,
    }
}

fn plan_tabs(fields: &[FieldSchema]) -> OrderedMap<Tab> {
    let (media, content): (Vec<FieldSchema>, Vec<FieldSchema>) =
        fields.iter().cloned().partition(|f| f.field_type.is_media());

    let mut tabs = OrderedMap::new();
    if !content.is_empty() {
        tabs.insert(
            "content",
            Tab {
                label: "Content".to_string(),
                icon: "text",
                columns: plan_columns(&content, Some("content")),
            },
        );
    }
    if !media.is_empty() {
        tabs.insert(
            "media",
            Tab {
                label: "Media".to_string(),
                icon: "image",
                columns: plan_columns(&media, Some("media")),
            },
        );
    }
    // Field keys share one namespace across tabs; an entity with its own
    // `slug` field keeps it and gets no settings tab.
    if fields.iter().any(|f| field_key(&f.name) == SLUG_FIELD) {
        return tabs;
    }
    let mut settings = FieldMap::new();
    let mut slug = TargetField::new("slug", "URL slug");
    slug.help = Some("Used in the page address".to_string());
    settings.insert(SLUG_FIELD, slug);
    let mut sections = OrderedMap::new();
    sections.insert("settings_fields", Section::fields(settings));
    tabs.insert(
        "settings",
        Tab {
            label: "Settings".to_string(),
            icon: "settings",
            columns: vec![Column {
                width: "1/1",
                sections,
            }],
        },
    );
    tabs
}

/// Column rule shared by the whole entity and by each tab.
pub fn plan_columns(fields: &[FieldSchema], prefix: Option<&str>) -> Vec<Column> {
    let key = |name: &str| match prefix {
        Some(p) => format!("{p}_{name}"),
        None => name.to_string(),
    };
    let column = |width, name: &str, fields: &[FieldSchema]| {
        let mut sections = OrderedMap::new();
        sections.insert(key(name), Section::fields(map_fields(fields)));
        Column { width, sections }
    };

    if fields.len() > SPLIT_THRESHOLD {
        let (left, right) = fields.split_at(fields.len().div_ceil(2));
        vec![column("1/2", "left", left), column("1/2", "right", right)]
    } else {
        vec![column("1/1", "fields", fields)]
    }
}

// =============================================================================
// Site and design-token blueprints
// =============================================================================

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SiteBlueprint {
    pub title: String,
    pub columns: Vec<Column>,
}

/// `site/blueprints/site.yml`: one pages section per entity collection and a
/// files section.
pub fn site_blueprint(schema: &ContentSchema, config: &SiteConfig) -> SiteBlueprint {
    let mut pages = OrderedMap::new();
    for entity in &schema.entities {
        let template = template_name(&entity.id);
        let headline = if entity.plural_name.trim().is_empty() {
            entity.name.clone()
        } else {
            entity.plural_name.clone()
        };
        pages.insert(
            template.clone(),
            Section {
                kind: "pages",
                headline: Some(headline),
                parent: Some(format!(
                    "site.find(\"{}\")",
                    collection_slug(&entity.plural_name, &entity.id)
                )),
                template: Some(template),
                layout: Some("list"),
                fields: None,
            },
        );
    }
    let mut files = OrderedMap::new();
    files.insert(
        "files",
        Section {
            kind: "files",
            headline: Some("Files".to_string()),
            parent: None,
            template: None,
            layout: Some("cards"),
            fields: None,
        },
    );
    SiteBlueprint {
        title: config.site.title.clone(),
        columns: vec![
            Column {
                width: "2/3",
                sections: pages,
            },
            Column {
                width: "1/3",
                sections: files,
            },
        ],
    }
}

/// Blueprint for editing design tokens in the panel, one tab per category.
pub fn design_tokens_blueprint() -> PageBlueprint {
    let token_list = |name: &str, value_type: FieldType| {
        let mut f = FieldSchema::new(name, FieldType::Structure);
        f.options.fields = vec![
            FieldSchema::new("name", FieldType::Text),
            FieldSchema::new("value", value_type),
        ];
        f
    };
    let number = |name: &str, label: &str| {
        let mut f = FieldSchema::new(name, FieldType::Number);
        f.label = label.to_string();
        f.width = Some(crate::schema::Width::Half);
        f
    };
    let text = |name: &str, label: &str| {
        let mut f = FieldSchema::new(name, FieldType::Text);
        f.label = label.to_string();
        f.width = Some(crate::schema::Width::Half);
        f
    };

    let groups: [(&str, &str, &'static str, Vec<FieldSchema>); 4] = [
        ("colors", "Colors", "palette", vec![token_list("colors", FieldType::Color)]),
        (
            "typography",
            "Typography",
            "title",
            vec![
                text("headingFont", "Heading font"),
                text("bodyFont", "Body font"),
                number("baseFontSize", "Base font size (px)"),
                number("scale", "Type scale"),
            ],
        ),
        (
            "spacing",
            "Spacing",
            "grid",
            vec![
                number("baseUnit", "Base unit (px)"),
                FieldSchema::new("spacingScale", FieldType::Tags),
            ],
        ),
        (
            "effects",
            "Effects",
            "wand",
            vec![
                token_list("shadows", FieldType::Text),
                token_list("radii", FieldType::Text),
                token_list("transitions", FieldType::Text),
            ],
        ),
    ];

    let mut tabs = OrderedMap::new();
    for (id, label, icon, fields) in groups {
        tabs.insert(
            id,
            Tab {
                label: label.to_string(),
                icon,
                columns: plan_columns(&fields, Some(id)),
            },
        );
    }
    PageBlueprint {
        title: "Design tokens".to_string(),
        icon: Some("palette".to_string()),
        num: None,
        status: None,
        options: BlueprintOptions {
            change_slug: false,
            change_status: false,
            delete: false,
            duplicate: false,
            preview: false,
            read: true,
            update: true,
        },
        layout: Layout::Tabs(tabs),
    }
}

/// Render any blueprint to YAML.
pub fn to_yaml<T: Serialize>(blueprint: &T) -> Result<String, serde_yaml::Error> {
    serde_yaml::to_string(blueprint)
}
