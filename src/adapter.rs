//! Kirby adapter: composes the generators into a site.
//!
//! The three `convert_*` operations are independent and pure: each takes one
//! input document and returns the files it maps to plus a few counts.
//! [`KirbyAdapter::build_site`] validates the schema and concatenates every
//! generator's output into one [`SiteManifest`];
//! [`KirbyAdapter::generate_site`] applies that manifest to a [`FileSink`].
//! Validation always runs before anything is handed to the sink, so a schema
//! with errors writes nothing.
//!
//! ```text
//! ContentSchema ──► validate ──► errors? ──► GenerateError::Validation
//!      │
//!      ├──► blueprints, collection pages ─┐
//!      ├──► templates, snippets ──────────┤
//! content ──► content files ──────────────┼──► SiteManifest ──► FileSink
//! design ──► stylesheets ─────────────────┤
//! config ──► scaffold ────────────────────┘
//! ```

use crate::blueprint::{
    PAGE_BLUEPRINT_DIR, blueprint_path, design_tokens_blueprint, generate_blueprint,
    site_blueprint, to_yaml,
};
use crate::config::SiteConfig;
use crate::content::{ContentItem, StructuredContentCollection};
use crate::design::DesignSystemSchema;
use crate::naming::collection_slug;
use crate::scaffold::scaffold;
use crate::schema::ContentSchema;
use crate::serialize::serialize_entity_items;
use crate::sink::{FileSink, SinkError, duplicate_paths};
use crate::templates::{generate_templates, shared_templates};
use crate::theme::generate_theme;
use crate::types::GeneratedFile;
use crate::validate::{ValidationReport, validate_schema};
use sha2::{Digest, Sha256};
use std::collections::BTreeMap;
use thiserror::Error;

pub const SITE_BLUEPRINT_PATH: &str = "site/blueprints/site.yml";

#[derive(Error, Debug)]
pub enum GenerateError {
    #[error("schema validation failed:\n  {}", .0.join("\n  "))]
    Validation(Vec<String>),
    #[error("generated paths collide: {}", .0.join(", "))]
    DuplicatePaths(Vec<String>),
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),
    #[error(transparent)]
    Sink(#[from] SinkError),
}

/// Everything a site is generated from.
#[derive(Debug, Clone, Default)]
pub struct SiteInput {
    pub schema: ContentSchema,
    /// Items keyed by entity id. Items are matched against `schema`, not
    /// against the schema embedded in the collection.
    pub content: Option<StructuredContentCollection>,
    /// Without a design system the theme still emits every stylesheet.
    pub design: Option<DesignSystemSchema>,
}

#[derive(Debug, Clone, Default)]
pub struct SchemaConversion {
    /// Page, site, and design-token blueprints plus collection pages.
    pub blueprints: Vec<GeneratedFile>,
    /// Entity templates, structure snippets, and shared templates.
    pub templates: Vec<GeneratedFile>,
    pub blueprint_count: usize,
    pub template_count: usize,
    pub snippet_count: usize,
}

impl SchemaConversion {
    pub fn files(&self) -> impl Iterator<Item = &GeneratedFile> {
        self.blueprints.iter().chain(&self.templates)
    }
}

/// An item that produced no file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedItem {
    pub entity_type: String,
    pub item_id: String,
    pub reason: String,
}

#[derive(Debug, Clone, Default)]
pub struct ContentConversion {
    pub files: Vec<GeneratedFile>,
    /// Entity id → number of files written for it.
    pub counts: BTreeMap<String, usize>,
    pub skipped: Vec<SkippedItem>,
}

impl ContentConversion {
    pub fn item_count(&self) -> usize {
        self.counts.values().sum()
    }
}

#[derive(Debug, Clone, Default)]
pub struct ThemeConversion {
    pub files: Vec<GeneratedFile>,
    pub token_count: usize,
}

/// The in-memory result of a successful build, in write order.
#[derive(Debug, Clone, Default)]
pub struct SiteManifest {
    pub files: Vec<GeneratedFile>,
    pub report: ValidationReport,
    pub entity_count: usize,
    pub item_count: usize,
    pub skipped: Vec<SkippedItem>,
}

impl SiteManifest {
    /// SHA-256 over every path and body in manifest order.
    pub fn digest(&self) -> String {
        let mut hasher = Sha256::new();
        for file in &self.files {
            hasher.update(file.path.as_bytes());
            hasher.update(b"\0");
            hasher.update(file.bytes());
            hasher.update(b"\0");
        }
        format!("{:x}", hasher.finalize())
    }

    /// Validator warnings and skipped items, as display strings.
    pub fn warnings(&self) -> Vec<String> {
        let issues = self.report.warnings.iter().map(|w| match &w.path {
            Some(path) => format!("{path}: {}", w.message),
            None => w.message.clone(),
        });
        let skipped = self
            .skipped
            .iter()
            .map(|s| format!("{}/{}: skipped ({})", s.entity_type, s.item_id, s.reason));
        issues.chain(skipped).collect()
    }
}

#[derive(Debug, Clone)]
pub struct GenerationSummary {
    pub file_count: usize,
    pub entity_count: usize,
    pub item_count: usize,
    pub warnings: Vec<String>,
    pub digest: String,
    pub instructions: Vec<String>,
}

pub struct KirbyAdapter {
    config: SiteConfig,
}

impl KirbyAdapter {
    pub fn new(config: SiteConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &SiteConfig {
        &self.config
    }

    /// Blueprints, templates and snippets for every entity, plus the site
    /// and design-token blueprints and one page per collection.
    pub fn convert_schema(&self, schema: &ContentSchema) -> Result<SchemaConversion, GenerateError> {
        let mut out = SchemaConversion::default();

        out.blueprints.push(GeneratedFile::text(
            SITE_BLUEPRINT_PATH,
            to_yaml(&site_blueprint(schema, &self.config))?,
        ));
        for entity in &schema.entities {
            let blueprint = generate_blueprint(entity, &self.config.blueprints);
            out.blueprints
                .push(GeneratedFile::text(blueprint_path(entity), to_yaml(&blueprint)?));
        }
        if self.config.blueprints.design_tokens_panel {
            out.blueprints.push(GeneratedFile::text(
                format!("{PAGE_BLUEPRINT_DIR}/design-tokens.yml"),
                to_yaml(&design_tokens_blueprint())?,
            ));
        }
        out.blueprint_count = out.blueprints.len();

        for entity in &schema.entities {
            out.blueprints.push(GeneratedFile::text(
                format!(
                    "content/{}/default.txt",
                    collection_slug(&entity.plural_name, &entity.id)
                ),
                format!("Title: {}\n", collection_title(&entity.plural_name, &entity.name)),
            ));
        }
        if self.config.blueprints.design_tokens_panel {
            out.blueprints.push(GeneratedFile::text(
                "content/design-tokens/design-tokens.txt",
                "Title: Design Tokens\n",
            ));
        }

        for entity in &schema.entities {
            let templates = generate_templates(entity);
            out.template_count += 1;
            out.snippet_count += templates.snippets.len();
            out.templates.extend(templates.into_files());
        }
        out.templates.extend(shared_templates(&self.config));

        tracing::debug!(
            entities = schema.entities.len(),
            blueprints = out.blueprint_count,
            templates = out.template_count,
            snippets = out.snippet_count,
            "converted schema"
        );
        Ok(out)
    }

    /// One content file per item.
    pub fn convert_content(&self, collection: &StructuredContentCollection) -> ContentConversion {
        self.serialize_content(&collection.schema, &collection.content)
    }

    pub fn convert_design_system(&self, design: &DesignSystemSchema) -> ThemeConversion {
        let files = generate_theme(design, &self.config.theme);
        tracing::debug!(tokens = design.tokens.token_count(), "converted design system");
        ThemeConversion {
            files,
            token_count: design.tokens.token_count(),
        }
    }

    /// Validate and build the full manifest without touching any sink.
    ///
    /// Order: scaffold, blueprints, content, templates, theme. Every path in
    /// the manifest is unique.
    pub fn build_site(&self, input: &SiteInput) -> Result<SiteManifest, GenerateError> {
        let report = validate_schema(&input.schema);
        if !report.valid {
            tracing::warn!(errors = report.errors.len(), "schema validation failed");
            return Err(GenerateError::Validation(report.error_messages()));
        }
        for warning in &report.warnings {
            tracing::warn!(code = warning.code, path = ?warning.path, "{}", warning.message);
        }

        let schema = self.convert_schema(&input.schema)?;
        let content = match &input.content {
            Some(collection) => self.serialize_content(&input.schema, &collection.content),
            None => ContentConversion::default(),
        };
        let default_design = DesignSystemSchema::default();
        let theme = self.convert_design_system(input.design.as_ref().unwrap_or(&default_design));

        let mut files = scaffold(&self.config);
        files.extend(schema.blueprints);
        files.extend(content.files);
        files.extend(schema.templates);
        files.extend(theme.files);

        let repeated = duplicate_paths(&files);
        if !repeated.is_empty() {
            tracing::error!(paths = ?repeated, "manifest paths collide");
            return Err(GenerateError::DuplicatePaths(repeated));
        }

        Ok(SiteManifest {
            files,
            report,
            entity_count: input.schema.entities.len(),
            item_count: content.counts.values().sum(),
            skipped: content.skipped,
        })
    }

    /// Build the manifest and write it to `sink`.
    pub fn generate_site(
        &self,
        input: &SiteInput,
        sink: &dyn FileSink,
    ) -> Result<GenerationSummary, GenerateError> {
        let manifest = self.build_site(input)?;
        tracing::info!(files = manifest.files.len(), "writing site");
        sink.write_all(&manifest.files)?;

        Ok(GenerationSummary {
            file_count: manifest.files.len(),
            entity_count: manifest.entity_count,
            item_count: manifest.item_count,
            warnings: manifest.warnings(),
            digest: manifest.digest(),
            instructions: self.instructions(),
        })
    }

    fn serialize_content(
        &self,
        schema: &ContentSchema,
        content: &BTreeMap<String, Vec<ContentItem>>,
    ) -> ContentConversion {
        let mut out = ContentConversion::default();
        for (entity_id, items) in content {
            let Some(entity) = schema.entity(entity_id) else {
                tracing::warn!(entity = %entity_id, items = items.len(), "content for unknown entity");
                out.skipped.extend(items.iter().map(|item| SkippedItem {
                    entity_type: entity_id.clone(),
                    item_id: item.id.clone(),
                    reason: format!("no entity '{entity_id}' in schema"),
                }));
                continue;
            };
            let files = serialize_entity_items(items, entity, &self.config.content);
            out.counts.insert(entity_id.clone(), files.len());
            out.files.extend(files);
        }
        tracing::debug!(
            items = out.item_count(),
            skipped = out.skipped.len(),
            "converted content"
        );
        out
    }

    fn instructions(&self) -> Vec<String> {
        let serve = if self.config.site.dev_server_script {
            "Start the development server: ./serve.sh"
        } else {
            "Start the development server: php -S localhost:8000 kirby/router.php"
        };
        vec![
            "Install Kirby: composer install".to_string(),
            serve.to_string(),
            "Open http://localhost:8000/panel and create the first account".to_string(),
            "Review the generated blueprints in site/blueprints/".to_string(),
        ]
    }
}

fn collection_title(plural_name: &str, name: &str) -> String {
    let title = if plural_name.trim().is_empty() { name } else { plural_name };
    title.replace('\n', " ")
}
