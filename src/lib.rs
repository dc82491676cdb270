//! # Folio Gen
//!
//! Turns a CMS-agnostic portfolio content model into a ready-to-run Kirby
//! site: panel blueprints, content files, PHP templates, stylesheets and the
//! project scaffold around them.
//!
//! # Architecture: Generators Behind One Adapter
//!
//! Three input documents come from upstream services, each as camelCase JSON:
//!
//! ```text
//! ContentSchema               →  blueprints, templates, snippets
//! StructuredContentCollection →  content/<collection>/<page>/<template>.txt
//! DesignSystemSchema          →  assets/css/{theme,base,utilities,main}.css
//! SiteConfig (folio.toml)     →  scaffold: config.php, composer.json, …
//! ```
//!
//! Every generator is a pure function from its input to a list of
//! [`types::GeneratedFile`]s. The [`adapter`] validates the schema,
//! concatenates the generator outputs into one manifest, and only then hands
//! the manifest to a [`sink::FileSink`]. Nothing else in the crate touches
//! the filesystem, so the whole transformation is testable in memory.
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`schema`] | Content model: entities, fields, relationships, the closed `FieldType` set |
//! | [`content`] | Content items and the collection that groups them by entity |
//! | [`design`] | Design tokens, typography, spacing and palette |
//! | [`fields`] | Field type mapper: generic field → Kirby field definition, plus compatibility notes |
//! | [`blueprint`] | Layout planner and blueprint generator (page, site, design-token blueprints) |
//! | [`serialize`] | Content serializer: item → Kirby text file, status → page folder |
//! | [`templates`] | PHP page templates and snippets rendered with Maud |
//! | [`theme`] | Design tokens → CSS custom properties and utility classes |
//! | [`scaffold`] | Fixed project files that do not depend on the schema |
//! | [`validate`] | Schema validator: errors, warnings and info |
//! | [`adapter`] | Composition root: the `convert_*` operations, `build_site`, `generate_site` |
//! | [`sink`] | Where files go: the filesystem or memory |
//! | [`config`] | `folio.toml` loading, layering on stock defaults, validation |
//! | [`naming`] | Slugs, template names, content labels, CSS identifiers |
//! | [`types`] | `GeneratedFile` and the insertion-ordered map used for YAML output |
//! | [`output`] | CLI output formatting |
//!
//! # Design Decisions
//!
//! ## A Closed Field Type Set
//!
//! [`schema::FieldType`] lists every generic type, and the mapper, the
//! serializer and the template renderer each match on it without a wildcard
//! arm. Adding a type is a compile error until all three handle it. Type
//! names from a newer upstream land in `FieldType::Unknown` and degrade to a
//! text field with a validator warning instead of failing the load.
//!
//! ## Build, Then Write
//!
//! [`adapter::KirbyAdapter::build_site`] produces the complete manifest
//! before a single byte is written. A schema with validation errors therefore
//! writes nothing, and tests inspect the manifest (or a
//! [`sink::MemorySink`]) instead of a temporary directory.
//!
//! ## Maud For Templates
//!
//! Templates are generated with [Maud](https://maud.lambda.xyz/). The HTML
//! skeleton is checked at compile time and every label is auto-escaped; the
//! PHP expressions Kirby evaluates are injected as pre-escaped islands.
//!
//! ## Insertion-Ordered YAML
//!
//! Blueprint field order is the order the panel shows. Blueprints serialize
//! through [`types::OrderedMap`] so the YAML keeps the schema's field order
//! instead of sorting keys.

pub mod adapter;
pub mod blueprint;
pub mod config;
pub mod content;
pub mod design;
pub mod fields;
pub mod naming;
pub mod output;
pub mod scaffold;
pub mod schema;
pub mod serialize;
pub mod sink;
pub mod templates;
pub mod theme;
pub mod types;
pub mod validate;

#[cfg(test)]
pub(crate) mod test_helpers;
