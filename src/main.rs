use clap::{Parser, Subcommand};
use folio_gen::adapter::{KirbyAdapter, SiteInput};
use folio_gen::content::StructuredContentCollection;
use folio_gen::design::DesignSystemSchema;
use folio_gen::schema::ContentSchema;
use folio_gen::sink::{FileSink, FsSink};
use folio_gen::types::GeneratedFile;
use folio_gen::{config, output, validate};
use serde::de::DeserializeOwned;
use std::error::Error;
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "folio-gen")]
#[command(about = "Generate a Kirby CMS site from a portfolio content model")]
#[command(long_about = "\
Generate a Kirby CMS site from a portfolio content model

Inputs are the JSON documents produced upstream:

  schema.json    ContentSchema: entities, fields, relationships
  content.json   StructuredContentCollection: items per entity
  design.json    DesignSystemSchema: tokens, typography, spacing, palette

Output layout:

  site/
  ├── site/blueprints/pages/<template>.yml   # Panel forms, one per entity
  ├── site/blueprints/site.yml               # Collections overview
  ├── site/templates/<template>.php          # Page templates
  ├── site/snippets/                         # Header, footer, cards, structures
  ├── content/<collection>/<n>_<slug>/       # One folder per listed item
  ├── assets/css/main.css                    # Imports base, theme, utilities
  └── composer.json, index.php, serve.sh

The schema is validated first; a schema with errors writes nothing.

Run 'folio-gen gen-config' to generate a documented folio.toml.")]
#[command(version)]
struct Cli {
    /// Generator config file
    #[arg(long, default_value = config::CONFIG_FILENAME, global = true)]
    config: PathBuf,

    /// Output directory
    #[arg(long, default_value = "site", global = true)]
    output: PathBuf,

    /// Log filter when RUST_LOG is unset (error, warn, info, debug, trace)
    #[arg(long, default_value = "warn", global = true)]
    log_level: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Validate the schema, then write the complete site
    Generate {
        /// Content schema; defaults to the schema embedded in --content
        #[arg(long)]
        schema: Option<PathBuf>,
        /// Structured content collection
        #[arg(long)]
        content: Option<PathBuf>,
        /// Design system tokens
        #[arg(long)]
        design: Option<PathBuf>,
    },
    /// Validate a content schema without writing anything
    Validate {
        #[arg(long)]
        schema: PathBuf,
    },
    /// Write blueprints, templates and snippets for a schema
    Blueprints {
        #[arg(long)]
        schema: PathBuf,
    },
    /// Write content files for a content collection
    Content {
        #[arg(long)]
        content: PathBuf,
    },
    /// Write stylesheets for a design system
    Theme {
        #[arg(long)]
        design: PathBuf,
    },
    /// Print a stock folio.toml with all options documented
    GenConfig,
}

fn main() -> Result<(), Box<dyn Error>> {
    let cli = Cli::parse();
    init_logging(&cli.log_level);

    let sink = FsSink::new(&cli.output);

    match cli.command {
        Command::Generate {
            schema,
            content,
            design,
        } => {
            let adapter = load_adapter(&cli.config)?;
            let content = content
                .as_deref()
                .map(read_json::<StructuredContentCollection>)
                .transpose()?;
            let schema = match (schema, &content) {
                (Some(path), _) => read_json(&path)?,
                (None, Some(collection)) => collection.schema.clone(),
                (None, None) => return Err("generate needs --schema or --content".into()),
            };
            let design = design
                .as_deref()
                .map(read_json::<DesignSystemSchema>)
                .transpose()?;
            let input = SiteInput {
                schema,
                content,
                design,
            };
            let summary = adapter.generate_site(&input, &sink)?;
            output::print_generation_summary(&summary, &cli.output);
        }
        Command::Validate { schema } => {
            let schema: ContentSchema = read_json(&schema)?;
            let report = validate::validate_schema(&schema);
            output::print_validation_report(&report);
            if !report.valid {
                return Err(format!("{} validation errors", report.errors.len()).into());
            }
        }
        Command::Blueprints { schema } => {
            let adapter = load_adapter(&cli.config)?;
            let schema: ContentSchema = read_json(&schema)?;
            let conversion = adapter.convert_schema(&schema)?;
            let files: Vec<GeneratedFile> = conversion.files().cloned().collect();
            sink.write_all(&files)?;
            output::print_schema_conversion(&conversion);
        }
        Command::Content { content } => {
            let adapter = load_adapter(&cli.config)?;
            let collection: StructuredContentCollection = read_json(&content)?;
            let conversion = adapter.convert_content(&collection);
            sink.write_all(&conversion.files)?;
            output::print_content_conversion(&conversion);
        }
        Command::Theme { design } => {
            let adapter = load_adapter(&cli.config)?;
            let design: DesignSystemSchema = read_json(&design)?;
            let conversion = adapter.convert_design_system(&design);
            sink.write_all(&conversion.files)?;
            output::print_theme_conversion(&conversion);
        }
        Command::GenConfig => {
            print!("{}", config::stock_config_toml());
        }
    }

    Ok(())
}

/// Route `tracing` events to stderr so stdout stays clean for command output.
fn init_logging(default_level: &str) {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .or_else(|_| EnvFilter::try_new(default_level))
                .unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .try_init();
}

/// Stock defaults with `folio.toml` layered on top; a missing file is fine.
fn load_adapter(config_path: &Path) -> Result<KirbyAdapter, config::ConfigError> {
    Ok(KirbyAdapter::new(config::load_config(config_path)?))
}

fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T, Box<dyn Error>> {
    let text = std::fs::read_to_string(path)
        .map_err(|e| format!("cannot read {}: {e}", path.display()))?;
    let value = serde_json::from_str(&text)
        .map_err(|e| format!("invalid JSON in {}: {e}", path.display()))?;
    Ok(value)
}
