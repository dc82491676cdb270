//! PHP templates and snippets for the generated site.
//!
//! Templates depend on the field list only, never on content. Every field
//! renders as a presence-guarded fragment:
//!
//! ```php
//! <?php if ($page->venuename()->isNotEmpty()): ?>
//! <div class="field field--venuename"><span class="field__label">Venue</span>...</div>
//! <?php endif ?>
//! ```
//!
//! HTML is built with maud so labels and class names are escaped; the PHP
//! islands are spliced in as pre-escaped markup. Structures loop over a
//! per-field snippet (`site/snippets/<template>/<field>.php`), relations loop
//! over the shared `card` snippet.

use crate::config::SiteConfig;
use crate::naming::{field_key, template_name};
use crate::schema::{EntitySchema, FieldSchema, FieldType, MAX_STRUCTURE_DEPTH};
use crate::types::GeneratedFile;
use maud::{Markup, PreEscaped, html};

pub const TEMPLATE_DIR: &str = "site/templates";
pub const SNIPPET_DIR: &str = "site/snippets";

/// Templates generated for one entity.
#[derive(Debug, Clone)]
pub struct EntityTemplates {
    pub main: GeneratedFile,
    /// Per-structure-field snippets, outermost first.
    pub snippets: Vec<GeneratedFile>,
}

impl EntityTemplates {
    pub fn into_files(self) -> Vec<GeneratedFile> {
        std::iter::once(self.main).chain(self.snippets).collect()
    }
}

/// `<?php code ?>`
fn php(code: impl AsRef<str>) -> PreEscaped<String> {
    PreEscaped(format!("<?php {} ?>", code.as_ref()))
}

/// `<?= expr ?>`
fn echo(expr: impl AsRef<str>) -> PreEscaped<String> {
    PreEscaped(format!("<?= {} ?>", expr.as_ref()))
}

const NEWLINE: PreEscaped<&str> = PreEscaped("\n");

/// Build the page template and structure snippets for an entity.
pub fn generate_templates(entity: &EntitySchema) -> EntityTemplates {
    let template = template_name(&entity.id);
    let mut snippets = Vec::new();
    let fragments: Vec<Markup> = entity
        .fields
        .iter()
        .map(|f| render_field(f, "$page", &template, 0, &mut snippets))
        .collect();

    let body = html! {
        main class=(format!("page page--{template}")) {
            (NEWLINE)
            (php("snippet('page-header')"))
            (NEWLINE)
            article class="container" {
                @for fragment in &fragments {
                    (NEWLINE)
                    (fragment)
                }
                (NEWLINE)
            }
            (NEWLINE)
        }
    };
    EntityTemplates {
        main: GeneratedFile::text(
            format!("{TEMPLATE_DIR}/{template}.php"),
            wrap_page(body),
        ),
        snippets,
    }
}

fn wrap_page(body: Markup) -> String {
    format!(
        "<?php snippet('header') ?>\n{}\n<?php snippet('footer') ?>\n",
        body.into_string()
    )
}

/// One presence-guarded fragment.
///
/// `subject` is the PHP expression holding the fields (`$page`, or `$item`
/// inside a structure snippet); `scope` is the snippet path nested structure
/// snippets are placed under.
fn render_field(
    field: &FieldSchema,
    subject: &str,
    scope: &str,
    depth: usize,
    snippets: &mut Vec<GeneratedFile>,
) -> Markup {
    let key = field_key(&field.name);
    let value = format!("{subject}->{key}()");
    let not_empty = format!("{value}->isNotEmpty()");
    let escaped = echo(format!("{value}->esc()"));

    let (guard, show_label, inner) = match &field.field_type {
        FieldType::Text
        | FieldType::Textarea
        | FieldType::Number
        | FieldType::Range
        | FieldType::Select
        | FieldType::Radio
        | FieldType::Location
        | FieldType::Unknown(_) => (not_empty, true, html! { p class="field__value" { (escaped) } }),
        FieldType::Richtext => (
            not_empty,
            true,
            html! { div class="field__value prose" { (echo(&value)) } },
        ),
        FieldType::Markdown => (
            not_empty,
            true,
            html! { div class="field__value prose" { (echo(format!("{value}->kirbytext()"))) } },
        ),
        FieldType::Code | FieldType::Json => (
            not_empty,
            true,
            html! { pre class="field__value" { code { (escaped) } } },
        ),
        FieldType::Boolean => (
            format!("{value}->toBool()"),
            false,
            html! { p class="field__flag" { (field.display_label()) } },
        ),
        FieldType::Date | FieldType::Datetime => {
            let shown = if field.field_type == FieldType::Date {
                "d F Y"
            } else {
                "d F Y, H:i"
            };
            (
                not_empty,
                true,
                html! {
                    time class="field__value" datetime=(echo(format!("{value}->toDate('c')"))) {
                        (echo(format!("{value}->toDate('{shown}')")))
                    }
                },
            )
        }
        FieldType::Time => (
            not_empty,
            true,
            html! { p class="field__value" { (echo(format!("{value}->toDate('H:i')"))) } },
        ),
        FieldType::Url => (
            not_empty,
            true,
            html! { a class="field__value" href=(echo(format!("{value}->esc('attr')"))) { (escaped) } },
        ),
        FieldType::Email => (
            not_empty,
            true,
            html! {
                a class="field__value" href=(echo(format!("'mailto:' . {value}->esc('attr')"))) { (escaped) }
            },
        ),
        FieldType::Tel => (
            not_empty,
            true,
            html! {
                a class="field__value" href=(echo(format!("'tel:' . {value}->esc('attr')"))) { (escaped) }
            },
        ),
        FieldType::Color => (
            not_empty,
            true,
            html! {
                span class="swatch" style=(echo(format!("'background-color: ' . {value}->esc('css')"))) {}
                code class="field__value" { (escaped) }
            },
        ),
        FieldType::Multiselect | FieldType::Checkbox | FieldType::Tags => (
            not_empty,
            true,
            html! {
                ul class="field__value tags" {
                    (php(format!("foreach ({value}->split() as $entry):")))
                    li { (echo("esc($entry)")) }
                    (php("endforeach"))
                }
            },
        ),
        FieldType::Image => (
            format!("$file = {value}->toFile()"),
            false,
            html! {
                figure class="field__value" {
                    img src=(echo("$file->url()")) alt=(echo("$file->alt()->esc('attr')"));
                    (php("if ($file->caption()->isNotEmpty()):"))
                    figcaption { (echo("$file->caption()->esc()")) }
                    (php("endif"))
                }
            },
        ),
        FieldType::File => (
            format!("$file = {value}->toFile()"),
            true,
            html! {
                a class="field__value" href=(echo("$file->url()")) download { (echo("$file->filename()")) }
            },
        ),
        FieldType::Gallery => (
            not_empty,
            false,
            html! {
                div class="gallery" {
                    (php(format!("foreach ({value}->toFiles() as $file):")))
                    figure {
                        img src=(echo("$file->url()")) alt=(echo("$file->alt()->esc('attr')")) loading="lazy";
                    }
                    (php("endforeach"))
                }
            },
        ),
        FieldType::Files => (
            not_empty,
            true,
            html! {
                ul class="field__value files" {
                    (php(format!("foreach ({value}->toFiles() as $file):")))
                    li { a href=(echo("$file->url()")) download { (echo("$file->filename()")) } }
                    (php("endforeach"))
                }
            },
        ),
        FieldType::List => (
            not_empty,
            true,
            html! {
                ul class="field__value" {
                    (php(format!("foreach ({value}->yaml() as $entry):")))
                    li { (echo("esc($entry)")) }
                    (php("endforeach"))
                }
            },
        ),
        FieldType::Structure => {
            let own_depth = depth + 1;
            let inner = if own_depth > MAX_STRUCTURE_DEPTH {
                html! { pre class="field__value" { (escaped) } }
            } else {
                let path = format!("{scope}/{key}");
                let mut nested = Vec::new();
                snippets.push(render_structure_snippet(field, &path, own_depth, &mut nested));
                snippets.extend(nested);
                html! {
                    div class="structure" {
                        (php(format!("foreach ({value}->toStructure() as $row):")))
                        (php(format!("snippet('{path}', ['item' => $row])")))
                        (php("endforeach"))
                    }
                }
            };
            (not_empty, true, inner)
        }
        FieldType::Blocks => (
            not_empty,
            false,
            html! { div class="blocks" { (echo(format!("{value}->toBlocks()"))) } },
        ),
        FieldType::Relation | FieldType::Relations => (
            not_empty,
            true,
            html! {
                div class="cards" {
                    (php(format!("foreach ({value}->toPages() as $related):")))
                    (php("snippet('card', ['card' => $related])"))
                    (php("endforeach"))
                }
            },
        ),
    };

    html! {
        (php(format!("if ({guard}):")))
        (NEWLINE)
        div class=(format!("field field--{key}")) {
            @if show_label {
                span class="field__label" { (field.display_label()) }
            }
            (inner)
        }
        (NEWLINE)
        (php("endif"))
    }
}

/// Snippet rendering one structure row, passed in as `$item`. Snippets of
/// deeper structures are pushed onto `nested`.
fn render_structure_snippet(
    field: &FieldSchema,
    path: &str,
    depth: usize,
    nested: &mut Vec<GeneratedFile>,
) -> GeneratedFile {
    let fragments: Vec<Markup> = field
        .options
        .fields
        .iter()
        .map(|f| render_field(f, "$item", path, depth, nested))
        .collect();

    let markup = html! {
        div class=(format!("structure-item structure-item--{}", field_key(&field.name))) {
            @for fragment in &fragments {
                (NEWLINE)
                (fragment)
            }
            (NEWLINE)
        }
    };
    GeneratedFile::text(
        format!("{SNIPPET_DIR}/{path}.php"),
        format!("{}\n", markup.into_string()),
    )
}

// =============================================================================
// Shared templates
// =============================================================================

/// Schema-independent templates and snippets emitted for every site.
pub fn shared_templates(config: &SiteConfig) -> Vec<GeneratedFile> {
    vec![
        GeneratedFile::text(format!("{SNIPPET_DIR}/header.php"), header_snippet(config)),
        GeneratedFile::text(format!("{SNIPPET_DIR}/footer.php"), FOOTER_SNIPPET),
        GeneratedFile::text(format!("{SNIPPET_DIR}/page-header.php"), page_header_snippet()),
        GeneratedFile::text(format!("{SNIPPET_DIR}/card.php"), card_snippet()),
        GeneratedFile::text(format!("{TEMPLATE_DIR}/default.php"), default_template()),
        GeneratedFile::text(format!("{TEMPLATE_DIR}/home.php"), home_template()),
    ]
}

/// Opening half of the page wrapper. Its tags stay open, so it is plain text.
fn header_snippet(config: &SiteConfig) -> String {
    format!(
        r#"<!DOCTYPE html>
<html lang="{lang}">
<head>
  <meta charset="utf-8">
  <meta name="viewport" content="width=device-width, initial-scale=1">
  <title><?= $site->title()->esc() ?> | <?= $page->title()->esc() ?></title>
  <?= css('assets/css/main.css') ?>
</head>
<body>
  <header class="site-header">
    <div class="container">
      <a class="site-title" href="<?= $site->url() ?>"><?= $site->title()->esc() ?></a>
      <nav class="site-nav">
        <?php foreach ($site->children()->not('home', 'error') as $item): ?>
        <a href="<?= $item->url() ?>"<?php e($item->isOpen(), ' aria-current="page"') ?>><?= $item->title()->esc() ?></a>
        <?php endforeach ?>
      </nav>
    </div>
  </header>
"#,
        lang = config.site.language,
    )
}

const FOOTER_SNIPPET: &str = r#"  <footer class="site-footer">
    <div class="container">
      <p>&copy; <?= date('Y') ?> <?= $site->title()->esc() ?></p>
    </div>
  </footer>
</body>
</html>
"#;

fn page_header_snippet() -> String {
    let markup = html! {
        header class="page-header container" {
            h1 { (echo("$page->title()->esc()")) }
            (php("if ($page->parent()):"))
            p class="page-header__parent" {
                a href=(echo("$page->parent()->url()")) { (echo("$page->parent()->title()->esc()")) }
            }
            (php("endif"))
        }
    };
    format!("{}\n", markup.into_string())
}

fn card_snippet() -> String {
    let markup = html! {
        article class="card" {
            a href=(echo("$card->url()")) {
                (php("if ($image = $card->image()):"))
                img src=(echo("$image->crop(600, 400)->url()")) alt=(echo("$image->alt()->esc('attr')")) loading="lazy";
                (php("endif"))
                h3 class="card__title" { (echo("$card->title()->esc()")) }
            }
        }
    };
    format!("{}\n", markup.into_string())
}

fn default_template() -> String {
    wrap_page(html! {
        main class="page" {
            (NEWLINE)
            (php("snippet('page-header')"))
            (NEWLINE)
            article class="container" {
                (php("if ($page->text()->isNotEmpty()):"))
                div class="prose" { (echo("$page->text()->kirbytext()")) }
                (php("endif"))
                (php("if ($page->hasListedChildren() || $page->hasUnlistedChildren()):"))
                div class="cards" {
                    (php("foreach ($page->children() as $child):"))
                    (php("snippet('card', ['card' => $child])"))
                    (php("endforeach"))
                }
                (php("endif"))
            }
            (NEWLINE)
        }
    })
}

fn home_template() -> String {
    wrap_page(html! {
        main class="page page--home" {
            section class="hero container" {
                h1 { (echo("$site->title()->esc()")) }
                (php("if ($site->description()->isNotEmpty()):"))
                p class="hero__lead" { (echo("$site->description()->esc()")) }
                (php("endif"))
            }
            (NEWLINE)
            (php("foreach ($site->children()->not('home', 'error') as $collection):"))
            section class="collection container" {
                h2 { a href=(echo("$collection->url()")) { (echo("$collection->title()->esc()")) } }
                div class="cards" {
                    (php("foreach ($collection->children()->listed()->limit(6) as $child):"))
                    (php("snippet('card', ['card' => $child])"))
                    (php("endforeach"))
                }
            }
            (php("endforeach"))
            (NEWLINE)
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::{entity_with_fields, gig_entity};

    fn main_of(fields: Vec<FieldSchema>) -> String {
        let entity = entity_with_fields("gig", fields);
        generate_templates(&entity).main.as_text().unwrap().to_string()
    }

    fn structure(name: &str, nested: Vec<FieldSchema>) -> FieldSchema {
        let mut f = FieldSchema::new(name, FieldType::Structure);
        f.options.fields = nested;
        f
    }

    #[test]
    fn main_template_path_and_wrapper() {
        let templates = generate_templates(&gig_entity());
        assert_eq!(templates.main.path, "site/templates/gig.php");
        let php = templates.main.as_text().unwrap();
        assert!(php.starts_with("<?php snippet('header') ?>\n"));
        assert!(php.ends_with("<?php snippet('footer') ?>\n"));
        assert!(php.contains("<?php snippet('page-header') ?>"));
        assert!(php.contains(r#"class="page page--gig""#));
    }

    #[test]
    fn scalars_are_guarded_and_escaped() {
        let php = main_of(vec![FieldSchema::new("venueName", FieldType::Text)]);
        assert!(php.contains("<?php if ($page->venuename()->isNotEmpty()): ?>"));
        assert!(php.contains("<?= $page->venuename()->esc() ?>"));
        assert!(php.contains("<?php endif ?>"));
    }

    #[test]
    fn labels_are_html_escaped() {
        let mut f = FieldSchema::new("notes", FieldType::Text);
        f.label = "Notes <internal>".into();
        let php = main_of(vec![f]);
        assert!(php.contains("Notes &lt;internal&gt;"));
    }

    #[test]
    fn long_form_uses_kirbytext_and_blocks_use_to_blocks() {
        let php = main_of(vec![
            FieldSchema::new("story", FieldType::Markdown),
            FieldSchema::new("body", FieldType::Blocks),
        ]);
        assert!(php.contains("$page->story()->kirbytext()"));
        assert!(php.contains("$page->body()->toBlocks()"));
    }

    #[test]
    fn single_media_renders_figure() {
        let php = main_of(vec![FieldSchema::new("poster", FieldType::Image)]);
        assert!(php.contains("<?php if ($file = $page->poster()->toFile()): ?>"));
        assert!(php.contains("<figure"));
        assert!(php.contains(r#"src="<?= $file->url() ?>""#));
    }

    #[test]
    fn galleries_and_lists_loop() {
        let php = main_of(vec![
            FieldSchema::new("photos", FieldType::Gallery),
            FieldSchema::new("credits", FieldType::List),
            FieldSchema::new("genres", FieldType::Tags),
        ]);
        assert!(php.contains("foreach ($page->photos()->toFiles() as $file):"));
        assert!(php.contains("foreach ($page->credits()->yaml() as $entry):"));
        assert!(php.contains("foreach ($page->genres()->split() as $entry):"));
    }

    #[test]
    fn relations_use_card_snippet() {
        let php = main_of(vec![FieldSchema::new("venue", FieldType::Relation)]);
        assert!(php.contains("foreach ($page->venue()->toPages() as $related):"));
        assert!(php.contains("snippet('card', ['card' => $related])"));
    }

    #[test]
    fn structures_get_a_snippet() {
        let entity = entity_with_fields(
            "gig",
            vec![structure(
                "setlist",
                vec![FieldSchema::new("song", FieldType::Text)],
            )],
        );
        let templates = generate_templates(&entity);
        let php = templates.main.as_text().unwrap();
        assert!(php.contains("foreach ($page->setlist()->toStructure() as $row):"));
        assert!(php.contains("snippet('gig/setlist', ['item' => $row])"));
        assert_eq!(templates.snippets.len(), 1);
        assert_eq!(templates.snippets[0].path, "site/snippets/gig/setlist.php");
        let snippet = templates.snippets[0].as_text().unwrap();
        assert!(snippet.contains("<?= $item->song()->esc() ?>"));
    }

    #[test]
    fn nested_structures_nest_snippets_up_to_the_limit() {
        let mut inner = structure("leaf", vec![FieldSchema::new("x", FieldType::Text)]);
        for name in ["c", "b", "a"] {
            inner = structure(name, vec![inner]);
        }
        // a > b > c > leaf: four levels, the fourth is not given a snippet.
        let entity = entity_with_fields("gig", vec![inner]);
        let templates = generate_templates(&entity);
        let paths: Vec<&str> = templates.snippets.iter().map(|f| f.path.as_str()).collect();
        assert_eq!(
            paths,
            vec![
                "site/snippets/gig/a.php",
                "site/snippets/gig/a/b.php",
                "site/snippets/gig/a/b/c.php",
            ]
        );
        let deepest = templates.snippets[2].as_text().unwrap();
        assert!(!deepest.contains("snippet('gig/a/b/c/leaf'"));
    }

    #[test]
    fn every_field_type_renders_a_guarded_fragment() {
        for ty in FieldType::ALL {
            let php = main_of(vec![FieldSchema::new("thing", ty.clone())]);
            assert!(php.contains("field--thing"), "{ty} missing wrapper");
            assert!(php.contains("<?php if ("), "{ty} missing guard");
        }
    }

    #[test]
    fn shared_templates_are_always_emitted() {
        let files = shared_templates(&SiteConfig::default());
        let paths: Vec<&str> = files.iter().map(|f| f.path.as_str()).collect();
        assert_eq!(
            paths,
            vec![
                "site/snippets/header.php",
                "site/snippets/footer.php",
                "site/snippets/page-header.php",
                "site/snippets/card.php",
                "site/templates/default.php",
                "site/templates/home.php",
            ]
        );
        let header = files[0].as_text().unwrap();
        assert!(header.starts_with("<!DOCTYPE html>\n<html lang=\"en\">"));
        assert!(files[1].as_text().unwrap().ends_with("</html>\n"));
    }
}
