//! Centralized name derivation for generated artifacts.
//!
//! Every path and identifier the generators emit goes through this module so
//! that blueprints, templates and content folders agree on names:
//!
//! - `Gig Poster` entity id → `gig-poster` template name
//! - `Jazz Night!` title → `jazz-night` slug
//! - `venueName` field → `VenueName` content label, `venuename` panel key
//! - `Venue Name` field → `Venue_Name` content label, `venue_name` panel key
//! - `easeInOut` token → `ease-in-out` CSS identifier

/// Upper bound on slug length, in characters.
pub const MAX_SLUG_LEN: usize = 100;

/// Lowercase and collapse every run of non-alphanumeric characters into a
/// single dash, trimming dashes at both ends.
///
/// Only ASCII letters and digits survive; everything else is a separator.
fn dasherize(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    let mut pending_dash = false;
    for c in input.chars() {
        if c.is_ascii_alphanumeric() {
            if pending_dash && !out.is_empty() {
                out.push('-');
            }
            pending_dash = false;
            out.push(c.to_ascii_lowercase());
        } else {
            pending_dash = true;
        }
    }
    out
}

/// Sanitize a string into a URL slug.
///
/// Lowercases, collapses non-alphanumeric runs into one dash, trims dashes
/// and caps the length at [`MAX_SLUG_LEN`]. Idempotent:
/// `sanitize_slug(&sanitize_slug(s)) == sanitize_slug(s)`.
///
/// - `"Jazz Night"` → `"jazz-night"`
/// - `"  --Hello,  World!--"` → `"hello-world"`
/// - `"!!!"` → `""`
pub fn sanitize_slug(input: &str) -> String {
    let slug = dasherize(input);
    if slug.len() <= MAX_SLUG_LEN {
        return slug;
    }
    // ASCII only past this point, so byte slicing is safe.
    slug[..MAX_SLUG_LEN].trim_end_matches('-').to_string()
}

/// Template identifier for an entity id: lowercase, non-alphanumeric runs
/// replaced by a single dash. Falls back to `page` for ids with no usable
/// characters so paths never end up empty.
pub fn template_name(entity_id: &str) -> String {
    let name = dasherize(entity_id);
    if name.is_empty() {
        "page".to_string()
    } else {
        name
    }
}

/// Folder that holds every item of one entity under `content/`: the
/// sanitized plural name, or the template name when that is empty.
pub fn collection_slug(plural_name: &str, entity_id: &str) -> String {
    let slug = sanitize_slug(plural_name);
    if slug.is_empty() {
        template_name(entity_id)
    } else {
        slug
    }
}

/// Keep ASCII letters and digits, case intact; every other run becomes one
/// `_`, trimmed at both ends.
fn underscore(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    let mut pending = false;
    for c in input.chars() {
        if c.is_ascii_alphanumeric() {
            if pending && !out.is_empty() {
                out.push('_');
            }
            pending = false;
            out.push(c);
        } else {
            pending = true;
        }
    }
    out
}

/// Field label as written in content files: first letter upper-cased,
/// separators replaced by `_` (`venueName` → `VenueName`,
/// `venue name` → `Venue_name`).
///
/// Kirby reads a label back by lowercasing it and replacing non-alphanumeric
/// runs with `_`, so the label always reads back as [`field_key`].
pub fn content_label(field_name: &str) -> String {
    let cleaned = underscore(field_name);
    let mut chars = cleaned.chars();
    match chars.next() {
        Some(first) => first.to_ascii_uppercase().to_string() + chars.as_str(),
        None => String::new(),
    }
}

/// Key a field is addressed by in blueprints, templates and snippet paths:
/// lowercase ASCII letters, digits and single underscores
/// (`venueName` → `venuename`, `Venue Name` → `venue_name`).
///
/// Empty for names with no usable characters; the validator rejects those.
pub fn field_key(field_name: &str) -> String {
    underscore(field_name).to_ascii_lowercase()
}

/// True when `key` can be called as a PHP method (`$page->key()`).
pub fn is_valid_field_key(key: &str) -> bool {
    key.chars().next().is_some_and(|c| c.is_ascii_alphabetic())
}

/// Convert a token name into a CSS identifier fragment.
///
/// camelCase boundaries become dashes, then the result is dasherized:
/// `easeInOut` → `ease-in-out`, `2xl` → `2xl`, `Brand Blue` → `brand-blue`.
pub fn css_ident(name: &str) -> String {
    let mut spaced = String::with_capacity(name.len() + 4);
    let mut prev_lower = false;
    for c in name.chars() {
        if c.is_ascii_uppercase() && prev_lower {
            spaced.push('-');
        }
        prev_lower = c.is_ascii_lowercase() || c.is_ascii_digit();
        spaced.push(c);
    }
    dasherize(&spaced)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn slug_from_title() {
        assert_eq!(sanitize_slug("Jazz Night"), "jazz-night");
    }

    #[test]
    fn slug_collapses_runs_and_trims() {
        assert_eq!(sanitize_slug("  --Hello,  World!--"), "hello-world");
    }

    #[test]
    fn slug_of_symbols_is_empty() {
        assert_eq!(sanitize_slug("!!!"), "");
    }

    #[test]
    fn slug_drops_non_ascii_letters() {
        assert_eq!(sanitize_slug("Café Olé"), "caf-ol");
    }

    #[test]
    fn slug_is_capped() {
        let long = "word ".repeat(40);
        let slug = sanitize_slug(&long);
        assert!(slug.len() <= MAX_SLUG_LEN);
        assert!(!slug.ends_with('-'));
        assert_eq!(sanitize_slug(&slug), slug);
    }

    #[test]
    fn template_name_from_entity_id() {
        assert_eq!(template_name("Gig_Poster"), "gig-poster");
        assert_eq!(template_name("project"), "project");
        assert_eq!(template_name("__"), "page");
    }

    #[test]
    fn collection_slug_prefers_plural_name() {
        assert_eq!(collection_slug("Live Gigs", "gig"), "live-gigs");
        assert_eq!(collection_slug("", "Gig"), "gig");
        assert_eq!(collection_slug("***", "__"), "page");
    }

    #[test]
    fn content_label_capitalizes_first_letter() {
        assert_eq!(content_label("venueName"), "VenueName");
        assert_eq!(content_label("title"), "Title");
        assert_eq!(content_label("venue name"), "Venue_name");
        assert_eq!(content_label(""), "");
    }

    #[test]
    fn field_key_is_lowercase() {
        assert_eq!(field_key("venueName"), "venuename");
    }

    #[test]
    fn field_key_replaces_separators() {
        assert_eq!(field_key("Venue Name"), "venue_name");
        assert_eq!(field_key("a/../../b"), "a_b");
        assert_eq!(field_key("  release-date  "), "release_date");
        assert_eq!(field_key("!!!"), "");
    }

    #[test]
    fn field_key_validity() {
        assert!(is_valid_field_key("venue_name"));
        assert!(!is_valid_field_key(""));
        assert!(!is_valid_field_key("2nd_set"));
    }

    proptest! {
        #[test]
        fn label_reads_back_as_key(name in "\\PC{0,24}") {
            let label = content_label(&name);
            prop_assert_eq!(label.to_ascii_lowercase(), field_key(&name));
            let key = field_key(&name);
            prop_assert!(key.chars().all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_'));
            prop_assert!(!key.contains("__") && !key.starts_with('_') && !key.ends_with('_'));
        }
    }

    #[test]
    fn css_ident_splits_camel_case() {
        assert_eq!(css_ident("easeInOut"), "ease-in-out");
        assert_eq!(css_ident("2xl"), "2xl");
        assert_eq!(css_ident("Brand Blue"), "brand-blue");
        assert_eq!(css_ident("500"), "500");
    }
}
