//! Fixed site files that do not depend on the schema: Kirby config, web
//! server rules, entry point, README, Composer manifest, the site and home
//! content pages, and empty placeholders for directories Kirby expects.

use crate::config::SiteConfig;
use crate::naming::sanitize_slug;
use crate::types::GeneratedFile;
use serde_json::json;

/// Kirby major version required by the generated `composer.json`.
pub const KIRBY_CONSTRAINT: &str = "^4.0";

/// Directories that must exist even when empty.
const PLACEHOLDERS: [&str; 3] = ["site/plugins/.gitkeep", "assets/images/.gitkeep", "media/.gitkeep"];

pub fn scaffold(config: &SiteConfig) -> Vec<GeneratedFile> {
    let mut files = vec![
        GeneratedFile::text("site/config/config.php", config_php(config)),
        GeneratedFile::text(".gitignore", GITIGNORE),
        GeneratedFile::text(".htaccess", HTACCESS),
        GeneratedFile::text("robots.txt", ROBOTS),
        GeneratedFile::text("index.php", INDEX_PHP),
        GeneratedFile::text("README.md", readme(config)),
        GeneratedFile::text("composer.json", composer_json(config)),
        GeneratedFile::text("content/site.txt", format!("Title: {}\n", single_line(&config.site.title))),
        GeneratedFile::text("content/home/home.txt", "Title: Home\n"),
    ];
    files.extend(PLACEHOLDERS.iter().map(|path| GeneratedFile::text(*path, "")));
    if config.site.dev_server_script {
        files.push(GeneratedFile::text("serve.sh", SERVE_SH).executable());
    }
    files
}

fn single_line(value: &str) -> String {
    value.replace('\n', "\\n")
}

fn config_php(config: &SiteConfig) -> String {
    format!(
        r#"<?php

return [
    'debug' => {debug},
    'panel' => [
        'install' => {install},
    ],
    'date' => [
        'handler' => 'date',
    ],
];
"#,
        debug = config.site.debug,
        install = config.site.panel_install,
    )
}

fn composer_json(config: &SiteConfig) -> String {
    let slug = sanitize_slug(&config.site.title);
    let package = if slug.is_empty() { "site".to_string() } else { slug };
    let manifest = json!({
        "name": format!("portfolio/{package}"),
        "description": config.site.title,
        "type": "project",
        "require": {
            "php": ">=8.1",
            "getkirby/cms": KIRBY_CONSTRAINT,
        },
        "config": {
            "allow-plugins": {
                "getkirby/composer-installer": true,
            },
            "optimize-autoloader": true,
        },
    });
    format!("{manifest:#}\n")
}

fn readme(config: &SiteConfig) -> String {
    let serve = if config.site.dev_server_script {
        "./serve.sh"
    } else {
        "php -S localhost:8000 kirby/router.php"
    };
    format!(
        r#"# {title}

A Kirby site generated from a portfolio content model.

## Setup

```sh
composer install
{serve}
```

Open <http://localhost:8000> for the site and <http://localhost:8000/panel>
to create the first panel account.

## Layout

- `content/`: one folder per collection, one text file per item
- `site/blueprints/`: panel forms for every content type
- `site/templates/`, `site/snippets/`: page templates
- `assets/css/`: stylesheets built from the design tokens

Regenerating the site overwrites these files.
"#,
        title = config.site.title,
    )
}

const GITIGNORE: &str = r#"# Kirby
/kirby
/vendor
/media/*
!/media/.gitkeep

# Runtime
/site/accounts
/site/cache
/site/sessions
/site/config/.license

# System
.DS_Store
.env
"#;

const HTACCESS: &str = r#"# Kirby .htaccess

<IfModule mod_rewrite.c>

RewriteEngine on

# block text files in the content folder from being accessed directly
RewriteRule ^content/(.*)\.(txt|md|mdown)$ index.php [L]

# block all files in the site folder from being accessed directly
RewriteRule ^site/(.*) index.php [L]

# block direct access to Kirby and the panel sources
RewriteRule ^kirby/(.*) index.php [L]

# make site links work
RewriteCond %{REQUEST_FILENAME} !-f
RewriteCond %{REQUEST_FILENAME} !-d
RewriteRule ^(.*) index.php [L]

</IfModule>

# pass the Authorization header to PHP
SetEnvIf Authorization "(.+)" HTTP_AUTHORIZATION=$1

# compress text file responses
<IfModule mod_deflate.c>
AddOutputFilterByType DEFLATE text/plain
AddOutputFilterByType DEFLATE text/html
AddOutputFilterByType DEFLATE text/css
AddOutputFilterByType DEFLATE text/javascript
AddOutputFilterByType DEFLATE application/json
AddOutputFilterByType DEFLATE application/javascript
</IfModule>
"#;

const ROBOTS: &str = "User-agent: *\nDisallow: /panel\nAllow: /\n";

const INDEX_PHP: &str = r#"<?php

require __DIR__ . '/kirby/bootstrap.php';

echo (new Kirby)->render();
"#;

const SERVE_SH: &str = r#"#!/bin/sh
# Run the site with PHP's built-in development server.
set -e
cd "$(dirname "$0")"
exec php -S "${HOST:-localhost}:${PORT:-8000}" kirby/router.php
"#;
