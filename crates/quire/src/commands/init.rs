//! Initialize quire in a project.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use quire_reference::Fragment;

use super::config::load_config;

/// Run the init command.
pub fn run(config_path: &Path, yes: bool) -> Result<()> {
    tracing::info!("Initializing quire...");

    if config_path.exists() && !yes {
        tracing::warn!(
            "{} already exists. Use --yes to overwrite.",
            config_path.display()
        );
    } else {
        fs::write(config_path, DEFAULT_CONFIG)
            .with_context(|| format!("Failed to write {}", config_path.display()))?;
        tracing::info!("Created {}", config_path.display());
    }

    let reference = load_config(config_path)?.reference();
    fs::create_dir_all(&reference.templates_dir)
        .context("Failed to create templates directory")?;

    for language in reference.languages.all() {
        for fragment in Fragment::ALL {
            let path = reference.template_path(fragment.name(), language);
            if path.exists() && !yes {
                tracing::debug!("Keeping {}", path.display());
                continue;
            }
            fs::write(&path, default_fragment(fragment))
                .with_context(|| format!("Failed to write {}", path.display()))?;
            tracing::info!("Created {}", path.display());
        }
    }

    tracing::info!("Initialization complete!");
    tracing::info!("Run 'quire list' to see available tasks.");

    Ok(())
}

fn default_fragment(fragment: Fragment) -> &'static str {
    match fragment {
        Fragment::Head => DEFAULT_HEAD,
        Fragment::Header => DEFAULT_HEADER,
        Fragment::Footer => DEFAULT_FOOTER,
    }
}

const DEFAULT_CONFIG: &str = r#"# Quire Configuration

[package]
# Package name, also the published directory name
name = "my-package"
version = "0.1.0"
homepage = "https://example.org/"
# Files shipped with the package; sources are picked by extension
files = []

[languages]
original = "en"
translations = ["ja"]

[document]
generator = "yardoc"
source_extensions = ["rb"]
options = []

[reference]
# Base documentation directory
base_dir = "doc"

[release]
# Directory holding index.html and index.html.<lang>
# index_html_dir = "doc/html"

[publish]
host = ""
# user = "me"
remote_dir = ""
exclude = []
delete = false
"#;

const DEFAULT_HEAD: &str = r#"<title>{{ title }}</title>
<link rel="stylesheet" href="{{ paths.top }}/css/reference.css" type="text/css" media="screen" />
"#;

const DEFAULT_HEADER: &str = r#"<div class="header">
  <a href="{{ paths.top }}/{{ language }}/">{{ package.name }}</a>
  <span class="version">{{ package.version }}</span>
</div>
"#;

const DEFAULT_FOOTER: &str = r#"<div class="footer">
  <a href="{{ package.homepage }}">{{ package.name }}</a>
</div>
"#;
