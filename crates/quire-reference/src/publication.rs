//! Multi-language reference publication.
//!
//! Copies every language's generated reference into
//! `<base>/html/<package>/<lang>`, injects the shared fragments into each
//! page and writes a redirect rule for the package root.

use std::fs;
use std::path::{Component, Path, PathBuf};
use std::sync::LazyLock;
use std::time::Instant;

use regex::Regex;
use walkdir::WalkDir;

use quire_tasks::Package;

use crate::config::ReferenceConfig;
use crate::error::ReferenceError;
use crate::templates::{Fragment, Fragments, PackageInfo, PageContext, PagePaths};

/// Name the generator gives its alphabetical index.
pub const RAW_INDEX_NAME: &str = "_index.html";

/// Published name of the alphabetical index.
pub const ALPHABETICAL_INDEX_NAME: &str = "alphabetical_index.html";

/// Navigation lists copied without fragments.
const LIST_FILES: [&str; 3] = ["class_list.html", "method_list.html", "file_list.html"];

/// Redirect rule file written at the package root.
pub const REDIRECT_FILE: &str = ".htaccess";

static TITLE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)<title>(.+?)</title>").expect("Invalid title regex"));

static BODY_OPEN_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"<body[^>]*>").expect("Invalid body regex"));

static INDEX_LINK_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b_index\.html").expect("Invalid index link regex"));

/// Result of a publication run.
#[derive(Debug)]
pub struct PublishResult {
    /// Number of languages published
    pub languages: usize,

    /// HTML pages with fragments applied
    pub pages: usize,

    /// Files copied unchanged (navigation lists included)
    pub copied: usize,

    /// Total time in milliseconds
    pub duration_ms: u64,

    /// Package output directory
    pub output_dir: PathBuf,
}

/// Publishes the reference tree of one package.
pub struct Publisher<'a> {
    package: &'a Package,
    config: &'a ReferenceConfig,
}

impl<'a> Publisher<'a> {
    pub fn new(package: &'a Package, config: &'a ReferenceConfig) -> Self {
        Self { package, config }
    }

    /// Publish every language, then write the redirect file.
    ///
    /// The package name, sources and fragments are checked before
    /// anything is written.
    pub fn publish(&self) -> Result<PublishResult, ReferenceError> {
        let start = Instant::now();

        if !self.package.has_valid_name() {
            return Err(ReferenceError::InvalidPackageName(self.package.name.clone()));
        }
        if self.package.homepage.is_empty() {
            tracing::warn!("No [package] homepage; redirecting relative to the site root");
        }

        let mut prepared = Vec::new();
        for language in self.config.languages.all() {
            let source = self.config.language_dir(language);
            if !source.is_dir() {
                return Err(ReferenceError::MissingSource(source.display().to_string()));
            }
            prepared.push((source, Fragments::load(self.config, language)?));
        }

        let mut result = PublishResult {
            languages: 0,
            pages: 0,
            copied: 0,
            duration_ms: 0,
            output_dir: self.config.html_package_dir(&self.package.name),
        };

        for (source, fragments) in &prepared {
            let (pages, copied) = self.publish_language(source, fragments)?;
            tracing::info!(
                "Published {} ({} pages, {} other files)",
                fragments.language(),
                pages,
                copied
            );
            result.languages += 1;
            result.pages += pages;
            result.copied += copied;
        }

        self.write_redirect()?;

        result.duration_ms = start.elapsed().as_millis() as u64;
        Ok(result)
    }

    /// Regenerate one language's published tree.
    fn publish_language(
        &self,
        source: &Path,
        fragments: &Fragments,
    ) -> Result<(usize, usize), ReferenceError> {
        let output = self
            .config
            .html_package_dir(&self.package.name)
            .join(fragments.language());

        if output.exists() {
            fs::remove_dir_all(&output).map_err(|e| ReferenceError::io(&output, e))?;
        }
        fs::create_dir_all(&output).map_err(|e| ReferenceError::io(&output, e))?;

        let mut pages = 0;
        let mut copied = 0;

        for entry in WalkDir::new(source)
            .min_depth(1)
            .follow_links(true)
            .sort_by_file_name()
        {
            let entry = entry?;
            let path = entry.path();
            let relative = path.strip_prefix(source).unwrap_or(path);
            let relative = published_name(relative);
            let target = output.join(&relative);

            if entry.file_type().is_dir() {
                fs::create_dir_all(&target).map_err(|e| ReferenceError::io(&target, e))?;
                continue;
            }

            if !is_html(path) {
                fs::copy(path, &target).map_err(|e| ReferenceError::io(path, e))?;
                copied += 1;
                continue;
            }

            tracing::debug!("Publishing {}", relative.display());

            let content = fs::read_to_string(path).map_err(|e| ReferenceError::io(path, e))?;
            let content = rewrite_index_links(&content);

            let content = if is_list_file(path) {
                copied += 1;
                content
            } else {
                pages += 1;
                let context = self.page_context(&relative, fragments.language());
                apply_fragments(&content, self.config.languages.original(), fragments, context)?
            };

            fs::write(&target, content).map_err(|e| ReferenceError::io(&target, e))?;
        }

        Ok((pages, copied))
    }

    fn page_context(&self, relative: &Path, language: &str) -> PageContext {
        PageContext {
            title: String::new(),
            language: language.to_string(),
            package: PackageInfo {
                name: self.package.name.clone(),
                version: self.package.version.clone(),
                homepage: self.package.homepage_url(),
            },
            paths: page_paths(relative, &self.package.name),
        }
    }

    fn write_redirect(&self) -> Result<(), ReferenceError> {
        let dir = self.config.html_package_dir(&self.package.name);
        let path = dir.join(REDIRECT_FILE);
        let homepage = match self.package.homepage_url() {
            url if url.is_empty() => "/".to_string(),
            url => url,
        };
        let rule = format!(
            "RedirectMatch permanent ^/{name}/$ {homepage}{name}/{language}/\n",
            name = self.package.name,
            language = self.config.languages.original(),
        );
        fs::write(&path, rule).map_err(|e| ReferenceError::io(&path, e))
    }
}

/// Rename the raw alphabetical index; every other path is kept.
fn published_name(relative: &Path) -> PathBuf {
    if relative.file_name().and_then(|n| n.to_str()) == Some(RAW_INDEX_NAME) {
        relative.with_file_name(ALPHABETICAL_INDEX_NAME)
    } else {
        relative.to_path_buf()
    }
}

fn is_html(path: &Path) -> bool {
    path.extension().and_then(|e| e.to_str()) == Some("html")
}

fn is_list_file(path: &Path) -> bool {
    path.file_name()
        .and_then(|n| n.to_str())
        .is_some_and(|name| LIST_FILES.contains(&name))
}

fn rewrite_index_links(content: &str) -> String {
    INDEX_LINK_RE
        .replace_all(content, ALPHABETICAL_INDEX_NAME)
        .into_owned()
}

/// Paths of a page at `relative` under `<base>/html/<package>/<lang>`.
fn page_paths(relative: &Path, package: &str) -> PagePaths {
    let dir = relative.parent().unwrap_or(Path::new(""));
    let depth = dir
        .components()
        .filter(|c| matches!(c, Component::Normal(_)))
        .count();
    let top = vec![".."; depth + 2].join("/");

    let current = if relative.file_name().and_then(|n| n.to_str()) == Some("index.html") {
        dir
    } else {
        relative
    };
    let current = current
        .components()
        .filter_map(|c| match c {
            Component::Normal(part) => part.to_str(),
            _ => None,
        })
        .collect::<Vec<_>>()
        .join("/");

    PagePaths {
        package: format!("{}/{}", top, package),
        top,
        current: if current.is_empty() {
            ".".to_string()
        } else {
            current
        },
    }
}

/// Set the page language and inject head, header and footer fragments.
pub fn apply_fragments(
    content: &str,
    original_language: &str,
    fragments: &Fragments,
    mut context: PageContext,
) -> Result<String, ReferenceError> {
    let content = content.replacen(
        &format!("lang=\"{}\"", original_language),
        &format!("lang=\"{}\"", fragments.language()),
        1,
    );

    let mut output = String::with_capacity(content.len() + 1024);
    let mut rest = content.as_str();

    let title_match = TITLE_RE
        .captures(rest)
        .and_then(|caps| Some((caps.get(0)?, caps.get(1)?)));
    if let Some((whole, title)) = title_match {
        context.title = title.as_str().to_string();
        output.push_str(&rest[..whole.start()]);
        output.push_str(&fragments.render(Fragment::Head, &context)?);
        rest = &rest[whole.end()..];
    }

    if let Some(body) = BODY_OPEN_RE.find(rest) {
        output.push_str(&rest[..body.end()]);
        output.push('\n');
        output.push_str(&fragments.render(Fragment::Header, &context)?);
        output.push('\n');
        rest = &rest[body.end()..];
    }

    if let Some(pos) = rest.find("</body") {
        output.push_str(&rest[..pos]);
        output.push('\n');
        output.push_str(&fragments.render(Fragment::Footer, &context)?);
        output.push('\n');
        rest = &rest[pos..];
    }

    output.push_str(rest);
    Ok(output)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use quire_tasks::LanguageSet;
    use tempfile::{tempdir, TempDir};

    const PAGE: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
  <title>Quire::Task</title>
</head>
<body class="class">
<a href="../_index.html">Index</a>
</body>
</html>"#;

    fn setup(languages: &[&str]) -> (TempDir, Package, ReferenceConfig) {
        let temp = tempdir().unwrap();
        let mut config = ReferenceConfig::with_base_dir(temp.path().join("doc"));
        config.languages = LanguageSet::new("en").with_translations(languages.iter().copied());

        let mut package = Package::new("quire", "1.2.0");
        package.homepage = "https://quire.example.org".to_string();

        fs::create_dir_all(&config.templates_dir).unwrap();
        for language in config.languages.all() {
            fs::write(
                config.template_path("head", language),
                "<title>{{ title }} ({{ language }})</title>",
            )
            .unwrap();
            fs::write(
                config.template_path("header", language),
                r#"<div id="site-header"><a href="{{ paths.package }}/">{{ package.name }}</a></div>"#,
            )
            .unwrap();
            fs::write(
                config.template_path("footer", language),
                r#"<div id="site-footer">{{ paths.current }}</div>"#,
            )
            .unwrap();

            let dir = config.language_dir(language);
            fs::create_dir_all(dir.join("Quire")).unwrap();
            fs::write(dir.join("index.html"), PAGE).unwrap();
            fs::write(dir.join("Quire/Task.html"), PAGE).unwrap();
            fs::write(dir.join("_index.html"), PAGE).unwrap();
            fs::write(dir.join("class_list.html"), r#"<a href="_index.html">x</a>"#).unwrap();
        }

        (temp, package, config)
    }

    #[test]
    fn renames_alphabetical_index() {
        let (_temp, package, config) = setup(&[]);

        Publisher::new(&package, &config).publish().unwrap();

        let out = config.html_package_dir("quire").join("en");
        assert!(out.join(ALPHABETICAL_INDEX_NAME).exists());
        assert!(!out.join(RAW_INDEX_NAME).exists());
        assert_eq!(
            fs::read_to_string(out.join("class_list.html")).unwrap(),
            r#"<a href="alphabetical_index.html">x</a>"#
        );
    }

    #[test]
    fn applies_fragments_per_language() {
        let (_temp, package, config) = setup(&["ja"]);

        let result = Publisher::new(&package, &config).publish().unwrap();

        assert_eq!(result.languages, 2);
        assert_eq!(result.pages, 6);

        let page =
            fs::read_to_string(config.html_package_dir("quire").join("ja/Quire/Task.html"))
                .unwrap();
        let expected = r#"<!DOCTYPE html>
<html lang="ja">
<head>
  <title>Quire::Task (ja)</title>
</head>
<body class="class">
<div id="site-header"><a href="../../../quire/">quire</a></div>

<a href="../alphabetical_index.html">Index</a>

<div id="site-footer">Quire/Task.html</div>
</body>
</html>"#;
        assert_eq!(page, expected);
    }

    #[test]
    fn leaves_list_files_without_fragments() {
        let (_temp, package, config) = setup(&[]);

        Publisher::new(&package, &config).publish().unwrap();

        let list = fs::read_to_string(
            config.html_package_dir("quire").join("en/class_list.html"),
        )
        .unwrap();
        assert!(!list.contains("site-header"));
    }

    #[test]
    fn copies_other_files_byte_for_byte() {
        let (_temp, package, config) = setup(&[]);
        let bytes: Vec<u8> = (0..=255).collect();
        let source = config.language_dir("en").join("css");
        fs::create_dir_all(&source).unwrap();
        fs::write(source.join("logo.png"), &bytes).unwrap();

        let result = Publisher::new(&package, &config).publish().unwrap();

        let copied = fs::read(config.html_package_dir("quire").join("en/css/logo.png")).unwrap();
        assert_eq!(copied, bytes);
        assert_eq!(result.copied, 2);
    }

    #[cfg(unix)]
    #[test]
    fn preserves_permissions_of_copied_files() {
        use std::os::unix::fs::PermissionsExt;

        let (_temp, package, config) = setup(&[]);
        let script = config.language_dir("en").join("search.js");
        fs::write(&script, "// search").unwrap();
        fs::set_permissions(&script, fs::Permissions::from_mode(0o755)).unwrap();

        Publisher::new(&package, &config).publish().unwrap();

        let mode = fs::metadata(config.html_package_dir("quire").join("en/search.js"))
            .unwrap()
            .permissions()
            .mode();
        assert_eq!(mode & 0o777, 0o755);
    }

    #[test]
    fn regenerates_output_wholesale() {
        let (_temp, package, config) = setup(&[]);
        let stale = config.html_package_dir("quire").join("en/stale.html");
        fs::create_dir_all(stale.parent().unwrap()).unwrap();
        fs::write(&stale, "old").unwrap();

        Publisher::new(&package, &config).publish().unwrap();
        Publisher::new(&package, &config).publish().unwrap();

        assert!(!stale.exists());
        assert!(config.html_package_dir("quire").join("en/index.html").exists());
    }

    #[test]
    fn writes_redirect_to_original_language() {
        let (_temp, package, config) = setup(&["ja"]);

        Publisher::new(&package, &config).publish().unwrap();

        let rule =
            fs::read_to_string(config.html_package_dir("quire").join(REDIRECT_FILE)).unwrap();
        assert_eq!(
            rule,
            "RedirectMatch permanent ^/quire/$ https://quire.example.org/quire/en/\n"
        );
    }

    #[test]
    fn missing_source_aborts_before_writing() {
        let (_temp, package, mut config) = setup(&[]);
        config.languages.add("fr");
        fs::write(config.template_path("head", "fr"), "").unwrap();

        let result = Publisher::new(&package, &config).publish();

        assert!(matches!(result, Err(ReferenceError::MissingSource(_))));
        assert!(!config.html_package_dir("quire").exists());
    }

    #[test]
    fn empty_package_name_aborts_before_writing() {
        let (_temp, mut package, config) = setup(&[]);
        package.name = String::new();
        let news = config.html_base_dir().join("en/news.html");
        fs::create_dir_all(news.parent().unwrap()).unwrap();
        fs::write(&news, "news").unwrap();

        let result = Publisher::new(&package, &config).publish();

        assert!(matches!(result, Err(ReferenceError::InvalidPackageName(_))));
        assert_eq!(fs::read_to_string(&news).unwrap(), "news");
        assert!(!config.html_base_dir().join(REDIRECT_FILE).exists());
    }

    #[test]
    fn redirects_from_site_root_without_homepage() {
        let (_temp, mut package, config) = setup(&[]);
        package.homepage = String::new();

        Publisher::new(&package, &config).publish().unwrap();

        let rule =
            fs::read_to_string(config.html_package_dir("quire").join(REDIRECT_FILE)).unwrap();
        assert_eq!(rule, "RedirectMatch permanent ^/quire/$ /quire/en/\n");
    }

    #[cfg(unix)]
    #[test]
    fn unreadable_source_entry_aborts() {
        let (_temp, package, config) = setup(&[]);
        let source = config.language_dir("en");
        std::os::unix::fs::symlink(&source, source.join("Quire/loop")).unwrap();

        let result = Publisher::new(&package, &config).publish();

        assert!(matches!(result, Err(ReferenceError::Walk(_))));
        assert!(!config.html_package_dir("quire").join(REDIRECT_FILE).exists());
    }

    #[test]
    fn missing_template_aborts() {
        let (_temp, package, config) = setup(&["ja"]);
        fs::remove_file(config.template_path("header", "ja")).unwrap();

        let result = Publisher::new(&package, &config).publish();

        assert!(matches!(result, Err(ReferenceError::MissingTemplate(_))));
    }

    #[test]
    fn computes_page_paths() {
        assert_eq!(
            page_paths(Path::new("index.html"), "quire"),
            PagePaths {
                top: "../..".to_string(),
                package: "../../quire".to_string(),
                current: ".".to_string(),
            }
        );
        assert_eq!(
            page_paths(Path::new("Quire/Task/index.html"), "quire"),
            PagePaths {
                top: "../../../..".to_string(),
                package: "../../../../quire".to_string(),
                current: "Quire/Task".to_string(),
            }
        );
    }
}
