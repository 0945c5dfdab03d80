//! Head, header and footer fragments injected into published pages.

use std::fs;

use minijinja::{AutoEscape, Environment};
use serde::Serialize;

use crate::config::ReferenceConfig;
use crate::error::ReferenceError;

/// The three per-language fragments.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Fragment {
    /// Replaces the page `<title>` element
    Head,
    /// Inserted after the opening `<body>` tag
    Header,
    /// Inserted before `</body>`
    Footer,
}

impl Fragment {
    pub const ALL: [Fragment; 3] = [Fragment::Head, Fragment::Header, Fragment::Footer];

    pub fn name(self) -> &'static str {
        match self {
            Fragment::Head => "head",
            Fragment::Header => "header",
            Fragment::Footer => "footer",
        }
    }
}

/// Package fields visible to fragments.
#[derive(Debug, Clone, Serialize)]
pub struct PackageInfo {
    pub name: String,
    pub version: String,
    pub homepage: String,
}

/// Relative locations of a page within the published site.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PagePaths {
    /// From the page's directory back to the site root (`<base>/html`)
    pub top: String,
    /// From the page's directory to the package root
    pub package: String,
    /// The page itself, relative to its language root
    pub current: String,
}

/// Context for rendering a fragment.
#[derive(Debug, Clone, Serialize)]
pub struct PageContext {
    /// Original page title, if the page has one
    pub title: String,
    pub language: String,
    pub package: PackageInfo,
    pub paths: PagePaths,
}

/// Fragments for one language, loaded from disk.
pub struct Fragments {
    env: Environment<'static>,
    language: String,
}

impl Fragments {
    /// Load `{head,header,footer}.<language>.html`.
    ///
    /// Every fragment must exist.
    pub fn load(config: &ReferenceConfig, language: &str) -> Result<Self, ReferenceError> {
        let mut env = Environment::new();
        // Page titles are already HTML
        env.set_auto_escape_callback(|_| AutoEscape::None);

        for fragment in Fragment::ALL {
            let path = config.template_path(fragment.name(), language);
            if !path.is_file() {
                return Err(ReferenceError::MissingTemplate(path.display().to_string()));
            }
            let source =
                fs::read_to_string(&path).map_err(|e| ReferenceError::io(&path, e))?;
            env.add_template_owned(fragment.name().to_string(), source)
                .map_err(|source| ReferenceError::Template {
                    name: path.display().to_string(),
                    source,
                })?;
        }

        Ok(Self {
            env,
            language: language.to_string(),
        })
    }

    pub fn language(&self) -> &str {
        &self.language
    }

    /// Render one fragment.
    pub fn render(&self, fragment: Fragment, context: &PageContext) -> Result<String, ReferenceError> {
        let name = format!("{}.{}.html", fragment.name(), self.language);
        let tmpl = self
            .env
            .get_template(fragment.name())
            .map_err(|source| ReferenceError::Template {
                name: name.clone(),
                source,
            })?;
        tmpl.render(context)
            .map_err(|source| ReferenceError::Template { name, source })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn context() -> PageContext {
        PageContext {
            title: "Quire::Task &mdash; quire".to_string(),
            language: "ja".to_string(),
            package: PackageInfo {
                name: "quire".to_string(),
                version: "1.0.0".to_string(),
                homepage: "https://example.org/".to_string(),
            },
            paths: PagePaths {
                top: "../../..".to_string(),
                package: "../../../quire".to_string(),
                current: "Quire/Task.html".to_string(),
            },
        }
    }

    fn write_fragments(config: &ReferenceConfig, language: &str) {
        fs::create_dir_all(&config.templates_dir).unwrap();
        fs::write(
            config.template_path("head", language),
            "<title>{{ title }}</title>",
        )
        .unwrap();
        fs::write(
            config.template_path("header", language),
            r#"<a href="{{ paths.top }}/">{{ package.name }} {{ package.version }}</a>"#,
        )
        .unwrap();
        fs::write(
            config.template_path("footer", language),
            "<p>{{ paths.current }}</p>",
        )
        .unwrap();
    }

    #[test]
    fn renders_fragments_without_escaping() {
        let temp = tempdir().unwrap();
        let config = ReferenceConfig::with_base_dir(temp.path());
        write_fragments(&config, "ja");

        let fragments = Fragments::load(&config, "ja").unwrap();

        assert_eq!(
            fragments.render(Fragment::Head, &context()).unwrap(),
            "<title>Quire::Task &mdash; quire</title>"
        );
        assert_eq!(
            fragments.render(Fragment::Header, &context()).unwrap(),
            r#"<a href="../../../">quire 1.0.0</a>"#
        );
        assert_eq!(
            fragments.render(Fragment::Footer, &context()).unwrap(),
            "<p>Quire/Task.html</p>"
        );
    }

    #[test]
    fn missing_fragment_is_an_error() {
        let temp = tempdir().unwrap();
        let config = ReferenceConfig::with_base_dir(temp.path());
        write_fragments(&config, "ja");
        fs::remove_file(config.template_path("footer", "ja")).unwrap();

        let result = Fragments::load(&config, "ja");

        assert!(matches!(result, Err(ReferenceError::MissingTemplate(path)) if path.ends_with("footer.ja.html")));
    }
}
