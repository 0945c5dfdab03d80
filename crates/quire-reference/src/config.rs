//! Reference and documentation settings.

use std::path::{Path, PathBuf};

use quire_tasks::LanguageSet;

/// Layout of the documentation tree.
#[derive(Debug, Clone)]
pub struct ReferenceConfig {
    /// Base documentation directory
    pub base_dir: PathBuf,

    /// Directory holding `{head,header,footer}.<lang>.html`
    pub templates_dir: PathBuf,

    /// Original language and translation targets
    pub languages: LanguageSet,
}

impl Default for ReferenceConfig {
    fn default() -> Self {
        Self::with_base_dir("doc")
    }
}

impl ReferenceConfig {
    /// Default layout rooted at `base_dir`.
    pub fn with_base_dir(base_dir: impl Into<PathBuf>) -> Self {
        let base_dir = base_dir.into();
        Self {
            templates_dir: base_dir.join("templates"),
            base_dir,
            languages: LanguageSet::default(),
        }
    }

    /// `<base>/reference`
    pub fn reference_dir(&self) -> PathBuf {
        self.base_dir.join("reference")
    }

    /// `<base>/reference/<lang>`
    pub fn language_dir(&self, language: &str) -> PathBuf {
        self.reference_dir().join(language)
    }

    /// Where the documentation generator writes.
    pub fn original_dir(&self) -> PathBuf {
        self.language_dir(self.languages.original())
    }

    /// `<base>/po`
    pub fn po_dir(&self) -> PathBuf {
        self.base_dir.join("po")
    }

    pub fn pot_file(&self, package: &str) -> PathBuf {
        self.po_dir().join(format!("{}.pot", package))
    }

    pub fn po_file(&self, language: &str) -> PathBuf {
        self.po_dir().join(format!("{}.po", language))
    }

    /// `<base>/html`
    pub fn html_base_dir(&self) -> PathBuf {
        self.base_dir.join("html")
    }

    /// `<base>/html/<package>`
    pub fn html_package_dir(&self, package: &str) -> PathBuf {
        self.html_base_dir().join(package)
    }

    pub fn template_path(&self, fragment: &str, language: &str) -> PathBuf {
        self.templates_dir
            .join(format!("{}.{}.html", fragment, language))
    }

    pub fn text_dir(&self) -> PathBuf {
        self.base_dir.join("text")
    }
}

/// Settings for the external documentation generator.
#[derive(Debug, Clone)]
pub struct DocumentConfig {
    /// Generator program
    pub generator: String,

    /// README passed to the generator; discovered when unset
    pub readme: Option<PathBuf>,

    /// Extra text files; `<base>/text/**/*` when unset and present
    pub text_files: Option<Vec<String>>,

    /// Source files; package files with `source_extensions` when unset
    pub source_files: Option<Vec<String>>,

    /// Extensions selecting source files from the package file list
    pub source_extensions: Vec<String>,

    /// Extra generator options
    pub options: Vec<String>,
}

impl Default for DocumentConfig {
    fn default() -> Self {
        Self {
            generator: "yardoc".to_string(),
            readme: None,
            text_files: None,
            source_files: None,
            source_extensions: vec!["rb".to_string()],
            options: Vec::new(),
        }
    }
}

/// First `README*` file in `dir`, by name.
pub(crate) fn find_readme(dir: &Path) -> Option<PathBuf> {
    let mut candidates: Vec<PathBuf> = std::fs::read_dir(dir)
        .ok()?
        .filter_map(|e| e.ok())
        .map(|e| e.path())
        .filter(|path| {
            path.is_file()
                && path
                    .file_name()
                    .and_then(|n| n.to_str())
                    .is_some_and(|n| n.starts_with("README"))
        })
        .collect();
    candidates.sort();
    candidates.into_iter().next()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn derives_layout_from_base_dir() {
        let config = ReferenceConfig::with_base_dir("base_directory");

        assert_eq!(config.original_dir(), PathBuf::from("base_directory/reference/en"));
        assert_eq!(config.pot_file("quire"), PathBuf::from("base_directory/po/quire.pot"));
        assert_eq!(config.po_file("ja"), PathBuf::from("base_directory/po/ja.po"));
        assert_eq!(
            config.html_package_dir("quire"),
            PathBuf::from("base_directory/html/quire")
        );
        assert_eq!(
            config.template_path("header", "ja"),
            PathBuf::from("base_directory/templates/header.ja.html")
        );
    }

    #[test]
    fn finds_readme() {
        let temp = tempdir().unwrap();
        fs::write(temp.path().join("README.md"), "# quire").unwrap();
        fs::write(temp.path().join("README.ja.md"), "# quire").unwrap();
        fs::write(temp.path().join("NEWS.md"), "").unwrap();

        assert_eq!(find_readme(temp.path()), Some(temp.path().join("README.ja.md")));
    }
}
