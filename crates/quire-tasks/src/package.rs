//! Package descriptor and language set.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

/// Metadata describing the package being documented and released.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Package {
    /// Package name, also the published directory name
    pub name: String,

    /// Current version
    pub version: String,

    /// Site URL the published reference lives under
    #[serde(default)]
    pub homepage: String,

    /// Files shipped with the package
    #[serde(default)]
    pub files: Vec<String>,

    /// README path
    #[serde(default)]
    pub readme: Option<String>,
}

impl Package {
    pub fn new(name: impl Into<String>, version: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            version: version.into(),
            ..Default::default()
        }
    }

    /// Whether `name` is usable as a single directory and file name
    /// component.
    pub fn has_valid_name(&self) -> bool {
        !self.name.is_empty()
            && self.name != "."
            && self.name != ".."
            && !self.name.contains(['/', '\\'])
    }

    /// Homepage with a guaranteed trailing slash.
    pub fn homepage_url(&self) -> String {
        if self.homepage.is_empty() || self.homepage.ends_with('/') {
            self.homepage.clone()
        } else {
            format!("{}/", self.homepage)
        }
    }

    /// Package files whose extension is one of `extensions`.
    pub fn files_with_extensions(&self, extensions: &[String]) -> Vec<String> {
        self.files
            .iter()
            .filter(|file| {
                std::path::Path::new(file)
                    .extension()
                    .and_then(|e| e.to_str())
                    .is_some_and(|ext| extensions.iter().any(|wanted| wanted == ext))
            })
            .cloned()
            .collect()
    }
}

/// The original documentation language plus its translations.
///
/// Order-insensitive; duplicate codes, including the original repeated as
/// a translation, collapse.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LanguageSet {
    original: String,
    translations: BTreeSet<String>,
}

impl LanguageSet {
    /// A set with only the original language.
    pub fn new(original: impl Into<String>) -> Self {
        Self {
            original: original.into(),
            translations: BTreeSet::new(),
        }
    }

    /// Add translation targets.
    pub fn with_translations<I, S>(mut self, languages: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        for language in languages {
            self.add(language);
        }
        self
    }

    pub fn add(&mut self, language: impl Into<String>) {
        let language = language.into();
        if language != self.original {
            self.translations.insert(language);
        }
    }

    pub fn original(&self) -> &str {
        &self.original
    }

    /// Target languages, sorted.
    pub fn translations(&self) -> impl Iterator<Item = &str> {
        self.translations.iter().map(String::as_str)
    }

    /// Original first, then translations.
    pub fn all(&self) -> impl Iterator<Item = &str> {
        std::iter::once(self.original.as_str()).chain(self.translations())
    }

    pub fn contains(&self, language: &str) -> bool {
        language == self.original || self.translations.contains(language)
    }
}

impl Default for LanguageSet {
    fn default() -> Self {
        Self::new("en").with_translations(["ja"])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn collapses_duplicates() {
        let languages = LanguageSet::new("en").with_translations(["ja", "fr", "ja", "en"]);

        assert_eq!(languages.all().collect::<Vec<_>>(), vec!["en", "fr", "ja"]);
        assert_eq!(languages.translations().count(), 2);
    }

    #[test]
    fn order_insensitive() {
        let a = LanguageSet::new("en").with_translations(["ja", "fr"]);
        let b = LanguageSet::new("en").with_translations(["fr", "ja"]);

        assert_eq!(a, b);
    }

    #[test]
    fn rejects_names_that_are_not_one_path_component() {
        for name in ["", ".", "..", "quire/doc", "..\\quire"] {
            assert!(!Package::new(name, "1.0.0").has_valid_name(), "{:?}", name);
        }
        assert!(Package::new("quire-doc", "1.0.0").has_valid_name());
    }

    #[test]
    fn normalizes_homepage() {
        let mut package = Package::new("quire", "1.0.0");
        package.homepage = "https://example.org".to_string();

        assert_eq!(package.homepage_url(), "https://example.org/");
    }

    #[test]
    fn filters_files_by_extension() {
        let mut package = Package::new("quire", "1.0.0");
        package.files = vec![
            "lib/quire.rb".to_string(),
            "README.md".to_string(),
            "lib/quire/task.rb".to_string(),
        ];

        assert_eq!(
            package.files_with_extensions(&["rb".to_string()]),
            vec!["lib/quire.rb", "lib/quire/task.rb"]
        );
    }
}
