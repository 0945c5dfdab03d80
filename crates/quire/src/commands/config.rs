//! Configuration file (quire.toml) and task graph assembly.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Deserialize;

use quire_reference::{DocumentConfig, DocumentTasks, ReferenceConfig};
use quire_release::{PublishConfig, ReleaseConfig, ReleaseTasks};
use quire_tasks::{LanguageSet, Package, TaskGraph};

/// Configuration file structure (quire.toml).
#[derive(Debug, Deserialize, Default)]
pub struct ConfigFile {
    #[serde(default)]
    pub package: Package,
    #[serde(default)]
    pub languages: LanguagesSection,
    #[serde(default)]
    pub document: DocumentSection,
    #[serde(default)]
    pub reference: ReferenceSection,
    #[serde(default)]
    pub release: ReleaseSection,
    #[serde(default)]
    pub publish: PublishSection,
}

#[derive(Debug, Deserialize)]
pub struct LanguagesSection {
    #[serde(default = "default_original")]
    pub original: String,
    #[serde(default = "default_translations")]
    pub translations: Vec<String>,
}

impl Default for LanguagesSection {
    fn default() -> Self {
        Self {
            original: default_original(),
            translations: default_translations(),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct DocumentSection {
    #[serde(default = "default_generator")]
    pub generator: String,
    pub readme: Option<PathBuf>,
    pub text_files: Option<Vec<String>>,
    pub source_files: Option<Vec<String>>,
    #[serde(default = "default_source_extensions")]
    pub source_extensions: Vec<String>,
    #[serde(default)]
    pub options: Vec<String>,
}

impl Default for DocumentSection {
    fn default() -> Self {
        Self {
            generator: default_generator(),
            readme: None,
            text_files: None,
            source_files: None,
            source_extensions: default_source_extensions(),
            options: Vec::new(),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct ReferenceSection {
    #[serde(default = "default_base_dir")]
    pub base_dir: PathBuf,
    /// Defaults to `<base_dir>/templates`
    pub templates_dir: Option<PathBuf>,
}

impl Default for ReferenceSection {
    fn default() -> Self {
        Self {
            base_dir: default_base_dir(),
            templates_dir: None,
        }
    }
}

#[derive(Debug, Deserialize, Default)]
pub struct ReleaseSection {
    pub index_html_dir: Option<PathBuf>,
}

#[derive(Debug, Deserialize, Default)]
pub struct PublishSection {
    #[serde(default)]
    pub host: String,
    pub user: Option<String>,
    pub user_config: Option<PathBuf>,
    #[serde(default)]
    pub remote_dir: String,
    #[serde(default)]
    pub exclude: Vec<String>,
    #[serde(default)]
    pub delete: bool,
    #[serde(default)]
    pub dry_run: bool,
}

fn default_original() -> String {
    "en".to_string()
}
fn default_translations() -> Vec<String> {
    vec!["ja".to_string()]
}
fn default_generator() -> String {
    DocumentConfig::default().generator
}
fn default_source_extensions() -> Vec<String> {
    DocumentConfig::default().source_extensions
}
fn default_base_dir() -> PathBuf {
    PathBuf::from("doc")
}

impl ConfigFile {
    pub fn languages(&self) -> LanguageSet {
        LanguageSet::new(&self.languages.original)
            .with_translations(self.languages.translations.iter().cloned())
    }

    pub fn reference(&self) -> ReferenceConfig {
        let mut reference = ReferenceConfig::with_base_dir(&self.reference.base_dir);
        if let Some(dir) = &self.reference.templates_dir {
            reference.templates_dir = dir.clone();
        }
        reference.languages = self.languages();
        reference
    }

    pub fn document(&self) -> DocumentConfig {
        let section = &self.document;
        DocumentConfig {
            generator: section.generator.clone(),
            readme: section.readme.clone(),
            text_files: section.text_files.clone(),
            source_files: section.source_files.clone(),
            source_extensions: section.source_extensions.clone(),
            options: section.options.clone(),
        }
    }

    pub fn publish(&self) -> PublishConfig {
        let section = &self.publish;
        PublishConfig {
            host: section.host.clone(),
            user: section.user.clone(),
            user_config: section.user_config.clone(),
            remote_dir: section.remote_dir.clone(),
            exclude: section.exclude.clone(),
            delete: section.delete,
            dry_run: section.dry_run,
        }
    }

    /// Every task the configured package gets.
    ///
    /// Fails unless `[package] name` is a single path component.
    pub fn task_graph(&self) -> Result<TaskGraph> {
        if !self.package.has_valid_name() {
            anyhow::bail!(
                "Invalid package name {:?}: set [package] name in quire.toml",
                self.package.name
            );
        }

        let reference = self.reference();
        let mut graph = TaskGraph::new();

        DocumentTasks::new(self.package.clone())
            .with_document(self.document())
            .with_reference(reference.clone())
            .define(&mut graph);

        ReleaseTasks::new(self.package.clone(), reference)
            .with_release(ReleaseConfig {
                index_html_dir: self.release.index_html_dir.clone(),
            })
            .with_publish(self.publish())
            .define(&mut graph);

        Ok(graph)
    }
}

/// Load configuration from `path` if it exists.
/// Returns an error if the config file exists but is malformed.
pub fn load_config(path: &Path) -> Result<ConfigFile> {
    if path.exists() {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        let config: ConfigFile = toml::from_str(&content)
            .with_context(|| format!("Failed to parse {}", path.display()))?;
        tracing::debug!("Loaded config from {}", path.display());
        return Ok(config);
    }
    tracing::debug!("{} not found, using defaults", path.display());
    Ok(ConfigFile::default())
}
