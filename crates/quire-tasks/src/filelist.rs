//! Lazily evaluated file sets.

use std::path::{Path, PathBuf};

use walkdir::WalkDir;

/// Files under a root directory, optionally filtered by extension.
///
/// Evaluated on every call to [`FileList::resolve`], so a list created
/// before the files exist still sees them once they are generated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileList {
    root: PathBuf,
    extensions: Vec<String>,
}

impl FileList {
    /// Every file under `root`.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            extensions: Vec::new(),
        }
    }

    /// Restrict to files with this extension (without the dot).
    pub fn with_extension(mut self, extension: impl Into<String>) -> Self {
        self.extensions.push(extension.into());
        self
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Current matching files, sorted. A missing root yields nothing.
    pub fn resolve(&self) -> Vec<PathBuf> {
        if !self.root.is_dir() {
            return Vec::new();
        }

        let mut files: Vec<PathBuf> = WalkDir::new(&self.root)
            .follow_links(true)
            .into_iter()
            .filter_map(|e| e.ok())
            .filter(|e| e.file_type().is_file())
            .map(|e| e.into_path())
            .filter(|path| self.matches(path))
            .collect();

        files.sort();
        files
    }

    fn matches(&self, path: &Path) -> bool {
        if self.extensions.is_empty() {
            return true;
        }
        let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("");
        self.extensions.iter().any(|wanted| wanted == ext)
    }
}
