use std::path::Path;

use quire_tasks::CommandError;

/// Errors raised by reference tasks.
#[derive(Debug, thiserror::Error)]
pub enum ReferenceError {
    #[error("Invalid package name {0:?}: set [package] name")]
    InvalidPackageName(String),

    #[error("Reference directory not found: {0}")]
    MissingSource(String),

    #[error("Template not found: {0}")]
    MissingTemplate(String),

    #[error("No HTML files found under {0}")]
    NoHtml(String),

    #[error("Failed to render template {name}: {source}")]
    Template {
        name: String,
        #[source]
        source: minijinja::Error,
    },

    #[error("{path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to read reference tree: {0}")]
    Walk(#[from] walkdir::Error),

    #[error(transparent)]
    Command(#[from] CommandError),
}

impl ReferenceError {
    pub(crate) fn io(path: &Path, source: std::io::Error) -> Self {
        Self::Io {
            path: path.display().to_string(),
            source,
        }
    }
}
