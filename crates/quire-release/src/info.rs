//! Version and release date bumping in index pages.

use std::fs;
use std::path::{Path, PathBuf};

use quire_tasks::{Environment, Package};

use crate::error::ReleaseError;

/// Old and new release identifiers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReleaseInfo {
    pub old_version: String,
    pub new_version: String,
    pub old_release_date: String,
    pub new_release_date: String,
}

impl ReleaseInfo {
    /// Read `OLD_VERSION`, `OLD_RELEASE_DATE`, `VERSION` and `RELEASE_DATE`.
    ///
    /// The two old values are required; the new version defaults to the
    /// package version and the new date to today.
    pub fn from_env(env: &Environment, package: &Package) -> Result<Self, ReleaseError> {
        let value = |key: &str| env.get(key).filter(|v| !v.is_empty()).map(str::to_string);

        let old_version = value("OLD_VERSION");
        let old_release_date = value("OLD_RELEASE_DATE");

        let mut missing = Vec::new();
        if old_version.is_none() {
            missing.push("OLD_VERSION".to_string());
        }
        if old_release_date.is_none() {
            missing.push("OLD_RELEASE_DATE".to_string());
        }

        let new_version = value("VERSION").or_else(|| {
            (!package.version.is_empty()).then(|| package.version.clone())
        });
        if new_version.is_none() {
            missing.push("VERSION".to_string());
        }

        match (old_version, old_release_date, new_version) {
            (Some(old_version), Some(old_release_date), Some(new_version)) => Ok(Self {
                old_version,
                new_version,
                old_release_date,
                new_release_date: value("RELEASE_DATE")
                    .unwrap_or_else(|| chrono::Local::now().format("%Y-%m-%d").to_string()),
            }),
            _ => Err(ReleaseError::MissingEnv(missing)),
        }
    }

    fn pairs(&self) -> [(&str, &str); 2] {
        [
            (self.old_version.as_str(), self.new_version.as_str()),
            (
                self.old_release_date.as_str(),
                self.new_release_date.as_str(),
            ),
        ]
    }
}

/// Replace every old version and date with the new one.
///
/// Dotted values are also replaced in their dashed form (`1.0.0` as
/// `1-0-0`), as used in anchors and file names.
pub fn replace_release_info(content: &str, info: &ReleaseInfo) -> String {
    let mut replaced = content.to_string();
    for (old, new) in info.pairs() {
        replaced = replaced.replace(old, new);
        if old.contains('.') {
            replaced = replaced.replace(&old.replace('.', "-"), &new.replace('.', "-"));
        }
    }
    replaced
}

/// Rewrite `files` in place, returning the ones that changed.
///
/// Every file is read before any is written.
pub fn update_index_files(
    files: &[PathBuf],
    info: &ReleaseInfo,
) -> Result<Vec<PathBuf>, ReleaseError> {
    let mut contents = Vec::with_capacity(files.len());
    for path in files {
        contents.push(read(path)?);
    }

    let mut updated = Vec::new();
    for (path, content) in files.iter().zip(contents) {
        let replaced = replace_release_info(&content, info);
        if replaced == content {
            tracing::debug!("{} unchanged", path.display());
            continue;
        }
        fs::write(path, replaced).map_err(|source| ReleaseError::Io {
            path: path.display().to_string(),
            source,
        })?;
        tracing::info!("Updated {}", path.display());
        updated.push(path.clone());
    }
    Ok(updated)
}

fn read(path: &Path) -> Result<String, ReleaseError> {
    fs::read_to_string(path).map_err(|source| ReleaseError::Io {
        path: path.display().to_string(),
        source,
    })
}
