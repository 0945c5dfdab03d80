//! Site upload with rsync.

use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use quire_tasks::Invocation;

use crate::error::ReleaseError;

/// Upload destination and rsync options.
#[derive(Debug, Clone, Default)]
pub struct PublishConfig {
    /// Remote host
    pub host: String,

    /// Remote user; read from `user_config` when unset
    pub user: Option<String>,

    /// YAML file holding `username`; `~/.quire/user-config.yml` when unset
    pub user_config: Option<PathBuf>,

    /// Remote directory the site is served from
    pub remote_dir: String,

    /// Patterns passed as `--exclude`
    pub exclude: Vec<String>,

    /// Delete remote files missing locally
    pub delete: bool,

    /// Pass `--dry-run` to rsync
    pub dry_run: bool,
}

#[derive(Debug, Deserialize)]
struct UserConfig {
    username: String,
}

impl PublishConfig {
    fn user_config_path(&self) -> PathBuf {
        self.user_config.clone().unwrap_or_else(|| {
            dirs::home_dir()
                .unwrap_or_default()
                .join(".quire")
                .join("user-config.yml")
        })
    }

    /// Resolve the upload user.
    pub fn resolve_user(&self) -> Result<String, ReleaseError> {
        if let Some(user) = &self.user {
            return Ok(user.clone());
        }

        let path = self.user_config_path();
        if !path.is_file() {
            return Err(ReleaseError::MissingUser(path.display().to_string()));
        }
        let content = fs::read_to_string(&path).map_err(|source| ReleaseError::Io {
            path: path.display().to_string(),
            source,
        })?;
        let config: UserConfig =
            serde_yaml::from_str(&content).map_err(|e| ReleaseError::UserConfig {
                path: path.display().to_string(),
                message: e.to_string(),
            })?;
        Ok(config.username)
    }

    /// `user@host:remote_dir` with a trailing slash.
    pub fn remote(&self, user: &str) -> Result<String, ReleaseError> {
        if self.host.is_empty() {
            return Err(ReleaseError::MissingHost);
        }
        let dir = if self.remote_dir.ends_with('/') {
            self.remote_dir.clone()
        } else {
            format!("{}/", self.remote_dir)
        };
        Ok(format!("{}@{}:{}", user, self.host, dir))
    }
}

/// Build the rsync command uploading the contents of `source` to
/// `remote` + `destination`.
pub fn rsync_invocation(
    config: &PublishConfig,
    remote: &str,
    source: &Path,
    destination: &str,
) -> Invocation {
    let mut invocation = Invocation::new("rsync").args(["-av", "--chmod=ug+w"]);
    if config.delete {
        invocation = invocation.arg("--delete");
    }
    for pattern in &config.exclude {
        invocation = invocation.arg(format!("--exclude={}", pattern));
    }
    if config.dry_run {
        invocation = invocation.arg("--dry-run");
    }
    invocation
        .arg(format!("{}/", source.display()))
        .arg(format!("{}{}", remote, destination))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use tempfile::tempdir;

    fn config() -> PublishConfig {
        PublishConfig {
            host: "quire.example.org".to_string(),
            user: Some("alice".to_string()),
            remote_dir: "/var/www/quire".to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn builds_rsync_command_line() {
        let mut config = config();
        config.delete = true;
        config.exclude = vec!["*.erb".to_string()];
        let remote = config.remote("alice").unwrap();

        let invocation = rsync_invocation(&config, &remote, Path::new("doc/html/quire"), "quire");

        assert_eq!(
            invocation.to_string(),
            "rsync -av --chmod=ug+w --delete --exclude=*.erb doc/html/quire/ \
             alice@quire.example.org:/var/www/quire/quire"
        );
    }

    #[test]
    fn reads_user_from_yaml_config() {
        let temp = tempdir().unwrap();
        let path = temp.path().join("user-config.yml");
        fs::write(&path, "username: bob\n").unwrap();
        let config = PublishConfig {
            user: None,
            user_config: Some(path),
            ..config()
        };

        assert_eq!(config.resolve_user().unwrap(), "bob");
    }

    #[test]
    fn missing_user_config_is_an_error() {
        let temp = tempdir().unwrap();
        let config = PublishConfig {
            user: None,
            user_config: Some(temp.path().join("missing.yml")),
            ..config()
        };

        assert!(matches!(
            config.resolve_user(),
            Err(ReleaseError::MissingUser(_))
        ));
    }

    #[test]
    fn requires_host() {
        let config = PublishConfig::default();

        assert!(matches!(config.remote("alice"), Err(ReleaseError::MissingHost)));
    }
}
