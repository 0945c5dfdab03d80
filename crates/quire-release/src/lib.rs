//! Release tasks.
//!
//! Bumps the version and release date in the site's index pages and
//! uploads the published site with rsync.

pub mod error;
pub mod info;
pub mod publish;
pub mod tasks;

pub use error::ReleaseError;
pub use info::{replace_release_info, update_index_files, ReleaseInfo};
pub use publish::{rsync_invocation, PublishConfig};
pub use tasks::{ReleaseConfig, ReleaseTasks};
