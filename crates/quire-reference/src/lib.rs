//! API reference tasks.
//!
//! Generates the reference with an external documentation generator,
//! maintains gettext catalogs for its translations, and publishes every
//! language into a static site layout with shared header and footer
//! fragments.

pub mod config;
pub mod document;
pub mod error;
pub mod publication;
pub mod tasks;
pub mod templates;
pub mod translate;

pub use config::{DocumentConfig, ReferenceConfig};
pub use error::ReferenceError;
pub use publication::{PublishResult, Publisher};
pub use tasks::DocumentTasks;
pub use templates::{Fragment, Fragments, PackageInfo, PageContext, PagePaths};
