//! Release task definitions.

use std::path::PathBuf;

use quire_reference::tasks::{PUBLICATION_PREPARE_TASK, REFERENCE_GENERATE_TASK};
use quire_reference::ReferenceConfig;
use quire_tasks::{Package, Task, TaskGraph};

use crate::info::{update_index_files, ReleaseInfo};
use crate::publish::{rsync_invocation, PublishConfig};

pub const INFO_UPDATE_TASK: &str = "release:info:update";
pub const REFERENCE_PUBLISH_TASK: &str = "reference:publish";
pub const HTML_PUBLISH_TASK: &str = "html:publish";

/// Where release information lives.
#[derive(Debug, Clone, Default)]
pub struct ReleaseConfig {
    /// Directory holding `index.html` and its translations;
    /// `<base>/html` when unset
    pub index_html_dir: Option<PathBuf>,
}

/// Release and upload tasks for one package.
#[derive(Debug, Clone)]
pub struct ReleaseTasks {
    package: Package,
    reference: ReferenceConfig,
    release: ReleaseConfig,
    publish: PublishConfig,
}

impl ReleaseTasks {
    pub fn new(package: Package, reference: ReferenceConfig) -> Self {
        Self {
            package,
            reference,
            release: ReleaseConfig::default(),
            publish: PublishConfig::default(),
        }
    }

    pub fn with_release(mut self, release: ReleaseConfig) -> Self {
        self.release = release;
        self
    }

    pub fn with_publish(mut self, publish: PublishConfig) -> Self {
        self.publish = publish;
        self
    }

    /// `index.html` plus `index.html.<lang>` for every translation.
    pub fn index_files(&self) -> Vec<PathBuf> {
        let dir = self
            .release
            .index_html_dir
            .clone()
            .unwrap_or_else(|| self.reference.html_base_dir());
        std::iter::once(dir.join("index.html"))
            .chain(
                self.reference
                    .languages
                    .translations()
                    .map(|language| dir.join(format!("index.html.{}", language))),
            )
            .collect()
    }

    pub fn define(&self, graph: &mut TaskGraph) {
        self.define_info_task(graph);
        self.define_publish_tasks(graph);
    }

    fn define_info_task(&self, graph: &mut TaskGraph) {
        let package = self.package.clone();
        let files = self.index_files();
        graph.define(
            Task::new(INFO_UPDATE_TASK)
                .describe("Update version in index HTML.")
                .action(move |ctx| {
                    let info = ReleaseInfo::from_env(ctx.env(), &package)?;
                    tracing::info!(
                        "Updating {} -> {}, {} -> {}",
                        info.old_version,
                        info.new_version,
                        info.old_release_date,
                        info.new_release_date
                    );
                    let updated = update_index_files(&files, &info)?;
                    tracing::info!("Updated {} of {} index files", updated.len(), files.len());
                    Ok(())
                }),
        );
    }

    fn define_publish_tasks(&self, graph: &mut TaskGraph) {
        let publish = self.publish.clone();
        let source = self.reference.html_package_dir(&self.package.name);
        let destination = self.package.name.clone();
        graph.define(
            Task::new(REFERENCE_PUBLISH_TASK)
                .describe("Upload the reference to the web site.")
                .depends_on([REFERENCE_GENERATE_TASK, PUBLICATION_PREPARE_TASK])
                .action(move |ctx| {
                    let remote = publish.remote(&publish.resolve_user()?)?;
                    ctx.run(&rsync_invocation(&publish, &remote, &source, &destination))?;
                    Ok(())
                }),
        );

        let publish = self.publish.clone();
        let source = self.reference.html_base_dir();
        graph.define(
            Task::new(HTML_PUBLISH_TASK)
                .describe("Publish HTML to the web site.")
                .action(move |ctx| {
                    let remote = publish.remote(&publish.resolve_user()?)?;
                    ctx.run(&rsync_invocation(&publish, &remote, &source, ""))?;
                    Ok(())
                }),
        );
    }
}
