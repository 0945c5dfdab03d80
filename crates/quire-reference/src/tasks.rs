//! Task set tying generation, translation and publication together.

use std::path::PathBuf;

use quire_tasks::{LanguageSet, Package, Task, TaskGraph};

use crate::config::{DocumentConfig, ReferenceConfig};
use crate::document::{self, GENERATE_TASK};
use crate::publication::Publisher;
use crate::translate::{self, TRANSLATE_TASK};

pub const REFERENCE_GENERATE_TASK: &str = "reference:generate";
pub const PUBLICATION_PREPARE_TASK: &str = "reference:publication:prepare";

/// Documentation and reference tasks for one package.
///
/// The base directory set here is shared by every task it defines.
#[derive(Debug, Clone)]
pub struct DocumentTasks {
    package: Package,
    document: DocumentConfig,
    reference: ReferenceConfig,
}

impl DocumentTasks {
    pub fn new(package: Package) -> Self {
        Self {
            package,
            document: DocumentConfig::default(),
            reference: ReferenceConfig::default(),
        }
    }

    pub fn with_document(mut self, document: DocumentConfig) -> Self {
        self.document = document;
        self
    }

    pub fn with_reference(mut self, reference: ReferenceConfig) -> Self {
        self.reference = reference;
        self
    }

    /// Move the whole documentation tree, templates included.
    pub fn base_dir(mut self, base_dir: impl Into<PathBuf>) -> Self {
        let languages = self.reference.languages.clone();
        self.reference = ReferenceConfig::with_base_dir(base_dir);
        self.reference.languages = languages;
        self
    }

    pub fn languages(mut self, languages: LanguageSet) -> Self {
        self.reference.languages = languages;
        self
    }

    pub fn reference(&self) -> &ReferenceConfig {
        &self.reference
    }

    /// Add every documentation task to `graph`.
    pub fn define(&self, graph: &mut TaskGraph) {
        document::define(graph, &self.package, &self.document, &self.reference);
        translate::define(graph, &self.package, &self.reference);

        graph.define(
            Task::new(REFERENCE_GENERATE_TASK)
                .describe("Generates and translates the reference.")
                .depends_on([GENERATE_TASK, TRANSLATE_TASK]),
        );

        let package = self.package.clone();
        let reference = self.reference.clone();
        graph.define(
            Task::new(PUBLICATION_PREPARE_TASK)
                .describe("Prepares the reference for publication.")
                .action(move |_| {
                    let result = Publisher::new(&package, &reference).publish()?;
                    tracing::info!(
                        "Published {} languages ({} pages) in {}ms to {}",
                        result.languages,
                        result.pages,
                        result.duration_ms,
                        result.output_dir.display()
                    );
                    Ok(())
                }),
        );
    }
}
