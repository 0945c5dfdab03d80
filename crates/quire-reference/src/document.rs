//! API reference generation.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use regex::Regex;

use quire_tasks::{FileList, Invocation, Package, Task, TaskGraph};

use crate::config::{find_readme, DocumentConfig, ReferenceConfig};
use crate::error::ReferenceError;

/// Task running the documentation generator.
pub const GENERATE_TASK: &str = "yard";

static FOOTER_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?s)<div id="footer">.+</div>"#).expect("Invalid footer regex")
});

/// Build the generator command line.
pub fn generator_invocation(
    package: &Package,
    document: &DocumentConfig,
    reference: &ReferenceConfig,
) -> Invocation {
    let mut invocation =
        Invocation::new(&document.generator).args(["--title", package.name.as_str()]);

    let readme = document
        .readme
        .clone()
        .or_else(|| package.readme.as_ref().map(PathBuf::from))
        .or_else(|| find_readme(Path::new(".")));
    if let Some(readme) = readme {
        invocation = invocation.arg("--readme").path_arg(&readme);
    }

    for file in text_files(document, reference) {
        invocation = invocation.args(["--files", file.as_str()]);
    }

    invocation
        .arg("--output-dir")
        .path_arg(&reference.original_dir())
        .args(["--charset", "utf-8", "--no-private"])
        .args(document.options.iter().cloned())
        .args(source_files(package, document))
}

fn text_files(document: &DocumentConfig, reference: &ReferenceConfig) -> Vec<String> {
    if let Some(files) = &document.text_files {
        return files.clone();
    }
    let text_dir = reference.text_dir();
    if text_dir.is_dir() {
        vec![format!("{}/**/*", text_dir.display())]
    } else {
        Vec::new()
    }
}

fn source_files(package: &Package, document: &DocumentConfig) -> Vec<String> {
    match &document.source_files {
        Some(files) => files.clone(),
        None => package.files_with_extensions(&document.source_extensions),
    }
}

/// Empty the generator's footer in every HTML page under `dir`.
///
/// Returns the number of rewritten pages.
pub fn strip_footers(dir: &Path) -> Result<usize, ReferenceError> {
    if !dir.is_dir() {
        return Err(ReferenceError::MissingSource(dir.display().to_string()));
    }

    let mut rewritten = 0;
    for path in FileList::new(dir).with_extension("html").resolve() {
        let html = fs::read_to_string(&path).map_err(|e| ReferenceError::io(&path, e))?;
        let stripped = FOOTER_RE.replace_all(&html, r#"<div id="footer"></div>"#);
        if stripped != html {
            fs::write(&path, stripped.as_bytes()).map_err(|e| ReferenceError::io(&path, e))?;
            rewritten += 1;
        }
    }
    Ok(rewritten)
}

/// Define the generator task: run the generator, then clean its output.
pub(crate) fn define(
    graph: &mut TaskGraph,
    package: &Package,
    document: &DocumentConfig,
    reference: &ReferenceConfig,
) {
    let invocation = generator_invocation(package, document, reference);
    graph.define(
        Task::new(GENERATE_TASK)
            .describe("Generates the API reference.")
            .action(move |ctx| {
                ctx.run(&invocation)?;
                Ok(())
            }),
    );

    let output_dir = reference.original_dir();
    graph.define(Task::new(GENERATE_TASK).action(move |_| {
        let rewritten = strip_footers(&output_dir)?;
        tracing::debug!("Stripped footer from {} pages", rewritten);
        Ok(())
    }));
}
