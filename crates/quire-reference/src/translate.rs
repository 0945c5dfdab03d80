//! Translation catalogs and translated reference trees.
//!
//! Catalog extraction, merging and translation are delegated to `xml2po`;
//! new catalogs are created with `msginit`.

use std::fs;
use std::path::{Path, PathBuf};

use walkdir::WalkDir;

use quire_tasks::{FileList, Invocation, Package, Task, TaskContext, TaskGraph};

use crate::config::ReferenceConfig;
use crate::document::GENERATE_TASK;
use crate::error::ReferenceError;

pub const XML2PO: &str = "xml2po";
pub const MSGINIT: &str = "msginit";

pub const POT_GENERATE_TASK: &str = "reference:pot:generate";
pub const PO_UPDATE_TASK: &str = "reference:po:update";
pub const TRANSLATE_TASK: &str = "reference:translate";

pub fn po_update_task(language: &str) -> String {
    format!("reference:po:{}:update", language)
}

pub fn translate_task(language: &str) -> String {
    format!("{}:{}", TRANSLATE_TASK, language)
}

/// Extract a catalog template from HTML pages.
pub fn pot_invocation(pot: &Path, html: &[PathBuf]) -> Invocation {
    Invocation::new(XML2PO)
        .args(["--keep-entities", "--output"])
        .path_arg(pot)
        .args(html.iter().map(|p| p.display().to_string()))
}

/// Merge new messages from HTML pages into an existing catalog.
pub fn po_merge_invocation(po: &Path, html: &[PathBuf]) -> Invocation {
    Invocation::new(XML2PO)
        .args(["--keep-entities", "--update"])
        .path_arg(po)
        .args(html.iter().map(|p| p.display().to_string()))
}

/// Create a new catalog for `language` from the template.
pub fn po_init_invocation(pot: &Path, po: &Path, language: &str) -> Invocation {
    Invocation::new(MSGINIT)
        .arg(format!("--input={}", pot.display()))
        .arg(format!("--output={}", po.display()))
        .arg(format!("--locale={}", language))
        .arg("--no-translator")
}

/// Translate one page, writing the result to `target`.
pub fn translate_invocation(po: &Path, language: &str, source: &Path, target: &Path) -> Invocation {
    Invocation::new(XML2PO)
        .args(["--keep-entities", "--po-file"])
        .path_arg(po)
        .args(["--language", language])
        .path_arg(source)
        .stdout_to(target)
}

fn require_html(list: &FileList) -> Result<Vec<PathBuf>, ReferenceError> {
    let files = list.resolve();
    if files.is_empty() {
        return Err(ReferenceError::NoHtml(list.root().display().to_string()));
    }
    Ok(files)
}

/// Mirror `source` into `target`, translating HTML pages with `po`.
///
/// Returns the number of translated pages.
pub fn translate_tree(
    ctx: &TaskContext<'_>,
    source: &Path,
    target: &Path,
    po: &Path,
    language: &str,
) -> Result<usize, ReferenceError> {
    if !source.is_dir() {
        return Err(ReferenceError::MissingSource(source.display().to_string()));
    }
    fs::create_dir_all(target).map_err(|e| ReferenceError::io(target, e))?;

    let mut translated = 0;
    for entry in WalkDir::new(source)
        .min_depth(1)
        .follow_links(true)
        .sort_by_file_name()
    {
        let entry = entry?;
        let path = entry.path();
        let relative = path.strip_prefix(source).unwrap_or(path);
        let translated_path = target.join(relative);

        if entry.file_type().is_dir() {
            fs::create_dir_all(&translated_path)
                .map_err(|e| ReferenceError::io(&translated_path, e))?;
            continue;
        }

        if path.extension().and_then(|e| e.to_str()) == Some("html") {
            ctx.run(&translate_invocation(po, language, path, &translated_path))?;
            translated += 1;
        } else {
            fs::copy(path, &translated_path).map_err(|e| ReferenceError::io(path, e))?;
        }
    }

    Ok(translated)
}

/// Define catalog and translation tasks for every target language.
pub(crate) fn define(graph: &mut TaskGraph, package: &Package, reference: &ReferenceConfig) {
    let po_dir = reference.po_dir();
    let pot = reference.pot_file(&package.name);
    let pot_name = pot.display().to_string();
    let html = FileList::new(reference.original_dir()).with_extension("html");

    graph.define(Task::directory(&po_dir));

    let (pot_path, pot_html) = (pot.clone(), html.clone());
    graph.define(
        Task::file(&pot)
            .depends_on([po_dir.display().to_string()])
            .with_inputs(html.clone())
            .action(move |ctx| {
                let files = require_html(&pot_html)?;
                ctx.run(&pot_invocation(&pot_path, &files))?;
                Ok(())
            }),
    );
    graph.define(
        Task::new(POT_GENERATE_TASK)
            .describe("Generates pot file.")
            .depends_on([pot_name.clone()]),
    );

    let mut update_tasks = vec![GENERATE_TASK.to_string()];
    let mut translate_tasks = Vec::new();

    for language in reference.languages.translations() {
        let po = reference.po_file(language);
        let po_name = po.display().to_string();

        // Decided once, when the tasks are defined
        let po_task = if po.exists() {
            let (po_path, po_html) = (po.clone(), html.clone());
            Task::file(&po)
                .with_inputs(html.clone())
                .action(move |ctx| {
                    let files = require_html(&po_html)?;
                    ctx.run(&po_merge_invocation(&po_path, &files))?;
                    Ok(())
                })
        } else {
            let (pot_path, po_path, locale) = (pot.clone(), po.clone(), language.to_string());
            Task::file(&po)
                .depends_on([pot_name.clone()])
                .action(move |ctx| {
                    ctx.run(&po_init_invocation(&pot_path, &po_path, &locale))?;
                    Ok(())
                })
        };
        graph.define(po_task);

        let update = po_update_task(language);
        graph.define(
            Task::new(&update)
                .describe(format!("Updates po file for {}.", language))
                .depends_on([po_name.clone()]),
        );
        update_tasks.push(update);

        let translate = translate_task(language);
        let source = reference.original_dir();
        let target = reference.language_dir(language);
        let locale = language.to_string();
        graph.define(
            Task::new(&translate)
                .describe(format!("Translates documents to {}.", language))
                .depends_on([po_name])
                .action(move |ctx| {
                    let count = translate_tree(ctx, &source, &target, &po, &locale)?;
                    tracing::info!("Translated {} pages to {}", count, locale);
                    Ok(())
                }),
        );
        translate_tasks.push(translate);
    }

    graph.define(
        Task::new(PO_UPDATE_TASK)
            .describe("Updates po files.")
            .depends_on(update_tasks),
    );
    graph.define(
        Task::new(TRANSLATE_TASK)
            .describe("Translates references.")
            .depends_on(translate_tasks),
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use quire_tasks::{Environment, MockCommandRunner};
    use tempfile::tempdir;

    #[test]
    fn builds_catalog_command_lines() {
        let html = vec![PathBuf::from("doc/reference/en/index.html")];

        assert_eq!(
            pot_invocation(Path::new("doc/po/quire.pot"), &html).to_string(),
            "xml2po --keep-entities --output doc/po/quire.pot doc/reference/en/index.html"
        );
        assert_eq!(
            po_merge_invocation(Path::new("doc/po/ja.po"), &html).to_string(),
            "xml2po --keep-entities --update doc/po/ja.po doc/reference/en/index.html"
        );
        assert_eq!(
            po_init_invocation(Path::new("doc/po/quire.pot"), Path::new("doc/po/ja.po"), "ja")
                .args,
            vec![
                "--input=doc/po/quire.pot",
                "--output=doc/po/ja.po",
                "--locale=ja",
                "--no-translator",
            ]
        );
    }

    #[test]
    fn translates_html_and_copies_the_rest() {
        let temp = tempdir().unwrap();
        let source = temp.path().join("en");
        let target = temp.path().join("ja");
        let po = temp.path().join("ja.po");
        fs::create_dir_all(source.join("Quire")).unwrap();
        fs::write(source.join("index.html"), "<html></html>").unwrap();
        fs::write(source.join("Quire/Task.html"), "<html></html>").unwrap();
        fs::write(source.join("style.css"), "body {}").unwrap();

        let expected_target = target.join("Quire/Task.html");
        let mut runner = MockCommandRunner::new();
        runner
            .expect_run()
            .withf(move |invocation| {
                invocation.program == XML2PO
                    && invocation.args.contains(&"ja".to_string())
                    && invocation.stdout.as_deref() == Some(expected_target.as_path())
            })
            .times(1)
            .returning(|_| Ok(()));
        runner
            .expect_run()
            .withf(|invocation| invocation.program == XML2PO)
            .times(1)
            .returning(|_| Ok(()));

        let env = Environment::new();
        let ctx = TaskContext::new(&env, &runner);
        let count = translate_tree(&ctx, &source, &target, &po, "ja").unwrap();

        assert_eq!(count, 2);
        assert!(target.join("Quire").is_dir());
        assert_eq!(fs::read_to_string(target.join("style.css")).unwrap(), "body {}");
    }

    #[test]
    fn translate_requires_source() {
        let temp = tempdir().unwrap();
        let env = Environment::new();
        let runner = MockCommandRunner::new();
        let ctx = TaskContext::new(&env, &runner);

        let result = translate_tree(
            &ctx,
            &temp.path().join("en"),
            &temp.path().join("ja"),
            &temp.path().join("ja.po"),
            "ja",
        );

        assert!(matches!(result, Err(ReferenceError::MissingSource(_))));
    }

    #[cfg(unix)]
    #[test]
    fn translate_aborts_on_unreadable_entry() {
        let temp = tempdir().unwrap();
        let source = temp.path().join("en");
        fs::create_dir_all(&source).unwrap();
        std::os::unix::fs::symlink(&source, source.join("loop")).unwrap();
        let env = Environment::new();
        let mut runner = MockCommandRunner::new();
        runner.expect_run().never();
        let ctx = TaskContext::new(&env, &runner);

        let result = translate_tree(
            &ctx,
            &source,
            &temp.path().join("ja"),
            &temp.path().join("ja.po"),
            "ja",
        );

        assert!(matches!(result, Err(ReferenceError::Walk(_))));
    }
}
