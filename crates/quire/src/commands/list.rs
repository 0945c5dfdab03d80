//! Task listing command.

use std::path::Path;

use anyhow::Result;
use quire_tasks::{Task, TaskGraph};
use serde::Serialize;

use super::config::load_config;

#[derive(Debug, Serialize)]
struct TaskEntry<'a> {
    name: &'a str,
    description: Option<&'a str>,
    prerequisites: &'a [String],
}

fn entries(graph: &TaskGraph, all: bool) -> Vec<TaskEntry<'_>> {
    let tasks: Vec<&Task> = if all {
        graph.tasks().collect()
    } else {
        graph.described()
    };
    tasks
        .into_iter()
        .map(|task| TaskEntry {
            name: task.name(),
            description: task.description(),
            prerequisites: task.prerequisites(),
        })
        .collect()
}

/// One `name  # description` line per task, descriptions aligned.
fn format_table(entries: &[TaskEntry<'_>]) -> String {
    let width = entries.iter().map(|e| e.name.len()).max().unwrap_or(0);
    let mut out = String::new();
    for entry in entries {
        match entry.description {
            Some(description) => {
                out.push_str(&format!(
                    "quire run {:width$}  # {}\n",
                    entry.name,
                    description,
                    width = width
                ));
            }
            None => out.push_str(&format!("quire run {}\n", entry.name)),
        }
    }
    out
}

/// Run the list command.
pub fn run(config_path: &Path, all: bool, json: bool) -> Result<()> {
    let config = load_config(config_path)?;
    let graph = config.task_graph()?;
    let entries = entries(&graph, all);

    if json {
        println!("{}", serde_json::to_string_pretty(&entries)?);
    } else {
        print!("{}", format_table(&entries));
    }

    Ok(())
}
