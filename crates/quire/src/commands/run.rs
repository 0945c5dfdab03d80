//! Task runner command.

use std::path::Path;
use std::time::Instant;

use anyhow::Result;
use quire_tasks::{Environment, SystemRunner, TaskContext};

use super::config::load_config;

/// Separate task names from `KEY=VALUE` assignments, keeping task order.
fn split_args(args: &[String]) -> (Vec<String>, Vec<(String, String)>) {
    let mut tasks = Vec::new();
    let mut assignments = Vec::new();
    for arg in args {
        match Environment::parse_assignment(arg) {
            Some(assignment) => assignments.push(assignment),
            None => tasks.push(arg.clone()),
        }
    }
    (tasks, assignments)
}

/// Run the run command.
pub fn run(config_path: &Path, args: &[String], dry_run: bool) -> Result<()> {
    let (tasks, assignments) = split_args(args);
    if tasks.is_empty() {
        anyhow::bail!("No task given. Run 'quire list' to see available tasks.");
    }

    let config = load_config(config_path)?;
    let graph = config.task_graph()?;

    let mut env = Environment::from_process();
    env.extend(assignments);

    let runner = SystemRunner;
    let ctx = TaskContext::new(&env, &runner).with_dry_run(dry_run);

    let start = Instant::now();
    let report = graph.invoke_all(&tasks, &ctx)?;

    tracing::info!(
        "Ran {} task(s) in {}ms",
        report.executed.len(),
        start.elapsed().as_millis()
    );

    Ok(())
}
