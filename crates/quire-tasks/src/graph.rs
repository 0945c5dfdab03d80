//! Task registry and invocation.

use std::collections::{BTreeMap, HashSet};
use std::fs;
use std::path::Path;
use std::time::SystemTime;

use crate::context::TaskContext;
use crate::filelist::FileList;
use crate::task::{ActionError, Task, TaskKind};

/// Errors raised while invoking tasks.
#[derive(Debug, thiserror::Error)]
pub enum TaskError {
    #[error("Don't know how to build task '{0}'")]
    Unknown(String),

    #[error("Circular dependency detected: {0}")]
    Cycle(String),

    #[error("Failed to create directory {path}: {source}")]
    Directory {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Task '{task}' failed: {source}")]
    Action {
        task: String,
        #[source]
        source: ActionError,
    },
}

/// Tasks whose actions ran during an invocation, in execution order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InvokeReport {
    pub executed: Vec<String>,
}

/// Per-invocation bookkeeping: every task runs at most once.
#[derive(Default)]
struct Session {
    done: HashSet<String>,
    stack: Vec<String>,
    report: InvokeReport,
}

/// A set of named tasks.
#[derive(Debug, Default)]
pub struct TaskGraph {
    tasks: BTreeMap<String, Task>,
}

impl TaskGraph {
    /// Create an empty graph.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a task. Redefining a name enhances the existing task with the
    /// new prerequisites and actions.
    pub fn define(&mut self, task: Task) -> &mut Self {
        match self.tasks.get_mut(task.name()) {
            Some(existing) => existing.enhance(task),
            None => {
                self.tasks.insert(task.name().to_string(), task);
            }
        }
        self
    }

    pub fn get(&self, name: &str) -> Option<&Task> {
        self.tasks.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.tasks.contains_key(name)
    }

    /// All tasks, sorted by name.
    pub fn tasks(&self) -> impl Iterator<Item = &Task> {
        self.tasks.values()
    }

    /// Tasks with a description, sorted by name.
    pub fn described(&self) -> Vec<&Task> {
        self.tasks
            .values()
            .filter(|task| task.description().is_some())
            .collect()
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    /// Invoke one task and its prerequisites.
    pub fn invoke(&self, name: &str, ctx: &TaskContext<'_>) -> Result<InvokeReport, TaskError> {
        self.invoke_all([name], ctx)
    }

    /// Invoke several tasks in order, sharing one session so common
    /// prerequisites run only once.
    pub fn invoke_all<I, S>(&self, names: I, ctx: &TaskContext<'_>) -> Result<InvokeReport, TaskError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut session = Session::default();
        for name in names {
            self.invoke_in(name.as_ref(), ctx, &mut session)?;
        }
        Ok(session.report)
    }

    fn invoke_in(
        &self,
        name: &str,
        ctx: &TaskContext<'_>,
        session: &mut Session,
    ) -> Result<(), TaskError> {
        if session.done.contains(name) {
            return Ok(());
        }

        if let Some(pos) = session.stack.iter().position(|n| n == name) {
            let mut path = session.stack[pos..].to_vec();
            path.push(name.to_string());
            return Err(TaskError::Cycle(path.join(" => ")));
        }

        let Some(task) = self.tasks.get(name) else {
            // Plain files are valid prerequisites
            if Path::new(name).exists() {
                session.done.insert(name.to_string());
                return Ok(());
            }
            return Err(TaskError::Unknown(name.to_string()));
        };

        session.stack.push(name.to_string());
        for prerequisite in task.prerequisites() {
            self.invoke_in(prerequisite, ctx, session)?;
        }
        session.stack.pop();
        session.done.insert(name.to_string());

        if !self.is_needed(task) {
            tracing::debug!("Skipping {} (up to date)", name);
            return Ok(());
        }

        self.execute(task, ctx)?;
        session.report.executed.push(name.to_string());
        Ok(())
    }

    fn execute(&self, task: &Task, ctx: &TaskContext<'_>) -> Result<(), TaskError> {
        if ctx.is_dry_run() {
            tracing::info!("Execute (dry run) {}", task.name());
            return Ok(());
        }

        tracing::info!("Execute {}", task.name());

        if matches!(task.kind(), TaskKind::Directory) {
            fs::create_dir_all(task.name()).map_err(|source| TaskError::Directory {
                path: task.name().to_string(),
                source,
            })?;
        }

        for action in task.actions() {
            action(ctx).map_err(|source| TaskError::Action {
                task: task.name().to_string(),
                source,
            })?;
        }

        Ok(())
    }

    fn is_needed(&self, task: &Task) -> bool {
        match task.kind() {
            TaskKind::Plain => true,
            TaskKind::Directory => !Path::new(task.name()).is_dir(),
            TaskKind::File { inputs } => {
                let Some(target) = modified(Path::new(task.name())) else {
                    return true;
                };

                for prerequisite in task.prerequisites() {
                    match self.tasks.get(prerequisite).map(Task::kind) {
                        Some(TaskKind::Plain) => return true,
                        Some(TaskKind::Directory) => continue,
                        _ => {
                            if is_newer(Path::new(prerequisite), target) {
                                return true;
                            }
                        }
                    }
                }

                inputs
                    .iter()
                    .flat_map(FileList::resolve)
                    .any(|path| is_newer(&path, target))
            }
        }
    }
}

fn modified(path: &Path) -> Option<SystemTime> {
    fs::metadata(path).and_then(|m| m.modified()).ok()
}

fn is_newer(path: &Path, than: SystemTime) -> bool {
    modified(path).is_some_and(|time| time > than)
}
