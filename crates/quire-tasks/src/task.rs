//! Task definitions.

use std::fmt;
use std::path::Path;

use crate::context::TaskContext;
use crate::filelist::FileList;

/// Error returned by a task action.
pub type ActionError = Box<dyn std::error::Error + Send + Sync>;

/// Work performed when a task runs.
pub type Action = Box<dyn Fn(&TaskContext<'_>) -> Result<(), ActionError>>;

/// How a task decides whether it needs to run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TaskKind {
    /// Runs every time it is invoked
    Plain,

    /// Runs when the target file is missing or older than its sources
    File {
        /// Additional source files, resolved at invocation time
        inputs: Vec<FileList>,
    },

    /// Creates the directory if it does not exist
    Directory,
}

/// A named unit of work with prerequisites.
pub struct Task {
    name: String,
    description: Option<String>,
    prerequisites: Vec<String>,
    kind: TaskKind,
    actions: Vec<Action>,
}

impl Task {
    /// A plain task.
    pub fn new(name: impl Into<String>) -> Self {
        Self::with_kind(name.into(), TaskKind::Plain)
    }

    /// A file task named after its target path.
    pub fn file(path: impl AsRef<Path>) -> Self {
        Self::with_kind(
            path.as_ref().display().to_string(),
            TaskKind::File { inputs: Vec::new() },
        )
    }

    /// A directory task named after the directory path.
    pub fn directory(path: impl AsRef<Path>) -> Self {
        Self::with_kind(path.as_ref().display().to_string(), TaskKind::Directory)
    }

    fn with_kind(name: String, kind: TaskKind) -> Self {
        Self {
            name,
            description: None,
            prerequisites: Vec::new(),
            kind,
            actions: Vec::new(),
        }
    }

    /// Set the description shown in task listings.
    pub fn describe(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Add prerequisites, run in the given order before this task.
    pub fn depends_on<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.prerequisites.extend(names.into_iter().map(Into::into));
        self
    }

    /// Add a lazily resolved set of source files to a file task.
    ///
    /// Ignored for other task kinds.
    pub fn with_inputs(mut self, inputs: FileList) -> Self {
        if let TaskKind::File { inputs: list } = &mut self.kind {
            list.push(inputs);
        }
        self
    }

    /// Append an action.
    pub fn action<F>(mut self, action: F) -> Self
    where
        F: Fn(&TaskContext<'_>) -> Result<(), ActionError> + 'static,
    {
        self.actions.push(Box::new(action));
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    pub fn prerequisites(&self) -> &[String] {
        &self.prerequisites
    }

    pub fn kind(&self) -> &TaskKind {
        &self.kind
    }

    pub(crate) fn actions(&self) -> &[Action] {
        &self.actions
    }

    /// Fold a redefinition of the same name into this task.
    pub(crate) fn enhance(&mut self, other: Task) {
        if self.description.is_none() {
            self.description = other.description;
        }
        for prerequisite in other.prerequisites {
            if !self.prerequisites.contains(&prerequisite) {
                self.prerequisites.push(prerequisite);
            }
        }
        if let (TaskKind::File { inputs }, TaskKind::File { inputs: more }) =
            (&mut self.kind, other.kind)
        {
            inputs.extend(more);
        }
        self.actions.extend(other.actions);
    }
}

impl fmt::Debug for Task {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Task")
            .field("name", &self.name)
            .field("description", &self.description)
            .field("prerequisites", &self.prerequisites)
            .field("kind", &self.kind)
            .field("actions", &self.actions.len())
            .finish()
    }
}
