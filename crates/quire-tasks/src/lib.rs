//! Declarative task graph for documentation and release automation.
//!
//! Tasks are named (namespaces joined by `:`), carry prerequisites and
//! actions, and are invoked at most once per session. File tasks only run
//! when their target is stale. All external tools go through the
//! [`CommandRunner`] seam so task definitions can be tested without
//! spawning processes.

pub mod command;
pub mod context;
pub mod filelist;
pub mod graph;
pub mod package;
pub mod task;

pub use command::{CommandError, CommandRunner, Invocation, SystemRunner};
#[cfg(any(test, feature = "mock"))]
pub use command::MockCommandRunner;
pub use context::{Environment, TaskContext};
pub use filelist::FileList;
pub use graph::{InvokeReport, TaskError, TaskGraph};
pub use package::{LanguageSet, Package};
pub use task::{Action, ActionError, Task, TaskKind};
