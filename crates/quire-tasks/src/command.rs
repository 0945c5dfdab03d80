//! External command invocation.

use std::fmt;
use std::fs::File;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

/// A fully-specified external command line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    /// Program name or path
    pub program: String,

    /// Arguments, passed verbatim (no shell)
    pub args: Vec<String>,

    /// File receiving the command's standard output
    pub stdout: Option<PathBuf>,
}

impl Invocation {
    /// Create an invocation of `program` with no arguments.
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            stdout: None,
        }
    }

    /// Append one argument.
    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    /// Append several arguments.
    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    /// Append a path argument.
    pub fn path_arg(self, path: &Path) -> Self {
        self.arg(path.display().to_string())
    }

    /// Redirect standard output into `path`.
    pub fn stdout_to(mut self, path: impl Into<PathBuf>) -> Self {
        self.stdout = Some(path.into());
        self
    }
}

impl fmt::Display for Invocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.program)?;
        for arg in &self.args {
            if arg.is_empty() || arg.contains(char::is_whitespace) {
                write!(f, " '{}'", arg.replace('\'', "'\\''"))?;
            } else {
                write!(f, " {}", arg)?;
            }
        }
        if let Some(path) = &self.stdout {
            write!(f, " > {}", path.display())?;
        }
        Ok(())
    }
}

/// Errors from running an external command.
#[derive(Debug, thiserror::Error)]
pub enum CommandError {
    #[error("Failed to start {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to open output file {path}: {source}")]
    Output {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Command failed ({status}): {command}\n{stderr}")]
    Failed {
        command: String,
        status: String,
        stderr: String,
    },
}

/// Runs external commands on behalf of task actions.
#[cfg_attr(any(test, feature = "mock"), mockall::automock)]
pub trait CommandRunner {
    /// Run the command to completion; a non-zero exit is an error.
    fn run(&self, invocation: &Invocation) -> Result<(), CommandError>;
}

/// Spawns real processes.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemRunner;

impl CommandRunner for SystemRunner {
    fn run(&self, invocation: &Invocation) -> Result<(), CommandError> {
        let mut command = Command::new(&invocation.program);
        command.args(&invocation.args).stderr(Stdio::piped());

        match &invocation.stdout {
            Some(path) => {
                let file = File::create(path).map_err(|source| CommandError::Output {
                    path: path.display().to_string(),
                    source,
                })?;
                command.stdout(Stdio::from(file));
            }
            None => {
                command.stdout(Stdio::inherit());
            }
        }

        let child = command.spawn().map_err(|source| CommandError::Spawn {
            program: invocation.program.clone(),
            source,
        })?;

        let output = child
            .wait_with_output()
            .map_err(|source| CommandError::Spawn {
                program: invocation.program.clone(),
                source,
            })?;

        if !output.status.success() {
            return Err(CommandError::Failed {
                command: invocation.to_string(),
                status: output.status.to_string(),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        Ok(())
    }
}
