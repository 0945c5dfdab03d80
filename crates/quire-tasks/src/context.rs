//! Execution context handed to task actions.

use std::collections::HashMap;

use crate::command::{CommandError, CommandRunner, Invocation};

/// Environment values visible to tasks.
///
/// Built from the process environment, with `KEY=VALUE` command-line
/// assignments layered on top.
#[derive(Debug, Clone, Default)]
pub struct Environment {
    vars: HashMap<String, String>,
}

impl Environment {
    /// Create an empty environment.
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot the current process environment.
    ///
    /// Variables whose name or value is not valid UTF-8 are skipped.
    pub fn from_process() -> Self {
        std::env::vars_os()
            .filter_map(|(key, value)| Some((key.into_string().ok()?, value.into_string().ok()?)))
            .collect()
    }

    /// Set a value, replacing any previous one.
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.vars.insert(key.into(), value.into());
    }

    /// Builder form of [`Environment::set`].
    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.set(key, value);
        self
    }

    /// Look up a value.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.vars.get(key).map(String::as_str)
    }

    /// Parse a `KEY=VALUE` command-line assignment.
    ///
    /// Returns `None` for anything that is not an assignment (task names
    /// such as `reference:publish` never contain `=`).
    pub fn parse_assignment(arg: &str) -> Option<(String, String)> {
        let (key, value) = arg.split_once('=')?;
        let mut chars = key.chars();
        let first = chars.next()?;
        if !(first.is_ascii_alphabetic() || first == '_') {
            return None;
        }
        if !chars.all(|c| c.is_ascii_alphanumeric() || c == '_') {
            return None;
        }
        Some((key.to_string(), value.to_string()))
    }
}

impl FromIterator<(String, String)> for Environment {
    fn from_iter<I: IntoIterator<Item = (String, String)>>(iter: I) -> Self {
        Self {
            vars: iter.into_iter().collect(),
        }
    }
}

impl Extend<(String, String)> for Environment {
    fn extend<I: IntoIterator<Item = (String, String)>>(&mut self, iter: I) {
        self.vars.extend(iter);
    }
}

/// What an action can see and do while running.
pub struct TaskContext<'a> {
    env: &'a Environment,
    runner: &'a dyn CommandRunner,
    dry_run: bool,
}

impl<'a> TaskContext<'a> {
    /// Create a context over an environment and a command runner.
    pub fn new(env: &'a Environment, runner: &'a dyn CommandRunner) -> Self {
        Self {
            env,
            runner,
            dry_run: false,
        }
    }

    /// Only log external commands instead of running them.
    pub fn with_dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    pub fn env(&self) -> &Environment {
        self.env
    }

    pub fn is_dry_run(&self) -> bool {
        self.dry_run
    }

    /// Run an external command through the configured runner.
    pub fn run(&self, invocation: &Invocation) -> Result<(), CommandError> {
        if self.dry_run {
            tracing::info!("(dry run) {}", invocation);
            return Ok(());
        }
        tracing::info!("{}", invocation);
        self.runner.run(invocation)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::command::MockCommandRunner;

    #[test]
    fn parses_assignments() {
        assert_eq!(
            Environment::parse_assignment("OLD_VERSION=1.0.0"),
            Some(("OLD_VERSION".to_string(), "1.0.0".to_string()))
        );
        assert_eq!(
            Environment::parse_assignment("EMPTY="),
            Some(("EMPTY".to_string(), String::new()))
        );
        assert_eq!(Environment::parse_assignment("reference:publish"), None);
        assert_eq!(Environment::parse_assignment("=value"), None);
        assert_eq!(Environment::parse_assignment("1X=value"), None);
    }

    #[test]
    fn later_values_win() {
        let mut env = Environment::new().with("VERSION", "1.0.0");
        env.extend([("VERSION".to_string(), "2.0.0".to_string())]);

        assert_eq!(env.get("VERSION"), Some("2.0.0"));
        assert_eq!(env.get("MISSING"), None);
    }

    #[test]
    fn dry_run_skips_runner() {
        let env = Environment::new();
        let mut runner = MockCommandRunner::new();
        runner.expect_run().never();

        let ctx = TaskContext::new(&env, &runner).with_dry_run(true);
        ctx.run(&Invocation::new("rsync")).unwrap();
    }

    #[test]
    fn forwards_to_runner() {
        let env = Environment::new();
        let mut runner = MockCommandRunner::new();
        runner
            .expect_run()
            .withf(|invocation| invocation.program == "rsync")
            .times(1)
            .returning(|_| Ok(()));

        let ctx = TaskContext::new(&env, &runner);
        ctx.run(&Invocation::new("rsync")).unwrap();
    }

    #[cfg(unix)]
    #[test]
    fn process_snapshot_skips_non_utf8_values() {
        use std::ffi::OsStr;
        use std::os::unix::ffi::OsStrExt;

        std::env::set_var("QUIRE_TEST_NON_UTF8", OsStr::from_bytes(b"\xff\xfe"));
        std::env::set_var("QUIRE_TEST_UTF8", "1.0.0");

        let env = Environment::from_process();

        assert_eq!(env.get("QUIRE_TEST_NON_UTF8"), None);
        assert_eq!(env.get("QUIRE_TEST_UTF8"), Some("1.0.0"));
    }
}
