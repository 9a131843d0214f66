//! Test utilities and mocks for splot unit tests.
//!
//! Provides a mock [`Executor`] that records every command and answers with
//! scripted exit statuses, plus a helper to lay out a package store.

use std::fs;
use std::path::Path;
use std::sync::Mutex;

use anyhow::{bail, Result};

use crate::core::recipe::Recipe;
use crate::sources::store::PACKAGE_METADATA;
use crate::util::process::{Executor, ProcessBuilder, RunStatus};

/// Pattern for matching commands in [`MockExecutor`].
#[derive(Debug, Clone)]
pub enum CommandPattern {
    /// Exact match on full command string.
    Exact(String),
    /// Match if command starts with prefix.
    StartsWith(String),
    /// Match any command.
    Any,
}

impl CommandPattern {
    pub fn matches(&self, cmd: &str) -> bool {
        match self {
            CommandPattern::Exact(s) => cmd == s,
            CommandPattern::StartsWith(s) => cmd.starts_with(s),
            CommandPattern::Any => true,
        }
    }
}

/// A recorded command invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedCall {
    pub command: String,
    pub cwd: Option<std::path::PathBuf>,
}

#[derive(Debug, Default)]
struct MockState {
    expectations: Vec<(CommandPattern, RunStatus)>,
    calls: Vec<RecordedCall>,
    default_status: Option<RunStatus>,
}

/// Mock process executor.
///
/// Commands match expectations in insertion order; unmatched commands use
/// the default status or fail.
#[derive(Debug, Default)]
pub struct MockExecutor {
    state: Mutex<MockState>,
}

impl MockExecutor {
    pub fn new() -> Self {
        MockExecutor::default()
    }

    /// Executor where every command succeeds.
    pub fn succeeding() -> Self {
        let mock = MockExecutor::new();
        mock.set_default(RunStatus::success());
        mock
    }

    /// Answer commands starting with `prefix` with `status`.
    pub fn expect_prefix(&self, prefix: &str, status: RunStatus) -> &Self {
        self.lock()
            .expectations
            .push((CommandPattern::StartsWith(prefix.to_string()), status));
        self
    }

    /// Answer exactly `cmd` with `status`.
    pub fn expect(&self, cmd: &str, status: RunStatus) -> &Self {
        self.lock()
            .expectations
            .push((CommandPattern::Exact(cmd.to_string()), status));
        self
    }

    pub fn set_default(&self, status: RunStatus) -> &Self {
        self.lock().default_status = Some(status);
        self
    }

    /// Commands run so far, in order.
    pub fn commands(&self) -> Vec<String> {
        self.lock().calls.iter().map(|c| c.command.clone()).collect()
    }

    pub fn calls(&self) -> Vec<RecordedCall> {
        self.lock().calls.clone()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, MockState> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl Executor for MockExecutor {
    fn run(&self, cmd: &ProcessBuilder) -> Result<RunStatus> {
        let command = cmd.display_command();
        let mut state = self.lock();
        state.calls.push(RecordedCall {
            command: command.clone(),
            cwd: cmd.get_cwd().map(Path::to_path_buf),
        });

        if let Some((_, status)) = state
            .expectations
            .iter()
            .find(|(pattern, _)| pattern.matches(&command))
        {
            return Ok(*status);
        }
        if let Some(status) = state.default_status {
            return Ok(status);
        }
        bail!("unexpected command: {}", command)
    }
}

/// Install every dependency of `recipe` into `store` with empty metadata.
pub fn install_all(store: &Path, recipe: &Recipe) {
    for dep in &recipe.requires {
        let dir = store.join(dep.name()).join(dep.version());
        fs::create_dir_all(&dir).unwrap();
        fs::write(dir.join(PACKAGE_METADATA), "").unwrap();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mock_executor_matches_in_order() {
        let mock = MockExecutor::new();
        mock.expect_prefix("conan install", RunStatus::exited(1))
            .set_default(RunStatus::success());

        let install = ProcessBuilder::new("conan").args(["install", ".."]);
        let build = ProcessBuilder::new("conan").args(["build", ".."]).cwd("_build");

        assert_eq!(mock.run(&install).unwrap(), RunStatus::exited(1));
        assert_eq!(mock.run(&build).unwrap(), RunStatus::success());
        assert_eq!(mock.commands(), vec!["conan install ..", "conan build .."]);
        assert_eq!(mock.calls()[1].cwd.as_deref(), Some(Path::new("_build")));
    }

    #[test]
    fn test_unexpected_command_fails() {
        let mock = MockExecutor::new();
        assert!(mock.run(&ProcessBuilder::new("cpack")).is_err());
        assert!(CommandPattern::Any.matches("anything"));
    }
}
