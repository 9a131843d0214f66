//! Subprocess execution utilities.

use std::ffi::OsStr;
use std::fmt;
use std::path::{Path, PathBuf};
use std::process::Command;

use anyhow::{bail, Context, Result};
use thiserror::Error;

/// Builder for subprocess execution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessBuilder {
    program: PathBuf,
    args: Vec<String>,
    cwd: Option<PathBuf>,
}

impl ProcessBuilder {
    /// Create a new process builder for the given program.
    pub fn new(program: impl AsRef<Path>) -> Self {
        ProcessBuilder {
            program: program.as_ref().to_path_buf(),
            args: Vec::new(),
            cwd: None,
        }
    }

    /// Build from a command line given as a program followed by arguments.
    pub fn from_argv<S: AsRef<str>>(argv: &[S]) -> Result<Self> {
        let (program, args) = match argv.split_first() {
            Some(split) => split,
            None => bail!("command line cannot be empty"),
        };
        Ok(ProcessBuilder::new(program.as_ref()).args(args.iter().map(|a| a.as_ref())))
    }

    /// Add a single argument.
    pub fn arg(mut self, arg: impl AsRef<OsStr>) -> Self {
        self.args.push(arg.as_ref().to_string_lossy().into_owned());
        self
    }

    /// Add multiple arguments.
    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<OsStr>,
    {
        self.args.extend(
            args.into_iter()
                .map(|s| s.as_ref().to_string_lossy().into_owned()),
        );
        self
    }

    /// Set the working directory.
    pub fn cwd(mut self, cwd: impl AsRef<Path>) -> Self {
        self.cwd = Some(cwd.as_ref().to_path_buf());
        self
    }

    pub fn get_program(&self) -> &Path {
        &self.program
    }

    pub fn get_args(&self) -> &[String] {
        &self.args
    }

    pub fn get_cwd(&self) -> Option<&Path> {
        self.cwd.as_deref()
    }

    fn build_command(&self) -> Command {
        let mut cmd = Command::new(&self.program);
        cmd.args(&self.args);

        if let Some(ref cwd) = self.cwd {
            cmd.current_dir(cwd);
        }

        cmd
    }

    /// Execute with inherited stdio and wait for completion.
    pub fn status(&self) -> Result<RunStatus> {
        let mut cmd = self.build_command();
        let status = cmd
            .status()
            .with_context(|| format!("failed to execute `{}`", self.display_command()))?;
        Ok(RunStatus {
            code: status.code(),
        })
    }

    /// Display the command for error messages.
    pub fn display_command(&self) -> String {
        let mut parts = vec![self.program.display().to_string()];
        parts.extend(self.args.iter().cloned());
        parts.join(" ")
    }
}

impl fmt::Display for ProcessBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.display_command())
    }
}

/// Exit status of a finished process.
///
/// `code` is `None` when the process was terminated by a signal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunStatus {
    pub code: Option<i32>,
}

impl RunStatus {
    pub fn success() -> Self {
        RunStatus { code: Some(0) }
    }

    pub fn exited(code: i32) -> Self {
        RunStatus { code: Some(code) }
    }

    pub fn is_success(&self) -> bool {
        self.code == Some(0)
    }
}

/// A process that ran but did not succeed.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ProcessError {
    #[error("`{command}` failed with exit code {code}")]
    Exited { command: String, code: i32 },

    #[error("`{command}` was terminated by a signal")]
    Signaled { command: String },
}

impl ProcessError {
    pub fn from_status(cmd: &ProcessBuilder, status: RunStatus) -> Self {
        let command = cmd.display_command();
        match status.code {
            Some(code) => ProcessError::Exited { command, code },
            None => ProcessError::Signaled { command },
        }
    }

    /// Exit code to mirror; signals map to 1.
    pub fn exit_code(&self) -> i32 {
        match self {
            ProcessError::Exited { code, .. } => *code,
            ProcessError::Signaled { .. } => 1,
        }
    }
}

/// Run `cmd` and turn a non-zero exit into a [`ProcessError`].
pub fn run_checked(executor: &dyn Executor, cmd: &ProcessBuilder) -> Result<()> {
    let status = executor.run(cmd)?;
    if !status.is_success() {
        return Err(ProcessError::from_status(cmd, status).into());
    }
    Ok(())
}

/// Runs external processes to completion.
///
/// The driver and the recipe steps go through this trait so tests can
/// replace real processes.
pub trait Executor {
    fn run(&self, cmd: &ProcessBuilder) -> Result<RunStatus>;
}

/// Executor that spawns real processes with inherited stdio.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemExecutor;

impl Executor for SystemExecutor {
    fn run(&self, cmd: &ProcessBuilder) -> Result<RunStatus> {
        tracing::debug!("running `{}`", cmd);
        cmd.status()
    }
}

/// Find an executable in PATH.
pub fn find_executable(name: &str) -> Option<PathBuf> {
    which::which(name).ok()
}

/// Find CMake.
pub fn find_cmake() -> Option<PathBuf> {
    find_executable("cmake")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[cfg(unix)]
    #[test]
    fn test_status_in_cwd() {
        let tmp = tempfile::TempDir::new().unwrap();
        let status = ProcessBuilder::new("sh")
            .args(["-c", "touch here"])
            .cwd(tmp.path())
            .status()
            .unwrap();

        assert!(status.is_success());
        assert!(tmp.path().join("here").is_file());
    }

    #[cfg(unix)]
    #[test]
    fn test_status_reports_exit_code() {
        let status = ProcessBuilder::new("sh").args(["-c", "exit 3"]).status().unwrap();
        assert_eq!(status, RunStatus::exited(3));
        assert!(!status.is_success());
    }

    #[test]
    fn test_display_command() {
        let pb = ProcessBuilder::new("cpack").args(["-G", "ZIP"]);
        assert_eq!(pb.display_command(), "cpack -G ZIP");
        assert_eq!(pb.to_string(), "cpack -G ZIP");
    }

    #[test]
    fn test_from_argv() {
        let pb = ProcessBuilder::from_argv(&["conan", "build", ".."]).unwrap();
        assert_eq!(pb.get_program(), Path::new("conan"));
        assert_eq!(pb.get_args(), ["build", ".."]);
        assert!(ProcessBuilder::from_argv::<&str>(&[]).is_err());
    }

    #[test]
    fn test_process_error_exit_codes() {
        let cmd = ProcessBuilder::new("conan").arg("build");
        let exited = ProcessError::from_status(&cmd, RunStatus::exited(2));
        assert_eq!(exited.exit_code(), 2);
        assert_eq!(exited.to_string(), "`conan build` failed with exit code 2");

        let signaled = ProcessError::from_status(&cmd, RunStatus { code: None });
        assert_eq!(signaled.exit_code(), 1);
    }

    #[test]
    fn test_spawn_failure_is_error() {
        let err = ProcessBuilder::new("definitely-not-a-real-program-splot")
            .status()
            .unwrap_err();
        assert!(err.to_string().contains("failed to execute"));
    }
}
