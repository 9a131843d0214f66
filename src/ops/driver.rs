//! The CI build driver.
//!
//! Runs install, build and package as external processes inside `_build`,
//! stopping at the first step that fails.

use std::fmt;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use thiserror::Error;

use crate::core::platform::DEFAULT_CPPSTD;
use crate::util::config::CiConfig;
use crate::util::fs::ensure_dir;
use crate::util::process::{Executor, ProcessBuilder};
use crate::util::shell::{Shell, Status};

/// Working directory of the driver, relative to the invocation directory.
pub const WORK_DIR: &str = "_build";

/// One driver step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Stage {
    Install,
    Build,
    Package,
}

impl Stage {
    pub const ALL: [Stage; 3] = [Stage::Install, Stage::Build, Stage::Package];

    pub fn as_str(&self) -> &'static str {
        match self {
            Stage::Install => "install",
            Stage::Build => "build",
            Stage::Package => "package",
        }
    }

    fn status(&self) -> Status {
        match self {
            Stage::Install => Status::Installing,
            Stage::Build => Status::Building,
            Stage::Package => Status::Packaging,
        }
    }

    /// The command line used when the config does not override it.
    pub fn default_command(&self) -> Vec<String> {
        match self {
            Stage::Install => vec![
                "conan".into(),
                "install".into(),
                "..".into(),
                "-b".into(),
                "missing".into(),
                "-s".into(),
                format!("compiler.cppstd={}", DEFAULT_CPPSTD),
            ],
            Stage::Build => vec!["conan".into(), "build".into(), "..".into()],
            Stage::Package => vec!["cpack".into(), "-G".into(), "ZIP".into()],
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Driver progress.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DriverState {
    NotStarted,
    Installing,
    Building,
    Packaging,
    Done,
    /// Terminal. `code` is the exit code to mirror.
    Failed { stage: Stage, code: i32 },
}

impl DriverState {
    fn running(stage: Stage) -> Self {
        match stage {
            Stage::Install => DriverState::Installing,
            Stage::Build => DriverState::Building,
            Stage::Package => DriverState::Packaging,
        }
    }

    /// The stage currently running, if any.
    pub fn stage(&self) -> Option<Stage> {
        match self {
            DriverState::Installing => Some(Stage::Install),
            DriverState::Building => Some(Stage::Build),
            DriverState::Packaging => Some(Stage::Package),
            _ => None,
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, DriverState::Done | DriverState::Failed { .. })
    }

    /// Enter `stage`. Stages only run in order, each after the previous completed.
    pub fn start(self, stage: Stage) -> Result<Self, DriverError> {
        if self == DriverState::NotStarted && stage == Stage::Install {
            Ok(DriverState::running(stage))
        } else {
            Err(self.illegal(DriverState::running(stage)))
        }
    }

    /// The running stage succeeded; move to the next one or to `Done`.
    pub fn complete(self) -> Result<Self, DriverError> {
        match self {
            DriverState::Installing => Ok(DriverState::Building),
            DriverState::Building => Ok(DriverState::Packaging),
            DriverState::Packaging => Ok(DriverState::Done),
            other => Err(other.illegal(DriverState::Done)),
        }
    }

    /// The running stage failed with `code`.
    pub fn fail(self, code: i32) -> Result<Self, DriverError> {
        match self.stage() {
            Some(stage) => Ok(DriverState::Failed { stage, code }),
            None => Err(self.illegal(DriverState::Failed {
                stage: Stage::Install,
                code,
            })),
        }
    }

    fn illegal(self, to: DriverState) -> DriverError {
        DriverError::IllegalTransition {
            from: self.to_string(),
            to: to.to_string(),
        }
    }
}

impl fmt::Display for DriverState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DriverState::NotStarted => f.write_str("not started"),
            DriverState::Installing => f.write_str("installing"),
            DriverState::Building => f.write_str("building"),
            DriverState::Packaging => f.write_str("packaging"),
            DriverState::Done => f.write_str("done"),
            DriverState::Failed { stage, .. } => write!(f, "failed ({})", stage),
        }
    }
}

#[derive(Debug, Error)]
pub enum DriverError {
    #[error("{stage} step failed: `{command}` exited with code {code}")]
    StepFailed {
        stage: Stage,
        command: String,
        code: i32,
    },

    #[error("{stage} step failed: `{command}` was terminated by a signal")]
    Signaled { stage: Stage, command: String },

    #[error("{stage} step failed: could not run `{command}`: {message}")]
    Spawn {
        stage: Stage,
        command: String,
        message: String,
    },

    #[error("illegal driver transition from {from} to {to}")]
    IllegalTransition { from: String, to: String },
}

impl DriverError {
    /// Exit code the process should terminate with.
    pub fn exit_code(&self) -> i32 {
        match self {
            DriverError::StepFailed { code, .. } => *code,
            _ => 1,
        }
    }
}

/// The resolved step list of one driver run.
#[derive(Debug, Clone)]
pub struct CiPlan {
    pub work_dir: PathBuf,
    pub steps: Vec<(Stage, ProcessBuilder)>,
}

impl CiPlan {
    /// Plan a run from `cwd`, taking step commands from `config` where set.
    pub fn from_config(cwd: &Path, config: &CiConfig) -> Result<Self> {
        let work_dir = match &config.dir {
            Some(dir) => cwd.join(dir),
            None => cwd.join(WORK_DIR),
        };

        let mut steps = Vec::with_capacity(Stage::ALL.len());
        for stage in Stage::ALL {
            let configured = match stage {
                Stage::Install => config.install.as_ref(),
                Stage::Build => config.build.as_ref(),
                Stage::Package => config.package.as_ref(),
            };
            let argv = configured.cloned().unwrap_or_else(|| stage.default_command());
            let cmd = ProcessBuilder::from_argv(&argv)
                .with_context(|| format!("invalid `ci.{}` command", stage))?
                .cwd(&work_dir);
            steps.push((stage, cmd));
        }

        Ok(CiPlan { work_dir, steps })
    }
}

/// Outcome of a successful driver run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CiReport {
    /// `false` when the working directory already existed.
    pub created_dir: bool,
    pub completed: Vec<Stage>,
    pub state: DriverState,
}

/// Execute `plan`.
///
/// On failure the returned error wraps a [`DriverError`] carrying the exit
/// code of the failing step; later steps are never started.
pub fn run_ci(plan: &CiPlan, executor: &dyn Executor, shell: &Shell) -> Result<CiReport> {
    let created_dir = ensure_dir(&plan.work_dir)?;
    if created_dir {
        shell.status(Status::Created, plan.work_dir.display());
    } else {
        tracing::debug!("{} already exists", plan.work_dir.display());
    }

    let mut state = DriverState::NotStarted.start(Stage::Install)?;
    let mut completed = Vec::new();

    for (stage, cmd) in &plan.steps {
        if state.stage() != Some(*stage) {
            return Err(state.illegal(DriverState::running(*stage)).into());
        }

        shell.status(stage.status(), cmd);
        let command = cmd.display_command();
        let status = match executor.run(cmd) {
            Ok(status) => status,
            Err(e) => {
                let failed = state.fail(1)?;
                tracing::debug!("driver {}", failed);
                return Err(DriverError::Spawn {
                    stage: *stage,
                    command,
                    message: format!("{:#}", e),
                }
                .into());
            }
        };

        match status.code {
            Some(0) => {
                completed.push(*stage);
                state = state.complete()?;
            }
            Some(code) => {
                let failed = state.fail(code)?;
                tracing::debug!("driver {}", failed);
                return Err(DriverError::StepFailed {
                    stage: *stage,
                    command,
                    code,
                }
                .into());
            }
            None => {
                let failed = state.fail(1)?;
                tracing::debug!("driver {}", failed);
                return Err(DriverError::Signaled {
                    stage: *stage,
                    command,
                }
                .into());
            }
        }
    }

    Ok(CiReport {
        created_dir,
        completed,
        state,
    })
}
