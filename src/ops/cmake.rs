//! Recipe build and package steps, driven through CMake.
//!
//! `build` configures the project against the generated toolchain file and
//! compiles it; `package` installs the build tree.

use std::path::PathBuf;

use anyhow::{bail, Result};

use crate::core::layout::Layout;
use crate::core::platform::BuildType;
use crate::ops::generate::TOOLCHAIN_FILE;
use crate::util::diagnostic::suggestions;
use crate::util::process::{find_cmake, run_checked, Executor, ProcessBuilder};

/// CMake invocations for one build folder.
pub struct CMakeSteps<'a> {
    cmake: PathBuf,
    layout: &'a Layout,
    build_type: BuildType,
    executor: &'a dyn Executor,
}

impl<'a> CMakeSteps<'a> {
    /// Locate `cmake` on PATH.
    pub fn locate(
        layout: &'a Layout,
        build_type: BuildType,
        executor: &'a dyn Executor,
    ) -> Result<Self> {
        let Some(cmake) = find_cmake() else {
            bail!(
                "CMake not found\n\
                 \n\
                 CMake is required to build the project.\n\
                 {}",
                suggestions::TOOL_NOT_FOUND
            );
        };
        Ok(Self::with_program(cmake, layout, build_type, executor))
    }

    pub fn with_program(
        cmake: impl Into<PathBuf>,
        layout: &'a Layout,
        build_type: BuildType,
        executor: &'a dyn Executor,
    ) -> Self {
        CMakeSteps {
            cmake: cmake.into(),
            layout,
            build_type,
            executor,
        }
    }

    /// `cmake -S <source> -B <build> ...`
    pub fn configure_command(&self) -> ProcessBuilder {
        let toolchain = self.layout.generators_dir.join(TOOLCHAIN_FILE);
        ProcessBuilder::new(&self.cmake)
            .arg("-S")
            .arg(&self.layout.source_dir)
            .arg("-B")
            .arg(&self.layout.build_dir)
            .arg(format!("-DCMAKE_BUILD_TYPE={}", self.build_type))
            .arg(format!("-DSPLOT_TOOLCHAIN={}", toolchain.display()))
            .arg(format!(
                "-DSPLOT_BINDINGS_DIR={}",
                self.layout.bindings_dir.display()
            ))
    }

    /// `cmake --build <build> --config <type> --parallel`
    pub fn build_command(&self) -> ProcessBuilder {
        ProcessBuilder::new(&self.cmake)
            .arg("--build")
            .arg(&self.layout.build_dir)
            .args(["--config", self.build_type.as_str(), "--parallel"])
    }

    /// `cmake --install <build> --config <type>`
    pub fn install_command(&self) -> ProcessBuilder {
        ProcessBuilder::new(&self.cmake)
            .arg("--install")
            .arg(&self.layout.build_dir)
            .args(["--config", self.build_type.as_str()])
    }

    /// Configure and build.
    pub fn build(&self) -> Result<()> {
        let toolchain = self.layout.generators_dir.join(TOOLCHAIN_FILE);
        if !toolchain.is_file() {
            bail!(
                "{} not found\nhelp: Run `splot generate` first",
                toolchain.display()
            );
        }

        tracing::info!("configuring {}", self.layout.build_dir.display());
        run_checked(self.executor, &self.configure_command())?;

        tracing::info!("building {}", self.layout.build_dir.display());
        run_checked(self.executor, &self.build_command())
    }

    /// Install the build tree.
    pub fn package(&self) -> Result<()> {
        tracing::info!("installing {}", self.layout.build_dir.display());
        run_checked(self.executor, &self.install_command())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::recipe::BindingsSpec;
    use crate::test_support::MockExecutor;
    use crate::util::process::{ProcessError, RunStatus};
    use std::path::Path;
    use tempfile::TempDir;

    fn layout(root: &Path) -> Layout {
        Layout::new(root, BuildType::Release, &BindingsSpec::default())
    }

    #[test]
    fn test_commands() {
        let layout = layout(Path::new("/proj"));
        let mock = MockExecutor::succeeding();
        let steps = CMakeSteps::with_program("cmake", &layout, BuildType::Release, &mock);

        assert_eq!(
            steps.build_command().display_command(),
            "cmake --build /proj/build/Release --config Release --parallel"
        );
        assert_eq!(
            steps.install_command().display_command(),
            "cmake --install /proj/build/Release --config Release"
        );
        let configure = steps.configure_command().display_command();
        assert!(configure.starts_with("cmake -S /proj -B /proj/build/Release"));
        assert!(configure.contains("-DCMAKE_BUILD_TYPE=Release"));
        assert!(configure.contains("splot-toolchain.json"));
    }

    #[test]
    fn test_build_requires_generated_toolchain() {
        let tmp = TempDir::new().unwrap();
        let layout = layout(tmp.path());
        let mock = MockExecutor::succeeding();
        let steps = CMakeSteps::with_program("cmake", &layout, BuildType::Release, &mock);

        let err = steps.build().unwrap_err();
        assert!(err.to_string().contains("splot generate"));
        assert!(mock.commands().is_empty());
    }

    #[test]
    fn test_failed_configure_skips_build() {
        let tmp = TempDir::new().unwrap();
        let layout = layout(tmp.path());
        std::fs::create_dir_all(&layout.generators_dir).unwrap();
        std::fs::write(layout.generators_dir.join(TOOLCHAIN_FILE), "{}").unwrap();

        let mock = MockExecutor::new();
        mock.expect_prefix("cmake -S", RunStatus::exited(1))
            .set_default(RunStatus::success());
        let steps = CMakeSteps::with_program("cmake", &layout, BuildType::Release, &mock);

        let err = steps.build().unwrap_err();
        assert_eq!(err.downcast_ref::<ProcessError>().map(|e| e.exit_code()), Some(1));
        assert_eq!(mock.commands().len(), 1);
    }

    #[test]
    fn test_package_runs_install() {
        let layout = layout(Path::new("/proj"));
        let mock = MockExecutor::succeeding();
        CMakeSteps::with_program("cmake", &layout, BuildType::Release, &mock)
            .package()
            .unwrap();
        assert_eq!(mock.commands(), vec!["cmake --install /proj/build/Release --config Release"]);
    }
}
