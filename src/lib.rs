//! splot - recipe resolver and build driver for the serial-plotter project
//!
//! This crate provides the library side of the `splot` tool: resolving the
//! platform-conditional dependency configuration, generating toolchain files,
//! importing dependency bindings, and sequencing the CI build steps.

pub mod core;
pub mod ops;
pub mod resolver;
pub mod sources;
pub mod util;

/// Test utilities and mocks for splot unit tests.
///
/// Only compiled for tests. Provides a mock process executor and package
/// store helpers.
#[cfg(test)]
pub mod test_support;

pub use core::{dependency::DependencyRef, platform::Settings, recipe::Recipe};

pub use resolver::{resolve, Configuration};
pub use util::context::GlobalContext;
