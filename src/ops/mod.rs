//! High-level operations.
//!
//! This module contains the implementation of splot commands.

pub mod bindings;
pub mod cmake;
pub mod driver;
pub mod generate;

pub use bindings::{import_bindings, BindingsReport};
pub use cmake::CMakeSteps;
pub use driver::{run_ci, CiPlan, CiReport, DriverError, DriverState, Stage};
pub use generate::{generate, GenerateResult, Toolchain};
