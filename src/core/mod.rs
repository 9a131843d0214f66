//! Core data types: settings, dependency pins, options and the recipe.

pub mod dependency;
pub mod layout;
pub mod options;
pub mod platform;
pub mod recipe;

pub use dependency::DependencyRef;
pub use layout::Layout;
pub use options::{OptionKey, OptionSet, OptionValue};
pub use platform::{Arch, BuildType, Os, Settings};
pub use recipe::Recipe;
