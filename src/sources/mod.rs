//! Package sources.
//!
//! Installed dependencies are located through the [`PackageStore`].

pub mod store;

pub use store::{InstalledPackage, PackageStore, StoreError};
