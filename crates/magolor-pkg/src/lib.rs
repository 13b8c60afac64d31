//! Magolor package tooling: `project.toml` manifests, dependency
//! versionspecs, the generated `.magolor/lock.toml` lockfile, and project
//! scaffolding.
//!
//! Dependency *fetching* is out of scope here -- sources are classified
//! and recorded, never cloned. The driver decides what to do with git and
//! path sources.

pub mod lockfile;
pub mod manifest;
pub mod scaffold;
pub mod version;

pub use lockfile::{LockedPackage, Lockfile, RootPackage, LOCKFILE_PATH};
pub use manifest::{BuildConfig, Manifest, Project};
pub use scaffold::scaffold_project;
pub use version::SourceSpec;
