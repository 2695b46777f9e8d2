//! Lock file model, JSON format, and versioning primitives for pkglock.
//!
//! This crate defines the schema layer: package versions and ranges
//! (`PackageVersion`, `VersionRange`), target framework monikers
//! (`TargetFramework`), the immutable lock model (`LockFile`) with its
//! structural identity, the `packages.lock.json` codec (`parse`, `render`),
//! and the dependency graph snapshot a lock file is validated against
//! (`DependencyGraphSpec`).

pub mod dgspec;
pub mod format;
pub mod framework;
pub mod identity;
pub mod lock;
pub mod log;
pub mod range;
pub mod types;
pub mod version;

pub use dgspec::{
    parse_dgspec_file, parse_dgspec_str, DependencyGraphSpec, DependencySection,
    DependencyTarget, DgSpecV1, FrameworkSection, FrameworkSpec, LibraryDependency,
    ProjectSection, ProjectSpec, SnapshotError, DGSPEC_FORMAT_VERSION,
};
pub use format::{parse, parse_str, render, ParsedLockFile, RenderError};
pub use framework::{FrameworkName, FrameworkVersion, TargetFramework};
pub use lock::{
    InstallationType, LockFile, LockFileDependency, LockFileTarget, PackageDependency,
    LOCK_FILE_FORMAT_VERSION, LOCK_FILE_NAME,
};
pub use log::{Logger, NullLogger, TracingLogger};
pub use range::{RangeError, VersionRange};
pub use types::{PackageId, RuntimeId};
pub use version::{PackageVersion, VersionError};
