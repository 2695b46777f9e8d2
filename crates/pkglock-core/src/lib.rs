//! Lock file validation and lock file I/O for pkglock.
//!
//! This crate ties the schema layer to the outside world: it decides whether
//! a persisted lock file still matches a dependency graph snapshot
//! (`LockValidator`), locates, reads and atomically writes lock files
//! (`LockFileStore`), loads settings, and reports outdated packages against a
//! version source.

pub mod comparer;
pub mod config;
pub mod fs;
pub mod outdated;
pub mod snapshot;
pub mod store;
pub mod validate;

pub use comparer::{IdComparer, PathComparison};
pub use config::{OutdatedSettings, Settings, LOCAL_CONFIG_FILE};
pub use fs::{FileSystem, HostFileSystem};
pub use outdated::{
    find_outdated, AvailableVersion, OutdatedOptions, OutdatedPackage, OutdatedReport,
    VersionIndexFile, VersionSource,
};
pub use snapshot::{JsonSnapshotFile, SnapshotProvider};
pub use store::{project_lock_file_name, LockFileStore};
pub use validate::{LockValidation, LockValidator, StaleReason};

use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CoreError {
    #[error("dependency graph error: {0}")]
    Snapshot(#[from] pkglock_schema::SnapshotError),
    #[error("lock file I/O error at '{}': {source}", path.display())]
    LockFileIo {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to render lock file: {0}")]
    Render(#[from] pkglock_schema::RenderError),
    #[error("configuration error: {0}")]
    Config(String),
    #[error("project not found in dependency graph: {0}")]
    ProjectNotFound(String),
    #[error("dependency graph has no project to restore")]
    NoRestoreProject,
    #[error("version source error: {0}")]
    VersionSource(String),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
