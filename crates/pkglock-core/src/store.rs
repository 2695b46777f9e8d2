//! Locating, reading, and writing a project's lock file.

use crate::fs::{FileSystem, HostFileSystem};
use crate::CoreError;
use pkglock_schema::{format, LockFile, Logger, ParsedLockFile, ProjectSpec, LOCK_FILE_NAME};
use std::path::{Path, PathBuf};

/// Per-project lock file name: `packages.<project name>.lock.json`, with
/// spaces replaced by underscores.
pub fn project_lock_file_name(project_name: &str) -> String {
    format!("packages.{}.lock.json", project_name.replace(' ', "_"))
}

#[derive(Debug, Clone, Default)]
pub struct LockFileStore<F: FileSystem = HostFileSystem> {
    fs: F,
}

impl LockFileStore<HostFileSystem> {
    pub fn host() -> Self {
        Self { fs: HostFileSystem }
    }
}

impl<F: FileSystem> LockFileStore<F> {
    pub fn new(fs: F) -> Self {
        Self { fs }
    }

    /// Read and parse a lock file. A missing or unreadable file is an error;
    /// malformed content is not and comes back as
    /// [`ParsedLockFile::Corrupt`].
    pub fn read(&self, path: &Path, logger: &dyn Logger) -> Result<ParsedLockFile, CoreError> {
        let content = self.fs.read(path).map_err(|source| CoreError::LockFileIo {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(format::parse(&content, &path.to_string_lossy(), logger))
    }

    /// Render `lock` and write it to `path`, creating the parent directory.
    pub fn write(&self, path: &Path, lock: &LockFile) -> Result<(), CoreError> {
        let rendered = format::render(lock)?;
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            self.fs
                .create_dir_all(parent)
                .map_err(|source| CoreError::LockFileIo {
                    path: parent.to_path_buf(),
                    source,
                })?;
        }
        self.fs
            .write(path, rendered.as_bytes())
            .map_err(|source| CoreError::LockFileIo {
                path: path.to_path_buf(),
                source,
            })?;
        tracing::debug!("wrote {} ({} targets)", path.display(), lock.targets().len());
        Ok(())
    }

    /// Where `project` keeps its lock file. `None` without a base directory.
    ///
    /// An explicit lock file path wins (relative paths are taken from the
    /// base directory). Otherwise a per-project file is used when it exists,
    /// else `packages.lock.json`.
    pub fn lock_file_path(&self, project: &ProjectSpec) -> Option<PathBuf> {
        let base = project.base_directory()?;
        if let Some(explicit) = project
            .lock_file_path()
            .filter(|p| !p.as_os_str().is_empty())
        {
            return Some(base.join(explicit));
        }
        let per_project = base.join(project_lock_file_name(project.name()));
        if self.fs.exists(&per_project) {
            return Some(per_project);
        }
        Some(base.join(LOCK_FILE_NAME))
    }

    /// Lock file mode is on when the project opts in or a lock file exists.
    pub fn is_lock_file_supported(&self, project: &ProjectSpec) -> bool {
        project.restores_with_lock_file()
            || self
                .lock_file_path(project)
                .is_some_and(|path| self.fs.exists(&path))
    }
}
