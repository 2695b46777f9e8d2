//! Lock file staleness check against a dependency graph snapshot.
//!
//! Two tiers are compared: the direct package requests of the project under
//! validation, and for every other project in the snapshot the `Project`
//! entry with its one level of nested children. The first mismatch
//! wins.
//!
//! Targets are looked up by framework only; runtime-specific targets are
//! never consulted.

use crate::comparer::IdComparer;
use crate::CoreError;
use pkglock_schema::{
    DependencyGraphSpec, InstallationType, LockFile, LockFileDependency, LockFileTarget,
    ParsedLockFile, ProjectSpec, LOCK_FILE_FORMAT_VERSION,
};
use serde::Serialize;
use std::fmt;
use tracing::debug;

/// Why a lock file no longer matches the declared dependencies.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum StaleReason {
    Corrupt {
        reason: String,
    },
    UnsupportedVersion {
        found: Option<u32>,
    },
    DirectDependencyMissing {
        framework: String,
        id: String,
    },
    DirectDependencyChanged {
        framework: String,
        id: String,
        declared: String,
        locked: Option<String>,
    },
    ProjectReferenceMissing {
        framework: String,
        project: String,
    },
    ProjectDependencyMissing {
        framework: String,
        project: String,
        id: String,
    },
    ProjectDependencyChanged {
        framework: String,
        project: String,
        id: String,
        declared: String,
        locked: String,
    },
}

impl fmt::Display for StaleReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Corrupt { reason } => write!(f, "lock file is corrupt: {reason}"),
            Self::UnsupportedVersion { found: Some(found) } => write!(
                f,
                "lock file format version {found} is not {LOCK_FILE_FORMAT_VERSION}"
            ),
            Self::UnsupportedVersion { found: None } => {
                write!(f, "lock file has no format version")
            }
            Self::DirectDependencyMissing { framework, id } => {
                write!(f, "{framework}: direct dependency '{id}' is not locked")
            }
            Self::DirectDependencyChanged {
                framework,
                id,
                declared,
                locked,
            } => write!(
                f,
                "{framework}: '{id}' is declared as {declared} but locked as {}",
                locked.as_deref().unwrap_or("<none>")
            ),
            Self::ProjectReferenceMissing { framework, project } => {
                write!(f, "{framework}: project reference '{project}' is not locked")
            }
            Self::ProjectDependencyMissing {
                framework,
                project,
                id,
            } => write!(
                f,
                "{framework}: '{id}' of project '{project}' is not locked"
            ),
            Self::ProjectDependencyChanged {
                framework,
                project,
                id,
                declared,
                locked,
            } => write!(
                f,
                "{framework}: '{id}' of project '{project}' is declared as {declared} but locked as {locked}"
            ),
        }
    }
}

/// Verdict of [`LockValidator::validate`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LockValidation {
    Valid,
    Stale(StaleReason),
}

impl LockValidation {
    pub fn is_valid(&self) -> bool {
        matches!(self, Self::Valid)
    }

    pub fn stale_reason(&self) -> Option<&StaleReason> {
        match self {
            Self::Valid => None,
            Self::Stale(reason) => Some(reason),
        }
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct LockValidator {
    comparer: IdComparer,
}

impl LockValidator {
    pub fn new(comparer: IdComparer) -> Self {
        Self { comparer }
    }

    pub fn comparer(&self) -> IdComparer {
        self.comparer
    }

    /// Validate the lock file of the first project in the snapshot's
    /// restore list.
    pub fn validate(
        &self,
        spec: &DependencyGraphSpec,
        lock: &ParsedLockFile,
    ) -> Result<LockValidation, CoreError> {
        let unique_name = spec.restore_project().ok_or(CoreError::NoRestoreProject)?;
        self.validate_project(spec, unique_name, lock)
    }

    pub fn is_valid(
        &self,
        spec: &DependencyGraphSpec,
        lock: &ParsedLockFile,
    ) -> Result<bool, CoreError> {
        Ok(self.validate(spec, lock)?.is_valid())
    }

    /// Validate `lock` as the lock file of the project named `unique_name`.
    pub fn validate_project(
        &self,
        spec: &DependencyGraphSpec,
        unique_name: &str,
        lock: &ParsedLockFile,
    ) -> Result<LockValidation, CoreError> {
        let project = self
            .find_project(spec, unique_name)
            .ok_or_else(|| CoreError::ProjectNotFound(unique_name.to_owned()))?;

        let verdict = match lock {
            ParsedLockFile::Corrupt { reason, .. } => LockValidation::Stale(StaleReason::Corrupt {
                reason: reason.clone(),
            }),
            ParsedLockFile::Loaded(lock) if lock.version() != Some(LOCK_FILE_FORMAT_VERSION) => {
                LockValidation::Stale(StaleReason::UnsupportedVersion {
                    found: lock.version(),
                })
            }
            ParsedLockFile::Loaded(lock) => self
                .check_direct_dependencies(project, lock)
                .or_else(|| self.check_project_references(spec, project, lock))
                .map_or(LockValidation::Valid, LockValidation::Stale),
        };

        match &verdict {
            LockValidation::Valid => debug!("lock file of {} is up to date", project.name()),
            LockValidation::Stale(reason) => debug!("lock file of {} is stale: {reason}", project.name()),
        }
        Ok(verdict)
    }

    fn find_project<'a>(
        &self,
        spec: &'a DependencyGraphSpec,
        unique_name: &str,
    ) -> Option<&'a ProjectSpec> {
        spec.find_project(unique_name, |a, b| self.comparer.equals(a, b))
    }

    fn check_direct_dependencies(
        &self,
        project: &ProjectSpec,
        lock: &LockFile,
    ) -> Option<StaleReason> {
        for framework in project.frameworks() {
            let Some(target) = lock.target_for(framework.framework()) else {
                debug!("{}: no locked target, skipping", framework.framework());
                continue;
            };

            for declared in framework.package_dependencies() {
                let locked = self.find_entry(target, InstallationType::Direct, declared.name());
                let Some(locked) = locked else {
                    return Some(StaleReason::DirectDependencyMissing {
                        framework: framework.framework().to_string(),
                        id: declared.name().to_string(),
                    });
                };
                if locked.requested() != Some(declared.range()) {
                    return Some(StaleReason::DirectDependencyChanged {
                        framework: framework.framework().to_string(),
                        id: declared.name().to_string(),
                        declared: declared.range().to_string(),
                        locked: locked.requested().map(ToString::to_string),
                    });
                }
            }
        }
        None
    }

    fn check_project_references(
        &self,
        spec: &DependencyGraphSpec,
        project: &ProjectSpec,
        lock: &LockFile,
    ) -> Option<StaleReason> {
        for reference in self.other_projects(spec, project) {
            for framework in reference.frameworks() {
                let Some(target) = lock.target_for(framework.framework()) else {
                    continue;
                };

                let Some(entry) = self.find_entry(target, InstallationType::Project, reference.name())
                else {
                    return Some(StaleReason::ProjectReferenceMissing {
                        framework: framework.framework().to_string(),
                        project: reference.name().to_owned(),
                    });
                };

                for declared in framework.package_dependencies() {
                    let child = entry
                        .dependencies()
                        .iter()
                        .find(|c| self.comparer.equals(c.id(), declared.name()));
                    match child {
                        None => {
                            return Some(StaleReason::ProjectDependencyMissing {
                                framework: framework.framework().to_string(),
                                project: reference.name().to_owned(),
                                id: declared.name().to_string(),
                            })
                        }
                        Some(child) if child.range() != declared.range() => {
                            return Some(StaleReason::ProjectDependencyChanged {
                                framework: framework.framework().to_string(),
                                project: reference.name().to_owned(),
                                id: declared.name().to_string(),
                                declared: declared.range().to_string(),
                                locked: child.range().to_string(),
                            })
                        }
                        Some(_) => {}
                    }
                }
            }
        }
        None
    }

    fn find_entry<'a>(
        &self,
        target: &'a LockFileTarget,
        installation_type: InstallationType,
        id: &str,
    ) -> Option<&'a LockFileDependency> {
        target
            .dependencies()
            .iter()
            .find(|d| d.installation_type() == installation_type && self.comparer.equals(d.id(), id))
    }

    /// Every snapshot project other than `root`, in snapshot order. A
    /// snapshot holds the closure of the restored project's references, so
    /// each of them must appear in the lock file as a `Project` entry.
    fn other_projects<'a>(
        &self,
        spec: &'a DependencyGraphSpec,
        root: &ProjectSpec,
    ) -> Vec<&'a ProjectSpec> {
        spec.projects()
            .iter()
            .filter(|p| !self.comparer.equals(p.unique_name(), root.unique_name()))
            .collect()
    }
}
