//! Immutable in-memory model of a package lock file.
//!
//! Values are built once from complete sequences and never mutated
//! afterwards. Equality and hashing live in [`crate::identity`].

use crate::framework::TargetFramework;
use crate::range::VersionRange;
use crate::types::{PackageId, RuntimeId};
use crate::version::PackageVersion;
use std::fmt;

/// Current on-disk format version.
pub const LOCK_FILE_FORMAT_VERSION: u32 = 1;

/// Default lock file name in a project's base directory.
pub const LOCK_FILE_NAME: &str = "packages.lock.json";

/// Why a dependency appears in a target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum InstallationType {
    /// Declared by the owning project for this framework.
    Direct,
    /// Pulled in only through resolution.
    Transitive,
    /// A project-to-project reference.
    Project,
}

impl InstallationType {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Direct => "Direct",
            Self::Transitive => "Transitive",
            Self::Project => "Project",
        }
    }

    /// Case-insensitive match on the variant name.
    pub fn from_name(name: &str) -> Option<Self> {
        [Self::Direct, Self::Transitive, Self::Project]
            .into_iter()
            .find(|t| t.as_str().eq_ignore_ascii_case(name.trim()))
    }
}

impl fmt::Display for InstallationType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A child edge of a locked dependency: `id` with its requested range.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PackageDependency {
    id: PackageId,
    range: VersionRange,
}

impl PackageDependency {
    pub fn new(id: impl Into<PackageId>, range: VersionRange) -> Self {
        Self {
            id: id.into(),
            range,
        }
    }

    pub fn id(&self) -> &PackageId {
        &self.id
    }

    pub fn range(&self) -> &VersionRange {
        &self.range
    }
}

/// One resolved entry of a target.
#[derive(Debug, Clone)]
pub struct LockFileDependency {
    pub(crate) id: PackageId,
    pub(crate) installation_type: InstallationType,
    pub(crate) requested: Option<VersionRange>,
    pub(crate) resolved: Option<PackageVersion>,
    pub(crate) content_hash: Option<String>,
    pub(crate) dependencies: Vec<PackageDependency>,
}

impl LockFileDependency {
    pub fn new(id: impl Into<PackageId>, installation_type: InstallationType) -> Self {
        Self {
            id: id.into(),
            installation_type,
            requested: None,
            resolved: None,
            content_hash: None,
            dependencies: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_requested(mut self, range: VersionRange) -> Self {
        self.requested = Some(range);
        self
    }

    #[must_use]
    pub fn with_resolved(mut self, version: PackageVersion) -> Self {
        self.resolved = Some(version);
        self
    }

    #[must_use]
    pub fn with_content_hash(mut self, hash: impl Into<String>) -> Self {
        self.content_hash = Some(hash.into());
        self
    }

    #[must_use]
    pub fn with_dependencies(mut self, dependencies: Vec<PackageDependency>) -> Self {
        self.dependencies = dependencies;
        self
    }

    pub fn id(&self) -> &PackageId {
        &self.id
    }

    pub fn installation_type(&self) -> InstallationType {
        self.installation_type
    }

    pub fn requested(&self) -> Option<&VersionRange> {
        self.requested.as_ref()
    }

    pub fn resolved(&self) -> Option<&PackageVersion> {
        self.resolved.as_ref()
    }

    pub fn content_hash(&self) -> Option<&str> {
        self.content_hash.as_deref()
    }

    pub fn dependencies(&self) -> &[PackageDependency] {
        &self.dependencies
    }
}

/// Resolved dependencies for one (framework, runtime identifier) pair.
#[derive(Debug, Clone)]
pub struct LockFileTarget {
    pub(crate) target_framework: TargetFramework,
    pub(crate) runtime_identifier: Option<RuntimeId>,
    pub(crate) dependencies: Vec<LockFileDependency>,
}

impl LockFileTarget {
    pub fn new(
        target_framework: TargetFramework,
        runtime_identifier: Option<RuntimeId>,
        dependencies: Vec<LockFileDependency>,
    ) -> Self {
        Self {
            target_framework,
            runtime_identifier,
            dependencies,
        }
    }

    pub fn target_framework(&self) -> &TargetFramework {
        &self.target_framework
    }

    pub fn runtime_identifier(&self) -> Option<&RuntimeId> {
        self.runtime_identifier.as_ref()
    }

    pub fn dependencies(&self) -> &[LockFileDependency] {
        &self.dependencies
    }

    /// The on-disk key: `framework` or `framework/rid`.
    pub fn name(&self) -> String {
        match &self.runtime_identifier {
            Some(rid) => format!("{}/{rid}", self.target_framework),
            None => self.target_framework.to_string(),
        }
    }
}

/// A complete lock file. `source_path` records where it was read from and is
/// not part of equality. `version` is `None` when the file carried no usable
/// format version.
#[derive(Debug, Clone)]
pub struct LockFile {
    pub(crate) version: Option<u32>,
    pub(crate) source_path: Option<String>,
    pub(crate) targets: Vec<LockFileTarget>,
}

impl LockFile {
    pub fn new(version: u32, targets: Vec<LockFileTarget>) -> Self {
        Self {
            version: Some(version),
            source_path: None,
            targets,
        }
    }

    pub fn unversioned(targets: Vec<LockFileTarget>) -> Self {
        Self {
            version: None,
            source_path: None,
            targets,
        }
    }

    #[must_use]
    pub fn with_source_path(mut self, path: impl Into<String>) -> Self {
        self.source_path = Some(path.into());
        self
    }

    pub fn version(&self) -> Option<u32> {
        self.version
    }

    pub fn source_path(&self) -> Option<&str> {
        self.source_path.as_deref()
    }

    pub fn targets(&self) -> &[LockFileTarget] {
        &self.targets
    }

    /// First target for `framework`, ignoring runtime identifiers.
    pub fn target_for(&self, framework: &TargetFramework) -> Option<&LockFileTarget> {
        self.targets
            .iter()
            .find(|t| &t.target_framework == framework)
    }

    /// Total number of dependency entries across all targets.
    pub fn dependency_count(&self) -> usize {
        self.targets.iter().map(|t| t.dependencies.len()).sum()
    }
}
