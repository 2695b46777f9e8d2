//! Dependency graph snapshot: the declared state a lock file is checked against.
//!
//! The JSON document lists the projects being restored and, for every
//! project, its frameworks, direct dependencies and project references:
//!
//! ```json
//! {
//!   "format": 1,
//!   "restore": ["/src/App/App.csproj"],
//!   "projects": [{
//!     "unique_name": "/src/App/App.csproj",
//!     "name": "App",
//!     "base_directory": "/src/App",
//!     "restore_with_lock_file": "true",
//!     "project_references": ["/src/Lib/Lib.csproj"],
//!     "frameworks": [{
//!       "framework": "net6.0",
//!       "dependencies": [{ "name": "PackageA", "range": "[1.0.0, )" }]
//!     }]
//!   }]
//! }
//! ```

use crate::framework::TargetFramework;
use crate::range::{RangeError, VersionRange};
use crate::types::PackageId;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

pub const DGSPEC_FORMAT_VERSION: u32 = 1;

#[derive(Debug, Error)]
pub enum SnapshotError {
    #[error("failed to read dependency graph '{}': {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse dependency graph: {0}")]
    Json(#[from] serde_json::Error),
    #[error("dependency graph root is not a JSON object")]
    NotAnObject,
    #[error("unsupported dependency graph format: {0}, expected 1")]
    UnsupportedFormat(u32),
    #[error("project entry #{0} has an empty unique_name or name")]
    EmptyProjectName(usize),
    #[error("invalid range '{range}' for '{dependency}' in '{project}': {source}")]
    InvalidRange {
        project: String,
        dependency: String,
        range: String,
        #[source]
        source: RangeError,
    },
    #[error("unsupported framework '{framework}' in '{project}'")]
    UnsupportedFramework { project: String, framework: String },
}

// Raw document, as written on disk.

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct DgSpecV1 {
    #[serde(default = "default_format")]
    pub format: u32,
    #[serde(default)]
    pub restore: Vec<String>,
    #[serde(default)]
    pub projects: Vec<ProjectSection>,
}

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct ProjectSection {
    pub unique_name: String,
    pub name: String,
    #[serde(default)]
    pub base_directory: Option<PathBuf>,
    #[serde(default)]
    pub lock_file_path: Option<PathBuf>,
    #[serde(default)]
    pub restore_with_lock_file: Option<String>,
    #[serde(default)]
    pub project_references: Vec<String>,
    #[serde(default)]
    pub frameworks: Vec<FrameworkSection>,
}

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct FrameworkSection {
    pub framework: String,
    #[serde(default)]
    pub dependencies: Vec<DependencySection>,
}

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct DependencySection {
    pub name: String,
    #[serde(default)]
    pub range: Option<String>,
    #[serde(default)]
    pub target: DependencyTarget,
}

fn default_format() -> u32 {
    DGSPEC_FORMAT_VERSION
}

/// Whether a declared dependency resolves to a package or a sibling project.
#[derive(Debug, Clone, Copy, Default, Deserialize, Serialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum DependencyTarget {
    #[default]
    Package,
    Project,
}

// Typed snapshot.

/// A declared dependency of one project framework.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LibraryDependency {
    name: PackageId,
    range: VersionRange,
    target: DependencyTarget,
}

impl LibraryDependency {
    pub fn package(name: impl Into<PackageId>, range: VersionRange) -> Self {
        Self {
            name: name.into(),
            range,
            target: DependencyTarget::Package,
        }
    }

    pub fn name(&self) -> &PackageId {
        &self.name
    }

    pub fn range(&self) -> &VersionRange {
        &self.range
    }

    pub fn target(&self) -> DependencyTarget {
        self.target
    }

    pub fn is_package(&self) -> bool {
        self.target == DependencyTarget::Package
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrameworkSpec {
    framework: TargetFramework,
    dependencies: Vec<LibraryDependency>,
}

impl FrameworkSpec {
    pub fn new(framework: TargetFramework, dependencies: Vec<LibraryDependency>) -> Self {
        Self {
            framework,
            dependencies,
        }
    }

    pub fn framework(&self) -> &TargetFramework {
        &self.framework
    }

    pub fn dependencies(&self) -> &[LibraryDependency] {
        &self.dependencies
    }

    /// Direct dependencies that resolve to packages.
    pub fn package_dependencies(&self) -> impl Iterator<Item = &LibraryDependency> {
        self.dependencies.iter().filter(|d| d.is_package())
    }
}

/// Restore metadata of one project.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectSpec {
    unique_name: String,
    name: String,
    base_directory: Option<PathBuf>,
    lock_file_path: Option<PathBuf>,
    restore_with_lock_file: Option<String>,
    project_references: Vec<String>,
    frameworks: Vec<FrameworkSpec>,
}

impl ProjectSpec {
    pub fn new(unique_name: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            unique_name: unique_name.into(),
            name: name.into(),
            base_directory: None,
            lock_file_path: None,
            restore_with_lock_file: None,
            project_references: Vec::new(),
            frameworks: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_base_directory(mut self, dir: impl Into<PathBuf>) -> Self {
        self.base_directory = Some(dir.into());
        self
    }

    #[must_use]
    pub fn with_lock_file_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.lock_file_path = Some(path.into());
        self
    }

    #[must_use]
    pub fn with_restore_with_lock_file(mut self, value: impl Into<String>) -> Self {
        self.restore_with_lock_file = Some(value.into());
        self
    }

    #[must_use]
    pub fn with_project_references(mut self, references: Vec<String>) -> Self {
        self.project_references = references;
        self
    }

    #[must_use]
    pub fn with_frameworks(mut self, frameworks: Vec<FrameworkSpec>) -> Self {
        self.frameworks = frameworks;
        self
    }

    /// Full project path; the key used by `restore` and `project_references`.
    pub fn unique_name(&self) -> &str {
        &self.unique_name
    }

    /// Short project name, as it appears in lock file `Project` entries.
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn base_directory(&self) -> Option<&Path> {
        self.base_directory.as_deref()
    }

    pub fn lock_file_path(&self) -> Option<&Path> {
        self.lock_file_path.as_deref()
    }

    /// Raw MSBuild property text, e.g. `"true"`.
    pub fn restore_with_lock_file(&self) -> Option<&str> {
        self.restore_with_lock_file.as_deref()
    }

    /// `RestorePackagesWithLockFile` evaluates to MSBuild true.
    pub fn restores_with_lock_file(&self) -> bool {
        self.restore_with_lock_file
            .as_deref()
            .is_some_and(|v| v.trim().eq_ignore_ascii_case("true"))
    }

    pub fn project_references(&self) -> &[String] {
        &self.project_references
    }

    pub fn frameworks(&self) -> &[FrameworkSpec] {
        &self.frameworks
    }
}

/// The snapshot consumed by the validator.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DependencyGraphSpec {
    restore: Vec<String>,
    projects: Vec<ProjectSpec>,
}

impl DependencyGraphSpec {
    pub fn new(restore: Vec<String>, projects: Vec<ProjectSpec>) -> Self {
        Self { restore, projects }
    }

    pub fn restore(&self) -> &[String] {
        &self.restore
    }

    /// The project under validation: the first restore entry.
    pub fn restore_project(&self) -> Option<&str> {
        self.restore.first().map(String::as_str)
    }

    pub fn projects(&self) -> &[ProjectSpec] {
        &self.projects
    }

    /// Find a project by unique name using the caller's path comparison.
    pub fn find_project(
        &self,
        unique_name: &str,
        same_path: impl Fn(&str, &str) -> bool,
    ) -> Option<&ProjectSpec> {
        self.projects
            .iter()
            .find(|p| same_path(p.unique_name(), unique_name))
    }
}

impl DgSpecV1 {
    /// Validate the raw document and build the typed snapshot.
    pub fn resolve(&self) -> Result<DependencyGraphSpec, SnapshotError> {
        if self.format != DGSPEC_FORMAT_VERSION {
            return Err(SnapshotError::UnsupportedFormat(self.format));
        }

        let mut projects = Vec::with_capacity(self.projects.len());
        for (index, raw) in self.projects.iter().enumerate() {
            let unique_name = raw.unique_name.trim();
            let name = raw.name.trim();
            if unique_name.is_empty() || name.is_empty() {
                return Err(SnapshotError::EmptyProjectName(index));
            }

            let frameworks = raw
                .frameworks
                .iter()
                .map(|fw| resolve_framework(unique_name, fw))
                .collect::<Result<Vec<_>, _>>()?;

            projects.push(ProjectSpec {
                unique_name: unique_name.to_owned(),
                name: name.to_owned(),
                base_directory: raw.base_directory.clone(),
                lock_file_path: raw.lock_file_path.clone(),
                restore_with_lock_file: raw.restore_with_lock_file.clone(),
                project_references: raw.project_references.clone(),
                frameworks,
            });
        }

        Ok(DependencyGraphSpec {
            restore: self.restore.clone(),
            projects,
        })
    }
}

fn resolve_framework(
    project: &str,
    raw: &FrameworkSection,
) -> Result<FrameworkSpec, SnapshotError> {
    let framework = TargetFramework::parse(&raw.framework);
    if framework.is_unsupported() {
        return Err(SnapshotError::UnsupportedFramework {
            project: project.to_owned(),
            framework: raw.framework.clone(),
        });
    }

    let mut dependencies = Vec::with_capacity(raw.dependencies.len());
    for dep in &raw.dependencies {
        let range = match dep.range.as_deref().map(str::trim) {
            None | Some("") => VersionRange::all(),
            Some(text) => {
                VersionRange::parse(text).map_err(|source| SnapshotError::InvalidRange {
                    project: project.to_owned(),
                    dependency: dep.name.clone(),
                    range: text.to_owned(),
                    source,
                })?
            }
        };
        dependencies.push(LibraryDependency {
            name: PackageId::new(dep.name.trim()),
            range,
            target: dep.target,
        });
    }

    Ok(FrameworkSpec::new(framework, dependencies))
}

pub fn parse_dgspec_str(input: &str) -> Result<DependencyGraphSpec, SnapshotError> {
    // Derived structs also accept a positional array; only objects are documents.
    let value: serde_json::Value = serde_json::from_str(input)?;
    if !value.is_object() {
        return Err(SnapshotError::NotAnObject);
    }
    let raw = DgSpecV1::deserialize(value)?;
    raw.resolve()
}

pub fn parse_dgspec_file(path: impl AsRef<Path>) -> Result<DependencyGraphSpec, SnapshotError> {
    let path = path.as_ref();
    let content = fs::read_to_string(path).map_err(|source| SnapshotError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    parse_dgspec_str(&content)
}
