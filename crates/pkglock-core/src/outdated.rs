//! Report of locked packages that have newer versions available.

use crate::config::OutdatedSettings;
use crate::CoreError;
use pkglock_schema::{InstallationType, LockFile, PackageVersion};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;
use tracing::warn;

/// A version offered by a package source.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AvailableVersion {
    pub version: PackageVersion,
    #[serde(default = "default_listed")]
    pub listed: bool,
}

fn default_listed() -> bool {
    true
}

/// Where known versions of a package come from.
pub trait VersionSource {
    /// All versions known for `id`. Unknown packages yield an empty list.
    fn versions(&self, id: &str) -> Result<Vec<AvailableVersion>, CoreError>;
}

/// A version index stored as JSON: `{ "<id>": [{ "version": "1.0.0", "listed": true }] }`.
///
/// Package ids are matched case-insensitively.
#[derive(Debug, Clone, Default)]
pub struct VersionIndexFile {
    packages: HashMap<String, Vec<AvailableVersion>>,
}

impl VersionIndexFile {
    pub fn from_json_str(input: &str) -> Result<Self, CoreError> {
        let raw: HashMap<String, Vec<AvailableVersion>> = serde_json::from_str(input)
            .map_err(|e| CoreError::VersionSource(format!("invalid version index: {e}")))?;
        let mut packages: HashMap<String, Vec<AvailableVersion>> = HashMap::new();
        for (id, versions) in raw {
            packages.entry(id.to_lowercase()).or_default().extend(versions);
        }
        Ok(Self { packages })
    }

    pub fn load(path: &Path) -> Result<Self, CoreError> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            CoreError::VersionSource(format!("failed to read '{}': {e}", path.display()))
        })?;
        Self::from_json_str(&content)
    }

    pub fn len(&self) -> usize {
        self.packages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.packages.is_empty()
    }
}

impl VersionSource for VersionIndexFile {
    fn versions(&self, id: &str) -> Result<Vec<AvailableVersion>, CoreError> {
        Ok(self
            .packages
            .get(&id.to_lowercase())
            .cloned()
            .unwrap_or_default())
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct OutdatedOptions {
    /// Consider prerelease versions.
    pub prerelease: bool,
    /// Only consider versions with the same major and minor version.
    pub patch: bool,
    /// Also report transitive packages.
    pub transitive: bool,
}

impl From<OutdatedSettings> for OutdatedOptions {
    fn from(settings: OutdatedSettings) -> Self {
        Self {
            prerelease: settings.prerelease,
            patch: settings.patch,
            transitive: settings.transitive,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OutdatedPackage {
    pub framework: String,
    pub id: String,
    pub installation_type: String,
    pub current: String,
    /// Requested range, for direct dependencies.
    pub wanted: Option<String>,
    pub latest: String,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct OutdatedReport {
    pub packages: Vec<OutdatedPackage>,
    pub has_outdated: bool,
}

/// Compare every locked package against `source`.
///
/// Project entries and entries without a resolved version are skipped. A
/// source failure for one package is logged and that package is skipped.
pub fn find_outdated(
    lock: &LockFile,
    source: &dyn VersionSource,
    options: OutdatedOptions,
) -> OutdatedReport {
    let mut known: HashMap<String, Option<Vec<AvailableVersion>>> = HashMap::new();
    let mut packages = Vec::new();

    for target in lock.targets() {
        for dep in target.dependencies() {
            let considered = match dep.installation_type() {
                InstallationType::Direct => true,
                InstallationType::Transitive => options.transitive,
                InstallationType::Project => false,
            };
            let Some(current) = dep.resolved().filter(|_| considered) else {
                continue;
            };

            let versions = known
                .entry(dep.id().to_lowercase())
                .or_insert_with(|| match source.versions(dep.id()) {
                    Ok(versions) => Some(versions),
                    Err(e) => {
                        warn!("skipping {}: {e}", dep.id());
                        None
                    }
                });
            let Some(versions) = versions else {
                continue;
            };

            let latest = latest_version(current, versions, options);
            if latest > current {
                packages.push(OutdatedPackage {
                    framework: target.name(),
                    id: dep.id().to_string(),
                    installation_type: dep.installation_type().to_string(),
                    current: current.to_string(),
                    wanted: dep.requested().map(ToString::to_string),
                    latest: latest.to_string(),
                });
            }
        }
    }

    let has_outdated = !packages.is_empty();
    OutdatedReport {
        packages,
        has_outdated,
    }
}

/// Newest acceptable candidate, or `current` when none is newer.
fn latest_version<'a>(
    current: &'a PackageVersion,
    versions: &'a [AvailableVersion],
    options: OutdatedOptions,
) -> &'a PackageVersion {
    versions
        .iter()
        .filter(|v| v.listed)
        .map(|v| &v.version)
        .filter(|v| options.prerelease || !v.is_prerelease())
        .filter(|v| {
            !options.patch || (v.major() == current.major() && v.minor() == current.minor())
        })
        .fold(current, |best, v| if v > best { v } else { best })
}

#[cfg(test)]
mod tests {
    use super::*;
    use pkglock_schema::{LockFileDependency, LockFileTarget, TargetFramework, VersionRange};
    use std::cell::Cell;

    fn v(s: &str) -> PackageVersion {
        PackageVersion::parse(s).unwrap()
    }

    const INDEX: &str = r#"{
        "PackageA": [
            { "version": "1.0.0" },
            { "version": "1.0.5" },
            { "version": "1.2.0" },
            { "version": "2.0.0-beta.1" },
            { "version": "3.0.0", "listed": false }
        ],
        "packageb": [{ "version": "1.0.0" }, { "version": "1.1.0" }]
    }"#;

    fn lock() -> LockFile {
        LockFile::new(
            1,
            vec![LockFileTarget::new(
                TargetFramework::parse("net6.0"),
                None,
                vec![
                    LockFileDependency::new("PackageA", InstallationType::Direct)
                        .with_requested(VersionRange::parse("[1.0.0, )").unwrap())
                        .with_resolved(v("1.0.0")),
                    LockFileDependency::new("PackageB", InstallationType::Transitive)
                        .with_resolved(v("1.0.0")),
                    LockFileDependency::new("Lib", InstallationType::Project),
                ],
            )],
        )
    }

    fn index() -> VersionIndexFile {
        VersionIndexFile::from_json_str(INDEX).unwrap()
    }

    #[test]
    fn reports_latest_listed_stable_version() {
        let report = find_outdated(&lock(), &index(), OutdatedOptions::default());
        assert!(report.has_outdated);
        assert_eq!(report.packages.len(), 1);
        let a = &report.packages[0];
        assert_eq!(a.id, "PackageA");
        assert_eq!(a.framework, "net6.0");
        assert_eq!(a.current, "1.0.0");
        assert_eq!(a.wanted.as_deref(), Some("[1.0.0, )"));
        assert_eq!(a.latest, "1.2.0");
    }

    #[test]
    fn prerelease_option_includes_prereleases() {
        let options = OutdatedOptions {
            prerelease: true,
            ..OutdatedOptions::default()
        };
        let report = find_outdated(&lock(), &index(), options);
        assert_eq!(report.packages[0].latest, "2.0.0-beta.1");
    }

    #[test]
    fn patch_option_keeps_major_minor() {
        let options = OutdatedOptions {
            patch: true,
            ..OutdatedOptions::default()
        };
        let report = find_outdated(&lock(), &index(), options);
        assert_eq!(report.packages[0].latest, "1.0.5");
    }

    #[test]
    fn transitive_option_adds_transitive_packages() {
        let options = OutdatedOptions {
            transitive: true,
            ..OutdatedOptions::default()
        };
        let report = find_outdated(&lock(), &index(), options);
        let ids: Vec<&str> = report.packages.iter().map(|p| p.id.as_str()).collect();
        assert_eq!(ids, vec!["PackageA", "PackageB"]);
        assert!(report.packages[1].wanted.is_none());
    }

    #[test]
    fn up_to_date_lock_has_no_rows() {
        let index = VersionIndexFile::from_json_str(r#"{"PackageA": [{"version": "1.0.0"}]}"#).unwrap();
        let report = find_outdated(&lock(), &index, OutdatedOptions::default());
        assert!(!report.has_outdated);
        assert!(report.packages.is_empty());
    }

    struct FailingSource {
        calls: Cell<usize>,
    }

    impl VersionSource for FailingSource {
        fn versions(&self, _id: &str) -> Result<Vec<AvailableVersion>, CoreError> {
            self.calls.set(self.calls.get() + 1);
            Err(CoreError::VersionSource("feed unavailable".to_owned()))
        }
    }

    #[test]
    fn source_errors_skip_the_package_once() {
        let mut lock_twice = lock().targets().to_vec();
        lock_twice.push(LockFileTarget::new(
            TargetFramework::parse("net7.0"),
            None,
            lock().targets()[0].dependencies().to_vec(),
        ));
        let source = FailingSource {
            calls: Cell::new(0),
        };
        let report = find_outdated(&LockFile::new(1, lock_twice), &source, OutdatedOptions::default());
        assert!(!report.has_outdated);
        assert_eq!(source.calls.get(), 1);
    }

    #[test]
    fn index_ids_are_case_insensitive() {
        let index = index();
        assert_eq!(index.len(), 2);
        assert_eq!(index.versions("PACKAGEB").unwrap().len(), 2);
        assert!(index.versions("unknown").unwrap().is_empty());
        assert!(VersionIndexFile::from_json_str("[]").is_err());
    }
}
