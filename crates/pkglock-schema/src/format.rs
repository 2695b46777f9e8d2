//! JSON format for `packages.lock.json`.
//!
//! ```json
//! {
//!   "version": 1,
//!   "dependencies": {
//!     "net6.0": {
//!       "PackageA": {
//!         "type": "Direct",
//!         "requested": "[1.0.0, )",
//!         "resolved": "1.0.0",
//!         "sha512": "...",
//!         "dependencies": { "PackageB": "[1.0.0, )" }
//!       }
//!     }
//!   }
//! }
//! ```
//!
//! Reading never fails: malformed content is reported once through the
//! [`Logger`] and comes back as [`ParsedLockFile::Corrupt`].

use crate::framework::TargetFramework;
use crate::lock::{
    InstallationType, LockFile, LockFileDependency, LockFileTarget, PackageDependency,
};
use crate::log::Logger;
use crate::range::{RangeError, VersionRange};
use crate::types::{PackageId, RuntimeId};
use crate::version::{PackageVersion, VersionError};
use serde_json::{Map, Value};
use thiserror::Error;

const VERSION_PROPERTY: &str = "version";
const DEPENDENCIES_PROPERTY: &str = "dependencies";
const TYPE_PROPERTY: &str = "type";
const REQUESTED_PROPERTY: &str = "requested";
const RESOLVED_PROPERTY: &str = "resolved";
const SHA512_PROPERTY: &str = "sha512";

/// Separates the framework from the runtime identifier in a target key.
const TARGET_SEPARATOR: char = '/';

#[derive(Debug, Error)]
enum FormatError {
    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("lock file root is not a JSON object")]
    NotAnObject,
    #[error("entry '{id}' in target '{target}' is not a JSON object")]
    DependencyNotObject { target: String, id: String },
    #[error("property '{property}' of '{id}' is not a string")]
    NotAString { id: String, property: String },
    #[error("invalid resolved version for '{id}': {source}")]
    Version {
        id: String,
        #[source]
        source: VersionError,
    },
    #[error("invalid version range for '{id}': {source}")]
    Range {
        id: String,
        #[source]
        source: RangeError,
    },
}

/// Result of reading a lock file: either a usable model or a corrupt marker.
///
/// A corrupt lock file is never an error for the reader; callers treat it as
/// out of date and re-resolve.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParsedLockFile {
    Loaded(LockFile),
    Corrupt { source_path: String, reason: String },
}

impl ParsedLockFile {
    pub fn lock_file(&self) -> Option<&LockFile> {
        match self {
            Self::Loaded(lock) => Some(lock),
            Self::Corrupt { .. } => None,
        }
    }

    pub fn into_lock_file(self) -> Option<LockFile> {
        match self {
            Self::Loaded(lock) => Some(lock),
            Self::Corrupt { .. } => None,
        }
    }

    pub fn is_corrupt(&self) -> bool {
        matches!(self, Self::Corrupt { .. })
    }

    pub fn source_path(&self) -> Option<&str> {
        match self {
            Self::Loaded(lock) => lock.source_path(),
            Self::Corrupt { source_path, .. } => Some(source_path),
        }
    }
}

/// Parse lock file bytes read from `source_path`.
pub fn parse(content: &[u8], source_path: &str, logger: &dyn Logger) -> ParsedLockFile {
    match read_lock_file(content) {
        Ok(lock) => ParsedLockFile::Loaded(lock.with_source_path(source_path)),
        Err(e) => {
            logger.warn(&format!("failed to read lock file '{source_path}': {e}"));
            ParsedLockFile::Corrupt {
                source_path: source_path.to_owned(),
                reason: e.to_string(),
            }
        }
    }
}

pub fn parse_str(content: &str, source_path: &str, logger: &dyn Logger) -> ParsedLockFile {
    parse(content.as_bytes(), source_path, logger)
}

fn read_lock_file(content: &[u8]) -> Result<LockFile, FormatError> {
    let Value::Object(root) = serde_json::from_slice::<Value>(content)? else {
        return Err(FormatError::NotAnObject);
    };

    // A missing or non-integer version is not corruption: the targets are
    // kept and the version stays unset, which no reader accepts as current.
    let version = root
        .get(VERSION_PROPERTY)
        .and_then(Value::as_u64)
        .and_then(|v| u32::try_from(v).ok());

    let targets = match root.get(DEPENDENCIES_PROPERTY) {
        Some(Value::Object(entries)) => entries
            .iter()
            .map(|(key, value)| read_target(key, value))
            .collect::<Result<Vec<_>, _>>()?,
        _ => Vec::new(),
    };

    Ok(match version {
        Some(version) => LockFile::new(version, targets),
        None => LockFile::unversioned(targets),
    })
}

fn read_target(key: &str, value: &Value) -> Result<LockFileTarget, FormatError> {
    let (framework, runtime_identifier) = match key.split_once(TARGET_SEPARATOR) {
        Some((framework, rid)) => (framework, Some(RuntimeId::new(rid))),
        None => (key, None),
    };

    let dependencies = match value {
        Value::Object(entries) => entries
            .iter()
            .map(|(id, entry)| read_dependency(key, id, entry))
            .collect::<Result<Vec<_>, _>>()?,
        _ => Vec::new(),
    };

    Ok(LockFileTarget::new(
        TargetFramework::parse(framework),
        runtime_identifier,
        dependencies,
    ))
}

fn read_dependency(target: &str, id: &str, value: &Value) -> Result<LockFileDependency, FormatError> {
    let Value::Object(entry) = value else {
        return Err(FormatError::DependencyNotObject {
            target: target.to_owned(),
            id: id.to_owned(),
        });
    };

    let installation_type = optional_string(entry, id, TYPE_PROPERTY)?
        .and_then(InstallationType::from_name)
        .unwrap_or(InstallationType::Transitive);

    let requested = optional_string(entry, id, REQUESTED_PROPERTY)?
        .map(|raw| parse_range(id, raw))
        .transpose()?;

    let resolved = optional_string(entry, id, RESOLVED_PROPERTY)?
        .map(|raw| {
            PackageVersion::parse(raw).map_err(|source| FormatError::Version {
                id: id.to_owned(),
                source,
            })
        })
        .transpose()?;

    let content_hash = optional_string(entry, id, SHA512_PROPERTY)?.map(str::to_owned);

    let dependencies = match entry.get(DEPENDENCIES_PROPERTY) {
        Some(Value::Object(children)) => children
            .iter()
            .map(|(child, range)| read_child(child, range))
            .collect::<Result<Vec<_>, _>>()?,
        _ => Vec::new(),
    };

    Ok(LockFileDependency {
        id: PackageId::new(id),
        installation_type,
        requested,
        resolved,
        content_hash,
        dependencies,
    })
}

fn read_child(id: &str, value: &Value) -> Result<PackageDependency, FormatError> {
    let range = match value {
        Value::Null => VersionRange::all(),
        Value::String(raw) => parse_range(id, raw)?,
        _ => {
            return Err(FormatError::NotAString {
                id: id.to_owned(),
                property: DEPENDENCIES_PROPERTY.to_owned(),
            })
        }
    };
    Ok(PackageDependency::new(id, range))
}

/// A present, non-empty string property. `null` and `""` count as absent.
fn optional_string<'a>(
    entry: &'a Map<String, Value>,
    id: &str,
    property: &str,
) -> Result<Option<&'a str>, FormatError> {
    match entry.get(property) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(s)) if s.is_empty() => Ok(None),
        Some(Value::String(s)) => Ok(Some(s)),
        Some(_) => Err(FormatError::NotAString {
            id: id.to_owned(),
            property: property.to_owned(),
        }),
    }
}

fn parse_range(id: &str, raw: &str) -> Result<VersionRange, FormatError> {
    VersionRange::parse(raw).map_err(|source| FormatError::Range {
        id: id.to_owned(),
        source,
    })
}

/// Why a lock file cannot be written without losing entries.
#[derive(Debug, Error)]
pub enum RenderError {
    #[error("duplicate target '{0}'")]
    DuplicateTarget(String),
    #[error("duplicate entry '{id}' in target '{target}'")]
    DuplicateDependency { target: String, id: String },
    #[error("duplicate dependency '{child}' of '{id}' in target '{target}'")]
    DuplicateChild {
        target: String,
        id: String,
        child: String,
    },
    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

/// Render a lock file as indented JSON.
///
/// Targets and their entries keep their order; each entry's children are
/// sorted by id (ordinal) so rewrites are stable. Keys that would collide in
/// the JSON output are an error.
pub fn render(lock: &LockFile) -> Result<String, RenderError> {
    let mut targets = Map::new();
    for target in lock.targets() {
        let name = target.name();
        let entries = render_target(&name, target)?;
        if targets.insert(name.clone(), entries).is_some() {
            return Err(RenderError::DuplicateTarget(name));
        }
    }

    let mut root = Map::new();
    if let Some(version) = lock.version() {
        root.insert(VERSION_PROPERTY.to_owned(), Value::from(version));
    }
    root.insert(DEPENDENCIES_PROPERTY.to_owned(), Value::Object(targets));

    Ok(serde_json::to_string_pretty(&Value::Object(root))?)
}

fn render_target(name: &str, target: &LockFileTarget) -> Result<Value, RenderError> {
    let mut entries = Map::new();
    for dep in target.dependencies() {
        let id = dep.id().as_str();
        if entries
            .insert(id.to_owned(), render_dependency(name, dep)?)
            .is_some()
        {
            return Err(RenderError::DuplicateDependency {
                target: name.to_owned(),
                id: id.to_owned(),
            });
        }
    }
    Ok(Value::Object(entries))
}

fn render_dependency(target: &str, dep: &LockFileDependency) -> Result<Value, RenderError> {
    let mut entry = Map::new();
    entry.insert(
        TYPE_PROPERTY.to_owned(),
        Value::from(dep.installation_type().as_str()),
    );
    if let Some(requested) = dep.requested() {
        entry.insert(REQUESTED_PROPERTY.to_owned(), Value::from(requested.to_string()));
    }
    if let Some(resolved) = dep.resolved() {
        entry.insert(RESOLVED_PROPERTY.to_owned(), Value::from(resolved.to_string()));
    }
    if let Some(hash) = dep.content_hash() {
        entry.insert(SHA512_PROPERTY.to_owned(), Value::from(hash));
    }
    if !dep.dependencies().is_empty() {
        let mut sorted: Vec<&PackageDependency> = dep.dependencies().iter().collect();
        sorted.sort_by(|a, b| a.id().as_str().cmp(b.id().as_str()));
        let mut children = Map::new();
        for child in sorted {
            let key = child.id().as_str();
            if children
                .insert(key.to_owned(), Value::from(child.range().to_string()))
                .is_some()
            {
                return Err(RenderError::DuplicateChild {
                    target: target.to_owned(),
                    id: dep.id().as_str().to_owned(),
                    child: key.to_owned(),
                });
            }
        }
        entry.insert(DEPENDENCIES_PROPERTY.to_owned(), Value::Object(children));
    }
    Ok(Value::Object(entry))
}
