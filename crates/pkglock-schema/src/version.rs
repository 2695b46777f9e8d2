use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::str::FromStr;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum VersionError {
    #[error("version string must not be empty")]
    Empty,
    #[error("invalid version '{0}'")]
    Invalid(String),
    #[error("invalid release label in version '{0}'")]
    InvalidLabel(String),
    #[error("invalid build metadata in version '{0}'")]
    InvalidMetadata(String),
}

/// A package version: `major.minor.patch[.revision][-labels][+metadata]`.
///
/// Equality and ordering follow package-manager semantics: release labels
/// compare case-insensitively and build metadata is ignored. The metadata is
/// kept so [`to_full_string`](Self::to_full_string) can reproduce it.
#[derive(Debug, Clone)]
pub struct PackageVersion {
    major: u64,
    minor: u64,
    patch: u64,
    revision: u64,
    release_labels: Vec<String>,
    metadata: Option<String>,
}

impl PackageVersion {
    pub fn new(major: u64, minor: u64, patch: u64) -> Self {
        Self {
            major,
            minor,
            patch,
            revision: 0,
            release_labels: Vec::new(),
            metadata: None,
        }
    }

    pub fn parse(input: &str) -> Result<Self, VersionError> {
        let trimmed = input.trim();
        if trimmed.is_empty() {
            return Err(VersionError::Empty);
        }

        let (rest, metadata) = match trimmed.split_once('+') {
            Some((rest, meta)) => {
                if meta.is_empty() || !meta.split('.').all(is_valid_identifier) {
                    return Err(VersionError::InvalidMetadata(trimmed.to_owned()));
                }
                (rest, Some(meta.to_owned()))
            }
            None => (trimmed, None),
        };

        let (numbers, release_labels) = match rest.split_once('-') {
            Some((numbers, labels)) => {
                let labels: Vec<String> = labels.split('.').map(str::to_owned).collect();
                if !labels.iter().all(|l| is_valid_identifier(l)) {
                    return Err(VersionError::InvalidLabel(trimmed.to_owned()));
                }
                (numbers, labels)
            }
            None => (rest, Vec::new()),
        };

        let parts: Vec<&str> = numbers.split('.').collect();
        if parts.is_empty() || parts.len() > 4 {
            return Err(VersionError::Invalid(trimmed.to_owned()));
        }
        let mut components = [0u64; 4];
        for (slot, part) in components.iter_mut().zip(&parts) {
            *slot = parse_component(part).ok_or_else(|| VersionError::Invalid(trimmed.to_owned()))?;
        }

        Ok(Self {
            major: components[0],
            minor: components[1],
            patch: components[2],
            revision: components[3],
            release_labels,
            metadata,
        })
    }

    #[inline]
    pub fn major(&self) -> u64 {
        self.major
    }

    #[inline]
    pub fn minor(&self) -> u64 {
        self.minor
    }

    #[inline]
    pub fn patch(&self) -> u64 {
        self.patch
    }

    #[inline]
    pub fn revision(&self) -> u64 {
        self.revision
    }

    pub fn release_labels(&self) -> &[String] {
        &self.release_labels
    }

    pub fn metadata(&self) -> Option<&str> {
        self.metadata.as_deref()
    }

    pub fn is_prerelease(&self) -> bool {
        !self.release_labels.is_empty()
    }

    /// Normalized form plus build metadata, if any.
    pub fn to_full_string(&self) -> String {
        match &self.metadata {
            Some(meta) => format!("{self}+{meta}"),
            None => self.to_string(),
        }
    }

    fn numeric(&self) -> [u64; 4] {
        [self.major, self.minor, self.patch, self.revision]
    }
}

fn parse_component(part: &str) -> Option<u64> {
    if part.is_empty() || !part.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    part.parse().ok()
}

fn is_valid_identifier(s: &str) -> bool {
    !s.is_empty() && s.bytes().all(|b| b.is_ascii_alphanumeric() || b == b'-')
}

fn compare_labels(a: &[String], b: &[String]) -> Ordering {
    // A release without labels sorts after any prerelease of the same number.
    match (a.is_empty(), b.is_empty()) {
        (true, true) => return Ordering::Equal,
        (true, false) => return Ordering::Greater,
        (false, true) => return Ordering::Less,
        (false, false) => {}
    }
    for (x, y) in a.iter().zip(b) {
        let ord = compare_label(x, y);
        if ord != Ordering::Equal {
            return ord;
        }
    }
    a.len().cmp(&b.len())
}

fn compare_label(a: &str, b: &str) -> Ordering {
    match (a.parse::<u64>(), b.parse::<u64>()) {
        (Ok(x), Ok(y)) => x.cmp(&y),
        (Ok(_), Err(_)) => Ordering::Less,
        (Err(_), Ok(_)) => Ordering::Greater,
        (Err(_), Err(_)) => a
            .bytes()
            .map(|c| c.to_ascii_lowercase())
            .cmp(b.bytes().map(|c| c.to_ascii_lowercase())),
    }
}

impl Ord for PackageVersion {
    fn cmp(&self, other: &Self) -> Ordering {
        self.numeric()
            .cmp(&other.numeric())
            .then_with(|| compare_labels(&self.release_labels, &other.release_labels))
    }
}

impl PartialOrd for PackageVersion {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for PackageVersion {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for PackageVersion {}

impl Hash for PackageVersion {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.numeric().hash(state);
        state.write_usize(self.release_labels.len());
        for label in &self.release_labels {
            match label.parse::<u64>() {
                Ok(n) => {
                    state.write_u8(0);
                    n.hash(state);
                }
                Err(_) => {
                    state.write_u8(1);
                    label.to_ascii_lowercase().hash(state);
                }
            }
        }
    }
}

impl fmt::Display for PackageVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.major, self.minor, self.patch)?;
        if self.revision > 0 {
            write!(f, ".{}", self.revision)?;
        }
        if !self.release_labels.is_empty() {
            write!(f, "-{}", self.release_labels.join("."))?;
        }
        Ok(())
    }
}

impl FromStr for PackageVersion {
    type Err = VersionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl Serialize for PackageVersion {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for PackageVersion {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Self::parse(&raw).map_err(serde::de::Error::custom)
    }
}
