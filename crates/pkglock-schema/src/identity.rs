//! Structural equality, hashing, and content fingerprints for the lock model.
//!
//! Equality is order-sensitive at every sequence level: two lock files with the
//! same targets in a different order are different values. Hashes follow the
//! same rule so that `a == b` implies `hash(a) == hash(b)`.

use crate::lock::{LockFile, LockFileDependency, LockFileTarget};
use std::hash::{Hash, Hasher};

const LOCK_FILE_TAG: u8 = 0x4c;
const TARGET_TAG: u8 = 0x54;
const DEPENDENCY_TAG: u8 = 0x44;

impl PartialEq for LockFile {
    fn eq(&self, other: &Self) -> bool {
        self.version == other.version && self.targets == other.targets
    }
}

impl Eq for LockFile {}

impl Hash for LockFile {
    fn hash<H: Hasher>(&self, state: &mut H) {
        state.write_u8(LOCK_FILE_TAG);
        self.version.hash(state);
        self.targets.hash(state);
    }
}

impl PartialEq for LockFileTarget {
    fn eq(&self, other: &Self) -> bool {
        self.target_framework == other.target_framework
            && self.runtime_identifier == other.runtime_identifier
            && self.dependencies == other.dependencies
    }
}

impl Eq for LockFileTarget {}

impl Hash for LockFileTarget {
    fn hash<H: Hasher>(&self, state: &mut H) {
        state.write_u8(TARGET_TAG);
        self.target_framework.hash(state);
        self.runtime_identifier.hash(state);
        self.dependencies.hash(state);
    }
}

impl PartialEq for LockFileDependency {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
            && self.installation_type == other.installation_type
            && self.requested == other.requested
            && self.resolved == other.resolved
            && self.content_hash == other.content_hash
            && self.dependencies == other.dependencies
    }
}

impl Eq for LockFileDependency {}

impl Hash for LockFileDependency {
    fn hash<H: Hasher>(&self, state: &mut H) {
        state.write_u8(DEPENDENCY_TAG);
        self.id.hash(state);
        self.installation_type.hash(state);
        self.requested.hash(state);
        self.resolved.hash(state);
        self.content_hash.hash(state);
        self.dependencies.hash(state);
    }
}

impl LockFile {
    /// Stable blake3 digest of the lock file's semantic content.
    ///
    /// Unlike [`Hash`], the result does not depend on the hasher or platform,
    /// so it can be printed and compared across runs. It covers exactly the
    /// fields that take part in equality, in order.
    pub fn fingerprint(&self) -> String {
        let mut hasher = blake3::Hasher::new();
        match self.version {
            Some(version) => hasher.update(format!("version:{version}\n").as_bytes()),
            None => hasher.update(b"version:none\n"),
        };

        for target in &self.targets {
            let framework = target.target_framework.to_string().to_ascii_lowercase();
            hasher.update(format!("target:{framework}\n").as_bytes());
            if let Some(rid) = &target.runtime_identifier {
                hasher.update(format!("rid:{rid}\n").as_bytes());
            }
            for dep in &target.dependencies {
                hasher.update(
                    format!("dep:{}:{}\n", dep.id, dep.installation_type).as_bytes(),
                );
                if let Some(requested) = &dep.requested {
                    hasher.update(folded("requested", requested).as_bytes());
                }
                if let Some(resolved) = &dep.resolved {
                    hasher.update(folded("resolved", resolved).as_bytes());
                }
                if let Some(hash) = &dep.content_hash {
                    hasher.update(format!("sha512:{hash}\n").as_bytes());
                }
                for child in &dep.dependencies {
                    hasher.update(format!("child:{}:", child.id()).as_bytes());
                    hasher.update(folded("range", child.range()).as_bytes());
                }
            }
        }

        hasher.finalize().to_hex().to_string()
    }
}

/// Versions compare case-insensitively, so their digest input is lowercased.
fn folded(label: &str, value: &impl std::fmt::Display) -> String {
    format!("{label}:{}\n", value.to_string().to_ascii_lowercase())
}
