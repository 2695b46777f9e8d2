pub mod completions;
pub mod fmt;
pub mod man_pages;
pub mod outdated;
pub mod show;
pub mod verify;

use pkglock_core::LockFileStore;
use pkglock_schema::{LockFile, ParsedLockFile, TracingLogger};
use std::path::Path;

pub const EXIT_SUCCESS: u8 = 0;
pub const EXIT_FAILURE: u8 = 1;
pub const EXIT_INPUT_ERROR: u8 = 2;
pub const EXIT_STALE: u8 = 3;
pub const EXIT_FORMAT_DIFF: u8 = 4;

pub fn json_pretty(value: &impl serde::Serialize) -> Result<String, String> {
    serde_json::to_string_pretty(value).map_err(|e| format!("JSON serialization failed: {e}"))
}

pub fn colorize_status(status: &str) -> String {
    use console::Style;
    match status {
        "valid" | "up to date" => Style::new().green().apply_to(status).to_string(),
        "stale" | "outdated" => Style::new().yellow().bold().apply_to(status).to_string(),
        "corrupt" => Style::new().red().bold().apply_to(status).to_string(),
        other => other.to_owned(),
    }
}

/// Read a lock file that must be well formed.
pub fn load_lock_file(path: &Path) -> Result<LockFile, String> {
    match LockFileStore::host()
        .read(path, &TracingLogger)
        .map_err(|e| e.to_string())?
    {
        ParsedLockFile::Loaded(lock) => Ok(lock),
        ParsedLockFile::Corrupt { reason, .. } => Err(format!(
            "lock file '{}' is corrupt: {reason}",
            path.display()
        )),
    }
}
