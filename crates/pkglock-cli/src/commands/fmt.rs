use super::{json_pretty, load_lock_file, EXIT_FORMAT_DIFF, EXIT_SUCCESS};
use pkglock_core::LockFileStore;
use pkglock_schema::render;
use std::path::Path;

/// Rewrite a lock file in canonical form, or with `check` only report
/// whether it would change.
pub fn run(path: &Path, check: bool, json: bool) -> Result<u8, String> {
    let lock = load_lock_file(path)?;
    let current = std::fs::read(path).map_err(|e| format!("failed to read {}: {e}", path.display()))?;
    let canonical = render(&lock).map_err(|e| format!("failed to render lock file: {e}"))?;
    let changed = current != canonical.as_bytes();

    let written = changed && !check;
    if written {
        LockFileStore::host()
            .write(path, &lock)
            .map_err(|e| e.to_string())?;
    }

    if json {
        let payload = serde_json::json!({
            "path": path.display().to_string(),
            "changed": changed,
            "written": written,
        });
        println!("{}", json_pretty(&payload)?);
    } else if !changed {
        println!("{} is already formatted", path.display());
    } else if check {
        println!("{} would be reformatted", path.display());
    } else {
        println!("formatted {}", path.display());
    }

    if changed && check {
        Ok(EXIT_FORMAT_DIFF)
    } else {
        Ok(EXIT_SUCCESS)
    }
}
