use super::{colorize_status, json_pretty, EXIT_STALE, EXIT_SUCCESS};
use pkglock_core::{JsonSnapshotFile, LockFileStore, LockValidator, SnapshotProvider};
use pkglock_schema::TracingLogger;
use std::path::Path;

pub fn run(
    validator: &LockValidator,
    dgspec: &Path,
    project: Option<&str>,
    lock_path: Option<&Path>,
    json: bool,
) -> Result<u8, String> {
    let spec = JsonSnapshotFile::new(dgspec)
        .load()
        .map_err(|e| e.to_string())?;

    let unique_name = match project {
        Some(name) => name,
        None => spec
            .restore_project()
            .ok_or("dependency graph error: no project to restore")?,
    };
    let comparer = validator.comparer();
    let project_spec = spec
        .find_project(unique_name, |a, b| comparer.equals(a, b))
        .ok_or_else(|| format!("dependency graph error: project not found: {unique_name}"))?;

    let store = LockFileStore::host();
    let lock_path = match lock_path {
        Some(path) => path.to_path_buf(),
        None => store.lock_file_path(project_spec).ok_or_else(|| {
            format!(
                "project '{}' has no base directory; pass --lock",
                project_spec.name()
            )
        })?,
    };

    let parsed = store
        .read(&lock_path, &TracingLogger)
        .map_err(|e| e.to_string())?;
    let verdict = validator
        .validate_project(&spec, unique_name, &parsed)
        .map_err(|e| e.to_string())?;

    if json {
        let payload = serde_json::json!({
            "project": project_spec.name(),
            "lock_file": lock_path.display().to_string(),
            "valid": verdict.is_valid(),
            "reason": verdict.stale_reason(),
        });
        println!("{}", json_pretty(&payload)?);
    } else {
        match verdict.stale_reason() {
            None => println!(
                "{}: {} is {}",
                project_spec.name(),
                lock_path.display(),
                colorize_status("up to date")
            ),
            Some(reason) => {
                println!(
                    "{}: {} is {}",
                    project_spec.name(),
                    lock_path.display(),
                    colorize_status("stale")
                );
                println!("  {reason}");
            }
        }
    }

    if verdict.is_valid() {
        Ok(EXIT_SUCCESS)
    } else {
        Ok(EXIT_STALE)
    }
}
