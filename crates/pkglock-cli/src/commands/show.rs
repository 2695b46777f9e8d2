use super::{json_pretty, load_lock_file, EXIT_SUCCESS};
use pkglock_schema::LockFile;
use std::path::Path;

pub fn run(path: &Path, json: bool) -> Result<u8, String> {
    let lock = load_lock_file(path)?;

    if json {
        println!("{}", json_pretty(&summary(path, &lock))?);
    } else {
        println!("lock file:   {}", path.display());
        println!(
            "version:     {}",
            lock.version()
                .map_or_else(|| "missing".to_owned(), |v| v.to_string())
        );
        println!("fingerprint: {}", lock.fingerprint());
        println!("packages:    {}", lock.dependency_count());
        for target in lock.targets() {
            println!("\n{}", target.name());
            for dep in target.dependencies() {
                let resolved = dep
                    .resolved()
                    .map_or_else(|| "-".to_owned(), ToString::to_string);
                println!(
                    "  {:<40} {:<12} {}",
                    dep.id().as_str(),
                    resolved,
                    dep.installation_type()
                );
            }
        }
    }
    Ok(EXIT_SUCCESS)
}

fn summary(path: &Path, lock: &LockFile) -> serde_json::Value {
    let targets: Vec<serde_json::Value> = lock
        .targets()
        .iter()
        .map(|target| {
            let deps: Vec<serde_json::Value> = target
                .dependencies()
                .iter()
                .map(|dep| {
                    serde_json::json!({
                        "id": dep.id().as_str(),
                        "type": dep.installation_type().as_str(),
                        "requested": dep.requested().map(ToString::to_string),
                        "resolved": dep.resolved().map(ToString::to_string),
                        "dependencies": dep.dependencies().len(),
                    })
                })
                .collect();
            serde_json::json!({
                "name": target.name(),
                "framework": target.target_framework().to_string(),
                "runtime_identifier": target.runtime_identifier().map(|r| r.as_str()),
                "supported": !target.target_framework().is_unsupported(),
                "dependencies": deps,
            })
        })
        .collect();

    serde_json::json!({
        "path": path.display().to_string(),
        "version": lock.version(),
        "fingerprint": lock.fingerprint(),
        "package_count": lock.dependency_count(),
        "targets": targets,
    })
}
