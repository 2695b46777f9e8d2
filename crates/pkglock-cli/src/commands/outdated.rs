use super::{colorize_status, json_pretty, load_lock_file, EXIT_STALE, EXIT_SUCCESS};
use pkglock_core::{find_outdated, OutdatedOptions, VersionIndexFile};
use std::path::Path;

pub fn run(
    path: &Path,
    index: &Path,
    options: OutdatedOptions,
    fail_on_outdated: bool,
    json: bool,
) -> Result<u8, String> {
    let lock = load_lock_file(path)?;
    let source = VersionIndexFile::load(index).map_err(|e| e.to_string())?;
    let report = find_outdated(&lock, &source, options);

    if json {
        println!("{}", json_pretty(&report)?);
    } else if report.has_outdated {
        println!(
            "{} packages are {}:",
            report.packages.len(),
            colorize_status("outdated")
        );
        println!(
            "  {:<16} {:<40} {:<12} {:<16} {}",
            "framework", "package", "current", "wanted", "latest"
        );
        for p in &report.packages {
            println!(
                "  {:<16} {:<40} {:<12} {:<16} {}",
                p.framework,
                p.id,
                p.current,
                p.wanted.as_deref().unwrap_or("-"),
                p.latest
            );
        }
    } else {
        println!("all packages are {}", colorize_status("up to date"));
    }

    if report.has_outdated && fail_on_outdated {
        Ok(EXIT_STALE)
    } else {
        Ok(EXIT_SUCCESS)
    }
}
