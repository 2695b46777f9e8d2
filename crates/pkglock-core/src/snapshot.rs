use crate::CoreError;
use pkglock_schema::{parse_dgspec_file, DependencyGraphSpec};
use std::path::{Path, PathBuf};

/// Supplies the declared dependency graph to validate against.
pub trait SnapshotProvider {
    fn load(&self) -> Result<DependencyGraphSpec, CoreError>;
}

/// A dependency graph read from a JSON file.
#[derive(Debug, Clone)]
pub struct JsonSnapshotFile {
    path: PathBuf,
}

impl JsonSnapshotFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl SnapshotProvider for JsonSnapshotFile {
    fn load(&self) -> Result<DependencyGraphSpec, CoreError> {
        let spec = parse_dgspec_file(&self.path)?;
        tracing::debug!(
            "loaded {} projects from {}",
            spec.projects().len(),
            self.path.display()
        );
        Ok(spec)
    }
}

impl SnapshotProvider for DependencyGraphSpec {
    fn load(&self) -> Result<DependencyGraphSpec, CoreError> {
        Ok(self.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn loads_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("app.dgspec.json");
        std::fs::write(
            &path,
            r#"{"restore": ["/a.csproj"], "projects": [{"unique_name": "/a.csproj", "name": "a"}]}"#,
        )
        .unwrap();
        let spec = JsonSnapshotFile::new(&path).load().unwrap();
        assert_eq!(spec.restore_project(), Some("/a.csproj"));
    }

    #[test]
    fn invalid_file_is_snapshot_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.json");
        std::fs::write(&path, "[]").unwrap();
        assert!(matches!(
            JsonSnapshotFile::new(&path).load(),
            Err(CoreError::Snapshot(_))
        ));
    }
}
