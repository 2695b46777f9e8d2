use crate::comparer::{IdComparer, PathComparison};
use crate::CoreError;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Per-directory settings file name.
pub const LOCAL_CONFIG_FILE: &str = "pkglock.toml";

/// Settings loaded from `pkglock.toml` or `~/.config/pkglock/config.toml`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Settings {
    #[serde(default)]
    pub path_comparison: PathComparison,
    #[serde(default)]
    pub outdated: OutdatedSettings,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct OutdatedSettings {
    #[serde(default)]
    pub prerelease: bool,
    #[serde(default)]
    pub patch: bool,
    #[serde(default)]
    pub transitive: bool,
}

impl Settings {
    pub fn parse(content: &str) -> Result<Self, CoreError> {
        toml::from_str(content).map_err(|e| CoreError::Config(format!("invalid settings: {e}")))
    }

    pub fn load(path: &Path) -> Result<Self, CoreError> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            CoreError::Config(format!("failed to read '{}': {e}", path.display()))
        })?;
        Self::parse(&content)
    }

    /// Resolve settings for a run.
    ///
    /// An explicit path must exist. Otherwise the first existing file of
    /// `<working_dir>/pkglock.toml` and `<home>/.config/pkglock/config.toml`
    /// is used, falling back to defaults.
    pub fn discover(
        explicit: Option<&Path>,
        working_dir: &Path,
        home: Option<&Path>,
    ) -> Result<Self, CoreError> {
        if let Some(path) = explicit {
            return Self::load(path);
        }
        let candidates = [
            Some(working_dir.join(LOCAL_CONFIG_FILE)),
            home.map(user_config_path),
        ];
        for path in candidates.into_iter().flatten() {
            if path.is_file() {
                tracing::debug!("using settings from {}", path.display());
                return Self::load(&path);
            }
        }
        Ok(Self::default())
    }

    /// [`Settings::discover`] using the process working directory and `$HOME`.
    pub fn discover_default(explicit: Option<&Path>) -> Result<Self, CoreError> {
        let working_dir = std::env::current_dir()?;
        let home = std::env::var_os("HOME").map(PathBuf::from);
        Self::discover(explicit, &working_dir, home.as_deref())
    }

    pub fn comparer(&self) -> IdComparer {
        IdComparer::from_setting(self.path_comparison)
    }
}

fn user_config_path(home: &Path) -> PathBuf {
    home.join(".config/pkglock/config.toml")
}
