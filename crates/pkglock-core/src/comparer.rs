//! Identifier and path comparison, chosen once per run.

use serde::{Deserialize, Serialize};

/// How project paths and package ids are compared.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PathComparison {
    /// Ignore case on Windows, ordinal elsewhere.
    #[default]
    Auto,
    Ordinal,
    IgnoreCase,
}

/// String equality injected into the validator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IdComparer {
    ignore_case: bool,
}

impl IdComparer {
    pub const ORDINAL: Self = Self { ignore_case: false };
    pub const IGNORE_CASE: Self = Self { ignore_case: true };

    /// The host platform's file system convention.
    pub fn for_host() -> Self {
        if cfg!(windows) {
            Self::IGNORE_CASE
        } else {
            Self::ORDINAL
        }
    }

    pub fn from_setting(setting: PathComparison) -> Self {
        match setting {
            PathComparison::Auto => Self::for_host(),
            PathComparison::Ordinal => Self::ORDINAL,
            PathComparison::IgnoreCase => Self::IGNORE_CASE,
        }
    }

    pub fn ignores_case(self) -> bool {
        self.ignore_case
    }

    pub fn equals(self, a: &str, b: &str) -> bool {
        if !self.ignore_case {
            return a == b;
        }
        a.chars()
            .flat_map(char::to_lowercase)
            .eq(b.chars().flat_map(char::to_lowercase))
    }
}

impl Default for IdComparer {
    fn default() -> Self {
        Self::for_host()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ordinal_is_case_sensitive() {
        let cmp = IdComparer::ORDINAL;
        assert!(cmp.equals("PackageA", "PackageA"));
        assert!(!cmp.equals("PackageA", "packagea"));
    }

    #[test]
    fn ignore_case_folds_unicode() {
        let cmp = IdComparer::IGNORE_CASE;
        assert!(cmp.equals("/Src/App.csproj", "/src/app.CSPROJ"));
        assert!(cmp.equals("Ünicode", "ünicode"));
        assert!(!cmp.equals("PackageA", "PackageB"));
        assert!(!cmp.equals("Package", "PackageA"));
    }

    #[test]
    fn setting_selects_comparer() {
        assert_eq!(IdComparer::from_setting(PathComparison::Ordinal), IdComparer::ORDINAL);
        assert_eq!(
            IdComparer::from_setting(PathComparison::IgnoreCase),
            IdComparer::IGNORE_CASE
        );
        assert_eq!(IdComparer::from_setting(PathComparison::Auto), IdComparer::for_host());
        assert_eq!(IdComparer::for_host().ignores_case(), cfg!(windows));
    }
}
