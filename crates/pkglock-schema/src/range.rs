use crate::version::{PackageVersion, VersionError};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RangeError {
    #[error("version range must not be empty")]
    Empty,
    #[error("invalid version range '{0}'")]
    Invalid(String),
    #[error("invalid floating version range '{0}'")]
    InvalidFloat(String),
    #[error("version range '{0}' has a lower bound above its upper bound")]
    Inverted(String),
    #[error("invalid version in range '{range}': {source}")]
    Version {
        range: String,
        #[source]
        source: VersionError,
    },
}

/// A requested version interval, optionally floating (`1.0.*`).
///
/// Equality is structural: two ranges are equal only when their bounds,
/// inclusivity, and float pattern agree. `1.0` and `[1.0.0, )` are the same
/// range; `[1.0.0]` and `[1.0.0, )` are not.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct VersionRange {
    min: Option<PackageVersion>,
    min_inclusive: bool,
    max: Option<PackageVersion>,
    max_inclusive: bool,
    float: Option<String>,
}

impl VersionRange {
    /// The unbounded range `(, )`.
    pub fn all() -> Self {
        Self {
            min: None,
            min_inclusive: false,
            max: None,
            max_inclusive: false,
            float: None,
        }
    }

    /// `[version, )`
    pub fn at_least(version: PackageVersion) -> Self {
        Self {
            min: Some(version),
            min_inclusive: true,
            max: None,
            max_inclusive: false,
            float: None,
        }
    }

    /// `[version]`
    pub fn exactly(version: PackageVersion) -> Self {
        Self {
            min: Some(version.clone()),
            min_inclusive: true,
            max: Some(version),
            max_inclusive: true,
            float: None,
        }
    }

    pub fn parse(input: &str) -> Result<Self, RangeError> {
        let trimmed = input.trim();
        if trimmed.is_empty() {
            return Err(RangeError::Empty);
        }

        let first = trimmed.as_bytes()[0];
        if first != b'[' && first != b'(' {
            return if trimmed.contains('*') {
                let (min, pattern) = parse_float(trimmed)?;
                Ok(Self {
                    min: Some(min),
                    min_inclusive: true,
                    max: None,
                    max_inclusive: false,
                    float: Some(pattern),
                })
            } else {
                Ok(Self::at_least(parse_bound(trimmed, trimmed)?))
            };
        }

        let last = trimmed.as_bytes()[trimmed.len() - 1];
        if trimmed.len() < 2 || (last != b']' && last != b')') {
            return Err(RangeError::Invalid(trimmed.to_owned()));
        }
        let min_inclusive = first == b'[';
        let max_inclusive = last == b']';
        let inner = &trimmed[1..trimmed.len() - 1];

        let Some((min_raw, max_raw)) = inner.split_once(',') else {
            // Only `[x]` is allowed without a comma.
            if !min_inclusive || !max_inclusive || inner.trim().is_empty() || inner.contains('*') {
                return Err(RangeError::Invalid(trimmed.to_owned()));
            }
            return Ok(Self::exactly(parse_bound(inner, trimmed)?));
        };
        if max_raw.contains(',') {
            return Err(RangeError::Invalid(trimmed.to_owned()));
        }

        let (min_raw, max_raw) = (min_raw.trim(), max_raw.trim());
        let (min, float) = if min_raw.is_empty() {
            (None, None)
        } else if min_raw.contains('*') {
            let (min, pattern) = parse_float(min_raw)?;
            (Some(min), Some(pattern))
        } else {
            (Some(parse_bound(min_raw, trimmed)?), None)
        };
        let max = if max_raw.is_empty() {
            None
        } else {
            Some(parse_bound(max_raw, trimmed)?)
        };

        if let (Some(lo), Some(hi)) = (&min, &max) {
            if lo > hi || (lo == hi && !(min_inclusive && max_inclusive)) {
                return Err(RangeError::Inverted(trimmed.to_owned()));
            }
        }

        Ok(Self {
            min_inclusive: min_inclusive && min.is_some(),
            max_inclusive: max_inclusive && max.is_some(),
            min,
            max,
            float,
        })
    }

    pub fn min(&self) -> Option<&PackageVersion> {
        self.min.as_ref()
    }

    pub fn max(&self) -> Option<&PackageVersion> {
        self.max.as_ref()
    }

    pub fn is_min_inclusive(&self) -> bool {
        self.min_inclusive
    }

    pub fn is_max_inclusive(&self) -> bool {
        self.max_inclusive
    }

    pub fn is_floating(&self) -> bool {
        self.float.is_some()
    }

    fn is_exact(&self) -> bool {
        self.float.is_none()
            && self.min_inclusive
            && self.max_inclusive
            && self.min.is_some()
            && self.min == self.max
    }
}

fn parse_bound(raw: &str, range: &str) -> Result<PackageVersion, RangeError> {
    PackageVersion::parse(raw).map_err(|source| RangeError::Version {
        range: range.to_owned(),
        source,
    })
}

/// Parse `*`, `1.*`, `1.0.*`, `1.0.0-*` or `1.0.0-beta*` into its lowest
/// matching version and the normalized pattern.
fn parse_float(raw: &str) -> Result<(PackageVersion, String), RangeError> {
    let invalid = || RangeError::InvalidFloat(raw.to_owned());
    let Some(prefix) = raw.strip_suffix('*') else {
        return Err(invalid());
    };
    if prefix.contains('*') {
        return Err(invalid());
    }

    let lowest = if prefix.contains('-') {
        if prefix.ends_with('-') || prefix.ends_with('.') {
            format!("{prefix}0")
        } else {
            prefix.to_owned()
        }
    } else if prefix.is_empty() {
        "0.0.0".to_owned()
    } else if prefix.ends_with('.') {
        format!("{prefix}0")
    } else {
        return Err(invalid());
    };

    let min = PackageVersion::parse(&lowest).map_err(|_| invalid())?;
    Ok((min, raw.to_owned()))
}

impl fmt::Display for VersionRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_exact() {
            if let Some(v) = &self.min {
                return write!(f, "[{v}]");
            }
        }
        f.write_str(if self.min_inclusive { "[" } else { "(" })?;
        match (&self.float, &self.min) {
            (Some(pattern), _) => f.write_str(pattern)?,
            (None, Some(min)) => write!(f, "{min}")?,
            (None, None) => {}
        }
        f.write_str(", ")?;
        if let Some(max) = &self.max {
            write!(f, "{max}")?;
        }
        f.write_str(if self.max_inclusive { "]" } else { ")" })
    }
}

impl FromStr for VersionRange {
    type Err = RangeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}
