//! Target framework monikers.
//!
//! Accepts short folder names (`net472`, `netstandard2.0`, `net6.0-windows`)
//! and full names (`.NETFramework,Version=v4.7.2`). Anything else is kept
//! verbatim as [`TargetFramework::Unsupported`] so that callers can carry it
//! through without failing.

use std::fmt;
use std::hash::{Hash, Hasher};

pub const NET_FRAMEWORK: &str = ".NETFramework";
pub const NET_STANDARD: &str = ".NETStandard";
pub const NET_CORE_APP: &str = ".NETCoreApp";
pub const NET_CORE: &str = ".NETCore";
pub const UAP: &str = "UAP";
pub const NET_MICRO_FRAMEWORK: &str = ".NETMicroFramework";

const SHORT_NAMES: &[(&str, &str)] = &[
    ("net", NET_FRAMEWORK),
    ("netstandard", NET_STANDARD),
    ("netcoreapp", NET_CORE_APP),
    ("netcore", NET_CORE),
    ("uap", UAP),
    ("netmf", NET_MICRO_FRAMEWORK),
];

/// First `.NETCoreApp` major version written with the plain `net` prefix.
const NET5_MAJOR: u32 = 5;

/// Up to four numeric framework version components.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct FrameworkVersion([u32; 4]);

impl FrameworkVersion {
    #[inline]
    pub fn major(self) -> u32 {
        self.0[0]
    }

    #[inline]
    pub fn minor(self) -> u32 {
        self.0[1]
    }

    fn parse_dotted(s: &str) -> Option<Self> {
        let parts: Vec<&str> = s.split('.').collect();
        if parts.is_empty() || parts.len() > 4 {
            return None;
        }
        let mut out = [0u32; 4];
        for (slot, part) in out.iter_mut().zip(&parts) {
            if part.is_empty() || !part.bytes().all(|b| b.is_ascii_digit()) {
                return None;
            }
            *slot = part.parse().ok()?;
        }
        Some(Self(out))
    }

    /// `472` → 4.7.2: each digit is one component.
    fn parse_compact(s: &str) -> Option<Self> {
        if s.is_empty() || s.len() > 4 || !s.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }
        let mut out = [0u32; 4];
        for (slot, digit) in out.iter_mut().zip(s.bytes()) {
            *slot = u32::from(digit - b'0');
        }
        Some(Self(out))
    }

    fn parse_short(s: &str) -> Option<Self> {
        if s.contains('.') {
            Self::parse_dotted(s)
        } else {
            Self::parse_compact(s)
        }
    }
}

impl fmt::Display for FrameworkVersion {
    /// At least `major.minor`; trailing zero build/revision are dropped.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let [major, minor, build, revision] = self.0;
        write!(f, "{major}.{minor}")?;
        if build > 0 || revision > 0 {
            write!(f, ".{build}")?;
        }
        if revision > 0 {
            write!(f, ".{revision}")?;
        }
        Ok(())
    }
}

/// A recognized framework: identifier, version, and optional profile/platform.
#[derive(Debug, Clone)]
pub struct FrameworkName {
    identifier: String,
    version: FrameworkVersion,
    profile: Option<String>,
    platform: Option<String>,
    platform_version: FrameworkVersion,
}

impl FrameworkName {
    pub fn new(identifier: impl Into<String>, version: FrameworkVersion) -> Self {
        Self {
            identifier: canonical_identifier(&identifier.into()),
            version,
            profile: None,
            platform: None,
            platform_version: FrameworkVersion::default(),
        }
    }

    #[must_use]
    pub fn with_platform(mut self, platform: impl Into<String>, version: FrameworkVersion) -> Self {
        self.platform = Some(platform.into());
        self.platform_version = version;
        self
    }

    pub fn identifier(&self) -> &str {
        &self.identifier
    }

    pub fn version(&self) -> FrameworkVersion {
        self.version
    }

    pub fn profile(&self) -> Option<&str> {
        self.profile.as_deref()
    }

    pub fn platform(&self) -> Option<&str> {
        self.platform.as_deref()
    }

    fn is_net5_or_later(&self) -> bool {
        self.identifier == NET_CORE_APP && self.version.major() >= NET5_MAJOR
    }

    fn key(&self) -> (String, FrameworkVersion, String, String, FrameworkVersion) {
        (
            self.identifier.to_ascii_lowercase(),
            self.version,
            self.profile.as_deref().unwrap_or_default().to_ascii_lowercase(),
            self.platform.as_deref().unwrap_or_default().to_ascii_lowercase(),
            self.platform_version,
        )
    }
}

impl PartialEq for FrameworkName {
    fn eq(&self, other: &Self) -> bool {
        self.key() == other.key()
    }
}

impl Eq for FrameworkName {}

impl Hash for FrameworkName {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.key().hash(state);
    }
}

impl fmt::Display for FrameworkName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_net5_or_later() {
            write!(f, "net{}", self.version)?;
            if let Some(platform) = &self.platform {
                write!(f, "-{platform}")?;
                if self.platform_version != FrameworkVersion::default() {
                    write!(f, "{}", self.platform_version)?;
                }
            }
            return Ok(());
        }
        write!(f, "{},Version=v{}", self.identifier, self.version)?;
        if let Some(profile) = &self.profile {
            write!(f, ",Profile={profile}")?;
        }
        Ok(())
    }
}

/// A parsed target framework, or the raw text that could not be parsed.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum TargetFramework {
    Known(FrameworkName),
    Unsupported(String),
}

impl TargetFramework {
    /// Parse a moniker. Never fails: unrecognized input becomes `Unsupported`.
    pub fn parse(input: &str) -> Self {
        let trimmed = input.trim();
        let parsed = if trimmed.contains(',') {
            parse_full_name(trimmed)
        } else {
            parse_short_name(trimmed)
        };
        match parsed {
            Some(name) => Self::Known(name),
            None => Self::Unsupported(input.to_owned()),
        }
    }

    pub fn is_unsupported(&self) -> bool {
        matches!(self, Self::Unsupported(_))
    }

    pub fn as_known(&self) -> Option<&FrameworkName> {
        match self {
            Self::Known(name) => Some(name),
            Self::Unsupported(_) => None,
        }
    }
}

impl From<FrameworkName> for TargetFramework {
    fn from(name: FrameworkName) -> Self {
        Self::Known(name)
    }
}

impl fmt::Display for TargetFramework {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Known(name) => name.fmt(f),
            Self::Unsupported(raw) => f.write_str(raw),
        }
    }
}

fn canonical_identifier(identifier: &str) -> String {
    SHORT_NAMES
        .iter()
        .map(|(_, full)| *full)
        .find(|full| full.eq_ignore_ascii_case(identifier))
        .unwrap_or(identifier)
        .to_owned()
}

fn split_alpha(s: &str) -> (&str, &str) {
    let idx = s
        .find(|c: char| !c.is_ascii_alphabetic())
        .unwrap_or(s.len());
    s.split_at(idx)
}

fn parse_short_name(s: &str) -> Option<FrameworkName> {
    let (main, suffix) = match s.split_once('-') {
        Some((main, suffix)) => (main, Some(suffix)),
        None => (s, None),
    };

    let (prefix, version_text) = split_alpha(main);
    let prefix = prefix.to_ascii_lowercase();
    let identifier = SHORT_NAMES
        .iter()
        .find(|(short, _)| *short == prefix)
        .map(|(_, full)| *full)?;
    let version = FrameworkVersion::parse_short(version_text)?;

    // `net5.0` and later are .NETCoreApp; only the dotted form is valid there.
    let identifier = if identifier == NET_FRAMEWORK
        && version_text.contains('.')
        && version.major() >= NET5_MAJOR
    {
        NET_CORE_APP
    } else {
        identifier
    };

    let mut name = FrameworkName::new(identifier, version);
    if let Some(suffix) = suffix {
        if suffix.is_empty() {
            return None;
        }
        if name.is_net5_or_later() {
            let (platform, platform_version) = split_alpha(suffix);
            if platform.is_empty() {
                return None;
            }
            let platform_version = if platform_version.is_empty() {
                FrameworkVersion::default()
            } else {
                FrameworkVersion::parse_dotted(platform_version)?
            };
            name = name.with_platform(platform, platform_version);
        } else {
            name.profile = Some(suffix.to_owned());
        }
    }
    Some(name)
}

fn parse_full_name(s: &str) -> Option<FrameworkName> {
    let mut parts = s.split(',');
    let identifier = parts.next()?.trim();
    if identifier.is_empty() || identifier.contains(char::is_whitespace) {
        return None;
    }

    let mut version = None;
    let mut profile = None;
    for part in parts {
        let (key, value) = part.split_once('=')?;
        let (key, value) = (key.trim(), value.trim());
        if key.eq_ignore_ascii_case("version") {
            let digits = value.strip_prefix(['v', 'V']).unwrap_or(value);
            version = Some(FrameworkVersion::parse_dotted(digits)?);
        } else if key.eq_ignore_ascii_case("profile") {
            if !value.is_empty() {
                profile = Some(value.to_owned());
            }
        } else {
            return None;
        }
    }

    let mut name = FrameworkName::new(identifier, version?);
    name.profile = profile;
    Some(name)
}
