//! Client version keys and build specifications

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use std::sync::LazyLock;

/// Pattern a version string must match in full
static VERSION_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(\d+)\.(\d+)\.(\d+)\.(\d+)$").unwrap()
});

/// A client version (major.minor.patch.build)
///
/// Ordering is lexicographic over the four components, so
/// `1.12.1.5875 < 2.0.0.5610`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct VersionKey {
    pub major: u32,
    pub minor: u32,
    pub patch: u32,
    pub build: u32,
}

impl VersionKey {
    /// Create a version key from its components
    pub const fn new(major: u32, minor: u32, patch: u32, build: u32) -> Self {
        Self { major, minor, patch, build }
    }

    /// Parse a dotted `major.minor.patch.build` string
    pub fn parse(text: &str) -> Result<Self, VersionError> {
        let invalid = || VersionError::InvalidVersionFormat(text.to_string());

        let captures = VERSION_PATTERN.captures(text).ok_or_else(invalid)?;
        let component = |i: usize| -> Result<u32, VersionError> {
            captures[i].parse::<u32>().map_err(|_| invalid())
        };

        Ok(Self {
            major: component(1)?,
            minor: component(2)?,
            patch: component(3)?,
            build: component(4)?,
        })
    }
}

impl FromStr for VersionKey {
    type Err = VersionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl std::fmt::Display for VersionKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}.{}.{}.{}", self.major, self.minor, self.patch, self.build)
    }
}

/// One member of a definition's build set
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum BuildSpec {
    /// A single build (`BUILD 1.0.0.1`)
    Exact(VersionKey),

    /// An inclusive build range (`BUILD 1.0.0.1-1.0.0.9`)
    Range { min: VersionKey, max: VersionKey },
}

impl BuildSpec {
    /// Check whether a version is covered by this build spec
    pub fn contains(&self, key: &VersionKey) -> bool {
        match self {
            Self::Exact(build) => build == key,
            Self::Range { min, max } => min <= key && key <= max,
        }
    }
}

impl FromStr for BuildSpec {
    type Err = VersionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        match s.split_once('-') {
            Some((min, max)) => {
                let min = VersionKey::parse(min.trim())?;
                let max = VersionKey::parse(max.trim())?;
                if min > max {
                    return Err(VersionError::InvertedRange(s.to_string()));
                }
                Ok(Self::Range { min, max })
            }
            None => Ok(Self::Exact(VersionKey::parse(s)?)),
        }
    }
}

impl std::fmt::Display for BuildSpec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Exact(build) => write!(f, "{}", build),
            Self::Range { min, max } => write!(f, "{}-{}", min, max),
        }
    }
}

/// Version parsing errors
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum VersionError {
    #[error("Invalid version format '{0}', expected major.minor.patch.build")]
    InvalidVersionFormat(String),

    #[error("Build range '{0}' ends before it starts")]
    InvertedRange(String),
}
