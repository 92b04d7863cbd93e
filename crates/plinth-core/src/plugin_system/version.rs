use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;

use regex::Regex;
use serde::de::{self, Deserializer};
use serde::{Deserialize, Serialize, Serializer};
use thiserror::Error;

/// `<major>.<minor>.<patch><identifier>`, identifier being any trailing text up
/// to the end of the line. One final line terminator is accepted and dropped.
static VERSION_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(concat!(
        r"\A([0-9]+)\.([0-9]+)\.([0-9]+)",
        r"([^\r\n\x{85}\x{2028}\x{2029}]*)",
        r"(?:\r\n|[\r\n\x{85}\x{2028}\x{2029}])?\z",
    ))
    .expect("version pattern is a valid regex")
});

/// Error type for version parsing and construction
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum VersionError {
    /// The text does not have the form `<major>.<minor>.<patch><identifier>`
    #[error("Invalid version string: '{0}'")]
    InvalidFormat(String),

    /// A numeric component was negative
    #[error("{component} version cannot be negative: {value}")]
    NegativeComponent { component: &'static str, value: i64 },

    /// A numeric component does not fit in a `u32`
    #[error("{component} version is out of range: {value}")]
    ComponentOutOfRange { component: &'static str, value: i64 },
}

/// A mostly semver-compliant plugin version.
///
/// Deviates from semver in two ways: identifiers starting with `-` or `+` carry
/// no special meaning, and a version with *no* identifier is always greater
/// than the same `major.minor.patch` with one.
///
/// Only an empty identifier counts as "no identifier". A whitespace-only one
/// such as `" "` is an identifier like any other, unlike the blank group ID or
/// name a [`Descriptor`](crate::plugin_system::descriptor::Descriptor) rejects.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Version {
    major: u32,
    minor: u32,
    patch: u32,
    identifier: String,
}

impl Version {
    /// Creates a version `major.minor.patch` with no identifier
    pub const fn new(major: u32, minor: u32, patch: u32) -> Self {
        Self {
            major,
            minor,
            patch,
            identifier: String::new(),
        }
    }

    /// Creates a version from signed components, rejecting negative or oversized
    /// ones. `None` and `Some("")` both mean "no identifier".
    pub fn of(
        major: i64,
        minor: i64,
        patch: i64,
        identifier: Option<&str>,
    ) -> Result<Self, VersionError> {
        let check = |component: &'static str, value: i64| -> Result<u32, VersionError> {
            if value < 0 {
                return Err(VersionError::NegativeComponent { component, value });
            }
            u32::try_from(value).map_err(|_| VersionError::ComponentOutOfRange { component, value })
        };

        let version = Self::new(
            check("Major", major)?,
            check("Minor", minor)?,
            check("Patch", patch)?,
        );
        Ok(version.with_identifier(identifier.unwrap_or_default()))
    }

    /// Parses a version string like "1.2.3" or "22.0.1-rc1".
    ///
    /// A single trailing line terminator is ignored, so "1.2.3-rc1\n" parses
    /// as "1.2.3-rc1". Any other text after the patch number, whitespace
    /// included, becomes the identifier verbatim.
    pub fn parse(text: &str) -> Result<Self, VersionError> {
        let invalid = || VersionError::InvalidFormat(text.to_string());
        let captures = VERSION_PATTERN.captures(text).ok_or_else(invalid)?;

        let number = |index: usize| -> Result<u32, VersionError> {
            captures
                .get(index)
                .and_then(|m| m.as_str().parse::<u32>().ok())
                .ok_or_else(invalid)
        };

        let major = number(1)?;
        let minor = number(2)?;
        let patch = number(3)?;
        let identifier = captures.get(4).map_or("", |m| m.as_str());

        Ok(Self::new(major, minor, patch).with_identifier(identifier))
    }

    /// Returns this version with its identifier replaced
    pub fn with_identifier(mut self, identifier: &str) -> Self {
        self.identifier = identifier.to_string();
        self
    }

    pub fn major(&self) -> u32 {
        self.major
    }

    pub fn minor(&self) -> u32 {
        self.minor
    }

    pub fn patch(&self) -> u32 {
        self.patch
    }

    /// The trailing identifier, or `""` when there is none
    pub fn identifier(&self) -> &str {
        &self.identifier
    }

    /// Whether the version carries an identifier
    pub fn has_identifier(&self) -> bool {
        !self.identifier.is_empty()
    }
}

impl Ord for Version {
    fn cmp(&self, other: &Self) -> Ordering {
        self.major
            .cmp(&other.major)
            .then(self.minor.cmp(&other.minor))
            .then(self.patch.cmp(&other.patch))
            .then_with(|| match (self.has_identifier(), other.has_identifier()) {
                (false, false) => Ordering::Equal,
                (false, true) => Ordering::Greater,
                (true, false) => Ordering::Less,
                (true, true) => self.identifier.cmp(&other.identifier),
            })
    }
}

impl PartialOrd for Version {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl FromStr for Version {
    type Err = VersionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Version::parse(s)
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}{}", self.major, self.minor, self.patch, self.identifier)
    }
}

/// Serialized as its display string so manifests can write `version = "1.2.3"`.
impl Serialize for Version {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Version {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let text = String::deserialize(deserializer)?;
        Version::parse(&text).map_err(de::Error::custom)
    }
}
