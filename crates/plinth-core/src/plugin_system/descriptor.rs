use std::fmt;

use serde::Serialize;
use thiserror::Error;

use crate::plugin_system::version::{Version, VersionError};

/// Error raised when a descriptor cannot be constructed
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DescriptorError {
    /// `group_id` or `name` was empty
    #[error("Invalid plugin descriptor: {field} must not be empty")]
    EmptyField { field: &'static str },

    /// The version text could not be parsed
    #[error("Invalid plugin descriptor version: {0}")]
    Version(#[from] VersionError),
}

/// Identity, version and summary of a plugin.
///
/// The group ID identifies the group or organization that develops the plugin,
/// by convention in reverse domain-name notation (`"com.example.my.plugin"`).
/// Two descriptors with the same `(group_id, name)` describe the same plugin,
/// whatever their versions.
///
/// `group_id` and `name` must contain something other than whitespace. Unlike
/// a [`Version`] identifier, which is kept verbatim, a blank identity part is
/// rejected.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct Descriptor {
    group_id: String,
    name: String,
    version: Version,
    summary: String,
}

impl Descriptor {
    /// Creates a new descriptor, rejecting an empty or whitespace-only group ID or name
    pub fn new(
        group_id: impl Into<String>,
        name: impl Into<String>,
        version: Version,
        summary: impl Into<String>,
    ) -> Result<Self, DescriptorError> {
        let group_id = group_id.into();
        let name = name.into();

        if group_id.trim().is_empty() {
            return Err(DescriptorError::EmptyField { field: "group_id" });
        }
        if name.trim().is_empty() {
            return Err(DescriptorError::EmptyField { field: "name" });
        }

        Ok(Self {
            group_id,
            name,
            version,
            summary: summary.into(),
        })
    }

    /// Creates a new descriptor from a version string such as "1.2.3-rc1"
    pub fn parse(
        group_id: impl Into<String>,
        name: impl Into<String>,
        version: &str,
        summary: impl Into<String>,
    ) -> Result<Self, DescriptorError> {
        let version = Version::parse(version)?;
        Self::new(group_id, name, version, summary)
    }

    pub fn group_id(&self) -> &str {
        &self.group_id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn version(&self) -> &Version {
        &self.version
    }

    pub fn summary(&self) -> &str {
        &self.summary
    }

    /// The version-independent identity, `group:name`
    pub fn id_string(&self) -> String {
        format!("{}:{}", self.group_id, self.name)
    }

    /// The identity including the version, `group:name:version`
    pub fn full_id_string(&self) -> String {
        format!("{}:{}:{}", self.group_id, self.name, self.version)
    }
}

impl fmt::Display for Descriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}:{}", self.group_id, self.name, self.version)
    }
}
