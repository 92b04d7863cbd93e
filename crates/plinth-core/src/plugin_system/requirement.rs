use std::fmt;

use serde::Serialize;

use crate::plugin_system::descriptor::Descriptor;
use crate::plugin_system::version::{Version, VersionError};

/// Represents a requirement on another plugin.
///
/// A plugin with the same group ID and name meets the requirement iff its
/// version is at *least* `min_version` and shares its major version: requiring
/// "1.2.3" is met by "1.3.0" but not by "2.0.0".
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct Requirement {
    /// Group ID of the required plugin
    pub group_id: String,

    /// Name of the required plugin
    pub name: String,

    /// Lowest acceptable version; also pins the major version
    pub min_version: Version,
}

impl Requirement {
    /// Create a requirement on `group_id:name` at `min_version` or a compatible upgrade
    pub fn new(group_id: impl Into<String>, name: impl Into<String>, min_version: Version) -> Self {
        Self {
            group_id: group_id.into(),
            name: name.into(),
            min_version,
        }
    }

    /// Create a requirement from a minimum version string
    pub fn parse(
        group_id: impl Into<String>,
        name: impl Into<String>,
        min_version: &str,
    ) -> Result<Self, VersionError> {
        Ok(Self::new(group_id, name, Version::parse(min_version)?))
    }

    /// Require the plugin described by `descriptor`, at its own version or a
    /// same-major upgrade
    pub fn from_exact(descriptor: &Descriptor) -> Self {
        Self::new(
            descriptor.group_id(),
            descriptor.name(),
            descriptor.version().clone(),
        )
    }

    /// The `group:name` identity this requirement refers to
    pub fn id_string(&self) -> String {
        format!("{}:{}", self.group_id, self.name)
    }

    /// Check if a plugin descriptor meets this requirement
    pub fn matches(&self, descriptor: &Descriptor) -> bool {
        self.group_id == descriptor.group_id()
            && self.name == descriptor.name()
            && self.min_version.major() == descriptor.version().major()
            && self.min_version <= *descriptor.version()
    }
}

impl From<&Descriptor> for Requirement {
    fn from(descriptor: &Descriptor) -> Self {
        Self::from_exact(descriptor)
    }
}

impl fmt::Display for Requirement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}:{} >= {} (major {})",
            self.group_id,
            self.name,
            self.min_version,
            self.min_version.major()
        )
    }
}
