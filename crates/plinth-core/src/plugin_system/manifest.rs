use std::fs;
use std::path::Path;

use log::debug;
use serde::{Deserialize, Serialize};

use crate::plugin_system::descriptor::Descriptor;
use crate::plugin_system::error::{PluginSystemError, Result};
use crate::plugin_system::requirement::Requirement;
use crate::plugin_system::traits::DeclaredPlugin;
use crate::plugin_system::version::Version;

/// Supported manifest file formats
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ManifestFormat {
    /// JSON format (.json)
    Json,
    /// YAML format (.yaml, .yml) - requires "yaml-manifest" feature
    #[cfg(feature = "yaml-manifest")]
    Yaml,
    /// TOML format (.toml) - requires "toml-manifest" feature
    #[cfg(feature = "toml-manifest")]
    Toml,
}

impl ManifestFormat {
    /// Get the file extension for this format
    pub fn extension(&self) -> &'static str {
        match self {
            ManifestFormat::Json => "json",
            #[cfg(feature = "yaml-manifest")]
            ManifestFormat::Yaml => "yaml",
            #[cfg(feature = "toml-manifest")]
            ManifestFormat::Toml => "toml",
        }
    }

    /// Determine format from file extension
    pub fn from_path(path: &Path) -> Option<Self> {
        path.extension()
            .and_then(|ext| ext.to_str())
            .and_then(|ext| match ext.to_lowercase().as_str() {
                "json" => Some(ManifestFormat::Json),
                #[cfg(feature = "yaml-manifest")]
                "yaml" | "yml" => Some(ManifestFormat::Yaml),
                #[cfg(feature = "toml-manifest")]
                "toml" => Some(ManifestFormat::Toml),
                _ => None,
            })
    }
}

/// The `[plugin]` section of a manifest
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct ManifestDescriptor {
    /// Group ID in reverse domain-name notation
    pub group_id: String,
    pub name: String,
    pub version: Version,
    /// A summary of what the plugin provides
    #[serde(default)]
    pub summary: String,
}

/// One `[[requires]]` entry of a manifest
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct ManifestRequirement {
    pub group_id: String,
    pub name: String,
    pub min_version: Version,
}

/// Declarative description of a plugin: who it is and what it requires.
///
/// ```toml
/// [plugin]
/// group-id = "com.example"
/// name = "theme"
/// version = "1.2.0"
/// summary = "Dark theme"
///
/// [[requires]]
/// group-id = "com.example"
/// name = "base"
/// min-version = "1.0.0"
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct PluginManifest {
    pub plugin: ManifestDescriptor,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub requires: Vec<ManifestRequirement>,
}

impl PluginManifest {
    /// Create a manifest for an existing descriptor and its requirements
    pub fn new(descriptor: &Descriptor, requirements: &[Requirement]) -> Self {
        Self {
            plugin: ManifestDescriptor {
                group_id: descriptor.group_id().to_string(),
                name: descriptor.name().to_string(),
                version: descriptor.version().clone(),
                summary: descriptor.summary().to_string(),
            },
            requires: requirements
                .iter()
                .map(|r| ManifestRequirement {
                    group_id: r.group_id.clone(),
                    name: r.name.clone(),
                    min_version: r.min_version.clone(),
                })
                .collect(),
        }
    }

    /// Build the validated descriptor
    pub fn descriptor(&self) -> Result<Descriptor> {
        let plugin = &self.plugin;
        Ok(Descriptor::new(
            plugin.group_id.as_str(),
            plugin.name.as_str(),
            plugin.version.clone(),
            plugin.summary.as_str(),
        )?)
    }

    pub fn requirements(&self) -> Vec<Requirement> {
        self.requires
            .iter()
            .map(|r| Requirement::new(r.group_id.as_str(), r.name.as_str(), r.min_version.clone()))
            .collect()
    }

    /// Check that the manifest describes a valid plugin
    pub fn validate(&self) -> Result<()> {
        self.descriptor().map(|_| ())
    }

    /// Turn the manifest into a plugin whose target behaviour is `action`
    pub fn into_plugin<A>(self, action: A) -> Result<DeclaredPlugin<A>> {
        let descriptor = self.descriptor()?;
        Ok(DeclaredPlugin::new(descriptor, self.requirements(), action))
    }

    /// Deserialize and validate a manifest from a string
    pub fn from_str_with_format(data: &str, format: ManifestFormat) -> Result<Self> {
        let manifest: Self = match format {
            ManifestFormat::Json => serde_json::from_str(data)
                .map_err(|e| Self::parse_error("JSON", Box::new(e)))?,
            #[cfg(feature = "yaml-manifest")]
            ManifestFormat::Yaml => serde_yaml::from_str(data)
                .map_err(|e| Self::parse_error("YAML", Box::new(e)))?,
            #[cfg(feature = "toml-manifest")]
            ManifestFormat::Toml => toml::from_str(data)
                .map_err(|e| Self::parse_error("TOML", Box::new(e)))?,
        };
        manifest.validate()?;
        Ok(manifest)
    }

    /// Serialize to string based on format
    pub fn to_string_with_format(&self, format: ManifestFormat) -> Result<String> {
        let serialized = match format {
            ManifestFormat::Json => serde_json::to_string_pretty(self)
                .map_err(|e| Self::serialize_error("JSON", Box::new(e)))?,
            #[cfg(feature = "yaml-manifest")]
            ManifestFormat::Yaml => serde_yaml::to_string(self)
                .map_err(|e| Self::serialize_error("YAML", Box::new(e)))?,
            #[cfg(feature = "toml-manifest")]
            ManifestFormat::Toml => toml::to_string_pretty(self)
                .map_err(|e| Self::serialize_error("TOML", Box::new(e)))?,
        };
        Ok(serialized)
    }

    /// Read a manifest file, picking the format from its extension
    pub fn from_path(path: &Path) -> Result<Self> {
        let format = ManifestFormat::from_path(path).ok_or_else(|| {
            PluginSystemError::UnsupportedFormat {
                path: path.to_path_buf(),
            }
        })?;
        debug!("Reading {:?} manifest from {}", format, path.display());

        let data = fs::read_to_string(path)
            .map_err(|e| PluginSystemError::io(e, "read manifest", path.to_path_buf()))?;

        Self::from_str_with_format(&data, format).map_err(|e| match e {
            PluginSystemError::Manifest {
                path: None,
                message,
                source,
            } => PluginSystemError::Manifest {
                path: Some(path.to_path_buf()),
                message,
                source,
            },
            other => other,
        })
    }

    fn parse_error(
        format: &str,
        source: Box<dyn std::error::Error + Send + Sync>,
    ) -> PluginSystemError {
        PluginSystemError::Manifest {
            path: None,
            message: format!("Failed to deserialize from {}: {}", format, source),
            source: Some(source),
        }
    }

    fn serialize_error(
        format: &str,
        source: Box<dyn std::error::Error + Send + Sync>,
    ) -> PluginSystemError {
        PluginSystemError::Manifest {
            path: None,
            message: format!("Failed to serialize to {}: {}", format, source),
            source: Some(source),
        }
    }
}
