//! # Plinth Core Plugin System Errors
//!
//! Defines error types specific to the Plinth Plugin System.
//!
//! This module includes [`PluginSystemError`], the enum aggregating the
//! construction-time failures of the plugin system: malformed versions
//! ([`VersionError`]), malformed descriptors ([`DescriptorError`]) and
//! unreadable or invalid manifests. Loading and unloading plugins never fails;
//! a refused load is reported as a
//! [`LoadRejection`](crate::plugin_system::manager::LoadRejection) instead.
use std::path::PathBuf;

use crate::plugin_system::descriptor::DescriptorError;
use crate::plugin_system::version::VersionError;

#[derive(Debug, thiserror::Error)]
pub enum PluginSystemError {
    #[error("Version parsing error: {0}")]
    VersionParsing(#[from] VersionError),

    #[error("Descriptor error: {0}")]
    Descriptor(#[from] DescriptorError),

    #[error("Plugin manifest error for '{}': {message}", .path.as_ref().map(|p| p.display().to_string()).unwrap_or_else(|| "<inline>".into()))]
    Manifest {
        path: Option<PathBuf>,
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    #[error("Unsupported manifest format for '{}'", .path.display())]
    UnsupportedFormat { path: PathBuf },

    #[error("I/O error during '{operation}' on '{}': {source}", .path.display())]
    Io {
        operation: String,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Shorthand for Result with the plugin system error type
pub type Result<T> = std::result::Result<T, PluginSystemError>;

impl PluginSystemError {
    pub fn io(source: std::io::Error, operation: impl Into<String>, path: PathBuf) -> Self {
        PluginSystemError::Io {
            operation: operation.into(),
            path,
            source,
        }
    }
}
