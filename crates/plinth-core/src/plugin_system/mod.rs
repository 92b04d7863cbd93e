//! # Plinth Core Plugin System
//!
//! This module tracks pluggable units of behaviour applied to one shared
//! target object. Each plugin has a version-qualified identity and declares
//! requirements on other plugins; the [`PluginManager`] only loads a plugin
//! once its requirements are loaded, and unloads dependents before the plugin
//! they depend on.
//!
//! ## Key Submodules and Responsibilities:
//!
//! - **[`version`]**: The [`Version`] value type, its parsing and ordering.
//! - **[`descriptor`]**: [`Descriptor`], the identity, version and summary of a plugin.
//! - **[`requirement`]**: [`Requirement`], a minimum-version constraint on another
//!   plugin, pinned to the same major version.
//! - **[`traits`]**: The [`Plugin`] contract, the derived `depends_on` relation and
//!   [`DeclaredPlugin`] for plugins described by a manifest.
//! - **[`registry`]**: [`PluginRegistry`], bookkeeping of the known and loaded sets.
//! - **[`manager`]**: [`PluginManager`], which applies plugins to the target and
//!   cascades unloads.
//! - **[`manifest`]**: [`PluginManifest`], plugin metadata read from JSON, TOML or YAML.
//! - **[`error`]**: [`PluginSystemError`](error::PluginSystemError) and friends.
pub mod descriptor;
pub mod error;
pub mod manager;
pub mod manifest;
pub mod registry;
pub mod requirement;
pub mod traits;
pub mod version;

pub use descriptor::{Descriptor, DescriptorError};
pub use error::PluginSystemError;
pub use manager::{LoadOutcome, LoadRejection, PluginManager};
pub use manifest::{ManifestFormat, PluginManifest};
pub use registry::{PluginHandle, PluginRegistry};
pub use requirement::Requirement;
pub use traits::{DeclaredPlugin, Plugin, PluginExt, TargetAction, depends_on};
pub use version::{Version, VersionError};
