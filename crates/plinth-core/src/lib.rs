//! Plinth core: a plugin dependency and lifecycle manager.
//!
//! Plugins are loaded one at a time onto a single shared target. A plugin is
//! loaded only when every plugin it requires is already loaded, and unloading a
//! plugin first unloads everything that depends on it.
pub mod event;
pub mod plugin_system;

// Re-export key public types/traits for easier use by the binary and plugins
pub use event::{EventDispatcher, PluginEvent};
pub use plugin_system::{
    DeclaredPlugin, Descriptor, LoadOutcome, LoadRejection, Plugin, PluginExt, PluginManager,
    PluginManifest, Requirement, TargetAction, Version,
};
pub use plugin_system::error::PluginSystemError;
