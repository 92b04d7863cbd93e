//! # Plinth Core Event System
//!
//! Change notification for the plugin sets kept by a
//! [`PluginManager`](crate::plugin_system::PluginManager). Every addition to the
//! known set, every load, rejected load and unload produces a [`PluginEvent`],
//! delivered synchronously to registered handlers and, for observers living
//! elsewhere, through a broadcast channel.
pub mod dispatcher;
pub mod types;

/// Type for handler identifiers
pub type HandlerId = u64;

/// Re-export important types
pub use dispatcher::{EventDispatcher, EventHandler};
pub use types::PluginEvent;

// Test module declaration
#[cfg(test)]
mod tests;
