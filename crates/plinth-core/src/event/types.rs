use std::fmt;

use crate::plugin_system::descriptor::Descriptor;
use crate::plugin_system::manager::LoadRejection;

/// Changes to a manager's plugin sets
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PluginEvent {
    /// A plugin was added to the known set
    Known { descriptor: Descriptor },
    /// A plugin was applied to the target and added to the loaded set
    Loaded { descriptor: Descriptor },
    /// A plugin was removed from the loaded set
    Unloaded { descriptor: Descriptor },
    /// A load attempt was refused
    LoadRejected {
        descriptor: Descriptor,
        reason: LoadRejection,
    },
}

impl PluginEvent {
    /// Get the name of this event
    pub fn name(&self) -> &'static str {
        match self {
            PluginEvent::Known { .. } => "plugin.known",
            PluginEvent::Loaded { .. } => "plugin.loaded",
            PluginEvent::Unloaded { .. } => "plugin.unloaded",
            PluginEvent::LoadRejected { .. } => "plugin.rejected",
        }
    }

    /// The plugin the event is about
    pub fn descriptor(&self) -> &Descriptor {
        match self {
            PluginEvent::Known { descriptor }
            | PluginEvent::Loaded { descriptor }
            | PluginEvent::Unloaded { descriptor }
            | PluginEvent::LoadRejected { descriptor, .. } => descriptor,
        }
    }
}

impl fmt::Display for PluginEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PluginEvent::LoadRejected { descriptor, reason } => {
                write!(f, "{} {} ({})", self.name(), descriptor, reason)
            }
            _ => write!(f, "{} {}", self.name(), self.descriptor()),
        }
    }
}
