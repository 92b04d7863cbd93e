use std::collections::HashSet;
use std::fmt;
use std::sync::Arc;

use log::{debug, info, warn};
use thiserror::Error;
use tokio::sync::broadcast;

use crate::event::{EventDispatcher, HandlerId, PluginEvent};
use crate::plugin_system::descriptor::Descriptor;
use crate::plugin_system::registry::{PluginHandle, PluginRegistry, plugin_address};
use crate::plugin_system::requirement::Requirement;
use crate::plugin_system::traits::{Plugin, depends_on};

/// Why a plugin could not be loaded
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LoadRejection {
    /// A known plugin already has the same `group:name`
    #[error("a plugin with id '{id}' is already known")]
    DuplicateId { id: String },

    /// Some requirements are not met by any loaded plugin
    #[error("unmet requirements: {}", .missing.iter().map(ToString::to_string).collect::<Vec<_>>().join(", "))]
    UnmetRequirements { missing: Vec<Requirement> },
}

/// Result of [`PluginManager::load`]. A rejection is an ordinary outcome, not an error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadOutcome {
    /// The plugin was applied to the target
    Loaded(PluginHandle),
    /// The plugin was recorded as known but not applied
    Rejected {
        handle: PluginHandle,
        reason: LoadRejection,
    },
}

impl LoadOutcome {
    pub fn is_loaded(&self) -> bool {
        matches!(self, LoadOutcome::Loaded(_))
    }

    /// Handle of the plugin in the known set, whatever the outcome
    pub fn handle(&self) -> PluginHandle {
        match self {
            LoadOutcome::Loaded(handle) | LoadOutcome::Rejected { handle, .. } => *handle,
        }
    }

    pub fn rejection(&self) -> Option<&LoadRejection> {
        match self {
            LoadOutcome::Loaded(_) => None,
            LoadOutcome::Rejected { reason, .. } => Some(reason),
        }
    }
}

/// Manages loading and unloading plugins on a single, shared target object.
///
/// The manager is bound to its target for its whole lifetime. Every plugin ever
/// passed to [`load`](Self::load) stays *known*, whether or not it could be
/// loaded; the *loaded* plugins are the known ones currently applied to the
/// target. No locking is done: callers that share a manager across threads
/// must serialize access themselves.
pub struct PluginManager<T> {
    target: T,
    registry: PluginRegistry<T>,
    events: EventDispatcher,
}

impl<T> PluginManager<T> {
    /// Creates a new plugin manager for the given target object
    pub fn new(target: T) -> Self {
        Self {
            target,
            registry: PluginRegistry::new(),
            events: EventDispatcher::new(),
        }
    }

    pub fn target(&self) -> &T {
        &self.target
    }

    /// Mutable access to the target. Changes made here are outside the
    /// apply/remove bookkeeping of the manager.
    pub fn target_mut(&mut self) -> &mut T {
        &mut self.target
    }

    /// Consume the manager and return its target, leaving loaded plugins applied
    pub fn into_target(self) -> T {
        self.target
    }

    /// Get a reference to the plugin registry
    pub fn registry(&self) -> &PluginRegistry<T> {
        &self.registry
    }

    /// Checks if a plugin can be loaded, explaining why not.
    ///
    /// A plugin is loadable when no known plugin shares its `group:name` and
    /// every one of its requirements is met by a loaded plugin.
    pub fn check_load(&self, plugin: &dyn Plugin<T>) -> Result<(), LoadRejection> {
        let id = plugin.descriptor().id_string();
        if self.registry.contains_id(&id) {
            return Err(LoadRejection::DuplicateId { id });
        }

        let missing: Vec<Requirement> = plugin
            .requirements()
            .iter()
            .filter(|r| !self.registry.loaded().any(|p| r.matches(p.descriptor())))
            .cloned()
            .collect();
        if missing.is_empty() {
            Ok(())
        } else {
            Err(LoadRejection::UnmetRequirements { missing })
        }
    }

    /// Checks if a plugin can be loaded. Has no side effects.
    pub fn can_load(&self, plugin: &dyn Plugin<T>) -> bool {
        self.check_load(plugin).is_ok()
    }

    /// Loads a plugin and applies it to the target.
    ///
    /// The plugin becomes known whatever the outcome, so a plugin sharing its
    /// `group:name` can never be loaded afterwards, and neither can this plugin
    /// once it has been unloaded. Has no effect on the target if the plugin
    /// cannot be loaded.
    pub fn load(&mut self, plugin: Arc<dyn Plugin<T>>) -> LoadOutcome {
        let check = self.check_load(&*plugin);
        let descriptor = plugin.descriptor().clone();

        let (handle, newly_known) = self.registry.register(Arc::clone(&plugin));
        if newly_known {
            self.events.dispatch(&PluginEvent::Known {
                descriptor: descriptor.clone(),
            });
        }

        match check {
            Ok(()) => {
                plugin.apply_to(&mut self.target);
                self.registry.mark_loaded(handle);
                info!("Loaded plugin {}", descriptor);
                self.events.dispatch(&PluginEvent::Loaded { descriptor });
                LoadOutcome::Loaded(handle)
            }
            Err(reason) => {
                warn!("Rejected plugin {}: {}", descriptor, reason);
                self.events.dispatch(&PluginEvent::LoadRejected {
                    descriptor,
                    reason: reason.clone(),
                });
                LoadOutcome::Rejected { handle, reason }
            }
        }
    }

    /// Checks if a plugin (this very object) is currently loaded
    pub fn is_loaded(&self, plugin: &dyn Plugin<T>) -> bool {
        self.registry.is_loaded(plugin)
    }

    /// Checks if a plugin (this very object) was ever passed to [`load`](Self::load)
    pub fn is_known(&self, plugin: &dyn Plugin<T>) -> bool {
        self.registry.is_known(plugin)
    }

    /// Unloads a plugin and removes it from the target. Any loaded plugins that
    /// depend on it are unloaded first, transitively.
    ///
    /// `remove_from` is called on `plugin` even if it is not loaded; check
    /// [`is_loaded`](Self::is_loaded) first if that matters. Returns the plugins
    /// removed from the loaded set, dependents first.
    pub fn unload(&mut self, plugin: &dyn Plugin<T>) -> Vec<Arc<dyn Plugin<T>>> {
        let mut visited = HashSet::new();
        let mut removed = Vec::new();
        self.unload_recursive(plugin, &mut visited, &mut removed);
        removed
    }

    fn unload_recursive(
        &mut self,
        plugin: &dyn Plugin<T>,
        visited: &mut HashSet<usize>,
        removed: &mut Vec<Arc<dyn Plugin<T>>>,
    ) {
        // Unreachable through `load`, which never admits a dependency cycle
        if !visited.insert(plugin_address(plugin)) {
            warn!(
                "Dependency cycle through plugin {}, not unloading it twice",
                plugin.descriptor()
            );
            return;
        }

        plugin.remove_from(&mut self.target);

        // Snapshot: the loaded set shrinks while dependents are unloaded
        let dependents: Vec<Arc<dyn Plugin<T>>> = self
            .registry
            .loaded()
            .filter(|p| depends_on(p.requirements(), plugin.descriptor()))
            .cloned()
            .collect();
        for dependent in dependents {
            // An earlier branch of the cascade may already have unloaded it
            if self.registry.is_loaded(&*dependent) {
                debug!(
                    "Unloading {} because it depends on {}",
                    dependent.descriptor(),
                    plugin.descriptor()
                );
                self.unload_recursive(&*dependent, visited, removed);
            }
        }

        if let Some(handle) = self.registry.handle_of(plugin) {
            if self.registry.mark_unloaded(handle) {
                let descriptor = plugin.descriptor().clone();
                info!("Unloaded plugin {}", descriptor);
                self.events.dispatch(&PluginEvent::Unloaded { descriptor });
                if let Some(entry) = self.registry.get(handle) {
                    removed.push(Arc::clone(entry));
                }
            }
        }
    }

    /// Gets the plugins that have ever been attempted to be loaded, in order
    pub fn known_plugins(&self) -> impl Iterator<Item = &Arc<dyn Plugin<T>>> {
        self.registry.known()
    }

    /// Gets the currently loaded plugins, in load order
    pub fn loaded_plugins(&self) -> impl Iterator<Item = &Arc<dyn Plugin<T>>> {
        self.registry.loaded()
    }

    /// Descriptors of the loaded plugins, in load order
    pub fn loaded_descriptors(&self) -> Vec<Descriptor> {
        self.registry
            .loaded()
            .map(|p| p.descriptor().clone())
            .collect()
    }

    pub fn known_count(&self) -> usize {
        self.registry.known_count()
    }

    pub fn loaded_count(&self) -> usize {
        self.registry.loaded_count()
    }

    /// The known plugin that claimed `group:name`, if any
    pub fn find_known(&self, id: &str) -> Option<Arc<dyn Plugin<T>>> {
        self.registry.find_by_id(id).cloned()
    }

    /// Register a handler called for every change to the plugin sets
    pub fn on_event<F>(&mut self, handler: F) -> HandlerId
    where
        F: Fn(&PluginEvent) + Send + Sync + 'static,
    {
        self.events.register_handler(Box::new(handler))
    }

    /// Register a handler for one kind of change, named as by [`PluginEvent::name`]
    pub fn on_named_event<F>(&mut self, event_name: &'static str, handler: F) -> HandlerId
    where
        F: Fn(&PluginEvent) + Send + Sync + 'static,
    {
        self.events.register_named_handler(event_name, Box::new(handler))
    }

    /// Remove a handler registered with [`on_event`](Self::on_event) or
    /// [`on_named_event`](Self::on_named_event)
    pub fn remove_handler(&mut self, id: HandlerId) -> bool {
        self.events.unregister_handler(id)
    }

    /// Receive future changes on a broadcast channel
    pub fn subscribe(&mut self) -> broadcast::Receiver<PluginEvent> {
        self.events.subscribe()
    }
}

impl<T: fmt::Debug> fmt::Debug for PluginManager<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PluginManager")
            .field("target", &self.target)
            .field("registry", &self.registry)
            .field("events", &self.events)
            .finish()
    }
}
