use std::collections::{HashMap, HashSet};
use std::fmt;
use std::sync::Arc;

use log::debug;

use crate::plugin_system::traits::Plugin;

/// Stable handle of a plugin known to a [`PluginRegistry`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PluginHandle(usize);

impl PluginHandle {
    /// Position of the plugin in the known set
    pub fn index(self) -> usize {
        self.0
    }
}

impl fmt::Display for PluginHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Address of the plugin object, used as its reference identity.
pub(crate) fn plugin_address<T>(plugin: &dyn Plugin<T>) -> usize {
    std::ptr::from_ref(plugin).cast::<()>() as usize
}

/// Registry for managing the known and loaded plugin sets.
///
/// Plugins are identified by reference: the same `Arc` registered twice is one
/// entry, two distinct objects with equal descriptors are two entries. Known
/// plugins are never removed, which also keeps their addresses from being
/// reused while the registry lives.
pub struct PluginRegistry<T> {
    /// Every plugin ever registered, in registration order
    plugins: Vec<Arc<dyn Plugin<T>>>,
    /// Plugin address -> handle
    by_address: HashMap<usize, PluginHandle>,
    /// `group:name` -> first handle that claimed it
    by_id: HashMap<String, PluginHandle>,
    /// Loaded handles, in load order
    loaded: Vec<PluginHandle>,
    loaded_set: HashSet<PluginHandle>,
}

impl<T> PluginRegistry<T> {
    /// Create a new, empty plugin registry
    pub fn new() -> Self {
        Self {
            plugins: Vec::new(),
            by_address: HashMap::new(),
            by_id: HashMap::new(),
            loaded: Vec::new(),
            loaded_set: HashSet::new(),
        }
    }

    /// Register a plugin as known.
    ///
    /// Returns its handle and whether it was newly added. The plugin's id string
    /// is claimed only if no known plugin claimed it before.
    pub fn register(&mut self, plugin: Arc<dyn Plugin<T>>) -> (PluginHandle, bool) {
        let address = plugin_address(&*plugin);
        if let Some(handle) = self.by_address.get(&address) {
            return (*handle, false);
        }

        let handle = PluginHandle(self.plugins.len());
        let id = plugin.descriptor().id_string();
        debug!("Registering plugin {} as {}", plugin.descriptor(), handle);
        self.by_id.entry(id).or_insert(handle);
        self.by_address.insert(address, handle);
        self.plugins.push(plugin);
        (handle, true)
    }

    /// Handle of a known plugin, by reference identity
    pub fn handle_of(&self, plugin: &dyn Plugin<T>) -> Option<PluginHandle> {
        self.by_address.get(&plugin_address(plugin)).copied()
    }

    /// Get a plugin Arc by handle
    pub fn get(&self, handle: PluginHandle) -> Option<&Arc<dyn Plugin<T>>> {
        self.plugins.get(handle.0)
    }

    /// Check whether any known plugin has the id string `group:name`
    pub fn contains_id(&self, id: &str) -> bool {
        self.by_id.contains_key(id)
    }

    /// The known plugin that claimed the id string `group:name`
    pub fn find_by_id(&self, id: &str) -> Option<&Arc<dyn Plugin<T>>> {
        self.by_id.get(id).and_then(|handle| self.get(*handle))
    }

    pub fn is_known(&self, plugin: &dyn Plugin<T>) -> bool {
        self.handle_of(plugin).is_some()
    }

    pub fn is_loaded(&self, plugin: &dyn Plugin<T>) -> bool {
        self.handle_of(plugin)
            .is_some_and(|handle| self.loaded_set.contains(&handle))
    }

    /// Add a known plugin to the loaded set. Returns false if it already was
    /// loaded or the handle is unknown.
    pub fn mark_loaded(&mut self, handle: PluginHandle) -> bool {
        if handle.0 >= self.plugins.len() || !self.loaded_set.insert(handle) {
            return false;
        }
        self.loaded.push(handle);
        true
    }

    /// Remove a plugin from the loaded set. Returns false if it was not loaded.
    pub fn mark_unloaded(&mut self, handle: PluginHandle) -> bool {
        if !self.loaded_set.remove(&handle) {
            return false;
        }
        self.loaded.retain(|h| *h != handle);
        true
    }

    /// Known plugins, in registration order
    pub fn known(&self) -> impl Iterator<Item = &Arc<dyn Plugin<T>>> {
        self.plugins.iter()
    }

    /// Loaded plugins, in load order
    pub fn loaded(&self) -> impl Iterator<Item = &Arc<dyn Plugin<T>>> {
        self.loaded.iter().filter_map(|handle| self.plugins.get(handle.0))
    }

    /// Handles of the loaded plugins, in load order
    pub fn loaded_handles(&self) -> &[PluginHandle] {
        &self.loaded
    }

    /// Get the number of known plugins
    pub fn known_count(&self) -> usize {
        self.plugins.len()
    }

    /// Get the number of loaded plugins
    pub fn loaded_count(&self) -> usize {
        self.loaded.len()
    }
}

impl<T> Default for PluginRegistry<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> fmt::Debug for PluginRegistry<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PluginRegistry")
            .field(
                "known",
                &self
                    .plugins
                    .iter()
                    .map(|p| p.descriptor().full_id_string())
                    .collect::<Vec<_>>(),
            )
            .field("loaded", &self.loaded)
            .finish()
    }
}
