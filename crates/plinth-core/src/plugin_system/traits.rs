use std::fmt;

use crate::plugin_system::descriptor::Descriptor;
use crate::plugin_system::requirement::Requirement;

/// Core trait that all plugins must implement.
///
/// `T` is the type of the shared target object the plugin applies to. The
/// manager owns the target and hands it to each plugin in turn.
pub trait Plugin<T>: Send + Sync {
    /// Apply this plugin to the target
    fn apply_to(&self, target: &mut T);

    /// Remove this plugin from the target.
    ///
    /// Afterwards the target *must* be in the same state as if the plugin had
    /// never been applied. Cascading unloads rely on this.
    fn remove_from(&self, target: &mut T);

    /// Identity and version of this plugin
    fn descriptor(&self) -> &Descriptor;

    /// Plugins required by this one. Must not change over the plugin's lifetime.
    fn requirements(&self) -> &[Requirement];
}

/// True iff any of `requirements` is met by `dependency`.
pub fn depends_on(requirements: &[Requirement], dependency: &Descriptor) -> bool {
    requirements.iter().any(|r| r.matches(dependency))
}

/// Relations derived from a plugin's public state. Implemented for every
/// plugin and not meant to be implemented by hand.
pub trait PluginExt<T> {
    /// Whether this plugin requires `other`
    fn depends_on(&self, other: &dyn Plugin<T>) -> bool;
}

impl<T, P> PluginExt<T> for P
where
    P: Plugin<T> + ?Sized,
{
    fn depends_on(&self, other: &dyn Plugin<T>) -> bool {
        depends_on(self.requirements(), other.descriptor())
    }
}

/// Target behaviour of a [`DeclaredPlugin`].
pub trait TargetAction<T>: Send + Sync {
    /// Apply the plugin described by `descriptor` to the target
    fn apply(&self, descriptor: &Descriptor, target: &mut T);

    /// Undo exactly what [`TargetAction::apply`] did
    fn remove(&self, descriptor: &Descriptor, target: &mut T);
}

/// A plugin whose descriptor and requirements come from a declarative source
/// (usually a [`PluginManifest`](crate::plugin_system::manifest::PluginManifest))
/// rather than from code, so they can be read without running the plugin.
pub struct DeclaredPlugin<A> {
    descriptor: Descriptor,
    requirements: Vec<Requirement>,
    action: A,
}

impl<A> DeclaredPlugin<A> {
    pub fn new(descriptor: Descriptor, requirements: Vec<Requirement>, action: A) -> Self {
        Self {
            descriptor,
            requirements,
            action,
        }
    }

    /// The behaviour this plugin applies
    pub fn action(&self) -> &A {
        &self.action
    }
}

impl<A> fmt::Debug for DeclaredPlugin<A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DeclaredPlugin")
            .field("descriptor", &self.descriptor)
            .field("requirements", &self.requirements)
            .finish_non_exhaustive()
    }
}

impl<T, A: TargetAction<T>> Plugin<T> for DeclaredPlugin<A> {
    fn apply_to(&self, target: &mut T) {
        self.action.apply(&self.descriptor, target);
    }

    fn remove_from(&self, target: &mut T) {
        self.action.remove(&self.descriptor, target);
    }

    fn descriptor(&self) -> &Descriptor {
        &self.descriptor
    }

    fn requirements(&self) -> &[Requirement] {
        &self.requirements
    }
}
