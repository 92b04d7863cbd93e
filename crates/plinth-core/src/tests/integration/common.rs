#![cfg(test)]

use std::sync::Arc;

use crate::plugin_system::descriptor::Descriptor;
use crate::plugin_system::requirement::Requirement;
use crate::plugin_system::traits::{Plugin, TargetAction};
use crate::plugin_system::version::Version;

// ===== MOCK TARGET =====

/// Target that records which plugins are applied and every apply/remove call
#[derive(Debug, Default)]
pub struct MockTarget {
    applied: Vec<String>,
    calls: Vec<String>,
}

impl MockTarget {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_plugin(&mut self, descriptor: &Descriptor) {
        self.calls.push(format!("apply {}", descriptor));
        self.applied.push(descriptor.full_id_string());
    }

    pub fn remove_plugin(&mut self, descriptor: &Descriptor) {
        self.calls.push(format!("remove {}", descriptor));
        let id = descriptor.full_id_string();
        if let Some(pos) = self.applied.iter().position(|a| *a == id) {
            self.applied.remove(pos);
        }
    }

    pub fn has_plugin(&self, descriptor: &Descriptor) -> bool {
        self.applied.contains(&descriptor.full_id_string())
    }

    pub fn applied_plugins(&self) -> &[String] {
        &self.applied
    }

    pub fn calls(&self) -> &[String] {
        &self.calls
    }
}

// ===== MOCK PLUGINS =====

/// Plugin that adds itself to a [`MockTarget`]
#[derive(Debug)]
pub struct MockPlugin {
    descriptor: Descriptor,
    requirements: Vec<Requirement>,
}

impl MockPlugin {
    pub fn new(descriptor: Descriptor, requirements: Vec<Requirement>) -> Self {
        Self {
            descriptor,
            requirements,
        }
    }

    /// Shorthand for an `Arc`'d plugin `group:name:version`
    pub fn arc(
        group_id: &str,
        name: &str,
        version: Version,
        requirements: Vec<Requirement>,
    ) -> Arc<dyn Plugin<MockTarget>> {
        Arc::new(Self::new(descriptor(group_id, name, version), requirements))
    }
}

impl Plugin<MockTarget> for MockPlugin {
    fn apply_to(&self, target: &mut MockTarget) {
        target.add_plugin(&self.descriptor);
    }

    fn remove_from(&self, target: &mut MockTarget) {
        target.remove_plugin(&self.descriptor);
    }

    fn descriptor(&self) -> &Descriptor {
        &self.descriptor
    }

    fn requirements(&self) -> &[Requirement] {
        &self.requirements
    }
}

/// Action for declared plugins, same behaviour as [`MockPlugin`]
#[derive(Debug, Default)]
pub struct RecordingAction;

impl TargetAction<MockTarget> for RecordingAction {
    fn apply(&self, descriptor: &Descriptor, target: &mut MockTarget) {
        target.add_plugin(descriptor);
    }

    fn remove(&self, descriptor: &Descriptor, target: &mut MockTarget) {
        target.remove_plugin(descriptor);
    }
}

// ===== HELPERS =====

pub fn descriptor(group_id: &str, name: &str, version: Version) -> Descriptor {
    Descriptor::new(group_id, name, version, "").expect("valid test descriptor")
}

/// `group:name:1.0.0` with no requirements
pub fn base_plugin() -> Arc<dyn Plugin<MockTarget>> {
    Arc::new(MockPlugin::new(
        Descriptor::new("group", "name", Version::new(1, 0, 0), "summary")
            .expect("valid base descriptor"),
        vec![],
    ))
}

/// A plugin `g:name:1.0.0` requiring exactly `dependency`
pub fn dependent_on(name: &str, dependency: &Arc<dyn Plugin<MockTarget>>) -> Arc<dyn Plugin<MockTarget>> {
    MockPlugin::arc(
        "g",
        name,
        Version::new(1, 0, 0),
        vec![Requirement::from_exact(dependency.descriptor())],
    )
}

pub fn full_ids(plugins: &[Arc<dyn Plugin<MockTarget>>]) -> Vec<String> {
    plugins.iter().map(|p| p.descriptor().full_id_string()).collect()
}
