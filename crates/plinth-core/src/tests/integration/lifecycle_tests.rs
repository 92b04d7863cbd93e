#![cfg(test)]

use std::collections::BTreeMap;
use std::sync::Arc;

use crate::plugin_system::descriptor::Descriptor;
use crate::plugin_system::manager::{LoadRejection, PluginManager};
use crate::plugin_system::manifest::{ManifestFormat, PluginManifest};
use crate::plugin_system::traits::{Plugin, PluginExt, TargetAction};

/// Target holding named commands, each owned by the plugin that added it
#[derive(Debug, Default, PartialEq)]
struct CommandTable {
    commands: BTreeMap<String, String>,
}

/// Adds a fixed set of commands
struct AddCommands(Vec<&'static str>);

impl TargetAction<CommandTable> for AddCommands {
    fn apply(&self, descriptor: &Descriptor, target: &mut CommandTable) {
        for command in &self.0 {
            target
                .commands
                .insert((*command).to_string(), descriptor.id_string());
        }
    }

    fn remove(&self, _descriptor: &Descriptor, target: &mut CommandTable) {
        for command in &self.0 {
            target.commands.remove(*command);
        }
    }
}

fn plugin(manifest: &str, commands: Vec<&'static str>) -> Arc<dyn Plugin<CommandTable>> {
    let manifest = PluginManifest::from_str_with_format(manifest, ManifestFormat::Json).unwrap();
    Arc::new(manifest.into_plugin(AddCommands(commands)).unwrap())
}

fn core_plugin() -> Arc<dyn Plugin<CommandTable>> {
    plugin(
        r#"{ "plugin": { "group-id": "org.tools", "name": "core", "version": "1.4.0" } }"#,
        vec!["help", "quit"],
    )
}

fn git_plugin() -> Arc<dyn Plugin<CommandTable>> {
    plugin(
        r#"{
            "plugin": { "group-id": "org.tools", "name": "git", "version": "0.3.0", "summary": "Git commands" },
            "requires": [ { "group-id": "org.tools", "name": "core", "min-version": "1.2.0" } ]
        }"#,
        vec!["commit", "push"],
    )
}

fn review_plugin() -> Arc<dyn Plugin<CommandTable>> {
    plugin(
        r#"{
            "plugin": { "group-id": "org.review", "name": "review", "version": "2.0.0" },
            "requires": [
                { "group-id": "org.tools", "name": "core", "min-version": "1.0.0" },
                { "group-id": "org.tools", "name": "git", "min-version": "0.3.0" }
            ]
        }"#,
        vec!["approve"],
    )
}

#[test]
fn test_declared_plugins_full_lifecycle() {
    let mut manager = PluginManager::new(CommandTable::default());
    let core = core_plugin();
    let git = git_plugin();
    let review = review_plugin();

    assert!(git.depends_on(&*core));
    assert!(review.depends_on(&*git));
    assert!(!core.depends_on(&*review));

    for plugin in [&core, &git, &review] {
        assert!(manager.load(Arc::clone(plugin)).is_loaded());
    }
    assert_eq!(manager.target().commands.len(), 5);
    assert_eq!(manager.target().commands["approve"], "org.review:review");

    let removed = manager.unload(&*git);

    let removed_names: Vec<&str> = removed.iter().map(|p| p.descriptor().name()).collect();
    assert_eq!(removed_names, vec!["review", "git"]);
    assert!(manager.is_loaded(&*core));
    assert_eq!(
        manager.target().commands.keys().collect::<Vec<_>>(),
        vec!["help", "quit"]
    );

    manager.unload(&*core);
    assert_eq!(manager.target(), &CommandTable::default());
    assert_eq!(manager.known_count(), 3);
}

#[test]
fn test_load_order_matters() {
    let mut manager = PluginManager::new(CommandTable::default());
    let core = core_plugin();
    let git = git_plugin();

    let outcome = manager.load(Arc::clone(&git));
    assert!(matches!(
        outcome.rejection(),
        Some(LoadRejection::UnmetRequirements { missing }) if missing.len() == 1
    ));
    assert!(manager.load(Arc::clone(&core)).is_loaded());

    // The first attempt claimed "org.tools:git" for good, even a fresh object is refused
    let fresh_git = git_plugin();
    assert_eq!(
        manager.check_load(&*fresh_git),
        Err(LoadRejection::DuplicateId {
            id: "org.tools:git".to_string()
        })
    );
    assert!(manager.target().commands.get("commit").is_none());
}

#[test]
fn test_unloading_leaf_keeps_target_consistent() {
    let mut manager = PluginManager::new(CommandTable::default());
    let core = core_plugin();
    let git = git_plugin();
    manager.load(Arc::clone(&core));
    manager.load(Arc::clone(&git));

    let before_git = {
        let mut table = CommandTable::default();
        core.apply_to(&mut table);
        table
    };

    manager.unload(&*git);
    assert_eq!(manager.target(), &before_git);
}

#[test]
fn test_incompatible_major_version_blocks_load() {
    let mut manager = PluginManager::new(CommandTable::default());
    manager.load(plugin(
        r#"{ "plugin": { "group-id": "org.tools", "name": "core", "version": "2.0.0" } }"#,
        vec!["help"],
    ));

    let git = git_plugin();
    assert!(!manager.can_load(&*git));
    assert_eq!(manager.loaded_count(), 1);
}
