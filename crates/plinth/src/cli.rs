use std::cmp::Ordering;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use log::{debug, info};
use plinth_core::plugin_system::error::Result;
use plinth_core::{
    Descriptor, Plugin, PluginManager, PluginManifest, Requirement, TargetAction, Version,
};

/// Target of `plinth simulate`: the ids of the plugins currently applied, in
/// the order they were applied.
#[derive(Debug, Default)]
pub struct Simulation {
    applied: Vec<String>,
}

impl Simulation {
    pub fn applied(&self) -> &[String] {
        &self.applied
    }
}

/// Adds the plugin's full id to a [`Simulation`] and takes it out again.
#[derive(Debug, Clone, Copy, Default)]
pub struct Announce;

impl TargetAction<Simulation> for Announce {
    fn apply(&self, descriptor: &Descriptor, target: &mut Simulation) {
        target.applied.push(descriptor.full_id_string());
    }

    fn remove(&self, descriptor: &Descriptor, target: &mut Simulation) {
        let id = descriptor.full_id_string();
        if let Some(pos) = target.applied.iter().position(|a| *a == id) {
            target.applied.remove(pos);
        }
    }
}

/// Check each manifest, printing one line per file. Returns whether all were valid.
pub fn validate(manifests: &[PathBuf]) -> bool {
    let mut all_valid = true;
    for path in manifests {
        match read_declaration(path) {
            Ok((descriptor, requirements)) => {
                println!("ok {} ({} requirements)", descriptor, requirements.len());
                for requirement in &requirements {
                    println!("  requires {}", requirement);
                }
            }
            Err(e) => {
                eprintln!("error: {}", e);
                all_valid = false;
            }
        }
    }
    all_valid
}

fn read_declaration(path: &Path) -> Result<(Descriptor, Vec<Requirement>)> {
    let manifest = PluginManifest::from_path(path)?;
    Ok((manifest.descriptor()?, manifest.requirements()))
}

/// Load the manifests in order, then unload the given `group:name` ids.
///
/// Returns `Ok(false)` if an id to unload was never loaded.
pub fn simulate(manifests: &[PathBuf], unload: &[String]) -> Result<bool> {
    let plugins = manifests
        .iter()
        .map(|path| -> Result<Arc<dyn Plugin<Simulation>>> {
            let manifest = PluginManifest::from_path(path)?;
            Ok(Arc::new(manifest.into_plugin(Announce)?))
        })
        .collect::<Result<Vec<_>>>()?;
    debug!("Simulating {} plugins", plugins.len());

    let mut manager = PluginManager::new(Simulation::default());
    for plugin in plugins {
        let descriptor = plugin.descriptor().clone();
        let outcome = manager.load(plugin);
        match outcome.rejection() {
            None => println!("loaded {}", descriptor),
            Some(reason) => println!("rejected {}: {}", descriptor, reason),
        }
    }

    let mut all_found = true;
    for id in unload {
        let Some(plugin) = manager.find_known(id) else {
            eprintln!("error: no known plugin with id '{}'", id);
            all_found = false;
            continue;
        };
        if !manager.is_loaded(&*plugin) {
            eprintln!("error: plugin {} is not loaded", plugin.descriptor());
            all_found = false;
            continue;
        }
        info!("Unloading {}", plugin.descriptor());
        for removed in manager.unload(&*plugin) {
            println!("unloaded {}", removed.descriptor());
        }
    }

    println!(
        "{} known, {} loaded",
        manager.known_count(),
        manager.loaded_count()
    );
    for applied in manager.target().applied() {
        println!("  applied {}", applied);
    }
    Ok(all_found)
}

/// Print how two version strings order
pub fn compare(a: &str, b: &str) -> Result<()> {
    let left = Version::parse(a)?;
    let right = Version::parse(b)?;
    let symbol = match left.cmp(&right) {
        Ordering::Less => "<",
        Ordering::Equal => "=",
        Ordering::Greater => ">",
    };
    println!("{} {} {}", left, symbol, right);
    Ok(())
}
