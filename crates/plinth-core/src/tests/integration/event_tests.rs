#![cfg(test)]

use std::sync::{Arc, Mutex};

use tokio::sync::broadcast::error::RecvError;
use tokio::test;

use crate::event::PluginEvent;
use crate::plugin_system::manager::PluginManager;
use crate::tests::integration::common::{MockTarget, base_plugin, dependent_on};

/// Records `"<event name> <full id>"` for every event the manager emits
fn recorder(manager: &mut PluginManager<MockTarget>) -> Arc<Mutex<Vec<String>>> {
    let seen = Arc::new(Mutex::new(Vec::new()));
    let seen_clone = Arc::clone(&seen);
    manager.on_event(move |event| {
        seen_clone
            .lock().unwrap()
            .push(format!("{} {}", event.name(), event.descriptor()));
    });
    seen
}

#[test]
async fn test_load_emits_known_then_loaded() {
    let mut manager = PluginManager::new(MockTarget::new());
    let seen = recorder(&mut manager);

    manager.load(base_plugin());

    assert_eq!(
        *seen.lock().unwrap(),
        vec![
            "plugin.known group:name:1.0.0",
            "plugin.loaded group:name:1.0.0"
        ]
    );
}

#[test]
async fn test_rejected_load_emits_rejection() {
    let mut manager = PluginManager::new(MockTarget::new());
    let seen = recorder(&mut manager);
    let base = base_plugin();
    let dependent = dependent_on("d", &base);

    manager.load(Arc::clone(&dependent));
    // Known already, so no second known event
    manager.load(Arc::clone(&dependent));

    assert_eq!(
        *seen.lock().unwrap(),
        vec![
            "plugin.known g:d:1.0.0",
            "plugin.rejected g:d:1.0.0",
            "plugin.rejected g:d:1.0.0"
        ]
    );
}

#[test]
async fn test_cascade_emits_unloaded_dependents_first() {
    let mut manager = PluginManager::new(MockTarget::new());
    let base = base_plugin();
    let d1 = dependent_on("d1", &base);
    let d2 = dependent_on("d2", &d1);
    for plugin in [&base, &d1, &d2] {
        manager.load(Arc::clone(plugin));
    }

    let unloaded = Arc::new(Mutex::new(Vec::new()));
    let unloaded_clone = Arc::clone(&unloaded);
    manager.on_named_event("plugin.unloaded", move |event| {
        unloaded_clone
            .lock().unwrap()
            .push(event.descriptor().name().to_string());
    });

    manager.unload(&*base);

    assert_eq!(*unloaded.lock().unwrap(), vec!["d2", "d1", "name"]);
}

#[test]
async fn test_unloading_unknown_plugin_emits_nothing() {
    let mut manager = PluginManager::new(MockTarget::new());
    let seen = recorder(&mut manager);

    manager.unload(&*base_plugin());

    assert!(seen.lock().unwrap().is_empty());
}

#[test]
async fn test_removed_handler_stops_receiving() {
    let mut manager = PluginManager::new(MockTarget::new());
    let count = Arc::new(Mutex::new(0));
    let counter = Arc::clone(&count);
    let id = manager.on_event(move |_| *counter.lock().unwrap() += 1);

    manager.load(base_plugin());
    assert!(manager.remove_handler(id));
    manager.load(dependent_on("d", &base_plugin()));

    assert_eq!(*count.lock().unwrap(), 2);
    assert!(!manager.remove_handler(id));
}

#[test]
async fn test_subscriber_receives_changes() {
    let mut manager = PluginManager::new(MockTarget::new());
    let mut receiver = manager.subscribe();
    let base = base_plugin();

    manager.load(Arc::clone(&base));
    manager.unload(&*base);

    let mut names = Vec::new();
    for _ in 0..3 {
        names.push(receiver.recv().await.unwrap().name());
    }
    assert_eq!(names, vec!["plugin.known", "plugin.loaded", "plugin.unloaded"]);
}

#[test]
async fn test_subscriber_task_sees_channel_close() {
    let mut manager = PluginManager::new(MockTarget::new());
    let mut receiver = manager.subscribe();

    let collector = tokio::spawn(async move {
        let mut events = Vec::new();
        loop {
            match receiver.recv().await {
                Ok(event) => events.push(event),
                Err(RecvError::Closed) => break,
                Err(RecvError::Lagged(_)) => continue,
            }
        }
        events
    });

    let base = base_plugin();
    manager.load(Arc::clone(&base));
    manager.load(dependent_on("d", &base));
    drop(manager);

    let events = collector.await.unwrap();
    assert_eq!(events.len(), 4);
    assert!(matches!(events[3], PluginEvent::Loaded { .. }));
    assert_eq!(events[3].descriptor().name(), "d");
}
