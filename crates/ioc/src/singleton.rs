//! Singleton store: at most one instance per key.
//!
//! Reads go through a shared `RwLock`. Construction on a miss is serialised
//! per key by a dedicated mutex and the store is re-checked under it, so two
//! threads racing for the same key never both run the factory.

use parking_lot::{Mutex, RwLock};
use std::{collections::HashMap, sync::Arc};
use tracing::debug;

use crate::{errors::Result, value::Instance};

#[derive(Clone, Default)]
pub struct SingletonStore {
    instances: Arc<RwLock<HashMap<String, Instance>>>,
    /// Per-key construction locks
    building: Arc<Mutex<HashMap<String, Arc<Mutex<()>>>>>,
}

/// Outcome of [`SingletonStore::get_or_try_insert_with`]
#[derive(Debug, Clone)]
pub enum Lookup {
    Cached(Instance),
    Created(Instance),
}

impl Lookup {
    pub fn into_instance(self) -> Instance {
        match self {
            Lookup::Cached(instance) | Lookup::Created(instance) => instance,
        }
    }

    pub fn was_cached(&self) -> bool {
        matches!(self, Lookup::Cached(_))
    }
}

impl SingletonStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Overwrites any previous entry for `key`
    pub fn insert(&self, key: impl Into<String>, instance: Instance) {
        let key = key.into();
        debug!("Stored singleton {} ({})", key, instance.class());
        self.instances.write().insert(key, instance);
    }

    pub fn get(&self, key: &str) -> Option<Instance> {
        self.instances.read().get(key).cloned()
    }

    pub fn contains(&self, key: &str) -> bool {
        self.instances.read().contains_key(key)
    }

    /// No-op when the key is absent
    pub fn remove(&self, key: &str) -> Option<Instance> {
        self.instances.write().remove(key)
    }

    pub fn len(&self) -> usize {
        self.instances.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.instances.read().is_empty()
    }

    pub fn keys(&self) -> Vec<String> {
        let mut keys: Vec<String> = self.instances.read().keys().cloned().collect();
        keys.sort_unstable();
        keys
    }

    /// Drop every cached instance. Construction gates stay, so a build
    /// already running keeps excluding late arrivals for the same key.
    pub fn clear(&self) {
        self.instances.write().clear();
        debug!("Singleton store cleared");
    }

    /// Return the cached instance for `key`, or build it with `factory` and
    /// cache it. A failing factory leaves the store untouched.
    pub fn get_or_try_insert_with<F>(&self, key: &str, factory: F) -> Result<Lookup>
    where
        F: FnOnce() -> Result<Instance>,
    {
        if let Some(cached) = self.get(key) {
            return Ok(Lookup::Cached(cached));
        }

        let gate = {
            let mut building = self.building.lock();
            building
                .entry(key.to_string())
                .or_insert_with(|| Arc::new(Mutex::new(())))
                .clone()
        };
        let _guard = gate.lock();

        // Double-check: another thread may have finished while we waited
        if let Some(cached) = self.get(key) {
            return Ok(Lookup::Cached(cached));
        }

        let instance = factory()?;
        self.insert(key, instance.clone());
        Ok(Lookup::Created(instance))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::ContainerError;
    use std::sync::{
        atomic::{AtomicUsize, Ordering},
        mpsc,
    };
    use std::time::Duration;

    #[test]
    fn test_insert_get_remove() {
        let store = SingletonStore::new();
        assert!(store.get("Foo").is_none());

        let foo = Instance::new("Foo", 1_i64);
        store.insert("Foo", foo.clone());
        assert!(store.get("Foo").unwrap().ptr_eq(&foo));

        assert!(store.remove("Foo").is_some());
        assert!(store.remove("Foo").is_none());
        assert!(store.get("Foo").is_none());
    }

    #[test]
    fn test_get_or_insert_runs_factory_once() {
        let store = SingletonStore::new();
        let calls = AtomicUsize::new(0);
        let factory = || {
            calls.fetch_add(1, Ordering::SeqCst);
            Ok(Instance::new("Foo", 1_i64))
        };

        let first = store.get_or_try_insert_with("Foo", factory).unwrap();
        let second = store
            .get_or_try_insert_with("Foo", || panic!("factory must not run on a hit"))
            .unwrap();

        assert!(!first.was_cached());
        assert!(second.was_cached());
        assert!(first.into_instance().ptr_eq(&second.into_instance()));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_failed_factory_is_not_cached() {
        let store = SingletonStore::new();
        let result =
            store.get_or_try_insert_with("Foo", || Err(ContainerError::class_not_found("Foo")));

        assert!(result.is_err());
        assert!(!store.contains("Foo"));
    }

    #[test]
    fn test_clear_during_construction_keeps_key_exclusive() {
        let store = SingletonStore::new();
        let calls = AtomicUsize::new(0);
        let (started_tx, started_rx) = mpsc::channel();
        let (release_tx, release_rx) = mpsc::channel::<()>();

        let (store, calls) = (&store, &calls);

        std::thread::scope(|s| {
            let first = s.spawn(move || {
                store.get_or_try_insert_with("Foo", || {
                    calls.fetch_add(1, Ordering::SeqCst);
                    started_tx.send(()).unwrap();
                    release_rx.recv().unwrap();
                    Ok(Instance::new("Foo", 1_i64))
                })
            });

            started_rx.recv().unwrap();
            store.clear();

            let second = s.spawn(move || {
                store.get_or_try_insert_with("Foo", || {
                    calls.fetch_add(1, Ordering::SeqCst);
                    Ok(Instance::new("Foo", 2_i64))
                })
            });

            std::thread::sleep(Duration::from_millis(20));
            release_tx.send(()).unwrap();

            let first = first.join().unwrap().unwrap();
            let second = second.join().unwrap().unwrap();
            assert!(!first.was_cached());
            assert!(second.was_cached());
        });

        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_clear() {
        let store = SingletonStore::new();
        store.insert("a", Instance::new("A", 1_i64));
        store.insert("b", Instance::new("B", 2_i64));
        assert_eq!(store.keys(), vec!["a".to_string(), "b".to_string()]);

        store.clear();
        assert!(store.is_empty());
    }
}
