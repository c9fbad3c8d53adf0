use parking_lot::RwLock;
use std::{collections::HashMap, sync::Arc};
use tracing::{debug, warn};

use crate::class::{ClassDescriptor, Injectable};

/// Name → descriptor table consulted by the builder and the invoker.
#[derive(Clone, Default)]
pub struct ClassCatalog {
    classes: Arc<RwLock<HashMap<String, Arc<ClassDescriptor>>>>,
}

impl ClassCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a class, replacing any previous descriptor with the same name
    pub fn define(&self, descriptor: ClassDescriptor) {
        let name = descriptor.name().to_string();
        let previous = self
            .classes
            .write()
            .insert(name.clone(), Arc::new(descriptor));

        if previous.is_some() {
            warn!("Class {} is already defined, overwriting", name);
        } else {
            debug!("Defined class {}", name);
        }
    }

    pub fn define_injectable<T: Injectable>(&self) {
        self.define(T::describe());
    }

    pub fn get(&self, name: &str) -> Option<Arc<ClassDescriptor>> {
        self.classes.read().get(name).cloned()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.classes.read().contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.classes.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.classes.read().is_empty()
    }

    /// Sorted class names
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.classes.read().keys().cloned().collect();
        names.sort_unstable();
        names
    }

    /// Snapshot of all descriptors, sorted by name
    pub fn descriptors(&self) -> Vec<Arc<ClassDescriptor>> {
        let mut all: Vec<Arc<ClassDescriptor>> = self.classes.read().values().cloned().collect();
        all.sort_by(|a, b| a.name().cmp(b.name()));
        all
    }
}
