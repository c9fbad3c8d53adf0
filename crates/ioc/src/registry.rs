use parking_lot::RwLock;
use std::{collections::HashMap, sync::Arc};
use tracing::{debug, warn};

/// Abstract identifier → concrete identifier.
///
/// An unbound identifier resolves to itself.
#[derive(Clone, Default)]
pub struct BindingRegistry {
    bindings: Arc<RwLock<HashMap<String, String>>>,
    warn_on_rebind: bool,
}

impl BindingRegistry {
    pub fn new(warn_on_rebind: bool) -> Self {
        Self {
            bindings: Arc::new(RwLock::new(HashMap::new())),
            warn_on_rebind,
        }
    }

    /// Last registration wins. `concrete = None` binds the identifier to itself.
    pub fn register(&self, abstract_id: &str, concrete: Option<&str>) {
        let concrete = concrete.unwrap_or(abstract_id).to_string();
        let previous = self
            .bindings
            .write()
            .insert(abstract_id.to_string(), concrete.clone());

        match previous {
            Some(old) if old != concrete && self.warn_on_rebind => {
                warn!("Binding {} -> {} replaced by {}", abstract_id, old, concrete);
            }
            _ => debug!("Bound {} -> {}", abstract_id, concrete),
        }
    }

    pub fn resolve(&self, abstract_id: &str) -> String {
        self.bindings
            .read()
            .get(abstract_id)
            .cloned()
            .unwrap_or_else(|| abstract_id.to_string())
    }

    pub fn is_bound(&self, abstract_id: &str) -> bool {
        self.bindings.read().contains_key(abstract_id)
    }

    /// Returns the concrete identifier that was bound, if any
    pub fn unregister(&self, abstract_id: &str) -> Option<String> {
        self.bindings.write().remove(abstract_id)
    }

    pub fn len(&self) -> usize {
        self.bindings.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.bindings.read().is_empty()
    }

    /// Sorted (abstract, concrete) pairs
    pub fn snapshot(&self) -> Vec<(String, String)> {
        let mut pairs: Vec<(String, String)> = self
            .bindings
            .read()
            .iter()
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect();
        pairs.sort();
        pairs
    }

    pub fn clear(&self) {
        self.bindings.write().clear();
    }
}
