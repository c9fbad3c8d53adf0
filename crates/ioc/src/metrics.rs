use serde::Serialize;
use std::sync::{
    atomic::{AtomicU64, Ordering},
    Arc,
};

/// Shared atomic counters
#[derive(Debug, Default)]
struct Counters {
    constructions: AtomicU64,
    singleton_hits: AtomicU64,
    invocations: AtomicU64,
}

#[derive(Debug, Clone, Default)]
pub struct ContainerMetrics {
    counters: Arc<Counters>,
}

impl ContainerMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_construction(&self) {
        self.counters.constructions.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_singleton_hit(&self) {
        self.counters.singleton_hits.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_invocation(&self) {
        self.counters.invocations.fetch_add(1, Ordering::Relaxed);
    }

    pub fn constructions(&self) -> u64 {
        self.counters.constructions.load(Ordering::Relaxed)
    }

    pub fn singleton_hits(&self) -> u64 {
        self.counters.singleton_hits.load(Ordering::Relaxed)
    }

    pub fn invocations(&self) -> u64 {
        self.counters.invocations.load(Ordering::Relaxed)
    }

    pub fn reset(&self) {
        self.counters.constructions.store(0, Ordering::Relaxed);
        self.counters.singleton_hits.store(0, Ordering::Relaxed);
        self.counters.invocations.store(0, Ordering::Relaxed);
    }
}

/// Point-in-time container statistics
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ContainerStats {
    pub name: String,
    pub classes: usize,
    pub bindings: usize,
    pub singletons: usize,
    pub constructions: u64,
    pub singleton_hits: u64,
    pub invocations: u64,
}

impl ContainerStats {
    /// Cache hits relative to every instance handed out (hits + constructions), in percent
    pub fn cache_hit_rate(&self) -> f64 {
        let total = self.singleton_hits + self.constructions;
        if total > 0 {
            (self.singleton_hits as f64 / total as f64) * 100.0
        } else {
            0.0
        }
    }
}
