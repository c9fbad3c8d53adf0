//! The container: binding registry, singleton store, instance builder and
//! invoker over a [`ClassCatalog`].
//!
//! Resolution of a requested name:
//! 1. the binding registry maps it to a concrete class (or itself);
//! 2. on the singleton path, a cached instance under the concrete name is
//!    returned as is;
//! 3. otherwise the concrete constructor's object-typed parameters are built
//!    recursively (depth-first, left to right) and the constructor is called.
//!
//! `Container` is a cheap handle: clones share catalog, bindings, singletons
//! and metrics.

use std::{fmt, sync::Arc};
use tracing::debug;

use crate::{
    catalog::ClassCatalog,
    class::{ClassDescriptor, Injectable},
    config::ContainerConfig,
    errors::{ContainerError, Result},
    graph::DependencyGraph,
    metrics::{ContainerMetrics, ContainerStats},
    registry::BindingRegistry,
    signature::Signature,
    singleton::SingletonStore,
    value::{Args, Instance, Value},
};

/// Classes currently under construction, outermost first.
struct ResolutionStack {
    path: Vec<String>,
    enabled: bool,
}

impl ResolutionStack {
    fn new(enabled: bool) -> Self {
        Self {
            path: Vec::new(),
            enabled,
        }
    }

    fn enter(&mut self, class: &str) -> Result<()> {
        if !self.enabled {
            return Ok(());
        }
        if let Some(start) = self.path.iter().position(|c| c == class) {
            let mut chain = self.path[start..].to_vec();
            chain.push(class.to_string());
            return Err(ContainerError::CyclicDependency { chain });
        }
        self.path.push(class.to_string());
        Ok(())
    }

    fn leave(&mut self) {
        if self.enabled {
            self.path.pop();
        }
    }
}

#[derive(Clone)]
pub struct Container {
    config: Arc<ContainerConfig>,
    catalog: ClassCatalog,
    bindings: BindingRegistry,
    singletons: SingletonStore,
    metrics: ContainerMetrics,
}

impl Container {
    pub fn new() -> Self {
        Self::with_config(ContainerConfig::default())
    }

    pub fn with_config(config: ContainerConfig) -> Self {
        debug!(
            "Creating container {} (detect_cycles={})",
            config.name, config.detect_cycles
        );
        Self {
            bindings: BindingRegistry::new(config.warn_on_rebind),
            config: Arc::new(config),
            catalog: ClassCatalog::new(),
            singletons: SingletonStore::new(),
            metrics: ContainerMetrics::new(),
        }
    }

    pub fn config(&self) -> &ContainerConfig {
        &self.config
    }

    pub fn catalog(&self) -> &ClassCatalog {
        &self.catalog
    }

    // ---- class catalog ----

    pub fn define(&self, descriptor: ClassDescriptor) -> &Self {
        self.catalog.define(descriptor);
        self
    }

    pub fn define_injectable<T: Injectable>(&self) -> &Self {
        self.catalog.define_injectable::<T>();
        self
    }

    pub fn has_class(&self, name: &str) -> bool {
        self.catalog.contains(name)
    }

    // ---- binding registry ----

    /// Bind `abstract_id` to `concrete` (or to itself). Last registration wins.
    pub fn register(&self, abstract_id: &str, concrete: Option<&str>) {
        self.bindings.register(abstract_id, concrete);
    }

    /// Bind and eagerly build: the new instance is stored as a singleton
    /// under `abstract_id`.
    pub fn register_singleton(&self, abstract_id: &str, concrete: Option<&str>) -> Result<Instance> {
        self.register(abstract_id, concrete);
        let instance = self.build(abstract_id)?;
        self.singletons.insert(abstract_id, instance.clone());
        Ok(instance)
    }

    pub fn unregister(&self, abstract_id: &str) -> Option<String> {
        self.bindings.unregister(abstract_id)
    }

    /// Bound concrete identifier, or `abstract_id` unchanged
    pub fn resolve_binding(&self, abstract_id: &str) -> String {
        self.bindings.resolve(abstract_id)
    }

    pub fn bindings(&self) -> Vec<(String, String)> {
        self.bindings.snapshot()
    }

    // ---- singleton store ----

    /// Register an existing instance as a singleton.
    ///
    /// Stored under `key`, or under the instance's concrete class name.
    /// Scalars are rejected with [`ContainerError::InvalidArgumentType`].
    pub fn singleton(&self, value: impl Into<Value>, key: Option<&str>) -> Result<()> {
        match value.into() {
            Value::Object(instance) => {
                let key = key.unwrap_or_else(|| instance.class()).to_string();
                self.singletons.insert(key, instance);
                Ok(())
            }
            scalar => Err(ContainerError::InvalidArgumentType {
                actual: scalar.kind(),
            }),
        }
    }

    pub fn get_singleton(&self, key: &str) -> Option<Instance> {
        self.singletons.get(key)
    }

    pub fn get_singleton_as<T>(&self, key: &str) -> Option<Arc<T>>
    where
        T: std::any::Any + Send + Sync,
    {
        self.singletons.get(key).and_then(|instance| instance.downcast::<T>())
    }

    /// No-op when nothing is stored under `key`
    pub fn unset_singleton(&self, key: &str) {
        if self.singletons.remove(key).is_some() {
            debug!("Removed singleton {}", key);
        }
    }

    pub fn clear_singletons(&self) {
        self.singletons.clear();
    }

    /// Drop singletons, bindings and counters; the catalog is kept
    pub fn reset(&self) {
        self.singletons.clear();
        self.bindings.clear();
        self.metrics.reset();
        debug!("Container {} reset", self.config.name);
    }

    // ---- instance builder ----

    /// Build a fresh instance of `type_id` (after binding resolution).
    pub fn build(&self, type_id: &str) -> Result<Instance> {
        let mut stack = ResolutionStack::new(self.config.detect_cycles);
        self.build_in(type_id, &mut stack)
    }

    /// Like [`build`](Self::build), but reuses and fills the singleton store
    /// under the concrete class name.
    pub fn build_with_singleton(&self, type_id: &str) -> Result<Instance> {
        let concrete = self.resolve_binding(type_id);
        let lookup = self.singletons.get_or_try_insert_with(&concrete, || {
            let mut stack = ResolutionStack::new(self.config.detect_cycles);
            self.construct(&concrete, &mut stack)
        })?;

        if lookup.was_cached() {
            self.metrics.record_singleton_hit();
            debug!("Singleton cache hit for {}", concrete);
        }
        Ok(lookup.into_instance())
    }

    /// Fresh typed instance
    pub fn make<T: Injectable>(&self) -> Result<Arc<T>> {
        self.build(T::CLASS)?.try_downcast::<T>()
    }

    /// Shared typed instance from the singleton path
    pub fn resolve<T: Injectable>(&self) -> Result<Arc<T>> {
        self.build_with_singleton(T::CLASS)?.try_downcast::<T>()
    }

    fn build_in(&self, type_id: &str, stack: &mut ResolutionStack) -> Result<Instance> {
        let concrete = self.resolve_binding(type_id);
        self.construct(&concrete, stack)
    }

    fn construct(&self, concrete: &str, stack: &mut ResolutionStack) -> Result<Instance> {
        let descriptor = self
            .catalog
            .get(concrete)
            .ok_or_else(|| ContainerError::class_not_found(concrete))?;

        stack.enter(concrete)?;
        let target = format!("{}::__construct", concrete);
        let result = self
            .assemble_args(&target, descriptor.constructor_signature(), Vec::new(), stack)
            .and_then(|args| descriptor.construct(args));
        stack.leave();

        let instance = result?;
        self.metrics.record_construction();
        debug!("Constructed {}", concrete);
        Ok(instance)
    }

    /// One value per declared parameter: object slots are built, scalar
    /// slots take `extra` in order, then declared defaults. A caller value
    /// must fit the slot's declared scalar kind.
    fn assemble_args(
        &self,
        target: &str,
        signature: &Signature,
        extra: Vec<Value>,
        stack: &mut ResolutionStack,
    ) -> Result<Args> {
        let supplied = extra.len();
        let mut extra = extra.into_iter();
        let mut values = Vec::with_capacity(signature.len());

        for param in signature.params() {
            if let Some(class) = param.class() {
                values.push(Value::Object(self.build_in(class, stack)?));
                continue;
            }

            match (extra.next(), &param.default) {
                (Some(value), _) if param.accepts(&value) => values.push(value),
                (Some(value), _) => {
                    return Err(ContainerError::call_failed(
                        target,
                        format!(
                            "argument ${} at position {} expects {}, got {}",
                            param.name,
                            param.position,
                            param.ty,
                            value.kind()
                        ),
                    ))
                }
                (None, Some(default)) => values.push(Value::Scalar(default.clone())),
                (None, None) => {
                    return Err(ContainerError::call_failed(
                        target,
                        format!(
                            "missing argument ${} at position {} ({} supplied)",
                            param.name, param.position, supplied
                        ),
                    ))
                }
            }
        }

        let leftover = extra.count();
        if leftover > 0 {
            return Err(ContainerError::call_failed(
                target,
                format!(
                    "too many arguments: {} supplied, {} scalar parameter(s) declared",
                    supplied,
                    signature.scalar_params().len()
                ),
            ));
        }

        Ok(Args::new(target, values))
    }

    // ---- invoker ----

    /// Resolve `type_id` through the singleton path and call `method` on it.
    ///
    /// Object-typed method parameters are built fresh (no singleton cache);
    /// the remaining parameters take `extra` in order. Any class missing from
    /// the catalog on the way is reported as
    /// [`ContainerError::InvocationTarget`].
    pub fn invoke(&self, type_id: &str, method: &str, extra: Vec<Value>) -> Result<Value> {
        let instance = self.build_with_singleton(type_id).map_err(|err| match err {
            ContainerError::ClassNotFound { class } => {
                ContainerError::missing_class_target(type_id, &class)
            }
            other => other,
        })?;

        let descriptor = self.catalog.get(instance.class()).ok_or_else(|| {
            ContainerError::missing_class_target(instance.class(), instance.class())
        })?;
        let method_descriptor = descriptor
            .method(method)
            .ok_or_else(|| ContainerError::missing_method_target(descriptor.name(), method))?;

        let target = format!("{}::{}", descriptor.name(), method);
        let mut stack = ResolutionStack::new(self.config.detect_cycles);
        let args = self
            .assemble_args(&target, method_descriptor.signature(), extra, &mut stack)
            .map_err(|err| match err {
                ContainerError::ClassNotFound { class } => {
                    ContainerError::missing_argument_target(descriptor.name(), method, &class)
                }
                other => other,
            })?;

        self.metrics.record_invocation();
        debug!("Invoking {} with {} argument(s)", target, args.len());
        method_descriptor.call(&instance, args)
    }

    // ---- validation & diagnostics ----

    /// Constructor dependencies of every catalogued class, after binding
    /// resolution.
    pub fn dependency_graph(&self) -> DependencyGraph {
        let mut graph = DependencyGraph::new();
        for descriptor in self.catalog.descriptors() {
            graph.add_node(descriptor.name());
            for dependency in descriptor.constructor_signature().dependencies() {
                graph.add_dependency(descriptor.name(), &self.resolve_binding(dependency));
            }
        }
        graph
    }

    /// Fails on the first constructor cycle, then on the first dependency
    /// missing from the catalog.
    pub fn validate_dependencies(&self) -> Result<()> {
        let graph = self.dependency_graph();

        if let Some(chain) = graph.find_cycles().into_iter().next() {
            return Err(ContainerError::CyclicDependency { chain });
        }

        for class in graph.topological_sort()? {
            if !self.catalog.contains(&class) {
                return Err(ContainerError::class_not_found(class));
            }
        }

        debug!("Dependency validation passed for {}", self.config.name);
        Ok(())
    }

    /// Snapshot of sizes and counters
    pub fn stats(&self) -> ContainerStats {
        ContainerStats {
            name: self.config.name.clone(),
            classes: self.catalog.len(),
            bindings: self.bindings.len(),
            singletons: self.singletons.len(),
            constructions: self.metrics.constructions(),
            singleton_hits: self.metrics.singleton_hits(),
            invocations: self.metrics.invocations(),
        }
    }
}

impl Default for Container {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Container {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Container")
            .field("config", &self.config)
            .field("classes", &self.catalog.names())
            .field("bindings", &self.bindings.snapshot())
            .field("singletons", &self.singletons.keys())
            .finish()
    }
}
