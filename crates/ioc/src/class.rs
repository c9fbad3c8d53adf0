//! Class descriptors: the container's view of a type.
//!
//! Rust has no runtime reflection, so every class the container can build is
//! described once: its name, its constructor signature and constructor
//! function, and its callable methods. Descriptors are produced with
//! [`ClassBuilder`] or through the [`Injectable`] trait.

use std::{any::Any, collections::HashMap, fmt, sync::Arc};

use crate::{
    errors::{ContainerError, Result},
    signature::Signature,
    value::{Args, Instance, Value},
};

/// Type-erased constructor
pub type Constructor = Arc<dyn Fn(Args) -> Result<Instance> + Send + Sync>;

/// Type-erased method body
pub type MethodFn = Arc<dyn Fn(&Instance, Args) -> Result<Value> + Send + Sync>;

/// Types that describe themselves to the container.
///
/// ```
/// use ioc::{ClassBuilder, ClassDescriptor, Injectable};
///
/// #[derive(Default)]
/// struct Clock;
///
/// impl Injectable for Clock {
///     const CLASS: &'static str = "Clock";
///
///     fn describe() -> ClassDescriptor {
///         ClassBuilder::<Clock>::new(Self::CLASS).build()
///     }
/// }
/// ```
pub trait Injectable: Any + Send + Sync + Sized {
    const CLASS: &'static str;

    fn describe() -> ClassDescriptor;

    /// Wrap a value as an instance of this class
    fn into_instance(self) -> Instance {
        Instance::new(Self::CLASS, self)
    }
}

#[derive(Clone)]
pub struct MethodDescriptor {
    name: String,
    signature: Signature,
    body: MethodFn,
}

impl MethodDescriptor {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn signature(&self) -> &Signature {
        &self.signature
    }

    pub fn call(&self, receiver: &Instance, args: Args) -> Result<Value> {
        (self.body)(receiver, args)
    }
}

impl fmt::Debug for MethodDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MethodDescriptor")
            .field("name", &self.name)
            .field("signature", &self.signature)
            .finish()
    }
}

#[derive(Clone)]
pub struct ClassDescriptor {
    name: String,
    constructor_signature: Signature,
    constructor: Constructor,
    methods: HashMap<String, MethodDescriptor>,
}

impl ClassDescriptor {
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Empty for classes without an explicit constructor
    pub fn constructor_signature(&self) -> &Signature {
        &self.constructor_signature
    }

    pub fn construct(&self, args: Args) -> Result<Instance> {
        (self.constructor)(args)
    }

    pub fn method(&self, name: &str) -> Option<&MethodDescriptor> {
        self.methods.get(name)
    }

    pub fn has_method(&self, name: &str) -> bool {
        self.methods.contains_key(name)
    }

    pub fn method_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.methods.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }
}

impl fmt::Debug for ClassDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClassDescriptor")
            .field("name", &self.name)
            .field("constructor", &self.constructor_signature)
            .field("methods", &self.method_names())
            .finish()
    }
}

/// Builder for [`ClassDescriptor`] over a concrete Rust type `T`.
pub struct ClassBuilder<T> {
    name: String,
    constructor_signature: Signature,
    constructor: Constructor,
    methods: HashMap<String, MethodDescriptor>,
    _marker: std::marker::PhantomData<fn() -> T>,
}

impl<T> ClassBuilder<T>
where
    T: Default + Any + Send + Sync,
{
    /// Class without an explicit constructor: built with `T::default()`.
    pub fn new(name: impl Into<String>) -> Self {
        let name = name.into();
        let class: Arc<str> = Arc::from(name.as_str());
        let constructor: Constructor =
            Arc::new(move |_args| Ok(Instance::new(class.clone(), T::default())));

        Self::from_parts(name, Signature::new(), constructor)
    }
}

impl<T> ClassBuilder<T>
where
    T: Any + Send + Sync,
{
    /// Class with an explicit constructor. `f` receives one argument per
    /// parameter of `signature`, in declaration order.
    pub fn with_constructor<F>(name: impl Into<String>, signature: Signature, f: F) -> Self
    where
        F: Fn(Args) -> anyhow::Result<T> + Send + Sync + 'static,
    {
        let name = name.into();
        let class: Arc<str> = Arc::from(name.as_str());
        let target = format!("{}::__construct", name);
        let constructor: Constructor = Arc::new(move |args| {
            let object = f(args).map_err(|e| ContainerError::from_user(e, &target))?;
            Ok(Instance::new(class.clone(), object))
        });

        Self::from_parts(name, signature, constructor)
    }

    fn from_parts(name: String, constructor_signature: Signature, constructor: Constructor) -> Self {
        Self {
            name,
            constructor_signature,
            constructor,
            methods: HashMap::new(),
            _marker: std::marker::PhantomData,
        }
    }

    /// Register a callable method. The receiver is the resolved instance.
    pub fn method<F>(mut self, name: impl Into<String>, signature: Signature, f: F) -> Self
    where
        F: Fn(&T, Args) -> anyhow::Result<Value> + Send + Sync + 'static,
    {
        let name = name.into();
        let target = format!("{}::{}", self.name, name);
        let body: MethodFn = Arc::new(move |receiver, args| {
            let this = receiver.downcast_ref::<T>().ok_or_else(|| ContainerError::TypeMismatch {
                expected: std::any::type_name::<T>().to_string(),
                actual: receiver.class().to_string(),
            })?;
            f(this, args).map_err(|e| ContainerError::from_user(e, &target))
        });

        self.methods.insert(
            name.clone(),
            MethodDescriptor {
                name,
                signature,
                body,
            },
        );
        self
    }

    pub fn build(self) -> ClassDescriptor {
        ClassDescriptor {
            name: self.name,
            constructor_signature: self.constructor_signature,
            constructor: self.constructor,
            methods: self.methods,
        }
    }
}
