//! Minimal reflective dependency-injection container.
//!
//! Classes are described to a [`Container`] once (constructor signature,
//! constructor, methods). The container then:
//!
//! - maps abstract names to concrete classes ([`Container::register`]);
//! - builds instances by recursively resolving object-typed constructor
//!   parameters ([`Container::build`]);
//! - caches at most one instance per key ([`Container::build_with_singleton`],
//!   [`Container::singleton`]);
//! - calls methods with resolved objects plus caller scalars
//!   ([`Container::invoke`]).
//!
//! ```
//! use ioc::{ClassBuilder, Container, Signature, Value};
//!
//! #[derive(Default)]
//! struct Greeter;
//!
//! let container = Container::new();
//! container.define(
//!     ClassBuilder::<Greeter>::new("Greeter")
//!         .method("hello", Signature::new().untyped("name"), |_: &Greeter, args| {
//!             Ok(Value::from(format!("Hello, {}", args.str(0)?)))
//!         })
//!         .build(),
//! );
//!
//! let greeting = container
//!     .invoke("Greeter", "hello", vec![Value::from("Jack")])
//!     .unwrap();
//! assert_eq!(greeting, Value::from("Hello, Jack"));
//! ```

pub mod catalog;
pub mod class;
pub mod config;
pub mod container;
pub mod errors;
pub mod graph;
pub mod metrics;
pub mod registry;
pub mod signature;
pub mod singleton;
pub mod value;

pub use catalog::ClassCatalog;
pub use class::{ClassBuilder, ClassDescriptor, Injectable, MethodDescriptor};
pub use config::ContainerConfig;
pub use container::Container;
pub use errors::{ContainerContextExt, ContainerError, Result};
pub use graph::DependencyGraph;
pub use metrics::ContainerStats;
pub use registry::BindingRegistry;
pub use signature::{split_parameters, ParamType, Parameter, ScalarType, Signature};
pub use singleton::SingletonStore;
pub use value::{Args, Instance, Value};
