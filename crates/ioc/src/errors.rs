//! Error handling for the container.
//!
//! Every public operation returns [`Result<T>`] with a [`ContainerError`].
//! Resolution failures are deterministic: the container never retries and
//! never falls back to another resolution path, errors go straight back to
//! the caller.
//!
//! User supplied constructors and methods return `anyhow::Result`. A
//! `ContainerError` raised inside them (for example by an [`Args`] accessor)
//! travels through `anyhow` and is recovered unchanged by
//! [`ContainerError::from_user`]; anything else becomes
//! [`ContainerError::CallFailed`].
//!
//! [`Args`]: crate::Args

use anyhow::Context;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, ContainerError>;

/// Error type for every container operation
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ContainerError {
    /// `singleton()` got a scalar where a constructed object was required
    #[error("Invalid argument type: expected an object instance, got {actual}")]
    InvalidArgumentType { actual: String },

    /// Class is missing from the catalog
    #[error("Class '{class}' not found")]
    ClassNotFound { class: String },

    /// `invoke()` could not reach its target (missing class or missing method)
    #[error("Invocation target error for {}: {reason}", target_label(.class, .method))]
    InvocationTarget {
        class: String,
        method: Option<String>,
        reason: String,
    },

    #[error("Cyclic dependency detected: {}", .chain.join(" -> "))]
    CyclicDependency { chain: Vec<String> },

    /// Argument mismatch or a failing user constructor/method
    #[error("Call to {target} failed: {reason}")]
    CallFailed { target: String, reason: String },

    #[error("Type mismatch: expected {expected}, got {actual}")]
    TypeMismatch { expected: String, actual: String },

    #[error("Configuration error: {message}")]
    Configuration { message: String },
}

fn target_label(class: &str, method: &Option<String>) -> String {
    match method {
        Some(method) => format!("{}::{}", class, method),
        None => class.to_string(),
    }
}

impl ContainerError {
    pub fn class_not_found(class: impl Into<String>) -> Self {
        ContainerError::ClassNotFound {
            class: class.into(),
        }
    }

    /// `class` could not be resolved because `missing` (the class itself or
    /// one of its constructor dependencies) is not in the catalog
    pub fn missing_class_target(class: impl Into<String>, missing: &str) -> Self {
        ContainerError::InvocationTarget {
            class: class.into(),
            method: None,
            reason: format!("class '{}' not found", missing),
        }
    }

    /// An object-typed parameter of `class::method` names a class that is
    /// not in the catalog
    pub fn missing_argument_target(
        class: impl Into<String>,
        method: impl Into<String>,
        missing: &str,
    ) -> Self {
        ContainerError::InvocationTarget {
            class: class.into(),
            method: Some(method.into()),
            reason: format!("argument class '{}' not found", missing),
        }
    }

    pub fn missing_method_target(class: impl Into<String>, method: impl Into<String>) -> Self {
        ContainerError::InvocationTarget {
            class: class.into(),
            method: Some(method.into()),
            reason: "method not found".to_string(),
        }
    }

    pub fn call_failed(target: impl Into<String>, reason: impl Into<String>) -> Self {
        ContainerError::CallFailed {
            target: target.into(),
            reason: reason.into(),
        }
    }

    pub fn configuration(message: impl Into<String>) -> Self {
        ContainerError::Configuration {
            message: message.into(),
        }
    }

    /// Unwrap an error returned by a user constructor or method.
    pub fn from_user(err: anyhow::Error, target: &str) -> Self {
        match err.downcast::<ContainerError>() {
            Ok(inner) => inner,
            Err(other) => ContainerError::call_failed(target, format!("{:#}", other)),
        }
    }

    /// Stable label for monitoring and tests
    pub fn category(&self) -> &'static str {
        match self {
            ContainerError::InvalidArgumentType { .. } => "invalid_argument",
            ContainerError::ClassNotFound { .. } => "class_not_found",
            ContainerError::InvocationTarget { .. } => "invocation_target",
            ContainerError::CyclicDependency { .. } => "cyclic_dependency",
            ContainerError::CallFailed { .. } => "call_failed",
            ContainerError::TypeMismatch { .. } => "type_mismatch",
            ContainerError::Configuration { .. } => "configuration",
        }
    }
}

/// Attach `anyhow` context to container errors
pub trait ContainerContextExt<T> {
    fn container_context(self, message: &str) -> anyhow::Result<T>;
}

impl<T> ContainerContextExt<T> for Result<T> {
    fn container_context(self, message: &str) -> anyhow::Result<T> {
        self.map_err(anyhow::Error::from)
            .with_context(|| message.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invocation_target_messages() {
        let missing_class = ContainerError::missing_class_target("Baz", "Baz");
        assert_eq!(missing_class.category(), "invocation_target");
        assert_eq!(
            missing_class.to_string(),
            "Invocation target error for Baz: class 'Baz' not found"
        );

        let missing_dependency = ContainerError::missing_class_target("Orphan", "Ghost");
        assert!(missing_dependency.to_string().contains("class 'Ghost' not found"));

        let missing_argument = ContainerError::missing_argument_target("Host", "run", "Ghost");
        assert!(missing_argument.to_string().contains("Host::run"));
        assert!(missing_argument.to_string().contains("'Ghost'"));

        let missing_method = ContainerError::missing_method_target("Bar", "f3");
        assert!(missing_method.to_string().contains("Bar::f3"));
        assert!(missing_method.to_string().contains("method not found"));
    }

    #[test]
    fn test_cycle_message_lists_chain() {
        let error = ContainerError::CyclicDependency {
            chain: vec!["A".into(), "B".into(), "A".into()],
        };
        assert_eq!(error.to_string(), "Cyclic dependency detected: A -> B -> A");
    }

    #[test]
    fn test_from_user_keeps_container_errors() {
        let inner = ContainerError::class_not_found("Missing");
        let recovered = ContainerError::from_user(anyhow::Error::from(inner.clone()), "Bar::new");
        assert_eq!(recovered, inner);

        let foreign = ContainerError::from_user(anyhow::anyhow!("disk on fire"), "Bar::new");
        match foreign {
            ContainerError::CallFailed { target, reason } => {
                assert_eq!(target, "Bar::new");
                assert!(reason.contains("disk on fire"));
            }
            other => panic!("Expected CallFailed, got {:?}", other),
        }
    }

    #[test]
    fn test_error_chaining() {
        let result: Result<()> = Err(ContainerError::class_not_found("Foo"));
        let chained = result.container_context("During bootstrap");

        let message = format!("{:#}", chained.unwrap_err());
        assert!(message.contains("During bootstrap"));
        assert!(message.contains("Foo"));
    }
}
