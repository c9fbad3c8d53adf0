//! Runtime values passed through the container.
//!
//! An [`Instance`] is a constructed object: a shared, type-erased
//! `Arc<dyn Any + Send + Sync>` tagged with the name of its concrete class.
//! A [`Value`] is either such an object or a scalar (`serde_json::Value`),
//! which is what callers hand to `invoke()` and what methods return.

use serde_json::Value as Json;
use std::{any::Any, fmt, sync::Arc};

use crate::errors::{ContainerError, Result};

/// A constructed object together with its concrete class name.
#[derive(Clone)]
pub struct Instance {
    class: Arc<str>,
    object: Arc<dyn Any + Send + Sync>,
}

impl Instance {
    pub fn new<T>(class: impl Into<Arc<str>>, object: T) -> Self
    where
        T: Any + Send + Sync,
    {
        Self {
            class: class.into(),
            object: Arc::new(object),
        }
    }

    /// Wrap an already shared object without re-allocating it.
    pub fn from_arc<T>(class: impl Into<Arc<str>>, object: Arc<T>) -> Self
    where
        T: Any + Send + Sync,
    {
        Self {
            class: class.into(),
            object,
        }
    }

    /// Concrete class name
    pub fn class(&self) -> &str {
        &self.class
    }

    pub fn is<T: Any>(&self) -> bool {
        self.object.is::<T>()
    }

    pub fn downcast_ref<T: Any>(&self) -> Option<&T> {
        self.object.downcast_ref::<T>()
    }

    pub fn downcast<T>(&self) -> Option<Arc<T>>
    where
        T: Any + Send + Sync,
    {
        self.object.clone().downcast::<T>().ok()
    }

    pub fn try_downcast<T>(&self) -> Result<Arc<T>>
    where
        T: Any + Send + Sync,
    {
        self.downcast::<T>().ok_or_else(|| ContainerError::TypeMismatch {
            expected: std::any::type_name::<T>().to_string(),
            actual: self.class.to_string(),
        })
    }

    /// Identity, not equality.
    pub fn ptr_eq(&self, other: &Instance) -> bool {
        Arc::ptr_eq(&self.object, &other.object)
    }
}

impl fmt::Debug for Instance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Instance")
            .field("class", &self.class)
            .field("ptr", &Arc::as_ptr(&self.object))
            .finish()
    }
}

/// Argument or return value of a container call.
#[derive(Debug, Clone)]
pub enum Value {
    Object(Instance),
    Scalar(Json),
}

impl Value {
    pub fn null() -> Self {
        Value::Scalar(Json::Null)
    }

    pub fn is_object(&self) -> bool {
        matches!(self, Value::Object(_))
    }

    pub fn as_instance(&self) -> Option<&Instance> {
        match self {
            Value::Object(instance) => Some(instance),
            Value::Scalar(_) => None,
        }
    }

    pub fn as_scalar(&self) -> Option<&Json> {
        match self {
            Value::Scalar(json) => Some(json),
            Value::Object(_) => None,
        }
    }

    pub fn into_instance(self) -> Option<Instance> {
        match self {
            Value::Object(instance) => Some(instance),
            Value::Scalar(_) => None,
        }
    }

    /// Short description used in error messages
    pub fn kind(&self) -> String {
        match self {
            Value::Object(instance) => format!("object({})", instance.class()),
            Value::Scalar(Json::Null) => "null".to_string(),
            Value::Scalar(Json::Bool(_)) => "bool".to_string(),
            Value::Scalar(Json::Number(_)) => "number".to_string(),
            Value::Scalar(Json::String(s)) => format!("string({:?})", s),
            Value::Scalar(Json::Array(_)) => "array".to_string(),
            Value::Scalar(Json::Object(_)) => "map".to_string(),
        }
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Object(a), Value::Object(b)) => a.ptr_eq(b),
            (Value::Scalar(a), Value::Scalar(b)) => a == b,
            _ => false,
        }
    }
}

impl From<Instance> for Value {
    fn from(instance: Instance) -> Self {
        Value::Object(instance)
    }
}

impl From<Json> for Value {
    fn from(json: Json) -> Self {
        Value::Scalar(json)
    }
}

macro_rules! scalar_from {
    ($($ty:ty),*) => {
        $(
            impl From<$ty> for Value {
                fn from(value: $ty) -> Self {
                    Value::Scalar(Json::from(value))
                }
            }
        )*
    };
}

scalar_from!(bool, i32, i64, u32, u64, f64, String, &str);

/// Positional arguments handed to a constructor or method.
///
/// Slots follow declaration order of the signature: object-typed slots hold
/// resolved instances, the rest hold caller scalars or declared defaults.
#[derive(Debug, Clone)]
pub struct Args {
    target: String,
    values: Vec<Value>,
}

impl Args {
    pub fn new(target: impl Into<String>, values: Vec<Value>) -> Self {
        Self {
            target: target.into(),
            values,
        }
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn get(&self, index: usize) -> Result<&Value> {
        self.values.get(index).ok_or_else(|| {
            ContainerError::call_failed(
                &self.target,
                format!("missing argument #{} ({} supplied)", index, self.values.len()),
            )
        })
    }

    pub fn object<T>(&self, index: usize) -> Result<Arc<T>>
    where
        T: Any + Send + Sync,
    {
        let value = self.get(index)?;
        let instance = value.as_instance().ok_or_else(|| {
            ContainerError::call_failed(
                &self.target,
                format!("argument #{} must be an object, got {}", index, value.kind()),
            )
        })?;
        instance.try_downcast::<T>()
    }

    pub fn scalar(&self, index: usize) -> Result<&Json> {
        let value = self.get(index)?;
        value.as_scalar().ok_or_else(|| {
            ContainerError::call_failed(
                &self.target,
                format!("argument #{} must be a scalar, got {}", index, value.kind()),
            )
        })
    }

    pub fn int(&self, index: usize) -> Result<i64> {
        let json = self.scalar(index)?;
        json.as_i64().ok_or_else(|| self.wrong_scalar(index, "integer", json))
    }

    pub fn float(&self, index: usize) -> Result<f64> {
        let json = self.scalar(index)?;
        json.as_f64().ok_or_else(|| self.wrong_scalar(index, "float", json))
    }

    pub fn bool(&self, index: usize) -> Result<bool> {
        let json = self.scalar(index)?;
        json.as_bool().ok_or_else(|| self.wrong_scalar(index, "bool", json))
    }

    pub fn str(&self, index: usize) -> Result<&str> {
        let json = self.scalar(index)?;
        json.as_str().ok_or_else(|| self.wrong_scalar(index, "string", json))
    }

    /// Scalar rendered the way string interpolation would print it
    pub fn display(&self, index: usize) -> Result<String> {
        Ok(match self.scalar(index)? {
            Json::String(s) => s.clone(),
            Json::Null => String::new(),
            other => other.to_string(),
        })
    }

    fn wrong_scalar(&self, index: usize, expected: &str, actual: &Json) -> ContainerError {
        ContainerError::call_failed(
            &self.target,
            format!("argument #{} must be {}, got {}", index, expected, actual),
        )
    }
}
