//! Formal parameter lists of constructors and methods.
//!
//! A [`Signature`] is the container's replacement for runtime reflection:
//! it records, in declaration order, which parameters name a class (and are
//! therefore resolved by the container) and which are scalars that the
//! caller must supply.

use serde_json::Value as Json;
use std::fmt;

use crate::value::Value;

/// Declared scalar kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScalarType {
    Int,
    Float,
    Bool,
    String,
    Array,
}

impl ScalarType {
    /// Whether `json` is a value of this kind. Integers count as floats.
    pub fn matches(&self, json: &Json) -> bool {
        match self {
            ScalarType::Int => json.is_i64() || json.is_u64(),
            ScalarType::Float => json.is_number(),
            ScalarType::Bool => json.is_boolean(),
            ScalarType::String => json.is_string(),
            ScalarType::Array => json.is_array(),
        }
    }
}

impl fmt::Display for ScalarType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ScalarType::Int => "int",
            ScalarType::Float => "float",
            ScalarType::Bool => "bool",
            ScalarType::String => "string",
            ScalarType::Array => "array",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParamType {
    /// Object-typed parameter, resolved by class name
    Class(String),
    Scalar(ScalarType),
    Untyped,
}

impl fmt::Display for ParamType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParamType::Class(class) => write!(f, "object({})", class),
            ParamType::Scalar(kind) => write!(f, "{}", kind),
            ParamType::Untyped => f.write_str("any value"),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Parameter {
    pub name: String,
    pub position: usize,
    pub ty: ParamType,
    pub default: Option<Json>,
}

impl Parameter {
    pub fn is_object(&self) -> bool {
        matches!(self.ty, ParamType::Class(_))
    }

    /// Whether a caller-supplied value fits this slot. Object-typed slots
    /// are filled by the container, never by the caller.
    pub fn accepts(&self, value: &Value) -> bool {
        match (&self.ty, value) {
            (ParamType::Untyped, _) => true,
            (ParamType::Scalar(kind), Value::Scalar(json)) => kind.matches(json),
            _ => false,
        }
    }

    /// Class name for object-typed parameters
    pub fn class(&self) -> Option<&str> {
        match &self.ty {
            ParamType::Class(class) => Some(class.as_str()),
            _ => None,
        }
    }
}

/// Ordered subsequence of object-typed parameters.
pub fn split_parameters(params: &[Parameter]) -> Vec<&Parameter> {
    params.iter().filter(|param| param.is_object()).collect()
}

/// Builder for a formal parameter list.
///
/// ```
/// use ioc::{Signature, ScalarType};
///
/// let sig = Signature::new()
///     .class("foo", "Foo")
///     .untyped("id")
///     .scalar("name", ScalarType::String)
///     .with_default("anonymous");
///
/// assert_eq!(sig.len(), 3);
/// assert_eq!(sig.object_params().len(), 1);
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Signature {
    params: Vec<Parameter>,
}

impl Signature {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn class(self, name: impl Into<String>, class: impl Into<String>) -> Self {
        self.push(name.into(), ParamType::Class(class.into()))
    }

    pub fn scalar(self, name: impl Into<String>, kind: ScalarType) -> Self {
        self.push(name.into(), ParamType::Scalar(kind))
    }

    pub fn untyped(self, name: impl Into<String>) -> Self {
        self.push(name.into(), ParamType::Untyped)
    }

    /// Default value for the most recently declared parameter.
    /// Ignored for object-typed parameters, which are always resolved.
    pub fn with_default(mut self, value: impl Into<Json>) -> Self {
        if let Some(last) = self.params.last_mut() {
            if !last.is_object() {
                last.default = Some(value.into());
            }
        }
        self
    }

    fn push(mut self, name: String, ty: ParamType) -> Self {
        let position = self.params.len();
        self.params.push(Parameter {
            name,
            position,
            ty,
            default: None,
        });
        self
    }

    pub fn params(&self) -> &[Parameter] {
        &self.params
    }

    pub fn len(&self) -> usize {
        self.params.len()
    }

    pub fn is_empty(&self) -> bool {
        self.params.is_empty()
    }

    pub fn object_params(&self) -> Vec<&Parameter> {
        split_parameters(&self.params)
    }

    pub fn scalar_params(&self) -> Vec<&Parameter> {
        self.params.iter().filter(|param| !param.is_object()).collect()
    }

    /// Class names of object-typed parameters, in order
    pub fn dependencies(&self) -> Vec<&str> {
        self.params.iter().filter_map(Parameter::class).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_split_constructor_parameters() {
        let sig = Signature::new().class("foo", "Foo").class("foz", "Foz");
        let objects = sig.object_params();

        assert_eq!(objects.len(), 2);
        assert_eq!(objects[0].class(), Some("Foo"));
        assert_eq!(objects[1].class(), Some("Foz"));
    }

    #[test]
    fn test_split_method_parameters() {
        let sig = Signature::new()
            .class("foo", "Foo")
            .untyped("id")
            .scalar("name", ScalarType::String);

        let objects = sig.object_params();
        assert_eq!(objects.len(), 1);
        assert_eq!(objects[0].position, 0);

        let scalars = sig.scalar_params();
        assert_eq!(scalars.len(), 2);
        assert_eq!(scalars[0].name, "id");
        assert_eq!(scalars[1].position, 2);
    }

    #[test]
    fn test_split_empty() {
        assert!(split_parameters(&[]).is_empty());
        assert!(Signature::new().dependencies().is_empty());
    }

    #[test]
    fn test_defaults_only_apply_to_scalars() {
        let sig = Signature::new()
            .untyped("retries")
            .with_default(3)
            .class("foo", "Foo")
            .with_default("ignored");

        assert_eq!(sig.params()[0].default, Some(Json::from(3)));
        assert_eq!(sig.params()[1].default, None);
    }

    #[test]
    fn test_scalar_kinds() {
        let id = Signature::new().scalar("id", ScalarType::Int);
        let id = &id.params()[0];

        assert!(id.accepts(&Value::from(13)));
        assert!(!id.accepts(&Value::from("not-an-int")));
        assert!(!id.accepts(&Value::from(1.5)));
        assert!(!id.accepts(&Value::null()));

        assert!(ScalarType::Float.matches(&Json::from(2)));
        assert!(ScalarType::Array.matches(&serde_json::json!([1, 2])));
        assert!(!ScalarType::Bool.matches(&Json::from("true")));

        let any = Signature::new().untyped("name");
        assert!(any.params()[0].accepts(&Value::from("Jack")));
        assert!(any.params()[0].accepts(&Value::null()));

        assert_eq!(ParamType::Scalar(ScalarType::Int).to_string(), "int");
        assert_eq!(ParamType::Class("Foo".into()).to_string(), "object(Foo)");
    }

    fn param_type() -> impl Strategy<Value = ParamType> {
        prop_oneof![
            "[A-Z][a-z]{1,6}".prop_map(ParamType::Class),
            Just(ParamType::Scalar(ScalarType::Int)),
            Just(ParamType::Scalar(ScalarType::String)),
            Just(ParamType::Untyped),
        ]
    }

    proptest! {
        #[test]
        fn prop_split_preserves_order_and_count(types in prop::collection::vec(param_type(), 0..24)) {
            let sig = types.iter().enumerate().fold(Signature::new(), |sig, (i, ty)| match ty {
                ParamType::Class(class) => sig.class(format!("p{}", i), class.clone()),
                ParamType::Scalar(kind) => sig.scalar(format!("p{}", i), *kind),
                ParamType::Untyped => sig.untyped(format!("p{}", i)),
            });

            let expected: Vec<&ParamType> = types
                .iter()
                .filter(|ty| matches!(ty, ParamType::Class(_)))
                .collect();
            let objects = sig.object_params();

            prop_assert_eq!(objects.len(), expected.len());
            prop_assert!(objects.windows(2).all(|w| w[0].position < w[1].position));
            for (param, ty) in objects.iter().zip(expected) {
                prop_assert_eq!(&param.ty, ty);
            }
        }
    }
}
