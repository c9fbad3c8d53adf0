//! Fixture classes shared by the integration tests.

#![allow(dead_code)]

use ioc::{ClassBuilder, ClassDescriptor, Container, Injectable, Signature, Value};
use parking_lot::RwLock;

#[derive(Debug, Clone, PartialEq)]
pub struct Foo {
    pub a: i64,
    pub b: i64,
}

impl Default for Foo {
    fn default() -> Self {
        Self { a: 1, b: 2 }
    }
}

impl Injectable for Foo {
    const CLASS: &'static str = "Foo";

    fn describe() -> ClassDescriptor {
        ClassBuilder::<Foo>::new(Self::CLASS).build()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Foz {
    pub a: i64,
    pub b: i64,
}

impl Default for Foz {
    fn default() -> Self {
        Self { a: 3, b: 4 }
    }
}

impl Injectable for Foz {
    const CLASS: &'static str = "Foz";

    fn describe() -> ClassDescriptor {
        ClassBuilder::<Foz>::new(Self::CLASS).build()
    }
}

/// `a` is rewritten by its methods
#[derive(Debug)]
pub struct Bar {
    pub a: RwLock<i64>,
    pub b: i64,
}

impl Bar {
    pub fn new(foo: &Foo, foz: &Foz) -> Self {
        Self {
            a: RwLock::new(foo.a),
            b: foz.b,
        }
    }

    pub fn a(&self) -> i64 {
        *self.a.read()
    }

    pub fn f1(&self, foo: &Foo) -> i64 {
        let mut a = self.a.write();
        *a = foo.a + foo.b;
        *a
    }

    pub fn f2(&self, foo: &Foo, id: &str, name: &str) -> String {
        let number = self.f1(foo);
        format!("Name: {} Id: {} Number: {}", name, id, number)
    }
}

impl Injectable for Bar {
    const CLASS: &'static str = "Bar";

    fn describe() -> ClassDescriptor {
        ClassBuilder::with_constructor(
            Self::CLASS,
            Signature::new().class("foo", Foo::CLASS).class("foz", Foz::CLASS),
            |args| Ok(Bar::new(&*args.object::<Foo>(0)?, &*args.object::<Foz>(1)?)),
        )
        .method(
            "f1",
            Signature::new().class("foo", Foo::CLASS),
            |bar: &Bar, args| Ok(Value::from(bar.f1(&*args.object::<Foo>(0)?))),
        )
        .method(
            "f2",
            Signature::new().class("foo", Foo::CLASS).untyped("id").untyped("name"),
            |bar: &Bar, args| {
                let foo = args.object::<Foo>(0)?;
                Ok(Value::from(bar.f2(&foo, &args.display(1)?, &args.display(2)?)))
            },
        )
        .build()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Fzz {
    pub a: i64,
    pub b: i64,
}

impl Fzz {
    pub fn new(foo: &Foo) -> Self {
        Self {
            a: foo.a + 5,
            b: foo.b + 6,
        }
    }
}

impl Injectable for Fzz {
    const CLASS: &'static str = "Fzz";

    fn describe() -> ClassDescriptor {
        ClassBuilder::with_constructor(
            Self::CLASS,
            Signature::new().class("foo", Foo::CLASS),
            |args| Ok(Fzz::new(&*args.object::<Foo>(0)?)),
        )
        .build()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Brr {
    pub a: i64,
    pub b: i64,
}

impl Injectable for Brr {
    const CLASS: &'static str = "Brr";

    fn describe() -> ClassDescriptor {
        ClassBuilder::with_constructor(
            Self::CLASS,
            Signature::new().class("fzz", Fzz::CLASS),
            |args| {
                let fzz = args.object::<Fzz>(0)?;
                Ok(Brr { a: fzz.a, b: fzz.b })
            },
        )
        .build()
    }
}

/// Container with every fixture class defined
pub fn fixture_container() -> Container {
    ::common::init_test_logging();

    let container = Container::new();
    container
        .define_injectable::<Foo>()
        .define_injectable::<Foz>()
        .define_injectable::<Bar>()
        .define_injectable::<Fzz>()
        .define_injectable::<Brr>();
    container
}
