mod fixtures;

use std::sync::{
    atomic::{AtomicUsize, Ordering},
    Arc, Barrier,
};

use fixtures::{fixture_container, Bar, Foo};
use ioc::{ClassBuilder, Container, Injectable, Instance, Signature, Value};

const THREADS: usize = 8;

#[derive(Debug)]
struct Expensive {
    id: usize,
}

fn counting_container(counter: Arc<AtomicUsize>) -> Container {
    let container = Container::new();
    container.define(
        ClassBuilder::with_constructor("Expensive", Signature::new(), move |_| {
            let id = counter.fetch_add(1, Ordering::SeqCst);
            std::thread::sleep(std::time::Duration::from_millis(10));
            Ok(Expensive { id })
        })
        .build(),
    );
    container
}

#[test]
fn test_concurrent_singleton_built_once() {
    let counter = Arc::new(AtomicUsize::new(0));
    let container = counting_container(counter.clone());
    let barrier = Barrier::new(THREADS);

    let instances: Vec<Instance> = std::thread::scope(|s| {
        let handles: Vec<_> = (0..THREADS)
            .map(|_| {
                s.spawn(|| {
                    barrier.wait();
                    container.build_with_singleton("Expensive").unwrap()
                })
            })
            .collect();
        handles.into_iter().map(|h| h.join().unwrap()).collect()
    });

    assert_eq!(counter.load(Ordering::SeqCst), 1);
    assert!(instances.iter().all(|i| i.ptr_eq(&instances[0])));
    assert_eq!(instances[0].downcast_ref::<Expensive>().unwrap().id, 0);

    let stats = container.stats();
    assert_eq!(stats.constructions, 1);
    assert_eq!(stats.singleton_hits, THREADS as u64 - 1);
}

#[test]
fn test_concurrent_build_is_never_shared() {
    let counter = Arc::new(AtomicUsize::new(0));
    let container = counting_container(counter.clone());

    std::thread::scope(|s| {
        for _ in 0..THREADS {
            s.spawn(|| container.build("Expensive").unwrap());
        }
    });

    assert_eq!(counter.load(Ordering::SeqCst), THREADS);
    assert!(container.get_singleton("Expensive").is_none());
}

#[test]
fn test_concurrent_invoke_on_shared_target() {
    let container = fixture_container();
    let barrier = Barrier::new(THREADS);

    std::thread::scope(|s| {
        for id in 0..THREADS {
            let container = container.clone();
            let barrier = &barrier;
            s.spawn(move || {
                barrier.wait();
                let result = container
                    .invoke(
                        Bar::CLASS,
                        "f2",
                        vec![Value::from(id as i64), Value::from("worker")],
                    )
                    .unwrap();
                assert_eq!(
                    result,
                    Value::from(format!("Name: worker Id: {} Number: 3", id))
                );
            });
        }
    });

    let bar = container.get_singleton_as::<Bar>(Bar::CLASS).unwrap();
    assert_eq!(bar.a(), 3);
    assert!(container.get_singleton(Foo::CLASS).is_none());
    assert_eq!(container.stats().invocations, THREADS as u64);
}
