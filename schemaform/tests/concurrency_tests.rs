//! Concurrent derivation tests.
//!
//! Recursion state is per derivation call, so many threads can derive the
//! same recursive types at once, sharing a registry or not.

use std::sync::Arc;
use std::thread;

use schemaform::{Describe, Registry, Schema, SchemaNode};

/// `F { f1: Vec<F>, f2: i32 }`
#[derive(Describe)]
struct F {
    f1: Vec<F>,
    f2: i32,
}

#[derive(Describe)]
enum Tree {
    Leaf { value: i32 },
    Node { children: Vec<Tree> },
}

#[derive(Debug, PartialEq, Describe)]
struct Query {
    term: String,
    limit: Option<u32>,
}

const THREADS: usize = 99;

fn expected_f() -> Schema {
    Registry::default().schema_for::<F>().unwrap()
}

#[test]
fn test_recursive_schema_in_parallel_with_shared_registry() {
    let registry = Registry::default();
    let expected = expected_f();

    let schemas: Vec<Schema> = thread::scope(|scope| {
        let handles: Vec<_> = (0..THREADS)
            .map(|_| scope.spawn(|| registry.schema_for::<F>().unwrap()))
            .collect();
        handles.into_iter().map(|h| h.join().unwrap()).collect()
    });

    assert_eq!(schemas.len(), THREADS);
    for schema in schemas {
        assert_eq!(schema, expected);
        let product = schema.node.as_product().unwrap();
        assert_eq!(
            product.fields[0].schema,
            SchemaNode::array(SchemaNode::Ref(product.info.clone()))
        );
    }
    assert_eq!(registry.cached_schemas().len(), 1);
}

#[test]
fn test_recursive_schema_in_parallel_with_own_registries() {
    let expected = expected_f();

    thread::scope(|scope| {
        for i in 0..THREADS {
            let expected = &expected;
            scope.spawn(move || {
                let registry = Registry::default();
                // Interleave the two recursive types so sessions overlap differently.
                if i % 2 == 0 {
                    registry.schema_for::<Tree>().unwrap();
                }
                assert_eq!(&registry.schema_for::<F>().unwrap(), expected);
            });
        }
    });
}

#[test]
fn test_codec_shared_across_threads() {
    let registry = Arc::new(Registry::default());

    let handles: Vec<_> = (0..THREADS)
        .map(|i| {
            let registry = Arc::clone(&registry);
            thread::spawn(move || {
                let codec = registry.codec_for::<Query>().unwrap();
                let query = Query {
                    term: format!("term {}", i),
                    limit: (i % 3 == 0).then_some(i as u32),
                };
                let decoded = codec.decode(&codec.encode(&query)).unwrap();
                assert_eq!(decoded, query);
            })
        })
        .collect();

    for handle in handles {
        handle.join().unwrap();
    }

    assert!(Arc::ptr_eq(
        registry.codec_for::<Query>().unwrap().form_codec(),
        registry.codec_for::<Query>().unwrap().form_codec(),
    ));
}
