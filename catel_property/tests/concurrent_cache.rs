// Copyright 2025 the Catel Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Concurrent access to the process-wide metadata cache.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::thread;

use catel_property::{
    ModelType, Property, PropertyDescriptorBuilder, PropertyRegistrar, TypeKey, TypeMetadataCache,
};

static REGISTRATIONS: AtomicUsize = AtomicUsize::new(0);

struct Invoice;

impl ModelType for Invoice {
    fn register_properties(registrar: &mut PropertyRegistrar) {
        REGISTRATIONS.fetch_add(1, Ordering::SeqCst);
        registrar
            .register(PropertyDescriptorBuilder::new(Property::<i64>::new("Number"), 0).build())
            .register(
                PropertyDescriptorBuilder::new(Property::<String>::new("Customer"), String::new())
                    .build(),
            );
    }
}

#[test]
fn racing_threads_build_once() {
    let cache = TypeMetadataCache::global();
    let results: Vec<_> = thread::scope(|scope| {
        let handles: Vec<_> = (0..8)
            .map(|_| scope.spawn(|| cache.get::<Invoice>().unwrap()))
            .collect();
        handles
            .into_iter()
            .map(|handle| handle.join().unwrap())
            .collect()
    });

    assert_eq!(REGISTRATIONS.load(Ordering::SeqCst), 1);
    let first = &results[0];
    assert!(results.iter().all(|m| Arc::ptr_eq(m, first)));
    assert_eq!(first.len(), 2);
}

struct Ledger;

impl ModelType for Ledger {
    fn register_properties(registrar: &mut PropertyRegistrar) {
        registrar.register(PropertyDescriptorBuilder::new(Property::<i32>::new("Balance"), 0).build());
    }
}

#[test]
fn readers_survive_concurrent_registration() {
    let cache = TypeMetadataCache::new();
    let key = TypeKey::of::<Ledger>();
    const NAMES: [&str; 4] = ["A", "B", "C", "D"];

    thread::scope(|scope| {
        scope.spawn(|| {
            for name in NAMES {
                let descriptor = PropertyDescriptorBuilder::new(Property::<i32>::new(name), 0).build();
                cache.register_property(key, descriptor).unwrap();
            }
        });
        for _ in 0..4 {
            scope.spawn(|| {
                for _ in 0..100 {
                    let metadata = cache.get_type_metadata(key).unwrap();
                    // Base property always first, whatever was added since.
                    assert_eq!(metadata.slot("Balance").map(|s| s.index()), Some(0));
                }
            });
        }
    });

    let metadata = cache.get_type_metadata(key).unwrap();
    assert_eq!(metadata.len(), 5);
}
