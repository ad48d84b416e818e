// Copyright 2025 the Catel Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Benchmarks for `catel_property`: metadata lookups, the sparse store and boxing.

use criterion::{BatchSize, Criterion, black_box, criterion_group, criterion_main};
use std::sync::Once;

use catel_property::boxing::get_boxed_value;
use catel_property::{
    ErasedValue, ModelType, Property, PropertyDescriptorBuilder, PropertyRegistrar,
    PropertyValueStore, TypeMetadataCache,
};

const WIDTH: Property<f64> = Property::new("Width");
const HEIGHT: Property<f64> = Property::new("Height");
const COUNT: Property<i32> = Property::new("Count");
const TITLE: Property<String> = Property::new("Title");

struct Widget;

impl ModelType for Widget {
    fn register_properties(registrar: &mut PropertyRegistrar) {
        registrar
            .register(PropertyDescriptorBuilder::new(WIDTH, 0.0).build())
            .register(PropertyDescriptorBuilder::new(HEIGHT, 0.0).build())
            .register(PropertyDescriptorBuilder::new(COUNT, 0).build())
            .register(PropertyDescriptorBuilder::new(TITLE, String::new()).build());
    }
}

fn bench_property(c: &mut Criterion) {
    static PRINT_SIZES: Once = Once::new();
    PRINT_SIZES.call_once(|| {
        eprintln!(
            "sizes: PropertyValueStore={} ErasedValue={}",
            size_of::<PropertyValueStore>(),
            size_of::<ErasedValue>(),
        );
    });

    let metadata = TypeMetadataCache::global()
        .get::<Widget>()
        .expect("Widget registers valid properties");
    let width = metadata.resolve(WIDTH).expect("Width is registered");
    let title = metadata.resolve(TITLE).expect("Title is registered");

    let mut group = c.benchmark_group("property/metadata");

    group.bench_function("cache_hit", |b| {
        b.iter(|| black_box(TypeMetadataCache::global().get::<Widget>()));
    });

    group.bench_function("resolve", |b| {
        b.iter(|| black_box(metadata.resolve(black_box(HEIGHT))));
    });

    group.bench_function("resolve_name", |b| {
        b.iter(|| black_box(metadata.resolve_name(black_box("Title"))));
    });

    group.finish();

    let mut group = c.benchmark_group("property/store");

    group.bench_function("get_or_default/default", |b| {
        let store = PropertyValueStore::new();
        b.iter(|| black_box(store.get_or_default(width, &metadata)));
    });

    group.bench_function("get_or_default/set", |b| {
        let mut store = PropertyValueStore::new();
        store.set(width, ErasedValue::new(100.0_f64));
        b.iter(|| black_box(store.get_or_default(width, &metadata)));
    });

    group.bench_function("set/string", |b| {
        b.iter_batched(
            PropertyValueStore::new,
            |mut store| {
                store.set(title, ErasedValue::new(String::from("hello world")));
                black_box(store);
            },
            BatchSize::SmallInput,
        );
    });

    group.finish();

    let mut group = c.benchmark_group("property/boxing");

    group.bench_function("erase/i32/cached", |b| {
        b.iter(|| black_box(ErasedValue::new(black_box(42_i32))));
    });

    group.bench_function("erase/f64/uncached", |b| {
        b.iter(|| black_box(ErasedValue::new(black_box(42.0_f64))));
    });

    group.bench_function("get_boxed_value/bool", |b| {
        b.iter(|| black_box(get_boxed_value(black_box(true))));
    });

    group.bench_function("ptr_eq", |b| {
        let a = ErasedValue::new(7_i64);
        let other = ErasedValue::new(7_i64);
        b.iter(|| black_box(a == other));
    });

    group.finish();
}

criterion_group!(benches, bench_property);
criterion_main!(benches);
