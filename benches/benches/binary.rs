// Copyright 2025 the Catel Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Benchmarks for `catel_binary`: shape lookups and the wire codec.

use criterion::{BenchmarkId, Criterion, black_box, criterion_group, criterion_main};

use catel_binary::{BinaryOptions, BinarySerializer, NullEncoding, reflect_struct};

#[derive(Clone, Debug, Default, PartialEq)]
struct Order {
    id: i64,
    customer: Option<String>,
    quantity: i32,
    price: f64,
    lines: Vec<Line>,
}

reflect_struct!(Order {
    id: i64 => "Id",
    customer: Option<String> => "Customer",
    quantity: i32 => "Quantity",
    price: f64 => "Price",
    lines: Vec<Line> => "Lines",
});

#[derive(Clone, Debug, Default, PartialEq)]
struct Line {
    sku: String,
    count: i16,
    gift: bool,
}

reflect_struct!(Line {
    sku: String => "Sku",
    count: i16 => "Count",
    gift: bool => "Gift",
});

fn order(lines: usize) -> Order {
    Order {
        id: 42,
        customer: Some(String::from("Alice")),
        quantity: 3,
        price: 19.99,
        lines: (0..lines)
            .map(|i| Line {
                sku: format!("SKU-{i:05}"),
                count: 1,
                gift: i % 2 == 0,
            })
            .collect(),
    }
}

fn bench_binary(c: &mut Criterion) {
    let sentinel = BinarySerializer::new();
    let presence = BinarySerializer::with_options(BinaryOptions {
        null_encoding: NullEncoding::PresenceByte,
    });

    let mut group = c.benchmark_group("binary/shape");

    group.bench_function("discover_cached", |b| {
        b.iter(|| black_box(sentinel.discover_shape::<Order>()));
    });

    group.finish();

    let mut group = c.benchmark_group("binary/codec");

    for lines in [0_usize, 16, 256] {
        let value = order(lines);
        let bytes = sentinel
            .to_bytes(&value)
            .expect("orders use supported types");

        group.bench_function(BenchmarkId::new("to_bytes/sentinel", lines), |b| {
            b.iter(|| black_box(sentinel.to_bytes(&value)));
        });

        group.bench_function(BenchmarkId::new("to_bytes/presence", lines), |b| {
            b.iter(|| black_box(presence.to_bytes(&value)));
        });

        group.bench_function(BenchmarkId::new("from_bytes/sentinel", lines), |b| {
            b.iter(|| black_box(sentinel.from_bytes::<Order>(&bytes)));
        });
    }

    group.finish();
}

criterion_group!(benches, bench_binary);
criterion_main!(benches);
