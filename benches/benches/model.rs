// Copyright 2025 the Catel Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Benchmarks for `catel_model`: typed access, change notification and edit sessions.

use std::rc::Rc;

use criterion::{BatchSize, BenchmarkId, Criterion, black_box, criterion_group, criterion_main};

use catel_model::{
    EditableModel, Model, ModelBase, ModelExt, ModelOptions, ModelType, Property,
    PropertyChangedEventArgs, PropertyDescriptorBuilder, PropertyRegistrar, ValidatableModel,
    rules,
};

const NAME: Property<Option<String>> = Property::new("Name");
const AGE: Property<i32> = Property::new("Age");
const SCORE: Property<f64> = Property::new("Score");

#[derive(Debug)]
struct Person {
    base: ModelBase,
}

impl Person {
    fn with_options(options: ModelOptions) -> Self {
        Self {
            base: ModelBase::with_options::<Self>(options),
        }
    }
}

impl ModelType for Person {
    fn register_properties(registrar: &mut PropertyRegistrar) {
        registrar
            .register(
                PropertyDescriptorBuilder::new(NAME, None)
                    .rule(rules::required::<Option<String>>("Name is required"))
                    .build(),
            )
            .register(
                PropertyDescriptorBuilder::new(AGE, 0)
                    .rule(rules::range(0, 150))
                    .build(),
            )
            .register(PropertyDescriptorBuilder::new(SCORE, 0.0).build());
    }
}

impl Model for Person {
    fn model(&self) -> &ModelBase {
        &self.base
    }

    fn model_mut(&mut self) -> &mut ModelBase {
        &mut self.base
    }
}

fn bench_model(c: &mut Criterion) {
    let default_options = ModelOptions::default();
    let quiet = ModelOptions::builder()
        .validate_on_property_change(false)
        .build();
    let lean = ModelOptions::builder().lean_and_mean(true).build();

    let mut group = c.benchmark_group("model/access");

    group.bench_function("construct", |b| {
        b.iter(|| black_box(Person::with_options(default_options)));
    });

    group.bench_function("get/default", |b| {
        let person = Person::with_options(default_options);
        b.iter(|| black_box(person.get_value(AGE)));
    });

    group.bench_function("get/string", |b| {
        let mut person = Person::with_options(default_options);
        person.set_value(NAME, Some(String::from("Alice")));
        b.iter(|| black_box(person.get_value(NAME)));
    });

    group.bench_function("set/no_op", |b| {
        let mut person = Person::with_options(default_options);
        person.set_value(AGE, 30);
        b.iter(|| black_box(person.set_value(AGE, 30)));
    });

    group.finish();

    let mut group = c.benchmark_group("model/set");

    for (label, options) in [
        ("validating", default_options),
        ("quiet", quiet),
        ("lean", lean),
    ] {
        group.bench_function(BenchmarkId::new("i32", label), |b| {
            b.iter_batched(
                || Person::with_options(options),
                |mut person| {
                    black_box(person.set_value(AGE, 31));
                    black_box(person);
                },
                BatchSize::SmallInput,
            );
        });
    }

    group.bench_function("with_subscriber", |b| {
        b.iter_batched(
            || {
                let person = Person::with_options(default_options);
                person
                    .model()
                    .events()
                    .property_changed
                    .subscribe(Rc::new(|args: &PropertyChangedEventArgs| {
                        black_box(args.property);
                    }));
                person
            },
            |mut person| {
                black_box(person.set_value(SCORE, 1.5));
                black_box(person);
            },
            BatchSize::SmallInput,
        );
    });

    group.bench_function(BenchmarkId::new("suspended", 64), |b| {
        b.iter_batched(
            || Person::with_options(quiet),
            |mut person| {
                {
                    let mut scope = person.suspend_change_notifications();
                    for i in 0..64 {
                        scope.set_value(SCORE, f64::from(i));
                    }
                }
                black_box(person);
            },
            BatchSize::SmallInput,
        );
    });

    group.finish();

    let mut group = c.benchmark_group("model/validation");

    group.bench_function("full", |b| {
        let mut person = Person::with_options(default_options);
        person.set_value(AGE, 200);
        b.iter(|| {
            person.validate();
            black_box(person.validation_context().len())
        });
    });

    group.finish();

    let mut group = c.benchmark_group("model/edit");

    group.bench_function("begin_cancel", |b| {
        b.iter_batched(
            || Person::with_options(quiet),
            |mut person| {
                person.begin_edit();
                person.set_value(AGE, 5);
                black_box(person.cancel_edit());
                black_box(person);
            },
            BatchSize::SmallInput,
        );
    });

    group.finish();
}

criterion_group!(benches, bench_model);
criterion_main!(benches);
