use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use serde::{Deserialize, Serialize};
use std::hint::black_box;
use std::sync::Arc;

use draftstore::adapter::{Adapter, SelectedSignal};
use draftstore::{MemoryStorage, PersistOptions, Store, StoreOptions};

#[derive(Clone, Serialize, Deserialize)]
struct State {
    counter: usize,
    name: String,
    items: Vec<u64>,
}

fn initial() -> State {
    State {
        counter: 0,
        name: "test".to_string(),
        items: (0..256).collect(),
    }
}

fn store_creation_benchmark(c: &mut Criterion) {
    c.bench_function("store_creation", |b| {
        b.iter(|| Store::new(|_, _| black_box(initial())));
    });
}

fn store_read_benchmark(c: &mut Criterion) {
    let store = Store::new(|_, _| initial());

    c.bench_function("store_read", |b| {
        b.iter(|| {
            black_box(store.get_state());
        });
    });
}

fn store_update_benchmark(c: &mut Criterion) {
    let store = Store::new(|_, _| initial());

    c.bench_function("store_update", |b| {
        let mut i = 0;
        b.iter(|| {
            store
                .set_state(|state| {
                    state.counter = black_box(i);
                })
                .unwrap();
            i += 1;
        });
    });
}

fn store_persisted_update_benchmark(c: &mut Criterion) {
    let storage = Arc::new(MemoryStorage::new());
    let store = Store::create(
        |_, _| initial(),
        StoreOptions::default().persist(PersistOptions::new("bench").storage(storage)),
    );

    c.bench_function("store_persisted_update", |b| {
        let mut i = 0;
        b.iter(|| {
            store.set_state(|state| state.counter = black_box(i)).unwrap();
            i += 1;
        });
    });
}

fn store_subscribe_benchmark(c: &mut Criterion) {
    let mut group = c.benchmark_group("store_subscribe");

    for subscriber_count in [1, 10, 100].iter() {
        let store = Store::new(|_, _| initial());

        for _ in 0..*subscriber_count {
            store.subscribe(|_| {
                // Empty subscriber
            });
        }

        group.bench_with_input(
            BenchmarkId::from_parameter(subscriber_count),
            subscriber_count,
            |b, _| {
                let mut i = 0;
                b.iter(|| {
                    store.set_state(|state| state.counter = black_box(i)).unwrap();
                    i += 1;
                });
            },
        );
    }
    group.finish();
}

fn signal_projection_benchmark(c: &mut Criterion) {
    let store = Store::new(|_, _| initial());
    let signal = SelectedSignal::attach(store, |s: &State| s.counter);

    c.bench_function("signal_projection", |b| {
        let mut i = 0;
        b.iter(|| {
            signal.set_state(|state| state.counter = black_box(i)).unwrap();
            black_box(signal.get());
            i += 1;
        });
    });
}

criterion_group!(
    benches,
    store_creation_benchmark,
    store_read_benchmark,
    store_update_benchmark,
    store_persisted_update_benchmark,
    store_subscribe_benchmark,
    signal_projection_benchmark,
);
criterion_main!(benches);
