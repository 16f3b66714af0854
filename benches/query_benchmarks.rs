//! Performance benchmarks for streaming search.
//!
//! These benchmarks measure the store's text scan under different store
//! sizes, for selective and empty needles.

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use notefinder_core::matching::ContentMatchers;
use notefinder_core::models::{Note, NoteKey, NotebookId, Query};
use notefinder_core::Store;
use std::time::Duration;
use tokio::runtime::Runtime;

/// Store with `size` notes spread over four notebooks; every tenth mentions "alpha".
fn populated_store(size: u64) -> Store {
    let store = Store::new(ContentMatchers::new());
    for uuid in 0..size {
        let notebook = NotebookId::new(format!("notebook-{}", uuid % 4));
        let mut note = Note::new(uuid, format!("Meeting notes {}", uuid));
        note.body = if uuid % 10 == 0 {
            "Discussed the alpha release schedule and open issues".to_string()
        } else {
            "Discussed budget, hiring and the quarterly roadmap".to_string()
        };
        note.mime_type = "text/plain".to_string();
        store.put(NoteKey::new(notebook, uuid), note);
    }
    store
}

/// Benchmark a selective needle across store sizes.
fn bench_query_stream_sizes(c: &mut Criterion) {
    let rt = Runtime::new().unwrap();
    let mut group = c.benchmark_group("query_stream_sizes");

    for size in [100u64, 1_000, 10_000].iter() {
        let store = populated_store(*size);
        let query = Query::new("alpha");
        group.bench_with_input(BenchmarkId::from_parameter(size), size, |b, _| {
            b.to_async(&rt).iter(|| async {
                let _results = store.search(&query).await;
            });
        });
    }

    group.finish();
}

/// Benchmark listing everything versus one notebook.
fn bench_query_stream_haystack(c: &mut Criterion) {
    let rt = Runtime::new().unwrap();
    let store = populated_store(5_000);
    let everything = Query::all();
    let one_notebook = Query::all().in_notebook(NotebookId::new("notebook-1"));

    c.bench_function("query_stream_all_notebooks", |b| {
        b.to_async(&rt).iter(|| async {
            let _results = store.search(&everything).await;
        });
    });

    c.bench_function("query_stream_one_notebook", |b| {
        b.to_async(&rt).iter(|| async {
            let _results = store.search(&one_notebook).await;
        });
    });
}

criterion_group! {
    name = benches;
    config = Criterion::default()
        .measurement_time(Duration::from_secs(10))
        .sample_size(50);
    targets = bench_query_stream_sizes,
        bench_query_stream_haystack
}

criterion_main!(benches);
