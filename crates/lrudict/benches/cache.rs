use criterion::{black_box, criterion_group, criterion_main, Criterion, Throughput};
use lrudict::LruDict;

fn bench_hot_get(c: &mut Criterion) {
    let mut group = c.benchmark_group("hot_get");
    group.sample_size(50);
    group.throughput(Throughput::Elements(1));

    group.bench_function("get_hit", |b| {
        let cache = LruDict::new(1000).unwrap();
        for i in 0..100u64 {
            cache.insert(i, vec![b'x'; 1024]);
        }

        let mut counter = 0u64;
        b.iter(|| {
            black_box(cache.get(&(counter % 100)));
            counter += 1;
        });
    });

    group.finish();
}

fn bench_eviction_churn(c: &mut Criterion) {
    let mut group = c.benchmark_group("eviction_churn");
    group.sample_size(50);
    group.throughput(Throughput::Elements(1));

    group.bench_function("insert_full_cache", |b| {
        let cache = LruDict::new(10).unwrap();
        for i in 0..10u64 {
            cache.insert(i, vec![b'x'; 1024]);
        }

        // Every insert beyond the warmup evicts the tail
        let mut counter = 10u64;
        b.iter(|| {
            cache.insert(black_box(counter), vec![b'x'; 1024]);
            counter += 1;
        });
    });

    group.finish();
}

fn bench_mixed_50_50(c: &mut Criterion) {
    let mut group = c.benchmark_group("mixed");
    group.sample_size(50);
    group.throughput(Throughput::Elements(1));

    group.bench_function("50_read_50_write", |b| {
        let cache = LruDict::new(1000).unwrap();
        for i in 0..100u64 {
            cache.insert(i, vec![b'x'; 1024]);
        }

        let mut counter = 0u64;
        b.iter(|| {
            if counter % 2 == 0 {
                black_box(cache.get(&(counter % 100)));
            } else {
                cache.insert(counter % 100, vec![b'x'; 1024]);
            }
            counter += 1;
        });
    });

    group.finish();
}

criterion_group!(
    benches,
    bench_hot_get,
    bench_eviction_churn,
    bench_mixed_50_50
);
criterion_main!(benches);
